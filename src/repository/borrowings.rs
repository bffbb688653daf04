//! Borrowings repository for database operations
//!
//! The `borrowings_one_open_per_book` partial unique index guarantees at most one
//! open borrowing per book; inserts go through `ON CONFLICT DO NOTHING` against it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};

use super::BorrowingStore;
use crate::{
    error::AppResult,
    models::{BookShort, Borrowing, BorrowingDetails, NewBorrowing},
};

#[derive(Clone)]
pub struct BorrowingsRepository {
    pool: Pool<Postgres>,
}

impl BorrowingsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BorrowingStore for BorrowingsRepository {
    async fn has_open_for_book(&self, book_id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM borrowings WHERE book_id = $1 AND NOT returned)",
        )
        .bind(book_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn open_for_book(&self, book_id: i32) -> AppResult<Option<Borrowing>> {
        let borrowing = sqlx::query_as::<_, Borrowing>(
            r#"
            SELECT id, book_id, user_id, due_date, returned, returned_at, created_at
            FROM borrowings
            WHERE book_id = $1 AND NOT returned
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(borrowing)
    }

    async fn open_book_ids(&self) -> AppResult<Vec<i32>> {
        let ids: Vec<i32> =
            sqlx::query_scalar("SELECT DISTINCT book_id FROM borrowings WHERE NOT returned")
                .fetch_all(&self.pool)
                .await?;

        Ok(ids)
    }

    async fn create_open(&self, borrowing: &NewBorrowing) -> AppResult<Option<Borrowing>> {
        let created = sqlx::query_as::<_, Borrowing>(
            r#"
            INSERT INTO borrowings (book_id, user_id, due_date, returned, created_at)
            VALUES ($1, $2, $3, FALSE, $4)
            ON CONFLICT (book_id) WHERE NOT returned DO NOTHING
            RETURNING id, book_id, user_id, due_date, returned, returned_at, created_at
            "#,
        )
        .bind(borrowing.book_id)
        .bind(borrowing.user_id)
        .bind(borrowing.due_date)
        .bind(borrowing.created_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(created)
    }

    async fn close_open(
        &self,
        user_id: i32,
        book_id: i32,
        returned_at: DateTime<Utc>,
    ) -> AppResult<Option<Borrowing>> {
        // Outer `NOT returned`: a concurrent return of the same row updates nothing.
        let closed = sqlx::query_as::<_, Borrowing>(
            r#"
            UPDATE borrowings
            SET returned = TRUE, returned_at = $3
            WHERE NOT returned AND id = (
                SELECT id FROM borrowings
                WHERE user_id = $1 AND book_id = $2 AND NOT returned
                ORDER BY id
                LIMIT 1
            )
            RETURNING id, book_id, user_id, due_date, returned, returned_at, created_at
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .bind(returned_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(closed)
    }

    async fn open_for_user(&self, user_id: i32) -> AppResult<Vec<BorrowingDetails>> {
        let rows = sqlx::query(
            r#"
            SELECT b.id, b.due_date, b.created_at, bk.id AS book_id, bk.title, bk.author
            FROM borrowings b
            JOIN books bk ON bk.id = b.book_id
            WHERE b.user_id = $1 AND NOT b.returned
            ORDER BY b.due_date, b.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let result = rows
            .into_iter()
            .map(|row| BorrowingDetails {
                id: row.get("id"),
                due_date: row.get("due_date"),
                borrowed_at: row.get("created_at"),
                book: BookShort {
                    id: row.get("book_id"),
                    title: row.get("title"),
                    author: row.get("author"),
                },
            })
            .collect();

        Ok(result)
    }
}
