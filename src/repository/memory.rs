//! In-memory store used by the `memory` backend and the test suites
//!
//! All tables live behind one mutex, so every operation (including the
//! check-then-insert of `create_open`) runs as a single writer.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use super::{BookStore, BorrowingStore, UserStore};
use crate::{
    error::{AppError, AppResult},
    models::{
        Book, BookShort, Borrowing, BorrowingDetails, CreateBook, CreateUser, NewBorrowing, User,
    },
};

#[derive(Default)]
struct Tables {
    books: Vec<Book>,
    borrowings: Vec<Borrowing>,
    users: Vec<User>,
}

impl Tables {
    // Rows are never deleted, so ids are positions + 1.
    fn next_id(len: usize) -> i32 {
        (len + 1) as i32
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every borrowing ever recorded, returned or not
    pub async fn all_borrowings(&self) -> Vec<Borrowing> {
        self.tables.lock().await.borrowings.clone()
    }
}

#[async_trait]
impl BookStore for MemoryStore {
    async fn list(&self) -> AppResult<Vec<Book>> {
        Ok(self.tables.lock().await.books.clone())
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        self.tables
            .lock()
            .await
            .books
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or(AppError::BookNotFound(id))
    }

    async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let mut tables = self.tables.lock().await;
        let created = Book {
            id: Tables::next_id(tables.books.len()),
            title: book.title.clone(),
            author: book.author.clone(),
            isbn: book.isbn.clone(),
            published_year: book.published_year,
            created_at: Utc::now(),
        };
        tables.books.push(created.clone());
        Ok(created)
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

#[async_trait]
impl BorrowingStore for MemoryStore {
    async fn has_open_for_book(&self, book_id: i32) -> AppResult<bool> {
        Ok(self
            .tables
            .lock()
            .await
            .borrowings
            .iter()
            .any(|b| b.book_id == book_id && b.is_open()))
    }

    async fn open_for_book(&self, book_id: i32) -> AppResult<Option<Borrowing>> {
        Ok(self
            .tables
            .lock()
            .await
            .borrowings
            .iter()
            .find(|b| b.book_id == book_id && b.is_open())
            .cloned())
    }

    async fn open_book_ids(&self) -> AppResult<Vec<i32>> {
        let tables = self.tables.lock().await;
        let ids: BTreeSet<i32> = tables
            .borrowings
            .iter()
            .filter(|b| b.is_open())
            .map(|b| b.book_id)
            .collect();
        Ok(ids.into_iter().collect())
    }

    async fn create_open(&self, borrowing: &NewBorrowing) -> AppResult<Option<Borrowing>> {
        let mut tables = self.tables.lock().await;
        if tables
            .borrowings
            .iter()
            .any(|b| b.book_id == borrowing.book_id && b.is_open())
        {
            return Ok(None);
        }

        let created = borrowing
            .clone()
            .into_borrowing(Tables::next_id(tables.borrowings.len()));
        tables.borrowings.push(created.clone());
        Ok(Some(created))
    }

    async fn close_open(
        &self,
        user_id: i32,
        book_id: i32,
        returned_at: DateTime<Utc>,
    ) -> AppResult<Option<Borrowing>> {
        let mut tables = self.tables.lock().await;
        match tables
            .borrowings
            .iter_mut()
            .find(|b| b.user_id == user_id && b.book_id == book_id && b.is_open())
        {
            Some(borrowing) => {
                borrowing.mark_returned(returned_at)?;
                Ok(Some(borrowing.clone()))
            }
            None => Ok(None),
        }
    }

    async fn open_for_user(&self, user_id: i32) -> AppResult<Vec<BorrowingDetails>> {
        let tables = self.tables.lock().await;
        let mut details: Vec<BorrowingDetails> = tables
            .borrowings
            .iter()
            .filter(|b| b.user_id == user_id && b.is_open())
            .filter_map(|b| {
                let book = tables.books.iter().find(|book| book.id == b.book_id)?;
                Some(BorrowingDetails {
                    id: b.id,
                    due_date: b.due_date,
                    borrowed_at: b.created_at,
                    book: BookShort::from(book),
                })
            })
            .collect();
        details.sort_by_key(|d| (d.due_date, d.id));
        Ok(details)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.tables
            .lock()
            .await
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(AppError::UserNotFound(id))
    }

    async fn get_by_login(&self, login: &str) -> AppResult<Option<User>> {
        Ok(self
            .tables
            .lock()
            .await
            .users
            .iter()
            .find(|u| u.login.eq_ignore_ascii_case(login))
            .cloned())
    }

    async fn create(&self, user: &CreateUser, password_hash: &str) -> AppResult<User> {
        let mut tables = self.tables.lock().await;
        if tables
            .users
            .iter()
            .any(|u| u.login.eq_ignore_ascii_case(&user.login))
        {
            return Err(AppError::Conflict(format!(
                "Login '{}' already exists",
                user.login
            )));
        }

        let created = User {
            id: Tables::next_id(tables.users.len()),
            login: user.login.clone(),
            display_name: user.display_name.clone(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        tables.users.push(created.clone());
        Ok(created)
    }
}
