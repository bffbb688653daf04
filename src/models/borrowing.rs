//! Borrowing model: the join record between a user and a book

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::book::BookShort;
use crate::error::{AppError, AppResult};

/// Lifecycle state of a borrowing. `Returned` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorrowingState {
    Open,
    Returned,
}

/// Borrowing model from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Borrowing {
    pub id: i32,
    pub book_id: i32,
    pub user_id: i32,
    pub due_date: NaiveDate,
    pub returned: bool,
    pub returned_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Borrowing {
    pub fn state(&self) -> BorrowingState {
        if self.returned {
            BorrowingState::Returned
        } else {
            BorrowingState::Open
        }
    }

    pub fn is_open(&self) -> bool {
        self.state() == BorrowingState::Open
    }

    /// Apply the single `Open -> Returned` transition.
    pub fn mark_returned(&mut self, at: DateTime<Utc>) -> AppResult<()> {
        match self.state() {
            BorrowingState::Open => {
                self.returned = true;
                self.returned_at = Some(at);
                Ok(())
            }
            BorrowingState::Returned => Err(AppError::NotBorrowedByUser),
        }
    }
}

/// A borrowing about to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewBorrowing {
    pub book_id: i32,
    pub user_id: i32,
    pub due_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl NewBorrowing {
    /// Open a borrowing created at `now`, due `loan_period_days` after its creation date.
    ///
    /// A negative period, or one that overflows the calendar, is an `Internal` error.
    pub fn open(
        book_id: i32,
        user_id: i32,
        now: DateTime<Utc>,
        loan_period_days: i64,
    ) -> AppResult<Self> {
        let due_date = u64::try_from(loan_period_days)
            .ok()
            .and_then(|days| now.date_naive().checked_add_days(Days::new(days)))
            .ok_or_else(|| {
                AppError::Internal(format!("Invalid loan period: {} days", loan_period_days))
            })?;

        Ok(Self {
            book_id,
            user_id,
            due_date,
            created_at: now,
        })
    }

    /// The stored record once the store has assigned an id
    pub fn into_borrowing(self, id: i32) -> Borrowing {
        Borrowing {
            id,
            book_id: self.book_id,
            user_id: self.user_id,
            due_date: self.due_date,
            returned: false,
            returned_at: None,
            created_at: self.created_at,
        }
    }
}

/// Open borrowing with its book, for the profile page
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BorrowingDetails {
    pub id: i32,
    pub due_date: NaiveDate,
    pub borrowed_at: DateTime<Utc>,
    pub book: BookShort,
}
