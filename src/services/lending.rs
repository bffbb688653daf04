//! Lending service: borrowing and returning books
//!
//! A book is borrowed while it has an open borrowing (`returned = false`).
//! Borrowing creates one; returning flips the acting user's open borrowing of
//! that book to returned. Returned borrowings are kept as history.

use chrono::Utc;

use crate::{
    config::LendingConfig,
    error::{AppError, AppResult},
    models::{BookDetails, BookStatus, Borrowing, BorrowingDetails, NewBorrowing, UserShort},
    repository::Repository,
};

#[derive(Clone)]
pub struct LendingService {
    repository: Repository,
    config: LendingConfig,
}

impl LendingService {
    pub fn new(repository: Repository, config: LendingConfig) -> Self {
        Self { repository, config }
    }

    /// Borrow a book for a user.
    ///
    /// Fails with `AlreadyBorrowed` when the book has an open borrowing, including
    /// one opened concurrently between the check and the insert.
    pub async fn borrow(&self, book_id: i32, user_id: i32) -> AppResult<Borrowing> {
        let book = self.repository.books.get_by_id(book_id).await?;

        if self.repository.borrowings.has_open_for_book(book.id).await? {
            return Err(AppError::AlreadyBorrowed);
        }

        let new = NewBorrowing::open(book.id, user_id, Utc::now(), self.config.loan_period_days)?;
        let borrowing = self
            .repository
            .borrowings
            .create_open(&new)
            .await?
            .ok_or(AppError::AlreadyBorrowed)?;

        tracing::info!(
            "Lending: user {} borrowed book {} (borrowing {}, due {})",
            user_id,
            book.id,
            borrowing.id,
            borrowing.due_date
        );
        Ok(borrowing)
    }

    /// Return a book the user has borrowed
    pub async fn return_book(&self, book_id: i32, user_id: i32) -> AppResult<Borrowing> {
        self.repository.books.get_by_id(book_id).await?;

        let borrowing = self
            .repository
            .borrowings
            .close_open(user_id, book_id, Utc::now())
            .await?
            .ok_or(AppError::NotBorrowedByUser)?;

        tracing::info!(
            "Lending: user {} returned book {} (borrowing {})",
            user_id,
            book_id,
            borrowing.id
        );
        Ok(borrowing)
    }

    pub async fn is_borrowed(&self, book_id: i32) -> AppResult<bool> {
        self.repository.borrowings.has_open_for_book(book_id).await
    }

    pub async fn current_borrower(&self, book_id: i32) -> AppResult<Option<UserShort>> {
        Ok(self.status_of(book_id).await?.borrower)
    }

    /// Borrow status of an existing book
    pub async fn book_status(&self, book_id: i32) -> AppResult<BookStatus> {
        self.repository.books.get_by_id(book_id).await?;
        self.status_of(book_id).await
    }

    /// Book with its borrow status
    pub async fn book_details(&self, book_id: i32) -> AppResult<BookDetails> {
        let book = self.repository.books.get_by_id(book_id).await?;
        let status = self.status_of(book.id).await?;
        Ok(BookDetails { book, status })
    }

    /// The user's open borrowings
    pub async fn open_borrowings(&self, user_id: i32) -> AppResult<Vec<BorrowingDetails>> {
        self.repository.borrowings.open_for_user(user_id).await
    }

    /// A borrowing whose user no longer resolves still marks the book borrowed,
    /// with no borrower to show.
    async fn status_of(&self, book_id: i32) -> AppResult<BookStatus> {
        let Some(borrowing) = self.repository.borrowings.open_for_book(book_id).await? else {
            return Ok(BookStatus::available());
        };

        let borrower = match self.repository.users.get_by_id(borrowing.user_id).await {
            Ok(user) => Some(UserShort::from(&user)),
            Err(AppError::UserNotFound(user_id)) => {
                tracing::warn!(
                    "Lending: borrowing {} of book {} references missing user {}",
                    borrowing.id,
                    book_id,
                    user_id
                );
                None
            }
            Err(e) => return Err(e),
        };

        Ok(BookStatus::from_open_borrowing(&borrowing, borrower))
    }
}
