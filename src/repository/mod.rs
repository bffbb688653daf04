//! Repository layer for database operations
//!
//! Services talk to the store traits below. `Repository::new` wires the Postgres
//! implementations; `Repository::in_memory` wires a single [`memory::MemoryStore`]
//! behind all three traits.

pub mod books;
pub mod borrowings;
pub mod memory;
pub mod users;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{Book, Borrowing, BorrowingDetails, CreateBook, CreateUser, NewBorrowing, User},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    /// All books, ordered by id
    async fn list(&self) -> AppResult<Vec<Book>>;

    /// Book by id, `BookNotFound` when absent
    async fn get_by_id(&self, id: i32) -> AppResult<Book>;

    async fn create(&self, book: &CreateBook) -> AppResult<Book>;

    /// Cheapest round-trip that proves the store answers
    async fn ping(&self) -> AppResult<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BorrowingStore: Send + Sync {
    /// Whether the book has an open (unreturned) borrowing
    async fn has_open_for_book(&self, book_id: i32) -> AppResult<bool>;

    /// The book's open borrowing, earliest first if several exist
    async fn open_for_book(&self, book_id: i32) -> AppResult<Option<Borrowing>>;

    /// Ids of every book currently out on loan
    async fn open_book_ids(&self) -> AppResult<Vec<i32>>;

    /// Insert an open borrowing unless the book already has one.
    ///
    /// Returns `None` when another open borrowing exists for the book. Check and
    /// insert are atomic.
    async fn create_open(&self, borrowing: &NewBorrowing) -> AppResult<Option<Borrowing>>;

    /// Flip the user's open borrowing of the book to returned.
    ///
    /// Returns `None` when the user has no open borrowing of that book.
    async fn close_open(
        &self,
        user_id: i32,
        book_id: i32,
        returned_at: DateTime<Utc>,
    ) -> AppResult<Option<Borrowing>>;

    /// The user's open borrowings joined with their books
    async fn open_for_user(&self, user_id: i32) -> AppResult<Vec<BorrowingDetails>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// User by id, `UserNotFound` when absent
    async fn get_by_id(&self, id: i32) -> AppResult<User>;

    /// Case-insensitive lookup by login
    async fn get_by_login(&self, login: &str) -> AppResult<Option<User>>;

    /// Insert a user, `Conflict` when the login is taken
    async fn create(&self, user: &CreateUser, password_hash: &str) -> AppResult<User>;
}

/// Main repository struct holding one store per entity
#[derive(Clone)]
pub struct Repository {
    pub books: Arc<dyn BookStore>,
    pub borrowings: Arc<dyn BorrowingStore>,
    pub users: Arc<dyn UserStore>,
}

impl Repository {
    /// Create a Postgres-backed repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: Arc::new(books::BooksRepository::new(pool.clone())),
            borrowings: Arc::new(borrowings::BorrowingsRepository::new(pool.clone())),
            users: Arc::new(users::UsersRepository::new(pool)),
        }
    }

    /// Create a repository backed by process memory
    pub fn in_memory() -> Self {
        let store = memory::MemoryStore::default();
        Self {
            books: Arc::new(store.clone()),
            borrowings: Arc::new(store.clone()),
            users: Arc::new(store),
        }
    }

    pub fn from_stores(
        books: Arc<dyn BookStore>,
        borrowings: Arc<dyn BorrowingStore>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        Self {
            books,
            borrowings,
            users,
        }
    }
}
