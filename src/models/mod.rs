//! Data models for the lending server

pub mod book;
pub mod borrowing;
pub mod user;

// Re-export commonly used types
pub use book::{Book, BookDetails, BookShort, BookStatus, BookSummary, CreateBook};
pub use borrowing::{Borrowing, BorrowingDetails, BorrowingState, NewBorrowing};
pub use user::{CreateUser, User, UserClaims, UserShort};
