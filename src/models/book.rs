//! Book (catalogue entry) model and borrow status projection

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::borrowing::Borrowing;
use super::user::UserShort;

/// Book model from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub published_year: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Short book representation for lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BookShort {
    pub id: i32,
    pub title: String,
    pub author: Option<String>,
}

impl From<&Book> for BookShort {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
            author: book.author.clone(),
        }
    }
}

/// Catalogue row: a book and whether it is out on loan
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookSummary {
    #[serde(flatten)]
    pub book: Book,
    pub borrowed: bool,
}

/// Derived borrow status of a book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BookStatus {
    pub borrowed: bool,
    pub borrower: Option<UserShort>,
}

impl BookStatus {
    pub fn available() -> Self {
        Self {
            borrowed: false,
            borrower: None,
        }
    }

    /// Status given the book's open borrowing and its user, when that user resolves.
    ///
    /// A borrowing that is already returned does not make the book borrowed.
    pub fn from_open_borrowing(borrowing: &Borrowing, borrower: Option<UserShort>) -> Self {
        if borrowing.is_open() {
            Self {
                borrowed: true,
                borrower,
            }
        } else {
            Self::available()
        }
    }
}

/// Book with its current status, for the show page
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookDetails {
    #[serde(flatten)]
    pub book: Book,
    pub status: BookStatus,
}

/// Create book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 512))]
    pub title: String,
    #[validate(length(max = 256))]
    pub author: Option<String>,
    #[validate(length(min = 10, max = 17))]
    pub isbn: Option<String>,
    #[validate(range(min = 1, max = 9999))]
    pub published_year: Option<i32>,
}
