//! Catalog service: listing and registering books

use std::collections::HashSet;

use validator::Validate;

use crate::{
    error::AppResult,
    models::{Book, BookSummary, CreateBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Every book with its borrowed flag
    pub async fn list_books(&self) -> AppResult<Vec<BookSummary>> {
        let books = self.repository.books.list().await?;
        let open: HashSet<i32> = self
            .repository
            .borrowings
            .open_book_ids()
            .await?
            .into_iter()
            .collect();

        Ok(books
            .into_iter()
            .map(|book| BookSummary {
                borrowed: open.contains(&book.id),
                book,
            })
            .collect())
    }

    /// Round-trip to the book store without reading rows
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.books.ping().await
    }

    pub async fn create_book(&self, book: CreateBook) -> AppResult<Book> {
        book.validate()?;

        let created = self.repository.books.create(&book).await?;
        tracing::info!("Catalog: added book id={} title={:?}", created.id, created.title);
        Ok(created)
    }
}
