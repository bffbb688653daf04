//! Lending service over the memory store: record-level effects of borrow and return

use std::sync::Arc;

use lending_server::{
    config::LendingConfig,
    models::{CreateBook, CreateUser},
    repository::{memory::MemoryStore, BookStore, Repository, UserStore},
    services::lending::LendingService,
    AppError,
};

struct Library {
    store: Arc<MemoryStore>,
    lending: LendingService,
    alice: i32,
    bob: i32,
    book: i32,
}

async fn library() -> Library {
    let store = Arc::new(MemoryStore::new());
    let repository = Repository::from_stores(store.clone(), store.clone(), store.clone());

    let mut ids = Vec::new();
    for login in ["alice", "bob"] {
        let user = UserStore::create(
            store.as_ref(),
            &CreateUser {
                login: login.to_string(),
                password: String::new(),
                display_name: None,
            },
            "unused",
        )
        .await
        .unwrap();
        ids.push(user.id);
    }
    let book = BookStore::create(
        store.as_ref(),
        &CreateBook {
            title: "Dune".to_string(),
            author: None,
            isbn: None,
            published_year: None,
        },
    )
    .await
    .unwrap();

    Library {
        lending: LendingService::new(repository, LendingConfig::default()),
        store,
        alice: ids[0],
        bob: ids[1],
        book: book.id,
    }
}

#[tokio::test]
async fn test_failed_borrow_creates_no_record() {
    let lib = library().await;

    lib.lending.borrow(lib.book, lib.alice).await.unwrap();
    let err = lib.lending.borrow(lib.book, lib.bob).await.unwrap_err();

    assert!(matches!(err, AppError::AlreadyBorrowed));
    assert_eq!(lib.store.all_borrowings().await.len(), 1);
}

#[tokio::test]
async fn test_return_flips_exactly_one_record() {
    let lib = library().await;

    let opened = lib.lending.borrow(lib.book, lib.alice).await.unwrap();
    let before = lib.store.all_borrowings().await;

    let err = lib.lending.return_book(lib.book, lib.bob).await.unwrap_err();
    assert!(matches!(err, AppError::NotBorrowedByUser));
    assert_eq!(lib.store.all_borrowings().await, before);

    let closed = lib.lending.return_book(lib.book, lib.alice).await.unwrap();
    assert_eq!(closed.id, opened.id);

    let after = lib.store.all_borrowings().await;
    assert_eq!(after.len(), 1);
    assert!(after[0].returned);
    assert_eq!(after[0].due_date, opened.due_date);
}

#[tokio::test]
async fn test_status_follows_borrow_and_return() {
    let lib = library().await;

    assert!(!lib.lending.is_borrowed(lib.book).await.unwrap());
    assert_eq!(lib.lending.current_borrower(lib.book).await.unwrap(), None);

    lib.lending.borrow(lib.book, lib.alice).await.unwrap();
    assert!(lib.lending.is_borrowed(lib.book).await.unwrap());
    let borrower = lib.lending.current_borrower(lib.book).await.unwrap().unwrap();
    assert_eq!(borrower.login, "alice");

    lib.lending.return_book(lib.book, lib.alice).await.unwrap();
    assert!(!lib.lending.is_borrowed(lib.book).await.unwrap());
    assert!(!lib.lending.book_status(lib.book).await.unwrap().borrowed);
}

#[tokio::test]
async fn test_concurrent_borrows_keep_one_open_borrowing() {
    let lib = library().await;
    let lending = lib.lending.clone();

    let tasks: Vec<_> = [lib.alice, lib.bob, lib.alice, lib.bob]
        .into_iter()
        .map(|user| {
            let lending = lending.clone();
            let book = lib.book;
            tokio::spawn(async move { lending.borrow(book, user).await })
        })
        .collect();

    let mut successes = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => successes += 1,
            Err(AppError::AlreadyBorrowed) => {}
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    assert_eq!(successes, 1);
    let open: Vec<_> = lib
        .store
        .all_borrowings()
        .await
        .into_iter()
        .filter(|b| b.is_open())
        .collect();
    assert_eq!(open.len(), 1);
}

#[tokio::test]
async fn test_open_borrowings_are_per_user() {
    let lib = library().await;

    lib.lending.borrow(lib.book, lib.alice).await.unwrap();

    let alice = lib.lending.open_borrowings(lib.alice).await.unwrap();
    assert_eq!(alice.len(), 1);
    assert_eq!(alice[0].book.title, "Dune");
    assert!(lib.lending.open_borrowings(lib.bob).await.unwrap().is_empty());
}
