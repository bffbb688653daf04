//! API tests against the in-process router

use axum::http::{Method, StatusCode};
use chrono::{Duration, NaiveDate, Utc};
use serde_json::{json, Value};

use crate::common::{app, create_book, register_and_login, send};

#[tokio::test]
async fn test_health_check() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/api/v1/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, Method::GET, "/api/v1/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_borrow_and_return_scenario() {
    let app = app();
    let alice = register_and_login(&app, "alice").await;
    let bob = register_and_login(&app, "bob").await;
    let book = create_book(&app, &alice, "Dune").await;

    // Fresh book: available
    let (status, body) = send(&app, Method::GET, &format!("/api/v1/books/{}/status", book), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "borrowed": false, "borrower": null }));

    // alice borrows it
    let (status, body) = send(&app, Method::POST, &format!("/api/v1/books/{}/borrow", book), Some(&alice), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "You have successfully borrowed this book.");
    assert_eq!(body["borrowing"]["returned"], false);
    let due: NaiveDate = serde_json::from_value(body["borrowing"]["due_date"].clone()).unwrap();
    let created: chrono::DateTime<Utc> =
        serde_json::from_value(body["borrowing"]["created_at"].clone()).unwrap();
    assert_eq!(due, created.date_naive() + Duration::days(14));

    let (_, body) = send(&app, Method::GET, &format!("/api/v1/books/{}/status", book), None, None).await;
    assert_eq!(body["borrowed"], true);
    assert_eq!(body["borrower"]["login"], "alice");

    // bob cannot borrow it
    let (status, body) = send(&app, Method::POST, &format!("/api/v1/books/{}/borrow", book), Some(&bob), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "AlreadyBorrowed");
    assert_eq!(body["message"], "This book is already borrowed.");

    // bob never borrowed it, so cannot return it
    let (status, body) = send(&app, Method::POST, &format!("/api/v1/books/{}/return", book), Some(&bob), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "NotBorrowedByUser");
    assert_eq!(body["message"], "You did not borrow this book.");

    // alice returns it
    let (status, body) = send(&app, Method::POST, &format!("/api/v1/books/{}/return", book), Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "You have successfully returned the book.");
    assert_eq!(body["borrowing"]["returned"], true);

    let (_, body) = send(&app, Method::GET, &format!("/api/v1/books/{}/status", book), None, None).await;
    assert_eq!(body, json!({ "borrowed": false, "borrower": null }));

    // Returning twice is refused
    let (status, _) = send(&app, Method::POST, &format!("/api/v1/books/{}/return", book), Some(&alice), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // Now bob can borrow it, as a new record
    let (status, body) = send(&app, Method::POST, &format!("/api/v1/books/{}/borrow", book), Some(&bob), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["borrowing"]["id"], 2);
}

#[tokio::test]
async fn test_profile_lists_open_borrowings_only() {
    let app = app();
    let alice = register_and_login(&app, "alice").await;
    let dune = create_book(&app, &alice, "Dune").await;
    let emma = create_book(&app, &alice, "Emma").await;
    create_book(&app, &alice, "Ubik").await;

    for book in [dune, emma] {
        let (status, _) = send(&app, Method::POST, &format!("/api/v1/books/{}/borrow", book), Some(&alice), None).await;
        assert_eq!(status, StatusCode::CREATED);
    }
    send(&app, Method::POST, &format!("/api/v1/books/{}/return", dune), Some(&alice), None).await;

    let (status, body) = send(&app, Method::GET, "/api/v1/users/profile", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["book"]["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Emma"]);
}

#[tokio::test]
async fn test_index_and_show_are_public() {
    let app = app();
    let alice = register_and_login(&app, "alice").await;
    let book = create_book(&app, &alice, "Dune").await;
    send(&app, Method::POST, &format!("/api/v1/books/{}/borrow", book), Some(&alice), None).await;

    let (status, body) = send(&app, Method::GET, "/api/v1/books", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["title"], "Dune");
    assert_eq!(body[0]["borrowed"], true);

    let (status, body) = send(&app, Method::GET, &format!("/api/v1/books/{}", book), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Dune");
    assert_eq!(body["status"]["borrower"]["login"], "alice");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = app();

    for (method, uri) in [
        (Method::POST, "/api/v1/books/1/borrow"),
        (Method::POST, "/api/v1/books/1/return"),
        (Method::GET, "/api/v1/users/profile"),
        (Method::GET, "/api/v1/auth/me"),
    ] {
        let (status, body) = send(&app, method.clone(), uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {}", method, uri);
        assert_eq!(body["error"], "NotAuthorized");

        let (status, _) = send(&app, method.clone(), uri, Some("not-a-jwt"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {}", method, uri);
    }

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/books",
        None,
        Some(json!({ "title": "Dune" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_book_is_not_found() {
    let app = app();
    let alice = register_and_login(&app, "alice").await;

    for (method, uri, token) in [
        (Method::GET, "/api/v1/books/99", None),
        (Method::GET, "/api/v1/books/99/status", None),
        (Method::POST, "/api/v1/books/99/borrow", Some(alice.as_str())),
        (Method::POST, "/api/v1/books/99/return", Some(alice.as_str())),
    ] {
        let (status, body) = send(&app, method, uri, token, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(body["error"], "NoSuchBook");
    }
}

#[tokio::test]
async fn test_me_and_login_errors() {
    let app = app();
    let alice = register_and_login(&app, "alice").await;

    let (status, body) = send(&app, Method::GET, "/api/v1/auth/me", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["login"], "alice");
    assert!(body.get("password_hash").is_none());

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "login": "alice", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body): (StatusCode, Value) = send(
        &app,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({ "login": "ALICE", "password": "another password" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Duplicate");
}

#[tokio::test]
async fn test_create_book_validation() {
    let app = app();
    let alice = register_and_login(&app, "alice").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/books",
        Some(&alice),
        Some(json!({ "title": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");
}
