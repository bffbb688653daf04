//! Borrow and return endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppResult, models::Borrowing, AppState};

use super::AuthenticatedUser;

/// Result of a borrow or return, with the notice to show the user
#[derive(Serialize, ToSchema)]
pub struct LendingResponse {
    pub message: String,
    pub borrowing: Borrowing,
}

/// Borrow a book
#[utoipa::path(
    post,
    path = "/books/{id}/borrow",
    tag = "lending",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 201, description = "Book borrowed", body = LendingResponse),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Book already borrowed")
    )
)]
pub async fn borrow_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<i32>,
) -> AppResult<(StatusCode, Json<LendingResponse>)> {
    let borrowing = state.services.lending.borrow(book_id, claims.user_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(LendingResponse {
            message: "You have successfully borrowed this book.".to_string(),
            borrowing,
        }),
    ))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/books/{id}/return",
    tag = "lending",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = LendingResponse),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Book not found"),
        (status = 422, description = "Book not borrowed by the caller")
    )
)]
pub async fn return_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<i32>,
) -> AppResult<Json<LendingResponse>> {
    let borrowing = state
        .services
        .lending
        .return_book(book_id, claims.user_id)
        .await?;

    Ok(Json(LendingResponse {
        message: "You have successfully returned the book.".to_string(),
        borrowing,
    }))
}
