//! User profile endpoint

use axum::{extract::State, Json};

use crate::{error::AppResult, models::BorrowingDetails, AppState};

use super::AuthenticatedUser;

/// Books the caller currently has out on loan
#[utoipa::path(
    get,
    path = "/users/profile",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Open borrowings of the caller", body = Vec<BorrowingDetails>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn profile(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<BorrowingDetails>>> {
    let borrowings = state.services.lending.open_borrowings(claims.user_id).await?;
    Ok(Json(borrowings))
}
