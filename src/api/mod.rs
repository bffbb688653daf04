//! API handlers and router for the lending REST endpoints

pub mod auth;
pub mod books;
pub mod health;
pub mod lending;
pub mod openapi;
pub mod users;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, models::UserClaims, AppState};

/// Claims of the caller, set by [`require_authentication`]
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<UserClaims>()
            .cloned()
            .map(AuthenticatedUser)
            .ok_or_else(|| AppError::Authentication("Authentication required".to_string()))
    }
}

/// Login gate for the protected route group: validates the bearer token and
/// stores its claims in the request extensions.
pub async fn require_authentication(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(bearer)) = bearer
        .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

    let claims = state.services.users.validate_token(bearer.token())?;
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Reachable without logging in
    let public = Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/books", get(books::list_books))
        .route("/books/:id", get(books::get_book))
        .route("/books/:id/status", get(books::get_book_status));

    let protected = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/books", post(books::create_book))
        .route("/books/:id/borrow", post(lending::borrow_book))
        .route("/books/:id/return", post(lending::return_book))
        .route("/users/profile", get(users::profile))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_authentication,
        ));

    let api_v1 = public.merge(protected).with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
