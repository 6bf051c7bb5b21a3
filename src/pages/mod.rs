//! Server-rendered pages
//!
//! HTML handlers for the protected home page. The auth gate sits in
//! front of every route here; unauthenticated requests are redirected
//! before any handler runs.

mod home;

pub use home::{ALL_DONE_MESSAGE, LOGOUT_PATH, render_home};

use axum::{Router, middleware, routing::get};

use crate::AppState;
use crate::auth::require_session;

/// Create the protected pages router
pub fn pages_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(home::home_page))
        .layer(middleware::from_fn_with_state(state, require_session))
}
