//! Identity provider OAuth flow
//!
//! Implements the OAuth 2.0 authorization code flow against an
//! Auth0-style provider tenant.

use axum::{
    Router,
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect},
    routing::get,
};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use serde::Deserialize;

use super::middleware::SESSION_COOKIE;
use super::session::{Session, create_session_token};
use crate::AppState;
use crate::error::AppError;

/// Name of the short-lived CSRF state cookie
const STATE_COOKIE: &str = "oauth_state";

/// Create authentication router
///
/// Routes:
/// - GET /login - Login page
/// - GET /auth/login - Redirect to the identity provider
/// - GET /auth/callback - OAuth callback
/// - GET /auth/logout - Logout
pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page))
        .route("/auth/login", get(provider_redirect))
        .route("/auth/callback", get(provider_callback))
        .route("/auth/logout", get(logout))
}

// =============================================================================
// Login Page
// =============================================================================

/// GET /login
///
/// Renders a simple login page with a sign-in link.
async fn login_page(State(state): State<AppState>) -> impl IntoResponse {
    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Login - {title}</title></head>
<body>
    <h1>{title}</h1>
    <p>Please sign in to see your todos</p>
    <a href="/auth/login">Sign in</a>
</body>
</html>
"#,
        title = html_escape::encode_text(&state.config.page.title),
    ))
}

// =============================================================================
// Provider OAuth
// =============================================================================

/// GET /auth/login
///
/// Redirects the visitor to the provider's authorization page.
///
/// # Steps
/// 1. Generate CSRF state token
/// 2. Store state in cookie
/// 3. Redirect to provider with client_id, redirect_uri, scope, state
async fn provider_redirect(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let csrf_state = generate_csrf_state();

    let authorize_url = format!(
        "{}?response_type=code&client_id={}&redirect_uri={}&scope={}&state={}",
        state.config.auth.provider.authorize_url(),
        urlencoding::encode(&state.config.auth.provider.client_id),
        urlencoding::encode(&callback_url(&state)),
        urlencoding::encode("openid profile"),
        urlencoding::encode(&csrf_state),
    );

    let mut cookie = Cookie::new(STATE_COOKIE, csrf_state);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_secure(state.config.should_use_secure_cookies());

    Ok((jar.add(cookie), Redirect::to(&authorize_url)))
}

/// Query parameters from the provider callback
#[derive(Debug, Deserialize)]
struct CallbackQuery {
    /// Authorization code
    code: String,
    /// CSRF state token
    state: String,
}

/// Provider token response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Provider userinfo response
#[derive(Debug, Deserialize)]
struct UserInfo {
    sub: String,
    name: Option<String>,
    nickname: Option<String>,
}

impl UserInfo {
    /// Display name, falling back through nickname to the subject
    fn display_name(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.nickname.clone())
            .unwrap_or_else(|| self.sub.clone())
    }
}

/// GET /auth/callback
///
/// Handles the OAuth callback from the provider.
///
/// # Steps
/// 1. Verify CSRF state
/// 2. Exchange code for access token
/// 3. Fetch user info from the provider
/// 4. Create session and set cookie
/// 5. Redirect to home
async fn provider_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    verify_csrf_state(&query.state, &jar)?;

    let access_token = exchange_code(&state, &query.code).await?;
    let userinfo = fetch_userinfo(&state, &access_token).await?;

    tracing::info!(subject = %userinfo.sub, "Visitor authenticated");

    let session = Session::new(
        userinfo.sub.clone(),
        userinfo.display_name(),
        state.config.auth.session_max_age,
    );
    let token = create_session_token(&session, &state.config.auth.session_secret)?;

    let mut session_cookie = Cookie::new(SESSION_COOKIE, token);
    session_cookie.set_path("/");
    session_cookie.set_http_only(true);
    session_cookie.set_same_site(SameSite::Lax);
    session_cookie.set_secure(state.config.should_use_secure_cookies());

    let jar = jar.remove(removal_cookie(STATE_COOKIE)).add(session_cookie);

    Ok((jar, Redirect::to("/")))
}

/// Exchange an authorization code for an access token
async fn exchange_code(state: &AppState, code: &str) -> Result<String, AppError> {
    let redirect_uri = callback_url(state);
    let params = [
        ("grant_type", "authorization_code"),
        ("client_id", state.config.auth.provider.client_id.as_str()),
        (
            "client_secret",
            state.config.auth.provider.client_secret.as_str(),
        ),
        ("code", code),
        ("redirect_uri", redirect_uri.as_str()),
    ];

    let response = state
        .http_client
        .post(state.config.auth.provider.token_url())
        .form(&params)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(AppError::Provider(format!(
            "token exchange failed with status {}",
            response.status()
        )));
    }

    let token: TokenResponse = response.json().await?;
    Ok(token.access_token)
}

/// Fetch the authenticated user's profile from the provider
async fn fetch_userinfo(state: &AppState, access_token: &str) -> Result<UserInfo, AppError> {
    let response = state
        .http_client
        .get(state.config.auth.provider.userinfo_url())
        .bearer_auth(access_token)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(AppError::Provider(format!(
            "userinfo request failed with status {}",
            response.status()
        )));
    }

    Ok(response.json().await?)
}

// =============================================================================
// Logout
// =============================================================================

/// GET /auth/logout
///
/// Clears session cookies and redirects to the provider's logout
/// endpoint, which in turn sends the visitor back to our login page.
async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let jar = jar
        .remove(removal_cookie(SESSION_COOKIE))
        .remove(removal_cookie(STATE_COOKIE));

    let return_to = format!("{}/login", state.config.server.base_url());
    let logout_url = format!(
        "{}?client_id={}&returnTo={}",
        state.config.auth.provider.logout_url(),
        urlencoding::encode(&state.config.auth.provider.client_id),
        urlencoding::encode(&return_to),
    );

    (jar, Redirect::to(&logout_url))
}

// =============================================================================
// Helpers
// =============================================================================

/// Cookie removal must match the path the cookie was set with
fn removal_cookie(name: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::from(name);
    cookie.set_path("/");
    cookie
}

fn callback_url(state: &AppState) -> String {
    format!("{}/auth/callback", state.config.server.base_url())
}

/// Generate a random CSRF state token
fn generate_csrf_state() -> String {
    use rand::Rng;
    use rand::distributions::Alphanumeric;

    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Verify CSRF state from cookie matches callback state
fn verify_csrf_state(state: &str, jar: &CookieJar) -> Result<(), AppError> {
    let cookie_state = jar.get(STATE_COOKIE).ok_or(AppError::Unauthorized)?;
    if cookie_state.value() != state {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}
