//! Home page
//!
//! The single protected page: greets the visitor and, when the todo
//! variant is enabled, shows every todo read from the store.

use axum::{
    extract::State,
    response::{Html, IntoResponse},
};

use crate::AppState;
use crate::auth::CurrentUser;
use crate::data::{Todo, User};
use crate::error::AppError;

/// Fixed logout path linked from every rendered page
pub const LOGOUT_PATH: &str = "/auth/logout";

/// Message shown when the todo list is empty
pub const ALL_DONE_MESSAGE: &str = "You have completed all todos!";

/// GET /
///
/// Requires an authenticated session (enforced by `require_session`
/// upstream, never reached otherwise). Fetches the todo snapshot when
/// the variant with todos is enabled, then renders.
///
/// A failing fetch surfaces as a 500 instead of masquerading as an
/// empty list.
pub async fn home_page(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let user = session.user();

    let todos = if state.config.page.show_todos {
        Some(state.db.list_todos().await?)
    } else {
        None
    };

    Ok(Html(render_home(
        &state.config.page.title,
        &user,
        todos.as_deref(),
    )))
}

/// Render the home page markup
///
/// Pure function of the visitor and an optional todo snapshot.
/// `todos = None` is the variant without a todo section at all;
/// `Some(&[])` renders the all-done message.
pub fn render_home(title: &str, user: &User, todos: Option<&[Todo]>) -> String {
    let mut body = String::new();

    body.push_str(&format!(
        r#"    <p class="greeting">Welcome {}! <a href="{}">Logout</a></p>
"#,
        html_escape::encode_text(&user.name),
        LOGOUT_PATH,
    ));

    if let Some(todos) = todos {
        if todos.is_empty() {
            body.push_str(&format!(
                r#"    <p class="all-done">{}</p>
"#,
                ALL_DONE_MESSAGE,
            ));
        } else {
            body.push_str("    <ul class=\"todos\">\n");
            for todo in todos {
                body.push_str(&format!(
                    r#"        <li class="todo">{}</li>
"#,
                    html_escape::encode_text(&todo.content),
                ));
            }
            body.push_str("    </ul>\n");
        }
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>{}</title></head>
<body>
{}</body>
</html>
"#,
        html_escape::encode_text(title),
        body,
    )
}
