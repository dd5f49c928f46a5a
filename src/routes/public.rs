use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Defines endpoints that are accessible to any client, anonymous or logged
/// in. The registration and login pages additionally bounce already
/// authenticated sessions to their post-login destinations inside the
/// handlers.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // A simple, unauthenticated endpoint used for monitoring and load balancer checks.
        .route("/health", get(|| async { "ok" }))
        // GET /
        // Landing page. Renders with the resolved current user (or null).
        .route("/", get(handlers::inicio))
        // GET/POST /registro
        // Account creation form and submission. Logged-in sessions are
        // redirected to /usuarios instead.
        .route(
            "/registro",
            get(handlers::registro_form).post(handlers::registro_submit),
        )
        // GET/POST /login
        // Session establishment. Logged-in sessions are redirected to /.
        .route(
            "/login",
            get(handlers::login_form).post(handlers::login_submit),
        )
        // GET /logout
        // Clears the session binding; safe to call when not logged in.
        .route("/logout", get(handlers::logout))
        // GET /usuarios
        // Read-only listing of every registered user. Deliberately public.
        .route("/usuarios", get(handlers::listar_usuarios))
}
