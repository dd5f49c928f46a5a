use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Admin Router Module
///
/// Defines the routes exclusively accessible to users with the 'admin' role.
///
/// Access Control:
/// This entire router is wrapped in the `require_admin` middleware layer,
/// which resolves the session's user and checks `rol == "admin"` before the
/// request can reach a handler. Any other outcome redirects to the login page
/// with a notice and the handler never executes.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin/dashboard
        // The aggregate read-only view: every user, habit and tracking entry,
        // unfiltered and unpaginated.
        .route("/dashboard", get(handlers::admin_dashboard))
}
