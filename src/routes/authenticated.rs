use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Authenticated Router Module
///
/// Defines the routes that require a session bound to an existing user.
///
/// Access Control Strategy:
/// Every handler in this module relies on the authentication middleware layer
/// installed above this router, plus the `CurrentUser` extractor that resolves
/// the session's user id against the repository once per request. An anonymous
/// or stale session is redirected to /login with a notice before any handler
/// body runs.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET/POST /nuevo_habito
        // Shows the habit-creation form with the user's habits; the POST
        // creates one habit plus its join-row association in one transaction.
        .route(
            "/nuevo_habito",
            get(handlers::nuevo_habito_form).post(handlers::nuevo_habito_submit),
        )
        // GET/POST /registrar_seguimiento
        // Shows the tracking form with the user's habits and prior entries;
        // the POST inserts one tracking entry unconditionally.
        .route(
            "/registrar_seguimiento",
            get(handlers::registrar_seguimiento_form).post(handlers::registrar_seguimiento_submit),
        )
}
