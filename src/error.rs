use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// AppError
///
/// The application-wide error taxonomy. The recoverable variants (Validation,
/// Conflict, InvalidCredentials, Authorization, Storage) are caught at the
/// handler boundary and converted into a redirect plus a queued flash notice,
/// so the user always lands back on a sensible page. Only unanticipated
/// failures (session layer errors, storage unreachable during current-user
/// resolution) are allowed to surface through `IntoResponse` as plain HTTP
/// errors.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or mismatched required input. User-correctable.
    #[error("{0}")]
    Validation(String),

    /// Uniqueness violation, e.g. a duplicate username. Covers both the
    /// handler pre-check and the insert-time race against a concurrent
    /// registration.
    #[error("{0}")]
    Conflict(String),

    /// Login failure. One generic message for both unknown-username and
    /// wrong-password, so the response does not reveal which one it was.
    #[error("Nombre de usuario o contraseña incorrectos.")]
    InvalidCredentials,

    /// Role-gate failure.
    #[error("Acceso restringido.")]
    Authorization,

    /// Any other query or commit failure. The enclosing transaction has
    /// already been rolled back by the time this is observed.
    #[error("database failure: {0}")]
    Storage(#[from] sqlx::Error),

    /// Session store failure. Unanticipated; surfaces as a 500.
    #[error("session failure: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Password hashing failure. Practically unreachable with default Argon2
    /// parameters, but the API is fallible.
    #[error("password hashing failed: {0}")]
    Hashing(String),

    /// The view-rendering collaborator failed to produce a body.
    #[error("view rendering failed: {0}")]
    Render(String),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::Conflict(msg.into())
    }
}

impl IntoResponse for AppError {
    /// Fallback conversion for errors that escape a handler without being
    /// turned into a redirect-plus-flash. Recoverable variants degrade to
    /// their closest plain-HTTP equivalent; infrastructure failures are
    /// logged and collapse to a generic 500 body.
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(msg) | AppError::Conflict(msg) => {
                (StatusCode::BAD_REQUEST, msg).into_response()
            }
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Nombre de usuario o contraseña incorrectos.",
            )
                .into_response(),
            AppError::Authorization => {
                (StatusCode::FORBIDDEN, "Acceso restringido.").into_response()
            }
            AppError::Storage(e) => {
                tracing::error!("storage error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Error interno.").into_response()
            }
            AppError::Session(e) => {
                tracing::error!("session error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Error interno.").into_response()
            }
            AppError::Hashing(e) => {
                tracing::error!("hashing error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Error interno.").into_response()
            }
            AppError::Render(e) => {
                tracing::error!("render error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Error interno.").into_response()
            }
        }
    }
}
