use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tokio::task;

use crate::{
    AppState,
    error::AppError,
    models::User,
    repository::RepositoryState,
    session::{SessionHandle, Severity},
};

// Role strings. Coarse string equality is the entire authorization model.
pub const ROLE_USER: &str = "usuario";
pub const ROLE_ADMIN: &str = "admin";

// --- Password Hasher ---

/// hash_password
///
/// Produces a salted, non-reversible Argon2id digest in PHC string format.
/// Tolerates empty and arbitrary-length input. CPU-bound: callers on the async
/// runtime should wrap this in `spawn_blocking` (the register operation does).
pub fn hash_password(plaintext: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let digest = Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|e| AppError::Hashing(e.to_string()))?;
    Ok(digest.to_string())
}

/// verify_password
///
/// Reports whether a plaintext matches a previously produced digest. A
/// malformed digest verifies as false; no failure is observable to the caller.
pub fn verify_password(digest: &str, plaintext: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(digest) else {
        return false;
    };
    Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok()
}

// --- Authentication Operations ---

/// register
///
/// Validates the registration input, pre-checks username availability, and
/// inserts the new user with a hashed password. Returns the new user's id.
///
/// The pre-check leaves a race window: two concurrent registrations with the
/// same username can both pass it, in which case the losing insert hits the
/// unique constraint and comes back as the same recoverable `Conflict`.
pub async fn register(
    repo: &RepositoryState,
    username: &str,
    password: &str,
    confirm_password: &str,
) -> Result<i32, AppError> {
    if username.is_empty() || password.is_empty() || confirm_password.is_empty() {
        return Err(AppError::validation("Todos los campos son obligatorios."));
    }
    if password != confirm_password {
        return Err(AppError::validation("Las contraseñas no coinciden."));
    }
    if repo.get_user_by_username(username).await?.is_some() {
        return Err(AppError::conflict("El nombre de usuario ya existe."));
    }

    // Argon2 is CPU-intensive; run it off the async runtime.
    let plaintext = password.to_owned();
    let digest = task::spawn_blocking(move || hash_password(&plaintext))
        .await
        .map_err(|e| AppError::Hashing(e.to_string()))??;

    let user = repo.create_user(username, &digest).await?;
    Ok(user.id)
}

/// login
///
/// Resolves the username and verifies the password. Unknown username and wrong
/// password collapse into the same `InvalidCredentials` so the response does
/// not reveal which half failed. Establishing the session binding is the
/// handler's job; this operation only authenticates.
pub async fn login(
    repo: &RepositoryState,
    username: &str,
    password: &str,
) -> Result<User, AppError> {
    if username.is_empty() || password.is_empty() {
        return Err(AppError::validation(
            "Nombre de usuario y contraseña son obligatorios.",
        ));
    }

    let Some(user) = repo.get_user_by_username(username).await? else {
        return Err(AppError::InvalidCredentials);
    };

    let digest = user.password_hash.clone();
    let plaintext = password.to_owned();
    let is_valid = task::spawn_blocking(move || verify_password(&digest, &plaintext))
        .await
        .map_err(|e| AppError::Hashing(e.to_string()))?;

    if is_valid {
        Ok(user)
    } else {
        Err(AppError::InvalidCredentials)
    }
}

// --- Current-User Resolution ---

/// resolve_current_user
///
/// The per-request resolver: looks up the session's stored user id in the
/// repository and returns the matching user, if any. Called once per use; the
/// result is never cached across requests and never stored in any process-wide
/// slot. A session pointing at a deleted user resolves to None.
pub async fn resolve_current_user(
    repo: &RepositoryState,
    session: &SessionHandle,
) -> Result<Option<User>, AppError> {
    match session.user_id().await? {
        Some(id) => repo.get_user(id).await,
        None => Ok(None),
    }
}

/// CurrentUser Extractor Result
///
/// The resolved identity of an authenticated request, threaded explicitly into
/// each handler that needs it.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// CurrentUser Extractor Implementation
///
/// Implements Axum's FromRequestParts trait, making CurrentUser usable as a
/// function argument in any authenticated handler. An anonymous session, or a
/// session whose user no longer exists, short-circuits with a redirect to the
/// login page and a queued notice; the handler body never executes.
///
/// Rejection is a full `Response` so the redirect-plus-flash outcome can be
/// produced directly from the extractor.
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let session = SessionHandle::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        match resolve_current_user(&repo, &session).await {
            Ok(Some(user)) => Ok(CurrentUser(user)),
            Ok(None) => {
                let _ = session
                    .flash(Severity::Warning, "Debes iniciar sesión para continuar.")
                    .await;
                Err(Redirect::to("/login").into_response())
            }
            // Storage unreachable while resolving the user is the one case
            // allowed to surface as an unhandled failure.
            Err(err) => Err(err.into_response()),
        }
    }
}

// --- Role Guard ---

/// require_role
///
/// The role gate: resolves the current session's user and compares its role
/// string against the required one. On any mismatch (anonymous session, stale
/// user id, wrong role) the wrapped handler never runs; the request
/// short-circuits to the login page with the supplied notice.
pub async fn require_role(
    role: &str,
    notice: &str,
    repo: &RepositoryState,
    session: &SessionHandle,
    request: Request,
    next: Next,
) -> Response {
    match resolve_current_user(repo, session).await {
        Ok(Some(user)) if user.rol == role => next.run(request).await,
        Ok(_) => {
            let _ = session.flash(Severity::Danger, notice).await;
            Redirect::to("/login").into_response()
        }
        Err(err) => err.into_response(),
    }
}

/// require_admin
///
/// Middleware form of the role gate for the `/admin` router layer.
pub async fn require_admin(
    State(state): State<AppState>,
    session: SessionHandle,
    request: Request,
    next: Next,
) -> Response {
    require_role(
        ROLE_ADMIN,
        "Acceso restringido a administradores.",
        &state.repo,
        &session,
        request,
        next,
    )
    .await
}
