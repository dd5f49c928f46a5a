use crate::{
    AppState,
    auth::{self, CurrentUser},
    error::AppError,
    models::{HabitForm, LoginForm, NewTrackingEntry, RegisterForm, TrackingForm},
    session::{SessionHandle, Severity},
    views::ViewContext,
};
use axum::{
    extract::{Form, State},
    response::{Html, IntoResponse, Redirect, Response},
};

/// render
///
/// Shared terminal step for every handler that produces a page: drains the
/// one-shot flash queue into the context and hands the named view plus its
/// data mapping to the view-rendering collaborator.
async fn render(
    state: &AppState,
    session: &SessionHandle,
    view: &str,
    mut ctx: ViewContext,
) -> Result<Response, AppError> {
    let flashes = session.take_flashes().await?;
    ctx.insert("flashes", &flashes);
    let body = state.views.render(view, &ctx).map_err(AppError::Render)?;
    Ok(Html(body).into_response())
}

// --- Public Pages ---

/// inicio
///
/// [Public Route] Landing page. The current user, if any, is resolved once for
/// this request and passed to the view; anonymous visitors get a null value.
pub async fn inicio(
    State(state): State<AppState>,
    session: SessionHandle,
) -> Result<Response, AppError> {
    let current_user = auth::resolve_current_user(&state.repo, &session).await?;
    let ctx = ViewContext::new().with("current_user", &current_user);
    render(&state, &session, "base", ctx).await
}

/// listar_usuarios
///
/// [Public Route] Lists every registered user. Read-only and unauthenticated.
pub async fn listar_usuarios(
    State(state): State<AppState>,
    session: SessionHandle,
) -> Result<Response, AppError> {
    let usuarios = state.repo.list_users().await?;
    let ctx = ViewContext::new().with("usuarios", &usuarios);
    render(&state, &session, "usuarios", ctx).await
}

// --- Registration ---

/// registro_form
///
/// [Public Route] Shows the registration form. An already-authenticated
/// session is bounced to the user listing instead.
pub async fn registro_form(
    State(state): State<AppState>,
    session: SessionHandle,
) -> Result<Response, AppError> {
    if session.user_id().await?.is_some() {
        return Ok(Redirect::to("/usuarios").into_response());
    }
    render(&state, &session, "registro", ViewContext::new()).await
}

/// registro_submit
///
/// [Public Route] Creates a new account.
///
/// Every recoverable failure is converted here into a queued flash notice plus
/// a redirect back to the form: empty fields and password mismatch as
/// validation, a taken username (whether caught by the pre-check or by the
/// unique constraint at commit time) as a conflict, and any other commit
/// failure as a generic error with the original input discarded.
pub async fn registro_submit(
    State(state): State<AppState>,
    session: SessionHandle,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    if session.user_id().await?.is_some() {
        return Ok(Redirect::to("/usuarios").into_response());
    }

    let confirm = form.confirm_password.as_deref().unwrap_or("");
    match auth::register(&state.repo, &form.usuario, &form.password, confirm).await {
        Ok(_) => {
            session
                .flash(
                    Severity::Success,
                    "Cuenta creada exitosamente. Por favor, inicia sesión.",
                )
                .await?;
            Ok(Redirect::to("/login").into_response())
        }
        Err(AppError::Validation(msg)) => {
            session.flash(Severity::Danger, msg).await?;
            Ok(Redirect::to("/registro").into_response())
        }
        Err(AppError::Conflict(msg)) => {
            session.flash(Severity::Warning, msg).await?;
            Ok(Redirect::to("/registro").into_response())
        }
        Err(AppError::Storage(err)) => {
            tracing::error!("account creation failed: {:?}", err);
            session
                .flash(Severity::Danger, format!("Error al crear la cuenta: {err}"))
                .await?;
            Ok(Redirect::to("/registro").into_response())
        }
        Err(other) => Err(other),
    }
}

// --- Session Lifecycle ---

/// login_form
///
/// [Public Route] Shows the login form; authenticated sessions are bounced to
/// the landing page.
pub async fn login_form(
    State(state): State<AppState>,
    session: SessionHandle,
) -> Result<Response, AppError> {
    if session.user_id().await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    render(&state, &session, "login", ViewContext::new()).await
}

/// login_submit
///
/// [Public Route] Establishes the session binding on success. Unknown username
/// and wrong password produce the same generic notice; the failed request
/// leaves the session exactly as it was.
pub async fn login_submit(
    State(state): State<AppState>,
    session: SessionHandle,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    if session.user_id().await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let username = form.username.as_deref().unwrap_or("");
    let password = form.password.as_deref().unwrap_or("");
    match auth::login(&state.repo, username, password).await {
        Ok(user) => {
            session.bind_user(user.id, &user.username).await?;
            session
                .flash(Severity::Success, "Inicio de sesión exitoso!")
                .await?;
            Ok(Redirect::to("/").into_response())
        }
        Err(AppError::Validation(msg)) => {
            session.flash(Severity::Danger, msg).await?;
            Ok(Redirect::to("/login").into_response())
        }
        Err(err @ AppError::InvalidCredentials) => {
            session.flash(Severity::Danger, err.to_string()).await?;
            Ok(Redirect::to("/login").into_response())
        }
        Err(other) => Err(other),
    }
}

/// logout
///
/// [Public Route] Clears the session binding unconditionally. Idempotent:
/// logging out of an anonymous session is a no-op, not an error.
pub async fn logout(session: SessionHandle) -> Result<Response, AppError> {
    session.clear_user().await?;
    session.flash(Severity::Info, "Has cerrado sesión.").await?;
    Ok(Redirect::to("/login").into_response())
}

// --- Habit Management ---

/// nuevo_habito_form
///
/// [Authenticated Route] Shows the habit-creation form together with the
/// habits already associated with the acting user.
pub async fn nuevo_habito_form(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    session: SessionHandle,
) -> Result<Response, AppError> {
    let habitos_usuario = state.repo.list_habits_for_user(user.id).await?;
    let ctx = ViewContext::new()
        .with("habitos_usuario", &habitos_usuario)
        .with("current_user", &user);
    render(&state, &session, "nuevo_habito", ctx).await
}

/// nuevo_habito_submit
///
/// [Authenticated Route] Creates a habit and associates it with the acting
/// user in one transaction, then returns to the habit listing.
///
/// A request missing `nombre` or `descripcion` never reaches this body: the
/// form extractor rejects it without a friendly message. Empty-but-present
/// values are stored as-is.
pub async fn nuevo_habito_submit(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    session: SessionHandle,
    Form(form): Form<HabitForm>,
) -> Result<Response, AppError> {
    match state
        .repo
        .create_habit_for_user(user.id, &form.nombre, &form.descripcion)
        .await
    {
        Ok(habit) => {
            tracing::debug!(habit_id = habit.id, user_id = user.id, "habit created");
            Ok(Redirect::to("/nuevo_habito").into_response())
        }
        Err(AppError::Storage(err)) => {
            tracing::error!("habit creation failed: {:?}", err);
            session
                .flash(Severity::Danger, "No se pudo crear el hábito.")
                .await?;
            Ok(Redirect::to("/nuevo_habito").into_response())
        }
        Err(other) => Err(other),
    }
}

// --- Tracking ---

/// registrar_seguimiento_form
///
/// [Authenticated Route] Shows the tracking form: the user's habits to choose
/// from and every entry the user has recorded so far.
pub async fn registrar_seguimiento_form(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    session: SessionHandle,
) -> Result<Response, AppError> {
    let habitos = state.repo.list_habits_for_user(user.id).await?;
    let seguimientos = state.repo.list_tracking_for_user(user.id).await?;
    let ctx = ViewContext::new()
        .with("usuario", &user)
        .with("habitos", &habitos)
        .with("seguimientos", &seguimientos)
        .with("current_user", &user);
    render(&state, &session, "registrar_seguimiento", ctx).await
}

/// registrar_seguimiento_submit
///
/// [Authenticated Route] Records one day's completion status.
///
/// The submitted habit_id is inserted without checking the user/habit
/// association, and nothing prevents a second entry for the same day. Both are
/// part of the documented contract; the form only offers the user's own
/// habits, but the handler does not re-validate.
pub async fn registrar_seguimiento_submit(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    session: SessionHandle,
    Form(form): Form<TrackingForm>,
) -> Result<Response, AppError> {
    let entry = NewTrackingEntry {
        user_id: user.id,
        habit_id: form.habit_id,
        fecha: form.fecha,
        cumplido: form.is_cumplido(),
    };
    match state.repo.create_tracking_entry(entry).await {
        Ok(_) => Ok(Redirect::to("/registrar_seguimiento").into_response()),
        Err(AppError::Storage(err)) => {
            tracing::error!("tracking insert failed: {:?}", err);
            session
                .flash(Severity::Danger, "No se pudo registrar el seguimiento.")
                .await?;
            Ok(Redirect::to("/registrar_seguimiento").into_response())
        }
        Err(other) => Err(other),
    }
}

// --- Admin ---

/// admin_dashboard
///
/// [Admin Route] The full, unfiltered aggregate view: every user, habit and
/// tracking entry, with no ordering or pagination. Intended for small
/// datasets. The role gate lives on the admin router layer; by the time this
/// body runs the requester is known to be an admin.
pub async fn admin_dashboard(
    State(state): State<AppState>,
    session: SessionHandle,
) -> Result<Response, AppError> {
    let usuarios = state.repo.list_users().await?;
    let habitos = state.repo.list_habits().await?;
    let seguimientos = state.repo.list_tracking_entries().await?;
    let ctx = ViewContext::new()
        .with("usuarios", &usuarios)
        .with("habitos", &habitos)
        .with("seguimientos", &seguimientos);
    render(&state, &session, "admin_dashboard", ctx).await
}
