use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// Represents the canonical identity record stored in the `tabla_usuarios` table.
/// The password hash never leaves the server: it is skipped during serialization
/// so it can never leak into a rendered view context.
#[derive(Debug, Clone, Serialize, FromRow, Default, PartialEq)]
pub struct User {
    // Primary key, system-assigned and monotonic.
    pub id: i32,
    // Globally unique login name.
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    // The RBAC field: 'usuario' or 'admin'.
    pub rol: String,
}

/// Habit
///
/// A trackable activity definition from the `tabla_habitos` table. Habits are
/// shared entities: a habit may be associated with many users through the
/// `usuario_habito` join table, and a user may have many habits.
#[derive(Debug, Clone, Serialize, FromRow, Default, PartialEq)]
pub struct Habit {
    pub id: i32,
    pub nombre: String,
    pub descripcion: String,
}

/// TrackingEntry
///
/// A single day's completion record for one user/habit pair, from the
/// `tabla_seguimiento` table. There is no uniqueness constraint over
/// (user_id, habit_id, fecha): duplicate entries for the same day are
/// permitted.
#[derive(Debug, Clone, Serialize, FromRow, Default, PartialEq)]
pub struct TrackingEntry {
    pub id: i32,
    // FK to tabla_usuarios.id.
    pub user_id: i32,
    // FK to tabla_habitos.id.
    pub habit_id: i32,
    pub fecha: NaiveDate,
    pub cumplido: bool,
}

/// NewTrackingEntry
///
/// Insertion payload for a tracking entry. Only used internally between the
/// tracking handler and the repository.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewTrackingEntry {
    pub user_id: i32,
    pub habit_id: i32,
    pub fecha: NaiveDate,
    pub cumplido: bool,
}

// --- Form Payloads (Input Schemas) ---

/// RegisterForm
///
/// Input payload for POST /registro. The username field is named `usuario`
/// here but `username` on the login form; the asymmetry is part of the
/// historical form contract and is kept as-is.
///
/// `confirm_password` is optional at the extraction layer: an absent field is
/// treated as empty and caught by the all-fields-required validation, instead
/// of failing form extraction outright.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterForm {
    pub usuario: String,
    pub password: String,
    pub confirm_password: Option<String>,
}

/// LoginForm
///
/// Input payload for POST /login. Both fields are optional at the extraction
/// layer so that a missing field produces the friendly both-fields-required
/// flash rather than an extraction error.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// HabitForm
///
/// Input payload for POST /nuevo_habito. Both fields are required by the form
/// contract; a missing field aborts at the extraction layer rather than with a
/// friendly message. An empty-but-present value is accepted and stored as-is,
/// since only presence is checked.
#[derive(Debug, Clone, Deserialize)]
pub struct HabitForm {
    pub nombre: String,
    pub descripcion: String,
}

/// TrackingForm
///
/// Input payload for POST /registrar_seguimiento. `cumplido` is a
/// checkbox-style field: presence of any value means true.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackingForm {
    pub habit_id: i32,
    pub fecha: NaiveDate,
    pub cumplido: Option<String>,
}

impl TrackingForm {
    /// Checkbox semantics: the browser omits the field entirely when unchecked.
    pub fn is_cumplido(&self) -> bool {
        self.cumplido.is_some()
    }
}
