use crate::{
    error::AppError,
    models::{Habit, NewTrackingEntry, TrackingEntry, User},
};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations. This is the core
/// of the Repository Abstraction pattern, allowing the handlers to interact with
/// the data layer without knowing the specific implementation (Postgres, in-memory
/// test double, etc.).
///
/// Every relationship is exposed as an explicit query returning a concrete
/// collection; there is no lazy loading and no hidden on-access database call.
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn Repository>`) safely shareable across Axum's asynchronous task
/// boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn get_user(&self, id: i32) -> Result<Option<User>, AppError>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
    /// Inserts a new user with the default 'usuario' role. An insert that hits
    /// the username unique constraint surfaces as `AppError::Conflict`; this is
    /// the recoverable outcome of the registration race window.
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, AppError>;
    async fn list_users(&self) -> Result<Vec<User>, AppError>;

    // --- Habits ---
    /// Inserts a new habit and its join-row association with the creating user
    /// as a single transaction: either both rows commit or neither does.
    async fn create_habit_for_user(
        &self,
        user_id: i32,
        nombre: &str,
        descripcion: &str,
    ) -> Result<Habit, AppError>;
    /// Habits associated with the user through the join relation. Order is not
    /// guaranteed.
    async fn list_habits_for_user(&self, user_id: i32) -> Result<Vec<Habit>, AppError>;
    // Admin access: every habit in the system.
    async fn list_habits(&self) -> Result<Vec<Habit>, AppError>;

    // --- Tracking ---
    /// Unconditional insert. Deliberately does not verify that the habit is
    /// associated with the user, and permits duplicates per (user, habit, date).
    async fn create_tracking_entry(
        &self,
        entry: NewTrackingEntry,
    ) -> Result<TrackingEntry, AppError>;
    async fn list_tracking_for_user(&self, user_id: i32) -> Result<Vec<TrackingEntry>, AppError>;
    // Admin access: every tracking entry in the system.
    async fn list_tracking_entries(&self) -> Result<Vec<TrackingEntry>, AppError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer access across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by the PostgreSQL database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Maps an insert failure to the taxonomy: a unique-constraint violation is a
/// recoverable Conflict, anything else is a storage failure.
fn map_insert_error(err: sqlx::Error, conflict_msg: &str) -> AppError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return AppError::Conflict(conflict_msg.to_string());
        }
    }
    AppError::Storage(err)
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn get_user(&self, id: i32) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, rol FROM tabla_usuarios WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, rol FROM tabla_usuarios WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// create_user
    ///
    /// Single atomic insert. The uniqueness pre-check happens in the register
    /// operation; this is the second line of defense for the race where two
    /// registrations with the same username both pass the pre-check.
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO tabla_usuarios (username, password_hash) VALUES ($1, $2) \
             RETURNING id, username, password_hash, rol",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, "El nombre de usuario ya existe."))
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let users =
            sqlx::query_as::<_, User>("SELECT id, username, password_hash, rol FROM tabla_usuarios")
                .fetch_all(&self.pool)
                .await?;
        Ok(users)
    }

    /// create_habit_for_user
    ///
    /// Two inserts under one transaction: the habit row and the join row that
    /// associates it with the creating user. Any failure rolls the whole
    /// transaction back (the transaction guard rolls back on drop).
    async fn create_habit_for_user(
        &self,
        user_id: i32,
        nombre: &str,
        descripcion: &str,
    ) -> Result<Habit, AppError> {
        let mut tx = self.pool.begin().await?;

        let habit = sqlx::query_as::<_, Habit>(
            "INSERT INTO tabla_habitos (nombre, descripcion) VALUES ($1, $2) \
             RETURNING id, nombre, descripcion",
        )
        .bind(nombre)
        .bind(descripcion)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO usuario_habito (usuario_id, habito_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(habit.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(habit)
    }

    async fn list_habits_for_user(&self, user_id: i32) -> Result<Vec<Habit>, AppError> {
        let habits = sqlx::query_as::<_, Habit>(
            "SELECT h.id, h.nombre, h.descripcion \
             FROM tabla_habitos h \
             JOIN usuario_habito uh ON uh.habito_id = h.id \
             WHERE uh.usuario_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(habits)
    }

    async fn list_habits(&self) -> Result<Vec<Habit>, AppError> {
        let habits =
            sqlx::query_as::<_, Habit>("SELECT id, nombre, descripcion FROM tabla_habitos")
                .fetch_all(&self.pool)
                .await?;
        Ok(habits)
    }

    /// create_tracking_entry
    ///
    /// Single atomic insert, referential integrity left to the storage engine's
    /// foreign keys. No ownership check against the join relation and no
    /// duplicate check: both are part of the documented contract.
    async fn create_tracking_entry(
        &self,
        entry: NewTrackingEntry,
    ) -> Result<TrackingEntry, AppError> {
        let row = sqlx::query_as::<_, TrackingEntry>(
            "INSERT INTO tabla_seguimiento (user_id, habit_id, fecha, cumplido) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, user_id, habit_id, fecha, cumplido",
        )
        .bind(entry.user_id)
        .bind(entry.habit_id)
        .bind(entry.fecha)
        .bind(entry.cumplido)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_tracking_for_user(&self, user_id: i32) -> Result<Vec<TrackingEntry>, AppError> {
        let entries = sqlx::query_as::<_, TrackingEntry>(
            "SELECT id, user_id, habit_id, fecha, cumplido FROM tabla_seguimiento WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    async fn list_tracking_entries(&self) -> Result<Vec<TrackingEntry>, AppError> {
        let entries = sqlx::query_as::<_, TrackingEntry>(
            "SELECT id, user_id, habit_id, fecha, cumplido FROM tabla_seguimiento",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }
}
