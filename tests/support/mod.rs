// Shared test scaffolding: an in-memory Repository double with real storage
// semantics (monotonic ids, username uniqueness, join-table association), a
// repository whose operations always fail, and helpers to assemble a test
// router or a running test server around them.
#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use habitos::{
    AppConfig, AppState, MockViewRenderer, RendererState,
    auth::ROLE_USER,
    create_router,
    error::AppError,
    models::{Habit, NewTrackingEntry, TrackingEntry, User},
    repository::{Repository, RepositoryState},
};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// InMemoryRepository
///
/// Behaves like the Postgres implementation for everything the handlers
/// observe: ids are assigned monotonically, a duplicate username fails with
/// the same Conflict the unique constraint would produce, and habit creation
/// records both the habit and its join-row association. Tests inspect the
/// vectors directly to assert row counts.
#[derive(Default)]
pub struct InMemoryRepository {
    pub users: Mutex<Vec<User>>,
    pub habits: Mutex<Vec<Habit>>,
    /// (usuario_id, habito_id) pairs, mirroring the join table.
    pub associations: Mutex<Vec<(i32, i32)>>,
    pub entries: Mutex<Vec<TrackingEntry>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a user directly, bypassing the register operation. Used to
    /// seed admins and pre-existing accounts.
    pub fn seed_user(&self, username: &str, password_hash: &str, rol: &str) -> User {
        let mut users = self.users.lock().expect("users lock poisoned");
        let user = User {
            id: users.len() as i32 + 1,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            rol: rol.to_string(),
        };
        users.push(user.clone());
        user
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn get_user(&self, id: i32) -> Result<Option<User>, AppError> {
        let users = self.users.lock().expect("users lock poisoned");
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let users = self.users.lock().expect("users lock poisoned");
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, AppError> {
        let mut users = self.users.lock().expect("users lock poisoned");
        // The unique constraint stand-in.
        if users.iter().any(|u| u.username == username) {
            return Err(AppError::conflict("El nombre de usuario ya existe."));
        }
        let user = User {
            id: users.len() as i32 + 1,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            rol: ROLE_USER.to_string(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        Ok(self.users.lock().expect("users lock poisoned").clone())
    }

    async fn create_habit_for_user(
        &self,
        user_id: i32,
        nombre: &str,
        descripcion: &str,
    ) -> Result<Habit, AppError> {
        let mut habits = self.habits.lock().expect("habits lock poisoned");
        let habit = Habit {
            id: habits.len() as i32 + 1,
            nombre: nombre.to_string(),
            descripcion: descripcion.to_string(),
        };
        habits.push(habit.clone());
        self.associations
            .lock()
            .expect("associations lock poisoned")
            .push((user_id, habit.id));
        Ok(habit)
    }

    async fn list_habits_for_user(&self, user_id: i32) -> Result<Vec<Habit>, AppError> {
        let associations = self.associations.lock().expect("associations lock poisoned");
        let habits = self.habits.lock().expect("habits lock poisoned");
        Ok(habits
            .iter()
            .filter(|h| associations.iter().any(|(u, hid)| *u == user_id && *hid == h.id))
            .cloned()
            .collect())
    }

    async fn list_habits(&self) -> Result<Vec<Habit>, AppError> {
        Ok(self.habits.lock().expect("habits lock poisoned").clone())
    }

    async fn create_tracking_entry(
        &self,
        entry: NewTrackingEntry,
    ) -> Result<TrackingEntry, AppError> {
        let mut entries = self.entries.lock().expect("entries lock poisoned");
        // No ownership check against the join relation and no duplicate
        // check, matching the storage contract.
        let row = TrackingEntry {
            id: entries.len() as i32 + 1,
            user_id: entry.user_id,
            habit_id: entry.habit_id,
            fecha: entry.fecha,
            cumplido: entry.cumplido,
        };
        entries.push(row.clone());
        Ok(row)
    }

    async fn list_tracking_for_user(&self, user_id: i32) -> Result<Vec<TrackingEntry>, AppError> {
        let entries = self.entries.lock().expect("entries lock poisoned");
        Ok(entries.iter().filter(|e| e.user_id == user_id).cloned().collect())
    }

    async fn list_tracking_entries(&self) -> Result<Vec<TrackingEntry>, AppError> {
        Ok(self.entries.lock().expect("entries lock poisoned").clone())
    }
}

/// FailingRepository
///
/// Every operation fails with a storage error, for exercising the
/// commit-failure and storage-unreachable paths.
pub struct FailingRepository;

#[async_trait]
impl Repository for FailingRepository {
    async fn get_user(&self, _id: i32) -> Result<Option<User>, AppError> {
        Err(AppError::Storage(sqlx::Error::PoolClosed))
    }
    async fn get_user_by_username(&self, _username: &str) -> Result<Option<User>, AppError> {
        Err(AppError::Storage(sqlx::Error::PoolClosed))
    }
    async fn create_user(&self, _username: &str, _password_hash: &str) -> Result<User, AppError> {
        Err(AppError::Storage(sqlx::Error::PoolClosed))
    }
    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        Err(AppError::Storage(sqlx::Error::PoolClosed))
    }
    async fn create_habit_for_user(
        &self,
        _user_id: i32,
        _nombre: &str,
        _descripcion: &str,
    ) -> Result<Habit, AppError> {
        Err(AppError::Storage(sqlx::Error::PoolClosed))
    }
    async fn list_habits_for_user(&self, _user_id: i32) -> Result<Vec<Habit>, AppError> {
        Err(AppError::Storage(sqlx::Error::PoolClosed))
    }
    async fn list_habits(&self) -> Result<Vec<Habit>, AppError> {
        Err(AppError::Storage(sqlx::Error::PoolClosed))
    }
    async fn create_tracking_entry(
        &self,
        _entry: NewTrackingEntry,
    ) -> Result<TrackingEntry, AppError> {
        Err(AppError::Storage(sqlx::Error::PoolClosed))
    }
    async fn list_tracking_for_user(&self, _user_id: i32) -> Result<Vec<TrackingEntry>, AppError> {
        Err(AppError::Storage(sqlx::Error::PoolClosed))
    }
    async fn list_tracking_entries(&self) -> Result<Vec<TrackingEntry>, AppError> {
        Err(AppError::Storage(sqlx::Error::PoolClosed))
    }
}

/// Creates an AppState over the given repository and a recording mock renderer.
pub fn test_state(repo: RepositoryState, views: Arc<MockViewRenderer>) -> AppState {
    AppState {
        repo,
        views: views as RendererState,
        config: AppConfig::default(),
    }
}

/// Builds a full router (session layer and guards included) over mock components.
pub fn test_router(repo: RepositoryState, views: Arc<MockViewRenderer>) -> Router {
    create_router(test_state(repo, views))
}

/// TestApp
///
/// A running application server over the in-memory repository, for end-to-end
/// tests driven through a real HTTP client with a cookie store.
pub struct TestApp {
    pub address: String,
    pub repo: Arc<InMemoryRepository>,
    pub views: Arc<MockViewRenderer>,
}

/// Spawns the application on an ephemeral local port.
pub async fn spawn_app() -> TestApp {
    let repo = Arc::new(InMemoryRepository::new());
    let views = Arc::new(MockViewRenderer::new());
    let router = test_router(repo.clone() as RepositoryState, views.clone());

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().expect("no local addr").port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server crashed");
    });

    TestApp {
        address,
        repo,
        views,
    }
}

/// An HTTP client with a cookie store (so the session survives across
/// requests) and redirects disabled (so tests can assert Location targets).
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("failed to build client")
}
