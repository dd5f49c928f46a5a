mod support;

use habitos::{
    auth::{self, hash_password, verify_password},
    error::AppError,
    repository::RepositoryState,
};
use std::sync::Arc;
use support::InMemoryRepository;

// --- Password Hasher ---

#[test]
fn test_hash_then_verify_roundtrip() {
    let digest = hash_password("pw123").expect("hashing failed");
    assert!(verify_password(&digest, "pw123"));
    assert!(!verify_password(&digest, "pw124"));
}

#[test]
fn test_hash_is_salted() {
    // Two digests of the same plaintext must differ (fresh salt per call),
    // while both still verify.
    let a = hash_password("pw123").expect("hashing failed");
    let b = hash_password("pw123").expect("hashing failed");
    assert_ne!(a, b);
    assert!(verify_password(&a, "pw123"));
    assert!(verify_password(&b, "pw123"));
}

#[test]
fn test_hash_tolerates_empty_input() {
    let digest = hash_password("").expect("hashing empty input failed");
    assert!(verify_password(&digest, ""));
    assert!(!verify_password(&digest, "not-empty"));
}

#[test]
fn test_verify_malformed_digest_is_false_not_error() {
    assert!(!verify_password("not-a-phc-string", "pw123"));
    assert!(!verify_password("", "pw123"));
    assert!(!verify_password("$argon2id$garbage", "pw123"));
}

#[test]
fn test_digest_never_contains_plaintext() {
    let digest = hash_password("hunter2-secret").expect("hashing failed");
    assert!(!digest.contains("hunter2-secret"));
}

// --- Register ---

#[tokio::test]
async fn test_register_success_stores_hashed_password() {
    let repo = Arc::new(InMemoryRepository::new()) as RepositoryState;

    let id = auth::register(&repo, "alice", "pw123", "pw123")
        .await
        .expect("register failed");
    assert_eq!(id, 1);

    let user = repo
        .get_user_by_username("alice")
        .await
        .expect("lookup failed")
        .expect("user missing");
    assert_eq!(user.rol, "usuario");
    // Never the raw password.
    assert_ne!(user.password_hash, "pw123");
    assert!(verify_password(&user.password_hash, "pw123"));
}

#[tokio::test]
async fn test_register_empty_fields_is_validation_error() {
    let repo_impl = Arc::new(InMemoryRepository::new());
    let repo = repo_impl.clone() as RepositoryState;

    for (u, p, c) in [("", "pw", "pw"), ("alice", "", ""), ("alice", "pw", "")] {
        let result = auth::register(&repo, u, p, c).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
    // No row was inserted by any of the failed attempts.
    assert!(repo_impl.users.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_register_password_mismatch_is_validation_error() {
    let repo = Arc::new(InMemoryRepository::new()) as RepositoryState;
    let result = auth::register(&repo, "alice", "pw123", "pw456").await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_register_duplicate_username_is_conflict() {
    let repo_impl = Arc::new(InMemoryRepository::new());
    let repo = repo_impl.clone() as RepositoryState;

    auth::register(&repo, "bob", "pw123", "pw123")
        .await
        .expect("first register failed");
    let second = auth::register(&repo, "bob", "other", "other").await;
    assert!(matches!(second, Err(AppError::Conflict(_))));

    // Storage contains exactly one "bob" row.
    let users = repo_impl.users.lock().unwrap();
    assert_eq!(users.iter().filter(|u| u.username == "bob").count(), 1);
}

// --- Login ---

#[tokio::test]
async fn test_login_success_returns_user() {
    let repo = Arc::new(InMemoryRepository::new()) as RepositoryState;
    auth::register(&repo, "alice", "pw123", "pw123")
        .await
        .expect("register failed");

    let user = auth::login(&repo, "alice", "pw123")
        .await
        .expect("login failed");
    assert_eq!(user.username, "alice");
}

#[tokio::test]
async fn test_login_unknown_user_and_wrong_password_are_indistinguishable() {
    let repo = Arc::new(InMemoryRepository::new()) as RepositoryState;
    auth::register(&repo, "alice", "pw123", "pw123")
        .await
        .expect("register failed");

    let unknown = auth::login(&repo, "nobody", "pw123").await;
    let wrong = auth::login(&repo, "alice", "wrong").await;
    assert!(matches!(unknown, Err(AppError::InvalidCredentials)));
    assert!(matches!(wrong, Err(AppError::InvalidCredentials)));
}

#[tokio::test]
async fn test_login_empty_fields_is_validation_error() {
    let repo = Arc::new(InMemoryRepository::new()) as RepositoryState;
    let result = auth::login(&repo, "", "").await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}
