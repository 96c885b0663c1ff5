//! Integration tests for credential checks and token issuance using
//! in-memory SQLite.

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use warden::auth::{Claims, JwtService, TOKEN_ISSUER};
use warden::error::ServiceError;
use warden::services::{AuditService, IdentityService, NewUserAccount, UserAdminService};

/// Helper: in-memory database plus the identity service and a handle on
/// the token service it signs with.
async fn setup() -> (
    DatabaseConnection,
    IdentityService,
    UserAdminService,
    JwtService,
) {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1);
    let db = Database::connect(options).await.unwrap();
    Migrator::up(&db, Some(3)).await.unwrap();

    let jwt = JwtService::new("test-secret", 24);
    let identity = IdentityService::new(db.clone(), jwt.clone());
    let audit = AuditService::new(db.clone());
    let user_admin = UserAdminService::new(db.clone(), identity.clone(), audit);

    (db, identity, user_admin, jwt)
}

fn account(email: &str) -> NewUserAccount {
    NewUserAccount {
        email: email.into(),
        password: "Admin123!".into(),
        full_name: "Alice".into(),
        document_number: None,
        phone: None,
        notes: None,
        role_name: None,
    }
}

#[tokio::test]
async fn login_returns_token_and_stamps_access_time() {
    let (_db, identity, user_admin, jwt) = setup().await;

    let created = user_admin
        .create_user(account("alice@example.com"), None)
        .await
        .unwrap();
    assert!(created.last_access_at.is_none());

    let (user, token) = identity
        .authenticate("alice@example.com", "Admin123!")
        .await
        .unwrap();

    assert!(!token.is_empty());
    assert!(user.last_access_at.is_some());

    // The token decodes back to the account that logged in.
    let claims = jwt.verify_token(&token).unwrap();
    assert_eq!(claims.sub, user.id);
    assert_eq!(claims.email, "alice@example.com");
    assert_eq!(claims.iss, TOKEN_ISSUER);
}

#[tokio::test]
async fn wrong_password_rejected() {
    let (_db, identity, user_admin, _jwt) = setup().await;

    user_admin
        .create_user(account("alice@example.com"), None)
        .await
        .unwrap();

    let err = identity
        .authenticate("alice@example.com", "wrong-password")
        .await
        .unwrap_err();
    assert!(
        matches!(err, ServiceError::InvalidCredentials),
        "expected InvalidCredentials, got: {err:?}"
    );
}

#[tokio::test]
async fn unknown_email_rejected() {
    let (_db, identity, _user_admin, _jwt) = setup().await;

    let err = identity
        .authenticate("nobody@example.com", "irrelevant")
        .await
        .unwrap_err();
    assert!(
        matches!(err, ServiceError::InvalidCredentials),
        "expected InvalidCredentials, got: {err:?}"
    );
}

#[tokio::test]
async fn deactivated_account_rejected() {
    let (_db, identity, user_admin, _jwt) = setup().await;

    let user = user_admin
        .create_user(account("alice@example.com"), None)
        .await
        .unwrap();
    user_admin.toggle_user_status(user.id, None).await.unwrap();

    // Same failure as a bad password, so probing reveals nothing.
    let err = identity
        .authenticate("alice@example.com", "Admin123!")
        .await
        .unwrap_err();
    assert!(
        matches!(err, ServiceError::InvalidCredentials),
        "expected InvalidCredentials, got: {err:?}"
    );
}

#[tokio::test]
async fn token_signed_with_another_secret_rejected() {
    let (_db, _identity, _user_admin, jwt) = setup().await;

    let other = JwtService::new("other-secret", 24);
    let token = other
        .generate_token(uuid::Uuid::new_v4(), "alice@example.com")
        .unwrap();

    assert!(jwt.verify_token(&token).is_err());
    assert!(jwt.verify_token("not-even-a-token").is_err());
}

#[tokio::test]
async fn token_from_another_issuer_rejected() {
    let (_db, _identity, _user_admin, jwt) = setup().await;

    // Right secret, wrong issuing service.
    let now = Utc::now();
    let claims = Claims {
        sub: uuid::Uuid::new_v4(),
        email: "alice@example.com".into(),
        iss: "billing".into(),
        exp: (now + Duration::hours(1)).timestamp(),
        iat: now.timestamp(),
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret("test-secret".as_ref()),
    )
    .unwrap();

    assert!(jwt.verify_token(&token).is_err());
}

#[tokio::test]
async fn role_checks_see_current_membership() {
    let (_db, identity, user_admin, _jwt) = setup().await;
    identity.create_role("clerk").await.unwrap();

    let mut input = account("alice@example.com");
    input.role_name = Some("clerk".into());
    let alice = user_admin.create_user(input, None).await.unwrap();

    let bob = user_admin
        .create_user(account("bob@example.com"), None)
        .await
        .unwrap();

    assert!(identity.is_in_role(alice.id, "clerk").await.unwrap());
    assert!(!identity.is_in_role(alice.id, "admin").await.unwrap());
    assert!(!identity.is_in_role(bob.id, "clerk").await.unwrap());

    // The batch lookup answers for every requested id, including the
    // role-less one.
    let map = identity
        .user_roles_batch(&[alice.id, bob.id])
        .await
        .unwrap();
    assert_eq!(map[&alice.id], vec!["clerk".to_string()]);
    assert!(map[&bob.id].is_empty());
}
