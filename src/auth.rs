//! Session authentication.
//!
//! Users are stored in the database; sessions are held in memory and keyed by
//! an opaque token carried in the `session` cookie.

use std::collections::HashMap;
use std::time::{Duration, SystemTime};

use parking_lot::RwLock;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::db::entities::user;
use crate::db::now_secs;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Username must be at least 2 characters")]
    UsernameTooShort,

    #[error("Username can only contain letters, numbers, dashes, and underscores")]
    UsernameInvalid,

    #[error("Password must be at least 4 characters")]
    PasswordTooShort,

    #[error("Username '{0}' is already taken")]
    UsernameTaken(String),

    #[error("Database error: {0}")]
    Db(#[from] DbErr),
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Hash a password with salt
fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"imagemarks-salt:");
    hasher.update(password.as_bytes());
    let result = hasher.finalize();
    result.iter().map(|b| format!("{:02x}", b)).collect()
}

fn validate_credentials(username: &str, password: &str) -> AuthResult<()> {
    if username.chars().count() < 2 {
        return Err(AuthError::UsernameTooShort);
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(AuthError::UsernameInvalid);
    }
    if password.chars().count() < 4 {
        return Err(AuthError::PasswordTooShort);
    }
    Ok(())
}

/// A logged-in session
#[derive(Clone, Debug)]
pub struct Session {
    pub token: String,
    pub user_id: i32,
    pub username: String,
    pub expires_at: SystemTime,
}

impl Session {
    fn new(user: &user::Model, duration: Duration) -> Self {
        Self {
            token: uuid::Uuid::new_v4().simple().to_string(),
            user_id: user.id,
            username: user.username.clone(),
            expires_at: SystemTime::now() + duration,
        }
    }

    pub fn is_expired(&self) -> bool {
        SystemTime::now() > self.expires_at
    }
}

/// Session manager
pub struct AuthManager {
    sessions: RwLock<HashMap<String, Session>>,
    session_duration: Duration,
}

impl AuthManager {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            session_duration: Duration::from_secs(24 * 60 * 60), // 24 hours
        }
    }

    #[cfg(test)]
    pub fn with_session_duration(mut self, duration: Duration) -> Self {
        self.session_duration = duration;
        self
    }

    /// Register a new user
    pub async fn register_user(
        &self,
        db: &DatabaseConnection,
        username: &str,
        password: &str,
        email: Option<&str>,
    ) -> AuthResult<user::Model> {
        let username = username.trim();
        validate_credentials(username, password)?;

        let existing = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(AuthError::UsernameTaken(username.to_string()));
        }

        let new_user = user::ActiveModel {
            username: Set(username.to_string()),
            password_hash: Set(hash_password(password)),
            email: Set(email.map(str::trim).filter(|e| !e.is_empty()).map(String::from)),
            created_at: Set(now_secs()),
            ..Default::default()
        };
        let created = new_user.insert(db).await?;
        tracing::info!("Registered user {}", created.username);
        Ok(created)
    }

    /// Create the user if it doesn't exist yet (bootstrap)
    pub async fn ensure_user(
        &self,
        db: &DatabaseConnection,
        username: &str,
        password: &str,
    ) -> AuthResult<user::Model> {
        let existing = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(db)
            .await?;
        match existing {
            Some(u) => Ok(u),
            None => self.register_user(db, username, password, None).await,
        }
    }

    /// Check a username/password and open a session
    pub async fn login(
        &self,
        db: &DatabaseConnection,
        username: &str,
        password: &str,
    ) -> AuthResult<Session> {
        let user = user::Entity::find()
            .filter(user::Column::Username.eq(username.trim()))
            .one(db)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if user.password_hash != hash_password(password) {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(self.open_session(&user))
    }

    /// Open a session for an already verified user
    pub fn open_session(&self, user: &user::Model) -> Session {
        let session = Session::new(user, self.session_duration);
        self.sessions
            .write()
            .insert(session.token.clone(), session.clone());
        session
    }

    /// Look up a live session by token
    pub fn session(&self, token: &str) -> Option<Session> {
        let sessions = self.sessions.read();
        sessions
            .get(token)
            .filter(|s| !s.is_expired())
            .cloned()
    }

    /// End a session
    pub fn logout(&self, token: &str) {
        self.sessions.write().remove(token);
    }

    /// Drop expired sessions
    pub fn cleanup_expired(&self) {
        let mut sessions = self.sessions.write();
        sessions.retain(|_, s| !s.is_expired());
    }
}

impl Default for AuthManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;

    #[test]
    fn test_password_hash() {
        let hash1 = hash_password("test123");
        let hash2 = hash_password("test123");
        let hash3 = hash_password("different");

        assert_eq!(hash1, hash2);
        assert_ne!(hash1, hash3);
    }

    #[test]
    fn test_validate_credentials() {
        assert!(validate_credentials("ann", "pass").is_ok());
        assert!(matches!(validate_credentials("a", "pass"), Err(AuthError::UsernameTooShort)));
        assert!(matches!(validate_credentials("a b", "pass"), Err(AuthError::UsernameInvalid)));
        assert!(matches!(validate_credentials("ann", "abc"), Err(AuthError::PasswordTooShort)));
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let db = connect_in_memory().await.unwrap();
        let auth = AuthManager::new();

        let user = auth.register_user(&db, "alice", "secret", Some("a@example.com")).await.unwrap();
        assert_eq!(user.username, "alice");

        assert!(matches!(
            auth.register_user(&db, "alice", "other", None).await,
            Err(AuthError::UsernameTaken(_))
        ));

        let session = auth.login(&db, "alice", "secret").await.unwrap();
        assert_eq!(session.user_id, user.id);
        assert_eq!(auth.session(&session.token).unwrap().username, "alice");

        assert!(matches!(
            auth.login(&db, "alice", "wrong").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login(&db, "nobody", "secret").await,
            Err(AuthError::InvalidCredentials)
        ));

        auth.logout(&session.token);
        assert!(auth.session(&session.token).is_none());
    }

    #[tokio::test]
    async fn test_expired_session_is_rejected() {
        let db = connect_in_memory().await.unwrap();
        let auth = AuthManager::new().with_session_duration(Duration::from_secs(0));
        let user = auth.ensure_user(&db, "bob", "hunter2").await.unwrap();

        let session = auth.open_session(&user);
        std::thread::sleep(Duration::from_millis(5));
        assert!(auth.session(&session.token).is_none());

        auth.cleanup_expired();
        assert!(auth.sessions.read().is_empty());
    }

    #[tokio::test]
    async fn test_ensure_user_is_idempotent() {
        let db = connect_in_memory().await.unwrap();
        let auth = AuthManager::new();
        let first = auth.ensure_user(&db, "admin", "admin").await.unwrap();
        let second = auth.ensure_user(&db, "admin", "admin").await.unwrap();
        assert_eq!(first.id, second.id);
    }
}
