//! Service-level flows against an in-memory user store.
//!
//! Exercises `Authenticator` and `UserManager` end to end, the way the
//! HTTP layer drives them, without Postgres.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use robot_cleaner_api::config::Config;
use robot_cleaner_api::domain::{NewUser, ProfileUpdate, User, UserRole};
use robot_cleaner_api::errors::{AppError, AppResult};
use robot_cleaner_api::infra::{UnitOfWork, UserRepository};
use robot_cleaner_api::jobs::{EmailJob, EmailQueue};
use robot_cleaner_api::services::{
    AuthService, Authenticator, GoogleProfile, UserManager, UserService,
};
use robot_cleaner_api::types::PaginationParams;

// =============================================================================
// In-memory infrastructure
// =============================================================================

#[derive(Default)]
struct MemoryUsers {
    users: Mutex<HashMap<Uuid, User>>,
}

impl MemoryUsers {
    fn edit(&self, id: Uuid, f: impl FnOnce(&mut User)) -> AppResult<User> {
        let mut users = self.users.lock().unwrap();
        let user = users.get_mut(&id).ok_or(AppError::NotFound)?;
        f(user);
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    fn find(&self, pred: impl Fn(&User) -> bool) -> Option<User> {
        self.users.lock().unwrap().values().find(|u| pred(u)).cloned()
    }
}

#[async_trait]
impl UserRepository for MemoryUsers {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self.find(|u| u.email == email))
    }

    async fn find_by_reset_token(&self, token_hash: &str) -> AppResult<Option<User>> {
        Ok(self.find(|u| u.password_reset_token.as_deref() == Some(token_hash)))
    }

    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        if self.find(|u| u.email == new_user.email).is_some() {
            return Err(AppError::conflict("Email"));
        }
        let mut user = User::new(
            Uuid::new_v4(),
            new_user.name,
            new_user.email,
            new_user.password_hash,
        );
        user.google_id = new_user.google_id;
        user.is_verified = new_user.is_verified;
        self.users.lock().unwrap().insert(user.id, user.clone());
        Ok(user)
    }

    async fn link_google(&self, id: Uuid, google_id: String) -> AppResult<User> {
        self.edit(id, |u| {
            u.google_id = Some(google_id);
            u.is_verified = true;
        })
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> AppResult<User> {
        self.edit(id, |u| {
            if let Some(name) = update.name {
                u.name = name;
            }
            if let Some(phone) = update.phone {
                u.phone = Some(phone);
            }
            if let Some(address) = update.address {
                u.address = Some(address);
            }
            if let Some(age) = update.age {
                u.age = Some(age);
            }
            if let Some(photo_url) = update.photo_url {
                u.photo_url = Some(photo_url);
            }
        })
    }

    async fn set_password(&self, id: Uuid, password_hash: String) -> AppResult<User> {
        self.edit(id, |u| {
            u.password_hash = Some(password_hash);
            u.password_changed_at = Some(Utc::now() - Duration::seconds(1));
            u.password_reset_token = None;
            u.password_reset_expires = None;
        })
    }

    async fn set_reset_token(
        &self,
        id: Uuid,
        token_hash: String,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        self.edit(id, |u| {
            u.password_reset_token = Some(token_hash);
            u.password_reset_expires = Some(expires_at);
        })
        .map(|_| ())
    }

    async fn clear_reset_token(&self, id: Uuid) -> AppResult<()> {
        self.edit(id, |u| {
            u.password_reset_token = None;
            u.password_reset_expires = None;
        })
        .map(|_| ())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.users
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(AppError::NotFound)
    }

    async fn list(&self, page: u64, per_page: u64) -> AppResult<(Vec<User>, u64)> {
        let mut users: Vec<User> = self.users.lock().unwrap().values().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = users.len() as u64;
        let skip = (page.max(1) - 1) * per_page;
        let page = users
            .into_iter()
            .skip(skip as usize)
            .take(per_page as usize)
            .collect();
        Ok((page, total))
    }
}

struct MemoryUnit {
    users: Arc<MemoryUsers>,
}

impl UnitOfWork for MemoryUnit {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }
}

/// Collects queued emails; can be told to fail.
#[derive(Default)]
struct Outbox {
    sent: Mutex<Vec<EmailJob>>,
    broken: bool,
}

#[async_trait]
impl EmailQueue for Outbox {
    async fn enqueue(&self, job: EmailJob) -> AppResult<()> {
        if self.broken {
            return Err(AppError::internal("queue offline"));
        }
        self.sent.lock().unwrap().push(job);
        Ok(())
    }
}

struct Harness {
    users: Arc<MemoryUsers>,
    outbox: Arc<Outbox>,
    auth: Authenticator<MemoryUnit>,
    manager: UserManager<MemoryUnit>,
}

fn harness_with(outbox: Outbox) -> Harness {
    let users = Arc::new(MemoryUsers::default());
    let outbox = Arc::new(outbox);
    let unit = Arc::new(MemoryUnit {
        users: users.clone(),
    });
    let config = Config::with_secret("test-secret-key-for-testing-only-32chars").unwrap();

    Harness {
        auth: Authenticator::new(unit.clone(), config, outbox.clone()),
        manager: UserManager::new(unit),
        users,
        outbox,
    }
}

fn harness() -> Harness {
    harness_with(Outbox::default())
}

async fn register(h: &Harness, email: &str) -> User {
    h.auth
        .register(
            "Maria".to_string(),
            email.to_string(),
            "secret123".to_string(),
            "secret123".to_string(),
        )
        .await
        .unwrap()
        .user
}

/// Raw reset token from the last queued email
fn token_from_outbox(outbox: &Outbox) -> String {
    let sent = outbox.sent.lock().unwrap();
    let body = &sent.last().expect("an email was queued").body;
    let start = body.find("/redefinir-senha/").expect("reset link") + "/redefinir-senha/".len();
    body[start..]
        .chars()
        .take_while(|c| c.is_ascii_hexdigit())
        .collect()
}

// =============================================================================
// Registration and login
// =============================================================================

#[tokio::test]
async fn test_register_then_login_with_normalized_email() {
    let h = harness();
    let user = register(&h, "  Maria@Example.COM ").await;
    assert_eq!(user.email, "maria@example.com");
    assert_eq!(user.role, UserRole::User);
    assert!(!user.is_verified);

    let session = h
        .auth
        .login("MARIA@example.com".to_string(), "secret123".to_string())
        .await
        .unwrap();
    assert_eq!(session.user.id, user.id);

    let resolved = h.auth.authenticate(&session.token).await.unwrap();
    assert_eq!(resolved.id, user.id);
}

#[tokio::test]
async fn test_duplicate_email_conflicts() {
    let h = harness();
    register(&h, "maria@example.com").await;

    let result = h
        .auth
        .register(
            "Other".to_string(),
            "MARIA@example.com".to_string(),
            "secret123".to_string(),
            "secret123".to_string(),
        )
        .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn test_wrong_password_and_unknown_email_look_the_same() {
    let h = harness();
    register(&h, "maria@example.com").await;

    let wrong = h
        .auth
        .login("maria@example.com".to_string(), "nope-nope".to_string())
        .await;
    let unknown = h
        .auth
        .login("ghost@example.com".to_string(), "secret123".to_string())
        .await;

    assert!(matches!(wrong, Err(AppError::InvalidCredentials)));
    assert!(matches!(unknown, Err(AppError::InvalidCredentials)));
}

#[tokio::test]
async fn test_token_rejected_after_password_change() {
    let h = harness();
    let user = register(&h, "maria@example.com").await;
    let token = h.auth.issue_token(&user).unwrap();

    h.users
        .edit(user.id, |u| {
            u.password_changed_at = Some(Utc::now() + Duration::seconds(5))
        })
        .unwrap();

    assert!(matches!(
        h.auth.authenticate(&token).await,
        Err(AppError::PasswordChanged)
    ));
}

#[tokio::test]
async fn test_token_rejected_after_account_deleted() {
    let h = harness();
    let user = register(&h, "maria@example.com").await;
    let token = h.auth.issue_token(&user).unwrap();

    h.manager.delete_account(user.id).await.unwrap();

    assert!(matches!(
        h.auth.authenticate(&token).await,
        Err(AppError::TokenUserGone)
    ));
}

// =============================================================================
// Google
// =============================================================================

#[tokio::test]
async fn test_google_login_links_then_reuses_account() {
    let h = harness();
    let local = register(&h, "maria@example.com").await;

    let profile = GoogleProfile {
        google_id: "google-123".to_string(),
        email: "Maria@Example.com".to_string(),
        name: "Maria G".to_string(),
    };

    let first = h.auth.google_login(profile.clone()).await.unwrap();
    assert_eq!(first.user.id, local.id);
    assert_eq!(first.user.google_id.as_deref(), Some("google-123"));
    assert!(first.user.is_verified);

    let second = h.auth.google_login(profile).await.unwrap();
    assert_eq!(second.user.id, local.id);
    assert_eq!(h.manager.list_users(PaginationParams::default()).await.unwrap().meta.total, 1);
}

#[tokio::test]
async fn test_google_only_account_sets_first_password() {
    let h = harness();
    let session = h
        .auth
        .google_login(GoogleProfile {
            google_id: "google-456".to_string(),
            email: "joao@gmail.com".to_string(),
            name: "Joao".to_string(),
        })
        .await
        .unwrap();
    assert!(!session.user.has_password());

    h.auth
        .change_password(session.user.id, None, "brandnew1".to_string())
        .await
        .unwrap();

    let login = h
        .auth
        .login("joao@gmail.com".to_string(), "brandnew1".to_string())
        .await
        .unwrap();
    assert_eq!(login.user.id, session.user.id);

    // From now on the current password is required
    let again = h
        .auth
        .change_password(session.user.id, None, "another12".to_string())
        .await;
    assert!(matches!(again, Err(AppError::InvalidCredentials)));
}

// =============================================================================
// Password recovery
// =============================================================================

#[tokio::test]
async fn test_forgot_and_reset_password() {
    let h = harness();
    let user = register(&h, "maria@example.com").await;

    h.auth
        .forgot_password("maria@example.com".to_string())
        .await
        .unwrap();

    {
        let sent = h.outbox.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "maria@example.com");
        assert!(sent[0]
            .body
            .contains("http://localhost:5173/redefinir-senha/"));
    }

    let raw = token_from_outbox(&h.outbox);
    let stored = h.users.find(|u| u.id == user.id).unwrap();
    assert_ne!(stored.password_reset_token.as_deref(), Some(raw.as_str()));

    let session = h
        .auth
        .reset_password(raw.clone(), "newsecret".to_string(), "newsecret".to_string())
        .await
        .unwrap();
    assert_eq!(session.user.id, user.id);
    assert!(session.user.password_reset_token.is_none());

    // Single use
    let reuse = h
        .auth
        .reset_password(raw, "again1234".to_string(), "again1234".to_string())
        .await;
    assert!(matches!(reuse, Err(AppError::InvalidResetToken)));

    assert!(h
        .auth
        .login("maria@example.com".to_string(), "newsecret".to_string())
        .await
        .is_ok());
}

#[tokio::test]
async fn test_forgot_password_for_unknown_email_sends_nothing() {
    let h = harness();

    h.auth
        .forgot_password("ghost@example.com".to_string())
        .await
        .unwrap();

    assert!(h.outbox.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_reset_token_not_kept_when_email_cannot_be_queued() {
    let h = harness_with(Outbox {
        broken: true,
        ..Default::default()
    });
    let user = register(&h, "maria@example.com").await;

    h.auth
        .forgot_password("maria@example.com".to_string())
        .await
        .unwrap();

    let stored = h.users.find(|u| u.id == user.id).unwrap();
    assert!(stored.password_reset_token.is_none());
    assert!(stored.password_reset_expires.is_none());
}

#[tokio::test]
async fn test_expired_reset_token_is_rejected() {
    let h = harness();
    let user = register(&h, "maria@example.com").await;
    h.auth
        .forgot_password("maria@example.com".to_string())
        .await
        .unwrap();
    let raw = token_from_outbox(&h.outbox);

    h.users
        .edit(user.id, |u| {
            u.password_reset_expires = Some(Utc::now() - Duration::minutes(1))
        })
        .unwrap();

    let result = h
        .auth
        .reset_password(raw, "newsecret".to_string(), "newsecret".to_string())
        .await;
    assert!(matches!(result, Err(AppError::InvalidResetToken)));
}

// =============================================================================
// Profile
// =============================================================================

#[tokio::test]
async fn test_profile_update_keeps_untouched_fields() {
    let h = harness();
    let user = register(&h, "maria@example.com").await;

    h.manager
        .update_profile(
            user.id,
            ProfileUpdate {
                phone: Some("+55 11 99999-0000".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let updated = h
        .manager
        .update_profile(
            user.id,
            ProfileUpdate {
                address: Some("Rua das Flores, 123".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "Maria");
    assert_eq!(updated.email, "maria@example.com");
    assert_eq!(updated.phone.as_deref(), Some("+55 11 99999-0000"));
    assert_eq!(updated.address.as_deref(), Some("Rua das Flores, 123"));
}

#[tokio::test]
async fn test_get_user_after_delete_is_not_found() {
    let h = harness();
    let user = register(&h, "maria@example.com").await;

    h.manager.delete_account(user.id).await.unwrap();

    assert!(matches!(
        h.manager.get_user(user.id).await,
        Err(AppError::NotFound)
    ));
}

#[tokio::test]
async fn test_list_users_paginates() {
    let h = harness();
    for i in 0..3 {
        register(&h, &format!("user{}@example.com", i)).await;
    }

    let page = h
        .manager
        .list_users(PaginationParams {
            page: 2,
            per_page: 2,
        })
        .await
        .unwrap();

    assert_eq!(page.data.len(), 1);
    assert_eq!(page.meta.total, 3);
    assert_eq!(page.meta.total_pages, 2);
}
