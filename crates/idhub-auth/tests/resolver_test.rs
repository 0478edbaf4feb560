//! Auth resolver behavior: probe order, lockout policy, attempt logging.

mod support;

use std::sync::Arc;

use uuid::Uuid;

use idhub_auth::password::PasswordHasher;
use idhub_auth::resolver::AuthResolver;
use idhub_core::config::auth::AuthConfig;
use idhub_core::error::ErrorKind;
use idhub_entity::actor::{ActorKind, ActorStatus, CredentialRecord, CredentialSource};

use support::{MemoryAttemptSink, MemoryCredentialSource};

const PASSWORD: &str = "correct horse battery staple";

fn record(kind: ActorKind, email: &str, status: ActorStatus) -> CredentialRecord {
    let hasher = PasswordHasher::new();
    CredentialRecord {
        id: Uuid::new_v4(),
        email: email.to_string(),
        kind,
        password_hash: hasher.hash_password(PASSWORD).unwrap(),
        status,
        failed_login_attempts: 0,
        tenant_id: (kind != ActorKind::SuperAdmin).then(Uuid::new_v4),
        role_id: None,
        display_name: None,
    }
}

struct Harness {
    resolver: AuthResolver,
    super_admins: Arc<MemoryCredentialSource>,
    tenant_users: Arc<MemoryCredentialSource>,
    attempts: Arc<MemoryAttemptSink>,
}

fn harness() -> Harness {
    let super_admins = Arc::new(MemoryCredentialSource::new(ActorKind::SuperAdmin));
    let tenant_users = Arc::new(MemoryCredentialSource::new(ActorKind::TenantUser));
    let attempts = Arc::new(MemoryAttemptSink::default());

    let resolver = AuthResolver::new(
        vec![
            super_admins.clone() as Arc<dyn CredentialSource>,
            tenant_users.clone() as Arc<dyn CredentialSource>,
        ],
        attempts.clone(),
        &AuthConfig::default(),
    );

    Harness {
        resolver,
        super_admins,
        tenant_users,
        attempts,
    }
}

#[tokio::test]
async fn empty_input_resolves_to_none_without_logging() {
    let h = harness();
    let result = h.resolver.resolve("", "pw", None, None).await.unwrap();
    assert!(result.is_none());
    assert_eq!(h.attempts.count(), 0);
}

#[tokio::test]
async fn successful_login_returns_normalized_subject() {
    let h = harness();
    let user = record(ActorKind::TenantUser, "jo@acme.test", ActorStatus::Active);
    h.tenant_users.insert(user.clone());

    let subject = h
        .resolver
        .resolve("JO@ACME.TEST", PASSWORD, Some("10.0.0.1"), Some("cli"))
        .await
        .unwrap()
        .expect("expected a subject");

    assert_eq!(subject.actor_id, user.id);
    assert_eq!(subject.kind, ActorKind::TenantUser);
    assert_eq!(subject.tenant_id, user.tenant_id);
    assert_eq!(h.attempts.count(), 1);
}

#[tokio::test]
async fn super_admin_wins_the_probe_order_tie_break() {
    let h = harness();
    h.super_admins
        .insert(record(ActorKind::SuperAdmin, "shared@acme.test", ActorStatus::Active));
    h.tenant_users
        .insert(record(ActorKind::TenantUser, "shared@acme.test", ActorStatus::Active));

    let subject = h
        .resolver
        .resolve("shared@acme.test", PASSWORD, None, None)
        .await
        .unwrap()
        .expect("expected a subject");

    assert_eq!(subject.kind, ActorKind::SuperAdmin);
    assert_eq!(subject.tenant_id, None);
}

#[tokio::test]
async fn wrong_password_is_generic_and_counted() {
    let h = harness();
    let user = record(ActorKind::TenantUser, "jo@acme.test", ActorStatus::Active);
    h.tenant_users.insert(user.clone());

    let result = h
        .resolver
        .resolve("jo@acme.test", "nope", None, None)
        .await
        .unwrap();

    assert!(result.is_none());
    assert_eq!(h.attempts.last_reason().as_deref(), Some("wrong_password"));
    assert_eq!(h.tenant_users.get(user.id).unwrap().failed_login_attempts, 1);
}

#[tokio::test]
async fn lockout_after_max_failed_attempts() {
    let h = harness();
    let user = record(ActorKind::TenantUser, "jo@acme.test", ActorStatus::Active);
    h.tenant_users.insert(user.clone());

    for _ in 0..4 {
        let result = h
            .resolver
            .resolve("jo@acme.test", "nope", None, None)
            .await
            .unwrap();
        assert!(result.is_none());
    }

    // The fifth failure crosses the threshold.
    let err = h
        .resolver
        .resolve("jo@acme.test", "nope", None, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::AccountLocked);
    assert_eq!(
        h.tenant_users.get(user.id).unwrap().status,
        ActorStatus::Deactivated
    );

    // Even the correct password is rejected with the lockout error now.
    let err = h
        .resolver
        .resolve("jo@acme.test", PASSWORD, None, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::AccountLocked);
    assert_eq!(
        h.attempts.last_reason().as_deref(),
        Some("account_deactivated")
    );
}

#[tokio::test]
async fn success_resets_the_failure_counter() {
    let h = harness();
    let user = record(ActorKind::TenantUser, "jo@acme.test", ActorStatus::Active);
    h.tenant_users.insert(user.clone());

    for _ in 0..3 {
        let _ = h.resolver.resolve("jo@acme.test", "nope", None, None).await;
    }
    assert_eq!(h.tenant_users.get(user.id).unwrap().failed_login_attempts, 3);

    let subject = h
        .resolver
        .resolve("jo@acme.test", PASSWORD, None, None)
        .await
        .unwrap();
    assert!(subject.is_some());
    assert_eq!(h.tenant_users.get(user.id).unwrap().failed_login_attempts, 0);
}

#[tokio::test]
async fn suspended_account_is_generic_invalid_credentials() {
    let h = harness();
    h.tenant_users
        .insert(record(ActorKind::TenantUser, "jo@acme.test", ActorStatus::Suspended));

    let result = h
        .resolver
        .resolve("jo@acme.test", PASSWORD, None, None)
        .await
        .unwrap();

    assert!(result.is_none());
    assert_eq!(
        h.attempts.last_reason().as_deref(),
        Some("account_suspended")
    );
}

#[tokio::test]
async fn exactly_one_attempt_row_per_call() {
    let h = harness();
    h.tenant_users
        .insert(record(ActorKind::TenantUser, "jo@acme.test", ActorStatus::Active));

    let _ = h.resolver.resolve("jo@acme.test", "nope", None, None).await;
    let _ = h.resolver.resolve("jo@acme.test", PASSWORD, None, None).await;

    assert_eq!(h.attempts.count(), 2);
}
