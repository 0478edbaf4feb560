//! MFA policy precedence and OTP challenge flow.

mod support;

use std::sync::Arc;

use uuid::Uuid;

use idhub_auth::mfa::{MfaChallenger, MfaPolicyResolver};
use idhub_cache::CacheManager;
use idhub_cache::memory::MemoryCacheProvider;
use idhub_core::config::cache::MemoryCacheConfig;
use idhub_core::config::mfa::MfaConfig;

use support::{CapturingNotifier, MemoryDirectory};

#[tokio::test]
async fn platform_actors_are_exempt() {
    let resolver = MfaPolicyResolver::new(Arc::new(MemoryDirectory::new()));
    assert!(!resolver.is_required(None, None, None).await.unwrap());
}

#[tokio::test]
async fn unknown_tenant_means_not_required() {
    let resolver = MfaPolicyResolver::new(Arc::new(MemoryDirectory::new()));
    assert!(
        !resolver
            .is_required(Some(Uuid::new_v4()), Some(Uuid::new_v4()), None)
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn tenant_switch_off_short_circuits_everything() {
    let tenant = Uuid::new_v4();
    let user = Uuid::new_v4();
    let role = Uuid::new_v4();
    let directory = MemoryDirectory::new()
        .with_tenant(tenant, false)
        .with_override(user, true)
        .with_role_policy(tenant, role, true);
    let resolver = MfaPolicyResolver::new(Arc::new(directory));

    assert!(
        !resolver
            .is_required(Some(tenant), Some(user), Some(role))
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn user_override_beats_role_policy() {
    let tenant = Uuid::new_v4();
    let user = Uuid::new_v4();
    let role = Uuid::new_v4();
    let directory = MemoryDirectory::new()
        .with_tenant(tenant, true)
        .with_override(user, false)
        .with_role_policy(tenant, role, true);
    let resolver = MfaPolicyResolver::new(Arc::new(directory));

    assert!(
        !resolver
            .is_required(Some(tenant), Some(user), Some(role))
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn role_policy_applies_without_an_override() {
    let tenant = Uuid::new_v4();
    let role = Uuid::new_v4();
    let directory = MemoryDirectory::new()
        .with_tenant(tenant, true)
        .with_role_policy(tenant, role, true);
    let resolver = MfaPolicyResolver::new(Arc::new(directory));

    assert!(
        resolver
            .is_required(Some(tenant), Some(Uuid::new_v4()), Some(role))
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn tenant_enabled_alone_does_not_force_mfa() {
    let tenant = Uuid::new_v4();
    let directory = MemoryDirectory::new().with_tenant(tenant, true);
    let resolver = MfaPolicyResolver::new(Arc::new(directory));

    assert!(
        !resolver
            .is_required(Some(tenant), Some(Uuid::new_v4()), Some(Uuid::new_v4()))
            .await
            .unwrap()
    );
}

fn challenger() -> (MfaChallenger, Arc<CapturingNotifier>) {
    let provider = MemoryCacheProvider::new(
        &MemoryCacheConfig {
            max_capacity: 100,
            time_to_live_seconds: 600,
        },
        600,
    );
    let cache = CacheManager::from_provider(Arc::new(provider));
    let notifier = Arc::new(CapturingNotifier::default());
    (
        MfaChallenger::new(Some(cache), notifier.clone(), MfaConfig::default()),
        notifier,
    )
}

#[tokio::test]
async fn challenge_roundtrip_consumes_the_code() {
    let (challenger, notifier) = challenger();
    let actor = Uuid::new_v4();

    challenger.issue(actor, "jo@acme.test").await.unwrap();
    let code = notifier.last_body().expect("code was dispatched");
    assert_eq!(code.len(), 6);

    assert!(challenger.verify(actor, &code).await.unwrap());
    // Consumed on first success.
    assert!(!challenger.verify(actor, &code).await.unwrap());
}

#[tokio::test]
async fn wrong_code_is_rejected_without_consuming() {
    let (challenger, notifier) = challenger();
    let actor = Uuid::new_v4();

    challenger.issue(actor, "jo@acme.test").await.unwrap();
    let code = notifier.last_body().unwrap();

    assert!(!challenger.verify(actor, "000000").await.unwrap() || code == "000000");
    assert!(challenger.verify(actor, &code).await.unwrap());
}

#[tokio::test]
async fn challenges_require_a_cache() {
    let notifier = Arc::new(CapturingNotifier::default());
    let challenger = MfaChallenger::new(None, notifier, MfaConfig::default());

    assert!(challenger.issue(Uuid::new_v4(), "jo@acme.test").await.is_err());
}
