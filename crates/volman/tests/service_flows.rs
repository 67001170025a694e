//! Integration tests for the registration, login, and logout flows.

use std::sync::Arc;

use volman::identity::derive_prefix;
use volman::{
    MemoryBackend, ServiceConfig, SessionToken, VolmanError, VolumeBackend, VolumeService,
};

const TEST_COST: u32 = 4;

fn service_with(backend: Arc<MemoryBackend>, config: ServiceConfig) -> VolumeService {
    VolumeService::new(backend, config.with_bcrypt_cost(TEST_COST))
}

fn service() -> (Arc<MemoryBackend>, VolumeService) {
    let backend = Arc::new(MemoryBackend::new());
    let service = service_with(backend.clone(), ServiceConfig::default().with_pool_prefix("tmp."));
    (backend, service)
}

fn token(s: &str) -> SessionToken {
    SessionToken::new(s).unwrap()
}

#[test_log::test(tokio::test)]
async fn register_then_conflict() {
    let (backend, service) = service();

    let prefix = service.register("alice", "password1", "").await.unwrap();
    assert_eq!(prefix, derive_prefix("alice"));
    assert_eq!(backend.volumes().len(), 1);
    assert!(backend.volumes()[0].starts_with(&format!("{prefix}.")));

    let err = service.register("alice", "password1", "").await.unwrap_err();
    assert!(matches!(err, VolmanError::VolumeExists { .. }));
    assert_eq!(backend.volumes().len(), 1);
}

#[tokio::test]
async fn registration_key_gate() {
    let backend = Arc::new(MemoryBackend::new());
    let service = service_with(
        backend.clone(),
        ServiceConfig::default().with_registration_key("open-sesame"),
    );

    let err = service.register("alice", "password1", "wrong").await.unwrap_err();
    assert!(matches!(err, VolmanError::InvalidRegistrationKey));
    let err = service.register("alice", "password1", "").await.unwrap_err();
    assert!(matches!(err, VolmanError::InvalidRegistrationKey));
    assert!(backend.volumes().is_empty());

    service
        .register("alice", "password1", "open-sesame")
        .await
        .unwrap();
    assert_eq!(backend.volumes().len(), 1);
}

#[tokio::test]
async fn create_failure_surfaces() {
    let (backend, service) = service();
    backend.fail_creates(Some("no space left on device"));
    let err = service.register("alice", "password1", "").await.unwrap_err();
    assert!(matches!(
        err,
        VolmanError::CreateFailed { ref stderr, .. } if stderr == "no space left on device"
    ));
}

#[test_log::test(tokio::test)]
async fn login_mounts_and_returns_mount_id() {
    let (backend, service) = service();
    service.register("alice", "password1", "").await.unwrap();
    let volume = backend.volumes()[0].clone();

    let mount = service
        .login("alice", "password1", &token("abc123"))
        .await
        .unwrap();
    assert_eq!(mount.to_string(), format!("{volume}.abc123"));
    assert_eq!(backend.mounted("tmp.abc123"), Some(volume));

    let err = service
        .login("alice", "password1", &token("abc123"))
        .await
        .unwrap_err();
    assert!(matches!(err, VolmanError::AlreadyMounted { .. }));
}

#[tokio::test]
async fn login_failures_share_a_category() {
    let (backend, service) = service();
    service.register("alice", "password1", "").await.unwrap();

    let wrong = service
        .login("alice", "password2", &token("abc"))
        .await
        .unwrap_err();
    assert!(matches!(wrong, VolmanError::WrongPassword { .. }));

    let missing = service
        .login("mallory", "password1", &token("abc"))
        .await
        .unwrap_err();
    assert!(matches!(missing, VolmanError::VolumeNotFound { .. }));

    assert_eq!(wrong.kind(), missing.kind());
    assert_ne!(wrong.to_string(), missing.to_string());
    assert!(backend.mounted("tmp.abc").is_none());
}

#[tokio::test]
async fn mount_failure_surfaces() {
    let (backend, service) = service();
    service.register("alice", "password1", "").await.unwrap();
    backend.fail_mounts(Some("container not running"));
    let err = service
        .login("alice", "password1", &token("abc"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        VolmanError::MountFailed { ref stderr, .. } if stderr == "container not running"
    ));
}

#[tokio::test]
async fn listing_failure_is_backend_error() {
    let (backend, service) = service();
    backend.fail_listing(Some("Cannot connect to the Docker daemon"));

    let err = service.register("alice", "password1", "").await.unwrap_err();
    assert!(matches!(err, VolmanError::Backend { ref stderr, .. } if stderr.contains("Docker daemon")));

    let err = service
        .login("alice", "password1", &token("abc"))
        .await
        .unwrap_err();
    assert!(matches!(err, VolmanError::Backend { .. }));
}

#[tokio::test]
async fn logout_is_repeatable() {
    let (backend, service) = service();
    service.register("alice", "password1", "").await.unwrap();
    service
        .login("alice", "password1", &token("abc"))
        .await
        .unwrap();

    assert!(service.logout(&token("abc")).await.unwrap());
    assert!(!service.logout(&token("abc")).await.unwrap());
    assert!(backend.mounted("tmp.abc").is_none());

    // The container is free again.
    service
        .login("alice", "password1", &token("abc"))
        .await
        .unwrap();
}

#[tokio::test]
async fn concurrent_registrations_create_one_volume() {
    let (backend, service) = service();
    let attempts: Vec<_> = (0..8)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move { service.register("alice", "password1", "").await })
        })
        .collect();

    let mut created = 0;
    for attempt in attempts {
        match attempt.await.unwrap() {
            Ok(_) => created += 1,
            Err(VolmanError::VolumeExists { .. }) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    assert_eq!(created, 1);
    assert_eq!(backend.volumes().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_logins_mount_once() {
    let (backend, service) = service();
    service.register("alice", "password1", "").await.unwrap();

    let attempts: Vec<_> = (0..4)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .login("alice", "password1", &token("shared"))
                    .await
            })
        })
        .collect();

    let mut mounted = 0;
    for attempt in attempts {
        match attempt.await.unwrap() {
            Ok(_) => mounted += 1,
            Err(VolmanError::AlreadyMounted { .. }) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    assert_eq!(mounted, 1);
    assert!(
        backend
            .has_mount(&service.container_for(&token("shared")), "/home/jovyan/work")
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn custom_work_dir() {
    let backend = Arc::new(MemoryBackend::new().with_work_dir("/data"));
    let service = service_with(backend.clone(), ServiceConfig::default().with_work_dir("/data"));
    assert_eq!(service.config().work_dir, "/data");

    service.register("alice", "password1", "").await.unwrap();
    service
        .login("alice", "password1", &token("abc"))
        .await
        .unwrap();
    assert!(
        backend
            .has_mount(&service.container_for(&token("abc")), "/data")
            .await
            .unwrap()
    );
    assert!(service.logout(&token("abc")).await.unwrap());
}
