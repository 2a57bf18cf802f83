//! Admin-gated connectivity test against stub connection factories.

#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]

use async_trait::async_trait;
use pgfingerprint_core::connection::{
    ADMIN_REQUIRED_MESSAGE, ConnectionParams, OpenConnection, with_timeout,
};
use pgfingerprint_core::credentials::InMemoryCredentialStore;
use pgfingerprint_core::security::{Capability, GrantTable, PermissionContext, Principal, Scope};
use pgfingerprint_core::{
    ConnectionConfig, ConnectionFactory, PgFingerprintError, PostgresStorageDescriptor, Result,
    StorageDescriptor, ValidationOutcome,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// What the stub does when asked to open a connection.
enum Behavior {
    Accept,
    Refuse(&'static str),
    Hang,
}

struct StubFactory {
    behavior: Behavior,
    opens: AtomicUsize,
    closes: Arc<AtomicUsize>,
}

impl StubFactory {
    fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            opens: AtomicUsize::new(0),
            closes: Arc::new(AtomicUsize::new(0)),
        })
    }

    fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

struct StubConnection {
    closes: Arc<AtomicUsize>,
}

#[async_trait]
impl OpenConnection for StubConnection {
    async fn close(self: Box<Self>) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl ConnectionFactory for StubFactory {
    async fn open(&self, params: &ConnectionParams) -> Result<Box<dyn OpenConnection>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            Behavior::Accept => Ok(Box::new(StubConnection {
                closes: self.closes.clone(),
            })),
            Behavior::Refuse(message) => Err(PgFingerprintError::connection_failed(
                format!("Failed to reach {}:{}", params.host, params.port),
                std::io::Error::new(std::io::ErrorKind::ConnectionRefused, message),
            )),
            Behavior::Hang => {
                with_timeout(
                    params.connect_timeout,
                    "Transport connect",
                    std::future::pending::<()>(),
                )
                .await?;
                unreachable!("pending future never resolves")
            }
        }
    }
}

fn descriptor(factory: Arc<StubFactory>) -> PostgresStorageDescriptor {
    let grants = GrantTable::new()
        .grant(Principal::new("admin"), Capability::Administer)
        .grant_on(
            Principal::new("dev"),
            Capability::ExtendedRead,
            Scope::new("project-a"),
        );
    let store = InMemoryCredentialStore::new().with_username_password("pg", "jenkins", "pw");
    PostgresStorageDescriptor::new(Arc::new(store), Arc::new(grants), factory)
}

fn admin() -> PermissionContext {
    PermissionContext::system(Principal::new("admin"))
}

#[tokio::test]
async fn test_non_admin_is_refused_without_network() {
    let factory = StubFactory::new(Behavior::Accept);
    let descriptor = descriptor(factory.clone());

    for context in [
        PermissionContext::system(Principal::new("anonymous")),
        PermissionContext::scoped(Principal::new("dev"), Scope::new("project-a")),
    ] {
        let outcome = descriptor
            .test_connection(&ConnectionConfig::default(), &context)
            .await;
        assert_eq!(outcome, ValidationOutcome::failure(ADMIN_REQUIRED_MESSAGE));
    }

    assert_eq!(factory.opens(), 0);
}

#[tokio::test]
async fn test_admin_with_reachable_factory_succeeds() {
    let factory = StubFactory::new(Behavior::Accept);
    let descriptor = descriptor(factory.clone());
    let config = ConnectionConfig::default().with_credential_id("pg".to_string());

    let outcome = descriptor.test_connection(&config, &admin()).await;

    assert_eq!(outcome, ValidationOutcome::success("Success"));
    assert_eq!(factory.opens(), 1);
    assert_eq!(factory.closes(), 1, "probe connection must be released");
}

#[tokio::test]
async fn test_factory_fault_becomes_failure_with_message() {
    let factory = StubFactory::new(Behavior::Refuse("connection refused by stub"));
    let descriptor = descriptor(factory.clone());

    let outcome = descriptor
        .test_connection(&ConnectionConfig::default(), &admin())
        .await;

    match outcome {
        ValidationOutcome::Failure(message) => {
            assert!(message.starts_with("Connection error : "), "{}", message);
            assert!(message.contains("connection refused by stub"), "{}", message);
        }
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(factory.closes(), 0);
}

#[tokio::test]
async fn test_failure_message_never_contains_password() {
    let factory = StubFactory::new(Behavior::Refuse("auth rejected"));
    let descriptor = descriptor(factory);
    let config = ConnectionConfig::default().with_credential_id("pg".to_string());

    let outcome = descriptor.test_connection(&config, &admin()).await;
    assert!(!outcome.is_success());
    assert!(!outcome.message().contains("pw"));
}

#[tokio::test]
async fn test_repeated_calls_are_idempotent() {
    for behavior in [Behavior::Accept, Behavior::Refuse("no route to host")] {
        let factory = StubFactory::new(behavior);
        let descriptor = descriptor(factory.clone());
        let config = ConnectionConfig::new("db.example.com".to_string());

        let first = descriptor.test_connection(&config, &admin()).await;
        let second = descriptor.test_connection(&config, &admin()).await;

        assert_eq!(first, second);
        assert_eq!(factory.opens(), 2);
    }
}

#[tokio::test(start_paused = true)]
async fn test_hanging_factory_is_bounded_by_connect_timeout() {
    let factory = StubFactory::new(Behavior::Hang);
    let descriptor = descriptor(factory);
    let config = ConnectionConfig::default().with_connect_timeout_ms(300);

    let outcome = descriptor.test_connection(&config, &admin()).await;

    assert_eq!(
        outcome,
        ValidationOutcome::failure("Connection error : Transport connect timed out after 300ms")
    );
}

#[tokio::test]
async fn test_concurrent_tests_are_independent() {
    let factory = StubFactory::new(Behavior::Accept);
    let descriptor = Arc::new(descriptor(factory.clone()));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let descriptor = descriptor.clone();
            tokio::spawn(async move {
                descriptor
                    .test_connection(&ConnectionConfig::default(), &admin())
                    .await
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(
            handle.await.unwrap(),
            ValidationOutcome::success("Success")
        );
    }
    assert_eq!(factory.opens(), 8);
    assert_eq!(factory.closes(), 8);
}

#[tokio::test]
async fn test_descriptor_defaults_and_name() {
    let descriptor = descriptor(StubFactory::new(Behavior::Accept));
    assert_eq!(descriptor.display_name(), "PostgreSQL Fingerprint Storage");
    assert_eq!(descriptor.defaults(), ConnectionConfig::default());

    let choices = descriptor.fill_credential_items(&admin(), "").await;
    assert_eq!(choices.len(), 2);
    assert!(
        descriptor
            .check_credential_id(&admin(), "pg")
            .await
            .is_success()
    );
}

#[test]
fn test_timeout_is_reported_in_millis() {
    let error = PgFingerprintError::connection_timeout("PostgreSQL handshake", Duration::from_secs(2));
    assert_eq!(error.to_string(), "PostgreSQL handshake timed out after 2000ms");
}
