//! Wiring of the lock backend, event store, and reservation service.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use booking_core::config::AppConfig;
use booking_core::result::AppResult;
use booking_core::traits::SystemClock;
use booking_lock::{DistributedLock, LockBackendManager, keys};
use booking_service::{ReservationService, WorkflowDeps};
use booking_store::{InMemoryEventStore, SessionRepository};

/// Connect to the configured lock backend.
pub async fn build_lock(config: &AppConfig) -> AppResult<DistributedLock> {
    let backend = LockBackendManager::new(&config.lock).await?;
    Ok(DistributedLock::from_config(Arc::new(backend), &config.lock))
}

/// Build the reservation service over an in-process event store.
pub async fn build_service(
    config: &AppConfig,
    cancel: CancellationToken,
) -> AppResult<ReservationService> {
    let lock = build_lock(config).await?;
    tracing::info!(
        backend = %config.lock.backend,
        ttl_ms = config.lock.session.ttl_ms,
        max_attempts = config.lock.session.max_attempts,
        "Lock service ready"
    );

    let deps = WorkflowDeps::new(
        lock.scoped(keys::SESSION_NAMESPACE),
        Arc::new(SystemClock),
        &config.lock.session,
    )
    .with_cancellation(cancel);
    let repository = SessionRepository::new(Arc::new(InMemoryEventStore::new()));

    Ok(ReservationService::new(repository, deps, &config.workflow))
}
