//! Application state and dependency injection.
//!
//! Every handler receives the same wired services through axum's state
//! extraction. The stores behind them are chosen once at startup.

use jsonwebtoken::DecodingKey;
use std::sync::Arc;
use vcm_application::{
    AccessGuard, ComplaintQueryService, EscalationEngine, NotificationDispatcher,
    NotificationService, Repositories, ServiceConfig,
};
use vcm_common::{AppConfig, Clock, CodeGenerator, SystemClock, TimestampCodeGenerator};
use vcm_infrastructure::InMemoryStores;

/// Application state shared across all requests
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration
    pub config: Arc<AppConfig>,

    /// Principal resolution and authority checks
    pub guard: Arc<AccessGuard>,

    /// Complaint transitions
    pub engine: Arc<EscalationEngine>,

    /// Complaint read paths
    pub queries: Arc<ComplaintQueryService>,

    /// Admin notification inbox
    pub inbox: Arc<NotificationService>,

    decoding_key: Arc<DecodingKey>,
}

impl AppState {
    /// Wire the services over the given stores
    pub fn new(
        config: AppConfig,
        repositories: Repositories,
        clock: Arc<dyn Clock>,
        codes: Arc<dyn CodeGenerator>,
    ) -> Self {
        let service_config = ServiceConfig::from(&config.workflow);

        let guard = Arc::new(AccessGuard::new(repositories.admins.clone()));
        let dispatcher = Arc::new(NotificationDispatcher::new(
            repositories.notifications.clone(),
            repositories.admins.clone(),
        ));
        let engine = Arc::new(EscalationEngine::new(
            &repositories,
            Arc::clone(&guard),
            dispatcher,
            Arc::clone(&clock),
            codes,
            service_config,
        ));
        let queries = Arc::new(ComplaintQueryService::new(
            &repositories,
            Arc::clone(&guard),
            clock,
            service_config,
        ));
        let inbox = Arc::new(NotificationService::new(
            repositories.notifications.clone(),
            service_config,
        ));

        let decoding_key = Arc::new(DecodingKey::from_secret(config.auth.jwt_secret.as_bytes()));

        Self {
            config: Arc::new(config),
            guard,
            engine,
            queries,
            inbox,
            decoding_key,
        }
    }

    /// State over in-memory stores seeded with one admin per office
    pub fn in_memory(config: AppConfig) -> Self {
        let stores = InMemoryStores::with_office_admins();
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let codes: Arc<dyn CodeGenerator> =
            Arc::new(TimestampCodeGenerator::new(Arc::clone(&clock)));
        Self::new(config, stores.repositories(), clock, codes)
    }

    /// Key that verifies bearer tokens
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }
}
