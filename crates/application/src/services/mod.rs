//! Application Services
//!
//! Workflow orchestration over the persistence ports: who may act, what a
//! transition writes, and who hears about it.

mod access;
mod escalation;
mod notification;
mod query;

pub use access::*;
pub use escalation::*;
pub use notification::*;
pub use query::*;

use crate::ports::{
    AdminDirectoryPort, CategoryRepositoryPort, ComplaintRepositoryPort,
    NotificationRepositoryPort, StatusHistoryRepositoryPort, StoreHealthPort,
};
use std::sync::Arc;
use vcm_common::{PaginationParams, WorkflowConfig};

/// Service configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Maximum page size for list operations
    pub max_page_size: u32,
    /// Default page size for list operations
    pub default_page_size: u32,
    /// Fresh complaint codes to try before a submission fails
    pub code_attempts: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::from(&WorkflowConfig::default())
    }
}

impl From<&WorkflowConfig> for ServiceConfig {
    fn from(config: &WorkflowConfig) -> Self {
        Self {
            max_page_size: config.max_page_size,
            default_page_size: config.default_page_size,
            code_attempts: config.code_attempts.max(1),
        }
    }
}

impl ServiceConfig {
    /// Apply the configured bounds to a caller's page request
    pub fn page(&self, requested: Option<PaginationParams>) -> PaginationParams {
        requested
            .unwrap_or_else(|| PaginationParams::new(1, self.default_page_size))
            .clamped(self.max_page_size)
    }
}

/// Every store the services need, behind their ports
#[derive(Clone)]
pub struct Repositories {
    pub complaints: Arc<dyn ComplaintRepositoryPort>,
    pub history: Arc<dyn StatusHistoryRepositoryPort>,
    pub notifications: Arc<dyn NotificationRepositoryPort>,
    pub admins: Arc<dyn AdminDirectoryPort>,
    pub categories: Arc<dyn CategoryRepositoryPort>,
    pub health: Arc<dyn StoreHealthPort>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_config_follows_workflow_config() {
        let workflow = WorkflowConfig {
            default_page_size: 15,
            max_page_size: 40,
            code_attempts: 0,
        };
        let config = ServiceConfig::from(&workflow);
        assert_eq!(config.default_page_size, 15);
        assert_eq!(config.max_page_size, 40);
        assert_eq!(config.code_attempts, 1);
    }

    #[test]
    fn test_page_defaults_and_clamps() {
        let config = ServiceConfig {
            max_page_size: 25,
            default_page_size: 10,
            code_attempts: 3,
        };
        assert_eq!(config.page(None), PaginationParams::new(1, 10));
        assert_eq!(
            config.page(Some(PaginationParams::new(2, 90))),
            PaginationParams::new(2, 25)
        );
    }
}
