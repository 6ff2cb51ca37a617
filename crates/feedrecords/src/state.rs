use std::sync::Arc;

use feedrecords_auth::AuthState;
use feedrecords_core::storage::RecordStore;

use crate::config::Config;
use crate::logging::LogLevel;
use crate::service::{Clock, RecordService, SystemClock};

/// Shared application state.
///
/// Cloned for each request handler. Holds the record service over the
/// configured store backend, auth state and the immutable configuration.
#[derive(Clone)]
pub struct AppState {
    pub records: RecordService,
    pub auth: AuthState,
    pub config: Arc<Config>,
    pub log_level: LogLevel,
}

impl AppState {
    fn build(
        store: Arc<dyn RecordStore>,
        clock: Arc<dyn Clock>,
        auth: AuthState,
        config: Config,
        log_level: LogLevel,
    ) -> Self {
        Self {
            records: RecordService::new(store, clock),
            auth,
            config: Arc::new(config),
            log_level,
        }
    }
}

impl AsRef<AuthState> for AppState {
    fn as_ref(&self) -> &AuthState {
        &self.auth
    }
}

// ============================================================================
// Factory functions for the storage backends
// ============================================================================

#[cfg(feature = "inmemory")]
mod inmemory {
    use super::*;
    use crate::storage::InMemoryRepository;

    impl AppState {
        /// Creates AppState with in-memory storage.
        /// Useful for local development without any external dependencies.
        pub async fn new(config: Config, log_level: LogLevel) -> Result<Self, anyhow::Error> {
            tracing::warn!("Using in-memory storage; records are lost on restart");
            let auth = AuthState::new(config.auth.clone());

            Ok(Self::build(
                Arc::new(InMemoryRepository::new()),
                Arc::new(SystemClock),
                auth,
                config,
                log_level,
            ))
        }
    }
}

#[cfg(feature = "dynamodb")]
mod dynamodb {
    use super::*;
    use crate::storage::DynamoDbRepository;

    impl AppState {
        /// Creates AppState with DynamoDB storage.
        pub async fn new(config: Config, log_level: LogLevel) -> Result<Self, anyhow::Error> {
            let table_name = config
                .table_name
                .clone()
                .ok_or_else(|| anyhow::anyhow!("TABLE_NAME must be set for DynamoDB storage"))?;

            let repository = DynamoDbRepository::connect(
                &config.aws_region,
                config.aws_endpoint_url.as_deref(),
                table_name,
            )
            .await;
            tracing::info!(
                table = repository.table_name(),
                region = %config.aws_region,
                endpoint = ?config.aws_endpoint_url,
                "Using DynamoDB storage"
            );

            let auth = AuthState::new(config.auth.clone());

            Ok(Self::build(
                Arc::new(repository),
                Arc::new(SystemClock),
                auth,
                config,
                log_level,
            ))
        }
    }
}

// ============================================================================
// Test support
// ============================================================================
