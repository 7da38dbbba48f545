use k8s_openapi::api::core::v1::{Namespace, Pod};
use kube::Client;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use super::client::{ConnectionError, Connector, KubeConnector};
use super::snapshot::Snapshot;
use crate::config::Configuration;

/// Stateful client for a single inspection run.
///
/// Dials the cluster lazily, at most once, and memoizes the pod and namespace
/// listings. Nothing is ever refreshed: build a new `ClusterClient` for a new run.
pub struct ClusterClient<C> {
    pub(super) config: C,
    connector: Box<dyn Connector>,
    api: Mutex<Option<Arc<Client>>>,
    pub(super) pods: Snapshot<Pod>,
    pub(super) namespaces: Snapshot<Namespace>,
}

impl<C: Configuration> ClusterClient<C> {
    /// Client that dials through kube's HTTP stack
    #[must_use]
    pub fn new(config: C) -> Self {
        Self::with_connector(config, KubeConnector::default())
    }

    #[must_use]
    pub fn with_connector(config: C, connector: impl Connector + 'static) -> Self {
        Self {
            config,
            connector: Box::new(connector),
            api: Mutex::const_new(None),
            pods: Snapshot::new("pods"),
            namespaces: Snapshot::new("namespaces"),
        }
    }

    /// Get the cluster connection, creating it on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - connection parameters cannot be resolved
    /// - the client handle cannot be built
    pub async fn dial(&self) -> Result<Arc<Client>, ConnectionError> {
        let mut api = self.api.lock().await;
        if let Some(ref client) = *api {
            debug!("♻️ Reusing existing Kubernetes client");
            return Ok(client.clone());
        }

        debug!("🔧 Creating new Kubernetes client");
        let config = self.config.connection_config().await.map_err(|e| {
            debug!("❌ Failed to resolve Kubernetes configuration: {}", e);
            e
        })?;
        let client = self.connector.connect(config).await.map_err(|e| {
            debug!("❌ Failed to create Kubernetes client: {}", e);
            e
        })?;

        let client = Arc::new(client);
        *api = Some(client.clone());
        debug!("✅ Successfully created new Kubernetes client");
        Ok(client)
    }

    /// Check if we have a live connection without creating one
    pub async fn is_connected(&self) -> bool {
        self.api.lock().await.is_some()
    }

    /// Drop every item that lives in an excluded namespace
    pub(super) fn without_excluded<K>(&self, items: Vec<K>, namespace_of: fn(&K) -> &str) -> Vec<K> {
        let total = items.len();
        let kept: Vec<K> = items
            .into_iter()
            .filter(|item| !self.config.is_excluded(namespace_of(item)))
            .collect();
        if kept.len() < total {
            debug!("excluded {} of {} items", total - kept.len(), total);
        }
        kept
    }
}
