use k8s_openapi::api::core::v1::Pod;
use kube::Api;
use kube::api::ListParams;
use std::sync::Arc;
use tracing::debug;

use super::cluster_client::ClusterClient;
use crate::config::Configuration;
use crate::error::Result;

fn pod_namespace(pod: &Pod) -> &str {
    pod.metadata.namespace.as_deref().unwrap_or_default()
}

impl<C: Configuration> ClusterClient<C> {
    /// List pods in the active namespace scope, minus excluded namespaces.
    ///
    /// The first non-empty result is kept for the lifetime of this client.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the cluster can't be reached or the list call fails
    pub async fn list_pods(&self) -> Result<Arc<Vec<Pod>>> {
        self.pods.get_or_try_fill(|| self.fetch_pods()).await
    }

    pub async fn is_pods_cached(&self) -> bool {
        self.pods.is_filled().await
    }

    async fn fetch_pods(&self) -> Result<Vec<Pod>> {
        let client = self.dial().await?;
        let api: Api<Pod> = match self.config.active_namespace() {
            Some(ns) => Api::namespaced((*client).clone(), ns),
            None => Api::all((*client).clone()),
        };

        let pod_list = api.list(&ListParams::default()).await?;
        debug!("list_pods: fetched {} pods", pod_list.items.len());

        Ok(self.without_excluded(pod_list.items, pod_namespace))
    }
}
