use k8s_openapi::api::core::v1::Namespace;
use kube::Api;
use kube::api::ListParams;
use std::sync::Arc;
use tracing::debug;

use super::cluster_client::ClusterClient;
use crate::config::Configuration;
use crate::error::Result;

/// Namespaces reserved for the platform itself
pub const SYSTEM_NAMESPACES: [&str; 2] = ["kube-system", "kube-public"];

/// Is `name` one of the platform's reserved namespaces.
///
/// Classification only, this has no bearing on which namespaces are listed.
#[must_use]
pub fn is_system_namespace(name: &str) -> bool {
    SYSTEM_NAMESPACES.contains(&name)
}

fn namespace_name(ns: &Namespace) -> &str {
    ns.metadata.name.as_deref().unwrap_or_default()
}

impl<C: Configuration> ClusterClient<C> {
    /// List namespaces in the active scope, minus excluded ones.
    ///
    /// With no scope every namespace is listed, otherwise only the scoped namespace
    /// is fetched. The first non-empty result is kept for the lifetime of this client.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the cluster can't be reached, or the list/get call fails,
    /// including when the scoped namespace does not exist
    pub async fn list_namespaces(&self) -> Result<Arc<Vec<Namespace>>> {
        self.namespaces
            .get_or_try_fill(|| self.fetch_namespaces())
            .await
    }

    pub async fn is_namespaces_cached(&self) -> bool {
        self.namespaces.is_filled().await
    }

    async fn fetch_namespaces(&self) -> Result<Vec<Namespace>> {
        let client = self.dial().await?;
        // Namespaces are cluster-scoped, so we use Api::all
        let api: Api<Namespace> = Api::all((*client).clone());

        let items = match self.config.active_namespace() {
            None => {
                let ns_list = api.list(&ListParams::default()).await?;
                debug!("list_namespaces: fetched {} namespaces", ns_list.items.len());
                ns_list.items
            }
            Some(name) => {
                debug!("list_namespaces: fetching namespace '{}'", name);
                vec![api.get(name).await?]
            }
        };

        Ok(self.without_excluded(items, namespace_name))
    }
}
