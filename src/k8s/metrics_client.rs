//! Metrics Server detection
//!
//! Probes API discovery for the `metrics.k8s.io` group. The probe is soft: any
//! failure along the way reads as "no metrics".

use k8s_openapi::apimachinery::pkg::apis::meta::v1::APIGroupList;
use tracing::debug;

use super::cluster_client::ClusterClient;
use crate::config::Configuration;

/// API group served by the Kubernetes Metrics Server
pub const METRICS_GROUP: &str = "metrics.k8s.io";

/// Metrics API versions this tool knows how to read
pub const SUPPORTED_METRICS_VERSIONS: [&str; 1] = ["v1beta1"];

/// True when discovery lists the metrics group with a supported version.
///
/// Group and version must match exactly.
#[must_use]
pub fn supports_metrics(groups: &APIGroupList) -> bool {
    groups
        .groups
        .iter()
        .filter(|group| group.name == METRICS_GROUP)
        .flat_map(|group| &group.versions)
        .any(|v| SUPPORTED_METRICS_VERSIONS.contains(&v.version.as_str()))
}

impl<C: Configuration> ClusterClient<C> {
    /// Check whether the cluster serves a usable metrics API.
    ///
    /// Never fails: a dial or discovery error is reported as `false`.
    pub async fn cluster_has_metrics(&self) -> bool {
        let client = match self.dial().await {
            Ok(client) => client,
            Err(e) => {
                debug!("metrics probe: no connection, assuming no metrics: {}", e);
                return false;
            }
        };

        match client.list_api_groups().await {
            Ok(groups) => {
                let found = supports_metrics(&groups);
                debug!(
                    "metrics probe: {} api groups discovered, metrics {}",
                    groups.groups.len(),
                    if found { "available" } else { "unavailable" }
                );
                found
            }
            Err(e) => {
                debug!("metrics probe: discovery failed, assuming no metrics: {}", e);
                false
            }
        }
    }
}
