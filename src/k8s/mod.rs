pub mod client;
pub mod cluster_client;
pub mod metrics_client;
pub mod namespaces;
pub mod pods;
pub mod snapshot;

#[cfg(test)]
pub(crate) mod testing;

pub use cluster_client::ClusterClient;
pub use namespaces::is_system_namespace;

/// Default user agent for `navilint` - automatically uses the package version
///
/// Every connection made through `client::KubeConnector::default()` carries it.
/// It can be overridden via the `NAVILINT_USER_AGENT` environment variable.
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
