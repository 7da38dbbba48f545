// Client creation with custom user-agent support for kube 2.x
use async_trait::async_trait;
use hyper::http::{HeaderName, HeaderValue};
use kube::{Client, Config};
use tracing::{debug, warn};

use super::USER_AGENT;

/// Env var that overrides the default user-agent
pub const USER_AGENT_ENV: &str = "NAVILINT_USER_AGENT";

/// Reasons a connection handle could not be produced
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("unable to infer cluster configuration: {0}")]
    Infer(#[from] kube::config::InferConfigError),

    #[error("unable to load kubeconfig: {0}")]
    Kubeconfig(#[from] kube::config::KubeconfigError),

    #[error("unable to build cluster client: {0}")]
    Build(#[source] kube::Error),

    #[error("unable to resolve connection parameters: {0}")]
    Unresolved(String),
}

/// Turns resolved connection parameters into a live client handle.
#[async_trait]
pub trait Connector: Send + Sync {
    /// # Errors
    ///
    /// Will return `Err` if the client can not be constructed from `config`
    async fn connect(&self, config: Config) -> Result<Client, ConnectionError>;
}

/// Default connector backed by kube's own HTTP stack
#[derive(Debug, Clone)]
pub struct KubeConnector {
    user_agent: Option<String>,
}

impl KubeConnector {
    #[must_use]
    pub fn new(user_agent: Option<&str>) -> Self {
        Self {
            user_agent: user_agent.map(str::to_string),
        }
    }
}

impl Default for KubeConnector {
    fn default() -> Self {
        let user_agent = std::env::var(USER_AGENT_ENV).unwrap_or_else(|_| USER_AGENT.to_string());
        Self {
            user_agent: Some(user_agent),
        }
    }
}

#[async_trait]
impl Connector for KubeConnector {
    async fn connect(&self, mut config: Config) -> Result<Client, ConnectionError> {
        add_user_agent_header(&mut config, self.user_agent.as_deref());
        debug!("building client for {}", config.cluster_url);
        Client::try_from(config).map_err(ConnectionError::Build)
    }
}

/// Add a `user-agent` header to `config`.
///
/// An invalid header value is logged and skipped, kube's default agent is used instead.
pub fn add_user_agent_header(config: &mut Config, custom_user_agent: Option<&str>) {
    let Some(user_agent) = custom_user_agent else {
        return;
    };
    match HeaderValue::from_str(user_agent) {
        Ok(header_value) => config
            .headers
            .push((HeaderName::from_static("user-agent"), header_value)),
        Err(e) => warn!("ignoring invalid user-agent {:?}: {}", user_agent, e),
    }
}
