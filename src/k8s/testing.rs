//! Scripted api server and fakes shared by the k8s unit tests

use async_trait::async_trait;
use hyper::http::{Request, Response};
use itertools::Itertools;
use k8s_openapi::serde_json::{self, Value, json};
use kube::client::Body;
use kube::{Client, Config};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower_test::mock;

use super::client::{ConnectionError, Connector};
use super::cluster_client::ClusterClient;
use crate::config::Configuration;

#[derive(Debug, Clone, Default)]
pub struct FakeConfig {
    namespace: Option<String>,
    excluded: Vec<String>,
    unresolvable: bool,
    resolutions: Arc<AtomicUsize>,
}

impl FakeConfig {
    pub fn unresolvable() -> Self {
        Self {
            unresolvable: true,
            ..Self::default()
        }
    }

    pub fn scoped_to(mut self, namespace: &str) -> Self {
        self.namespace = Some(namespace.to_string());
        self
    }

    pub fn excluding(mut self, namespaces: &[&str]) -> Self {
        self.excluded
            .extend(namespaces.iter().map(ToString::to_string));
        self
    }
}

#[async_trait]
impl Configuration for FakeConfig {
    async fn connection_config(&self) -> Result<Config, ConnectionError> {
        self.resolutions.fetch_add(1, Ordering::SeqCst);
        if self.unresolvable {
            return Err(ConnectionError::Unresolved("no current context".to_string()));
        }
        Ok(Config::new("http://127.0.0.1:6443".parse().unwrap()))
    }

    fn active_namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    fn is_excluded(&self, namespace: &str) -> bool {
        self.excluded.iter().any(|ns| ns == namespace)
    }
}

/// Hands out a pre-built client and counts how often it is asked to
pub struct MockConnector {
    client: Client,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, _config: Config) -> Result<Client, ConnectionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.client.clone())
    }
}

pub struct FailingConnector;

#[async_trait]
impl Connector for FailingConnector {
    async fn connect(&self, _config: Config) -> Result<Client, ConnectionError> {
        Err(ConnectionError::Unresolved("connection refused".to_string()))
    }
}

/// Paths the scripted api server has been asked for, in order
#[derive(Debug, Clone, Default)]
pub struct RequestLog(Arc<Mutex<Vec<String>>>);

impl RequestLog {
    fn record(&self, path: &str) {
        self.0.lock().unwrap().push(path.to_string());
    }

    pub fn paths(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, path: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|p| *p == path).count()
    }
}

pub struct MockCluster {
    pub client: ClusterClient<FakeConfig>,
    pub requests: RequestLog,
    pub connects: Arc<AtomicUsize>,
    pub resolutions: Arc<AtomicUsize>,
}

type ApiServerHandle = mock::Handle<Request<Body>, Response<Body>>;

/// Build a `ClusterClient` whose api server answers every request with `respond(path)`
pub fn mock_cluster<F>(config: FakeConfig, respond: F) -> MockCluster
where
    F: Fn(&str) -> (u16, Value) + Send + 'static,
{
    let (mock_service, handle) = mock::pair::<Request<Body>, Response<Body>>();
    let requests = RequestLog::default();
    serve(handle, requests.clone(), respond);

    let connects = Arc::new(AtomicUsize::new(0));
    let resolutions = config.resolutions.clone();
    let connector = MockConnector {
        client: Client::new(mock_service, "default"),
        calls: connects.clone(),
    };

    MockCluster {
        client: ClusterClient::with_connector(config, connector),
        requests,
        connects,
        resolutions,
    }
}

fn serve<F>(mut handle: ApiServerHandle, requests: RequestLog, respond: F)
where
    F: Fn(&str) -> (u16, Value) + Send + 'static,
{
    tokio::spawn(async move {
        while let Some((request, send)) = handle.next_request().await {
            let path = request.uri().path().to_string();
            requests.record(&path);
            let (code, data) = respond(&path);
            send.send_response(
                Response::builder()
                    .status(code)
                    .body(Body::from(serde_json::to_vec(&data).unwrap()))
                    .unwrap(),
            );
        }
    });
}

pub fn status(code: u16) -> (u16, Value) {
    let reason = match code {
        404 => "NotFound",
        403 => "Forbidden",
        503 => "ServiceUnavailable",
        _ => "InternalError",
    };
    (
        code,
        json!({
            "kind": "Status",
            "apiVersion": "v1",
            "metadata": {},
            "status": "Failure",
            "message": format!("the server responded with {reason}"),
            "reason": reason,
            "code": code,
        }),
    )
}

pub fn pod(name: &str, namespace: &str) -> Value {
    json!({
        "apiVersion": "v1",
        "kind": "Pod",
        "metadata": { "name": name, "namespace": namespace },
    })
}

pub fn pod_list(pods: &[Value]) -> Value {
    json!({
        "apiVersion": "v1",
        "kind": "PodList",
        "metadata": { "resourceVersion": "1" },
        "items": pods,
    })
}

pub fn namespace(name: &str) -> Value {
    json!({
        "apiVersion": "v1",
        "kind": "Namespace",
        "metadata": { "name": name },
        "status": { "phase": "Active" },
    })
}

pub fn namespace_list(namespaces: &[Value]) -> Value {
    json!({
        "apiVersion": "v1",
        "kind": "NamespaceList",
        "metadata": { "resourceVersion": "1" },
        "items": namespaces,
    })
}

/// Discovery document for `(group, version)` pairs; consecutive pairs share a group
pub fn api_groups(entries: &[(&str, &str)]) -> Value {
    let groups: Vec<Value> = entries
        .iter()
        .chunk_by(|(group, _)| *group)
        .into_iter()
        .map(|(group, versions)| {
            let versions: Vec<Value> = versions
                .map(|(_, version)| {
                    json!({ "groupVersion": format!("{group}/{version}"), "version": version })
                })
                .collect();
            json!({ "name": group, "versions": versions })
        })
        .collect();

    json!({
        "kind": "APIGroupList",
        "apiVersion": "v1",
        "groups": groups,
    })
}
