use clap::Parser;
use itertools::Itertools;
use navilint::config::{Configuration, InspectConfig};
use navilint::fatal::{abort_on_connection, dial_or_abort};
use navilint::k8s::{ClusterClient, is_system_namespace};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Namespace to inspect, `all` for every namespace
    #[arg(short, long)]
    namespace: Option<String>,

    /// Kubeconfig context to use
    #[arg(long)]
    context: Option<String>,

    /// Path to a kubeconfig file
    #[arg(long)]
    kubeconfig: Option<PathBuf>,

    /// Namespace to leave out, `rx:` prefix for a regex (repeatable)
    #[arg(short = 'x', long = "exclude")]
    excludes: Vec<String>,

    /// YAML file with an `excludes.namespaces` list
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn inspect_config(&self) -> navilint::error::Result<InspectConfig> {
        let mut config = InspectConfig::new();
        if let Some(path) = &self.kubeconfig {
            config = config.with_kubeconfig(path);
        }
        if let Some(context) = &self.context {
            config = config.with_context(context);
        }
        if let Some(namespace) = &self.namespace {
            config = config.with_namespace(namespace);
        }
        config.load_exclusions(self.config.as_deref(), &self.excludes)
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let config = args.inspect_config()?;
    info!(
        "inspecting {} with {} exclusions",
        config.active_namespace().unwrap_or("all namespaces"),
        config.exclusions().len()
    );
    let client = ClusterClient::new(config);

    dial_or_abort(&client).await;

    let has_metrics = client.cluster_has_metrics().await;
    println!(
        "metrics: {}",
        if has_metrics { "available" } else { "unavailable" }
    );

    match abort_on_connection(client.list_namespaces().await) {
        Ok(namespaces) => println!("namespaces: {}", namespaces.len()),
        Err(e) => warn!("unable to list namespaces: {}", e),
    }

    let pods = abort_on_connection(client.list_pods().await)?;
    println!("pods: {}", pods.len());

    let per_namespace = pods
        .iter()
        .map(|pod| pod.metadata.namespace.as_deref().unwrap_or_default())
        .counts();
    for (namespace, count) in per_namespace.into_iter().sorted() {
        let tag = if is_system_namespace(namespace) {
            " (system)"
        } else {
            ""
        };
        println!("  {namespace}{tag}: {count}");
    }

    Ok(())
}
