/**
Fail-fast helpers for the call site

The library returns every error; whoever drives an inspection run decides which
ones end the process. Only failures that leave no useful work, like not being
able to reach the cluster, should go through here.
*/
use kube::Client;
use std::fmt::Display;
use std::sync::Arc;
use tracing::error;

use crate::config::Configuration;
use crate::error::Result;
use crate::k8s::ClusterClient;

/// Exit status used when a run is aborted
pub const ABORT_EXIT_CODE: i32 = 1;

const NO_CONNECTION: &str = "unable to connect to the cluster";

fn abort(what: &str, cause: &dyn Display) -> ! {
    error!("💥 {}: {}", what, cause);
    eprintln!("navilint: {what}: {cause}");
    std::process::exit(ABORT_EXIT_CODE)
}

pub trait OrAbort<T> {
    /// Unwrap the value or log `what` with the cause and exit the process
    fn or_abort(self, what: &str) -> T;
}

impl<T, E: Display> OrAbort<T> for core::result::Result<T, E> {
    fn or_abort(self, what: &str) -> T {
        match self {
            Ok(value) => value,
            Err(e) => abort(what, &e),
        }
    }
}

/// Dial the cluster, or end the run when that's impossible
pub async fn dial_or_abort<C: Configuration>(client: &ClusterClient<C>) -> Arc<Client> {
    client.dial().await.or_abort(NO_CONNECTION)
}

/// End the run on a connection failure, hand any other outcome back
///
/// # Errors
///
/// Will return every non-connection error unchanged
pub fn abort_on_connection<T>(result: Result<T>) -> Result<T> {
    match result {
        Err(e) if e.is_connection() => abort(NO_CONNECTION, &e),
        result => result,
    }
}
