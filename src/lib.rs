pub mod config;
pub mod error;
pub mod fatal;
pub mod k8s;
