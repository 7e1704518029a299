use std::sync::Arc;

pub mod config;
pub mod models;
pub mod routes;
pub mod schema;
pub mod services;
pub mod socket;
pub mod store;

pub struct AppState {
    pub config: config::AppConfig,
    pub store: Arc<dyn store::Store>,
    pub registry: socket::registry::ConnectionRegistry,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
}
