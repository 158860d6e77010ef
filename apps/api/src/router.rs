use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use billing_cell::router::billing_routes;
use scheduling_cell::router::scheduling_routes;
use shared_config::AppConfig;
use shared_store::ClinicStore;

pub fn create_router(config: &AppConfig, store: Arc<ClinicStore>) -> Router {
    let banner = format!("{} scheduling API is running!", config.clinic_name);
    Router::new()
        .route("/", get(|| async move { banner }))
        .nest("/scheduling", scheduling_routes(store.clone()))
        .nest("/billing", billing_routes(store))
}
