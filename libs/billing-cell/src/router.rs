// libs/billing-cell/src/router.rs
use std::sync::Arc;

use axum::{
    routing::{delete, patch, post},
    Router,
};

use shared_store::ClinicStore;

use crate::handlers;

pub fn billing_routes(store: Arc<ClinicStore>) -> Router {
    Router::new()
        .route("/invoices", post(handlers::create_invoice))
        .route("/invoices/{invoice_id}", patch(handlers::update_invoice))
        .route("/invoices/{invoice_id}/lines", post(handlers::add_line))
        .route("/lines/{line_id}", patch(handlers::update_line))
        .route("/lines/{line_id}", delete(handlers::remove_line))
        .route("/invoices/{invoice_id}/pay", post(handlers::mark_paid))
        .route(
            "/appointments/{appointment_id}/invoice/recalculate",
            post(handlers::recalculate_invoice),
        )
        .with_state(store)
}
