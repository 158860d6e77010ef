// libs/scheduling-cell/src/router.rs
use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Router,
};

use shared_store::ClinicStore;

use crate::handlers;

pub fn scheduling_routes(store: Arc<ClinicStore>) -> Router {
    Router::new()
        .route("/appointments", post(handlers::create_appointment))
        .route(
            "/appointments/{appointment_id}/status",
            patch(handlers::update_appointment_status),
        )
        .route(
            "/appointments/{appointment_id}/reschedule",
            patch(handlers::reschedule_appointment),
        )
        .route(
            "/doctors/{doctor_id}/schedule",
            get(handlers::get_doctor_schedule),
        )
        .with_state(store)
}
