// libs/scheduling-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::error::AppError;
use shared_store::ClinicStore;

use crate::models::{
    CreateAppointmentRequest, RescheduleRequest, ScheduleQuery, SchedulingError,
    UpdateStatusRequest,
};
use crate::services::booking::AppointmentBookingService;

#[axum::debug_handler]
pub async fn create_appointment(
    State(store): State<Arc<ClinicStore>>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentBookingService::new(store);

    let appointment = service
        .create_appointment(request)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn update_appointment_status(
    State(store): State<Arc<ClinicStore>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentBookingService::new(store);

    let appointment = service
        .update_appointment_status(appointment_id, request)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn reschedule_appointment(
    State(store): State<Arc<ClinicStore>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<RescheduleRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentBookingService::new(store);

    let appointment = service
        .reschedule_appointment(appointment_id, request)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn get_doctor_schedule(
    State(store): State<Arc<ClinicStore>>,
    Path(doctor_id): Path<Uuid>,
    Query(query): Query<ScheduleQuery>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentBookingService::new(store);

    let appointments = service
        .get_doctor_schedule(doctor_id, query.date)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({
        "doctor_id": doctor_id,
        "date": query.date,
        "appointments": appointments
    })))
}

fn map_scheduling_error(err: SchedulingError) -> AppError {
    match err {
        SchedulingError::AppointmentNotFound(_)
        | SchedulingError::DoctorNotFound(_)
        | SchedulingError::PatientNotFound(_) => AppError::NotFound(err.to_string()),
        SchedulingError::Rejected(report) => AppError::Validation(report.field_messages()),
    }
}
