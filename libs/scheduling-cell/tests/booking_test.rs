use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use scheduling_cell::models::{
    CreateAppointmentRequest, RescheduleRequest, SchedulingError, UpdateStatusRequest,
    ValidationIssue, ValidationReport,
};
use scheduling_cell::services::booking::AppointmentBookingService;
use shared_models::appointment::{AppointmentStatus, CancelReasonType};
use shared_models::clinic::{Doctor, Patient};
use shared_store::ClinicStore;

fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2031, 3, day, hour, minute, 0).unwrap()
}

// Validation "now", safely before every slot used in these tests.
fn clock() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2031, 3, 1, 0, 0, 0).unwrap()
}

async fn seed() -> (Arc<ClinicStore>, Uuid, Uuid) {
    let store = Arc::new(ClinicStore::new());

    let patient_id = Uuid::new_v4();
    store
        .upsert_patient(Patient {
            id: patient_id,
            first_name: "Anna".to_string(),
            last_name: "Petrova".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1990, 5, 14).unwrap(),
            phone: "+79990001122".to_string(),
            email: None,
            discount_percent: 10,
            notes: None,
            created_at: Utc::now(),
        })
        .await;

    let doctor_id = Uuid::new_v4();
    store
        .upsert_doctor(Doctor {
            id: doctor_id,
            first_name: "Ivan".to_string(),
            last_name: "Smirnov".to_string(),
            specialty: "Orthodontics".to_string(),
            room: Some("12".to_string()),
            is_active: true,
        })
        .await;

    (store, patient_id, doctor_id)
}

fn booking(
    patient_id: Uuid,
    doctor_id: Uuid,
    start: DateTime<Utc>,
    duration_minutes: i32,
) -> CreateAppointmentRequest {
    CreateAppointmentRequest {
        patient_id,
        doctor_id,
        start_time: start,
        duration_minutes,
        status: None,
        reason: None,
        cancel_reason_type: None,
        cancel_reason_text: None,
    }
}

fn rejection(err: SchedulingError) -> ValidationReport {
    match err {
        SchedulingError::Rejected(report) => report,
        other => panic!("expected validation rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn overlapping_booking_is_rejected() {
    let (store, patient_id, doctor_id) = seed().await;
    let service = AppointmentBookingService::new(store);

    service
        .create_appointment_at(booking(patient_id, doctor_id, at(10, 10, 0), 30), clock())
        .await
        .unwrap();

    // 10:20-10:50 overlaps 10:00-10:30
    let err = service
        .create_appointment_at(booking(patient_id, doctor_id, at(10, 10, 20), 30), clock())
        .await
        .unwrap_err();

    let report = rejection(err);
    assert_matches!(
        report.issues.as_slice(),
        [ValidationIssue::TimeSlotTaken { conflict }] if conflict.patient_id == patient_id
    );
    assert!(report.has_field("start_time"));
}

#[tokio::test]
async fn back_to_back_booking_is_accepted() {
    let (store, patient_id, doctor_id) = seed().await;
    let service = AppointmentBookingService::new(store);

    service
        .create_appointment_at(booking(patient_id, doctor_id, at(10, 10, 0), 30), clock())
        .await
        .unwrap();

    // 10:30-11:00 touches the previous end exactly; no conflict.
    service
        .create_appointment_at(booking(patient_id, doctor_id, at(10, 10, 30), 30), clock())
        .await
        .unwrap();
}

#[tokio::test]
async fn off_grid_start_time_is_rejected() {
    let (store, patient_id, doctor_id) = seed().await;
    let service = AppointmentBookingService::new(store);

    let err = service
        .create_appointment_at(booking(patient_id, doctor_id, at(10, 10, 5), 30), clock())
        .await
        .unwrap_err();

    let report = rejection(err);
    assert_matches!(report.issues.as_slice(), [ValidationIssue::NotAligned]);
}

#[tokio::test]
async fn booking_in_the_past_is_rejected_for_scheduled_only() {
    let (store, patient_id, doctor_id) = seed().await;
    let service = AppointmentBookingService::new(store);

    let late_clock = Utc.with_ymd_and_hms(2031, 3, 20, 0, 0, 0).unwrap();

    let err = service
        .create_appointment_at(booking(patient_id, doctor_id, at(10, 10, 0), 30), late_clock)
        .await
        .unwrap_err();
    let report = rejection(err);
    assert_matches!(report.issues.as_slice(), [ValidationIssue::PastBooking]);

    // Importing a historical completed record skips the past-time rule.
    let mut historical = booking(patient_id, doctor_id, at(10, 10, 0), 30);
    historical.status = Some(AppointmentStatus::Completed);
    service
        .create_appointment_at(historical, late_clock)
        .await
        .unwrap();
}

#[tokio::test]
async fn inactive_doctor_is_rejected() {
    let (store, patient_id, _) = seed().await;

    let inactive_id = Uuid::new_v4();
    store
        .upsert_doctor(Doctor {
            id: inactive_id,
            first_name: "Olga".to_string(),
            last_name: "Ivanova".to_string(),
            specialty: "Surgery".to_string(),
            room: None,
            is_active: false,
        })
        .await;

    let service = AppointmentBookingService::new(store);
    let err = service
        .create_appointment_at(booking(patient_id, inactive_id, at(10, 10, 0), 30), clock())
        .await
        .unwrap_err();

    let report = rejection(err);
    assert_matches!(report.issues.as_slice(), [ValidationIssue::DoctorInactive]);
    assert!(report.has_field("doctor_id"));
}

#[tokio::test]
async fn unknown_doctor_and_patient_are_hard_errors() {
    let (store, patient_id, doctor_id) = seed().await;
    let service = AppointmentBookingService::new(store);

    let err = service
        .create_appointment_at(booking(patient_id, Uuid::new_v4(), at(10, 10, 0), 30), clock())
        .await
        .unwrap_err();
    assert_matches!(err, SchedulingError::DoctorNotFound(_));

    let err = service
        .create_appointment_at(booking(Uuid::new_v4(), doctor_id, at(10, 10, 0), 30), clock())
        .await
        .unwrap_err();
    assert_matches!(err, SchedulingError::PatientNotFound(_));
}

#[tokio::test]
async fn every_violation_is_reported_at_once() {
    let (store, patient_id, _) = seed().await;

    let inactive_id = Uuid::new_v4();
    store
        .upsert_doctor(Doctor {
            id: inactive_id,
            first_name: "Olga".to_string(),
            last_name: "Ivanova".to_string(),
            specialty: "Surgery".to_string(),
            room: None,
            is_active: false,
        })
        .await;

    let service = AppointmentBookingService::new(store);
    let err = service
        .create_appointment_at(booking(patient_id, inactive_id, at(10, 10, 5), 25), clock())
        .await
        .unwrap_err();

    let report = rejection(err);
    assert_eq!(report.issues.len(), 3);
    assert!(report.has_field("start_time"));
    assert!(report.has_field("duration_minutes"));
    assert!(report.has_field("doctor_id"));

    let fields = report.field_messages();
    assert!(fields.get("start_time").is_some());
    assert!(fields.get("duration_minutes").is_some());
    assert!(fields.get("doctor_id").is_some());
}

#[tokio::test]
async fn cancelling_requires_a_reason() {
    let (store, patient_id, doctor_id) = seed().await;
    let service = AppointmentBookingService::new(store);

    let appointment = service
        .create_appointment_at(booking(patient_id, doctor_id, at(10, 10, 0), 30), clock())
        .await
        .unwrap();

    let err = service
        .update_appointment_status_at(
            appointment.id,
            UpdateStatusRequest {
                status: AppointmentStatus::Cancelled,
                cancel_reason_type: None,
                cancel_reason_text: None,
            },
            clock(),
        )
        .await
        .unwrap_err();

    let report = rejection(err);
    assert_matches!(report.issues.as_slice(), [ValidationIssue::MissingCancelReason]);
    assert!(report.has_field("cancel_reason"));
}

#[tokio::test]
async fn cancelling_with_reason_type_fills_default_text() {
    let (store, patient_id, doctor_id) = seed().await;
    let service = AppointmentBookingService::new(store);

    let appointment = service
        .create_appointment_at(booking(patient_id, doctor_id, at(10, 10, 0), 30), clock())
        .await
        .unwrap();

    let cancelled = service
        .update_appointment_status_at(
            appointment.id,
            UpdateStatusRequest {
                status: AppointmentStatus::Cancelled,
                cancel_reason_type: Some(CancelReasonType::Other),
                cancel_reason_text: None,
            },
            clock(),
        )
        .await
        .unwrap();

    assert_eq!(cancelled.status, AppointmentStatus::Cancelled);
    assert_eq!(
        cancelled.cancel_reason_text.as_deref(),
        Some("Appointment cancelled")
    );
}

#[tokio::test]
async fn terminal_statuses_reject_further_transitions() {
    let (store, patient_id, doctor_id) = seed().await;
    let service = AppointmentBookingService::new(store);

    let appointment = service
        .create_appointment_at(booking(patient_id, doctor_id, at(10, 10, 0), 30), clock())
        .await
        .unwrap();

    service
        .update_appointment_status_at(
            appointment.id,
            UpdateStatusRequest {
                status: AppointmentStatus::Completed,
                cancel_reason_type: None,
                cancel_reason_text: None,
            },
            clock(),
        )
        .await
        .unwrap();

    let err = service
        .update_appointment_status_at(
            appointment.id,
            UpdateStatusRequest {
                status: AppointmentStatus::Active,
                cancel_reason_type: None,
                cancel_reason_text: None,
            },
            clock(),
        )
        .await
        .unwrap_err();

    let report = rejection(err);
    assert_matches!(
        report.issues.as_slice(),
        [ValidationIssue::InvalidTransition {
            from: AppointmentStatus::Completed,
            to: AppointmentStatus::Active,
        }]
    );
}

#[tokio::test]
async fn cancelled_appointment_frees_the_slot() {
    let (store, patient_id, doctor_id) = seed().await;
    let service = AppointmentBookingService::new(Arc::clone(&store));

    let appointment = service
        .create_appointment_at(booking(patient_id, doctor_id, at(10, 10, 0), 30), clock())
        .await
        .unwrap();

    service
        .update_appointment_status_at(
            appointment.id,
            UpdateStatusRequest {
                status: AppointmentStatus::Cancelled,
                cancel_reason_type: Some(CancelReasonType::PatientCancelled),
                cancel_reason_text: None,
            },
            clock(),
        )
        .await
        .unwrap();

    // The exact same slot can now be booked again.
    service
        .create_appointment_at(booking(patient_id, doctor_id, at(10, 10, 0), 30), clock())
        .await
        .unwrap();
}

#[tokio::test]
async fn reschedule_excludes_the_appointment_itself() {
    let (store, patient_id, doctor_id) = seed().await;
    let service = AppointmentBookingService::new(store);

    let appointment = service
        .create_appointment_at(booking(patient_id, doctor_id, at(10, 10, 0), 30), clock())
        .await
        .unwrap();

    // No-op save onto its own slot must succeed.
    service
        .reschedule_appointment_at(
            appointment.id,
            RescheduleRequest {
                new_start_time: at(10, 10, 0),
                new_duration_minutes: 30,
            },
            clock(),
        )
        .await
        .unwrap();

    // Extending over a neighbour must not.
    service
        .create_appointment_at(booking(patient_id, doctor_id, at(10, 10, 30), 30), clock())
        .await
        .unwrap();

    let err = service
        .reschedule_appointment_at(
            appointment.id,
            RescheduleRequest {
                new_start_time: at(10, 10, 0),
                new_duration_minutes: 40,
            },
            clock(),
        )
        .await
        .unwrap_err();
    let report = rejection(err);
    assert_matches!(report.issues.as_slice(), [ValidationIssue::TimeSlotTaken { .. }]);
}

#[tokio::test]
async fn doctor_schedule_is_ordered_and_day_scoped() {
    let (store, patient_id, doctor_id) = seed().await;
    let service = AppointmentBookingService::new(store);

    let afternoon = service
        .create_appointment_at(booking(patient_id, doctor_id, at(10, 14, 0), 30), clock())
        .await
        .unwrap();
    let morning = service
        .create_appointment_at(booking(patient_id, doctor_id, at(10, 9, 0), 30), clock())
        .await
        .unwrap();
    // Different day, must not appear.
    service
        .create_appointment_at(booking(patient_id, doctor_id, at(11, 9, 0), 30), clock())
        .await
        .unwrap();

    let schedule = service
        .get_doctor_schedule(doctor_id, NaiveDate::from_ymd_opt(2031, 3, 10).unwrap())
        .await
        .unwrap();

    let ids: Vec<_> = schedule.iter().map(|appt| appt.id).collect();
    assert_eq!(ids, vec![morning.id, afternoon.id]);
}
