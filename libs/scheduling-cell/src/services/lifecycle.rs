// libs/scheduling-cell/src/services/lifecycle.rs
use tracing::{debug, warn};

use shared_models::appointment::{Appointment, AppointmentStatus};

use crate::models::ValidationIssue;

/// State machine over appointment statuses.
///
/// `scheduled` and `waiting` may move to any later stage; `active` may only
/// finish; `completed`, `cancelled` and `no_show` are terminal.
#[derive(Default)]
pub struct AppointmentLifecycleService;

impl AppointmentLifecycleService {
    pub fn new() -> Self {
        Self
    }

    pub fn allowed_transitions(&self, from: AppointmentStatus) -> &'static [AppointmentStatus] {
        match from {
            AppointmentStatus::Scheduled => &[
                AppointmentStatus::Waiting,
                AppointmentStatus::Active,
                AppointmentStatus::Completed,
                AppointmentStatus::Cancelled,
                AppointmentStatus::NoShow,
            ],
            AppointmentStatus::Waiting => &[
                AppointmentStatus::Active,
                AppointmentStatus::Completed,
                AppointmentStatus::Cancelled,
                AppointmentStatus::NoShow,
            ],
            AppointmentStatus::Active => &[
                AppointmentStatus::Completed,
                AppointmentStatus::Cancelled,
                AppointmentStatus::NoShow,
            ],
            AppointmentStatus::Completed
            | AppointmentStatus::Cancelled
            | AppointmentStatus::NoShow => &[],
        }
    }

    /// Validates a status change. Saving with an unchanged status is a no-op,
    /// not a transition.
    pub fn validate_transition(
        &self,
        from: AppointmentStatus,
        to: AppointmentStatus,
    ) -> Result<(), ValidationIssue> {
        if from == to {
            return Ok(());
        }
        if !self.allowed_transitions(from).contains(&to) {
            warn!("Invalid status transition attempted: {} -> {}", from, to);
            return Err(ValidationIssue::InvalidTransition { from, to });
        }
        debug!("Status transition validated: {} -> {}", from, to);
        Ok(())
    }

    /// Fills `cancel_reason_text` from the reason type's fixed default when
    /// an appointment is cancelled with a type but no comment. A derived
    /// default, not a separate transition.
    pub fn apply_cancellation_defaults(&self, appointment: &mut Appointment) {
        if appointment.status != AppointmentStatus::Cancelled {
            return;
        }
        let text_missing = appointment
            .cancel_reason_text
            .as_deref()
            .map_or(true, |text| text.trim().is_empty());
        if text_missing {
            if let Some(reason_type) = appointment.cancel_reason_type {
                appointment.cancel_reason_text = Some(reason_type.default_text().to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Utc;
    use shared_models::appointment::CancelReasonType;
    use uuid::Uuid;

    fn service() -> AppointmentLifecycleService {
        AppointmentLifecycleService::new()
    }

    fn cancelled_appointment(
        reason_type: Option<CancelReasonType>,
        reason_text: Option<&str>,
    ) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            doctor_id: Uuid::new_v4(),
            start_time: Utc::now(),
            duration_minutes: 30,
            status: AppointmentStatus::Cancelled,
            cancel_reason_type: reason_type,
            cancel_reason_text: reason_text.map(str::to_string),
            reason: None,
            diagnosis: None,
            treatment: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn scheduled_reaches_every_later_stage() {
        let service = service();
        for to in [
            AppointmentStatus::Waiting,
            AppointmentStatus::Active,
            AppointmentStatus::Completed,
            AppointmentStatus::Cancelled,
            AppointmentStatus::NoShow,
        ] {
            assert!(service
                .validate_transition(AppointmentStatus::Scheduled, to)
                .is_ok());
        }
    }

    #[test]
    fn active_cannot_return_to_waiting() {
        assert_matches!(
            service().validate_transition(AppointmentStatus::Active, AppointmentStatus::Waiting),
            Err(ValidationIssue::InvalidTransition { .. })
        );
    }

    #[test]
    fn terminal_states_admit_no_transitions() {
        let service = service();
        for from in [
            AppointmentStatus::Completed,
            AppointmentStatus::Cancelled,
            AppointmentStatus::NoShow,
        ] {
            assert!(service.allowed_transitions(from).is_empty());
            assert_matches!(
                service.validate_transition(from, AppointmentStatus::Scheduled),
                Err(ValidationIssue::InvalidTransition { .. })
            );
        }
    }

    #[test]
    fn unchanged_status_is_a_noop() {
        assert!(service()
            .validate_transition(AppointmentStatus::Completed, AppointmentStatus::Completed)
            .is_ok());
    }

    #[test]
    fn cancellation_text_defaults_per_reason_type() {
        let service = service();
        let cases = [
            (CancelReasonType::PatientCancelled, "Patient cancelled the appointment"),
            (CancelReasonType::DoctorCancelled, "Doctor cancelled the appointment"),
            (CancelReasonType::Emergency, "Emergency"),
            (CancelReasonType::Other, "Appointment cancelled"),
        ];
        for (reason_type, expected) in cases {
            let mut appointment = cancelled_appointment(Some(reason_type), None);
            service.apply_cancellation_defaults(&mut appointment);
            assert_eq!(appointment.cancel_reason_text.as_deref(), Some(expected));
        }
    }

    #[test]
    fn explicit_cancellation_text_is_kept() {
        let service = service();
        let mut appointment =
            cancelled_appointment(Some(CancelReasonType::Other), Some("family emergency"));
        service.apply_cancellation_defaults(&mut appointment);
        assert_eq!(
            appointment.cancel_reason_text.as_deref(),
            Some("family emergency")
        );
    }
}
