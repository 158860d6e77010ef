// libs/scheduling-cell/src/models.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use shared_models::appointment::{Appointment, AppointmentStatus, CancelReasonType};

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: i32,
    /// Defaults to `scheduled`. Historical records may be created directly in
    /// another status; those skip the past-time and conflict checks.
    pub status: Option<AppointmentStatus>,
    pub reason: Option<String>,
    pub cancel_reason_type: Option<CancelReasonType>,
    pub cancel_reason_text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: AppointmentStatus,
    pub cancel_reason_type: Option<CancelReasonType>,
    pub cancel_reason_text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleRequest {
    pub new_start_time: DateTime<Utc>,
    pub new_duration_minutes: i32,
}

#[derive(Debug, Deserialize)]
pub struct ScheduleQuery {
    pub date: NaiveDate,
}

// ==============================================================================
// CONFLICT REPORTING
// ==============================================================================

/// Summary of the appointment already holding a contested slot, carried by
/// `TimeSlotTaken` so the caller can render a human-readable message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictSummary {
    pub appointment_id: Uuid,
    pub patient_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: i32,
    pub end_time: DateTime<Utc>,
}

impl From<&Appointment> for ConflictSummary {
    fn from(appointment: &Appointment) -> Self {
        Self {
            appointment_id: appointment.id,
            patient_id: appointment.patient_id,
            start_time: appointment.start_time,
            duration_minutes: appointment.duration_minutes,
            end_time: appointment.end_time(),
        }
    }
}

impl fmt::Display for ConflictSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "patient {} at {} ({} min, ends {})",
            self.patient_id,
            self.start_time.format("%d.%m.%Y %H:%M"),
            self.duration_minutes,
            self.end_time.format("%H:%M"),
        )
    }
}

// ==============================================================================
// VALIDATION ERRORS
// ==============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum ValidationIssue {
    NotAligned,
    InvalidDuration {
        minutes: i32,
    },
    PastBooking,
    DoctorInactive,
    TimeSlotTaken {
        conflict: ConflictSummary,
    },
    MissingCancelReason,
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },
}

impl ValidationIssue {
    /// The request field the issue belongs to, so a UI can highlight it.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationIssue::NotAligned
            | ValidationIssue::PastBooking
            | ValidationIssue::TimeSlotTaken { .. } => "start_time",
            ValidationIssue::InvalidDuration { .. } => "duration_minutes",
            ValidationIssue::DoctorInactive => "doctor_id",
            ValidationIssue::MissingCancelReason => "cancel_reason",
            ValidationIssue::InvalidTransition { .. } => "status",
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::NotAligned => {
                write!(
                    f,
                    "start time must fall on a 10-minute boundary (10:00, 10:10, 10:20, ...)"
                )
            }
            ValidationIssue::InvalidDuration { minutes } => {
                write!(
                    f,
                    "duration must be a multiple of 10 minutes between 10 and 480, got {minutes}"
                )
            }
            ValidationIssue::PastBooking => {
                write!(f, "cannot schedule an appointment in the past")
            }
            ValidationIssue::DoctorInactive => {
                write!(f, "this doctor is not currently seeing patients")
            }
            ValidationIssue::TimeSlotTaken { conflict } => {
                write!(f, "time slot already taken: {conflict}")
            }
            ValidationIssue::MissingCancelReason => {
                write!(f, "a cancellation reason or comment is required")
            }
            ValidationIssue::InvalidTransition { from, to } => {
                write!(f, "cannot move appointment from {from} to {to}")
            }
        }
    }
}

/// Aggregate of every rule an appointment save violated, one message per
/// offending field, so a caller can surface all problems at once.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn push(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.issues.iter().any(|issue| issue.field() == field)
    }

    /// Field -> message map; the first issue per field wins.
    pub fn field_messages(&self) -> serde_json::Value {
        let mut fields = serde_json::Map::new();
        for issue in &self.issues {
            fields
                .entry(issue.field().to_string())
                .or_insert_with(|| serde_json::Value::String(issue.to_string()));
        }
        serde_json::Value::Object(fields)
    }

    pub fn into_result(self) -> Result<(), SchedulingError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(SchedulingError::Rejected(self))
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.issues.iter().map(ToString::to_string).collect();
        write!(f, "{}", messages.join("; "))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SchedulingError {
    #[error("appointment {0} not found")]
    AppointmentNotFound(Uuid),

    #[error("doctor {0} not found")]
    DoctorNotFound(Uuid),

    #[error("patient {0} not found")]
    PatientNotFound(Uuid),

    #[error("validation failed: {0}")]
    Rejected(ValidationReport),
}
