// libs/shared/models/src/appointment.rs
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: i32,
    pub status: AppointmentStatus,
    pub cancel_reason_type: Option<CancelReasonType>,
    pub cancel_reason_text: Option<String>,
    pub reason: Option<String>,
    pub diagnosis: Option<String>,
    pub treatment: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// End of the appointment's half-open `[start_time, end_time)` interval.
    pub fn end_time(&self) -> DateTime<Utc> {
        self.start_time + Duration::minutes(self.duration_minutes as i64)
    }

    /// Human-readable slot, e.g. "10:00 - 10:30".
    pub fn time_slot_display(&self) -> String {
        format!(
            "{} - {}",
            self.start_time.format("%H:%M"),
            self.end_time().format("%H:%M")
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Waiting,
    Active,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    /// Terminal statuses admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Completed | AppointmentStatus::Cancelled | AppointmentStatus::NoShow
        )
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Waiting => write!(f, "waiting"),
            AppointmentStatus::Active => write!(f, "active"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::NoShow => write!(f, "no_show"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CancelReasonType {
    PatientCancelled,
    DoctorCancelled,
    Emergency,
    Other,
}

impl CancelReasonType {
    /// Default comment used when an appointment is cancelled with a reason
    /// type but no free-text comment.
    pub fn default_text(&self) -> &'static str {
        match self {
            CancelReasonType::PatientCancelled => "Patient cancelled the appointment",
            CancelReasonType::DoctorCancelled => "Doctor cancelled the appointment",
            CancelReasonType::Emergency => "Emergency",
            CancelReasonType::Other => "Appointment cancelled",
        }
    }
}

impl fmt::Display for CancelReasonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelReasonType::PatientCancelled => write!(f, "patient_cancelled"),
            CancelReasonType::DoctorCancelled => write!(f, "doctor_cancelled"),
            CancelReasonType::Emergency => write!(f, "emergency"),
            CancelReasonType::Other => write!(f, "other"),
        }
    }
}
