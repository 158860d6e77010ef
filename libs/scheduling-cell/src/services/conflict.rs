// libs/scheduling-cell/src/services/conflict.rs
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_models::appointment::Appointment;
use shared_store::ClinicStore;

/// Detects doctor double-booking among `scheduled` appointments.
///
/// Only scheduled rows hold a slot: a cancelled, completed or in-progress
/// appointment frees it for new bookings.
pub struct ConflictDetectionService {
    store: Arc<ClinicStore>,
}

impl ConflictDetectionService {
    pub fn new(store: Arc<ClinicStore>) -> Self {
        Self { store }
    }

    /// First scheduled appointment of the doctor whose half-open interval
    /// overlaps `[start, end)`, excluding the appointment being edited.
    /// Candidates are scanned in ascending start-time order, so the returned
    /// conflict is deterministic.
    pub async fn find_conflict(
        &self,
        doctor_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_appointment_id: Option<Uuid>,
    ) -> Option<Appointment> {
        debug!(
            "Checking conflicts for doctor {} from {} to {}",
            doctor_id, start, end
        );

        let existing = self.store.scheduled_for_doctor(doctor_id).await;
        for appointment in existing {
            if Some(appointment.id) == exclude_appointment_id {
                continue;
            }
            if overlaps(start, end, appointment.start_time, appointment.end_time()) {
                warn!(
                    "Conflict detected for doctor {}: appointment {} occupies {}",
                    doctor_id,
                    appointment.id,
                    appointment.time_slot_display()
                );
                return Some(appointment);
            }
        }

        None
    }
}

/// Half-open interval overlap: `[s1, e1)` and `[s2, e2)` conflict iff
/// `s1 < e2 && e1 > s2`. Touching endpoints do not conflict, so back-to-back
/// appointments are always allowed.
pub fn overlaps(
    s1: DateTime<Utc>,
    e1: DateTime<Utc>,
    s2: DateTime<Utc>,
    e2: DateTime<Utc>,
) -> bool {
    s1 < e2 && e1 > s2
}
