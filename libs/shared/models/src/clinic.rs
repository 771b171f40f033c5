use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_APPOINTMENT_STATUS: &str = "confirmed";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub medical_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPatient {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub medical_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub name: String,
    pub specialty: String,
    #[serde(default)]
    pub contact: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDoctor {
    pub name: String,
    pub specialty: String,
    pub contact: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub time_slot: DateTime<Utc>,
    pub status: String,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

/// Insert parameters for an appointment. The store owns id and timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAppointment {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub time_slot: DateTime<Utc>,
    pub status: String,
    pub notes: String,
}

/// Filters for listing a patient's appointments. Bounds are inclusive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub status: Option<String>,
    pub limit: usize,
    pub offset: usize,
}

impl Default for AppointmentFilter {
    fn default() -> Self {
        Self {
            from: None,
            to: None,
            status: None,
            limit: 50,
            offset: 0,
        }
    }
}

impl AppointmentFilter {
    pub fn matches(&self, appointment: &Appointment) -> bool {
        if let Some(from) = self.from {
            if appointment.time_slot < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if appointment.time_slot > to {
                return false;
            }
        }
        match self.status.as_deref() {
            Some(status) if !status.is_empty() => appointment.status == status,
            _ => true,
        }
    }
}

/// Parses an optional RFC 3339 query bound, dropping anything malformed.
pub fn parse_time_bound(raw: Option<&str>) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw?.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// One row of a specialty schedule: an appointment joined with its doctor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub doctor_id: Uuid,
    pub doctor_name: String,
    pub specialty: String,
    pub appointment_id: Uuid,
    pub patient_id: Uuid,
    pub time_slot: DateTime<Utc>,
    pub status: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Sms,
    Email,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Sms => "sms",
            NotificationKind::Email => "email",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivery state. `Sent` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    Pending,
    Sent,
    Failed,
}

impl NotificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationStatus::Pending => "pending",
            NotificationStatus::Sent => "sent",
            NotificationStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, NotificationStatus::Pending)
    }

    pub fn can_transition_to(&self, target: &NotificationStatus) -> bool {
        use NotificationStatus::*;
        matches!((self, target), (Pending, Sent) | (Pending, Failed))
    }
}

impl fmt::Display for NotificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub appointment_id: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub send_at: DateTime<Utc>,
    pub status: NotificationStatus,
    #[serde(default)]
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == NotificationStatus::Pending && self.send_at <= now
    }
}

/// A notification that has been scheduled but not yet persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationDraft {
    pub appointment_id: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub send_at: DateTime<Utc>,
    pub status: NotificationStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn notification(status: NotificationStatus, send_at: DateTime<Utc>) -> Notification {
        Notification {
            id: Uuid::new_v4(),
            appointment_id: Uuid::new_v4(),
            kind: NotificationKind::Sms,
            send_at,
            status,
            last_error: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_only_pending_transitions_allowed() {
        use NotificationStatus::*;
        assert!(Pending.can_transition_to(&Sent));
        assert!(Pending.can_transition_to(&Failed));
        assert!(!Sent.can_transition_to(&Failed));
        assert!(!Failed.can_transition_to(&Sent));
        assert!(!Sent.can_transition_to(&Pending));
        assert!(Sent.is_terminal() && Failed.is_terminal());
    }

    #[test]
    fn test_due_includes_boundary() {
        let now = Utc::now();
        assert!(notification(NotificationStatus::Pending, now).is_due(now));
        assert!(!notification(NotificationStatus::Pending, now + Duration::seconds(1)).is_due(now));
        assert!(!notification(NotificationStatus::Sent, now - Duration::hours(1)).is_due(now));
    }

    #[test]
    fn test_notification_wire_format() {
        let n = notification(NotificationStatus::Pending, Utc::now());
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["type"], "sms");
        assert_eq!(json["status"], "pending");
    }

    #[test]
    fn test_filter_bounds_are_inclusive() {
        let slot = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            doctor_id: Uuid::new_v4(),
            time_slot: slot,
            status: "confirmed".to_string(),
            notes: String::new(),
            created_at: slot,
        };
        let filter = AppointmentFilter {
            from: Some(slot),
            to: Some(slot),
            ..Default::default()
        };
        assert!(filter.matches(&appointment));

        let filter = AppointmentFilter {
            status: Some("cancelled".to_string()),
            ..Default::default()
        };
        assert!(!filter.matches(&appointment));
    }

    #[test]
    fn test_time_bound_parsing() {
        let expected = Utc.with_ymd_and_hms(2030, 1, 1, 9, 0, 0).unwrap();
        assert_eq!(parse_time_bound(Some("2030-01-01T09:00:00Z")), Some(expected));
        assert_eq!(parse_time_bound(Some(" 2030-01-01T10:00:00+01:00 ")), Some(expected));
        assert_eq!(parse_time_bound(Some("tomorrow")), None);
        assert_eq!(parse_time_bound(None), None);
    }
}
