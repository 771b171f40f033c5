use chrono::{DateTime, Duration, Utc};

use shared_models::{Appointment, NotificationDraft, NotificationKind, NotificationStatus};

pub const SMS_CONFIRMATION_DELAY_MINUTES: i64 = 1;
pub const EMAIL_REMINDER_LEAD_HOURS: i64 = 24;

/// Derives the reminder notifications for a freshly booked appointment.
#[derive(Debug, Clone)]
pub struct NotificationScheduler {
    confirmation_delay: Duration,
    reminder_lead: Duration,
}

impl Default for NotificationScheduler {
    fn default() -> Self {
        Self {
            confirmation_delay: Duration::minutes(SMS_CONFIRMATION_DELAY_MINUTES),
            reminder_lead: Duration::hours(EMAIL_REMINDER_LEAD_HOURS),
        }
    }
}

impl NotificationScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an sms confirmation at `now + 1m` followed by an email
    /// reminder at `max(now, time_slot - 24h)`.
    pub fn schedule(&self, appointment: &Appointment, now: DateTime<Utc>) -> Vec<NotificationDraft> {
        let confirm_at = now + self.confirmation_delay;

        // Last-minute bookings get the reminder straight away.
        let remind_at = (appointment.time_slot - self.reminder_lead).max(now);

        vec![
            NotificationDraft {
                appointment_id: appointment.id,
                kind: NotificationKind::Sms,
                send_at: confirm_at,
                status: NotificationStatus::Pending,
            },
            NotificationDraft {
                appointment_id: appointment.id,
                kind: NotificationKind::Email,
                send_at: remind_at,
                status: NotificationStatus::Pending,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn appointment_at(time_slot: DateTime<Utc>) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            doctor_id: Uuid::new_v4(),
            time_slot,
            status: "confirmed".to_string(),
            notes: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_reminder_is_a_day_ahead_of_distant_slot() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let appointment = appointment_at(Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap());

        let drafts = NotificationScheduler::new().schedule(&appointment, now);

        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].kind, NotificationKind::Sms);
        assert_eq!(drafts[0].send_at, Utc.with_ymd_and_hms(2024, 1, 1, 0, 1, 0).unwrap());
        assert_eq!(drafts[1].kind, NotificationKind::Email);
        assert_eq!(drafts[1].send_at, Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap());
        assert!(drafts.iter().all(|d| d.status == NotificationStatus::Pending));
        assert!(drafts.iter().all(|d| d.appointment_id == appointment.id));
    }

    #[test]
    fn test_reminder_is_clamped_for_near_term_slot() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let appointment = appointment_at(Utc.with_ymd_and_hms(2024, 1, 1, 1, 0, 0).unwrap());

        let drafts = NotificationScheduler::new().schedule(&appointment, now);

        assert_eq!(drafts[0].send_at, now + Duration::minutes(1));
        assert_eq!(drafts[1].send_at, now);
    }

    #[test]
    fn test_reminder_boundary_at_one_day() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let appointment = appointment_at(now + Duration::hours(24));

        let drafts = NotificationScheduler::new().schedule(&appointment, now);
        assert_eq!(drafts[1].send_at, now);

        let appointment = appointment_at(now + Duration::hours(25));
        let drafts = NotificationScheduler::new().schedule(&appointment, now);
        assert_eq!(drafts[1].send_at, now + Duration::hours(1));
    }

    #[test]
    fn test_schedule_is_deterministic() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 8, 30, 0).unwrap();
        let appointment = appointment_at(now + Duration::days(7));
        let scheduler = NotificationScheduler::new();

        assert_eq!(scheduler.schedule(&appointment, now), scheduler.schedule(&appointment, now));
    }
}
