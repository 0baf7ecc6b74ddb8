//! Appointment model

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::workflow::AppointmentStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub name: String,
    pub phone_number: String,
    pub email: String,
    pub date_of_booking: NaiveDate,
    pub time: NaiveTime,
    pub link_meet: Option<String>,
    /// Assigned staff member
    pub host_id: Option<i64>,
    pub status: AppointmentStatus,
    pub pdf_file: Option<String>,
    pub img: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Booking request. Date and time are optional here so that a missing value
/// is reported as a validation failure rather than a body parse error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateAppointmentInput {
    pub name: String,
    pub phone_number: String,
    pub email: String,
    pub date_of_booking: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub link_meet: Option<String>,
    pub pdf_file: Option<String>,
    pub img: Option<String>,
}

/// A validated booking ready for insertion
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub name: String,
    pub phone_number: String,
    pub email: String,
    pub date_of_booking: NaiveDate,
    pub time: NaiveTime,
    pub link_meet: Option<String>,
    pub status: AppointmentStatus,
    pub pdf_file: Option<String>,
    pub img: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_parses_date_and_time() {
        let input: CreateAppointmentInput = serde_json::from_str(
            r#"{"name":"Budi","email":"b@example.com","date_of_booking":"2024-05-01","time":"14:30:00"}"#,
        )
        .unwrap();
        assert_eq!(input.date_of_booking, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(input.time, NaiveTime::from_hms_opt(14, 30, 0));
        assert!(input.link_meet.is_none());
    }
}
