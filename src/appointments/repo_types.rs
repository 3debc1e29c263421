use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::Date;

use crate::customers::repo_types::{Customer, NewCustomer};
use crate::store::StoreError;

/// Visit window within a day. Stored and sent as `AM` / `PM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeSlot {
    #[serde(rename = "AM")]
    Morning,
    #[serde(rename = "PM")]
    Afternoon,
}

impl TimeSlot {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeSlot::Morning => "AM",
            TimeSlot::Afternoon => "PM",
        }
    }
}

impl FromStr for TimeSlot {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AM" => Ok(TimeSlot::Morning),
            "PM" => Ok(TimeSlot::Afternoon),
            other => Err(StoreError::Corrupt(format!("unknown time slot {other:?}"))),
        }
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Appointment lifecycle label. Set once at creation; no transitions are exposed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "Scheduled",
            AppointmentStatus::Completed => "Completed",
            AppointmentStatus::Cancelled => "Cancelled",
        }
    }
}

impl FromStr for AppointmentStatus {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Scheduled" => Ok(AppointmentStatus::Scheduled),
            "Completed" => Ok(AppointmentStatus::Completed),
            "Cancelled" => Ok(AppointmentStatus::Cancelled),
            other => Err(StoreError::Corrupt(format!("unknown status {other:?}"))),
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Appointment with its customer populated, as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: i32,
    #[serde(with = "iso_date")]
    pub date: Date,
    pub time_slot: TimeSlot,
    pub status: AppointmentStatus,
    pub customer_id: i32,
    pub customer: Option<Customer>,
}

/// Flat row of `appointments JOIN customers`.
#[derive(Debug, FromRow)]
pub struct AppointmentRow {
    pub id: i32,
    pub date: Date,
    pub time_slot: String,
    pub status: String,
    pub customer_id: i32,
    pub customer_nic: String,
    pub customer_name: String,
}

impl TryFrom<AppointmentRow> for Appointment {
    type Error = StoreError;

    fn try_from(r: AppointmentRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            date: r.date,
            time_slot: r.time_slot.parse()?,
            status: r.status.parse()?,
            customer_id: r.customer_id,
            customer: Some(Customer {
                id: r.customer_id,
                nic: r.customer_nic,
                name: r.customer_name,
            }),
        })
    }
}

/// Appointment fields before persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAppointment {
    pub date: Date,
    pub time_slot: TimeSlot,
    pub status: AppointmentStatus,
}

/// Which customer a new appointment belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomerLink {
    Existing(i32),
    /// Inserted together with the appointment.
    New(NewCustomer),
}

/// `YYYY-MM-DD` on the wire. Timestamps such as `2025-03-04T00:00:00` are
/// accepted on input and truncated to their date.
pub(crate) mod iso_date {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use time::{macros::format_description, Date};

    pub fn parse(s: &str) -> Result<Date, time::error::Parse> {
        let date_part = s.split_once('T').map_or(s, |(d, _)| d);
        Date::parse(date_part.trim(), format_description!("[year]-[month]-[day]"))
    }

    pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        let s = date
            .format(format_description!("[year]-[month]-[day]"))
            .map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse(&s).map_err(|e| de::Error::custom(format!("invalid date {s:?}: {e}")))
    }
}
