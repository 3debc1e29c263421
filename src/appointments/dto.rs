use serde::Deserialize;
use time::Date;

use crate::appointments::repo_types::{iso_date, AppointmentStatus, TimeSlot};

/// Customer block of a scheduling request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerPayload {
    #[serde(default)]
    pub nic: String,
    #[serde(default)]
    pub name: String,
}

/// Request body for `POST /appointments`.
///
/// Either `customer` (looked up or created by NIC) or `customerId` must be set.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub time_slot: TimeSlot,
    #[serde(default)]
    pub status: AppointmentStatus,
    #[serde(default)]
    pub customer: Option<CustomerPayload>,
    #[serde(default)]
    pub customer_id: Option<i32>,
}
