//! Schedule form rules: what the booking form checks before submitting.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;
use time::{Date, Weekday};

pub const MIN_NIC_LEN: usize = 4;
pub const MIN_NAME_LEN: usize = 2;

/// Field name → message. At most one message per field.
pub type FieldErrors = BTreeMap<&'static str, String>;

fn is_numeric_nic(nic: &str) -> bool {
    lazy_static! {
        static ref NIC_RE: Regex = Regex::new(r"^\d+$").unwrap();
    }
    NIC_RE.is_match(nic)
}

/// Minimum check the lookup form applies before searching by NIC.
pub fn is_valid_lookup_nic(nic: &str) -> bool {
    nic.trim().chars().count() >= MIN_NIC_LEN
}

pub fn validate_schedule(nic: &str, name: &str, date: Date, today: Date) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    if nic.trim().chars().count() < MIN_NIC_LEN {
        errors.insert("nic", "NIC must be at least 4 characters".into());
    }
    // overrides the length message
    if !is_numeric_nic(nic) {
        errors.insert("nic", "NIC must contain only numbers".into());
    }

    if name.trim().chars().count() < MIN_NAME_LEN {
        errors.insert("name", "Full name is required (min. 2 characters)".into());
    }

    if let Some(msg) = date_error(date, today) {
        errors.insert("date", msg.into());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Date rules alone, for bookings that reference a customer by id.
pub fn validate_visit_date(date: Date, today: Date) -> Result<(), FieldErrors> {
    match date_error(date, today) {
        Some(msg) => Err(FieldErrors::from([("date", msg.to_string())])),
        None => Ok(()),
    }
}

// weekend wins over past
fn date_error(date: Date, today: Date) -> Option<&'static str> {
    if matches!(date.weekday(), Weekday::Saturday | Weekday::Sunday) {
        Some("Weekends are not available for visits")
    } else if date < today {
        Some("Date cannot be in the past")
    } else {
        None
    }
}

/// Single-line rendering used in 400 responses.
pub fn describe(errors: &FieldErrors) -> String {
    errors
        .iter()
        .map(|(field, msg)| format!("{field}: {msg}"))
        .collect::<Vec<_>>()
        .join("; ")
}
