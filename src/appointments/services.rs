use time::{Date, OffsetDateTime};
use tracing::{debug, info, warn};

use crate::appointments::{
    dto::CreateAppointmentRequest,
    repo_types::{Appointment, CustomerLink, NewAppointment},
    validation,
};
use crate::customers::repo_types::NewCustomer;
use crate::error::AppError;
use crate::state::AppState;

const MISSING_CUSTOMER: &str = "customer information (NIC) or identifier is required.";

pub async fn list_appointments(st: &AppState) -> Result<Vec<Appointment>, AppError> {
    Ok(st.store.list_appointments(None).await?)
}

/// Appointments of the customer with this NIC, newest first. Unknown NICs
/// yield an empty list.
pub async fn list_appointments_by_nic(
    st: &AppState,
    nic: &str,
) -> Result<Vec<Appointment>, AppError> {
    // no stored NIC is this short under the form rules
    if st.config.strict_validation && !validation::is_valid_lookup_nic(nic) {
        debug!(%nic, "lookup NIC below minimum length");
        return Ok(Vec::new());
    }
    Ok(st.store.list_appointments(Some(nic)).await?)
}

pub async fn get_appointment(st: &AppState, id: i32) -> Result<Appointment, AppError> {
    st.store
        .find_appointment(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("appointment {id} not found")))
}

pub async fn create_appointment(
    st: &AppState,
    req: CreateAppointmentRequest,
) -> Result<Appointment, AppError> {
    create_appointment_as_of(st, req, OffsetDateTime::now_utc().date()).await
}

/// Schedule an appointment, linking it to a customer by NIC when a customer
/// block is given (the stored customer wins over the supplied name), or by
/// explicit id otherwise. `today` only matters under strict validation.
pub async fn create_appointment_as_of(
    st: &AppState,
    req: CreateAppointmentRequest,
    today: Date,
) -> Result<Appointment, AppError> {
    let customer = match req.customer.filter(|c| !c.nic.trim().is_empty()) {
        Some(payload) => {
            if st.config.strict_validation {
                validation::validate_schedule(&payload.nic, &payload.name, req.date, today)
                    .map_err(|errs| {
                        warn!(nic = %payload.nic, errors = %validation::describe(&errs), "schedule form rejected");
                        AppError::Validation(validation::describe(&errs))
                    })?;
            }

            match st.store.find_customer_by_nic(&payload.nic).await? {
                Some(existing) => {
                    debug!(customer_id = existing.id, nic = %existing.nic, "linking to existing customer");
                    CustomerLink::Existing(existing.id)
                }
                None => {
                    if payload.name.trim().is_empty() {
                        return Err(AppError::Validation(
                            "customer name is required for a new customer".into(),
                        ));
                    }
                    CustomerLink::New(NewCustomer {
                        nic: payload.nic,
                        name: payload.name,
                    })
                }
            }
        }
        None => match req.customer_id {
            None | Some(0) => {
                warn!("appointment without customer information");
                return Err(AppError::Validation(MISSING_CUSTOMER.into()));
            }
            Some(id) => {
                if st.config.strict_validation {
                    validation::validate_visit_date(req.date, today).map_err(|errs| {
                        warn!(customer_id = id, errors = %validation::describe(&errs), "visit date rejected");
                        AppError::Validation(validation::describe(&errs))
                    })?;
                }
                CustomerLink::Existing(id)
            }
        },
    };

    let creates_customer = matches!(customer, CustomerLink::New(_));
    let appointment = st
        .store
        .insert_appointment(
            NewAppointment {
                date: req.date,
                time_slot: req.time_slot,
                status: req.status,
            },
            customer,
        )
        .await
        .map_err(|e| {
            warn!(error = %e, "insert appointment failed");
            AppError::from(e)
        })?;

    info!(
        appointment_id = appointment.id,
        customer_id = appointment.customer_id,
        date = %appointment.date,
        time_slot = %appointment.time_slot,
        new_customer = creates_customer,
        "appointment scheduled"
    );
    Ok(appointment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appointments::dto::CustomerPayload;
    use crate::appointments::repo_types::{AppointmentStatus, TimeSlot};
    use crate::config::AppConfig;
    use crate::customers::services as customers;
    use crate::store::{testing::BlindNicStore, MemoryStore, Store};
    use std::sync::Arc;
    use time::{macros::date, Duration};

    // Wednesday
    const TODAY: Date = date!(2025 - 03 - 05);

    fn request(date: Date, slot: TimeSlot, customer: Option<(&str, &str)>) -> CreateAppointmentRequest {
        CreateAppointmentRequest {
            date,
            time_slot: slot,
            status: AppointmentStatus::Scheduled,
            customer: customer.map(|(nic, name)| CustomerPayload {
                nic: nic.into(),
                name: name.into(),
            }),
            customer_id: None,
        }
    }

    fn for_customer_id(date: Date, id: i32) -> CreateAppointmentRequest {
        CreateAppointmentRequest {
            customer_id: Some(id),
            ..request(date, TimeSlot::Morning, None)
        }
    }

    async fn customers_with_nic(st: &AppState, nic: &str) -> usize {
        customers::list_customers(st)
            .await
            .unwrap()
            .iter()
            .filter(|c| c.nic == nic)
            .count()
    }

    #[tokio::test]
    async fn list_is_empty_without_appointments() {
        let st = AppState::fake();
        assert!(list_appointments(&st).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_includes_customer() {
        let st = AppState::fake();
        let c = customers::create_customer(&st, "111111", "Test User").await.unwrap();
        create_appointment(&st, for_customer_id(TODAY + Duration::days(1), c.id))
            .await
            .unwrap();

        let all = list_appointments(&st).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].customer.as_ref().unwrap().name, "Test User");
    }

    #[tokio::test]
    async fn unknown_nic_lists_nothing() {
        let st = AppState::fake();
        assert!(list_appointments_by_nic(&st, "999999").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn customer_without_appointments_lists_nothing() {
        let st = AppState::fake();
        customers::create_customer(&st, "888888", "No Visits").await.unwrap();
        assert!(list_appointments_by_nic(&st, "888888").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn by_nic_filters_to_one_customer() {
        let st = AppState::fake();
        let maria = customers::create_customer(&st, "222222", "Maria Test").await.unwrap();
        let other = customers::create_customer(&st, "232323", "Other").await.unwrap();
        create_appointment(&st, for_customer_id(TODAY + Duration::days(1), maria.id))
            .await
            .unwrap();
        create_appointment(&st, for_customer_id(TODAY + Duration::days(2), maria.id))
            .await
            .unwrap();
        create_appointment(&st, for_customer_id(TODAY + Duration::days(3), other.id))
            .await
            .unwrap();

        let found = list_appointments_by_nic(&st, "222222").await.unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|a| a.customer_id == maria.id));
    }

    #[tokio::test]
    async fn lists_are_ordered_by_date_descending() {
        let st = AppState::fake();
        let c = customers::create_customer(&st, "333333", "Order Test").await.unwrap();
        create_appointment(&st, for_customer_id(TODAY + Duration::days(1), c.id))
            .await
            .unwrap();
        create_appointment(&st, for_customer_id(TODAY + Duration::days(5), c.id))
            .await
            .unwrap();

        for list in [
            list_appointments(&st).await.unwrap(),
            list_appointments_by_nic(&st, "333333").await.unwrap(),
        ] {
            assert_eq!(list.len(), 2);
            assert_eq!(list[0].date, TODAY + Duration::days(5));
            assert!(list[0].date > list[1].date);
        }
    }

    #[tokio::test]
    async fn new_nic_creates_customer_and_links_it() {
        let st = AppState::fake();
        let created = create_appointment(
            &st,
            request(TODAY + Duration::days(3), TimeSlot::Morning, Some(("444444", "New Customer"))),
        )
        .await
        .unwrap();

        assert!(created.id > 0);
        assert_eq!(created.status, AppointmentStatus::Scheduled);

        let saved = customers::get_customer_by_nic(&st, "444444").await.unwrap();
        assert_eq!(saved.name, "New Customer");
        assert_eq!(created.customer_id, saved.id);
        assert_eq!(created.customer, Some(saved));
        assert_eq!(customers_with_nic(&st, "444444").await, 1);
    }

    #[tokio::test]
    async fn existing_nic_links_without_duplicating() {
        let st = AppState::fake();
        let existing = customers::create_customer(&st, "555555", "Existing").await.unwrap();

        let created = create_appointment(
            &st,
            request(TODAY + Duration::days(4), TimeSlot::Afternoon, Some(("555555", "Different"))),
        )
        .await
        .unwrap();

        assert_eq!(created.customer_id, existing.id);
        assert_eq!(created.customer.as_ref().unwrap().name, "Existing");
        assert_eq!(customers_with_nic(&st, "555555").await, 1);
        let stored = customers::get_customer_by_nic(&st, "555555").await.unwrap();
        assert_eq!(stored.name, "Existing");
    }

    #[tokio::test]
    async fn keeps_requested_time_slot() {
        let st = AppState::fake();
        let created = create_appointment(
            &st,
            request(TODAY + Duration::days(5), TimeSlot::Afternoon, Some(("666666", "PM Customer"))),
        )
        .await
        .unwrap();
        assert_eq!(created.time_slot, TimeSlot::Afternoon);
    }

    #[tokio::test]
    async fn missing_customer_is_a_validation_error() {
        let st = AppState::fake();
        let err = create_appointment(&st, request(TODAY, TimeSlot::Morning, None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == MISSING_CUSTOMER));

        // sentinel id and empty NIC count as missing
        let err = create_appointment(&st, for_customer_id(TODAY, 0)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        let err = create_appointment(&st, request(TODAY, TimeSlot::Morning, Some(("", "Ana"))))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        assert!(list_appointments(&st).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_customer_id_is_a_validation_error() {
        let st = AppState::fake();
        let err = create_appointment(&st, for_customer_id(TODAY, 42)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn new_customer_needs_a_name() {
        let st = AppState::fake();
        let err = create_appointment(&st, request(TODAY, TimeSlot::Morning, Some(("123456", " "))))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(customers::list_customers(&st).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn created_appointment_is_readable_by_id() {
        let st = AppState::fake();
        let created = create_appointment(
            &st,
            request(TODAY, TimeSlot::Morning, Some(("121212", "Lookup"))),
        )
        .await
        .unwrap();
        assert_eq!(get_appointment(&st, created.id).await.unwrap(), created);
        assert!(matches!(get_appointment(&st, 999).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn upsert_race_surfaces_as_conflict() {
        let inner = MemoryStore::new();
        inner
            .insert_customer(NewCustomer {
                nic: "777777".into(),
                name: "Winner".into(),
            })
            .await
            .unwrap();
        let st = AppState::from_parts(
            Arc::new(BlindNicStore(inner)),
            Arc::new(AppConfig::default()),
        );

        let err = create_appointment(&st, request(TODAY, TimeSlot::Morning, Some(("777777", "Loser"))))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert!(list_appointments(&st).await.unwrap().is_empty());
        assert_eq!(customers_with_nic(&st, "777777").await, 1);
    }

    #[tokio::test]
    async fn strict_mode_applies_form_rules() {
        let st = AppState::fake_strict();

        let weekend = request(date!(2025 - 03 - 08), TimeSlot::Morning, Some(("123456", "Ana")));
        let err = create_appointment_as_of(&st, weekend, TODAY).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m.contains("Weekends")));

        let past = request(date!(2025 - 03 - 04), TimeSlot::Morning, Some(("123456", "Ana")));
        let err = create_appointment_as_of(&st, past, TODAY).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m.contains("past")));

        let letters = request(TODAY, TimeSlot::Morning, Some(("12ab", "Ana")));
        let err = create_appointment_as_of(&st, letters, TODAY).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m.contains("only numbers")));

        let ok = request(date!(2025 - 03 - 07), TimeSlot::Morning, Some(("123456", "Ana")));
        assert!(create_appointment_as_of(&st, ok, TODAY).await.is_ok());
    }

    #[tokio::test]
    async fn strict_mode_checks_date_for_customer_id_bookings() {
        let st = AppState::fake_strict();
        let c = customers::create_customer(&st, "343434", "By Id").await.unwrap();

        let err = create_appointment_as_of(&st, for_customer_id(date!(2025 - 03 - 08), c.id), TODAY)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m.contains("Weekends")));

        let err = create_appointment_as_of(&st, for_customer_id(date!(2025 - 03 - 03), c.id), TODAY)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m.contains("past")));

        let ok = for_customer_id(date!(2025 - 03 - 06), c.id);
        assert!(create_appointment_as_of(&st, ok, TODAY).await.is_ok());
        assert_eq!(list_appointments(&st).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn strict_mode_short_lookup_nic_lists_nothing() {
        let st = AppState::fake_strict();
        assert!(list_appointments_by_nic(&st, "12").await.unwrap().is_empty());
        assert!(list_appointments_by_nic(&st, "1234").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn permissive_mode_accepts_past_weekend_dates() {
        let st = AppState::fake();
        let req = request(date!(2025 - 03 - 01), TimeSlot::Morning, Some(("ab", "A")));
        assert!(create_appointment_as_of(&st, req, TODAY).await.is_ok());
    }
}
