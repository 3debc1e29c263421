use tracing::{info, warn};

use crate::customers::repo_types::{Customer, NewCustomer};
use crate::error::AppError;
use crate::state::AppState;

pub async fn list_customers(st: &AppState) -> Result<Vec<Customer>, AppError> {
    Ok(st.store.list_customers().await?)
}

pub async fn get_customer(st: &AppState, id: i32) -> Result<Customer, AppError> {
    st.store
        .find_customer(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("customer {id} not found")))
}

pub async fn get_customer_by_nic(st: &AppState, nic: &str) -> Result<Customer, AppError> {
    st.store
        .find_customer_by_nic(nic)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("customer with NIC {nic} not found")))
}

/// Create a customer keyed by NIC.
///
/// The existence check is advisory; a concurrent insert of the same NIC is
/// rejected by the store's unique constraint and also surfaces as `Conflict`.
pub async fn create_customer(st: &AppState, nic: &str, name: &str) -> Result<Customer, AppError> {
    if nic.trim().is_empty() {
        return Err(AppError::Validation("nic is required".into()));
    }
    if name.trim().is_empty() {
        return Err(AppError::Validation("name is required".into()));
    }

    if st.store.find_customer_by_nic(nic).await?.is_some() {
        warn!(%nic, "customer already exists");
        return Err(AppError::Conflict(format!(
            "Customer with NIC {nic} already exists."
        )));
    }

    let customer = st
        .store
        .insert_customer(NewCustomer {
            nic: nic.to_string(),
            name: name.to_string(),
        })
        .await
        .map_err(|e| {
            warn!(error = %e, %nic, "insert customer failed");
            AppError::from(e)
        })?;

    info!(customer_id = customer.id, nic = %customer.nic, "customer created");
    Ok(customer)
}
