use serde::Deserialize;

/// Request body for `POST /customers`.
#[derive(Debug, Deserialize)]
pub struct CreateCustomerRequest {
    pub nic: String,
    pub name: String,
}
