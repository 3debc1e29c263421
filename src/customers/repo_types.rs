use serde::Serialize;
use sqlx::FromRow;

/// Customer record in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Customer {
    pub id: i32,      // assigned by the store
    pub nic: String,  // national identifier, unique
    pub name: String,
}

/// Customer fields supplied by a client before an id is assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    pub nic: String,
    pub name: String,
}
