use async_trait::async_trait;
use time::Date;
use tokio::sync::RwLock;

use super::{Store, StoreError};
use crate::appointments::repo_types::{
    Appointment, AppointmentStatus, CustomerLink, NewAppointment, TimeSlot,
};
use crate::customers::repo_types::{Customer, NewCustomer};

#[derive(Debug, Clone)]
struct AppointmentRecord {
    id: i32,
    date: Date,
    time_slot: TimeSlot,
    status: AppointmentStatus,
    customer_id: i32,
}

#[derive(Debug, Default)]
struct Tables {
    customers: Vec<Customer>,
    appointments: Vec<AppointmentRecord>,
    next_customer_id: i32,
    next_appointment_id: i32,
}

impl Tables {
    fn customer(&self, id: i32) -> Option<&Customer> {
        self.customers.iter().find(|c| c.id == id)
    }

    fn insert_customer(&mut self, new: NewCustomer) -> Result<Customer, StoreError> {
        if self.customers.iter().any(|c| c.nic == new.nic) {
            return Err(StoreError::UniqueViolation(format!(
                "customer with NIC {} already exists",
                new.nic
            )));
        }
        self.next_customer_id += 1;
        let customer = Customer {
            id: self.next_customer_id,
            nic: new.nic,
            name: new.name,
        };
        self.customers.push(customer.clone());
        Ok(customer)
    }

    fn populate(&self, r: &AppointmentRecord) -> Appointment {
        Appointment {
            id: r.id,
            date: r.date,
            time_slot: r.time_slot,
            status: r.status,
            customer_id: r.customer_id,
            customer: self.customer(r.customer_id).cloned(),
        }
    }
}

/// Process-local store with the same constraints as the Postgres schema.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_customers(&self) -> Result<Vec<Customer>, StoreError> {
        Ok(self.tables.read().await.customers.clone())
    }

    async fn find_customer(&self, id: i32) -> Result<Option<Customer>, StoreError> {
        Ok(self.tables.read().await.customer(id).cloned())
    }

    async fn find_customer_by_nic(&self, nic: &str) -> Result<Option<Customer>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.customers.iter().find(|c| c.nic == nic).cloned())
    }

    async fn insert_customer(&self, new: NewCustomer) -> Result<Customer, StoreError> {
        self.tables.write().await.insert_customer(new)
    }

    async fn list_appointments(&self, nic: Option<&str>) -> Result<Vec<Appointment>, StoreError> {
        let tables = self.tables.read().await;
        let mut out: Vec<Appointment> = tables
            .appointments
            .iter()
            .map(|r| tables.populate(r))
            .filter(|a| match nic {
                Some(nic) => a.customer.as_ref().is_some_and(|c| c.nic == nic),
                None => true,
            })
            .collect();
        out.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(out)
    }

    async fn find_appointment(&self, id: i32) -> Result<Option<Appointment>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .appointments
            .iter()
            .find(|r| r.id == id)
            .map(|r| tables.populate(r)))
    }

    async fn insert_appointment(
        &self,
        new: NewAppointment,
        customer: CustomerLink,
    ) -> Result<Appointment, StoreError> {
        let mut tables = self.tables.write().await;

        let customer_id = match customer {
            CustomerLink::Existing(id) => {
                if tables.customer(id).is_none() {
                    return Err(StoreError::ForeignKeyViolation(format!(
                        "customer {id} does not exist"
                    )));
                }
                id
            }
            CustomerLink::New(new_customer) => tables.insert_customer(new_customer)?.id,
        };

        tables.next_appointment_id += 1;
        let record = AppointmentRecord {
            id: tables.next_appointment_id,
            date: new.date,
            time_slot: new.time_slot,
            status: new.status,
            customer_id,
        };
        let appointment = tables.populate(&record);
        tables.appointments.push(record);
        Ok(appointment)
    }
}
