use std::{fmt, path::PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::{EntityKind, ReservationError, Result},
    store::{JsonStore, Record},
    update::Patch,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl Record for Customer {
    const KIND: EntityKind = EntityKind::Customer;

    fn id(&self) -> &str {
        &self.customer_id
    }
}

impl fmt::Display for Customer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Customer ID: {}", self.customer_id)?;
        writeln!(f, "Name: {}", self.name)?;
        writeln!(f, "Email: {}", self.email)?;
        write!(f, "Phone: {}", self.phone)
    }
}

// Fields a caller may change on an existing customer
#[derive(Debug, Clone, Default)]
pub struct CustomerUpdate {
    pub name: Patch<String>,
    pub email: Patch<String>,
    pub phone: Patch<String>,
}

#[derive(Debug)]
pub struct CustomerManager {
    store: JsonStore<Customer>,
}

impl CustomerManager {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            store: JsonStore::open(path),
        }
    }

    pub fn create(&mut self, customer_id: &str, name: &str, email: &str, phone: &str) -> Result<()> {
        if self.store.contains(customer_id) {
            return Err(ReservationError::already_exists(EntityKind::Customer, customer_id));
        }
        if name.trim().is_empty() {
            return Err(ReservationError::EmptyField("name"));
        }
        if email.trim().is_empty() {
            return Err(ReservationError::EmptyField("email"));
        }

        self.store.insert(Customer {
            customer_id: customer_id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
        });
        self.store.save()?;

        info!(customer_id, "customer created");
        Ok(())
    }

    pub fn delete(&mut self, customer_id: &str) -> Result<()> {
        if self.store.remove(customer_id).is_none() {
            return Err(ReservationError::not_found(EntityKind::Customer, customer_id));
        }
        self.store.save()?;

        info!(customer_id, "customer deleted");
        Ok(())
    }

    pub fn modify(&mut self, customer_id: &str, update: CustomerUpdate) -> Result<()> {
        let customer = self
            .store
            .get_mut(customer_id)
            .ok_or_else(|| ReservationError::not_found(EntityKind::Customer, customer_id))?;

        update.name.apply(&mut customer.name);
        update.email.apply(&mut customer.email);
        update.phone.apply(&mut customer.phone);
        self.store.save()?;

        info!(customer_id, "customer modified");
        Ok(())
    }

    pub fn get(&self, customer_id: &str) -> Option<&Customer> {
        self.store.get(customer_id)
    }

    pub fn display(&self, customer_id: &str) -> Result<&Customer> {
        let customer = self
            .get(customer_id)
            .ok_or_else(|| ReservationError::not_found(EntityKind::Customer, customer_id))?;
        info!(customer_id, name = %customer.name, email = %customer.email, "customer details");
        Ok(customer)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Customer> {
        self.store.iter()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn reload(&mut self) {
        self.store.reload();
    }
}
