//! Persistence port for the customer domain
//!
//! The bulk transfer engine drives whatever implements `CustomerStore`, so
//! the engine itself stays free of database concerns. The production
//! implementation lives in `infra_db`; a mock backed by an in-memory map
//! is available for tests.

use async_trait::async_trait;

use crate::customer::Customer;
use crate::error::CustomerError;
use crate::requests::{CustomerCreateRequest, IdentityUpdate};

/// Operations the bulk transfer engine needs from the persistence layer
#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// Creates a customer aggregate with all children and family links
    async fn create(&self, request: CustomerCreateRequest) -> Result<Customer, CustomerError>;

    /// Returns true if any customer row carries the NIC
    async fn nic_exists(&self, nic_number: &str) -> Result<bool, CustomerError>;

    /// Applies name/date-of-birth corrections keyed by NIC, atomically.
    ///
    /// The first NIC without a matching customer fails the whole batch
    /// with `CustomerError::NotFound`.
    async fn update_identities(
        &self,
        updates: &[IdentityUpdate],
    ) -> Result<Vec<Customer>, CustomerError>;

    /// Returns every customer with associations loaded, ordered by id
    async fn list_all(&self) -> Result<Vec<Customer>, CustomerError>;
}

#[cfg(any(test, feature = "mock"))]
pub mod mock {
    //! In-memory store for exercising the bulk engine without a database

    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;

    use core_kernel::CustomerId;

    use crate::customer::{Address, City, Country, Customer, FamilyLink, MobileNumber};
    use crate::error::CustomerError;
    use crate::requests::{CustomerCreateRequest, IdentityUpdate};
    use crate::validation;

    use super::CustomerStore;

    /// Customers keyed by id, mirroring the real store's invariants
    /// (unique NIC, unique mobile number, symmetric family links).
    #[derive(Default)]
    pub struct MockCustomerStore {
        state: Mutex<MockState>,
    }

    #[derive(Default)]
    struct MockState {
        next_id: i64,
        customers: BTreeMap<i64, Customer>,
    }

    impl MockCustomerStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Seeds a customer directly, bypassing validation
        pub fn seed(&self, customer: Customer) {
            let mut state = self.state.lock().unwrap();
            state.next_id = state.next_id.max(customer.id.get());
            state.customers.insert(customer.id.get(), customer);
        }

        pub fn len(&self) -> usize {
            self.state.lock().unwrap().customers.len()
        }

        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }

        pub fn get_by_nic(&self, nic_number: &str) -> Option<Customer> {
            let state = self.state.lock().unwrap();
            state
                .customers
                .values()
                .find(|c| c.nic_number == nic_number)
                .cloned()
        }
    }

    fn bare_customer(
        id: i64,
        name: &str,
        date_of_birth: chrono::NaiveDate,
        nic_number: &str,
    ) -> Customer {
        let now = Utc::now();
        Customer {
            id: CustomerId::new(id),
            name: name.to_string(),
            date_of_birth,
            nic_number: nic_number.to_string(),
            mobile_numbers: Vec::new(),
            addresses: Vec::new(),
            family_members: Vec::new(),
            family_of: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[async_trait]
    impl CustomerStore for MockCustomerStore {
        async fn create(
            &self,
            request: CustomerCreateRequest,
        ) -> Result<Customer, CustomerError> {
            validation::check(&request)?;

            let mut state = self.state.lock().unwrap();

            if state
                .customers
                .values()
                .any(|c| c.nic_number == request.nic_number)
            {
                return Err(CustomerError::conflict(format!(
                    "Customer with NIC number {} already exists",
                    request.nic_number
                )));
            }
            for mobile in &request.mobile_numbers {
                let taken = state
                    .customers
                    .values()
                    .flat_map(|c| &c.mobile_numbers)
                    .any(|m| m.number == mobile.number);
                if taken {
                    return Err(CustomerError::conflict(format!(
                        "Mobile number {} is already registered",
                        mobile.number
                    )));
                }
            }
            for member in &request.family_members {
                if state
                    .customers
                    .values()
                    .any(|c| c.nic_number == member.nic_number)
                {
                    return Err(CustomerError::conflict(format!(
                        "Family member with NIC number {} already exists",
                        member.nic_number
                    )));
                }
            }

            state.next_id += 1;
            let parent_id = state.next_id;
            let mut parent = bare_customer(
                parent_id,
                &request.name,
                request.date_of_birth,
                &request.nic_number,
            );
            parent.mobile_numbers = request
                .mobile_numbers
                .iter()
                .enumerate()
                .map(|(index, m)| MobileNumber {
                    id: (parent_id * 100 + index as i64).into(),
                    number: m.number.clone(),
                })
                .collect();
            parent.addresses = request
                .addresses
                .iter()
                .enumerate()
                .map(|(index, a)| Address {
                    id: (parent_id * 100 + index as i64).into(),
                    address_line1: a.address_line1.clone(),
                    address_line2: a.address_line2.clone(),
                    city: City {
                        id: (parent_id * 100 + index as i64).into(),
                        name: a.city.name.clone(),
                        country: Country {
                            id: (parent_id * 100 + index as i64).into(),
                            name: a.city.country.name.clone(),
                            code: a.city.country.code.clone(),
                        },
                    },
                })
                .collect();

            for member in &request.family_members {
                state.next_id += 1;
                let child_id = state.next_id;
                let mut child = bare_customer(
                    child_id,
                    &member.name,
                    member.date_of_birth,
                    &member.nic_number,
                );
                child.family_of.push(FamilyLink {
                    id: parent.id,
                    name: parent.name.clone(),
                    date_of_birth: parent.date_of_birth,
                    nic_number: parent.nic_number.clone(),
                });
                parent.family_members.push(FamilyLink {
                    id: child.id,
                    name: child.name.clone(),
                    date_of_birth: child.date_of_birth,
                    nic_number: child.nic_number.clone(),
                });
                state.customers.insert(child_id, child);
            }

            state.customers.insert(parent_id, parent.clone());
            Ok(parent)
        }

        async fn nic_exists(&self, nic_number: &str) -> Result<bool, CustomerError> {
            let state = self.state.lock().unwrap();
            Ok(state
                .customers
                .values()
                .any(|c| c.nic_number == nic_number))
        }

        async fn update_identities(
            &self,
            updates: &[IdentityUpdate],
        ) -> Result<Vec<Customer>, CustomerError> {
            let mut state = self.state.lock().unwrap();

            // All-or-nothing: resolve every NIC before touching any row.
            let mut ids = Vec::with_capacity(updates.len());
            for update in updates {
                let id = state
                    .customers
                    .values()
                    .find(|c| c.nic_number == update.nic_number)
                    .map(|c| c.id.get())
                    .ok_or_else(|| {
                        CustomerError::NotFound(format!(
                            "Customer not found with NIC: {}",
                            update.nic_number
                        ))
                    })?;
                ids.push(id);
            }

            let mut updated = Vec::with_capacity(updates.len());
            for (id, update) in ids.into_iter().zip(updates) {
                let customer = state.customers.get_mut(&id).unwrap();
                customer.name = update.name.clone();
                customer.date_of_birth = update.date_of_birth;
                customer.updated_at = Utc::now();
                updated.push(customer.clone());
            }
            Ok(updated)
        }

        async fn list_all(&self) -> Result<Vec<Customer>, CustomerError> {
            let state = self.state.lock().unwrap();
            Ok(state.customers.values().cloned().collect())
        }
    }
}
