//! Customer repository
//!
//! Implements the aggregate builder (create/update/delete inside one
//! transaction each) and the query service (pagination with batched
//! association loading). Family links are stored once as directed edges
//! in `customer_family_members`; the `family_members` and `family_of`
//! collections are assembled from that single edge set at read time.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgConnection, PgPool};
use tracing::info;

use core_kernel::{AddressId, CityId, CountryId, CustomerId, MobileNumberId, PageRequest};
use domain_customer::requests::{
    AddressCreateRequest, CustomerCreateRequest, FamilyMemberCreateRequest, IdentityUpdate,
    MobileNumberCreateRequest,
};
use domain_customer::validation;
use domain_customer::{
    Address, City, Country, Customer, CustomerError, CustomerStore, FamilyLink, MobileNumber,
};

use crate::error::DatabaseError;
use crate::repositories::reference_data;

#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: i64,
    name: String,
    date_of_birth: NaiveDate,
    nic_number: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct MobileNumberRow {
    id: i64,
    number: String,
    customer_id: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct AddressRow {
    id: i64,
    address_line1: String,
    address_line2: Option<String>,
    customer_id: i64,
    city_id: i64,
    city_name: String,
    country_id: i64,
    country_name: String,
    country_code: String,
}

/// One direction of a family edge, joined to the linked customer.
/// `outgoing` distinguishes the familyMembers view from the familyOf view.
#[derive(Debug, sqlx::FromRow)]
struct FamilyEdgeRow {
    owner_id: i64,
    outgoing: bool,
    id: i64,
    name: String,
    date_of_birth: NaiveDate,
    nic_number: String,
}

/// Repository for the customer aggregate
///
/// Every mutating operation runs in a single transaction: child inserts
/// and reference-data resolution commit or roll back together.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    /// Creates a new repository over the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a customer aggregate with children and family links
    ///
    /// # Errors
    ///
    /// - `Validation` for malformed fields
    /// - `Conflict` if the NIC (customer or family member) or any mobile
    ///   number is already registered
    pub async fn create(&self, request: CustomerCreateRequest) -> Result<Customer, CustomerError> {
        validation::check(&request)?;

        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;

        if nic_taken(&mut *tx, &request.nic_number).await? {
            return Err(
                DatabaseError::duplicate("Customer", "NIC number", &request.nic_number).into(),
            );
        }

        let row: CustomerRow = sqlx::query_as(
            r#"
            INSERT INTO customers (name, date_of_birth, nic_number)
            VALUES ($1, $2, $3)
            RETURNING id, name, date_of_birth, nic_number, created_at, updated_at
            "#,
        )
        .bind(&request.name)
        .bind(request.date_of_birth)
        .bind(&request.nic_number)
        .fetch_one(&mut *tx)
        .await
        .map_err(DatabaseError::from)?;

        insert_mobile_numbers(&mut *tx, row.id, &request.mobile_numbers).await?;
        insert_addresses(&mut *tx, row.id, &request.addresses).await?;
        insert_family_members(&mut *tx, row.id, &request.family_members).await?;

        tx.commit().await.map_err(DatabaseError::from)?;

        info!(customer_id = row.id, nic = %row.nic_number, "created customer");
        self.get(CustomerId::new(row.id)).await
    }

    /// Replaces a customer aggregate in place
    ///
    /// Scalar fields are overwritten unconditionally. Mobile numbers and
    /// addresses are wholesale-replaced; any child missing from the
    /// request is deleted. Family edges are unlinked in both directions
    /// and re-created under the same create-or-conflict rule as `create`.
    pub async fn update(
        &self,
        id: CustomerId,
        request: CustomerCreateRequest,
    ) -> Result<Customer, CustomerError> {
        validation::check(&request)?;

        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;

        let updated = sqlx::query(
            r#"
            UPDATE customers
            SET name = $2, date_of_birth = $3, nic_number = $4, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .bind(&request.name)
        .bind(request.date_of_birth)
        .bind(&request.nic_number)
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::from)?;

        if updated.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Customer", id).into());
        }

        sqlx::query("DELETE FROM mobile_numbers WHERE customer_id = $1")
            .bind(id.get())
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::from)?;
        sqlx::query("DELETE FROM addresses WHERE customer_id = $1")
            .bind(id.get())
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::from)?;
        sqlx::query(
            "DELETE FROM customer_family_members WHERE customer_id = $1 OR family_member_id = $1",
        )
        .bind(id.get())
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::from)?;

        insert_mobile_numbers(&mut *tx, id.get(), &request.mobile_numbers).await?;
        insert_addresses(&mut *tx, id.get(), &request.addresses).await?;
        insert_family_members(&mut *tx, id.get(), &request.family_members).await?;

        tx.commit().await.map_err(DatabaseError::from)?;

        info!(customer_id = id.get(), "updated customer");
        self.get(id).await
    }

    /// Deletes a customer
    ///
    /// Owned children and family edges in both directions go with the row
    /// (FK cascade), so no dangling edge can survive.
    pub async fn delete(&self, id: CustomerId) -> Result<(), CustomerError> {
        let deleted = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        if deleted.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Customer", id).into());
        }

        info!(customer_id = id.get(), "deleted customer");
        Ok(())
    }

    /// Loads one customer with all associations
    pub async fn get(&self, id: CustomerId) -> Result<Customer, CustomerError> {
        let row: Option<CustomerRow> = sqlx::query_as(
            r#"
            SELECT id, name, date_of_birth, nic_number, created_at, updated_at
            FROM customers
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        let row = row.ok_or_else(|| DatabaseError::not_found("Customer", id))?;
        let mut customers = self.load_associations(vec![row]).await?;
        Ok(customers.remove(0))
    }

    /// Returns one page of customers ordered by id, plus the total count
    ///
    /// After the page query, associations are loaded with exactly three
    /// batched lookups keyed by the page's id set (addresses joined to
    /// cities and countries, mobile numbers, family edges in both
    /// directions), avoiding both eager-join row multiplication and
    /// per-customer round trips.
    pub async fn list(
        &self,
        page: PageRequest,
    ) -> Result<(Vec<Customer>, u64), CustomerError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        let rows: Vec<CustomerRow> = sqlx::query_as(
            r#"
            SELECT id, name, date_of_birth, nic_number, created_at, updated_at
            FROM customers
            ORDER BY id ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        let customers = self.load_associations(rows).await?;
        Ok((customers, total as u64))
    }

    /// Loads every customer with associations, ordered by id
    pub async fn list_all(&self) -> Result<Vec<Customer>, CustomerError> {
        let rows: Vec<CustomerRow> = sqlx::query_as(
            r#"
            SELECT id, name, date_of_birth, nic_number, created_at, updated_at
            FROM customers
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        self.load_associations(rows).await
    }

    /// Returns true if any customer row carries the NIC
    pub async fn nic_exists(&self, nic_number: &str) -> Result<bool, CustomerError> {
        let mut conn = self.pool.acquire().await.map_err(DatabaseError::from)?;
        nic_taken(&mut *conn, nic_number).await
    }

    /// Applies name/date-of-birth corrections keyed by NIC in one
    /// transaction; the first unmatched NIC rolls back the whole batch
    pub async fn update_identities(
        &self,
        updates: &[IdentityUpdate],
    ) -> Result<Vec<Customer>, CustomerError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;
        let mut ids = Vec::with_capacity(updates.len());

        for update in updates {
            let id: Option<i64> =
                sqlx::query_scalar("SELECT id FROM customers WHERE nic_number = $1")
                    .bind(&update.nic_number)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(DatabaseError::from)?;
            let id = id.ok_or_else(|| {
                DatabaseError::NotFound(format!(
                    "Customer not found with NIC: {}",
                    update.nic_number
                ))
            })?;

            sqlx::query(
                "UPDATE customers SET name = $2, date_of_birth = $3, updated_at = now() WHERE id = $1",
            )
            .bind(id)
            .bind(&update.name)
            .bind(update.date_of_birth)
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::from)?;

            ids.push(id);
        }

        tx.commit().await.map_err(DatabaseError::from)?;
        info!(rows = ids.len(), "bulk identity update committed");

        let mut updated = Vec::with_capacity(ids.len());
        for id in ids {
            updated.push(self.get(CustomerId::new(id)).await?);
        }
        Ok(updated)
    }

    /// Merges the three batched association lookups onto the page's rows
    async fn load_associations(
        &self,
        rows: Vec<CustomerRow>,
    ) -> Result<Vec<Customer>, CustomerError> {
        let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();

        let mobiles: Vec<MobileNumberRow> = sqlx::query_as(
            r#"
            SELECT id, number, customer_id
            FROM mobile_numbers
            WHERE customer_id = ANY($1)
            ORDER BY id ASC
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        let addresses: Vec<AddressRow> = sqlx::query_as(
            r#"
            SELECT
                a.id, a.address_line1, a.address_line2, a.customer_id,
                ci.id AS city_id, ci.name AS city_name,
                co.id AS country_id, co.name AS country_name, co.code AS country_code
            FROM addresses a
            JOIN cities ci ON ci.id = a.city_id
            JOIN countries co ON co.id = ci.country_id
            WHERE a.customer_id = ANY($1)
            ORDER BY a.id ASC
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        // Both directions of the single edge set in one lookup.
        let edges: Vec<FamilyEdgeRow> = sqlx::query_as(
            r#"
            SELECT e.customer_id AS owner_id, TRUE AS outgoing,
                   c.id, c.name, c.date_of_birth, c.nic_number
            FROM customer_family_members e
            JOIN customers c ON c.id = e.family_member_id
            WHERE e.customer_id = ANY($1)
            UNION ALL
            SELECT e.family_member_id AS owner_id, FALSE AS outgoing,
                   c.id, c.name, c.date_of_birth, c.nic_number
            FROM customer_family_members e
            JOIN customers c ON c.id = e.customer_id
            WHERE e.family_member_id = ANY($1)
            ORDER BY id ASC
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        let mut mobiles_by_customer: HashMap<i64, Vec<MobileNumber>> = HashMap::new();
        for row in mobiles {
            mobiles_by_customer
                .entry(row.customer_id)
                .or_default()
                .push(MobileNumber {
                    id: MobileNumberId::new(row.id),
                    number: row.number,
                });
        }

        let mut addresses_by_customer: HashMap<i64, Vec<Address>> = HashMap::new();
        for row in addresses {
            addresses_by_customer
                .entry(row.customer_id)
                .or_default()
                .push(Address {
                    id: AddressId::new(row.id),
                    address_line1: row.address_line1,
                    address_line2: row.address_line2,
                    city: City {
                        id: CityId::new(row.city_id),
                        name: row.city_name,
                        country: Country {
                            id: CountryId::new(row.country_id),
                            name: row.country_name,
                            code: row.country_code,
                        },
                    },
                });
        }

        let mut family_by_customer: HashMap<i64, (Vec<FamilyLink>, Vec<FamilyLink>)> =
            HashMap::new();
        for row in edges {
            let link = FamilyLink {
                id: CustomerId::new(row.id),
                name: row.name,
                date_of_birth: row.date_of_birth,
                nic_number: row.nic_number,
            };
            let entry = family_by_customer.entry(row.owner_id).or_default();
            if row.outgoing {
                entry.0.push(link);
            } else {
                entry.1.push(link);
            }
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let (family_members, family_of) =
                    family_by_customer.remove(&row.id).unwrap_or_default();
                Customer {
                    id: CustomerId::new(row.id),
                    name: row.name,
                    date_of_birth: row.date_of_birth,
                    nic_number: row.nic_number,
                    mobile_numbers: mobiles_by_customer.remove(&row.id).unwrap_or_default(),
                    addresses: addresses_by_customer.remove(&row.id).unwrap_or_default(),
                    family_members,
                    family_of,
                    created_at: row.created_at,
                    updated_at: row.updated_at,
                }
            })
            .collect())
    }
}

/// Single invariant check for NIC uniqueness, shared by every mutating path
async fn nic_taken(conn: &mut PgConnection, nic_number: &str) -> Result<bool, CustomerError> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM customers WHERE nic_number = $1)")
            .bind(nic_number)
            .fetch_one(conn)
            .await
            .map_err(DatabaseError::from)?;
    Ok(exists)
}

/// Single invariant check for mobile-number uniqueness; returns the owner
async fn mobile_owner(
    conn: &mut PgConnection,
    number: &str,
) -> Result<Option<i64>, CustomerError> {
    let owner: Option<i64> =
        sqlx::query_scalar("SELECT customer_id FROM mobile_numbers WHERE number = $1")
            .bind(number)
            .fetch_optional(conn)
            .await
            .map_err(DatabaseError::from)?;
    Ok(owner)
}

async fn insert_mobile_numbers(
    conn: &mut PgConnection,
    customer_id: i64,
    mobile_numbers: &[MobileNumberCreateRequest],
) -> Result<(), CustomerError> {
    for mobile in mobile_numbers {
        if let Some(owner) = mobile_owner(conn, &mobile.number).await? {
            if owner != customer_id {
                return Err(DatabaseError::duplicate(
                    "Mobile number",
                    "number",
                    &mobile.number,
                )
                .into());
            }
        }

        sqlx::query("INSERT INTO mobile_numbers (number, customer_id) VALUES ($1, $2)")
            .bind(&mobile.number)
            .bind(customer_id)
            .execute(&mut *conn)
            .await
            .map_err(DatabaseError::from)?;
    }
    Ok(())
}

async fn insert_addresses(
    conn: &mut PgConnection,
    customer_id: i64,
    addresses: &[AddressCreateRequest],
) -> Result<(), CustomerError> {
    for address in addresses {
        let country = reference_data::resolve_country(
            conn,
            &address.city.country.name,
            &address.city.country.code,
        )
        .await?;
        let city = reference_data::resolve_city(conn, &address.city.name, &country).await?;

        sqlx::query(
            r#"
            INSERT INTO addresses (address_line1, address_line2, city_id, customer_id)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&address.address_line1)
        .bind(&address.address_line2)
        .bind(city.id.get())
        .bind(customer_id)
        .execute(&mut *conn)
        .await
        .map_err(DatabaseError::from)?;
    }
    Ok(())
}

/// Creates each family member as an independent customer row and links it
/// with one directed edge. A NIC already present anywhere is a conflict,
/// exactly as for the parent.
async fn insert_family_members(
    conn: &mut PgConnection,
    customer_id: i64,
    family_members: &[FamilyMemberCreateRequest],
) -> Result<(), CustomerError> {
    for member in family_members {
        if nic_taken(conn, &member.nic_number).await? {
            return Err(DatabaseError::duplicate(
                "Family member",
                "NIC number",
                &member.nic_number,
            )
            .into());
        }

        let member_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO customers (name, date_of_birth, nic_number)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&member.name)
        .bind(member.date_of_birth)
        .bind(&member.nic_number)
        .fetch_one(&mut *conn)
        .await
        .map_err(DatabaseError::from)?;

        sqlx::query(
            "INSERT INTO customer_family_members (customer_id, family_member_id) VALUES ($1, $2)",
        )
        .bind(customer_id)
        .bind(member_id)
        .execute(&mut *conn)
        .await
        .map_err(DatabaseError::from)?;
    }
    Ok(())
}

#[async_trait]
impl CustomerStore for CustomerRepository {
    async fn create(&self, request: CustomerCreateRequest) -> Result<Customer, CustomerError> {
        CustomerRepository::create(self, request).await
    }

    async fn nic_exists(&self, nic_number: &str) -> Result<bool, CustomerError> {
        CustomerRepository::nic_exists(self, nic_number).await
    }

    async fn update_identities(
        &self,
        updates: &[IdentityUpdate],
    ) -> Result<Vec<Customer>, CustomerError> {
        CustomerRepository::update_identities(self, updates).await
    }

    async fn list_all(&self) -> Result<Vec<Customer>, CustomerError> {
        CustomerRepository::list_all(self).await
    }
}
