//! Reference data resolver
//!
//! Resolves or creates Country and City rows by natural key (country
//! code; city name + country). Resolution happens as a side effect of
//! persisting an address, inside the caller's transaction, so an aborted
//! aggregate write also rolls back any reference rows it created.
//!
//! Get-or-create is a single `INSERT ... ON CONFLICT DO UPDATE` returning
//! the surviving row. The no-op update makes `RETURNING` yield the
//! existing row on conflict, so two writers racing on the same code or
//! (name, country) can never create duplicates.

use sqlx::PgConnection;

use core_kernel::{CityId, CountryId};
use domain_customer::{City, Country, CustomerError};

use crate::error::DatabaseError;

#[derive(Debug, sqlx::FromRow)]
struct CountryRow {
    id: i64,
    name: String,
    code: String,
}

#[derive(Debug, sqlx::FromRow)]
struct CityRow {
    id: i64,
    name: String,
}

/// Resolves a country by code, creating it if absent
///
/// # Errors
///
/// `CustomerError::Validation` when the code or name is blank, naming the
/// offending field.
pub async fn resolve_country(
    conn: &mut PgConnection,
    name: &str,
    code: &str,
) -> Result<Country, CustomerError> {
    let name = name.trim();
    let code = code.trim();
    if code.is_empty() {
        return Err(CustomerError::validation("Country code is required"));
    }
    if name.is_empty() {
        return Err(CustomerError::validation("Country name is required"));
    }

    let row: CountryRow = sqlx::query_as(
        r#"
        INSERT INTO countries (name, code)
        VALUES ($1, $2)
        ON CONFLICT (code) DO UPDATE SET name = countries.name
        RETURNING id, name, code
        "#,
    )
    .bind(name)
    .bind(code)
    .fetch_one(conn)
    .await
    .map_err(DatabaseError::from)?;

    Ok(Country {
        id: CountryId::new(row.id),
        name: row.name,
        code: row.code,
    })
}

/// Resolves a city by (name, country), creating it if absent
pub async fn resolve_city(
    conn: &mut PgConnection,
    name: &str,
    country: &Country,
) -> Result<City, CustomerError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CustomerError::validation("City name is required"));
    }

    let row: CityRow = sqlx::query_as(
        r#"
        INSERT INTO cities (name, country_id)
        VALUES ($1, $2)
        ON CONFLICT (name, country_id) DO UPDATE SET name = cities.name
        RETURNING id, name
        "#,
    )
    .bind(name)
    .bind(country.id.get())
    .fetch_one(conn)
    .await
    .map_err(DatabaseError::from)?;

    Ok(City {
        id: CityId::new(row.id),
        name: row.name,
        country: country.clone(),
    })
}
