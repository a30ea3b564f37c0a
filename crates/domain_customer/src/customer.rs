//! Customer aggregate model
//!
//! The Customer aggregate owns its mobile numbers and addresses and
//! participates in a symmetric family relation with other customers.
//! Family links are stored once as directed edges; the `family_members`
//! and `family_of` collections here are the two read-side views of that
//! single edge set, never independently mutated.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{AddressId, CityId, CountryId, CustomerId, MobileNumberId};

/// A country, deduplicated by its two-letter uppercase code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub id: CountryId,
    pub name: String,
    pub code: String,
}

/// A city, unique per (name, country)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub id: CityId,
    pub name: String,
    pub country: Country,
}

/// A postal address owned by exactly one customer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: AddressId,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: City,
}

/// A mobile number owned by exactly one customer, globally unique
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MobileNumber {
    pub id: MobileNumberId,
    pub number: String,
}

/// The customer at the other end of a family edge
///
/// Family members are full customer rows; this is the shallow view used
/// when listing them from a related customer to keep the graph finite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyLink {
    pub id: CustomerId,
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub nic_number: String,
}

/// A customer with all owned children and family views loaded
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub date_of_birth: NaiveDate,
    /// National identity card number, globally unique
    pub nic_number: String,
    #[serde(default)]
    pub mobile_numbers: Vec<MobileNumber>,
    #[serde(default)]
    pub addresses: Vec<Address>,
    /// Customers this customer listed as family
    #[serde(default)]
    pub family_members: Vec<FamilyLink>,
    /// Customers that listed this customer as family
    #[serde(default)]
    pub family_of: Vec<FamilyLink>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// First mobile number, if any (used by the lossy template export)
    pub fn first_mobile(&self) -> Option<&MobileNumber> {
        self.mobile_numbers.first()
    }

    /// First address, if any
    pub fn first_address(&self) -> Option<&Address> {
        self.addresses.first()
    }

    /// First family member, if any
    pub fn first_family_member(&self) -> Option<&FamilyLink> {
        self.family_members.first()
    }
}
