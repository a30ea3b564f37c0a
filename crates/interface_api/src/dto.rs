//! Request/response data transfer objects
//!
//! The create/update request body deserializes straight into
//! `domain_customer::CustomerCreateRequest`; only responses need their
//! own shapes here. Child objects omit their database ids on the wire,
//! matching the original API surface.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{CustomerId, PageInfo, PageRequest, DEFAULT_PAGE_SIZE};
use domain_customer::{Address, Customer, FamilyLink, MobileNumber};

/// Query parameters for the paginated listing endpoint
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub size: u32,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl From<ListParams> for PageRequest {
    fn from(params: ListParams) -> Self {
        PageRequest::new(params.page, params.size)
    }
}

/// A customer as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerResponse {
    pub id: CustomerId,
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub nic_number: String,
    pub mobile_numbers: Vec<MobileNumberResponse>,
    pub addresses: Vec<AddressResponse>,
    pub family_members: Vec<FamilyLinkResponse>,
    pub family_of: Vec<FamilyLinkResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MobileNumberResponse {
    pub number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressResponse {
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: CityResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityResponse {
    pub name: String,
    pub country: CountryResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryResponse {
    pub name: String,
    pub code: String,
}

/// Shallow view of a customer on the other end of a family link
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyLinkResponse {
    pub id: CustomerId,
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub nic_number: String,
}

/// Envelope for the paginated listing endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerPageResponse {
    pub customers: Vec<CustomerResponse>,
    #[serde(flatten)]
    pub page: PageInfo,
}

impl From<Customer> for CustomerResponse {
    fn from(customer: Customer) -> Self {
        Self {
            id: customer.id,
            name: customer.name,
            date_of_birth: customer.date_of_birth,
            nic_number: customer.nic_number,
            mobile_numbers: customer
                .mobile_numbers
                .into_iter()
                .map(MobileNumberResponse::from)
                .collect(),
            addresses: customer
                .addresses
                .into_iter()
                .map(AddressResponse::from)
                .collect(),
            family_members: customer
                .family_members
                .into_iter()
                .map(FamilyLinkResponse::from)
                .collect(),
            family_of: customer
                .family_of
                .into_iter()
                .map(FamilyLinkResponse::from)
                .collect(),
            created_at: customer.created_at,
            updated_at: customer.updated_at,
        }
    }
}

impl From<MobileNumber> for MobileNumberResponse {
    fn from(mobile: MobileNumber) -> Self {
        Self {
            number: mobile.number,
        }
    }
}

impl From<Address> for AddressResponse {
    fn from(address: Address) -> Self {
        Self {
            address_line1: address.address_line1,
            address_line2: address.address_line2,
            city: CityResponse {
                name: address.city.name,
                country: CountryResponse {
                    name: address.city.country.name,
                    code: address.city.country.code,
                },
            },
        }
    }
}

impl From<FamilyLink> for FamilyLinkResponse {
    fn from(link: FamilyLink) -> Self {
        Self {
            id: link.id,
            name: link.name,
            date_of_birth: link.date_of_birth,
            nic_number: link.nic_number,
        }
    }
}
