//! Create/update request types
//!
//! These are the aggregate-builder inputs. The same shape serves both
//! `create` and `update` (update wholesale-replaces the child
//! collections), and bulk import builds them row by row from the
//! spreadsheet codec.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::{
    validate_country_code, validate_mobile, validate_nic, validate_past_date,
};

/// Request to create or replace a customer aggregate
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CustomerCreateRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(custom(function = validate_past_date))]
    pub date_of_birth: NaiveDate,
    #[validate(custom(function = validate_nic))]
    pub nic_number: String,
    #[serde(default)]
    #[validate(nested)]
    pub mobile_numbers: Vec<MobileNumberCreateRequest>,
    #[serde(default)]
    #[validate(nested)]
    pub addresses: Vec<AddressCreateRequest>,
    #[serde(default)]
    #[validate(nested)]
    pub family_members: Vec<FamilyMemberCreateRequest>,
}

/// One mobile number to attach to the customer
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MobileNumberCreateRequest {
    #[validate(custom(function = validate_mobile))]
    pub number: String,
}

/// One address to attach to the customer
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddressCreateRequest {
    #[validate(length(min = 1, message = "Address line 1 is required"))]
    pub address_line1: String,
    pub address_line2: Option<String>,
    #[validate(nested)]
    pub city: CityCreateRequest,
}

/// City reference, resolved or created by natural key
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CityCreateRequest {
    #[validate(length(min = 1, message = "City name is required"))]
    pub name: String,
    #[validate(nested)]
    pub country: CountryCreateRequest,
}

/// Country reference, resolved or created by code
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CountryCreateRequest {
    #[validate(length(min = 1, message = "Country name is required"))]
    pub name: String,
    #[validate(custom(function = validate_country_code))]
    pub code: String,
}

/// A family member created as an independent customer row and linked
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FamilyMemberCreateRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(custom(function = validate_past_date))]
    pub date_of_birth: NaiveDate,
    #[validate(custom(function = validate_nic))]
    pub nic_number: String,
}

/// Name and date-of-birth correction applied by bulk update, keyed by NIC
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityUpdate {
    pub nic_number: String,
    pub name: String,
    pub date_of_birth: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::check;

    fn valid_request() -> CustomerCreateRequest {
        CustomerCreateRequest {
            name: "Nimal Perera".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1985, 3, 12).unwrap(),
            nic_number: "851234567V".to_string(),
            mobile_numbers: vec![MobileNumberCreateRequest {
                number: "+94771234567".to_string(),
            }],
            addresses: vec![AddressCreateRequest {
                address_line1: "12 Temple Road".to_string(),
                address_line2: None,
                city: CityCreateRequest {
                    name: "Colombo".to_string(),
                    country: CountryCreateRequest {
                        name: "Sri Lanka".to_string(),
                        code: "LK".to_string(),
                    },
                },
            }],
            family_members: vec![],
        }
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(check(&valid_request()).is_ok());
    }

    #[test]
    fn test_bad_nic_named_in_error() {
        let mut request = valid_request();
        request.nic_number = "not-a-nic".to_string();
        let error = check(&request).unwrap_err().to_string();
        assert!(error.contains("nic_number"), "got: {error}");
    }

    #[test]
    fn test_nested_country_code_named_in_error() {
        let mut request = valid_request();
        request.addresses[0].city.country.code = "lka".to_string();
        let error = check(&request).unwrap_err().to_string();
        assert!(error.contains("code"), "got: {error}");
    }

    #[test]
    fn test_future_dob_rejected() {
        let mut request = valid_request();
        request.date_of_birth = chrono::Utc::now().date_naive() + chrono::Days::new(30);
        assert!(check(&request).is_err());
    }

    #[test]
    fn test_camel_case_wire_format() {
        let json = serde_json::to_value(valid_request()).unwrap();
        assert!(json.get("dateOfBirth").is_some());
        assert!(json.get("nicNumber").is_some());
        assert!(json["addresses"][0].get("addressLine1").is_some());
    }

    #[test]
    fn test_missing_collections_default_empty() {
        let request: CustomerCreateRequest = serde_json::from_str(
            r#"{"name":"A","dateOfBirth":"1990-01-01","nicNumber":"900000000V"}"#,
        )
        .unwrap();
        assert!(request.mobile_numbers.is_empty());
        assert!(request.addresses.is_empty());
        assert!(request.family_members.is_empty());
    }
}
