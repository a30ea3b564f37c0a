//! Tests for the customer domain model

use chrono::{NaiveDate, Utc};

use core_kernel::{AddressId, CityId, CountryId, CustomerId, MobileNumberId};
use domain_customer::workbook::{ImportAddress, ImportFamilyMember, ImportRow};
use domain_customer::{Address, City, Country, Customer, FamilyLink, MobileNumber};

fn sample_customer() -> Customer {
    let now = Utc::now();
    Customer {
        id: CustomerId::new(1),
        name: "Nimal Perera".to_string(),
        date_of_birth: NaiveDate::from_ymd_opt(1985, 3, 12).unwrap(),
        nic_number: "851234567V".to_string(),
        mobile_numbers: vec![
            MobileNumber {
                id: MobileNumberId::new(10),
                number: "+94771234567".to_string(),
            },
            MobileNumber {
                id: MobileNumberId::new(11),
                number: "+94770000001".to_string(),
            },
        ],
        addresses: vec![Address {
            id: AddressId::new(20),
            address_line1: "12 Temple Road".to_string(),
            address_line2: Some("Apt 3".to_string()),
            city: City {
                id: CityId::new(30),
                name: "Colombo".to_string(),
                country: Country {
                    id: CountryId::new(40),
                    name: "Sri Lanka".to_string(),
                    code: "LK".to_string(),
                },
            },
        }],
        family_members: vec![FamilyLink {
            id: CustomerId::new(2),
            name: "Kamala Perera".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 7, 1).unwrap(),
            nic_number: "907654321V".to_string(),
        }],
        family_of: vec![],
        created_at: now,
        updated_at: now,
    }
}

#[test]
fn test_customer_serializes_camel_case() {
    let json = serde_json::to_value(sample_customer()).unwrap();

    assert_eq!(json["nicNumber"], "851234567V");
    assert_eq!(json["dateOfBirth"], "1985-03-12");
    assert_eq!(json["mobileNumbers"][0]["number"], "+94771234567");
    assert_eq!(json["familyMembers"][0]["nicNumber"], "907654321V");
    assert!(json.get("createdAt").is_some());
}

#[test]
fn test_first_child_accessors() {
    let customer = sample_customer();

    assert_eq!(customer.first_mobile().unwrap().number, "+94771234567");
    assert_eq!(
        customer.first_address().unwrap().address_line1,
        "12 Temple Road"
    );
    assert_eq!(
        customer.first_family_member().unwrap().nic_number,
        "907654321V"
    );
}

#[test]
fn test_first_child_accessors_empty() {
    let mut customer = sample_customer();
    customer.mobile_numbers.clear();
    customer.addresses.clear();
    customer.family_members.clear();

    assert!(customer.first_mobile().is_none());
    assert!(customer.first_address().is_none());
    assert!(customer.first_family_member().is_none());
}

#[test]
fn test_import_row_into_request_full() {
    let row = ImportRow {
        name: "Nimal Perera".to_string(),
        date_of_birth: NaiveDate::from_ymd_opt(1985, 3, 12).unwrap(),
        nic_number: "851234567V".to_string(),
        mobile_number: Some("+94771234567".to_string()),
        address: Some(ImportAddress {
            address_line1: "12 Temple Road".to_string(),
            address_line2: None,
            city: "Colombo".to_string(),
            country_name: "Sri Lanka".to_string(),
            country_code: "LK".to_string(),
        }),
        family_member: Some(ImportFamilyMember {
            name: "Kamala Perera".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 7, 1).unwrap(),
            nic_number: "907654321V".to_string(),
        }),
    };

    let request = row.into_request();

    assert_eq!(request.mobile_numbers.len(), 1);
    assert_eq!(request.addresses.len(), 1);
    assert_eq!(request.addresses[0].city.country.code, "LK");
    assert_eq!(request.family_members.len(), 1);
    assert!(domain_customer::validation::check(&request).is_ok());
}

#[test]
fn test_import_row_into_request_minimal() {
    let row = ImportRow {
        name: "Ruwan Silva".to_string(),
        date_of_birth: NaiveDate::from_ymd_opt(1992, 11, 2).unwrap(),
        nic_number: "921234567X".to_string(),
        mobile_number: None,
        address: None,
        family_member: None,
    };

    let request = row.into_request();

    assert!(request.mobile_numbers.is_empty());
    assert!(request.addresses.is_empty());
    assert!(request.family_members.is_empty());
}
