//! Request builders for tests
//!
//! Builders produce valid requests by default; tests override the one
//! field they care about.

use chrono::NaiveDate;

use domain_customer::{
    AddressCreateRequest, CityCreateRequest, CountryCreateRequest, CustomerCreateRequest,
    FamilyMemberCreateRequest, MobileNumberCreateRequest,
};

/// Builder for `CustomerCreateRequest`
#[derive(Debug, Clone)]
pub struct CustomerRequestBuilder {
    name: String,
    date_of_birth: NaiveDate,
    nic_number: String,
    mobile_numbers: Vec<MobileNumberCreateRequest>,
    addresses: Vec<AddressCreateRequest>,
    family_members: Vec<FamilyMemberCreateRequest>,
}

impl Default for CustomerRequestBuilder {
    fn default() -> Self {
        Self {
            name: "Nimal Perera".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1985, 3, 12).unwrap(),
            nic_number: "851234567V".to_string(),
            mobile_numbers: Vec::new(),
            addresses: Vec::new(),
            family_members: Vec::new(),
        }
    }
}

impl CustomerRequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn date_of_birth(mut self, date_of_birth: NaiveDate) -> Self {
        self.date_of_birth = date_of_birth;
        self
    }

    pub fn nic_number(mut self, nic_number: impl Into<String>) -> Self {
        self.nic_number = nic_number.into();
        self
    }

    pub fn with_mobile(mut self, number: impl Into<String>) -> Self {
        self.mobile_numbers.push(MobileNumberCreateRequest {
            number: number.into(),
        });
        self
    }

    /// Adds an address in the given city/country (code resolved or created)
    pub fn with_address(
        mut self,
        line1: impl Into<String>,
        city: impl Into<String>,
        country_name: impl Into<String>,
        country_code: impl Into<String>,
    ) -> Self {
        self.addresses.push(AddressCreateRequest {
            address_line1: line1.into(),
            address_line2: None,
            city: CityCreateRequest {
                name: city.into(),
                country: CountryCreateRequest {
                    name: country_name.into(),
                    code: country_code.into(),
                },
            },
        });
        self
    }

    pub fn with_family_member(
        mut self,
        name: impl Into<String>,
        date_of_birth: NaiveDate,
        nic_number: impl Into<String>,
    ) -> Self {
        self.family_members.push(FamilyMemberCreateRequest {
            name: name.into(),
            date_of_birth,
            nic_number: nic_number.into(),
        });
        self
    }

    pub fn build(self) -> CustomerCreateRequest {
        CustomerCreateRequest {
            name: self.name,
            date_of_birth: self.date_of_birth,
            nic_number: self.nic_number,
            mobile_numbers: self.mobile_numbers,
            addresses: self.addresses,
            family_members: self.family_members,
        }
    }
}
