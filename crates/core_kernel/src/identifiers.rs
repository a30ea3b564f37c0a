//! Strongly-typed identifiers for domain entities
//!
//! Rows are keyed by identity-ordered BIGSERIAL columns, so the newtypes
//! wrap `i64`. Wrapping them prevents accidental mixing of different
//! identifier types (a `CityId` can never be passed where a `CustomerId`
//! is expected).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Creates an identifier from a raw database key
            pub fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the underlying database key
            pub fn get(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.parse()?))
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> i64 {
                id.0
            }
        }
    };
}

define_id!(CustomerId);
define_id!(MobileNumberId);
define_id!(AddressId);
define_id!(CityId);
define_id!(CountryId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_id_display() {
        let id = CustomerId::new(42);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn test_id_parsing() {
        let parsed: CustomerId = "17".parse().unwrap();
        assert_eq!(parsed, CustomerId::new(17));
    }

    #[test]
    fn test_i64_conversion() {
        let id = CityId::from(7);
        let back: i64 = id.into();
        assert_eq!(back, 7);
    }

    #[test]
    fn test_serde_transparent() {
        let id = CountryId::new(3);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "3");
        let round: CountryId = serde_json::from_str(&json).unwrap();
        assert_eq!(round, id);
    }
}
