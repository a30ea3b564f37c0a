//! Core types shared across the customer system.
//!
//! This crate holds the strongly-typed identifiers used by every layer and
//! the pagination types returned by the listing endpoints. It deliberately
//! has no database or HTTP dependencies so domain crates can build on it
//! without pulling in infrastructure.

pub mod identifiers;
pub mod pagination;

pub use identifiers::{AddressId, CityId, CountryId, CustomerId, MobileNumberId};
pub use pagination::{PageInfo, PageRequest, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
