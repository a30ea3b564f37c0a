//! Customer Management Domain
//!
//! This crate holds the domain model for the customer system: the
//! aggregate and its owned children (mobile numbers, addresses with
//! normalized city/country reference data), the symmetric family relation
//! between customers, request validation, and the spreadsheet-driven bulk
//! transfer engine.
//!
//! # Family model
//!
//! Family members are full customer rows. A link between two customers is
//! stored exactly once as a directed edge; `family_members` lists the
//! customers a row points at and `family_of` lists the rows pointing back.
//! Adding A→B therefore makes B's `family_of` contain A with no second
//! write to keep in sync.
//!
//! # Persistence seam
//!
//! The [`ports::CustomerStore`] trait is the only thing the bulk engine
//! knows about storage. `infra_db` provides the PostgreSQL implementation;
//! tests use the in-memory mock.

pub mod bulk;
pub mod customer;
pub mod error;
pub mod ports;
pub mod requests;
pub mod validation;
pub mod workbook;

pub use bulk::{BulkTransferService, IMPORT_BATCH_SIZE};
pub use customer::{Address, City, Country, Customer, FamilyLink, MobileNumber};
pub use error::CustomerError;
pub use ports::CustomerStore;
pub use requests::{
    AddressCreateRequest, CityCreateRequest, CountryCreateRequest, CustomerCreateRequest,
    FamilyMemberCreateRequest, IdentityUpdate, MobileNumberCreateRequest,
};
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::MockCustomerStore;
