//! Repository implementations

pub mod customers;
pub mod reference_data;

pub use customers::CustomerRepository;
