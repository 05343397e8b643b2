//! Customers domain module (event-sourced).
//!
//! A customer registers with an email address, proves control of it with a
//! confirmation hash, and may change it later (which asks for a fresh
//! confirmation). Pure domain logic: no IO, no storage.

pub mod customer;
pub mod values;

pub use customer::{
    AGGREGATE_TYPE, ChangeCustomerEmailAddress, ConfirmCustomerEmailAddress, Customer,
    CustomerCommand, CustomerEmailAddressChanged, CustomerEmailAddressConfirmationFailed,
    CustomerEmailAddressConfirmed, CustomerEvent, CustomerRegistered, RegisterCustomer,
};
pub use values::{ConfirmationHash, CustomerId, EmailAddress, PersonName};
