pub mod config;
pub mod domain;
pub mod errors;
pub mod validation;

pub use domain::customer::{Customer, CustomerId, CustomerInput, NewCustomer};
pub use errors::{CustomerError, InterfaceError};
pub use validation::{validate_customer, Violation, Violations};
