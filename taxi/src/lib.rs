//! # taxi
//!
//! Data-entry logic for a small taxi fleet: the driver license number rule,
//! the `Manufacturer`, `Driver` and `Car` models, and the forms that create
//! drivers, change their license numbers and assign cars.
//!
//! ## Modules
//!
//! - [`license`] - License number format check and field validator
//! - [`models`] - Fleet models and their metadata
//! - [`forms`] - `DriverCreationForm`, `DriverLicenseUpdateForm`, `CarForm`
//! - [`command`] / [`commands`] - The `taxi` command-line tool
//!
//! ## Quick Start
//!
//! ```
//! use taxi::license::{validate_license_number, INVALID_LICENSE_FORMAT};
//! use taxi::forms::DriverLicenseUpdateForm;
//! use taxi::models::Driver;
//! use taxi_forms::Form;
//! use taxi_http::QueryDict;
//!
//! assert_eq!(validate_license_number("ABC12345").unwrap(), "ABC12345");
//! assert_eq!(validate_license_number("ABCD1234").unwrap_err().code, INVALID_LICENSE_FORMAT);
//!
//! let mut form = DriverLicenseUpdateForm::new(Driver::new("jdoe", "ABC12345")).unwrap();
//! form.bind(&QueryDict::parse("license_number=XYZ54321"));
//! assert!(form.is_bound());
//! ```

pub mod command;
pub mod commands;
pub mod forms;
pub mod license;
pub mod models;

pub use forms::{CarForm, DriverCreationForm, DriverLicenseUpdateForm};
pub use license::{validate_license_number, LicenseNumberValidator};
pub use models::{Car, Driver, Manufacturer};
