//! # taxi-auth
//!
//! The user side of taxi-rs: the [`AbstractUser`] identity record that
//! drivers build on, password hashing, password strength validation, and
//! the [`UserCreationForm`] registration form.
//!
//! Hashing is CPU-bound and runs on tokio's blocking pool, so none of the
//! async APIs here stall the runtime.

pub mod forms;
pub mod hashers;
pub mod password_validation;
pub mod user;

pub use forms::UserCreationForm;
pub use hashers::{
    check_password, is_password_usable, make_password, make_password_with, Argon2Hasher,
    PasswordHasher, Pbkdf2Hasher,
};
pub use password_validation::{validate_password, PasswordPolicy, PasswordValidator};
pub use user::AbstractUser;
