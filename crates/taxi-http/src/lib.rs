//! # taxi-http
//!
//! The request-data side of form handling: [`QueryDict`] parses
//! `application/x-www-form-urlencoded` bodies and query strings into a
//! multi-valued map that forms bind to.
//!
//! Routing and responses are out of scope; the host web server owns them.

pub mod querydict;

pub use querydict::QueryDict;
