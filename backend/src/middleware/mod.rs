//! Request middleware.
//!
//! Purpose: define middleware for request lifecycle concerns such as
//! trace correlation and access logging.

pub mod trace;

pub use trace::Trace;
