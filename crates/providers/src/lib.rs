//! The toy arithmetic tool providers.
//!
//! Two operation domains, one server binary each: elementary
//! arithmetic and exponentiation/roots. Every operation is a pure
//! function of its arguments; the only side effect is a diagnostic
//! trace on stderr.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

pub mod elementary;
pub mod exponent;
