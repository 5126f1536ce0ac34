//! An abstraction layer for reasoning models.
//!
//! This crate establishes a unified protocol for the controller to
//! consult different reasoning models, so that the control loop can
//! switch between them without modifying the core codebase.
//!
//! Types in this crate don't define any behavior, instead they are the
//! constraints that the implementors should adhere to.

#![deny(missing_docs)]

mod error;
mod provider;
mod request;
mod turn;

pub use error::*;
pub use provider::*;
pub use request::*;
pub use turn::*;
