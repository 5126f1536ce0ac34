//! The request/response channel between the control loop and tool
//! providers.
//!
//! Frames are single lines of JSON over a byte stream, typically the
//! stdin/stdout of a provider subprocess. The [`server`] half runs an
//! operation set over such a stream; the [`client`] half spawns a
//! provider process and implements the core provider seam on top of
//! it.
//!
//! [`server`]: serve
//! [`client`]: ProviderClient

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod client;
mod proto;
mod server;

pub use client::{ProviderClient, ProviderConfig, TransportError};
pub use proto::{Request, Response, WireError, WireErrorKind};
pub use server::{OpSet, Operation, serve, serve_stdio};
