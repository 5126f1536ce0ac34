//! Core logic including the Reason/Act control loop, the operation
//! registry, and the model client.

#![deny(missing_docs)]
#![deny(clippy::missing_safety_doc)]

#[macro_use]
extern crate tracing;

mod agent;
pub mod conversation;
mod model_client;
pub mod registry;
pub mod tool;

pub use agent::{Controller, ControllerBuilder, ControllerConfig};
pub use conversation::Conversation;
pub use model_client::ModelClient;
pub use registry::Registry;
