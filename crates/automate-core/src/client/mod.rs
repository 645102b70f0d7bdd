//! Speckle server access
//!
//! [`SpeckleApi`] is the seam between a run and the server: the runner talks
//! to it through a trait object so tests can substitute their own.

mod api;
mod graphql;
mod speckle_client;
pub mod transport;

pub use api::{ActiveUser, ObjectBundle, RunStatusReport, SpeckleApi, Version};
pub use speckle_client::SpeckleClient;
pub use transport::receive_object;
