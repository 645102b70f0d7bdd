//! Default timeout and batching values for server communication

use std::time::Duration;

/// Default connection timeout (10 seconds)
pub const CONNECTION_SECS: u64 = 10;

/// Default timeout for a single request (60 seconds)
pub const REQUEST_SECS: u64 = 60;

/// Number of object ids requested per `getobjects` call
pub const OBJECT_BATCH_SIZE: usize = 1000;

pub fn request_timeout() -> Duration {
    Duration::from_secs(REQUEST_SECS)
}
