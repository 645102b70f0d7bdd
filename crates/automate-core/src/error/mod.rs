//! Error types for automate functions
//!
//! Every fallible operation in the workspace returns [`AutomateResult`]. Errors
//! carry a stable error code and fall into one of three [`ErrorCategory`]
//! buckets that decide how the runner reports them:
//! - input validation: reported before any network call
//! - connectivity: the server could not be reached or refused the request
//! - transformation: the function itself failed

mod constructors;
mod conversions;
mod types;

pub use types::{AutomateError, AutomateResult, ErrorCategory, ResultExt};
