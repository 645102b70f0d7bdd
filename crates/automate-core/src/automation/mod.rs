//! The automation run context

mod context;

pub use context::AutomationContext;
