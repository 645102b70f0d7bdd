//! Object checks for Automate functions
//!
//! Building blocks for functions that validate model data: finding objects
//! that can be highlighted, reading Revit-style parameters, predicates over
//! those parameters, and rule sheets that combine predicates into numbered
//! rules reported back as object results.

pub mod displayable;
pub mod error;
pub mod parameters;
pub mod predicates;
pub mod rule_set;
pub mod spreadsheet;

pub use displayable::{get_displayable_objects, is_displayable_object, try_get_display_value};
pub use error::{RuleError, RuleResult};
pub use predicates::{Predicate, evaluate_predicate};
pub use rule_set::{RuleCondition, RuleGroup, RuleOutcome, RuleSheet, apply_rules_to_objects};
pub use spreadsheet::{read_rules_from_path, read_rules_from_spreadsheet};
