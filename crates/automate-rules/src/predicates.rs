//! Named predicates used by rule sheets

use crate::error::RuleResult;
use crate::parameters::{
    DEFAULT_FUZZY_THRESHOLD, has_parameter, is_parameter_value, is_parameter_value_false,
    is_parameter_value_greater_than, is_parameter_value_in_list, is_parameter_value_in_range,
    is_parameter_value_less_than, is_parameter_value_like, is_parameter_value_true,
};
use automate_core::objects::Base;
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    Exists,
    Matches,
    GreaterThan,
    LessThan,
    InRange,
    InList,
    Equals,
    True,
    False,
    IsLike,
}

impl Predicate {
    pub const ALL: [Predicate; 10] = [
        Self::Exists,
        Self::Matches,
        Self::GreaterThan,
        Self::LessThan,
        Self::InRange,
        Self::InList,
        Self::Equals,
        Self::True,
        Self::False,
        Self::IsLike,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Exists => "exists",
            Self::Matches => "matches",
            Self::GreaterThan => "greater than",
            Self::LessThan => "less than",
            Self::InRange => "in range",
            Self::InList => "in list",
            Self::Equals => "equals",
            Self::True => "true",
            Self::False => "false",
            Self::IsLike => "is like",
        }
    }

    /// Look up a predicate by its sheet name, ignoring case and surrounding
    /// whitespace
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|predicate| predicate.name().eq_ignore_ascii_case(name))
    }

    /// Apply the predicate to `property` of `object` with the sheet `value`
    pub fn evaluate(&self, object: &Base, property: &str, value: &str) -> RuleResult<bool> {
        match self {
            Self::Exists => Ok(has_parameter(object, property)),
            Self::Matches | Self::Equals => Ok(is_parameter_value(
                object,
                property,
                &Value::String(value.to_string()),
            )),
            Self::GreaterThan => is_parameter_value_greater_than(object, property, value),
            Self::LessThan => is_parameter_value_less_than(object, property, value),
            Self::InRange => is_parameter_value_in_range(object, property, value),
            Self::InList => Ok(is_parameter_value_in_list(object, property, value)),
            Self::True => Ok(is_parameter_value_true(object, property)),
            Self::False => Ok(is_parameter_value_false(object, property)),
            Self::IsLike => is_parameter_value_like(object, property, value, false, DEFAULT_FUZZY_THRESHOLD),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Evaluate a predicate given by name; unknown names never hold
pub fn evaluate_predicate(object: &Base, property: &str, predicate: &str, value: &str) -> RuleResult<bool> {
    match Predicate::parse(predicate) {
        Some(predicate) => predicate.evaluate(object, property, value),
        None => {
            tracing::debug!("unknown predicate '{}' evaluates to false", predicate);
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn window() -> Base {
        Base::from_value(json!({
            "id": "win",
            "speckle_type": "Objects.BuiltElements.Revit.FamilyInstance",
            "category": "Windows",
            "sill": 900,
            "glazed": true
        }))
        .unwrap()
    }

    #[test]
    fn test_parse_names() {
        for predicate in Predicate::ALL {
            assert_eq!(Predicate::parse(predicate.name()), Some(predicate));
        }
        assert_eq!(Predicate::parse("  Greater Than "), Some(Predicate::GreaterThan));
        assert_eq!(Predicate::parse("roughly"), None);
    }

    #[test]
    fn test_evaluate_by_name() {
        let window = window();
        assert!(evaluate_predicate(&window, "category", "equals", "Windows").unwrap());
        assert!(evaluate_predicate(&window, "sill", "greater than", "600").unwrap());
        assert!(evaluate_predicate(&window, "sill", "in range", "800,1000").unwrap());
        assert!(evaluate_predicate(&window, "glazed", "true", "").unwrap());
        assert!(evaluate_predicate(&window, "category", "is like", "Win").unwrap());
        assert!(evaluate_predicate(&window, "sill", "exists", "").unwrap());
    }

    #[test]
    fn test_unknown_predicate_is_false() {
        assert!(!evaluate_predicate(&window(), "category", "sounds like", "Windows").unwrap());
    }
}
