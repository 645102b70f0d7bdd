//! Revit-style parameter lookup and checks
//!
//! A parameter may live in three places on an object:
//! 1. a member on the object itself (`category`, `family`, ...)
//! 2. a key of the `parameters` object
//! 3. an entry of the `parameters` object whose `name` member matches,
//!    with the actual value under `value` (shared parameters)

use crate::error::{RuleError, RuleResult};
use automate_core::objects::{Base, Member};
use regex::Regex;
use serde_json::Value;

/// Similarity needed for a fuzzy match
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.8;

const PARAMETERS_KEY: &str = "parameters";
const CATEGORY_KEY: &str = "category";

pub fn has_parameter(object: &Base, parameter_name: &str) -> bool {
    if object.has_member(parameter_name) {
        return true;
    }
    let Some(parameters) = object.get_base(PARAMETERS_KEY) else {
        return false;
    };
    if parameters.get(parameter_name).is_some() {
        return true;
    }
    parameters
        .members()
        .filter_map(|(_, member)| member.as_base())
        .any(|parameter| parameter.get_str("name") == Some(parameter_name))
}

fn is_usable<'a>(member: Option<&'a Member>, default_value: Option<&Value>) -> Option<&'a Member> {
    member.filter(|m| !m.is_null() && default_value.is_none_or(|default| &m.to_value() != default))
}

/// The value of a parameter, or `None` when it is missing, null or equal to
/// `default_value`
pub fn get_parameter_value<'a>(
    object: &'a Base,
    parameter_name: &str,
    default_value: Option<&Value>,
) -> Option<&'a Member> {
    if let Some(value) = is_usable(object.get(parameter_name), default_value) {
        return Some(value);
    }

    let parameters = object.get_base(PARAMETERS_KEY)?;
    if let Some(parameter) = parameters.get_non_null(parameter_name) {
        let value = match parameter.as_base() {
            Some(nested) => nested.get("value"),
            None => Some(parameter),
        };
        if let Some(value) = is_usable(value, default_value) {
            return Some(value);
        }
    }

    parameters
        .members()
        .filter_map(|(_, member)| member.as_base())
        .find(|parameter| parameter.get_str("name") == Some(parameter_name))
        .and_then(|parameter| parameter.get_non_null("value"))
}

fn number_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_number_from_string(s).ok(),
        _ => None,
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Equality that tolerates values typed in a sheet: `"3"` matches `3` and
/// `"3.0"`
pub fn values_equal(actual: &Value, expected: &Value) -> bool {
    if actual == expected {
        return true;
    }
    match (number_of(actual), number_of(expected)) {
        (Some(a), Some(b)) => a == b,
        _ => text_of(actual) == text_of(expected),
    }
}

pub fn is_parameter_value(object: &Base, parameter_name: &str, value_to_match: &Value) -> bool {
    match get_parameter_value(object, parameter_name, None) {
        Some(value) => values_equal(&value.to_value(), value_to_match),
        None => value_to_match.is_null(),
    }
}

/// Match a parameter against a pattern.
///
/// Without `fuzzy` the pattern is a regular expression anchored at the start
/// of the value. With `fuzzy` the value matches when its [`similarity`] to
/// the pattern reaches `threshold`.
pub fn is_parameter_value_like(
    object: &Base,
    parameter_name: &str,
    pattern: &str,
    fuzzy: bool,
    threshold: f64,
) -> RuleResult<bool> {
    let Some(value) = get_parameter_value(object, parameter_name, None) else {
        return Ok(false);
    };
    let text = value.display_string();
    if fuzzy {
        return Ok(similarity(&text, pattern) >= threshold);
    }
    let regex = Regex::new(&format!("^(?:{})", pattern))?;
    Ok(regex.is_match(&text))
}

/// Normalized Indel similarity of two strings in `[0, 1]`:
/// `2 * lcs / (len(a) + len(b))`, where `lcs` is the longest common
/// subsequence. Two empty strings are identical.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    let mut previous = vec![0usize; b.len() + 1];
    let mut current = vec![0usize; b.len() + 1];
    for ca in &a {
        for (j, cb) in b.iter().enumerate() {
            current[j + 1] = if ca == cb {
                previous[j] + 1
            } else {
                current[j].max(previous[j + 1])
            };
        }
        std::mem::swap(&mut previous, &mut current);
    }
    let lcs = previous[b.len()];
    (2 * lcs) as f64 / total as f64
}

/// Parse an integer or float, ignoring surrounding whitespace
pub fn parse_number_from_string(input: &str) -> RuleResult<f64> {
    let trimmed = input.trim();
    trimmed
        .parse::<i64>()
        .map(|n| n as f64)
        .or_else(|_| trimmed.parse::<f64>())
        .map_err(|_| RuleError::InvalidNumber {
            input: input.to_string(),
        })
}

/// Numeric value of a parameter; `None` when missing, an error when present
/// but not a number
fn numeric_parameter(object: &Base, parameter_name: &str) -> RuleResult<Option<f64>> {
    let Some(value) = get_parameter_value(object, parameter_name, None) else {
        return Ok(None);
    };
    match value.as_value() {
        Some(Value::Number(n)) => Ok(n.as_f64()),
        _ => Err(RuleError::NotNumeric {
            parameter: parameter_name.to_string(),
            found: value.to_value().to_string(),
        }),
    }
}

pub fn is_parameter_value_greater_than(object: &Base, parameter_name: &str, threshold: &str) -> RuleResult<bool> {
    let Some(value) = numeric_parameter(object, parameter_name)? else {
        return Ok(false);
    };
    Ok(value > parse_number_from_string(threshold)?)
}

pub fn is_parameter_value_less_than(object: &Base, parameter_name: &str, threshold: &str) -> RuleResult<bool> {
    let Some(value) = numeric_parameter(object, parameter_name)? else {
        return Ok(false);
    };
    Ok(value < parse_number_from_string(threshold)?)
}

/// Inclusive range check with the range written as `"min,max"`
pub fn is_parameter_value_in_range(object: &Base, parameter_name: &str, range: &str) -> RuleResult<bool> {
    let (min, max) = range.split_once(',').ok_or_else(|| RuleError::InvalidRange {
        input: range.to_string(),
    })?;
    let min = parse_number_from_string(min)?;
    let max = parse_number_from_string(max)?;
    is_parameter_value_in_range_expanded(object, parameter_name, min, max, true)
}

pub fn is_parameter_value_in_range_expanded(
    object: &Base,
    parameter_name: &str,
    min: f64,
    max: f64,
    inclusive: bool,
) -> RuleResult<bool> {
    let Some(value) = numeric_parameter(object, parameter_name)? else {
        return Ok(false);
    };
    Ok(if inclusive {
        min <= value && value <= max
    } else {
        min < value && value < max
    })
}

/// Membership in a comma-separated list, compared by value or text
pub fn is_parameter_value_in_list(object: &Base, parameter_name: &str, value_list: &str) -> bool {
    let Some(value) = get_parameter_value(object, parameter_name, None) else {
        return false;
    };
    let value = value.to_value();
    let text = text_of(&value);
    value_list
        .split(',')
        .map(str::trim)
        .any(|candidate| candidate == text || values_equal(&value, &Value::String(candidate.to_string())))
}

pub fn is_parameter_value_true(object: &Base, parameter_name: &str) -> bool {
    get_parameter_value(object, parameter_name, None).and_then(Member::as_bool) == Some(true)
}

pub fn is_parameter_value_false(object: &Base, parameter_name: &str) -> bool {
    get_parameter_value(object, parameter_name, None).and_then(Member::as_bool) == Some(false)
}

pub fn has_category(object: &Base) -> bool {
    has_parameter(object, CATEGORY_KEY)
}

pub fn get_category_value(object: &Base) -> Option<String> {
    get_parameter_value(object, CATEGORY_KEY, None).map(Member::display_string)
}

pub fn is_category(object: &Base, category: &str) -> bool {
    get_category_value(object).as_deref() == Some(category)
}

/// Split objects into those in `category` and the rest
pub fn filter_objects_by_category<'a, I>(objects: I, category: &str) -> (Vec<&'a Base>, Vec<&'a Base>)
where
    I: IntoIterator<Item = &'a Base>,
{
    objects
        .into_iter()
        .partition(|object| is_category(object, category))
}
