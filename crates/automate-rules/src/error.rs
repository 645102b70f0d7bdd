//! Rule evaluation errors

use automate_core::AutomateError;
use thiserror::Error;

pub type RuleResult<T> = Result<T, RuleError>;

#[derive(Error, Debug)]
pub enum RuleError {
    #[error("Parameter '{parameter}' must be a number, got {found}")]
    NotNumeric { parameter: String, found: String },

    #[error("'{input}' is not a valid integer or float")]
    InvalidNumber { input: String },

    #[error("Range '{input}' must be written as 'min,max'")]
    InvalidRange { input: String },

    #[error("Invalid pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("Rule sheet is missing the '{column}' column")]
    MissingColumn { column: String },

    #[error("Could not read rule sheet: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to fetch rule sheet from {url}: {message}")]
    Fetch {
        url: String,
        message: String,
        status_code: Option<u16>,
    },

    /// An error raised while evaluating one numbered rule
    #[error("Rule {rule}: {source}")]
    InRule {
        rule: String,
        #[source]
        source: Box<RuleError>,
    },
}

impl RuleError {
    pub fn in_rule(rule: impl Into<String>, source: RuleError) -> Self {
        Self::InRule {
            rule: rule.into(),
            source: Box::new(source),
        }
    }
}

impl From<RuleError> for AutomateError {
    fn from(error: RuleError) -> Self {
        match error {
            RuleError::InRule { rule, source } => AutomateError::rule(rule, source.to_string()),
            RuleError::Fetch {
                url,
                message,
                status_code: Some(status),
            } => AutomateError::http_status(message, url, status),
            RuleError::Fetch { url, message, .. } => {
                AutomateError::http(format!("{}: {}", url, message))
            }
            other => AutomateError::rule("rule sheet", other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use automate_core::ErrorCategory;

    #[test]
    fn test_rule_errors_are_transformation_errors() {
        let err: AutomateError = RuleError::in_rule(
            "3",
            RuleError::NotNumeric {
                parameter: "Width".into(),
                found: "\"wide\"".into(),
            },
        )
        .into();
        assert_eq!(err.error_code(), "AUTOMATE_RULE");
        assert_eq!(err.category(), ErrorCategory::Transformation);
        assert!(err.to_string().contains("Width"));
    }

    #[test]
    fn test_fetch_errors_are_connectivity_errors() {
        let err: AutomateError = RuleError::Fetch {
            url: "https://example.com/rules.tsv".into(),
            message: "server returned 404".into(),
            status_code: Some(404),
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::Connectivity);
    }
}
