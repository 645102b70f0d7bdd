//! Rule sheets: numbered groups of conditions applied to objects
//!
//! A sheet is tab-separated with a header row. Rows sharing a `Rule Number`
//! form one rule. The first row of a rule selects the objects it applies to
//! (WHERE), every further row must hold for an object to pass (AND). The
//! last row carries the `Message` and `Report Severity` of the rule.

use crate::error::{RuleError, RuleResult};
use crate::predicates::evaluate_predicate;
use automate_core::objects::Base;
use automate_core::{AutomateResult, AutomationContext, ObjectResultLevel};
use std::cmp::Ordering;
use std::io::Read;
use tracing::info;

pub const RULE_NUMBER_COLUMN: &str = "Rule Number";
pub const LOGIC_COLUMN: &str = "Logic";
pub const PROPERTY_NAME_COLUMN: &str = "Property Name";
pub const PREDICATE_COLUMN: &str = "Predicate";
pub const VALUE_COLUMN: &str = "Value";
pub const MESSAGE_COLUMN: &str = "Message";
pub const REPORT_SEVERITY_COLUMN: &str = "Report Severity";

/// One row of a rule sheet
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RuleCondition {
    pub rule_number: String,
    pub logic: String,
    pub property_name: String,
    pub predicate: String,
    pub value: String,
    pub message: Option<String>,
    pub report_severity: Option<String>,
}

impl RuleCondition {
    pub fn evaluate(&self, object: &Base) -> RuleResult<bool> {
        evaluate_predicate(object, &self.property_name, &self.predicate, &self.value)
    }
}

/// Rows of one rule number, in sheet order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleGroup {
    pub rule_number: String,
    pub conditions: Vec<RuleCondition>,
}

impl RuleGroup {
    /// The WHERE row
    pub fn filter(&self) -> Option<&RuleCondition> {
        self.conditions.first()
    }

    /// The AND rows
    pub fn checks(&self) -> &[RuleCondition] {
        self.conditions.get(1..).unwrap_or_default()
    }

    /// The row holding the message and severity
    pub fn info(&self) -> Option<&RuleCondition> {
        self.conditions.last()
    }

    /// Failures are warnings when the severity says so, errors otherwise
    pub fn failure_level(&self) -> ObjectResultLevel {
        let severity = self
            .info()
            .and_then(|row| row.report_severity.as_deref())
            .unwrap_or_default()
            .trim();
        if severity.eq_ignore_ascii_case("warning") || severity.eq_ignore_ascii_case("warn") {
            ObjectResultLevel::Warning
        } else {
            ObjectResultLevel::Error
        }
    }

    /// Split `objects` into those passing and failing this rule; objects the
    /// WHERE row rejects are in neither
    pub fn process<'a>(&self, objects: &[&'a Base]) -> RuleResult<(Vec<&'a Base>, Vec<&'a Base>)> {
        let Some(filter) = self.filter() else {
            return Ok((Vec::new(), Vec::new()));
        };

        let mut selected = Vec::new();
        for object in objects {
            if filter.evaluate(object)? {
                selected.push(*object);
            }
        }
        info!(
            "{} {} {} {}",
            filter.logic, filter.property_name, filter.predicate, filter.value
        );
        info!("{}: {} objects passed the filter.", self.rule_number, selected.len());

        let mut passed = Vec::new();
        let mut failed = Vec::new();
        for object in selected {
            let mut holds = true;
            for check in self.checks() {
                if !check.evaluate(object)? {
                    holds = false;
                    break;
                }
            }
            if holds {
                passed.push(object);
            } else {
                failed.push(object);
            }
        }
        Ok((passed, failed))
    }
}

/// A parsed rule sheet
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RuleSheet {
    pub conditions: Vec<RuleCondition>,
    /// Whether the sheet has both the `Message` and `Report Severity` columns
    pub reportable: bool,
}

struct Columns {
    rule_number: usize,
    logic: Option<usize>,
    property_name: usize,
    predicate: usize,
    value: Option<usize>,
    message: Option<usize>,
    report_severity: Option<usize>,
}

impl Columns {
    fn locate(headers: &csv::StringRecord) -> RuleResult<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let require = |name: &str| {
            find(name).ok_or_else(|| RuleError::MissingColumn {
                column: name.to_string(),
            })
        };
        Ok(Self {
            rule_number: require(RULE_NUMBER_COLUMN)?,
            logic: find(LOGIC_COLUMN),
            property_name: require(PROPERTY_NAME_COLUMN)?,
            predicate: require(PREDICATE_COLUMN)?,
            value: find(VALUE_COLUMN),
            message: find(MESSAGE_COLUMN),
            report_severity: find(REPORT_SEVERITY_COLUMN),
        })
    }
}

fn cell(record: &csv::StringRecord, index: Option<usize>) -> String {
    index
        .and_then(|i| record.get(i))
        .map(|value| value.trim().to_string())
        .unwrap_or_default()
}

fn optional_cell(record: &csv::StringRecord, index: Option<usize>) -> Option<String> {
    Some(cell(record, index)).filter(|value| !value.is_empty())
}

impl RuleSheet {
    /// Parse tab-separated rule rows. Rows without a rule number are skipped.
    pub fn from_tsv<R: Read>(reader: R) -> RuleResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .flexible(true)
            .from_reader(reader);
        let columns = Columns::locate(reader.headers()?)?;

        let mut conditions = Vec::new();
        for record in reader.records() {
            let record = record?;
            let rule_number = cell(&record, Some(columns.rule_number));
            if rule_number.is_empty() {
                continue;
            }
            conditions.push(RuleCondition {
                rule_number,
                logic: cell(&record, columns.logic),
                property_name: cell(&record, Some(columns.property_name)),
                predicate: cell(&record, Some(columns.predicate)),
                value: cell(&record, columns.value),
                message: optional_cell(&record, columns.message),
                report_severity: optional_cell(&record, columns.report_severity),
            });
        }

        Ok(Self {
            conditions,
            reportable: columns.message.is_some() && columns.report_severity.is_some(),
        })
    }

    pub fn from_tsv_str(text: &str) -> RuleResult<Self> {
        Self::from_tsv(text.as_bytes())
    }

    /// Rows grouped by rule number, numbers in numeric order when they are
    /// numbers
    pub fn groups(&self) -> Vec<RuleGroup> {
        let mut groups: Vec<RuleGroup> = Vec::new();
        for condition in &self.conditions {
            match groups
                .iter_mut()
                .find(|group| group.rule_number == condition.rule_number)
            {
                Some(group) => group.conditions.push(condition.clone()),
                None => groups.push(RuleGroup {
                    rule_number: condition.rule_number.clone(),
                    conditions: vec![condition.clone()],
                }),
            }
        }
        groups.sort_by(|a, b| compare_rule_numbers(&a.rule_number, &b.rule_number));
        groups
    }
}

fn compare_rule_numbers(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Objects that passed and failed one rule
#[derive(Debug, Clone)]
pub struct RuleOutcome<'a> {
    pub rule_number: String,
    pub passed: Vec<&'a Base>,
    pub failed: Vec<&'a Base>,
}

/// Apply every rule of `sheet` and attach the results to `context`.
///
/// Nothing is evaluated when the sheet cannot report (no `Message` or
/// `Report Severity` column).
pub fn apply_rules_to_objects<'a>(
    objects: &[&'a Base],
    sheet: &RuleSheet,
    context: &mut AutomationContext,
) -> AutomateResult<Vec<RuleOutcome<'a>>> {
    let mut outcomes = Vec::new();
    if !sheet.reportable {
        info!("Rule sheet has no message or severity column, no rules applied");
        return Ok(outcomes);
    }

    for group in sheet.groups() {
        let (passed, failed) = group
            .process(objects)
            .map_err(|e| RuleError::in_rule(group.rule_number.clone(), e))?;

        attach_results(context, &group, &passed, true)?;
        attach_results(context, &group, &failed, false)?;

        outcomes.push(RuleOutcome {
            rule_number: group.rule_number,
            passed,
            failed,
        });
    }
    Ok(outcomes)
}

fn attach_results(
    context: &mut AutomationContext,
    group: &RuleGroup,
    objects: &[&Base],
    passed: bool,
) -> AutomateResult<()> {
    let object_ids: Vec<&str> = objects.iter().filter_map(|object| object.id()).collect();
    if object_ids.is_empty() {
        return Ok(());
    }

    let rule_message = group
        .info()
        .and_then(|row| row.message.as_deref())
        .unwrap_or_default();
    let message = format!("{} - {}", rule_message, if passed { "Passed" } else { "Failed" });

    if passed {
        context.attach_info_to_objects(format!("Rule {} Success", group.rule_number), object_ids, message)
    } else {
        context.attach_result_to_objects(
            group.failure_level(),
            format!("Rule {} Results", group.rule_number),
            object_ids,
            Some(message),
            None,
            None,
        )
    }
}
