//! Check that objects of a category carry a property

use async_trait::async_trait;
use automate_core::objects::{Base, flatten_base};
use automate_core::runner::AutomateFunction;
use automate_core::{AutomateError, AutomateResult, AutomationContext, FunctionInputs};
use automate_rules::parameters::{get_parameter_value, has_parameter, is_category};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

/// Values that count as "not filled in"
const PLACEHOLDER_VALUES: [&str; 2] = ["", "Default"];

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PropertyCheckInputs {
    /// This is the category of objects to check.
    #[schemars(title = "Revit Category")]
    pub category: String,

    /// This is the property to check.
    #[schemars(title = "Property Name")]
    pub property: String,
}

impl FunctionInputs for PropertyCheckInputs {
    fn validate(&self) -> AutomateResult<()> {
        for (field, value) in [("category", &self.category), ("property", &self.property)] {
            if value.trim().is_empty() {
                return Err(AutomateError::invalid_input_field(
                    format!("{} must not be empty", field),
                    field,
                ));
            }
        }
        Ok(())
    }
}

pub struct PropertyCheck;

fn has_usable_value(object: &Base, property: &str) -> bool {
    match get_parameter_value(object, property, None) {
        None => false,
        Some(member) => match member.as_value() {
            Some(Value::String(text)) => !PLACEHOLDER_VALUES.contains(&text.as_str()),
            _ => true,
        },
    }
}

fn ids<'a>(objects: &[&'a Base]) -> Vec<&'a str> {
    objects.iter().filter_map(|object| object.id()).collect()
}

#[async_trait]
impl AutomateFunction for PropertyCheck {
    type Inputs = PropertyCheckInputs;

    fn name(&self) -> &'static str {
        "property-check"
    }

    fn description(&self) -> &'static str {
        "Report objects of a category that miss a property or leave it empty"
    }

    async fn run(&self, context: &mut AutomationContext, inputs: PropertyCheckInputs) -> AutomateResult<()> {
        let PropertyCheckInputs { category, property } = inputs;
        let root = context.receive_version().await?;

        let in_category: Vec<&Base> = flatten_base(&root)
            .into_iter()
            .filter(|object| is_category(object, &category))
            .collect();
        let (with_property, missing): (Vec<&Base>, Vec<&Base>) = in_category
            .into_iter()
            .partition(|object| has_parameter(object, &property));
        let invalid: Vec<&Base> = with_property
            .iter()
            .copied()
            .filter(|object| !has_usable_value(object, &property))
            .collect();

        let missing_ids = ids(&missing);
        if !missing_ids.is_empty() {
            context.attach_error_to_objects(
                format!("Missing Property {} Objects", category),
                missing_ids,
                format!("This {} does not have the specified property {}", category, property),
            )?;
        }
        let invalid_ids = ids(&invalid);
        if !invalid_ids.is_empty() {
            context.attach_warning_to_objects(
                format!("Invalid Property {} Objects", category),
                invalid_ids,
                format!(
                    "This {} has the specified property {} but it is empty or default",
                    category, property
                ),
            )?;
        }
        let valid_ids = ids(&with_property);
        if !valid_ids.is_empty() {
            context.attach_info_to_objects(
                format!("Valid Property {} Objects", category),
                valid_ids,
                format!("This {} has the specified property {}", category, property),
            )?;
        }

        if !missing.is_empty() {
            context.mark_run_failed("Some objects do not have the specified property.");
        } else if !invalid.is_empty() {
            context.mark_run_success("Some objects have the specified property but it is empty or default.");
        } else {
            context.mark_run_success(format!("All {} objects have the {} property.", category, property));
        }

        context.set_context_view(Vec::<String>::new(), true)?;
        Ok(())
    }
}
