//! Comment on a random sample of objects and visualise their order

use super::random_comment::NO_DISPLAYABLE_OBJECTS;
use async_trait::async_trait;
use automate_core::objects::flatten_base;
use automate_core::runner::AutomateFunction;
use automate_core::{AutomateError, AutomateResult, AutomationContext, FunctionInputs, ObjectResultLevel};
use automate_rules::get_displayable_objects;
use rand::seq::SliceRandom;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Value, json};

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SampleInputs {
    /// This phrase will be added to the sampled model elements.
    #[schemars(title = "Comment Phrase")]
    pub comment_phrase: String,

    /// The number of elements to which the comment phrase will be added.
    #[schemars(title = "Number of Elements", range(min = 1))]
    pub number_of_elements: u32,
}

impl FunctionInputs for SampleInputs {
    fn validate(&self) -> AutomateResult<()> {
        if self.number_of_elements == 0 {
            return Err(AutomateError::invalid_input_field(
                "number of elements must be at least 1",
                "numberOfElements",
            ));
        }
        Ok(())
    }
}

pub struct RandomSample;

/// Gradient metadata ranking `ids` from 1 in the given order
fn index_gradient(ids: &[&str]) -> Value {
    let values: Map<String, Value> = ids
        .iter()
        .enumerate()
        .map(|(index, id)| (id.to_string(), json!({"gradientValue": index + 1})))
        .collect();
    json!({"gradient": true, "gradientValues": values})
}

#[async_trait]
impl AutomateFunction for RandomSample {
    type Inputs = SampleInputs;

    fn name(&self) -> &'static str {
        "random-sample"
    }

    fn description(&self) -> &'static str {
        "Attach a comment to a random sample of displayable objects"
    }

    async fn run(&self, context: &mut AutomationContext, inputs: SampleInputs) -> AutomateResult<()> {
        let root = context.receive_version().await?;
        let displayable: Vec<&str> = get_displayable_objects(flatten_base(&root))
            .into_iter()
            .filter_map(|object| object.id())
            .collect();

        if displayable.is_empty() {
            context.mark_run_failed(NO_DISPLAYABLE_OBJECTS);
        } else {
            let amount = (inputs.number_of_elements as usize).min(displayable.len());
            let selected: Vec<&str> = displayable
                .choose_multiple(&mut rand::thread_rng(), amount)
                .copied()
                .collect();

            context.attach_info_to_objects("Selected Objects", selected.iter().copied(), inputs.comment_phrase)?;
            context.attach_result_to_objects(
                ObjectResultLevel::Info,
                "Index Visualisation",
                selected.iter().copied(),
                Some("Object Indexes".to_string()),
                Some(index_gradient(&selected)),
                None,
            )?;
            context.mark_run_success(format!("Added comment to {} random objects.", amount));
        }

        context.set_context_view(Vec::<String>::new(), true)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::test_server;
    use automate_core::{AutomationStatus, execute_automate_function};

    #[test]
    fn test_index_gradient() {
        let gradient = index_gradient(&["a", "b"]);
        assert_eq!(gradient["gradient"], json!(true));
        assert_eq!(gradient["gradientValues"]["a"]["gradientValue"], json!(1));
        assert_eq!(gradient["gradientValues"]["b"]["gradientValue"], json!(2));
    }

    #[tokio::test]
    async fn test_sample_is_capped_by_available_objects() {
        let objects = vec![
            test_server::displayable("a", json!({})),
            test_server::displayable("b", json!({})),
            json!({
                "id": "inst",
                "speckle_type": "Objects.Other.Instance",
                "definition": test_server::displayable("def", json!({}))
            }),
        ];
        let server = test_server::start(test_server::root_with(&objects), objects).await;
        let outcome = execute_automate_function(
            &RandomSample,
            &test_server::run_data(&server),
            r#"{"commentPhrase": "look", "numberOfElements": 10}"#,
            "token",
            &test_server::config(),
        )
        .await;

        assert_eq!(outcome.status, AutomationStatus::Succeeded);
        assert_eq!(outcome.status_message.as_deref(), Some("Added comment to 3 random objects."));

        let report = test_server::last_report(&server).await;
        let results = &report["objectResults"]["values"]["objectResults"];
        assert_eq!(results[0]["category"], json!("Selected Objects"));
        assert_eq!(results[1]["category"], json!("Index Visualisation"));
        assert_eq!(results[1]["metadata"]["gradient"], json!(true));
        assert_eq!(results[1]["objectIds"].as_array().map(Vec::len), Some(3));
    }

    #[tokio::test]
    async fn test_zero_elements_rejected() {
        let server = test_server::start(test_server::root_with(&[]), vec![]).await;
        let outcome = execute_automate_function(
            &RandomSample,
            &test_server::run_data(&server),
            r#"{"commentPhrase": "look", "numberOfElements": 0}"#,
            "token",
            &test_server::config(),
        )
        .await;
        assert_eq!(outcome.exit_code(), 1);
        assert!(!outcome.reported);
    }
}
