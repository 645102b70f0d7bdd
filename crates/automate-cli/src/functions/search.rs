//! Find objects mentioning a phrase

use async_trait::async_trait;
use automate_core::objects::{Member, flatten_base};
use automate_core::runner::AutomateFunction;
use automate_core::{AutomateResult, AutomationContext, Base, FunctionInputs};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchInputs {
    /// Objects with a text property containing this phrase are highlighted.
    /// Matching ignores case.
    #[serde(default)]
    #[schemars(title = "Search Phrase")]
    pub search_phrase: Option<String>,
}

impl FunctionInputs for SearchInputs {}

pub struct Search;

fn mentions(member: &Member, needle: &str) -> bool {
    match member {
        Member::Value(value) => value
            .as_str()
            .is_some_and(|text| text.to_lowercase().contains(needle)),
        Member::List(items) => items.iter().any(|item| mentions(item, needle)),
        Member::Base(_) => false,
    }
}

/// Whether any text member of `object` contains `needle` (already lowercased)
fn object_mentions(object: &Base, needle: &str) -> bool {
    object.members().any(|(_, member)| mentions(member, needle))
}

#[async_trait]
impl AutomateFunction for Search {
    type Inputs = SearchInputs;

    fn name(&self) -> &'static str {
        "search"
    }

    fn description(&self) -> &'static str {
        "Highlight objects whose text properties contain a phrase"
    }

    async fn run(&self, context: &mut AutomationContext, inputs: SearchInputs) -> AutomateResult<()> {
        let root = context.receive_version().await?;
        let objects = flatten_base(&root);

        let phrase = inputs.search_phrase.unwrap_or_default();
        let phrase = phrase.trim();
        if phrase.is_empty() {
            context.mark_run_success(format!(
                "Received {} objects, no search phrase given.",
                objects.len()
            ));
            return Ok(());
        }

        let needle = phrase.to_lowercase();
        let matched: Vec<&str> = objects
            .iter()
            .filter(|object| object_mentions(object, &needle))
            .filter_map(|object| object.id())
            .collect();
        info!("{} of {} objects mention '{}'", matched.len(), objects.len(), phrase);

        if matched.is_empty() {
            context.mark_run_success(format!(
                "Searched {} objects for '{}', no matches found.",
                objects.len(),
                phrase
            ));
            return Ok(());
        }

        let count = matched.len();
        context.attach_info_to_objects("Search Results", matched, format!("Mentions '{}'", phrase))?;
        context.mark_run_success(format!("Found {} objects matching '{}'", count, phrase));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::test_server;
    use automate_core::{AutomationStatus, execute_automate_function};
    use serde_json::{Value, json};

    #[tokio::test]
    async fn test_no_matches_on_empty_version() {
        let server = test_server::start(test_server::root_with(&[]), vec![]).await;
        let outcome = execute_automate_function(
            &Search,
            &test_server::run_data(&server),
            r#"{"searchPhrase": "Hello"}"#,
            "token",
            &test_server::config(),
        )
        .await;

        assert_eq!(outcome.status, AutomationStatus::Succeeded);
        assert_eq!(outcome.exit_code(), 0);
        assert!(outcome.status_message.unwrap().contains("no matches found"));
    }

    #[tokio::test]
    async fn test_matches_are_annotated() {
        let walls = vec![
            json!({"id": "w1", "speckle_type": "Objects.BuiltElements.Wall", "comment": "Hello world"}),
            json!({"id": "w2", "speckle_type": "Objects.BuiltElements.Wall", "tags": ["a", "HELLO again"]}),
            json!({"id": "w3", "speckle_type": "Objects.BuiltElements.Wall", "comment": "Goodbye"}),
        ];
        let server = test_server::start(test_server::root_with(&walls), walls).await;
        let outcome = execute_automate_function(
            &Search,
            &test_server::run_data(&server),
            r#"{"searchPhrase": "hello"}"#,
            "token",
            &test_server::config(),
        )
        .await;

        assert_eq!(outcome.status_message.as_deref(), Some("Found 2 objects matching 'hello'"));
        let report = test_server::last_report(&server).await;
        assert_eq!(
            report["objectResults"]["values"]["objectResults"][0]["objectIds"],
            json!(["w1", "w2"])
        );
    }

    #[tokio::test]
    async fn test_empty_inputs_still_receive_version() {
        let walls = vec![json!({"id": "w1", "speckle_type": "Objects.BuiltElements.Wall"})];
        let server = test_server::start(test_server::root_with(&walls), walls).await;
        let outcome = execute_automate_function(
            &Search,
            &test_server::run_data(&server),
            "{}",
            "token",
            &test_server::config(),
        )
        .await;

        assert_eq!(outcome.exit_code(), 0);
        assert_eq!(
            outcome.status_message.as_deref(),
            Some("Received 2 objects, no search phrase given.")
        );
        let requests = server.received_requests().await.unwrap_or_default();
        assert!(requests.iter().any(|r| r.url.path() == "/objects/proj/root/single"));
    }

    #[tokio::test]
    async fn test_empty_inputs_with_missing_version_fail() {
        let server = test_server::start_missing_version().await;
        let outcome = execute_automate_function(
            &Search,
            &test_server::run_data(&server),
            "{}",
            "token",
            &test_server::config(),
        )
        .await;

        assert_ne!(outcome.exit_code(), 0);
        assert_eq!(outcome.status, AutomationStatus::Failed);
        let report = test_server::last_report(&server).await;
        assert_eq!(report["runStatus"], json!("FAILED"));
        assert_eq!(report["objectResults"], Value::Null);
    }

    #[test]
    fn test_nested_objects_are_not_searched_twice() {
        let parent = Base::new("Base").with_member(
            "child",
            Base::new("Base").with_member("comment", json!("hello")),
        );
        assert!(!object_mentions(&parent, "hello"));
    }
}
