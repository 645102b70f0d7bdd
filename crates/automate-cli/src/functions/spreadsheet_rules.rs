//! Apply rules maintained in a spreadsheet

use async_trait::async_trait;
use automate_core::config::timeouts;
use automate_core::objects::flatten_base;
use automate_core::runner::AutomateFunction;
use automate_core::{AutomateError, AutomateResult, AutomationContext, Base, FunctionInputs, ResultExt};
use automate_rules::{apply_rules_to_objects, read_rules_from_spreadsheet};
use schemars::JsonSchema;
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpreadsheetRulesInputs {
    /// This is the URL of the spreadsheet to check. It should be a TSV format data source.
    #[schemars(title = "Spreadsheet URL")]
    pub spreadsheet_url: String,
}

impl FunctionInputs for SpreadsheetRulesInputs {
    fn validate(&self) -> AutomateResult<()> {
        let url = reqwest::Url::parse(self.spreadsheet_url.trim())?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AutomateError::invalid_input_field(
                "spreadsheet url must use http or https",
                "spreadsheetUrl",
            ));
        }
        Ok(())
    }
}

pub struct SpreadsheetRules {
    request_timeout: Duration,
}

impl Default for SpreadsheetRules {
    fn default() -> Self {
        Self::new(timeouts::request_timeout())
    }
}

impl SpreadsheetRules {
    pub fn new(request_timeout: Duration) -> Self {
        Self { request_timeout }
    }
}

#[async_trait]
impl AutomateFunction for SpreadsheetRules {
    type Inputs = SpreadsheetRulesInputs;

    fn name(&self) -> &'static str {
        "spreadsheet-rules"
    }

    fn description(&self) -> &'static str {
        "Check objects against numbered rules read from a TSV spreadsheet"
    }

    async fn run(&self, context: &mut AutomationContext, inputs: SpreadsheetRulesInputs) -> AutomateResult<()> {
        let root = context.receive_version().await?;

        let http = reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()
            .context("failed to create HTTP client")?;
        let sheet = read_rules_from_spreadsheet(&http, inputs.spreadsheet_url.trim()).await?;
        info!("Loaded {} rule rows", sheet.conditions.len());

        let objects: Vec<&Base> = flatten_base(&root);
        apply_rules_to_objects(&objects, &sheet, context)?;

        context.set_context_view(Vec::<String>::new(), true)?;
        context.mark_run_success(format!("Successfully applied rules to {} objects.", objects.len()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::test_server;
    use automate_core::{AutomationStatus, execute_automate_function, parse_inputs};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, ResponseTemplate};

    const SHEET: &str = "Rule Number\tLogic\tProperty Name\tPredicate\tValue\tMessage\tReport Severity
1\tWHERE\tcategory\tequals\tWindows\t\t
1\tAND\tsill\tgreater than\t600\tSills above 600\tWarning
";

    #[test]
    fn test_url_must_be_http() {
        assert!(parse_inputs::<SpreadsheetRulesInputs>(r#"{"spreadsheetUrl": "file:///etc/rules.tsv"}"#).is_err());
        assert!(parse_inputs::<SpreadsheetRulesInputs>(r#"{"spreadsheetUrl": "not a url"}"#).is_err());
        assert!(parse_inputs::<SpreadsheetRulesInputs>(r#"{"spreadsheetUrl": "https://x.test/r.tsv"}"#).is_ok());
    }

    #[tokio::test]
    async fn test_rules_applied_from_sheet() {
        let objects = vec![
            test_server::displayable("high", json!({"category": "Windows", "sill": 900})),
            test_server::displayable("low", json!({"category": "Windows", "sill": 300})),
        ];
        let server = test_server::start(test_server::root_with(&objects), objects).await;
        Mock::given(method("GET"))
            .and(path("/rules.tsv"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SHEET))
            .mount(&server)
            .await;

        let inputs = json!({"spreadsheetUrl": format!("{}/rules.tsv", server.uri())}).to_string();
        let outcome = execute_automate_function(
            &SpreadsheetRules::default(),
            &test_server::run_data(&server),
            &inputs,
            "token",
            &test_server::config(),
        )
        .await;

        assert_eq!(outcome.status, AutomationStatus::Succeeded);
        assert_eq!(
            outcome.status_message.as_deref(),
            Some("Successfully applied rules to 3 objects.")
        );
        let report = test_server::last_report(&server).await;
        let results = &report["objectResults"]["values"]["objectResults"];
        assert_eq!(results[0]["category"], json!("Rule 1 Success"));
        assert_eq!(results[0]["objectIds"], json!(["high"]));
        assert_eq!(results[1]["level"], json!("WARNING"));
        assert_eq!(results[1]["message"], json!("Sills above 600 - Failed"));
    }

    #[tokio::test]
    async fn test_unreachable_sheet_fails_run() {
        let server = test_server::start(test_server::root_with(&[]), vec![]).await;
        let inputs = json!({"spreadsheetUrl": format!("{}/missing.tsv", server.uri())}).to_string();
        let outcome = execute_automate_function(
            &SpreadsheetRules::default(),
            &test_server::run_data(&server),
            &inputs,
            "token",
            &test_server::config(),
        )
        .await;

        assert_eq!(outcome.status, AutomationStatus::Failed);
        assert!(outcome.reported);
    }
}
