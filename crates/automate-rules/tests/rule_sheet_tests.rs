//! Rule sheets loaded over HTTP and applied to a run

use async_trait::async_trait;
use automate_core::client::{ActiveUser, ObjectBundle, RunStatusReport, SpeckleApi, Version};
use automate_core::{AutomateError, AutomateResult, AutomationContext, AutomationRunData, Base, ObjectResultLevel};
use automate_rules::{RuleError, RuleSheet, apply_rules_to_objects, read_rules_from_path, read_rules_from_spreadsheet};
use serde_json::json;
use std::io::Write;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SHEET: &str = "Rule Number\tLogic\tProperty Name\tPredicate\tValue\tMessage\tReport Severity
1\tWHERE\tcategory\tequals\tWalls\t\t
1\tAND\tFire Rating\texists\t\tWalls need a fire rating\tWARN
2\tWHERE\tcategory\tequals\tDoors\t\t
2\tAND\twidth\tgreater than\t800\tDoors are wide enough\tError
";

struct OfflineApi;

#[async_trait]
impl SpeckleApi for OfflineApi {
    async fn active_user(&self) -> AutomateResult<ActiveUser> {
        Err(AutomateError::auth("offline"))
    }

    async fn get_version(&self, _project_id: &str, _version_id: &str) -> AutomateResult<Version> {
        Err(AutomateError::not_found("offline"))
    }

    async fn download_objects(&self, _project_id: &str, _object_id: &str) -> AutomateResult<ObjectBundle> {
        Err(AutomateError::not_found("offline"))
    }

    async fn report_run_status(&self, _report: &RunStatusReport) -> AutomateResult<()> {
        Ok(())
    }
}

fn context() -> AutomationContext {
    let run_data = AutomationRunData {
        project_id: "p".into(),
        model_id: "m".into(),
        branch_name: "main".into(),
        version_id: "v".into(),
        speckle_server_url: "http://localhost".into(),
        automation_id: "a".into(),
        automation_revision_id: "r".into(),
        automation_run_id: "run".into(),
        function_id: "f".into(),
        function_name: "Rules".into(),
        function_logo: None,
    };
    AutomationContext::with_api(run_data, Arc::new(OfflineApi))
}

fn objects() -> Vec<Base> {
    vec![
        Base::from_value(json!({
            "id": "wall-rated",
            "speckle_type": "Objects.BuiltElements.Wall",
            "category": "Walls",
            "parameters": {
                "speckle_type": "Base",
                "FIRE_RATING": {"speckle_type": "Base", "name": "Fire Rating", "value": "EI60"}
            }
        }))
        .unwrap(),
        Base::from_value(json!({
            "id": "wall-bare",
            "speckle_type": "Objects.BuiltElements.Wall",
            "category": "Walls"
        }))
        .unwrap(),
        Base::from_value(json!({
            "id": "door-narrow",
            "speckle_type": "Objects.BuiltElements.Revit.FamilyInstance",
            "category": "Doors",
            "width": 700
        }))
        .unwrap(),
    ]
}

#[tokio::test]
async fn test_read_rules_from_spreadsheet_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rules.tsv"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SHEET))
        .mount(&server)
        .await;

    let http = reqwest::Client::builder().no_proxy().build().unwrap();
    let sheet = read_rules_from_spreadsheet(&http, &format!("{}/rules.tsv", server.uri()))
        .await
        .unwrap();
    assert_eq!(sheet.groups().len(), 2);
}

#[tokio::test]
async fn test_missing_spreadsheet_is_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let http = reqwest::Client::builder().no_proxy().build().unwrap();
    let err = read_rules_from_spreadsheet(&http, &format!("{}/gone.tsv", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, RuleError::Fetch { status_code: Some(404), .. }));
}

#[test]
fn test_read_rules_from_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SHEET.as_bytes()).unwrap();
    let sheet = read_rules_from_path(file.path()).unwrap();
    assert_eq!(sheet.conditions.len(), 4);
}

#[test]
fn test_apply_rules_attaches_results() {
    let sheet = RuleSheet::from_tsv_str(SHEET).unwrap();
    let objects = objects();
    let refs: Vec<&Base> = objects.iter().collect();
    let mut ctx = context();

    let outcomes = apply_rules_to_objects(&refs, &sheet, &mut ctx).unwrap();
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].passed.len(), 1);
    assert_eq!(outcomes[0].failed.len(), 1);

    let results = &ctx.result().object_results;
    let categories: Vec<&str> = results.iter().map(|r| r.category.as_str()).collect();
    assert_eq!(categories, vec!["Rule 1 Success", "Rule 1 Results", "Rule 2 Results"]);

    assert_eq!(results[0].level, ObjectResultLevel::Info);
    assert_eq!(results[0].message.as_deref(), Some("Walls need a fire rating - Passed"));
    assert_eq!(results[1].level, ObjectResultLevel::Warning);
    assert_eq!(results[1].object_ids, vec!["wall-bare"]);
    assert_eq!(results[2].level, ObjectResultLevel::Error);
    assert_eq!(results[2].message.as_deref(), Some("Doors are wide enough - Failed"));
}

#[test]
fn test_unreportable_sheet_applies_nothing() {
    let sheet = RuleSheet::from_tsv_str(
        "Rule Number\tLogic\tProperty Name\tPredicate\tValue\n1\tWHERE\tcategory\tequals\tWalls\n",
    )
    .unwrap();
    let objects = objects();
    let refs: Vec<&Base> = objects.iter().collect();
    let mut ctx = context();
    assert!(apply_rules_to_objects(&refs, &sheet, &mut ctx).unwrap().is_empty());
    assert!(ctx.result().object_results.is_empty());
}
