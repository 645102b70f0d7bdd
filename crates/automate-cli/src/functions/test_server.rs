//! Mock Speckle server shared by the function tests

use automate_core::RunnerConfig;
use serde_json::{Value, json};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Authenticated user and status mutation, without any version
async fn mount_session(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_string_contains("activeUser"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"activeUser": {"id": "user", "name": "Tester", "email": null}}
        })))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_string_contains("functionRunStatusReport"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"automationMutations": {"functionRunStatusReport": true}}
        })))
        .mount(server)
        .await;
}

/// A server that knows the user but not the run's version
pub(crate) async fn start_missing_version() -> MockServer {
    let server = MockServer::start().await;
    mount_session(&server).await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_string_contains("ProjectVersion"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"project": {"version": null}}
        })))
        .mount(&server)
        .await;
    server
}

/// Serve one version whose root object is `root`, with `children` as the
/// objects of its closure
pub(crate) async fn start(root: Value, children: Vec<Value>) -> MockServer {
    let server = MockServer::start().await;
    mount_session(&server).await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_string_contains("ProjectVersion"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"project": {"version": {"id": "ver", "referencedObject": "root"}}}
        })))
        .mount(&server)
        .await;

    let mut root = root;
    let closure: serde_json::Map<String, Value> = children
        .iter()
        .filter_map(|child| child["id"].as_str())
        .map(|id| (id.to_string(), json!(1)))
        .collect();
    if !closure.is_empty() {
        root["__closure"] = Value::Object(closure);
    }
    Mock::given(method("GET"))
        .and(path("/objects/proj/root/single"))
        .respond_with(ResponseTemplate::new(200).set_body_json(root))
        .mount(&server)
        .await;

    let lines: String = children
        .iter()
        .map(|child| format!("{}\t{}\n", child["id"].as_str().unwrap_or_default(), child))
        .collect();
    Mock::given(method("POST"))
        .and(path("/api/getobjects/proj"))
        .respond_with(ResponseTemplate::new(200).set_body_string(lines))
        .mount(&server)
        .await;

    server
}

/// A root object holding `elements` by reference
pub(crate) fn root_with(elements: &[Value]) -> Value {
    let references: Vec<Value> = elements
        .iter()
        .map(|element| json!({"speckle_type": "reference", "referencedId": element["id"]}))
        .collect();
    json!({"id": "root", "speckle_type": "Base", "@elements": references})
}

pub(crate) fn run_data(server: &MockServer) -> String {
    json!({
        "projectId": "proj",
        "modelId": "model",
        "branchName": "main",
        "versionId": "ver",
        "speckleServerUrl": server.uri(),
        "automationId": "auto",
        "automationRevisionId": "rev",
        "automationRunId": "run",
        "functionId": "fn",
        "functionName": "Bundled function",
        "functionLogo": null
    })
    .to_string()
}

pub(crate) fn config() -> RunnerConfig {
    RunnerConfig {
        connect_timeout_secs: 2,
        request_timeout_secs: 5,
        ..RunnerConfig::default()
    }
}

/// Variables of the last status report the server received
pub(crate) async fn last_report(server: &MockServer) -> Value {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter_map(|request| serde_json::from_slice::<Value>(&request.body).ok())
        .filter(|body| {
            body["query"]
                .as_str()
                .is_some_and(|q| q.contains("functionRunStatusReport"))
        })
        .map(|body| body["variables"].clone())
        .last()
        .unwrap_or(Value::Null)
}

/// A displayable object with the given id and extra members
pub(crate) fn displayable(id: &str, members: Value) -> Value {
    let mut object = json!({
        "id": id,
        "speckle_type": "Objects.BuiltElements.Revit.FamilyInstance",
        "displayValue": [{"id": format!("{}-mesh", id), "speckle_type": "Objects.Geometry.Mesh"}]
    });
    if let (Some(target), Some(extra)) = (object.as_object_mut(), members.as_object()) {
        for (key, value) in extra {
            target.insert(key.clone(), value.clone());
        }
    }
    object
}
