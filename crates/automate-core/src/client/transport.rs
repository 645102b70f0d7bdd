//! Object download decoding and reference resolution

use super::api::{ObjectBundle, SpeckleApi};
use crate::error::{AutomateError, AutomateResult};
use crate::objects::Base;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::{debug, warn};

const REFERENCE_TYPE: &str = "reference";
const REFERENCED_ID_KEY: &str = "referencedId";
const CLOSURE_KEY: &str = "__closure";

/// Ids listed in an object's `__closure` table
pub fn closure_ids(root: &Value) -> Vec<String> {
    root.get(CLOSURE_KEY)
        .and_then(Value::as_object)
        .map(|closure| closure.keys().cloned().collect())
        .unwrap_or_default()
}

/// Parse a `getobjects` response: one `id<TAB>json` pair per line
pub fn parse_object_lines(body: &str) -> AutomateResult<HashMap<String, Value>> {
    let mut objects = HashMap::new();
    for (index, line) in body.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let (id, json) = line.split_once('\t').ok_or_else(|| {
            AutomateError::server(format!("malformed object line {}: missing tab", index + 1))
        })?;
        let value: Value = serde_json::from_str(json).map_err(|e| {
            AutomateError::json_with_context(e.to_string(), format!("decoding object {}", id))
        })?;
        objects.insert(id.to_string(), value);
    }
    Ok(objects)
}

fn referenced_id(map: &Map<String, Value>) -> Option<&str> {
    let is_reference = map
        .get("speckle_type")
        .and_then(Value::as_str)
        .is_some_and(|t| t == REFERENCE_TYPE);
    if is_reference {
        map.get(REFERENCED_ID_KEY).and_then(Value::as_str)
    } else {
        None
    }
}

/// Replace reference stubs with the objects they point to.
///
/// Unknown references stay as stubs; a reference back to an object that is
/// already being resolved is left as a stub so cycles terminate.
pub fn resolve_references(bundle: ObjectBundle) -> Value {
    let ObjectBundle { root, children } = bundle;
    let mut stack = Vec::new();
    resolve(root, &children, &mut stack)
}

fn resolve(value: Value, objects: &HashMap<String, Value>, stack: &mut Vec<String>) -> Value {
    match value {
        Value::Object(map) => {
            if let Some(id) = referenced_id(&map) {
                if stack.iter().any(|seen| seen == id) {
                    warn!("cyclic reference to object {} left unresolved", id);
                    return Value::Object(map);
                }
                return match objects.get(id) {
                    Some(target) => {
                        let id = id.to_string();
                        stack.push(id);
                        let resolved = resolve(target.clone(), objects, stack);
                        stack.pop();
                        resolved
                    }
                    None => {
                        debug!("reference to missing object {}", id);
                        Value::Object(map)
                    }
                };
            }

            let own_id = map.get("id").and_then(Value::as_str).map(str::to_string);
            if let Some(id) = &own_id {
                stack.push(id.clone());
            }
            let resolved = map
                .into_iter()
                .filter(|(key, _)| key != CLOSURE_KEY)
                .map(|(key, child)| (key, resolve(child, objects, stack)))
                .collect();
            if own_id.is_some() {
                stack.pop();
            }
            Value::Object(resolved)
        }
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| resolve(item, objects, stack))
                .collect(),
        ),
        other => other,
    }
}

/// Download an object graph and rebuild it as a single [`Base`]
pub async fn receive_object(
    api: &dyn SpeckleApi,
    project_id: &str,
    object_id: &str,
) -> AutomateResult<Base> {
    let bundle = api.download_objects(project_id, object_id).await?;
    debug!(
        "downloaded object {} with {} children",
        object_id,
        bundle.children.len()
    );
    Base::from_value(resolve_references(bundle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reference(id: &str) -> Value {
        json!({"speckle_type": "reference", "referencedId": id})
    }

    #[test]
    fn test_parse_object_lines() {
        let body = "a\t{\"id\":\"a\",\"speckle_type\":\"Base\"}\r\nb\t{\"id\":\"b\",\"speckle_type\":\"Base\"}\n\n";
        let objects = parse_object_lines(body).unwrap();
        assert_eq!(objects.len(), 2);
        assert_eq!(objects["b"]["id"], json!("b"));
    }

    #[test]
    fn test_parse_object_lines_rejects_garbage() {
        assert!(parse_object_lines("no tab here").is_err());
        assert!(parse_object_lines("a\t{not json").is_err());
    }

    #[test]
    fn test_closure_ids() {
        let root = json!({"id": "r", "__closure": {"a": 1, "b": 2}});
        let mut ids = closure_ids(&root);
        ids.sort();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(closure_ids(&json!({"id": "r"})).is_empty());
    }

    #[test]
    fn test_references_resolved_recursively() {
        let bundle = ObjectBundle {
            root: json!({
                "id": "root",
                "speckle_type": "Base",
                "__closure": {"a": 1, "b": 2},
                "@elements": [reference("a")]
            }),
            children: HashMap::from([
                (
                    "a".to_string(),
                    json!({"id": "a", "speckle_type": "Base", "@displayValue": [reference("b")]}),
                ),
                ("b".to_string(), json!({"id": "b", "speckle_type": "Objects.Geometry.Mesh"})),
            ]),
        };

        let resolved = resolve_references(bundle);
        assert!(resolved.get("__closure").is_none());
        assert_eq!(
            resolved["@elements"][0]["@displayValue"][0]["speckle_type"],
            json!("Objects.Geometry.Mesh")
        );
    }

    #[test]
    fn test_missing_reference_left_as_stub() {
        let bundle = ObjectBundle {
            root: json!({"id": "root", "speckle_type": "Base", "child": reference("gone")}),
            children: HashMap::new(),
        };
        let resolved = resolve_references(bundle);
        assert_eq!(resolved["child"]["referencedId"], json!("gone"));
    }

    #[test]
    fn test_cycles_terminate() {
        let bundle = ObjectBundle {
            root: json!({"id": "a", "speckle_type": "Base", "next": reference("b")}),
            children: HashMap::from([
                ("b".to_string(), json!({"id": "b", "speckle_type": "Base", "next": reference("a")})),
                ("a".to_string(), json!({"id": "a", "speckle_type": "Base", "next": reference("b")})),
            ]),
        };
        let resolved = resolve_references(bundle);
        assert_eq!(resolved["next"]["id"], json!("b"));
        assert_eq!(resolved["next"]["next"]["referencedId"], json!("a"));
    }
}
