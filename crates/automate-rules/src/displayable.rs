//! Which objects can be highlighted in the viewer

use automate_core::objects::Base;

/// Display meshes of an object, if it has any.
///
/// Looks at `displayValue` first and falls back to `@displayValue`; values
/// that are not objects are ignored.
pub fn try_get_display_value(object: &Base) -> Option<Vec<&Base>> {
    let raw = ["displayValue", "@displayValue"]
        .into_iter()
        .filter_map(|name| object.get(name))
        .find(|member| member.is_truthy())?;

    let display_values = raw.bases();
    if display_values.is_empty() {
        None
    } else {
        Some(display_values)
    }
}

/// An object is displayable when it (or its instance `definition`) has an
/// id and at least one display value.
pub fn is_displayable_object(object: &Base) -> bool {
    if object.id().is_some() && try_get_display_value(object).is_some() {
        return true;
    }
    object
        .get_base("definition")
        .is_some_and(|definition| definition.id().is_some() && try_get_display_value(definition).is_some())
}

/// Keep the displayable objects that carry an id
pub fn get_displayable_objects<'a, I>(objects: I) -> Vec<&'a Base>
where
    I: IntoIterator<Item = &'a Base>,
{
    objects
        .into_iter()
        .filter(|object| object.id().is_some() && is_displayable_object(object))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: serde_json::Value) -> Base {
        Base::from_value(value).unwrap()
    }

    #[test]
    fn test_display_value_detached_form() {
        let wall = object(json!({
            "id": "w",
            "speckle_type": "Objects.BuiltElements.Wall",
            "@displayValue": [{"id": "m", "speckle_type": "Objects.Geometry.Mesh"}, 3]
        }));
        let values = try_get_display_value(&wall).unwrap();
        assert_eq!(values.len(), 1);
        assert!(is_displayable_object(&wall));
    }

    #[test]
    fn test_empty_display_value_is_not_displayable() {
        let empty = object(json!({"id": "e", "speckle_type": "Base", "displayValue": []}));
        assert!(try_get_display_value(&empty).is_none());
        assert!(!is_displayable_object(&empty));
    }

    #[test]
    fn test_instance_displayable_through_definition() {
        let instance = object(json!({
            "id": "i",
            "speckle_type": "Objects.Other.Instance:Objects.Other.BlockInstance",
            "definition": {
                "id": "d",
                "speckle_type": "Objects.Other.BlockDefinition",
                "displayValue": [{"id": "m", "speckle_type": "Objects.Geometry.Mesh"}]
            }
        }));
        assert!(is_displayable_object(&instance));
    }

    #[test]
    fn test_objects_without_id_are_dropped() {
        let anonymous = object(json!({
            "speckle_type": "Base",
            "displayValue": [{"id": "m", "speckle_type": "Objects.Geometry.Mesh"}]
        }));
        let named = object(json!({
            "id": "n",
            "speckle_type": "Base",
            "displayValue": [{"id": "m", "speckle_type": "Objects.Geometry.Mesh"}]
        }));
        let displayable = get_displayable_objects([&anonymous, &named]);
        assert_eq!(displayable.len(), 1);
        assert_eq!(displayable[0].id(), Some("n"));
    }
}
