//! Walking a received object graph
//!
//! Three strategies are provided, from cheapest to most thorough:
//! - [`flatten_base`]: every object reachable through `elements`, children first
//! - [`flatten_base_thorough`]: leaf objects only, tagged with their parent type,
//!   also expanding legacy `@Category` containers
//! - [`extract_base_and_transform`]: resolves instances into their definitions
//!   and accumulates the transforms applied on the way down

use super::base::{Base, Member};
use serde_json::Value;

/// Flatten a base into itself and everything under `elements`.
///
/// Children are emitted before their parent.
pub fn flatten_base(base: &Base) -> Vec<&Base> {
    let mut out = Vec::new();
    collect_flat(base, &mut out);
    out
}

fn collect_flat<'a>(base: &'a Base, out: &mut Vec<&'a Base>) {
    for element in base.elements() {
        collect_flat(element, out);
    }
    out.push(base);
}

/// A leaf object together with the type of the container it came from
#[derive(Debug, Clone)]
pub struct FlatObject<'a> {
    pub base: &'a Base,
    pub parent_type: Option<String>,
}

/// Flatten to leaf objects, remembering each leaf's parent type.
///
/// Containers with non-empty `elements` are expanded and not emitted
/// themselves. Legacy exports that group objects into `@`-prefixed category
/// members (recognised by an `@Lines` member) are expanded the same way.
pub fn flatten_base_thorough(base: &Base) -> Vec<FlatObject<'_>> {
    let mut out = Vec::new();
    collect_thorough(base, None, &mut out);
    out
}

fn collect_thorough<'a>(base: &'a Base, parent_type: Option<&str>, out: &mut Vec<FlatObject<'a>>) {
    let elements = base.elements();
    if !elements.is_empty() {
        for element in elements {
            collect_thorough(element, Some(base.speckle_type()), out);
        }
    } else if base.has_member("@Lines") {
        for (name, member) in base.members() {
            if !name.starts_with('@') {
                continue;
            }
            for category_object in member.bases() {
                collect_thorough(category_object, Some(base.speckle_type()), out);
            }
        }
    } else {
        out.push(FlatObject {
            base,
            parent_type: parent_type.map(str::to_string),
        });
    }
}

/// A 4x4 row-major transformation matrix carried by instances
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    pub matrix: [f64; 16],
    pub units: Option<String>,
}

impl Transform {
    pub fn identity() -> Self {
        let mut matrix = [0.0; 16];
        for i in 0..4 {
            matrix[i * 5] = 1.0;
        }
        Self {
            matrix,
            units: None,
        }
    }

    /// Read a transform from an instance's `transform` member.
    ///
    /// Accepts a transform object with a `matrix` (or legacy `value`) list, or
    /// a bare list of sixteen numbers.
    pub fn from_member(member: &Member) -> Option<Self> {
        match member {
            Member::Base(base) => {
                let numbers = base
                    .get("matrix")
                    .or_else(|| base.get("value"))
                    .and_then(numbers_of)?;
                Some(Self {
                    matrix: numbers,
                    units: base.get_str("units").map(str::to_string),
                })
            }
            other => numbers_of(other).map(|matrix| Self {
                matrix,
                units: None,
            }),
        }
    }

    /// Apply the transform to a point
    pub fn apply(&self, point: [f64; 3]) -> [f64; 3] {
        let m = &self.matrix;
        let [x, y, z] = point;
        let w = m[12] * x + m[13] * y + m[14] * z + m[15];
        let w = if w == 0.0 { 1.0 } else { w };
        [
            (m[0] * x + m[1] * y + m[2] * z + m[3]) / w,
            (m[4] * x + m[5] * y + m[6] * z + m[7]) / w,
            (m[8] * x + m[9] * y + m[10] * z + m[11]) / w,
        ]
    }
}

fn numbers_of(member: &Member) -> Option<[f64; 16]> {
    let values: Vec<f64> = match member {
        Member::List(items) => items.iter().map(Member::as_f64).collect::<Option<_>>()?,
        Member::Value(Value::Array(items)) => {
            items.iter().map(Value::as_f64).collect::<Option<_>>()?
        }
        _ => return None,
    };
    values.try_into().ok()
}

/// An object reached by [`extract_base_and_transform`]
#[derive(Debug, Clone)]
pub struct TransformedObject<'a> {
    pub base: &'a Base,
    /// The object's own id, or the id inherited from the enclosing instance
    pub id: Option<String>,
    /// Transforms from the outermost instance inwards
    pub transforms: Vec<Transform>,
}

/// Walk the graph resolving instances into their definitions.
///
/// Instances are not emitted; their definition is, carrying the instance id
/// and every transform applied above it.
pub fn extract_base_and_transform(base: &Base) -> Vec<TransformedObject<'_>> {
    let mut out = Vec::new();
    collect_transformed(base, None, Vec::new(), &mut out);
    out
}

fn collect_transformed<'a>(
    base: &'a Base,
    inherited_id: Option<&str>,
    mut transforms: Vec<Transform>,
    out: &mut Vec<TransformedObject<'a>>,
) {
    let current_id = base.id().or(inherited_id).map(str::to_string);

    if base.is_type("Instance") {
        if let Some(transform) = base.get_non_null("transform").and_then(Transform::from_member) {
            transforms.push(transform);
        }
        if let Some(definition) = base.get_base("definition") {
            collect_transformed(definition, current_id.as_deref(), transforms, out);
        }
        return;
    }

    out.push(TransformedObject {
        base,
        id: current_id.clone(),
        transforms: transforms.clone(),
    });

    for element in base.elements() {
        collect_transformed(element, current_id.as_deref(), transforms.clone(), out);
    }

    // Legacy category containers: `@Walls` etc. holding an object with elements
    for (name, member) in base.members() {
        if !name.starts_with('@') || name == "@elements" {
            continue;
        }
        if let Some(container) = member.as_base() {
            if container.has_member("elements") {
                collect_transformed(container, current_id.as_deref(), transforms.clone(), out);
            }
        }
    }
}
