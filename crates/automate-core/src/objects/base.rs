//! Dynamic Speckle objects
//!
//! A [`Base`] is the unit of every version's object graph: an optional id, a
//! `speckle_type` and any number of named members. Members hold nested
//! objects, lists or plain JSON values. Detached members are stored with an
//! `@` prefix; [`Base::get`] accepts either spelling.

use crate::error::{AutomateError, AutomateResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Type assigned to objects that do not declare one
pub const DEFAULT_SPECKLE_TYPE: &str = "Base";

const ID_KEY: &str = "id";
const TYPE_KEY: &str = "speckle_type";
const APPLICATION_ID_KEY: &str = "applicationId";
/// Transport bookkeeping that never becomes a member
const HIDDEN_KEYS: [&str; 2] = ["__closure", "totalChildrenCount"];

/// A member value of a [`Base`]
#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    Base(Box<Base>),
    List(Vec<Member>),
    Value(Value),
}

impl Member {
    /// Build a member from JSON; objects carrying a `speckle_type` become [`Base`]s
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) if map.get(TYPE_KEY).is_some_and(Value::is_string) => {
                Self::Base(Box::new(Base::from_map(map)))
            }
            Value::Array(items) => Self::List(items.into_iter().map(Self::from_value).collect()),
            other => Self::Value(other),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::Base(base) => base.to_value(),
            Self::List(items) => Value::Array(items.iter().map(Member::to_value).collect()),
            Self::Value(value) => value.clone(),
        }
    }

    pub fn as_base(&self) -> Option<&Base> {
        match self {
            Self::Base(base) => Some(base),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Member]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_value().and_then(Value::as_str)
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_value().and_then(Value::as_f64)
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_value().and_then(Value::as_bool)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Value(Value::Null))
    }

    /// Whether the member holds anything meaningful: not null, not an empty
    /// string, list or map, not `false` and not zero.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Base(_) => true,
            Self::List(items) => !items.is_empty(),
            Self::Value(Value::Null) => false,
            Self::Value(Value::Bool(b)) => *b,
            Self::Value(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
            Self::Value(Value::String(s)) => !s.is_empty(),
            Self::Value(Value::Array(a)) => !a.is_empty(),
            Self::Value(Value::Object(o)) => !o.is_empty(),
        }
    }

    /// Objects held directly or inside a list
    pub fn bases(&self) -> Vec<&Base> {
        match self {
            Self::Base(base) => vec![base.as_ref()],
            Self::List(items) => items.iter().filter_map(Member::as_base).collect(),
            Self::Value(_) => Vec::new(),
        }
    }

    /// Text form used when comparing member values against user input
    pub fn display_string(&self) -> String {
        match self {
            Self::Value(Value::String(s)) => s.clone(),
            Self::Value(Value::Null) => String::new(),
            other => other.to_value().to_string(),
        }
    }
}

impl From<Value> for Member {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

impl From<Base> for Member {
    fn from(base: Base) -> Self {
        Self::Base(Box::new(base))
    }
}

impl From<Vec<Base>> for Member {
    fn from(bases: Vec<Base>) -> Self {
        Self::List(bases.into_iter().map(Member::from).collect())
    }
}

/// A dynamic Speckle object
#[derive(Debug, Clone, PartialEq)]
pub struct Base {
    id: Option<String>,
    speckle_type: String,
    application_id: Option<String>,
    members: BTreeMap<String, Member>,
}

impl Default for Base {
    fn default() -> Self {
        Self::new(DEFAULT_SPECKLE_TYPE)
    }
}

impl Base {
    pub fn new(speckle_type: impl Into<String>) -> Self {
        Self {
            id: None,
            speckle_type: speckle_type.into(),
            application_id: None,
            members: BTreeMap::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_member(mut self, name: impl Into<String>, member: impl Into<Member>) -> Self {
        self.set(name, member);
        self
    }

    /// Parse an object from JSON; the value must be a JSON object
    pub fn from_value(value: Value) -> AutomateResult<Self> {
        match value {
            Value::Object(map) => Ok(Self::from_map(map)),
            other => Err(AutomateError::json(format!(
                "expected a Speckle object, got {}",
                json_kind(&other)
            ))),
        }
    }

    fn from_map(map: Map<String, Value>) -> Self {
        let mut base = Self::new(DEFAULT_SPECKLE_TYPE);
        for (key, value) in map {
            match key.as_str() {
                ID_KEY => base.id = value.as_str().map(str::to_string),
                TYPE_KEY => {
                    if let Some(t) = value.as_str() {
                        base.speckle_type = t.to_string();
                    }
                }
                APPLICATION_ID_KEY => base.application_id = value.as_str().map(str::to_string),
                k if HIDDEN_KEYS.contains(&k) => {}
                _ => {
                    base.members.insert(key, Member::from_value(value));
                }
            }
        }
        base
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        if let Some(id) = &self.id {
            map.insert(ID_KEY.to_string(), Value::String(id.clone()));
        }
        map.insert(
            TYPE_KEY.to_string(),
            Value::String(self.speckle_type.clone()),
        );
        if let Some(app_id) = &self.application_id {
            map.insert(APPLICATION_ID_KEY.to_string(), Value::String(app_id.clone()));
        }
        for (name, member) in &self.members {
            map.insert(name.clone(), member.to_value());
        }
        Value::Object(map)
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn speckle_type(&self) -> &str {
        &self.speckle_type
    }

    pub fn application_id(&self) -> Option<&str> {
        self.application_id.as_deref()
    }

    /// True when any segment of the `:`-separated type chain ends with `suffix`
    pub fn is_type(&self, suffix: &str) -> bool {
        self.speckle_type
            .split(':')
            .any(|segment| segment.ends_with(suffix))
    }

    /// Look up a member by name, falling back to its detached `@` form
    pub fn get(&self, name: &str) -> Option<&Member> {
        self.members.get(name).or_else(|| {
            if name.starts_with('@') {
                None
            } else {
                self.members.get(&format!("@{}", name))
            }
        })
    }

    /// Like [`Base::get`] but skips null members
    pub fn get_non_null(&self, name: &str) -> Option<&Member> {
        self.get(name).filter(|m| !m.is_null())
    }

    /// Attribute-style presence check, including the typed `id`,
    /// `speckle_type` and `applicationId` fields
    pub fn has_member(&self, name: &str) -> bool {
        match name {
            ID_KEY => self.id.is_some(),
            TYPE_KEY => true,
            APPLICATION_ID_KEY => self.application_id.is_some(),
            _ => self.get(name).is_some(),
        }
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Member::as_str)
    }

    pub fn get_base(&self, name: &str) -> Option<&Base> {
        self.get(name).and_then(Member::as_base)
    }

    /// Names of all dynamic members, in stable order
    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }

    pub fn members(&self) -> impl Iterator<Item = (&str, &Member)> {
        self.members.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn set(&mut self, name: impl Into<String>, member: impl Into<Member>) {
        self.members.insert(name.into(), member.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<Member> {
        self.members.remove(name)
    }

    /// Child objects under `elements` / `@elements`
    pub fn elements(&self) -> Vec<&Base> {
        self.get("elements").map(Member::bases).unwrap_or_default()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl Serialize for Base {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Base {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Base::from_value(value).map_err(serde::de::Error::custom)
    }
}
