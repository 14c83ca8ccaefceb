//! Static component descriptions and input resolution.

use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};

use super::data::{json_type_name, Data};

/// Kind of an input field, as rendered by the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputKind {
    /// A `Data` payload wired from another component
    Data,
    /// A fixed list of choices
    Dropdown { options: Vec<&'static str> },
    /// A checkbox
    Bool,
    /// Free text
    Text,
    /// An integer
    Int,
}

/// A named, typed configuration field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputField {
    pub name: &'static str,
    pub display_name: &'static str,
    pub info: &'static str,
    #[serde(flatten)]
    pub kind: InputKind,
    /// Value used when the host does not supply one
    pub value: Value,
    pub advanced: bool,
    pub is_list: bool,
}

impl InputField {
    fn new(name: &'static str, display_name: &'static str, kind: InputKind, value: Value) -> Self {
        Self {
            name,
            display_name,
            info: "",
            kind,
            value,
            advanced: false,
            is_list: false,
        }
    }

    pub fn data(name: &'static str, display_name: &'static str) -> Self {
        Self::new(name, display_name, InputKind::Data, Value::Null)
    }

    pub fn dropdown(
        name: &'static str,
        display_name: &'static str,
        options: &[&'static str],
        default: &'static str,
    ) -> Self {
        Self::new(
            name,
            display_name,
            InputKind::Dropdown {
                options: options.to_vec(),
            },
            Value::from(default),
        )
    }

    pub fn boolean(name: &'static str, display_name: &'static str, default: bool) -> Self {
        Self::new(name, display_name, InputKind::Bool, Value::from(default))
    }

    pub fn text(name: &'static str, display_name: &'static str, default: &'static str) -> Self {
        Self::new(name, display_name, InputKind::Text, Value::from(default))
    }

    pub fn optional_text(name: &'static str, display_name: &'static str) -> Self {
        Self::new(name, display_name, InputKind::Text, Value::Null)
    }

    pub fn integer(name: &'static str, display_name: &'static str, default: u64) -> Self {
        Self::new(name, display_name, InputKind::Int, Value::from(default))
    }

    pub fn with_info(mut self, info: &'static str) -> Self {
        self.info = info;
        self
    }

    pub fn advanced(mut self) -> Self {
        self.advanced = true;
        self
    }

    pub fn list(mut self) -> Self {
        self.is_list = true;
        self
    }
}

/// A named output slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputPort {
    pub name: &'static str,
    pub display_name: &'static str,
}

impl OutputPort {
    pub fn new(name: &'static str, display_name: &'static str) -> Self {
        Self { name, display_name }
    }
}

/// Everything the host needs to render and wire a component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentSpec {
    pub name: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub inputs: Vec<InputField>,
    pub outputs: Vec<OutputPort>,
}

impl ComponentSpec {
    pub fn input(&self, name: &str) -> Option<&InputField> {
        self.inputs.iter().find(|field| field.name == name)
    }

    pub fn output(&self, name: &str) -> Option<&OutputPort> {
        self.outputs.iter().find(|port| port.name == name)
    }

    pub fn input_names(&self) -> Vec<&'static str> {
        self.inputs.iter().map(|field| field.name).collect()
    }

    pub fn output_names(&self) -> Vec<&'static str> {
        self.outputs.iter().map(|port| port.name).collect()
    }

    /// Fail unless `port` is one of this component's outputs.
    pub fn require_output(&self, port: &str) -> Result<()> {
        if self.output(port).is_some() {
            Ok(())
        } else {
            Err(Error::InvalidArgument(format!(
                "{} has no output port '{}' (available: {})",
                self.name,
                port,
                self.output_names().join(", ")
            )))
        }
    }
}

/// Host inputs resolved against field defaults.
pub struct Inputs<'a> {
    spec: &'a ComponentSpec,
    data: &'a Data,
}

impl<'a> Inputs<'a> {
    pub fn new(spec: &'a ComponentSpec, data: &'a Data) -> Self {
        Self { spec, data }
    }

    /// Supplied value, else the field default; `null` when neither exists.
    pub fn value(&self, name: &str) -> &'a Value {
        const NULL: &Value = &Value::Null;
        match self.data.get(name) {
            Some(value) if !value.is_null() => value,
            _ => self.spec.input(name).map_or(NULL, |field| &field.value),
        }
    }

    /// Raw supplied value without defaults.
    pub fn supplied(&self, name: &str) -> Option<&'a Value> {
        self.data.get(name).filter(|value| !value.is_null())
    }

    pub fn string(&self, name: &str) -> Result<String> {
        match self.value(name) {
            Value::String(s) => Ok(s.clone()),
            other => Err(type_error(name, "a string", other)),
        }
    }

    /// Non-blank string, or `None` for null and blank values.
    pub fn optional_string(&self, name: &str) -> Result<Option<String>> {
        match self.value(name) {
            Value::Null => Ok(None),
            Value::String(s) if s.trim().is_empty() => Ok(None),
            Value::String(s) => Ok(Some(s.clone())),
            other => Err(type_error(name, "a string", other)),
        }
    }

    pub fn boolean(&self, name: &str) -> Result<bool> {
        match self.value(name) {
            Value::Bool(b) => Ok(*b),
            other => Err(type_error(name, "a boolean", other)),
        }
    }

    pub fn integer(&self, name: &str) -> Result<u64> {
        match self.value(name) {
            Value::Number(n) => n.as_u64().ok_or_else(|| type_error(name, "a non-negative integer", self.value(name))),
            other => Err(type_error(name, "a non-negative integer", other)),
        }
    }

    /// A string or a list of strings, as hosts send multi-value text fields.
    pub fn string_list(&self, name: &str) -> Result<Vec<String>> {
        match self.value(name) {
            Value::Null => Ok(Vec::new()),
            Value::String(s) => Ok(vec![s.clone()]),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    other => Err(type_error(name, "a list of strings", other)),
                })
                .collect(),
            other => Err(type_error(name, "a string or list of strings", other)),
        }
    }
}

fn type_error(name: &str, expected: &str, got: &Value) -> Error {
    Error::InvalidArgument(format!(
        "input '{}' must be {}, got {}",
        name,
        expected,
        json_type_name(got)
    ))
}
