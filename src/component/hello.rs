//! Smoke-test component that greets by name.

use serde_json::Value;

use crate::error::Result;
use crate::model::ComponentPayload;

use super::{Component, ComponentSpec, Data, InputField, Inputs, OutputPort};

pub(crate) const NAME: &str = "KreuzbergHello";

/// Returns `Hello, <name>!`.
#[derive(Debug, Clone)]
pub struct HelloComponent {
    spec: ComponentSpec,
    last: Option<ComponentPayload>,
}

impl HelloComponent {
    pub fn new() -> Self {
        Self {
            spec: ComponentSpec {
                name: NAME,
                display_name: "Kreuzberg Hello",
                description: "Minimal component used to verify the bundle loads.",
                icon: "message-circle",
                inputs: vec![InputField::text("name", "Name", "world")
                    .with_info("Who to greet.")],
                outputs: vec![OutputPort::new("message", "Message")],
            },
            last: None,
        }
    }

    /// Build the greeting payload.
    pub fn greet(name: &str) -> ComponentPayload {
        ComponentPayload {
            message: format!("Hello, {}!", name),
        }
    }
}

impl Default for HelloComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for HelloComponent {
    fn spec(&self) -> &ComponentSpec {
        &self.spec
    }

    fn build(&mut self, inputs: &Data) -> Result<Data> {
        let inputs = Inputs::new(&self.spec, inputs);
        // Hosts sometimes wire numbers into text fields
        let name = match inputs.value("name") {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };

        let payload = Self::greet(&name);
        let data = Data::from_serialize(&payload)?;
        self.last = Some(payload);
        Ok(data)
    }

    fn output(&self, port: &str) -> Result<Data> {
        self.spec.require_output(port)?;
        let payload = self
            .last
            .clone()
            .unwrap_or_else(|| Self::greet("world"));
        Data::from_serialize(&payload)
    }
}
