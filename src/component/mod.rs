//! Host plugin protocol: components, their ports and the discovery registry.
//!
//! A workflow host discovers components by name through a
//! [`ComponentRegistry`], renders their [`InputField`]s, calls
//! [`Component::build`] with the values the user wired in, and then reads
//! each [`OutputPort`] through [`Component::output`].
//!
//! # Example
//!
//! ```
//! use kreuzberg_flow::component::{ComponentRegistry, Data};
//! use serde_json::json;
//!
//! # fn main() -> kreuzberg_flow::Result<()> {
//! let registry = ComponentRegistry::with_defaults();
//! let mut hello = registry.create("KreuzbergHello").unwrap();
//! let result = hello.build(&Data::from_value(json!({"name": "Kreuzberg"}))?)?;
//! assert_eq!(result.get_str("message"), Some("Hello, Kreuzberg!"));
//! # Ok(())
//! # }
//! ```

mod batch;
mod data;
mod extract;
mod file_loader;
mod hello;
mod spec;

pub use batch::{
    extract_batch, extract_batch_items, BatchExtractComponent, BatchItemError, BatchOptions,
    BatchResult,
};
pub use data::Data;
pub use extract::{ExtractComponent, ExtractResult};
pub use file_loader::{load_document, FileLoaderComponent, FileUpload, LoadRequest};
pub use hello::HelloComponent;
pub use spec::{ComponentSpec, InputField, InputKind, Inputs, OutputPort};

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::Result;

/// A node the workflow host can place on its canvas.
pub trait Component: Send {
    /// Static description of the component: names, inputs and outputs.
    fn spec(&self) -> &ComponentSpec;

    /// Run the component with host-supplied inputs.
    ///
    /// Inputs missing from `inputs` take the field defaults.
    fn build(&mut self, inputs: &Data) -> Result<Data>;

    /// Read one output port of the last build.
    fn output(&self, port: &str) -> Result<Data>;

    /// Registry name of the component.
    fn name(&self) -> &str {
        self.spec().name
    }
}

/// Creates fresh component instances.
pub type ComponentFactory = Arc<dyn Fn() -> Box<dyn Component> + Send + Sync>;

/// Registry mapping component names to factories.
#[derive(Clone, Default)]
pub struct ComponentRegistry {
    factories: BTreeMap<String, ComponentFactory>,
}

impl ComponentRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Create a registry with every bundled component.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(hello::NAME, || Box::new(HelloComponent::new()));
        registry.register(file_loader::NAME, || Box::new(FileLoaderComponent::new()));
        registry.register(extract::NAME, || Box::new(ExtractComponent::new()));
        registry.register(batch::NAME, || Box::new(BatchExtractComponent::new()));
        registry
    }

    /// Register a factory under `name`, replacing any previous one.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn Component> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    /// Instantiate a component by exact name.
    pub fn create(&self, name: &str) -> Option<Box<dyn Component>> {
        self.factories.get(name).map(|factory| factory())
    }

    /// Check if a component is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Specs of every registered component, in name order.
    pub fn specs(&self) -> Vec<ComponentSpec> {
        self.factories
            .values()
            .map(|factory| factory().spec().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("components", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_with_defaults() {
        let registry = ComponentRegistry::with_defaults();
        assert_eq!(
            registry.names(),
            vec![
                "KreuzbergBatchExtract",
                "KreuzbergExtract",
                "KreuzbergFileLoader",
                "KreuzbergHello",
            ]
        );
    }

    #[test]
    fn test_registry_creates_named_components() {
        let registry = ComponentRegistry::with_defaults();
        for name in registry.names() {
            let component = registry.create(name).unwrap();
            assert_eq!(component.name(), name);
        }
        assert!(registry.create("kreuzberghello").is_none());
    }

    #[test]
    fn test_registry_register_custom() {
        let mut registry = ComponentRegistry::new();
        assert!(registry.is_empty());

        registry.register("Greeter", || Box::new(HelloComponent::new()));

        assert!(registry.contains("Greeter"));
        assert_eq!(registry.len(), 1);
    }
}
