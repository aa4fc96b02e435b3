//! Attribute type registry: resolves a type name to a fresh description

use super::{
    AttributeDescription, BooleanAttributeDescription, ByteAttributeDescription,
    CharAttributeDescription, DoubleAttributeDescription, FloatAttributeDescription,
    IntegerAttributeDescription, LongAttributeDescription, ObjectAttributeDescription,
    ShortAttributeDescription, StringAttributeDescription,
};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

pub type AttributeFactory = Arc<dyn Fn() -> Box<dyn AttributeDescription> + Send + Sync>;

/// Maps attribute type names to description factories, in registration order.
#[derive(Clone)]
pub struct AttributeRegistry {
    factories: IndexMap<String, AttributeFactory>,
}

impl AttributeRegistry {
    /// A registry with no types registered.
    pub fn empty() -> Self {
        Self {
            factories: IndexMap::new(),
        }
    }

    /// A registry holding the built-in types: byte, short, integer, long,
    /// float, double, boolean, char, string and object.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register("byte", || Box::<ByteAttributeDescription>::default());
        registry.register("short", || Box::<ShortAttributeDescription>::default());
        registry.register("integer", || Box::<IntegerAttributeDescription>::default());
        registry.register("long", || Box::<LongAttributeDescription>::default());
        registry.register("float", || Box::<FloatAttributeDescription>::default());
        registry.register("double", || Box::<DoubleAttributeDescription>::default());
        registry.register("boolean", || Box::<BooleanAttributeDescription>::default());
        registry.register("char", || Box::<CharAttributeDescription>::default());
        registry.register("string", || Box::<StringAttributeDescription>::default());
        registry.register("object", || Box::<ObjectAttributeDescription>::default());
        registry
    }

    /// Registers a factory, replacing any previous one with the same name.
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn() -> Box<dyn AttributeDescription> + Send + Sync + 'static,
    {
        self.factories.insert(name.to_string(), Arc::new(factory));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn create(&self, name: &str) -> Option<Box<dyn AttributeDescription>> {
        self.factories.get(name).map(|factory| factory())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl Default for AttributeRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for AttributeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.factories.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::native::NativeAttributeType;

    #[test]
    fn test_builtins() {
        let registry = AttributeRegistry::default();
        assert_eq!(registry.len(), 10);
        assert_eq!(registry.names().next(), Some("byte"));
        for name in registry.names() {
            let desc = registry.create(name).unwrap();
            assert_eq!(desc.name(), name);
        }
        assert!(registry.create("colour").is_none());
    }

    #[test]
    fn test_register_custom_type() {
        let mut registry = AttributeRegistry::empty();
        assert!(registry.is_empty());
        registry.register("label", || Box::<StringAttributeDescription>::default());
        assert!(registry.contains("label"));
        let desc = registry.create("label").unwrap();
        assert_eq!(desc.native_type(), NativeAttributeType::Object);
    }
}
