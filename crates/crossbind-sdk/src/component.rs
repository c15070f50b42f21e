//! Component table: the classes a binary component exposes by name.
//!
//! A component publishes one [`ComponentTable`] holding its identity, its
//! reported version string, and a [`ClassSpec`] per exposed class. The
//! runtime resolves constructors and methods against these tables by
//! exact name + signature; it never sees concrete types.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::NativeError;
use crate::value::{Instance, ParamType, Value};

/// Constructor entry point: arguments in, fresh instance out.
pub type ConstructorFn = Arc<dyn Fn(&[Value]) -> Result<Instance, NativeError> + Send + Sync>;

/// Method entry point: optional receiver (None for statics), arguments
/// in, value out. Void methods return [`Value::Null`].
pub type MethodFn =
    Arc<dyn Fn(Option<&Instance>, &[Value]) -> Result<Value, NativeError> + Send + Sync>;

/// One exposed constructor.
#[derive(Clone)]
pub struct ConstructorSpec {
    /// Ordered parameter types, matched exactly.
    pub params: Vec<ParamType>,
    /// Entry point.
    pub invoke: ConstructorFn,
}

/// One exposed method.
#[derive(Clone)]
pub struct MethodSpec {
    /// Method name.
    pub name: String,
    /// Ordered parameter types, matched exactly.
    pub params: Vec<ParamType>,
    /// Static methods receive no instance.
    pub is_static: bool,
    /// Entry point.
    pub invoke: MethodFn,
}

impl fmt::Debug for MethodSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodSpec")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("is_static", &self.is_static)
            .finish_non_exhaustive()
    }
}

/// One exposed class: constructors and methods under an identity name.
#[derive(Clone)]
pub struct ClassSpec {
    name: String,
    constructors: Vec<ConstructorSpec>,
    methods: Vec<MethodSpec>,
}

impl ClassSpec {
    /// Create an empty class spec under the given identity name.
    pub fn new(name: impl Into<String>) -> Self {
        ClassSpec {
            name: name.into(),
            constructors: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Identity name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a constructor.
    pub fn register_constructor<F>(&mut self, params: &[ParamType], invoke: F)
    where
        F: Fn(&[Value]) -> Result<Instance, NativeError> + Send + Sync + 'static,
    {
        self.constructors.push(ConstructorSpec {
            params: params.to_vec(),
            invoke: Arc::new(invoke),
        });
    }

    /// Register a method.
    pub fn register_method<F>(&mut self, name: impl Into<String>, params: &[ParamType], is_static: bool, invoke: F)
    where
        F: Fn(Option<&Instance>, &[Value]) -> Result<Value, NativeError> + Send + Sync + 'static,
    {
        self.methods.push(MethodSpec {
            name: name.into(),
            params: params.to_vec(),
            is_static,
            invoke: Arc::new(invoke),
        });
    }

    /// Find a constructor by exact parameter list.
    pub fn find_constructor(&self, params: &[ParamType]) -> Option<&ConstructorSpec> {
        self.constructors.iter().find(|c| c.params == params)
    }

    /// Find a method by exact name + parameter list.
    pub fn find_method(&self, name: &str, params: &[ParamType]) -> Option<&MethodSpec> {
        self.methods
            .iter()
            .find(|m| m.name == name && m.params == params)
    }

    /// All registered method names.
    pub fn method_names(&self) -> Vec<&str> {
        self.methods.iter().map(|m| m.name.as_str()).collect()
    }

    /// Number of registered constructors.
    pub fn constructor_count(&self) -> usize {
        self.constructors.len()
    }
}

impl fmt::Debug for ClassSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassSpec")
            .field("name", &self.name)
            .field("constructors", &self.constructors.len())
            .field("methods", &self.methods.len())
            .finish()
    }
}

/// Everything one binary component exposes.
///
/// # Thread Safety
///
/// ComponentTable is Send + Sync after registration (immutable use).
#[derive(Debug, Clone)]
pub struct ComponentTable {
    identity: String,
    version: String,
    classes: HashMap<String, Arc<ClassSpec>>,
}

impl ComponentTable {
    /// Create a new component table.
    ///
    /// # Arguments
    /// * `identity` - Component identity (e.g., "web.runtime")
    /// * `version` - Reported version string (e.g., "3.0")
    pub fn new(identity: impl Into<String>, version: impl Into<String>) -> Self {
        ComponentTable {
            identity: identity.into(),
            version: version.into(),
            classes: HashMap::new(),
        }
    }

    /// Register a class under its identity name.
    pub fn register_class(&mut self, class: ClassSpec) {
        self.classes.insert(class.name().to_string(), Arc::new(class));
    }

    /// Component identity.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Reported version string.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Look up a class by identity name.
    pub fn get_class(&self, name: &str) -> Option<Arc<ClassSpec>> {
        self.classes.get(name).cloned()
    }

    /// All registered class names.
    pub fn class_names(&self) -> Vec<&str> {
        self.classes.keys().map(|s| s.as_str()).collect()
    }

    /// Number of registered classes.
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_class() -> ClassSpec {
        let mut class = ClassSpec::new("RenderViewInternal");
        class.register_constructor(&[ParamType::Str], |args| {
            Ok(Instance::new(
                "RenderViewInternal",
                args[0].as_str().unwrap_or_default().to_string(),
            ))
        });
        class.register_method("title", &[], false, |inst, _args| {
            let title = inst
                .and_then(|i| i.downcast_ref::<String>())
                .cloned()
                .unwrap_or_default();
            Ok(Value::str(title))
        });
        class.register_method("engine_version", &[], true, |_inst, _args| {
            Ok(Value::str("3.0"))
        });
        class
    }

    #[test]
    fn test_find_constructor_exact_signature() {
        let class = sample_class();
        assert!(class.find_constructor(&[ParamType::Str]).is_some());
        assert!(class.find_constructor(&[]).is_none());
        assert!(class.find_constructor(&[ParamType::Int]).is_none());
    }

    #[test]
    fn test_find_method_name_and_arity() {
        let class = sample_class();
        assert!(class.find_method("title", &[]).is_some());
        assert!(class.find_method("title", &[ParamType::Str]).is_none());
        assert!(class.find_method("missing", &[]).is_none());
    }

    #[test]
    fn test_static_method_invokes_without_receiver() {
        let class = sample_class();
        let method = class.find_method("engine_version", &[]).unwrap();
        assert!(method.is_static);
        let out = (method.invoke)(None, &[]).unwrap();
        assert_eq!(out.as_str(), Some("3.0"));
    }

    #[test]
    fn test_table_lookup() {
        let mut table = ComponentTable::new("web.runtime", "3.0");
        table.register_class(sample_class());
        assert_eq!(table.identity(), "web.runtime");
        assert_eq!(table.version(), "3.0");
        assert_eq!(table.class_count(), 1);
        assert!(table.get_class("RenderViewInternal").is_some());
        assert!(table.get_class("Missing").is_none());
    }
}
