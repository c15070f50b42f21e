//! Boundary value model.
//!
//! Values crossing the component boundary are a small dynamic type: the
//! primitives a stable surface can promise, plus an opaque shared handle
//! to an instance living on the component side.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Opaque shared handle to an object owned by the component.
///
/// Instances are reference-counted and identity-comparable; the runtime
/// never inspects the payload, only the component's own entry points do.
#[derive(Clone)]
pub struct Instance {
    class: Arc<str>,
    inner: Arc<dyn Any + Send + Sync>,
}

impl Instance {
    /// Wrap a component-side object under the given class identity.
    pub fn new(class: impl Into<String>, inner: impl Any + Send + Sync) -> Self {
        Instance {
            class: class.into().into(),
            inner: Arc::new(inner),
        }
    }

    /// Class identity this instance was created under.
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Downcast the payload back to its concrete type.
    ///
    /// Only the component that created the instance knows the concrete
    /// type; the runtime treats the payload as opaque.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Identity comparison: true iff both handles point at the same
    /// underlying allocation.
    pub fn same_as(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Identity key, stable for as long as any handle to this instance
    /// is alive. Two handles have equal keys iff [`Instance::same_as`]
    /// holds between them.
    pub fn key(&self) -> usize {
        Arc::as_ptr(&self.inner) as *const () as usize
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Instance<{}>({:p})", self.class, Arc::as_ptr(&self.inner))
    }
}

/// Parameter type used for exact signature matching.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// Boolean
    Bool,
    /// 64-bit integer
    Int,
    /// 64-bit float
    Float,
    /// String
    Str,
    /// Instance of the named class identity
    Object(String),
    /// Homogeneous list of the inner type
    List(Box<ParamType>),
}

impl ParamType {
    /// Instance parameter under a class identity.
    pub fn object(class: impl Into<String>) -> Self {
        ParamType::Object(class.into())
    }

    /// List parameter over an element type.
    pub fn list(element: ParamType) -> Self {
        ParamType::List(Box::new(element))
    }

    /// Mangled name used in signature strings.
    pub fn mangle(&self) -> String {
        match self {
            ParamType::Bool => "bool".to_string(),
            ParamType::Int => "int".to_string(),
            ParamType::Float => "float".to_string(),
            ParamType::Str => "str".to_string(),
            ParamType::Object(class) => class.clone(),
            ParamType::List(element) => format!("list<{}>", element.mangle()),
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.mangle())
    }
}

/// Dynamic value crossing the component boundary.
#[derive(Debug, Clone)]
pub enum Value {
    /// Absent value; also the result of every void entry point.
    Null,
    /// Boolean
    Bool(bool),
    /// 64-bit integer
    Int(i64),
    /// 64-bit float
    Float(f64),
    /// String
    Str(Arc<str>),
    /// Opaque instance handle
    Instance(Instance),
    /// Homogeneous list
    List(Vec<Value>),
}

impl Value {
    /// Build a string value.
    pub fn str(s: impl Into<String>) -> Self {
        Value::Str(s.into().into())
    }

    /// True for `Value::Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get as bool if this is a bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as i64 if this is an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as f64 if this is a float.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Get as &str if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Get the instance handle if this is an instance.
    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Value::Instance(inst) => Some(inst),
            _ => None,
        }
    }

    /// Get the elements if this is a list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Human-readable type name, used in mismatch reports.
    pub fn type_name(&self) -> &str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Instance(inst) => inst.class(),
            Value::List(_) => "list",
        }
    }

    /// Whether this value is acceptable for a parameter of `ty`.
    ///
    /// Null is accepted for any object parameter, matching the semantics
    /// of a nullable reference at the boundary.
    pub fn matches(&self, ty: &ParamType) -> bool {
        match (self, ty) {
            (Value::Bool(_), ParamType::Bool) => true,
            (Value::Int(_), ParamType::Int) => true,
            (Value::Float(_), ParamType::Float) => true,
            (Value::Str(_), ParamType::Str) => true,
            (Value::Instance(inst), ParamType::Object(class)) => inst.class() == class,
            (Value::Null, ParamType::Object(_)) => true,
            (Value::List(items), ParamType::List(element)) => {
                items.iter().all(|item| item.matches(element))
            }
            _ => false,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::str(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::str(s)
    }
}

impl From<Instance> for Value {
    fn from(inst: Instance) -> Self {
        Value::Instance(inst)
    }
}
