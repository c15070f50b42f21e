//! Resolved binding handles.
//!
//! A handle is the sole crossing point into a separately deployed
//! component: a bound component, a resolved class, or a resolved
//! constructor/method. Handles are cheap clones over shared state;
//! member resolutions are memoized per class, keyed by name + parameter
//! signature, and published entries never mutate.

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::sync::Arc;

use crossbind_sdk::{ClassSpec, ConstructorSpec, MethodSpec, ParamType};

use crate::host::LoadingContext;

/// Signature string for the member cache: `name(param,param,...)`.
pub fn signature_of(name: &str, params: &[ParamType]) -> String {
    let mangled: Vec<String> = params.iter().map(|p| p.mangle()).collect();
    format!("{}({})", name, mangled.join(","))
}

/// Handle to a component that passed binding and the version gate.
#[derive(Clone)]
pub struct ComponentHandle {
    pub(crate) inner: Arc<BoundComponent>,
}

pub(crate) struct BoundComponent {
    pub(crate) identity: String,
    pub(crate) version: String,
    pub(crate) context: Arc<dyn LoadingContext>,
    pub(crate) classes: Mutex<FxHashMap<String, ClassHandle>>,
}

impl ComponentHandle {
    pub(crate) fn new(identity: &str, version: String, context: Arc<dyn LoadingContext>) -> Self {
        ComponentHandle {
            inner: Arc::new(BoundComponent {
                identity: identity.to_string(),
                version,
                context,
                classes: Mutex::new(FxHashMap::default()),
            }),
        }
    }

    /// Identity this component was bound under.
    pub fn identity(&self) -> &str {
        &self.inner.identity
    }

    /// Version the component reported at bind time.
    pub fn version(&self) -> &str {
        &self.inner.version
    }

    /// True iff both handles share one underlying binding.
    pub fn same_as(&self, other: &ComponentHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Handle to a class resolved inside a bound component.
#[derive(Clone)]
pub struct ClassHandle {
    pub(crate) inner: Arc<ClassBinding>,
}

pub(crate) struct ClassBinding {
    pub(crate) name: String,
    pub(crate) spec: Arc<ClassSpec>,
    pub(crate) members: Mutex<FxHashMap<String, MemberHandle>>,
}

impl ClassHandle {
    pub(crate) fn new(name: &str, spec: Arc<ClassSpec>) -> Self {
        ClassHandle {
            inner: Arc::new(ClassBinding {
                name: name.to_string(),
                spec,
                members: Mutex::new(FxHashMap::default()),
            }),
        }
    }

    /// Class identity name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// True iff both handles share one underlying binding.
    pub fn same_as(&self, other: &ClassHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Resolved constructor, invokable through the forwarder.
#[derive(Clone)]
pub struct ConstructorHandle {
    pub(crate) class: String,
    pub(crate) signature: String,
    pub(crate) spec: ConstructorSpec,
}

impl ConstructorHandle {
    /// Owning class identity.
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Mangled name + parameter signature.
    pub fn signature(&self) -> &str {
        &self.signature
    }
}

/// Resolved method, invokable through the forwarder.
#[derive(Clone)]
pub struct MethodHandle {
    pub(crate) class: String,
    pub(crate) signature: String,
    pub(crate) spec: MethodSpec,
}

impl MethodHandle {
    /// Owning class identity.
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Mangled name + parameter signature.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Static methods take no receiver.
    pub fn is_static(&self) -> bool {
        self.spec.is_static
    }
}

/// Cached member resolution.
#[derive(Clone)]
pub(crate) enum MemberHandle {
    Ctor(ConstructorHandle),
    Method(MethodHandle),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_mangling() {
        assert_eq!(signature_of("load_url", &[ParamType::Str]), "load_url(str)");
        assert_eq!(signature_of("pause_timers", &[]), "pause_timers()");
        assert_eq!(
            signature_of(
                "new",
                &[ParamType::object("Context"), ParamType::object("AttributeSet")]
            ),
            "new(Context,AttributeSet)"
        );
    }
}
