//! Dynamic resolver and call forwarder.
//!
//! Binds component identities to invokable implementations living in a
//! separately deployed binary, without caller build-time visibility. All
//! failures funnel once through the registered [`FailureHook`] and
//! surface as absent results; no panic crosses this boundary.
//!
//! Binding, class resolution, and version checks belong on one
//! designated control thread: the host loading facility is not
//! guaranteed reentrant-safe. Resolved handles may be invoked from other
//! threads when the underlying entry point is itself thread-safe.

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::any::Any;
use std::sync::{Arc, Weak};

use crossbind_sdk::{Instance, NativeError, ParamType, Value};

use crate::binding::{
    signature_of, ClassHandle, ComponentHandle, ConstructorHandle, MemberHandle, MethodHandle,
};
use crate::error::BindError;
use crate::hook::{FailureHook, SilentHook};
use crate::host::{HostError, LoadFlags, LoadingHost};
use crate::version::{self, Compatibility};

/// Constructor metadata registered ahead of resolution.
///
/// Generated adapters register these at startup under a mangled key;
/// the matching handle is resolved lazily on first use and cached.
struct ConstructorMeta {
    class: String,
    params: Vec<ParamType>,
}

/// Dynamic resolver: binds, resolves, forwards, reports.
pub struct Resolver {
    hook: Arc<dyn FailureHook>,
    /// Bound-component cache, keyed by identity. Append-only; published
    /// entries never mutate.
    components: Mutex<FxHashMap<String, ComponentHandle>>,
    /// Registered constructor metadata, keyed by mangled name.
    ctor_meta: Mutex<FxHashMap<String, ConstructorMeta>>,
    /// Lazily resolved constructors for registered metadata. Append-only.
    ctor_cache: Mutex<FxHashMap<String, ConstructorHandle>>,
    /// Facades paired with boundary instances, keyed by instance
    /// identity. Entries are non-owning; a crossing rewraps an engine
    /// instance into its existing facade instead of a fresh one.
    facades: Mutex<FxHashMap<usize, Weak<dyn Any + Send + Sync>>>,
    /// Engine-owned adapters rooted for the resolver's lifetime.
    anchors: Mutex<FxHashMap<usize, Arc<dyn Any + Send + Sync>>>,
}

impl Resolver {
    /// Resolver reporting through the given hook.
    pub fn new(hook: Arc<dyn FailureHook>) -> Self {
        Resolver {
            hook,
            components: Mutex::new(FxHashMap::default()),
            ctor_meta: Mutex::new(FxHashMap::default()),
            ctor_cache: Mutex::new(FxHashMap::default()),
            facades: Mutex::new(FxHashMap::default()),
            anchors: Mutex::new(FxHashMap::default()),
        }
    }

    /// Resolver that swallows failure reports.
    pub fn silent() -> Self {
        Resolver::new(Arc::new(SilentHook))
    }

    fn report(&self, error: BindError) {
        self.hook.on_failure(&error);
    }

    /// Report a plain message through the hook.
    pub fn report_message(&self, message: &str) {
        self.hook.on_message(message);
    }

    /// Bind a component identity, gating on the expected version.
    ///
    /// A successful bind is cached for the process lifetime; repeat
    /// calls return the cached handle without touching the host or the
    /// hook. Failed binds are not cached: the caller re-attempts
    /// explicitly (typically on the next lifecycle entry) and each
    /// attempt reports exactly once.
    pub fn bind(
        &self,
        host: &dyn LoadingHost,
        identity: &str,
        expected_version: &str,
    ) -> Option<ComponentHandle> {
        if let Some(handle) = self.components.lock().get(identity) {
            return Some(handle.clone());
        }

        let context = match host.create_loading_context(identity, LoadFlags::code()) {
            Ok(context) => context,
            Err(HostError::NotFound) => {
                self.report(BindError::ComponentNotFound {
                    identity: identity.to_string(),
                });
                return None;
            }
            Err(HostError::Denied(reason)) => {
                self.report(BindError::SecurityDenied {
                    identity: identity.to_string(),
                    reason,
                });
                return None;
            }
        };

        let discovered = context.reported_version();
        if version::check(&discovered, expected_version) == Compatibility::Incompatible {
            self.report(BindError::VersionIncompatible {
                discovered,
                expected: expected_version.to_string(),
            });
            return None;
        }

        let handle = ComponentHandle::new(identity, discovered, context);
        self.components
            .lock()
            .insert(identity.to_string(), handle.clone());
        Some(handle)
    }

    /// Resolve a class inside a bound component.
    ///
    /// Successes are memoized on the component; misses report
    /// `ClassNotFound` each time and leave the component usable for
    /// other classes.
    pub fn resolve_class(&self, component: &ComponentHandle, name: &str) -> Option<ClassHandle> {
        if let Some(handle) = component.inner.classes.lock().get(name) {
            return Some(handle.clone());
        }

        let spec = match component.inner.context.load_class(name) {
            Some(spec) => spec,
            None => {
                self.report(BindError::ClassNotFound {
                    class: name.to_string(),
                });
                return None;
            }
        };

        let handle = ClassHandle::new(name, spec);
        component
            .inner
            .classes
            .lock()
            .insert(name.to_string(), handle.clone());
        Some(handle)
    }

    /// Resolve a constructor by exact parameter signature.
    pub fn resolve_constructor(
        &self,
        class: &ClassHandle,
        params: &[ParamType],
    ) -> Option<ConstructorHandle> {
        let signature = signature_of("new", params);
        if let Some(MemberHandle::Ctor(handle)) = class.inner.members.lock().get(&signature) {
            return Some(handle.clone());
        }

        let spec = match class.inner.spec.find_constructor(params) {
            Some(spec) => spec.clone(),
            None => {
                self.report(BindError::MemberNotFound {
                    class: class.name().to_string(),
                    signature,
                });
                return None;
            }
        };

        let handle = ConstructorHandle {
            class: class.name().to_string(),
            signature: signature.clone(),
            spec,
        };
        class
            .inner
            .members
            .lock()
            .insert(signature, MemberHandle::Ctor(handle.clone()));
        Some(handle)
    }

    /// Resolve a method by exact name + parameter signature.
    pub fn resolve_method(
        &self,
        class: &ClassHandle,
        name: &str,
        params: &[ParamType],
    ) -> Option<MethodHandle> {
        let signature = signature_of(name, params);
        if let Some(MemberHandle::Method(handle)) = class.inner.members.lock().get(&signature) {
            return Some(handle.clone());
        }

        let spec = match class.inner.spec.find_method(name, params) {
            Some(spec) => spec.clone(),
            None => {
                self.report(BindError::MemberNotFound {
                    class: class.name().to_string(),
                    signature,
                });
                return None;
            }
        };

        let handle = MethodHandle {
            class: class.name().to_string(),
            signature: signature.clone(),
            spec,
        };
        class
            .inner
            .members
            .lock()
            .insert(signature, MemberHandle::Method(handle.clone()));
        Some(handle)
    }

    /// Instantiate through a resolved constructor.
    pub fn instantiate(&self, ctor: &ConstructorHandle, args: &[Value]) -> Option<Instance> {
        if let Err(error) = check_args(&ctor.signature, &ctor.spec.params, args) {
            self.report(error);
            return None;
        }
        match (ctor.spec.invoke)(args) {
            Ok(instance) => Some(instance),
            Err(error) => {
                self.report(map_native_error(&ctor.signature, error));
                None
            }
        }
    }

    /// Invoke through a resolved method.
    ///
    /// Instance methods require a receiver; static methods ignore one.
    /// Void methods yield [`Value::Null`].
    pub fn invoke(
        &self,
        method: &MethodHandle,
        instance: Option<&Instance>,
        args: &[Value],
    ) -> Option<Value> {
        if !method.spec.is_static && instance.is_none() {
            self.report(BindError::ArgumentMismatch {
                signature: method.signature.clone(),
                detail: "instance method invoked without a receiver".to_string(),
            });
            return None;
        }
        if let Err(error) = check_args(&method.signature, &method.spec.params, args) {
            self.report(error);
            return None;
        }
        let receiver = if method.spec.is_static { None } else { instance };
        match (method.spec.invoke)(receiver, args) {
            Ok(value) => Some(value),
            Err(error) => {
                self.report(map_native_error(&method.signature, error));
                None
            }
        }
    }

    /// Register constructor metadata under a mangled key.
    ///
    /// Resolution happens lazily on the first [`Resolver::create_instance`]
    /// for the key; the resolved handle is then cached for the process
    /// lifetime.
    pub fn register_constructor(&self, key: &str, class: &str, params: &[ParamType]) {
        self.ctor_meta.lock().insert(
            key.to_string(),
            ConstructorMeta {
                class: class.to_string(),
                params: params.to_vec(),
            },
        );
    }

    /// Instantiate by registered metadata key.
    pub fn create_instance(
        &self,
        component: &ComponentHandle,
        key: &str,
        args: &[Value],
    ) -> Option<Instance> {
        let cached = self.ctor_cache.lock().get(key).cloned();
        let ctor = match cached {
            Some(ctor) => ctor,
            None => {
                let (class_name, params) = {
                    let meta = self.ctor_meta.lock();
                    let meta = match meta.get(key) {
                        Some(meta) => meta,
                        None => {
                            self.report(BindError::MemberNotFound {
                                class: component.identity().to_string(),
                                signature: key.to_string(),
                            });
                            return None;
                        }
                    };
                    (meta.class.clone(), meta.params.clone())
                };
                let class = self.resolve_class(component, &class_name)?;
                let ctor = self.resolve_constructor(&class, &params)?;
                self.ctor_cache.lock().insert(key.to_string(), ctor.clone());
                ctor
            }
        };
        self.instantiate(&ctor, args)
    }

    /// Look up the live facade already paired with a boundary instance.
    ///
    /// Repeated crossings of one engine instance must surface one
    /// facade, otherwise state installed on the first wrap (overrides
    /// in particular) is invisible through the second.
    pub fn lookup_facade<T: Any + Send + Sync>(&self, instance: &Instance) -> Option<Arc<T>> {
        let facades = self.facades.lock();
        let facade = facades.get(&instance.key())?.upgrade()?;
        facade.downcast::<T>().ok()
    }

    /// Pair a facade with the boundary instance it wraps.
    ///
    /// The entry is non-owning: once every caller handle is gone the
    /// next crossing constructs a fresh facade under the same key.
    pub fn cache_facade<T: Any + Send + Sync>(&self, instance: &Instance, facade: &Arc<T>) {
        let facade: Arc<dyn Any + Send + Sync> = facade.clone();
        self.facades
            .lock()
            .insert(instance.key(), Arc::downgrade(&facade));
    }

    /// Root an engine-owned adapter for the resolver's lifetime.
    ///
    /// An internally constructed pair is rooted at the adapter; when the
    /// engine hands its instance across as a plain value, nothing on the
    /// caller side owns that root, so the resolver holds it against the
    /// instance it wraps.
    pub fn anchor_adapter(&self, instance: &Instance, adapter: Arc<dyn Any + Send + Sync>) {
        self.anchors.lock().insert(instance.key(), adapter);
    }
}

/// Exact arity + per-position type check ahead of any call.
fn check_args(signature: &str, params: &[ParamType], args: &[Value]) -> Result<(), BindError> {
    if params.len() != args.len() {
        return Err(BindError::ArgumentMismatch {
            signature: signature.to_string(),
            detail: format!("expected {} arguments, got {}", params.len(), args.len()),
        });
    }
    for (i, (param, arg)) in params.iter().zip(args.iter()).enumerate() {
        if !arg.matches(param) {
            return Err(BindError::ArgumentMismatch {
                signature: signature.to_string(),
                detail: format!(
                    "argument {} expects {}, got {}",
                    i,
                    param,
                    arg.type_name()
                ),
            });
        }
    }
    Ok(())
}

fn map_native_error(signature: &str, error: NativeError) -> BindError {
    match error {
        NativeError::AccessDenied(reason) => BindError::AccessDenied(reason),
        NativeError::TypeMismatch { .. } | NativeError::ArgumentError(_) => {
            BindError::ArgumentMismatch {
                signature: signature.to_string(),
                detail: error.to_string(),
            }
        }
        NativeError::CalleeFailed(reason) => BindError::InvocationFailed(reason),
    }
}
