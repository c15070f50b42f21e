//! Full bind/resolve/forward flow over an in-process component,
//! exercised through a hand-rolled adapter/facade pair shaped like the
//! generated ones.

use std::sync::{Arc, Mutex, Weak};

use crossbind_runtime::{
    BindError, ClassHandle, ClassSpec, ComponentHandle, ComponentTable, Instance, NativeError,
    ParamType, RecordingHook, RegistryHost, Resolver, Value,
};

struct TitleState {
    title: Mutex<String>,
}

fn engine_table(version: &str) -> ComponentTable {
    let mut view = ClassSpec::new("RenderViewInternal");
    view.register_constructor(&[], |_args| {
        Ok(Instance::new(
            "RenderViewInternal",
            TitleState {
                title: Mutex::new(String::from("about:blank")),
            },
        ))
    });
    view.register_method("get_title", &[], false, |inst, _args| {
        let state = inst
            .and_then(|i| i.downcast_ref::<TitleState>())
            .ok_or_else(|| NativeError::CalleeFailed("wrong receiver".into()))?;
        let title = state.title.lock().unwrap().clone();
        Ok(Value::str(&title))
    });
    view.register_method("set_title", &[ParamType::Str], false, |inst, args| {
        let state = inst
            .and_then(|i| i.downcast_ref::<TitleState>())
            .ok_or_else(|| NativeError::CalleeFailed("wrong receiver".into()))?;
        *state.title.lock().unwrap() = args[0].as_str().unwrap_or_default().to_string();
        Ok(Value::Null)
    });

    let mut table = ComponentTable::new("web.runtime", version);
    table.register_class(view);
    table
}

// Hand-written pair in the generated shape: the adapter's primary entry
// consults the facade's installed override, the default entry forwards
// straight to the engine, and the facade's public surface uses the
// default entry.

trait RenderViewOverrides: Send + Sync {
    fn get_title(&self, facade: &RenderView) -> Option<String> {
        facade.get_title()
    }
}

struct RenderViewAdapter {
    resolver: Arc<Resolver>,
    class: ClassHandle,
    instance: Instance,
    facade: Mutex<Weak<RenderView>>,
}

impl RenderViewAdapter {
    fn new(resolver: Arc<Resolver>, component: &ComponentHandle) -> Option<Arc<Self>> {
        let class = resolver.resolve_class(component, "RenderViewInternal")?;
        let ctor = resolver.resolve_constructor(&class, &[])?;
        let instance = resolver.instantiate(&ctor, &[])?;
        Some(Arc::new(RenderViewAdapter {
            resolver,
            class,
            instance,
            facade: Mutex::new(Weak::new()),
        }))
    }

    fn facade(&self) -> Option<Arc<RenderView>> {
        self.facade.lock().unwrap().upgrade()
    }

    /// Engine-facing entry.
    fn get_title(&self) -> Option<String> {
        if let Some(facade) = self.facade() {
            if let Some(overrides) = facade.overrides() {
                return overrides.get_title(&facade);
            }
        }
        self.get_title_default()
    }

    fn get_title_default(&self) -> Option<String> {
        let method = self.resolver.resolve_method(&self.class, "get_title", &[])?;
        let out = self.resolver.invoke(&method, Some(&self.instance), &[])?;
        out.as_str().map(|s| s.to_string())
    }

    fn set_title_default(&self, title: String) -> Option<()> {
        let method = self
            .resolver
            .resolve_method(&self.class, "set_title", &[ParamType::Str])?;
        self.resolver
            .invoke(&method, Some(&self.instance), &[Value::from(title)])?;
        Some(())
    }
}

struct RenderView {
    adapter: Arc<RenderViewAdapter>,
    overrides: Mutex<Option<Arc<dyn RenderViewOverrides>>>,
}

impl RenderView {
    fn open(resolver: Arc<Resolver>, component: &ComponentHandle) -> Option<Arc<Self>> {
        let adapter = RenderViewAdapter::new(resolver, component)?;
        let facade = Arc::new(RenderView {
            adapter,
            overrides: Mutex::new(None),
        });
        *facade.adapter.facade.lock().unwrap() = Arc::downgrade(&facade);
        Some(facade)
    }

    /// Wrap an engine-created instance, reusing the facade already
    /// paired with it.
    fn from_instance(
        resolver: &Arc<Resolver>,
        component: &ComponentHandle,
        instance: Instance,
    ) -> Option<Arc<Self>> {
        if let Some(facade) = resolver.lookup_facade::<Self>(&instance) {
            return Some(facade);
        }
        let class = resolver.resolve_class(component, "RenderViewInternal")?;
        let facade = Arc::new(RenderView {
            adapter: Arc::new(RenderViewAdapter {
                resolver: resolver.clone(),
                class,
                instance: instance.clone(),
                facade: Mutex::new(Weak::new()),
            }),
            overrides: Mutex::new(None),
        });
        *facade.adapter.facade.lock().unwrap() = Arc::downgrade(&facade);
        resolver.cache_facade(&instance, &facade);
        Some(facade)
    }

    fn install_overrides(&self, overrides: Arc<dyn RenderViewOverrides>) {
        *self.overrides.lock().unwrap() = Some(overrides);
    }

    fn overrides(&self) -> Option<Arc<dyn RenderViewOverrides>> {
        self.overrides.lock().unwrap().clone()
    }

    fn get_title(&self) -> Option<String> {
        self.adapter.get_title_default()
    }

    fn set_title(&self, title: String) -> Option<()> {
        self.adapter.set_title_default(title)
    }
}

#[test]
fn test_end_to_end_forwarding() {
    let hook = RecordingHook::new();
    let resolver = Arc::new(Resolver::new(hook.clone()));
    let host = RegistryHost::new();
    host.register(engine_table("3.0"));

    let component = resolver.bind(&host, "web.runtime", "3.0").unwrap();
    assert_eq!(component.version(), "3.0");

    let view = RenderView::open(resolver, &component).unwrap();
    assert_eq!(view.get_title().unwrap(), "about:blank");
    view.set_title("hello".to_string()).unwrap();
    assert_eq!(view.get_title().unwrap(), "hello");
    assert_eq!(hook.failure_count(), 0);
}

#[test]
fn test_override_intercepts_engine_initiated_calls() {
    struct Pinned;
    impl RenderViewOverrides for Pinned {
        fn get_title(&self, _facade: &RenderView) -> Option<String> {
            Some("pinned".to_string())
        }
    }

    let resolver = Arc::new(Resolver::silent());
    let host = RegistryHost::new();
    host.register(engine_table("3.0"));
    let component = resolver.bind(&host, "web.runtime", "3.0").unwrap();
    let view = RenderView::open(resolver, &component).unwrap();

    // Without an override the primary entry reaches the engine.
    assert_eq!(view.adapter.get_title().unwrap(), "about:blank");

    view.install_overrides(Arc::new(Pinned));
    assert_eq!(view.adapter.get_title().unwrap(), "pinned");
    // The facade's own surface still goes through the default path.
    assert_eq!(view.get_title().unwrap(), "about:blank");
}

#[test]
fn test_adapter_facade_back_reference() {
    let resolver = Arc::new(Resolver::silent());
    let host = RegistryHost::new();
    host.register(engine_table("3.0"));
    let component = resolver.bind(&host, "web.runtime", "3.0").unwrap();
    let view = RenderView::open(resolver, &component).unwrap();

    let upgraded = view.adapter.facade().unwrap();
    assert!(Arc::ptr_eq(&view, &upgraded));
}

#[test]
fn test_repeated_crossings_reuse_one_facade() {
    struct Pinned;
    impl RenderViewOverrides for Pinned {
        fn get_title(&self, _facade: &RenderView) -> Option<String> {
            Some("pinned".to_string())
        }
    }

    let resolver = Arc::new(Resolver::silent());
    let host = RegistryHost::new();
    host.register(engine_table("3.0"));
    let component = resolver.bind(&host, "web.runtime", "3.0").unwrap();

    let class = resolver
        .resolve_class(&component, "RenderViewInternal")
        .unwrap();
    let ctor = resolver.resolve_constructor(&class, &[]).unwrap();
    let instance = resolver.instantiate(&ctor, &[]).unwrap();

    let a = RenderView::from_instance(&resolver, &component, instance.clone()).unwrap();
    let b = RenderView::from_instance(&resolver, &component, instance.clone()).unwrap();
    assert!(Arc::ptr_eq(&a, &b));

    // An override installed through one handle is seen by the engine
    // entry reached through the other.
    a.install_overrides(Arc::new(Pinned));
    assert_eq!(b.adapter.get_title().unwrap(), "pinned");

    // Once every caller handle is gone the pair is rebuilt fresh.
    drop(a);
    drop(b);
    let c = RenderView::from_instance(&resolver, &component, instance).unwrap();
    assert!(c.overrides().is_none());
}

#[test]
fn test_missing_component_is_absent_feature() {
    let hook = RecordingHook::new();
    let resolver = Arc::new(Resolver::new(hook.clone()));
    let host = RegistryHost::new();

    let component = resolver.bind(&host, "web.runtime", "3.0");
    assert!(component.is_none());
    assert_eq!(hook.failure_count(), 1);
    assert!(matches!(
        hook.failures()[0],
        BindError::ComponentNotFound { .. }
    ));
}

#[test]
fn test_version_gate_across_bind() {
    let hook = RecordingHook::new();
    let resolver = Arc::new(Resolver::new(hook.clone()));
    let host = RegistryHost::new();
    host.register(engine_table("2.9"));
    assert!(resolver.bind(&host, "web.runtime", "3.0").is_none());
    assert!(matches!(
        hook.failures()[0],
        BindError::VersionIncompatible { .. }
    ));

    // A newer library is accepted, including one that is newer only by
    // carrying more version segments.
    let host = RegistryHost::new();
    host.register(engine_table("3.0.0.1"));
    assert!(resolver.bind(&host, "web.runtime", "3.0").is_some());
}
