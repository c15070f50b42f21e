//! End-to-end generation over a descriptor directory.

use std::fs;
use std::path::Path;

use crossbind_gen::generate_dir;
use tempfile::TempDir;

const RENDER_VIEW: &str = r#"
[class]
name = "RenderViewInternal"
policy = "constructor-visible"
extends = "ViewGroup"

[[constructor]]
params = [
    { name = "ctx", type = "Context" },
    { name = "attrs", type = "AttributeSet" },
]

[[field]]
name = "LOAD_MODE_DEFAULT"
type = "int"
value = "0"

[[method]]
name = "load_url"
params = [{ name = "url", type = "String" }]
pre = ["let trimmed = %1.trim().to_string();", "let url = trimmed;"]

[[method]]
name = "get_history"
returns = "NavigationHistoryInternal"

[[method]]
name = "engine_version"
returns = "String"
static = true
"#;

const NAVIGATION_HISTORY: &str = r#"
[class]
name = "NavigationHistoryInternal"
policy = "internal-only"
instance = "NavigationHistoryImpl"

[[method]]
name = "size"
returns = "int"

[[method]]
name = "max_entries"
returns = "int"
static = true
"#;

const EXTENSION: &str = r#"
[class]
name = "ExtensionInternal"
policy = "external-only"

[[constructor]]
params = [
    { name = "name", type = "String" },
    { name = "js_api", type = "String" },
]
"#;

const SETTINGS: &str = r#"
[class]
name = "SettingsInternal"

[[method]]
name = "set_user_agent"
params = [{ name = "agent", type = "String" }]
"#;

const RENDER_CLIENT: &str = r#"
[class]
name = "RenderClientInternal"
kind = "interface"

[[method]]
name = "on_page_started"
params = [
    { name = "view", type = "RenderViewInternal" },
    { name = "url", type = "String" },
]
"#;

fn write_descriptors(dir: &Path) {
    fs::write(dir.join("render_view.toml"), RENDER_VIEW).unwrap();
    fs::write(dir.join("navigation_history.toml"), NAVIGATION_HISTORY).unwrap();
    fs::write(dir.join("extension.toml"), EXTENSION).unwrap();
    fs::write(dir.join("settings.toml"), SETTINGS).unwrap();
    fs::write(dir.join("render_client.toml"), RENDER_CLIENT).unwrap();
}

fn generate_all() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("descriptors");
    let out = tmp.path().join("out");
    fs::create_dir(&input).unwrap();
    write_descriptors(&input);

    let summary = generate_dir(&input, &out).unwrap();
    assert_eq!(summary.classes, 5);
    // Four adapters, five facades, two module indexes.
    assert_eq!(summary.files, 11);
    tmp
}

fn read(tmp: &TempDir, rel: &str) -> String {
    fs::read_to_string(tmp.path().join("out").join(rel)).unwrap()
}

#[test]
fn test_visible_class_pair() {
    let tmp = generate_all();
    let adapter = read(&tmp, "adapter/render_view_adapter.rs");
    let facade = read(&tmp, "facade/render_view.rs");

    assert!(adapter.contains("pub struct RenderViewAdapter"));
    assert!(adapter.contains("pub const CLASS: &'static str = \"RenderViewInternal\";"));
    assert!(adapter.contains("resolver.resolve_constructor(&class, &[ParamType::object(\"Context\"), ParamType::object(\"AttributeSet\")])?"));

    // Primary entry consults the installed override before the default
    // path; the default entry forwards straight to the engine.
    assert!(adapter.contains("if let Some(overrides) = facade.overrides()"));
    assert!(adapter.contains("return overrides.load_url(&facade, url);"));
    assert!(adapter.contains("pub fn load_url_default(&self, url: String) -> Option<()>"));

    // Facade owns the adapter; the adapter points back weakly.
    assert!(adapter.contains("facade: Mutex<Weak<RenderView>>,"));
    assert!(facade.contains("pub struct RenderView"));
    assert!(facade.contains("adapter: Arc<RenderViewAdapter>,"));
    assert!(facade.contains("pub trait RenderViewOverrides: Send + Sync"));
    assert!(facade.contains("self.adapter.load_url_default(url)"));
    assert!(facade.contains("pub const LOAD_MODE_DEFAULT: i64 = 0;"));
    assert!(facade.contains("Conceptually extends `ViewGroup`"));
}

#[test]
fn test_catalog_return_type_wraps_into_facade() {
    let tmp = generate_all();
    let adapter = read(&tmp, "adapter/render_view_adapter.rs");
    assert!(adapter.contains("pub fn get_history_default(&self) -> Option<Arc<NavigationHistory>>"));
    assert!(adapter.contains("NavigationHistory::from_instance(resolver, component, inst.clone())"));
}

#[test]
fn test_static_is_single_direct_forward() {
    let tmp = generate_all();
    let adapter = read(&tmp, "adapter/render_view_adapter.rs");
    assert!(adapter.contains(
        "pub fn engine_version(resolver: &Arc<Resolver>, component: &ComponentHandle) -> Option<String>"
    ));
    // No default/primary split for statics.
    assert!(!adapter.contains("engine_version_default"));

    let facade = read(&tmp, "facade/render_view.rs");
    assert!(facade.contains("RenderViewAdapter::engine_version(resolver, component)"));
}

#[test]
fn test_placeholder_expansion_in_pre_lines() {
    let tmp = generate_all();
    let facade = read(&tmp, "facade/render_view.rs");
    assert!(facade.contains("let trimmed = url.trim().to_string();"));
    assert!(!facade.contains("%1"));
}

#[test]
fn test_internal_only_dual_path() {
    let tmp = generate_all();
    let adapter = read(&tmp, "adapter/navigation_history_adapter.rs");

    // Resolves against the concrete implementation type.
    assert!(adapter.contains("pub const CLASS: &'static str = \"NavigationHistoryImpl\";"));
    assert!(adapter.contains("pub fn from_internal(resolver: Arc<Resolver>, component: ComponentHandle, internal: Option<Instance>)"));
    assert!(adapter.contains("if let Some(internal) = &self.internal"));
    assert!(adapter
        .contains("self.resolver.report_message(\"NavigationHistoryInternal.size: no engine instance attached\");"));

    // No caller-visible constructor on either half.
    let facade = read(&tmp, "facade/navigation_history.rs");
    assert!(!adapter.contains("pub fn new("));
    assert!(!facade.contains("pub fn new("));
    assert!(facade.contains("NavigationHistoryAdapter::from_internal(resolver.clone(), component.clone(), Some(instance.clone()))"));
}

#[test]
fn test_internal_only_adapter_roots_the_pair() {
    let tmp = generate_all();
    let adapter = read(&tmp, "adapter/navigation_history_adapter.rs");
    let facade = read(&tmp, "facade/navigation_history.rs");

    // The adapter is constructed first and owns the facade strongly;
    // the facade carries only a non-owning back-reference.
    assert!(adapter.contains("facade: Mutex<Option<Arc<NavigationHistory>>>,"));
    assert!(adapter.contains(
        "pub fn from_internal(resolver: Arc<Resolver>, component: ComponentHandle, internal: Option<Instance>) -> Option<Arc<Self>>"
    ));
    assert!(adapter.contains("*adapter.facade.lock() = Some(NavigationHistory::attach(resolver, &adapter));"));
    assert!(adapter.contains("Some(adapter)"));

    assert!(facade.contains("adapter: Weak<NavigationHistoryAdapter>,"));
    assert!(facade.contains("adapter: Arc::downgrade(adapter),"));
    // Calls through a detached facade report instead of panicking.
    assert!(facade.contains("let adapter = match self.adapter.upgrade()"));
    assert!(facade.contains(
        "self.resolver.report_message(\"NavigationHistoryInternal.size: adapter detached\");"
    ));
}

#[test]
fn test_internal_only_static_forward() {
    let tmp = generate_all();
    let adapter = read(&tmp, "adapter/navigation_history_adapter.rs");
    let facade = read(&tmp, "facade/navigation_history.rs");

    // The overridable instance method keeps the primary/default split
    // while the static on the same class is a single direct forward.
    assert!(adapter.contains("pub fn size_default(&self) -> Option<i64>"));
    assert!(adapter.contains(
        "pub fn max_entries(resolver: &Arc<Resolver>, component: &ComponentHandle) -> Option<i64>"
    ));
    assert!(!adapter.contains("max_entries_default"));

    assert!(facade.contains("NavigationHistoryAdapter::max_entries(resolver, component)"));
}

#[test]
fn test_from_instance_consults_facade_registry() {
    let tmp = generate_all();

    // Rewrapping the same engine instance must surface the facade the
    // first crossing produced, or installed overrides vanish.
    let render_view = read(&tmp, "facade/render_view.rs");
    assert!(render_view.contains("if let Some(facade) = resolver.lookup_facade::<Self>(&instance)"));
    assert!(render_view.contains("resolver.cache_facade(&instance, &facade);"));

    let history = read(&tmp, "facade/navigation_history.rs");
    assert!(history.contains("if let Some(facade) = resolver.lookup_facade::<Self>(&instance)"));
    assert!(history.contains("resolver.cache_facade(&instance, &facade);"));
    // Internally rooted pairs additionally anchor the adapter.
    assert!(history.contains("resolver.anchor_adapter(&instance, adapter);"));
    assert!(!render_view.contains("anchor_adapter"));
}

#[test]
fn test_external_only_uses_registered_metadata() {
    let tmp = generate_all();
    let adapter = read(&tmp, "adapter/extension_adapter.rs");

    assert!(adapter.contains(
        "pub const CTOR_KEY_0: &'static str = \"ExtensionAdapterStringStringConstructor\";"
    ));
    assert!(adapter.contains(
        "resolver.register_constructor(Self::CTOR_KEY_0, \"ExtensionInternal\", &[ParamType::Str, ParamType::Str]);"
    ));
    assert!(adapter.contains("resolver.create_instance(&component, Self::CTOR_KEY_0,"));
    // Construction never touches resolve_constructor directly.
    assert!(!adapter.contains("resolve_constructor"));
}

#[test]
fn test_interface_renders_trait_only() {
    let tmp = generate_all();
    let facade = read(&tmp, "facade/render_client.rs");

    assert!(facade.contains("pub trait RenderClient: Send + Sync"));
    assert!(facade
        .contains("fn on_page_started(&self, view: Arc<RenderView>, url: String) -> Option<()>;"));
    assert!(!tmp
        .path()
        .join("out/adapter/render_client_adapter.rs")
        .exists());
}

#[test]
fn test_undeclared_constructor_is_synthesized() {
    let tmp = generate_all();
    let adapter = read(&tmp, "adapter/settings_adapter.rs");
    let facade = read(&tmp, "facade/settings.rs");

    assert!(adapter.contains(
        "pub fn new(resolver: Arc<Resolver>, component: ComponentHandle) -> Option<Arc<Self>>"
    ));
    assert!(adapter.contains("resolver.resolve_constructor(&class, &[])?"));
    assert!(facade.contains(
        "pub fn new(resolver: Arc<Resolver>, component: ComponentHandle) -> Option<Arc<Self>>"
    ));
}

#[test]
fn test_module_indexes() {
    let tmp = generate_all();
    let facade_mod = read(&tmp, "facade/mod.rs");
    let adapter_mod = read(&tmp, "adapter/mod.rs");

    assert!(facade_mod.contains("pub mod render_view;"));
    assert!(facade_mod.contains("pub use self::render_view::{RenderView, RenderViewOverrides};"));
    assert!(facade_mod.contains("pub use self::render_client::{RenderClient};"));
    assert!(adapter_mod.contains("pub use self::render_view_adapter::{RenderViewAdapter};"));
}

#[test]
fn test_failing_descriptor_writes_nothing() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("descriptors");
    let out = tmp.path().join("out");
    fs::create_dir(&input).unwrap();
    write_descriptors(&input);
    fs::write(
        input.join("broken.toml"),
        r#"
[class]
name = "BrokenInternal"

[[method]]
name = "bad"
params = [{ name = "x", type = "Vec<" }]
"#,
    )
    .unwrap();

    assert!(generate_dir(&input, &out).is_err());
    assert!(!out.exists());
}

#[test]
fn test_regenerate_replaces_previous_tree() {
    let tmp = generate_all();
    let out = tmp.path().join("out");

    // A leftover from an earlier run must not survive regeneration.
    fs::write(out.join("adapter").join("stale_adapter.rs"), "// stale").unwrap();

    let input = tmp.path().join("descriptors");
    generate_dir(&input, &out).unwrap();

    assert!(!out.join("adapter").join("stale_adapter.rs").exists());
    assert!(out.join("adapter").join("render_view_adapter.rs").exists());
    // No staging directory is left behind.
    let entries: Vec<_> = fs::read_dir(&out)
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(entries.len(), 2);
}
