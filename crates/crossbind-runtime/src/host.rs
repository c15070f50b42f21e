//! Loading-host abstraction.
//!
//! The host environment is whatever can turn a component identity into
//! loadable classes: an in-process registry for embedders and tests, or
//! a shared-library search path in deployment (see [`crate::loader`]).

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::collections::HashSet;
use std::sync::Arc;

use crossbind_sdk::{ClassSpec, ComponentTable};

/// Flags passed when creating a loading context.
#[derive(Debug, Clone, Copy)]
pub struct LoadFlags {
    /// Request the component's executable code, not just its metadata.
    pub include_code: bool,
    /// Skip host-level signature/origin checks.
    pub ignore_security: bool,
}

impl LoadFlags {
    /// The flags the resolver binds with: code included, host security
    /// checks skipped (the version gate is the compatibility check).
    pub fn code() -> Self {
        LoadFlags {
            include_code: true,
            ignore_security: true,
        }
    }
}

impl Default for LoadFlags {
    fn default() -> Self {
        LoadFlags {
            include_code: false,
            ignore_security: false,
        }
    }
}

/// Why a loading context could not be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// No component under that identity.
    NotFound,
    /// Host policy refused the load.
    Denied(String),
}

/// A bound view of one component, able to serve class lookups.
pub trait LoadingContext: Send + Sync {
    /// Version string the component reports.
    fn reported_version(&self) -> String;

    /// Look up a class by identity name.
    fn load_class(&self, name: &str) -> Option<Arc<ClassSpec>>;
}

impl std::fmt::Debug for dyn LoadingContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadingContext")
            .field("reported_version", &self.reported_version())
            .finish()
    }
}

/// Host environment that locates components by identity.
pub trait LoadingHost: Send + Sync {
    /// Create a loading context for the component, or say why not.
    fn create_loading_context(
        &self,
        identity: &str,
        flags: LoadFlags,
    ) -> Result<Arc<dyn LoadingContext>, HostError>;
}

/// In-process host: components registered programmatically.
///
/// This is the host the embedding shell uses when engine and client ship
/// in one process, and the host every runtime test binds against.
#[derive(Default)]
pub struct RegistryHost {
    tables: Mutex<FxHashMap<String, Arc<ComponentTable>>>,
    denied: Mutex<HashSet<String>>,
}

impl RegistryHost {
    /// Empty host.
    pub fn new() -> Self {
        RegistryHost::default()
    }

    /// Register a component table under its identity.
    pub fn register(&self, table: ComponentTable) {
        self.tables
            .lock()
            .insert(table.identity().to_string(), Arc::new(table));
    }

    /// Mark an identity as policy-denied, regardless of registration.
    pub fn deny(&self, identity: &str) {
        self.denied.lock().insert(identity.to_string());
    }
}

struct TableContext {
    table: Arc<ComponentTable>,
}

impl LoadingContext for TableContext {
    fn reported_version(&self) -> String {
        self.table.version().to_string()
    }

    fn load_class(&self, name: &str) -> Option<Arc<ClassSpec>> {
        self.table.get_class(name)
    }
}

impl LoadingHost for RegistryHost {
    fn create_loading_context(
        &self,
        identity: &str,
        flags: LoadFlags,
    ) -> Result<Arc<dyn LoadingContext>, HostError> {
        if !flags.include_code {
            return Err(HostError::Denied(
                "loading context without code access cannot serve classes".to_string(),
            ));
        }
        if self.denied.lock().contains(identity) {
            return Err(HostError::Denied(format!(
                "policy forbids cross-component load of '{}'",
                identity
            )));
        }
        let table = self
            .tables
            .lock()
            .get(identity)
            .cloned()
            .ok_or(HostError::NotFound)?;
        Ok(Arc::new(TableContext { table }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> ComponentTable {
        let mut table = ComponentTable::new("web.runtime", "3.0");
        table.register_class(ClassSpec::new("RenderViewInternal"));
        table
    }

    #[test]
    fn test_registry_host_serves_classes() {
        let host = RegistryHost::new();
        host.register(sample_table());

        let ctx = host
            .create_loading_context("web.runtime", LoadFlags::code())
            .unwrap();
        assert_eq!(ctx.reported_version(), "3.0");
        assert!(ctx.load_class("RenderViewInternal").is_some());
        assert!(ctx.load_class("Missing").is_none());
    }

    #[test]
    fn test_unknown_identity_not_found() {
        let host = RegistryHost::new();
        let err = host
            .create_loading_context("web.runtime", LoadFlags::code())
            .unwrap_err();
        assert_eq!(err, HostError::NotFound);
    }

    #[test]
    fn test_denied_identity() {
        let host = RegistryHost::new();
        host.register(sample_table());
        host.deny("web.runtime");
        let err = host
            .create_loading_context("web.runtime", LoadFlags::code())
            .unwrap_err();
        assert!(matches!(err, HostError::Denied(_)));
    }

    #[test]
    fn test_code_access_required() {
        let host = RegistryHost::new();
        host.register(sample_table());
        let err = host
            .create_loading_context("web.runtime", LoadFlags::default())
            .unwrap_err();
        assert!(matches!(err, HostError::Denied(_)));
    }
}
