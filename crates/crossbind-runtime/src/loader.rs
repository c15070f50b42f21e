//! Shared-library component loading.
//!
//! Deployment host: each component ships as a shared library exporting
//! [`crossbind_sdk::COMPONENT_INIT_SYMBOL`], which hands back its
//! [`ComponentTable`]. Loading is `dlopen` on unix and `LoadLibraryW` on
//! windows. Not reentrant-safe across threads; bind from the designated
//! control thread only.

use std::ffi::CString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crossbind_sdk::{ClassSpec, ComponentTable, COMPONENT_INIT_SYMBOL};

use crate::host::{HostError, LoadFlags, LoadingContext, LoadingHost};

/// Errors that can occur while loading a component library.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Library file not found or could not be loaded
    #[error("Library not found: {path}")]
    NotFound {
        /// Path that was attempted
        path: String,
    },

    /// Symbol not found in library
    #[error("Symbol not found: {symbol} in {library}")]
    SymbolNotFound {
        /// Symbol name that was not found
        symbol: String,
        /// Library path
        library: String,
    },

    /// Component initialization failed
    #[error("Invalid component initialization: {0}")]
    InvalidInit(String),

    /// Platform-specific error
    #[error("Platform error: {0}")]
    Platform(String),
}

/// Loaded shared library holding one component.
///
/// The table is extracted eagerly at open; the library handle is kept
/// alive for as long as any class entry point may run.
pub struct ComponentLibrary {
    handle: LibraryHandle,
    path: String,
}

impl ComponentLibrary {
    /// Load a component library from the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path_ref = path.as_ref();
        let path_str = path_ref
            .to_str()
            .ok_or_else(|| LoadError::Platform(format!("non-UTF-8 path: {:?}", path_ref)))?;
        let handle = LibraryHandle::load(path_str)?;
        Ok(ComponentLibrary {
            handle,
            path: path_str.to_string(),
        })
    }

    /// Get a raw symbol by name.
    ///
    /// # Safety
    ///
    /// The caller must ensure the symbol exists with the type `T` and
    /// that the library outlives every use of it.
    pub unsafe fn get<T>(&self, symbol: &str) -> Result<T, LoadError> {
        self.handle.symbol(symbol, &self.path)
    }

    /// Extract the component table by calling the init symbol.
    pub fn component_table(&self) -> Result<Arc<ComponentTable>, LoadError> {
        unsafe {
            type InitFn = extern "C" fn() -> *mut ComponentTable;
            let init: InitFn = self.get(COMPONENT_INIT_SYMBOL)?;
            let table_ptr = init();
            if table_ptr.is_null() {
                return Err(LoadError::InvalidInit(format!(
                    "{} returned null",
                    COMPONENT_INIT_SYMBOL
                )));
            }
            let table = Box::from_raw(table_ptr);
            Ok(Arc::new(*table))
        }
    }

    /// Path this library was loaded from.
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// File name a component identity maps to, per platform.
///
/// `web.runtime` becomes `libweb_runtime.so` / `.dylib` / `web_runtime.dll`.
pub fn library_file_name(identity: &str) -> String {
    let stem = identity.replace('.', "_");
    #[cfg(target_os = "macos")]
    return format!("lib{}.dylib", stem);
    #[cfg(all(unix, not(target_os = "macos")))]
    return format!("lib{}.so", stem);
    #[cfg(windows)]
    return format!("{}.dll", stem);
}

/// Host that maps component identities to shared libraries under a
/// search directory.
pub struct LibraryHost {
    search_dir: PathBuf,
}

impl LibraryHost {
    /// Host searching one directory.
    pub fn new(search_dir: impl Into<PathBuf>) -> Self {
        LibraryHost {
            search_dir: search_dir.into(),
        }
    }
}

struct LibraryContext {
    // Dropping the library would unmap the entry points the table holds.
    _library: ComponentLibrary,
    table: Arc<ComponentTable>,
}

impl LoadingContext for LibraryContext {
    fn reported_version(&self) -> String {
        self.table.version().to_string()
    }

    fn load_class(&self, name: &str) -> Option<Arc<ClassSpec>> {
        self.table.get_class(name)
    }
}

impl LoadingHost for LibraryHost {
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
        let path = self.search_dir.join(library_file_name(identity));
        if !path.exists() {
            return Err(HostError::NotFound);
        }
        let library = ComponentLibrary::open(&path)
            .map_err(|e| HostError::Denied(e.to_string()))?;
        let table = library
            .component_table()
            .map_err(|e| HostError::Denied(e.to_string()))?;
        Ok(Arc::new(LibraryContext {
            _library: library,
            table,
        }))
    }
}

// Platform-specific implementations

#[cfg(unix)]
type LibraryHandle = UnixLibrary;

#[cfg(windows)]
type LibraryHandle = WindowsLibrary;

#[cfg(unix)]
struct UnixLibrary {
    handle: *mut std::ffi::c_void,
}

#[cfg(unix)]
impl UnixLibrary {
    fn load(path: &str) -> Result<Self, LoadError> {
        let c_path = CString::new(path)
            .map_err(|e| LoadError::Platform(format!("invalid path: {}", e)))?;

        // RTLD_NOW: resolve all symbols immediately.
        // RTLD_LOCAL: keep symbols out of later loads.
        let handle = unsafe { libc::dlopen(c_path.as_ptr(), libc::RTLD_NOW | libc::RTLD_LOCAL) };

        if handle.is_null() {
            let error = unsafe {
                let err_ptr = libc::dlerror();
                if err_ptr.is_null() {
                    "unknown error".to_string()
                } else {
                    std::ffi::CStr::from_ptr(err_ptr).to_string_lossy().into_owned()
                }
            };
            return Err(LoadError::NotFound {
                path: format!("{}: {}", path, error),
            });
        }

        Ok(UnixLibrary { handle })
    }

    unsafe fn symbol<T>(&self, name: &str, lib_path: &str) -> Result<T, LoadError> {
        let c_name = CString::new(name)
            .map_err(|e| LoadError::Platform(format!("invalid symbol name: {}", e)))?;

        // Clear any stale error state before the lookup.
        libc::dlerror();
        let symbol = libc::dlsym(self.handle, c_name.as_ptr());

        let err_ptr = libc::dlerror();
        if !err_ptr.is_null() || symbol.is_null() {
            return Err(LoadError::SymbolNotFound {
                symbol: name.to_string(),
                library: lib_path.to_string(),
            });
        }

        Ok(std::mem::transmute_copy(&symbol))
    }
}

#[cfg(unix)]
impl Drop for UnixLibrary {
    fn drop(&mut self) {
        unsafe {
            libc::dlclose(self.handle);
        }
    }
}

#[cfg(unix)]
unsafe impl Send for UnixLibrary {}
#[cfg(unix)]
unsafe impl Sync for UnixLibrary {}

#[cfg(windows)]
struct WindowsLibrary {
    handle: *mut std::ffi::c_void,
}

#[cfg(windows)]
impl WindowsLibrary {
    fn load(path: &str) -> Result<Self, LoadError> {
        use std::ffi::OsStr;
        use std::os::windows::ffi::OsStrExt;

        let wide: Vec<u16> = OsStr::new(path)
            .encode_wide()
            .chain(std::iter::once(0))
            .collect();

        let handle = unsafe { LoadLibraryW(wide.as_ptr()) };
        if handle.is_null() {
            let error = unsafe { GetLastError() };
            return Err(LoadError::NotFound {
                path: format!("{} (error code: {})", path, error),
            });
        }

        Ok(WindowsLibrary { handle })
    }

    unsafe fn symbol<T>(&self, name: &str, lib_path: &str) -> Result<T, LoadError> {
        let c_name = CString::new(name)
            .map_err(|e| LoadError::Platform(format!("invalid symbol name: {}", e)))?;

        let symbol = GetProcAddress(self.handle, c_name.as_ptr());
        if symbol.is_null() {
            let error = GetLastError();
            return Err(LoadError::SymbolNotFound {
                symbol: name.to_string(),
                library: format!("{} (error code: {})", lib_path, error),
            });
        }

        Ok(std::mem::transmute_copy(&symbol))
    }
}

#[cfg(windows)]
impl Drop for WindowsLibrary {
    fn drop(&mut self) {
        unsafe {
            FreeLibrary(self.handle);
        }
    }
}

#[cfg(windows)]
unsafe impl Send for WindowsLibrary {}
#[cfg(windows)]
unsafe impl Sync for WindowsLibrary {}

#[cfg(windows)]
extern "system" {
    fn LoadLibraryW(filename: *const u16) -> *mut std::ffi::c_void;
    fn GetProcAddress(
        module: *mut std::ffi::c_void,
        procname: *const i8,
    ) -> *mut std::ffi::c_void;
    fn FreeLibrary(module: *mut std::ffi::c_void) -> i32;
    fn GetLastError() -> u32;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_not_found() {
        let result = ComponentLibrary::open("/nonexistent/libweb_runtime.so");
        assert!(matches!(result, Err(LoadError::NotFound { .. })));
    }

    #[test]
    fn test_library_host_missing_identity() {
        let dir = tempfile::tempdir().unwrap();
        let host = LibraryHost::new(dir.path());
        let err = host
            .create_loading_context("web.runtime", LoadFlags::code())
            .unwrap_err();
        assert_eq!(err, HostError::NotFound);
    }

    #[test]
    fn test_library_file_name_mapping() {
        let name = library_file_name("web.runtime");
        assert!(name.contains("web_runtime"));
    }
}
