//! Catalog: the full set of descriptors one generation run consumes.

use std::collections::HashMap;
use std::path::Path;

use crate::descriptor::{ClassDescriptor, DescriptorError};

/// Loaded, validated descriptor set.
///
/// Classes keep the order they were discovered in (file name order for a
/// directory load) so generation output is deterministic.
#[derive(Debug, Default)]
pub struct Catalog {
    classes: Vec<ClassDescriptor>,
    by_name: HashMap<String, usize>,
}

impl Catalog {
    /// Empty catalog.
    pub fn new() -> Self {
        Catalog::default()
    }

    /// Load every `.toml` descriptor in a directory, in file name order.
    pub fn load_dir(dir: &Path) -> Result<Self, DescriptorError> {
        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(|entry| entry.path())
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("toml"))
            .collect();
        paths.sort();

        let mut catalog = Catalog::new();
        for path in paths {
            catalog.insert(ClassDescriptor::from_file(&path)?)?;
        }
        Ok(catalog)
    }

    /// Add one descriptor; identity names must be unique.
    pub fn insert(&mut self, descriptor: ClassDescriptor) -> Result<(), DescriptorError> {
        let name = descriptor.name().to_string();
        if self.by_name.contains_key(&name) {
            return Err(DescriptorError::Duplicate(name));
        }
        self.by_name.insert(name, self.classes.len());
        self.classes.push(descriptor);
        Ok(())
    }

    /// Whether a raw type name refers to a catalog class.
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Look up a descriptor by identity name.
    pub fn get(&self, name: &str) -> Option<&ClassDescriptor> {
        self.by_name.get(name).map(|&i| &self.classes[i])
    }

    /// All descriptors, in discovery order.
    pub fn classes(&self) -> &[ClassDescriptor] {
        &self.classes
    }

    /// Number of descriptors.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// True when no descriptor was loaded.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(name: &str) -> ClassDescriptor {
        ClassDescriptor::from_str(&format!("[class]\nname = \"{}\"\n", name)).unwrap()
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut catalog = Catalog::new();
        catalog.insert(descriptor("RenderViewInternal")).unwrap();
        catalog.insert(descriptor("SettingsInternal")).unwrap();

        assert_eq!(catalog.len(), 2);
        assert!(catalog.contains("RenderViewInternal"));
        assert!(!catalog.contains("RenderView"));
        assert_eq!(
            catalog.get("SettingsInternal").unwrap().name(),
            "SettingsInternal"
        );
    }

    #[test]
    fn test_duplicate_identity_rejected() {
        let mut catalog = Catalog::new();
        catalog.insert(descriptor("RenderViewInternal")).unwrap();
        let err = catalog.insert(descriptor("RenderViewInternal")).unwrap_err();
        assert!(matches!(err, DescriptorError::Duplicate(_)));
    }

    #[test]
    fn test_load_dir_is_ordered_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("b_settings.toml"),
            "[class]\nname = \"SettingsInternal\"\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("a_render_view.toml"),
            "[class]\nname = \"RenderViewInternal\"\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let catalog = Catalog::load_dir(dir.path()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.classes()[0].name(), "RenderViewInternal");
        assert_eq!(catalog.classes()[1].name(), "SettingsInternal");
    }

    #[test]
    fn test_load_dir_propagates_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.toml"), "not = valid [").unwrap();
        assert!(Catalog::load_dir(dir.path()).is_err());
    }
}
