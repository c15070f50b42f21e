//! Catalog-level generation driver.
//!
//! Renders every unit for a loaded catalog in memory first and only
//! then touches the output directory; the write itself stages into a
//! temporary directory and renames into place, so neither a failing
//! descriptor nor a failing write leaves a half-written tree behind.

use std::fs;
use std::path::{Path, PathBuf};

use crossbind_descriptor::Catalog;

use crate::adapter::AdapterGenerator;
use crate::builder::SourceBuilder;
use crate::error::GenError;
use crate::facade::FacadeGenerator;
use crate::rules::{adapter_module, facade_module, facade_stem};

/// One rendered source file, with its path relative to the output root.
#[derive(Debug)]
pub struct GeneratedUnit {
    pub path: PathBuf,
    pub source: String,
}

/// What a generation run produced.
#[derive(Debug, Clone, Copy)]
pub struct GenerateSummary {
    pub classes: usize,
    pub files: usize,
}

/// Render all units for a catalog: one facade per descriptor, one
/// adapter per concrete class, plus the two module indexes.
pub fn render_catalog(catalog: &Catalog) -> Result<Vec<GeneratedUnit>, GenError> {
    let adapters = AdapterGenerator::new(catalog);
    let facades = FacadeGenerator::new(catalog);
    let mut units = Vec::new();
    let mut facade_mods: Vec<(String, Vec<String>)> = Vec::new();
    let mut adapter_mods: Vec<(String, Vec<String>)> = Vec::new();
    let mut seen = std::collections::HashSet::new();

    for descriptor in catalog.classes() {
        let internal = descriptor.name();
        let stem = facade_stem(internal);
        if !seen.insert(stem.clone()) {
            return Err(GenError::MetadataMissing {
                class: internal.to_string(),
                detail: format!("facade name '{}' collides with another descriptor", stem),
            });
        }

        let facade_mod = facade_module(internal);
        units.push(GeneratedUnit {
            path: PathBuf::from("facade").join(format!("{}.rs", facade_mod)),
            source: facades.generate(descriptor)?,
        });
        if descriptor.is_interface() {
            facade_mods.push((facade_mod, vec![stem]));
        } else {
            facade_mods.push((facade_mod, vec![stem.clone(), format!("{}Overrides", stem)]));

            let adapter_mod = adapter_module(internal);
            units.push(GeneratedUnit {
                path: PathBuf::from("adapter").join(format!("{}.rs", adapter_mod)),
                source: adapters.generate(descriptor)?,
            });
            adapter_mods.push((adapter_mod, vec![format!("{}Adapter", stem)]));
        }
    }

    units.push(GeneratedUnit {
        path: PathBuf::from("facade").join("mod.rs"),
        source: render_mod_index(&facade_mods),
    });
    units.push(GeneratedUnit {
        path: PathBuf::from("adapter").join("mod.rs"),
        source: render_mod_index(&adapter_mods),
    });
    Ok(units)
}

fn render_mod_index(mods: &[(String, Vec<String>)]) -> String {
    let mut b = SourceBuilder::new();
    b.push_line("// Generated by crossbind-gen. Do not edit.");
    b.blank();
    for (name, _) in mods {
        b.push_line(&format!("pub mod {};", name));
    }
    b.blank();
    for (name, exports) in mods {
        b.push_line(&format!("pub use self::{}::{{{}}};", name, exports.join(", ")));
    }
    b.build()
}

/// Load the descriptor directory and write the generated tree under
/// `out_dir` (`adapter/` and `facade/` subtrees).
///
/// Units are written into a staging directory and renamed into place,
/// replacing any previous tree wholesale; an I/O failure mid-write
/// discards the staging directory instead of leaving partial output.
pub fn generate_dir(input: &Path, out_dir: &Path) -> Result<GenerateSummary, GenError> {
    let catalog = Catalog::load_dir(input)?;
    let units = render_catalog(&catalog)?;

    // Staging inside `out_dir` keeps the renames on one filesystem.
    fs::create_dir_all(out_dir)?;
    let staging = tempfile::tempdir_in(out_dir)?;
    for unit in &units {
        let path = staging.path().join(&unit.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, &unit.source)?;
    }

    for entry in fs::read_dir(staging.path())? {
        let entry = entry?;
        let target = out_dir.join(entry.file_name());
        if target.is_dir() {
            fs::remove_dir_all(&target)?;
        } else if target.exists() {
            fs::remove_file(&target)?;
        }
        fs::rename(entry.path(), &target)?;
    }

    Ok(GenerateSummary {
        classes: catalog.len(),
        files: units.len(),
    })
}
