//! `crossbind list` — show the classes a descriptor directory
//! declares, with kind and policy.

use std::path::PathBuf;

use crossbind_descriptor::{Catalog, ClassKind, ConstructionPolicy};

use crate::output::StyledOutput;

fn policy_label(policy: ConstructionPolicy) -> &'static str {
    match policy {
        ConstructionPolicy::ConstructorVisible => "constructor-visible",
        ConstructionPolicy::InternalOnly => "internal-only",
        ConstructionPolicy::ExternalOnly => "external-only",
    }
}

pub fn execute(descriptors: PathBuf, out: &mut StyledOutput) -> anyhow::Result<()> {
    let catalog = Catalog::load_dir(&descriptors)?;
    for descriptor in catalog.classes() {
        out.info(descriptor.name());
        if descriptor.class.kind == ClassKind::Interface {
            out.dim("  interface");
        } else {
            out.dim(&format!("  {}", policy_label(descriptor.policy())));
            out.dim(&format!(
                "  {} ctor(s), {} method(s), {} field(s)",
                descriptor.constructors.len(),
                descriptor.methods.len(),
                descriptor.fields.len()
            ));
        }
        out.newline();
    }
    out.plain(&format!("{} class(es)\n", catalog.len()));
    out.flush();
    Ok(())
}
