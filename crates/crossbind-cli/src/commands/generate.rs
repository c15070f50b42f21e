//! `crossbind generate` — render adapter/facade pairs for a
//! descriptor directory.

use std::path::PathBuf;

use crate::output::StyledOutput;

pub fn execute(descriptors: PathBuf, out_dir: PathBuf, out: &mut StyledOutput) -> anyhow::Result<()> {
    let summary = crossbind_gen::generate_dir(&descriptors, &out_dir)?;
    out.success("generated");
    out.plain(&format!(
        " {} file(s) for {} class(es) into {}\n",
        summary.files,
        summary.classes,
        out_dir.display()
    ));
    out.flush();
    Ok(())
}
