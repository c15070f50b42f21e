//! `crossbind check` — load and validate a descriptor directory
//! without writing anything.

use std::path::PathBuf;

use crossbind_descriptor::Catalog;
use crossbind_gen::render_catalog;

use crate::output::StyledOutput;

pub fn execute(descriptors: PathBuf, out: &mut StyledOutput) -> anyhow::Result<()> {
    let catalog = Catalog::load_dir(&descriptors)?;
    // A dry render surfaces type errors validation alone cannot see.
    let units = render_catalog(&catalog)?;
    out.success("ok");
    out.plain(&format!(
        " {} class(es), {} unit(s) would be generated\n",
        catalog.len(),
        units.len()
    ));
    out.flush();
    Ok(())
}
