//! Inno Setup helpers.

use crate::exporter::error::{ErrorExt, Result};
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// Write file with UTF-8 BOM so the compiler reads non-ASCII names correctly.
pub async fn write_utf8_bom(path: &Path, content: &str) -> Result<()> {
    let mut file = tokio::fs::File::create(path)
        .await
        .fs_context("creating Inno Setup script", path)?;

    file.write_all(&[0xEF, 0xBB, 0xBF])
        .await
        .fs_context("writing UTF-8 BOM", path)?;
    file.write_all(content.as_bytes())
        .await
        .fs_context("writing Inno Setup script", path)?;
    file.flush()
        .await
        .fs_context("flushing Inno Setup script", path)?;

    Ok(())
}
