//! Unpacking the Node.js tarball.

use std::fs::{self, File};
use std::path::{Component, Path, PathBuf};

use anyhow::{bail, Context, Result};
use flate2::read::GzDecoder;

/// Extract a `.tar.gz`, dropping the single top-level directory.
///
/// `node-v20.18.0-linux-x64/bin/node` lands at `<dest>/bin/node`. Entries
/// that would escape `dest` are rejected. Returns the number of entries
/// written.
pub fn extract_stripped(archive: &Path, dest: &Path) -> Result<usize> {
    let file = File::open(archive)
        .with_context(|| format!("Failed to open {}", archive.display()))?;
    let mut tar = tar::Archive::new(GzDecoder::new(file));
    tar.set_preserve_permissions(true);

    fs::create_dir_all(dest).with_context(|| format!("Failed to create {}", dest.display()))?;

    let mut written = 0;
    for entry in tar
        .entries()
        .with_context(|| format!("Failed to read {} (invalid tar.gz?)", archive.display()))?
    {
        let mut entry = entry.context("Failed to read tar entry")?;
        let path = entry.path().context("Failed to get entry path")?.into_owned();

        let Some(relative) = strip_first_component(&path)? else {
            continue;
        };

        let target = dest.join(&relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        entry
            .unpack(&target)
            .with_context(|| format!("Failed to unpack {}", path.display()))?;
        written += 1;
    }

    if written == 0 {
        bail!("{} contained no files", archive.display());
    }
    Ok(written)
}

/// Drop the leading directory of an archive path.
///
/// Returns None for the top-level directory itself.
fn strip_first_component(path: &Path) -> Result<Option<PathBuf>> {
    let mut components = path.components().filter(|c| !matches!(c, Component::CurDir));
    components.next();

    let mut relative = PathBuf::new();
    for component in components {
        match component {
            Component::Normal(part) => relative.push(part),
            _ => bail!("Refusing to extract unsafe path {}", path.display()),
        }
    }

    Ok((!relative.as_os_str().is_empty()).then_some(relative))
}
