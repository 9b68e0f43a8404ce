use std::fs::File;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::Result;
use crate::paths::validate_output_dir;

/// An output file being written next to its final destination.
///
/// Nothing appears at the destination until [`StagedOutput::commit`]; dropping
/// an uncommitted stage removes the temporary file.
pub struct StagedOutput {
    tmp: NamedTempFile,
    target: PathBuf,
}

impl StagedOutput {
    pub fn new<P: AsRef<Path>>(target: P) -> Result<Self> {
        let target = target.as_ref().to_path_buf();
        validate_output_dir(&target)?;

        let dir = match target.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut builder = tempfile::Builder::new();
        builder.prefix(".pdftomp3-");
        // same mode a plain File::create would get once the umask applies
        #[cfg(unix)]
        builder.permissions(std::os::unix::fs::PermissionsExt::from_mode(0o666));
        let tmp = builder.tempfile_in(dir)?;

        Ok(StagedOutput { tmp, target })
    }

    /// Path of the temporary file, for writers that need a file name
    pub fn path(&self) -> &Path {
        self.tmp.path()
    }

    pub fn file_mut(&mut self) -> &mut File {
        self.tmp.as_file_mut()
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Move the finished file into place, keeping the permissions of any file it replaces
    pub fn commit(self) -> Result<PathBuf> {
        if let Ok(existing) = std::fs::metadata(&self.target) {
            std::fs::set_permissions(self.tmp.path(), existing.permissions())?;
        }
        self.tmp.persist(&self.target).map_err(|e| e.error)?;
        debug!("Wrote {}", self.target.display());
        Ok(self.target)
    }
}

/// Run `write` against a staged file and commit it only if `write` succeeds
pub fn write_atomically<P, F>(target: P, write: F) -> Result<PathBuf>
where
    P: AsRef<Path>,
    F: FnOnce(&mut File) -> Result<()>,
{
    let mut staged = StagedOutput::new(target)?;
    write(staged.file_mut())?;
    staged.commit()
}
