//! Export Service - writes a generated file set to disk.
//!
//! Generation itself never touches the filesystem; this service is the
//! only place outputs are materialized.

use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use crate::{
    application::{ApplicationError, ports::Filesystem},
    domain::Output,
    error::ArchforgeResult,
};

/// Writes outputs beneath a root directory with rollback on failure.
pub struct ExportService {
    filesystem: Box<dyn Filesystem>,
}

impl ExportService {
    pub fn new(filesystem: Box<dyn Filesystem>) -> Self {
        Self { filesystem }
    }

    /// Write every output beneath `root`.
    ///
    /// Existing files are only replaced when `force` is set. If any write
    /// fails, files created by this call are removed again.
    #[instrument(skip_all, fields(root = %root.as_ref().display(), files = outputs.len()))]
    pub fn export(
        &self,
        outputs: &[Output],
        root: impl AsRef<Path>,
        force: bool,
    ) -> ArchforgeResult<Vec<PathBuf>> {
        let root = root.as_ref();

        let targets: Vec<PathBuf> = outputs.iter().map(|o| root.join(o.path.as_path())).collect();

        if !force {
            if let Some(existing) = targets.iter().find(|p| self.filesystem.exists(p)) {
                return Err(ApplicationError::OutputExists {
                    path: existing.clone(),
                }
                .into());
            }
        }

        let mut written = Vec::with_capacity(outputs.len());
        match self.write_all(outputs, &targets, &mut written) {
            Ok(()) => {
                info!("Successfully wrote all files");
                Ok(targets)
            }
            Err(e) => {
                warn!("Write failed, attempting rollback");
                self.rollback(&written);
                Err(e)
            }
        }
    }

    fn write_all(
        &self,
        outputs: &[Output],
        targets: &[PathBuf],
        written: &mut Vec<PathBuf>,
    ) -> ArchforgeResult<()> {
        for (output, path) in outputs.iter().zip(targets) {
            // Ensure parent exists
            if let Some(parent) = path.parent() {
                self.filesystem.create_dir_all(parent)?;
            }

            let fresh = !self.filesystem.exists(path);
            self.filesystem.write_file(path, &output.content)?;
            if fresh {
                written.push(path.clone());
            }

            if output.permissions.executable_flag() {
                self.filesystem.set_permissions(path, true)?;
            }
        }
        Ok(())
    }

    /// Best-effort rollback of files created in this run.
    fn rollback(&self, written: &[PathBuf]) {
        for path in written.iter().rev() {
            if let Err(e) = self.filesystem.remove_file(path) {
                warn!(
                    error = %e,
                    path = %path.display(),
                    "Rollback failed"
                );
            }
        }
        info!(removed = written.len(), "Rollback finished");
    }
}
