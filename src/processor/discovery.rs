//! File discovery module for ASOS report archives
//!
//! Finds raw report files (`*.dat`) under an input path and counts the
//! distinct stations they belong to.

use crate::constants::REPORT_FILE_EXTENSION;
use crate::error::{AsosError, Result};
use crate::models::BatchKey;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::task;
use tracing::debug;
use walkdir::WalkDir;

/// File discovery component for report archives
#[derive(Debug)]
pub struct FileDiscovery {
    input_path: PathBuf,
    recursive: bool,
    station_count: usize,
}

impl FileDiscovery {
    /// Create a new file discovery instance
    pub fn new(input_path: PathBuf, recursive: bool) -> Self {
        Self {
            input_path,
            recursive,
            station_count: 0,
        }
    }

    /// Get the station count of the last discovery
    pub fn station_count(&self) -> usize {
        self.station_count
    }

    /// Discover all report files under the input path
    ///
    /// A single file is accepted as is. A directory is listed one level deep
    /// unless discovery is recursive. NCDC archives are laid out as
    /// ```text
    /// 6401-2016/
    ///   64010KPDX201601.dat
    ///   64010KPDX201602.dat
    ///   64010KSEA201601.dat
    /// ```
    /// The result is sorted so batches are visited in a stable order.
    pub async fn discover_report_files(&mut self) -> Result<Vec<PathBuf>> {
        if !self.input_path.exists() {
            return Err(AsosError::InputNotFound {
                path: self.input_path.clone(),
            });
        }

        debug!("Searching for report files in: {}", self.input_path.display());

        let files = if self.input_path.is_file() {
            vec![self.input_path.clone()]
        } else {
            let root = self.input_path.clone();
            let recursive = self.recursive;
            task::spawn_blocking(move || walk_report_files(&root, recursive))
                .await
                .map_err(|e| AsosError::ProcessingFailed {
                    path: self.input_path.clone(),
                    reason: format!("Discovery task failed: {}", e),
                })??
        };

        let stations: HashSet<String> = files
            .iter()
            .map(|path| BatchKey::from_path(path).station)
            .collect();
        self.station_count = stations.len();

        debug!(
            "Found {} report files from {} stations",
            files.len(),
            self.station_count
        );

        Ok(files)
    }
}

fn walk_report_files(root: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut walker = WalkDir::new(root).follow_links(true);
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_file() && is_report_file(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Check if a path is a raw report file
fn is_report_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == REPORT_FILE_EXTENSION)
}
