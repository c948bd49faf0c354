//! Loading projects from disk: plain `.qgs` XML or `.qgz` zip archives.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use zip::ZipArchive;

use crate::error::{Qgis2MapError, Result};
use crate::model::ProjectDocument;
use crate::parser::parse_project;

/// A zipped QGIS project (`.qgz`).
pub struct ProjectArchive {
    path: PathBuf,
    archive: ZipArchive<File>,
}

impl ProjectArchive {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let archive = ZipArchive::new(file)?;
        Ok(Self {
            path: path.to_path_buf(),
            archive,
        })
    }

    /// Parses the first `.qgs` entry of the archive.
    pub fn load(mut self) -> Result<ProjectDocument> {
        let source = self.path.display().to_string();
        for index in 0..self.archive.len() {
            let entry = self.archive.by_index(index)?;
            if entry.is_dir() || !entry.name().to_ascii_lowercase().ends_with(".qgs") {
                continue;
            }
            debug!("Reading project entry '{}' from {}", entry.name(), source);
            return parse_project(BufReader::new(entry), Some(source));
        }
        Err(Qgis2MapError::NoProjectInArchive(self.path))
    }
}

fn is_archive(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("qgz"))
}

/// Loads a project, unpacking `.qgz` archives and reading anything else as
/// project XML.
pub fn load_project(path: &Path) -> Result<ProjectDocument> {
    info!("Loading project {:?}", path);
    if is_archive(path) {
        return ProjectArchive::open(path)?.load();
    }
    let file = File::open(path)?;
    parse_project(BufReader::new(file), Some(path.display().to_string()))
}
