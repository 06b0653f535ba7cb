use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

use super::{CatalogError, Gender};

/// Stock profile pictures grouped by gender, from `female-*.jpg` / `male-*.jpg`
#[derive(Debug, Clone)]
pub struct PictureCatalog {
    male: Vec<PathBuf>,
    female: Vec<PathBuf>,
}

impl PictureCatalog {
    /// Scans `dir` (not recursively) once
    #[instrument]
    pub fn load(dir: &Path) -> Result<Self, CatalogError> {
        let entries = std::fs::read_dir(dir).map_err(|e| {
            CatalogError::DataUnavailable(format!("cannot read {}: {}", dir.display(), e))
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                CatalogError::DataUnavailable(format!("cannot read {}: {}", dir.display(), e))
            })?;
            if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                paths.push(entry.path());
            }
        }

        let catalog = Self::from_paths(paths)?;
        debug!(
            male = catalog.male.len(),
            female = catalog.female.len(),
            "Picture catalog loaded"
        );
        Ok(catalog)
    }

    /// Buckets paths by file name; names matching neither pattern are ignored
    pub fn from_paths(paths: Vec<PathBuf>) -> Result<Self, CatalogError> {
        let mut male = Vec::new();
        let mut female = Vec::new();

        for path in paths {
            match path.file_name().and_then(|n| n.to_str()).and_then(classify) {
                Some(Gender::Female) => female.push(path),
                Some(Gender::Male) => male.push(path),
                None => {}
            }
        }

        if male.is_empty() || female.is_empty() {
            return Err(CatalogError::DataUnavailable(format!(
                "pictures required for both genders (male: {}, female: {})",
                male.len(),
                female.len()
            )));
        }

        male.sort();
        female.sort();
        Ok(Self { male, female })
    }

    pub fn pictures(&self, gender: Gender) -> &[PathBuf] {
        match gender {
            Gender::Male => &self.male,
            Gender::Female => &self.female,
        }
    }
}

fn classify(file_name: &str) -> Option<Gender> {
    let stem = file_name.strip_suffix(".jpg")?;
    if stem.starts_with("female-") {
        Some(Gender::Female)
    } else if stem.starts_with("male-") {
        Some(Gender::Male)
    } else {
        None
    }
}
