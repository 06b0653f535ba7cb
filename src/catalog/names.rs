use serde::Deserialize;
use std::path::Path;
use tracing::{debug, instrument};

use super::{CatalogError, Gender};

#[derive(Debug, Deserialize)]
struct NamesFile {
    male: Vec<String>,
    female: Vec<String>,
    lastnames: Vec<String>,
}

/// First names per gender plus one last name pool shared by both genders
#[derive(Debug, Clone)]
pub struct NameCatalog {
    male: Vec<String>,
    female: Vec<String>,
    last_names: Vec<String>,
}

impl NameCatalog {
    /// Reads `{"male": [..], "female": [..], "lastnames": [..]}` from disk
    #[instrument]
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CatalogError::DataUnavailable(format!("cannot read {}: {}", path.display(), e))
        })?;
        let catalog = Self::from_json(&contents)?;

        debug!(
            male = catalog.male.len(),
            female = catalog.female.len(),
            last_names = catalog.last_names.len(),
            "Name catalog loaded"
        );
        Ok(catalog)
    }

    pub fn from_json(contents: &str) -> Result<Self, CatalogError> {
        let file: NamesFile = serde_json::from_str(contents)
            .map_err(|e| CatalogError::DataUnavailable(format!("malformed names file: {}", e)))?;

        for (list, key) in [
            (&file.male, "male"),
            (&file.female, "female"),
            (&file.lastnames, "lastnames"),
        ] {
            if list.is_empty() {
                return Err(CatalogError::DataUnavailable(format!(
                    "names file has no {} entries",
                    key
                )));
            }
        }

        Ok(Self {
            male: file.male,
            female: file.female,
            last_names: file.lastnames,
        })
    }

    pub fn first_names(&self, gender: Gender) -> &[String] {
        match gender {
            Gender::Male => &self.male,
            Gender::Female => &self.female,
        }
    }

    pub fn last_names(&self) -> &[String] {
        &self.last_names
    }
}

/// Upper-cases the first letter of every whitespace-separated word
pub fn title_case(name: &str) -> String {
    name.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
