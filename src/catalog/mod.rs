// Immutable lookup tables used as the randomness source for generated accounts

pub use names::{title_case, NameCatalog};
pub use pictures::PictureCatalog;

mod names;
mod pictures;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}
