use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::shared::AppError;

/// File name every staged picture gets inside its draft item
const DRAFT_FILENAME: &str = "1.jpg";

/// URL prefix the draft area is served under
pub const DRAFT_URL_PREFIX: &str = "/pictures";

/// Handle for an image that has been staged but not yet attached to an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagingRef {
    pub item_id: Uuid,
    /// Location of the staged copy
    pub path: PathBuf,
    /// Catalog file the copy was made from
    pub source: PathBuf,
}

impl StagingRef {
    /// Location of the copy relative to the draft area, `<item id>/1.jpg`
    pub fn draft_key(&self) -> String {
        format!("{}/{}", self.item_id, DRAFT_FILENAME)
    }

    pub fn url(&self) -> String {
        draft_url(&self.draft_key())
    }
}

/// Public URL of a staged file given its draft key
pub fn draft_url(draft_key: &str) -> String {
    format!("{}/{}", DRAFT_URL_PREFIX, draft_key)
}

/// Trait for staging files ahead of attaching them to an account
#[async_trait]
pub trait FileStaging: Send + Sync {
    async fn stage_file(&self, path: &Path) -> Result<StagingRef, AppError>;
}

/// Copies files into `<draft_dir>/<item id>/1.jpg`
pub struct DraftFileStaging {
    draft_dir: PathBuf,
}

impl DraftFileStaging {
    pub fn new(draft_dir: impl Into<PathBuf>) -> Self {
        Self {
            draft_dir: draft_dir.into(),
        }
    }
}

#[async_trait]
impl FileStaging for DraftFileStaging {
    #[instrument(skip(self))]
    async fn stage_file(&self, path: &Path) -> Result<StagingRef, AppError> {
        let item_id = Uuid::new_v4();
        let item_dir = self.draft_dir.join(item_id.to_string());
        let target = item_dir.join(DRAFT_FILENAME);

        tokio::fs::create_dir_all(&item_dir).await.map_err(|e| {
            warn!(error = %e, dir = %item_dir.display(), "Failed to create draft item directory");
            AppError::DatabaseError(format!("cannot create draft area: {}", e))
        })?;
        tokio::fs::copy(path, &target).await.map_err(|e| {
            warn!(error = %e, source = %path.display(), "Failed to stage file");
            AppError::DatabaseError(format!("cannot stage {}: {}", path.display(), e))
        })?;

        debug!(item_id = %item_id, target = %target.display(), "File staged");
        Ok(StagingRef {
            item_id,
            path: target,
            source: path.to_path_buf(),
        })
    }
}

/// Records staged files without touching the filesystem
pub struct InMemoryFileStaging {
    staged: Mutex<Vec<StagingRef>>,
}

impl Default for InMemoryFileStaging {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryFileStaging {
    pub fn new() -> Self {
        Self {
            staged: Mutex::new(Vec::new()),
        }
    }

    pub fn staged(&self) -> Vec<StagingRef> {
        self.staged.lock().unwrap().clone()
    }
}

#[async_trait]
impl FileStaging for InMemoryFileStaging {
    async fn stage_file(&self, path: &Path) -> Result<StagingRef, AppError> {
        let item_id = Uuid::new_v4();
        let staging_ref = StagingRef {
            item_id,
            path: PathBuf::from(format!("draft/{}/{}", item_id, DRAFT_FILENAME)),
            source: path.to_path_buf(),
        };
        self.staged.lock().unwrap().push(staging_ref.clone());
        Ok(staging_ref)
    }
}
