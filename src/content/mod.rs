//! Save-game content model and the backend seam that loads it.
//!
//! The exporter never decodes save files itself. It asks a [`SaveGameBackend`]
//! for either a fully indexed [`ContentContainer`] or, in the raw extraction
//! modes, only the stored tribe/profile records selected by [`ReadingOptions`].
//!
//! # Components
//!
//! - [`ContentContainer`]: everything loaded from one save
//! - [`ContentPack`]: filtered read-only view with one export operation per target
//! - [`SnapshotBackend`]: backend reading a serialized content model (JSON or gzip JSON)
//! - [`maps`]: map identification from save file names

pub mod archive;
pub mod maps;
pub mod model;
pub mod pack;
pub mod snapshot;

pub use archive::{MAX_RECORD_AGE_DAYS, ReadingOptions, StoredRecord, StoredRecords};
pub use model::{ContentContainer, Creature, DroppedItem, Item, Player, Structure, Tribe};
pub use pack::{ContentPack, ExportFilter, PackOptions};
pub use snapshot::SnapshotBackend;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

pub const TRIBES_FILE: &str = "ASV_Tribes.json";
pub const TRIBE_LOGS_FILE: &str = "ASV_TribeLogs.json";
pub const PLAYERS_FILE: &str = "ASV_Players.json";
pub const STRUCTURES_FILE: &str = "ASV_Structures.json";
pub const MAP_STRUCTURES_FILE: &str = "ASV_MapStructures.json";
pub const WILD_FILE: &str = "ASV_Wild.json";
pub const TAMED_FILE: &str = "ASV_Tamed.json";

/// Errors raised while loading or writing save content
#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Save file not found: {0}")]
    SaveNotFound(Utf8PathBuf),

    #[error("Failed to read {path}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse save data in {path}")]
    Parse {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write {path}")]
    Write {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize export {path}")]
    Serialize {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// What to load: the save itself plus an optional cluster data folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub save_file: Utf8PathBuf,
    pub cluster_folder: Option<Utf8PathBuf>,
    /// Cluster uploads older than this many days are skipped. Zero keeps all.
    pub max_cluster_age_days: u32,
}

impl LoadRequest {
    pub fn new<P: Into<Utf8PathBuf>>(save_file: P) -> Self {
        Self {
            save_file: save_file.into(),
            cluster_folder: None,
            max_cluster_age_days: MAX_RECORD_AGE_DAYS,
        }
    }

    /// Attach a cluster folder. An empty or blank folder means none.
    pub fn with_cluster_folder(mut self, folder: &str) -> Self {
        let folder = folder.trim();
        self.cluster_folder = (!folder.is_empty()).then(|| Utf8PathBuf::from(folder));
        self
    }

    pub fn with_max_cluster_age(mut self, days: u32) -> Self {
        self.max_cluster_age_days = days;
        self
    }
}

/// Source of save-game content.
#[cfg_attr(test, mockall::automock)]
pub trait SaveGameBackend {
    /// Load and index the whole save.
    fn load(&self, request: &LoadRequest) -> Result<ContentContainer, ContentError>;

    /// Decode only the archive sections enabled in `options`.
    fn read_archive(
        &self,
        save_file: &Utf8Path,
        options: &ReadingOptions,
    ) -> Result<StoredRecords, ContentError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_request_cluster_folder() {
        let request = LoadRequest::new("TheIsland.ark").with_cluster_folder("  ");
        assert_eq!(request.cluster_folder, None);

        let request = LoadRequest::new("TheIsland.ark").with_cluster_folder("/srv/cluster");
        assert_eq!(request.cluster_folder, Some(Utf8PathBuf::from("/srv/cluster")));
        assert_eq!(request.max_cluster_age_days, MAX_RECORD_AGE_DAYS);
    }
}
