use super::ContentError;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;

pub const TRIBE_RECORD_EXTENSION: &str = "arktribe";
pub const PROFILE_RECORD_EXTENSION: &str = "arkprofile";

/// Stored profiles and cluster uploads older than this many days are ignored.
pub const MAX_RECORD_AGE_DAYS: u32 = 90;

/// Which sections of a save archive the reader decodes.
///
/// Built with chained `with_*` calls starting from [`ReadingOptions::create`],
/// where every section is off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadingOptions {
    pub data_files: bool,
    pub game_objects: bool,
    pub stored_creatures: bool,
    pub stored_tribes: bool,
    pub stored_profiles: bool,
    pub build_component_tree: bool,
    /// Oldest stored profile to keep, in days. Zero keeps every profile.
    pub max_profile_age_days: u32,
}

impl ReadingOptions {
    pub fn create() -> Self {
        Self::default()
    }

    pub fn with_data_files(mut self, enabled: bool) -> Self {
        self.data_files = enabled;
        self
    }

    pub fn with_game_objects(mut self, enabled: bool) -> Self {
        self.game_objects = enabled;
        self
    }

    pub fn with_stored_creatures(mut self, enabled: bool) -> Self {
        self.stored_creatures = enabled;
        self
    }

    pub fn with_stored_tribes(mut self, enabled: bool) -> Self {
        self.stored_tribes = enabled;
        self
    }

    pub fn with_stored_profiles(mut self, enabled: bool) -> Self {
        self.stored_profiles = enabled;
        self
    }

    pub fn with_build_component_tree(mut self, enabled: bool) -> Self {
        self.build_component_tree = enabled;
        self
    }

    pub fn with_max_profile_age(mut self, days: u32) -> Self {
        self.max_profile_age_days = days;
        self
    }

    /// Whether a stored profile `age_days` old passes the age limit.
    /// Records without an age always pass.
    pub fn keeps_profile(&self, age_days: Option<u32>) -> bool {
        match age_days {
            Some(age) if self.max_profile_age_days > 0 => age <= self.max_profile_age_days,
            _ => true,
        }
    }
}

/// One raw tribe or profile block as stored in the save archive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoredRecord {
    pub id: i64,
    pub name: String,
    /// Days since the record was last saved, when the archive tracks it.
    pub age_days: Option<u32>,
    pub data: serde_json::Value,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecordFile<'a> {
    id: i64,
    name: &'a str,
    file_time: Option<String>,
    data: &'a serde_json::Value,
}

/// Raw records decoded from an archive, stamped with the save's write time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredRecords {
    pub tribes: Vec<StoredRecord>,
    pub profiles: Vec<StoredRecord>,
    pub file_time: Option<DateTime<Local>>,
}

impl StoredRecords {
    /// Write one `<id>.arktribe` file per tribe record into `folder`.
    pub fn write_tribes(&self, folder: &Utf8Path) -> Result<Vec<Utf8PathBuf>, ContentError> {
        self.write_records(&self.tribes, folder, TRIBE_RECORD_EXTENSION)
    }

    /// Write one `<id>.arkprofile` file per profile record into `folder`.
    pub fn write_profiles(&self, folder: &Utf8Path) -> Result<Vec<Utf8PathBuf>, ContentError> {
        self.write_records(&self.profiles, folder, PROFILE_RECORD_EXTENSION)
    }

    fn write_records(
        &self,
        records: &[StoredRecord],
        folder: &Utf8Path,
        extension: &str,
    ) -> Result<Vec<Utf8PathBuf>, ContentError> {
        let file_time = self.file_time.map(|t| t.to_rfc3339());
        let mut written = Vec::with_capacity(records.len());

        for record in records {
            let path = folder.join(format!("{}.{}", record.id, extension));
            let body = RecordFile {
                id: record.id,
                name: &record.name,
                file_time: file_time.clone(),
                data: &record.data,
            };
            let bytes = serde_json::to_vec_pretty(&body).map_err(|source| ContentError::Serialize {
                path: path.clone(),
                source,
            })?;
            fs::write(&path, bytes).map_err(|source| ContentError::Write {
                path: path.clone(),
                source,
            })?;
            tracing::debug!("Wrote stored record {}", path);
            written.push(path);
        }

        Ok(written)
    }
}
