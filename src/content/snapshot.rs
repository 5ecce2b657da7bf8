use super::archive::{ReadingOptions, StoredRecord, StoredRecords};
use super::maps::detect_map;
use super::model::{ContentContainer, Creature};
use super::{ContentError, LoadRequest, SaveGameBackend};
use camino::Utf8Path;
use flate2::read::GzDecoder;
use serde::Deserialize;
use std::fs;
use std::io::Read;
use std::time::{Duration, SystemTime};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Backend that reads a serialized content model instead of a binary save.
///
/// A snapshot is a JSON document shaped like [`ContentContainer`], optionally
/// gzip-compressed, with two extra sections (`storedTribes`, `storedProfiles`)
/// holding the raw records served by [`SaveGameBackend::read_archive`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotBackend;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ArchiveSections {
    stored_tribes: Vec<StoredRecord>,
    stored_profiles: Vec<StoredRecord>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ClusterFile {
    tamed: Vec<Creature>,
}

impl SnapshotBackend {
    pub fn new() -> Self {
        Self
    }

    /// Read the snapshot bytes, inflating them when gzip-compressed.
    fn read_bytes(&self, path: &Utf8Path) -> Result<Vec<u8>, ContentError> {
        if !path.is_file() {
            return Err(ContentError::SaveNotFound(path.to_path_buf()));
        }

        let raw = fs::read(path).map_err(|source| ContentError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        if raw.starts_with(&GZIP_MAGIC) {
            let mut inflated = Vec::new();
            GzDecoder::new(raw.as_slice())
                .read_to_end(&mut inflated)
                .map_err(|source| ContentError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
            Ok(inflated)
        } else {
            Ok(raw)
        }
    }

    /// Append tamed creatures uploaded to the cluster.
    ///
    /// Unreadable cluster files are logged and skipped; they never fail the load.
    /// Files last written more than `max_age_days` ago are skipped too.
    fn merge_cluster(
        &self,
        container: &mut ContentContainer,
        cluster_folder: &Utf8Path,
        max_age_days: u32,
    ) {
        let cutoff = (max_age_days > 0)
            .then(|| Duration::from_secs(u64::from(max_age_days) * SECONDS_PER_DAY))
            .and_then(|age| SystemTime::now().checked_sub(age));

        let entries = match cluster_folder.read_dir_utf8() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Cluster folder {} not readable: {}", cluster_folder, e);
                return;
            }
        };

        let mut merged = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_none_or(|ext| !ext.eq_ignore_ascii_case("json")) {
                continue;
            }

            if let Some(cutoff) = cutoff {
                let modified = entry.metadata().and_then(|meta| meta.modified());
                if modified.is_ok_and(|time| time < cutoff) {
                    tracing::debug!("Skipping stale cluster file {}", path);
                    continue;
                }
            }

            let parsed = fs::read(path)
                .map_err(|e| e.to_string())
                .and_then(|bytes| {
                    serde_json::from_slice::<ClusterFile>(&bytes).map_err(|e| e.to_string())
                });

            match parsed {
                Ok(cluster) => {
                    for mut creature in cluster.tamed {
                        creature.is_cluster = true;
                        container.tamed_creatures.push(creature);
                        merged += 1;
                    }
                }
                Err(e) => tracing::warn!("Skipping cluster file {}: {}", path, e),
            }
        }

        tracing::info!("Merged {} cluster creatures from {}", merged, cluster_folder);
    }
}

impl SaveGameBackend for SnapshotBackend {
    fn load(&self, request: &LoadRequest) -> Result<ContentContainer, ContentError> {
        let path = request.save_file.as_path();
        let bytes = self.read_bytes(path)?;

        let mut container: ContentContainer =
            serde_json::from_slice(&bytes).map_err(|source| ContentError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        if container.map_name.is_empty() {
            if let Some(map) = detect_map(path.as_str()) {
                container.map_name = map.name.to_string();
            }
        }

        if let Some(cluster) = request.cluster_folder.as_deref() {
            if cluster.is_dir() {
                self.merge_cluster(&mut container, cluster, request.max_cluster_age_days);
            } else {
                tracing::warn!("Cluster folder not found: {}", cluster);
            }
        }

        tracing::info!(
            "Loaded {} ({}): {} tribes, {} players, {} structures, {} wild, {} tamed",
            path,
            if container.map_name.is_empty() { "unknown map" } else { container.map_name.as_str() },
            container.tribes.len(),
            container.players.len(),
            container.structures.len(),
            container.wild_creatures.len(),
            container.tamed_creatures.len()
        );

        Ok(container)
    }

    fn read_archive(
        &self,
        save_file: &Utf8Path,
        options: &ReadingOptions,
    ) -> Result<StoredRecords, ContentError> {
        let bytes = self.read_bytes(save_file)?;
        let sections: ArchiveSections =
            serde_json::from_slice(&bytes).map_err(|source| ContentError::Parse {
                path: save_file.to_path_buf(),
                source,
            })?;

        let mut records = StoredRecords::default();
        if options.stored_tribes {
            records.tribes = sections.stored_tribes;
        }
        if options.stored_profiles {
            records.profiles = sections
                .stored_profiles
                .into_iter()
                .filter(|record| options.keeps_profile(record.age_days))
                .collect();
        }

        tracing::debug!(
            "Read {} stored tribes and {} stored profiles from {}",
            records.tribes.len(),
            records.profiles.len(),
            save_file
        );
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::MAX_RECORD_AGE_DAYS;
    use camino::Utf8PathBuf;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;
    use tempfile::TempDir;

    const SNAPSHOT: &str = r#"{
        "tribes": [{"tribeId": 1, "tribeName": "Alpha"}],
        "players": [{"playerId": 10, "tribeId": 1, "characterName": "Ana"}],
        "tamedCreatures": [{"className": "Rex_Character_BP_C", "tribeId": 1}],
        "storedTribes": [{"id": 1, "name": "Alpha"}],
        "storedProfiles": [
            {"id": 10, "name": "Ana", "ageDays": 2},
            {"id": 11, "name": "Bo"},
            {"id": 12, "name": "Cy", "ageDays": 400}
        ]
    }"#;

    fn temp_dir() -> (TempDir, Utf8PathBuf) {
        let temp = TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(temp.path().to_path_buf()).unwrap();
        (temp, path)
    }

    #[test]
    fn test_load_plain_snapshot_detects_map() {
        let (_temp, dir) = temp_dir();
        let save = dir.join("TheIsland.ark");
        fs::write(&save, SNAPSHOT).unwrap();

        let container = SnapshotBackend::new().load(&LoadRequest::new(&save)).unwrap();
        assert_eq!(container.map_name, "The Island");
        assert_eq!(container.tribes.len(), 1);
        assert_eq!(container.players[0].character_name, "Ana");
    }

    #[test]
    fn test_load_gzip_snapshot() {
        let (_temp, dir) = temp_dir();
        let save = dir.join("Ragnarok.ark");
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(SNAPSHOT.as_bytes()).unwrap();
        fs::write(&save, encoder.finish().unwrap()).unwrap();

        let container = SnapshotBackend::new().load(&LoadRequest::new(&save)).unwrap();
        assert_eq!(container.map_name, "Ragnarok");
        assert_eq!(container.tamed_creatures.len(), 1);
    }

    #[test]
    fn test_load_missing_save() {
        let (_temp, dir) = temp_dir();
        let err = SnapshotBackend::new()
            .load(&LoadRequest::new(dir.join("nope.ark")))
            .unwrap_err();
        assert!(matches!(err, ContentError::SaveNotFound(_)));
    }

    #[test]
    fn test_load_garbage_is_parse_error() {
        let (_temp, dir) = temp_dir();
        let save = dir.join("broken.ark");
        fs::write(&save, [0u8, 1, 2, 3]).unwrap();

        let err = SnapshotBackend::new().load(&LoadRequest::new(&save)).unwrap_err();
        assert!(matches!(err, ContentError::Parse { .. }));
    }

    #[test]
    fn test_cluster_creatures_are_merged() {
        let (_temp, dir) = temp_dir();
        let save = dir.join("TheIsland.ark");
        fs::write(&save, SNAPSHOT).unwrap();

        let cluster = dir.join("cluster");
        fs::create_dir(&cluster).unwrap();
        fs::write(
            cluster.join("76561198000000000.json"),
            r#"{"tamed": [{"className": "Wyvern_Character_BP_Fire_C", "tribeId": 1}]}"#,
        )
        .unwrap();
        fs::write(cluster.join("notes.txt"), "ignored").unwrap();
        fs::write(cluster.join("bad.json"), "{").unwrap();

        let request = LoadRequest::new(&save).with_cluster_folder(cluster.as_str());
        let container = SnapshotBackend::new().load(&request).unwrap();
        assert_eq!(container.tamed_creatures.len(), 2);
        assert!(container.tamed_creatures[1].is_cluster);
    }

    #[test]
    fn test_read_archive_honors_options() {
        let (_temp, dir) = temp_dir();
        let save = dir.join("TheIsland.ark");
        fs::write(&save, SNAPSHOT).unwrap();

        let backend = SnapshotBackend::new();
        let tribes_only = ReadingOptions::create().with_stored_tribes(true);
        let records = backend.read_archive(&save, &tribes_only).unwrap();
        assert_eq!(records.tribes.len(), 1);
        assert!(records.profiles.is_empty());

        let profiles_only = ReadingOptions::create().with_stored_profiles(true);
        let records = backend.read_archive(&save, &profiles_only).unwrap();
        assert!(records.tribes.is_empty());
        assert_eq!(records.profiles.len(), 3);

        let recent = profiles_only.with_max_profile_age(MAX_RECORD_AGE_DAYS);
        let records = backend.read_archive(&save, &recent).unwrap();
        let ids: Vec<i64> = records.profiles.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![10, 11]);
    }

    #[test]
    fn test_stale_cluster_files_are_skipped() {
        let (_temp, dir) = temp_dir();
        let save = dir.join("TheIsland.ark");
        fs::write(&save, SNAPSHOT).unwrap();

        let cluster = dir.join("cluster");
        fs::create_dir(&cluster).unwrap();
        let stale = cluster.join("76561198000000001.json");
        fs::write(
            &stale,
            r#"{"tamed": [{"className": "Griffin_Character_BP_C", "tribeId": 1}]}"#,
        )
        .unwrap();
        let long_ago = SystemTime::now() - Duration::from_secs(120 * SECONDS_PER_DAY);
        fs::File::options()
            .write(true)
            .open(&stale)
            .unwrap()
            .set_modified(long_ago)
            .unwrap();

        let request = LoadRequest::new(&save).with_cluster_folder(cluster.as_str());
        let container = SnapshotBackend::new().load(&request).unwrap();
        assert_eq!(container.tamed_creatures.len(), 1);

        let request = request.with_max_cluster_age(0);
        let container = SnapshotBackend::new().load(&request).unwrap();
        assert_eq!(container.tamed_creatures.len(), 2);
    }
}
