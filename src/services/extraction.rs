use super::export::{ensure_folder, require_input};
use crate::content::{MAX_RECORD_AGE_DAYS, ReadingOptions, SaveGameBackend, StoredRecords};
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Local};
use std::fs;

/// Which stored record kind to pull out of a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Tribes,
    Profiles,
}

impl RecordKind {
    fn label(&self) -> &'static str {
        match self {
            Self::Tribes => "tribe",
            Self::Profiles => "profile",
        }
    }

    /// Only the archive sections needed for this kind.
    pub fn reading_options(&self) -> ReadingOptions {
        ReadingOptions::create()
            .with_data_files(true)
            .with_game_objects(false)
            .with_stored_creatures(false)
            .with_stored_tribes(*self == Self::Tribes)
            .with_stored_profiles(*self == Self::Profiles)
            .with_build_component_tree(false)
            .with_max_profile_age(MAX_RECORD_AGE_DAYS)
    }
}

/// Write one `<tribeId>.arktribe` file per stored tribe into `out_folder`.
pub fn extract_tribes<B: SaveGameBackend + ?Sized>(
    backend: &B,
    save_file: &str,
    out_folder: &Utf8Path,
) -> Result<Vec<Utf8PathBuf>> {
    extract(backend, save_file, out_folder, RecordKind::Tribes)
}

/// Write one `<playerId>.arkprofile` file per stored profile into `out_folder`.
pub fn extract_profiles<B: SaveGameBackend + ?Sized>(
    backend: &B,
    save_file: &str,
    out_folder: &Utf8Path,
) -> Result<Vec<Utf8PathBuf>> {
    extract(backend, save_file, out_folder, RecordKind::Profiles)
}

fn extract<B: SaveGameBackend + ?Sized>(
    backend: &B,
    save_file: &str,
    out_folder: &Utf8Path,
    kind: RecordKind,
) -> Result<Vec<Utf8PathBuf>> {
    let save = require_input(save_file)?;
    tracing::info!("Extracting {} records from {}", kind.label(), save);

    let mut records = backend
        .read_archive(&save, &kind.reading_options())
        .with_context(|| format!("Failed to read {} records from {}", kind.label(), save))?;
    records.file_time = last_write_time(&save);

    ensure_folder(out_folder)?;
    let written = write_records(&records, out_folder, kind)?;

    tracing::info!(
        "Extracted {} {} records to {}",
        written.len(),
        kind.label(),
        out_folder
    );
    Ok(written)
}

fn write_records(
    records: &StoredRecords,
    out_folder: &Utf8Path,
    kind: RecordKind,
) -> Result<Vec<Utf8PathBuf>> {
    let written = match kind {
        RecordKind::Tribes => records.write_tribes(out_folder),
        RecordKind::Profiles => records.write_profiles(out_folder),
    };
    written.with_context(|| format!("Failed to write {} records to {}", kind.label(), out_folder))
}

fn last_write_time(path: &Utf8Path) -> Option<DateTime<Local>> {
    fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map(DateTime::<Local>::from)
        .ok()
}
