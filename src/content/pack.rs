use super::model::{ContentContainer, Creature, DroppedItem, Player, Structure, Tribe};
use super::{
    ContentError, MAP_STRUCTURES_FILE, PLAYERS_FILE, STRUCTURES_FILE, TAMED_FILE, TRIBES_FILE,
    TRIBE_LOGS_FILE, WILD_FILE,
};
use crate::models::config::{AD_HOC_FILTER_RADIUS, DEFAULT_MAX_LEVEL, DEFAULT_MIN_LEVEL};
use crate::models::{BatchConfig, PackConfig, SpatialFilter};
use camino::{Utf8Path, Utf8PathBuf};
use flate2::Compression;
use flate2::write::GzEncoder;
use indexmap::IndexMap;
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};

/// Version stamped into every packed artifact.
pub const PACK_FORMAT_VERSION: u32 = 1;

/// Filters and inclusion flags applied when building a [`ContentPack`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackOptions {
    pub tribe_id: i64,
    pub player_id: i64,
    pub filter: SpatialFilter,
    pub include_structure_locations: bool,
    pub include_structure_content: bool,
    pub include_tribes_players: bool,
    pub include_tamed: bool,
    pub include_wild: bool,
    pub include_player_structures: bool,
    pub include_dropped_items: bool,
}

impl PackOptions {
    /// Everything included, no tribe or player filter.
    pub fn unfiltered(filter: SpatialFilter) -> Self {
        Self {
            tribe_id: 0,
            player_id: 0,
            filter,
            include_structure_locations: true,
            include_structure_content: true,
            include_tribes_players: true,
            include_tamed: true,
            include_wild: true,
            include_player_structures: true,
            include_dropped_items: true,
        }
    }

    /// Options for the single-target command line exports.
    pub fn ad_hoc() -> Self {
        let defaults = SpatialFilter::default();
        Self::unfiltered(SpatialFilter::new(defaults.lat, defaults.lon, AD_HOC_FILTER_RADIUS))
    }
}

impl From<&PackConfig> for PackOptions {
    fn from(config: &PackConfig) -> Self {
        Self {
            tribe_id: config.tribe_id,
            player_id: config.player_id,
            filter: config.filter,
            include_structure_locations: config.pack_structure_locations,
            include_structure_content: config.pack_structure_content,
            include_tribes_players: config.pack_tribes_players,
            include_tamed: config.pack_tamed,
            include_wild: config.pack_wild,
            include_player_structures: config.pack_player_structures,
            include_dropped_items: config.pack_dropped_items,
        }
    }
}

impl From<&BatchConfig> for PackOptions {
    fn from(config: &BatchConfig) -> Self {
        Self {
            tribe_id: config.tribe_id,
            player_id: config.player_id,
            filter: config.filter,
            include_structure_locations: true,
            include_structure_content: config.structure_content,
            include_tribes_players: config.tribes.add_players,
            include_tamed: config.tribes.add_tames,
            include_wild: true,
            include_player_structures: config.tribes.add_structures,
            include_dropped_items: false,
        }
    }
}

/// Class name and level restrictions for a single export.
#[derive(Debug, Clone)]
pub struct ExportFilter {
    class_name: Option<Regex>,
    min_level: i32,
    max_level: i32,
}

impl ExportFilter {
    pub fn none() -> Self {
        Self {
            class_name: None,
            min_level: DEFAULT_MIN_LEVEL,
            max_level: DEFAULT_MAX_LEVEL,
        }
    }

    /// Case-insensitive class name pattern. An invalid pattern matches literally.
    pub fn class_name(pattern: &str) -> Self {
        let mut filter = Self::none();
        let pattern = pattern.trim();
        if !pattern.is_empty() {
            let regex = RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .or_else(|_| {
                    RegexBuilder::new(&regex::escape(pattern))
                        .case_insensitive(true)
                        .build()
                });
            filter.class_name = regex.ok();
        }
        filter
    }

    pub fn with_levels(mut self, min_level: i32, max_level: i32) -> Self {
        self.min_level = min_level;
        self.max_level = max_level;
        self
    }

    fn matches_class(&self, class_name: &str) -> bool {
        self.class_name
            .as_ref()
            .is_none_or(|re| re.is_match(class_name))
    }

    fn matches_level(&self, level: i32) -> bool {
        level >= self.min_level && level <= self.max_level
    }
}

impl Default for ExportFilter {
    fn default() -> Self {
        Self::none()
    }
}

/// Per-tribe entry of the tribes export.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TribeSummary<'a> {
    pub tribe_id: i64,
    pub tribe_name: &'a str,
    pub players: usize,
    pub structures: usize,
    pub tames: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PackDocument<'a> {
    format_version: u32,
    exported_at: String,
    #[serde(flatten)]
    pack: &'a ContentPack,
}

/// Filtered, read-only view over a loaded save, ready for export.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentPack {
    pub map_name: String,
    pub options: PackOptions,
    pub tribes: Vec<Tribe>,
    pub players: Vec<Player>,
    pub player_structures: Vec<Structure>,
    pub map_structures: Vec<Structure>,
    pub wild_creatures: Vec<Creature>,
    pub tamed_creatures: Vec<Creature>,
    pub dropped_items: Vec<DroppedItem>,
}

impl ContentPack {
    pub fn new(container: &ContentContainer, options: &PackOptions) -> Self {
        // A player filter narrows the tribe filter to the player's own tribe.
        let tribe_id = if options.tribe_id == 0 && options.player_id != 0 {
            container.tribe_of_player(options.player_id).unwrap_or(0)
        } else {
            options.tribe_id
        };
        let in_tribe = |id: i64| tribe_id == 0 || id == tribe_id;

        let (tribes, players) = if options.include_tribes_players {
            let tribes = container
                .tribes
                .iter()
                .filter(|t| in_tribe(t.tribe_id))
                .cloned()
                .collect();
            let players = container
                .players
                .iter()
                .filter(|p| in_tribe(p.tribe_id))
                .filter(|p| options.player_id == 0 || p.player_id == options.player_id)
                .cloned()
                .collect();
            (tribes, players)
        } else {
            (Vec::new(), Vec::new())
        };

        let strip_content = |mut s: Structure| {
            if !options.include_structure_content {
                s.inventory.clear();
            }
            s
        };

        let player_structures = if options.include_player_structures {
            container
                .player_structures()
                .filter(|s| in_tribe(s.tribe_id))
                .cloned()
                .map(strip_content)
                .collect()
        } else {
            Vec::new()
        };

        let map_structures = if options.include_structure_locations {
            container
                .map_structures()
                .filter(|s| options.filter.contains(s.lat, s.lon))
                .cloned()
                .map(strip_content)
                .collect()
        } else {
            Vec::new()
        };

        let wild_creatures = if options.include_wild {
            container
                .wild_creatures
                .iter()
                .filter(|c| options.filter.contains(c.lat, c.lon))
                .cloned()
                .collect()
        } else {
            Vec::new()
        };

        let tamed_creatures = if options.include_tamed {
            container
                .tamed_creatures
                .iter()
                .filter(|c| in_tribe(c.tribe_id))
                .cloned()
                .collect()
        } else {
            Vec::new()
        };

        let dropped_items = if options.include_dropped_items {
            container
                .dropped_items
                .iter()
                .filter(|d| options.player_id == 0 || d.dropped_by_player_id == options.player_id)
                .cloned()
                .collect()
        } else {
            Vec::new()
        };

        tracing::debug!(
            "Content pack built: {} tribes, {} players, {} structures, {} map structures, \
             {} wild, {} tamed",
            tribes.len(),
            players.len(),
            player_structures.len(),
            map_structures.len(),
            wild_creatures.len(),
            tamed_creatures.len()
        );

        Self {
            map_name: container.map_name.clone(),
            options: PackOptions {
                tribe_id,
                ..*options
            },
            tribes,
            players,
            player_structures,
            map_structures,
            wild_creatures,
            tamed_creatures,
            dropped_items,
        }
    }

    pub fn tribe_summaries(&self) -> Vec<TribeSummary<'_>> {
        self.tribes
            .iter()
            .map(|t| TribeSummary {
                tribe_id: t.tribe_id,
                tribe_name: &t.tribe_name,
                players: self.players.iter().filter(|p| p.tribe_id == t.tribe_id).count(),
                structures: self
                    .player_structures
                    .iter()
                    .filter(|s| s.tribe_id == t.tribe_id)
                    .count(),
                tames: self
                    .tamed_creatures
                    .iter()
                    .filter(|c| c.tribe_id == t.tribe_id)
                    .count(),
            })
            .collect()
    }

    /// Tribe logs keyed by tribe id, in tribe order.
    pub fn tribe_logs(&self) -> IndexMap<i64, &[String]> {
        self.tribes
            .iter()
            .map(|t| (t.tribe_id, t.logs.as_slice()))
            .collect()
    }

    pub fn export_json_tribes(&self, path: &Utf8Path) -> Result<(), ContentError> {
        write_json(path, &self.tribe_summaries())
    }

    pub fn export_json_tribe_logs(&self, path: &Utf8Path) -> Result<(), ContentError> {
        write_json(path, &self.tribe_logs())
    }

    pub fn export_json_players(&self, path: &Utf8Path) -> Result<(), ContentError> {
        write_json(path, &self.players)
    }

    pub fn export_json_player_structures(
        &self,
        path: &Utf8Path,
        filter: &ExportFilter,
    ) -> Result<(), ContentError> {
        let structures: Vec<&Structure> = self
            .player_structures
            .iter()
            .filter(|s| filter.matches_class(&s.class_name))
            .collect();
        write_json(path, &structures)
    }

    pub fn export_json_map_structures(&self, path: &Utf8Path) -> Result<(), ContentError> {
        write_json(path, &self.map_structures)
    }

    pub fn export_json_wild(
        &self,
        path: &Utf8Path,
        filter: &ExportFilter,
    ) -> Result<(), ContentError> {
        let wild: Vec<&Creature> = self
            .wild_creatures
            .iter()
            .filter(|c| filter.matches_class(&c.class_name) && filter.matches_level(c.level))
            .collect();
        write_json(path, &wild)
    }

    pub fn export_json_tamed(
        &self,
        path: &Utf8Path,
        filter: &ExportFilter,
    ) -> Result<(), ContentError> {
        let tamed: Vec<&Creature> = self
            .tamed_creatures
            .iter()
            .filter(|c| filter.matches_class(&c.class_name))
            .collect();
        write_json(path, &tamed)
    }

    /// Write every JSON export into `folder`. Returns the files written.
    pub fn export_json_all(&self, folder: &Utf8Path) -> Result<Vec<Utf8PathBuf>, ContentError> {
        let none = ExportFilter::none();
        let files = [
            TRIBES_FILE,
            TRIBE_LOGS_FILE,
            PLAYERS_FILE,
            STRUCTURES_FILE,
            MAP_STRUCTURES_FILE,
            WILD_FILE,
            TAMED_FILE,
        ];

        let mut written = Vec::with_capacity(files.len());
        for name in files {
            let path = folder.join(name);
            match name {
                TRIBES_FILE => self.export_json_tribes(&path)?,
                TRIBE_LOGS_FILE => self.export_json_tribe_logs(&path)?,
                PLAYERS_FILE => self.export_json_players(&path)?,
                STRUCTURES_FILE => self.export_json_player_structures(&path, &none)?,
                MAP_STRUCTURES_FILE => self.export_json_map_structures(&path)?,
                WILD_FILE => self.export_json_wild(&path, &none)?,
                _ => self.export_json_tamed(&path, &none)?,
            }
            written.push(path);
        }
        Ok(written)
    }

    /// Write the whole pack as gzip-compressed JSON.
    pub fn export_pack(&self, path: &Utf8Path) -> Result<(), ContentError> {
        let document = PackDocument {
            format_version: PACK_FORMAT_VERSION,
            exported_at: chrono::Local::now().to_rfc3339(),
            pack: self,
        };

        let file = File::create(path).map_err(|source| ContentError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        serde_json::to_writer(&mut encoder, &document).map_err(|source| ContentError::Serialize {
            path: path.to_path_buf(),
            source,
        })?;
        encoder
            .finish()
            .and_then(|mut writer| writer.flush())
            .map_err(|source| ContentError::Write {
                path: path.to_path_buf(),
                source,
            })
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Utf8Path, value: &T) -> Result<(), ContentError> {
    let file = File::create(path).map_err(|source| ContentError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|source| ContentError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(|source| ContentError::Write {
        path: path.to_path_buf(),
        source,
    })
}
