use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

/// File name used for a content pack when the configuration names none.
pub const DEFAULT_PACK_FILENAME: &str = "ASV_ContentPack.asv";

/// Extension every content pack carries.
pub const PACK_EXTENSION: &str = "asv";

pub const DEFAULT_FILTER_LAT: f64 = 50.0;
pub const DEFAULT_FILTER_LON: f64 = 50.0;
pub const DEFAULT_FILTER_RADIUS: f64 = 250.0;

/// Radius used by the single-target command line exports.
pub const AD_HOC_FILTER_RADIUS: f64 = 100.0;

pub const DEFAULT_MIN_LEVEL: i32 = 0;
pub const DEFAULT_MAX_LEVEL: i32 = 999;

/// Geographic bounding circle over in-game latitude/longitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpatialFilter {
    pub lat: f64,
    pub lon: f64,
    pub radius: f64,
}

impl SpatialFilter {
    pub fn new(lat: f64, lon: f64, radius: f64) -> Self {
        Self { lat, lon, radius }
    }

    /// True when the point lies inside (or on) the circle.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        let d_lat = lat - self.lat;
        let d_lon = lon - self.lon;
        (d_lat * d_lat + d_lon * d_lon).sqrt() <= self.radius
    }
}

impl Default for SpatialFilter {
    fn default() -> Self {
        Self {
            lat: DEFAULT_FILTER_LAT,
            lon: DEFAULT_FILTER_LON,
            radius: DEFAULT_FILTER_RADIUS,
        }
    }
}

/// Settings for `pack` mode.
///
/// Every field has a default, and a configuration file may override any subset of them.
#[derive(Debug, Clone, PartialEq)]
pub struct PackConfig {
    pub map_filename: String,
    pub cluster_folder: String,
    pub export_filename: String,
    pub tribe_id: i64,
    pub player_id: i64,
    pub filter: SpatialFilter,
    pub pack_structure_locations: bool,
    pub pack_structure_content: bool,
    pub pack_dropped_items: bool,
    pub pack_tribes_players: bool,
    pub pack_tamed: bool,
    pub pack_wild: bool,
    pub pack_player_structures: bool,
}

impl PackConfig {
    /// Defaults with the pack destination placed inside `export_dir`.
    pub fn defaults(export_dir: &Utf8Path) -> Self {
        Self {
            map_filename: String::new(),
            cluster_folder: String::new(),
            export_filename: export_dir.join(DEFAULT_PACK_FILENAME).into_string(),
            tribe_id: 0,
            player_id: 0,
            filter: SpatialFilter::default(),
            pack_structure_locations: true,
            pack_structure_content: true,
            pack_dropped_items: true,
            pack_tribes_players: true,
            pack_tamed: true,
            pack_wild: true,
            pack_player_structures: true,
        }
    }

    /// Resolve the artifact path: fall back to `default_dir` when the name has no
    /// directory, fall back to the default file name when empty, and force the
    /// `.asv` extension.
    ///
    /// Returns `(folder, file)`.
    pub fn resolve_destination(&self, default_dir: &Utf8Path) -> (Utf8PathBuf, Utf8PathBuf) {
        let folder = match directory_part(&self.export_filename) {
            "" => default_dir.to_path_buf(),
            dir => Utf8PathBuf::from(dir),
        };

        let mut file = if self.export_filename.trim().is_empty() {
            folder.join(DEFAULT_PACK_FILENAME).into_string()
        } else {
            self.export_filename.clone()
        };

        let suffix = format!(".{}", PACK_EXTENSION);
        if !file.to_lowercase().ends_with(&suffix) {
            file.push_str(&suffix);
        }

        (folder, Utf8PathBuf::from(file))
    }
}

/// `exportTribes` descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TribeExport {
    pub json_filename: String,
    pub image_filename: String,
    pub add_structures: bool,
    pub add_players: bool,
    pub add_tames: bool,
}

impl Default for TribeExport {
    fn default() -> Self {
        Self {
            json_filename: String::new(),
            image_filename: String::new(),
            add_structures: true,
            add_players: true,
            add_tames: true,
        }
    }
}

/// `exportStructures` descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructureExport {
    pub json_filename: String,
    pub image_filename: String,
    pub class_name: String,
}

/// `exportMapStructures` descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapStructureExport {
    pub json_filename: String,
    pub image_filename: String,
}

/// `exportPlayers` descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerExport {
    pub json_filename: String,
    pub image_filename: String,
}

/// `exportWild` descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WildExport {
    pub json_filename: String,
    pub image_filename: String,
    pub class_name: String,
    pub min_level: i32,
    pub max_level: i32,
}

impl Default for WildExport {
    fn default() -> Self {
        Self {
            json_filename: String::new(),
            image_filename: String::new(),
            class_name: String::new(),
            min_level: DEFAULT_MIN_LEVEL,
            max_level: DEFAULT_MAX_LEVEL,
        }
    }
}

/// `exportTamed` descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TamedExport {
    pub json_filename: String,
    pub image_filename: String,
    pub class_name: String,
}

/// Settings for `json` batch mode.
///
/// A descriptor with an empty `json_filename` is not exported.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchConfig {
    pub map_filename: String,
    pub cluster_folder: String,
    pub tribe_id: i64,
    pub player_id: i64,
    pub filter: SpatialFilter,
    pub structure_content: bool,
    pub stop_on_error: bool,
    pub tribes: TribeExport,
    pub structures: StructureExport,
    pub map_structures: MapStructureExport,
    pub players: PlayerExport,
    pub wild: WildExport,
    pub tamed: TamedExport,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            map_filename: String::new(),
            cluster_folder: String::new(),
            tribe_id: 0,
            player_id: 0,
            filter: SpatialFilter::default(),
            structure_content: false,
            stop_on_error: false,
            tribes: TribeExport::default(),
            structures: StructureExport::default(),
            map_structures: MapStructureExport::default(),
            players: PlayerExport::default(),
            wild: WildExport::default(),
            tamed: TamedExport::default(),
        }
    }
}

/// Directory part of a path string, split on either separator style.
///
/// Mirrors how the exporter has always treated `C:\out\` (folder `C:\out`) and
/// `out.json` (no folder), independent of the host platform.
pub fn directory_part(path: &str) -> &str {
    match path.rfind(['/', '\\']) {
        Some(0) => &path[..1],
        Some(idx) => &path[..idx],
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_defaults() {
        let config = PackConfig::defaults(Utf8Path::new("/opt/asv/Export"));
        assert_eq!(config.export_filename, "/opt/asv/Export/ASV_ContentPack.asv");
        assert_eq!(config.tribe_id, 0);
        assert_eq!(config.filter, SpatialFilter::new(50.0, 50.0, 250.0));
        assert!(config.pack_wild);
        assert!(config.pack_dropped_items);
    }

    #[test]
    fn test_batch_defaults() {
        let config = BatchConfig::default();
        assert!(config.tribes.json_filename.is_empty());
        assert!(config.tribes.add_tames);
        assert_eq!(config.wild.max_level, 999);
        assert!(!config.structure_content);
        assert!(!config.stop_on_error);
    }

    #[test]
    fn test_resolve_destination_appends_extension() {
        let mut config = PackConfig::defaults(Utf8Path::new("/base/Export"));
        config.export_filename = "out".to_string();

        let (folder, file) = config.resolve_destination(Utf8Path::new("/base/Export"));
        assert_eq!(folder, Utf8PathBuf::from("/base/Export"));
        assert_eq!(file, Utf8PathBuf::from("out.asv"));
    }

    #[test]
    fn test_resolve_destination_keeps_extension_case_insensitive() {
        let mut config = PackConfig::defaults(Utf8Path::new("/base/Export"));
        config.export_filename = "/packs/Island.ASV".to_string();

        let (folder, file) = config.resolve_destination(Utf8Path::new("/base/Export"));
        assert_eq!(folder, Utf8PathBuf::from("/packs"));
        assert_eq!(file, Utf8PathBuf::from("/packs/Island.ASV"));
    }

    #[test]
    fn test_resolve_destination_empty_name() {
        let mut config = PackConfig::defaults(Utf8Path::new("/base/Export"));
        config.export_filename = String::new();

        let (folder, file) = config.resolve_destination(Utf8Path::new("/base/Export"));
        assert_eq!(folder, Utf8PathBuf::from("/base/Export"));
        assert_eq!(file, Utf8PathBuf::from("/base/Export/ASV_ContentPack.asv"));
    }

    #[test]
    fn test_directory_part() {
        assert_eq!(directory_part(r"C:\out\"), r"C:\out");
        assert_eq!(directory_part(r"C:\out\tribes.json"), r"C:\out");
        assert_eq!(directory_part("/tmp/export/tribes.json"), "/tmp/export");
        assert_eq!(directory_part("tribes.json"), "");
        assert_eq!(directory_part("/tribes.json"), "/");
    }

    #[test]
    fn test_spatial_filter_contains() {
        let filter = SpatialFilter::new(50.0, 50.0, 10.0);
        assert!(filter.contains(50.0, 50.0));
        assert!(filter.contains(56.0, 58.0));
        assert!(!filter.contains(60.0, 60.0));
    }
}
