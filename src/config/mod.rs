pub mod paths;

pub use paths::AppPaths;

use crate::models::{
    BatchConfig, BatchTarget, MapStructureExport, PackConfig, PlayerExport, SpatialFilter,
    StructureExport, TamedExport, TribeExport, WildExport,
};
use camino::{Utf8Path, Utf8PathBuf};
use serde_json::{Map, Value};
use std::fs;

type JsonObject = Map<String, Value>;

/// Loader for the JSON settings files used by `pack` and `json` modes.
///
/// Loading never fails: a missing, unreadable or malformed file yields the
/// defaults, and a single mistyped key only resets that key.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    export_dir: Utf8PathBuf,
}

impl ConfigLoader {
    pub fn new(paths: &AppPaths) -> Self {
        Self {
            export_dir: paths.export_dir().to_path_buf(),
        }
    }

    /// Load the `pack` mode configuration.
    pub fn load_pack_config(&self, path: &str) -> PackConfig {
        match self.read_config_text(path, "pack export") {
            Some(text) => {
                let (config, ok) = parse_pack_config(&text, &self.export_dir);
                if !ok {
                    tracing::warn!(
                        "Unable to parse pack export configuration {}, using defaults",
                        path
                    );
                }
                config
            }
            None => PackConfig::defaults(&self.export_dir),
        }
    }

    /// Load the `json` batch mode configuration.
    pub fn load_batch_config(&self, path: &str) -> BatchConfig {
        match self.read_config_text(path, "export") {
            Some(text) => {
                let (config, ok) = parse_batch_config(&text);
                if !ok {
                    tracing::warn!("Unable to parse export configuration {}, using defaults", path);
                }
                config
            }
            None => BatchConfig::default(),
        }
    }

    fn read_config_text(&self, path: &str, kind: &str) -> Option<String> {
        let config_path = Utf8Path::new(path);
        if path.trim().is_empty() || !config_path.is_file() {
            tracing::warn!("{} configuration not found at {:?}, using defaults", kind, path);
            return None;
        }

        match fs::read_to_string(config_path) {
            Ok(text) => {
                tracing::debug!("Reading {} configuration from {}", kind, config_path);
                Some(text)
            }
            Err(e) => {
                tracing::warn!("Failed to read {} configuration {}: {}", kind, config_path, e);
                None
            }
        }
    }
}

/// Parse a `pack` mode configuration.
///
/// Returns the configuration and whether `text` was a JSON object. When it was
/// not, the configuration is exactly [`PackConfig::defaults`].
pub fn parse_pack_config(text: &str, export_dir: &Utf8Path) -> (PackConfig, bool) {
    let mut config = PackConfig::defaults(export_dir);
    let Some(root) = parse_object(text) else {
        return (config, false);
    };

    read_into(&root, "mapFilename", &mut config.map_filename, read_string);
    read_into(&root, "clusterFolder", &mut config.cluster_folder, read_string);
    read_into(&root, "exportFilename", &mut config.export_filename, read_string);
    read_into(&root, "tribeId", &mut config.tribe_id, read_i64);
    read_into(&root, "playerId", &mut config.player_id, read_i64);
    read_filter(&root, &mut config.filter);
    read_into(&root, "packStructureLocations", &mut config.pack_structure_locations, read_bool);
    read_into(&root, "packStructureContent", &mut config.pack_structure_content, read_bool);
    read_into(&root, "packDroppedItems", &mut config.pack_dropped_items, read_bool);
    read_into(&root, "packTribesPlayers", &mut config.pack_tribes_players, read_bool);
    read_into(&root, "packTamed", &mut config.pack_tamed, read_bool);
    read_into(&root, "packWild", &mut config.pack_wild, read_bool);
    read_into(&root, "packPlayerStructures", &mut config.pack_player_structures, read_bool);

    (config, true)
}

/// Parse a `json` batch mode configuration.
///
/// Returns the configuration and whether `text` was a JSON object. When it was
/// not, the configuration is exactly [`BatchConfig::default`].
pub fn parse_batch_config(text: &str) -> (BatchConfig, bool) {
    let mut config = BatchConfig::default();
    let Some(root) = parse_object(text) else {
        return (config, false);
    };

    read_into(&root, "mapFilename", &mut config.map_filename, read_string);
    read_into(&root, "clusterFolder", &mut config.cluster_folder, read_string);
    read_into(&root, "tribeId", &mut config.tribe_id, read_i64);
    read_into(&root, "playerId", &mut config.player_id, read_i64);
    read_filter(&root, &mut config.filter);
    read_into(&root, "structureContent", &mut config.structure_content, read_bool);
    read_into(&root, "stopOnError", &mut config.stop_on_error, read_bool);

    if let Some(obj) = nested(&root, BatchTarget::Tribes.config_key()) {
        config.tribes = read_tribe_export(obj);
    }
    if let Some(obj) = nested(&root, BatchTarget::Structures.config_key()) {
        config.structures = read_structure_export(obj);
    }
    if let Some(obj) = nested(&root, BatchTarget::MapStructures.config_key()) {
        config.map_structures = MapStructureExport {
            json_filename: read_or_default(obj, "jsonFilename", read_string),
            image_filename: read_or_default(obj, "imageFilename", read_string),
        };
    }
    if let Some(obj) = nested(&root, BatchTarget::Players.config_key()) {
        config.players = PlayerExport {
            json_filename: read_or_default(obj, "jsonFilename", read_string),
            image_filename: read_or_default(obj, "imageFilename", read_string),
        };
    }
    if let Some(obj) = nested(&root, BatchTarget::Wild.config_key()) {
        config.wild = read_wild_export(obj);
    }
    if let Some(obj) = nested(&root, BatchTarget::Tamed.config_key()) {
        config.tamed = TamedExport {
            json_filename: read_or_default(obj, "jsonFilename", read_string),
            image_filename: read_or_default(obj, "imageFilename", read_string),
            class_name: read_or_default(obj, "className", read_string),
        };
    }

    (config, true)
}

fn read_tribe_export(obj: &JsonObject) -> TribeExport {
    let mut export = TribeExport::default();
    read_into(obj, "jsonFilename", &mut export.json_filename, read_string);
    read_into(obj, "imageFilename", &mut export.image_filename, read_string);
    read_into(obj, "addStructures", &mut export.add_structures, read_bool);
    read_into(obj, "addPlayers", &mut export.add_players, read_bool);
    read_into(obj, "addTames", &mut export.add_tames, read_bool);
    export
}

fn read_structure_export(obj: &JsonObject) -> StructureExport {
    StructureExport {
        json_filename: read_or_default(obj, "jsonFilename", read_string),
        image_filename: read_or_default(obj, "imageFilename", read_string),
        class_name: read_or_default(obj, "className", read_string),
    }
}

fn read_wild_export(obj: &JsonObject) -> WildExport {
    let mut export = WildExport::default();
    read_into(obj, "jsonFilename", &mut export.json_filename, read_string);
    read_into(obj, "imageFilename", &mut export.image_filename, read_string);
    read_into(obj, "className", &mut export.class_name, read_string);
    read_into(obj, "minLevel", &mut export.min_level, read_i32);
    read_into(obj, "maxLevel", &mut export.max_level, read_i32);
    export
}

fn read_filter(obj: &JsonObject, filter: &mut SpatialFilter) {
    read_into(obj, "filterLat", &mut filter.lat, read_f64);
    read_into(obj, "filterLon", &mut filter.lon, read_f64);
    read_into(obj, "filterRad", &mut filter.radius, read_f64);
}

fn parse_object(text: &str) -> Option<JsonObject> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(root)) => Some(root),
        _ => None,
    }
}

fn nested<'a>(obj: &'a JsonObject, key: &str) -> Option<&'a JsonObject> {
    obj.get(key).and_then(Value::as_object)
}

/// Overwrite `slot` when `key` is present and convertible; otherwise leave it.
fn read_into<T>(obj: &JsonObject, key: &str, slot: &mut T, read: fn(&Value) -> Option<T>) {
    match obj.get(key).map(read) {
        Some(Some(value)) => *slot = value,
        Some(None) => {
            tracing::debug!("Ignoring configuration key {} with unexpected value", key);
        }
        None => {}
    }
}

fn read_or_default<T: Default>(obj: &JsonObject, key: &str, read: fn(&Value) -> Option<T>) -> T {
    let mut value = T::default();
    read_into(obj, key, &mut value, read);
    value
}

fn read_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn read_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn read_i32(value: &Value) -> Option<i32> {
    read_i64(value).and_then(|v| i32::try_from(v).ok())
}

fn read_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn read_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => s.trim().to_lowercase().parse().ok(),
        _ => None,
    }
}
