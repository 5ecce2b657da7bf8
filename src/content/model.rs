use serde::{Deserialize, Serialize};

/// Everything loaded from one save game.
///
/// Structures owned by a tribe carry its id; unowned map structures (resource
/// nodes, wild nests) have `tribe_id == 0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContentContainer {
    pub map_name: String,
    pub tribes: Vec<Tribe>,
    pub players: Vec<Player>,
    pub structures: Vec<Structure>,
    pub wild_creatures: Vec<Creature>,
    pub tamed_creatures: Vec<Creature>,
    pub dropped_items: Vec<DroppedItem>,
}

impl ContentContainer {
    /// Tribe the player belongs to, if the player is known.
    pub fn tribe_of_player(&self, player_id: i64) -> Option<i64> {
        self.players
            .iter()
            .find(|p| p.player_id == player_id)
            .map(|p| p.tribe_id)
    }

    pub fn player_structures(&self) -> impl Iterator<Item = &Structure> {
        self.structures.iter().filter(|s| s.tribe_id != 0)
    }

    pub fn map_structures(&self) -> impl Iterator<Item = &Structure> {
        self.structures.iter().filter(|s| s.tribe_id == 0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Tribe {
    pub tribe_id: i64,
    pub tribe_name: String,
    pub logs: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Player {
    pub player_id: i64,
    pub tribe_id: i64,
    pub character_name: String,
    pub network_name: String,
    pub level: i32,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Structure {
    pub class_name: String,
    pub tribe_id: i64,
    pub lat: f64,
    pub lon: f64,
    pub inventory: Vec<Item>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Item {
    pub class_name: String,
    pub quantity: u32,
    pub is_blueprint: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Creature {
    pub class_name: String,
    pub name: String,
    pub tribe_id: i64,
    pub level: i32,
    pub lat: f64,
    pub lon: f64,
    /// Uploaded to the cluster rather than present on the map.
    pub is_cluster: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DroppedItem {
    pub class_name: String,
    pub dropped_by_player_id: i64,
    pub lat: f64,
    pub lon: f64,
}
