//! Map identification from save file names.
//!
//! Official servers name the save after the map (`TheIsland.ark`,
//! `ScorchedEarth_P.ark`, ...), so the file stem is enough to label an export
//! with the map it came from.
//!
//! ```ignore
//! use asv_export::content::maps::detect_map;
//!
//! let map = detect_map(r"C:\Servers\Island\TheIsland.ark");
//! assert_eq!(map.map(|m| m.name), Some("The Island"));
//! ```

/// A supported map and the save file name it is stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapInfo {
    pub file_key: &'static str,
    pub name: &'static str,
}

const fn map(file_key: &'static str, name: &'static str) -> MapInfo {
    MapInfo { file_key, name }
}

/// Known maps, matched in order.
pub const SUPPORTED_MAPS: &[MapInfo] = &[
    map("TheIsland", "The Island"),
    map("TheCenter", "The Center"),
    map("ScorchedEarth_P", "Scorched Earth"),
    map("Ragnarok", "Ragnarok"),
    map("Aberration_P", "Aberration"),
    map("Extinction", "Extinction"),
    map("Valguero_P", "Valguero"),
    map("Gen2", "Genesis: Part 2"),
    map("Genesis", "Genesis: Part 1"),
    map("CrystalIsles", "Crystal Isles"),
    map("LostIsland", "Lost Island"),
    map("Fjordur", "Fjordur"),
];

/// Detects the map from a save file path.
///
/// Only the file stem is compared (case-insensitive), so a folder named after a
/// map does not count. Both `/` and `\` separate folders regardless of platform.
pub fn detect_map(save_path: &str) -> Option<&'static MapInfo> {
    let file_name = save_path
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(save_path)
        .to_lowercase();
    let stem = match file_name.rfind('.') {
        Some(idx) if idx > 0 => &file_name[..idx],
        _ => file_name.as_str(),
    };

    if stem.is_empty() {
        return None;
    }

    for info in SUPPORTED_MAPS {
        if stem.contains(&info.file_key.to_lowercase()) {
            tracing::debug!("Detected map {} from save file {}", info.name, save_path);
            return Some(info);
        }
    }

    tracing::debug!("Could not detect map from save file {}", save_path);
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_the_island() {
        assert_eq!(detect_map("TheIsland.ark").map(|m| m.name), Some("The Island"));
        assert_eq!(
            detect_map(r"C:\Servers\Save\TheIsland.ark").map(|m| m.name),
            Some("The Island")
        );
    }

    #[test]
    fn test_detect_is_case_insensitive() {
        assert_eq!(
            detect_map("/srv/ark/scorchedearth_p.ark").map(|m| m.file_key),
            Some("ScorchedEarth_P")
        );
    }

    #[test]
    fn test_gen2_is_not_genesis() {
        assert_eq!(detect_map("Gen2.ark").map(|m| m.name), Some("Genesis: Part 2"));
        assert_eq!(detect_map("Genesis.ark").map(|m| m.name), Some("Genesis: Part 1"));
    }

    #[test]
    fn test_folder_name_is_ignored() {
        assert_eq!(detect_map("/saves/TheIsland/custom.ark"), None);
    }

    #[test]
    fn test_unknown_map() {
        assert_eq!(detect_map("MyModdedMap.ark"), None);
        assert_eq!(detect_map(""), None);
    }
}
