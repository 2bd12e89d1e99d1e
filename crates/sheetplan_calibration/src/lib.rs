use serde_json::Value;
use sha2::{Digest, Sha256};
use std::sync::OnceLock;

pub const REGISTRY_ID: &str = "sheetplan.calibration.v1";

pub const CARD_PROFILE_ID: &str = "card";
pub const TILE_PROFILE_ID: &str = "tile";

// Registry document shipped with the workspace.
const CALIBRATION_V1_JSON: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../docs/calibration/calibration.v1.json"
));

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileDef {
    pub id: String,
    pub base_width: f64,
    pub base_height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutDefaults {
    pub page_width: f64,
    pub page_height: f64,
    pub page_margin: f64,
    pub small_threshold: f64,
    pub item_spacing: f64,
    pub tile_overlap_margin: f64,
}

static REGISTRY_VALUE: OnceLock<Value> = OnceLock::new();
static PROFILES: OnceLock<Vec<ProfileDef>> = OnceLock::new();
static LAYOUT: OnceLock<LayoutDefaults> = OnceLock::new();

fn registry_value() -> &'static Value {
    REGISTRY_VALUE.get_or_init(|| {
        serde_json::from_str(CALIBRATION_V1_JSON)
            .expect("embedded calibration registry must be valid JSON")
    })
}

pub fn hex_digest(hasher: Sha256) -> String {
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        use std::fmt::Write;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

pub fn default_profiles() -> &'static [ProfileDef] {
    PROFILES.get_or_init(|| {
        registry_value()
            .get("profiles")
            .and_then(Value::as_array)
            .expect("calibration registry profiles array")
            .iter()
            .filter_map(|entry| {
                Some(ProfileDef {
                    id: entry.get("id").and_then(Value::as_str)?.to_string(),
                    base_width: entry.get("base_width").and_then(Value::as_f64)?,
                    base_height: entry.get("base_height").and_then(Value::as_f64)?,
                })
            })
            .collect()
    })
}

pub fn default_profile(id: &str) -> Option<&'static ProfileDef> {
    default_profiles().iter().find(|profile| profile.id == id)
}

pub fn layout_defaults() -> LayoutDefaults {
    *LAYOUT.get_or_init(|| {
        let layout = registry_value()
            .get("layout")
            .expect("calibration registry layout object");
        let page = layout.get("page").expect("calibration registry layout.page");
        let num = |v: Option<&Value>, key: &str| -> f64 {
            v.and_then(Value::as_f64)
                .unwrap_or_else(|| panic!("calibration registry layout.{key} must be a number"))
        };
        LayoutDefaults {
            page_width: num(page.get("w"), "page.w"),
            page_height: num(page.get("h"), "page.h"),
            page_margin: num(page.get("margin"), "page.margin"),
            small_threshold: num(layout.get("smallThreshold"), "smallThreshold"),
            item_spacing: num(layout.get("itemSpacing"), "itemSpacing"),
            tile_overlap_margin: num(layout.get("tileOverlapMargin"), "tileOverlapMargin"),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_schema_matches_constants() {
        let root = registry_value();
        assert_eq!(root.get("schema").and_then(Value::as_str), Some(REGISTRY_ID));
        assert_eq!(root.get("version").and_then(Value::as_u64), Some(1));
    }

    #[test]
    fn card_and_tile_profiles_are_distinct() {
        let card = default_profile(CARD_PROFILE_ID).expect("card profile");
        let tile = default_profile(TILE_PROFILE_ID).expect("tile profile");
        assert!((card.base_width - 3.5).abs() < 1e-12);
        assert!((card.base_height - 3.5).abs() < 1e-12);
        assert!((tile.base_width - 1.3).abs() < 1e-12);
        assert!((tile.base_height - 1.318).abs() < 1e-12);
        assert_ne!(card, tile);
    }

    #[test]
    fn layout_defaults_describe_letter_paper() {
        let layout = layout_defaults();
        assert!((layout.page_width - 8.5).abs() < 1e-12);
        assert!((layout.page_height - 11.0).abs() < 1e-12);
        assert!((layout.page_margin - 0.25).abs() < 1e-12);
        assert!((layout.small_threshold - 4.0).abs() < 1e-12);
        assert!((layout.item_spacing - 0.2).abs() < 1e-12);
        assert!((layout.tile_overlap_margin - 0.25).abs() < 1e-12);
    }

    #[test]
    fn hex_digest_of_empty_input() {
        assert_eq!(
            hex_digest(Sha256::new()),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
