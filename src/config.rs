use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

use crate::error::Result;
use crate::models::{ItemKind, ItemStack};

// Default tuning, in world pixels (16 px per tile).
pub const DEFAULT_SYNC_RADIUS: f32 = 800.0;
pub const DEFAULT_SETTLE_THRESHOLD: f32 = 16.0;
pub const DEFAULT_PICKUP_RADIUS: f32 = 48.0;
pub const DEFAULT_BAG_ENTITY_KIND: ItemKind = 3331;
/// Copper shortsword, pickaxe and axe handed out with every new character.
pub const DEFAULT_IGNORED_KINDS: [ItemKind; 3] = [3506, 3507, 3509];

/// Item kinds that are always treated as absent: never escrowed, restored or counted.
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(from = "Vec<ItemKind>")]
pub struct IgnoredKinds(HashSet<ItemKind>);

impl IgnoredKinds {
    pub fn new(kinds: impl IntoIterator<Item = ItemKind>) -> Self {
        IgnoredKinds(kinds.into_iter().collect())
    }

    /// The one predicate deciding whether a stack counts as nothing.
    pub fn is_absent(&self, stack: &ItemStack) -> bool {
        stack.is_empty() || self.0.contains(&stack.kind)
    }
}

impl From<Vec<ItemKind>> for IgnoredKinds {
    fn from(kinds: Vec<ItemKind>) -> Self {
        IgnoredKinds::new(kinds)
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct GravebagConfig {
    pub ignored_item_kinds: IgnoredKinds,
    /// World entity kind reserved for gravebags.
    pub bag_entity_kind: ItemKind,
    /// Bags farther than this from a moving player are not looked at.
    pub sync_radius: f32,
    /// Minimum drift before a settled bag's position is written back.
    pub settle_threshold: f32,
    pub pickup_radius: f32,
    /// Accessory kinds of which only one may be worn at a time.
    pub exclusive_accessory_groups: Vec<Vec<ItemKind>>,
}

impl Default for GravebagConfig {
    fn default() -> Self {
        GravebagConfig {
            ignored_item_kinds: IgnoredKinds::new(DEFAULT_IGNORED_KINDS),
            bag_entity_kind: DEFAULT_BAG_ENTITY_KIND,
            sync_radius: DEFAULT_SYNC_RADIUS,
            settle_threshold: DEFAULT_SETTLE_THRESHOLD,
            pickup_radius: DEFAULT_PICKUP_RADIUS,
            exclusive_accessory_groups: Vec::new(),
        }
    }
}

impl GravebagConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&text)?;
        log::info!("[GravebagConfig] Loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn is_absent(&self, stack: &ItemStack) -> bool {
        self.ignored_item_kinds.is_absent(stack)
    }

    /// Whether two accessory kinds may not be worn together.
    pub fn accessories_conflict(&self, a: ItemKind, b: ItemKind) -> bool {
        a == b
            || self
                .exclusive_accessory_groups
                .iter()
                .any(|group| group.contains(&a) && group.contains(&b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GravebagError;

    #[test]
    fn empty_file_gives_defaults() {
        let config = GravebagConfig::from_toml_str("").unwrap();
        assert_eq!(config, GravebagConfig::default());
        assert!(config.is_absent(&ItemStack::new(3507, 1, 0)));
    }

    #[test]
    fn partial_file_overrides_fields() {
        let config = GravebagConfig::from_toml_str(
            r#"
            ignored_item_kinds = [12]
            pickup_radius = 64.0
            exclusive_accessory_groups = [[493, 492]]
            "#,
        )
        .unwrap();
        assert_eq!(config.pickup_radius, 64.0);
        assert_eq!(config.sync_radius, DEFAULT_SYNC_RADIUS);
        assert!(config.is_absent(&ItemStack::new(12, 5, 0)));
        assert!(!config.is_absent(&ItemStack::new(3507, 1, 0)));
        assert!(config.accessories_conflict(493, 492));
        assert!(config.accessories_conflict(158, 158));
        assert!(!config.accessories_conflict(158, 493));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let err = GravebagConfig::from_toml_str("pickup_radius = \"far\"").unwrap_err();
        assert!(matches!(err, GravebagError::ConfigParse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = GravebagConfig::load("/nonexistent/gravebags.toml").unwrap_err();
        assert!(matches!(err, GravebagError::ConfigIo(_)));
    }
}
