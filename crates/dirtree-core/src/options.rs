use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Accepted indentation widths.
pub const SPACE_SIZES: RangeInclusive<u8> = 1..=4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeType {
    #[default]
    Normal,
    Bold,
    Ascii,
}

impl TreeType {
    pub const ALL: [TreeType; 3] = [TreeType::Normal, TreeType::Bold, TreeType::Ascii];

    pub fn as_str(self) -> &'static str {
        match self {
            TreeType::Normal => "normal",
            TreeType::Bold => "bold",
            TreeType::Ascii => "ascii",
        }
    }
}

impl fmt::Display for TreeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TreeType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        TreeType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| anyhow!("Unknown tree type: {}", s))
    }
}

/// Options handed to the tree generator. Serialized with the generator's
/// own camelCase key names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorOptions {
    pub tree_type: TreeType,
    pub empty_before_upper_hierarche: bool,
    pub space_before_name: bool,
    pub space_size: u8,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            tree_type: TreeType::Normal,
            empty_before_upper_hierarche: false,
            space_before_name: true,
            space_size: 2,
        }
    }
}

impl GeneratorOptions {
    /// Overlay the recognized keys of a persisted JSON object onto `self`.
    ///
    /// Unknown keys and values of the wrong shape are skipped, leaving the
    /// current value in place. Returns the number of fields applied.
    pub fn merge_json(&mut self, value: &Value) -> usize {
        let Some(object) = value.as_object() else {
            log::warn!("Ignoring non-object settings data: {}", value);
            return 0;
        };

        let mut applied = 0;
        for (key, field) in object {
            let ok = match key.as_str() {
                "treeType" => field
                    .as_str()
                    .and_then(|s| s.parse().ok())
                    .map(|t| self.tree_type = t)
                    .is_some(),
                "emptyBeforeUpperHierarche" => field
                    .as_bool()
                    .map(|b| self.empty_before_upper_hierarche = b)
                    .is_some(),
                "spaceBeforeName" => field
                    .as_bool()
                    .map(|b| self.space_before_name = b)
                    .is_some(),
                "spaceSize" => field
                    .as_u64()
                    .and_then(|n| u8::try_from(n).ok())
                    .filter(|n| SPACE_SIZES.contains(n))
                    .map(|n| self.space_size = n)
                    .is_some(),
                other => {
                    log::debug!("Ignoring unknown settings key: {}", other);
                    continue;
                }
            };

            if ok {
                applied += 1;
            } else {
                log::warn!("Invalid value for {}: {}, keeping {}", key, field, self.describe(key));
            }
        }
        applied
    }

    /// Defaults overlaid with whatever `value` provides.
    pub fn from_json(value: &Value) -> Self {
        let mut options = Self::default();
        options.merge_json(value);
        options
    }

    fn describe(&self, key: &str) -> String {
        match key {
            "treeType" => self.tree_type.to_string(),
            "emptyBeforeUpperHierarche" => self.empty_before_upper_hierarche.to_string(),
            "spaceBeforeName" => self.space_before_name.to_string(),
            "spaceSize" => self.space_size.to_string(),
            _ => String::new(),
        }
    }
}
