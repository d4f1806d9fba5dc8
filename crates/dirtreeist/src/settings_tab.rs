//! Settings panel description.
//!
//! Each field maps to a control kind, its allowed values and a setter; the
//! host draws the controls and feeds changes back through [`apply`].

use anyhow::{anyhow, Result};
use std::fmt::Write as _;

use crate::config::Settings;

const TREE_TYPES: &[&str] = &["normal", "bold", "ascii"];
const SPACE_SIZES: &[&str] = &["1", "2", "3", "4"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Dropdown(&'static [&'static str]),
    Toggle,
}

impl Control {
    fn describe(&self) -> String {
        match self {
            Control::Dropdown(options) => format!("[{}]", options.join("|")),
            Control::Toggle => "[on|off]".to_string(),
        }
    }
}

pub struct SettingField {
    pub key: &'static str,
    pub label: &'static str,
    pub control: Control,
    read: fn(&Settings) -> String,
    write: fn(&mut Settings, &str) -> Result<()>,
}

impl SettingField {
    /// Current value as the control would show it.
    pub fn value(&self, settings: &Settings) -> String {
        (self.read)(settings)
    }

    pub fn apply(&self, settings: &mut Settings, value: &str) -> Result<()> {
        if let Control::Dropdown(options) = self.control {
            if !options.contains(&value) {
                return Err(anyhow!(
                    "Invalid value for {}: {} (expected one of {})",
                    self.label,
                    value,
                    options.join(", ")
                ));
            }
        }
        (self.write)(settings, value)
    }
}

pub static FIELDS: [SettingField; 4] = [
    SettingField {
        key: "treeType",
        label: "Tree type",
        control: Control::Dropdown(TREE_TYPES),
        read: get_tree_type,
        write: set_tree_type,
    },
    SettingField {
        key: "emptyBeforeUpperHierarche",
        label: "Insert empty line before upper hierarche",
        control: Control::Toggle,
        read: get_empty_before_upper_hierarche,
        write: set_empty_before_upper_hierarche,
    },
    SettingField {
        key: "spaceBeforeName",
        label: "Insert space before Name",
        control: Control::Toggle,
        read: get_space_before_name,
        write: set_space_before_name,
    },
    SettingField {
        key: "spaceSize",
        label: "Space size",
        control: Control::Dropdown(SPACE_SIZES),
        read: get_space_size,
        write: set_space_size,
    },
];

pub fn field(key: &str) -> Option<&'static SettingField> {
    FIELDS.iter().find(|f| f.key == key)
}

/// Apply a change coming from the control bound to `key`.
pub fn apply(settings: &mut Settings, key: &str, value: &str) -> Result<()> {
    let field = field(key).ok_or_else(|| anyhow!("Unknown setting: {}", key))?;
    field.apply(settings, value)
}

/// Text rendition of the panel, one control per line.
pub fn display(settings: &Settings) -> String {
    let mut out = String::new();
    for field in FIELDS.iter() {
        let _ = writeln!(
            out,
            "{:<42} {:<26} {:<20} {}",
            field.label,
            field.key,
            field.control.describe(),
            field.value(settings)
        );
    }
    out
}

fn toggle_label(on: bool) -> String {
    let label = if on { "on" } else { "off" };
    label.to_string()
}

fn parse_toggle(value: &str) -> Result<bool> {
    match value {
        "on" | "true" => Ok(true),
        "off" | "false" => Ok(false),
        other => Err(anyhow!("Invalid toggle value: {} (expected on or off)", other)),
    }
}

fn get_tree_type(settings: &Settings) -> String {
    settings.tree_type.to_string()
}

fn get_empty_before_upper_hierarche(settings: &Settings) -> String {
    toggle_label(settings.empty_before_upper_hierarche)
}

fn get_space_before_name(settings: &Settings) -> String {
    toggle_label(settings.space_before_name)
}

fn get_space_size(settings: &Settings) -> String {
    settings.space_size.to_string()
}

fn set_tree_type(settings: &mut Settings, value: &str) -> Result<()> {
    settings.tree_type = value.parse()?;
    Ok(())
}

fn set_empty_before_upper_hierarche(settings: &mut Settings, value: &str) -> Result<()> {
    settings.empty_before_upper_hierarche = parse_toggle(value)?;
    Ok(())
}

fn set_space_before_name(settings: &mut Settings, value: &str) -> Result<()> {
    settings.space_before_name = parse_toggle(value)?;
    Ok(())
}

fn set_space_size(settings: &mut Settings, value: &str) -> Result<()> {
    settings.space_size = value.parse()?;
    Ok(())
}
