// Dirtreeist library exports

pub mod config;
pub mod plugin;
pub mod settings_tab;

pub use config::{Settings, SettingsStore};
pub use plugin::{CodeBlockRegistry, DirtreeistPlugin, Plugin, PluginManager};
