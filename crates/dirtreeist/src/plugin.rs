use anyhow::{anyhow, Result};
use dirtree_core::{
    process_dirtree_block, render_document, CodeBlockProcessor, ProcessorLookup, TreeGenerator,
    BLOCK_LANGUAGE,
};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::config::{Settings, SettingsStore};
use crate::settings_tab;

// プラグインシステム
pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;
    fn version(&self) -> &str;
    fn on_load(&mut self, registry: &mut CodeBlockRegistry) -> Result<()>;
    fn on_unload(&mut self, registry: &mut CodeBlockRegistry) -> Result<()>;
}

/// Host-side table of fenced code-block processors, keyed by language.
#[derive(Default)]
pub struct CodeBlockRegistry {
    processors: HashMap<String, Box<dyn CodeBlockProcessor>>,
}

impl CodeBlockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        language: &str,
        processor: Box<dyn CodeBlockProcessor>,
    ) -> Result<()> {
        if self.processors.contains_key(language) {
            return Err(anyhow!(
                "A processor for {} code blocks is already registered",
                language
            ));
        }
        log::debug!("Registered code block processor: {}", language);
        self.processors.insert(language.to_string(), processor);
        Ok(())
    }

    pub fn unregister(&mut self, language: &str) -> bool {
        self.processors.remove(language).is_some()
    }

    pub fn is_registered(&self, language: &str) -> bool {
        self.processors.contains_key(language)
    }

    /// Render a markdown document through the registered processors.
    pub fn render_document(&self, src: &str) -> Result<String> {
        render_document(src, self)
    }
}

impl ProcessorLookup for CodeBlockRegistry {
    fn processor(&self, language: &str) -> Option<&dyn CodeBlockProcessor> {
        self.processors.processor(language)
    }
}

#[derive(Default)]
pub struct PluginManager {
    plugins: Vec<Box<dyn Plugin>>,
}

impl PluginManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_plugin(
        &mut self,
        mut plugin: Box<dyn Plugin>,
        registry: &mut CodeBlockRegistry,
    ) -> Result<()> {
        plugin.on_load(registry)?;
        log::info!("Loaded plugin {} {}", plugin.name(), plugin.version());
        self.plugins.push(plugin);
        Ok(())
    }

    pub fn unload_all(&mut self, registry: &mut CodeBlockRegistry) -> Result<()> {
        for mut plugin in self.plugins.drain(..) {
            plugin.on_unload(registry)?;
            log::info!("Unloaded plugin {}", plugin.name());
        }
        Ok(())
    }

    pub fn list_plugins(&self) -> Vec<(&str, &str)> {
        self.plugins.iter().map(|p| (p.name(), p.version())).collect()
    }
}

/// Registers the `dirtree` block processor and owns its settings.
pub struct DirtreeistPlugin {
    settings: Arc<RwLock<Settings>>,
    store: SettingsStore,
    generator: Arc<dyn TreeGenerator>,
}

impl DirtreeistPlugin {
    /// Create the plugin with settings loaded from `store`.
    pub async fn load(store: SettingsStore, generator: Arc<dyn TreeGenerator>) -> Result<Self> {
        let settings = store.load().await?;
        Ok(Self {
            settings: Arc::new(RwLock::new(settings)),
            store,
            generator,
        })
    }

    pub fn settings(&self) -> Result<Settings> {
        let settings = self
            .settings
            .read()
            .map_err(|_| anyhow!("Settings lock poisoned"))?;
        Ok(settings.clone())
    }

    /// Apply one settings-panel change and persist the result. Already
    /// registered processors pick the change up on their next render.
    pub async fn update_setting(&self, key: &str, value: &str) -> Result<()> {
        let updated = {
            let mut settings = self
                .settings
                .write()
                .map_err(|_| anyhow!("Settings lock poisoned"))?;
            settings_tab::apply(&mut settings, key, value)?;
            settings.clone()
        };
        self.store.save(&updated).await
    }

    pub fn settings_panel(&self) -> Result<String> {
        Ok(settings_tab::display(&self.settings()?))
    }
}

impl Plugin for DirtreeistPlugin {
    fn name(&self) -> &str {
        "dirtreeist"
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn on_load(&mut self, registry: &mut CodeBlockRegistry) -> Result<()> {
        registry.register(
            BLOCK_LANGUAGE,
            Box::new(LiveDirtreeProcessor {
                settings: Arc::clone(&self.settings),
                generator: Arc::clone(&self.generator),
            }),
        )
    }

    fn on_unload(&mut self, registry: &mut CodeBlockRegistry) -> Result<()> {
        registry.unregister(BLOCK_LANGUAGE);
        Ok(())
    }
}

/// Reads the current settings on every render.
struct LiveDirtreeProcessor {
    settings: Arc<RwLock<Settings>>,
    generator: Arc<dyn TreeGenerator>,
}

impl CodeBlockProcessor for LiveDirtreeProcessor {
    fn process(&self, source: &str) -> Result<String> {
        let options = self
            .settings
            .read()
            .map_err(|_| anyhow!("Settings lock poisoned"))?
            .clone();
        process_dirtree_block(self.generator.as_ref(), &options, source)
    }
}
