use anyhow::Result;

use crate::generator::{join_trees, TreeGenerator};
use crate::markup::render_block;
use crate::options::GeneratorOptions;

/// Fenced code-block language handled by [`DirtreeProcessor`].
pub const BLOCK_LANGUAGE: &str = "dirtree";

/// Turns the body of one fenced code block into HTML.
pub trait CodeBlockProcessor: Send + Sync {
    fn process(&self, source: &str) -> Result<String>;
}

/// Generate the trees for `source` and return the rendered lines, without
/// the surrounding block elements.
pub fn render_source(
    generator: &dyn TreeGenerator,
    options: &GeneratorOptions,
    source: &str,
) -> Result<String> {
    let trees = generator.generate(source, options)?;
    log::debug!("Generator produced {} tree(s)", trees.len());
    let plain = join_trees(&trees)?;
    Ok(render_block(&plain))
}

/// Wrap rendered lines in the block elements a stylesheet keys on.
pub fn wrap_code_block(code: &str) -> String {
    format!(
        r#"<div class="el-pre"><pre class="language-dirtree"><code class="language-dirtree is-loaded">{}</code></pre></div>"#,
        code
    )
}

/// Full pipeline for one `dirtree` block: generate, render, wrap.
pub fn process_dirtree_block(
    generator: &dyn TreeGenerator,
    options: &GeneratorOptions,
    source: &str,
) -> Result<String> {
    render_source(generator, options, source).map(|code| wrap_code_block(&code))
}

/// A `dirtree` processor with a fixed set of options.
pub struct DirtreeProcessor {
    generator: Box<dyn TreeGenerator>,
    options: GeneratorOptions,
}

impl DirtreeProcessor {
    pub fn new(generator: Box<dyn TreeGenerator>, options: GeneratorOptions) -> Self {
        Self { generator, options }
    }
}

impl CodeBlockProcessor for DirtreeProcessor {
    fn process(&self, source: &str) -> Result<String> {
        process_dirtree_block(self.generator.as_ref(), &self.options, source)
    }
}
