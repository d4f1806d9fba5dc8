//! Rendering side of `dirtree` code blocks: generator adapter, tree markup,
//! and markdown integration.

pub mod block;
pub mod generator;
pub mod markdown;
pub mod markup;
pub mod options;
pub mod sanitize;

pub use block::{process_dirtree_block, CodeBlockProcessor, DirtreeProcessor, BLOCK_LANGUAGE};
pub use generator::{CommandGenerator, PreformattedGenerator, TreeGenerator};
pub use markdown::{render_document, to_html, ProcessorLookup};
pub use markup::{render_block, render_line};
pub use options::{GeneratorOptions, TreeType};

#[cfg(test)]
mod tests;
