use anyhow::{Context, Result};
use comrak::{markdown_to_html, ComrakOptions};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

use crate::block::CodeBlockProcessor;

lazy_static! {
    static ref FENCED_BLOCK: Regex =
        Regex::new(r#"<pre><code class="language-([^"\s]+)">([^<]*)</code></pre>"#)
            .expect("Invalid FENCED_BLOCK regex pattern");
}

/// Resolves the processor registered for a fenced block language.
pub trait ProcessorLookup {
    fn processor(&self, language: &str) -> Option<&dyn CodeBlockProcessor>;
}

impl ProcessorLookup for HashMap<String, Box<dyn CodeBlockProcessor>> {
    fn processor(&self, language: &str) -> Option<&dyn CodeBlockProcessor> {
        self.get(language).map(|p| p.as_ref())
    }
}

/// Render markdown with no code-block processors.
pub fn to_html(src: &str) -> String {
    markdown_to_html(src, &create_comrak_options())
}

/// Render markdown, handing every fenced block with a registered language to
/// its processor. The first processor error aborts the render.
pub fn render_document(src: &str, processors: &dyn ProcessorLookup) -> Result<String> {
    let html = to_html(src);
    patch_code_blocks(&html, processors)
}

fn create_comrak_options() -> ComrakOptions<'static> {
    let mut opt = ComrakOptions::default();

    // Extension options
    opt.extension.strikethrough = true;
    opt.extension.table = true;
    opt.extension.autolink = true;
    opt.extension.tasklist = true;
    opt.extension.footnotes = true;

    // Render options - never pass raw HTML from the document through
    opt.render.unsafe_ = false;
    opt.render.escape = true;

    opt
}

/// Replace rendered `<pre><code class="language-…">` blocks whose language
/// has a processor with the processor's output.
pub fn patch_code_blocks(html: &str, processors: &dyn ProcessorLookup) -> Result<String> {
    let mut out = String::with_capacity(html.len());
    let mut last = 0;

    for caps in FENCED_BLOCK.captures_iter(html) {
        let (Some(whole), Some(language), Some(body)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            continue;
        };
        let Some(processor) = processors.processor(language.as_str()) else {
            continue;
        };

        let source = unescape_code(body.as_str());
        let source = source.strip_suffix('\n').unwrap_or(&source);
        let rendered = processor
            .process(source)
            .with_context(|| format!("Failed to render {} code block", language.as_str()))?;

        out.push_str(&html[last..whole.start()]);
        out.push_str(&rendered);
        last = whole.end();
    }

    out.push_str(&html[last..]);
    Ok(out)
}

/// Undo the entity escaping comrak applies to code block contents.
fn unescape_code(text: &str) -> String {
    text.replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
