use anyhow::{anyhow, Context, Result};
use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};
use std::thread;

use crate::options::GeneratorOptions;

/// Environment variable carrying the JSON-encoded options for
/// [`CommandGenerator`] children.
pub const OPTIONS_ENV: &str = "DIRTREEIST_OPTIONS";

/// Produces plain-text directory trees from a `dirtree` block body.
///
/// Implementations return one rendering per top-level root, in source order.
pub trait TreeGenerator: Send + Sync {
    fn generate(&self, source: &str, options: &GeneratorOptions) -> Result<Vec<String>>;
}

/// Join per-root renderings with a single blank line between them.
pub fn join_trees(trees: &[String]) -> Result<String> {
    if trees.is_empty() {
        return Err(anyhow!("Tree generator returned no trees"));
    }
    Ok(trees.join("\n\n"))
}

/// Treats the block body as tree text that was generated elsewhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreformattedGenerator;

impl TreeGenerator for PreformattedGenerator {
    fn generate(&self, source: &str, _options: &GeneratorOptions) -> Result<Vec<String>> {
        Ok(vec![source.to_string()])
    }
}

/// Runs an external generator program.
///
/// The source text goes to the child's stdin, the options to
/// [`OPTIONS_ENV`], and the child must print a JSON array of strings.
#[derive(Debug, Clone)]
pub struct CommandGenerator {
    program: String,
    args: Vec<String>,
}

impl CommandGenerator {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl TreeGenerator for CommandGenerator {
    fn generate(&self, source: &str, options: &GeneratorOptions) -> Result<Vec<String>> {
        let options_json = serde_json::to_string(options)?;

        log::debug!("Running tree generator: {} {:?}", self.program, self.args);
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .env(OPTIONS_ENV, options_json)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to start tree generator: {}", self.program))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("Tree generator stdin is not piped"))?;

        // stdin is fed from its own thread so a child that writes before it
        // finishes reading cannot fill both pipes.
        let (written, output) = thread::scope(|scope| {
            let writer = scope.spawn(move || match stdin.write_all(source.as_bytes()) {
                Err(e) if e.kind() == ErrorKind::BrokenPipe => Ok(()),
                other => other,
            });
            let output = child.wait_with_output();
            (writer.join(), output)
        });

        let output = output.context("Failed to wait for tree generator")?;
        written
            .map_err(|_| anyhow!("Tree generator stdin writer panicked"))?
            .context("Failed to write source to tree generator")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "Tree generator {} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            ));
        }

        let trees: Vec<String> = serde_json::from_slice(&output.stdout)
            .context("Tree generator output is not a JSON array of strings")?;
        if trees.is_empty() {
            return Err(anyhow!("Tree generator {} returned no trees", self.program));
        }
        Ok(trees)
    }
}
