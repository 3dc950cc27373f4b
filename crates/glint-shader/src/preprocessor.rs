//! GLSL include preprocessor
//!
//! Flattens `#include "relative/path"` directives into a single source
//! string before compilation. The list of files touched feeds the
//! hot-reload watcher so edits to included headers trigger recompiles too.

use glint_core::{GlintError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Resolves include directives for one root source file.
///
/// Include paths are resolved relative to the including file's directory.
/// Re-including a file from a sibling branch is legal (its content is
/// inlined again); a file transitively including itself is a cycle and
/// fails. No macro expansion happens beyond include resolution.
#[derive(Debug, Default)]
pub struct Preprocessor {
    /// Every file included, canonicalized, ordered by first occurrence
    includes: Vec<PathBuf>,
    /// Visited-path stack for the current resolution branch; membership
    /// means a true cycle, unlike a global seen-set
    stack: Vec<PathBuf>,
}

impl Preprocessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten `path` and every file it transitively includes
    pub fn resolve_file(&mut self, path: &Path) -> Result<String> {
        self.includes.clear();
        self.stack.clear();
        self.resolve_inner(path, true)
    }

    /// Files included by the last `resolve_file` call, excluding the root
    pub fn includes(&self) -> &[PathBuf] {
        &self.includes
    }

    fn resolve_inner(&mut self, path: &Path, is_root: bool) -> Result<String> {
        let canonical = path.canonicalize()?;
        if self.stack.contains(&canonical) {
            return Err(GlintError::CyclicInclude(canonical));
        }
        if !is_root && !self.includes.contains(&canonical) {
            self.includes.push(canonical.clone());
        }
        self.stack.push(canonical);

        let text = fs::read_to_string(path)?;
        let dir = path.parent().unwrap_or_else(|| Path::new("."));

        let mut out = String::with_capacity(text.len());
        for line in text.lines() {
            match parse_include(line) {
                Some(include) => {
                    let target = dir.join(include);
                    if !target.is_file() {
                        return Err(GlintError::MissingInclude {
                            path: target,
                            included_from: path.to_path_buf(),
                        });
                    }
                    out.push_str(&self.resolve_inner(&target, false)?);
                }
                None => {
                    out.push_str(line);
                    out.push('\n');
                }
            }
        }

        self.stack.pop();
        Ok(out)
    }
}

/// Extract the quoted path from an `#include "..."` line, if it is one
fn parse_include(line: &str) -> Option<&str> {
    let rest = line.trim().strip_prefix("#include")?.trim();
    let rest = rest.strip_prefix('"')?;
    let (path, _) = rest.split_once('"')?;
    Some(path)
}
