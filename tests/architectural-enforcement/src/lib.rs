//! Architectural Enforcement Integration Tests
//!
//! Source-scanning checks that keep the workspace honest:
//! - No blocking sleeps or blocking HTTP in production code
//! - The terminal front end never reaches into codec, renderer or audio
//!   decoder internals
//! - The core crate stays free of terminal dependencies
//!
//! Only production code is scanned. A file's production code ends at its
//! first `#[cfg(test)]` line; comments are ignored.

use std::fs;
use std::path::{Path, PathBuf};

/// One line of production code
#[derive(Debug)]
pub struct SourceLine {
    pub path: PathBuf,
    pub number: usize,
    /// The line with any trailing `//` comment removed
    pub code: String,
}

impl std::fmt::Display for SourceLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{} - {}", self.path.display(), self.number, self.code.trim())
    }
}

/// The workspace root, found from this crate's manifest directory.
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../..")
        .canonicalize()
        .unwrap_or_else(|_| PathBuf::from("../.."))
}

/// Production lines of every `.rs` file under `dir` (relative to the
/// workspace root).
pub fn production_lines(dir: &str) -> Vec<SourceLine> {
    let root = workspace_root().join(dir);
    assert!(root.exists(), "missing source dir {}", root.display());

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(&root)
        .into_iter()
        .filter_map(Result::ok)
        .map(walkdir::DirEntry::into_path)
        .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("rs"))
        .collect();
    files.sort();

    let mut lines = Vec::new();
    for path in files {
        let Ok(content) = fs::read_to_string(&path) else {
            continue;
        };
        for (idx, line) in content.lines().enumerate() {
            if line.trim_start().starts_with("#[cfg(test)]") {
                break;
            }
            let code = strip_comment(line);
            if code.trim().is_empty() {
                continue;
            }
            lines.push(SourceLine {
                path: path.clone(),
                number: idx + 1,
                code: code.to_string(),
            });
        }
    }
    lines
}

/// `line` up to its first `//` outside a string literal.
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    let mut prev = '\0';
    for (i, c) in line.char_indices() {
        match c {
            '"' if prev != '\\' && prev != '\'' => in_string = !in_string,
            '/' if !in_string && prev == '/' => return &line[..i - 1],
            _ => {}
        }
        prev = c;
    }
    line
}

/// Lines containing any of `needles`.
pub fn find<'a>(lines: &'a [SourceLine], needles: &[&str]) -> Vec<&'a SourceLine> {
    lines
        .iter()
        .filter(|line| needles.iter().any(|needle| line.code.contains(needle)))
        .collect()
}

/// Panic listing `violations` under `rule` when there are any.
pub fn assert_none(rule: &str, violations: &[&SourceLine]) {
    if violations.is_empty() {
        return;
    }
    let listing: Vec<String> = violations.iter().map(|v| format!("  {v}")).collect();
    panic!(
        "\n{rule}: {} violation(s)\n{}\n",
        violations.len(),
        listing.join("\n")
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_comment() {
        assert_eq!(strip_comment("let a = 1; // note"), "let a = 1; ");
        assert_eq!(strip_comment(r#"let u = "http://x";"#), r#"let u = "http://x";"#);
        assert_eq!(strip_comment("//! doc"), "");
    }

    #[test]
    fn test_workspace_root_has_members() {
        let root = workspace_root();
        assert!(root.join("core/src").exists());
        assert!(root.join("tui/src").exists());
    }
}
