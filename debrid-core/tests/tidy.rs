//! Workspace style enforcement
//!
//! Walks every crate in the workspace and fails on structural violations:
//! oversized modules, grab-bag module names, accessor-style function names,
//! role-suffixed type names and emoji.

use std::fs;
use std::path::{Path, PathBuf};

const MAX_MODULE_LINES: usize = 600;

const BANNED_MODULE_NAMES: &[&str] = &[
    "utils", "util", "helpers", "helper", "common", "shared", "misc", "tools",
];

const BANNED_FUNCTION_PREFIXES: &[&str] = &["get_", "set_", "handle_"];

const BANNED_TYPE_SUFFIXES: &[&str] = &[
    "Manager",
    "Service",
    "Handler",
    "Processor",
    "Controller",
    "Factory",
];

const WORKSPACE_CRATES: &[&str] = &["debrid-core", "debrid-cli"];

#[derive(Debug)]
struct StyleViolation {
    file: PathBuf,
    line: usize,
    rule: &'static str,
    message: String,
}

#[derive(Default)]
struct StyleChecker {
    violations: Vec<StyleViolation>,
}

impl StyleChecker {
    fn check_file(&mut self, path: &Path) -> Result<(), std::io::Error> {
        let content = fs::read_to_string(path)?;
        let lines: Vec<&str> = content.lines().collect();

        if lines.len() > MAX_MODULE_LINES {
            self.add_violation(
                path,
                1,
                "MODULE_SIZE_LIMIT",
                format!(
                    "Module has {} lines, exceeding {MAX_MODULE_LINES}",
                    lines.len()
                ),
            );
        }

        if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str())
            && BANNED_MODULE_NAMES.contains(&stem)
        {
            self.add_violation(
                path,
                1,
                "BANNED_MODULE_NAME",
                format!("Module '{stem}' uses a grab-bag name"),
            );
        }

        for (index, line) in lines.iter().enumerate() {
            self.check_line(path, index + 1, line);
        }

        Ok(())
    }

    fn check_line(&mut self, path: &Path, line_number: usize, line: &str) {
        let trimmed = line.trim_start();

        if let Some(name) = declared_name(trimmed, &["fn "])
            && let Some(prefix) = BANNED_FUNCTION_PREFIXES
                .iter()
                .find(|prefix| name.starts_with(**prefix))
        {
            self.add_violation(
                path,
                line_number,
                "FUNCTION_PREFIX",
                format!("Function '{name}' starts with '{prefix}'"),
            );
        }

        if let Some(name) = declared_name(trimmed, &["struct ", "enum ", "trait "])
            && let Some(suffix) = BANNED_TYPE_SUFFIXES
                .iter()
                .find(|suffix| name.ends_with(**suffix))
        {
            self.add_violation(
                path,
                line_number,
                "TYPE_SUFFIX",
                format!("Type '{name}' ends with '{suffix}'"),
            );
        }

        if line.chars().any(is_emoji) {
            self.add_violation(
                path,
                line_number,
                "NO_EMOJIS",
                "Emoji are forbidden, use plain text".to_string(),
            );
        }
    }

    fn add_violation(&mut self, file: &Path, line: usize, rule: &'static str, message: String) {
        self.violations.push(StyleViolation {
            file: file.to_path_buf(),
            line,
            rule,
            message,
        });
    }
}

/// Name following one of `keywords`, skipping visibility and `async`.
fn declared_name<'a>(line: &'a str, keywords: &[&str]) -> Option<&'a str> {
    let mut rest = line;
    for modifier in ["pub(crate) ", "pub(super) ", "pub ", "async "] {
        rest = rest.strip_prefix(modifier).unwrap_or(rest);
    }

    let rest = keywords
        .iter()
        .find_map(|keyword| rest.strip_prefix(keyword))?;
    let end = rest
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(rest.len());

    (end > 0).then(|| &rest[..end])
}

fn is_emoji(ch: char) -> bool {
    matches!(
        ch as u32,
        0x1F600..=0x1F64F | 0x1F910..=0x1F96B | 0x1F970..=0x1F9FF | 0x1F1E6..=0x1F1FF
    )
}

fn collect_workspace_files() -> Vec<PathBuf> {
    let workspace = Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    let mut files = Vec::new();
    for crate_name in WORKSPACE_CRATES {
        for dir in ["src", "tests"] {
            collect_rust_files_in_dir(&workspace.join(crate_name).join(dir), &mut files);
        }
    }
    files
}

fn collect_rust_files_in_dir(dir: &Path, files: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_rust_files_in_dir(&path, files);
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            files.push(path);
        }
    }
}

#[test]
fn test_workspace_style_has_no_violations() {
    let files = collect_workspace_files();
    assert!(!files.is_empty(), "no workspace sources found");

    let mut checker = StyleChecker::default();
    for file in &files {
        if let Err(e) = checker.check_file(file) {
            eprintln!("Failed to check {}: {e}", file.display());
        }
    }

    for violation in &checker.violations {
        println!(
            "[{}] {}:{} - {}",
            violation.rule,
            violation.file.display(),
            violation.line,
            violation.message
        );
    }

    assert!(
        checker.violations.is_empty(),
        "Found {} style violations in {} files",
        checker.violations.len(),
        files.len()
    );
}

#[test]
fn test_declared_name_skips_modifiers() {
    assert_eq!(declared_name("pub async fn get_value(", &["fn "]), Some("get_value"));
    assert_eq!(declared_name("pub(crate) struct Cache {", &["struct "]), Some("Cache"));
    assert_eq!(declared_name("let x = 1;", &["fn "]), None);
}
