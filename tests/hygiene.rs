//! Hygiene: source-level budgets for the editor crate.
//!
//! Scans `src/` (excluding `_test.rs` files) for patterns that either crash
//! the host page or swallow errors. Every budget is zero; the budget never
//! grows.
#![allow(clippy::absurd_extreme_comparisons)]

use std::fs;
use std::path::Path;

struct SourceFile {
    path: String,
    content: String,
}

fn source_files() -> Vec<SourceFile> {
    let mut files = Vec::new();
    collect(Path::new("src"), &mut files);
    files
}

fn collect(dir: &Path, out: &mut Vec<SourceFile>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect(&path, out);
            continue;
        }
        let path_str = path.to_string_lossy().to_string();
        if !path.extension().is_some_and(|e| e == "rs") || path_str.ends_with("_test.rs") {
            continue;
        }
        if let Ok(content) = fs::read_to_string(&path) {
            out.push(SourceFile { path: path_str, content });
        }
    }
}

/// Assert that `pattern` appears on at most `max` lines across the crate.
fn check_budget(pattern: &str, max: usize) {
    let files = source_files();
    assert!(!files.is_empty(), "no sources found; run from the crate root");

    let hits: Vec<(String, usize)> = files
        .iter()
        .map(|f| (f.path.clone(), f.content.lines().filter(|l| l.contains(pattern)).count()))
        .filter(|(_, n)| *n > 0)
        .collect();
    let count: usize = hits.iter().map(|(_, n)| n).sum();
    let listing = hits.iter().map(|(p, n)| format!("  {p}: {n}")).collect::<Vec<_>>().join("\n");
    assert!(count <= max, "`{pattern}` budget exceeded: found {count}, max {max}.\n{listing}");
}

// Panics.

#[test]
fn unwrap_budget() {
    check_budget(".unwrap()", 0);
}

#[test]
fn expect_budget() {
    check_budget(".expect(", 0);
}

#[test]
fn panic_budget() {
    check_budget("panic!(", 0);
}

#[test]
fn unreachable_budget() {
    check_budget("unreachable!(", 0);
}

#[test]
fn todo_budget() {
    check_budget("todo!(", 0);
}

#[test]
fn unimplemented_budget() {
    check_budget("unimplemented!(", 0);
}

// Silent loss.

#[test]
fn silent_discard_budget() {
    check_budget("let _ =", 0);
}

#[test]
fn dot_ok_budget() {
    check_budget(".ok()", 0);
}

// Structure.

#[test]
fn allow_dead_code_budget() {
    check_budget("#[allow(dead_code)]", 0);
}
