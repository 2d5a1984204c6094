//! Source hygiene for the canvas engine.
//!
//! Scans `canvas/src/` for patterns that either crash the WASM module or
//! silently drop errors. Every budget is zero; the engine has no business
//! panicking inside a browser tab.

use std::fs;
use std::path::{Path, PathBuf};

/// (pattern, budget, reason)
const RULES: &[(&str, usize, &str)] = &[
    (".unwrap()", 0, "panics abort the wasm instance"),
    (".expect(", 0, "panics abort the wasm instance"),
    ("panic!(", 0, "panics abort the wasm instance"),
    ("unreachable!(", 0, "panics abort the wasm instance"),
    ("todo!(", 0, "unfinished code path"),
    ("unimplemented!(", 0, "unfinished code path"),
    ("let _ =", 0, "discards a Result without inspecting it"),
    (".ok()", 0, "discards the error half of a Result"),
    ("#[allow(dead_code)]", 0, "dead code should be deleted"),
    ("println!(", 0, "the engine has no stdout; return actions instead"),
];

/// Production sources only; `*_test.rs` siblings are exempt.
fn production_sources(dir: &Path, out: &mut Vec<(PathBuf, String)>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for path in entries.flatten().map(|e| e.path()) {
        if path.is_dir() {
            production_sources(&path, out);
            continue;
        }
        let is_rs = path.extension().is_some_and(|e| e == "rs");
        let is_test = path.to_string_lossy().ends_with("_test.rs");
        if is_rs && !is_test {
            if let Ok(content) = fs::read_to_string(&path) {
                out.push((path, content));
            }
        }
    }
}

#[test]
fn sources_are_found() {
    let mut files = Vec::new();
    production_sources(Path::new("src"), &mut files);
    assert!(files.iter().any(|(p, _)| p.ends_with("engine.rs")), "scan found no engine.rs: {files:?}");
}

#[test]
fn pattern_budgets_hold() {
    let mut files = Vec::new();
    production_sources(Path::new("src"), &mut files);

    let mut failures = Vec::new();
    for (pattern, budget, reason) in RULES {
        let hits: Vec<String> = files
            .iter()
            .flat_map(|(path, content)| {
                content
                    .lines()
                    .enumerate()
                    .filter(|(_, line)| line.contains(pattern))
                    .map(move |(n, _)| format!("  {}:{}", path.display(), n + 1))
            })
            .collect();
        if hits.len() > *budget {
            failures.push(format!("`{pattern}` found {} times, max {budget} ({reason})\n{}", hits.len(), hits.join("\n")));
        }
    }
    assert!(failures.is_empty(), "hygiene budgets exceeded:\n{}", failures.join("\n"));
}
