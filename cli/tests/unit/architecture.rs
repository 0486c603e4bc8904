//! Structural tests for architectural boundary enforcement.
//!
//! These tests scan source files to verify the layering: `domain` is pure,
//! `application` sees only ports, `infra` never prints or renders.

use std::path::{Path, PathBuf};

fn src_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("src")
}

/// Collect all `.rs` files under a directory recursively.
fn collect_rs_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                files.extend(collect_rs_files(&path));
            } else if path.extension().and_then(|e| e.to_str()) == Some("rs") {
                files.push(path);
            }
        }
    }
    files
}

/// Track brace depth and report whether a line is inside a `#[cfg(test)]` block.
struct CfgTestTracker {
    in_test_block: bool,
    brace_depth: i32,
    test_block_start_depth: i32,
}

impl CfgTestTracker {
    fn new() -> Self {
        Self {
            in_test_block: false,
            brace_depth: 0,
            test_block_start_depth: 0,
        }
    }

    fn process_line(&mut self, line: &str) -> bool {
        if line.trim().contains("#[cfg(test)]") {
            self.in_test_block = true;
            self.test_block_start_depth = self.brace_depth;
        }
        for ch in line.chars() {
            match ch {
                '{' => self.brace_depth += 1,
                '}' => {
                    self.brace_depth -= 1;
                    if self.in_test_block && self.brace_depth <= self.test_block_start_depth {
                        self.in_test_block = false;
                    }
                }
                _ => {}
            }
        }
        self.in_test_block
    }
}

/// `(relative path, 1-based line number, line)` for every non-test,
/// non-comment line under `dir` containing any of `needles`.
fn find_in_production_code(dir: &Path, needles: &[&str]) -> Vec<String> {
    let mut hits = Vec::new();
    for file in collect_rs_files(dir) {
        let Ok(content) = std::fs::read_to_string(&file) else {
            continue;
        };
        let rel = file
            .strip_prefix(env!("CARGO_MANIFEST_DIR"))
            .unwrap_or(&file)
            .display()
            .to_string();
        let mut tracker = CfgTestTracker::new();
        for (i, line) in content.lines().enumerate() {
            let in_test = tracker.process_line(line);
            let trimmed = line.trim();
            if in_test || trimmed.starts_with("//") {
                continue;
            }
            if let Some(needle) = needles.iter().find(|n| line.contains(*n)) {
                hits.push(format!("{rel}:{}: `{needle}`: {trimmed}", i + 1));
            }
        }
    }
    hits
}

#[test]
fn domain_is_free_of_io_and_outer_layers() {
    let hits = find_in_production_code(
        &src_dir().join("domain"),
        &[
            "crate::infra",
            "crate::commands",
            "crate::output",
            "crate::application",
            "tokio::",
            "std::fs",
            "std::process",
            "println!",
        ],
    );
    assert!(hits.is_empty(), "domain/ must stay pure:\n{}", hits.join("\n"));
}

#[test]
fn application_depends_only_on_domain_and_ports() {
    let hits = find_in_production_code(
        &src_dir().join("application"),
        &["crate::infra", "crate::commands", "crate::output", "println!"],
    );
    assert!(
        hits.is_empty(),
        "application/ must not reach outer layers:\n{}",
        hits.join("\n")
    );
}

#[test]
fn infra_has_no_imports_from_commands_or_output() {
    let hits = find_in_production_code(
        &src_dir().join("infra"),
        &["crate::commands", "crate::output", "println!", "eprintln!"],
    );
    assert!(
        hits.is_empty(),
        "infra/ must not render or print:\n{}",
        hits.join("\n")
    );
}

#[test]
fn services_take_trait_bounds_not_concrete_infra_types() {
    let hits = find_in_production_code(
        &src_dir().join("application").join("services"),
        &["SshRemoteShell", "TokioCommandRunner", "YamlConfigStore", "EnvSecretSource"],
    );
    assert!(
        hits.is_empty(),
        "services must use port traits:\n{}",
        hits.join("\n")
    );
}

#[test]
fn no_code_writes_persistent_git_config() {
    let hits = find_in_production_code(&src_dir(), &["git config", "--global"]);
    assert!(
        hits.is_empty(),
        "credentials must stay process-scoped:\n{}",
        hits.join("\n")
    );
}

#[test]
fn no_inline_json_branching_in_commands() {
    let hits = find_in_production_code(
        &src_dir().join("commands"),
        &["json: bool", "if json", "if !json", "serde_json::"],
    );
    assert!(
        hits.is_empty(),
        "commands/ must render through app.renderer():\n{}",
        hits.join("\n")
    );
}
