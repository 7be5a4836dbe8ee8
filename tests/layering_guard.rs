//! Layering guardrails to keep the core crate free of the driver's stack.
//!
//! `samplebuild_core` holds the build tables, path variables, and results parsing. It must not pick up the CLI,
//! logging, or config crates; those belong to the `samplebuild` driver. This test scans the core manifest's
//! `[dependencies]` table and fails if any of them appear.

const DRIVER_ONLY: &[&str] = &["clap", "tracing", "tracing-subscriber", "toml", "serde"];

fn dependency_names(manifest: &str) -> Vec<String> {
    let mut in_dependencies = false;
    let mut names = Vec::new();

    for raw_line in manifest.lines() {
        let line = raw_line.trim();
        if line.starts_with('[') {
            in_dependencies = line == "[dependencies]";
            continue;
        }

        if !in_dependencies || line.is_empty() || line.starts_with('#') {
            continue;
        }

        let line_no_comment = line.split('#').next().unwrap_or("").trim();
        if let Some((name, _)) = line_no_comment.split_once('=') {
            names.push(name.trim().to_string());
        }
    }

    names
}

#[test]
fn core_does_not_depend_on_driver_crates() {
    let manifest = include_str!("../crates/samplebuild_core/Cargo.toml");
    let names = dependency_names(manifest);

    assert!(!names.is_empty(), "core manifest has no [dependencies] table");
    for name in &names {
        assert!(
            !DRIVER_ONLY.contains(&name.as_str()),
            "`{}` must not appear in samplebuild_core [dependencies]",
            name
        );
    }
}

#[test]
fn driver_depends_on_core() {
    let manifest = include_str!("../Cargo.toml");
    assert!(dependency_names(manifest).iter().any(|n| n == "samplebuild_core"));
}
