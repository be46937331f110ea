use crate::config::{Canonical, Config, UnknownClassPolicy};
use crate::emit::{fonts_css, tokens_css};
use crate::generator::{compile_classes, emit_css};
use crate::scanner::{ScanError, ScanOptions, scan_with_options};
use crate::serialize::{SerializeError, to_deterministic_string};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

pub const MANIFEST_VERSION: u32 = 1;

const BASE_CSS: &str = include_str!("base.css");

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("unknown classes: {}", .0.join(", "))]
    UnknownClasses(Vec<String>),
    #[error("failed to serialize manifest: {0}")]
    Serialize(#[from] SerializeError),
}

/// Classes to compile and the number of files they were discovered in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildInput {
    pub classes: Vec<String>,
    pub files: usize,
}

impl BuildInput {
    pub fn new(classes: Vec<String>) -> Self {
        Self { classes, files: 0 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOutput {
    pub css: String,
    pub matched: Vec<String>,
    pub unknown: Vec<String>,
    pub warnings: Vec<String>,
    pub manifest: Option<String>,
}

#[derive(Debug, Serialize)]
struct Manifest<'a> {
    version: u32,
    files: usize,
    classes: &'a [String],
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    unknown: &'a [String],
}

/// Scans `build.content` plus the safelist into a build input.
pub fn content_input(config: &Config, options: &ScanOptions) -> Result<BuildInput, ScanError> {
    let result = scan_with_options(&config.build.content, &config.build.safelist, options)?;
    Ok(BuildInput {
        classes: result.classes,
        files: result.files,
    })
}

pub fn base_css() -> &'static str {
    BASE_CSS
}

/// Assembles fonts, tokens, base reset and utilities into one stylesheet.
///
/// Every class is attempted before the unknown-class policy is applied, so
/// `warn` reports all unknown classes at once and `error` lists them all.
pub fn build(canonical: &Canonical, input: &BuildInput) -> Result<BuildOutput, BuildError> {
    let config = canonical.config();
    let emit = &config.build.emit;
    let policy = config.build.policy();

    let mut sections = Vec::with_capacity(4);
    if emit.fonts_css {
        push_section(&mut sections, fonts_css(config));
    }
    if emit.tokens_css {
        push_section(&mut sections, tokens_css(canonical));
    }
    if emit.base_enabled() {
        push_section(&mut sections, BASE_CSS.to_string());
    }

    let generated = compile_classes(canonical, &input.classes);
    push_section(&mut sections, emit_css(&generated.rules));

    if policy == UnknownClassPolicy::Error && !generated.unknown.is_empty() {
        return Err(BuildError::UnknownClasses(generated.unknown));
    }
    let warnings = match policy {
        UnknownClassPolicy::Warn => generated
            .unknown
            .iter()
            .map(|class| format!("unknown class: {}", class))
            .collect(),
        _ => Vec::new(),
    };

    let css = if sections.is_empty() {
        String::new()
    } else {
        let mut css = sections.join("\n\n");
        css.push('\n');
        css
    };

    let manifest = if emit.manifest {
        Some(to_deterministic_string(&Manifest {
            version: MANIFEST_VERSION,
            files: input.files,
            classes: &generated.matched,
            unknown: &generated.unknown,
        })?)
    } else {
        None
    };

    debug!(
        classes = input.classes.len(),
        matched = generated.matched.len(),
        unknown = generated.unknown.len(),
        bytes = css.len(),
        policy = %policy,
        "build complete"
    );

    Ok(BuildOutput {
        css,
        matched: generated.matched,
        unknown: generated.unknown,
        warnings,
        manifest,
    })
}

fn push_section(sections: &mut Vec<String>, section: String) {
    let trimmed = section.trim_end_matches('\n');
    if !trimmed.is_empty() {
        sections.push(trimmed.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::{BuildError, BuildInput, build, content_input};
    use crate::config::{Canonical, decode};
    use crate::scanner::ScanOptions;
    use serde_json::{Value, json};
    use std::fs;

    fn canonical(build: Value) -> Canonical {
        let config = decode(json!({
            "schemaVersion": 1,
            "breakpoints": { "md": "768px" },
            "themes": { "default": { "colors": { "ink": "#111" } } },
            "scales": { "space": { "4": "1rem" } },
            "variants": { "responsive": ["md"], "state": ["hover"] },
            "build": build
        }))
        .expect("config should decode");
        config.validate().expect("config should validate");
        config.canonicalize()
    }

    fn input(classes: &[&str]) -> BuildInput {
        BuildInput {
            classes: classes.iter().map(|class| class.to_string()).collect(),
            files: 2,
        }
    }

    #[test]
    fn joins_sections_with_blank_lines() {
        let canonical = canonical(json!({
            "emit": { "tokensCss": true, "base": true },
            "unknownClassPolicy": "ignore"
        }));
        let output = build(&canonical, &input(&["p-4"])).expect("build");
        assert!(output.css.starts_with(":root {\n  --space-4: 1rem;\n"));
        assert!(output.css.contains("}\n\n*, *::before, *::after {"));
        assert!(output.css.ends_with("}\n\n.p-4 {\n  padding: var(--space-4);\n}\n"));
        assert!(output.manifest.is_none());
    }

    #[test]
    fn base_defaults_on_and_can_be_disabled() {
        let with_base = canonical(json!({}));
        let output = build(&with_base, &input(&[])).expect("build");
        assert!(output.css.starts_with("*, *::before, *::after {"));

        let without = canonical(json!({ "emit": { "base": false } }));
        let output = build(&without, &input(&[])).expect("build");
        assert!(output.css.is_empty());
    }

    #[test]
    fn error_policy_aborts_with_every_unknown_class() {
        let canonical = canonical(json!({ "unknownClassPolicy": "error" }));
        let err = build(&canonical, &input(&["p-4", "foo-bar", "md:nope"]))
            .expect_err("build should fail");
        assert!(matches!(err, BuildError::UnknownClasses(_)));
        assert_eq!(err.to_string(), "unknown classes: foo-bar, md:nope");
    }

    #[test]
    fn warn_policy_reports_and_still_emits() {
        let canonical = canonical(json!({
            "unknownClassPolicy": "warn",
            "emit": { "base": false }
        }));
        let output = build(&canonical, &input(&["foo-bar", "hover:p-4"])).expect("build");
        assert_eq!(output.warnings, vec!["unknown class: foo-bar".to_string()]);
        assert_eq!(output.css, ".hover\\:p-4:hover {\n  padding: var(--space-4);\n}\n");
    }

    #[test]
    fn ignore_policy_is_silent() {
        let canonical = canonical(json!({ "unknownClassPolicy": "ignore" }));
        let output = build(&canonical, &input(&["foo-bar"])).expect("build");
        assert!(output.warnings.is_empty());
        assert_eq!(output.unknown, vec!["foo-bar".to_string()]);
    }

    #[test]
    fn manifest_is_deterministic_and_omits_empty_unknown() {
        let canonical = canonical(json!({
            "unknownClassPolicy": "ignore",
            "emit": { "manifest": true }
        }));
        let output = build(&canonical, &input(&["md:p-4", "p-4"])).expect("build");
        assert_eq!(
            output.manifest.as_deref(),
            Some(
                "{\n  \"classes\": [\n    \"md:p-4\",\n    \"p-4\"\n  ],\n  \"files\": 2,\n  \"version\": 1\n}\n"
            )
        );

        let with_unknown = build(&canonical, &input(&["zz"])).expect("build");
        let manifest = with_unknown.manifest.expect("manifest");
        assert!(manifest.contains("\"unknown\": [\n    \"zz\"\n  ]"));
        assert!(manifest.contains("\"classes\": []"));
    }

    #[test]
    fn repeated_builds_are_byte_identical() {
        let canonical = canonical(json!({
            "emit": { "tokensCss": true, "manifest": true }
        }));
        let classes = input(&["md:hover:p-4", "bg-ink", "unknown-x"]);
        let first = build(&canonical, &classes).expect("build");
        let second = build(&canonical, &classes).expect("build");
        assert_eq!(first, second);
    }

    #[test]
    fn content_input_scans_configured_patterns() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("index.html"), r#"<p class="p-4 bg-ink p-4"></p>"#)
            .expect("write");
        let canonical = canonical(json!({
            "content": ["*.html"],
            "safelist": ["hidden"]
        }));
        let options = ScanOptions {
            base_path: dir.path().to_path_buf(),
            respect_gitignore: false,
        };
        let input = content_input(canonical.config(), &options).expect("scan");
        assert_eq!(input.files, 1);
        assert_eq!(input.classes, vec!["bg-ink", "hidden", "p-4"]);
    }
}
