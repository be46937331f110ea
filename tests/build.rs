use lattice::build::{BuildInput, build, content_input};
use lattice::config::{Canonical, load_canonical};
use lattice::enumerate::all_classes;
use lattice::generator::compile_class;
use lattice::scanner::ScanOptions;
use std::fs;

fn defaults() -> Canonical {
    load_canonical(None, None).expect("embedded defaults should load")
}

#[test]
fn embedded_defaults_compile_every_enumerated_class() {
    let canonical = defaults();
    let classes = all_classes(&canonical);
    assert!(!classes.is_empty());
    assert!(classes.iter().any(|class| class == "md:hover:flex"));

    let output = build(&canonical, &BuildInput::new(classes.clone())).expect("build");
    assert!(output.unknown.is_empty());
    assert!(output.warnings.is_empty());
    assert_eq!(output.matched, classes);

    assert!(output.css.starts_with(":root {\n"));
    assert!(output.css.contains("*, *::before, *::after {"));
    assert!(output.css.contains("@media (min-width: 768px) {\n  .md\\:hover\\:flex:hover {"));
    assert!(output.css.ends_with("}\n"));
}

#[test]
fn full_build_is_byte_identical_across_runs() {
    let first = {
        let canonical = defaults();
        build(&canonical, &BuildInput::new(all_classes(&canonical))).expect("build")
    };
    let second = {
        let canonical = defaults();
        build(&canonical, &BuildInput::new(all_classes(&canonical))).expect("build")
    };
    assert_eq!(first.css, second.css);
}

#[test]
fn site_override_changes_prefix_end_to_end() {
    let dir = tempfile::tempdir().expect("tempdir");
    let site = dir.path().join("site.toml");
    fs::write(&site, "classPrefix = \"lc-\"\nseparator = \"_\"\n").expect("write site");

    let canonical = load_canonical(None, Some(&site)).expect("site should load");
    let classes = all_classes(&canonical);
    assert!(classes.iter().all(|class| class.contains("lc-")));
    assert!(classes.iter().any(|class| class == "md_hover_lc-flex"));

    assert!(compile_class(&canonical, "md_lc-flex").is_some());
    assert!(compile_class(&canonical, "md:flex").is_none());
}

#[test]
fn production_build_uses_scanned_content() {
    let dir = tempfile::tempdir().expect("tempdir");
    let pages = dir.path().join("pages");
    fs::create_dir_all(&pages).expect("mkdir");
    fs::write(
        pages.join("index.html"),
        r#"<main class="flex md:hover:flex not-a-utility"></main>"#,
    )
    .expect("write page");
    let site = dir.path().join("lattice.json");
    fs::write(
        &site,
        r#"{ "build": { "content": ["pages/**/*.html"], "emit": { "tokensCss": false, "base": false, "manifest": true } } }"#,
    )
    .expect("write site");

    let canonical = load_canonical(None, Some(&site)).expect("site should load");
    let options = ScanOptions {
        base_path: dir.path().to_path_buf(),
        respect_gitignore: false,
    };
    let input = content_input(canonical.config(), &options).expect("scan");
    let output = build(&canonical, &input).expect("build");

    assert_eq!(output.matched, vec!["flex".to_string(), "md:hover:flex".to_string()]);
    assert_eq!(output.unknown, vec!["not-a-utility".to_string()]);
    assert_eq!(output.warnings, vec!["unknown class: not-a-utility".to_string()]);
    assert_eq!(
        output.css,
        ".flex {\n  display: flex;\n}\n@media (min-width: 768px) {\n  .md\\:hover\\:flex:hover {\n    display: flex;\n  }\n}\n"
    );
    let manifest = output.manifest.expect("manifest");
    assert!(manifest.contains("\"files\": 1"));
}
