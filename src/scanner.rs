use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

const CLASS_ATTRS: [&str; 2] = ["class", "className"];

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("invalid glob pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
    #[error("failed to build glob set: {0}")]
    GlobSet(#[source] globset::Error),
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    pub base_path: PathBuf,
    pub respect_gitignore: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("."),
            respect_gitignore: true,
        }
    }
}

/// Classes observed across the content files. `by_file` keys are paths
/// relative to the scan base; files without classes are left out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    pub classes: Vec<String>,
    pub counts: BTreeMap<String, usize>,
    pub by_file: BTreeMap<String, BTreeMap<String, usize>>,
    pub files: usize,
}

pub fn scan(patterns: &[String], safelist: &[String]) -> Result<ScanResult, ScanError> {
    scan_with_options(patterns, safelist, &ScanOptions::default())
}

pub fn scan_with_options(
    patterns: &[String],
    safelist: &[String],
    options: &ScanOptions,
) -> Result<ScanResult, ScanError> {
    let files = content_files(patterns, options)?;
    let mut classes = BTreeSet::new();
    let mut counts = BTreeMap::new();
    let mut by_file = BTreeMap::new();

    for path in &files {
        let text = fs::read_to_string(path).map_err(|source| ScanError::Read {
            path: path.clone(),
            source,
        })?;
        let mut file_counts = BTreeMap::new();
        for class in extract_classes(&text) {
            if !is_valid_class(&class) {
                continue;
            }
            *counts.entry(class.clone()).or_insert(0) += 1;
            *file_counts.entry(class.clone()).or_insert(0) += 1;
            classes.insert(class);
        }
        if !file_counts.is_empty() {
            by_file.insert(display_path(path, &options.base_path), file_counts);
        }
    }

    for class in safelist {
        let class = class.trim();
        if class.is_empty() || !is_valid_class(class) {
            continue;
        }
        *counts.entry(class.to_string()).or_insert(0) += 1;
        classes.insert(class.to_string());
    }

    debug!(files = files.len(), classes = classes.len(), "scanned content");
    Ok(ScanResult {
        classes: classes.into_iter().collect(),
        counts,
        by_file,
        files: files.len(),
    })
}

/// Files under `options.base_path` matching any pattern, sorted. Blank
/// patterns are skipped; no patterns means no files.
pub fn content_files(patterns: &[String], options: &ScanOptions) -> Result<Vec<PathBuf>, ScanError> {
    let patterns = patterns
        .iter()
        .map(|pattern| pattern.trim())
        .filter(|pattern| !pattern.is_empty())
        .collect::<Vec<_>>();
    if patterns.is_empty() {
        return Ok(Vec::new());
    }

    let globset = build_globset(&patterns)?;
    let mut builder = WalkBuilder::new(&options.base_path);
    builder
        .hidden(false)
        .git_ignore(options.respect_gitignore)
        .git_global(options.respect_gitignore)
        .git_exclude(options.respect_gitignore);

    let mut files = BTreeSet::new();
    for entry in builder.build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(_) => continue,
        };
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let path = entry.path();
        let relative_path = path.strip_prefix(&options.base_path).unwrap_or(path);
        if globset.is_match(relative_path) || globset.is_match(path) {
            files.insert(path.to_path_buf());
        }
    }

    Ok(files.into_iter().collect())
}

fn build_globset(patterns: &[&str]) -> Result<GlobSet, ScanError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let pattern = pattern.strip_prefix("./").unwrap_or(pattern);
        let glob = Glob::new(pattern).map_err(|source| ScanError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(ScanError::GlobSet)
}

fn display_path(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Class tokens from `class`/`className` attributes, in document order.
/// Quoted values are split on whitespace; `{{ ... }}` template actions
/// contribute the contents of their string literals.
pub fn extract_classes(text: &str) -> Vec<String> {
    let mut out = Vec::new();

    for attr in CLASS_ATTRS {
        for (idx, _) in text.match_indices(attr) {
            if !is_word_start(text, idx) {
                continue;
            }
            let mut pos = skip_whitespace(text, idx + attr.len());
            if !text[pos..].starts_with('=') {
                continue;
            }
            pos = skip_whitespace(text, pos + 1);
            let rest = &text[pos..];
            if let Some(quote) = rest.chars().next().filter(|ch| *ch == '"' || *ch == '\'') {
                if let Some(end) = rest[1..].find(quote) {
                    out.extend(split_classes(&rest[1..1 + end]));
                }
            } else if let Some(action) = rest.strip_prefix("{{") {
                if let Some(end) = action.find("}}") {
                    for literal in string_literals(&action[..end]) {
                        out.extend(split_classes(literal));
                    }
                }
            }
        }
    }

    out
}

fn is_word_start(text: &str, idx: usize) -> bool {
    text[..idx]
        .chars()
        .next_back()
        .is_none_or(|ch| !(ch.is_ascii_alphanumeric() || ch == '_'))
}

fn skip_whitespace(text: &str, idx: usize) -> usize {
    text[idx..]
        .char_indices()
        .find(|(_, ch)| !ch.is_whitespace())
        .map_or(text.len(), |(offset, _)| idx + offset)
}

/// Contents of `"..."` (with backslash escapes) and `` `...` `` literals.
fn string_literals(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut literals = Vec::new();
    let mut idx = 0usize;

    while idx < bytes.len() {
        match bytes[idx] {
            b'"' => {
                let start = idx + 1;
                let mut pos = start;
                while pos < bytes.len() && bytes[pos] != b'"' {
                    pos += if bytes[pos] == b'\\' { 2 } else { 1 };
                }
                if pos >= bytes.len() {
                    break;
                }
                literals.push(&text[start..pos]);
                idx = pos + 1;
            }
            b'`' => {
                let start = idx + 1;
                let Some(len) = text[start..].find('`') else {
                    break;
                };
                literals.push(&text[start..start + len]);
                idx = start + len + 1;
            }
            _ => idx += 1,
        }
    }

    literals
}

fn split_classes(value: &str) -> impl Iterator<Item = String> + '_ {
    value.split_whitespace().map(str::to_string)
}

/// Letters, digits, `-`, `:` and `_` only.
pub fn is_valid_class(class: &str) -> bool {
    !class.is_empty()
        && class
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | ':' | '_'))
}

/// Classes by descending count, ties broken by name.
pub fn ranked(counts: &BTreeMap<String, usize>) -> Vec<(&str, usize)> {
    let mut items = counts
        .iter()
        .map(|(class, count)| (class.as_str(), *count))
        .collect::<Vec<_>>();
    items.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    items
}

/// Human-readable scan summary: totals, the top `top` classes, and with
/// `per_file` the top classes of every file.
pub fn render_report(result: &ScanResult, top: usize, per_file: bool) -> String {
    let mut out = format!("Files: {}\nClasses: {}\n", result.files, result.classes.len());
    if top == 0 {
        return out;
    }

    let items = ranked(&result.counts);
    let limit = top.min(items.len());
    if limit > 0 {
        out.push_str(&format!("Top {}:\n", limit));
        for (class, count) in &items[..limit] {
            out.push_str(&format!("  {} ({})\n", class, count));
        }
    }

    if per_file {
        for (name, counts) in &result.by_file {
            let items = ranked(counts);
            let limit = top.min(items.len());
            if limit == 0 {
                continue;
            }
            out.push_str(&format!("{}:\n", name));
            for (class, count) in &items[..limit] {
                out.push_str(&format!("  {} ({})\n", class, count));
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::{
        ScanOptions, content_files, extract_classes, is_valid_class, render_report, scan,
        scan_with_options,
    };
    use std::fs;

    #[test]
    fn extracts_from_quoted_attributes() {
        let classes = extract_classes(
            r#"<div class="p-4  md:hover:bg-ink"></div><span className='text-sm'></span>"#,
        );
        assert_eq!(classes, vec!["p-4", "md:hover:bg-ink", "text-sm"]);
    }

    #[test]
    fn ignores_attribute_names_inside_words() {
        let classes = extract_classes(r#"<div subclass="nope" xclassName="nope2"></div>"#);
        assert!(classes.is_empty());
    }

    #[test]
    fn extracts_literals_from_template_actions() {
        let source = r#"<div class={{ pick .Active "bg-ink text-white" `p-2` }}></div>"#;
        let classes = extract_classes(source);
        assert_eq!(classes, vec!["bg-ink", "text-white", "p-2"]);

        let no_literals = extract_classes(r#"<div class={{ .Classes }}></div>"#);
        assert!(no_literals.is_empty());

        let spaced = extract_classes(r#"<a className = {{ cond "flex" "hidden" }}>"#);
        assert_eq!(spaced, vec!["flex", "hidden"]);
    }

    #[test]
    fn validates_class_characters() {
        assert!(is_valid_class("md:hover:bg-ink_2"));
        assert!(!is_valid_class("w-1/2"));
        assert!(!is_valid_class("{{.Class}}"));
        assert!(!is_valid_class(""));
    }

    #[test]
    fn scans_files_with_counts_and_safelist() {
        let dir = tempfile::tempdir().expect("tempdir");
        let pages = dir.path().join("pages");
        fs::create_dir_all(&pages).expect("mkdir");
        fs::write(
            pages.join("a.html"),
            r#"<p class="p-4 flex"></p><p class="p-4 w-1/2"></p>"#,
        )
        .expect("write a");
        fs::write(pages.join("b.html"), r#"<p class="flex"></p>"#).expect("write b");
        fs::write(pages.join("empty.html"), "<p></p>").expect("write empty");
        fs::write(dir.path().join("skip.txt"), r#"class="hidden""#).expect("write txt");

        let options = ScanOptions {
            base_path: dir.path().to_path_buf(),
            respect_gitignore: false,
        };
        let result = scan_with_options(
            &["pages/**/*.html".to_string()],
            &[" grid ".to_string(), "bad/one".to_string(), "".to_string()],
            &options,
        )
        .expect("scan");

        assert_eq!(result.files, 3);
        assert_eq!(result.classes, vec!["flex", "grid", "p-4"]);
        assert_eq!(result.counts.get("p-4"), Some(&2));
        assert_eq!(result.counts.get("flex"), Some(&2));
        assert_eq!(result.counts.get("grid"), Some(&1));
        assert_eq!(result.by_file.len(), 2);
        assert_eq!(
            result.by_file.get("pages/a.html").and_then(|counts| counts.get("p-4")),
            Some(&2)
        );
    }

    #[test]
    fn blank_patterns_yield_no_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let options = ScanOptions {
            base_path: dir.path().to_path_buf(),
            respect_gitignore: false,
        };
        let files = content_files(&["  ".to_string()], &options).expect("files");
        assert!(files.is_empty());
    }

    #[test]
    fn reports_top_classes_and_per_file_breakdown() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("x.html"), r#"<i class="b a b c"></i>"#).expect("write");
        let options = ScanOptions {
            base_path: dir.path().to_path_buf(),
            respect_gitignore: false,
        };
        let result = scan_with_options(&["*.html".to_string()], &[], &options).expect("scan");

        assert_eq!(
            render_report(&result, 2, true),
            "Files: 1\nClasses: 3\nTop 2:\n  b (2)\n  a (1)\nx.html:\n  b (2)\n  a (1)\n"
        );
        assert_eq!(render_report(&result, 0, true), "Files: 1\nClasses: 3\n");
    }

    #[test]
    fn scan_without_patterns_keeps_valid_safelist_entries() {
        let result = scan(&[], &["flex".to_string(), " flex ".to_string(), "w-1/2".to_string()])
            .expect("scan");
        assert_eq!(result.files, 0);
        assert_eq!(result.classes, vec!["flex"]);
        assert_eq!(result.counts.get("flex"), Some(&2));
        assert!(result.by_file.is_empty());
    }
}
