use crate::config::{Canonical, Config, DEFAULT_THEME, FontSource, SCALE_ORDER, ThemeTokens, TokenMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub const MANIFEST_FILE_NAME: &str = "manifest.json";

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to create directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TokenEntry {
    name: String,
    value: String,
}

/// Renders the token model as custom properties: one `:root` block with every
/// scale followed by the default theme, then one `[data-theme]` block per
/// other non-empty theme.
pub fn tokens_css(canonical: &Canonical) -> String {
    let tokens = canonical.tokens();
    let mut entries = Vec::new();
    for scale in SCALE_ORDER {
        if let Some(values) = tokens.scale(scale).filter(|values| !values.is_empty()) {
            append_token_map(&mut entries, scale_prefix(scale), values);
        }
    }
    if let Some(theme) = tokens.default_theme() {
        append_theme_tokens(&mut entries, theme);
    }

    let mut css = String::new();
    write_block(&mut css, ":root", &entries);

    for (name, theme) in &tokens.themes {
        if name == DEFAULT_THEME {
            continue;
        }
        let mut theme_entries = Vec::new();
        append_theme_tokens(&mut theme_entries, theme);
        if theme_entries.is_empty() {
            continue;
        }
        css.push('\n');
        write_block(&mut css, &format!("[data-theme=\"{}\"]", name), &theme_entries);
    }

    css
}

fn write_block(css: &mut String, selector: &str, entries: &[TokenEntry]) {
    css.push_str(selector);
    css.push_str(" {\n");
    for entry in entries {
        css.push_str("  ");
        css.push_str(&entry.name);
        css.push_str(": ");
        css.push_str(&entry.value);
        css.push_str(";\n");
    }
    css.push_str("}\n");
}

fn append_theme_tokens(entries: &mut Vec<TokenEntry>, theme: &ThemeTokens) {
    append_token_map(entries, "color", &theme.colors);
    append_token_map(entries, "font", &theme.fonts);
}

fn append_token_map(entries: &mut Vec<TokenEntry>, prefix: &str, values: &TokenMap) {
    // TokenMap is ordered, so keys come out sorted.
    entries.extend(values.iter().map(|(key, value)| TokenEntry {
        name: format!("--{}-{}", prefix, key),
        value: value.clone(),
    }));
}

/// Kebab-case custom property prefix for a canonical scale name.
pub fn scale_prefix(scale: &str) -> &str {
    match scale {
        "borderWidth" => "border-width",
        "fontSize" => "font-size",
        "lineHeight" => "line-height",
        "fontWeight" => "font-weight",
        "letterSpacing" => "letter-spacing",
        "maxWidth" => "max-width",
        "maxHeight" => "max-height",
        other => other,
    }
}

/// `@import` lines and `@font-face` blocks for the configured fonts. Empty
/// when nothing is configured.
pub fn fonts_css(config: &Config) -> String {
    let fonts = &config.fonts;
    let mut css = String::new();

    for url in &fonts.imports {
        if url.trim().is_empty() {
            continue;
        }
        css.push_str(&format!("@import url(\"{}\");\n", url));
    }

    for face in &fonts.faces {
        if face.family.trim().is_empty() || face.src.is_empty() {
            continue;
        }
        css.push_str("@font-face {\n");
        css.push_str(&format!("  font-family: \"{}\";\n", face.family));
        push_optional(&mut css, "font-style", &face.style);
        push_optional(&mut css, "font-weight", &face.weight);
        push_optional(&mut css, "font-stretch", &face.stretch);
        push_optional(&mut css, "font-display", &face.display);
        css.push_str(&format!("  src: {};\n", font_sources(&face.src)));
        push_optional(&mut css, "unicode-range", &face.unicode_range);
        push_optional(&mut css, "font-feature-settings", &face.feature_settings);
        push_optional(&mut css, "font-variation-settings", &face.variation_settings);
        css.push_str("}\n");
    }

    css
}

fn push_optional(css: &mut String, property: &str, value: &str) {
    if value.trim().is_empty() {
        return;
    }
    css.push_str(&format!("  {}: {};\n", property, value));
}

fn font_sources(sources: &[FontSource]) -> String {
    sources
        .iter()
        .filter(|source| !source.url.trim().is_empty())
        .map(|source| {
            let mut entry = format!("url(\"{}\")", source.url);
            if !source.format.trim().is_empty() {
                entry.push_str(&format!(" format(\"{}\")", source.format));
            }
            if !source.tech.trim().is_empty() {
                entry.push_str(&format!(" tech(\"{}\")", source.tech));
            }
            entry
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Writes `contents` to `path`, creating parent directories first.
pub fn write_text(path: &Path, contents: &str) -> Result<(), OutputError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| OutputError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, contents).map_err(|source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    })
}

pub fn manifest_path(out: &Path) -> PathBuf {
    match out.parent() {
        Some(parent) => parent.join(MANIFEST_FILE_NAME),
        None => PathBuf::from(MANIFEST_FILE_NAME),
    }
}

/// Writes the stylesheet to `out` and the manifest to `manifest.json` beside
/// it. Nothing is written when both are empty.
pub fn write_artifacts(css: &str, manifest: Option<&str>, out: &Path) -> Result<(), OutputError> {
    let manifest = manifest.filter(|manifest| !manifest.is_empty());
    if css.is_empty() && manifest.is_none() {
        return Ok(());
    }
    if !css.is_empty() {
        write_text(out, css)?;
        info!(path = %out.display(), bytes = css.len(), "wrote stylesheet");
    }
    if let Some(manifest) = manifest {
        let path = manifest_path(out);
        write_text(&path, manifest)?;
        info!(path = %path.display(), "wrote manifest");
    }
    Ok(())
}
