use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

const DEFAULT_CONFIG_JSON: &str = include_str!("default.json");

pub const DEFAULT_SEPARATOR: &str = ":";
pub const DEFAULT_GRID_COLUMNS: i64 = 12;
pub const DEFAULT_THEME: &str = "default";

/// Scale names in emission order. Every consumer addresses scales by these
/// canonical names.
pub const SCALE_ORDER: [&str; 21] = [
    "space",
    "size",
    "radius",
    "borderWidth",
    "fontSize",
    "lineHeight",
    "fontWeight",
    "letterSpacing",
    "shadow",
    "z",
    "opacity",
    "aspect",
    "duration",
    "easing",
    "delay",
    "translate",
    "rotate",
    "scale",
    "maxWidth",
    "maxHeight",
    "container",
];

pub type TokenMap = BTreeMap<String, String>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {label}: {message}")]
    Parse { label: String, message: String },
    #[error("decode merged config: {0}")]
    Decode(String),
    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub schema_version: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub class_prefix: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub separator: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub breakpoints: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub themes: BTreeMap<String, Theme>,
    #[serde(default, skip_serializing_if = "Fonts::is_empty")]
    pub fonts: Fonts,
    #[serde(default)]
    pub scales: Scales,
    #[serde(default)]
    pub variants: Variants,
    #[serde(default)]
    pub build: Build,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub colors: TokenMap,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub font: TokenMap,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Fonts {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub faces: Vec<FontFace>,
}

impl Fonts {
    pub fn is_empty(&self) -> bool {
        self.imports.is_empty() && self.faces.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontFace {
    #[serde(default)]
    pub family: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub style: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub weight: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub stretch: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub display: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub unicode_range: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub feature_settings: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub variation_settings: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub src: Vec<FontSource>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FontSource {
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub format: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tech: String,
}

/// Token scales as authored. A scale left out of the document stays `None`
/// so canonicalization can tell "absent" from "present but empty".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scales {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space: Option<TokenMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<TokenMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<TokenMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_width: Option<TokenMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<TokenMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<TokenMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<TokenMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<TokenMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow: Option<TokenMap>,
    #[serde(default, rename = "z", skip_serializing_if = "Option::is_none")]
    pub z_index: Option<TokenMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<TokenMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect: Option<TokenMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<TokenMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub easing: Option<TokenMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<TokenMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translate: Option<TokenMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotate: Option<TokenMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<TokenMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width: Option<TokenMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_height: Option<TokenMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<TokenMap>,
}

impl Scales {
    /// Pairs every scale with its canonical name, in [`SCALE_ORDER`].
    pub fn entries(&self) -> [(&'static str, Option<&TokenMap>); 21] {
        [
            ("space", self.space.as_ref()),
            ("size", self.size.as_ref()),
            ("radius", self.radius.as_ref()),
            ("borderWidth", self.border_width.as_ref()),
            ("fontSize", self.font_size.as_ref()),
            ("lineHeight", self.line_height.as_ref()),
            ("fontWeight", self.font_weight.as_ref()),
            ("letterSpacing", self.letter_spacing.as_ref()),
            ("shadow", self.shadow.as_ref()),
            ("z", self.z_index.as_ref()),
            ("opacity", self.opacity.as_ref()),
            ("aspect", self.aspect.as_ref()),
            ("duration", self.duration.as_ref()),
            ("easing", self.easing.as_ref()),
            ("delay", self.delay.as_ref()),
            ("translate", self.translate.as_ref()),
            ("rotate", self.rotate.as_ref()),
            ("scale", self.scale.as_ref()),
            ("maxWidth", self.max_width.as_ref()),
            ("maxHeight", self.max_height.as_ref()),
            ("container", self.container.as_ref()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Variants {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub responsive: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub state: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Build {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub safelist: Vec<String>,
    #[serde(default)]
    pub emit: EmitOptions,
    #[serde(default)]
    pub grid_columns: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub unknown_class_policy: String,
}

impl Build {
    /// Policy after validation; an unset policy means `warn`.
    pub fn policy(&self) -> UnknownClassPolicy {
        UnknownClassPolicy::parse(&self.unknown_class_policy).unwrap_or(UnknownClassPolicy::Warn)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmitOptions {
    #[serde(default)]
    pub fonts_css: bool,
    #[serde(default)]
    pub tokens_css: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<bool>,
    #[serde(default)]
    pub manifest: bool,
}

impl EmitOptions {
    pub fn base_enabled(&self) -> bool {
        self.base.unwrap_or(true)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownClassPolicy {
    Ignore,
    Warn,
    Error,
}

impl UnknownClassPolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "ignore" => Some(Self::Ignore),
            "warn" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ignore => "ignore",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for UnknownClassPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated configuration plus the token model derived from it. Never
/// mutated after construction; a reload builds a fresh value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Canonical {
    #[serde(flatten)]
    config: Config,
    tokens: CanonicalTokens,
}

impl Canonical {
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tokens(&self) -> &CanonicalTokens {
        &self.tokens
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CanonicalTokens {
    pub themes: BTreeMap<String, ThemeTokens>,
    pub scales: BTreeMap<String, TokenMap>,
}

impl CanonicalTokens {
    pub fn scale(&self, name: &str) -> Option<&TokenMap> {
        self.scales.get(name)
    }

    pub fn default_theme(&self) -> Option<&ThemeTokens> {
        self.themes.get(DEFAULT_THEME)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ThemeTokens {
    pub colors: TokenMap,
    pub fonts: TokenMap,
}

impl ThemeTokens {
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty() && self.fonts.is_empty()
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.schema_version <= 0 {
            return Err(invalid("schemaVersion is required"));
        }
        let Some(default_theme) = self.themes.get(DEFAULT_THEME) else {
            return Err(invalid("themes.default is required"));
        };
        if default_theme.colors.is_empty() && default_theme.font.is_empty() {
            return Err(invalid("themes.default must define at least one color or font"));
        }
        if self.scales.space.as_ref().is_none_or(BTreeMap::is_empty) {
            return Err(invalid("scales.space is required"));
        }
        validate_fonts(&self.fonts)?;
        if !self.build.unknown_class_policy.is_empty()
            && UnknownClassPolicy::parse(&self.build.unknown_class_policy).is_none()
        {
            return Err(invalid(
                "build.unknownClassPolicy must be one of ignore, warn, error",
            ));
        }
        if self.build.grid_columns < 0 {
            return Err(invalid("build.gridColumns must be zero or greater"));
        }
        for name in &self.variants.responsive {
            if !self.breakpoints.contains_key(name) {
                return Err(invalid(format!(
                    "variants.responsive references unknown breakpoint: {}",
                    name
                )));
            }
        }
        Ok(())
    }

    pub fn canonicalize(&self) -> Canonical {
        Canonical {
            config: self.clone(),
            tokens: normalize_tokens(self),
        }
    }

    /// Separator with the default applied.
    pub fn separator(&self) -> &str {
        if self.separator.is_empty() {
            DEFAULT_SEPARATOR
        } else {
            &self.separator
        }
    }

    fn apply_defaults(&mut self) {
        if self.separator.is_empty() {
            self.separator = DEFAULT_SEPARATOR.to_string();
        }
        if self.build.unknown_class_policy.is_empty() {
            self.build.unknown_class_policy = UnknownClassPolicy::Warn.as_str().to_string();
        }
        if self.build.emit.base.is_none() {
            self.build.emit.base = Some(true);
        }
        if self.build.grid_columns == 0 {
            self.build.grid_columns = DEFAULT_GRID_COLUMNS;
        }
    }
}

fn validate_fonts(fonts: &Fonts) -> Result<(), ConfigError> {
    for (i, face) in fonts.faces.iter().enumerate() {
        if face.family.is_empty() {
            return Err(invalid(format!("fonts.faces[{}].family is required", i)));
        }
        if face.src.is_empty() {
            return Err(invalid(format!("fonts.faces[{}].src is required", i)));
        }
        for (j, source) in face.src.iter().enumerate() {
            if source.url.is_empty() {
                return Err(invalid(format!(
                    "fonts.faces[{}].src[{}].url is required",
                    i, j
                )));
            }
        }
    }
    Ok(())
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(message.into())
}

pub fn normalize_tokens(config: &Config) -> CanonicalTokens {
    let themes = config
        .themes
        .iter()
        .map(|(name, theme)| {
            let tokens = ThemeTokens {
                colors: theme.colors.clone(),
                fonts: theme.font.clone(),
            };
            (name.clone(), tokens)
        })
        .collect();

    let scales = config
        .scales
        .entries()
        .into_iter()
        .filter_map(|(name, values)| values.map(|values| (name.to_string(), values.clone())))
        .collect();

    CanonicalTokens { themes, scales }
}

/// Deep-merges `overlay` onto `base`. Objects merge key by key, a `null`
/// overlay keeps the base value, anything else replaces it wholesale. A
/// `null` for a key the base lacks is dropped so decoding falls back to the
/// field default.
pub fn merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (_, Value::Null) => base.clone(),
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            let mut merged = base_map.clone();
            for (key, overlay_value) in overlay_map {
                let next = match merged.get(key) {
                    Some(base_value) => Some(merge(base_value, overlay_value)),
                    None => without_nulls(overlay_value),
                };
                if let Some(next) = next {
                    merged.insert(key.clone(), next);
                }
            }
            Value::Object(merged)
        }
        _ => overlay.clone(),
    }
}

fn without_nulls(value: &Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Object(map) => Some(Value::Object(
            map.iter()
                .filter_map(|(key, value)| without_nulls(value).map(|value| (key.clone(), value)))
                .collect(),
        )),
        other => Some(other.clone()),
    }
}

/// The configuration bundled with the binary, used when no base path is given.
pub fn default_json() -> &'static str {
    DEFAULT_CONFIG_JSON
}

pub fn load(base: Option<&Path>, site: Option<&Path>) -> Result<Config, ConfigError> {
    let base_value = match base {
        Some(path) => read_document(path)?,
        None => parse_json("embedded default", DEFAULT_CONFIG_JSON)?,
    };

    let merged = match site {
        Some(path) => merge(&base_value, &read_document(path)?),
        None => base_value,
    };

    decode(merged)
}

/// Loads, validates and canonicalizes in one step. Validation runs to
/// completion before any token model exists.
pub fn load_canonical(base: Option<&Path>, site: Option<&Path>) -> Result<Canonical, ConfigError> {
    let config = load(base, site)?;
    config.validate()?;
    Ok(config.canonicalize())
}

pub fn decode(value: Value) -> Result<Config, ConfigError> {
    let mut config: Config =
        serde_json::from_value(value).map_err(|err| ConfigError::Decode(err.to_string()))?;
    config.apply_defaults();
    Ok(config)
}

pub fn read_document(path: &Path) -> Result<Value, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let label = path.display().to_string();
    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    if is_toml {
        parse_toml(&label, &text)
    } else {
        parse_json(&label, &text)
    }
}

fn parse_json(label: &str, text: &str) -> Result<Value, ConfigError> {
    let value: Value = serde_json::from_str(text).map_err(|err| ConfigError::Parse {
        label: label.to_string(),
        message: err.to_string(),
    })?;
    expect_object(label, value)
}

fn parse_toml(label: &str, text: &str) -> Result<Value, ConfigError> {
    let value: Value = toml::from_str(text).map_err(|err| ConfigError::Parse {
        label: label.to_string(),
        message: err.to_string(),
    })?;
    expect_object(label, value)
}

fn expect_object(label: &str, value: Value) -> Result<Value, ConfigError> {
    if value.is_object() {
        Ok(value)
    } else {
        Err(ConfigError::Parse {
            label: label.to_string(),
            message: "top-level value must be an object".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Config, ConfigError, DEFAULT_SEPARATOR, UnknownClassPolicy, decode, load, merge,
        normalize_tokens,
    };
    use serde_json::json;
    use std::fs;

    fn minimal() -> serde_json::Value {
        json!({
            "schemaVersion": 1,
            "themes": { "default": { "colors": { "red-500": "#ef4444" } } },
            "scales": { "space": { "4": "1rem" } }
        })
    }

    fn invalid_message(config: &Config) -> String {
        match config.validate() {
            Err(ConfigError::Invalid(message)) => message,
            other => panic!("expected invalid config, got {:?}", other),
        }
    }

    #[test]
    fn merge_replaces_scalars_and_arrays() {
        let base = json!({ "a": 1, "list": [1, 2, 3], "nested": { "x": "keep", "y": "old" } });
        let overlay = json!({ "a": 2, "list": [9], "nested": { "y": "new", "z": true } });
        let merged = merge(&base, &overlay);
        assert_eq!(
            merged,
            json!({ "a": 2, "list": [9], "nested": { "x": "keep", "y": "new", "z": true } })
        );
    }

    #[test]
    fn merge_keeps_base_on_null_override() {
        let base = json!({ "separator": "__", "scales": { "space": { "1": "4px" } } });
        let overlay = json!({ "separator": null, "scales": null });
        assert_eq!(merge(&base, &overlay), base);
    }

    #[test]
    fn merge_with_empty_override_is_identity() {
        let base = minimal();
        assert_eq!(merge(&base, &json!({})), base);
    }

    #[test]
    fn merge_type_mismatch_takes_override() {
        let base = json!({ "scales": { "space": { "1": "4px" } } });
        let overlay = json!({ "scales": "none" });
        assert_eq!(merge(&base, &overlay), json!({ "scales": "none" }));
        let back = merge(&overlay, &base);
        assert_eq!(back, base);
    }

    #[test]
    fn decode_applies_defaults() {
        let config = decode(minimal()).expect("config should decode");
        assert_eq!(config.separator, DEFAULT_SEPARATOR);
        assert_eq!(config.build.policy(), UnknownClassPolicy::Warn);
        assert!(config.build.emit.base_enabled());
        assert_eq!(config.build.grid_columns, 12);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_missing_schema_version() {
        let mut value = minimal();
        value["schemaVersion"] = json!(0);
        let config = decode(value).expect("config should decode");
        assert_eq!(invalid_message(&config), "schemaVersion is required");
    }

    #[test]
    fn validate_rejects_missing_default_theme() {
        let mut value = minimal();
        value["themes"] = json!({ "dark": { "colors": { "bg": "#000" } } });
        let config = decode(value).expect("config should decode");
        assert_eq!(invalid_message(&config), "themes.default is required");
    }

    #[test]
    fn validate_rejects_empty_default_theme() {
        let mut value = minimal();
        value["themes"] = json!({ "default": {} });
        let config = decode(value).expect("config should decode");
        assert!(invalid_message(&config).starts_with("themes.default"));
    }

    #[test]
    fn validate_rejects_empty_space_scale() {
        let mut value = minimal();
        value["scales"] = json!({ "space": {} });
        let config = decode(value).expect("config should decode");
        assert_eq!(invalid_message(&config), "scales.space is required");
    }

    #[test]
    fn validate_rejects_unknown_policy() {
        let mut value = minimal();
        value["build"] = json!({ "unknownClassPolicy": "loud" });
        let config = decode(value).expect("config should decode");
        assert_eq!(
            invalid_message(&config),
            "build.unknownClassPolicy must be one of ignore, warn, error"
        );
    }

    #[test]
    fn validate_rejects_unknown_breakpoint_reference() {
        let mut value = minimal();
        value["breakpoints"] = json!({ "md": "768px" });
        value["variants"] = json!({ "responsive": ["md", "xl"] });
        let config = decode(value).expect("config should decode");
        assert_eq!(
            invalid_message(&config),
            "variants.responsive references unknown breakpoint: xl"
        );
    }

    #[test]
    fn validate_rejects_font_face_without_source() {
        let mut value = minimal();
        value["fonts"] = json!({ "faces": [{ "family": "Inter" }] });
        let config = decode(value).expect("config should decode");
        assert_eq!(invalid_message(&config), "fonts.faces[0].src is required");
    }

    #[test]
    fn canonical_tokens_omit_absent_scales() {
        let mut value = minimal();
        value["scales"]["radius"] = json!({});
        value["scales"]["z"] = json!({ "10": "10" });
        let config = decode(value).expect("config should decode");
        let tokens = normalize_tokens(&config);
        let names = tokens.scales.keys().cloned().collect::<Vec<_>>();
        assert_eq!(names, vec!["radius", "space", "z"]);
        assert!(tokens.scales["radius"].is_empty());
        assert_eq!(tokens.scales["z"]["10"], "10");
        assert_eq!(tokens.themes["default"].colors["red-500"], "#ef4444");
    }

    #[test]
    fn canonical_is_a_copy() {
        let mut config = decode(minimal()).expect("config should decode");
        let canonical = config.canonicalize();
        config
            .scales
            .space
            .get_or_insert_default()
            .insert("8".to_string(), "2rem".to_string());
        assert!(!canonical.tokens().scales["space"].contains_key("8"));
        assert!(!canonical.config().scales.space.as_ref().is_some_and(|s| s.contains_key("8")));
    }

    #[test]
    fn embedded_default_is_valid() {
        let config = load(None, None).expect("embedded config should load");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn loads_site_override_from_json_and_toml() {
        let dir = tempfile::tempdir().expect("tempdir");
        let json_path = dir.path().join("lattice.json");
        fs::write(&json_path, r#"{ "classPrefix": "lt-", "separator": "_" }"#).expect("write");
        let config = load(None, Some(&json_path)).expect("json override should load");
        assert_eq!(config.class_prefix, "lt-");
        assert_eq!(config.separator, "_");

        let toml_path = dir.path().join("lattice.toml");
        fs::write(
            &toml_path,
            "[build]\nunknownClassPolicy = \"error\"\n\n[scales.space]\n\"4\" = \"1.5rem\"\n",
        )
        .expect("write");
        let config = load(None, Some(&toml_path)).expect("toml override should load");
        assert_eq!(config.build.policy(), UnknownClassPolicy::Error);
        let space = config.scales.space.expect("space scale");
        assert_eq!(space["4"], "1.5rem");
    }

    #[test]
    fn null_for_key_missing_from_base_falls_back_to_default() {
        let merged = merge(
            &json!({ "a": 1 }),
            &json!({ "b": null, "c": { "d": null, "e": 2 } }),
        );
        assert_eq!(merged, json!({ "a": 1, "c": { "e": 2 } }));

        let dir = tempfile::tempdir().expect("tempdir");
        let site = dir.path().join("lattice.json");
        fs::write(&site, r#"{ "classPrefix": null, "fonts": { "imports": null } }"#)
            .expect("write");
        let config = load(None, Some(&site)).expect("null override should load");
        assert_eq!(config.class_prefix, "");
        assert!(config.fonts.imports.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn reports_unreadable_and_malformed_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            load(None, Some(&missing)),
            Err(ConfigError::Read { .. })
        ));

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{ not json").expect("write");
        let err = load(None, Some(&broken)).expect_err("malformed json should fail");
        assert!(err.to_string().contains("broken.json"));

        let array = dir.path().join("array.json");
        fs::write(&array, "[1, 2]").expect("write");
        assert!(matches!(
            load(None, Some(&array)),
            Err(ConfigError::Parse { .. })
        ));
    }
}
