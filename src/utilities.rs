//! Utility resolution: maps a variant-free base name to its declarations.
//!
//! Families are tried in a fixed order and the first one that both recognizes
//! the prefix and resolves the key wins. Token-backed utilities always render
//! `var(--<scale>-<key>)` references so that themes can swap values without
//! recompiling.

use crate::config::{CanonicalTokens, TokenMap};
use std::collections::BTreeMap;

static EMPTY_TOKENS: TokenMap = BTreeMap::new();

/// `(class, property, value)` for utilities that need no token lookup.
pub(crate) type Keyword = (&'static str, &'static str, &'static str);

type Matcher = fn(&str, &TokenLookup<'_>) -> Option<Vec<Declaration>>;

static MATCHERS: &[Matcher] = &[
    match_spacing,
    match_sizing,
    match_display,
    match_position,
    match_flex,
    match_grid,
    match_typography,
    match_letter_spacing,
    match_colors,
    match_background,
    match_borders,
    match_radius,
    match_shadow,
    match_opacity,
    match_z_index,
    match_overflow,
    match_visibility,
    match_object,
    match_aspect,
    match_transition,
    match_transform,
    match_interaction,
];

pub(crate) const SPACING_PREFIXES: &[(&str, &[&str])] = &[
    ("px-", &["padding-left", "padding-right"]),
    ("py-", &["padding-top", "padding-bottom"]),
    ("pt-", &["padding-top"]),
    ("pr-", &["padding-right"]),
    ("pb-", &["padding-bottom"]),
    ("pl-", &["padding-left"]),
    ("p-", &["padding"]),
    ("mx-", &["margin-left", "margin-right"]),
    ("my-", &["margin-top", "margin-bottom"]),
    ("mt-", &["margin-top"]),
    ("mr-", &["margin-right"]),
    ("mb-", &["margin-bottom"]),
    ("ml-", &["margin-left"]),
    ("m-", &["margin"]),
    ("gap-x-", &["column-gap"]),
    ("gap-y-", &["row-gap"]),
    ("gapx-", &["column-gap"]),
    ("gapy-", &["row-gap"]),
    ("gap-", &["gap"]),
];

pub(crate) const SIZE_KEYWORDS: &[&str] = &["auto", "full", "screen", "min", "max", "fit"];
pub(crate) const SIZING_PREFIXES: &[&str] = &["w-", "h-", "min-w-", "min-h-"];
pub(crate) const MAX_SIZING_PREFIXES: &[&str] = &["max-w-", "max-h-"];

pub(crate) const DISPLAY_KEYWORDS: &[Keyword] = &[
    ("block", "display", "block"),
    ("inline-block", "display", "inline-block"),
    ("inline", "display", "inline"),
    ("flex", "display", "flex"),
    ("inline-flex", "display", "inline-flex"),
    ("grid", "display", "grid"),
    ("hidden", "display", "none"),
    ("contents", "display", "contents"),
];

pub(crate) const POSITION_KEYWORDS: &[Keyword] = &[
    ("static", "position", "static"),
    ("relative", "position", "relative"),
    ("absolute", "position", "absolute"),
    ("fixed", "position", "fixed"),
    ("sticky", "position", "sticky"),
];

pub(crate) const INSET_PREFIXES: &[(&str, &[&str])] = &[
    ("inset-x-", &["left", "right"]),
    ("inset-y-", &["top", "bottom"]),
    ("inset-", &["top", "right", "bottom", "left"]),
    ("top-", &["top"]),
    ("right-", &["right"]),
    ("bottom-", &["bottom"]),
    ("left-", &["left"]),
];

pub(crate) const FLEX_KEYWORDS: &[Keyword] = &[
    ("flex-row", "flex-direction", "row"),
    ("flex-col", "flex-direction", "column"),
    ("flex-wrap", "flex-wrap", "wrap"),
    ("flex-nowrap", "flex-wrap", "nowrap"),
    ("flex-wrap-reverse", "flex-wrap", "wrap-reverse"),
    ("flex-1", "flex", "1 1 0%"),
    ("flex-auto", "flex", "1 1 auto"),
    ("flex-initial", "flex", "0 1 auto"),
    ("flex-none", "flex", "none"),
    ("grow", "flex-grow", "1"),
    ("grow-0", "flex-grow", "0"),
    ("shrink", "flex-shrink", "1"),
    ("shrink-0", "flex-shrink", "0"),
];

pub(crate) const ALIGN_VALUES: &[(&str, &str)] = &[
    ("start", "flex-start"),
    ("center", "center"),
    ("end", "flex-end"),
    ("stretch", "stretch"),
    ("baseline", "baseline"),
];

pub(crate) const JUSTIFY_VALUES: &[(&str, &str)] = &[
    ("start", "flex-start"),
    ("center", "center"),
    ("end", "flex-end"),
    ("between", "space-between"),
    ("around", "space-around"),
    ("evenly", "space-evenly"),
];

pub(crate) const ALIGN_PREFIXES: &[(&str, &str)] = &[
    ("items-", "align-items"),
    ("self-", "align-self"),
];

pub(crate) const JUSTIFY_PREFIXES: &[(&str, &str)] = &[
    ("justify-", "justify-content"),
    ("content-", "align-content"),
];

pub(crate) const GRID_TEMPLATE_PREFIXES: &[(&str, &str)] = &[
    ("grid-cols-", "grid-template-columns"),
    ("grid-rows-", "grid-template-rows"),
];

pub(crate) const GRID_SPAN_PREFIXES: &[(&str, &str)] = &[
    ("col-span-", "grid-column"),
    ("row-span-", "grid-row"),
];

pub(crate) const GRID_LINE_PREFIXES: &[(&str, &str)] = &[
    ("col-start-", "grid-column-start"),
    ("col-end-", "grid-column-end"),
    ("row-start-", "grid-row-start"),
    ("row-end-", "grid-row-end"),
];

pub(crate) const TEXT_ALIGN_VALUES: &[&str] = &["left", "center", "right", "justify"];

pub(crate) const TYPOGRAPHY_KEYWORDS: &[Keyword] = &[
    ("italic", "font-style", "italic"),
    ("not-italic", "font-style", "normal"),
    ("uppercase", "text-transform", "uppercase"),
    ("lowercase", "text-transform", "lowercase"),
    ("capitalize", "text-transform", "capitalize"),
    ("normal-case", "text-transform", "none"),
    ("underline", "text-decoration", "underline"),
    ("line-through", "text-decoration", "line-through"),
    ("no-underline", "text-decoration", "none"),
    ("list-none", "list-style", "none"),
    ("list-disc", "list-style", "disc"),
    ("list-decimal", "list-style", "decimal"),
];

pub(crate) const COLOR_PREFIXES: &[(&str, &str)] = &[
    ("bg-", "background-color"),
    ("text-", "color"),
    ("border-", "border-color"),
];

pub(crate) const BACKGROUND_KEYWORDS: &[Keyword] = &[
    ("bg-cover", "background-size", "cover"),
    ("bg-contain", "background-size", "contain"),
    ("bg-center", "background-position", "center"),
    ("bg-top", "background-position", "top"),
    ("bg-right", "background-position", "right"),
    ("bg-bottom", "background-position", "bottom"),
    ("bg-left", "background-position", "left"),
    ("bg-fixed", "background-attachment", "fixed"),
    ("bg-local", "background-attachment", "local"),
    ("bg-scroll", "background-attachment", "scroll"),
    ("bg-repeat", "background-repeat", "repeat"),
    ("bg-no-repeat", "background-repeat", "no-repeat"),
    ("bg-repeat-x", "background-repeat", "repeat-x"),
    ("bg-repeat-y", "background-repeat", "repeat-y"),
];

pub(crate) const BORDER_STYLE_KEYWORDS: &[Keyword] = &[
    ("border-solid", "border-style", "solid"),
    ("border-dashed", "border-style", "dashed"),
    ("border-dotted", "border-style", "dotted"),
    ("border-double", "border-style", "double"),
    ("border-none", "border-style", "none"),
];

/// Pixel widths available without a `borderWidth` token.
pub(crate) const LITERAL_BORDER_WIDTHS: &[&str] = &["0", "2", "4", "8"];

pub(crate) const BORDER_SIDE_PREFIXES: &[(&str, &[&str])] = &[
    ("border-x-", &["border-left-width", "border-right-width"]),
    ("border-y-", &["border-top-width", "border-bottom-width"]),
    ("border-t-", &["border-top-width"]),
    ("border-r-", &["border-right-width"]),
    ("border-b-", &["border-bottom-width"]),
    ("border-l-", &["border-left-width"]),
];

pub(crate) const RADIUS_CORNERS: &[(&str, &[&str])] = &[
    ("t", &["border-top-left-radius", "border-top-right-radius"]),
    ("b", &["border-bottom-left-radius", "border-bottom-right-radius"]),
    ("l", &["border-top-left-radius", "border-bottom-left-radius"]),
    ("r", &["border-top-right-radius", "border-bottom-right-radius"]),
    ("tl", &["border-top-left-radius"]),
    ("tr", &["border-top-right-radius"]),
    ("bl", &["border-bottom-left-radius"]),
    ("br", &["border-bottom-right-radius"]),
];

const RADIUS_FALLBACK: &[&str] = &["default", "md", "base", "sm"];
const SHADOW_FALLBACK: &[&str] = &["default", "md", "sm", "lg", "xl"];
const CONTAINER_FALLBACK: &[&str] = &["default", "lg", "xl", "md", "sm"];

pub(crate) const OVERFLOW_KEYWORDS: &[Keyword] = &[
    ("overflow-auto", "overflow", "auto"),
    ("overflow-hidden", "overflow", "hidden"),
    ("overflow-visible", "overflow", "visible"),
    ("overflow-scroll", "overflow", "scroll"),
    ("overflow-x-auto", "overflow-x", "auto"),
    ("overflow-x-hidden", "overflow-x", "hidden"),
    ("overflow-x-visible", "overflow-x", "visible"),
    ("overflow-x-scroll", "overflow-x", "scroll"),
    ("overflow-y-auto", "overflow-y", "auto"),
    ("overflow-y-hidden", "overflow-y", "hidden"),
    ("overflow-y-visible", "overflow-y", "visible"),
    ("overflow-y-scroll", "overflow-y", "scroll"),
];

pub(crate) const VISIBILITY_KEYWORDS: &[Keyword] = &[
    ("visible", "visibility", "visible"),
    ("invisible", "visibility", "hidden"),
];

pub(crate) const SR_ONLY: &str = "sr-only";

const SR_ONLY_DECLARATIONS: &[(&str, &str)] = &[
    ("position", "absolute"),
    ("width", "1px"),
    ("height", "1px"),
    ("padding", "0"),
    ("margin", "-1px"),
    ("overflow", "hidden"),
    ("clip", "rect(0, 0, 0, 0)"),
    ("white-space", "nowrap"),
    ("border", "0"),
];

pub(crate) const OBJECT_KEYWORDS: &[Keyword] = &[
    ("object-contain", "object-fit", "contain"),
    ("object-cover", "object-fit", "cover"),
    ("object-fill", "object-fit", "fill"),
    ("object-none", "object-fit", "none"),
    ("object-scale-down", "object-fit", "scale-down"),
    ("object-center", "object-position", "center"),
    ("object-top", "object-position", "top"),
    ("object-right", "object-position", "right"),
    ("object-bottom", "object-position", "bottom"),
    ("object-left", "object-position", "left"),
];

pub(crate) const TRANSITION_KEYWORDS: &[Keyword] = &[
    ("transition", "transition-property", "all"),
    (
        "transition-colors",
        "transition-property",
        "color, background-color, border-color, fill, stroke",
    ),
    ("transition-opacity", "transition-property", "opacity"),
    ("transition-transform", "transition-property", "transform"),
];

pub(crate) const TRANSLATE_PREFIXES: &[(&str, &str)] = &[
    ("translate-x-", "translateX"),
    ("translate-y-", "translateY"),
];

pub(crate) const INTERACTION_KEYWORDS: &[Keyword] = &[
    ("cursor-pointer", "cursor", "pointer"),
    ("cursor-default", "cursor", "default"),
    ("cursor-text", "cursor", "text"),
    ("cursor-not-allowed", "cursor", "not-allowed"),
    ("pointer-events-none", "pointer-events", "none"),
    ("pointer-events-auto", "pointer-events", "auto"),
    ("select-none", "user-select", "none"),
    ("select-text", "user-select", "text"),
    ("select-all", "user-select", "all"),
    ("select-auto", "user-select", "auto"),
    ("isolate", "isolation", "isolate"),
    ("isolation-auto", "isolation", "auto"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub property: &'static str,
    pub value: String,
}

impl Declaration {
    pub fn new(property: &'static str, value: impl Into<String>) -> Self {
        Self {
            property,
            value: value.into(),
        }
    }
}

/// Borrowed view of the scales and default theme maps the matchers consult.
/// Missing scales read as empty.
pub(crate) struct TokenLookup<'a> {
    space: &'a TokenMap,
    size: &'a TokenMap,
    max_width: &'a TokenMap,
    max_height: &'a TokenMap,
    container: &'a TokenMap,
    colors: &'a TokenMap,
    fonts: &'a TokenMap,
    font_size: &'a TokenMap,
    line_height: &'a TokenMap,
    font_weight: &'a TokenMap,
    letter_spacing: &'a TokenMap,
    radius: &'a TokenMap,
    border_width: &'a TokenMap,
    shadow: &'a TokenMap,
    z_index: &'a TokenMap,
    opacity: &'a TokenMap,
    aspect: &'a TokenMap,
    duration: &'a TokenMap,
    easing: &'a TokenMap,
    delay: &'a TokenMap,
    translate: &'a TokenMap,
    rotate: &'a TokenMap,
    scale: &'a TokenMap,
}

impl<'a> TokenLookup<'a> {
    pub(crate) fn new(tokens: &'a CanonicalTokens) -> Self {
        let scale = |name: &str| -> &'a TokenMap { tokens.scale(name).unwrap_or(&EMPTY_TOKENS) };
        let theme = tokens.default_theme();
        Self {
            space: scale("space"),
            size: scale("size"),
            max_width: scale("maxWidth"),
            max_height: scale("maxHeight"),
            container: scale("container"),
            colors: theme.map(|theme| &theme.colors).unwrap_or(&EMPTY_TOKENS),
            fonts: theme.map(|theme| &theme.fonts).unwrap_or(&EMPTY_TOKENS),
            font_size: scale("fontSize"),
            line_height: scale("lineHeight"),
            font_weight: scale("fontWeight"),
            letter_spacing: scale("letterSpacing"),
            radius: scale("radius"),
            border_width: scale("borderWidth"),
            shadow: scale("shadow"),
            z_index: scale("z"),
            opacity: scale("opacity"),
            aspect: scale("aspect"),
            duration: scale("duration"),
            easing: scale("easing"),
            delay: scale("delay"),
            translate: scale("translate"),
            rotate: scale("rotate"),
            scale: scale("scale"),
        }
    }
}

/// Resolves a base utility name against the token model.
pub fn resolve(base: &str, tokens: &CanonicalTokens) -> Option<Vec<Declaration>> {
    resolve_with(base, &TokenLookup::new(tokens))
}

pub(crate) fn resolve_with(base: &str, lookup: &TokenLookup<'_>) -> Option<Vec<Declaration>> {
    MATCHERS.iter().find_map(|matcher| matcher(base, lookup))
}

fn token_var(scale: &str, key: &str) -> String {
    format!("var(--{}-{})", scale, key)
}

fn single(property: &'static str, value: impl Into<String>) -> Option<Vec<Declaration>> {
    Some(vec![Declaration::new(property, value)])
}

fn spread(properties: &[&'static str], value: &str) -> Vec<Declaration> {
    properties
        .iter()
        .map(|property| Declaration::new(*property, value))
        .collect()
}

fn keyword(base: &str, table: &[Keyword]) -> Option<Vec<Declaration>> {
    table
        .iter()
        .find(|(name, _, _)| *name == base)
        .map(|&(_, property, value)| vec![Declaration::new(property, value)])
}

fn lookup_value<'t>(table: &'t [(&str, &str)], key: &str) -> Option<&'t str> {
    table
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, value)| *value)
}

/// `<prefix><key>` where `key` is in `scale`, rendered as a token reference.
fn scale_utility(
    base: &str,
    prefix: &str,
    scale: &TokenMap,
    property: &'static str,
    var_scale: &str,
) -> Option<Vec<Declaration>> {
    let key = base.strip_prefix(prefix)?;
    if !scale.contains_key(key) {
        return None;
    }
    single(property, token_var(var_scale, key))
}

fn match_spacing(base: &str, lookup: &TokenLookup<'_>) -> Option<Vec<Declaration>> {
    let (key, properties) = SPACING_PREFIXES
        .iter()
        .find_map(|&(prefix, properties)| base.strip_prefix(prefix).map(|key| (key, properties)))?;
    if key.is_empty() || !lookup.space.contains_key(key) {
        return None;
    }
    Some(spread(properties, &token_var("space", key)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Width,
    Height,
}

fn size_value(key: &str, lookup: &TokenLookup<'_>, axis: Axis) -> Option<String> {
    let value = match key {
        "auto" => "auto",
        "full" => "100%",
        "screen" if axis == Axis::Width => "100vw",
        "screen" => "100vh",
        "min" => "min-content",
        "max" => "max-content",
        "fit" => "fit-content",
        _ if lookup.size.contains_key(key) => return Some(token_var("size", key)),
        _ if lookup.space.contains_key(key) => return Some(token_var("space", key)),
        _ => return None,
    };
    Some(value.to_string())
}

fn max_size_value(key: &str, lookup: &TokenLookup<'_>, axis: Axis) -> Option<String> {
    let (scale, var_scale) = match axis {
        Axis::Width => (lookup.max_width, "max-width"),
        Axis::Height => (lookup.max_height, "max-height"),
    };
    if scale.contains_key(key) {
        return Some(token_var(var_scale, key));
    }
    size_value(key, lookup, axis)
}

fn match_sizing(base: &str, lookup: &TokenLookup<'_>) -> Option<Vec<Declaration>> {
    if base == "container" {
        let key = default_key(lookup.container, CONTAINER_FALLBACK)?;
        return Some(vec![
            Declaration::new("width", "100%"),
            Declaration::new("margin-left", "auto"),
            Declaration::new("margin-right", "auto"),
            Declaration::new("max-width", token_var("container", key)),
        ]);
    }

    let sized = [
        ("w-", "width", Axis::Width),
        ("h-", "height", Axis::Height),
        ("min-w-", "min-width", Axis::Width),
        ("min-h-", "min-height", Axis::Height),
    ];
    for (prefix, property, axis) in sized {
        if let Some(value) = base
            .strip_prefix(prefix)
            .and_then(|key| size_value(key, lookup, axis))
        {
            return single(property, value);
        }
    }

    let bounded = [
        ("max-w-", "max-width", Axis::Width),
        ("max-h-", "max-height", Axis::Height),
    ];
    for (prefix, property, axis) in bounded {
        if let Some(value) = base
            .strip_prefix(prefix)
            .and_then(|key| max_size_value(key, lookup, axis))
        {
            return single(property, value);
        }
    }

    None
}

fn match_display(base: &str, _lookup: &TokenLookup<'_>) -> Option<Vec<Declaration>> {
    keyword(base, DISPLAY_KEYWORDS)
}

fn match_position(base: &str, lookup: &TokenLookup<'_>) -> Option<Vec<Declaration>> {
    if let Some(declarations) = keyword(base, POSITION_KEYWORDS) {
        return Some(declarations);
    }
    let (key, properties) = INSET_PREFIXES
        .iter()
        .find_map(|&(prefix, properties)| base.strip_prefix(prefix).map(|key| (key, properties)))?;
    if key.is_empty() {
        return None;
    }
    let value = size_value(key, lookup, Axis::Width)?;
    Some(spread(properties, &value))
}

fn match_flex(base: &str, _lookup: &TokenLookup<'_>) -> Option<Vec<Declaration>> {
    if let Some(declarations) = keyword(base, FLEX_KEYWORDS) {
        return Some(declarations);
    }
    for &(prefix, property) in ALIGN_PREFIXES {
        if let Some(value) = base
            .strip_prefix(prefix)
            .and_then(|key| lookup_value(ALIGN_VALUES, key))
        {
            return single(property, value);
        }
    }
    for &(prefix, property) in JUSTIFY_PREFIXES {
        if let Some(value) = base
            .strip_prefix(prefix)
            .and_then(|key| lookup_value(JUSTIFY_VALUES, key))
        {
            return single(property, value);
        }
    }
    None
}

fn match_grid(base: &str, _lookup: &TokenLookup<'_>) -> Option<Vec<Declaration>> {
    for &(prefix, property) in GRID_TEMPLATE_PREFIXES {
        let Some(key) = base.strip_prefix(prefix) else {
            continue;
        };
        if key == "none" {
            return single(property, "none");
        }
        if let Some(count) = parse_positive_int(key) {
            return single(property, format!("repeat({}, minmax(0, 1fr))", count));
        }
    }
    for &(prefix, property) in GRID_SPAN_PREFIXES {
        let Some(key) = base.strip_prefix(prefix) else {
            continue;
        };
        if key == "full" {
            return single(property, "1 / -1");
        }
        if let Some(span) = parse_positive_int(key) {
            return single(property, format!("span {} / span {}", span, span));
        }
    }
    for &(prefix, property) in GRID_LINE_PREFIXES {
        if let Some(line) = base.strip_prefix(prefix).and_then(parse_positive_int) {
            return single(property, line.to_string());
        }
    }
    if let Some(value) = base
        .strip_prefix("place-items-")
        .and_then(|key| lookup_value(ALIGN_VALUES, key))
    {
        return single("place-items", value);
    }
    if let Some(value) = base
        .strip_prefix("place-content-")
        .and_then(|key| lookup_value(JUSTIFY_VALUES, key))
    {
        return single("place-content", value);
    }
    None
}

fn match_typography(base: &str, lookup: &TokenLookup<'_>) -> Option<Vec<Declaration>> {
    if let Some(key) = base.strip_prefix("text-") {
        if lookup.font_size.contains_key(key) {
            return single("font-size", token_var("font-size", key));
        }
        if lookup.colors.contains_key(key) {
            return single("color", token_var("color", key));
        }
        if TEXT_ALIGN_VALUES.iter().any(|value| *value == key) {
            return single("text-align", key);
        }
    }
    if let Some(declarations) =
        scale_utility(base, "leading-", lookup.line_height, "line-height", "line-height")
    {
        return Some(declarations);
    }
    if let Some(key) = base.strip_prefix("font-") {
        if lookup.fonts.contains_key(key) {
            return single("font-family", token_var("font", key));
        }
        if lookup.font_weight.contains_key(key) {
            return single("font-weight", token_var("font-weight", key));
        }
    }
    keyword(base, TYPOGRAPHY_KEYWORDS)
}

fn match_letter_spacing(base: &str, lookup: &TokenLookup<'_>) -> Option<Vec<Declaration>> {
    scale_utility(
        base,
        "tracking-",
        lookup.letter_spacing,
        "letter-spacing",
        "letter-spacing",
    )
}

fn match_colors(base: &str, lookup: &TokenLookup<'_>) -> Option<Vec<Declaration>> {
    COLOR_PREFIXES
        .iter()
        .find_map(|&(prefix, property)| scale_utility(base, prefix, lookup.colors, property, "color"))
}

fn match_background(base: &str, _lookup: &TokenLookup<'_>) -> Option<Vec<Declaration>> {
    keyword(base, BACKGROUND_KEYWORDS)
}

fn border_width_value(key: &str, lookup: &TokenLookup<'_>) -> Option<String> {
    if lookup.border_width.contains_key(key) {
        return Some(token_var("border-width", key));
    }
    LITERAL_BORDER_WIDTHS
        .iter()
        .any(|width| *width == key)
        .then(|| format!("{}px", key))
}

fn match_borders(base: &str, lookup: &TokenLookup<'_>) -> Option<Vec<Declaration>> {
    if base == "border" {
        return Some(vec![
            Declaration::new("border-width", "1px"),
            Declaration::new("border-style", "solid"),
        ]);
    }
    if let Some(declarations) = keyword(base, BORDER_STYLE_KEYWORDS) {
        return Some(declarations);
    }
    if let Some(key) = base.strip_prefix("border-") {
        // Color keys belong to the color family even when they also name a width.
        if lookup.colors.contains_key(key) {
            return None;
        }
        if let Some(value) = border_width_value(key, lookup) {
            return Some(vec![
                Declaration::new("border-width", value),
                Declaration::new("border-style", "solid"),
            ]);
        }
    }
    for &(prefix, properties) in BORDER_SIDE_PREFIXES {
        if let Some(value) = base
            .strip_prefix(prefix)
            .and_then(|key| border_width_value(key, lookup))
        {
            let mut declarations = spread(properties, &value);
            declarations.push(Declaration::new("border-style", "solid"));
            return Some(declarations);
        }
    }
    None
}

fn match_radius(base: &str, lookup: &TokenLookup<'_>) -> Option<Vec<Declaration>> {
    if base == "rounded" {
        let key = default_key(lookup.radius, RADIUS_FALLBACK)?;
        return single("border-radius", token_var("radius", key));
    }
    let key = base.strip_prefix("rounded-")?;
    if lookup.radius.contains_key(key) {
        return single("border-radius", token_var("radius", key));
    }
    let properties = RADIUS_CORNERS
        .iter()
        .find(|(corner, _)| *corner == key)
        .map(|&(_, properties)| properties)?;
    let fallback = default_key(lookup.radius, RADIUS_FALLBACK)?;
    Some(spread(properties, &token_var("radius", fallback)))
}

fn match_shadow(base: &str, lookup: &TokenLookup<'_>) -> Option<Vec<Declaration>> {
    if base == "shadow" {
        let key = default_key(lookup.shadow, SHADOW_FALLBACK)?;
        return single("box-shadow", token_var("shadow", key));
    }
    if let Some(declarations) = scale_utility(base, "shadow-", lookup.shadow, "box-shadow", "shadow") {
        return Some(declarations);
    }
    if base == "shadow-none" {
        return single("box-shadow", "none");
    }
    None
}

fn match_opacity(base: &str, lookup: &TokenLookup<'_>) -> Option<Vec<Declaration>> {
    scale_utility(base, "opacity-", lookup.opacity, "opacity", "opacity")
}

fn match_z_index(base: &str, lookup: &TokenLookup<'_>) -> Option<Vec<Declaration>> {
    if base == "z-auto" {
        return single("z-index", "auto");
    }
    scale_utility(base, "z-", lookup.z_index, "z-index", "z")
}

fn match_overflow(base: &str, _lookup: &TokenLookup<'_>) -> Option<Vec<Declaration>> {
    keyword(base, OVERFLOW_KEYWORDS)
}

fn match_visibility(base: &str, _lookup: &TokenLookup<'_>) -> Option<Vec<Declaration>> {
    if base == SR_ONLY {
        return Some(
            SR_ONLY_DECLARATIONS
                .iter()
                .map(|&(property, value)| Declaration::new(property, value))
                .collect(),
        );
    }
    keyword(base, VISIBILITY_KEYWORDS)
}

fn match_object(base: &str, _lookup: &TokenLookup<'_>) -> Option<Vec<Declaration>> {
    keyword(base, OBJECT_KEYWORDS)
}

fn match_aspect(base: &str, lookup: &TokenLookup<'_>) -> Option<Vec<Declaration>> {
    scale_utility(base, "aspect-", lookup.aspect, "aspect-ratio", "aspect")
}

fn match_transition(base: &str, lookup: &TokenLookup<'_>) -> Option<Vec<Declaration>> {
    keyword(base, TRANSITION_KEYWORDS)
        .or_else(|| {
            scale_utility(
                base,
                "duration-",
                lookup.duration,
                "transition-duration",
                "duration",
            )
        })
        .or_else(|| {
            scale_utility(
                base,
                "ease-",
                lookup.easing,
                "transition-timing-function",
                "easing",
            )
        })
        .or_else(|| scale_utility(base, "delay-", lookup.delay, "transition-delay", "delay"))
}

fn translate_value(key: &str, lookup: &TokenLookup<'_>) -> Option<String> {
    if lookup.translate.contains_key(key) {
        return Some(token_var("translate", key));
    }
    if lookup.space.contains_key(key) {
        return Some(token_var("space", key));
    }
    (key == "full").then(|| "100%".to_string())
}

fn match_transform(base: &str, lookup: &TokenLookup<'_>) -> Option<Vec<Declaration>> {
    for &(prefix, function) in TRANSLATE_PREFIXES {
        if let Some(value) = base
            .strip_prefix(prefix)
            .and_then(|key| translate_value(key, lookup))
        {
            return single("transform", format!("{}({})", function, value));
        }
    }
    if let Some(key) = base.strip_prefix("rotate-") {
        if lookup.rotate.contains_key(key) {
            return single("transform", format!("rotate({})", token_var("rotate", key)));
        }
    }
    if let Some(key) = base.strip_prefix("scale-") {
        if lookup.scale.contains_key(key) {
            return single("transform", format!("scale({})", token_var("scale", key)));
        }
    }
    None
}

fn match_interaction(base: &str, _lookup: &TokenLookup<'_>) -> Option<Vec<Declaration>> {
    keyword(base, INTERACTION_KEYWORDS)
}

/// Strictly positive decimal integer made only of ASCII digits.
pub(crate) fn parse_positive_int(value: &str) -> Option<u64> {
    if value.is_empty() || !value.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    value.parse::<u64>().ok().filter(|parsed| *parsed > 0)
}

/// First preferred key present in `values`, else the smallest key.
fn default_key<'a>(values: &'a TokenMap, preferred: &[&str]) -> Option<&'a str> {
    preferred
        .iter()
        .find_map(|key| values.get_key_value(*key).map(|(key, _)| key.as_str()))
        .or_else(|| values.keys().next().map(String::as_str))
}
