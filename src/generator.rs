use crate::config::{Canonical, Config};
use crate::utilities::{self, Declaration, TokenLookup};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub selector: String,
    pub declarations: Vec<Declaration>,
    pub media: Option<String>,
}

/// Rules for the resolved classes plus the class partition, both in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationResult {
    pub rules: Vec<Rule>,
    pub matched: Vec<String>,
    pub unknown: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantTables {
    separator: String,
    class_prefix: String,
    responsive: BTreeMap<String, String>,
    state: BTreeSet<String>,
}

impl VariantTables {
    fn responsive_width(&self, key: &str) -> Option<&str> {
        self.responsive.get(key).map(String::as_str)
    }

    fn is_state(&self, key: &str) -> bool {
        self.state.contains(key)
    }
}

/// Responsive names without a matching breakpoint are dropped.
pub fn build_variant_tables(config: &Config) -> VariantTables {
    let responsive = config
        .variants
        .responsive
        .iter()
        .filter_map(|name| {
            config
                .breakpoints
                .get(name)
                .map(|width| (name.clone(), width.clone()))
        })
        .collect();

    VariantTables {
        separator: config.separator().to_string(),
        class_prefix: config.class_prefix.clone(),
        responsive,
        state: config.variants.state.iter().cloned().collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedClass<'a> {
    pub base: &'a str,
    pub media: Option<String>,
    pub pseudos: Vec<String>,
}

/// Splits `class` into its variant segments and prefix-stripped base.
///
/// Fails on an empty or unrecognized segment, a second responsive variant,
/// or a base that lacks the configured class prefix.
pub fn parse_variants<'a>(class: &'a str, tables: &VariantTables) -> Option<ParsedClass<'a>> {
    let mut segments = class.split(tables.separator.as_str()).collect::<Vec<_>>();
    let mut base = segments.pop()?;

    if !tables.class_prefix.is_empty() {
        base = base.strip_prefix(tables.class_prefix.as_str())?;
        if base.is_empty() {
            return None;
        }
    }

    let mut media = None;
    let mut pseudos = Vec::with_capacity(segments.len());
    for variant in segments {
        if variant.is_empty() {
            return None;
        }
        if let Some(width) = tables.responsive_width(variant) {
            if media.is_some() {
                return None;
            }
            media = Some(format!("(min-width: {})", width));
            continue;
        }
        if tables.is_state(variant) {
            pseudos.push(format!(":{}", variant));
            continue;
        }
        return None;
    }

    Some(ParsedClass {
        base,
        media,
        pseudos,
    })
}

fn generate_rule(class: &str, tables: &VariantTables, lookup: &TokenLookup<'_>) -> Option<Rule> {
    let parsed = parse_variants(class, tables)?;
    let declarations = utilities::resolve_with(parsed.base, lookup)?;

    let mut selector = format!(".{}", escape_selector(class));
    for pseudo in &parsed.pseudos {
        selector.push_str(pseudo);
    }

    Some(Rule {
        selector,
        declarations,
        media: parsed.media,
    })
}

/// Compiles one raw class string, `None` when it does not resolve.
pub fn compile_class(canonical: &Canonical, class: &str) -> Option<Rule> {
    let tables = build_variant_tables(canonical.config());
    generate_rule(class, &tables, &TokenLookup::new(canonical.tokens()))
}

pub fn compile_classes<S: AsRef<str>>(canonical: &Canonical, classes: &[S]) -> GenerationResult {
    let tables = build_variant_tables(canonical.config());
    let lookup = TokenLookup::new(canonical.tokens());
    let mut result = GenerationResult {
        rules: Vec::with_capacity(classes.len()),
        matched: Vec::with_capacity(classes.len()),
        unknown: Vec::new(),
    };

    for class in classes {
        let class = class.as_ref();
        match generate_rule(class, &tables, &lookup) {
            Some(rule) => {
                result.rules.push(rule);
                result.matched.push(class.to_string());
            }
            None => result.unknown.push(class.to_string()),
        }
    }

    debug!(
        matched = result.matched.len(),
        unknown = result.unknown.len(),
        "compiled utility classes"
    );
    result
}

pub fn emit_css(rules: &[Rule]) -> String {
    let mut css = String::new();
    for rule in rules {
        write_rule(&mut css, rule);
    }
    css
}

fn write_rule(css: &mut String, rule: &Rule) {
    match &rule.media {
        Some(media) => {
            css.push_str("@media ");
            css.push_str(media);
            css.push_str(" {\n");
            write_rule_body(css, rule, "  ");
            css.push_str("}\n");
        }
        None => write_rule_body(css, rule, ""),
    }
}

fn write_rule_body(css: &mut String, rule: &Rule, indent: &str) {
    css.push_str(indent);
    css.push_str(&rule.selector);
    css.push_str(" {\n");
    for declaration in &rule.declarations {
        css.push_str(indent);
        css.push_str("  ");
        css.push_str(declaration.property);
        css.push_str(": ");
        css.push_str(&declaration.value);
        css.push_str(";\n");
    }
    css.push_str(indent);
    css.push_str("}\n");
}

/// Escapes a raw class name for use after `.` in a selector. A leading digit
/// becomes a hex escape.
pub fn escape_selector(class: &str) -> String {
    let mut escaped = String::with_capacity(class.len() * 2);

    for (idx, ch) in class.char_indices() {
        match ch {
            ':' => escaped.push_str("\\:"),
            '.' | '/' | '%' => {
                escaped.push('\\');
                escaped.push(ch);
            }
            '0'..='9' if idx == 0 => {
                escaped.push_str("\\3");
                escaped.push(ch);
                escaped.push(' ');
            }
            _ => escaped.push(ch),
        }
    }

    escaped
}
