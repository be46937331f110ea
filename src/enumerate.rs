//! Enumerates every class string the compiler can resolve for a config.
//!
//! The base catalog mirrors the matcher tables in [`crate::utilities`]; each
//! candidate is checked against the resolver so only names that compile make
//! it into the set.

use crate::config::{Canonical, DEFAULT_GRID_COLUMNS, TokenMap};
use crate::utilities::{
    self, ALIGN_PREFIXES, ALIGN_VALUES, BACKGROUND_KEYWORDS, BORDER_SIDE_PREFIXES,
    BORDER_STYLE_KEYWORDS, COLOR_PREFIXES, DISPLAY_KEYWORDS, FLEX_KEYWORDS, GRID_LINE_PREFIXES,
    GRID_SPAN_PREFIXES, GRID_TEMPLATE_PREFIXES, INSET_PREFIXES, INTERACTION_KEYWORDS,
    JUSTIFY_PREFIXES, JUSTIFY_VALUES, Keyword, LITERAL_BORDER_WIDTHS, MAX_SIZING_PREFIXES,
    OBJECT_KEYWORDS, OVERFLOW_KEYWORDS, POSITION_KEYWORDS, RADIUS_CORNERS, SIZE_KEYWORDS,
    SIZING_PREFIXES, SPACING_PREFIXES, SR_ONLY, TEXT_ALIGN_VALUES, TokenLookup,
    TRANSITION_KEYWORDS, TRANSLATE_PREFIXES, TYPOGRAPHY_KEYWORDS, VISIBILITY_KEYWORDS,
};
use std::collections::BTreeSet;

struct Catalog {
    names: BTreeSet<String>,
}

impl Catalog {
    fn new() -> Self {
        Self {
            names: BTreeSet::new(),
        }
    }

    fn add(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !name.is_empty() {
            self.names.insert(name);
        }
    }

    fn add_all<'k>(&mut self, prefix: &str, keys: impl IntoIterator<Item = &'k str>) {
        for key in keys {
            if !key.is_empty() {
                self.add(format!("{}{}", prefix, key));
            }
        }
    }

    fn add_keywords(&mut self, table: &[Keyword]) {
        for (name, _, _) in table {
            self.add(*name);
        }
    }
}

fn keys<'a>(canonical: &'a Canonical, scale: &str) -> impl Iterator<Item = &'a str> + Clone {
    canonical
        .tokens()
        .scale(scale)
        .into_iter()
        .flat_map(TokenMap::keys)
        .map(String::as_str)
}

fn merged<'a>(groups: impl IntoIterator<Item = &'a str>) -> BTreeSet<&'a str> {
    groups.into_iter().filter(|key| !key.is_empty()).collect()
}

/// Sorted base utility names, without class prefix, that resolve against
/// the token model.
pub fn base_classes(canonical: &Canonical) -> Vec<String> {
    let tokens = canonical.tokens();
    let theme = tokens.default_theme();
    let colors = theme.into_iter().flat_map(|theme| theme.colors.keys().map(String::as_str));
    let fonts = theme.into_iter().flat_map(|theme| theme.fonts.keys().map(String::as_str));
    let mut catalog = Catalog::new();

    for (prefix, _) in SPACING_PREFIXES {
        catalog.add_all(prefix, keys(canonical, "space"));
    }

    let sizes = merged(
        SIZE_KEYWORDS
            .iter()
            .copied()
            .chain(keys(canonical, "space"))
            .chain(keys(canonical, "size")),
    );
    for prefix in SIZING_PREFIXES {
        catalog.add_all(prefix, sizes.iter().copied());
    }
    let max_width = merged(keys(canonical, "maxWidth").chain(sizes.iter().copied()));
    let max_height = merged(keys(canonical, "maxHeight").chain(sizes.iter().copied()));
    for (prefix, bounds) in MAX_SIZING_PREFIXES.iter().zip([&max_width, &max_height]) {
        catalog.add_all(prefix, bounds.iter().copied());
    }
    catalog.add("container");

    catalog.add_keywords(DISPLAY_KEYWORDS);
    catalog.add_keywords(POSITION_KEYWORDS);
    for (prefix, _) in INSET_PREFIXES {
        catalog.add_all(prefix, sizes.iter().copied());
    }

    catalog.add_keywords(FLEX_KEYWORDS);
    for (prefix, _) in ALIGN_PREFIXES {
        catalog.add_all(prefix, ALIGN_VALUES.iter().map(|(key, _)| *key));
    }
    for (prefix, _) in JUSTIFY_PREFIXES {
        catalog.add_all(prefix, JUSTIFY_VALUES.iter().map(|(key, _)| *key));
    }

    let grid_columns = match canonical.config().build.grid_columns {
        columns if columns > 0 => columns,
        _ => DEFAULT_GRID_COLUMNS,
    };
    let grid_keys = (1..=grid_columns).map(|value| value.to_string()).collect::<Vec<_>>();
    for (prefix, _) in GRID_TEMPLATE_PREFIXES {
        catalog.add(format!("{}none", prefix));
        catalog.add_all(prefix, grid_keys.iter().map(String::as_str));
    }
    for (prefix, _) in GRID_SPAN_PREFIXES {
        catalog.add(format!("{}full", prefix));
        catalog.add_all(prefix, grid_keys.iter().map(String::as_str));
    }
    for (prefix, _) in GRID_LINE_PREFIXES {
        catalog.add_all(prefix, grid_keys.iter().map(String::as_str));
    }
    catalog.add_all("place-items-", ALIGN_VALUES.iter().map(|(key, _)| *key));
    catalog.add_all("place-content-", JUSTIFY_VALUES.iter().map(|(key, _)| *key));

    catalog.add_all("text-", keys(canonical, "fontSize"));
    catalog.add_all("text-", TEXT_ALIGN_VALUES.iter().copied());
    catalog.add_all("leading-", keys(canonical, "lineHeight"));
    catalog.add_all("font-", fonts);
    catalog.add_all("font-", keys(canonical, "fontWeight"));
    catalog.add_keywords(TYPOGRAPHY_KEYWORDS);
    catalog.add_all("tracking-", keys(canonical, "letterSpacing"));

    for (prefix, _) in COLOR_PREFIXES {
        catalog.add_all(prefix, colors.clone());
    }
    catalog.add_keywords(BACKGROUND_KEYWORDS);

    catalog.add("border");
    catalog.add_keywords(BORDER_STYLE_KEYWORDS);
    let border_widths = merged(
        keys(canonical, "borderWidth").chain(LITERAL_BORDER_WIDTHS.iter().copied()),
    );
    catalog.add_all("border-", border_widths.iter().copied());
    for (prefix, _) in BORDER_SIDE_PREFIXES {
        catalog.add_all(prefix, border_widths.iter().copied());
    }

    catalog.add("rounded");
    catalog.add_all("rounded-", keys(canonical, "radius"));
    catalog.add_all("rounded-", RADIUS_CORNERS.iter().map(|(corner, _)| *corner));

    catalog.add("shadow");
    catalog.add("shadow-none");
    catalog.add_all("shadow-", keys(canonical, "shadow"));

    catalog.add_all("opacity-", keys(canonical, "opacity"));
    catalog.add("z-auto");
    catalog.add_all("z-", keys(canonical, "z"));

    catalog.add_keywords(OVERFLOW_KEYWORDS);
    catalog.add_keywords(VISIBILITY_KEYWORDS);
    catalog.add(SR_ONLY);
    catalog.add_keywords(OBJECT_KEYWORDS);
    catalog.add_all("aspect-", keys(canonical, "aspect"));

    catalog.add_keywords(TRANSITION_KEYWORDS);
    catalog.add_all("duration-", keys(canonical, "duration"));
    catalog.add_all("ease-", keys(canonical, "easing"));
    catalog.add_all("delay-", keys(canonical, "delay"));

    let translate = merged(
        keys(canonical, "translate")
            .chain(keys(canonical, "space"))
            .chain(["full"]),
    );
    for (prefix, _) in TRANSLATE_PREFIXES {
        catalog.add_all(prefix, translate.iter().copied());
    }
    catalog.add_all("rotate-", keys(canonical, "rotate"));
    catalog.add_all("scale-", keys(canonical, "scale"));

    catalog.add_keywords(INTERACTION_KEYWORDS);

    // Fallback utilities (rounded, shadow, container) and cross-family key
    // collisions only count when the resolver agrees.
    let lookup = TokenLookup::new(tokens);
    catalog
        .names
        .into_iter()
        .filter(|name| utilities::resolve_with(name, &lookup).is_some())
        .collect()
}

/// Every subset of `items`, each keeping the original order, indexed by
/// bitmask so the empty subset comes first.
pub fn ordered_subsets<T: AsRef<str>>(items: &[T]) -> Vec<Vec<&str>> {
    let count = 1usize << items.len();
    (0..count)
        .map(|mask| {
            items
                .iter()
                .enumerate()
                .filter(|(idx, _)| mask & (1usize << *idx) != 0)
                .map(|(_, item)| item.as_ref())
                .collect()
        })
        .collect()
}

/// The sorted set of every variant-qualified class the compiler resolves.
pub fn all_classes(canonical: &Canonical) -> Vec<String> {
    let config = canonical.config();
    let separator = config.separator();
    let bases = base_classes(canonical)
        .into_iter()
        .map(|base| format!("{}{}", config.class_prefix, base))
        .collect::<Vec<_>>();

    let mut responsive_options = vec![""];
    responsive_options.extend(config.variants.responsive.iter().map(String::as_str));
    let state_subsets = ordered_subsets(&config.variants.state);

    let mut classes = BTreeSet::new();
    for base in &bases {
        for responsive in &responsive_options {
            for subset in &state_subsets {
                if responsive.is_empty() && subset.is_empty() {
                    classes.insert(base.clone());
                    continue;
                }
                let mut parts = Vec::with_capacity(subset.len() + 1);
                if !responsive.is_empty() {
                    parts.push(*responsive);
                }
                parts.extend(subset.iter().copied());
                classes.insert(format!("{}{}{}", parts.join(separator), separator, base));
            }
        }
    }

    classes.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::{all_classes, base_classes, ordered_subsets};
    use crate::config::{Canonical, decode};
    use crate::generator::compile_classes;
    use serde_json::json;

    fn canonical(document: serde_json::Value) -> Canonical {
        let config = decode(document).expect("config should decode");
        config.validate().expect("config should validate");
        config.canonicalize()
    }

    fn small() -> Canonical {
        canonical(json!({
            "schemaVersion": 1,
            "breakpoints": { "md": "768px", "lg": "1024px" },
            "themes": { "default": { "colors": { "ink": "#111" } } },
            "scales": { "space": { "4": "1rem" } },
            "variants": { "responsive": ["md", "lg"], "state": ["hover", "focus"] },
            "build": { "gridColumns": 2 }
        }))
    }

    #[test]
    fn subsets_follow_bitmask_order() {
        let subsets = ordered_subsets(&["a", "b"]);
        assert_eq!(
            subsets,
            vec![vec![], vec!["a"], vec!["b"], vec!["a", "b"]]
        );
        assert_eq!(ordered_subsets::<&str>(&[]), vec![Vec::<&str>::new()]);
    }

    #[test]
    fn base_catalog_only_lists_resolvable_names() {
        let bases = base_classes(&small());
        assert!(bases.contains(&"p-4".to_string()));
        assert!(bases.contains(&"bg-ink".to_string()));
        assert!(bases.contains(&"grid-cols-2".to_string()));
        assert!(!bases.contains(&"grid-cols-3".to_string()));
        assert!(!bases.contains(&"rounded".to_string()));
        assert!(!bases.contains(&"shadow".to_string()));
        assert!(!bases.contains(&"container".to_string()));
        assert!(bases.contains(&"shadow-none".to_string()));
        assert!(bases.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn cardinality_is_bases_times_variant_combinations() {
        let canonical = small();
        let bases = base_classes(&canonical);
        let classes = all_classes(&canonical);
        assert_eq!(classes.len(), bases.len() * 3 * 4);
        assert!(classes.contains(&"p-4".to_string()));
        assert!(classes.contains(&"md:hover:focus:p-4".to_string()));
        assert!(classes.contains(&"focus:p-4".to_string()));
        assert!(!classes.iter().any(|class| class.starts_with(':')));
        assert!(classes.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn every_enumerated_class_compiles() {
        let canonical = small();
        let classes = all_classes(&canonical);
        let result = compile_classes(&canonical, &classes);
        assert!(result.unknown.is_empty(), "unknown: {:?}", result.unknown);
        assert_eq!(result.matched.len(), classes.len());
    }

    #[test]
    fn prefix_and_separator_are_applied() {
        let canonical = canonical(json!({
            "schemaVersion": 1,
            "classPrefix": "x-",
            "separator": "__",
            "breakpoints": { "md": "768px" },
            "themes": { "default": { "font": { "sans": "Inter" } } },
            "scales": { "space": { "1": "4px" } },
            "variants": { "responsive": ["md"], "state": [] }
        }));
        let classes = all_classes(&canonical);
        assert!(classes.contains(&"x-p-1".to_string()));
        assert!(classes.contains(&"md__x-p-1".to_string()));
        let result = compile_classes(&canonical, &classes);
        assert!(result.unknown.is_empty(), "unknown: {:?}", result.unknown);
    }

    #[test]
    fn zero_grid_columns_means_twelve() {
        let canonical = canonical(json!({
            "schemaVersion": 1,
            "themes": { "default": { "colors": { "ink": "#111" } } },
            "scales": { "space": { "1": "4px" } },
            "build": { "gridColumns": 0 }
        }));
        let bases = base_classes(&canonical);
        assert!(bases.contains(&"col-end-12".to_string()));
        assert!(!bases.contains(&"col-end-13".to_string()));
    }
}
