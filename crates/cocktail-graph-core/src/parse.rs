//! Recipe ingredient text parser.
//!
//! Splits a multi-line ingredient blob (`dbp:ingredients` in the IBA data)
//! into raw ingredient names, stripping bullets, quantities, units, and a
//! handful of corpus-specific phrasings. Normalization into dedup keys is
//! left to [`crate::normalize`].
//!
//! Source text mixes several authoring styles:
//!
//! ```text
//! * 45 ml White Rum
//! - 1/4 barspoon Absinthe
//! • Two dashes Peychaud's Bitters
//! * to 8 mint leaves
//! ```
//!
//! Each line goes through [`line_rules`] in order; every rule sees a
//! trimmed, single-spaced line and several assume the shape left by
//! earlier ones (the `to 8` guard only makes sense once numeric
//! quantities are gone). Lines shorter than two characters after all
//! rules are dropped.
//!
//! This is a best-effort heuristic, not a grammar.

use std::sync::LazyLock;

use regex::Regex;

/// Units recognised after a leading quantity.
const UNITS: &str = "ml|cl|oz|dashes|dash|barspoon|teaspoons|teaspoon|tsp|tablespoon|tbsp|drops|drop|splash|pieces|piece|cubes|cube|slices|slice";

/// Small-number words used in phrases like `"two dashes"`.
const NUMBER_WORDS: &str = "one|two|three|four|five|six|seven|eight|nine|ten|few";

/// A single named rewrite applied to an ingredient line.
///
/// The predicate is [`applies`](LineRule::applies) and the transform is
/// [`rewrite`](LineRule::rewrite); keeping them as a table makes the order
/// dependency visible and each rule testable on its own.
pub struct LineRule {
    pub name: &'static str,
    pattern: Regex,
    replacement: &'static str,
}

impl LineRule {
    fn new(name: &'static str, pattern: &str, replacement: &'static str) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("line rule pattern must compile"),
            replacement,
        }
    }

    /// Whether this rule would change `line`.
    pub fn applies(&self, line: &str) -> bool {
        self.pattern.is_match(line)
    }

    /// Apply the rule; the result is trimmed and single-spaced.
    pub fn rewrite(&self, line: &str) -> String {
        collapse(&self.pattern.replace(line, self.replacement))
    }
}

static LINE_RULES: LazyLock<Vec<LineRule>> = LazyLock::new(|| {
    vec![
        LineRule::new("bullet", r"^[*\-•]\s*", ""),
        LineRule::new(
            "quantity",
            &format!(r"(?i)^\d+\.?\d*\s*(?:{UNITS}|of)?\s+"),
            "",
        ),
        LineRule::new(
            "fraction",
            &format!(r"(?i)^\d+/\d+\s*(?:{UNITS})?\s+"),
            "",
        ),
        LineRule::new("brand_alternation", r"(?i)^(?:(?:select|aperol|campari)/)+", ""),
        LineRule::new("numeric_artifact", r"(?i)^5\.049216E8$", ""),
        LineRule::new("splash", r"(?i)^(?:a splash of|splash of|splash)\s+", ""),
        LineRule::new(
            "bar_spoon",
            r"(?i)^(?:barspoon of|bar spoon of|bar spoons|barspoon|bar spoon)\s+",
            "",
        ),
        LineRule::new("percent", r"^(?:100\s?%|%)\s+", ""),
        LineRule::new(
            "worcestershire",
            r"(?i)^of\s+(worcestershire sauce)",
            "$1",
        ),
        LineRule::new("range_upper_bound", r"(?i)^to\s+(?:8|6|4|2|1)\s+", ""),
        LineRule::new(
            "word_dashes",
            &format!(r"(?i)^(?:{NUMBER_WORDS})\s+dash(?:es)?\s+"),
            "",
        ),
        LineRule::new(
            "word_drops",
            &format!(r"(?i)^(?:{NUMBER_WORDS})\s+drops?\s+(?:of\s+)?"),
            "",
        ),
    ]
});

/// The ordered rule table applied to every line.
pub fn line_rules() -> &'static [LineRule] {
    &LINE_RULES
}

/// Parse an ingredient blob into raw (not yet normalized) names, in
/// source order.
///
/// Returns an empty list for `None`, empty, or whitespace-only input.
pub fn parse_ingredient_lines(text: Option<&str>) -> Vec<String> {
    let Some(text) = text else {
        return Vec::new();
    };
    text.split('\n').filter_map(clean_line).collect()
}

/// Run one line through the rule table.
///
/// Returns `None` when the line is blank or reduces to at most one
/// character.
pub fn clean_line(line: &str) -> Option<String> {
    let mut current = collapse(line);
    if current.is_empty() {
        return None;
    }
    for rule in line_rules() {
        if rule.applies(&current) {
            current = rule.rewrite(&current);
        }
    }
    if current.chars().count() > 1 {
        Some(current)
    } else {
        None
    }
}

fn collapse(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(name: &str) -> &'static LineRule {
        line_rules()
            .iter()
            .find(|r| r.name == name)
            .unwrap_or_else(|| panic!("no rule named {}", name))
    }

    #[test]
    fn test_bullets_and_quantities() {
        assert_eq!(
            parse_ingredient_lines(Some("* 45 ml White Rum\n* 20 ml Lime Juice")),
            vec!["White Rum", "Lime Juice"]
        );
    }

    #[test]
    fn test_empty_inputs() {
        assert!(parse_ingredient_lines(None).is_empty());
        assert!(parse_ingredient_lines(Some("")).is_empty());
        assert!(parse_ingredient_lines(Some("  \n\t\n ")).is_empty());
    }

    #[test]
    fn test_short_lines_discarded() {
        assert!(parse_ingredient_lines(Some("* \n* x")).is_empty());
        assert!(parse_ingredient_lines(Some("-\n•\n*")).is_empty());
    }

    #[test]
    fn test_fraction() {
        assert_eq!(
            parse_ingredient_lines(Some("* 1/4 barspoon Absinthe")),
            vec!["Absinthe"]
        );
        assert_eq!(
            parse_ingredient_lines(Some("* 1 1/2 oz Bourbon")),
            vec!["Bourbon"]
        );
    }

    #[test]
    fn test_unicode_bullet_and_decimal() {
        assert_eq!(
            parse_ingredient_lines(Some("• 4.5 cl Vodka\r\n• 1.5 CL Coffee liqueur")),
            vec!["Vodka", "Coffee liqueur"]
        );
    }

    #[test]
    fn test_quantity_without_unit() {
        assert_eq!(clean_line("* 6 mint leaves").as_deref(), Some("mint leaves"));
        assert_eq!(clean_line("2 oranges").as_deref(), Some("oranges"));
    }

    #[test]
    fn test_brand_alternation_keeps_last() {
        assert_eq!(
            clean_line("* 30 ml Select/Aperol/Campari/Cynar").as_deref(),
            Some("Cynar")
        );
        assert_eq!(clean_line("* campari/Aperol").as_deref(), Some("Aperol"));
    }

    #[test]
    fn test_numeric_artifact_dropped() {
        assert_eq!(clean_line("5.049216E8"), None);
        assert!(parse_ingredient_lines(Some("* 5.049216E8\n* 2 cl Gin")) == vec!["Gin"]);
    }

    #[test]
    fn test_splash_and_bar_spoon() {
        assert_eq!(clean_line("* Splash of soda water").as_deref(), Some("soda water"));
        assert_eq!(clean_line("* a splash of Cola").as_deref(), Some("Cola"));
        assert_eq!(clean_line("* 1 splash Soda").as_deref(), Some("Soda"));
        assert_eq!(clean_line("* bar spoon of sugar").as_deref(), Some("sugar"));
        assert_eq!(clean_line("* 2 bar spoons Maraschino").as_deref(), Some("Maraschino"));
    }

    #[test]
    fn test_percent_prefix() {
        assert_eq!(
            clean_line("* 100% Agave Tequila").as_deref(),
            Some("Agave Tequila")
        );
        assert_eq!(
            clean_line("* 100 % Agave Tequila").as_deref(),
            Some("Agave Tequila")
        );
    }

    #[test]
    fn test_worcestershire_repair() {
        assert_eq!(
            clean_line("* 2 dashes of Worcestershire sauce").as_deref(),
            Some("Worcestershire sauce")
        );
    }

    #[test]
    fn test_range_upper_bound() {
        assert_eq!(clean_line("* 6 to 8 mint leaves").as_deref(), Some("mint leaves"));
        assert_eq!(clean_line("to 4 Ice cubes").as_deref(), Some("Ice cubes"));
    }

    #[test]
    fn test_number_words() {
        assert_eq!(
            clean_line("* Two dashes Peychaud's Bitters").as_deref(),
            Some("Peychaud's Bitters")
        );
        assert_eq!(
            clean_line("* Few dashes Angostura bitters").as_deref(),
            Some("Angostura bitters")
        );
        assert_eq!(clean_line("* one dash Orange bitters").as_deref(), Some("Orange bitters"));
        assert_eq!(clean_line("* Few drops of egg white").as_deref(), Some("egg white"));
        assert_eq!(clean_line("three drops Saline").as_deref(), Some("Saline"));
    }

    #[test]
    fn test_unmatched_lines_pass_through() {
        assert_eq!(clean_line("Soda water").as_deref(), Some("Soda water"));
    }

    #[test]
    fn test_rule_predicates_in_isolation() {
        assert!(rule("bullet").applies("* Gin"));
        assert!(!rule("bullet").applies("Gin"));
        assert_eq!(rule("quantity").rewrite("30 ml gin"), "gin");
        assert!(!rule("quantity").applies("1/4 barspoon Absinthe"));
        assert!(rule("fraction").applies("1/4 barspoon Absinthe"));
        assert!(!rule("range_upper_bound").applies("to 3 leaves"));
    }

    #[test]
    fn test_rule_order_is_stable() {
        let names: Vec<&str> = line_rules().iter().map(|r| r.name).collect();
        let q = names.iter().position(|n| *n == "quantity").unwrap();
        let range = names.iter().position(|n| *n == "range_upper_bound").unwrap();
        let fraction = names.iter().position(|n| *n == "fraction").unwrap();
        assert!(q < fraction);
        assert!(q < range);
        assert_eq!(names[0], "bullet");
    }
}
