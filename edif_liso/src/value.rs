//! Normalisation of component values into the notation LISO accepts.

use std::sync::LazyLock;

use regex::Regex;

/// Rewrite rules, applied in order.
static RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        // whitespace
        (r"\s+", ""),
        // 1K -> 1k, 1KF -> 1k
        (r"([0-9.]+)K[FH]?", "${1}k"),
        // 1k1 -> 1.1k
        (r"([0-9])([YZEPTGMkKhdcmunpfazy])([0-9])", "${1}.${3}${2}"),
        // 1R -> 1
        (r"([0-9.]+)R", "${1}"),
        // 1pF -> 1p
        (r"([0-9.]+[YZEPTGMkKhdcmunpfazy]?)F", "${1}"),
        // 1mH -> 1m
        (r"([0-9.]+[YZEPTGMkKhdcmunpfazy]?)H", "${1}"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| (Regex::new(pattern).unwrap(), replacement))
    .collect()
});

/// Tries to rewrite a component value as LISO expects it, e.g. `4K7` becomes
/// `4.7k` and `100 nF` becomes `100n`. Values that match no rule are returned
/// unchanged.
pub fn normalize_value(value: &str) -> String {
    RULES
        .iter()
        .fold(value.to_string(), |value, (pattern, replacement)| {
            pattern.replace_all(&value, *replacement).into_owned()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace() {
        assert_eq!(normalize_value(" 10 k "), "10k");
        assert_eq!(normalize_value("100 nF"), "100n");
    }

    #[test]
    fn test_kilo() {
        assert_eq!(normalize_value("1K"), "1k");
        assert_eq!(normalize_value("2.2KF"), "2.2k");
        assert_eq!(normalize_value("3KH"), "3k");
        assert_eq!(normalize_value("10k"), "10k");
    }

    #[test]
    fn test_infix_prefix() {
        assert_eq!(normalize_value("4k7"), "4.7k");
        assert_eq!(normalize_value("4K7"), "4.7k");
        assert_eq!(normalize_value("2n2"), "2.2n");
        assert_eq!(normalize_value("1M5"), "1.5M");
    }

    #[test]
    fn test_units() {
        assert_eq!(normalize_value("100R"), "100");
        assert_eq!(normalize_value("1pF"), "1p");
        assert_eq!(normalize_value("47uF"), "47u");
        assert_eq!(normalize_value("10mH"), "10m");
        assert_eq!(normalize_value("1F"), "1");
    }

    #[test]
    fn test_unrecognised_values_are_kept() {
        assert_eq!(normalize_value("OP27"), "OP27");
        assert_eq!(normalize_value("Farad"), "Farad");
        assert_eq!(normalize_value(""), "");
    }
}
