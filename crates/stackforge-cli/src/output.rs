//! Formatted output helpers for CLI commands.

use std::fmt::Display;

use stackforge_common::config::ProjectConfig;

/// A horizontal rule of `width` box-drawing characters.
#[must_use]
pub fn rule(width: usize) -> String {
    "\u{2550}".repeat(width)
}

/// Joins displayable items with `, `.
#[must_use]
pub fn join<T: Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// `yes` or `no`.
#[must_use]
pub const fn flag(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

/// Prints what a configuration asks for.
pub fn print_summary(config: &ProjectConfig) {
    let dependencies = config.managed_dependencies();
    println!("  framework:      {}", config.framework.as_str());
    println!(
        "  dependencies:   {}",
        if dependencies.is_empty() {
            "none".to_string()
        } else {
            join(&dependencies)
        }
    );
    println!("  auth:           {}", flag(config.include_auth));
    println!("  compose files:  {}", flag(config.include_docker));
    println!("  cluster files:  {}", flag(config.include_kubernetes));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_separates_with_commas() {
        assert_eq!(join(&["postgres", "redis"]), "postgres, redis");
        assert_eq!(join::<&str>(&[]), "");
    }

    #[test]
    fn rule_has_requested_width() {
        assert_eq!(rule(4).chars().count(), 4);
    }

    #[test]
    fn flag_words() {
        assert_eq!(flag(true), "yes");
        assert_eq!(flag(false), "no");
    }
}
