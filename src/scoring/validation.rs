use std::collections::HashSet;

use super::config::ScoringConfig;
use crate::records::normalize::{DEFAULT_FALSY, DEFAULT_TRUTHY};

const MAX_DECIMALS: usize = 6;

/// Validate scoring configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_scoring(config: &ScoringConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if config.decimals > MAX_DECIMALS {
        errors.push(format!(
            "scoring.decimals: must be at most {}, got {}",
            MAX_DECIMALS, config.decimals
        ));
    }

    for (i, token) in config.truthy.iter().enumerate() {
        if token.trim().is_empty() {
            errors.push(format!("scoring.truthy[{}]: token must not be empty", i));
        }
    }
    for (i, token) in config.falsy.iter().enumerate() {
        if token.trim().is_empty() {
            errors.push(format!("scoring.falsy[{}]: token must not be empty", i));
        }
    }

    // A token on both sides would make the verdict depend on lookup order
    let truthy: HashSet<String> = DEFAULT_TRUTHY
        .iter()
        .map(|t| t.to_string())
        .chain(config.truthy.iter().map(|t| t.trim().to_lowercase()))
        .collect();
    for (i, token) in config.falsy.iter().enumerate() {
        let normalized = token.trim().to_lowercase();
        if !normalized.is_empty() && truthy.contains(&normalized) {
            errors.push(format!(
                "scoring.falsy[{}]: '{}' is already a truthy token",
                i, token
            ));
        }
    }
    for (i, token) in config.truthy.iter().enumerate() {
        let normalized = token.trim().to_lowercase();
        if DEFAULT_FALSY.contains(&normalized.as_str()) {
            errors.push(format!(
                "scoring.truthy[{}]: '{}' is already a falsy token",
                i, token
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        let config = ScoringConfig {
            truthy: vec!["correct".to_string()],
            falsy: vec!["incorrect".to_string()],
            ..ScoringConfig::default()
        };
        assert!(validate_scoring(&config).is_ok());
    }

    #[test]
    fn test_default_config() {
        assert!(validate_scoring(&ScoringConfig::default()).is_ok());
    }

    #[test]
    fn test_too_many_decimals() {
        let config = ScoringConfig {
            decimals: 12,
            ..ScoringConfig::default()
        };
        let errors = validate_scoring(&config).unwrap_err();
        assert!(errors[0].contains("scoring.decimals"));
    }

    #[test]
    fn test_empty_token() {
        let config = ScoringConfig {
            truthy: vec!["  ".to_string()],
            ..ScoringConfig::default()
        };
        let errors = validate_scoring(&config).unwrap_err();
        assert!(errors[0].contains("scoring.truthy[0]"));
    }

    #[test]
    fn test_token_on_both_sides() {
        let config = ScoringConfig {
            truthy: vec!["Sure".to_string()],
            falsy: vec!["sure".to_string()],
            ..ScoringConfig::default()
        };
        let errors = validate_scoring(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("scoring.falsy[0]"));
    }

    #[test]
    fn test_extra_truthy_conflicts_with_default_falsy() {
        let config = ScoringConfig {
            truthy: vec!["NO".to_string()],
            ..ScoringConfig::default()
        };
        let errors = validate_scoring(&config).unwrap_err();
        assert!(errors[0].contains("scoring.truthy[0]"));
    }

    #[test]
    fn test_collects_all_errors() {
        let config = ScoringConfig {
            decimals: 9,                                    // Error 1
            falsy: vec!["".to_string(), "yes".to_string()], // Errors 2, 3
            ..ScoringConfig::default()
        };
        let errors = validate_scoring(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
