use anyhow::{Context, Result};
use regex::Regex;
use std::env;
use tracing::{debug, warn};

const PLACEHOLDER_PATTERN: &str = r"\$\{(\w+)\}|\$(\w+)";

fn placeholder_regex() -> Result<Regex> {
    Regex::new(PLACEHOLDER_PATTERN).context("Invalid placeholder pattern")
}

/// Substitute environment variables in the format ${VAR_NAME} or $VAR_NAME
pub fn substitute_env_vars(content: &str) -> Result<String> {
    let re = placeholder_regex()?;
    let mut missing_vars = Vec::new();

    let result = re.replace_all(content, |caps: &regex::Captures<'_>| {
        let placeholder = &caps[0];
        let Some(var_name) = caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str()) else {
            return placeholder.to_string();
        };

        match env::var(var_name) {
            Ok(value) => {
                debug!("Substituting environment variable: {} = \"{}\"", var_name, value);
                value
            }
            Err(_) => {
                warn!("Environment variable '{}' not set", var_name);
                missing_vars.push(var_name.to_string());
                // Left in place; the validator reports it
                placeholder.to_string()
            }
        }
    });
    let result = result.into_owned();

    if !missing_vars.is_empty() {
        debug!("Environment variables not set: {:?}", missing_vars);
    }

    Ok(result)
}

/// Check if a string contains unresolved environment variable placeholders
pub fn has_unresolved_env_vars(content: &str) -> bool {
    placeholder_regex()
        .map(|re| re.is_match(content))
        .unwrap_or(false)
}
