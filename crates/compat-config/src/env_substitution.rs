use compat_core::{CompatError, Result};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;
use std::env;

// ${VAR} or ${VAR:-default}
static ENV_VAR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)(?::-([^}]*))?\}").expect("Invalid regex pattern")
});

/// Replace environment references in every string of `value`, recursively.
/// Object keys are left untouched.
pub fn substitute_env_vars(value: &mut Value) -> Result<()> {
    match value {
        Value::String(s) => {
            if s.contains("${") {
                *s = substitute_in_string(s)?;
            }
        }
        Value::Object(map) => {
            for v in map.values_mut() {
                substitute_env_vars(v)?;
            }
        }
        Value::Array(arr) => {
            for v in arr.iter_mut() {
                substitute_env_vars(v)?;
            }
        }
        _ => {}
    }
    Ok(())
}

fn substitute_in_string(input: &str) -> Result<String> {
    let mut missing = Vec::new();

    let result = ENV_VAR_REGEX.replace_all(input, |caps: &Captures<'_>| {
        match (env::var(&caps[1]), caps.get(2)) {
            (Ok(value), _) => value,
            (Err(_), Some(default)) => default.as_str().to_string(),
            (Err(_), None) => {
                missing.push(caps[1].to_string());
                String::new()
            }
        }
    });

    if !missing.is_empty() {
        return Err(CompatError::ConfigError(format!(
            "Missing required environment variables: {}",
            missing.join(", ")
        )));
    }

    Ok(result.into_owned())
}
