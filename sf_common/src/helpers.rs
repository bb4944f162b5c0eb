/// Parse a boolean flag from a string value, or return the given default value otherwise.
pub fn parse_boolean_flag(value: Option<String>, default: bool) -> bool {
    let value = match value {
        Some(v) => v,
        None => return default,
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

/// Read an environment variable and parse it, falling back to `default` when it is missing or malformed.
/// The returned flag is `false` when the fallback was used.
pub fn parse_env_or<T: std::str::FromStr>(key: &str, default: T) -> (T, bool) {
    match std::env::var(key).ok().map(|s| s.trim().parse::<T>()) {
        Some(Ok(v)) => (v, true),
        _ => (default, false),
    }
}
