use anyhow::{anyhow, Result};
use std::time::Duration;

/// Parse a human duration string like "500ms", "5s", "2m" or "1h".
/// A bare number is read as seconds.
pub fn parse_duration(input: &str) -> Result<Duration> {
    let s = input.trim();

    if s.is_empty() {
        return Err(anyhow!("Duration string is empty"));
    }

    let parse_value = |value: &str| -> Result<u64> {
        value
            .trim()
            .parse::<u64>()
            .map_err(|_| anyhow!("Invalid duration: {}", input))
    };

    // "ms" must be checked before the single-letter suffixes.
    if let Some(value) = s.strip_suffix("ms") {
        Ok(Duration::from_millis(parse_value(value)?))
    } else if let Some(value) = s.strip_suffix('s') {
        Ok(Duration::from_secs(parse_value(value)?))
    } else if let Some(value) = s.strip_suffix('m') {
        Ok(Duration::from_secs(parse_value(value)? * 60))
    } else if let Some(value) = s.strip_suffix('h') {
        Ok(Duration::from_secs(parse_value(value)? * 60 * 60))
    } else {
        Ok(Duration::from_secs(parse_value(s)?))
    }
}

/// Render a duration back into the shortest suffix form that round-trips
/// through `parse_duration`.
pub fn format_duration(duration: &Duration) -> String {
    let millis = duration.as_millis();
    if millis == 0 || millis % 1000 != 0 {
        format!("{}ms", millis)
    } else {
        format!("{}s", duration.as_secs())
    }
}
