use std::sync::OnceLock;

use regex::Regex;

use crate::error::{AppError, AppResult};

fn duration_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^PT(?:(?P<hours>\d+)H)?(?P<minutes>\d+)M$").expect("duration regex is valid")
    })
}

/// Converts an ISO-8601 recipe duration into whole minutes.
///
/// Only the two shapes recipe pages publish are accepted: `PT<m>M` and `PT<h>H<m>M`.
pub fn parse_iso_minutes(duration: &str) -> AppResult<u32> {
    let invalid = || AppError::Parse(format!("unsupported duration '{}'", duration));

    let captures = duration_pattern().captures(duration.trim()).ok_or_else(invalid)?;

    let hours: u32 = match captures.name("hours") {
        Some(h) => h.as_str().parse().map_err(|_| invalid())?,
        None => 0,
    };
    let minutes: u32 = captures["minutes"].parse().map_err(|_| invalid())?;

    hours
        .checked_mul(60)
        .and_then(|h| h.checked_add(minutes))
        .ok_or_else(invalid)
}
