//! JSM commands

pub mod config;
pub mod date;
pub mod node;
pub mod schedule;

pub use config::ConfigArgs;
pub use date::DateArgs;
pub use node::NodeArgs;
pub use schedule::ScheduleArgs;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

/// Parse an RFC 3339 instant, or the literal `now`
pub fn parse_instant(text: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    if text.eq_ignore_ascii_case("now") {
        return Ok(now);
    }
    let instant = DateTime::parse_from_rfc3339(text)
        .with_context(|| format!("Invalid time '{}', expected RFC 3339 or 'now'", text))?;
    Ok(instant.with_timezone(&Utc))
}

/// Human readable rendering of a signed span, e.g. `-1d 02:05:30`
pub fn format_span(span: chrono::TimeDelta) -> String {
    let sign = if span < chrono::TimeDelta::zero() { "-" } else { "" };
    let total = span.num_seconds().unsigned_abs();
    let (days, rest) = (total / 86_400, total % 86_400);
    let (hours, minutes, seconds) = (rest / 3600, (rest % 3600) / 60, rest % 60);

    if days > 0 {
        format!("{}{}d {:02}:{:02}:{:02}", sign, days, hours, minutes, seconds)
    } else {
        format!("{}{:02}:{:02}:{:02}", sign, hours, minutes, seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn test_parse_instant() {
        let now = DateTime::from_timestamp(1_577_754_523, 0).unwrap();
        assert_eq!(parse_instant("now", now).unwrap(), now);
        assert_eq!(parse_instant("NOW", now).unwrap(), now);
        assert_eq!(
            parse_instant("2019-12-31T02:08:43+01:00", now).unwrap(),
            parse_instant("2019-12-31T01:08:43Z", now).unwrap()
        );
        assert!(parse_instant("yesterday", now).is_err());
    }

    #[test]
    fn test_format_span() {
        assert_eq!(format_span(TimeDelta::seconds(39_200)), "10:53:20");
        assert_eq!(format_span(TimeDelta::seconds(-163_800)), "-1d 21:30:00");
        assert_eq!(format_span(TimeDelta::zero()), "00:00:00");
    }
}
