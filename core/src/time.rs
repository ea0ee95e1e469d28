use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};
use anyhow::{anyhow, bail, Result};

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parses a study duration into whole minutes.
/// Accepts plain minutes ("90") and unit forms ("45m", "2h", "1h30m").
pub fn parse_minutes(input: &str) -> Result<u32> {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        return Err(anyhow!("Empty duration string"));
    }

    if let Ok(minutes) = input.parse::<u32>() {
        return Ok(minutes);
    }

    let mut total: u32 = 0;
    let mut digits = String::new();
    for c in input.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let num: u32 = digits.parse().map_err(|_| anyhow!("Invalid duration number in '{}'", input))?;
        digits.clear();
        let minutes = match c {
            'h' => num.checked_mul(60),
            'm' => Some(num),
            _ => bail!("Unknown duration unit: {}", c),
        };
        total = minutes
            .and_then(|m| total.checked_add(m))
            .ok_or_else(|| anyhow!("Duration too large: {}", input))?;
    }
    if !digits.is_empty() {
        bail!("Duration '{}' is missing a unit after {}", input, digits);
    }
    Ok(total)
}

/// Parses a study date relative to `today`.
/// Keywords: today/tod, yesterday/yes, -Nd (N days ago), weekday names
/// (the most recent such day, today included), or YYYY-MM-DD.
pub fn parse_day(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    let lowered = input.trim().to_lowercase();

    match lowered.as_str() {
        "today" | "tod" => return Ok(today),
        "yesterday" | "yes" => return Ok(today - Duration::days(1)),
        _ => {}
    }

    if let Some(rest) = lowered.strip_prefix('-') {
        let num_str = rest.strip_suffix('d').unwrap_or(rest);
        let count: i64 = num_str.parse().map_err(|_| anyhow!("Invalid relative format: {}", input))?;
        return Duration::try_days(count)
            .and_then(|offset| today.checked_sub_signed(offset))
            .ok_or_else(|| anyhow!("Date out of range: {}", input));
    }

    if let Ok(weekday) = parse_weekday_str(&lowered) {
        let back = (7 + today.weekday().num_days_from_monday() as i64
            - weekday.num_days_from_monday() as i64)
            % 7;
        return Ok(today - Duration::days(back));
    }

    NaiveDate::parse_from_str(&lowered, "%Y-%m-%d").map_err(|_| anyhow!("Could not parse date: {}", input))
}

fn parse_weekday_str(s: &str) -> Result<Weekday> {
    match s {
        "mon" | "monday" => Ok(Weekday::Mon),
        "tue" | "tuesday" => Ok(Weekday::Tue),
        "wed" | "wednesday" => Ok(Weekday::Wed),
        "thu" | "thursday" => Ok(Weekday::Thu),
        "fri" | "friday" => Ok(Weekday::Fri),
        "sat" | "saturday" => Ok(Weekday::Sat),
        "sun" | "sunday" => Ok(Weekday::Sun),
        _ => Err(anyhow!("Invalid weekday")),
    }
}

/// Formats minutes as "1h 30m" (or "45m" below an hour).
pub fn format_minutes(minutes: u64) -> String {
    let (h, m) = (minutes / 60, minutes % 60);
    match (h, m) {
        (0, m) => format!("{}m", m),
        (h, 0) => format!("{}h", h),
        (h, m) => format!("{}h {}m", h, m),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_minutes() {
        assert_eq!(parse_minutes("90").unwrap(), 90);
        assert_eq!(parse_minutes("45m").unwrap(), 45);
        assert_eq!(parse_minutes("2h").unwrap(), 120);
        assert_eq!(parse_minutes("1h30m").unwrap(), 90);
        assert_eq!(parse_minutes(" 1H15M ").unwrap(), 75);

        assert!(parse_minutes("").is_err());
        assert!(parse_minutes("h").is_err());
        assert!(parse_minutes("1h30").is_err());
        assert!(parse_minutes("3d").is_err());
        assert!(parse_minutes("-5").is_err());
    }

    #[test]
    fn test_parse_day() {
        // 2026-10-15 is a Thursday
        let today = day(2026, 10, 15);
        assert_eq!(parse_day("today", today).unwrap(), today);
        assert_eq!(parse_day("yesterday", today).unwrap(), day(2026, 10, 14));
        assert_eq!(parse_day("-3d", today).unwrap(), day(2026, 10, 12));
        assert_eq!(parse_day("-10", today).unwrap(), day(2026, 10, 5));
        assert_eq!(parse_day("mon", today).unwrap(), day(2026, 10, 12));
        assert_eq!(parse_day("thu", today).unwrap(), today);
        assert_eq!(parse_day("fri", today).unwrap(), day(2026, 10, 9));
        assert_eq!(parse_day("2026-01-31", today).unwrap(), day(2026, 1, 31));

        assert!(parse_day("someday", today).is_err());
        assert!(parse_day("-xd", today).is_err());
        assert!(parse_day("-1000000000d", today).is_err());
        assert!(parse_day(&format!("-{}d", i64::MAX), today).is_err());
    }

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_minutes(0), "0m");
        assert_eq!(format_minutes(45), "45m");
        assert_eq!(format_minutes(120), "2h");
        assert_eq!(format_minutes(135), "2h 15m");
    }
}
