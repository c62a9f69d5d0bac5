//! Standard 5-field cron expressions on top of the `cron` crate
//!
//! The `cron` crate expects a leading seconds field and numbers weekdays
//! 1-7 from Sunday, while crontab numbers them 0-7 with both 0 and 7 meaning
//! Sunday. Expressions are rewritten with an explicit `0` seconds field and
//! the day-of-week field spelled out as day names.
//!
//! When both day fields are restricted, crontab fires on either match while
//! the `cron` crate needs both. Such expressions become two schedules, one per
//! day field, and fire at whichever comes first.

use std::str::FromStr;

use chrono::{DateTime, TimeZone};
use cron::Schedule;

use crate::application::errors::ConfigError;

const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// A parsed crontab-style schedule
#[derive(Debug, Clone)]
pub struct CronSchedule {
    expression: String,
    schedules: Vec<Schedule>,
}

impl CronSchedule {
    /// Parse `minute hour day-of-month month day-of-week`
    pub fn parse(expression: &str) -> Result<Self, ConfigError> {
        let fields: Vec<&str> = expression.split_whitespace().collect();
        let [minute, hour, day_of_month, month, day_of_week] = fields.as_slice() else {
            return Err(ConfigError::InvalidValue(format!(
                "cron expression \"{}\" must have 5 fields, found {}",
                expression,
                fields.len()
            )));
        };

        let day_of_week = translate_day_of_week(day_of_week)?;
        let days = if is_restricted(day_of_month) && is_restricted(&day_of_week) {
            vec![(*day_of_month, "*"), ("*", day_of_week.as_str())]
        } else {
            vec![(*day_of_month, day_of_week.as_str())]
        };

        let schedules = days
            .into_iter()
            .map(|(day_of_month, day_of_week)| {
                let translated =
                    format!("0 {} {} {} {} {}", minute, hour, day_of_month, month, day_of_week);
                Schedule::from_str(&translated).map_err(|e| {
                    ConfigError::InvalidValue(format!("cron expression \"{}\": {}", expression, e))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            expression: expression.trim().to_string(),
            schedules,
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Next firing strictly after `after`
    pub fn next_after<Z: TimeZone>(&self, after: &DateTime<Z>) -> Option<DateTime<Z>> {
        self.schedules
            .iter()
            .filter_map(|schedule| schedule.after(after).next())
            .min()
    }
}

fn is_restricted(field: &str) -> bool {
    !(field.starts_with('*') || field == "?")
}

/// Rewrite a crontab day-of-week field as a list of day names
pub fn translate_day_of_week(field: &str) -> Result<String, ConfigError> {
    if field == "*" || field == "?" {
        return Ok(field.to_string());
    }

    let mut days = [false; 7];
    for item in field.split(',') {
        let (range, step) = match item.split_once('/') {
            Some((range, step)) => {
                let step: usize = step
                    .parse()
                    .ok()
                    .filter(|s| *s > 0)
                    .ok_or_else(|| invalid_day(field))?;
                (range, Some(step))
            }
            None => (item, None),
        };

        let (start, end) = match range {
            "*" => (0, 6),
            _ => match range.split_once('-') {
                Some((a, b)) => (parse_day(a, field)?, parse_day(b, field)?),
                None => {
                    let day = parse_day(range, field)?;
                    (day, if step.is_some() { 6 } else { day })
                }
            },
        };
        if start > end {
            return Err(invalid_day(field));
        }

        for day in (start..=end).step_by(step.unwrap_or(1)) {
            days[day % 7] = true;
        }
    }

    let names: Vec<&str> = DAY_NAMES
        .iter()
        .zip(days)
        .filter_map(|(name, set)| set.then_some(*name))
        .collect();
    Ok(names.join(","))
}

fn parse_day(value: &str, field: &str) -> Result<usize, ConfigError> {
    if let Ok(n) = value.parse::<usize>() {
        return if n <= 7 { Ok(n) } else { Err(invalid_day(field)) };
    }
    let lower = value.to_lowercase();
    DAY_NAMES
        .iter()
        .position(|name| lower.get(..3).is_some_and(|prefix| name.to_lowercase() == prefix))
        .ok_or_else(|| invalid_day(field))
}

fn invalid_day(field: &str) -> ConfigError {
    ConfigError::InvalidValue(format!("day-of-week \"{}\"", field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike, Utc, Weekday};

    #[test]
    fn test_day_of_week_translation() {
        assert_eq!(translate_day_of_week("*").unwrap(), "*");
        assert_eq!(translate_day_of_week("5").unwrap(), "Fri");
        assert_eq!(translate_day_of_week("0").unwrap(), "Sun");
        assert_eq!(translate_day_of_week("7").unwrap(), "Sun");
        assert_eq!(translate_day_of_week("1-5").unwrap(), "Mon,Tue,Wed,Thu,Fri");
        assert_eq!(translate_day_of_week("5-7").unwrap(), "Sun,Fri,Sat");
        assert_eq!(translate_day_of_week("*/2").unwrap(), "Sun,Tue,Thu,Sat");
        assert_eq!(translate_day_of_week("mon,WED,fri").unwrap(), "Mon,Wed,Fri");
        assert_eq!(translate_day_of_week("3/2").unwrap(), "Wed,Fri");
    }

    #[test]
    fn test_bad_day_of_week() {
        assert!(translate_day_of_week("8").is_err());
        assert!(translate_day_of_week("5-1").is_err());
        assert!(translate_day_of_week("*/0").is_err());
        assert!(translate_day_of_week("funday").is_err());
    }

    #[test]
    fn test_daily_schedule_fires_at_nine() {
        let schedule = CronSchedule::parse("0 9 * * *").unwrap();
        let from = Utc.with_ymd_and_hms(2026, 3, 2, 10, 30, 0).unwrap();
        let next = schedule.next_after(&from).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 3, 3, 9, 0, 0).unwrap());
    }

    #[test]
    fn test_friday_schedule_lands_on_friday() {
        let schedule = CronSchedule::parse("0 18 * * 5").unwrap();
        let from = Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap();
        let next = schedule.next_after(&from).unwrap();
        assert_eq!(next.weekday(), Weekday::Fri);
        assert_eq!(next.hour(), 18);
        assert_eq!(next.minute(), 0);
    }

    #[test]
    fn test_day_fields_match_either() {
        let schedule = CronSchedule::parse("0 9 1 * 1").unwrap();

        // Tuesday the 3rd: the following Monday comes before the 1st
        let from = Utc.with_ymd_and_hms(2026, 3, 3, 10, 0, 0).unwrap();
        let next = schedule.next_after(&from).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 3, 9, 9, 0, 0).unwrap());

        // Monday the 30th after nine: April 1st is a Wednesday
        let from = Utc.with_ymd_and_hms(2026, 3, 30, 10, 0, 0).unwrap();
        let next = schedule.next_after(&from).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 4, 1, 9, 0, 0).unwrap());
    }

    #[test]
    fn test_stepped_day_of_month_still_ands_weekdays() {
        let schedule = CronSchedule::parse("0 9 */2 * 1").unwrap();
        let from = Utc.with_ymd_and_hms(2026, 3, 3, 10, 0, 0).unwrap();
        let next = schedule.next_after(&from).unwrap();
        assert_eq!(next.weekday(), Weekday::Mon);
    }

    #[test]
    fn test_field_count_is_checked() {
        assert!(CronSchedule::parse("0 0 9 * * *").is_err());
        assert!(CronSchedule::parse("9 * *").is_err());
        assert!(CronSchedule::parse("").is_err());
    }

    #[test]
    fn test_invalid_fields_are_rejected() {
        assert!(CronSchedule::parse("61 9 * * *").is_err());
        assert!(CronSchedule::parse("0 25 * * *").is_err());
        assert!(CronSchedule::parse("not a cron at all").is_err());
    }
}
