//! Weekly business calendar.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::PostingError;

/// A weekly window as written in a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSpec {
    /// Full weekday name, `monday` to `sunday`, in any case.
    pub weekday: String,
    /// Opening hour, 0 to 23.
    pub start_hour: u32,
    /// Opening minute, 0 to 59.
    pub start_minute: u32,
    /// Closing hour, 0 to 23.
    pub end_hour: u32,
    /// Closing minute, 0 to 59.
    pub end_minute: u32,
}

/// A validated weekly window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// Day of the week.
    pub weekday: Weekday,
    /// Opening time.
    pub start: NaiveTime,
    /// Closing time.
    pub end: NaiveTime,
}

/// A window materialized on a calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowInstance {
    /// Opening moment.
    pub start: NaiveDateTime,
    /// Closing moment.
    pub end: NaiveDateTime,
    /// Length in minutes.
    pub minutes: i64,
}

/// Weekly business calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessCalendar {
    windows: Vec<Window>,
}

impl Default for BusinessCalendar {
    /// Every day of the week, 00:00 to 23:59.
    fn default() -> Self {
        let weekdays = [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ];
        let end = NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN);
        Self {
            windows: weekdays
                .into_iter()
                .map(|weekday| Window {
                    weekday,
                    start: NaiveTime::MIN,
                    end,
                })
                .collect(),
        }
    }
}

impl BusinessCalendar {
    /// Validates window specs.
    ///
    /// # Errors
    ///
    /// Returns `PostingError::InvalidCalendar` for an unknown weekday, an hour
    /// or minute out of range, or a window that does not open before it closes.
    pub fn parse(specs: &[WindowSpec]) -> Result<Self, PostingError> {
        let windows = specs
            .iter()
            .map(Self::parse_window)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { windows })
    }

    fn parse_window(spec: &WindowSpec) -> Result<Window, PostingError> {
        let weekday = Self::weekday(&spec.weekday)
            .ok_or_else(|| PostingError::InvalidCalendar(format!("Unknown weekday: {}", spec.weekday)))?;
        let start = Self::time(spec.start_hour, spec.start_minute)?;
        let end = Self::time(spec.end_hour, spec.end_minute)?;

        if start >= end {
            return Err(PostingError::InvalidCalendar(format!(
                "Window on {weekday} must open before it closes ({start} - {end})"
            )));
        }

        Ok(Window { weekday, start, end })
    }

    /// Parses a full weekday name. Abbreviations are not weekdays here.
    fn weekday(name: &str) -> Option<Weekday> {
        match name.to_ascii_lowercase().as_str() {
            "monday" => Some(Weekday::Mon),
            "tuesday" => Some(Weekday::Tue),
            "wednesday" => Some(Weekday::Wed),
            "thursday" => Some(Weekday::Thu),
            "friday" => Some(Weekday::Fri),
            "saturday" => Some(Weekday::Sat),
            "sunday" => Some(Weekday::Sun),
            _ => None,
        }
    }

    fn time(hour: u32, minute: u32) -> Result<NaiveTime, PostingError> {
        if hour > 23 {
            return Err(PostingError::InvalidCalendar(format!(
                "Hour {hour} is out of range 0-23"
            )));
        }
        if minute > 59 {
            return Err(PostingError::InvalidCalendar(format!(
                "Minute {minute} is out of range 0-59"
            )));
        }
        NaiveTime::from_hms_opt(hour, minute, 0)
            .ok_or_else(|| PostingError::InvalidCalendar(format!("Invalid time {hour}:{minute}")))
    }

    /// Windows of the calendar.
    #[must_use]
    pub fn windows(&self) -> &[Window] {
        &self.windows
    }

    /// Materializes the windows on every date from `start` to `expiry`,
    /// both inclusive, in chronological order.
    ///
    /// # Errors
    ///
    /// Returns `PostingError::InvalidCalendar` if two instances overlap or if
    /// no window falls in the range.
    pub fn instances(
        &self,
        start: NaiveDateTime,
        expiry: NaiveDateTime,
    ) -> Result<Vec<WindowInstance>, PostingError> {
        let mut instances: Vec<WindowInstance> = start
            .date()
            .iter_days()
            .take_while(|date| *date <= expiry.date())
            .flat_map(|date| self.on(date))
            .collect();
        instances.sort_by_key(|instance| (instance.start, instance.end));

        if let Some(pair) = instances.windows(2).find(|pair| pair[0].end > pair[1].start) {
            return Err(PostingError::InvalidCalendar(format!(
                "Window ending {} overlaps window starting {}",
                pair[0].end, pair[1].start
            )));
        }

        if instances.is_empty() {
            return Err(PostingError::InvalidCalendar(format!(
                "No business window between {start} and {expiry}"
            )));
        }

        Ok(instances)
    }

    fn on(&self, date: NaiveDate) -> impl Iterator<Item = WindowInstance> + '_ {
        self.windows
            .iter()
            .filter(move |window| window.weekday == date.weekday())
            .map(move |window| {
                let start = date.and_time(window.start);
                let end = date.and_time(window.end);
                WindowInstance {
                    start,
                    end,
                    minutes: (end - start).num_minutes(),
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn spec(weekday: &str, start: (u32, u32), end: (u32, u32)) -> WindowSpec {
        WindowSpec {
            weekday: weekday.into(),
            start_hour: start.0,
            start_minute: start.1,
            end_hour: end.0,
            end_minute: end.1,
        }
    }

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        // 2024-07-01 is a Monday
        NaiveDate::from_ymd_opt(2024, 7, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_default_calendar_covers_every_day() {
        let calendar = BusinessCalendar::default();
        let instances = calendar.instances(at(1, 12), at(7, 12)).unwrap();

        assert_eq!(instances.len(), 7);
        assert!(instances.iter().all(|instance| instance.minutes == 1439));
        assert_eq!(instances[0].start, at(1, 0));
    }

    #[test]
    fn test_weekday_filter() {
        let calendar = BusinessCalendar::parse(&[
            spec("monday", (9, 0), (17, 0)),
            spec("Wednesday", (9, 30), (12, 0)),
        ])
        .unwrap();
        let instances = calendar.instances(at(1, 0), at(14, 0)).unwrap();

        assert_eq!(instances.len(), 4);
        assert_eq!(instances[0].minutes, 480);
        assert_eq!(instances[1].minutes, 150);
        assert_eq!(instances[1].start.date().weekday(), Weekday::Wed);
    }

    #[rstest]
    #[case(spec("someday", (9, 0), (17, 0)))]
    #[case(spec("mon", (9, 0), (17, 0)))]
    #[case(spec("Wed", (9, 0), (17, 0)))]
    #[case(spec("monday", (24, 0), (17, 0)))]
    #[case(spec("monday", (9, 60), (17, 0)))]
    #[case(spec("monday", (9, 0), (9, 0)))]
    #[case(spec("monday", (17, 0), (9, 0)))]
    fn test_invalid_windows(#[case] window: WindowSpec) {
        assert!(matches!(
            BusinessCalendar::parse(&[window]),
            Err(PostingError::InvalidCalendar(_))
        ));
    }

    #[test]
    fn test_overlapping_windows_rejected() {
        let calendar = BusinessCalendar::parse(&[
            spec("monday", (9, 0), (12, 0)),
            spec("monday", (11, 0), (15, 0)),
        ])
        .unwrap();
        assert!(matches!(
            calendar.instances(at(1, 0), at(2, 0)),
            Err(PostingError::InvalidCalendar(_))
        ));
    }

    #[test]
    fn test_adjacent_windows_allowed() {
        let calendar = BusinessCalendar::parse(&[
            spec("monday", (12, 0), (15, 0)),
            spec("monday", (9, 0), (12, 0)),
        ])
        .unwrap();
        let instances = calendar.instances(at(1, 0), at(1, 0)).unwrap();
        assert_eq!(instances.len(), 2);
        assert_eq!(instances[0].start, at(1, 9));
    }

    #[test]
    fn test_no_instance_in_range() {
        let calendar = BusinessCalendar::parse(&[spec("sunday", (9, 0), (17, 0))]).unwrap();
        assert!(matches!(
            calendar.instances(at(1, 0), at(5, 0)),
            Err(PostingError::InvalidCalendar(_))
        ));
    }
}
