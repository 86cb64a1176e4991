use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};

use crate::error::{Error, Result};

/// Temporal resolution of a signal or parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeType {
    Day,
    Week,
}

impl TimeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeType::Day => "day",
            TimeType::Week => "week",
        }
    }
}

/// A CDC (MMWR) epidemiological week.
///
/// Weeks run Sunday through Saturday; week 1 of a year is the week
/// containing January 4. Formatted as `YYYYWW` (CDC format).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EpiWeek {
    year: i32,
    week: u32,
}

impl EpiWeek {
    /// Creates a week, validating the week number against the number of
    /// epi weeks in that year (52 or 53).
    pub fn new(year: i32, week: u32) -> Result<Self> {
        if !(1..=9999).contains(&year) || week < 1 || week > weeks_in_year(year) {
            return Err(Error::ParseDateOrWeek(format!("{year}{week:02}")));
        }
        Ok(Self { year, week })
    }

    /// The epi week containing the given calendar date.
    pub fn from_date(date: NaiveDate) -> Self {
        let week_start = sunday_of(date);
        // The week belongs to the year containing at least four of its days,
        // i.e. the year of its Wednesday.
        let year = (week_start + Duration::days(3)).year();
        let week = ((week_start - week1_start(year)).num_days() / 7 + 1) as u32;
        Self { year, week }
    }

    /// First day (Sunday) of this week.
    pub fn start_date(&self) -> NaiveDate {
        week1_start(self.year) + Duration::days(7 * (self.week as i64 - 1))
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn week(&self) -> u32 {
        self.week
    }

    /// CDC format: `YYYYWW`.
    pub fn cdc_format(&self) -> String {
        format!("{:04}{:02}", self.year, self.week)
    }
}

impl fmt::Display for EpiWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}{:02}", self.year, self.week)
    }
}

impl FromStr for EpiWeek {
    type Err = Error;

    /// Parses the 6-digit CDC format `YYYYWW`.
    fn from_str(s: &str) -> Result<Self> {
        let err = || Error::ParseDateOrWeek(s.to_string());
        if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }
        let year: i32 = s[..4].parse().map_err(|_| err())?;
        let week: u32 = s[4..].parse().map_err(|_| err())?;
        EpiWeek::new(year, week).map_err(|_| err())
    }
}

/// Sunday of the week containing `date`.
fn sunday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

/// Start of epi week 1: the Sunday of the week containing January 4.
fn week1_start(year: i32) -> NaiveDate {
    // Jan 4 exists for every year chrono can represent.
    let jan4 = NaiveDate::from_ymd_opt(year, 1, 4).expect("January 4 is a valid date");
    sunday_of(jan4)
}

fn weeks_in_year(year: i32) -> u32 {
    ((week1_start(year + 1) - week1_start(year)).num_days() / 7) as u32
}

/// A canonical temporal value: either a calendar date or an epi week.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpiTimeValue {
    Day(NaiveDate),
    Week(EpiWeek),
}

impl EpiTimeValue {
    /// Calendar-date view: a week maps to its start date (lossless), a date
    /// is returned unchanged.
    pub fn to_date(&self) -> NaiveDate {
        match self {
            EpiTimeValue::Day(d) => *d,
            EpiTimeValue::Week(w) => w.start_date(),
        }
    }

    /// Epi-week view: a date maps to its containing week (lossy), a week is
    /// returned unchanged.
    pub fn to_week(&self) -> EpiWeek {
        match self {
            EpiTimeValue::Day(d) => EpiWeek::from_date(*d),
            EpiTimeValue::Week(w) => *w,
        }
    }

    /// Key used to order range endpoints. Weeks sort by their start date,
    /// which keeps mixed day/week ranges well-defined.
    pub(crate) fn sort_key(&self) -> NaiveDate {
        self.to_date()
    }
}

impl fmt::Display for EpiTimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_date(self))
    }
}

/// Wire format for a temporal value: date as `YYYYMMDD`, week as `YYYYWW`.
pub fn format_date(value: &EpiTimeValue) -> String {
    match value {
        EpiTimeValue::Day(d) => d.format("%Y%m%d").to_string(),
        EpiTimeValue::Week(w) => w.cdc_format(),
    }
}

/// Parses a user-supplied date-like string by length: 6 digits is a week
/// (`YYYYWW`), 8 digits a date (`YYYYMMDD`), 10 characters an ISO date
/// (`YYYY-MM-DD`). With an `expected` kind, the parsed value is converted to
/// that kind; a 6-digit string is rejected when a day is expected.
pub fn parse_user_date_or_week(value: &str, expected: Option<TimeType>) -> Result<EpiTimeValue> {
    let err = || Error::ParseDateOrWeek(value.to_string());
    let parsed = match value.len() {
        6 => EpiTimeValue::Week(value.parse()?),
        8 => EpiTimeValue::Day(NaiveDate::parse_from_str(value, "%Y%m%d").map_err(|_| err())?),
        10 => EpiTimeValue::Day(NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| err())?),
        _ => return Err(err()),
    };
    match expected {
        None => Ok(parsed),
        Some(TimeType::Week) => Ok(EpiTimeValue::Week(parsed.to_week())),
        Some(TimeType::Day) => match parsed {
            EpiTimeValue::Day(_) => Ok(parsed),
            // A 6-digit value cannot name a single day.
            EpiTimeValue::Week(_) => Err(err()),
        },
    }
}

/// Converts an already-typed temporal value to the expected kind.
pub fn convert_to_kind(value: EpiTimeValue, expected: Option<TimeType>) -> EpiTimeValue {
    match expected {
        None => value,
        Some(TimeType::Day) => EpiTimeValue::Day(value.to_date()),
        Some(TimeType::Week) => EpiTimeValue::Week(value.to_week()),
    }
}

/// Decoder direction: `YYYYMMDD` date field. `None` on any mismatch so the
/// decoder can fall back to the raw wire value.
pub(crate) fn parse_api_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y%m%d").ok()
}

/// Decoder direction: `YYYYWW` epi week field.
pub(crate) fn parse_api_week(value: &str) -> Option<EpiWeek> {
    value.parse().ok()
}

/// Decoder direction for ambiguous fields: 6 digits is a week, anything
/// else is tried as a `YYYYMMDD` date.
pub(crate) fn parse_api_date_or_week(value: &str) -> Option<EpiTimeValue> {
    if value.len() == 6 {
        parse_api_week(value).map(EpiTimeValue::Week)
    } else {
        parse_api_date(value).map(EpiTimeValue::Day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn week_start_dates() {
        assert_eq!(EpiWeek::new(2020, 15).unwrap().start_date(), ymd(2020, 4, 5));
        assert_eq!(EpiWeek::new(2020, 1).unwrap().start_date(), ymd(2019, 12, 29));
        assert_eq!(EpiWeek::new(2021, 1).unwrap().start_date(), ymd(2021, 1, 3));
    }

    #[test]
    fn week_from_date() {
        assert_eq!(EpiWeek::from_date(ymd(2020, 4, 5)), EpiWeek::new(2020, 15).unwrap());
        assert_eq!(EpiWeek::from_date(ymd(2020, 4, 11)), EpiWeek::new(2020, 15).unwrap());
        // 2014 has 53 epi weeks; New Year's Day 2015 still belongs to it.
        assert_eq!(EpiWeek::from_date(ymd(2015, 1, 1)), EpiWeek::new(2014, 53).unwrap());
    }

    #[test]
    fn week_counts() {
        assert_eq!(weeks_in_year(2014), 53);
        assert_eq!(weeks_in_year(2015), 52);
        assert_eq!(weeks_in_year(2020), 53);
    }

    #[test]
    fn week_validation() {
        assert!(EpiWeek::new(2015, 53).is_err());
        assert!(EpiWeek::new(2014, 53).is_ok());
        assert!(EpiWeek::new(2020, 0).is_err());
        assert!(EpiWeek::new(2020, 54).is_err());
    }

    #[test]
    fn week_string_round_trip() {
        let w: EpiWeek = "202015".parse().unwrap();
        assert_eq!(w, EpiWeek::new(2020, 15).unwrap());
        assert_eq!(w.cdc_format(), "202015");
        assert!("2020015".parse::<EpiWeek>().is_err());
        assert!("20201a".parse::<EpiWeek>().is_err());
    }

    #[test]
    fn parse_by_length() {
        assert_eq!(
            parse_user_date_or_week("202015", None).unwrap(),
            EpiTimeValue::Week(EpiWeek::new(2020, 15).unwrap())
        );
        assert_eq!(
            parse_user_date_or_week("20200405", None).unwrap(),
            EpiTimeValue::Day(ymd(2020, 4, 5))
        );
        assert_eq!(
            parse_user_date_or_week("2020-04-05", None).unwrap(),
            EpiTimeValue::Day(ymd(2020, 4, 5))
        );
    }

    #[test]
    fn parse_rejects_unrecognized_shapes() {
        // Length 10 but wrong separators.
        assert!(matches!(
            parse_user_date_or_week("2020/04/05", None),
            Err(Error::ParseDateOrWeek(v)) if v == "2020/04/05"
        ));
        assert!(parse_user_date_or_week("2020405", None).is_err());
        assert!(parse_user_date_or_week("20200230", None).is_err());
        assert!(parse_user_date_or_week("", None).is_err());
    }

    #[test]
    fn parse_with_expected_kind() {
        assert_eq!(
            parse_user_date_or_week("20200405", Some(TimeType::Week)).unwrap(),
            EpiTimeValue::Week(EpiWeek::new(2020, 15).unwrap())
        );
        assert_eq!(
            parse_user_date_or_week("2020-04-05", Some(TimeType::Week)).unwrap(),
            EpiTimeValue::Week(EpiWeek::new(2020, 15).unwrap())
        );
        // Weeks cannot be narrowed to a day by parsing alone.
        assert!(parse_user_date_or_week("202015", Some(TimeType::Day)).is_err());
    }

    #[test]
    fn kind_conversions() {
        let week = EpiTimeValue::Week(EpiWeek::new(2020, 15).unwrap());
        assert_eq!(
            convert_to_kind(week, Some(TimeType::Day)),
            EpiTimeValue::Day(ymd(2020, 4, 5))
        );
        let day = EpiTimeValue::Day(ymd(2020, 4, 8));
        assert_eq!(
            convert_to_kind(day, Some(TimeType::Week)),
            EpiTimeValue::Week(EpiWeek::new(2020, 15).unwrap())
        );
    }

    #[test]
    fn format_round_trip() {
        let s = "202015";
        let v = parse_user_date_or_week(s, None).unwrap();
        assert_eq!(format_date(&v), s);
        let s = "20200405";
        let v = parse_user_date_or_week(s, None).unwrap();
        assert_eq!(format_date(&v), s);
    }

    #[test]
    fn api_direction_parsers() {
        assert_eq!(parse_api_date("20200405"), Some(ymd(2020, 4, 5)));
        assert_eq!(parse_api_date("garbage"), None);
        assert_eq!(parse_api_week("202015"), EpiWeek::new(2020, 15).ok());
        assert_eq!(
            parse_api_date_or_week("202015"),
            Some(EpiTimeValue::Week(EpiWeek::new(2020, 15).unwrap()))
        );
        assert_eq!(
            parse_api_date_or_week("20200405"),
            Some(EpiTimeValue::Day(ymd(2020, 4, 5)))
        );
        assert_eq!(parse_api_date_or_week("2020"), None);
    }
}
