use std::fmt;

use chrono::NaiveDate;

use crate::error::Result;
use crate::params::{EpiDateLike, EpiRangeParam};
use crate::temporal::{EpiTimeValue, TimeType, format_date};

/// A normalized `[start, end]` interval over dates or epi weeks.
///
/// Endpoints are parsed with the shared length-based inference rules and
/// silently swapped when supplied in reverse order; after construction
/// `start <= end` always holds. Callers must not rely on argument order
/// being preserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpiRange {
    pub start: EpiTimeValue,
    pub end: EpiTimeValue,
}

impl EpiRange {
    pub fn new(start: impl Into<EpiDateLike>, end: impl Into<EpiDateLike>) -> Result<Self> {
        let mut start = start.into().parse(None)?;
        let mut end = end.into().parse(None)?;
        if end.sort_key() < start.sort_key() {
            std::mem::swap(&mut start, &mut end);
        }
        Ok(Self { start, end })
    }
}

impl fmt::Display for EpiRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", format_date(&self.start), format_date(&self.end))
    }
}

/// The sentinel "all representable time" span. The wire protocol has no
/// wildcard syntax for time ranges, so a literal `"*"` is expanded to this
/// before formatting.
pub(crate) fn full_time_span(time_type: TimeType) -> EpiRange {
    let day = |y, m, d| EpiTimeValue::Day(NaiveDate::from_ymd_opt(y, m, d).expect("fixed date"));
    match time_type {
        TimeType::Day => EpiRange {
            start: day(1000, 1, 1),
            end: day(3000, 1, 1),
        },
        TimeType::Week => EpiRange {
            start: EpiTimeValue::Week(crate::temporal::EpiWeek::new(1000, 1).expect("fixed week")),
            end: EpiTimeValue::Week(crate::temporal::EpiWeek::new(3000, 1).expect("fixed week")),
        },
    }
}

/// Replaces a literal `"*"` time parameter with the fixed full span at the
/// given granularity; every other value passes through untouched.
pub(crate) fn wildcard_equivalent_dates(
    time_value: EpiRangeParam,
    time_type: TimeType,
) -> EpiRangeParam {
    if time_value.is_wildcard() {
        return EpiRangeParam::from(full_time_span(time_type));
    }
    time_value
}
