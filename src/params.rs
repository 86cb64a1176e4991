use std::fmt;

use chrono::NaiveDate;

use crate::error::Result;
use crate::range::EpiRange;
use crate::temporal::{EpiTimeValue, EpiWeek, TimeType, parse_user_date_or_week};

/// A raw user-supplied date-like value, before parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum EpiDateLike {
    Int(i64),
    Text(String),
    Date(NaiveDate),
    Week(EpiWeek),
}

impl EpiDateLike {
    /// Parses into a canonical temporal value using the shared length-based
    /// inference rules. Already-typed values pass through, converted to the
    /// expected kind when one is given.
    pub fn parse(&self, expected: Option<TimeType>) -> Result<EpiTimeValue> {
        match self {
            EpiDateLike::Date(d) => Ok(crate::temporal::convert_to_kind(
                EpiTimeValue::Day(*d),
                expected,
            )),
            EpiDateLike::Week(w) => Ok(crate::temporal::convert_to_kind(
                EpiTimeValue::Week(*w),
                expected,
            )),
            EpiDateLike::Int(i) => parse_user_date_or_week(&i.to_string(), expected),
            EpiDateLike::Text(s) => parse_user_date_or_week(s, expected),
        }
    }

    /// Wire form. Typed values use the canonical `YYYYMMDD`/`YYYYWW`
    /// formats; raw ints and strings are passed through verbatim.
    pub fn format(&self) -> String {
        match self {
            EpiDateLike::Int(i) => i.to_string(),
            EpiDateLike::Text(s) => s.clone(),
            EpiDateLike::Date(d) => d.format("%Y%m%d").to_string(),
            EpiDateLike::Week(w) => w.cdc_format(),
        }
    }
}

impl From<i64> for EpiDateLike {
    fn from(v: i64) -> Self {
        EpiDateLike::Int(v)
    }
}

impl From<i32> for EpiDateLike {
    fn from(v: i32) -> Self {
        EpiDateLike::Int(v as i64)
    }
}

impl From<&str> for EpiDateLike {
    fn from(v: &str) -> Self {
        EpiDateLike::Text(v.to_string())
    }
}

impl From<String> for EpiDateLike {
    fn from(v: String) -> Self {
        EpiDateLike::Text(v)
    }
}

impl From<NaiveDate> for EpiDateLike {
    fn from(v: NaiveDate) -> Self {
        EpiDateLike::Date(v)
    }
}

impl From<EpiWeek> for EpiDateLike {
    fn from(v: EpiWeek) -> Self {
        EpiDateLike::Week(v)
    }
}

impl From<EpiTimeValue> for EpiDateLike {
    fn from(v: EpiTimeValue) -> Self {
        match v {
            EpiTimeValue::Day(d) => EpiDateLike::Date(d),
            EpiTimeValue::Week(w) => EpiDateLike::Week(w),
        }
    }
}

/// One item of a request parameter: a scalar, a range, or a `{from, to}`
/// mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum EpiRangeLike {
    Value(EpiDateLike),
    Range(EpiRange),
    /// Unlike [`EpiRange`], the `from`/`to` pair is formatted verbatim and
    /// never reordered.
    FromTo {
        from: EpiDateLike,
        to: EpiDateLike,
    },
}

impl<T: Into<EpiDateLike>> From<T> for EpiRangeLike {
    fn from(v: T) -> Self {
        EpiRangeLike::Value(v.into())
    }
}

impl From<EpiRange> for EpiRangeLike {
    fn from(v: EpiRange) -> Self {
        EpiRangeLike::Range(v)
    }
}

/// A full parameter value: one item or a list of items.
#[derive(Debug, Clone, PartialEq)]
pub enum EpiRangeParam {
    One(EpiRangeLike),
    List(Vec<EpiRangeLike>),
}

impl EpiRangeParam {
    /// Builds a list parameter from anything convertible to items.
    pub fn list<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<EpiRangeLike>,
    {
        EpiRangeParam::List(items.into_iter().map(Into::into).collect())
    }

    /// True if this is the literal `"*"` wildcard scalar.
    pub(crate) fn is_wildcard(&self) -> bool {
        matches!(
            self,
            EpiRangeParam::One(EpiRangeLike::Value(EpiDateLike::Text(s))) if s == "*"
        )
    }
}

impl<T: Into<EpiRangeLike>> From<T> for EpiRangeParam {
    fn from(v: T) -> Self {
        EpiRangeParam::One(v.into())
    }
}

impl From<Vec<EpiRangeLike>> for EpiRangeParam {
    fn from(v: Vec<EpiRangeLike>) -> Self {
        EpiRangeParam::List(v)
    }
}

impl From<Vec<EpiRange>> for EpiRangeParam {
    fn from(v: Vec<EpiRange>) -> Self {
        EpiRangeParam::list(v)
    }
}

impl From<Vec<&str>> for EpiRangeParam {
    fn from(v: Vec<&str>) -> Self {
        EpiRangeParam::list(v)
    }
}

impl From<Vec<i64>> for EpiRangeParam {
    fn from(v: Vec<i64>) -> Self {
        EpiRangeParam::list(v)
    }
}

impl From<StringParam> for EpiRangeParam {
    fn from(v: StringParam) -> Self {
        match v {
            StringParam::One(s) => EpiRangeParam::One(EpiRangeLike::Value(EpiDateLike::Text(s))),
            StringParam::List(l) => EpiRangeParam::list(l),
        }
    }
}

impl From<IntParam> for EpiRangeParam {
    fn from(v: IntParam) -> Self {
        match v {
            IntParam::One(i) => EpiRangeParam::One(EpiRangeLike::Value(EpiDateLike::Int(i))),
            IntParam::List(l) => EpiRangeParam::list(l),
        }
    }
}

/// A string-valued parameter: one string or a list of strings.
#[derive(Debug, Clone, PartialEq)]
pub enum StringParam {
    One(String),
    List(Vec<String>),
}

impl From<&str> for StringParam {
    fn from(v: &str) -> Self {
        StringParam::One(v.to_string())
    }
}

impl From<String> for StringParam {
    fn from(v: String) -> Self {
        StringParam::One(v)
    }
}

impl From<Vec<&str>> for StringParam {
    fn from(v: Vec<&str>) -> Self {
        StringParam::List(v.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for StringParam {
    fn from(v: Vec<String>) -> Self {
        StringParam::List(v)
    }
}

impl<const N: usize> From<[&str; N]> for StringParam {
    fn from(v: [&str; N]) -> Self {
        StringParam::List(v.iter().map(|s| s.to_string()).collect())
    }
}

/// An integer-valued parameter: one integer or a list of integers.
#[derive(Debug, Clone, PartialEq)]
pub enum IntParam {
    One(i64),
    List(Vec<i64>),
}

impl From<i64> for IntParam {
    fn from(v: i64) -> Self {
        IntParam::One(v)
    }
}

impl From<i32> for IntParam {
    fn from(v: i32) -> Self {
        IntParam::One(v as i64)
    }
}

impl From<Vec<i64>> for IntParam {
    fn from(v: Vec<i64>) -> Self {
        IntParam::List(v)
    }
}

/// Casts one value or range to its wire string.
pub fn format_item(value: &EpiRangeLike) -> String {
    match value {
        EpiRangeLike::Value(v) => v.format(),
        EpiRangeLike::Range(r) => r.to_string(),
        EpiRangeLike::FromTo { from, to } => format!("{}-{}", from.format(), to.format()),
    }
}

/// Turns a parameter into a comma-separated wire string, preserving item
/// order.
pub fn format_list(values: &EpiRangeParam) -> String {
    match values {
        EpiRangeParam::One(v) => format_item(v),
        EpiRangeParam::List(l) => l.iter().map(format_item).collect::<Vec<_>>().join(","),
    }
}

impl fmt::Display for EpiRangeParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_list(self))
    }
}
