//! A Rust client for the Delphi Epidata API.
//!
//! This crate implements an `epidatpy`-style flow: pick an endpoint, build a
//! typed call from date/epiweek parameters, fetch it, and decode the rows
//! into typed values driven by the endpoint's field metadata.
//!
//! ## Quick start
//! - Configure authentication via the `DELPHI_EPIDATA_KEY` environment
//!   variable or an `.epidatarc` file (supported in the current directory
//!   and in your home directory). Requests work without a key, rate-limited.
//! - Build a call from one of the endpoint methods on [`EpiDataContext`],
//!   then fetch it with [`EpiDataContext::json`], [`EpiDataContext::table`],
//!   [`EpiDataContext::classic`], or row-by-row with
//!   [`EpiDataContext::rows`].
//!
//! ```no_run
//! use epidata::{EpiDataContext, EpiRange, GeoType, TimeType};
//!
//! fn main() -> epidata::Result<()> {
//!     let ctx = EpiDataContext::from_env()?;
//!     let call = ctx.pub_covidcast(
//!         "fb-survey",
//!         "smoothed_cli",
//!         GeoType::State,
//!         TimeType::Day,
//!         "pa",
//!         EpiRange::new(20210405, 20210410)?,
//!         None,
//!         None,
//!         None,
//!     )?;
//!     for row in ctx.rows(&call)? {
//!         let row = row?;
//!         println!("{:?} -> {:?}", row.get("time_value"), row.get("value"));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Dates and epiweeks are supplied as integers or strings in `YYYYMMDD`,
//! `YYYY-MM-DD`, or `YYYYWW` form, as [`chrono::NaiveDate`] values, or as
//! [`EpiWeek`]s; a literal `"*"` time parameter means "all time".

#![forbid(unsafe_code)]

mod call;
mod client;
mod config;
mod decode;
mod endpoints;
mod error;
mod meta;
mod params;
mod range;
mod table;
mod temporal;
mod util;

pub use call::{EpiDataCall, FormatType};
pub use client::{ClassicResponse, EpiDataContext, RowStream};
pub use decode::{EpiDataValue, Row, decode_row};
pub use endpoints::GeoType;
pub use error::{Error, Result};
pub use meta::{EpidataFieldInfo, EpidataFieldType, FieldFilter, FieldRegistry};
pub use params::{
    EpiDateLike, EpiRangeLike, EpiRangeParam, IntParam, StringParam, format_item, format_list,
};
pub use range::EpiRange;
pub use table::{Column, ColumnValues, EpiDataTable};
pub use temporal::{EpiTimeValue, EpiWeek, TimeType, format_date, parse_user_date_or_week};
