//! # Report Windows
//!
//! Time windows and output types for sales reporting.
//!
//! ## Window Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Half-open window [start, end)                                          │
//! │                                                                         │
//! │   start                                              end                │
//! │     ●━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━○                 │
//! │     included                                   excluded                 │
//! │                                                                         │
//! │  today          = [local midnight, local midnight + 24h)                │
//! │  dates(a, b)    = [local midnight of a, local midnight of b + 24h)      │
//! │                   (the end date is inclusive as a calendar day)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Windows are built from a time zone so the arithmetic stays pure; the
//! `today()`/`from_dates()` shorthands use the machine's local zone.

use chrono::{DateTime, Duration, Local, LocalResult, NaiveDate, NaiveTime, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::validation::ValidationResult;

/// Format accepted for calendar dates supplied by callers.
pub const CALENDAR_DATE_FORMAT: &str = "%Y-%m-%d";

// =============================================================================
// Report Window
// =============================================================================

/// A half-open `[start, end)` interval over sale timestamps.
///
/// Deserialization goes through [`ReportWindow::new`], so an inverted
/// window can't be built from JSON either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawWindow")]
pub struct ReportWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

/// Unchecked wire form of a window.
#[derive(Deserialize)]
struct RawWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TryFrom<RawWindow> for ReportWindow {
    type Error = CoreError;

    fn try_from(raw: RawWindow) -> CoreResult<Self> {
        ReportWindow::new(raw.start, raw.end)
    }
}

impl ReportWindow {
    /// Creates a window, rejecting `start >= end` with `InvalidRange`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> CoreResult<Self> {
        if start >= end {
            return Err(CoreError::InvalidRange { start, end });
        }
        Ok(ReportWindow { start, end })
    }

    /// The 24 hours beginning at `start`.
    pub fn day_starting_at(start: DateTime<Utc>) -> Self {
        ReportWindow {
            start,
            end: start + Duration::hours(24),
        }
    }

    /// Today in the machine's local time zone.
    pub fn today() -> Self {
        Self::today_at(&Local::now())
    }

    /// The day containing `now`, in `now`'s own time zone.
    pub fn today_at<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        Self::day_starting_at(start_of_day(&now.timezone(), now.date_naive()))
    }

    /// Calendar dates interpreted in the machine's local time zone.
    pub fn from_dates(start: NaiveDate, end: NaiveDate) -> CoreResult<Self> {
        Self::from_dates_in(&Local, start, end)
    }

    /// Calendar dates interpreted in `tz`; both days are included.
    ///
    /// ## Errors
    /// `InvalidRange` when `end` is before `start`.
    pub fn from_dates_in<Tz: TimeZone>(tz: &Tz, start: NaiveDate, end: NaiveDate) -> CoreResult<Self> {
        let start_at = start_of_day(tz, start);
        let end_at = start_of_day(tz, end) + Duration::hours(24);
        Self::new(start_at, end_at)
    }

    #[inline]
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    #[inline]
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// `start <= at < end`
    #[inline]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }
}

/// First instant of `date` in `tz`, as UTC.
fn start_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&midnight) {
        LocalResult::Single(at) => at.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        // Midnight falls in a DST gap; shift by the zone's offset at that instant.
        LocalResult::None => {
            let offset = tz.offset_from_utc_datetime(&midnight).fix();
            Utc.from_utc_datetime(&(midnight - Duration::seconds(i64::from(offset.local_minus_utc()))))
        }
    }
}

/// Parses a `YYYY-MM-DD` calendar date.
///
/// ## Example
/// ```rust
/// use kasir_core::report::parse_calendar_date;
///
/// assert!(parse_calendar_date("start_date", "2026-02-01").is_ok());
/// assert!(parse_calendar_date("start_date", "01/02/2026").is_err());
/// ```
pub fn parse_calendar_date(field: &str, value: &str) -> ValidationResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), CALENDAR_DATE_FORMAT).map_err(|_| {
        ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "use YYYY-MM-DD".to_string(),
        }
    })
}

// =============================================================================
// Report Output
// =============================================================================

/// The product with the most units sold in a window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct BestSeller {
    pub product_id: i64,
    /// Name snapshot from the product's most recent line in the window.
    pub name: String,
    pub quantity_sold: i64,
}

/// Aggregates over one report window. Derived on demand, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesReport {
    pub window: ReportWindow,
    /// Sum of sale totals in minor units; 0 for an empty window.
    pub total_revenue: i64,
    pub total_transactions: i64,
    /// Absent (not zero) when the window has no sale lines.
    pub best_selling_product: Option<BestSeller>,
}

impl SalesReport {
    /// A report for a window without sales.
    pub fn empty(window: ReportWindow) -> Self {
        SalesReport {
            window,
            total_revenue: 0,
            total_transactions: 0,
            best_selling_product: None,
        }
    }
}
