//! Calendar helpers pinned to the business timezone.
//!
//! All window math happens on [`NaiveDate`] values that were resolved in
//! [`REFERENCE_TZ`], so neither the host timezone nor daylight-saving shifts
//! can move a day boundary.

use std::fmt;

use chrono::{DateTime, Days, Months, NaiveDate, Utc};
use chrono_tz::Tz;

/// Timezone every calendar date is resolved against.
pub const REFERENCE_TZ: Tz = chrono_tz::America::Sao_Paulo;

/// A (year, month, day) triple in [`REFERENCE_TZ`]. Serializes as `YYYY-MM-DD`.
pub type CalendarDate = NaiveDate;

/// Source of "now". Swapped for [`FixedClock`] in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always reports the same instant.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Calendar date of `instant` as seen in [`REFERENCE_TZ`].
pub fn calendar_date(instant: DateTime<Utc>) -> CalendarDate {
    instant.with_timezone(&REFERENCE_TZ).date_naive()
}

/// Today's calendar date in [`REFERENCE_TZ`].
pub fn today(clock: &impl Clock) -> CalendarDate {
    calendar_date(clock.now())
}

/// Shift `date` by `n` calendar days, backwards when `n` is negative.
///
/// Returns `None` only when the result falls outside chrono's supported range.
pub fn add_days(date: CalendarDate, n: i64) -> Option<CalendarDate> {
    if n >= 0 {
        date.checked_add_days(Days::new(n.unsigned_abs()))
    } else {
        date.checked_sub_days(Days::new(n.unsigned_abs()))
    }
}

/// Same day of the previous month.
///
/// When that day does not exist in the previous month the result is clamped to
/// the previous month's last day: `2024-03-31` becomes `2024-02-29` and
/// `2024-05-31` becomes `2024-04-30`.
pub fn subtract_one_month(date: CalendarDate) -> Option<CalendarDate> {
    date.checked_sub_months(Months::new(1))
}

/// Half-open window `[start, end)` of calendar dates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DateRange {
    start: CalendarDate,
    end: CalendarDate,
}

impl DateRange {
    /// `None` if `start` is after `end`.
    pub fn new(start: CalendarDate, end: CalendarDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    /// The window `[day, day + 1)`, covering exactly `day`.
    pub fn single_day(day: CalendarDate) -> Option<Self> {
        let next = add_days(day, 1)?;
        Some(Self {
            start: day,
            end: next,
        })
    }

    pub fn start(&self) -> CalendarDate {
        self.start
    }

    pub fn end(&self) -> CalendarDate {
        self.end
    }

    /// Whether a record dated `date` falls in the window. States the half-open
    /// rule the remote `DataInicial` pair is built from: `start` is in, `end`
    /// is out.
    pub fn contains(&self, date: CalendarDate) -> bool {
        self.start <= date && date < self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}
