//! Month-grid and day-level queries over a booking collection.
//!
//! This is a stateless derivation layer: it owns nothing, persists
//! nothing, and recomputes everything from the `(date, collection)`
//! pair it is handed.

use chrono::{Datelike, NaiveDate};

use crate::booking::Booking;

/// One cell of a rendered month grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaySlot {
    /// Leading padding before the first day of the month.
    Empty,
    /// A calendar day, 1-based.
    Day(u32),
}

/// One calendar month, addressable with out-of-range month indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthGrid {
    year: i32,
    /// 1..=12 after normalization.
    month: u32,
}

impl MonthGrid {
    /// Build a grid for `year` and a zero-based `month_index`.
    ///
    /// Indices outside `0..=11` roll into the adjacent years, so `-1` is
    /// December of the previous year and `12` is January of the next.
    pub fn new(year: i32, month_index: i32) -> Self {
        MonthGrid {
            year: year + month_index.div_euclid(12),
            month: month_index.rem_euclid(12) as u32 + 1,
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Month number, 1-based.
    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        // Normalization guarantees a representable year/month pair
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap()
    }

    /// Number of leading placeholder slots: the weekday index of day 1,
    /// counting Sunday as 0.
    pub fn leading_slots(&self) -> u32 {
        self.first_day().weekday().num_days_from_sunday()
    }

    pub fn days_in_month(&self) -> u32 {
        // `self.month` is 1-based, so as a zero-based index it names the
        // following month
        let next = MonthGrid::new(self.year, self.month as i32);
        next.first_day()
            .signed_duration_since(self.first_day())
            .num_days() as u32
    }

    /// The date of a 1-based `day` within this month.
    pub fn date_of(&self, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, day).unwrap()
    }

    /// The month's day slots: leading placeholders for the weekday offset
    /// of day 1, then one slot per calendar day.
    ///
    /// The iterator is lazy and restartable; call `slots` again for a
    /// fresh pass.
    pub fn slots(self) -> impl Iterator<Item = DaySlot> + Clone {
        let padding = std::iter::repeat(DaySlot::Empty).take(self.leading_slots() as usize);
        padding.chain((1..=self.days_in_month()).map(DaySlot::Day))
    }
}

/// Every booking whose inclusive `[start_date, end_date]` range contains
/// `date`, in collection order.
///
/// The collection is already sorted by start date, so the result is too.
pub fn bookings_on_date(date: NaiveDate, bookings: &[Booking]) -> impl Iterator<Item = &Booking> + Clone {
    bookings.iter().filter(move |booking| booking.covers(date))
}

// =============================================================================
// Tests
// =============================================================================
