use anyhow::Result;
use chrono::{Datelike, Local};
use hyttebok_core::calendar::{DaySlot, MonthGrid, bookings_on_date};
use hyttebok_core::config::HyttebokConfig;
use owo_colors::OwoColorize;

use crate::commands;
use crate::render::Render;

pub fn run(month: Option<&str>) -> Result<()> {
    let config = HyttebokConfig::load()?;
    let store = commands::open_store(&config)?;

    let grid = match month {
        Some(input) => parse_month(input)?,
        None => {
            let today = Local::now().date_naive();
            MonthGrid::new(today.year(), today.month0() as i32)
        }
    };

    println!(
        "{}",
        format!("   {} {}", month_name(grid.month()), grid.year()).bold()
    );
    println!("{}", "  Su Mo Tu We Th Fr Sa".dimmed());

    let mut row = String::new();
    for (i, slot) in grid.slots().enumerate() {
        match slot {
            DaySlot::Empty => row.push_str("   "),
            DaySlot::Day(day) => {
                let booked = bookings_on_date(grid.date_of(day), store.bookings()).count() > 0;
                let cell = format!("{:>3}", day);
                if booked {
                    row.push_str(&cell.bold().green().to_string());
                } else {
                    row.push_str(&cell);
                }
            }
        }
        if (i + 1) % 7 == 0 {
            println!(" {row}");
            row.clear();
        }
    }
    if !row.is_empty() {
        println!(" {row}");
    }

    let first = grid.first_day();
    let last = grid.date_of(grid.days_in_month());
    let in_month: Vec<_> = store
        .bookings()
        .iter()
        .filter(|b| b.start_date <= last && first <= b.end_date)
        .collect();

    if in_month.is_empty() {
        println!();
        println!("{}", "  No bookings this month".dimmed());
        return Ok(());
    }

    println!();
    for booking in in_month {
        println!("  {}  {}", booking.id.dimmed(), booking.render());
    }

    Ok(())
}

/// Parse a YYYY-MM month argument.
fn parse_month(input: &str) -> Result<MonthGrid> {
    let parsed = input
        .split_once('-')
        .and_then(|(year, month)| Some((year.parse::<i32>().ok()?, month.parse::<u32>().ok()?)))
        .filter(|(_, month)| (1..=12).contains(month));

    match parsed {
        Some((year, month)) => Ok(MonthGrid::new(year, month as i32 - 1)),
        None => anyhow::bail!("Invalid month '{}'. Expected YYYY-MM", input),
    }
}

fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        _ => "December",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_month() {
        let grid = parse_month("2024-02").unwrap();
        assert_eq!((grid.year(), grid.month()), (2024, 2));
    }

    #[test]
    fn test_parse_month_rejects_garbage() {
        assert!(parse_month("2024").is_err());
        assert!(parse_month("2024-13").is_err());
        assert!(parse_month("feb").is_err());
    }
}
