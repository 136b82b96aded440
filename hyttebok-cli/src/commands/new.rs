use anyhow::Result;
use chrono::NaiveDate;
use dialoguer::Input;
use hyttebok_core::booking::BookingDraft;
use hyttebok_core::config::HyttebokConfig;
use owo_colors::OwoColorize;

use crate::commands;
use crate::render::pluralize;

pub fn run(
    name: Option<String>,
    from: Option<String>,
    to: Option<String>,
    guests: Option<u32>,
) -> Result<()> {
    let config = HyttebokConfig::load()?;
    let interactive = name.is_none() || from.is_none() || to.is_none();

    // --- Name ---
    let name = match name {
        Some(name) => name,
        None => Input::<String>::new()
            .with_prompt("  Who is staying?")
            .interact_text()?,
    };

    // --- Dates ---
    let start_date = match from {
        Some(input) => parse_date(&input)?,
        None => prompt_with_retry("  First day?")?,
    };
    let end_date = match to {
        Some(input) => parse_date(&input)?,
        None => prompt_with_retry("  Last day?")?,
    };

    let draft = BookingDraft {
        name,
        start_date: Some(start_date),
        end_date: Some(end_date),
        guests,
    };

    let mut store = commands::open_store(&config)?;
    let booking = store.create(&draft, config.profile.as_ref())?;

    if interactive {
        println!();
    }
    println!(
        "{}",
        format!(
            "  Booked: {} {} \u{2192} {} ({} {})",
            booking.name,
            booking.start_date,
            booking.end_date,
            booking.guests,
            pluralize("guest", booking.guests as usize)
        )
        .green()
    );
    println!("  {}", format!("id: {}", booking.id).dimmed());

    Ok(())
}

/// Prompt the user with retry on parse errors.
fn prompt_with_retry(prompt: &str) -> Result<NaiveDate> {
    loop {
        let input: String = Input::new().with_prompt(prompt).interact_text()?;
        match parse_date(&input) {
            Ok(date) => return Ok(date),
            Err(err) => {
                eprintln!("  {}", err.to_string().red());
            }
        }
    }
}

/// Parse a booking date: ISO format first, natural language as a fallback.
fn parse_date(input: &str) -> Result<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(date);
    }

    let dt = fuzzydate::parse(&input.to_lowercase())
        .map_err(|_| anyhow::anyhow!("Could not parse date \"{}\". Expected YYYY-MM-DD", input))?;
    Ok(dt.date())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_iso_date() {
        assert_eq!(
            parse_date("2024-02-15").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 15).unwrap()
        );
    }

    #[test]
    fn test_parse_natural_language_date() {
        assert!(parse_date("tomorrow").is_ok());
    }

    #[test]
    fn test_parse_garbage_fails() {
        assert!(parse_date("not a date").is_err());
    }
}
