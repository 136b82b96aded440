use anyhow::Result;
use hyttebok_core::config::HyttebokConfig;
use owo_colors::OwoColorize;

use crate::commands;

pub fn run(id: i64, force: bool) -> Result<()> {
    let config = HyttebokConfig::load()?;
    let mut store = commands::open_store(&config)?;

    let Some(booking) = store.bookings().iter().find(|b| b.id == id).cloned() else {
        // Removal is idempotent; another session may have beaten us to it
        println!("{}", format!("No booking with id {id}").dimmed());
        return Ok(());
    };

    // Advisory check only: the store itself does not enforce ownership
    let own = match (&config.profile, &booking.owner_id) {
        (Some(profile), Some(owner)) => profile.id == *owner,
        (_, None) => true,
        (None, Some(_)) => false,
    };
    if !own && !force {
        anyhow::bail!(
            "'{}' was booked by another family member. Pass --force to cancel it anyway.",
            booking.name
        );
    }

    store.remove(id)?;

    println!(
        "{}",
        format!(
            "  Cancelled: {} {} \u{2192} {}",
            booking.name, booking.start_date, booking.end_date
        )
        .green()
    );

    Ok(())
}
