use anyhow::Result;
use hyttebok_core::config::HyttebokConfig;
use owo_colors::OwoColorize;

use crate::commands;
use crate::render::Render;

pub fn run() -> Result<()> {
    let config = HyttebokConfig::load()?;
    let store = commands::open_store(&config)?;

    if store.bookings().is_empty() {
        println!("{}", "No bookings yet".dimmed());
        println!("{}", "Book the cabin with: hyttebok new".dimmed());
        return Ok(());
    }

    let own_id = config.profile.as_ref().map(|profile| profile.id.as_str());

    for booking in store.bookings() {
        let owner_tag = match (&booking.owner_id, own_id) {
            (Some(owner), Some(own)) if owner.as_str() == own => "(you)".green().to_string(),
            _ => String::new(),
        };
        println!(
            "  {}  {} {}",
            booking.id.dimmed(),
            booking.render(),
            owner_tag
        );
    }

    Ok(())
}
