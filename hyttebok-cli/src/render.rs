//! Terminal rendering for hyttebok-core types.
//!
//! Extension traits that add colored output using owo_colors, so core
//! types stay free of presentation concerns.

use hyttebok_core::booking::Booking;
use owo_colors::OwoColorize;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for Booking {
    fn render(&self) -> String {
        let guests = format!("({} {})", self.guests, pluralize("guest", self.guests as usize));
        format!(
            "{}  {} \u{2192} {}  {}",
            self.name.bold(),
            self.start_date,
            self.end_date,
            guests.dimmed()
        )
    }
}

/// Simple pluralization helper
pub fn pluralize(word: &str, count: usize) -> &str {
    if count == 1 {
        word
    } else {
        match word {
            "guest" => "guests",
            "booking" => "bookings",
            _ => word,
        }
    }
}
