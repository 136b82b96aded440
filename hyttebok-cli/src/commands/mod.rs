pub mod calendar;
pub mod init;
pub mod list;
pub mod new;
pub mod remove;

use anyhow::Result;
use hyttebok_core::config::HyttebokConfig;
use hyttebok_core::store::BookingStore;
use owo_colors::OwoColorize;

/// Open the booking store for this invocation and load the durable value.
///
/// A malformed durable value is surfaced as a dismissible warning and the
/// session continues on an empty collection; the stored value is left
/// untouched so retrying (or inspecting it) stays possible.
pub fn open_store(config: &HyttebokConfig) -> Result<BookingStore> {
    let mut store = BookingStore::open(config.data_path());

    if let Err(err) = store.load() {
        eprintln!("{}", format!("Warning: {err}").yellow());
        eprintln!(
            "{}",
            "Starting from an empty calendar; the stored value was left in place.".dimmed()
        );
    }

    Ok(store)
}
