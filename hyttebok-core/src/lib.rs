//! Core types and storage for the hyttebok ecosystem.
//!
//! This crate provides everything the rendering layers build on:
//! - `Booking` and draft types with their validation rules
//! - `BookingStore`: durable local persistence plus cross-context
//!   broadcast and full-reload reconciliation
//! - `calendar`: month-grid and per-day queries over a collection

pub mod booking;
pub mod calendar;
pub mod config;
pub mod error;
pub mod identity;
pub mod store;

// Re-export the types almost every caller needs
pub use booking::{Booking, BookingDraft, DEFAULT_OWNER_COLOR};
pub use error::{HyttebokError, HyttebokResult};
pub use identity::Identity;
pub use store::BookingStore;
