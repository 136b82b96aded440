//! Durable booking storage with cross-context synchronization.
//!
//! Each execution context owns one [`BookingStore`]. All contexts share
//! the same durable backend and change bus; the durable store is the
//! single ground truth, every context is a cache that reloads on
//! notification, and the last full write wins in its entirety. No
//! field-level merge exists anywhere.

mod backend;
mod bus;

pub use backend::{FileBackend, MemoryBackend, StoreBackend};
pub use bus::{ChangeBus, ChangeFeed, ChangeNotice};

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;

use crate::booking::{Booking, BookingDraft, DEFAULT_OWNER_COLOR};
use crate::error::{HyttebokError, HyttebokResult};
use crate::identity::Identity;

/// Durable key under which the booking collection is stored.
pub const BOOKINGS_KEY: &str = "bookings";

/// One execution context's view of the shared booking collection.
///
/// The in-memory collection is always ordered by ascending start date
/// (ties keep insertion order) and starts empty; call [`load`] to read
/// the durable value before operating on it.
///
/// [`load`]: BookingStore::load
pub struct BookingStore {
    backend: Arc<dyn StoreBackend>,
    bus: Arc<ChangeBus>,
    origin: u64,
    bookings: Vec<Booking>,
}

impl BookingStore {
    /// Attach a new execution context to `backend` and `bus`.
    pub fn new(backend: Arc<dyn StoreBackend>, bus: Arc<ChangeBus>) -> Self {
        BookingStore {
            backend,
            bus,
            origin: bus::next_origin(),
            bookings: Vec::new(),
        }
    }

    /// Open a file-backed store rooted at `dir`, with a bus of its own.
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        BookingStore::new(Arc::new(FileBackend::new(dir)), Arc::new(ChangeBus::new()))
    }

    /// The current in-memory collection.
    pub fn bookings(&self) -> &[Booking] {
        &self.bookings
    }

    /// Replace the in-memory collection with the durable value.
    ///
    /// A missing value initializes to an empty collection, not an error.
    /// A malformed value is discarded entirely: the in-memory collection
    /// resets to empty, an [`Integrity`](HyttebokError::Integrity) error
    /// is returned, and the corrupted durable value is left in place so
    /// it stays diagnosable.
    pub fn load(&mut self) -> HyttebokResult<&[Booking]> {
        let Some(raw) = self.backend.read(BOOKINGS_KEY)? else {
            self.bookings.clear();
            return Ok(&self.bookings);
        };

        match decode_collection(&raw) {
            Ok(bookings) => {
                self.bookings = bookings;
                Ok(&self.bookings)
            }
            Err(err) => {
                self.bookings.clear();
                Err(err)
            }
        }
    }

    /// Validate `draft` and insert the resulting booking, keeping the
    /// collection sorted, then persist and broadcast.
    ///
    /// On validation failure nothing is assigned, persisted, or
    /// broadcast.
    pub fn create(
        &mut self,
        draft: &BookingDraft,
        identity: Option<&Identity>,
    ) -> HyttebokResult<Booking> {
        let draft = draft.validate()?;

        let booking = Booking {
            id: self.next_booking_id(),
            name: draft.name,
            start_date: draft.start_date,
            end_date: draft.end_date,
            guests: draft.guests,
            owner_id: identity.map(|identity| identity.id.clone()),
            owner_color: identity
                .and_then(|identity| identity.color.clone())
                .unwrap_or_else(|| DEFAULT_OWNER_COLOR.to_string()),
            created_at: Utc::now(),
        };

        let mut next = self.bookings.clone();
        // Insert after any booking sharing the start date, so ties keep
        // insertion order
        let at = next.partition_point(|b| b.start_date <= booking.start_date);
        next.insert(at, booking.clone());

        self.persist(next)?;
        self.broadcast();
        Ok(booking)
    }

    /// Remove the booking with `id`, then persist and broadcast.
    ///
    /// Removing an id that is not present is a no-op, not an error:
    /// another context may have removed it first.
    pub fn remove(&mut self, id: i64) -> HyttebokResult<()> {
        if !self.bookings.iter().any(|b| b.id == id) {
            return Ok(());
        }

        let next = self
            .bookings
            .iter()
            .filter(|b| b.id != id)
            .cloned()
            .collect();
        self.persist(next)?;
        self.broadcast();
        Ok(())
    }

    /// Write `bookings` as the new durable value and commit it in
    /// memory.
    ///
    /// The collection is checked before writing, guarding against a
    /// caller passing corrupted state. A failed write surfaces as a
    /// [`Sync`](HyttebokError::Sync) error and leaves both the durable
    /// value and the in-memory collection untouched.
    pub fn persist(&mut self, mut bookings: Vec<Booking>) -> HyttebokResult<()> {
        check_collection(&bookings)?;
        // Stable sort: equal start dates keep their insertion order
        bookings.sort_by_key(|b| b.start_date);

        let encoded = encode_collection(&bookings)?;
        self.backend
            .write(BOOKINGS_KEY, &encoded)
            .map_err(|err| HyttebokError::Sync(err.to_string()))?;

        self.bookings = bookings;
        Ok(())
    }

    /// Notify every sibling context that the booking key changed.
    ///
    /// Fire-and-forget: no acknowledgment, no ordering guarantee across
    /// rapid writes.
    pub fn broadcast(&self) {
        // The payload is advisory; receivers reload from the durable
        // store, so a failed encode degrades to an empty payload
        let payload = encode_collection(&self.bookings).unwrap_or_default();
        self.bus.publish(ChangeNotice {
            key: BOOKINGS_KEY.to_string(),
            payload,
            origin: self.origin,
        });
    }

    /// Notices for changes made by other contexts on the same bus.
    ///
    /// The prescribed reaction to a notice is a full [`load`]; partial
    /// merges are never attempted.
    ///
    /// [`load`]: BookingStore::load
    pub fn subscribe(&self) -> ChangeFeed {
        self.bus.subscribe(self.origin)
    }

    /// Creation-ordered id: epoch milliseconds, bumped past any existing
    /// id assigned in the same millisecond.
    fn next_booking_id(&self) -> i64 {
        let id = Utc::now().timestamp_millis();
        match self.bookings.iter().map(|b| b.id).max() {
            Some(max) if id <= max => max + 1,
            _ => id,
        }
    }
}

fn encode_collection(bookings: &[Booking]) -> HyttebokResult<String> {
    serde_json::to_string(bookings).map_err(|err| HyttebokError::Serialization(err.to_string()))
}

/// Decode and validate a durable value into a sorted collection.
///
/// Anything that does not conform to the booking shape fails the whole
/// value; partially valid collections are never let through.
fn decode_collection(raw: &str) -> HyttebokResult<Vec<Booking>> {
    let mut bookings: Vec<Booking> = serde_json::from_str(raw)
        .map_err(|err| HyttebokError::Integrity(format!("stored bookings are unreadable: {err}")))?;
    check_collection(&bookings)?;
    bookings.sort_by_key(|b| b.start_date);
    Ok(bookings)
}

/// Reject collections that violate the booking invariants.
fn check_collection(bookings: &[Booking]) -> HyttebokResult<()> {
    for booking in bookings {
        if booking.name.trim().is_empty() {
            return Err(HyttebokError::Integrity(format!(
                "booking {} has an empty name",
                booking.id
            )));
        }
        if booking.end_date < booking.start_date {
            return Err(HyttebokError::Integrity(format!(
                "booking {} ends before it starts",
                booking.id
            )));
        }
        if booking.guests < 1 {
            return Err(HyttebokError::Integrity(format!(
                "booking {} has no guests",
                booking.id
            )));
        }
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::bookings_on_date;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn draft(name: &str, start: NaiveDate, end: NaiveDate, guests: u32) -> BookingDraft {
        BookingDraft {
            name: name.to_string(),
            start_date: Some(start),
            end_date: Some(end),
            guests: Some(guests),
        }
    }

    fn memory_store() -> (Arc<MemoryBackend>, Arc<ChangeBus>, BookingStore) {
        let backend = Arc::new(MemoryBackend::new());
        let bus = Arc::new(ChangeBus::new());
        let store = BookingStore::new(backend.clone(), bus.clone());
        (backend, bus, store)
    }

    #[test]
    fn test_load_missing_value_initializes_empty() {
        let (_, _, mut store) = memory_store();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_created_booking_appears_on_every_day_of_its_range() {
        let (_, _, mut store) = memory_store();
        store.load().unwrap();

        let created = store
            .create(&draft("Hansen", date(2024, 2, 15), date(2024, 2, 18), 4), None)
            .unwrap();
        store.load().unwrap();

        let mut day = date(2024, 2, 15);
        while day <= date(2024, 2, 18) {
            let matches: Vec<_> = bookings_on_date(day, store.bookings()).collect();
            assert_eq!(matches.len(), 1, "expected exactly one booking on {day}");
            assert_eq!(matches[0].id, created.id);
            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_collection_stays_sorted_by_start_date() {
        let (_, _, mut store) = memory_store();
        store.load().unwrap();

        store
            .create(&draft("Larsen", date(2024, 2, 17), date(2024, 2, 20), 2), None)
            .unwrap();
        store
            .create(&draft("Hansen", date(2024, 2, 15), date(2024, 2, 18), 4), None)
            .unwrap();

        let names: Vec<&str> = store.bookings().iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Hansen", "Larsen"]);
    }

    #[test]
    fn test_same_start_date_keeps_insertion_order() {
        let (_, _, mut store) = memory_store();
        store.load().unwrap();

        store
            .create(&draft("First", date(2024, 2, 15), date(2024, 2, 16), 2), None)
            .unwrap();
        store
            .create(&draft("Second", date(2024, 2, 15), date(2024, 2, 17), 2), None)
            .unwrap();

        let names: Vec<&str> = store.bookings().iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second"]);
    }

    #[test]
    fn test_overlap_scenario_returns_both_in_order() {
        let (_, _, mut store) = memory_store();
        store.load().unwrap();

        store
            .create(&draft("Hansen", date(2024, 2, 15), date(2024, 2, 18), 4), None)
            .unwrap();
        store
            .create(&draft("Larsen", date(2024, 2, 17), date(2024, 2, 20), 2), None)
            .unwrap();

        let on_17th: Vec<_> = bookings_on_date(date(2024, 2, 17), store.bookings()).collect();
        assert_eq!(on_17th.len(), 2);
        assert_eq!(on_17th[0].name, "Hansen");
        assert_eq!(on_17th[1].name, "Larsen");
    }

    #[test]
    fn test_invalid_draft_mutates_nothing() {
        let (backend, _, mut store) = memory_store();
        store.load().unwrap();

        let bad = BookingDraft {
            name: String::new(),
            start_date: Some(date(2024, 2, 18)),
            end_date: Some(date(2024, 2, 15)),
            guests: Some(0),
        };
        let err = store.create(&bad, None).unwrap_err();

        match err {
            HyttebokError::Validation(validation) => {
                assert_eq!(validation.fields(), vec!["name", "endDate", "guests"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(store.bookings().is_empty());
        assert!(backend.read(BOOKINGS_KEY).unwrap().is_none());
    }

    #[test]
    fn test_no_operation_can_store_an_inverted_range() {
        let (_, _, mut store) = memory_store();
        store.load().unwrap();
        store
            .create(&draft("Hansen", date(2024, 2, 15), date(2024, 2, 18), 4), None)
            .unwrap();

        let mut tampered = store.bookings().to_vec();
        tampered[0].end_date = date(2024, 2, 1);
        assert!(matches!(
            store.persist(tampered),
            Err(HyttebokError::Integrity(_))
        ));

        // The committed collection still satisfies the invariant
        for booking in store.bookings() {
            assert!(booking.start_date <= booking.end_date);
        }
    }

    #[test]
    fn test_remove_is_idempotent() {
        let (_, _, mut store) = memory_store();
        store.load().unwrap();

        let booking = store
            .create(&draft("Hansen", date(2024, 2, 15), date(2024, 2, 18), 4), None)
            .unwrap();

        store.remove(booking.id).unwrap();
        assert!(store.bookings().is_empty());
        // Second removal is a no-op, not an error
        store.remove(booking.id).unwrap();
        assert!(store.bookings().is_empty());
    }

    #[test]
    fn test_persist_then_load_round_trips() {
        let (_, _, mut store) = memory_store();
        store.load().unwrap();
        store
            .create(&draft("Hansen", date(2024, 2, 15), date(2024, 2, 18), 4), None)
            .unwrap();
        store
            .create(&draft("Larsen", date(2024, 2, 17), date(2024, 2, 20), 2), None)
            .unwrap();

        let before = store.bookings().to_vec();
        let after = store.load().unwrap().to_vec();
        assert_eq!(before, after);
    }

    #[test]
    fn test_corrupted_value_is_discarded_but_not_overwritten() {
        let (backend, _, mut store) = memory_store();
        backend
            .write(BOOKINGS_KEY, r#"{"not":"a list"}"#)
            .unwrap();

        let err = store.load().unwrap_err();
        assert!(matches!(err, HyttebokError::Integrity(_)));
        assert!(store.bookings().is_empty());

        // The corrupted value stays diagnosable
        assert_eq!(
            backend.read(BOOKINGS_KEY).unwrap().as_deref(),
            Some(r#"{"not":"a list"}"#)
        );
    }

    #[test]
    fn test_well_formed_records_with_bad_invariants_are_rejected_whole() {
        let (backend, _, mut store) = memory_store();
        let raw = r##"[
            {"id":1,"name":"Hansen","startDate":"2024-02-15","endDate":"2024-02-18",
             "guests":4,"ownerId":null,"ownerColor":"#2563eb","createdAt":"2024-02-01T10:00:00Z"},
            {"id":2,"name":"Larsen","startDate":"2024-02-20","endDate":"2024-02-17",
             "guests":2,"ownerId":null,"ownerColor":"#2563eb","createdAt":"2024-02-01T10:00:00Z"}
        ]"##;
        backend.write(BOOKINGS_KEY, raw).unwrap();

        assert!(matches!(store.load(), Err(HyttebokError::Integrity(_))));
        // Nothing partially loaded
        assert!(store.bookings().is_empty());
    }

    #[test]
    fn test_failed_write_surfaces_sync_error_and_preserves_state() {
        let (backend, _, mut store) = memory_store();
        store.load().unwrap();
        store
            .create(&draft("Hansen", date(2024, 2, 15), date(2024, 2, 18), 4), None)
            .unwrap();
        let durable_before = backend.read(BOOKINGS_KEY).unwrap();

        backend.set_fail_writes(true);
        let err = store
            .create(&draft("Larsen", date(2024, 2, 17), date(2024, 2, 20), 2), None)
            .unwrap_err();

        assert!(matches!(err, HyttebokError::Sync(_)));
        // In-memory state is still usable for this session
        assert_eq!(store.bookings().len(), 1);
        assert_eq!(backend.read(BOOKINGS_KEY).unwrap(), durable_before);
    }

    #[test]
    fn test_ids_stay_monotonic_under_rapid_creation() {
        let (_, _, mut store) = memory_store();
        store.load().unwrap();

        let mut last_id = 0;
        for n in 0..5 {
            let booking = store
                .create(&draft("Hansen", date(2024, 2, 15 + n), date(2024, 2, 16 + n), 2), None)
                .unwrap();
            assert!(booking.id > last_id);
            last_id = booking.id;
        }
    }

    #[test]
    fn test_identity_is_bound_at_creation() {
        let (_, _, mut store) = memory_store();
        store.load().unwrap();

        let identity = Identity {
            id: "user-1".to_string(),
            display_name: "Kari".to_string(),
            color: Some("#f59e0b".to_string()),
        };
        let with_identity = store
            .create(
                &draft("Hansen", date(2024, 2, 15), date(2024, 2, 18), 4),
                Some(&identity),
            )
            .unwrap();
        assert_eq!(with_identity.owner_id.as_deref(), Some("user-1"));
        assert_eq!(with_identity.owner_color, "#f59e0b");

        let anonymous = store
            .create(&draft("Larsen", date(2024, 2, 19), date(2024, 2, 20), 2), None)
            .unwrap();
        assert_eq!(anonymous.owner_id, None);
        assert_eq!(anonymous.owner_color, DEFAULT_OWNER_COLOR);
    }

    #[test]
    fn test_own_broadcasts_are_not_observed() {
        let (_, _, mut store) = memory_store();
        let mut feed = store.subscribe();
        store.load().unwrap();

        store
            .create(&draft("Hansen", date(2024, 2, 15), date(2024, 2, 18), 4), None)
            .unwrap();
        assert!(feed.try_next().is_none());
    }

    #[tokio::test]
    async fn test_two_contexts_converge_via_broadcast_and_reload() {
        let backend = Arc::new(MemoryBackend::new());
        let bus = Arc::new(ChangeBus::new());
        let mut ctx_x = BookingStore::new(backend.clone(), bus.clone());
        let mut ctx_y = BookingStore::new(backend.clone(), bus.clone());
        let mut feed_x = ctx_x.subscribe();
        let mut feed_y = ctx_y.subscribe();

        // An unrelated booking D already exists and both contexts see it
        let d = ctx_y
            .create(&draft("Larsen", date(2024, 3, 1), date(2024, 3, 3), 2), None)
            .unwrap();
        ctx_x.load().unwrap();

        // X creates C; Y observes the broadcast and reloads
        let c = ctx_x
            .create(&draft("Hansen", date(2024, 2, 15), date(2024, 2, 18), 4), None)
            .unwrap();
        let notice = feed_y.next().await.unwrap();
        assert_eq!(notice.key, BOOKINGS_KEY);
        ctx_y.load().unwrap();
        assert_eq!(ctx_y.bookings().len(), 2);

        // Y removes D; X observes the broadcast and reloads
        ctx_y.remove(d.id).unwrap();
        feed_x.next().await.unwrap();
        ctx_x.load().unwrap();

        let ids: Vec<i64> = ctx_x.bookings().iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![c.id]);
    }

    #[tokio::test]
    async fn test_concurrent_writes_lose_the_earlier_one_entirely() {
        let backend = Arc::new(MemoryBackend::new());
        let bus = Arc::new(ChangeBus::new());
        let mut ctx_x = BookingStore::new(backend.clone(), bus.clone());
        let mut ctx_y = BookingStore::new(backend.clone(), bus.clone());

        let d = ctx_y
            .create(&draft("Larsen", date(2024, 3, 1), date(2024, 3, 3), 2), None)
            .unwrap();
        ctx_x.load().unwrap();

        // X writes C, but Y removes D from its stale view without
        // reloading first: Y's full write wins and C is silently gone
        ctx_x
            .create(&draft("Hansen", date(2024, 2, 15), date(2024, 2, 18), 4), None)
            .unwrap();
        ctx_y.remove(d.id).unwrap();

        ctx_x.load().unwrap();
        assert!(ctx_x.bookings().is_empty());
    }

    #[test]
    fn test_file_backed_store_round_trips_across_contexts() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = BookingStore::open(dir.path());
        writer.load().unwrap();
        writer
            .create(&draft("Hansen", date(2024, 2, 15), date(2024, 2, 18), 4), None)
            .unwrap();

        // A separate context against the same directory sees the booking
        let mut reader = BookingStore::open(dir.path());
        let bookings = reader.load().unwrap();
        assert_eq!(bookings.len(), 1);
        assert_eq!(bookings[0].name, "Hansen");
    }
}
