// Available-room lookups per stay range, cached with a TTL

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use chrono::NaiveDateTime;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::debug;

use crate::api::{ApiError, HotelApi};
use crate::config::ClientConfig;
use crate::models::Room;
use crate::stay::to_query_timestamp;

#[derive(Debug, Default)]
pub struct AvailabilityStats {
    pub items_count: AtomicUsize,
    pub hit_count: AtomicUsize,
    pub miss_count: AtomicUsize,
    pub expired_count: AtomicUsize,
    pub skipped_count: AtomicUsize,
    pub superseded_count: AtomicUsize,
    pub backend_fetches: AtomicUsize,
    pub invalidations: AtomicUsize,
    pub average_lookup_time_ns: AtomicU64,
    pub total_lookups: AtomicUsize,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct AvailabilityStatsReport {
    pub items_count: usize,
    pub hit_count: usize,
    pub miss_count: usize,
    pub expired_count: usize,
    pub skipped_count: usize,
    pub superseded_count: usize,
    pub backend_fetches: usize,
    pub invalidations: usize,
    pub average_lookup_time_ns: u64,
    pub total_lookups: usize,
}

/// Outcome of [`RoomAvailability::fetch`].
#[derive(Debug, Clone, PartialEq)]
pub enum AvailabilityLookup {
    /// The stay range is incomplete or check-out is not after check-in.
    Skipped,
    Ready(Vec<Room>),
    /// A fetch for a different range started while this one was in flight.
    Superseded,
}

pub fn create_cache_key(check_in: NaiveDateTime, check_out: NaiveDateTime) -> String {
    format!(
        "{}|{}",
        to_query_timestamp(check_in),
        to_query_timestamp(check_out)
    )
}

/// Keeps the room a booking already holds in the list, ahead of the
/// rooms the backend reports as free.
pub fn with_current_room(rooms: Vec<Room>, current: Option<&Room>) -> Vec<Room> {
    let Some(current) = current else {
        return rooms;
    };

    let mut merged = Vec::with_capacity(rooms.len() + 1);
    merged.push(current.clone());
    merged.extend(rooms.into_iter().filter(|room| room.id != current.id));
    merged
}

struct CacheEntry {
    rooms: Vec<Room>,
    created_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.ttl
    }
}

pub struct RoomAvailability {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
    // range of the most recent fetch; results for any other range are stale
    latest: Mutex<Option<String>>,
    // bumped by invalidate; results fetched across an invalidation are not cached
    epoch: AtomicU64,
    stats: AvailabilityStats,
}

impl RoomAvailability {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            latest: Mutex::new(None),
            epoch: AtomicU64::new(0),
            stats: AvailabilityStats::default(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.availability_ttl())
    }

    pub fn get(&self, check_in: NaiveDateTime, check_out: NaiveDateTime) -> Option<Vec<Room>> {
        let now = Instant::now();
        let key = create_cache_key(check_in, check_out);
        self.stats.total_lookups.fetch_add(1, Ordering::SeqCst);

        let expired = match self.entries.get(&key) {
            Some(entry) if !entry.is_expired() => {
                self.stats.hit_count.fetch_add(1, Ordering::SeqCst);
                self.store_lookup_time(now);
                return Some(entry.rooms.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired && self.entries.remove_if(&key, |_, e| e.is_expired()).is_some() {
            self.stats.expired_count.fetch_add(1, Ordering::SeqCst);
            self.stats.items_count.fetch_sub(1, Ordering::SeqCst);
        }
        self.stats.miss_count.fetch_add(1, Ordering::SeqCst);
        self.store_lookup_time(now);
        None
    }

    pub fn store(&self, check_in: NaiveDateTime, check_out: NaiveDateTime, rooms: Vec<Room>) {
        self.store_since(check_in, check_out, rooms, None);
    }

    // With an epoch, the insert only happens if no invalidate started since.
    // The check runs under the shard lock, so `invalidate` either sees the
    // entry or the insert sees the new epoch.
    fn store_since(
        &self,
        check_in: NaiveDateTime,
        check_out: NaiveDateTime,
        rooms: Vec<Room>,
        epoch: Option<u64>,
    ) -> bool {
        let key = create_cache_key(check_in, check_out);
        let slot = self.entries.entry(key.clone());
        if epoch.is_some_and(|epoch| self.epoch.load(Ordering::SeqCst) != epoch) {
            debug!(%key, "availability invalidated during fetch, not caching");
            return false;
        }

        debug!(%key, rooms = rooms.len(), "caching available rooms");
        let entry = CacheEntry {
            rooms,
            created_at: Instant::now(),
            ttl: self.ttl,
        };
        match slot {
            Entry::Occupied(mut occupied) => {
                occupied.insert(entry);
            }
            Entry::Vacant(vacant) => {
                let _guard = vacant.insert(entry);
                self.stats.items_count.fetch_add(1, Ordering::SeqCst);
            }
        }
        true
    }

    /// Looks up the rooms free for the range, going to the backend on a miss.
    pub async fn fetch<A: HotelApi + ?Sized>(
        &self,
        api: &A,
        check_in: Option<NaiveDateTime>,
        check_out: Option<NaiveDateTime>,
    ) -> Result<AvailabilityLookup, ApiError> {
        let (check_in, check_out) = match (check_in, check_out) {
            (Some(check_in), Some(check_out)) if check_out > check_in => (check_in, check_out),
            _ => {
                self.stats.skipped_count.fetch_add(1, Ordering::SeqCst);
                return Ok(AvailabilityLookup::Skipped);
            }
        };

        let key = create_cache_key(check_in, check_out);
        *self.latest.lock() = Some(key.clone());
        if let Some(rooms) = self.get(check_in, check_out) {
            return Ok(AvailabilityLookup::Ready(rooms));
        }

        let epoch = self.epoch.load(Ordering::SeqCst);
        let rooms = api.available_rooms(check_in, check_out).await?;
        self.stats.backend_fetches.fetch_add(1, Ordering::SeqCst);

        if self.latest.lock().as_deref() != Some(key.as_str()) {
            debug!(%key, "discarding superseded availability result");
            self.stats.superseded_count.fetch_add(1, Ordering::SeqCst);
            return Ok(AvailabilityLookup::Superseded);
        }

        self.store_since(check_in, check_out, rooms.clone(), Some(epoch));
        Ok(AvailabilityLookup::Ready(rooms))
    }

    /// Drops every cached range; returns how many were removed. Fetches in
    /// flight when this runs still return their rooms but do not cache them.
    pub fn invalidate(&self) -> usize {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        let mut removed = 0;
        self.entries.retain(|_, _| {
            removed += 1;
            false
        });
        self.stats.items_count.fetch_sub(removed, Ordering::SeqCst);
        self.stats.invalidations.fetch_add(1, Ordering::SeqCst);
        debug!(removed, "availability cache invalidated");
        removed
    }

    pub fn stats(&self) -> AvailabilityStatsReport {
        AvailabilityStatsReport {
            items_count: self.stats.items_count.load(Ordering::SeqCst),
            hit_count: self.stats.hit_count.load(Ordering::SeqCst),
            miss_count: self.stats.miss_count.load(Ordering::SeqCst),
            expired_count: self.stats.expired_count.load(Ordering::SeqCst),
            skipped_count: self.stats.skipped_count.load(Ordering::SeqCst),
            superseded_count: self.stats.superseded_count.load(Ordering::SeqCst),
            backend_fetches: self.stats.backend_fetches.load(Ordering::SeqCst),
            invalidations: self.stats.invalidations.load(Ordering::SeqCst),
            average_lookup_time_ns: self.stats.average_lookup_time_ns.load(Ordering::SeqCst),
            total_lookups: self.stats.total_lookups.load(Ordering::SeqCst),
        }
    }

    fn store_lookup_time(&self, started: Instant) {
        let duration_ns = started.elapsed().as_nanos() as u64;
        let total_lookups = self.stats.total_lookups.load(Ordering::SeqCst) as u64;
        let current_avg = self.stats.average_lookup_time_ns.load(Ordering::SeqCst);

        let new_avg = if total_lookups <= 1 {
            duration_ns
        } else {
            (current_avg * (total_lookups - 1) + duration_ns) / total_lookups
        };
        self.stats
            .average_lookup_time_ns
            .store(new_avg, Ordering::SeqCst);
    }
}

impl Default for RoomAvailability {
    fn default() -> Self {
        Self::from_config(&ClientConfig::default())
    }
}
