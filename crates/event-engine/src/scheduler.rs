//! Deterministic event scheduling.
//!
//! The scheduler draws from a counter-based stream keyed by
//! `(world_time, seed)`. The stream is plain splitmix64 arithmetic so any
//! implementation reproduces the same picks bit for bit:
//!
//! ```text
//! key     = mix64(mix64(world_time_ms) ^ seed)
//! draw(n) = mix64(key + (n + 1) * 0x9e3779b97f4a7c15)
//! ```
//!
//! Draw 0 picks the template among eligible ones (catalog order), draw 1
//! picks the zone, draw 2 picks the lead time. Rarity does not weight the
//! pick.

use rand::RngCore;

use event_types::{ScheduledEvent, Timestamp, MS_PER_MINUTE};

use crate::state::EventsState;
use crate::EventEngine;

/// Weyl increment of splitmix64.
const GOLDEN_GAMMA: u64 = 0x9e37_79b9_7f4a_7c15;

/// splitmix64 finaliser.
pub fn mix64(mut x: u64) -> u64 {
    x = (x ^ (x >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^ (x >> 31)
}

/// Counter-based pseudo-random stream keyed by world time and seed.
///
/// Implements [`RngCore`], so it can drive `rand` helpers too, but the
/// scheduler itself only uses [`KeyedStream::next_below`] to stay portable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedStream {
    key: u64,
    counter: u64,
}

impl KeyedStream {
    pub fn new(world_time: Timestamp, seed: u64) -> Self {
        Self {
            key: mix64(mix64(world_time.as_millis()) ^ seed),
            counter: 0,
        }
    }

    /// The `n`-th value of the stream, independent of the cursor.
    pub fn draw(&self, n: u64) -> u64 {
        mix64(
            self.key
                .wrapping_add(n.wrapping_add(1).wrapping_mul(GOLDEN_GAMMA)),
        )
    }

    /// Next value reduced modulo `bound`. `bound` must be non-zero.
    pub fn next_below(&mut self, bound: u64) -> u64 {
        debug_assert!(bound > 0);
        self.next_u64() % bound.max(1)
    }
}

impl RngCore for KeyedStream {
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        let value = self.draw(self.counter);
        self.counter = self.counter.wrapping_add(1);
        value
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl EventEngine {
    /// Picks the next event type, zone and start time for `world_time`.
    ///
    /// With a state, types whose cooldown runs past `world_time` are not
    /// eligible. Returns `None` when nothing is eligible or when the lead
    /// would overflow the timestamp. The scheduled time is always strictly
    /// after `world_time`.
    pub fn schedule_random_event(
        &self,
        world_time: Timestamp,
        seed: u64,
        state: Option<&EventsState>,
    ) -> Option<ScheduledEvent> {
        let eligible: Vec<_> = self
            .catalog
            .templates()
            .iter()
            .filter(|t| {
                state
                    .and_then(|s| s.cooldown_until(&t.id))
                    .map_or(true, |until| until <= world_time)
            })
            .collect();
        if eligible.is_empty() {
            tracing::debug!("No event eligible at {} (seed {})", world_time, seed);
            return None;
        }

        let mut stream = KeyedStream::new(world_time, seed);
        let template = eligible[stream.next_below(eligible.len() as u64) as usize];
        let zone = &template.zones[stream.next_below(template.zones.len() as u64) as usize];

        let min_lead = self.config.scheduler.min_lead_minutes.max(1) * MS_PER_MINUTE;
        let max_lead = (self.config.scheduler.max_lead_minutes * MS_PER_MINUTE).max(min_lead);
        let lead = min_lead + stream.next_below(max_lead - min_lead + 1);

        let Some(scheduled_time) = world_time.as_millis().checked_add(lead) else {
            tracing::debug!("Lead of {}ms overflows world time {}", lead, world_time);
            return None;
        };

        Some(ScheduledEvent::new(
            template.id.clone(),
            zone.clone(),
            Timestamp::from_millis(scheduled_time),
        ))
    }

    /// Schedules against `state` and appends the pick to its upcoming queue.
    pub fn queue_scheduled_event(
        &self,
        state: &mut EventsState,
        world_time: Timestamp,
        seed: u64,
    ) -> Option<ScheduledEvent> {
        let entry = self.schedule_random_event(world_time, seed, Some(state))?;
        tracing::info!(
            "Scheduled {} in {} at {}",
            entry.type_id,
            entry.zone,
            entry.scheduled_time
        );
        state.push_upcoming(entry.clone());
        Some(entry)
    }
}
