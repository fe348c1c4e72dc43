//! Simulation clock: seeking, scrubbing and frame-driven playback.
//!
//! Every time change goes through [`seek`], which clamps the target into the
//! timeline and brings the scheduler up to date. Playback is cooperative: the
//! host loop calls [`Clock::on_frame`] with the ticket handed out by
//! [`Clock::play`]. Pausing bumps the clock's generation, so a ticket issued
//! before the pause is refused even if its frame is still in flight.

use std::time::Instant;

use crate::document::{Document, DocumentStore};

use super::math::{clamp, finite_or};
use super::scheduler::{SceneRef, reconcile, rewind};

/// Move `doc` to `target_ms`. Non-finite targets keep the current time. Going
/// backwards rewinds all scheduling state before reconciling, so the result
/// only depends on the target.
pub fn seek(doc: &Document, target_ms: f64) -> Document {
    let previous = doc.simulation.time_ms;
    let target = clamp(finite_or(target_ms, previous), 0.0, doc.timeline_duration_ms.max(0.0));

    let (actions, aoes) = if target < previous {
        tracing::debug!(from_ms = previous, to_ms = target, "rewind");
        rewind(&doc.actions, &doc.aoes)
    } else {
        (doc.actions.clone(), doc.aoes.clone())
    };
    let out = reconcile(
        target,
        SceneRef {
            actions: &actions,
            aoes: &aoes,
            entities: &doc.entities,
        },
    );

    let mut next = doc.clone();
    next.actions = out.actions;
    next.aoes = out.aoes;
    next.simulation.time_ms = target;
    next
}

/// Permission to advance one frame of playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTicket {
    generation: u64,
}

#[derive(Debug, Default)]
pub struct Clock {
    generation: u64,
    last_frame: Option<Instant>,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start playback. Any ticket issued earlier is invalidated.
    pub fn play(&mut self, store: &mut DocumentStore, now: Instant) -> FrameTicket {
        self.generation += 1;
        self.last_frame = Some(now);
        set_playing(store, true);
        FrameTicket {
            generation: self.generation,
        }
    }

    pub fn pause(&mut self, store: &mut DocumentStore) {
        self.generation += 1;
        self.last_frame = None;
        set_playing(store, false);
    }

    /// Play when paused, pause when playing. Returns the new ticket if
    /// playback started.
    pub fn toggle(&mut self, store: &mut DocumentStore, now: Instant) -> Option<FrameTicket> {
        if store.simulation().playing {
            self.pause(store);
            None
        } else {
            Some(self.play(store, now))
        }
    }

    pub fn is_current(&self, ticket: FrameTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Advance by the wall-clock time since the previous frame.
    ///
    /// Returns the ticket for the next frame, or `None` when the ticket is
    /// stale or playback is off. At the end of the timeline the clock holds
    /// there and keeps playing; stopping is up to the caller.
    pub fn on_frame(&mut self, store: &mut DocumentStore, ticket: FrameTicket, now: Instant) -> Option<FrameTicket> {
        if !self.is_current(ticket) || !store.simulation().playing {
            return None;
        }
        let last = self.last_frame.unwrap_or(now);
        self.last_frame = Some(now);
        let delta_ms = now.saturating_duration_since(last).as_secs_f64() * 1000.0;

        let doc = store.document();
        let next = seek(doc, doc.simulation.time_ms + delta_ms);
        store.commit(next);
        Some(ticket)
    }

    /// Set the time from the previous one, e.g. `|t| t + 100.0`.
    pub fn set_simulation_time(&mut self, store: &mut DocumentStore, update: impl FnOnce(f64) -> f64) {
        let doc = store.document();
        let next = seek(doc, update(doc.simulation.time_ms));
        store.commit(next);
    }

    pub fn scrub_to(&mut self, store: &mut DocumentStore, time_ms: f64) {
        self.set_simulation_time(store, |_| time_ms);
    }

    /// Back to zero, paused, nothing fired.
    pub fn reset_simulation(&mut self, store: &mut DocumentStore) {
        self.pause(store);
        let doc = store.document();
        let (actions, aoes) = rewind(&doc.actions, &doc.aoes);
        let mut next = doc.clone();
        next.actions = actions;
        next.aoes = aoes;
        next.simulation.time_ms = 0.0;
        next.simulation.playing = false;
        store.commit(next);
    }
}

fn set_playing(store: &mut DocumentStore, playing: bool) {
    let mut next = store.document().clone();
    next.simulation.playing = playing;
    store.commit(next);
}
