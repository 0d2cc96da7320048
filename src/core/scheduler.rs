//! Fixed-interval tick scheduler.
//!
//! The scheduler owns the wall-clock side of the simulation: it decides when
//! a tick is due and invokes registered callbacks exactly once per tick.
//! Everything else (sessions, entities, projectiles) is tick-native and never
//! reads the clock directly, so tests can single-step with [`TickScheduler::poll`]
//! and synthetic instants.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::thread;
use std::time::{Duration, Instant};

/// Handle returned by [`TickScheduler::register`], used to unregister later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallbackId(u64);

type TickCallback = Box<dyn FnMut(u64)>;

/// Drives registered callbacks at a fixed tick interval.
///
/// Ticks fire at most once per `poll`, and skipped wall-clock time is
/// discarded rather than replayed: after a long stall the next poll fires a
/// single tick and the schedule resumes from there.
pub struct TickScheduler {
    interval: Duration,
    running: bool,
    current_tick: u64,
    last_fired: Option<Instant>,
    callbacks: Vec<(CallbackId, TickCallback)>,
    next_callback_id: u64,
}

impl TickScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            running: false,
            current_tick: 0,
            last_fired: None,
            callbacks: Vec::new(),
            next_callback_id: 0,
        }
    }

    /// Registers a callback invoked once per tick with the new tick number.
    pub fn register<F>(&mut self, callback: F) -> CallbackId
    where
        F: FnMut(u64) + 'static,
    {
        let id = CallbackId(self.next_callback_id);
        self.next_callback_id += 1;
        self.callbacks.push((id, Box::new(callback)));
        id
    }

    /// Removes a callback. Returns false if the id was already gone.
    pub fn unregister(&mut self, id: CallbackId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(cb_id, _)| *cb_id != id);
        self.callbacks.len() != before
    }

    /// Starts the schedule. The first tick fires one interval after `now`.
    pub fn start(&mut self, now: Instant) {
        if self.running {
            return;
        }
        self.running = true;
        self.last_fired = Some(now);
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Current tick number. Monotonically non-decreasing for the lifetime of
    /// the scheduler, including across stop/start cycles.
    pub fn current_tick(&self) -> u64 {
        self.current_tick
    }

    /// Fires at most one tick if an interval has elapsed since the last one.
    /// Returns true if a tick fired.
    ///
    /// A callback that panics is caught and logged; the remaining callbacks
    /// and subsequent ticks still run.
    pub fn poll(&mut self, now: Instant) -> bool {
        if !self.running {
            return false;
        }
        let due = match self.last_fired {
            Some(last) => now.duration_since(last) >= self.interval,
            None => true,
        };
        if !due {
            return false;
        }

        // Anchor to `now`, not `last + interval`: time lost to a stall is
        // dropped instead of replayed as a burst of catch-up ticks.
        self.last_fired = Some(now);
        self.current_tick += 1;
        let tick = self.current_tick;

        for (id, callback) in &mut self.callbacks {
            let result = catch_unwind(AssertUnwindSafe(|| callback(tick)));
            if result.is_err() {
                log::error!("tick callback {:?} panicked on tick {}; continuing", id, tick);
            }
        }
        true
    }

    /// Blocking driver: sleeps between polls until `ticks` more ticks have
    /// fired. Production callers embed this in their own run loop; tests use
    /// [`TickScheduler::poll`] directly.
    pub fn run_for_ticks(&mut self, ticks: u64) {
        let target = self.current_tick + ticks;
        while self.running && self.current_tick < target {
            let now = Instant::now();
            if !self.poll(now) {
                if let Some(last) = self.last_fired {
                    let next_due = last + self.interval;
                    let now = Instant::now();
                    if next_due > now {
                        thread::sleep(next_due - now);
                    }
                }
            }
        }
    }
}
