//! Sampling schedule
//!
//! The session loop awaits a [`Ticker`] rather than sleeping directly, so
//! tests and tools can drive ticks by hand.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval, Interval, MissedTickBehavior};

#[async_trait::async_trait]
pub trait Ticker: Send {
    /// Wait for the next tick; `false` once the schedule has ended
    ///
    /// Must be cancel safe: the session drops a pending `tick()` whenever
    /// another event wins the race.
    async fn tick(&mut self) -> bool;
}

/// Fixed-period ticker
///
/// A tick delayed by a slow classifier pushes later ticks back instead of
/// firing a burst to catch up.
pub struct IntervalTicker {
    interval: Interval,
    remaining: Option<usize>,
}

impl IntervalTicker {
    pub fn new(period: Duration) -> Self {
        let mut interval = interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            interval,
            remaining: None,
        }
    }

    /// End the schedule after `count` ticks
    pub fn take(mut self, count: usize) -> Self {
        self.remaining = Some(count);
        self
    }
}

#[async_trait::async_trait]
impl Ticker for IntervalTicker {
    async fn tick(&mut self) -> bool {
        match self.remaining {
            Some(0) => false,
            Some(ref mut n) => {
                self.interval.tick().await;
                *n -= 1;
                true
            }
            None => {
                self.interval.tick().await;
                true
            }
        }
    }
}

/// Ticks whenever a unit is sent; ends when every sender is dropped
pub struct ChannelTicker {
    rx: mpsc::Receiver<()>,
}

impl ChannelTicker {
    pub fn new(buffer: usize) -> (mpsc::Sender<()>, Self) {
        let (tx, rx) = mpsc::channel(buffer);
        (tx, Self { rx })
    }
}

#[async_trait::async_trait]
impl Ticker for ChannelTicker {
    async fn tick(&mut self) -> bool {
        self.rx.recv().await.is_some()
    }
}
