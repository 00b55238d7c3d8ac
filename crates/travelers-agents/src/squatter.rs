//! The squatter process.
//!
//! ```text
//! SearchingSpot ──Granted──▶ Occupying ◀──────────────┐
//!                              │ kick                 │ Granted / no way out
//!                              ▼                      │
//!                          Relocating ────────────────┘
//!                              │ TrapTriggered
//!                              ▼
//!                          TrapDeath
//! Occupying ──lifetime spent──▶ Expired
//! ```
//!
//! Squatters are evicted cooperatively. A traveler's denied reservation
//! makes the cell post a [`Kick`](travelers_world::Kick) on the squatter's
//! eviction channel; the squatter notices it at its next poll and tries the
//! four neighbours in a fixed order. The traveler never waits for this.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use tracing::{debug, info};
use travelers_events::{EventLog, EventSender};
use travelers_types::{Coordinate, Direction, EntityId, EventClock, ReserveOutcome, Symbol};
use travelers_world::{EvictionInbox, EvictionNotifier, Grid, eviction_channel};

use crate::config::{SquatterConfig, search_budget};
use crate::error::AgentError;
use crate::traveler::sleep_ms;

/// How a squatter's life ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SquatterOutcome {
    /// No free cell could be claimed within the attempt budget.
    NoSpot,
    /// The lifetime ran out; the squatter left `at` voluntarily.
    Expired {
        /// The cell it vacated.
        at: Coordinate,
        /// Successful moves after kicks.
        relocations: u32,
    },
    /// Fleeing a kick, the squatter stepped onto the trap at `at`.
    TrapDeath {
        /// The trap's coordinate.
        at: Coordinate,
        /// Successful moves after kicks before the fatal one.
        relocations: u32,
    },
}

enum Relocation {
    Moved(Coordinate),
    Trapped(Coordinate),
    Stuck,
}

/// A transient occupant that travelers can evict.
#[derive(Debug)]
pub struct Squatter {
    id: EntityId,
    symbol: Symbol,
    grid: Arc<Grid>,
    config: SquatterConfig,
    rng: StdRng,
    log: EventLog,
    notifier: EvictionNotifier,
    inbox: EvictionInbox,
}

impl Squatter {
    /// Create the squatter with the given 0-based spawn index.
    pub fn new(
        index: u32,
        grid: Arc<Grid>,
        config: SquatterConfig,
        rng: StdRng,
        clock: EventClock,
    ) -> Self {
        let id = EntityId::squatter(index);
        let (notifier, inbox) = eviction_channel();
        Self {
            id,
            symbol: Symbol::squatter(index),
            grid,
            config,
            rng,
            log: EventLog::new(id, clock),
            notifier,
            inbox,
        }
    }

    /// This squatter's identity.
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Run to a terminal state, then hand the history to the collector.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] if a cell or the collector became unreachable.
    pub async fn run(mut self, events: &EventSender) -> Result<SquatterOutcome, AgentError> {
        let lived = self.live().await;
        let flushed = self.log.flush(events).await;
        let outcome = lived?;
        let recorded = flushed?;
        info!(squatter = %self.id, ?outcome, events = recorded, "squatter finished");
        Ok(outcome)
    }

    async fn live(&mut self) -> Result<SquatterOutcome, AgentError> {
        let Some(mut pos) = self.find_spot().await? else {
            return Ok(SquatterOutcome::NoSpot);
        };

        let poll = Duration::from_millis(self.config.poll_interval_ms);
        let mut elapsed_ms: u64 = 0;
        let mut relocations: u32 = 0;

        loop {
            let kicked = tokio::select! {
                kick = self.inbox.recv() => kick.is_some(),
                () = tokio::time::sleep(poll) => false,
            };

            if kicked {
                elapsed_ms = elapsed_ms.saturating_add(self.config.kick_penalty_ms);
                match self.relocate(pos).await? {
                    Relocation::Moved(next) => {
                        pos = next;
                        relocations = relocations.saturating_add(1);
                    }
                    Relocation::Trapped(at) => {
                        return Ok(SquatterOutcome::TrapDeath { at, relocations });
                    }
                    Relocation::Stuck => {
                        debug!(squatter = %self.id, cell = %pos, "kicked but nowhere to go");
                    }
                }
            } else {
                elapsed_ms = elapsed_ms.saturating_add(self.config.poll_interval_ms);
            }

            if elapsed_ms > self.config.lifetime_ms {
                self.grid.cell(pos)?.release(self.id).await?;
                self.log.record(pos, Symbol::VACATED);
                return Ok(SquatterOutcome::Expired { at: pos, relocations });
            }
        }
    }

    async fn find_spot(&mut self) -> Result<Option<Coordinate>, AgentError> {
        let budget = search_budget(self.config.max_attempts, self.grid.dimensions().cell_count());

        for _ in 0..budget {
            let coord = self.grid.random_coordinate(&mut self.rng);
            let cell = self.grid.cell(coord)?;
            match cell.squatter_reserve(self.id).await? {
                ReserveOutcome::Granted => {
                    self.log.record(coord, self.symbol);
                    cell.register_eviction_channel(self.notifier.clone()).await?;
                    return Ok(Some(coord));
                }
                ReserveOutcome::TrapTriggered => {
                    // Searching squatters do not die; hand the trap back and look elsewhere.
                    cell.abandon(self.id).await?;
                }
                ReserveOutcome::Denied => sleep_ms(self.config.retry_backoff_ms).await,
            }
        }

        debug!(squatter = %self.id, budget, "no free spot found");
        Ok(None)
    }

    async fn relocate(&mut self, pos: Coordinate) -> Result<Relocation, AgentError> {
        for direction in Direction::ALL {
            let next = self.grid.neighbor(pos, direction);
            let target = self.grid.cell(next)?;
            match target.squatter_reserve(self.id).await? {
                ReserveOutcome::Granted => {
                    self.grid.cell(pos)?.release(self.id).await?;
                    target.register_eviction_channel(self.notifier.clone()).await?;
                    self.log.record(next, self.symbol);
                    return Ok(Relocation::Moved(next));
                }
                ReserveOutcome::TrapTriggered => {
                    self.grid.cell(pos)?.release(self.id).await?;
                    self.log.record(pos, Symbol::VACATED);
                    self.log.record(next, Symbol::TRAP_ENTRY);
                    sleep_ms(self.config.trap_hold_ms).await;
                    target.release(self.id).await?;
                    return Ok(Relocation::Trapped(next));
                }
                ReserveOutcome::Denied => {}
            }
        }
        Ok(Relocation::Stuck)
    }
}
