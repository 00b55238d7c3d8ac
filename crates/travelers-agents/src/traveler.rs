//! The traveler process.
//!
//! ```text
//! SearchingStart ──TrapTriggered──▶ TrapDeath
//!       │ Granted
//!       ▼
//!   MovingStep ──Granted──▶ MovingStep
//!       ├──TrapTriggered──▶ TrapDeath
//!       ├──all attempts denied──▶ Deadlocked
//!       └──step budget spent──▶ Finished
//! ```
//!
//! A deadlocked traveler keeps its cell forever: it records its death
//! symbol where it stands and never releases. Every other ending leaves the
//! board as it found it.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use tracing::{debug, info};
use travelers_events::{EventLog, EventSender};
use travelers_types::{Coordinate, Direction, EntityId, EventClock, ReserveOutcome, Symbol};
use travelers_world::Grid;

use crate::config::{TravelerConfig, search_budget};
use crate::error::AgentError;

/// How a traveler's life ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelerOutcome {
    /// No starting cell could be reserved within the attempt budget.
    NoStart,
    /// Killed by the trap at `at`, either on arrival or at start.
    TrapDeath {
        /// The trap's coordinate.
        at: Coordinate,
    },
    /// Every attempt of one step was denied; the traveler froze at `at`.
    Deadlocked {
        /// The cell the traveler still holds.
        at: Coordinate,
    },
    /// The whole step budget was walked.
    Finished {
        /// Steps taken.
        steps: u32,
    },
}

enum StepResult {
    Moved(Coordinate),
    Died(Coordinate),
    Blocked,
}

/// A mobile agent walking the board at random.
#[derive(Debug)]
pub struct Traveler {
    id: EntityId,
    symbol: Symbol,
    grid: Arc<Grid>,
    config: TravelerConfig,
    rng: StdRng,
    log: EventLog,
}

impl Traveler {
    /// Create the traveler with the given 1-based number.
    pub fn new(
        number: u32,
        grid: Arc<Grid>,
        config: TravelerConfig,
        rng: StdRng,
        clock: EventClock,
    ) -> Self {
        let id = EntityId::traveler(number);
        Self {
            id,
            symbol: Symbol::traveler(number),
            grid,
            config,
            rng,
            log: EventLog::new(id, clock),
        }
    }

    /// This traveler's identity.
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Run to a terminal state, then hand the history to the collector.
    ///
    /// The history is flushed exactly once on every path, including when the
    /// walk itself fails.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] if a cell or the collector became unreachable.
    pub async fn run(mut self, events: &EventSender) -> Result<TravelerOutcome, AgentError> {
        let walked = self.walk().await;
        let flushed = self.log.flush(events).await;
        let outcome = walked?;
        let recorded = flushed?;
        info!(traveler = %self.id, ?outcome, events = recorded, "traveler finished");
        Ok(outcome)
    }

    async fn walk(&mut self) -> Result<TravelerOutcome, AgentError> {
        let mut pos = match self.find_start().await? {
            StepResult::Moved(start) => start,
            StepResult::Died(at) => return Ok(TravelerOutcome::TrapDeath { at }),
            StepResult::Blocked => return Ok(TravelerOutcome::NoStart),
        };

        let steps = self.config.draw_steps(&mut self.rng);
        debug!(traveler = %self.id, start = %pos, steps, "traveler started");

        for _ in 0..steps {
            let delay = self.config.draw_delay(&mut self.rng);
            tokio::time::sleep(delay).await;

            match self.step_from(pos).await? {
                StepResult::Moved(next) => pos = next,
                StepResult::Died(at) => return Ok(TravelerOutcome::TrapDeath { at }),
                StepResult::Blocked => {
                    // Frozen in place: the cell stays held for the rest of the run.
                    self.log.record(pos, self.symbol.to_death());
                    return Ok(TravelerOutcome::Deadlocked { at: pos });
                }
            }
        }

        self.grid.cell(pos)?.release(self.id).await?;
        Ok(TravelerOutcome::Finished { steps })
    }

    async fn find_start(&mut self) -> Result<StepResult, AgentError> {
        let budget = search_budget(self.config.max_attempts, self.grid.dimensions().cell_count());

        for _ in 0..budget {
            let coord = self.grid.random_coordinate(&mut self.rng);
            let cell = self.grid.cell(coord)?;
            match cell.reserve(self.id).await? {
                ReserveOutcome::Granted => {
                    self.log.record(coord, self.symbol);
                    return Ok(StepResult::Moved(coord));
                }
                ReserveOutcome::TrapTriggered => {
                    self.log.record(coord, self.symbol);
                    self.log.record(coord, self.symbol.to_death());
                    sleep_ms(self.config.start_trap_hold_ms).await;
                    cell.release(self.id).await?;
                    return Ok(StepResult::Died(coord));
                }
                ReserveOutcome::Denied => sleep_ms(self.config.retry_backoff_ms).await,
            }
        }

        debug!(traveler = %self.id, budget, "no starting cell found");
        Ok(StepResult::Blocked)
    }

    async fn step_from(&mut self, pos: Coordinate) -> Result<StepResult, AgentError> {
        for _ in 0..self.config.max_attempts {
            let next = self.grid.neighbor(pos, Direction::random(&mut self.rng));
            match self.grid.cell(next)?.reserve(self.id).await? {
                ReserveOutcome::Granted => {
                    self.grid.cell(pos)?.release(self.id).await?;
                    self.log.record(next, self.symbol);
                    return Ok(StepResult::Moved(next));
                }
                ReserveOutcome::TrapTriggered => {
                    self.grid.cell(pos)?.release(self.id).await?;
                    sleep_ms(self.config.trap_entry_delay_ms).await;
                    self.log.record(next, self.symbol.to_death());
                    sleep_ms(self.config.trap_hold_ms).await;
                    self.grid.cell(next)?.release(self.id).await?;
                    return Ok(StepResult::Died(next));
                }
                ReserveOutcome::Denied => sleep_ms(self.config.retry_backoff_ms).await,
            }
        }
        Ok(StepResult::Blocked)
    }
}

pub(crate) async fn sleep_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use travelers_types::{CellStatus, GridDimensions};

    use super::*;
    use crate::testing::{Board, parse_lines};

    fn config(min_steps: u32, max_steps: u32) -> TravelerConfig {
        TravelerConfig {
            count: 1,
            min_steps,
            max_steps,
            ..TravelerConfig::default()
        }
    }

    fn traveler(board: &Board, config: TravelerConfig, seed: u64) -> Traveler {
        Traveler::new(
            1,
            Arc::clone(&board.grid),
            config,
            StdRng::seed_from_u64(seed),
            board.clock,
        )
    }

    fn adjacent(dims: GridDimensions, a: Coordinate, b: Coordinate) -> bool {
        Direction::ALL.iter().any(|d| dims.step(a, *d) == b)
    }

    #[tokio::test(start_paused = true)]
    async fn single_step_on_empty_board_moves_once_and_releases() {
        let dims = GridDimensions::new(5, 5);
        let board = Board::new(dims, &[]);
        let outcome = traveler(&board, config(1, 1), 11).run(&board.events).await;
        assert_eq!(outcome.unwrap(), TravelerOutcome::Finished { steps: 1 });

        let snapshot = board.grid.snapshot().await.unwrap();
        assert!(snapshot.iter().all(|(_, s)| *s == CellStatus::Free));

        let lines = parse_lines(&board.finish().await);
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.entity == 1 && l.symbol == 'A'));
        let (first, second) = (lines[0].coord(), lines[1].coord());
        assert!(adjacent(dims, first, second), "{first} -> {second}");
    }

    #[tokio::test(start_paused = true)]
    async fn lone_traveler_completes_its_budget() {
        let board = Board::new(GridDimensions::new(5, 5), &[]);
        let outcome = traveler(&board, config(5, 20), 5).run(&board.events).await;
        let steps = match outcome.unwrap() {
            TravelerOutcome::Finished { steps } => steps,
            other => panic!("unexpected outcome {other:?}"),
        };
        assert!((5..=20).contains(&steps));

        let lines = parse_lines(&board.finish().await);
        assert_eq!(lines.len(), usize::try_from(steps).unwrap() + 1);
        assert!(lines.iter().all(|l| l.symbol == 'A'));
    }

    #[tokio::test(start_paused = true)]
    async fn starting_on_a_trap_logs_appearance_then_death_before_rebirth() {
        let trap = Coordinate::new(0, 0);
        let board = Board::new(GridDimensions::new(1, 1), &[trap]);
        let outcome = traveler(&board, config(3, 3), 1).run(&board.events).await;
        assert_eq!(outcome.unwrap(), TravelerOutcome::TrapDeath { at: trap });
        assert_eq!(
            board.grid.cell(trap).unwrap().reserve(EntityId::traveler(9)).await.unwrap(),
            ReserveOutcome::TrapTriggered
        );

        let lines = parse_lines(&board.finish().await);
        let mine: Vec<_> = lines.iter().filter(|l| l.entity == 1).collect();
        let births: Vec<_> = lines.iter().filter(|l| l.symbol == '#').collect();
        assert_eq!(mine.len(), 2);
        assert_eq!((mine[0].symbol, mine[1].symbol), ('A', 'a'));
        assert_eq!(births.len(), 2);
        assert!(births.iter().all(|b| b.entity == 2000));
        assert!(mine[0].timestamp < mine[1].timestamp);
        assert!(mine[1].timestamp < births[1].timestamp);
    }

    #[tokio::test(start_paused = true)]
    async fn walking_next_to_a_trap_ends_on_it() {
        let trap = Coordinate::new(1, 0);
        let board = Board::new(GridDimensions::new(2, 1), &[trap]);
        let cfg = TravelerConfig {
            max_attempts: 64,
            ..config(10, 10)
        };
        let outcome = traveler(&board, cfg, 21).run(&board.events).await;
        assert_eq!(outcome.unwrap(), TravelerOutcome::TrapDeath { at: trap });

        let free = board.grid.cell(Coordinate::new(0, 0)).unwrap().status().await.unwrap();
        assert_eq!(free, CellStatus::Free);

        let lines = parse_lines(&board.finish().await);
        let last = lines.iter().filter(|l| l.entity == 1).last().unwrap();
        assert_eq!((last.symbol, last.coord()), ('a', trap));
    }

    #[tokio::test(start_paused = true)]
    async fn boxed_in_traveler_deadlocks_and_keeps_its_cell() {
        let only = Coordinate::new(0, 0);
        let board = Board::new(GridDimensions::new(1, 1), &[]);
        let outcome = traveler(&board, config(2, 2), 4).run(&board.events).await;
        assert_eq!(outcome.unwrap(), TravelerOutcome::Deadlocked { at: only });

        let status = board.grid.cell(only).unwrap().status().await.unwrap();
        assert_eq!(status, CellStatus::OccupiedTraveler);

        let lines = parse_lines(&board.finish().await);
        let symbols: Vec<char> = lines.iter().map(|l| l.symbol).collect();
        assert_eq!(symbols, vec!['A', 'a']);
    }

    #[tokio::test(start_paused = true)]
    async fn full_board_exhausts_start_search_quietly() {
        let only = Coordinate::new(0, 0);
        let board = Board::new(GridDimensions::new(1, 1), &[]);
        let holder = board.grid.cell(only).unwrap();
        assert_eq!(
            holder.reserve(EntityId::traveler(7)).await.unwrap(),
            ReserveOutcome::Granted
        );

        let outcome = traveler(&board, config(1, 1), 9).run(&board.events).await;
        assert_eq!(outcome.unwrap(), TravelerOutcome::NoStart);
        assert!(parse_lines(&board.finish().await).is_empty());
    }
}
