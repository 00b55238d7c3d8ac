//! One complete simulation run.
//!
//! [`run_simulation`] owns the lifecycle:
//!
//! 1. validate the config and seed the master RNG
//! 2. place the traps and start the collector with the stream header
//! 3. spawn one actor per cell
//! 4. spawn every traveler at once, then the squatters one interval apart
//! 5. wait for every agent, then let the grid and the collector wind down
//!
//! The collector only finishes once every event sender is gone. Cells hold a
//! sender each, so the grid is dropped before the collector is awaited.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use travelers_agents::{AgentError, Squatter, SquatterOutcome, Traveler, TravelerOutcome};
use travelers_events::{
    Collector, CollectorError, CollectorStats, EventSender, EventSink, StreamHeader,
};
use travelers_types::EventClock;
use travelers_world::{Grid, TrapRegistry, WorldError};

use crate::config::{ConfigError, SimulationConfig};

/// Errors that can end a run early.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The configuration was rejected before anything started.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// The board could not be built.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },

    /// An agent lost contact with a cell or the collector.
    #[error("agent error: {source}")]
    Agent {
        /// The underlying agent error.
        #[from]
        source: AgentError,
    },

    /// The collector failed to write the stream.
    #[error("collector error: {source}")]
    Collector {
        /// The underlying collector error.
        #[from]
        source: CollectorError,
    },

    /// An agent task panicked or was cancelled.
    #[error("agent task failed: {message}")]
    Join {
        /// Description of the join failure.
        message: String,
    },
}

/// How every agent ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeTally {
    /// Travelers that walked their whole budget.
    pub finished: u32,
    /// Travelers killed by a trap.
    pub trap_deaths: u32,
    /// Travelers frozen in place.
    pub deadlocked: u32,
    /// Travelers that never found a starting cell.
    pub no_start: u32,
    /// Squatters whose lifetime ran out.
    pub squatters_expired: u32,
    /// Squatters killed by a trap while fleeing.
    pub squatters_trapped: u32,
    /// Squatters that never found a spot.
    pub squatters_no_spot: u32,
    /// Total successful squatter moves after kicks.
    pub relocations: u32,
}

impl OutcomeTally {
    /// Count one traveler ending.
    pub const fn record_traveler(&mut self, outcome: &TravelerOutcome) {
        let slot = match outcome {
            TravelerOutcome::Finished { .. } => &mut self.finished,
            TravelerOutcome::TrapDeath { .. } => &mut self.trap_deaths,
            TravelerOutcome::Deadlocked { .. } => &mut self.deadlocked,
            TravelerOutcome::NoStart => &mut self.no_start,
        };
        *slot = slot.saturating_add(1);
    }

    /// Count one squatter ending.
    pub const fn record_squatter(&mut self, outcome: &SquatterOutcome) {
        match *outcome {
            SquatterOutcome::Expired { relocations, .. } => {
                self.squatters_expired = self.squatters_expired.saturating_add(1);
                self.relocations = self.relocations.saturating_add(relocations);
            }
            SquatterOutcome::TrapDeath { relocations, .. } => {
                self.squatters_trapped = self.squatters_trapped.saturating_add(1);
                self.relocations = self.relocations.saturating_add(relocations);
            }
            SquatterOutcome::NoSpot => {
                self.squatters_no_spot = self.squatters_no_spot.saturating_add(1);
            }
        }
    }

    /// Travelers accounted for.
    pub const fn travelers(&self) -> u32 {
        self.finished
            .saturating_add(self.trap_deaths)
            .saturating_add(self.deadlocked)
            .saturating_add(self.no_start)
    }

    /// Squatters accounted for.
    pub const fn squatters(&self) -> u32 {
        self.squatters_expired
            .saturating_add(self.squatters_trapped)
            .saturating_add(self.squatters_no_spot)
    }
}

/// Result of a completed run.
#[derive(Debug)]
pub struct SimulationResult<S> {
    /// The seed the master RNG was built from.
    pub seed: u64,
    /// How every agent ended.
    pub tally: OutcomeTally,
    /// What the collector wrote.
    pub stats: CollectorStats,
    /// The sink, flushed and handed back.
    pub sink: S,
}

/// Run one simulation to completion, streaming events into `sink`.
///
/// # Errors
///
/// Returns [`RunnerError`] if the config is invalid, the board cannot be
/// built, an agent loses its cells or collector, or the sink fails.
pub async fn run_simulation<S>(
    config: &SimulationConfig,
    sink: S,
) -> Result<SimulationResult<S>, RunnerError>
where
    S: EventSink + Send + 'static,
{
    config.validate()?;

    let seed = config.world.seed.unwrap_or_else(rand::random);
    let mut master = StdRng::seed_from_u64(seed);
    let dimensions = config.world.dimensions();
    let traps = TrapRegistry::generate(dimensions, config.world.traps, &mut master)?;

    info!(
        seed,
        dimensions = %dimensions,
        traps = traps.len(),
        travelers = config.travelers.count,
        max_squatters = config.squatters.max_squatters,
        "Simulation starting"
    );
    for trap in traps.iter() {
        debug!(%trap, "trap placed");
    }

    let header = StreamHeader {
        total_entities: config.header_total(),
        dimensions,
    };
    let (collector, events) =
        Collector::spawn(sink, header, config.runtime.collector_capacity);
    let clock = EventClock::start();

    let grid = Arc::new(Grid::spawn(
        dimensions,
        &traps,
        &events,
        clock,
        config.runtime.cell_mailbox_capacity,
    )?);

    let travelers: Vec<JoinHandle<Result<TravelerOutcome, AgentError>>> = (1..=config.travelers.count)
        .map(|number| {
            let traveler = Traveler::new(
                number,
                Arc::clone(&grid),
                config.travelers.clone(),
                StdRng::seed_from_u64(master.random()),
                clock,
            );
            let events = events.clone();
            tokio::spawn(async move { traveler.run(&events).await })
        })
        .collect();

    let squatters = spawn_squatters(config, &grid, &events, clock, &mut master).await;

    // Cells and agents hold the remaining senders.
    drop(grid);
    drop(events);

    let mut tally = OutcomeTally::default();
    let traveler_error = settle(travelers, |outcome| tally.record_traveler(outcome)).await;
    let squatter_error = settle(squatters, |outcome| tally.record_squatter(outcome)).await;

    // Drain the collector even after a failure so flushed histories are written.
    let report = collector.finish().await;
    if let Some(error) = traveler_error.or(squatter_error) {
        return Err(error);
    }
    let report = report?;
    info!(
        seed,
        finished = tally.finished,
        trap_deaths = tally.trap_deaths,
        deadlocked = tally.deadlocked,
        no_start = tally.no_start,
        squatters_expired = tally.squatters_expired,
        squatters_trapped = tally.squatters_trapped,
        squatters_no_spot = tally.squatters_no_spot,
        relocations = tally.relocations,
        events = report.stats.events,
        "Simulation complete"
    );

    Ok(SimulationResult {
        seed,
        tally,
        stats: report.stats,
        sink: report.sink,
    })
}

async fn spawn_squatters(
    config: &SimulationConfig,
    grid: &Arc<Grid>,
    events: &EventSender,
    clock: EventClock,
    master: &mut StdRng,
) -> Vec<JoinHandle<Result<SquatterOutcome, AgentError>>> {
    let interval = Duration::from_millis(config.squatters.spawn_interval_ms);
    let mut handles = Vec::new();

    for index in 0..config.squatters.max_squatters {
        if index > 0 {
            tokio::time::sleep(interval).await;
        }
        let squatter = Squatter::new(
            index,
            Arc::clone(grid),
            config.squatters.clone(),
            StdRng::seed_from_u64(master.random()),
            clock,
        );
        let events = events.clone();
        handles.push(tokio::spawn(async move { squatter.run(&events).await }));
    }
    handles
}

/// Await every agent, handing each outcome to `record`. The first failure is
/// returned only after all of them have finished.
async fn settle<T>(
    handles: Vec<JoinHandle<Result<T, AgentError>>>,
    mut record: impl FnMut(&T),
) -> Option<RunnerError> {
    let mut first_error = None;
    for handle in handles {
        let error = match join(handle).await {
            Ok(Ok(outcome)) => {
                record(&outcome);
                continue;
            }
            Ok(Err(e)) => {
                warn!(error = %e, "agent failed");
                RunnerError::from(e)
            }
            Err(e) => e,
        };
        if first_error.is_none() {
            first_error = Some(error);
        }
    }
    first_error
}

async fn join<T>(handle: JoinHandle<T>) -> Result<T, RunnerError> {
    handle.await.map_err(|e| {
        warn!(error = %e, "agent task did not complete");
        RunnerError::Join {
            message: e.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use travelers_events::TextSink;
    use travelers_types::{Coordinate, Direction};

    use super::*;

    #[derive(Debug)]
    struct Line {
        timestamp: u64,
        entity: u32,
        coord: Coordinate,
        symbol: char,
    }

    fn split(text: &str) -> (Vec<u64>, Vec<Line>) {
        let mut lines = text.lines();
        let header = lines
            .next()
            .unwrap()
            .split(' ')
            .map(|field| field.parse::<i64>().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(header.first(), Some(&-1));
        let header = header.iter().skip(1).map(|v| u64::try_from(*v).unwrap()).collect();

        let events = lines
            .map(|line| {
                let fields: Vec<&str> = line.split(' ').collect();
                assert_eq!(fields.len(), 5, "malformed line {line:?}");
                Line {
                    timestamp: fields[0].parse().unwrap(),
                    entity: fields[1].parse().unwrap(),
                    coord: Coordinate::new(fields[2].parse().unwrap(), fields[3].parse().unwrap()),
                    symbol: fields[4].chars().next().unwrap(),
                }
            })
            .collect();
        (header, events)
    }

    fn small_config(seed: u64) -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.world.seed = Some(seed);
        config.travelers.min_steps = 5;
        config.travelers.max_steps = 15;
        config.squatters.spawn_interval_ms = 100;
        config.squatters.lifetime_ms = 300;
        config
    }

    async fn run(config: &SimulationConfig) -> (SimulationResult<TextSink<Vec<u8>>>, String) {
        let result = run_simulation(config, TextSink::new(Vec::new()))
            .await
            .unwrap();
        let text = String::from_utf8(result.sink.get_ref().clone()).unwrap();
        (result, text)
    }

    #[tokio::test(start_paused = true)]
    async fn default_run_accounts_for_every_agent() {
        let config = small_config(7);
        let (result, text) = run(&config).await;

        assert_eq!(result.seed, 7);
        assert_eq!(result.tally.travelers(), 5);
        assert_eq!(result.tally.squatters(), 2);

        let (header, lines) = split(&text);
        assert_eq!(header, vec![12, 5, 5]);
        assert_eq!(result.stats.events, u64::try_from(lines.len()).unwrap());

        let births: BTreeSet<u32> = lines
            .iter()
            .filter(|l| l.symbol == '#')
            .map(|l| l.entity)
            .collect();
        assert_eq!(births.len(), 5);
        assert!(births.iter().all(|id| (2000..3000).contains(id)));
    }

    #[tokio::test(start_paused = true)]
    async fn per_entity_timestamps_increase_and_travelers_move_to_neighbours() {
        let config = small_config(21);
        let dims = config.world.dimensions();
        let (_, text) = run(&config).await;
        let (_, lines) = split(&text);

        let mut by_entity: BTreeMap<u32, Vec<&Line>> = BTreeMap::new();
        for line in &lines {
            by_entity.entry(line.entity).or_default().push(line);
        }

        for (entity, trail) in &by_entity {
            // Agents stamp through their own log; traps stamp straight off the clock.
            let ordered = if *entity < 2000 {
                trail.windows(2).all(|w| w[0].timestamp < w[1].timestamp)
            } else {
                trail.windows(2).all(|w| w[0].timestamp <= w[1].timestamp)
            };
            assert!(ordered, "entity {entity} has out-of-order timestamps");
        }

        for (entity, trail) in by_entity.iter().filter(|(id, _)| **id < 1000) {
            for pair in trail.windows(2) {
                let (a, b) = (pair[0].coord, pair[1].coord);
                let neighbour = Direction::ALL.iter().any(|d| dims.step(a, *d) == b);
                assert!(
                    a == b || neighbour,
                    "traveler {entity} jumped from {a} to {b}"
                );
            }
            let dead = trail.iter().filter(|l| l.symbol.is_ascii_lowercase()).count();
            assert!(dead <= 1, "traveler {entity} died twice");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn seeded_runs_place_the_same_traps() {
        let traps = |text: &str| -> BTreeSet<Coordinate> {
            split(text)
                .1
                .iter()
                .filter(|l| l.symbol == '#')
                .map(|l| l.coord)
                .collect()
        };

        let config = small_config(1234);
        let (_, first) = run(&config).await;
        let (_, second) = run(&config).await;
        assert_eq!(traps(&first), traps(&second));
    }

    #[tokio::test(start_paused = true)]
    async fn board_without_agents_prints_only_header_and_traps() {
        let mut config = small_config(3);
        config.world = crate::config::WorldConfig {
            width: 3,
            height: 2,
            traps: 6,
            seed: Some(3),
        };
        config.travelers.count = 0;
        config.squatters.max_squatters = 0;

        let (result, text) = run(&config).await;
        assert_eq!(result.tally, OutcomeTally::default());

        let (header, lines) = split(&text);
        assert_eq!(header, vec![6, 3, 2]);
        let cells: BTreeSet<Coordinate> = lines.iter().map(|l| l.coord).collect();
        assert_eq!(cells.len(), 6);
        assert!(lines.iter().all(|l| l.symbol == '#'));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_agent_does_not_cut_the_others_short() {
        let failing: JoinHandle<Result<u32, AgentError>> = tokio::spawn(async {
            Err(AgentError::from(WorldError::MailboxClosed(Coordinate::new(0, 0))))
        });
        let slow = tokio::spawn(async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(7)
        });
        let also_failing = tokio::spawn(async {
            Err(AgentError::from(WorldError::MailboxClosed(Coordinate::new(1, 0))))
        });

        let mut seen = Vec::new();
        let error = settle(vec![failing, slow, also_failing], |v| seen.push(*v)).await;
        assert_eq!(seen, vec![7]);
        assert!(matches!(
            error,
            Some(RunnerError::Agent {
                source: AgentError::World {
                    source: WorldError::MailboxClosed(c)
                }
            }) if c == Coordinate::new(0, 0)
        ));
    }

    #[tokio::test]
    async fn invalid_config_is_rejected_before_output() {
        let mut config = SimulationConfig::default();
        config.world.width = 0;
        let result = run_simulation(&config, TextSink::new(Vec::new())).await;
        assert!(matches!(result, Err(RunnerError::Config { .. })));
    }
}
