//! Configuration and orchestration for the travelers grid simulation.
//!
//! # Modules
//!
//! - [`config`] -- Loading `travelers-config.yaml` into [`SimulationConfig`]
//!   and validating it.
//! - [`runner`] -- [`run_simulation`]: wires the collector, the grid and
//!   every agent together and waits for all of them.
//!
//! [`SimulationConfig`]: config::SimulationConfig
//! [`run_simulation`]: runner::run_simulation

pub mod config;
pub mod runner;

pub use config::{ConfigError, RuntimeConfig, SimulationConfig, WorldConfig};
pub use runner::{OutcomeTally, RunnerError, SimulationResult, run_simulation};
