pub mod engine;
pub mod random;
pub mod seed;
pub mod walk;

pub use engine::{normalize_tickers, SimulationEngine, SimulatorSettings};
pub use random::{ChaChaSource, FixedSource, RandomSource};
