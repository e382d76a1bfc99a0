pub mod controller;
pub mod loop_worker;
pub mod simulator;

pub use controller::SensingController;
pub use loop_worker::SIMULATION_PERIOD;
pub use simulator::{advance, DriftSource, RandomDrift};
