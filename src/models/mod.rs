pub mod reading;

pub use reading::{ReadingSet, SensorFrame};
