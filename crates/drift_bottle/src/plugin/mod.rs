pub mod drift_bottle;

pub use drift_bottle::{DriftBottle, drift_bottle_plugin};
