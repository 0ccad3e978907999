pub mod catalog;
pub mod config;
pub mod constants;
pub mod env_state;
pub mod orbit_record;
pub mod propagator;
pub mod ref_system;
pub mod satcat_errors;
pub mod scheduler;
pub mod time;
pub mod tracked_object;
pub mod tracker;
pub mod visual;

pub use catalog::{ingest::IngestReport, source::CatalogSource, Catalog};
pub use config::{OpMode, TrackerConfig};
pub use propagator::{Propagator, Sgp4Propagator, StateVector};
pub use satcat_errors::SatcatError;
pub use tracker::Tracker;
pub use visual::{MarkerHandle, MarkerStyle, SceneRecorder, VisualManager};
