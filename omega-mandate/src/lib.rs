//! Mandate lifecycle component
//!
//! Loads the operator profile, runs the activation sequence ahead of the
//! controller and exposes a sync peer the controller's sync loop can reach.

pub mod mandate;
pub mod profile;

pub use mandate::{MandateError, MandateIntegration, MandateReport, MandateStatus, CLASSIFICATION, VERSION};
pub use profile::{load_profile, MandateProfile, ProfileSource, DEFAULT_PROFILE_FILE};
