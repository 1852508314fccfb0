/*!
Dependent-system links.

The controller connects to its dependent systems once during `initialize` and
again on every recovery attempt. The step sits behind [`LinkEstablisher`] so the
composing process (or a test) decides what "connecting" means; [`StaticLinks`]
is the default and only announces the configured link names.
*/

use tracing::info;

use crate::error::LinkError;

pub const DVA12_PROFILE: &str = "DVA12_PROFILE";
pub const PROJECT_JANUS: &str = "PROJECT_JANUS";
pub const G3_MANDATE: &str = "G3_MANDATE";
pub const OPERATIONAL_BLUEPRINTS: &str = "OPERATIONAL_BLUEPRINTS";

/// Connection-establishment step shared by `initialize` and recovery.
/// Called with the controller lock held, so implementations must not block on I/O.
pub trait LinkEstablisher: Send + Sync {
    /// Names of the links this establisher manages.
    fn links(&self) -> Vec<String>;

    fn establish(&self) -> Result<(), LinkError>;
}

#[derive(Debug, Clone)]
pub struct StaticLinks {
    names: Vec<String>,
}

impl StaticLinks {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for StaticLinks {
    fn default() -> Self {
        Self::new([DVA12_PROFILE, PROJECT_JANUS, G3_MANDATE, OPERATIONAL_BLUEPRINTS])
    }
}

impl LinkEstablisher for StaticLinks {
    fn links(&self) -> Vec<String> {
        self.names.clone()
    }

    fn establish(&self) -> Result<(), LinkError> {
        for name in &self.names {
            info!(link = %name, "link connected");
        }
        Ok(())
    }
}
