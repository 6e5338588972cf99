//! Type-safe identifiers for monitored geofences.
//!
//! Identifiers use Arc<str> for cheap cloning and minimal memory overhead.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Opaque key correlating a geofence-enter event back to the route step it
/// was registered for.
///
/// The tracker assigns one per step when a route is loaded (the step's
/// position in the route, stringified). Ids are unique within a route and
/// stable for that route's lifetime.
#[derive(Clone, Debug)]
pub struct GeofenceId(Arc<str>);

impl GeofenceId {
    pub fn new(s: impl AsRef<str>) -> Self {
        Self(s.as_ref().into())
    }

    /// Id for the step at `index` within a loaded route.
    pub fn from_index(index: usize) -> Self {
        Self(index.to_string().into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for GeofenceId {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for GeofenceId {}

impl Hash for GeofenceId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl fmt::Display for GeofenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for GeofenceId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for GeofenceId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
