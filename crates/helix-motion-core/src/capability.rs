//! Named services and topics a backend advertises, and the sets a program requires.

use std::{collections::HashSet, fmt};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Whether a name refers to a request/response service or a pub/sub topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityKind {
    Service,
    Topic,
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Service => f.write_str("service"),
            Self::Topic => f.write_str("topic"),
        }
    }
}

/// An advertised `{name, kind}` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Capability {
    pub name: String,
    pub kind: CapabilityKind,
}

impl Capability {
    #[must_use]
    pub fn service(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: CapabilityKind::Service,
        }
    }

    #[must_use]
    pub fn topic(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: CapabilityKind::Topic,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.name)
    }
}

/// A service or topic together with the ROS type used to talk on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Channel {
    pub name: String,
    pub kind: CapabilityKind,
    /// ROS message or service type, e.g. `std_msgs/msg/Float64MultiArray`.
    pub type_name: String,
}

impl Channel {
    #[must_use]
    pub fn service(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: CapabilityKind::Service,
            type_name: type_name.into(),
        }
    }

    #[must_use]
    pub fn topic(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: CapabilityKind::Topic,
            type_name: type_name.into(),
        }
    }

    #[must_use]
    pub fn capability(&self) -> Capability {
        Capability {
            name: self.name.clone(),
            kind: self.kind,
        }
    }
}

/// Set of capabilities currently advertised by a backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    entries: HashSet<Capability>,
}

impl Capabilities {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, capability: Capability) -> bool {
        self.entries.insert(capability)
    }

    #[must_use]
    pub fn contains(&self, capability: &Capability) -> bool {
        self.entries.contains(capability)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Advertised names of the given kind.
    pub fn names(&self, kind: CapabilityKind) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(move |c| c.kind == kind)
            .map(|c| c.name.as_str())
    }
}

impl FromIterator<Capability> for Capabilities {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Capabilities {
    type Item = Capability;
    type IntoIter = std::collections::hash_set::IntoIter<Capability>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Extend<Capability> for Capabilities {
    fn extend<I: IntoIterator<Item = Capability>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

/// Capability validation error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapabilityError {
    #[error("Required {kind} not available: {name}")]
    Missing { name: String, kind: CapabilityKind },
}

/// Ordered list of capabilities a program needs before any motion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilityRequirement {
    required: Vec<Capability>,
}

impl CapabilityRequirement {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, capability: Capability) -> Self {
        if !self.required.contains(&capability) {
            self.required.push(capability);
        }
        self
    }

    #[must_use]
    pub fn required(&self) -> &[Capability] {
        &self.required
    }

    /// Check every requirement against `advertised`, in declaration order.
    ///
    /// # Errors
    /// Returns the first missing capability.
    pub fn check(&self, advertised: &Capabilities) -> Result<(), CapabilityError> {
        match self.required.iter().find(|c| !advertised.contains(c)) {
            Some(missing) => Err(CapabilityError::Missing {
                name: missing.name.clone(),
                kind: missing.kind,
            }),
            None => Ok(()),
        }
    }
}

impl FromIterator<Capability> for CapabilityRequirement {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        iter.into_iter().fold(Self::new(), Self::with)
    }
}
