//! Platform capability detection
//!
//! Optional host facilities (speech recognition, speech synthesis) are probed
//! once at startup and handed to the adapters as a [`Capability`]. Adapters
//! never probe the host themselves.

use std::fmt;

/// An optional platform facility, resolved once
#[derive(Clone)]
pub enum Capability<T> {
    /// The facility is present
    Supported(T),
    /// The facility is absent on this host
    Unsupported {
        /// Why the facility is unavailable
        reason: String,
    },
}

impl<T> Capability<T> {
    /// Build an unsupported capability
    pub fn unsupported(reason: impl Into<String>) -> Self {
        Self::Unsupported {
            reason: reason.into(),
        }
    }

    /// Whether the facility is present
    #[must_use]
    pub const fn is_supported(&self) -> bool {
        matches!(self, Self::Supported(_))
    }

    /// Borrow the facility if present
    #[must_use]
    pub const fn get(&self) -> Option<&T> {
        match self {
            Self::Supported(inner) => Some(inner),
            Self::Unsupported { .. } => None,
        }
    }

    /// Map the supported value, keeping the unsupported reason
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Capability<U> {
        match self {
            Self::Supported(inner) => Capability::Supported(f(inner)),
            Self::Unsupported { reason } => Capability::Unsupported { reason },
        }
    }

    /// The unsupported reason, if any
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Supported(_) => None,
            Self::Unsupported { reason } => Some(reason),
        }
    }
}

impl<T> From<Option<T>> for Capability<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or_else(|| Self::unsupported("not available"), Self::Supported)
    }
}

impl<T> fmt::Debug for Capability<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Supported(_) => f.write_str("Supported"),
            Self::Unsupported { reason } => write!(f, "Unsupported({reason})"),
        }
    }
}
