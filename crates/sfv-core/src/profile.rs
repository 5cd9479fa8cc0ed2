//! Grammar profile selection.
//!
//! Structured fields exist in two wire-compatible revisions. The legacy
//! profile (RFC 8941) covers integers, decimals, strings, tokens, byte
//! sequences, and booleans. The current profile (RFC 9651) is a strict
//! superset that adds dates and display strings. Parsers and serializers
//! take a [`Profile`] up front and reject the newer kinds under
//! [`Profile::Legacy`] instead of producing text a legacy peer would
//! misread.

use std::fmt;

use crate::error::{Result, SfvError};

/// The grammar revision a parser or serializer speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Profile {
    /// RFC 8941: no dates, no display strings.
    Legacy,
    /// RFC 9651: the full set of value kinds.
    #[default]
    Current,
}

impl Profile {
    /// True when this profile accepts dates and display strings.
    pub fn supports_extended_kinds(self) -> bool {
        matches!(self, Profile::Current)
    }

    /// Fails with [`SfvError::MissingFeature`] unless this profile
    /// supports the extended kinds. `feature` names the offending kind.
    pub(crate) fn require_extended(self, feature: &'static str) -> Result<()> {
        if self.supports_extended_kinds() {
            Ok(())
        } else {
            Err(SfvError::MissingFeature {
                feature,
                profile: self,
            })
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Profile::Legacy => f.write_str("legacy"),
            Profile::Current => f.write_str("current"),
        }
    }
}
