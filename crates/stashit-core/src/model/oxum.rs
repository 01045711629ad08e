use crate::errors::StashError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Payload size summary: total octets and file count (`<octets>.<streams>`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PayloadOxum {
    pub octets: u64,
    pub streams: u64,
}

impl PayloadOxum {
    pub fn new(octets: u64, streams: u64) -> Self {
        Self { octets, streams }
    }

    /// Account for one more payload file of `len` bytes
    pub fn add_file(&mut self, len: u64) {
        self.octets += len;
        self.streams += 1;
    }
}

impl std::fmt::Display for PayloadOxum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.octets, self.streams)
    }
}

impl FromStr for PayloadOxum {
    type Err = StashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || StashError::InvalidPayloadOxum {
            value: s.to_string(),
        };
        let (octets, streams) = s.trim().split_once('.').ok_or_else(invalid)?;
        Ok(Self {
            octets: octets.parse().map_err(|_| invalid())?,
            streams: streams.parse().map_err(|_| invalid())?,
        })
    }
}
