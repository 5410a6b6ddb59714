//! Consistency levels accepted by connection strings and meta-commands.

use scylla::statement::Consistency;
use std::fmt;
use std::str::FromStr;

/// How many replicas must acknowledge a read or write.
///
/// Names follow the CQL spelling (`LOCAL_ONE`, `EACH_QUORUM`, ...) and are
/// matched case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConsistencyLevel {
    All,
    EachQuorum,
    Quorum,
    LocalQuorum,
    One,
    Two,
    Three,
    #[default]
    LocalOne,
    Any,
    Serial,
    LocalSerial,
}

impl ConsistencyLevel {
    /// Every level, in the order they are advertised to tools.
    pub const ALL: [ConsistencyLevel; 11] = [
        ConsistencyLevel::All,
        ConsistencyLevel::EachQuorum,
        ConsistencyLevel::Quorum,
        ConsistencyLevel::LocalQuorum,
        ConsistencyLevel::One,
        ConsistencyLevel::Two,
        ConsistencyLevel::Three,
        ConsistencyLevel::LocalOne,
        ConsistencyLevel::Any,
        ConsistencyLevel::Serial,
        ConsistencyLevel::LocalSerial,
    ];

    /// CQL name of the level.
    pub fn name(&self) -> &'static str {
        match self {
            ConsistencyLevel::All => "ALL",
            ConsistencyLevel::EachQuorum => "EACH_QUORUM",
            ConsistencyLevel::Quorum => "QUORUM",
            ConsistencyLevel::LocalQuorum => "LOCAL_QUORUM",
            ConsistencyLevel::One => "ONE",
            ConsistencyLevel::Two => "TWO",
            ConsistencyLevel::Three => "THREE",
            ConsistencyLevel::LocalOne => "LOCAL_ONE",
            ConsistencyLevel::Any => "ANY",
            ConsistencyLevel::Serial => "SERIAL",
            ConsistencyLevel::LocalSerial => "LOCAL_SERIAL",
        }
    }

    /// Look a level up by name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|level| level.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Resolve an optional configuration value, falling back to the default
    /// level when it is absent or unrecognized.
    pub fn resolve_or_default(value: Option<&str>) -> Self {
        match value {
            Some(name) => Self::from_name(name).unwrap_or_else(|| {
                tracing::warn!(
                    value = name,
                    "unrecognized consistency level, using {}",
                    Self::default()
                );
                Self::default()
            }),
            None => Self::default(),
        }
    }

    pub(crate) fn as_index(&self) -> u8 {
        Self::ALL
            .iter()
            .position(|level| level == self)
            .unwrap_or_default() as u8
    }

    pub(crate) fn from_index(index: u8) -> Self {
        Self::ALL
            .get(index as usize)
            .copied()
            .unwrap_or_default()
    }
}

impl fmt::Display for ConsistencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ConsistencyLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| format!("No consistency level named '{}'", s))
    }
}

impl From<ConsistencyLevel> for Consistency {
    fn from(level: ConsistencyLevel) -> Self {
        match level {
            ConsistencyLevel::All => Consistency::All,
            ConsistencyLevel::EachQuorum => Consistency::EachQuorum,
            ConsistencyLevel::Quorum => Consistency::Quorum,
            ConsistencyLevel::LocalQuorum => Consistency::LocalQuorum,
            ConsistencyLevel::One => Consistency::One,
            ConsistencyLevel::Two => Consistency::Two,
            ConsistencyLevel::Three => Consistency::Three,
            ConsistencyLevel::LocalOne => Consistency::LocalOne,
            ConsistencyLevel::Any => Consistency::Any,
            ConsistencyLevel::Serial => Consistency::Serial,
            ConsistencyLevel::LocalSerial => Consistency::LocalSerial,
        }
    }
}
