//! The four fixed network levels.

use std::fmt;

/// A network usage policy, trading interactivity, budget, pacing or
/// throughput. There are exactly four of these and they form a total order
/// of aggressiveness; the set is not extensible at runtime.
#[derive(Debug, PartialEq, Eq)]
pub struct NetworkLevel {
    /// Position in the aggressiveness order (0 = ask every time,
    /// 3 = maximally concurrent).
    pub ordinal: u8,
    /// Short bracketed name, shown in help text and logs.
    pub name: &'static str,
    /// Human readable description.
    pub description: &'static str,
}

/// All levels, indexed by ordinal.
pub static ALL_LEVELS: [NetworkLevel; 4] = [
    NetworkLevel {
        ordinal: 0,
        name: "[CONFIRM_DOWNLOAD]",
        description: "Ask for permission before every download",
    },
    NetworkLevel {
        ordinal: 1,
        name: "[DOWNLOAD_LIMIT]",
        description: "Have a limited download size",
    },
    NetworkLevel {
        ordinal: 2,
        name: "[DOWNLOAD_DELAY]",
        description: "Have a delay between downloads to not overwhelm the API",
    },
    NetworkLevel {
        ordinal: 3,
        name: "[FAST_DOWNLOAD]",
        description: "GET all links concurrently, bounded by the in-flight limit",
    },
];

impl NetworkLevel {
    /// Look up a level by its ordinal. Returns `None` for anything outside
    /// 0..=3; callers decide whether that is a validation error.
    pub fn from_ordinal(ordinal: u8) -> Option<&'static NetworkLevel> {
        ALL_LEVELS.get(ordinal as usize)
    }
}

impl fmt::Display for NetworkLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.ordinal, self.name)
    }
}
