//! Tier Registry
//!
//! The fixed, ordered set of tiers a board is made of. Tiers are never
//! created or destroyed at runtime.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::entity::DomainError;

/// Tier identifier, declared in rank order (best first)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TierId {
    #[serde(rename = "national")]
    National,
    S,
    A,
    B,
    C,
    D,
    F,
}

/// How many items a tier may hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capacity {
    One,
    Unbounded,
}

impl Capacity {
    pub fn limit(&self) -> Option<usize> {
        match self {
            Capacity::One => Some(1),
            Capacity::Unbounded => None,
        }
    }

    /// Whether a tier currently holding `len` items can take one more
    pub fn admits(&self, len: usize) -> bool {
        self.limit().map_or(true, |max| len < max)
    }
}

/// Static description of a tier
#[derive(Debug, Clone, Serialize)]
pub struct TierDescriptor {
    pub id: TierId,
    pub label: &'static str,
    pub description: &'static str,
    /// Gradient token for the tier header
    pub color: &'static str,
    pub capacity: Capacity,
}

impl TierDescriptor {
    /// Description with the capacity hint appended for limited tiers
    pub fn display_description(&self) -> String {
        match self.capacity.limit() {
            Some(max) => format!("{} (max {})", self.description, max),
            None => self.description.to_string(),
        }
    }
}

static REGISTRY: [TierDescriptor; 7] = [
    TierDescriptor {
        id: TierId::National,
        label: "National Power",
        description: "Life-defining",
        color: "from-yellow-400 to-orange-500",
        capacity: Capacity::One,
    },
    TierDescriptor {
        id: TierId::S,
        label: "S",
        description: "Rewatchable masterpiece",
        color: "from-red-500 to-pink-500",
        capacity: Capacity::Unbounded,
    },
    TierDescriptor {
        id: TierId::A,
        label: "A",
        description: "Leaves a lingering impression",
        color: "from-orange-500 to-red-500",
        capacity: Capacity::Unbounded,
    },
    TierDescriptor {
        id: TierId::B,
        label: "B",
        description: "Worth watching",
        color: "from-yellow-500 to-orange-500",
        capacity: Capacity::Unbounded,
    },
    TierDescriptor {
        id: TierId::C,
        label: "C",
        description: "Killing time",
        color: "from-green-500 to-yellow-500",
        capacity: Capacity::Unbounded,
    },
    TierDescriptor {
        id: TierId::D,
        label: "D",
        description: "Not great",
        color: "from-blue-500 to-green-500",
        capacity: Capacity::Unbounded,
    },
    TierDescriptor {
        id: TierId::F,
        label: "F",
        description: "Trash",
        color: "from-gray-500 to-blue-500",
        capacity: Capacity::Unbounded,
    },
];

/// All tier descriptors in display order
pub fn registry() -> &'static [TierDescriptor] {
    &REGISTRY
}

impl TierId {
    pub const ALL: [TierId; 7] = [
        TierId::National,
        TierId::S,
        TierId::A,
        TierId::B,
        TierId::C,
        TierId::D,
        TierId::F,
    ];

    /// Stable identifier used for drop targets and document keys
    pub fn as_str(&self) -> &'static str {
        match self {
            TierId::National => "national",
            TierId::S => "S",
            TierId::A => "A",
            TierId::B => "B",
            TierId::C => "C",
            TierId::D => "D",
            TierId::F => "F",
        }
    }

    /// Exact-match lookup; no case folding
    pub fn parse(s: &str) -> Option<Self> {
        TierId::ALL.iter().copied().find(|t| t.as_str() == s)
    }

    /// Position in display order
    pub fn rank(&self) -> usize {
        *self as usize
    }

    pub fn descriptor(&self) -> &'static TierDescriptor {
        &REGISTRY[self.rank()]
    }

    pub fn capacity(&self) -> Capacity {
        self.descriptor().capacity
    }

    pub fn is_capacity_limited(&self) -> bool {
        self.capacity().limit().is_some()
    }
}

impl fmt::Display for TierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TierId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TierId::parse(s).ok_or_else(|| DomainError::NotFound(format!("tier {}", s)))
    }
}
