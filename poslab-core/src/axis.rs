//! Category axes: trader tier × maturity bucket × side.
//!
//! All three are closed sets fixed by the report type. `NonSpecific`,
//! `BackMonths` and (usually) `Net` never appear in a raw feed; they are
//! derived by subtraction in [`crate::decompose`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Trader tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    AllTraders,
    Specific,
    NonSpecific,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::AllTraders, Tier::Specific, Tier::NonSpecific];

    /// Snake-case name used in diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::AllTraders => "all_traders",
            Tier::Specific => "specific",
            Tier::NonSpecific => "non_specific",
        }
    }

    /// Label used inside field names. The all-traders tier is unlabeled.
    pub fn field_label(self) -> Option<&'static str> {
        match self {
            Tier::AllTraders => None,
            Tier::Specific => Some("specific"),
            Tier::NonSpecific => Some("non_specific"),
        }
    }

    pub fn is_derived(self) -> bool {
        self == Tier::NonSpecific
    }
}

/// Contract-maturity bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    FrontMonth,
    AllMonths,
    BackMonths,
}

impl Bucket {
    pub const ALL: [Bucket; 3] = [Bucket::FrontMonth, Bucket::AllMonths, Bucket::BackMonths];

    pub fn as_str(self) -> &'static str {
        match self {
            Bucket::FrontMonth => "front_month",
            Bucket::AllMonths => "all_months",
            Bucket::BackMonths => "back_months",
        }
    }

    pub fn is_derived(self) -> bool {
        self == Bucket::BackMonths
    }
}

/// Position side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Long,
    Short,
    Net,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Long => "long",
            Side::Short => "short",
            Side::Net => "net",
        }
    }

    /// Recognize a field-name token as a side marker.
    pub fn from_token(token: &str) -> Option<Side> {
        match token {
            "long" => Some(Side::Long),
            "short" => Some(Side::Short),
            "net" => Some(Side::Net),
            _ => None,
        }
    }
}

/// One cell of the tier × bucket matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Segment {
    pub tier: Tier,
    pub bucket: Bucket,
}

impl Segment {
    pub const fn new(tier: Tier, bucket: Bucket) -> Self {
        Self { tier, bucket }
    }

    /// True if either axis value can only be produced by derivation.
    pub fn is_derived(&self) -> bool {
        self.tier.is_derived() || self.bucket.is_derived()
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.tier.as_str(), self.bucket.as_str())
    }
}
