//! Category Decomposer: reconstructs the tier × bucket × side matrix.
//!
//! The feed supplies a subset of segments (all traders and specific
//! institutions, front month and all months). Everything else is derived by
//! element-wise subtraction, in this order:
//!
//! 1. `non_specific = all_traders − specific` for each raw bucket
//! 2. `back_months = all_months − front_month` for each tier, derived tiers included
//! 3. `net = long − short` for every (metric, unit) pair in every segment
//!
//! Sides are identified by the `long` / `short` / `net` token in the field
//! name, never by position. Missing markers flow through every step.

use std::collections::{BTreeMap, HashMap};

use crate::axis::{Bucket, Segment, Side, Tier};
use crate::error::{NoDataReason, ReportError};
use crate::extract::{FieldLayout, FieldValues};
use crate::value::{Numeric, NumericVector};

// ─── Raw input ───────────────────────────────────────────────────────

/// Raw vectors keyed by the segment the feed reports them under.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SegmentVectors {
    vectors: BTreeMap<Segment, NumericVector>,
}

impl SegmentVectors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, segment: Segment, vector: impl Into<NumericVector>) -> Self {
        self.insert(segment, vector.into());
        self
    }

    /// Insert a vector, returning the one it replaced.
    pub fn insert(&mut self, segment: Segment, vector: NumericVector) -> Option<NumericVector> {
        self.vectors.insert(segment, vector)
    }

    pub fn get(&self, segment: Segment) -> Option<&NumericVector> {
        self.vectors.get(&segment)
    }

    pub fn contains(&self, segment: Segment) -> bool {
        self.vectors.contains_key(&segment)
    }

    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        self.vectors.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

// ─── Field-name slots ────────────────────────────────────────────────

/// A layout field name split around its side token:
/// `top5_long_oi` → metric `top5`, side `long`, unit `oi`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Slot {
    metric: String,
    side: Option<Side>,
    unit: Option<String>,
}

impl Slot {
    fn parse(name: &str) -> Self {
        let tokens: Vec<&str> = name.split('_').collect();
        match tokens.iter().position(|t| Side::from_token(t).is_some()) {
            Some(p) => Slot {
                metric: tokens[..p].join("_"),
                side: Side::from_token(tokens[p]),
                unit: non_empty(tokens[p + 1..].join("_")),
            },
            None if tokens.len() > 1 => Slot {
                metric: tokens[..tokens.len() - 1].join("_"),
                side: None,
                unit: non_empty(tokens[tokens.len() - 1].to_string()),
            },
            None => Slot {
                metric: name.to_string(),
                side: None,
                unit: None,
            },
        }
    }

    fn render(&self, segment: Segment, side: Option<Side>) -> String {
        let parts = [
            Some(self.metric.as_str()),
            segment.tier.field_label(),
            Some(segment.bucket.as_str()),
            side.map(Side::as_str),
            self.unit.as_deref(),
        ];
        parts
            .into_iter()
            .flatten()
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join("_")
    }
}

fn non_empty(s: String) -> Option<String> {
    (!s.is_empty()).then_some(s)
}

/// Name a layout field takes once placed in `segment`:
/// `segment_field_name("top5_long_oi", specific/back_months)` is
/// `top5_specific_back_months_long_oi`.
pub fn segment_field_name(field: &str, segment: Segment) -> String {
    let slot = Slot::parse(field);
    slot.render(segment, slot.side)
}

/// A long/short slot pair sharing metric and unit.
#[derive(Debug, Clone)]
struct NetPair {
    long: usize,
    short: usize,
    /// Template slot with `side = Net`, used for naming.
    slot: Slot,
}

// ─── Decomposer ──────────────────────────────────────────────────────

/// Derives every reachable segment from a fixed field layout.
#[derive(Debug, Clone)]
pub struct Decomposer {
    layout: FieldLayout,
    slots: Vec<Slot>,
    nets: Vec<NetPair>,
}

impl Decomposer {
    pub fn new(layout: FieldLayout) -> Self {
        let slots: Vec<Slot> = layout.names().iter().map(|n| Slot::parse(n)).collect();
        let nets = net_pairs(&slots);
        Self {
            layout,
            slots,
            nets,
        }
    }

    pub fn layout(&self) -> &FieldLayout {
        &self.layout
    }

    /// Derive all reachable segments from `raw`.
    ///
    /// Fails with `NoData` if any `required` segment cannot be produced,
    /// with `ShapeMismatch` if a raw vector is not exactly layout-wide, and
    /// with `DerivedSegmentSupplied` if the input claims to carry a
    /// non-specific or back-months vector.
    pub fn decompose(
        &self,
        raw: &SegmentVectors,
        required: &[Segment],
    ) -> Result<Decomposition, ReportError> {
        let width = self.layout.len();
        for (segment, vector) in &raw.vectors {
            if segment.is_derived() {
                return Err(ReportError::DerivedSegmentSupplied(*segment));
            }
            if vector.len() != width {
                return Err(ReportError::shape(
                    format!("raw segment {segment}"),
                    width,
                    vector.len(),
                ));
            }
        }

        let mut vectors = raw.vectors.clone();

        for bucket in [Bucket::FrontMonth, Bucket::AllMonths] {
            let all = vectors.get(&Segment::new(Tier::AllTraders, bucket));
            let specific = vectors.get(&Segment::new(Tier::Specific, bucket));
            if let (Some(all), Some(specific)) = (all, specific) {
                let derived = all.checked_sub(specific, "non_specific")?;
                vectors.insert(Segment::new(Tier::NonSpecific, bucket), derived);
            }
        }

        for tier in Tier::ALL {
            let all_months = vectors.get(&Segment::new(tier, Bucket::AllMonths));
            let front = vectors.get(&Segment::new(tier, Bucket::FrontMonth));
            if let (Some(all_months), Some(front)) = (all_months, front) {
                let derived = all_months.checked_sub(front, "back_months")?;
                vectors.insert(Segment::new(tier, Bucket::BackMonths), derived);
            }
        }

        if let Some(absent) = required.iter().find(|s| !vectors.contains_key(*s)) {
            return Err(NoDataReason::MissingSegment(*absent).into());
        }

        let mut fields = Vec::with_capacity(vectors.len() * (width + self.nets.len()));
        for (segment, vector) in &vectors {
            for (slot, value) in self.slots.iter().zip(vector.iter()) {
                fields.push((slot.render(*segment, slot.side), value));
            }
            for pair in &self.nets {
                let net = vector.as_slice()[pair.long] - vector.as_slice()[pair.short];
                fields.push((pair.slot.render(*segment, Some(Side::Net)), net));
            }
        }

        let index = fields
            .iter()
            .enumerate()
            .map(|(i, (name, _))| (name.clone(), i))
            .collect();

        Ok(Decomposition {
            vectors,
            fields,
            index,
        })
    }
}

/// Pairs long/short slots by (metric, unit). A pair that already has a raw
/// `net` slot keeps it and derives nothing.
fn net_pairs(slots: &[Slot]) -> Vec<NetPair> {
    let find = |metric: &str, unit: &Option<String>, side: Side| {
        slots
            .iter()
            .position(|s| s.metric == metric && &s.unit == unit && s.side == Some(side))
    };

    let mut pairs = Vec::new();
    for (long, slot) in slots.iter().enumerate() {
        if slot.side != Some(Side::Long) {
            continue;
        }
        let Some(short) = find(&slot.metric, &slot.unit, Side::Short) else {
            continue;
        };
        if find(&slot.metric, &slot.unit, Side::Net).is_some() {
            continue;
        }
        pairs.push(NetPair {
            long,
            short,
            slot: Slot {
                side: Some(Side::Net),
                ..slot.clone()
            },
        });
    }
    pairs
}

// ─── Result ──────────────────────────────────────────────────────────

/// Every raw and derived value, addressable by field name.
#[derive(Debug, Clone, PartialEq)]
pub struct Decomposition {
    vectors: BTreeMap<Segment, NumericVector>,
    fields: Vec<(String, Numeric)>,
    index: HashMap<String, usize>,
}

impl Decomposition {
    /// The vector for a raw or derived segment.
    pub fn vector(&self, segment: Segment) -> Option<&NumericVector> {
        self.vectors.get(&segment)
    }

    /// Segments available after derivation.
    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        self.vectors.keys().copied()
    }

    pub fn get(&self, name: &str) -> Option<Numeric> {
        self.index.get(name).map(|&i| self.fields[i].1)
    }

    /// Every name [`Self::project`] can serve.
    pub fn producible_fields(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Exactly the requested fields, in request order.
    pub fn project<S: AsRef<str>>(&self, outputs: &[S]) -> Result<FieldValues, ReportError> {
        outputs
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.get(name)
                    .map(|value| (name.to_string(), value))
                    .ok_or_else(|| ReportError::UnknownField(name.to_string()))
            })
            .collect()
    }
}
