//! Interpretation of raw model outputs into display categories.

use std::fmt;

/// Display category used to color a segment badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeClass {
    Champion,
    Loyal,
    AtRisk,
    Hibernating,
    Lost,
}

impl BadgeClass {
    /// Style name as used by the rendering layer.
    pub fn as_str(self) -> &'static str {
        match self {
            BadgeClass::Champion => "champion",
            BadgeClass::Loyal => "loyal",
            BadgeClass::AtRisk => "at-risk",
            BadgeClass::Hibernating => "hibernating",
            BadgeClass::Lost => "lost",
        }
    }
}

impl fmt::Display for BadgeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display name and badge for one segmentation cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentInfo {
    pub name: &'static str,
    pub badge: BadgeClass,
}

/// Number of clusters the segmentation model was trained with.
pub const SEGMENT_COUNT: usize = 7;

/// Static segment table, indexed by cluster label.
pub const SEGMENTS: [SegmentInfo; SEGMENT_COUNT] = [
    SegmentInfo { name: "Inactive Customer", badge: BadgeClass::Lost },
    SegmentInfo { name: "Frequent Shopper", badge: BadgeClass::Champion },
    SegmentInfo { name: "Active Customer", badge: BadgeClass::Champion },
    SegmentInfo { name: "Lost Customer", badge: BadgeClass::Lost },
    SegmentInfo { name: "Top Customer", badge: BadgeClass::Champion },
    SegmentInfo { name: "Regular Buyer", badge: BadgeClass::Loyal },
    SegmentInfo { name: "Big Spender", badge: BadgeClass::AtRisk },
];

/// Fallback for labels the table does not know. The segment model contract
/// keeps labels in 0..=6; an artifact trained with a different k still gets
/// a usable display instead of a failed request.
pub const UNKNOWN_SEGMENT: SegmentInfo = SegmentInfo { name: "Unknown", badge: BadgeClass::Lost };

/// Resolve a cluster label to its display info.
pub fn segment_info(label: usize) -> SegmentInfo {
    SEGMENTS.get(label).copied().unwrap_or(UNKNOWN_SEGMENT)
}

/// Churn risk tier over the percentage scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChurnTier {
    Low,
    Medium,
    High,
}

impl ChurnTier {
    /// Tier boundaries are half-open: 30.0 and 60.0 belong to the upper
    /// tier.
    pub fn from_percent(churn_pct: f64) -> Self {
        if churn_pct < 30.0 {
            ChurnTier::Low
        } else if churn_pct < 60.0 {
            ChurnTier::Medium
        } else {
            ChurnTier::High
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ChurnTier::Low => "Low",
            ChurnTier::Medium => "Medium",
            ChurnTier::High => "High",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ChurnTier::Low => "This customer is likely to stay",
            ChurnTier::Medium => "Some risk of leaving, monitor closely",
            ChurnTier::High => "May leave soon without intervention",
        }
    }
}

impl fmt::Display for ChurnTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Interpreted result of one analysis request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Raw cluster label from the segment model.
    pub segment_label: usize,
    /// Display info resolved from the segment table.
    pub segment: SegmentInfo,
    /// Churn probability on the percentage scale, in [0, 100].
    pub churn_pct: f64,
    /// Tier resolved from the churn percentage.
    pub tier: ChurnTier,
}

impl Prediction {
    /// Build the interpreted view of raw model outputs: a cluster label and
    /// a churn probability in [0, 1].
    pub fn from_raw(segment_label: usize, churn_probability: f64) -> Self {
        let churn_pct = churn_probability * 100.0;
        Prediction {
            segment_label,
            segment: segment_info(segment_label),
            churn_pct,
            tier: ChurnTier::from_percent(churn_pct),
        }
    }
}
