//! Domain classification of building elements.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What a modeled element *is*, independent of its geometric shape.
///
/// Drives the clearance lookup and the responsible-trade assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    /// A rod run. Rods drive the detection queries and do not clash
    /// with each other by construction of the model.
    Rod,
    /// HVAC duct.
    Duct,
    /// Plumbing pipe.
    Pipe,
    /// Electrical conduit.
    Conduit,
    /// Structural beam or header.
    Beam,
    /// Fire sprinkler main or branch.
    Sprinkler,
    /// Cable tray.
    CableTray,
    /// Anything else the geometry provider hands over.
    Other,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementKind::Rod => "rod",
            ElementKind::Duct => "duct",
            ElementKind::Pipe => "pipe",
            ElementKind::Conduit => "conduit",
            ElementKind::Beam => "beam",
            ElementKind::Sprinkler => "sprinkler",
            ElementKind::CableTray => "cable tray",
            ElementKind::Other => "other",
        };
        f.write_str(name)
    }
}

/// Trade responsible for relocating or re-routing an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trade {
    /// Mechanical / HVAC.
    Mechanical,
    /// Plumbing.
    Plumbing,
    /// Electrical (conduit and cable tray).
    Electrical,
    /// Fire protection.
    FireProtection,
    /// Structural engineering.
    Structural,
    /// General coordination when no single trade owns the element.
    Coordination,
}

impl fmt::Display for Trade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Trade::Mechanical => "mechanical",
            Trade::Plumbing => "plumbing",
            Trade::Electrical => "electrical",
            Trade::FireProtection => "fire protection",
            Trade::Structural => "structural",
            Trade::Coordination => "coordination",
        };
        f.write_str(name)
    }
}

/// Trade responsible for an element kind.
pub fn trade_for(kind: ElementKind) -> Trade {
    match kind {
        ElementKind::Duct => Trade::Mechanical,
        ElementKind::Pipe => Trade::Plumbing,
        ElementKind::Conduit | ElementKind::CableTray => Trade::Electrical,
        ElementKind::Sprinkler => Trade::FireProtection,
        ElementKind::Beam | ElementKind::Rod => Trade::Structural,
        ElementKind::Other => Trade::Coordination,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trade_mapping() {
        assert_eq!(trade_for(ElementKind::Duct), Trade::Mechanical);
        assert_eq!(trade_for(ElementKind::Pipe), Trade::Plumbing);
        assert_eq!(trade_for(ElementKind::Conduit), Trade::Electrical);
        assert_eq!(trade_for(ElementKind::CableTray), Trade::Electrical);
        assert_eq!(trade_for(ElementKind::Sprinkler), Trade::FireProtection);
        assert_eq!(trade_for(ElementKind::Beam), Trade::Structural);
        assert_eq!(trade_for(ElementKind::Other), Trade::Coordination);
    }
}
