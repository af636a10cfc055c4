//! The batch detection engine: broad phase, narrow phase, grading.

use std::collections::HashSet;

use rayon::prelude::*;

use rodclash_geom::{cylinder_shape, Cylinder, Shape};
use rodclash_index::BoundsTree;
use rodclash_math::Tolerance;
use rodclash_rules::{classify, recommend, ElementKind};

use crate::config::DetectConfig;
use crate::element::{Element, ElementId};
use crate::error::{ElementError, EngineError};
use crate::record::{ClashRecord, ClashSummary};

/// Per-element diagnostics when the debug-detect feature is enabled.
#[cfg(feature = "debug-detect")]
macro_rules! debug_detect {
    ($($arg:tt)*) => {
        eprintln!($($arg)*)
    };
}

/// No-op version when the debug-detect feature is disabled.
#[allow(unused_macros)]
#[cfg(not(feature = "debug-detect"))]
macro_rules! debug_detect {
    ($($arg:tt)*) => {};
}

/// An input element the engine refused, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedElement {
    /// Id of the refused element.
    pub id: ElementId,
    /// Why it was refused.
    pub error: ElementError,
}

/// Everything one detection run produced.
#[derive(Debug, Clone)]
pub struct DetectionOutcome {
    /// Graded clash records, in canonical order.
    pub clashes: Vec<ClashRecord>,
    /// Elements that failed intake validation.
    pub rejected: Vec<RejectedElement>,
    /// Per-severity tally of `clashes`.
    pub summary: ClashSummary,
}

/// Batch clash detector over one coordinated model.
///
/// Built once per model: intake validation, capacity check and the
/// broad-phase index all happen in [`ClashDetector::build`]. Detection
/// passes are then read-only and can run repeatedly (full model or one
/// level at a time) against the same index.
///
/// Output order is canonical regardless of thread count: rods are
/// processed in input order and each rod's findings are sorted by the
/// other element's id, so re-running a model reproduces records
/// byte-for-byte.
#[derive(Debug)]
pub struct ClashDetector {
    elements: Vec<Element>,
    rejected: Vec<RejectedElement>,
    tree: BoundsTree<usize>,
    config: DetectConfig,
    query_padding: f64,
}

impl ClashDetector {
    /// Validate, index and prepare a model for detection.
    ///
    /// Invalid elements are set aside individually (see
    /// [`ClashDetector::rejected`]); only configuration errors and the
    /// capacity ceiling fail the whole build.
    pub fn build(elements: Vec<Element>, config: DetectConfig) -> Result<Self, EngineError> {
        config.validate()?;
        if let Some(limit) = config.max_elements {
            if elements.len() > limit {
                return Err(EngineError::Capacity {
                    requested: elements.len(),
                    limit,
                });
            }
        }

        let tol = Tolerance::DEFAULT;
        let mut accepted: Vec<Element> = Vec::with_capacity(elements.len());
        let mut rejected = Vec::new();
        let mut seen_ids: HashSet<ElementId> = HashSet::with_capacity(elements.len());

        for element in elements {
            if let Err(error) = element.validate(&tol) {
                debug_detect!("rejecting {}: {}", element.id, error);
                rejected.push(RejectedElement {
                    id: element.id,
                    error,
                });
                continue;
            }
            if !seen_ids.insert(element.id.clone()) {
                debug_detect!("rejecting {}: duplicate id", element.id);
                rejected.push(RejectedElement {
                    id: element.id,
                    error: ElementError::DuplicateId,
                });
                continue;
            }
            accepted.push(element);
        }

        // Pad rod queries by the largest clearance any pair can require,
        // widened to the warning band, so the broad phase never culls a
        // record-producing candidate.
        let mut max_required = config.clearances.max_required();
        for element in &accepted {
            if let Some(clearance) = element.clearance_override {
                max_required = max_required.max(clearance);
            }
        }
        let query_padding = max_required * (1.0 + config.policy.warning_margin_fraction);

        let entries = accepted
            .iter()
            .enumerate()
            .map(|(idx, element)| (element.shape.aabb(), idx))
            .collect();
        let tree = BoundsTree::bulk_load(entries);

        debug_detect!(
            "indexed {} elements ({} rejected), query padding {:.2}",
            accepted.len(),
            rejected.len(),
            query_padding
        );

        Ok(Self {
            elements: accepted,
            rejected,
            tree,
            config,
            query_padding,
        })
    }

    /// Elements that failed intake validation.
    pub fn rejected(&self) -> &[RejectedElement] {
        &self.rejected
    }

    /// Number of accepted, indexed elements.
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Check every rod against the model.
    pub fn detect(&self) -> Vec<ClashRecord> {
        self.detect_filtered(None)
    }

    /// Check only the rods on one building level.
    ///
    /// Candidates are not level-filtered: a rod may clash with an
    /// element from an adjacent level, and those findings belong to the
    /// rod's level.
    pub fn detect_level(&self, level: i32) -> Vec<ClashRecord> {
        self.detect_filtered(Some(level))
    }

    fn detect_filtered(&self, level: Option<i32>) -> Vec<ClashRecord> {
        let rods: Vec<(usize, &Cylinder)> = self
            .elements
            .iter()
            .enumerate()
            .filter(|(_, e)| e.kind == ElementKind::Rod)
            .filter(|(_, e)| level.is_none() || e.level == level)
            .filter_map(|(idx, e)| match &e.shape {
                Shape::Cylinder(cyl) => Some((idx, cyl)),
                _ => None,
            })
            .collect();

        // Rods are independent; grading is a pure function of the pair.
        // Collecting per rod and flattening in rod order keeps the
        // output identical across thread counts.
        let per_rod: Vec<Vec<ClashRecord>> = rods
            .par_iter()
            .map(|&(idx, cyl)| self.clashes_for_rod(idx, cyl))
            .collect();

        let mut records: Vec<ClashRecord> = per_rod.into_iter().flatten().collect();

        if self.config.include_rod_pairs {
            // Each rod-rod pair is found from both ends; keep the first
            // occurrence, which is the lower-slab-index rod's record.
            let mut seen: HashSet<(ElementId, ElementId)> = HashSet::new();
            records.retain(|r| {
                if r.other_kind != ElementKind::Rod {
                    return true;
                }
                let key = if r.rod_id <= r.other_id {
                    (r.rod_id.clone(), r.other_id.clone())
                } else {
                    (r.other_id.clone(), r.rod_id.clone())
                };
                seen.insert(key)
            });
        }

        debug_detect!(
            "{} rods checked, {} records",
            rods.len(),
            records.len()
        );

        records
    }

    /// Narrow-phase pass for one rod against its broad-phase candidates.
    fn clashes_for_rod(&self, rod_idx: usize, cyl: &Cylinder) -> Vec<ClashRecord> {
        let rod = &self.elements[rod_idx];
        let bounds = cyl.aabb().expanded(self.query_padding);

        let mut out = Vec::new();
        for &other_idx in self.tree.query(&bounds) {
            if other_idx == rod_idx {
                continue;
            }
            let other = &self.elements[other_idx];
            if other.kind == ElementKind::Rod && !self.config.include_rod_pairs {
                continue;
            }

            let sep = cylinder_shape(cyl, &other.shape, &self.config.sampling);
            let required = self.required_clearance(rod, other);
            let Some(classification) = classify(sep.penetration, required, &self.config.policy)
            else {
                continue;
            };

            let recommendations = recommend(classification.severity, other.kind);
            out.push(ClashRecord {
                rod_id: rod.id.clone(),
                other_id: other.id.clone(),
                rod_kind: rod.kind,
                other_kind: other.kind,
                severity: classification.severity,
                penetration: sep.penetration,
                required_clearance: required,
                actual_clearance: -sep.penetration,
                point: (sep.penetration > 0.0)
                    .then(|| [sep.point.x, sep.point.y, sep.point.z]),
                level: rod.level.or(other.level),
                summary: classification.summary,
                recommendations,
            });
        }

        out.sort_by(|a, b| a.other_id.cmp(&b.other_id));
        out
    }

    /// Required clearance for a pair.
    ///
    /// The other element's override beats the table; a rod override then
    /// tightens but never loosens the result.
    fn required_clearance(&self, rod: &Element, other: &Element) -> f64 {
        let base = other
            .clearance_override
            .unwrap_or_else(|| self.config.clearances.required_for(other.kind));
        match rod.clearance_override {
            Some(rod_clearance) => rod_clearance.max(base),
            None => base,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rodclash_geom::Aabb3;
    use rodclash_math::Point3;
    use rodclash_rules::{Severity, Trade};

    /// Vertical rod from z=0 to z=120 at (x, y).
    fn rod(id: &str, x: f64, y: f64, radius: f64) -> Element {
        Element::new(
            id,
            ElementKind::Rod,
            Shape::Cylinder(Cylinder::new(
                Point3::new(x, y, 0.0),
                Point3::new(x, y, 120.0),
                radius,
            )),
        )
    }

    /// Box element of the given kind spanning y=[-6, 6], z=[40, 52].
    fn box_at(id: &str, kind: ElementKind, min_x: f64) -> Element {
        Element::new(
            id,
            kind,
            Shape::Aabb(Aabb3::new(
                Point3::new(min_x, -6.0, 40.0),
                Point3::new(min_x + 24.0, 6.0, 52.0),
            )),
        )
    }

    fn detect(elements: Vec<Element>) -> Vec<ClashRecord> {
        let detector = ClashDetector::build(elements, DetectConfig::default()).unwrap();
        detector.detect()
    }

    #[test]
    fn test_shortfall_grades_major_with_trade() {
        // 7/16" rod with its surface exactly 1.0" from a duct face:
        // required 2.0", shortfall 1.0" = half the requirement.
        let elements = vec![rod("rod-1", 0.0, 0.0, 0.4375), box_at("duct-1", ElementKind::Duct, 1.4375)];
        let records = detect(elements);
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.severity, Severity::Major);
        assert_relative_eq!(r.actual_clearance, 1.0, epsilon = 1e-9);
        assert_eq!(r.required_clearance, 2.0);
        assert!(r.point.is_none());
        assert_eq!(r.recommendations.len(), 1);
        assert_eq!(r.recommendations[0].option_id, "ADJUST_ROUTING");
        assert_eq!(r.recommendations[0].responsible_trade, Trade::Mechanical);
    }

    #[test]
    fn test_overlap_grades_critical_with_point() {
        // Rod surface cuts 0.1" into a beam face.
        let elements = vec![rod("rod-1", 0.0, 0.0, 0.4375), box_at("beam-1", ElementKind::Beam, 0.3375)];
        let records = detect(elements);
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.severity, Severity::Critical);
        assert_relative_eq!(r.penetration, 0.1, epsilon = 1e-9);
        assert!(r.point.is_some());
        assert_eq!(r.recommendations[0].option_id, "RELOCATE_ELEMENT");
        assert_eq!(r.recommendations[0].responsible_trade, Trade::Structural);
        assert_eq!(r.recommendations[1].option_id, "RELOCATE_ROD");
    }

    #[test]
    fn test_warning_band_is_informational() {
        // Surface 2.1" from the duct: clearance met, inside the 10% band.
        let elements = vec![rod("rod-1", 0.0, 0.0, 0.4375), box_at("duct-1", ElementKind::Duct, 2.5375)];
        let records = detect(elements);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].severity, Severity::Warning);
        assert!(records[0].recommendations.is_empty());
    }

    #[test]
    fn test_clear_pair_is_silent() {
        // Surface 3.0" from the duct, beyond the 2.2" warning band edge.
        let elements = vec![rod("rod-1", 0.0, 0.0, 0.4375), box_at("duct-1", ElementKind::Duct, 3.4375)];
        assert!(detect(elements).is_empty());
    }

    #[test]
    fn test_rod_pairs_skipped_by_default() {
        let elements = vec![rod("rod-a", 0.0, 0.0, 0.4375), rod("rod-b", 0.5, 0.0, 0.4375)];
        assert!(detect(elements).is_empty());
    }

    #[test]
    fn test_rod_pairs_checked_once_when_enabled() {
        let config = DetectConfig {
            include_rod_pairs: true,
            ..Default::default()
        };
        let elements = vec![rod("rod-a", 0.0, 0.0, 0.4375), rod("rod-b", 0.5, 0.0, 0.4375)];
        let detector = ClashDetector::build(elements, config).unwrap();
        let records = detector.detect();
        // Overlapping pair (radii sum 0.875" over a 0.5" offset), reported
        // exactly once, from the first rod's side.
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.rod_id.as_str(), "rod-a");
        assert_eq!(r.other_id.as_str(), "rod-b");
        assert_eq!(r.severity, Severity::Critical);
        assert_relative_eq!(r.penetration, 0.375, epsilon = 1e-9);
    }

    #[test]
    fn test_level_filter_scopes_rods_only() {
        let elements = vec![
            rod("rod-3", 0.0, 0.0, 0.4375).with_level(3),
            box_at("duct-3", ElementKind::Duct, 0.9375),
            rod("rod-5", 200.0, 0.0, 0.4375).with_level(5),
            Element::new(
                "duct-5",
                ElementKind::Duct,
                Shape::Aabb(Aabb3::new(
                    Point3::new(200.9375, -6.0, 40.0),
                    Point3::new(224.0, 6.0, 52.0),
                )),
            ),
        ];
        let detector = ClashDetector::build(elements, DetectConfig::default()).unwrap();

        assert_eq!(detector.detect().len(), 2);
        let level3 = detector.detect_level(3);
        assert_eq!(level3.len(), 1);
        assert_eq!(level3[0].rod_id.as_str(), "rod-3");
        assert_eq!(level3[0].level, Some(3));
        assert!(detector.detect_level(7).is_empty());
    }

    #[test]
    fn test_invalid_element_rejected_run_continues() {
        let bad = Element::new(
            "bad-pipe",
            ElementKind::Pipe,
            Shape::Cylinder(Cylinder::new(
                Point3::new(f64::NAN, 0.0, 0.0),
                Point3::origin(),
                0.5,
            )),
        );
        let elements = vec![bad, rod("rod-1", 0.0, 0.0, 0.4375), box_at("duct-1", ElementKind::Duct, 1.4375)];
        let detector = ClashDetector::build(elements, DetectConfig::default()).unwrap();
        assert_eq!(detector.rejected().len(), 1);
        assert_eq!(detector.rejected()[0].id.as_str(), "bad-pipe");
        assert_eq!(detector.rejected()[0].error, ElementError::NonFinite);
        assert_eq!(detector.detect().len(), 1);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let elements = vec![
            rod("rod-1", 0.0, 0.0, 0.4375),
            rod("rod-1", 50.0, 0.0, 0.4375),
        ];
        let detector = ClashDetector::build(elements, DetectConfig::default()).unwrap();
        assert_eq!(detector.element_count(), 1);
        assert_eq!(detector.rejected()[0].error, ElementError::DuplicateId);
    }

    #[test]
    fn test_capacity_ceiling() {
        let config = DetectConfig {
            max_elements: Some(2),
            ..Default::default()
        };
        let elements = vec![
            rod("rod-1", 0.0, 0.0, 0.4375),
            rod("rod-2", 10.0, 0.0, 0.4375),
            rod("rod-3", 20.0, 0.0, 0.4375),
        ];
        match ClashDetector::build(elements, config) {
            Err(EngineError::Capacity { requested, limit }) => {
                assert_eq!(requested, 3);
                assert_eq!(limit, 2);
            }
            other => panic!("expected capacity error, got {other:?}"),
        }
    }

    #[test]
    fn test_clearance_overrides() {
        // Table would be silent at 3.0" from a duct; a 5.0" rod override
        // keeps the pair in scope and grades it.
        let elements = vec![
            rod("rod-1", 0.0, 0.0, 0.4375).with_clearance_override(5.0),
            box_at("duct-1", ElementKind::Duct, 3.4375),
        ];
        let records = detect(elements);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].required_clearance, 5.0);
        assert_eq!(records[0].severity, Severity::Minor);

        // A loose element override silences a pair the table would flag.
        let elements = vec![
            rod("rod-1", 0.0, 0.0, 0.4375),
            box_at("duct-1", ElementKind::Duct, 1.4375).with_clearance_override(0.25),
        ];
        assert!(detect(elements).is_empty());
    }

    #[test]
    fn test_empty_and_rodless_models() {
        assert!(detect(Vec::new()).is_empty());
        assert!(detect(vec![box_at("duct-1", ElementKind::Duct, 0.0)]).is_empty());
    }

    #[test]
    fn test_detection_is_deterministic() {
        // A small floor plate: a row of rods threading a mix of ducts,
        // pipes and beams at varying offsets.
        let mut elements = Vec::new();
        for i in 0..20 {
            let x = i as f64 * 30.0;
            elements.push(rod(&format!("rod-{i:02}"), x, 0.0, 0.4375));
            elements.push(box_at(&format!("duct-{i:02}"), ElementKind::Duct, x + 0.9));
            elements.push(Element::new(
                format!("pipe-{i:02}"),
                ElementKind::Pipe,
                Shape::Cylinder(Cylinder::new(
                    Point3::new(x - 10.0, 1.2, 60.0),
                    Point3::new(x + 10.0, 1.2, 60.0),
                    1.0,
                )),
            ));
        }

        let first = detect(elements.clone());
        let second = detect(elements.clone());
        assert!(!first.is_empty());
        assert_eq!(first, second);

        // Canonical order: rods in input order, candidates by id.
        let third = detect(elements);
        let ids: Vec<&str> = third.iter().map(|r| r.rod_id.as_str()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }
}
