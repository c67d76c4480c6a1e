use serde::Serialize;

use crate::layout::solver::{CircleGeometry, Point};
use crate::matching::ReconciliationResult;

/// One labelled circle handed to a renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagramCircle {
    pub center: (f64, f64),
    pub radius: f64,
    pub label: String,
    pub count: usize,
}

/// Renderer input: dataset A, dataset B, then the common region.
///
/// The common entry positions the shared-count label; drawing its disc is
/// left to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagram {
    pub circles: Vec<DiagramCircle>,

    /// Whether the layout is an approximation
    pub approximate: bool,
}

impl Diagram {
    /// Build the renderer input from a solved layout and its counts
    #[must_use]
    pub fn from_geometry(
        geometry: &CircleGeometry,
        result: &ReconciliationResult,
        label_a: &str,
        label_b: &str,
    ) -> Self {
        let circle = |center: Point, radius: f64, label: &str, count: usize| DiagramCircle {
            center: (center.x, center.y),
            radius,
            label: label.to_string(),
            count,
        };

        Self {
            circles: vec![
                circle(
                    geometry.center_a,
                    geometry.radius_a,
                    label_a,
                    result.dataset_a_size,
                ),
                circle(
                    geometry.center_b,
                    geometry.radius_b,
                    label_b,
                    result.dataset_b_size,
                ),
                circle(
                    geometry.center_common,
                    geometry.radius_common,
                    "Common",
                    result.intersection_size,
                ),
            ],
            approximate: geometry.approximate,
        }
    }

    #[must_use]
    pub fn dataset_a(&self) -> Option<&DiagramCircle> {
        self.circles.first()
    }

    #[must_use]
    pub fn dataset_b(&self) -> Option<&DiagramCircle> {
        self.circles.get(1)
    }

    #[must_use]
    pub fn common(&self) -> Option<&DiagramCircle> {
        self.circles.get(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::KeyField;
    use crate::layout::solver::{solve, Areas, SolverConfig, DEFAULT_REFERENCE_AREA};
    use crate::matching::KeySet;

    fn result(a: usize, b: usize, common: usize) -> ReconciliationResult {
        ReconciliationResult {
            field_a: KeyField::IdentityKey,
            field_b: KeyField::IdentityKey,
            dataset_a_size: a,
            dataset_b_size: b,
            intersection_size: common,
            intersection_set: KeySet::new(),
            percentage: 0.0,
        }
    }

    #[test]
    fn test_diagram_from_geometry() {
        let result = result(200, 60, 20);
        let areas = Areas::from_counts(200, 60, 20, DEFAULT_REFERENCE_AREA).unwrap();
        let geometry = solve(&areas, &SolverConfig::default());

        let diagram = Diagram::from_geometry(&geometry, &result, "Metabolites", "Lipids");
        assert_eq!(diagram.circles.len(), 3);

        let a = diagram.dataset_a().unwrap();
        assert_eq!(a.center, (0.0, 0.0));
        assert_eq!(a.label, "Metabolites");
        assert_eq!(a.count, 200);

        let b = diagram.dataset_b().unwrap();
        assert_eq!(b.count, 60);
        assert!((b.center.1 - geometry.distance()).abs() < 1e-12);

        assert_eq!(diagram.common().unwrap().count, 20);
        assert!(!diagram.approximate);
    }

    #[test]
    fn test_diagram_json_shape() {
        let areas = Areas::new(10.0, 3.0, 1.0).unwrap();
        let geometry = solve(&areas, &SolverConfig::default());
        let diagram = Diagram::from_geometry(&geometry, &result(10, 3, 1), "A", "B");

        let json = serde_json::to_value(&diagram).unwrap();
        let circles = json["circles"].as_array().unwrap();
        assert_eq!(circles.len(), 3);
        assert_eq!(circles[0]["center"].as_array().unwrap().len(), 2);
        assert_eq!(circles[1]["label"], "B");
        assert_eq!(circles[2]["count"], 1);
    }
}
