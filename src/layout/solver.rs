use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::layout::lens::{lens_area, radius_for_area};

/// Area given to dataset A; the other areas are scaled against it
pub const DEFAULT_REFERENCE_AREA: f64 = 10.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("Invalid {name} area {value}: {reason}")]
    InvalidArea {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("Cannot scale areas against an empty reference dataset")]
    ZeroReference,

    #[error(
        "Overlap search did not converge after {iterations} iterations \
         (residual {residual:.3e}); nearest boundary d = {distance}"
    )]
    GeometryUnsolvable {
        iterations: usize,
        residual: f64,
        distance: f64,
    },
}

/// Target areas of the two discs and of their overlap
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Areas {
    pub a: f64,
    pub b: f64,
    pub common: f64,
}

impl Areas {
    /// # Errors
    ///
    /// Returns `LayoutError::InvalidArea` if any area is not finite, `a` is
    /// not positive, or `b` is negative.
    pub fn new(a: f64, b: f64, common: f64) -> Result<Self, LayoutError> {
        for (name, value) in [("a", a), ("b", b), ("common", common)] {
            if !value.is_finite() {
                return Err(LayoutError::InvalidArea {
                    name,
                    value,
                    reason: "must be finite",
                });
            }
        }
        if a <= 0.0 {
            return Err(LayoutError::InvalidArea {
                name: "a",
                value: a,
                reason: "must be positive",
            });
        }
        if b < 0.0 {
            return Err(LayoutError::InvalidArea {
                name: "b",
                value: b,
                reason: "must not be negative",
            });
        }
        Ok(Self { a, b, common })
    }

    /// Scale set sizes to areas, pinning dataset A to `reference_area`
    ///
    /// # Errors
    ///
    /// Returns `LayoutError::ZeroReference` if `count_a` is zero, or
    /// `LayoutError::InvalidArea` for a non-positive reference area.
    pub fn from_counts(
        count_a: usize,
        count_b: usize,
        count_common: usize,
        reference_area: f64,
    ) -> Result<Self, LayoutError> {
        if count_a == 0 {
            return Err(LayoutError::ZeroReference);
        }

        #[allow(clippy::cast_precision_loss)]
        let scale = |count: usize| reference_area * count as f64 / count_a as f64;

        Self::new(reference_area, scale(count_b), scale(count_common))
    }
}

/// Root-search settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Accepted absolute error on the overlap area
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            max_iterations: 200,
        }
    }
}

/// A point in diagram coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Solved two-circle layout.
///
/// Circle A sits at the origin and circle B on the positive y axis, so the
/// center distance is `center_b.y`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CircleGeometry {
    pub radius_a: f64,
    pub radius_b: f64,

    /// Radius of a disc with the common area; a labelling aid only
    pub radius_common: f64,

    pub center_a: Point,
    pub center_b: Point,

    /// Middle of the overlap region on the center axis
    pub center_common: Point,

    /// Root-search iterations used, 0 for the closed-form boundary cases
    pub iterations: usize,

    /// Set when the search hit its iteration cap and returned the better
    /// end of its narrowed bracket
    pub approximate: bool,

    /// Overlap area actually produced by this layout
    pub achieved_common: f64,
}

impl CircleGeometry {
    #[must_use]
    pub fn distance(&self) -> f64 {
        self.center_b.y - self.center_a.y
    }

    /// Reject approximate layouts
    ///
    /// # Errors
    ///
    /// Returns `LayoutError::GeometryUnsolvable` if the search did not converge.
    pub fn require_exact(self, target_common: f64) -> Result<Self, LayoutError> {
        if self.approximate {
            Err(LayoutError::GeometryUnsolvable {
                iterations: self.iterations,
                residual: (self.achieved_common - target_common).abs(),
                distance: self.distance(),
            })
        } else {
            Ok(self)
        }
    }
}

/// Lay out two circles whose overlap area matches `areas.common`.
///
/// Radii follow from the areas directly. The center distance has no closed
/// form, so it is found by bisection on `[|ra - rb|, ra + rb]`, where the
/// overlap falls from the full smaller disc to zero. Overlaps at or beyond
/// either end are placed on that end without searching.
///
/// If the search hits `config.max_iterations` first, the result is the end
/// of the last, narrowed bracket with the smaller area error, flagged
/// `approximate`. That end is always at least as close to the target as
/// `|ra - rb|` or `ra + rb` would be.
#[must_use]
pub fn solve(areas: &Areas, config: &SolverConfig) -> CircleGeometry {
    let radius_a = radius_for_area(areas.a);
    let radius_b = radius_for_area(areas.b);
    let radius_common = radius_for_area(areas.common);

    let touching = radius_a + radius_b;
    let contained = (radius_a - radius_b).abs();

    let (distance, iterations, approximate) = if areas.common <= 0.0 {
        (touching, 0, false)
    } else if areas.common >= areas.a.min(areas.b) {
        (contained, 0, false)
    } else {
        bisect(radius_a, radius_b, areas.common, contained, touching, config)
    };

    let achieved_common = lens_area(radius_a, radius_b, distance);
    debug!(
        radius_a,
        radius_b, distance, iterations, achieved_common, "Solved circle layout"
    );

    CircleGeometry {
        radius_a,
        radius_b,
        radius_common,
        center_a: Point::new(0.0, 0.0),
        center_b: Point::new(0.0, distance),
        center_common: Point::new(0.0, overlap_midpoint(radius_a, radius_b, distance)),
        iterations,
        approximate,
        achieved_common,
    }
}

/// Search `[lo, hi]` for the distance whose lens area equals `target`
fn bisect(
    radius_a: f64,
    radius_b: f64,
    target: f64,
    mut lo: f64,
    mut hi: f64,
    config: &SolverConfig,
) -> (f64, usize, bool) {
    let residual = |d: f64| lens_area(radius_a, radius_b, d) - target;

    for iteration in 1..=config.max_iterations {
        let mid = 0.5 * (lo + hi);
        let r = residual(mid);
        if r.abs() <= config.tolerance {
            return (mid, iteration, false);
        }
        // Overlap shrinks as d grows
        if r > 0.0 {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    let distance = if residual(lo).abs() <= residual(hi).abs() {
        lo
    } else {
        hi
    };
    warn!(
        iterations = config.max_iterations,
        residual = residual(distance),
        "Overlap search did not converge, using nearest boundary"
    );
    (distance, config.max_iterations, true)
}

/// Middle of the overlap between circle A at 0 and circle B at `d` on one
/// axis; the tangent point when they only touch
fn overlap_midpoint(radius_a: f64, radius_b: f64, d: f64) -> f64 {
    let start = (-radius_a).max(d - radius_b);
    let end = radius_a.min(d + radius_b);
    0.5 * (start + end)
}
