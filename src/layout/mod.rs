//! Area-proportional two-circle layout.
//!
//! Given the sizes of two sets and of their intersection, the layout gives
//! each set a disc whose area is proportional to its size and places the
//! discs so that their overlap ("lens") area is proportional to the shared
//! size.
//!
//! - [`lens`]: the lens-area formula
//! - [`solver`]: radii from areas and the center distance by bisection
//! - [`diagram`]: the `{circles: [...]}` structure handed to renderers
//! - [`svg`]: a small SVG renderer driven by an explicit [`RenderContext`]
//!
//! ## Example
//!
//! ```rust
//! use lipid_quantifier::layout::{lens_area, solve, Areas, SolverConfig};
//!
//! let areas = Areas::new(10.0, 3.0, 2.0).unwrap();
//! let geometry = solve(&areas, &SolverConfig::default());
//!
//! let overlap = lens_area(geometry.radius_a, geometry.radius_b, geometry.distance());
//! assert!((overlap - 2.0).abs() < 1e-6);
//! ```

pub mod diagram;
pub mod lens;
pub mod solver;
pub mod svg;

pub use diagram::{Diagram, DiagramCircle};
pub use lens::{lens_area, radius_for_area};
pub use solver::{
    solve, Areas, CircleGeometry, LayoutError, Point, SolverConfig, DEFAULT_REFERENCE_AREA,
};
pub use svg::{render_svg, RenderContext};
