use std::f64::consts::PI;

/// Radius of a disc with the given area
#[must_use]
pub fn radius_for_area(area: f64) -> f64 {
    (area.max(0.0) / PI).sqrt()
}

/// Area of the overlap ("lens") of two circles with radii `r1`, `r2` whose
/// centers are `d` apart.
///
/// Returns the full area of the smaller disc when one circle contains the
/// other, and 0 when they are disjoint or just touching. Strictly decreasing
/// in `d` between those two regimes.
#[must_use]
pub fn lens_area(r1: f64, r2: f64, d: f64) -> f64 {
    if d >= r1 + r2 {
        return 0.0;
    }
    if d <= (r1 - r2).abs() {
        let r = r1.min(r2);
        return PI * r * r;
    }

    let alpha = ((d * d + r1 * r1 - r2 * r2) / (2.0 * d * r1))
        .clamp(-1.0, 1.0)
        .acos();
    let beta = ((d * d + r2 * r2 - r1 * r1) / (2.0 * d * r2))
        .clamp(-1.0, 1.0)
        .acos();
    let kite = ((-d + r1 + r2) * (d + r1 - r2) * (d - r1 + r2) * (d + r1 + r2))
        .max(0.0)
        .sqrt();

    r1 * r1 * alpha + r2 * r2 * beta - 0.5 * kite
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_radius_for_area() {
        assert!((radius_for_area(PI) - 1.0).abs() < EPS);
        assert!((radius_for_area(10.0) - 1.784_124).abs() < 1e-6);
        assert!((radius_for_area(3.0) - 0.977_205).abs() < 1e-6);
        assert!(radius_for_area(0.0).abs() < EPS);
    }

    #[test]
    fn test_lens_area_limits() {
        // Disjoint and touching
        assert!(lens_area(1.0, 1.0, 3.0).abs() < EPS);
        assert!(lens_area(1.0, 1.0, 2.0).abs() < EPS);
        // Contained and concentric
        assert!((lens_area(2.0, 1.0, 0.5) - PI).abs() < EPS);
        assert!((lens_area(1.0, 1.0, 0.0) - PI).abs() < EPS);
        // Internally tangent
        assert!((lens_area(2.0, 1.0, 1.0) - PI).abs() < EPS);
    }

    #[test]
    fn test_lens_area_equal_unit_circles() {
        // Two unit circles one radius apart: 2π/3 - √3/2
        let expected = 2.0 * PI / 3.0 - 3.0_f64.sqrt() / 2.0;
        assert!((lens_area(1.0, 1.0, 1.0) - expected).abs() < EPS);
    }

    #[test]
    fn test_lens_area_is_symmetric_and_decreasing() {
        let (r1, r2) = (1.784_124, 0.977_205);
        let lo = r1 - r2;
        let hi = r1 + r2;

        let mut previous = f64::INFINITY;
        for i in 0..=100 {
            let d = lo + (hi - lo) * f64::from(i) / 100.0;
            let area = lens_area(r1, r2, d);
            assert!((area - lens_area(r2, r1, d)).abs() < EPS);
            assert!(area <= previous + EPS);
            previous = area;
        }
    }
}
