//! Eye aspect ratio

/// EAR returned when the eye's horizontal extent collapses to zero
pub const DEGENERATE_EAR: f64 = 0.5;

/// Eye aspect ratio over six ordered 2-D eye contour points
///
/// `EAR = (|p1 - p5| + |p2 - p4|) / (2 * |p0 - p3|)`, where p0/p3 are the
/// eye corners and the remaining pairs span the lids.
pub fn eye_aspect_ratio(points: &[(f64, f64); 6]) -> f64 {
    let vertical_1 = distance(points[1], points[5]);
    let vertical_2 = distance(points[2], points[4]);
    let horizontal = distance(points[0], points[3]);

    if horizontal == 0.0 {
        return DEGENERATE_EAR;
    }

    (vertical_1 + vertical_2) / (2.0 * horizontal)
}

fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    (a.0 - b.0).hypot(a.1 - b.1)
}
