//! Geometric predicates abstraction.
//!
//! With feature `geogram` (default): uses [geogram_predicates] (FFI to C++ geogram), the in-circle
//! test is the lifted orientation with symbolic perturbation, so it never reports co-circularity.
//!
//! With feature `robust`: uses pure-Rust [robust] adaptive-precision predicates.
//!
//! Both backends return the *sign* of the determinant only: `-1.0`, `0.0` or `1.0`.
//!
//! The helpers at the bottom of this module ([`intersection_point`], [`distance_to_line`], ...)
//! construct new geometry and are plain floating point, they are never used to decide topology.

use nalgebra::Vector2;

use crate::utils::types::Vertex2;

#[cfg(not(any(feature = "geogram", feature = "robust")))]
compile_error!(
    "Exactly one of features 'geogram' or 'robust' must be enabled. Use default (geogram) or --no-default-features --features 'robust'."
);

#[cfg(all(feature = "geogram", feature = "robust"))]
compile_error!(
    "Features 'geogram' and 'robust' are mutually exclusive. For pure Rust use --no-default-features --features 'robust'."
);

/// Normalize predicate result to sign: -1.0, 0.0, or 1.0 so that `==` compares signs.
#[inline]
#[allow(dead_code)]
fn sign_f64(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

#[cfg(all(feature = "geogram", not(feature = "robust")))]
mod imp {
    use super::*;
    use geogram_predicates as gp;

    #[inline]
    fn sign_i16(r: i16) -> f64 {
        if r > 0i16 {
            1.0
        } else if r < 0i16 {
            -1.0
        } else {
            0.0
        }
    }

    #[inline]
    pub fn orient_2d(a: &Vertex2, b: &Vertex2, c: &Vertex2) -> f64 {
        sign_i16(gp::orient_2d(a, b, c))
    }

    #[inline]
    fn lifted(a: &Vertex2, b: &Vertex2, c: &Vertex2, p: &Vertex2) -> f64 {
        let lift = |v: &Vertex2| v[0] * v[0] + v[1] * v[1];
        sign_i16(gp::orient_2dlifted_SOS(
            a,
            b,
            c,
            p,
            lift(a),
            lift(b),
            lift(c),
            lift(p),
        ))
    }

    /// Lifting onto the paraboloid `h = x² + y²` turns the power test into the in-circle test.
    ///
    /// The symbolic perturbation of geogram depends on which point is the query point, so the
    /// four points are evaluated in lexicographic order and the sign is carried back with the
    /// parity of the sorting permutation. Any two orderings of the same four points thus agree
    /// on co-circular input.
    pub fn in_circle(a: &Vertex2, b: &Vertex2, c: &Vertex2, p: &Vertex2) -> f64 {
        let mut sorted = [a, b, c, p];
        let mut parity = 1.0;
        // insertion sort, counting transpositions
        for i in 1..sorted.len() {
            let mut j = i;
            while j > 0 && lex_less(sorted[j], sorted[j - 1]) {
                sorted.swap(j, j - 1);
                parity = -parity;
                j -= 1;
            }
        }
        let [w, x, y, z] = sorted;

        // `orient_2dlifted_SOS` requires a proper first triangle and is normalized by its
        // orientation. If `w, x, y` are collinear the points cannot be co-circular, so the
        // remaining orderings give the exact sign.
        let orderings = [
            ([w, x, y, z], 1.0),
            ([w, x, z, y], -1.0),
            ([w, y, z, x], 1.0),
            ([x, y, z, w], -1.0),
        ];
        for ([u0, u1, u2, u3], permutation) in orderings {
            let orientation = orient_2d(u0, u1, u2);
            if orientation != 0.0 {
                return lifted(u0, u1, u2, u3) * orientation * permutation * parity;
            }
        }
        // all four collinear
        0.0
    }

    #[inline]
    fn lex_less(u: &Vertex2, v: &Vertex2) -> bool {
        u[0].total_cmp(&v[0]).then(u[1].total_cmp(&v[1])).is_lt()
    }
}

#[cfg(all(feature = "robust", not(feature = "geogram")))]
mod imp {
    use super::*;
    use robust::{Coord, incircle, orient2d};

    #[inline]
    fn coord2(p: &Vertex2) -> Coord<f64> {
        Coord { x: p[0], y: p[1] }
    }

    #[inline]
    pub fn orient_2d(a: &Vertex2, b: &Vertex2, c: &Vertex2) -> f64 {
        sign_f64(orient2d(coord2(a), coord2(b), coord2(c)))
    }

    #[inline]
    pub fn in_circle(a: &Vertex2, b: &Vertex2, c: &Vertex2, p: &Vertex2) -> f64 {
        sign_f64(incircle(coord2(a), coord2(b), coord2(c), coord2(p)))
    }
}

// Re-export so call sites can use crate::predicates::orient_2d etc.
pub use imp::{in_circle, orient_2d};

/// Location of a point relative to a directed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PtLineLocation {
    Left,
    Right,
    OnLine,
}

/// Where does `p` lie relative to the directed line `a -> b`.
#[inline]
pub fn locate_point_line(p: &Vertex2, a: &Vertex2, b: &Vertex2) -> PtLineLocation {
    let orientation = orient_2d(a, b, p);
    if orientation > 0.0 {
        PtLineLocation::Left
    } else if orientation < 0.0 {
        PtLineLocation::Right
    } else {
        PtLineLocation::OnLine
    }
}

/// Check if the segments `a--b` and `c--d` cross in a single point interior to both.
pub fn segments_cross(a: &Vertex2, b: &Vertex2, c: &Vertex2, d: &Vertex2) -> bool {
    orient_2d(a, b, c) * orient_2d(a, b, d) < 0.0 && orient_2d(c, d, a) * orient_2d(c, d, b) < 0.0
}

#[inline]
fn vec2(v: &Vertex2) -> Vector2<f64> {
    Vector2::new(v[0], v[1])
}

#[inline]
fn cross(u: &Vector2<f64>, v: &Vector2<f64>) -> f64 {
    u.x * v.y - u.y * v.x
}

/// Intersection point of the (crossing) segments `a--b` and `c--d`.
///
/// Evaluated from the segment whose parameter is closer to its midpoint, that is where
/// the linear interpolation loses the least precision.
pub fn intersection_point(a: &Vertex2, b: &Vertex2, c: &Vertex2, d: &Vertex2) -> Vertex2 {
    let (pa, pb, pc, pd) = (vec2(a), vec2(b), vec2(c), vec2(d));
    let ab = pb - pa;
    let cd = pd - pc;

    let denom = cross(&ab, &cd);
    if denom == 0.0 {
        // parallel, fall back to the midpoint of the closer endpoints
        let p = (pb + pc) * 0.5;
        return [p.x, p.y];
    }

    let s = cross(&(pc - pa), &cd) / denom;
    let t = cross(&(pc - pa), &ab) / denom;

    let p = if (s - 0.5).abs() <= (t - 0.5).abs() {
        pa + ab * s
    } else {
        pc + cd * t
    };
    [p.x, p.y]
}

/// Euclidean distance of `p` to the infinite line through `a` and `b`.
pub fn distance_to_line(p: &Vertex2, a: &Vertex2, b: &Vertex2) -> f64 {
    let ab = vec2(b) - vec2(a);
    let len = ab.norm();
    if len == 0.0 {
        return (vec2(p) - vec2(a)).norm();
    }
    cross(&ab, &(vec2(p) - vec2(a))).abs() / len
}

/// Parameter of the orthogonal projection of `p` onto `a--b`, `0` at `a` and `1` at `b`.
pub fn projection_parameter(p: &Vertex2, a: &Vertex2, b: &Vertex2) -> f64 {
    let ab = vec2(b) - vec2(a);
    let len_sq = ab.norm_squared();
    if len_sq == 0.0 {
        return 0.0;
    }
    (vec2(p) - vec2(a)).dot(&ab) / len_sq
}

/// Midpoint of `a--b`.
pub fn midpoint(a: &Vertex2, b: &Vertex2) -> Vertex2 {
    let m = (vec2(a) + vec2(b)) * 0.5;
    [m.x, m.y]
}

/// Euclidean distance of `a` and `b`.
pub fn distance(a: &Vertex2, b: &Vertex2) -> f64 {
    (vec2(b) - vec2(a)).norm()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_signs() {
        let a = [0.0, 0.0];
        let b = [1.0, 0.0];

        assert_eq!(orient_2d(&a, &b, &[0.5, 1.0]), 1.0);
        assert_eq!(orient_2d(&a, &b, &[0.5, -1.0]), -1.0);
        assert_eq!(orient_2d(&a, &b, &[2.0, 0.0]), 0.0);
    }

    #[test]
    fn test_orientation_near_degenerate() {
        // the naive determinant of these evaluates to a wrong sign or zero in f64
        let a = [0.5, 0.5];
        let b = [12.0, 12.0];
        let c = [24.0, 24.0];
        assert_eq!(orient_2d(&a, &b, &c), 0.0);

        let c_off = [24.0, 24.000000000000004];
        assert_eq!(orient_2d(&a, &b, &c_off), 1.0);
    }

    #[test]
    fn test_in_circle() {
        let a = [0.0, 0.0];
        let b = [1.0, 0.0];
        let c = [0.0, 1.0];

        assert!(in_circle(&a, &b, &c, &[0.5, 0.5]) > 0.0);
        assert!(in_circle(&a, &b, &c, &[2.0, 2.0]) < 0.0);

        // clockwise triangle flips the sign
        assert!(in_circle(&a, &c, &b, &[0.5, 0.5]) < 0.0);
    }

    #[test]
    fn test_in_circle_cocircular_order() {
        let square = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        let [a, b, c, d] = &square;

        // rotating the quadrilateral is an odd permutation, the two diagonals disagree
        assert_eq!(in_circle(a, b, c, d), -in_circle(b, c, d, a));
        assert_eq!(in_circle(b, c, d, a), -in_circle(c, d, a, b));
        assert_eq!(in_circle(c, d, a, b), -in_circle(d, a, b, c));

        // cyclic shifts of the triangle keep the answer
        assert_eq!(in_circle(a, b, c, d), in_circle(b, c, a, d));
        assert_eq!(in_circle(a, b, c, d), in_circle(c, a, b, d));

        // both triangles along the diagonal a--c see the same answer
        assert_eq!(in_circle(a, c, d, b), in_circle(c, a, b, d));
    }

    #[test]
    fn test_in_circle_collinear_points() {
        let a = [0.0, 0.0];
        let b = [1.0, 0.0];
        let c = [2.0, 0.0];
        assert_eq!(in_circle(&a, &b, &c, &[5.0, 0.0]), 0.0);
        // swapping the query with a triangle vertex flips the sign
        assert_eq!(in_circle(&a, &b, &[0.5, 1.0], &c), -in_circle(&a, &b, &c, &[0.5, 1.0]));
    }

    #[test]
    fn test_locate_point_line() {
        let a = [0.0, 0.0];
        let b = [0.0, 1.0];
        assert_eq!(locate_point_line(&[-1.0, 0.5], &a, &b), PtLineLocation::Left);
        assert_eq!(locate_point_line(&[1.0, 0.5], &a, &b), PtLineLocation::Right);
        assert_eq!(locate_point_line(&[0.0, 7.0], &a, &b), PtLineLocation::OnLine);
    }

    #[test]
    fn test_segments_cross() {
        assert!(segments_cross(&[-1.0, 0.0], &[1.0, 0.0], &[0.0, -1.0], &[0.0, 1.0]));
        // touching at an endpoint is not a crossing
        assert!(!segments_cross(&[-1.0, 0.0], &[1.0, 0.0], &[0.0, 0.0], &[0.0, 1.0]));
        assert!(!segments_cross(&[-1.0, 0.0], &[1.0, 0.0], &[2.0, -1.0], &[2.0, 1.0]));
    }

    #[test]
    fn test_intersection_point() {
        let p = intersection_point(&[-1.0, 0.0], &[1.0, 0.0], &[0.0, 0.5], &[0.0, -0.5]);
        assert_eq!(p, [0.0, 0.0]);

        let p = intersection_point(&[0.0, 0.0], &[4.0, 4.0], &[0.0, 4.0], &[4.0, 0.0]);
        assert_eq!(p, [2.0, 2.0]);
    }

    #[test]
    fn test_distance_and_projection() {
        let a = [0.0, 0.0];
        let b = [4.0, 0.0];
        assert_eq!(distance_to_line(&[1.0, 3.0], &a, &b), 3.0);
        assert_eq!(projection_parameter(&[1.0, 3.0], &a, &b), 0.25);
        assert_eq!(midpoint(&a, &b), [2.0, 0.0]);
    }
}
