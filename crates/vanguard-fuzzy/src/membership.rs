use serde::{Deserialize, Serialize};

/// Piecewise-linear membership function.
///
/// Degree is 0 everywhere outside the support, 1 on the peak/plateau, and
/// linear on the shoulders. Coincident points are allowed and make the
/// corresponding edge vertical (the boundary value belongs to the shape).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Membership {
    Triangular { a: f64, b: f64, c: f64 },
    Trapezoidal { a: f64, b: f64, c: f64, d: f64 },
}

fn rising(x: f64, a: f64, b: f64) -> f64 {
    if b > a {
        (x - a) / (b - a)
    } else {
        1.0
    }
}

fn falling(x: f64, c: f64, d: f64) -> f64 {
    if d > c {
        (d - x) / (d - c)
    } else {
        1.0
    }
}

impl Membership {
    pub fn degree(&self, x: f64) -> f64 {
        match *self {
            Membership::Triangular { a, b, c } => {
                if x < a || x > c {
                    0.0
                } else if x <= b {
                    rising(x, a, b)
                } else {
                    falling(x, b, c)
                }
            }
            Membership::Trapezoidal { a, b, c, d } => {
                if x < a || x > d {
                    0.0
                } else if x < b {
                    rising(x, a, b)
                } else if x <= c {
                    1.0
                } else {
                    falling(x, c, d)
                }
            }
        }
    }

    /// Breakpoints in declaration order; ordered and finite when valid.
    pub(crate) fn points(&self) -> Vec<f64> {
        match *self {
            Membership::Triangular { a, b, c } => vec![a, b, c],
            Membership::Trapezoidal { a, b, c, d } => vec![a, b, c, d],
        }
    }

    pub(crate) fn is_well_formed(&self) -> bool {
        let points = self.points();
        points.iter().all(|p| p.is_finite())
            && points.windows(2).all(|pair| pair[0] <= pair[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangle_boundary_degrees() {
        let mf = Membership::Triangular {
            a: 0.0,
            b: 5.0,
            c: 10.0,
        };
        assert_eq!(mf.degree(-0.001), 0.0);
        assert_eq!(mf.degree(0.0), 0.0);
        assert_eq!(mf.degree(2.5), 0.5);
        assert_eq!(mf.degree(5.0), 1.0);
        assert_eq!(mf.degree(7.5), 0.5);
        assert_eq!(mf.degree(10.0), 0.0);
        assert_eq!(mf.degree(10.001), 0.0);
    }

    #[test]
    fn trapezoid_plateau_and_shoulders() {
        let mf = Membership::Trapezoidal {
            a: 0.0,
            b: 2.0,
            c: 6.0,
            d: 10.0,
        };
        assert_eq!(mf.degree(1.0), 0.5);
        assert_eq!(mf.degree(2.0), 1.0);
        assert_eq!(mf.degree(4.0), 1.0);
        assert_eq!(mf.degree(6.0), 1.0);
        assert_eq!(mf.degree(8.0), 0.5);
        assert_eq!(mf.degree(10.0), 0.0);
    }

    #[test]
    fn vertical_edges_keep_the_boundary_point() {
        // Left-shoulder shape: full degree from the domain edge.
        let mf = Membership::Trapezoidal {
            a: 0.0,
            b: 0.0,
            c: 3.0,
            d: 5.0,
        };
        assert_eq!(mf.degree(0.0), 1.0);

        // Degenerate spike.
        let spike = Membership::Triangular {
            a: 2.0,
            b: 2.0,
            c: 2.0,
        };
        assert_eq!(spike.degree(2.0), 1.0);
        assert_eq!(spike.degree(1.999), 0.0);
        assert_eq!(spike.degree(2.001), 0.0);
    }

    #[test]
    fn ill_formed_shapes_are_rejected() {
        let inverted = Membership::Triangular {
            a: 5.0,
            b: 2.0,
            c: 10.0,
        };
        assert!(!inverted.is_well_formed());

        let non_finite = Membership::Trapezoidal {
            a: 0.0,
            b: 1.0,
            c: f64::NAN,
            d: 3.0,
        };
        assert!(!non_finite.is_well_formed());
    }
}
