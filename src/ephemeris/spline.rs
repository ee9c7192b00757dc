use nalgebra::{DMatrix, DVector};

use crate::prelude::Error;

/// Piecewise cubic with not-a-knot end conditions, the semantics of the
/// usual scientific resamplers: exact at every knot, C² in between.
/// Requires at least 4 strictly increasing knots.
pub(crate) struct CubicSpline {
    knots: Vec<f64>,
    values: Vec<f64>,
    /// Second derivative at each knot
    curvatures: Vec<f64>,
}

impl CubicSpline {
    pub fn fit(knots: &[f64], values: &[f64]) -> Result<Self, Error> {
        let n = knots.len();
        if n < 4 || values.len() != n {
            return Err(Error::SplineSolve);
        }

        let h = knots
            .windows(2)
            .map(|w| w[1] - w[0])
            .collect::<Vec<f64>>();

        let mut mat = DMatrix::<f64>::zeros(n, n);
        let mut rhs = DVector::<f64>::zeros(n);

        // not-a-knot: one single cubic spans the two first segments
        mat[(0, 0)] = h[1];
        mat[(0, 1)] = -(h[0] + h[1]);
        mat[(0, 2)] = h[0];

        for i in 1..n - 1 {
            mat[(i, i - 1)] = h[i - 1] / 6.0;
            mat[(i, i)] = (h[i - 1] + h[i]) / 3.0;
            mat[(i, i + 1)] = h[i] / 6.0;
            rhs[i] = (values[i + 1] - values[i]) / h[i] - (values[i] - values[i - 1]) / h[i - 1];
        }

        // same on the two last segments
        mat[(n - 1, n - 3)] = h[n - 2];
        mat[(n - 1, n - 2)] = -(h[n - 3] + h[n - 2]);
        mat[(n - 1, n - 1)] = h[n - 3];

        let curvatures = mat.lu().solve(&rhs).ok_or(Error::SplineSolve)?;

        Ok(Self {
            knots: knots.to_vec(),
            values: values.to_vec(),
            curvatures: curvatures.iter().copied().collect(),
        })
    }

    /// Evaluates the spline. Only meaningful within the fitted span:
    /// outside of it, this continues the boundary polynomial.
    pub fn eval(&self, t: f64) -> f64 {
        let last = self.knots.len() - 2;
        let seg = match self.knots.partition_point(|&knot| knot <= t) {
            0 => 0,
            p => (p - 1).min(last),
        };

        let (x0, x1) = (self.knots[seg], self.knots[seg + 1]);
        let (y0, y1) = (self.values[seg], self.values[seg + 1]);
        let (m0, m1) = (self.curvatures[seg], self.curvatures[seg + 1]);
        let h = x1 - x0;

        m0 * (x1 - t).powi(3) / (6.0 * h)
            + m1 * (t - x0).powi(3) / (6.0 * h)
            + (y0 / h - m0 * h / 6.0) * (x1 - t)
            + (y1 / h - m1 * h / 6.0) * (t - x0)
    }
}
