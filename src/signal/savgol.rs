//! Savitzky–Golay smoothing and differentiation
//!
//! Sliding-window local polynomial regression over a trajectory. For each
//! frame, a polynomial of the configured order is least-squares fitted to the
//! surrounding window and evaluated (or differentiated) at the window center.
//!
//! Algorithm:
//! 1. Build the window design matrix for the frame offsets
//! 2. Solve the normal equations for the requested derivative's weight vector
//! 3. Convolve interior frames with the shared symmetric weights
//! 4. Fit boundary frames with a clipped window at reduced order (never
//!    extrapolate past the signal ends)
//!
//! Velocity and acceleration are the first and second derivative outputs of
//! the same fit, not finite differences of the smoothed positions; chaining
//! finite differences would compound the filter's lag inconsistently between
//! the two derivative signals.
//!
//! The estimate at frame i is supported by the `(window - 1) / 2` frames on
//! each side. Within that half-window of either boundary the fit degrades to
//! reduced order, and downstream detectors clamp their search bounds away
//! from those frames ([`SavgolFilter::half_window`]). Zero-phase bidirectional
//! IIR smoothing is not an acceptable substitute: it shifts extremum
//! locations on this signal family (confirmed by regression testing), and
//! extremum frames are exactly what the detectors anchor on.

use crate::error::AnalysisError;
use crate::signal::Trajectory;

/// Pivot threshold for the normal-equation solve
const SINGULAR_EPSILON: f64 = 1e-12;

/// Savitzky–Golay filter with a fixed window length and polynomial order
#[derive(Debug, Clone, Copy)]
pub struct SavgolFilter {
    window: usize,
    order: usize,
}

impl SavgolFilter {
    /// Create a filter
    ///
    /// # Arguments
    ///
    /// * `window` - Window length in frames (odd, >= 3)
    /// * `order` - Polynomial order (>= 1, < window)
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidInput` for an even or too-short window,
    /// or an order the window cannot support.
    pub fn new(window: usize, order: usize) -> Result<Self, AnalysisError> {
        if window < 3 || window % 2 == 0 {
            return Err(AnalysisError::InvalidInput(format!(
                "Smoothing window must be odd and >= 3, got {}",
                window
            )));
        }
        if order == 0 || order >= window {
            return Err(AnalysisError::InvalidInput(format!(
                "Polynomial order must be in 1..window, got order {} for window {}",
                order, window
            )));
        }
        Ok(Self { window, order })
    }

    /// Window length in frames
    pub fn window(&self) -> usize {
        self.window
    }

    /// Polynomial order
    pub fn order(&self) -> usize {
        self.order
    }

    /// Number of frames on each side of the center that support an estimate
    pub fn half_window(&self) -> usize {
        (self.window - 1) / 2
    }

    /// Smooth a trajectory
    ///
    /// Output length equals input length; the signal name is preserved.
    pub fn smooth(&self, trajectory: &Trajectory) -> Result<Trajectory, AnalysisError> {
        let values = self.apply(trajectory.values(), 0, 1.0)?;
        Ok(Trajectory::new(trajectory.name().to_string(), values))
    }

    /// Differentiate a trajectory
    ///
    /// # Arguments
    ///
    /// * `trajectory` - Input position (or lower-derivative) signal
    /// * `deriv` - Derivative order (1 = velocity, 2 = acceleration)
    /// * `fps` - Frame rate, used to scale per-frame derivatives to per-second
    /// * `name` - Name for the derived signal
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidInput` if `deriv` exceeds the
    /// polynomial order (the fit has no such derivative).
    pub fn derivative(
        &self,
        trajectory: &Trajectory,
        deriv: usize,
        fps: f32,
        name: &str,
    ) -> Result<Trajectory, AnalysisError> {
        if deriv == 0 || deriv > self.order {
            return Err(AnalysisError::InvalidInput(format!(
                "Derivative order {} not supported by polynomial order {}",
                deriv, self.order
            )));
        }
        let scale = (fps as f64).powi(deriv as i32);
        let values = self.apply(trajectory.values(), deriv, scale)?;
        Ok(Trajectory::new(name.to_string(), values))
    }

    fn apply(&self, values: &[f32], deriv: usize, scale: f64) -> Result<Vec<f32>, AnalysisError> {
        let n = values.len();
        if n == 0 {
            return Ok(Vec::new());
        }

        let h = self.half_window();
        let mut out = vec![0.0f32; n];

        // Interior frames share one symmetric weight vector
        if n >= self.window {
            let offsets: Vec<f64> = (-(h as i64)..=(h as i64)).map(|o| o as f64).collect();
            let weights = fit_weights(&offsets, self.order, deriv)?;
            for i in h..(n - h) {
                let mut acc = 0.0f64;
                for (j, w) in weights.iter().enumerate() {
                    acc += w * values[i - h + j] as f64;
                }
                out[i] = (acc * scale) as f32;
            }
        }

        // Boundary frames: clipped window, reduced order, evaluated at the
        // frame itself rather than extrapolated
        let tail_start = if n >= self.window { n - h } else { 0 };
        for i in 0..n {
            if n >= self.window && i >= h && i < tail_start {
                continue;
            }
            let lo = i.saturating_sub(h);
            let hi = (i + h + 1).min(n);
            let points = hi - lo;
            let order_eff = self.order.min(points - 1);
            if deriv > order_eff {
                return Err(AnalysisError::InvalidInput(format!(
                    "Signal of {} frames too short for derivative order {} at frame {}",
                    n, deriv, i
                )));
            }
            let offsets: Vec<f64> = (lo..hi).map(|j| j as f64 - i as f64).collect();
            let weights = fit_weights(&offsets, order_eff, deriv)?;
            let mut acc = 0.0f64;
            for (k, j) in (lo..hi).enumerate() {
                acc += weights[k] * values[j] as f64;
            }
            out[i] = (acc * scale) as f32;
        }

        if out.iter().any(|v| !v.is_finite()) {
            return Err(AnalysisError::NumericalError(
                "Non-finite value produced by polynomial fit".to_string(),
            ));
        }

        Ok(out)
    }
}

/// Auto-tune window and order from frame rate and tracking quality
///
/// The window covers roughly 0.25 s of frames, widened by half again when
/// tracking quality is poor (noisier landmarks need more support), and
/// clamped to [5, 31]. Order 3 preserves extremum shape while still
/// providing a second derivative.
///
/// This is a tuning heuristic, not a contract: callers needing specific
/// behavior should pass explicit overrides.
pub fn auto_params(fps: f32, tracking_quality: f32) -> (usize, usize) {
    let mut window = (fps * 0.25).round() as usize;
    if tracking_quality < 0.5 {
        window = window * 3 / 2;
    }
    if window % 2 == 0 {
        window += 1;
    }
    let window = window.clamp(5, 31);
    (window, 3)
}

/// Least-squares weight vector for estimating the `deriv`-th derivative at
/// offset 0 from samples at the given offsets
fn fit_weights(offsets: &[f64], order: usize, deriv: usize) -> Result<Vec<f64>, AnalysisError> {
    let m = order + 1;

    // Normal equations: G = A^T A where A[j][k] = offsets[j]^k
    let mut g = vec![vec![0.0f64; m]; m];
    for (r, row) in g.iter_mut().enumerate() {
        for (c, cell) in row.iter_mut().enumerate() {
            *cell = offsets.iter().map(|t| t.powi((r + c) as i32)).sum();
        }
    }

    let mut rhs = vec![0.0f64; m];
    rhs[deriv] = 1.0;
    let x = solve_linear(g, rhs)?;

    // weights = d! * A x
    let dfact: f64 = (1..=deriv).map(|k| k as f64).product();
    Ok(offsets
        .iter()
        .map(|t| {
            dfact
                * x.iter()
                    .enumerate()
                    .map(|(k, xk)| xk * t.powi(k as i32))
                    .sum::<f64>()
        })
        .collect())
}

/// Gaussian elimination with partial pivoting
fn solve_linear(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>, AnalysisError> {
    let n = b.len();
    for col in 0..n {
        let mut pivot = col;
        for row in (col + 1)..n {
            if a[row][col].abs() > a[pivot][col].abs() {
                pivot = row;
            }
        }
        if a[pivot][col].abs() < SINGULAR_EPSILON {
            return Err(AnalysisError::NumericalError(
                "Singular design matrix in polynomial fit".to_string(),
            ));
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0f64; n];
    for col in (0..n).rev() {
        let mut acc = b[col];
        for k in (col + 1)..n {
            acc -= a[col][k] * x[k];
        }
        x[col] = acc / a[col][col];
    }
    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trajectory_from_fn(n: usize, f: impl Fn(f32) -> f32) -> Trajectory {
        Trajectory::new("test", (0..n).map(|i| f(i as f32)).collect())
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(SavgolFilter::new(4, 2).is_err()); // even window
        assert!(SavgolFilter::new(1, 1).is_err()); // too short
        assert!(SavgolFilter::new(5, 0).is_err()); // zero order
        assert!(SavgolFilter::new(5, 5).is_err()); // order >= window
        assert!(SavgolFilter::new(7, 3).is_ok());
    }

    #[test]
    fn test_smooth_preserves_length_and_name() {
        let filter = SavgolFilter::new(7, 3).unwrap();
        let input = trajectory_from_fn(50, |t| (t * 0.1).sin());
        let output = filter.smooth(&input).unwrap();
        assert_eq!(output.len(), input.len());
        assert_eq!(output.name(), "test");
    }

    #[test]
    fn test_cubic_polynomial_reproduced_exactly() {
        // An order-3 fit reproduces a cubic everywhere, boundaries included
        let filter = SavgolFilter::new(9, 3).unwrap();
        let input = trajectory_from_fn(40, |t| 0.001 * t * t * t - 0.05 * t * t + t + 2.0);
        let output = filter.smooth(&input).unwrap();
        for i in 0..input.len() {
            assert!(
                (output.get(i) - input.get(i)).abs() < 1e-2,
                "frame {}: {} vs {}",
                i,
                output.get(i),
                input.get(i)
            );
        }
    }

    #[test]
    fn test_first_derivative_of_quadratic() {
        // y = t^2 has dy/dt = 2t (fps = 1 keeps units per-frame)
        let filter = SavgolFilter::new(7, 3).unwrap();
        let input = trajectory_from_fn(30, |t| t * t);
        let velocity = filter.derivative(&input, 1, 1.0, "velocity").unwrap();
        for i in 0..input.len() {
            assert!(
                (velocity.get(i) - 2.0 * i as f32).abs() < 1e-2,
                "frame {}: {}",
                i,
                velocity.get(i)
            );
        }
    }

    #[test]
    fn test_second_derivative_of_quadratic_is_constant() {
        let filter = SavgolFilter::new(7, 3).unwrap();
        let input = trajectory_from_fn(30, |t| 0.5 * t * t);
        let accel = filter.derivative(&input, 2, 1.0, "acceleration").unwrap();
        for i in 0..input.len() {
            assert!((accel.get(i) - 1.0).abs() < 1e-2, "frame {}: {}", i, accel.get(i));
        }
    }

    #[test]
    fn test_derivative_scales_with_fps() {
        let filter = SavgolFilter::new(7, 3).unwrap();
        let input = trajectory_from_fn(30, |t| t);
        let v1 = filter.derivative(&input, 1, 1.0, "v").unwrap();
        let v60 = filter.derivative(&input, 1, 60.0, "v").unwrap();
        for i in 0..input.len() {
            assert!((v60.get(i) - 60.0 * v1.get(i)).abs() < 1e-2);
        }
    }

    #[test]
    fn test_derivative_order_beyond_polynomial_rejected() {
        let filter = SavgolFilter::new(7, 2).unwrap();
        let input = trajectory_from_fn(30, |t| t);
        assert!(filter.derivative(&input, 3, 60.0, "jerk").is_err());
    }

    #[test]
    fn test_smoothing_attenuates_jitter() {
        // Deterministic high-frequency jitter on a slow sine
        let clean = trajectory_from_fn(120, |t| (t * 0.05).sin());
        let noisy = Trajectory::new(
            "noisy",
            (0..120)
                .map(|i| (i as f32 * 0.05).sin() + 0.02 * (i as f32 * 2.7).sin())
                .collect(),
        );
        let filter = SavgolFilter::new(11, 3).unwrap();
        let smoothed = filter.smooth(&noisy).unwrap();

        let rms = |t: &Trajectory| -> f32 {
            let sum: f32 = (0..t.len())
                .map(|i| (t.get(i) - clean.get(i)).powi(2))
                .sum();
            (sum / t.len() as f32).sqrt()
        };
        assert!(rms(&smoothed) < rms(&noisy));
    }

    #[test]
    fn test_signal_shorter_than_window() {
        // Falls back to whole-signal reduced fits rather than failing
        let filter = SavgolFilter::new(9, 3).unwrap();
        let input = trajectory_from_fn(5, |t| t);
        let output = filter.smooth(&input).unwrap();
        assert_eq!(output.len(), 5);
        for i in 0..5 {
            assert!((output.get(i) - i as f32).abs() < 1e-3);
        }
    }

    #[test]
    fn test_empty_signal() {
        let filter = SavgolFilter::new(5, 2).unwrap();
        let output = filter.smooth(&Trajectory::new("empty", vec![])).unwrap();
        assert!(output.is_empty());
    }

    #[test]
    fn test_auto_params() {
        let (w, order) = auto_params(60.0, 0.9);
        assert_eq!(w, 15);
        assert_eq!(order, 3);
        assert_eq!(w % 2, 1);

        // Poor tracking widens the window
        let (w_poor, _) = auto_params(60.0, 0.3);
        assert!(w_poor > w);

        // Low frame rates clamp to the minimum usable window
        let (w_slow, _) = auto_params(10.0, 0.9);
        assert_eq!(w_slow, 5);

        // High frame rates clamp to the maximum
        let (w_fast, _) = auto_params(240.0, 0.9);
        assert_eq!(w_fast, 31);
    }
}
