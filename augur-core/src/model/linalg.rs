//! Dense symmetric positive-definite solve for the penalized normal equations.

use crate::AugurError;

/// Pivots below this fraction of the largest diagonal entry are treated as singular.
const RELATIVE_PIVOT_FLOOR: f64 = 1e-15;

/// Solve `A x = b` for a symmetric positive-definite `A` (row-major, `n x n`)
/// via Cholesky factorization `A = L Lᵀ`.
///
/// # Errors
/// Returns `Fit` when a pivot is non-positive, vanishing or non-finite.
pub(crate) fn solve_spd(a: &[f64], b: &[f64], n: usize) -> Result<Vec<f64>, AugurError> {
    debug_assert_eq!(a.len(), n * n);
    debug_assert_eq!(b.len(), n);
    let max_diag = (0..n).map(|i| a[i * n + i].abs()).fold(0.0_f64, f64::max);
    let floor = max_diag * RELATIVE_PIVOT_FLOOR;

    let mut l = vec![0.0_f64; n * n];
    for j in 0..n {
        let mut diag = a[j * n + j];
        for k in 0..j {
            diag -= l[j * n + k] * l[j * n + k];
        }
        if !(diag.is_finite() && diag > floor) {
            return Err(AugurError::fit(format!(
                "normal equations are singular at column {j} (pivot {diag:e})"
            )));
        }
        let ljj = diag.sqrt();
        l[j * n + j] = ljj;
        for i in (j + 1)..n {
            let mut s = a[i * n + j];
            for k in 0..j {
                s -= l[i * n + k] * l[j * n + k];
            }
            l[i * n + j] = s / ljj;
        }
    }

    // Forward substitution: L z = b
    let mut z = vec![0.0_f64; n];
    for i in 0..n {
        let mut s = b[i];
        for k in 0..i {
            s -= l[i * n + k] * z[k];
        }
        z[i] = s / l[i * n + i];
    }
    // Back substitution: Lᵀ x = z
    let mut x = vec![0.0_f64; n];
    for i in (0..n).rev() {
        let mut s = z[i];
        for k in (i + 1)..n {
            s -= l[k * n + i] * x[k];
        }
        x[i] = s / l[i * n + i];
    }
    if x.iter().any(|v| !v.is_finite()) {
        return Err(AugurError::fit("solution contains non-finite coefficients"));
    }
    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solves_small_spd_system() {
        // A = [[4, 2], [2, 3]], b = [2, 1] => x = [0.5, 0]
        let x = solve_spd(&[4.0, 2.0, 2.0, 3.0], &[2.0, 1.0], 2).unwrap();
        assert!((x[0] - 0.5).abs() < 1e-12);
        assert!(x[1].abs() < 1e-12);
    }

    #[test]
    fn singular_matrix_is_a_fit_error() {
        let err = solve_spd(&[1.0, 1.0, 1.0, 1.0], &[1.0, 1.0], 2).unwrap_err();
        assert!(err.is_retryable_fit());
    }

    #[test]
    fn nan_entries_are_rejected() {
        assert!(solve_spd(&[f64::NAN], &[1.0], 1).is_err());
    }
}
