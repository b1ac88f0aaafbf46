//! Quadratic form engine: values of `vᵗ·G·v`, principal minors, and
//! definiteness tests by Sylvester's criterion.

use crate::core::error::{LatticeError, Result};
use crate::core::matrix::Matrix;
use crate::core::types::MixedRadix;
use std::collections::BTreeSet;

/// Bilinear value `uᵗ·G·v`
pub fn bilinear_value(gram: &Matrix, u: &[i64], v: &[i64]) -> Result<i64> {
    if u.len() != gram.rows() {
        return Err(LatticeError::invalid_dimensions(
            (gram.rows(), 1),
            (u.len(), 1),
        ));
    }
    let gv = gram.mul_vec(v)?;
    let value: i128 = u.iter().zip(&gv).map(|(&a, &b)| a as i128 * b as i128).sum();
    i64::try_from(value).map_err(|_| LatticeError::overflow("bilinear value"))
}

/// Quadratic value `vᵗ·G·v`
pub fn quadratic_value(gram: &Matrix, v: &[i64]) -> Result<i64> {
    bilinear_value(gram, v, v)
}

/// Determinants of the top-left `k×k` submatrices, `k = 1..=n`
pub fn leading_principal_minors(matrix: &Matrix) -> Result<Vec<i64>> {
    (1..=matrix.rows())
        .map(|k| matrix.leading_submatrix(k)?.determinant())
        .collect()
}

/// Sylvester's criterion: every leading principal minor is positive
pub fn is_positive_definite(matrix: &Matrix) -> Result<bool> {
    Ok(leading_principal_minors(matrix)?.iter().all(|&m| m > 0))
}

/// Determinants of all principal submatrices over non-empty index subsets.
///
/// Subsets are visited as 0/1 masks in counter order; the empty subset is
/// skipped.
pub fn principal_subdeterminants(matrix: &Matrix) -> Result<BTreeSet<i64>> {
    let n = matrix.rows();
    let mut masks = MixedRadix::cube(n, 0, 2);
    let mut dets = BTreeSet::new();
    let mut indices = Vec::with_capacity(n);

    while let Some(mask) = masks.advance() {
        indices.clear();
        indices.extend(mask.iter().enumerate().filter(|&(_, &bit)| bit == 1).map(|(i, _)| i));
        if indices.is_empty() {
            continue;
        }
        dets.insert(matrix.principal_submatrix(&indices)?.determinant()?);
    }

    Ok(dets)
}

/// No principal subdeterminant is negative
pub fn is_positive_semidefinite(matrix: &Matrix) -> Result<bool> {
    Ok(principal_subdeterminants(matrix)?.iter().all(|&d| d >= 0))
}

/// Which side of `c·I` the form is compared against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarBound {
    /// `G - c·I` positive definite
    Above,
    /// `G - c·I` positive semidefinite
    AtLeast,
    /// `c·I - G` positive definite
    Below,
    /// `c·I - G` positive semidefinite
    AtMost,
}

/// Compare the form against `c·I` by shifting the diagonal and rerunning the
/// definiteness test on the shifted matrix
pub fn compare_with_scalar(gram: &Matrix, c: i64, bound: ScalarBound) -> Result<bool> {
    let shifted = match bound {
        ScalarBound::Above | ScalarBound::AtLeast => gram.shift_diagonal(
            c.checked_neg()
                .ok_or_else(|| LatticeError::overflow("scalar shift"))?,
        )?,
        ScalarBound::Below | ScalarBound::AtMost => gram.neg()?.shift_diagonal(c)?,
    };

    match bound {
        ScalarBound::Above | ScalarBound::Below => is_positive_definite(&shifted),
        ScalarBound::AtLeast | ScalarBound::AtMost => is_positive_semidefinite(&shifted),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_b() -> Matrix {
        Matrix::new(vec![vec![3, 1, 1], vec![1, 7, 8], vec![1, 8, 13]]).unwrap()
    }

    #[test]
    fn test_quadratic_value() {
        let gram = Matrix::diagonal(&[2, 2, 2]).unwrap();
        assert_eq!(quadratic_value(&gram, &[1, 0, 0]).unwrap(), 2);
        assert_eq!(quadratic_value(&gram, &[1, -1, 1]).unwrap(), 6);
        let b = scenario_b();
        // 3 + 7 + 2*1 = 12
        assert_eq!(quadratic_value(&b, &[1, 1, 0]).unwrap(), 12);
        assert_eq!(bilinear_value(&b, &[1, 0, 0], &[0, 0, 1]).unwrap(), 1);
        assert!(quadratic_value(&b, &[1, 0]).is_err());
    }

    #[test]
    fn test_leading_minors_and_definiteness() {
        let b = scenario_b();
        assert_eq!(leading_principal_minors(&b).unwrap(), vec![3, 20, 77]);
        assert!(is_positive_definite(&b).unwrap());

        let indefinite = Matrix::new(vec![vec![2, 1], vec![1, -2]]).unwrap();
        assert!(!is_positive_definite(&indefinite).unwrap());
        assert!(!is_positive_semidefinite(&indefinite).unwrap());
    }

    #[test]
    fn test_semidefinite_needs_all_principal_minors() {
        // leading minors 0, 0 but the (1,1) entry is negative
        let m = Matrix::new(vec![vec![0, 0], vec![0, -1]]).unwrap();
        assert!(leading_principal_minors(&m).unwrap().iter().all(|&x| x >= 0));
        assert!(!is_positive_semidefinite(&m).unwrap());

        let psd = Matrix::new(vec![vec![1, 1], vec![1, 1]]).unwrap();
        assert_eq!(
            principal_subdeterminants(&psd).unwrap().into_iter().collect::<Vec<_>>(),
            vec![0, 1]
        );
        assert!(is_positive_semidefinite(&psd).unwrap());
        assert!(!is_positive_definite(&psd).unwrap());
    }

    #[test]
    fn test_scalar_comparisons_on_diagonal() {
        let gram = Matrix::diagonal(&[2, 2, 2, 2, 2]).unwrap();
        assert!(compare_with_scalar(&gram, -1, ScalarBound::Above).unwrap());
        assert!(compare_with_scalar(&gram, 1, ScalarBound::Above).unwrap());
        assert!(!compare_with_scalar(&gram, 2, ScalarBound::Above).unwrap());
        assert!(compare_with_scalar(&gram, 2, ScalarBound::AtLeast).unwrap());
        assert!(!compare_with_scalar(&gram, 2, ScalarBound::Below).unwrap());
        assert!(compare_with_scalar(&gram, 2, ScalarBound::AtMost).unwrap());
        assert!(compare_with_scalar(&gram, 3, ScalarBound::Below).unwrap());
    }
}
