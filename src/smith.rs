//! Smith normal form over the integers.
//!
//! The Smith normal form of an integer matrix `A` is the diagonal `D = U·A·V`
//! with unimodular `U` and `V` and `d_i | d_{i+1}`. For a Gram matrix the
//! diagonal entries are the invariant factors of the discriminant group, so
//! `L^# / L ≅ ⊕ Z/d_i`.

use crate::core::error::{LatticeError, Result};
use crate::core::matrix::Matrix;

/// Diagonal of the Smith normal form together with the rank
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SmithNormalForm {
    /// Non-negative diagonal entries `d_1 | d_2 | ... | d_rank`
    pub diagonal: Vec<i64>,
    pub rank: usize,
}

impl SmithNormalForm {
    /// Product of the diagonal, `|det|` for a full-rank square matrix
    pub fn determinant(&self) -> Result<i64> {
        self.diagonal.iter().try_fold(1i64, |acc, &d| {
            acc.checked_mul(d)
                .ok_or_else(|| LatticeError::overflow("Smith normal form determinant"))
        })
    }
}

/// Computes the Smith normal form of an arbitrary integer matrix.
///
/// Works in `i128`; entries that grow past that range give
/// [`LatticeError::ArithmeticOverflow`].
pub fn smith_normal_form(matrix: &Matrix) -> Result<SmithNormalForm> {
    let m = matrix.rows();
    let n = matrix.cols();
    let mut a: Vec<Vec<i128>> = matrix
        .row_iter()
        .map(|row| row.iter().map(|&x| x as i128).collect())
        .collect();

    let mut rank = 0;
    for k in 0..m.min(n) {
        let Some((pi, pj)) = find_pivot(&a, k) else {
            break;
        };
        a.swap(k, pi);
        if pj != k {
            for row in a.iter_mut() {
                row.swap(k, pj);
            }
        }

        while eliminate_row_col(&mut a, k)? {}
        rank += 1;
    }

    let mut diagonal: Vec<i128> = (0..rank).map(|i| a[i][i].abs()).collect();
    ensure_divisibility(&mut diagonal)?;

    let diagonal = diagonal
        .into_iter()
        .map(|d| i64::try_from(d).map_err(|_| LatticeError::overflow("invariant factor")))
        .collect::<Result<Vec<_>>>()?;
    Ok(SmithNormalForm { diagonal, rank })
}

/// Invariant factors of the discriminant group: the Smith diagonal of the
/// Gram matrix with unit entries dropped. Their product is `|d|`.
pub fn invariant_factors(gram: &Matrix) -> Result<Vec<i64>> {
    if !gram.is_square() {
        return Err(LatticeError::invalid_dimensions(
            (gram.rows(), gram.rows()),
            gram.dimension(),
        ));
    }
    let snf = smith_normal_form(gram)?;
    if snf.rank < gram.rows() {
        return Err(LatticeError::DegenerateLattice);
    }
    Ok(snf.diagonal.into_iter().filter(|&d| d != 1).collect())
}

fn find_pivot(a: &[Vec<i128>], k: usize) -> Option<(usize, usize)> {
    (k..a.len()).find_map(|i| (k..a[i].len()).find(|&j| a[i][j] != 0).map(|j| (i, j)))
}

/// One sweep clearing column `k` below the pivot and row `k` right of it.
///
/// Returns true if any entry was touched.
fn eliminate_row_col(a: &mut [Vec<i128>], k: usize) -> Result<bool> {
    let mut changed = false;
    let cols = a[k].len();

    for i in k + 1..a.len() {
        let (p, b) = (a[k][k], a[i][k]);
        if b == 0 {
            continue;
        }
        changed = true;
        if b % p == 0 {
            let q = b / p;
            for j in 0..cols {
                a[i][j] = sub_mul(a[i][j], q, a[k][j])?;
            }
            continue;
        }
        let (g, s, t) = extended_gcd(p, b);
        let (qk, qi) = (p / g, b / g);
        for j in 0..cols {
            let (x, y) = (a[k][j], a[i][j]);
            a[k][j] = combine(s, x, t, y)?;
            a[i][j] = combine(-qi, x, qk, y)?;
        }
    }

    for j in k + 1..cols {
        let (p, b) = (a[k][k], a[k][j]);
        if b == 0 {
            continue;
        }
        changed = true;
        if b % p == 0 {
            let q = b / p;
            for row in a.iter_mut() {
                row[j] = sub_mul(row[j], q, row[k])?;
            }
            continue;
        }
        let (g, s, t) = extended_gcd(p, b);
        let (qk, qj) = (p / g, b / g);
        for row in a.iter_mut() {
            let (x, y) = (row[k], row[j]);
            row[k] = combine(s, x, t, y)?;
            row[j] = combine(-qj, x, qk, y)?;
        }
    }

    Ok(changed)
}

/// Rewrite the diagonal so that each entry divides the next, replacing pairs
/// by their gcd and lcm
fn ensure_divisibility(diagonal: &mut [i128]) -> Result<()> {
    for i in 0..diagonal.len() {
        for j in i + 1..diagonal.len() {
            let (x, y) = (diagonal[i], diagonal[j]);
            let g = gcd_i128(x, y);
            if g == 0 || y % x == 0 {
                continue;
            }
            diagonal[i] = g;
            diagonal[j] = (x / g)
                .checked_mul(y)
                .ok_or_else(|| LatticeError::overflow("invariant factor lcm"))?;
        }
    }
    Ok(())
}

/// `(g, s, t)` with `g = s·a + t·b`
fn extended_gcd(a: i128, b: i128) -> (i128, i128, i128) {
    let (mut r0, mut r1) = (a, b);
    let (mut s0, mut s1) = (1i128, 0i128);
    let (mut t0, mut t1) = (0i128, 1i128);
    while r1 != 0 {
        let q = r0.div_euclid(r1);
        (r0, r1) = (r1, r0 - q * r1);
        (s0, s1) = (s1, s0 - q * s1);
        (t0, t1) = (t1, t0 - q * t1);
    }
    (r0, s0, t0)
}

fn gcd_i128(a: i128, b: i128) -> i128 {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

fn combine(s: i128, x: i128, t: i128, y: i128) -> Result<i128> {
    s.checked_mul(x)
        .zip(t.checked_mul(y))
        .and_then(|(sx, ty)| sx.checked_add(ty))
        .ok_or_else(|| LatticeError::overflow("Smith normal form elimination"))
}

fn sub_mul(x: i128, q: i128, y: i128) -> Result<i128> {
    q.checked_mul(y)
        .and_then(|qy| x.checked_sub(qy))
        .ok_or_else(|| LatticeError::overflow("Smith normal form elimination"))
}
