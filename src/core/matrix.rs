//! Integer matrices and the exact determinant engine

use crate::core::error::{LatticeError, Result};
use std::collections::HashMap;
use std::str::FromStr;

/// Largest matrix size the determinant engine accepts; minors are keyed by a
/// 64-bit column mask.
pub const MAX_DETERMINANT_SIZE: usize = 64;

/// Matrix represented as a vector of vectors (row-major)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Matrix {
    data: Vec<Vec<i64>>,
    rows: usize,
    cols: usize,
}

impl Matrix {
    /// Create a new matrix from 2D vector
    pub fn new(data: Vec<Vec<i64>>) -> Result<Self> {
        if data.is_empty() || data[0].is_empty() {
            return Err(LatticeError::EmptyMatrix);
        }

        let rows = data.len();
        let cols = data[0].len();

        // Verify all rows have the same length
        for (i, row) in data.iter().enumerate() {
            if row.len() != cols {
                return Err(LatticeError::invalid_dimensions(
                    (rows, cols),
                    (i + 1, row.len()),
                ));
            }
        }

        Ok(Matrix { data, rows, cols })
    }

    /// Create an identity matrix
    pub fn identity(n: usize) -> Result<Self> {
        if n == 0 {
            return Err(LatticeError::EmptyMatrix);
        }

        let mut data = vec![vec![0i64; n]; n];
        for (i, row) in data.iter_mut().enumerate() {
            row[i] = 1;
        }

        Ok(Matrix { data, rows: n, cols: n })
    }

    /// Create a diagonal matrix
    pub fn diagonal(entries: &[i64]) -> Result<Self> {
        let mut m = Matrix::identity(entries.len())?;
        for (i, &e) in entries.iter().enumerate() {
            m.data[i][i] = e;
        }
        Ok(m)
    }

    /// Create from flat vector
    pub fn from_flat_vec(data: Vec<i64>, rows: usize, cols: usize) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(LatticeError::invalid_parameters(format!(
                "Flat vector length {} doesn't match dimensions {}x{}",
                data.len(),
                rows,
                cols
            )));
        }

        let matrix_data = data.chunks(cols.max(1)).map(|c| c.to_vec()).collect();
        Matrix::new(matrix_data)
    }

    /// Create a square matrix from a row-major flat slice, inferring the size
    /// as the integer square root of its length
    pub fn square_from_flat(data: &[i64]) -> Result<Self> {
        if data.is_empty() {
            return Err(LatticeError::EmptyMatrix);
        }
        let n = integer_sqrt(data.len());
        if n * n != data.len() {
            return Err(LatticeError::NotSquare { len: data.len() });
        }
        Matrix::from_flat_vec(data.to_vec(), n, n)
    }

    /// Get the number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Get the number of columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Get the dimension of the matrix
    pub fn dimension(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Get a reference to a specific element
    pub fn get(&self, row: usize, col: usize) -> Option<&i64> {
        self.data.get(row)?.get(col)
    }

    /// Get a row as a slice
    pub fn get_row(&self, row: usize) -> Result<&[i64]> {
        if row >= self.rows {
            return Err(LatticeError::invalid_dimensions(
                (self.rows, self.cols),
                (row + 1, self.cols),
            ));
        }

        Ok(&self.data[row])
    }

    /// Iterate over the rows
    pub fn row_iter(&self) -> impl Iterator<Item = &[i64]> {
        self.data.iter().map(|r| r.as_slice())
    }

    /// Diagonal entries
    pub fn diagonal_entries(&self) -> Vec<i64> {
        (0..self.rows.min(self.cols)).map(|i| self.data[i][i]).collect()
    }

    /// Returns the first off-diagonal pair `(i, j)` with `a[i][j] != a[j][i]`
    pub fn asymmetry(&self) -> Option<(usize, usize)> {
        if !self.is_square() {
            return Some((0, 0));
        }
        for i in 0..self.rows {
            for j in (i + 1)..self.cols {
                if self.data[i][j] != self.data[j][i] {
                    return Some((i, j));
                }
            }
        }
        None
    }

    pub fn is_symmetric(&self) -> bool {
        self.asymmetry().is_none()
    }

    /// Matrix-vector product `A·v`
    pub fn mul_vec(&self, v: &[i64]) -> Result<Vec<i64>> {
        if v.len() != self.cols {
            return Err(LatticeError::invalid_dimensions(
                (self.cols, 1),
                (v.len(), 1),
            ));
        }

        self.data
            .iter()
            .map(|row| {
                let sum: i128 = row
                    .iter()
                    .zip(v)
                    .map(|(&a, &x)| a as i128 * x as i128)
                    .sum();
                i64::try_from(sum).map_err(|_| LatticeError::overflow("matrix-vector product"))
            })
            .collect()
    }

    /// Add `delta` to every diagonal entry
    pub fn shift_diagonal(&self, delta: i64) -> Result<Self> {
        let mut shifted = self.clone();
        for i in 0..self.rows.min(self.cols) {
            shifted.data[i][i] = self.data[i][i]
                .checked_add(delta)
                .ok_or_else(|| LatticeError::overflow("diagonal shift"))?;
        }
        Ok(shifted)
    }

    /// Entrywise negation
    pub fn neg(&self) -> Result<Self> {
        let data = self
            .data
            .iter()
            .map(|row| {
                row.iter()
                    .map(|&x| x.checked_neg().ok_or_else(|| LatticeError::overflow("negation")))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Matrix { data, rows: self.rows, cols: self.cols })
    }

    /// Greatest common divisor of the absolute values in a row
    pub fn row_gcd(&self, row: usize) -> Result<i64> {
        let g = self.get_row(row)?.iter().fold(0u64, |g, &x| gcd_u64(g, x.unsigned_abs()));
        i64::try_from(g).map_err(|_| LatticeError::overflow("row gcd"))
    }

    /// Create a submatrix excluding given row and column
    pub fn submatrix(&self, exclude_row: usize, exclude_col: usize) -> Result<Self> {
        if exclude_row >= self.rows || exclude_col >= self.cols {
            return Err(LatticeError::invalid_dimensions(
                (self.rows, self.cols),
                (exclude_row + 1, exclude_col + 1),
            ));
        }

        let data = self
            .data
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != exclude_row)
            .map(|(_, row)| {
                row.iter()
                    .enumerate()
                    .filter(|(j, _)| *j != exclude_col)
                    .map(|(_, &x)| x)
                    .collect()
            })
            .collect();

        Matrix::new(data)
    }

    /// Principal submatrix on the given row/column indices
    pub fn principal_submatrix(&self, indices: &[usize]) -> Result<Self> {
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.rows || i >= self.cols) {
            return Err(LatticeError::invalid_dimensions(
                (self.rows, self.cols),
                (bad + 1, bad + 1),
            ));
        }
        let data = indices
            .iter()
            .map(|&i| indices.iter().map(|&j| self.data[i][j]).collect())
            .collect();
        Matrix::new(data)
    }

    /// Top-left `k×k` submatrix
    pub fn leading_submatrix(&self, k: usize) -> Result<Self> {
        let indices: Vec<usize> = (0..k).collect();
        self.principal_submatrix(&indices)
    }

    /// Compute the determinant (only for square matrices)
    ///
    /// Sizes 1 to 3 use closed forms; larger matrices expand along the first
    /// row, caching each minor by the set of columns it keeps.
    pub fn determinant(&self) -> Result<i64> {
        if !self.is_square() {
            return Err(LatticeError::invalid_parameters(
                "Determinant only defined for square matrices",
            ));
        }
        if self.rows > MAX_DETERMINANT_SIZE {
            return Err(LatticeError::invalid_parameters(format!(
                "Determinant limited to {} rows, got {}",
                MAX_DETERMINANT_SIZE, self.rows
            )));
        }

        let cols: Vec<usize> = (0..self.cols).collect();
        let mut cache = HashMap::new();
        self.det_recursive(0, &cols, &mut cache)
    }

    /// Determinant of the minor made of rows `top..n` and the given columns.
    /// The row set is implied by `cols.len()`, so the column mask is a
    /// complete cache key.
    fn det_recursive(
        &self,
        top: usize,
        cols: &[usize],
        cache: &mut HashMap<u64, i64>,
    ) -> Result<i64> {
        let a = |i: usize, j: usize| self.data[top + i][cols[j]];

        match cols.len() {
            1 => return Ok(a(0, 0)),
            2 => {
                return checked_sum(&[
                    term(1, &[a(0, 0), a(1, 1)])?,
                    term(-1, &[a(0, 1), a(1, 0)])?,
                ])
            }
            3 => {
                return checked_sum(&[
                    term(1, &[a(0, 0), a(1, 1), a(2, 2)])?,
                    term(-1, &[a(0, 0), a(2, 1), a(1, 2)])?,
                    term(-1, &[a(1, 0), a(0, 1), a(2, 2)])?,
                    term(1, &[a(1, 0), a(2, 1), a(0, 2)])?,
                    term(1, &[a(2, 0), a(0, 1), a(1, 2)])?,
                    term(-1, &[a(2, 0), a(1, 1), a(0, 2)])?,
                ])
            }
            _ => {}
        }

        let key = cols.iter().fold(0u64, |mask, &c| mask | (1u64 << c));
        if let Some(&det) = cache.get(&key) {
            return Ok(det);
        }

        let mut det = 0i64;
        let mut minor_cols = Vec::with_capacity(cols.len() - 1);
        for i in 0..cols.len() {
            if a(0, i) == 0 {
                continue;
            }
            minor_cols.clear();
            minor_cols.extend(cols.iter().enumerate().filter(|(k, _)| *k != i).map(|(_, &c)| c));
            let minor = self.det_recursive(top + 1, &minor_cols, cache)?;
            let cofactor = term(if i % 2 == 0 { 1 } else { -1 }, &[a(0, i), minor])?;
            det = det
                .checked_add(cofactor)
                .ok_or_else(|| LatticeError::overflow("determinant expansion"))?;
        }

        cache.insert(key, det);
        Ok(det)
    }

    /// Classical adjoint: `adj(A)[i][j] = (-1)^(i+j) det(minor(j, i))`
    pub fn adjugate(&self) -> Result<Self> {
        if !self.is_square() {
            return Err(LatticeError::invalid_parameters(
                "Adjugate only defined for square matrices",
            ));
        }
        let n = self.rows;
        if n == 1 {
            return Matrix::identity(1);
        }

        let mut data = vec![vec![0i64; n]; n];
        for (i, row) in data.iter_mut().enumerate() {
            for (j, entry) in row.iter_mut().enumerate() {
                let minor = self.submatrix(j, i)?.determinant()?;
                *entry = if (i + j) % 2 == 0 {
                    minor
                } else {
                    minor
                        .checked_neg()
                        .ok_or_else(|| LatticeError::overflow("adjugate"))?
                };
            }
        }
        Ok(Matrix { data, rows: n, cols: n })
    }

    /// Convert to Vec<Vec<i64>>
    pub fn to_vec(&self) -> Vec<Vec<i64>> {
        self.data.clone()
    }

    /// Convert to flat vector (row-major)
    pub fn to_flat_vec(&self) -> Vec<i64> {
        self.data.iter().flatten().copied().collect()
    }

    /// Helper: parse a single matrix row from a line
    fn parse_row(line: &str, line_no: usize) -> Result<Vec<i64>> {
        let clean = line.trim().trim_start_matches(['[', ' ']).trim_end_matches([']', ' ', ',']);

        clean
            .split(|c: char| c.is_whitespace() || c == ',' || c == ';')
            .filter(|t| !t.is_empty())
            .map(|tok| {
                tok.parse::<i64>().map_err(|e| {
                    LatticeError::parse(format!(
                        "Failed to parse integer at row {}: '{}': {}",
                        line_no, tok, e
                    ))
                })
            })
            .collect()
    }
}

impl FromStr for Matrix {
    type Err = LatticeError;

    /// Accepted inputs:
    ///  1. JSON: `[[2, 1], [1, 2]]` or a flat `[2, 1, 1, 2]`
    ///  2. Bracketed rows, one per line: `[[2 1]` / ` [1 2]]`
    ///  3. Plain rows of integers separated by spaces/commas/semicolons
    ///
    /// A single row whose length is a perfect square is read as a flat
    /// row-major square matrix.
    fn from_str(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(LatticeError::EmptyMatrix);
        }

        if trimmed.starts_with('[') {
            if let Ok(rows) = serde_json::from_str::<Vec<Vec<i64>>>(trimmed) {
                return Matrix::new(rows);
            }
            if let Ok(flat) = serde_json::from_str::<Vec<i64>>(trimmed) {
                return Matrix::square_from_flat(&flat);
            }
        }

        let mut rows = Vec::new();
        for (idx, line) in trimmed.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let row = Matrix::parse_row(line, idx + 1)?;
            if !row.is_empty() {
                rows.push(row);
            }
        }

        match rows.len() {
            0 => Err(LatticeError::EmptyMatrix),
            1 => Matrix::square_from_flat(&rows[0]),
            _ => Matrix::new(rows),
        }
    }
}

impl std::fmt::Display for Matrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Matrix {}x{}:", self.rows, self.cols)?;
        for row in &self.data {
            writeln!(f, "[{}]", row.iter().map(|x| x.to_string()).collect::<Vec<_>>().join(", "))?;
        }
        Ok(())
    }
}

/// Greatest common divisor of the absolute values; `gcd(0, 0) == 0`
pub fn gcd(a: i64, b: i64) -> u64 {
    gcd_u64(a.unsigned_abs(), b.unsigned_abs())
}

pub(crate) fn gcd_u64(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

fn integer_sqrt(n: usize) -> usize {
    let mut r = (n as f64).sqrt() as usize;
    while r * r > n {
        r -= 1;
    }
    while (r + 1) * (r + 1) <= n {
        r += 1;
    }
    r
}

/// `sign * Π factors`, failing on overflow
fn term(sign: i64, factors: &[i64]) -> Result<i64> {
    factors
        .iter()
        .try_fold(sign, |acc, &v| acc.checked_mul(v))
        .ok_or_else(|| LatticeError::overflow("determinant term"))
}

fn checked_sum(values: &[i64]) -> Result<i64> {
    values
        .iter()
        .try_fold(0i64, |acc, &v| acc.checked_add(v))
        .ok_or_else(|| LatticeError::overflow("determinant sum"))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Plain cofactor expansion, no cache, for cross-checking
    fn naive_det(m: &[Vec<i64>]) -> i64 {
        let n = m.len();
        if n == 1 {
            return m[0][0];
        }
        (0..n)
            .map(|i| {
                let minor: Vec<Vec<i64>> = m[1..]
                    .iter()
                    .map(|r| r.iter().enumerate().filter(|(j, _)| *j != i).map(|(_, &x)| x).collect())
                    .collect();
                let s = if i % 2 == 0 { 1 } else { -1 };
                s * m[0][i] * naive_det(&minor)
            })
            .sum()
    }

    #[test]
    fn test_matrix_creation() {
        let matrix = Matrix::new(vec![vec![1, 2], vec![3, 4]]).unwrap();
        assert_eq!(matrix.rows(), 2);
        assert_eq!(matrix.cols(), 2);
        assert!(Matrix::new(vec![]).is_err());
        assert!(Matrix::new(vec![vec![1, 2], vec![3]]).is_err());
    }

    #[test]
    fn test_square_from_flat() {
        let m = Matrix::square_from_flat(&[2, 1, 1, 2]).unwrap();
        assert_eq!(m.to_vec(), vec![vec![2, 1], vec![1, 2]]);
        assert_eq!(
            Matrix::square_from_flat(&[1, 2, 3]),
            Err(LatticeError::NotSquare { len: 3 })
        );
        assert_eq!(Matrix::square_from_flat(&[]), Err(LatticeError::EmptyMatrix));
    }

    #[test]
    fn test_determinant_small_sizes() {
        assert_eq!(Matrix::new(vec![vec![-7]]).unwrap().determinant().unwrap(), -7);
        let m2 = Matrix::new(vec![vec![2, 3], vec![1, 4]]).unwrap();
        assert_eq!(m2.determinant().unwrap(), 5);
        let m3 = Matrix::new(vec![vec![1, 2, 3], vec![0, 1, 4], vec![5, 6, 0]]).unwrap();
        assert_eq!(m3.determinant().unwrap(), 1);
        let b = Matrix::new(vec![vec![3, 1, 1], vec![1, 7, 8], vec![1, 8, 13]]).unwrap();
        assert_eq!(b.determinant().unwrap(), 77);
    }

    #[test]
    fn test_determinant_cached_expansion_matches_naive() {
        // A_6 root lattice and a dense non-symmetric 5x5
        let a6 = vec![
            vec![2, 0, 0, -1, 0, 0],
            vec![0, 2, -1, 0, 0, 0],
            vec![0, -1, 2, -1, 0, 0],
            vec![-1, 0, -1, 2, -1, 0],
            vec![0, 0, 0, -1, 2, -1],
            vec![0, 0, 0, 0, -1, 2],
        ];
        let dense = vec![
            vec![3, -1, 4, 1, -5],
            vec![9, 2, -6, 5, 3],
            vec![5, -8, 9, 7, 9],
            vec![-3, 2, 3, 8, -4],
            vec![6, 2, -6, 4, 3],
        ];
        for data in [a6, dense] {
            let expected = naive_det(&data);
            assert_eq!(Matrix::new(data).unwrap().determinant().unwrap(), expected);
        }
    }

    #[test]
    fn test_determinant_rejects_non_square() {
        let m = Matrix::new(vec![vec![1, 2, 3], vec![4, 5, 6]]).unwrap();
        assert!(m.determinant().is_err());
    }

    #[test]
    fn test_determinant_overflow_is_reported() {
        let big = i64::MAX / 2;
        let m = Matrix::new(vec![vec![big, 1], vec![1, big]]).unwrap();
        assert!(matches!(m.determinant(), Err(LatticeError::ArithmeticOverflow(_))));
    }

    #[test]
    fn test_adjugate_times_matrix_is_scalar() {
        let m = Matrix::new(vec![vec![3, 1, 1], vec![1, 7, 8], vec![1, 8, 13]]).unwrap();
        let adj = m.adjugate().unwrap();
        for j in 0..3 {
            let col: Vec<i64> = (0..3).map(|i| *m.get(i, j).unwrap()).collect();
            let image = adj.mul_vec(&col).unwrap();
            for (i, &x) in image.iter().enumerate() {
                assert_eq!(x, if i == j { 77 } else { 0 });
            }
        }
    }

    #[test]
    fn test_submatrices() {
        let m = Matrix::new(vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9]]).unwrap();
        assert_eq!(m.submatrix(0, 1).unwrap().to_vec(), vec![vec![4, 6], vec![7, 9]]);
        assert_eq!(m.principal_submatrix(&[0, 2]).unwrap().to_vec(), vec![vec![1, 3], vec![7, 9]]);
        assert_eq!(m.leading_submatrix(1).unwrap().to_vec(), vec![vec![1]]);
        assert!(m.principal_submatrix(&[3]).is_err());
    }

    #[test]
    fn test_symmetry_and_shifts() {
        let m = Matrix::new(vec![vec![2, 1], vec![0, 2]]).unwrap();
        assert_eq!(m.asymmetry(), Some((0, 1)));
        let s = Matrix::new(vec![vec![2, 1], vec![1, 2]]).unwrap();
        assert!(s.is_symmetric());
        assert_eq!(s.shift_diagonal(-3).unwrap().to_vec(), vec![vec![-1, 1], vec![1, -1]]);
        assert_eq!(s.neg().unwrap().to_vec(), vec![vec![-2, -1], vec![-1, -2]]);
    }

    #[test]
    fn test_row_gcd() {
        let m = Matrix::new(vec![vec![6, -3], vec![0, 0]]).unwrap();
        assert_eq!(m.row_gcd(0).unwrap(), 3);
        assert_eq!(m.row_gcd(1).unwrap(), 0);
        assert_eq!(gcd(-4, 6), 2);
        assert_eq!(gcd(i64::MIN, 0), 1u64 << 63);

        let extreme = Matrix::new(vec![vec![i64::MIN, 0], vec![0, 1]]).unwrap();
        assert!(matches!(
            extreme.row_gcd(0),
            Err(LatticeError::ArithmeticOverflow(_))
        ));
    }

    #[test]
    fn test_parse_formats() {
        let json: Matrix = "[[2, 1], [1, 2]]".parse().unwrap();
        let bracketed: Matrix = "[[2 1]\n [1 2]]".parse().unwrap();
        let plain: Matrix = "2, 1\n1, 2\n".parse().unwrap();
        let flat: Matrix = "2 1 1 2".parse().unwrap();
        assert_eq!(json, bracketed);
        assert_eq!(json, plain);
        assert_eq!(json, flat);
        assert!("1 2 3".parse::<Matrix>().is_err());
        assert!("1 x\n2 3".parse::<Matrix>().is_err());
    }
}
