//! Utility functions and helpers for building Gram matrices

use crate::core::error::{LatticeError, Result};
use crate::core::matrix::Matrix;

/// Matrix utilities
pub mod matrix_utils {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{rng, Rng, SeedableRng};

    fn seeded(seed: Option<u64>) -> StdRng {
        match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => {
                let mut entropy = rng();
                <StdRng as SeedableRng>::from_rng(&mut entropy)
            }
        }
    }

    /// Random symmetric matrix with entries in `[-bound, bound]`
    pub fn generate_random_gram(rank: usize, bound: i64, seed: Option<u64>) -> Result<Matrix> {
        if bound < 0 {
            return Err(LatticeError::invalid_parameters(format!(
                "Entry bound must be non-negative, got {}",
                bound
            )));
        }
        let mut rng = seeded(seed);
        let mut data = vec![vec![0i64; rank]; rank];
        for i in 0..rank {
            for j in i..rank {
                let value = rng.random_range(-bound..=bound);
                data[i][j] = value;
                data[j][i] = value;
            }
        }
        Matrix::new(data)
    }

    /// Random symmetric matrices until one has `0 < |det| <= max_discriminant`.
    ///
    /// Gives up after `attempts` draws.
    pub fn generate_nondegenerate_gram(
        rank: usize,
        bound: i64,
        max_discriminant: u64,
        attempts: usize,
        seed: Option<u64>,
    ) -> Result<Matrix> {
        let mut rng = seeded(seed);
        for _ in 0..attempts {
            let gram = generate_random_gram(rank, bound, Some(rng.random()))?;
            let det = gram.determinant()?;
            if det != 0 && det.unsigned_abs() <= max_discriminant {
                return Ok(gram);
            }
        }
        Err(LatticeError::invalid_parameters(format!(
            "No rank {} Gram matrix with 0 < |det| <= {} in {} attempts",
            rank, max_discriminant, attempts
        )))
    }

    /// Block diagonal sum of Gram matrices, the orthogonal direct sum of the
    /// lattices
    pub fn direct_sum(blocks: &[Matrix]) -> Result<Matrix> {
        let n: usize = blocks.iter().map(|b| b.rows()).sum();
        if n == 0 {
            return Err(LatticeError::EmptyMatrix);
        }
        let mut data = vec![vec![0i64; n]; n];
        let mut offset = 0;
        for block in blocks {
            if !block.is_square() {
                return Err(LatticeError::invalid_dimensions(
                    (block.rows(), block.rows()),
                    block.dimension(),
                ));
            }
            for (i, row) in block.row_iter().enumerate() {
                data[offset + i][offset..offset + row.len()].copy_from_slice(row);
            }
            offset += block.rows();
        }
        Matrix::new(data)
    }

    /// Gram matrix of the root lattice `A_n`: 2 on the diagonal, -1 beside it
    pub fn root_lattice_a(n: usize) -> Result<Matrix> {
        let mut m = Matrix::diagonal(&vec![2; n])?.to_vec();
        for i in 1..n {
            m[i][i - 1] = -1;
            m[i - 1][i] = -1;
        }
        Matrix::new(m)
    }
}
