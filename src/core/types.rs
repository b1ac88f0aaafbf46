//! Core types shared by the lattice engines: the mixed-radix counter that
//! drives every brute-force search, construction parameters, and search-cost
//! projections.

use crate::core::error::{LatticeError, Result};
use crate::core::matrix::Matrix;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CounterState {
    Fresh,
    Running,
    Done,
}

/// Finite, restartable sequence of integer tuples.
///
/// Axis `i` runs over `lower[i], lower[i] + steps[i], ...` strictly below
/// `upper[i]`. The last axis moves fastest, so tuples come out in
/// lexicographic order. With zero axes the counter yields a single empty
/// tuple.
#[derive(Debug, Clone)]
pub struct MixedRadix {
    lower: Vec<i64>,
    upper: Vec<i64>,
    steps: Vec<i64>,
    current: Vec<i64>,
    state: CounterState,
}

impl MixedRadix {
    /// Create a counter with per-axis bounds and steps
    pub fn new(lower: Vec<i64>, upper: Vec<i64>, steps: Vec<i64>) -> Result<Self> {
        if lower.len() != upper.len() || lower.len() != steps.len() {
            return Err(LatticeError::invalid_dimensions(
                (lower.len(), lower.len()),
                (upper.len(), steps.len()),
            ));
        }
        if let Some(bad) = steps.iter().find(|&&s| s <= 0) {
            return Err(LatticeError::invalid_parameters(format!(
                "Counter steps must be positive, got {}",
                bad
            )));
        }

        Ok(MixedRadix {
            current: lower.clone(),
            lower,
            upper,
            steps,
            state: CounterState::Fresh,
        })
    }

    /// Unit-step counter over `[lower, upper)` on every axis
    pub fn cube(axes: usize, lower: i64, upper: i64) -> Self {
        MixedRadix {
            lower: vec![lower; axes],
            upper: vec![upper; axes],
            steps: vec![1; axes],
            current: vec![lower; axes],
            state: CounterState::Fresh,
        }
    }

    /// Number of axes
    pub fn axes(&self) -> usize {
        self.lower.len()
    }

    /// Total number of tuples, saturating at `u128::MAX`
    pub fn size(&self) -> u128 {
        self.lower
            .iter()
            .zip(&self.upper)
            .zip(&self.steps)
            .map(|((&lo, &hi), &step)| axis_len(lo, hi, step))
            .fold(1u128, |acc, n| acc.saturating_mul(n))
    }

    /// Move to the next tuple without allocating
    pub fn advance(&mut self) -> Option<&[i64]> {
        match self.state {
            CounterState::Done => return None,
            CounterState::Fresh => {
                if self.lower.iter().zip(&self.upper).any(|(lo, hi)| lo >= hi) {
                    self.state = CounterState::Done;
                    return None;
                }
                self.state = CounterState::Running;
                return Some(&self.current);
            }
            CounterState::Running => {}
        }

        let mut pos = self.axes();
        loop {
            if pos == 0 {
                self.state = CounterState::Done;
                return None;
            }
            pos -= 1;
            self.current[pos] = self.current[pos].saturating_add(self.steps[pos]);
            if self.current[pos] < self.upper[pos] {
                return Some(&self.current);
            }
            self.current[pos] = self.lower[pos];
        }
    }

    /// Rewind to the first tuple
    pub fn reset(&mut self) {
        self.current.copy_from_slice(&self.lower);
        self.state = CounterState::Fresh;
    }
}

impl Iterator for MixedRadix {
    type Item = Vec<i64>;

    fn next(&mut self) -> Option<Self::Item> {
        self.advance().map(|t| t.to_vec())
    }
}

fn axis_len(lo: i64, hi: i64, step: i64) -> u128 {
    if hi <= lo {
        return 0;
    }
    let span = (hi as i128 - lo as i128) as u128;
    let step = step as u128;
    span.div_ceil(step)
}

/// Limits on the brute-force searches run at construction and on demand
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatticeParams {
    /// Candidate vectors the discriminant group enumerator may visit
    pub max_enumeration: u128,
    /// Coefficient tuples a single coset membership test may visit
    pub max_coset_search: u128,
    /// Grid points the root finder may visit
    pub max_root_search: u128,
}

impl Default for LatticeParams {
    fn default() -> Self {
        LatticeParams {
            max_enumeration: 1 << 32,
            max_coset_search: 1 << 32,
            max_root_search: 1 << 32,
        }
    }
}

impl LatticeParams {
    /// Parameters without any limit
    pub fn unbounded() -> Self {
        LatticeParams {
            max_enumeration: u128::MAX,
            max_coset_search: u128::MAX,
            max_root_search: u128::MAX,
        }
    }

    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("max_enumeration", self.max_enumeration),
            ("max_coset_search", self.max_coset_search),
            ("max_root_search", self.max_root_search),
        ] {
            if value == 0 {
                return Err(LatticeError::invalid_parameters(format!(
                    "{} must be positive",
                    name
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn check(&self, operation: &'static str, size: u128, limit: u128) -> Result<()> {
        if size > limit {
            log::warn!("{} needs {} points, limit is {}", operation, size, limit);
            return Err(LatticeError::search_space(operation, size, limit));
        }
        Ok(())
    }
}

/// Projected sizes of the brute-force searches for a Gram matrix, available
/// before a lattice is constructed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchCost {
    /// Determinant of the Gram matrix
    pub discriminant: i64,
    /// Candidates visited by the row-gcd strided enumeration
    pub enumeration: u128,
    /// Grid points `(2B+1)^rank` visited by the root finder
    pub root_search: u128,
}

impl SearchCost {
    pub fn for_gram(gram: &Matrix) -> Result<Self> {
        let discriminant = gram.determinant()?;
        let modulus = discriminant.unsigned_abs() as u128;

        let mut enumeration = 1u128;
        for i in 0..gram.rows() {
            let stride = gram.row_gcd(i)?.max(1) as u128;
            enumeration = enumeration.saturating_mul(modulus.div_ceil(stride));
        }

        let bound = root_search_bound(gram);
        let side = 2 * bound as u128 + 1;
        let root_search = (0..gram.rows()).fold(1u128, |acc, _| acc.saturating_mul(side));

        Ok(SearchCost {
            discriminant,
            enumeration,
            root_search,
        })
    }

    /// Coefficient tuples `|d|^k` a coset test over `k` generators visits
    pub fn coset_search(&self, generators: usize) -> u128 {
        let modulus = self.discriminant.unsigned_abs() as u128;
        (0..generators).fold(1u128, |acc, _| acc.saturating_mul(modulus))
    }
}

/// Largest absolute diagonal entry; root coordinates are searched in `[-B, B]`
pub fn root_search_bound(gram: &Matrix) -> i64 {
    gram.diagonal_entries()
        .iter()
        .map(|d| d.saturating_abs())
        .max()
        .unwrap_or(0)
}
