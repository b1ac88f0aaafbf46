//! Root search: vectors of squared length 2 in a positive-definite lattice.

use crate::core::error::Result;
use crate::core::matrix::Matrix;
use crate::core::types::{root_search_bound, LatticeParams, MixedRadix};
use crate::quadratic::{is_positive_definite, quadratic_value};

/// Squared length of a root
pub const ROOT_NORM: i64 = 2;

/// First vector `v` in `[-B, B]^n` with `vᵗ·G·v = 2`, where `B` is the
/// largest absolute diagonal entry.
///
/// Returns `Ok(None)` for forms that are not positive definite; those are
/// never searched.
pub fn find_root(gram: &Matrix, params: &LatticeParams) -> Result<Option<Vec<i64>>> {
    if !is_positive_definite(gram)? {
        log::debug!("form is not positive definite, skipping root search");
        return Ok(None);
    }

    let bound = root_search_bound(gram);
    let mut grid = MixedRadix::cube(gram.rows(), -bound, bound.saturating_add(1));
    params.check("root search", grid.size(), params.max_root_search)?;

    while let Some(v) = grid.advance() {
        if quadratic_value(gram, v)? == ROOT_NORM {
            log::debug!("found root {:?}", v);
            return Ok(Some(v.to_vec()));
        }
    }
    Ok(None)
}

pub fn has_root(gram: &Matrix, params: &LatticeParams) -> Result<bool> {
    Ok(find_root(gram, params)?.is_some())
}
