//! Coset membership and greedy generator extraction for discriminant groups.
//!
//! The coset test is an exhaustive search over all `|d|^k` coefficient tuples
//! for `k` generators. It dominates the cost of generator extraction and is
//! kept exhaustive so the representative chosen on ties never depends on
//! search shortcuts.

use crate::core::error::{LatticeError, Result};
use crate::core::types::{LatticeParams, MixedRadix};
use crate::discriminant::{first_max_by_order, first_min_by_order, DiscriminantGroup, GroupElement};
use std::collections::BTreeSet;

/// Whether `a - b` is an integer combination of `generators` modulo `modulus`.
///
/// Each coefficient ranges over `0..modulus`; with no generators this is
/// plain equality modulo `modulus`.
pub fn same_coset(
    a: &[i64],
    b: &[i64],
    generators: &[GroupElement],
    modulus: i64,
) -> Result<bool> {
    if modulus <= 0 {
        return Err(LatticeError::invalid_parameters(format!(
            "coset modulus must be positive, got {}",
            modulus
        )));
    }
    let rank = a.len();
    if b.len() != rank {
        return Err(LatticeError::invalid_dimensions((rank, 1), (b.len(), 1)));
    }
    if let Some(g) = generators.iter().find(|g| g.coordinates().len() != rank) {
        return Err(LatticeError::invalid_dimensions(
            (rank, 1),
            (g.coordinates().len(), 1),
        ));
    }

    let m = modulus as i128;
    let diff: Vec<i128> = a.iter().zip(b).map(|(&x, &y)| x as i128 - y as i128).collect();
    let mut coefficients = MixedRadix::cube(generators.len(), 0, modulus);

    while let Some(c) = coefficients.advance() {
        let hit = (0..rank).all(|k| {
            let s = generators
                .iter()
                .zip(c)
                .fold(diff[k], |acc, (g, &cj)| acc + cj as i128 * g.coordinates()[k] as i128);
            s % m == 0
        });
        if hit {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Split `elements` into cosets of the subgroup spanned by `generators`,
/// keeping first-seen order. A bucket that already holds `full_size`
/// elements is skipped.
pub fn partition_into_cosets(
    elements: &[GroupElement],
    generators: &[GroupElement],
    modulus: i64,
    full_size: u64,
) -> Result<Vec<Vec<GroupElement>>> {
    let mut cosets: Vec<Vec<GroupElement>> = Vec::new();

    'items: for item in elements {
        for coset in cosets.iter_mut() {
            if coset.len() as u64 == full_size {
                continue;
            }
            if same_coset(item.coordinates(), coset[0].coordinates(), generators, modulus)? {
                coset.push(item.clone());
                continue 'items;
            }
        }
        cosets.push(vec![item.clone()]);
    }

    Ok(cosets)
}

/// Ordered generating set of a discriminant group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorSet {
    modulus: i64,
    generators: Vec<GroupElement>,
}

impl GeneratorSet {
    /// Greedy extraction by maximum-order selection and coset reduction.
    ///
    /// Produces a valid generating set for this enumeration order; it is not
    /// a canonical decomposition.
    pub fn extract(group: &DiscriminantGroup, params: &LatticeParams) -> Result<Self> {
        let modulus = group.modulus();
        let target = modulus.unsigned_abs();

        let first = first_max_by_order(group.elements())
            .ok_or_else(|| LatticeError::internal("discriminant group is empty"))?;
        let mut product = first.order();
        let mut generators = vec![first.clone()];
        let mut remaining = group.elements().to_vec();

        while product < target {
            let cost = (0..generators.len())
                .fold(1u128, |acc, _| acc.saturating_mul(modulus as u128));
            params.check("coset membership search", cost, params.max_coset_search)?;

            let cosets = partition_into_cosets(&remaining, &generators, modulus, product)?;
            remaining = cosets
                .iter()
                .filter_map(|coset| first_min_by_order(coset).cloned())
                .collect();
            log::debug!(
                "{} generators (order product {}) leave {} cosets",
                generators.len(),
                product,
                remaining.len()
            );

            if remaining.len() == 1 {
                break;
            }

            let next = first_max_by_order(&remaining)
                .ok_or_else(|| LatticeError::internal("no coset representatives left"))?
                .clone();
            if next.order() <= 1 {
                return Err(LatticeError::internal(format!(
                    "{} cosets remain but every representative has order 1",
                    remaining.len()
                )));
            }
            product = product
                .checked_mul(next.order())
                .ok_or_else(|| LatticeError::overflow("product of generator orders"))?;
            generators.push(next);
        }

        Ok(GeneratorSet {
            modulus,
            generators,
        })
    }

    pub fn elements(&self) -> &[GroupElement] {
        &self.generators
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GroupElement> {
        self.generators.iter()
    }

    pub fn orders(&self) -> Vec<u64> {
        self.generators.iter().map(|g| g.order()).collect()
    }

    /// Product of generator orders, saturating
    pub fn order_product(&self) -> u128 {
        self.generators
            .iter()
            .fold(1u128, |acc, g| acc.saturating_mul(g.order() as u128))
    }

    /// Every element the generators span
    pub fn span(&self) -> Result<BTreeSet<Vec<i64>>> {
        generated_subgroup(&self.generators, self.modulus)
    }
}

impl<'a> IntoIterator for &'a GeneratorSet {
    type Item = &'a GroupElement;
    type IntoIter = std::slice::Iter<'a, GroupElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.generators.iter()
    }
}

/// All combinations `Σ c_j·g_j (mod modulus)` with `0 ≤ c_j < order(g_j)`
pub fn generated_subgroup(
    generators: &[GroupElement],
    modulus: i64,
) -> Result<BTreeSet<Vec<i64>>> {
    if modulus <= 0 {
        return Err(LatticeError::invalid_parameters(format!(
            "subgroup modulus must be positive, got {}",
            modulus
        )));
    }
    let rank = generators.first().map_or(0, |g| g.coordinates().len());
    let orders: Vec<i64> = generators
        .iter()
        .map(|g| i64::try_from(g.order()).map_err(|_| LatticeError::overflow("generator order")))
        .collect::<Result<_>>()?;

    let mut coefficients = MixedRadix::new(vec![0; orders.len()], orders, vec![1; generators.len()])?;
    let mut span = BTreeSet::new();
    while let Some(c) = coefficients.advance() {
        let element: Vec<i64> = (0..rank)
            .map(|k| {
                let s = generators
                    .iter()
                    .zip(c)
                    .fold(0i128, |acc, (g, &cj)| acc + cj as i128 * g.coordinates()[k] as i128);
                s.rem_euclid(modulus as i128) as i64
            })
            .collect();
        span.insert(element);
    }
    Ok(span)
}
