//! Discriminant group enumeration and element orders.
//!
//! Elements of the discriminant group `L^# / L` are stored as integer vectors
//! `v` with coordinates in `[0, |d|)`, standing for the dual vector `v / d`.
//! A vector represents a dual element exactly when `G·v ≡ 0 (mod d)`.

use crate::core::error::{LatticeError, Result};
use crate::core::matrix::{gcd, gcd_u64, Matrix};
use crate::core::types::{LatticeParams, MixedRadix};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A coset representative of the discriminant group together with its order
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupElement {
    coordinates: Vec<i64>,
    order: u64,
}

impl GroupElement {
    pub fn new(coordinates: Vec<i64>, order: u64) -> Self {
        GroupElement { coordinates, order }
    }

    pub fn coordinates(&self) -> &[i64] {
        &self.coordinates
    }

    pub fn order(&self) -> u64 {
        self.order
    }

    pub fn is_identity(&self) -> bool {
        self.coordinates.iter().all(|&x| x == 0)
    }

    /// Coordinates as reduced fractions `v_j / modulus`, i.e. the dual vector
    pub fn fractional(&self, modulus: i64) -> Vec<String> {
        self.coordinates
            .iter()
            .map(|&x| format_fraction(x, modulus))
            .collect()
    }
}

impl std::fmt::Display for GroupElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] with order {}",
            self.coordinates.iter().map(|x| x.to_string()).collect::<Vec<_>>().join(" "),
            self.order
        )
    }
}

/// Compare by order only.
///
/// Coordinates are never consulted, so this is not an ordering on elements;
/// it only serves to pick extremal-order representatives.
pub fn compare_by_order(a: &GroupElement, b: &GroupElement) -> Ordering {
    a.order.cmp(&b.order)
}

/// First element of maximal order (compare by order only)
pub fn first_max_by_order(elements: &[GroupElement]) -> Option<&GroupElement> {
    let (first, rest) = elements.split_first()?;
    Some(rest.iter().fold(first, |best, e| {
        if compare_by_order(e, best) == Ordering::Greater {
            e
        } else {
            best
        }
    }))
}

/// First element of minimal order (compare by order only)
pub fn first_min_by_order(elements: &[GroupElement]) -> Option<&GroupElement> {
    let (first, rest) = elements.split_first()?;
    Some(rest.iter().fold(first, |best, e| {
        if compare_by_order(e, best) == Ordering::Less {
            e
        } else {
            best
        }
    }))
}

/// Dual-lattice integrality test: `G·v ≡ 0 (mod d)` on every row
pub fn in_dual(gram: &Matrix, v: &[i64], discriminant: i64) -> Result<bool> {
    if discriminant == 0 {
        return Err(LatticeError::DegenerateLattice);
    }
    let modulus = discriminant.unsigned_abs() as i128;
    Ok(gram.mul_vec(v)?.iter().all(|&x| x as i128 % modulus == 0))
}

/// Smallest `k` in `1..=|d|` with `k·v_j ≡ 0 (mod d)` for every coordinate.
///
/// That is `|d| / gcd(|d|, v_1, ..., v_n)`; the candidate is verified before
/// it is returned.
pub fn order_of(coordinates: &[i64], discriminant: i64) -> Result<u64> {
    if discriminant == 0 {
        return Err(LatticeError::DegenerateLattice);
    }
    let modulus = discriminant.unsigned_abs();
    let g = coordinates
        .iter()
        .fold(modulus, |g, &x| gcd_u64(g, x.unsigned_abs()));
    let order = modulus / g;

    let m = modulus as i128;
    if coordinates
        .iter()
        .all(|&x| (x as i128 * order as i128) % m == 0)
    {
        Ok(order)
    } else {
        Err(LatticeError::OrderNotFound {
            coordinates: coordinates.to_vec(),
            modulus: discriminant,
        })
    }
}

/// `|d|` as a signed coordinate bound; fails for `d == i64::MIN`
pub fn checked_modulus(discriminant: i64) -> Result<i64> {
    if discriminant == 0 {
        return Err(LatticeError::DegenerateLattice);
    }
    discriminant.checked_abs().ok_or_else(|| {
        LatticeError::overflow(format!(
            "discriminant {} has no i64 absolute value",
            discriminant
        ))
    })
}

/// Per-axis steps from the gcd of each Gram row
pub fn row_gcd_strides(gram: &Matrix) -> Result<Vec<i64>> {
    (0..gram.rows()).map(|i| Ok(gram.row_gcd(i)?.max(1))).collect()
}

/// Per-axis steps from the gcd of each adjugate row, reduced by `|d|`.
///
/// Every dual vector is `adj(G)·u` for an integer `u`, so coordinate `i` is
/// always a multiple of this step.
pub fn adjugate_strides(gram: &Matrix, discriminant: i64) -> Result<Vec<i64>> {
    let adj = gram.adjugate()?;
    (0..adj.rows())
        .map(|i| {
            let g = gcd(adj.row_gcd(i)?, discriminant).max(1);
            i64::try_from(g).map_err(|_| LatticeError::overflow("adjugate stride"))
        })
        .collect()
}

/// The full discriminant group of a Gram matrix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscriminantGroup {
    discriminant: i64,
    strides: Vec<i64>,
    elements: Vec<GroupElement>,
}

impl DiscriminantGroup {
    /// Enumerate all `|d|` elements in lexicographic coordinate order
    pub fn enumerate(gram: &Matrix, params: &LatticeParams) -> Result<Self> {
        let discriminant = gram.determinant()?;
        if discriminant == 0 {
            return Err(LatticeError::DegenerateLattice);
        }
        Self::enumerate_with_discriminant(gram, discriminant, params)
    }

    pub(crate) fn enumerate_with_discriminant(
        gram: &Matrix,
        discriminant: i64,
        params: &LatticeParams,
    ) -> Result<Self> {
        let modulus = checked_modulus(discriminant)?.unsigned_abs();

        let strides = row_gcd_strides(gram)?;
        let mut elements = scan(gram, discriminant, &strides, params)?;
        if elements.len() as u64 == modulus {
            return Ok(DiscriminantGroup {
                discriminant,
                strides,
                elements,
            });
        }

        log::warn!(
            "row-gcd steps {:?} found {} of {} elements, rescanning with adjugate steps",
            strides,
            elements.len(),
            modulus
        );
        let strides = adjugate_strides(gram, discriminant)?;
        elements = scan(gram, discriminant, &strides, params)?;
        if elements.len() as u64 != modulus {
            return Err(LatticeError::internal(format!(
                "enumerated {} discriminant group elements, expected {}",
                elements.len(),
                modulus
            )));
        }

        Ok(DiscriminantGroup {
            discriminant,
            strides,
            elements,
        })
    }

    pub fn discriminant(&self) -> i64 {
        self.discriminant
    }

    /// `|d|`, the group's size and the coordinate modulus.
    ///
    /// Construction rejects `d == i64::MIN`, so this never saturates.
    pub fn modulus(&self) -> i64 {
        self.discriminant.saturating_abs()
    }

    /// Steps of the enumeration pass that produced the group
    pub fn strides(&self) -> &[i64] {
        &self.strides
    }

    pub fn elements(&self) -> &[GroupElement] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GroupElement> {
        self.elements.iter()
    }

    /// Look up the element whose coordinates agree with `v` modulo `|d|`
    pub fn find(&self, v: &[i64]) -> Option<&GroupElement> {
        let m = self.modulus() as i128;
        self.elements.iter().find(|e| {
            e.coordinates.len() == v.len()
                && e.coordinates
                    .iter()
                    .zip(v)
                    .all(|(&a, &b)| (a as i128 - b as i128).rem_euclid(m) == 0)
        })
    }

    /// Exponent of the group: the largest element order
    pub fn exponent(&self) -> u64 {
        first_max_by_order(&self.elements).map_or(1, |e| e.order)
    }
}

impl<'a> IntoIterator for &'a DiscriminantGroup {
    type Item = &'a GroupElement;
    type IntoIter = std::slice::Iter<'a, GroupElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

fn scan(
    gram: &Matrix,
    discriminant: i64,
    strides: &[i64],
    params: &LatticeParams,
) -> Result<Vec<GroupElement>> {
    let n = gram.rows();
    let modulus = checked_modulus(discriminant)?;
    let mut counter = MixedRadix::new(vec![0; n], vec![modulus; n], strides.to_vec())?;
    params.check(
        "discriminant group enumeration",
        counter.size(),
        params.max_enumeration,
    )?;
    log::debug!(
        "scanning {} candidates with steps {:?}",
        counter.size(),
        strides
    );

    let target = modulus.unsigned_abs();
    let mut elements = Vec::new();
    while let Some(v) = counter.advance() {
        if in_dual(gram, v, discriminant)? {
            let order = order_of(v, discriminant)?;
            elements.push(GroupElement::new(v.to_vec(), order));
            if elements.len() as u64 == target {
                break;
            }
        }
    }
    Ok(elements)
}

/// `num / den` in lowest terms, `"0"` for zero and an integer when exact
pub fn format_fraction(num: i64, den: i64) -> String {
    if num == 0 {
        return "0".to_string();
    }
    let g = gcd(num, den).max(1) as i128;
    let (mut n, mut d) = (num as i128 / g, den as i128 / g);
    if d < 0 {
        n = -n;
        d = -d;
    }
    if d == 1 {
        n.to_string()
    } else {
        format!("{}/{}", n, d)
    }
}
