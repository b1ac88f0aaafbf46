//! Integral lattice given by a Gram matrix, with its discriminant group and a
//! generating set derived once at construction

use crate::core::error::{LatticeError, Result};
use crate::core::matrix::Matrix;
use crate::core::types::{LatticeParams, SearchCost};
use crate::discriminant::{DiscriminantGroup, GroupElement};
use crate::generators::GeneratorSet;
use crate::quadratic::{self, ScalarBound};
use crate::report::LatticeReport;
use crate::{roots, smith};
use std::collections::BTreeSet;
use std::fs;

/// An integral lattice represented by its Gram (intersection) matrix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lattice {
    gram: Matrix,
    discriminant: i64,
    group: DiscriminantGroup,
    generators: GeneratorSet,
    params: LatticeParams,
}

impl Lattice {
    /// Create a lattice with default search limits
    pub fn new(gram: Matrix) -> Result<Self> {
        Self::with_params(gram, LatticeParams::default())
    }

    /// Create a lattice with explicit search limits.
    ///
    /// Fails on non-square or non-symmetric input, on a zero discriminant, and
    /// when enumeration or generator extraction would exceed `params`.
    pub fn with_params(gram: Matrix, params: LatticeParams) -> Result<Self> {
        params.validate()?;
        if !gram.is_square() {
            return Err(LatticeError::invalid_dimensions(
                (gram.rows(), gram.rows()),
                gram.dimension(),
            ));
        }
        if let Some((row, col)) = gram.asymmetry() {
            return Err(LatticeError::NotSymmetric { row, col });
        }

        let discriminant = gram.determinant()?;
        if discriminant == 0 {
            return Err(LatticeError::DegenerateLattice);
        }
        if discriminant.checked_abs().is_none() {
            return Err(LatticeError::overflow("discriminant"));
        }
        log::info!(
            "Constructing lattice of rank {} with discriminant {}",
            gram.rows(),
            discriminant
        );

        let group = DiscriminantGroup::enumerate_with_discriminant(&gram, discriminant, &params)?;
        let generators = GeneratorSet::extract(&group, &params)?;
        log::info!(
            "Discriminant group of size {} has {} generators with orders {:?}",
            group.len(),
            generators.len(),
            generators.orders()
        );

        Ok(Lattice {
            gram,
            discriminant,
            group,
            generators,
            params,
        })
    }

    /// Create a lattice from a row-major flat list of `rank²` entries
    pub fn from_flat(entries: &[i64]) -> Result<Self> {
        Self::new(Matrix::square_from_flat(entries)?)
    }

    /// Create a lattice from nested rows
    pub fn from_rows(rows: Vec<Vec<i64>>) -> Result<Self> {
        Self::new(Matrix::new(rows)?)
    }

    /// Create a lattice from matrix text: a JSON nested array, bracketed or
    /// plain rows, or a single line of `rank²` numbers
    pub fn from_matrix_str(input: &str) -> Result<Self> {
        Self::new(input.parse()?)
    }

    /// Load a Gram matrix from a file in any format `from_matrix_str` accepts
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            LatticeError::io_error(format!("Failed to read Gram matrix file {}: {}", path, e))
        })?;
        Self::from_matrix_str(&content)
    }

    /// Save the Gram matrix as a JSON nested array
    pub fn save_to_file(&self, path: &str) -> Result<()> {
        let content = serde_json::to_string(&self.gram.to_vec())?;
        fs::write(path, content).map_err(|e| {
            LatticeError::io_error(format!("Failed to write Gram matrix file {}: {}", path, e))
        })
    }

    pub fn rank(&self) -> usize {
        self.gram.rows()
    }

    /// Determinant of the Gram matrix, never zero
    pub fn discriminant(&self) -> i64 {
        self.discriminant
    }

    pub fn gram_matrix(&self) -> &Matrix {
        &self.gram
    }

    pub fn params(&self) -> &LatticeParams {
        &self.params
    }

    pub fn discriminant_group(&self) -> &DiscriminantGroup {
        &self.group
    }

    /// All `|d|` representatives in enumeration order
    pub fn discriminant_group_elements(&self) -> &[GroupElement] {
        self.group.elements()
    }

    pub fn generators(&self) -> &GeneratorSet {
        &self.generators
    }

    /// `G - c·I` is positive definite
    pub fn is_greater_than(&self, c: i64) -> Result<bool> {
        quadratic::compare_with_scalar(&self.gram, c, ScalarBound::Above)
    }

    /// `G - c·I` is positive semidefinite
    pub fn is_at_least(&self, c: i64) -> Result<bool> {
        quadratic::compare_with_scalar(&self.gram, c, ScalarBound::AtLeast)
    }

    /// `c·I - G` is positive definite
    pub fn is_less_than(&self, c: i64) -> Result<bool> {
        quadratic::compare_with_scalar(&self.gram, c, ScalarBound::Below)
    }

    /// `c·I - G` is positive semidefinite
    pub fn is_at_most(&self, c: i64) -> Result<bool> {
        quadratic::compare_with_scalar(&self.gram, c, ScalarBound::AtMost)
    }

    pub fn is_positive_definite(&self) -> Result<bool> {
        quadratic::is_positive_definite(&self.gram)
    }

    pub fn is_positive_semidefinite(&self) -> Result<bool> {
        quadratic::is_positive_semidefinite(&self.gram)
    }

    pub fn leading_principal_minors(&self) -> Result<Vec<i64>> {
        quadratic::leading_principal_minors(&self.gram)
    }

    pub fn principal_subdeterminants(&self) -> Result<BTreeSet<i64>> {
        quadratic::principal_subdeterminants(&self.gram)
    }

    /// `vᵗ·G·v`
    pub fn quadratic_value(&self, v: &[i64]) -> Result<i64> {
        quadratic::quadratic_value(&self.gram, v)
    }

    /// First vector of norm 2 in the bounded search grid, if the form is
    /// positive definite and has one
    pub fn find_root(&self) -> Result<Option<Vec<i64>>> {
        roots::find_root(&self.gram, &self.params)
    }

    pub fn has_root(&self) -> Result<bool> {
        roots::has_root(&self.gram, &self.params)
    }

    /// Projected sizes of the brute-force searches for this Gram matrix
    pub fn search_cost(&self) -> Result<SearchCost> {
        SearchCost::for_gram(&self.gram)
    }

    /// Canonical decomposition `Z/d1 ⊕ ... ⊕ Z/dk` of the discriminant group
    pub fn invariant_factors(&self) -> Result<Vec<i64>> {
        smith::invariant_factors(&self.gram)
    }

    pub fn report(&self, verbose: bool) -> Result<LatticeReport> {
        LatticeReport::from_lattice(self, verbose)
    }
}

impl std::fmt::Display for Lattice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Lattice of rank {} with discriminant {}:",
            self.rank(),
            self.discriminant
        )?;
        write!(f, "{}", self.gram)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_validates_input() {
        assert_eq!(
            Lattice::from_flat(&[1, 2, 3]),
            Err(LatticeError::NotSquare { len: 3 })
        );
        assert!(matches!(
            Lattice::from_rows(vec![vec![1, 2], vec![3, 4]]),
            Err(LatticeError::NotSymmetric { row: 0, col: 1 })
        ));
        assert!(matches!(
            Lattice::from_rows(vec![vec![1, 2, 3], vec![2, 4, 5]]),
            Err(LatticeError::InvalidDimensions { .. })
        ));
        assert_eq!(
            Lattice::from_rows(vec![vec![1, 1], vec![1, 1]]),
            Err(LatticeError::DegenerateLattice)
        );
        assert_eq!(Lattice::from_flat(&[]), Err(LatticeError::EmptyMatrix));
    }

    #[test]
    fn test_discriminant_without_absolute_value_rejected() {
        assert_eq!(
            Lattice::from_rows(vec![vec![i64::MIN]]),
            Err(LatticeError::overflow("discriminant"))
        );
        let lattice = Lattice::from_rows(vec![vec![i64::MIN + 1]]);
        assert!(matches!(
            lattice,
            Err(LatticeError::SearchSpaceTooLarge { .. })
        ));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let params = LatticeParams {
            max_enumeration: 0,
            ..Default::default()
        };
        let gram = Matrix::identity(2).unwrap();
        assert!(matches!(
            Lattice::with_params(gram, params),
            Err(LatticeError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_enumeration_limit_applies_at_construction() {
        let gram = Matrix::new(vec![vec![3, 1, 1], vec![1, 7, 8], vec![1, 8, 13]]).unwrap();
        let params = LatticeParams {
            max_enumeration: 1000,
            ..Default::default()
        };
        assert!(matches!(
            Lattice::with_params(gram, params),
            Err(LatticeError::SearchSpaceTooLarge { .. })
        ));
    }

    #[test]
    fn test_a3_lattice() {
        let a3 = Lattice::from_flat(&[2, -1, 0, -1, 2, -1, 0, -1, 2]).unwrap();
        assert_eq!(a3.rank(), 3);
        assert_eq!(a3.discriminant(), 4);
        assert_eq!(a3.discriminant_group_elements().len(), 4);
        assert_eq!(a3.generators().len(), 1);
        assert_eq!(a3.generators().elements()[0].coordinates(), &[1, 2, 3]);
        assert_eq!(a3.generators().orders(), vec![4]);
        assert_eq!(a3.invariant_factors().unwrap(), vec![4]);
        assert!(a3.has_root().unwrap());
        assert!(a3.is_positive_definite().unwrap());
    }

    #[test]
    fn test_indefinite_lattice() {
        let lattice = Lattice::from_rows(vec![vec![2, 1], vec![1, -2]]).unwrap();
        assert_eq!(lattice.discriminant(), -5);
        assert_eq!(lattice.generators().elements()[0].coordinates(), &[1, 3]);
        assert!(!lattice.is_positive_definite().unwrap());
        // eigenvalues are ±√5
        assert!(lattice.is_greater_than(-3).unwrap());
        assert!(!lattice.is_greater_than(-2).unwrap());
        assert!(lattice.is_less_than(3).unwrap());
        assert!(!lattice.has_root().unwrap());
        assert_eq!(lattice.find_root().unwrap(), None);
    }

    #[test]
    fn test_quadratic_value_and_cost() {
        let lattice = Lattice::from_rows(vec![vec![2, 0], vec![0, 4]]).unwrap();
        assert_eq!(lattice.quadratic_value(&[1, 1]).unwrap(), 6);
        let cost = lattice.search_cost().unwrap();
        assert_eq!(cost.discriminant, 8);
        assert_eq!(cost.root_search, 81);
    }

    #[test]
    fn test_file_round_trip() {
        let path = std::env::temp_dir().join("integral_lattice_round_trip.json");
        let path = path.to_str().unwrap();
        let lattice = Lattice::from_rows(vec![vec![4, 2], vec![2, 4]]).unwrap();
        lattice.save_to_file(path).unwrap();
        let loaded = Lattice::load_from_file(path).unwrap();
        assert_eq!(loaded, lattice);
        let _ = std::fs::remove_file(path);

        assert!(matches!(
            Lattice::load_from_file("/nonexistent/gram.txt"),
            Err(LatticeError::IoError(_))
        ));
    }

    #[test]
    fn test_display() {
        let lattice = Lattice::from_rows(vec![vec![2, 1], vec![1, 2]]).unwrap();
        let text = lattice.to_string();
        assert!(text.starts_with("Lattice of rank 2 with discriminant 3:"));
    }
}
