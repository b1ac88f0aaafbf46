//! Invariants of integral lattices given by a Gram (intersection) matrix
//!
//! This crate computes, exactly and in integer arithmetic:
//! - the discriminant and the full discriminant group `L^# / L`
//! - element orders and a greedy generating set of that group
//! - its invariant factors via the Smith normal form
//! - definiteness and comparisons of the form against `c·I`
//! - whether a positive-definite lattice has a root (a vector of norm 2)
//!
//! # Examples
//!
//! ```rust
//! use integral_lattice::Lattice;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let lattice = Lattice::from_rows(vec![
//!     vec![2, -1, 0],
//!     vec![-1, 2, -1],
//!     vec![0, -1, 2],
//! ])?;
//!
//! assert_eq!(lattice.discriminant(), 4);
//! assert_eq!(lattice.discriminant_group_elements().len(), 4);
//! assert_eq!(lattice.generators().orders(), vec![4]);
//! assert!(lattice.is_greater_than(0)?);
//! assert!(lattice.has_root()?);
//! println!("{}", lattice.report(false)?);
//! # Ok(())
//! # }
//! ```
//!
//! The brute-force searches are bounded by [`LatticeParams`]; query
//! [`SearchCost::for_gram`] before constructing large lattices.

pub mod core;
pub mod discriminant;
pub mod generators;
pub mod quadratic;
pub mod report;
pub mod roots;
pub mod smith;
pub mod utils;

pub use crate::core::*;
pub use discriminant::{order_of, DiscriminantGroup, GroupElement};
pub use generators::{generated_subgroup, same_coset, GeneratorSet};
pub use quadratic::ScalarBound;
pub use report::LatticeReport;

// Re-export commonly used types
pub use crate::core::error::{LatticeError, Result};
pub use crate::core::lattice::Lattice;
pub use crate::core::matrix::Matrix;
pub use crate::core::types::{LatticeParams, SearchCost};
