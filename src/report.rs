//! Printable and serializable lattice summaries.

use crate::core::error::Result;
use crate::core::lattice::Lattice;
use crate::discriminant::GroupElement;
use serde::Serialize;
use std::fmt;

/// A group element as listed in a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementEntry {
    pub coordinates: Vec<i64>,
    /// Dual-lattice coordinates `v_j / |d|` in lowest terms
    pub dual: Vec<String>,
    pub order: u64,
}

impl ElementEntry {
    fn new(element: &GroupElement, modulus: i64) -> Self {
        ElementEntry {
            coordinates: element.coordinates().to_vec(),
            dual: element.fractional(modulus),
            order: element.order(),
        }
    }
}

/// Summary of a lattice and its discriminant group
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LatticeReport {
    pub gram: Vec<Vec<i64>>,
    pub rank: usize,
    pub discriminant: i64,
    pub group_size: usize,
    pub invariant_factors: Vec<i64>,
    /// Full element list, present only in verbose reports
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elements: Option<Vec<ElementEntry>>,
    pub generators: Vec<ElementEntry>,
}

impl LatticeReport {
    pub fn from_lattice(lattice: &Lattice, verbose: bool) -> Result<Self> {
        let group = lattice.discriminant_group();
        let modulus = group.modulus();
        let elements = verbose.then(|| {
            group
                .iter()
                .map(|e| ElementEntry::new(e, modulus))
                .collect()
        });

        Ok(LatticeReport {
            gram: lattice.gram_matrix().to_vec(),
            rank: lattice.rank(),
            discriminant: lattice.discriminant(),
            group_size: group.len(),
            invariant_factors: lattice.invariant_factors()?,
            elements,
            generators: lattice
                .generators()
                .iter()
                .map(|g| ElementEntry::new(g, modulus))
                .collect(),
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Canonical structure `Z/d1 ⊕ ... ⊕ Z/dk`, or `0` for the trivial group
    pub fn structure(&self) -> String {
        if self.invariant_factors.is_empty() {
            return "0".to_string();
        }
        self.invariant_factors
            .iter()
            .map(|d| format!("Z/{}", d))
            .collect::<Vec<_>>()
            .join(" + ")
    }
}

fn write_entries(f: &mut fmt::Formatter<'_>, entries: &[ElementEntry]) -> fmt::Result {
    for entry in entries {
        let coords: Vec<String> = entry.coordinates.iter().map(|x| x.to_string()).collect();
        writeln!(
            f,
            "  [ {} ] with order {}  ({})",
            coords.join(" "),
            entry.order,
            entry.dual.join(", ")
        )?;
    }
    Ok(())
}

impl fmt::Display for LatticeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Intersection form with Gram matrix")?;
        for row in &self.gram {
            let cells: Vec<String> = row.iter().map(|x| format!("{:>4}", x)).collect();
            writeln!(f, "  {}", cells.join(" "))?;
        }
        writeln!(
            f,
            "is of rank {} and discriminant {}",
            self.rank, self.discriminant
        )?;
        writeln!(
            f,
            "Discriminant group of size {} is {}",
            self.group_size,
            self.structure()
        )?;
        if let Some(elements) = &self.elements {
            writeln!(f, "with elements:")?;
            write_entries(f, elements)?;
        }
        writeln!(
            f,
            "A set of generators may be of size {} with elements:",
            self.generators.len()
        )?;
        write_entries(f, &self.generators)
    }
}
