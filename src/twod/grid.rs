//! Primary-axis grid storage and bin lookup

use std::sync::Arc;

use crate::error::GridError;
use crate::oned::Continuous1D;

/// One grid entry: a primary coordinate and the secondary-variable
/// distribution tabulated there. Entries share their distributions by
/// reference; several grid points may hold the same `Arc`.
pub type GridEntry = (f64, Arc<Continuous1D>);

/// Outcome of locating a primary value on the grid.
///
/// A query equal to a tabulated primary value resolves to the bin whose
/// *upper* boundary is the first occurrence of that value (walking from the
/// low end), so zero-width bins used to mark discontinuities are found
/// deterministically. The lowest grid point is the one exception: it has no
/// bin below it and degenerates to the first entry.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Lookup {
    /// Below the tabulated range.
    Below,
    /// Above the tabulated range.
    Above,
    /// Exactly on the lowest grid point.
    Lowest,
    /// Inside the range: the bin `[entries[upper - 1], entries[upper]]`.
    Pair { upper: usize },
}

/// The ordered grid of per-primary-value secondary distributions.
#[derive(Clone, Debug)]
pub struct PrimaryGrid {
    entries: Vec<GridEntry>,
}

impl PrimaryGrid {
    /// Validates and stores the grid. At least two entries are required and
    /// the primary values must be finite and non-decreasing; adjacent
    /// duplicates are allowed (zero-width bins).
    pub fn new(entries: Vec<GridEntry>) -> Result<PrimaryGrid, GridError> {
        if entries.len() < 2 {
            return Err(GridError::too_few_entries("primary grid"));
        }
        if entries.iter().any(|e| !e.0.is_finite()) {
            return Err(GridError::unordered("primary grid values must be finite"));
        }
        if entries.windows(2).any(|w| w[1].0 < w[0].0) {
            return Err(GridError::unordered("primary grid"));
        }
        Ok(PrimaryGrid { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn min(&self) -> f64 {
        self.entries[0].0
    }

    pub fn max(&self) -> f64 {
        self.entries[self.entries.len() - 1].0
    }

    pub fn primary(&self, index: usize) -> f64 {
        self.entries[index].0
    }

    pub fn distribution(&self, index: usize) -> &Continuous1D {
        &self.entries[index].1
    }

    pub fn first(&self) -> &Continuous1D {
        self.distribution(0)
    }

    pub fn last(&self) -> &Continuous1D {
        self.distribution(self.entries.len() - 1)
    }

    /// Locates the bin bracketing `x`. O(log N) in the grid size.
    pub fn lookup(&self, x: f64) -> Lookup {
        if x < self.min() {
            Lookup::Below
        } else if x == self.min() {
            Lookup::Lowest
        } else if x > self.max() {
            Lookup::Above
        } else {
            // first entry with primary >= x; x > min guarantees upper >= 1
            let upper = self.entries.partition_point(|e| e.0 < x);
            Lookup::Pair { upper }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oned::UniformDistribution;

    fn entry(x: f64) -> GridEntry {
        (x, Arc::new(UniformDistribution::new(0.0, 1.0, 1.0).unwrap().into()))
    }

    #[test]
    fn construction_rejects_malformed_grids() {
        assert!(PrimaryGrid::new(vec![entry(0.0)]).is_err());
        assert!(PrimaryGrid::new(vec![entry(1.0), entry(0.0)]).is_err());
        assert!(PrimaryGrid::new(vec![entry(0.0), entry(f64::NAN)]).is_err());
        // duplicates are fine
        assert!(PrimaryGrid::new(vec![entry(0.0), entry(0.0), entry(1.0)]).is_ok());
    }

    #[test]
    fn lookup_brackets_interior_points() {
        let grid = PrimaryGrid::new(vec![entry(0.0), entry(1.0), entry(2.0)]).unwrap();
        assert_eq!(grid.lookup(-0.5), Lookup::Below);
        assert_eq!(grid.lookup(0.0), Lookup::Lowest);
        assert_eq!(grid.lookup(0.5), Lookup::Pair { upper: 1 });
        assert_eq!(grid.lookup(1.0), Lookup::Pair { upper: 1 });
        assert_eq!(grid.lookup(1.5), Lookup::Pair { upper: 2 });
        assert_eq!(grid.lookup(2.0), Lookup::Pair { upper: 2 });
        assert_eq!(grid.lookup(2.5), Lookup::Above);
    }

    #[test]
    fn duplicate_grid_points_resolve_to_the_first_occurrence() {
        let grid =
            PrimaryGrid::new(vec![entry(0.0), entry(1.0), entry(1.0), entry(2.0)]).unwrap();
        // the zero-width bin [1, 1] is found, not skipped
        assert_eq!(grid.lookup(1.0), Lookup::Pair { upper: 1 });
        assert_eq!(grid.lookup(1.5), Lookup::Pair { upper: 3 });

        let grid = PrimaryGrid::new(vec![entry(0.0), entry(0.0), entry(1.0)]).unwrap();
        assert_eq!(grid.lookup(0.0), Lookup::Lowest);
    }

    #[test]
    fn shared_distributions_are_reference_counted() {
        let shared: Arc<Continuous1D> =
            Arc::new(UniformDistribution::new(0.0, 1.0, 1.0).unwrap().into());
        let grid = PrimaryGrid::new(vec![
            (0.0, Arc::clone(&shared)),
            (1.0, entry(1.0).1),
            (2.0, Arc::clone(&shared)),
        ])
        .unwrap();
        assert_eq!(Arc::strong_count(&shared), 3);
        drop(grid);
        assert_eq!(Arc::strong_count(&shared), 1);
    }
}
