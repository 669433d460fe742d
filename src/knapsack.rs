//! 0/1 Knapsack via tabular dynamic programming.
//!
//! Capacity and item weights are floored to whole units for grid indexing.
//! With fractional weights this loses sub-unit precision: an item of weight
//! 2.5 at column w reads column `floor(w - 2.5)`, while reconstruction steps
//! back by `floor(2.5) = 2`.

use crate::error::{Result, SolveError};
use crate::instance::{KnapsackInput, KnapsackInstance};
use crate::solution::KnapsackSolution;

/// Filled `value[i][w]` table in row-major order, `(items + 1) × (capacity + 1)`.
struct ValueTable {
    width: usize,
    cells: Vec<f64>,
}

impl ValueTable {
    #[inline]
    fn get(&self, item: usize, w: usize) -> Option<f64> {
        if w < self.width {
            self.cells.get(item * self.width + w).copied()
        } else {
            None
        }
    }

    fn fill(instance: &KnapsackInstance) -> Result<Self> {
        let width = instance
            .capacity()
            .checked_add(1)
            .ok_or_else(|| SolveError::internal("capacity grid overflows usize"))?;
        let rows = instance.num_items() + 1;
        let len = rows.checked_mul(width).ok_or_else(|| {
            SolveError::internal(format!("{} x {} table overflows usize", rows, width))
        })?;
        let mut cells = Vec::new();
        cells.try_reserve_exact(len).map_err(|e| {
            SolveError::internal(format!("cannot allocate {} x {} table: {}", rows, width, e))
        })?;
        cells.resize(len, 0.0);

        for (i, item) in instance.items().iter().enumerate() {
            let (prev, row) = cells[i * width..(i + 2) * width].split_at_mut(width);
            for w in 0..width {
                row[w] = if item.weight <= w as f64 {
                    let offset = (w as f64 - item.weight) as usize;
                    let rest = prev.get(offset).copied().ok_or_else(|| {
                        SolveError::internal(format!("column {} out of range", offset))
                    })?;
                    (item.value + rest).max(prev[w])
                } else {
                    prev[w]
                };
            }
        }

        Ok(ValueTable { width, cells })
    }

    /// Walk back from the last item; an item was taken wherever its row
    /// differs from the row above at the remaining capacity.
    fn selection(&self, instance: &KnapsackInstance) -> Result<Vec<String>> {
        let items = instance.items();
        let mut remaining = instance.capacity();
        let mut picked = Vec::new();

        for i in (1..=items.len()).rev() {
            let with = self.cell(i, remaining)?;
            let without = self.cell(i - 1, remaining)?;
            if with != without {
                let item = &items[i - 1];
                picked.push(item.name.clone());
                remaining = remaining.checked_sub(item.grid_weight()).ok_or_else(|| {
                    SolveError::internal(format!(
                        "item {} outweighs remaining capacity {}",
                        item.name, remaining
                    ))
                })?;
            }
        }

        picked.reverse();
        Ok(picked)
    }

    fn cell(&self, item: usize, w: usize) -> Result<f64> {
        self.get(item, w)
            .ok_or_else(|| SolveError::internal(format!("cell ({}, {}) out of range", item, w)))
    }
}

/// Tabular 0/1 knapsack solver
pub struct KnapsackSolver;

impl KnapsackSolver {
    /// Validate the request body, then solve it.
    pub fn solve(input: &KnapsackInput) -> Result<KnapsackSolution> {
        let instance = KnapsackInstance::new(input)?;
        Self::solve_instance(&instance)
    }

    pub fn solve_instance(instance: &KnapsackInstance) -> Result<KnapsackSolution> {
        if instance.num_items() == 0 {
            return Ok(KnapsackSolution::empty());
        }
        log::debug!(
            "Solving knapsack with {} items on a capacity grid of {}",
            instance.num_items(),
            instance.capacity()
        );

        let table = ValueTable::fill(instance)?;
        let selected_items = table.selection(instance)?;
        let total_value = table.cell(instance.num_items(), instance.capacity())?;

        Ok(KnapsackSolution {
            selected_items,
            total_value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::instance::Item;

    #[test]
    fn test_knapsack_basic() {
        let items = vec![
            Item::new("Item1", 2.0, 3.0),
            Item::new("Item2", 3.0, 4.0),
            Item::new("Item3", 4.0, 5.0),
        ];
        let result = KnapsackSolver::solve(&KnapsackInput::new(5.0, items)).unwrap();
        assert_eq!(result.total_value, 7.0);
        assert_eq!(result.selected_items, vec!["Item1", "Item2"]);
    }

    #[test]
    fn test_knapsack_empty() {
        let result = KnapsackSolver::solve(&KnapsackInput::new(5.0, Vec::new())).unwrap();
        assert_eq!(result, KnapsackSolution::empty());
    }

    #[test]
    fn test_knapsack_no_fit() {
        let items = vec![Item::new("HeavyItem", 10.0, 100.0)];
        let result = KnapsackSolver::solve(&KnapsackInput::new(5.0, items)).unwrap();
        assert_eq!(result.total_value, 0.0);
        assert!(result.selected_items.is_empty());
    }

    #[test]
    fn test_knapsack_zero_capacity() {
        let items = vec![Item::new("Item1", 1.0, 1.0), Item::new("Feather", 0.0, 2.0)];
        let result = KnapsackSolver::solve(&KnapsackInput::new(0.0, items)).unwrap();
        assert_eq!(result.total_value, 2.0);
        assert_eq!(result.selected_items, vec!["Feather"]);
    }

    #[test]
    fn test_knapsack_negative_weight() {
        let items = vec![Item::new("Item1", 1.0, 1.0)];
        let err = KnapsackSolver::solve(&KnapsackInput::new(-1.0, items)).unwrap_err();
        assert!(matches!(err, SolveError::Validation(ValidationError::NegativeCapacity)));
        assert_eq!(err.to_string(), "Maximum weight cannot be negative");
    }

    #[test]
    fn test_knapsack_fractional_weights() {
        let items = vec![Item::new("Item1", 2.5, 3.0), Item::new("Item2", 1.5, 2.0)];
        let result = KnapsackSolver::solve(&KnapsackInput::new(4.0, items)).unwrap();
        assert_eq!(result.total_value, 3.0);
        assert_eq!(result.selected_items, vec!["Item1"]);
    }

    #[test]
    fn test_fractional_capacity_is_floored() {
        let items = vec![Item::new("Item1", 5.0, 10.0)];
        let result = KnapsackSolver::solve(&KnapsackInput::new(5.9, items.clone())).unwrap();
        assert_eq!(result.total_value, 10.0);
        let result = KnapsackSolver::solve(&KnapsackInput::new(4.9, items)).unwrap();
        assert_eq!(result.total_value, 0.0);
    }

    #[test]
    fn test_huge_capacity_is_an_internal_error() {
        let items = vec![Item::new("Item1", 2.0, 3.0)];
        let err = KnapsackSolver::solve(&KnapsackInput::new(1e30, items.clone())).unwrap_err();
        assert!(matches!(err, SolveError::Internal(_)));
        assert_eq!(err.public_message(), "Internal server error");

        // The cell count fits in usize, its byte size does not.
        let err = KnapsackSolver::solve(&KnapsackInput::new(2e18, items)).unwrap_err();
        assert!(matches!(err, SolveError::Internal(_)));
    }

    #[test]
    fn test_selection_keeps_input_order() {
        let items = vec![
            Item::new("c", 1.0, 1.0),
            Item::new("a", 1.0, 1.0),
            Item::new("skip", 3.0, 1.0),
            Item::new("b", 1.0, 1.0),
        ];
        let result = KnapsackSolver::solve(&KnapsackInput::new(3.0, items)).unwrap();
        assert_eq!(result.total_value, 3.0);
        assert_eq!(result.selected_items, vec!["c", "a", "b"]);
    }
}
