//! Circular dependency detection for formula cells.
//!
//! When a formula is entered, we must find out whether it creates a cycle
//! (e.g., A1 references B1, B1 references C1, C1 references A1) so those
//! cells can be flagged instead of evaluated. This module uses depth-first
//! search along each cell's recorded `inputs`.

use std::collections::HashSet;

use log::debug;

use super::{CellRef, Grid};

/// Find every location on, or feeding into, a cycle reachable from `start`.
///
/// Returns an empty set when the graph below `start` is acyclic. Each
/// location is expanded at most once per call, so the work is bounded by the
/// number of edges even on self-referential graphs.
pub fn find_cycle_members(start: &CellRef, grid: &Grid) -> HashSet<CellRef> {
    let mut search = CycleSearch {
        grid,
        path: Vec::new(),
        on_path: HashSet::new(),
        finished: HashSet::new(),
        members: HashSet::new(),
    };
    search.visit(start);

    if !search.members.is_empty() {
        debug!(
            "cycle detected from {}: {} member(s)",
            start,
            search.members.len()
        );
    }
    search.members
}

struct CycleSearch<'a> {
    grid: &'a Grid,
    path: Vec<CellRef>,
    on_path: HashSet<CellRef>,
    finished: HashSet<CellRef>,
    members: HashSet<CellRef>,
}

impl CycleSearch<'_> {
    fn visit(&mut self, current: &CellRef) {
        let grid = self.grid;
        let Some(cell) = grid.get(current) else {
            return;
        };

        self.on_path.insert(current.clone());
        self.path.push(current.clone());

        for input in &cell.inputs {
            if self.on_path.contains(input) {
                // Back edge: everything on the current path is in or feeds the cycle.
                self.mark_path();
            } else if self.finished.contains(input) {
                // Reaching a known member means this path feeds into a cycle.
                if self.members.contains(input) {
                    self.mark_path();
                }
            } else {
                self.visit(input);
                if self.members.contains(input) {
                    self.mark_path();
                }
            }
        }

        self.path.pop();
        self.on_path.remove(current);
        self.finished.insert(current.clone());
    }

    fn mark_path(&mut self) {
        self.members.extend(self.path.iter().cloned());
    }
}
