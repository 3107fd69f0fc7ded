use super::Workbook;
use crate::error::{Result, SheetError};
use indexmap::IndexSet;
use log::{debug, warn};
use sheetcalc_engine::engine::{
    CellError, CellRef, Value, evaluate, find_cycle_members, is_live_formula, resolve_inputs,
};
use std::collections::HashSet;

impl Workbook {
    /// Set a cell's text from user input and recompute everything downstream.
    ///
    /// Text starting with `=` is a live formula; anything else is stored as a
    /// literal value. Edges are rewired, cycle flags updated against the new
    /// graph, then the cell and its dependents are recomputed.
    pub fn set_formula(&mut self, cell_ref: &CellRef, text: &str) -> Result<()> {
        self.require(cell_ref)?;
        debug!("set {} to {:?}", cell_ref, text);

        let previous_members = self.clear_cycle_flags(cell_ref);

        self.unlink_inputs(cell_ref);
        if let Some(cell) = self.grid.get_mut(cell_ref) {
            cell.formula = text.to_string();
            if !is_live_formula(text) {
                cell.value = Value::Text(text.to_string());
            }
        }
        let inputs = resolve_inputs(text, &self.grid);
        self.link_inputs(cell_ref, inputs);

        self.flag_cycles(cell_ref, &previous_members);

        self.recompute(cell_ref);
        self.propagate(cell_ref)?;
        self.modified = true;
        Ok(())
    }

    /// Set a cell's text, addressing it by A1 name.
    pub fn set_formula_by_name(&mut self, name: &str, text: &str) -> Result<()> {
        let cell_ref =
            CellRef::from_str(name).ok_or_else(|| SheetError::InvalidLocation(name.to_string()))?;
        self.set_formula(&cell_ref, text)
    }

    /// Clear a cell's formula, value and inputs.
    ///
    /// Cells that read from this one keep their edge to it and are
    /// recomputed against the now-empty value.
    pub fn reset_cell(&mut self, cell_ref: &CellRef) -> Result<()> {
        self.require(cell_ref)?;
        debug!("reset {}", cell_ref);

        let previous_members = self.clear_cycle_flags(cell_ref);

        self.unlink_inputs(cell_ref);
        if let Some(cell) = self.grid.get_mut(cell_ref) {
            cell.formula.clear();
            cell.value = Value::empty();
            cell.valid = true;
        }

        self.flag_cycles(cell_ref, &previous_members);

        self.propagate(cell_ref)?;
        self.modified = true;
        Ok(())
    }

    /// Recompute every cell that transitively reads from `cell_ref`.
    ///
    /// Walks `outputs` depth-first without ordering, so a cell reachable along
    /// several paths is recomputed once per path. Every dependent reached has
    /// its cycle flag re-checked first; cyclic ones are passed through without
    /// being evaluated. Returns the number of evaluations performed.
    pub fn propagate(&mut self, cell_ref: &CellRef) -> Result<usize> {
        self.require(cell_ref)?;
        let mut path = HashSet::from([cell_ref.clone()]);
        let mut evaluated = 0;
        self.propagate_from(cell_ref, &mut path, &mut evaluated);
        debug!("propagated from {}: {} evaluation(s)", cell_ref, evaluated);
        Ok(evaluated)
    }

    fn propagate_from(
        &mut self,
        cell_ref: &CellRef,
        path: &mut HashSet<CellRef>,
        evaluated: &mut usize,
    ) {
        let outputs: Vec<CellRef> = match self.grid.get(cell_ref) {
            Some(cell) => cell.outputs.iter().cloned().collect(),
            None => return,
        };

        for output in outputs {
            // Already on the current path: the outputs graph loops back here.
            if !path.insert(output.clone()) {
                continue;
            }
            self.refresh_cycle_flag(&output);
            if self.recompute(&output) {
                *evaluated += 1;
            }
            self.propagate_from(&output, path, evaluated);
            path.remove(&output);
        }
    }

    /// Evaluate a live, valid cell and store the result.
    ///
    /// Invalid live cells get the cycle marker without being evaluated.
    /// Returns whether an evaluation happened.
    fn recompute(&mut self, cell_ref: &CellRef) -> bool {
        let Some(cell) = self.grid.get(cell_ref) else {
            return false;
        };
        if !cell.is_live() {
            return false;
        }
        if !cell.valid {
            if let Some(cell) = self.grid.get_mut(cell_ref) {
                cell.value = Value::Error(CellError::Cycle);
            }
            return false;
        }

        let value = match evaluate(cell, &self.grid) {
            Ok(value) => value,
            Err(err) => {
                debug!("{} failed to evaluate: {}", cell_ref, err);
                Value::Error(err.cell_error())
            }
        };
        if let Some(cell) = self.grid.get_mut(cell_ref) {
            cell.value = value;
        }
        true
    }

    /// Clear the cycle flag on every cell found cyclic from `cell_ref` in the
    /// current graph. Returns the cleared cells.
    fn clear_cycle_flags(&mut self, cell_ref: &CellRef) -> HashSet<CellRef> {
        let members = find_cycle_members(cell_ref, &self.grid);
        for member in &members {
            if let Some(cell) = self.grid.get_mut(member) {
                cell.valid = true;
            }
        }
        members
    }

    /// Flag every cell on or feeding into a cycle reachable from `cell_ref`,
    /// or from any cell whose flag was cleared before the edit.
    fn flag_cycles(&mut self, cell_ref: &CellRef, previous_members: &HashSet<CellRef>) {
        let mut members = find_cycle_members(cell_ref, &self.grid);
        let introduced = !members.is_empty() && !previous_members.contains(cell_ref);

        for former in previous_members {
            if !members.contains(former) {
                members.extend(find_cycle_members(former, &self.grid));
            }
        }

        if members.is_empty() {
            if let Some(cell) = self.grid.get_mut(cell_ref) {
                cell.valid = true;
            }
            return;
        }

        if introduced {
            warn!(
                "circular reference reached from {}: {} cell(s) flagged",
                cell_ref,
                members.len()
            );
        }
        for member in &members {
            if let Some(cell) = self.grid.get_mut(member) {
                cell.valid = false;
                if cell.is_live() {
                    cell.value = Value::Error(CellError::Cycle);
                }
            }
        }
        if !members.contains(cell_ref) {
            if let Some(cell) = self.grid.get_mut(cell_ref) {
                cell.valid = true;
            }
        }
    }

    /// Re-run detection on a dependent so its flag matches the current graph,
    /// whichever order the edits arrived in.
    fn refresh_cycle_flag(&mut self, cell_ref: &CellRef) {
        let cyclic = !find_cycle_members(cell_ref, &self.grid).is_empty();
        if let Some(cell) = self.grid.get_mut(cell_ref) {
            if cell.valid == cyclic {
                let state = if cyclic { "set" } else { "cleared" };
                debug!("{} cycle flag {}", cell_ref, state);
                cell.valid = !cyclic;
            }
        }
    }

    /// Remove `cell_ref` from the outputs of everything it reads from and
    /// clear its inputs.
    fn unlink_inputs(&mut self, cell_ref: &CellRef) {
        let inputs = match self.grid.get_mut(cell_ref) {
            Some(cell) => std::mem::take(&mut cell.inputs),
            None => return,
        };
        for input in &inputs {
            if let Some(upstream) = self.grid.get_mut(input) {
                upstream.outputs.shift_remove(cell_ref);
            }
        }
    }

    /// Record `inputs` on the cell and add it to each input's outputs.
    fn link_inputs(&mut self, cell_ref: &CellRef, inputs: IndexSet<CellRef>) {
        for input in &inputs {
            if let Some(upstream) = self.grid.get_mut(input) {
                upstream.outputs.insert(cell_ref.clone());
            }
        }
        if let Some(cell) = self.grid.get_mut(cell_ref) {
            cell.inputs = inputs;
        }
    }

    fn require(&self, cell_ref: &CellRef) -> Result<()> {
        self.get_cell(cell_ref).map(|_| ())
    }
}
