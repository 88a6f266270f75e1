//! Lexical scope tracking for CTEs and visible tables.
//!
//! Frames live in an arena and link to their parent by index, so a frame
//! popped off the active stack stays inspectable afterwards — the context
//! classifier reads the frame a statement was parsed under long after the
//! driver moved on. Stack discipline: push on entering a CTE body or
//! subquery, pop on exit. A CTE is visible in its defining statement and in
//! nested scopes, never in sibling top-level statements.

use std::collections::BTreeSet;

use crate::types::{ScopeSnapshot, StatementType, TableReference};

/// One lexical scope frame.
#[derive(Debug, Clone, Default)]
pub struct ScopeFrame {
    pub statement_type: StatementType,
    cte_names: BTreeSet<String>,
    pub visible_tables: Vec<TableReference>,
    parent: Option<usize>,
}

/// Arena of scope frames plus the active stack of frame indices.
#[derive(Debug, Default)]
pub struct ScopeStack {
    frames: Vec<ScopeFrame>,
    active: Vec<usize>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a frame whose parent is the current top. Returns the frame's
    /// arena index, stable for the lifetime of the parse run.
    pub fn push(&mut self) -> usize {
        let index = self.frames.len();
        self.frames.push(ScopeFrame {
            parent: self.active.last().copied(),
            ..ScopeFrame::default()
        });
        self.active.push(index);
        index
    }

    /// Pops the active frame. The frame stays in the arena.
    pub fn pop(&mut self) {
        self.active.pop();
    }

    pub fn current_index(&self) -> Option<usize> {
        self.active.last().copied()
    }

    fn current_mut(&mut self) -> Option<&mut ScopeFrame> {
        let index = self.current_index()?;
        self.frames.get_mut(index)
    }

    /// Records a CTE name into the current frame. Lookup is
    /// case-insensitive.
    pub fn add_cte(&mut self, name: &str) {
        if let Some(frame) = self.current_mut() {
            frame.cte_names.insert(name.to_ascii_lowercase());
        }
    }

    /// Records a reference into the current frame's visible set.
    pub fn add_table(&mut self, reference: TableReference) {
        if let Some(frame) = self.current_mut() {
            frame.visible_tables.push(reference);
        }
    }

    /// Records a reference into the bottom-most active frame, used for
    /// table variables that stay visible for the rest of the batch.
    pub fn add_table_at_root(&mut self, reference: TableReference) {
        if let Some(&index) = self.active.first() {
            self.frames[index].visible_tables.push(reference);
        }
    }

    /// Whether `name` resolves to a CTE, searching the current frame then
    /// each ancestor in order.
    pub fn is_cte(&self, name: &str) -> bool {
        match self.current_index() {
            Some(index) => self.is_cte_from(index, name),
            None => false,
        }
    }

    /// CTE lookup starting from an arbitrary arena frame.
    pub fn is_cte_from(&self, index: usize, name: &str) -> bool {
        let needle = name.to_ascii_lowercase();
        let mut cursor = Some(index);
        while let Some(i) = cursor {
            let frame = &self.frames[i];
            if frame.cte_names.contains(&needle) {
                return true;
            }
            cursor = frame.parent;
        }
        false
    }

    pub fn set_statement_type(&mut self, statement_type: StatementType) {
        if let Some(frame) = self.current_mut() {
            frame.statement_type = statement_type;
        }
    }

    pub fn statement_type(&self) -> StatementType {
        self.current_index()
            .map(|i| self.frames[i].statement_type)
            .unwrap_or_default()
    }

    /// Read-only view of everything resolvable from the given frame:
    /// CTE names and visible tables accumulated along the parent chain.
    pub fn snapshot(&self, index: usize) -> ScopeSnapshot {
        let mut ctes = BTreeSet::new();
        let mut visible_tables = Vec::new();
        let statement_type = self
            .frames
            .get(index)
            .map(|f| f.statement_type)
            .unwrap_or_default();
        let mut cursor = Some(index);
        while let Some(i) = cursor {
            let frame = &self.frames[i];
            ctes.extend(frame.cte_names.iter().cloned());
            visible_tables.extend(frame.visible_tables.iter().cloned());
            cursor = frame.parent;
        }
        ScopeSnapshot {
            ctes: ctes.into_iter().collect(),
            visible_tables,
            statement_type,
        }
    }
}
