//! Continuation stack for the register machine.
//!
//! The evaluator never recurses natively. Before a nested evaluation would
//! clobber a register it saves the register's value here, and restores it in
//! reverse order when the nested evaluation finishes.

use std::fmt;

use tracing::trace;

use crate::value::Value;

/// Running statistics for a [`ContinuationStack`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StackStats {
    /// Total number of saves since the last reset
    pub pushes: usize,
    /// Saves minus restores since the last reset
    pub depth: usize,
    /// Largest `depth` seen since the last reset
    pub max_depth: usize,
}

impl fmt::Display for StackStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "*** STATS ***")?;
        writeln!(f, "Total number of saves: {}", self.pushes)?;
        write!(f, "Maximum stack depth: {}", self.max_depth)
    }
}

/// LIFO store of saved register values.
#[derive(Debug, Default)]
pub struct ContinuationStack {
    entries: Vec<Value>,
    stats: StackStats,
}

impl ContinuationStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save(&mut self, value: Value) {
        trace!(target: "reglisp::stack", %value, depth = self.entries.len() + 1, "save");
        self.entries.push(value);
        self.stats.pushes += 1;
        self.stats.depth += 1;
        self.stats.max_depth = self.stats.max_depth.max(self.stats.depth);
    }

    /// Pop the most recently saved value.
    ///
    /// Restoring from an empty stack is a caller bug; it yields `None` and
    /// leaves the statistics alone.
    pub fn restore(&mut self) -> Option<Value> {
        let value = self.entries.pop()?;
        trace!(target: "reglisp::stack", %value, depth = self.entries.len(), "restore");
        self.stats.depth = self.stats.depth.saturating_sub(1);
        Some(value)
    }

    /// Drop every entry. Statistics are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Zero the statistics. Entries are kept.
    pub fn reset_stats(&mut self) {
        self.stats = StackStats::default();
    }

    pub fn stats(&self) -> StackStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Top of the stack without popping it.
    pub fn peek(&self) -> Option<&Value> {
        self.entries.last()
    }

    /// Entries from the top of the stack down.
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().rev()
    }
}

impl fmt::Display for ContinuationStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const DIVIDER: &str = "--------------------";

        writeln!(f, "{}", DIVIDER)?;
        if self.is_empty() {
            writeln!(f, "-- EMPTY STACK --")?;
        }
        for (index, value) in self.iter().enumerate() {
            writeln!(f, "-- STACK ENTRY {} --", index)?;
            writeln!(f, "{}", value)?;
        }
        write!(f, "{}", DIVIDER)
    }
}
