//! Flat-file goal store: one JSON document mapping "YYYY-MM" to that
//! month's targets. Reads fall back to defaults for unknown months;
//! writes replace the whole file, so the last writer wins and a failed
//! write leaves the previous content authoritative.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use salesdash_core::types::MonthlyGoal;
use salesdash_core::{DashError, DashResult};
use tracing::warn;

pub struct GoalStore {
    path: PathBuf,
}

impl GoalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_all(&self) -> DashResult<BTreeMap<String, MonthlyGoal>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw = fs::read_to_string(&self.path)?;
        serde_json::from_str(&raw)
            .map_err(|e| DashError::GoalStore(format!("corrupt goal file {:?}: {e}", self.path)))
    }

    /// Goals for a month, or the defaults when the month was never set.
    /// An unreadable file degrades to defaults rather than blocking the
    /// dashboard.
    pub fn read(&self, month: &str) -> MonthlyGoal {
        match self.load_all() {
            Ok(goals) => goals.get(month).cloned().unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "failed to load goals, using defaults");
                MonthlyGoal::default()
            }
        }
    }

    /// All stored months, oldest first.
    pub fn list(&self) -> DashResult<BTreeMap<String, MonthlyGoal>> {
        self.load_all()
    }

    /// Set goals for a month, rewriting the file wholesale.
    pub fn write(&self, month: &str, goal: MonthlyGoal) -> DashResult<()> {
        let mut goals = self.load_all().unwrap_or_default();
        goals.insert(month.to_string(), goal);
        let serialized = serde_json::to_string_pretty(&goals)?;
        fs::write(&self.path, serialized)
            .map_err(|e| DashError::GoalStore(format!("write {:?}: {e}", self.path)))
    }
}
