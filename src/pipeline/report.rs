use crate::db::runs::RunTotals;
use std::fmt;

/// What one cycle did. Failures are counted, never raised.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub pages: usize,
    pub upserted: usize,
    pub not_found: usize,
    pub failures: usize,
    pub swept: usize,
    pub auth_failed: bool,
}

impl CycleReport {
    pub fn succeeded(&self) -> bool {
        !self.auth_failed && self.failures == 0
    }

    pub fn totals(&self) -> RunTotals {
        RunTotals {
            pages: self.pages,
            upserted: self.upserted,
            failures: self.failures,
            swept: self.swept,
        }
    }
}

impl fmt::Display for CycleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pages={} upserted={} not_found={} failures={} swept={}",
            self.pages, self.upserted, self.not_found, self.failures, self.swept
        )?;
        if self.auth_failed {
            write!(f, " (auth failed)")?;
        }
        Ok(())
    }
}
