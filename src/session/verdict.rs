//! Reduction of a run to pass/fail

use serde::{Deserialize, Serialize};

use crate::common::{Error, Result};

/// Outcome of executing one session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Verdict {
    pub failures: usize,
}

impl Verdict {
    pub fn from_failures(failures: usize) -> Self {
        Self { failures }
    }

    pub fn is_success(&self) -> bool {
        self.failures == 0
    }

    /// `Ok(())` when nothing failed, `TestsFailed` carrying the count otherwise
    pub fn into_result(self) -> Result<()> {
        if self.is_success() {
            Ok(())
        } else {
            Err(Error::TestsFailed {
                count: self.failures,
            })
        }
    }
}
