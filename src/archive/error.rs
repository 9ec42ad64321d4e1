use std::error::Error;
use std::path::Path;

/// Collects per-input failures so a whole batch can still be reported as one
/// line. Entries keep their insertion order.
#[derive(Debug, Clone, Default)]
pub struct ErrorAccumulator {
    entries: Vec<String>,
}

impl ErrorAccumulator {
    pub fn push(&mut self, msg: &str) {
        self.entries.push(msg.to_string());
    }

    pub fn push_for(&mut self, path: &Path, err: &dyn Error) {
        self.push(&format!("'{}': {}", path.display(), err));
    }

    /// Joins everything collected so far with `; ` and clears the accumulator.
    pub fn take(&mut self) -> Option<String> {
        if self.entries.is_empty() {
            return None;
        }
        Some(std::mem::take(&mut self.entries).join("; "))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
