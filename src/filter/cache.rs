//! Externally produced mapping from 1-based packet ordinal to an output
//! choice.

use crate::error::ReplayError;
use crate::interfaces::OutputChoice;

#[derive(Debug, Clone)]
pub struct InterfaceCache {
    choices: Vec<OutputChoice>,
}

impl InterfaceCache {
    /// `choices[i]` is the decision for 1-based ordinal `i + 1`. Its length
    /// must equal the total captured packet count.
    pub fn new(choices: Vec<OutputChoice>) -> Self {
        Self { choices }
    }

    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    /// Look up the decision for a 1-based ordinal. Fatal if the ordinal
    /// exceeds the cache length.
    pub fn lookup(&self, ordinal: u64) -> Result<OutputChoice, ReplayError> {
        let index = ordinal.checked_sub(1).ok_or_else(|| ReplayError::CacheOverflow {
            ordinal,
            len: self.choices.len(),
        })?;
        self.choices
            .get(index as usize)
            .copied()
            .ok_or(ReplayError::CacheOverflow { ordinal, len: self.choices.len() })
    }
}
