//! Label table built by the first pass.

use chonky_core::AssemblyError;
use rustc_hash::FxHashMap;

use crate::Result;

/// Label name → byte offset.
///
/// Names are stored without the leading `.` sigil.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelTable {
    offsets: FxHashMap<String, u32>,
}

impl LabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a label at `offset`.
    ///
    /// # Errors
    ///
    /// `DuplicateLabel` if the name is already defined.
    pub fn define(&mut self, name: &str, offset: u32, line: usize) -> Result<()> {
        if self.offsets.contains_key(name) {
            return Err(AssemblyError::DuplicateLabel {
                label: name.to_string(),
                line,
            });
        }
        self.offsets.insert(name.to_string(), offset);
        Ok(())
    }

    /// Offset of a label, if defined.
    pub fn get(&self, name: &str) -> Option<u32> {
        self.offsets.get(name).copied()
    }

    /// Offset of a label referenced from `line`.
    ///
    /// # Errors
    ///
    /// `UnknownLabel` if the name was never defined.
    pub fn resolve(&self, name: &str, line: usize) -> Result<u32> {
        self.get(name).ok_or_else(|| AssemblyError::UnknownLabel {
            label: name.to_string(),
            line,
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.offsets.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// All labels, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.offsets
            .iter()
            .map(|(name, offset)| (name.as_str(), *offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_and_resolve() {
        let mut labels = LabelTable::new();
        labels.define("loop", 16, 3).unwrap();
        assert_eq!(labels.resolve("loop", 9), Ok(16));
        assert!(labels.contains("loop"));
        assert_eq!(labels.len(), 1);
    }

    #[test]
    fn duplicate_is_rejected() {
        let mut labels = LabelTable::new();
        labels.define("end", 0, 1).unwrap();
        let err = labels.define("end", 4, 5).unwrap_err();
        assert_eq!(
            err,
            AssemblyError::DuplicateLabel {
                label: "end".into(),
                line: 5,
            }
        );
    }

    #[test]
    fn unknown_label_reports_line() {
        let labels = LabelTable::new();
        assert_eq!(
            labels.resolve("nowhere", 12),
            Err(AssemblyError::UnknownLabel {
                label: "nowhere".into(),
                line: 12,
            })
        );
    }
}
