//! Branch label naming.
//!
//! Each conditional or loop takes one index from its scope's label counter
//! and derives its label pair from it. Indices are never reused, so label
//! names are unique across the whole program.

/// Labels of one `if`/`else`.
///
/// `if_end` marks the start of the `else` code; `else_end` the true end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfLabels {
    pub if_end: String,
    pub else_end: String,
}

impl IfLabels {
    pub fn new(index: u32) -> Self {
        Self {
            if_end: format!("if_end_{index}"),
            else_end: format!("else_end_{index}"),
        }
    }
}

/// Labels of one `while`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhileLabels {
    pub start: String,
    pub end: String,
}

impl WhileLabels {
    pub fn new(index: u32) -> Self {
        Self {
            start: format!("while_start_{index}"),
            end: format!("while_end_{index}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names() {
        let labels = IfLabels::new(3);
        assert_eq!(labels.if_end, "if_end_3");
        assert_eq!(labels.else_end, "else_end_3");

        let labels = WhileLabels::new(0);
        assert_eq!(labels.start, "while_start_0");
        assert_eq!(labels.end, "while_end_0");
    }
}
