//! Options for parsing substitutions out of a blueprint document.

use crate::position::{PositionContext, SourcePosition};
use serde::{Deserialize, Serialize};

/// How a substitution string relates to the document it came from.
///
/// # Example
///
/// ```rust
/// use blueprint_substitutions_parser::{ParseOptions, SourcePosition};
///
/// // A double-quoted scalar starting at line 12, column 14.
/// let options = ParseOptions::default()
///     .with_context("resources.orders.spec.tableName")
///     .with_parent_position(SourcePosition::new(12, 14))
///     .with_preceding_char_count(1)
///     .with_line_info(true);
/// assert!(options.output_line_info);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Path of the field being parsed, included in load errors.
    pub substitution_context: Option<String>,
    /// Position of the value in the document.
    pub parent_position: Option<SourcePosition>,
    /// Attach a `SourceMeta` to every parsed node.
    pub output_line_info: bool,
    /// The parent column is unreliable (block scalars), count columns from
    /// the start of the value and mark them approximate.
    pub ignore_parent_column: bool,
    /// Characters between the parent position and the first character of
    /// the value, such as an opening quote.
    pub parent_preceding_char_count: usize,
}

impl ParseOptions {
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.substitution_context = Some(context.into());
        self
    }

    pub fn with_parent_position(mut self, position: SourcePosition) -> Self {
        self.parent_position = Some(position);
        self
    }

    pub fn with_line_info(mut self, output_line_info: bool) -> Self {
        self.output_line_info = output_line_info;
        self
    }

    pub fn with_ignore_parent_column(mut self, ignore_parent_column: bool) -> Self {
        self.ignore_parent_column = ignore_parent_column;
        self
    }

    pub fn with_preceding_char_count(mut self, count: usize) -> Self {
        self.parent_preceding_char_count = count;
        self
    }

    /// Position context for the first character of the value.
    pub fn position_context(&self) -> PositionContext {
        PositionContext::from_parent(
            self.parent_position,
            self.ignore_parent_column,
            self.parent_preceding_char_count,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::ColumnAccuracy;

    #[test]
    fn test_deserialize_partial_options() {
        let options: ParseOptions =
            serde_json::from_str(r#"{"output_line_info": true, "parent_position": {"line": 3, "column": 5}}"#)
                .unwrap();
        assert!(options.output_line_info);
        assert_eq!(options.parent_position, Some(SourcePosition::new(3, 5)));
        assert!(!options.ignore_parent_column);
    }

    #[test]
    fn test_position_context() {
        let ctx = ParseOptions::default()
            .with_parent_position(SourcePosition::new(3, 5))
            .with_preceding_char_count(1)
            .position_context();
        assert_eq!(ctx.start, Some(SourcePosition::new(3, 6)));
        assert_eq!(ctx.column_accuracy, ColumnAccuracy::Exact);
    }
}
