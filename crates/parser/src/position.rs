//! Source positions for substitutions embedded in an outer document.
//!
//! The lexer works with positions relative to the start of the text it was
//! given. Everything reported to callers is absolute: the relative position
//! is translated against the position of the enclosing value in the
//! blueprint document.
//!
//! Some outer formats (block scalars in YAML for example) cannot report the
//! column a value starts at. When the caller flags this with
//! `ignore_parent_column`, columns are counted from the start of the value
//! and tagged [`ColumnAccuracy::Approximate`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 1-based line and column in a blueprint document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourcePosition {
    pub line: usize,
    pub column: usize,
}

impl SourcePosition {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Position information attached to parsed nodes when line info is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMeta {
    pub position: SourcePosition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_position: Option<SourcePosition>,
}

impl SourceMeta {
    pub fn at(position: SourcePosition) -> Self {
        Self {
            position,
            end_position: None,
        }
    }

    pub fn spanning(position: SourcePosition, end_position: SourcePosition) -> Self {
        Self {
            position,
            end_position: Some(end_position),
        }
    }
}

/// Whether a reported column can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnAccuracy {
    #[default]
    Exact,
    Approximate,
}

impl fmt::Display for ColumnAccuracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnAccuracy::Exact => write!(f, "exact"),
            ColumnAccuracy::Approximate => write!(f, "approximate"),
        }
    }
}

/// A 0-based line and character column within the text being lexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RelativePosition {
    pub line: usize,
    pub column: usize,
}

impl RelativePosition {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Moves past `ch`, starting a new line on `\n`.
    pub fn advance(&mut self, ch: char) {
        if ch == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
    }
}

/// An absolute location reported with every diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
    pub column_accuracy: ColumnAccuracy,
}

impl Location {
    pub fn position(&self) -> SourcePosition {
        SourcePosition::new(self.line, self.column)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)?;
        if self.column_accuracy == ColumnAccuracy::Approximate {
            write!(f, " (approximate)")?;
        }
        Ok(())
    }
}

/// Translates relative positions into absolute ones.
///
/// `start` is the absolute position of the first character of the text,
/// `None` when the text is not part of a larger document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PositionContext {
    pub start: Option<SourcePosition>,
    pub column_accuracy: ColumnAccuracy,
}

impl PositionContext {
    pub fn new(start: Option<SourcePosition>, column_accuracy: ColumnAccuracy) -> Self {
        Self {
            start,
            column_accuracy,
        }
    }

    /// Context for a value starting at `parent`, skipping
    /// `preceding_char_count` characters (an opening quote for instance).
    ///
    /// With `ignore_parent_column` the parent column is discarded and the
    /// resulting columns are approximate.
    pub fn from_parent(
        parent: Option<SourcePosition>,
        ignore_parent_column: bool,
        preceding_char_count: usize,
    ) -> Self {
        let start = parent.map(|pos| {
            if ignore_parent_column {
                SourcePosition::new(pos.line, 1)
            } else {
                SourcePosition::new(pos.line, pos.column + preceding_char_count)
            }
        });
        let column_accuracy = if ignore_parent_column {
            ColumnAccuracy::Approximate
        } else {
            ColumnAccuracy::Exact
        };
        Self {
            start,
            column_accuracy,
        }
    }

    /// Context for text that starts at `relative` within the text this
    /// context describes.
    pub fn nested(&self, relative: RelativePosition) -> Self {
        Self {
            start: Some(self.absolute(relative)),
            column_accuracy: self.column_accuracy,
        }
    }

    pub fn absolute(&self, relative: RelativePosition) -> SourcePosition {
        match self.start {
            None => SourcePosition::new(relative.line + 1, relative.column + 1),
            Some(start) if relative.line == 0 => {
                SourcePosition::new(start.line, start.column + relative.column)
            }
            Some(start) => SourcePosition::new(start.line + relative.line, relative.column + 1),
        }
    }

    pub fn location(&self, relative: RelativePosition) -> Location {
        let position = self.absolute(relative);
        Location {
            line: position.line,
            column: position.column,
            column_accuracy: self.column_accuracy,
        }
    }
}
