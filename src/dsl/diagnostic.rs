//! Diagnostics produced while reading a definition.

use std::fmt;

use super::lexer::Position;

/// How serious a diagnostic is. Only errors block simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
}

/// Which stage found the problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// The token stream does not match the grammar
    Syntax,
    /// Well-formed text describing an invalid network
    Semantic,
}

/// A problem found in a definition, anchored at a source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub message: String,
    pub position: Position,
}

impl Diagnostic {
    /// Create a syntax error
    pub fn syntax(position: Position, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            kind: DiagnosticKind::Syntax,
            message: message.into(),
            position,
        }
    }

    /// Create a semantic error
    pub fn semantic(position: Position, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            kind: DiagnosticKind::Semantic,
            message: message.into(),
            position,
        }
    }

    /// Create a semantic warning
    pub fn warning(position: Position, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            kind: DiagnosticKind::Semantic,
            message: message.into(),
            position,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Format the diagnostic with the offending source line and a caret
    /// under its column.
    ///
    /// ```text
    /// error at line 2, column 9: expected ';' or ','
    ///   C1:CLOCK X
    ///            ^
    /// ```
    pub fn render(&self, source: &str) -> String {
        let line = source
            .lines()
            .nth(self.position.line.saturating_sub(1))
            .unwrap_or("");
        // Tabs keep their width so the caret stays under the token.
        let padding: String = line
            .chars()
            .take(self.position.column.saturating_sub(1))
            .map(|c| if c == '\t' { '\t' } else { ' ' })
            .collect();
        format!("{}\n  {}\n  {}^", self, line, padding)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match (self.severity, self.kind) {
            (Severity::Warning, _) => "warning",
            (Severity::Error, DiagnosticKind::Syntax) => "syntax error",
            (Severity::Error, DiagnosticKind::Semantic) => "error",
        };
        write!(f, "{} at {}: {}", label, self.position, self.message)
    }
}
