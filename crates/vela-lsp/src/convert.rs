//! Type conversions between LSP wire types, TGT-service coordinates, and
//! core diagnostics.

use tower_lsp::lsp_types;
use vela_core::{Diagnostic, DiagnosticLevel, LocationTable};

use crate::tgt_service::TgtPosition;

/// Convert a core diagnostic to an LSP diagnostic. `diag`'s line/column are
/// 1-based; LSP positions are 0-based.
pub fn diagnostic_to_lsp(diag: &Diagnostic) -> lsp_types::Diagnostic {
    lsp_types::Diagnostic {
        range: lsp_types::Range {
            start: lsp_types::Position {
                line: diag.line.saturating_sub(1) as u32,
                character: diag.column.saturating_sub(1) as u32,
            },
            end: lsp_types::Position {
                line: diag.line.saturating_sub(1) as u32,
                character: (diag.column.saturating_sub(1) + diag.length) as u32,
            },
        },
        severity: Some(match diag.level {
            DiagnosticLevel::Error => lsp_types::DiagnosticSeverity::ERROR,
            DiagnosticLevel::Warning => lsp_types::DiagnosticSeverity::WARNING,
        }),
        code: Some(lsp_types::NumberOrString::String(diag.code.clone())),
        source: Some("vela".to_string()),
        message: diag.message.clone(),
        ..Default::default()
    }
}

pub fn to_tgt_position(position: lsp_types::Position) -> TgtPosition {
    TgtPosition {
        line: position.line,
        character: position.character,
    }
}

pub fn from_tgt_position(position: TgtPosition) -> lsp_types::Position {
    lsp_types::Position {
        line: position.line,
        character: position.character,
    }
}

/// Convert a 0-based LSP `Position` to a byte offset into `text`.
pub fn offset_at(text: &str, position: lsp_types::Position) -> usize {
    let mut offset = 0;
    for (line_ix, line) in text.split_inclusive('\n').enumerate() {
        if line_ix as u32 == position.line {
            let line_without_terminator = line
                .strip_suffix('\n')
                .map(|l| l.strip_suffix('\r').unwrap_or(l))
                .unwrap_or(line);
            return offset + (position.character as usize).min(line_without_terminator.len());
        }
        offset += line.len();
    }
    offset
}

/// Convert a byte offset in `text` to a 0-based LSP `Position`.
pub fn position_at(text: &str, offset: usize) -> lsp_types::Position {
    let table = LocationTable::build(text);
    let (line, column) = table.lookup(offset);
    lsp_types::Position {
        line,
        character: column,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_at_finds_middle_of_second_line() {
        let text = "abc\ndefgh\n";
        let offset = offset_at(text, lsp_types::Position { line: 1, character: 2 });
        assert_eq!(offset, 4 + 2);
    }

    #[test]
    fn position_at_round_trips_offset_at() {
        let text = "abc\ndefgh\nij";
        let pos = position_at(text, 6);
        let offset = offset_at(text, pos);
        assert_eq!(offset, 6);
    }
}
