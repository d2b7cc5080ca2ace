//! Vela core - the language-service integration layer shared by the
//! compiler toolchain's LSP backend.
//!
//! Provides the source-map codec and composer, a byte-offset line/column
//! table, a unified diagnostic type, and the custom module-resolution
//! logic that lets a SRC-extension project be served by a TGT-native
//! language service.

/// Vela core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod diagnostic;
pub mod resolver;
pub mod sourcemap;
pub mod span;
pub mod transpiler;

pub use diagnostic::{error_codes, normalizer, sort_diagnostics, Diagnostic, DiagnosticLevel,
    RelatedLocation, DIAG_VERSION};
pub use resolver::{resolve_module_name, ResolvedImport};
pub use sourcemap::{
    compose_lines, forward_position, parse_with_lines, remap, remap_position, render_lines,
    render_inline_comment, strip_inline_comment, LocationTable, MapDocument, ParsedMap, Segment,
    SourceMapBuilder, SourceMapError,
};
pub use span::Span;
pub use transpiler::{CompileOutput, Transpiler};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoke() {
        assert!(!VERSION.is_empty());
    }
}
