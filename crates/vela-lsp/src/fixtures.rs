//! A deterministic identity transpiler used to exercise the virtual-file
//! host and server without a real SRC-to-TGT compiler. Public (not
//! `#[cfg(test)]`-gated) so integration tests under `tests/` can build on it
//! too, not just this crate's own unit tests.

use vela_core::{CompileOutput, Diagnostic, SourceMapBuilder, Transpiler};

pub struct EchoTranspiler {
    pub source_ext: String,
    pub target_ext: String,
}

impl EchoTranspiler {
    pub fn new(source_ext: impl Into<String>, target_ext: impl Into<String>) -> Self {
        Self {
            source_ext: source_ext.into(),
            target_ext: target_ext.into(),
        }
    }
}

impl Transpiler for EchoTranspiler {
    fn source_ext(&self) -> &str {
        &self.source_ext
    }

    fn target_ext(&self) -> &str {
        &self.target_ext
    }

    fn compile(&self, path: &str, source: &str) -> Result<CompileOutput, Diagnostic> {
        if source.contains("@@fail") {
            return Err(Diagnostic::error_with_code(
                vela_core::error_codes::TRANSPILE_FAILED,
                "echo transpiler encountered @@fail marker",
                vela_core::Span::at(0),
            )
            .with_file(path));
        }

        let mut builder = SourceMapBuilder::new(source);
        builder.update(source, Some(0), 0);

        Ok(CompileOutput {
            code: source.to_string(),
            map_lines: Some(builder.into_lines()),
            errors: Vec::new(),
        })
    }
}
