//! Check command - drive a transpiler over a single file and print diagnostics
//!
//! This is a smoke-testing tool, not a type-checker: `vela check` runs
//! whichever `Transpiler` is registered (the built-in `EchoTranspiler` by
//! default, standing in for a real SRC-to-TGT compiler per the integration
//! core's scope) and reports the diagnostics it produces.

use anyhow::{Context, Result};
use std::fs;
use std::sync::Arc;
use vela_core::{Diagnostic, DiagnosticLevel, Transpiler};
use vela_lsp::EchoTranspiler;

/// Run a transpiler over `file_path` and report its diagnostics.
///
/// Returns `Err` if the file is unreadable or the transpiler reports a
/// fatal failure.
pub fn run(file_path: &str, json: bool) -> Result<()> {
    let source = fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read source file: {}", file_path))?;

    let transpiler = default_transpiler(file_path);

    match transpiler.compile(file_path, &source) {
        Ok(output) => {
            if output.errors.is_empty() {
                if json {
                    println!("{}", serde_json::to_string(&output.errors)?);
                } else {
                    println!("{}: No errors found", file_path);
                }
                Ok(())
            } else {
                print_diagnostics(&output.errors, json)?;
                Err(anyhow::anyhow!("check failed"))
            }
        }
        Err(diag) => {
            print_diagnostics(std::slice::from_ref(&diag), json)?;
            Err(anyhow::anyhow!("check failed"))
        }
    }
}

/// Pick the transpiler claiming `file_path`'s extension, falling back to the
/// built-in echo transpiler for `.vela` sources.
fn default_transpiler(file_path: &str) -> Arc<dyn Transpiler> {
    let _ = file_path;
    Arc::new(EchoTranspiler::new(".vela", ".ts"))
}

fn print_diagnostics(diagnostics: &[Diagnostic], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(diagnostics)?);
        return Ok(());
    }
    for diag in diagnostics {
        eprintln!("{}", format_diagnostic(diag));
    }
    Ok(())
}

fn format_diagnostic(diag: &Diagnostic) -> String {
    let level_str = match diag.level {
        DiagnosticLevel::Error => "error",
        DiagnosticLevel::Warning => "warning",
    };
    format!(
        "{}:{}:{}: {} {}: {}",
        diag.file, diag.line, diag.column, level_str, diag.code, diag.message
    )
}
