//! The SRC→TGT transpiler collaborator contract.
//!
//! The transpiler itself is an external collaborator (out of scope per
//! §1); this module only defines the interface the host programs against,
//! plus a deterministic test double used to exercise the host's
//! caching/versioning/fatal-error contract without a real toolchain.

use crate::diagnostic::Diagnostic;
use crate::sourcemap::Segment;

/// One successful or failed transpile attempt.
#[derive(Debug, Clone)]
pub struct CompileOutput {
    /// The emitted TGT source text.
    pub code: String,
    /// The resolved-form map lines for `code`, absent if generation was
    /// skipped. This is what a virtual-file host stores as file metadata.
    pub map_lines: Option<Vec<Vec<Segment>>>,
    /// Diagnostics produced during this attempt (may be non-empty even on
    /// success, e.g. warnings).
    pub errors: Vec<Diagnostic>,
}

/// `compile(path, source) -> { code, sourceMap, errors }`, per §1.
///
/// A `Transpiler` reports fatal failures by returning `Err`; the host never
/// lets such an error propagate out of `get_script_snapshot` (spec §7 kind
/// 3) — it records `fatal = true` and keeps serving the previous snapshot.
pub trait Transpiler: Send + Sync {
    /// The SRC extension this transpiler claims (e.g. `.vela`).
    fn source_ext(&self) -> &str;
    /// The TGT extension its mirror documents carry (e.g. `.ts`).
    fn target_ext(&self) -> &str;
    /// Transpile `source` (the contents of `path`) to TGT.
    fn compile(&self, path: &str, source: &str) -> Result<CompileOutput, Diagnostic>;
}
