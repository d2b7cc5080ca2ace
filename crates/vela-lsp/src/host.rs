//! The virtual-file host: bridges the editor's document registry to a
//! TGT-native language service, lazily transpiling SRC files on demand and
//! caching snapshots under a version discipline.
//!
//! This is the "two-name, one-file" design described for the mirror
//! document: the host holds the SRC path privately and exposes only the
//! phantom TGT path at `srcPath + targetExt` to the language service.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};

use vela_core::{Diagnostic, ResolvedImport, Segment, Transpiler};
use vela_config::{ConfigLoader, ResolutionConfig, TranspilerConfig};

use crate::document::{ChangeRange, Document, Snapshot};

/// Per-SRC-path metadata recorded after the most recent transpile attempt.
#[derive(Debug, Clone, Default)]
pub struct FileMeta {
    pub sourcemap_lines: Option<Vec<Vec<Segment>>>,
    pub parse_errors: Vec<Diagnostic>,
    pub fatal: bool,
}

/// Opaque marker returned by `get_module_resolution_cache`. Carries no
/// state since `resolve_module_names` keeps no resolution cache of its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModuleResolutionCache;

/// A registered transpiler plus the extensions it claims, keyed for mirror-
/// path detection.
struct TranspilerEntry {
    transpiler: Arc<dyn Transpiler>,
}

struct HostState {
    script_file_names: HashSet<String>,
    file_meta: HashMap<String, FileMeta>,
    path_map: HashMap<String, Document>,
    snapshot_map: HashMap<String, Arc<Snapshot>>,
    project_version: u64,
    change_range_cache: HashMap<(usize, usize), ChangeRange>,
}

/// The shared host singleton. All mutating operations run to completion
/// atomically with respect to each other — this is a single-threaded
/// cooperative state machine, not a concurrent cache.
pub struct VirtualFileHost {
    transpilers: Vec<TranspilerEntry>,
    state: Mutex<HostState>,
    file_reader: Box<dyn Fn(&str) -> Option<String> + Send + Sync>,
}

impl VirtualFileHost {
    pub fn new(transpilers: Vec<Arc<dyn Transpiler>>) -> Self {
        Self::with_file_reader(transpilers, |_path| None)
    }

    /// Build a host with a custom filesystem reader, used in tests to avoid
    /// touching real disk.
    pub fn with_file_reader(
        transpilers: Vec<Arc<dyn Transpiler>>,
        file_reader: impl Fn(&str) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            transpilers: transpilers
                .into_iter()
                .map(|transpiler| TranspilerEntry { transpiler })
                .collect(),
            state: Mutex::new(HostState {
                script_file_names: HashSet::new(),
                file_meta: HashMap::new(),
                path_map: HashMap::new(),
                snapshot_map: HashMap::new(),
                project_version: 0,
                change_range_cache: HashMap::new(),
            }),
            file_reader: Box::new(file_reader),
        }
    }

    fn canonicalize(path: &str) -> String {
        path.replace('\\', "/")
    }

    fn transpiler_for_source_ext(&self, ext: &str) -> Option<&Arc<dyn Transpiler>> {
        self.transpilers
            .iter()
            .map(|entry| &entry.transpiler)
            .find(|t| t.source_ext() == ext)
    }

    /// If `path` is a mirror path for a registered transpiler (ends with
    /// `sourceExt + targetExt`), return the transpiler and the SRC path it
    /// mirrors.
    fn mirror_origin(&self, path: &str) -> Option<(&Arc<dyn Transpiler>, String)> {
        self.transpilers.iter().find_map(|entry| {
            let t = &entry.transpiler;
            let suffix = format!("{}{}", t.source_ext(), t.target_ext());
            path.ends_with(&suffix)
                .then(|| (t, path[..path.len() - t.target_ext().len()].to_string()))
        })
    }

    fn source_extension(path: &str) -> Option<&str> {
        let file_name = path.rsplit('/').next().unwrap_or(path);
        file_name.rfind('.').map(|i| &file_name[i..])
    }

    /// Register or update a document from an editor change notification.
    pub fn add_or_update_document(&self, path: &str, text: String, version: i64) {
        let path = Self::canonicalize(path);
        let mut state = self.state.lock().unwrap();
        state.snapshot_map.remove(&path);
        state.project_version += 1;

        if let Some(ext) = Self::source_extension(&path) {
            if let Some(transpiler) = self.transpiler_for_source_ext(ext) {
                let mirror_path = format!("{path}{}", transpiler.target_ext());
                state.snapshot_map.remove(&mirror_path);
                state
                    .path_map
                    .entry(mirror_path.clone())
                    .or_insert_with(|| Document::new(String::new(), -1));
                state.script_file_names.insert(mirror_path);
                state.path_map.insert(path, Document::new(text, version));
                return;
            }
        }

        state.script_file_names.insert(path.clone());
        state.path_map.insert(path, Document::new(text, version));
    }

    /// Resolve a module specifier per §4.E: try the TGT service's native
    /// resolution first (`native`), falling back to the custom
    /// path-mapping / `baseUrl` / directory-index scan over the host's own
    /// document registry and registered transpilers.
    pub fn resolve_module_name(
        &self,
        specifier: &str,
        containing_file: &str,
        config: &ResolutionConfig,
        native: Option<ResolvedImport>,
    ) -> Option<ResolvedImport> {
        if native.is_some() {
            return native;
        }

        let transpiler_configs: Vec<TranspilerConfig> = self
            .transpilers
            .iter()
            .map(|entry| TranspilerConfig {
                source_ext: entry.transpiler.source_ext().to_string(),
                target_ext: entry.transpiler.target_ext().to_string(),
            })
            .collect();

        let state = self.state.lock().unwrap();
        vela_core::resolve_module_name(
            specifier,
            Path::new(containing_file),
            config,
            &transpiler_configs,
            |path| {
                let path = path.to_string_lossy();
                state.path_map.contains_key(path.as_ref()) || (self.file_reader)(&path).is_some()
            },
            |_dir| false,
        )
    }

    /// Resolve a batch of specifiers for `containing_file`, per §6's
    /// `resolveModuleNames(names, containingFile, …)` host-contract member.
    /// The host has no native resolver distinct from `resolve_module_name`'s
    /// own fallback, so every call goes straight to the custom path with no
    /// native hint, using whichever `vela.toml` is discovered by walking up
    /// from `containing_file`.
    pub fn resolve_module_names(
        &self,
        specifiers: &[String],
        containing_file: &str,
    ) -> Vec<Option<ResolvedImport>> {
        let config = self.resolution_config_for(containing_file);
        specifiers
            .iter()
            .map(|specifier| self.resolve_module_name(specifier, containing_file, &config, None))
            .collect()
    }

    fn resolution_config_for(&self, containing_file: &str) -> ResolutionConfig {
        let start_dir = Path::new(containing_file)
            .parent()
            .unwrap_or_else(|| Path::new("."));
        ConfigLoader::new()
            .load_from_directory(start_dir)
            .ok()
            .and_then(|config| config.resolution().cloned())
            .unwrap_or_default()
    }

    /// §6 `getCompilationSettings() → object`. This core has no compiler-
    /// options model of its own; the only project-level settings it holds
    /// are the registered transpilers, so that is what gets surfaced.
    pub fn get_compilation_settings(&self) -> serde_json::Value {
        let transpilers: Vec<serde_json::Value> = self
            .transpilers
            .iter()
            .map(|entry| {
                serde_json::json!({
                    "sourceExt": entry.transpiler.source_ext(),
                    "targetExt": entry.transpiler.target_ext(),
                })
            })
            .collect();
        serde_json::json!({ "transpilers": transpilers })
    }

    /// §6 `getDefaultLibFileName(options) → string`. No standard-library
    /// file exists for this core's domain; always empty.
    pub fn get_default_lib_file_name(&self, _options: &serde_json::Value) -> String {
        String::new()
    }

    /// §6 `getModuleResolutionCache()`. Each `resolve_module_names` call
    /// re-resolves from the host's current document registry rather than
    /// consulting a persistent cache, so this is an opaque marker kept only
    /// so the contract's accessor exists.
    pub fn get_module_resolution_cache(&self) -> ModuleResolutionCache {
        ModuleResolutionCache
    }

    /// §6 `writeFile(name, content)`. Reuses the editor-update path: a
    /// host-written file becomes visible through `get_script_file_names`/
    /// `get_script_snapshot` exactly like a document opened from an editor.
    pub fn write_file(&self, path: &str, content: &str) {
        let canonical = Self::canonicalize(path);
        let next_version = {
            let state = self.state.lock().unwrap();
            state
                .path_map
                .get(&canonical)
                .map(|doc| doc.version + 1)
                .unwrap_or(0)
        };
        self.add_or_update_document(&canonical, content.to_string(), next_version);
    }

    pub fn get_script_file_names(&self) -> Vec<String> {
        self.state.lock().unwrap().script_file_names.iter().cloned().collect()
    }

    pub fn get_project_version(&self) -> String {
        self.state.lock().unwrap().project_version.to_string()
    }

    /// The mirror TGT path a SRC path would resolve to, or `None` if no
    /// registered transpiler claims its extension.
    pub fn mirror_path(&self, path: &str) -> Option<String> {
        let path = Self::canonicalize(path);
        let ext = Self::source_extension(&path)?;
        let transpiler = self.transpiler_for_source_ext(ext)?;
        Some(format!("{path}{}", transpiler.target_ext()))
    }

    pub fn get_script_version(&self, path: &str) -> String {
        let path = Self::canonicalize(path);
        self.state
            .lock()
            .unwrap()
            .path_map
            .get(&path)
            .map(|doc| doc.version.to_string())
            .unwrap_or_else(|| "0".to_string())
    }

    /// Force any needed transpile for `path`'s mirror, then return the
    /// recorded metadata.
    pub fn get_meta(&self, path: &str) -> Option<FileMeta> {
        let path = Self::canonicalize(path);
        if let Some(entry) = self.transpilers.iter().find(|entry| {
            Self::source_extension(&path) == Some(entry.transpiler.source_ext())
        }) {
            let mirror_path = format!("{path}{}", entry.transpiler.target_ext());
            self.get_script_snapshot(&mirror_path);
        }
        self.state.lock().unwrap().file_meta.get(&path).cloned()
    }

    pub fn get_script_snapshot(&self, path: &str) -> Option<Arc<Snapshot>> {
        let path = Self::canonicalize(path);
        self.get_or_create_snapshot(&path)
    }

    pub fn change_range(&self, path: &str, old: &Arc<Snapshot>, new: &Arc<Snapshot>) -> Option<ChangeRange> {
        let _ = path;
        let key = (Arc::as_ptr(old) as usize, Arc::as_ptr(new) as usize);
        if let Some(cached) = self.state.lock().unwrap().change_range_cache.get(&key) {
            return Some(*cached);
        }
        let computed = new.change_range(old)?;
        self.state
            .lock()
            .unwrap()
            .change_range_cache
            .insert(key, computed);
        Some(computed)
    }

    fn get_or_create_snapshot(&self, path: &str) -> Option<Arc<Snapshot>> {
        {
            let state = self.state.lock().unwrap();
            if let Some(snapshot) = state.snapshot_map.get(path) {
                return Some(snapshot.clone());
            }
        }

        if let Some((transpiler, src_path)) = self.mirror_origin(path) {
            let transpiler = transpiler.clone();
            return Some(self.transpile_and_cache(path, &src_path, &transpiler));
        }

        let mut state = self.state.lock().unwrap();
        let text = state
            .path_map
            .get(path)
            .map(|doc| doc.text.clone())
            .or_else(|| (self.file_reader)(path))
            .unwrap_or_default();
        let snapshot = Snapshot::new(text);
        state.snapshot_map.insert(path.to_string(), snapshot.clone());
        Some(snapshot)
    }

    fn transpile_and_cache(
        &self,
        mirror_path: &str,
        src_path: &str,
        transpiler: &Arc<dyn Transpiler>,
    ) -> Arc<Snapshot> {
        let (source_text, source_version) = {
            let state = self.state.lock().unwrap();
            match state.path_map.get(src_path) {
                Some(doc) => (doc.text.clone(), doc.version),
                None => ((self.file_reader)(src_path).unwrap_or_default(), 0),
            }
        };

        let mirror_version = {
            let state = self.state.lock().unwrap();
            state.path_map.get(mirror_path).map(|d| d.version).unwrap_or(-1)
        };

        if source_version > mirror_version {
            match transpiler.compile(src_path, &source_text) {
                Ok(output) => {
                    let mut state = self.state.lock().unwrap();
                    state.path_map.insert(
                        mirror_path.to_string(),
                        Document::new(output.code.clone(), source_version),
                    );
                    state.file_meta.insert(
                        src_path.to_string(),
                        FileMeta {
                            sourcemap_lines: output.map_lines,
                            parse_errors: output.errors,
                            fatal: false,
                        },
                    );
                    let snapshot = Snapshot::new(output.code);
                    state
                        .snapshot_map
                        .insert(mirror_path.to_string(), snapshot.clone());
                    return snapshot;
                }
                Err(diagnostic) => {
                    let mut state = self.state.lock().unwrap();
                    let previous_map_lines = state
                        .file_meta
                        .get(src_path)
                        .and_then(|m| m.sourcemap_lines.clone());
                    state.file_meta.insert(
                        src_path.to_string(),
                        FileMeta {
                            sourcemap_lines: previous_map_lines,
                            parse_errors: vec![diagnostic],
                            fatal: true,
                        },
                    );
                    // fall through: reuse previous mirror doc/snapshot below
                }
            }
        }

        let mut state = self.state.lock().unwrap();
        let text = state
            .path_map
            .get(mirror_path)
            .map(|doc| doc.text.clone())
            .unwrap_or_default();
        let snapshot = Snapshot::new(text);
        state
            .snapshot_map
            .insert(mirror_path.to_string(), snapshot.clone());
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::EchoTranspiler;

    fn host() -> VirtualFileHost {
        VirtualFileHost::new(vec![Arc::new(EchoTranspiler::new(".vela", ".ts"))])
    }

    #[test]
    fn transpile_on_demand_and_cache_hit() {
        let host = host();
        host.add_or_update_document("foo.vela", "let x = 1;".to_string(), 3);

        let snapshot = host.get_script_snapshot("foo.vela.ts").unwrap();
        assert_eq!(snapshot.full_text(), "let x = 1;");
        assert!(!host.get_meta("foo.vela").unwrap().fatal);

        let again = host.get_script_snapshot("foo.vela.ts").unwrap();
        assert!(Arc::ptr_eq(&snapshot, &again));
    }

    #[test]
    fn project_version_increases_on_update() {
        let host = host();
        let before = host.get_project_version();
        host.add_or_update_document("foo.vela", "x".to_string(), 1);
        let after = host.get_project_version();
        assert_ne!(before, after);
    }

    #[test]
    fn failed_transpile_preserves_last_good_snapshot() {
        let host = host();
        host.add_or_update_document("foo.vela", "let x = 1;".to_string(), 1);
        host.get_script_snapshot("foo.vela.ts").unwrap();

        host.add_or_update_document("foo.vela", "@@fail".to_string(), 2);
        let snapshot = host.get_script_snapshot("foo.vela.ts").unwrap();

        assert_eq!(snapshot.full_text(), "let x = 1;");
        assert!(host.get_meta("foo.vela").unwrap().fatal);
    }

    #[test]
    fn source_path_is_never_exposed_to_script_file_names() {
        let host = host();
        host.add_or_update_document("foo.vela", "x".to_string(), 1);
        let names = host.get_script_file_names();
        assert!(names.contains(&"foo.vela.ts".to_string()));
        assert!(!names.contains(&"foo.vela".to_string()));
    }

    #[test]
    fn non_transpilable_document_is_served_as_is() {
        let host = host();
        host.add_or_update_document("plain.ts", "const x = 1;".to_string(), 1);
        let snapshot = host.get_script_snapshot("plain.ts").unwrap();
        assert_eq!(snapshot.full_text(), "const x = 1;");
        assert!(host.get_script_file_names().contains(&"plain.ts".to_string()));
    }

    #[test]
    fn resolve_module_name_prefers_native_resolution() {
        let host = host();
        let config = ResolutionConfig::default();
        let native = ResolvedImport {
            resolved_file_name: std::path::PathBuf::from("/native/resolved.ts"),
            extension: ".ts".to_string(),
        };
        let resolved =
            host.resolve_module_name("./widget", "/src/main.vela", &config, Some(native.clone()));
        assert_eq!(resolved, Some(native));
    }

    #[test]
    fn resolve_module_name_falls_back_to_custom_resolution() {
        let host = host();
        host.add_or_update_document("/src/widget.vela", "x".to_string(), 1);
        let config = ResolutionConfig::default();

        let resolved = host
            .resolve_module_name("./widget", "/src/main.vela", &config, None)
            .unwrap();

        assert_eq!(
            resolved.resolved_file_name,
            std::path::PathBuf::from("/src/widget.vela.ts")
        );
    }

    #[test]
    fn resolve_module_names_resolves_a_batch_with_no_project_config() {
        let host = host();
        host.add_or_update_document("/src/widget.vela", "x".to_string(), 1);

        let resolved = host.resolve_module_names(
            &["./widget".to_string(), "./missing".to_string()],
            "/src/main.vela",
        );

        assert_eq!(resolved.len(), 2);
        assert_eq!(
            resolved[0].as_ref().unwrap().resolved_file_name,
            std::path::PathBuf::from("/src/widget.vela.ts")
        );
        assert!(resolved[1].is_none());
    }

    #[test]
    fn compilation_settings_lists_registered_transpilers() {
        let host = host();
        let settings = host.get_compilation_settings();
        assert_eq!(settings["transpilers"][0]["sourceExt"], ".vela");
        assert_eq!(settings["transpilers"][0]["targetExt"], ".ts");
    }

    #[test]
    fn default_lib_file_name_is_empty() {
        let host = host();
        assert_eq!(host.get_default_lib_file_name(&serde_json::json!({})), "");
    }

    #[test]
    fn write_file_makes_content_visible_as_a_document() {
        let host = host();
        host.write_file("generated.ts", "const x = 1;");

        let snapshot = host.get_script_snapshot("generated.ts").unwrap();
        assert_eq!(snapshot.full_text(), "const x = 1;");
        assert!(host
            .get_script_file_names()
            .contains(&"generated.ts".to_string()));
    }

    #[test]
    fn write_file_twice_increments_the_version() {
        let host = host();
        host.write_file("generated.ts", "first");
        assert_eq!(host.get_script_version("generated.ts"), "0");

        host.write_file("generated.ts", "second");
        assert_eq!(host.get_script_version("generated.ts"), "1");
        assert_eq!(
            host.get_script_snapshot("generated.ts").unwrap().full_text(),
            "second"
        );
    }
}
