//! Custom module resolution (spec §4.E "Custom module resolution").
//!
//! Augments a host language service's native resolver with synthesized
//! resolutions for SRC-extension specifiers: path-mapping / `baseUrl`
//! lookup for absolute specifiers, directory-relative lookup for relative
//! ones, and directory-index scanning across registered transpilers.

use std::path::{Path, PathBuf};
use vela_config::{ResolutionConfig, TranspilerConfig};

/// The result of a successful custom resolution: the virtual mirror path
/// the host language service should request a snapshot for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImport {
    pub resolved_file_name: PathBuf,
    pub extension: String,
}

/// Whether a resolution candidate is checked for existence as a file or as
/// a directory, per the extension (or lack of one) on the specifier.
enum ExistsKind {
    File,
    Directory,
}

/// Resolve `specifier`, imported from `containing_file`, against the
/// registered `transpilers` and `config`. Returns `None` if no transpiler
/// claims the specifier's extension, or if no candidate exists — callers
/// are expected to have already tried the host language service's native
/// resolver and fall into this only on its miss.
pub fn resolve_module_name(
    specifier: &str,
    containing_file: &Path,
    config: &ResolutionConfig,
    transpilers: &[TranspilerConfig],
    file_exists: impl Fn(&Path) -> bool,
    directory_exists: impl Fn(&Path) -> bool,
) -> Option<ResolvedImport> {
    let last_ext = last_extension(specifier);
    let (exists_kind, source_transpiler) = match &last_ext {
        Some(ext) => {
            let matched = transpilers.iter().find(|t| &t.source_ext == ext)?;
            (ExistsKind::File, Some(matched))
        }
        None => (ExistsKind::Directory, None),
    };

    let is_relative = specifier.starts_with("./") || specifier.starts_with("../");
    let candidate = if is_relative {
        let base = containing_file.parent().unwrap_or_else(|| Path::new("."));
        base.join(specifier)
    } else {
        resolve_absolute_specifier(specifier, config)?
    };

    let exists = match exists_kind {
        ExistsKind::File => file_exists(&candidate),
        ExistsKind::Directory => directory_exists(&candidate),
    };
    if !exists {
        return None;
    }

    let transpiler = match exists_kind {
        ExistsKind::File => source_transpiler?,
        ExistsKind::Directory => find_directory_index(&candidate, transpilers, &file_exists)?,
    };

    let base_path = match exists_kind {
        ExistsKind::File => candidate.clone(),
        ExistsKind::Directory => candidate.join(format!("index{}", transpiler.source_ext)),
    };

    Some(ResolvedImport {
        resolved_file_name: append_extension(&base_path, &transpiler.target_ext),
        extension: transpiler.target_ext.clone(),
    })
}

/// Absolute (non-relative) specifier resolution: path-mapping first, then
/// `base_url` fallback.
fn resolve_absolute_specifier(specifier: &str, config: &ResolutionConfig) -> Option<PathBuf> {
    if let Some((mapping, tail)) = config.match_path_mapping(specifier) {
        let resolve_root = config
            .base_url
            .as_deref()
            .or(config.paths_base_path.as_deref())
            .unwrap_or_else(|| Path::new("."));

        for replacement in &mapping.replacements {
            let substituted = match tail {
                Some(tail) => replacement.replacen('*', tail, 1),
                None => replacement.clone(),
            };
            return Some(resolve_root.join(substituted));
        }
    }

    config.base_url.as_ref().map(|base| base.join(specifier))
}

/// Scan `transpilers` in registration order for an existing `index.<ext>`
/// inside `dir`, returning the first match.
fn find_directory_index<'a>(
    dir: &Path,
    transpilers: &'a [TranspilerConfig],
    file_exists: &impl Fn(&Path) -> bool,
) -> Option<&'a TranspilerConfig> {
    transpilers
        .iter()
        .find(|t| file_exists(&dir.join(format!("index{}", t.source_ext))))
}

fn last_extension(specifier: &str) -> Option<String> {
    let file_name = specifier.rsplit('/').next().unwrap_or(specifier);
    file_name.rfind('.').map(|i| file_name[i..].to_string())
}

fn append_extension(path: &Path, ext: &str) -> PathBuf {
    let mut s = path.to_string_lossy().into_owned();
    s.push_str(ext);
    PathBuf::from(s)
}
