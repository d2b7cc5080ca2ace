//! The host TGT language service: an external collaborator, specified here
//! only via the contract the virtual-file host drives it through (§6).
//!
//! Production builds would bridge to a real TGT-native language service
//! process. `FakeTgtService` is a small deterministic stand-in used to
//! exercise the server's position-translation plumbing in tests without
//! such a dependency.

use std::sync::Arc;

use vela_core::ResolvedImport;

use crate::host::{ModuleResolutionCache, VirtualFileHost};

/// A zero-based (line, character) position in TGT coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TgtPosition {
    pub line: u32,
    pub character: u32,
}

#[derive(Debug, Clone)]
pub struct HoverInfo {
    pub contents: String,
}

#[derive(Debug, Clone)]
pub struct CompletionItem {
    pub label: String,
    pub detail: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DefinitionTarget {
    pub path: String,
    pub position: TgtPosition,
}

/// The subset of a TGT-native language service the core drives requests
/// against, once a position has been translated into TGT coordinates.
pub trait TgtLanguageService: Send + Sync {
    fn hover(&self, path: &str, position: TgtPosition) -> Option<HoverInfo>;
    fn completions(&self, path: &str, position: TgtPosition) -> Vec<CompletionItem>;
    fn definition(&self, path: &str, position: TgtPosition) -> Vec<DefinitionTarget>;
    fn references(&self, path: &str, position: TgtPosition) -> Vec<DefinitionTarget>;
    fn folding_ranges(&self, path: &str) -> Vec<(TgtPosition, TgtPosition)>;
}

/// The contract a TGT-native language service requires of its host (§6
/// "TGT-service host contract"). `VirtualFileHost` implements this.
pub trait LanguageServiceHost: Send + Sync {
    fn get_script_file_names(&self) -> Vec<String>;
    fn get_script_snapshot(&self, path: &str) -> Option<Arc<crate::document::Snapshot>>;
    fn get_script_version(&self, path: &str) -> String;
    fn get_project_version(&self) -> String;
    fn get_compilation_settings(&self) -> serde_json::Value;
    fn get_default_lib_file_name(&self, options: &serde_json::Value) -> String;
    fn resolve_module_names(
        &self,
        specifiers: &[String],
        containing_file: &str,
    ) -> Vec<Option<ResolvedImport>>;
    fn get_module_resolution_cache(&self) -> ModuleResolutionCache;
    fn write_file(&self, name: &str, content: &str);
}

impl LanguageServiceHost for VirtualFileHost {
    fn get_script_file_names(&self) -> Vec<String> {
        VirtualFileHost::get_script_file_names(self)
    }

    fn get_script_snapshot(&self, path: &str) -> Option<Arc<crate::document::Snapshot>> {
        VirtualFileHost::get_script_snapshot(self, path)
    }

    fn get_script_version(&self, path: &str) -> String {
        VirtualFileHost::get_script_version(self, path)
    }

    fn get_project_version(&self) -> String {
        VirtualFileHost::get_project_version(self)
    }

    fn get_compilation_settings(&self) -> serde_json::Value {
        VirtualFileHost::get_compilation_settings(self)
    }

    fn get_default_lib_file_name(&self, options: &serde_json::Value) -> String {
        VirtualFileHost::get_default_lib_file_name(self, options)
    }

    fn resolve_module_names(
        &self,
        specifiers: &[String],
        containing_file: &str,
    ) -> Vec<Option<ResolvedImport>> {
        VirtualFileHost::resolve_module_names(self, specifiers, containing_file)
    }

    fn get_module_resolution_cache(&self) -> ModuleResolutionCache {
        VirtualFileHost::get_module_resolution_cache(self)
    }

    fn write_file(&self, name: &str, content: &str) {
        VirtualFileHost::write_file(self, name, content)
    }
}

/// A placeholder that answers every request with "nothing found". Wiring a
/// real TGT-native language service is out of scope for this core (§1);
/// this is the default a binary entry point falls back to until one is
/// plugged in.
pub struct NullTgtService;

impl TgtLanguageService for NullTgtService {
    fn hover(&self, _path: &str, _position: TgtPosition) -> Option<HoverInfo> {
        None
    }

    fn completions(&self, _path: &str, _position: TgtPosition) -> Vec<CompletionItem> {
        Vec::new()
    }

    fn definition(&self, _path: &str, _position: TgtPosition) -> Vec<DefinitionTarget> {
        Vec::new()
    }

    fn references(&self, _path: &str, _position: TgtPosition) -> Vec<DefinitionTarget> {
        Vec::new()
    }

    fn folding_ranges(&self, _path: &str) -> Vec<(TgtPosition, TgtPosition)> {
        Vec::new()
    }
}

/// A language service backed by the virtual-file host's own snapshots:
/// "hover" reports the word at the cursor, "definition" finds its first
/// prior occurrence, "references" finds every occurrence. Good enough to
/// drive the server's remapping logic end-to-end in tests.
pub struct FakeTgtService {
    host: Arc<VirtualFileHost>,
}

impl FakeTgtService {
    pub fn new(host: Arc<VirtualFileHost>) -> Self {
        Self { host }
    }

    fn word_at(text: &str, position: TgtPosition) -> Option<(String, u32, u32)> {
        let line = text.lines().nth(position.line as usize)?;
        let col = position.character as usize;
        let bytes = line.as_bytes();
        if col > bytes.len() {
            return None;
        }
        let is_word = |c: u8| c.is_ascii_alphanumeric() || c == b'_';
        let mut start = col.min(bytes.len());
        while start > 0 && is_word(bytes[start - 1]) {
            start -= 1;
        }
        let mut end = col.min(bytes.len());
        while end < bytes.len() && is_word(bytes[end]) {
            end += 1;
        }
        if start == end {
            return None;
        }
        Some((line[start..end].to_string(), start as u32, end as u32))
    }

    fn snapshot_text(&self, path: &str) -> Option<String> {
        self.host
            .get_script_snapshot(path)
            .map(|s| s.full_text().to_string())
    }
}

impl TgtLanguageService for FakeTgtService {
    fn hover(&self, path: &str, position: TgtPosition) -> Option<HoverInfo> {
        let text = self.snapshot_text(path)?;
        let (word, _, _) = Self::word_at(&text, position)?;
        Some(HoverInfo {
            contents: format!("`{word}`"),
        })
    }

    fn completions(&self, path: &str, position: TgtPosition) -> Vec<CompletionItem> {
        let Some(text) = self.snapshot_text(path) else {
            return Vec::new();
        };
        let Some((prefix, _, _)) = Self::word_at(&text, position) else {
            return Vec::new();
        };
        let mut seen = std::collections::BTreeSet::new();
        for line in text.lines() {
            for token in line.split(|c: char| !c.is_alphanumeric() && c != '_') {
                if token.starts_with(&prefix) && !token.is_empty() {
                    seen.insert(token.to_string());
                }
            }
        }
        seen.into_iter()
            .map(|label| CompletionItem {
                label,
                detail: None,
            })
            .collect()
    }

    fn definition(&self, path: &str, position: TgtPosition) -> Vec<DefinitionTarget> {
        let Some(text) = self.snapshot_text(path) else {
            return Vec::new();
        };
        let Some((word, _, _)) = Self::word_at(&text, position) else {
            return Vec::new();
        };
        for (line_ix, line) in text.lines().enumerate() {
            if let Some(col) = line.find(&word) {
                return vec![DefinitionTarget {
                    path: path.to_string(),
                    position: TgtPosition {
                        line: line_ix as u32,
                        character: col as u32,
                    },
                }];
            }
        }
        Vec::new()
    }

    fn references(&self, path: &str, position: TgtPosition) -> Vec<DefinitionTarget> {
        let Some(text) = self.snapshot_text(path) else {
            return Vec::new();
        };
        let Some((word, _, _)) = Self::word_at(&text, position) else {
            return Vec::new();
        };
        let mut targets = Vec::new();
        for (line_ix, line) in text.lines().enumerate() {
            let mut start = 0;
            while let Some(col) = line[start..].find(&word) {
                targets.push(DefinitionTarget {
                    path: path.to_string(),
                    position: TgtPosition {
                        line: line_ix as u32,
                        character: (start + col) as u32,
                    },
                });
                start += col + word.len();
            }
        }
        targets
    }

    fn folding_ranges(&self, path: &str) -> Vec<(TgtPosition, TgtPosition)> {
        let Some(text) = self.snapshot_text(path) else {
            return Vec::new();
        };
        let mut ranges = Vec::new();
        let mut stack = Vec::new();
        for (line_ix, line) in text.lines().enumerate() {
            for ch in line.chars() {
                match ch {
                    '{' => stack.push(line_ix as u32),
                    '}' => {
                        if let Some(open) = stack.pop() {
                            if (line_ix as u32) > open {
                                ranges.push((
                                    TgtPosition {
                                        line: open,
                                        character: 0,
                                    },
                                    TgtPosition {
                                        line: line_ix as u32,
                                        character: 0,
                                    },
                                ));
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
        ranges
    }
}
