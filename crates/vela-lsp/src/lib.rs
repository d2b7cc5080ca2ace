//! Vela Language Server Protocol (LSP) library.
//!
//! Implements the editor-facing half of the language-service integration
//! core: a virtual-file host that lazily transpiles SRC documents for a
//! TGT-native language service, and a server that translates every
//! position-bearing request across that boundary using the stored source
//! map.

pub mod convert;
pub mod document;
pub mod fixtures;
pub mod host;
pub mod server;
pub mod tgt_service;

pub use fixtures::EchoTranspiler;
pub use host::{FileMeta, ModuleResolutionCache, VirtualFileHost};
pub use server::VelaLspServer;
pub use tgt_service::{
    CompletionItem, DefinitionTarget, FakeTgtService, HoverInfo, LanguageServiceHost,
    NullTgtService, TgtLanguageService, TgtPosition,
};
