//! The LSP server: wires the virtual-file host and the TGT language
//! service together, translating every position-bearing request from SRC
//! coordinates to TGT coordinates on the way in and back on the way out.

use std::sync::Arc;

use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

use vela_core::{remap_position, Segment};

use crate::convert::{diagnostic_to_lsp, from_tgt_position, to_tgt_position};
use crate::host::VirtualFileHost;
use crate::tgt_service::TgtLanguageService;

/// The Vela language server.
pub struct VelaLspServer {
    client: Client,
    host: Arc<VirtualFileHost>,
    tgt_service: Arc<dyn TgtLanguageService>,
}

impl VelaLspServer {
    pub fn new(
        client: Client,
        host: Arc<VirtualFileHost>,
        tgt_service: Arc<dyn TgtLanguageService>,
    ) -> Self {
        Self {
            client,
            host,
            tgt_service,
        }
    }

    fn request_path(&self, uri: &Url) -> String {
        request_path_for(&self.host, uri)
    }

    fn forward(&self, uri: &Url, position: Position) -> Option<crate::tgt_service::TgtPosition> {
        forward_for(&self.host, uri, position)
    }

    fn backward(&self, uri: &Url, position: crate::tgt_service::TgtPosition) -> Option<Position> {
        backward_for(&self.host, uri, position)
    }

    async fn publish_diagnostics_for(&self, uri: Url, version: i32) {
        let diagnostics = self
            .host
            .get_meta(uri.as_str())
            .map(|meta| meta.parse_errors.iter().map(diagnostic_to_lsp).collect())
            .unwrap_or_default();
        self.client
            .publish_diagnostics(uri, diagnostics, Some(version))
            .await;
    }
}

fn map_lines_for(host: &VirtualFileHost, uri: &Url) -> Option<Vec<Vec<Segment>>> {
    host.get_meta(uri.as_str())?.sourcemap_lines
}

/// Resolve `uri`'s TGT-facing path: its mirror if a transpiler claims its
/// extension, else the path itself.
fn request_path_for(host: &VirtualFileHost, uri: &Url) -> String {
    let path = uri.to_string();
    host.mirror_path(&path).unwrap_or(path)
}

/// Translate an incoming SRC-coordinate position into TGT coordinates using
/// the file's current source map. Returns `None` if there is no map
/// (non-transpiled file: request path equals the document path directly)
/// or if the position has no exact forward anchor.
fn forward_for(
    host: &VirtualFileHost,
    uri: &Url,
    position: Position,
) -> Option<crate::tgt_service::TgtPosition> {
    match map_lines_for(host, uri) {
        Some(lines) => {
            let (tgt_line, tgt_col) =
                vela_core::forward_position(position.line as i64, position.character as i64, &lines)?;
            Some(crate::tgt_service::TgtPosition {
                line: tgt_line as u32,
                character: tgt_col as u32,
            })
        }
        None => Some(to_tgt_position(position)),
    }
}

/// Translate a TGT-coordinate position on the same file back to SRC
/// coordinates, when a map is present.
fn backward_for(
    host: &VirtualFileHost,
    uri: &Url,
    position: crate::tgt_service::TgtPosition,
) -> Option<Position> {
    match map_lines_for(host, uri) {
        Some(lines) => {
            let (src_line, src_col) =
                remap_position(position.line as usize, position.character as i64, &lines)?;
            Some(Position {
                line: src_line as u32,
                character: src_col as u32,
            })
        }
        None => Some(from_tgt_position(position)),
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for VelaLspServer {
    async fn initialize(&self, _params: InitializeParams) -> Result<InitializeResult> {
        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                completion_provider: Some(CompletionOptions::default()),
                definition_provider: Some(OneOf::Left(true)),
                references_provider: Some(OneOf::Left(true)),
                folding_range_provider: Some(FoldingRangeProviderCapability::Simple(true)),
                diagnostic_provider: Some(DiagnosticServerCapabilities::Options(
                    DiagnosticOptions {
                        identifier: Some("vela".to_string()),
                        inter_file_dependencies: true,
                        workspace_diagnostics: false,
                        work_done_progress_options: WorkDoneProgressOptions::default(),
                    },
                )),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "vela-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "vela-lsp server initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;
        self.host
            .add_or_update_document(uri.as_str(), params.text_document.text, version as i64);
        self.publish_diagnostics_for(uri, version).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;
        if let Some(change) = params.content_changes.into_iter().last() {
            self.host
                .add_or_update_document(uri.as_str(), change.text, version as i64);
        }
        self.publish_diagnostics_for(uri, version).await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.client
            .publish_diagnostics(params.text_document.uri, Vec::new(), None)
            .await;
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        let request_path = self.request_path(&uri);

        let Some(tgt_position) = self.forward(&uri, position) else {
            return Ok(None);
        };

        Ok(self
            .tgt_service
            .hover(&request_path, tgt_position)
            .map(|info| Hover {
                contents: HoverContents::Scalar(MarkedString::String(info.contents)),
                range: None,
            }))
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;
        let request_path = self.request_path(&uri);

        let Some(tgt_position) = self.forward(&uri, position) else {
            return Ok(None);
        };

        let items = self
            .tgt_service
            .completions(&request_path, tgt_position)
            .into_iter()
            .map(|item| CompletionItem {
                label: item.label,
                detail: item.detail,
                ..Default::default()
            })
            .collect();

        Ok(Some(CompletionResponse::Array(items)))
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        let request_path = self.request_path(&uri);

        let Some(tgt_position) = self.forward(&uri, position) else {
            return Ok(None);
        };

        let targets = self.tgt_service.definition(&request_path, tgt_position);
        let locations: Vec<Location> = targets
            .into_iter()
            .filter_map(|target| {
                let target_uri = if target.path == request_path {
                    uri.clone()
                } else {
                    Url::parse(&target.path).ok()?
                };
                let src_position = if target.path == request_path {
                    self.backward(&uri, target.position)?
                } else {
                    from_tgt_position(target.position)
                };
                Some(Location {
                    uri: target_uri,
                    range: Range {
                        start: src_position,
                        end: src_position,
                    },
                })
            })
            .collect();

        Ok(Some(GotoDefinitionResponse::Array(locations)))
    }

    async fn references(&self, params: ReferenceParams) -> Result<Option<Vec<Location>>> {
        let uri = params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;
        let request_path = self.request_path(&uri);

        let Some(tgt_position) = self.forward(&uri, position) else {
            return Ok(None);
        };

        let targets = self.tgt_service.references(&request_path, tgt_position);
        let locations: Vec<Location> = targets
            .into_iter()
            .filter_map(|target| {
                let target_uri = if target.path == request_path {
                    uri.clone()
                } else {
                    Url::parse(&target.path).ok()?
                };
                let src_position = if target.path == request_path {
                    self.backward(&uri, target.position)?
                } else {
                    from_tgt_position(target.position)
                };
                Some(Location {
                    uri: target_uri,
                    range: Range {
                        start: src_position,
                        end: src_position,
                    },
                })
            })
            .collect();

        Ok(Some(locations))
    }

    async fn folding_range(&self, params: FoldingRangeParams) -> Result<Option<Vec<FoldingRange>>> {
        let uri = params.text_document.uri;
        let request_path = self.request_path(&uri);

        let ranges = self
            .tgt_service
            .folding_ranges(&request_path)
            .into_iter()
            .filter_map(|(start, end)| {
                let start = self.backward(&uri, start)?;
                let end = self.backward(&uri, end)?;
                Some(FoldingRange {
                    start_line: start.line,
                    start_character: Some(start.character),
                    end_line: end.line,
                    end_character: Some(end.character),
                    kind: Some(FoldingRangeKind::Region),
                    collapsed_text: None,
                })
            })
            .collect();

        Ok(Some(ranges))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::EchoTranspiler;

    fn host_with(uri: &str, text: &str) -> VirtualFileHost {
        let host = VirtualFileHost::new(vec![Arc::new(EchoTranspiler::new(".vela", ".ts"))]);
        host.add_or_update_document(uri, text.to_string(), 1);
        host.get_script_snapshot(&format!("{uri}.ts"));
        host
    }

    #[test]
    fn request_path_uses_mirror_extension() {
        let host = host_with("file:///a.vela", "let x = 1;");
        let uri = Url::parse("file:///a.vela").unwrap();
        assert_eq!(request_path_for(&host, &uri), "file:///a.vela.ts");
    }

    #[test]
    fn request_path_passes_through_non_transpiled_file() {
        let host = VirtualFileHost::new(vec![Arc::new(EchoTranspiler::new(".vela", ".ts"))]);
        let uri = Url::parse("file:///a.ts").unwrap();
        assert_eq!(request_path_for(&host, &uri), "file:///a.ts");
    }

    #[test]
    fn forward_and_backward_round_trip_line_start_anchor() {
        let host = host_with("file:///a.vela", "let x = 1;\nlet y = 2;");
        let uri = Url::parse("file:///a.vela").unwrap();

        let tgt = forward_for(&host, &uri, Position { line: 1, character: 0 }).unwrap();
        assert_eq!(tgt.line, 1);
        assert_eq!(tgt.character, 0);

        let src = backward_for(&host, &uri, tgt).unwrap();
        assert_eq!(src, Position { line: 1, character: 0 });
    }

    #[test]
    fn forward_rejects_inexact_position() {
        let host = host_with("file:///a.vela", "let x = 1;");
        let uri = Url::parse("file:///a.vela").unwrap();
        assert!(forward_for(&host, &uri, Position { line: 0, character: 4 }).is_none());
    }
}
