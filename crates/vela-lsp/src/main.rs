//! Vela Language Server Protocol (LSP) server
//!
//! Provides real-time diagnostics and (once a TGT language service is
//! wired in) code intelligence for Vela source files over stdio.

use std::sync::Arc;

use tower_lsp::{LspService, Server};
use vela_lsp::{NullTgtService, VelaLspServer, VirtualFileHost};

#[tokio::main]
async fn main() {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    // No transpiler is registered by default: wiring a production
    // `Transpiler` and `TgtLanguageService` is an embedding concern, out of
    // scope for this core (see spec.md §1).
    let host = Arc::new(VirtualFileHost::new(Vec::new()));
    let tgt_service = Arc::new(NullTgtService);

    let (service, socket) =
        LspService::new(move |client| VelaLspServer::new(client, host, tgt_service));

    Server::new(stdin, stdout, socket).serve(service).await;
}
