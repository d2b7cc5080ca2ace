//! Integration tests exercising `FakeTgtService` against documents served
//! through a real `VirtualFileHost` + `EchoTranspiler` pipeline, end to end.

use std::sync::Arc;

use vela_lsp::{EchoTranspiler, FakeTgtService, TgtLanguageService, TgtPosition, VirtualFileHost};

fn service_with(text: &str) -> FakeTgtService {
    let host = Arc::new(VirtualFileHost::new(vec![Arc::new(EchoTranspiler::new(
        ".vela", ".ts",
    ))]));
    host.add_or_update_document("main.vela", text.to_string(), 1);
    host.get_script_snapshot("main.vela.ts");
    FakeTgtService::new(host)
}

#[test]
fn completions_prefix_match_tokens_in_the_file() {
    let service = service_with("let width = 1;\nlet weight = 2;\nlet height = 3;");
    let items = service.completions("main.vela.ts", TgtPosition { line: 0, character: 5 });
    let labels: Vec<String> = items.into_iter().map(|item| item.label).collect();
    assert!(labels.contains(&"width".to_string()));
    assert!(labels.contains(&"weight".to_string()));
    assert!(!labels.contains(&"height".to_string()));
}

#[test]
fn definition_finds_first_occurrence() {
    let service = service_with("let total = 0;\ntotal = total + 1;");
    let targets = service.definition("main.vela.ts", TgtPosition { line: 1, character: 0 });
    assert_eq!(targets.len(), 1);
    assert_eq!(targets[0].position.line, 0);
}

#[test]
fn hover_returns_none_outside_any_word() {
    let service = service_with("let x = 1;");
    let hover = service.hover("main.vela.ts", TgtPosition { line: 0, character: 11 });
    assert!(hover.is_none());
}

#[test]
fn folding_ranges_ignore_unmatched_braces() {
    let service = service_with("let x = {");
    let ranges = service.folding_ranges("main.vela.ts");
    assert!(ranges.is_empty());
}
