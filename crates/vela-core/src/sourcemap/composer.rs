//! Map composition, remapping and inline-comment extraction (component D).

use super::builder::{render_lines, MapDocument};
use super::segment::{RunningAbsolutes, Segment};
use super::vlq::{self, VlqDecodeError};
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors that abort map parsing/composition outright. Spec kind 1
/// ("malformed map data") — never silently corrected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SourceMapError {
    #[error("map payload is not valid base64: {0}")]
    InvalidBase64(String),
    #[error("map payload is not valid UTF-8")]
    InvalidUtf8,
    #[error("map envelope is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("malformed VLQ segment: {0}")]
    MalformedVlq(#[from] VlqDecodeError),
    #[error("mapping segment has unsupported arity {0} (expected 1, 4, or 5)")]
    BadArity(usize),
}

/// A parsed map with resolved-form lines, ready for remapping/composition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMap {
    pub file: String,
    pub sources: Vec<String>,
    pub sources_content: Vec<String>,
    pub names: Vec<String>,
    pub lines: Vec<Vec<Segment>>,
}

/// Base64-decode `base64_text` as a map envelope and resolve its mapping
/// lines to absolute source positions, maintaining the running absolutes
/// across the whole mapping (the cross-line persistence rule).
pub fn parse_with_lines(base64_text: &str) -> Result<ParsedMap, SourceMapError> {
    use base64::Engine;
    let raw = base64::engine::general_purpose::STANDARD
        .decode(base64_text)
        .map_err(|e| SourceMapError::InvalidBase64(e.to_string()))?;
    let text = String::from_utf8(raw).map_err(|_| SourceMapError::InvalidUtf8)?;
    let doc: MapDocument =
        serde_json::from_str(&text).map_err(|e| SourceMapError::InvalidJson(e.to_string()))?;

    let mut running = RunningAbsolutes::default();
    let mut lines = Vec::new();
    for wire_line in doc.mappings.split(';') {
        let mut line = Vec::new();
        if !wire_line.is_empty() {
            for wire_segment in wire_line.split(',') {
                if wire_segment.is_empty() {
                    continue;
                }
                let values = vlq::decode_segment(wire_segment)?;
                line.push(resolve_segment(&values, &mut running)?);
            }
        }
        lines.push(line);
    }

    Ok(ParsedMap {
        file: doc.file,
        sources: doc.sources,
        sources_content: doc.sources_content,
        names: doc.names,
        lines,
    })
}

fn resolve_segment(
    values: &[i64],
    running: &mut RunningAbsolutes,
) -> Result<Segment, SourceMapError> {
    match values.len() {
        1 => Ok(Segment::Unmapped {
            gen_col_delta: values[0],
        }),
        4 => {
            running.src_file_ix += values[1];
            running.src_line += values[2];
            running.src_col += values[3];
            Ok(Segment::Mapped {
                gen_col_delta: values[0],
                src_file_ix: running.src_file_ix,
                src_line: running.src_line,
                src_col: running.src_col,
            })
        }
        5 => {
            running.src_file_ix += values[1];
            running.src_line += values[2];
            running.src_col += values[3];
            running.name_ix += values[4];
            Ok(Segment::Named {
                gen_col_delta: values[0],
                src_file_ix: running.src_file_ix,
                src_line: running.src_line,
                src_col: running.src_col,
                name_ix: running.name_ix,
            })
        }
        other => Err(SourceMapError::BadArity(other)),
    }
}

/// Look up a generated `(line, col)` in `map_lines`, returning the exact
/// source position of the mapped anchor that position lands on, or `None`
/// if it doesn't land exactly on one. No nearest-match fallback (spec §4.D
/// step 4, deliberate).
pub fn remap_position(line: usize, col: i64, map_lines: &[Vec<Segment>]) -> Option<(i64, i64)> {
    remap_position_with_source_file(line, col, map_lines).map(|(_, src_line, src_col)| (src_line, src_col))
}

/// As `remap_position`, but also returns the matched anchor's `src_file_ix`
/// so callers that compose through a map with more than one entry in
/// `sources` can carry the right one forward instead of assuming 0.
pub fn remap_position_with_source_file(
    line: usize,
    col: i64,
    map_lines: &[Vec<Segment>],
) -> Option<(i64, i64, i64)> {
    let segments = map_lines.get(line)?;
    if segments.is_empty() {
        return None;
    }

    let mut p: i64 = 0;
    let mut last_mapped: Option<(i64, i64, (i64, i64))> = None;

    for segment in segments {
        p += segment.gen_col_delta();
        if let (Some(pos), Some(file_ix)) = (segment.source_position(), segment.source_file_ix()) {
            last_mapped = Some((p, file_ix, pos));
        }
        if p >= col {
            break;
        }
    }

    match last_mapped {
        Some((accumulated_col, file_ix, (src_line, src_col))) if accumulated_col == col => {
            Some((file_ix, src_line, src_col))
        }
        _ => None,
    }
}

/// Find the first generated column whose mapped source position in
/// `map_lines` exactly equals `(src_line, src_col)`. The SRC→TGT direction,
/// built by reusing the same resolved-line data `remap_position` uses.
/// Exact-match only, for the same reason `remap_position` is.
pub fn forward_position(
    src_line: i64,
    src_col: i64,
    map_lines: &[Vec<Segment>],
) -> Option<(usize, i64)> {
    for (line_ix, segments) in map_lines.iter().enumerate() {
        let mut p: i64 = 0;
        for segment in segments {
            p += segment.gen_col_delta();
            if segment.source_position() == Some((src_line, src_col)) {
                return Some((line_ix, p));
            }
        }
    }
    None
}

/// Compose `downstream`'s segments through `upstream`: every mapped/named
/// segment has its source position replaced by its image under `upstream`;
/// segments that don't land exactly on an `upstream` anchor are downgraded
/// to unmapped, keeping their column delta intact.
pub fn compose_lines(upstream: &[Vec<Segment>], downstream: &[Vec<Segment>]) -> Vec<Vec<Segment>> {
    downstream
        .iter()
        .map(|line| {
            let mut p: i64 = 0;
            line.iter()
                .map(|segment| {
                    p += segment.gen_col_delta();
                    match segment {
                        Segment::Unmapped { .. } => *segment,
                        Segment::Mapped {
                            gen_col_delta,
                            src_line,
                            src_col,
                            ..
                        } => match remap_position_with_source_file(
                            usize::try_from(*src_line).unwrap_or(usize::MAX),
                            *src_col,
                            upstream,
                        ) {
                            Some((src_file_ix, line, col)) => Segment::Mapped {
                                gen_col_delta: *gen_col_delta,
                                src_file_ix,
                                src_line: line,
                                src_col: col,
                            },
                            None => segment.downgrade_to_unmapped(),
                        },
                        Segment::Named {
                            gen_col_delta,
                            src_line,
                            src_col,
                            name_ix,
                            ..
                        } => match remap_position_with_source_file(
                            usize::try_from(*src_line).unwrap_or(usize::MAX),
                            *src_col,
                            upstream,
                        ) {
                            Some((src_file_ix, line, col)) => Segment::Named {
                                gen_col_delta: *gen_col_delta,
                                src_file_ix,
                                src_line: line,
                                src_col: col,
                                name_ix: *name_ix,
                            },
                            None => segment.downgrade_to_unmapped(),
                        },
                    }
                })
                .collect()
        })
        .collect()
}

fn inline_map_comment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?m)//[#@] sourceMappingURL=data:application/json;(?:charset=[^;]*;)?base64,([A-Za-z0-9+/]*={0,2})\s*$",
        )
        .expect("static regex is valid")
    })
}

/// Strip a trailing inline source-map comment from `code`, returning the
/// code with the comment removed and the decoded payload, if one was found.
pub fn strip_inline_comment(code: &str) -> (String, Option<String>) {
    let re = inline_map_comment_regex();
    match re.find(code) {
        Some(m) => {
            let payload = re
                .captures(code)
                .and_then(|c| c.get(1))
                .map(|g| g.as_str().to_string());
            let mut stripped = code[..m.start()].to_string();
            while stripped.ends_with('\n') || stripped.ends_with('\r') {
                stripped.pop();
            }
            (stripped, payload)
        }
        None => (code.to_string(), None),
    }
}

/// Build the trailing inline map comment for `doc`. The `//`/`#` are kept as
/// separate fragments so this source file isn't mistaken for one carrying a
/// map.
pub fn render_inline_comment(doc: &MapDocument) -> String {
    use base64::Engine;
    let json = serde_json::to_string(doc).expect("MapDocument always serializes");
    let encoded = base64::engine::general_purpose::STANDARD.encode(json);
    format!(
        "{}{} sourceMappingURL=data:application/json;base64,{encoded}",
        "//", "#"
    )
}

/// Strip `code_with_map_comment`'s trailing map comment (if present), parse
/// and compose it through `upstream_lines` (mutating `upstream_lines` in
/// place to the composed result, per spec §5's one sanctioned in-place
/// mutation of an already-handed-off map), and append a fresh inline comment
/// derived from the updated `upstream_lines`.
pub fn remap(
    code_with_map_comment: &str,
    upstream_lines: &mut Vec<Vec<Segment>>,
    src_path: &str,
    out_path: &str,
) -> Result<String, SourceMapError> {
    let (code, payload) = strip_inline_comment(code_with_map_comment);
    let Some(payload) = payload else {
        return Ok(code);
    };

    let downstream = parse_with_lines(&payload)?;
    let composed = compose_lines(upstream_lines, &downstream.lines);
    *upstream_lines = composed;

    let doc = MapDocument {
        version: 3,
        file: out_path.to_string(),
        sources: vec![src_path.to_string()],
        sources_content: downstream.sources_content,
        names: Vec::new(),
        mappings: render_lines(upstream_lines),
    };

    Ok(format!("{code}\n{}", render_inline_comment(&doc)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map_line(segments: Vec<Segment>) -> Vec<Vec<Segment>> {
        vec![segments]
    }

    #[test]
    fn inexact_remap_rejected() {
        let lines = map_line(vec![
            Segment::Mapped {
                gen_col_delta: 0,
                src_file_ix: 0,
                src_line: 10,
                src_col: 4,
            },
            Segment::Unmapped { gen_col_delta: 5 },
        ]);
        assert_eq!(remap_position(0, 3, &lines), None);
    }

    #[test]
    fn exact_remap_on_anchor() {
        let lines = map_line(vec![Segment::Mapped {
            gen_col_delta: 0,
            src_file_ix: 0,
            src_line: 10,
            src_col: 4,
        }]);
        assert_eq!(remap_position(0, 0, &lines), Some((10, 4)));
    }

    #[test]
    fn compose_scenario() {
        let upstream = map_line(vec![Segment::Mapped {
            gen_col_delta: 0,
            src_file_ix: 0,
            src_line: 5,
            src_col: 2,
        }]);
        let downstream = map_line(vec![Segment::Mapped {
            gen_col_delta: 0,
            src_file_ix: 0,
            src_line: 0,
            src_col: 0,
        }]);

        let composed = compose_lines(&upstream, &downstream);
        assert_eq!(composed[0][0].source_position(), Some((5, 2)));
    }

    #[test]
    fn compose_carries_the_matched_upstream_source_file_index() {
        let upstream = map_line(vec![
            Segment::Mapped {
                gen_col_delta: 0,
                src_file_ix: 0,
                src_line: 5,
                src_col: 2,
            },
            Segment::Mapped {
                gen_col_delta: 10,
                src_file_ix: 1,
                src_line: 7,
                src_col: 0,
            },
        ]);
        let downstream = map_line(vec![
            Segment::Mapped {
                gen_col_delta: 0,
                src_file_ix: 0,
                src_line: 0,
                src_col: 0,
            },
            Segment::Mapped {
                gen_col_delta: 10,
                src_file_ix: 0,
                src_line: 0,
                src_col: 10,
            },
        ]);

        let composed = compose_lines(&upstream, &downstream);
        assert_eq!(composed[0][0], Segment::Mapped {
            gen_col_delta: 0,
            src_file_ix: 0,
            src_line: 5,
            src_col: 2,
        });
        assert_eq!(composed[0][1], Segment::Mapped {
            gen_col_delta: 10,
            src_file_ix: 1,
            src_line: 7,
            src_col: 0,
        });
    }

    #[test]
    fn compose_downgrades_unmatched_segment_preserving_delta() {
        let upstream = map_line(vec![Segment::Mapped {
            gen_col_delta: 0,
            src_file_ix: 0,
            src_line: 5,
            src_col: 2,
        }]);
        let downstream = map_line(vec![Segment::Mapped {
            gen_col_delta: 3,
            src_file_ix: 0,
            src_line: 99,
            src_col: 99,
        }]);

        let composed = compose_lines(&upstream, &downstream);
        assert_eq!(composed[0][0], Segment::Unmapped { gen_col_delta: 3 });
    }

    #[test]
    fn forward_position_finds_exact_anchor() {
        let lines = map_line(vec![Segment::Mapped {
            gen_col_delta: 4,
            src_file_ix: 0,
            src_line: 2,
            src_col: 7,
        }]);
        assert_eq!(forward_position(2, 7, &lines), Some((0, 4)));
        assert_eq!(forward_position(2, 8, &lines), None);
    }

    #[test]
    fn strip_inline_comment_extracts_payload() {
        let code = "let x = 1;\n//# sourceMappingURL=data:application/json;base64,AAAA";
        let (stripped, payload) = strip_inline_comment(code);
        assert_eq!(stripped, "let x = 1;");
        assert_eq!(payload, Some("AAAA".to_string()));
    }

    #[test]
    fn strip_inline_comment_tolerates_charset_param() {
        let code = "x;\n//# sourceMappingURL=data:application/json;charset=utf-8;base64,AAAA";
        let (_, payload) = strip_inline_comment(code);
        assert_eq!(payload, Some("AAAA".to_string()));
    }

    #[test]
    fn strip_inline_comment_absent_is_noop() {
        let code = "let x = 1;";
        let (stripped, payload) = strip_inline_comment(code);
        assert_eq!(stripped, code);
        assert_eq!(payload, None);
    }

    #[test]
    fn parse_with_lines_round_trip() {
        let mut builder = super::super::builder::SourceMapBuilder::new("abc\ndef");
        builder.update("ab", Some(0), 0);
        builder.update("c", Some(2), 0);
        let doc = builder.to_json("a.vela", "a.js");
        let json = serde_json::to_string(&doc).unwrap();
        use base64::Engine;
        let encoded = base64::engine::general_purpose::STANDARD.encode(json);

        let parsed = parse_with_lines(&encoded).unwrap();
        let rendered = render_lines(&parsed.lines);
        let reparsed = parse_with_lines(&base64::engine::general_purpose::STANDARD.encode(
            serde_json::to_string(&MapDocument {
                mappings: rendered,
                ..doc.clone()
            })
            .unwrap(),
        ))
        .unwrap();
        assert_eq!(reparsed.lines, parsed.lines);
    }

    #[test]
    fn parse_with_lines_rejects_bad_arity() {
        let bad_doc = MapDocument {
            version: 3,
            file: "a.js".to_string(),
            sources: vec!["a.vela".to_string()],
            sources_content: vec!["".to_string()],
            names: Vec::new(),
            // three-value segment (arity 3) is invalid
            mappings: format!("{}{}{}", vlq::encode(0), vlq::encode(0), vlq::encode(1)),
        };
        use base64::Engine;
        let encoded = base64::engine::general_purpose::STANDARD
            .encode(serde_json::to_string(&bad_doc).unwrap());
        assert_eq!(
            parse_with_lines(&encoded).unwrap_err(),
            SourceMapError::BadArity(3)
        );
    }
}
