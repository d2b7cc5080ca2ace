//! Incremental source-map construction (component C).

use super::location::LocationTable;
use super::segment::{RunningAbsolutes, Segment};
use super::vlq;
use serde::{Deserialize, Serialize};

/// The standard version-3 source map envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapDocument {
    pub version: u32,
    pub file: String,
    pub sources: Vec<String>,
    #[serde(rename = "sourcesContent")]
    pub sources_content: Vec<String>,
    pub names: Vec<String>,
    pub mappings: String,
}

/// Serialize resolved-form map lines to the standard `mappings` string.
///
/// Maintains running absolute source position across the *entire* mapping
/// (not reset per generated line), matching the wire format's cross-line
/// delta persistence.
pub fn render_lines(lines: &[Vec<Segment>]) -> String {
    let mut last = RunningAbsolutes::default();
    let mut out = String::new();
    for (line_ix, line) in lines.iter().enumerate() {
        if line_ix != 0 {
            out.push(';');
        }
        for (seg_ix, segment) in line.iter().enumerate() {
            if seg_ix != 0 {
                out.push(',');
            }
            for field in segment.to_wire_fields(&mut last) {
                vlq::encode_into(field, &mut out);
            }
        }
    }
    out
}

/// Accumulates per-line resolved segments as transpiled output is emitted.
pub struct SourceMapBuilder {
    source: String,
    location_table: LocationTable,
    lines: Vec<Vec<Segment>>,
    col_offset: i64,
    cur_src_line: i64,
    cur_src_col: i64,
}

impl SourceMapBuilder {
    /// Create a builder for a single transpile of `source`.
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let location_table = LocationTable::build(&source);
        Self {
            source,
            location_table,
            lines: vec![Vec::new()],
            col_offset: 0,
            cur_src_line: 0,
            cur_src_col: 0,
        }
    }

    /// Record one emitted output fragment, optionally tied to an input
    /// source position.
    pub fn update(&mut self, output_chunk: &str, input_pos: Option<usize>, col_offset: i64) {
        if let Some(pos) = input_pos {
            let (line, col) = self.location_table.lookup(pos);
            self.cur_src_line = line as i64;
            self.cur_src_col = col as i64 + col_offset;
        }

        for (i, sub_line) in split_lines(output_chunk).into_iter().enumerate() {
            if i != 0 {
                self.lines.push(Vec::new());
                self.cur_src_line += 1;
                self.col_offset = 0;
                self.cur_src_col = col_offset;
            }

            let segment_col_delta = self.col_offset;
            let src_line_at_start = self.cur_src_line;
            let src_col_at_start = self.cur_src_col;
            let sub_line_len = sub_line.chars().count() as i64;
            self.col_offset += sub_line_len;
            self.cur_src_col += sub_line_len;

            if input_pos.is_some() {
                self.current_line_mut().push(Segment::Mapped {
                    gen_col_delta: segment_col_delta,
                    src_file_ix: 0,
                    src_line: src_line_at_start,
                    src_col: src_col_at_start,
                });
            } else if segment_col_delta != 0 {
                self.current_line_mut().push(Segment::Unmapped {
                    gen_col_delta: segment_col_delta,
                });
            }
        }
    }

    fn current_line_mut(&mut self) -> &mut Vec<Segment> {
        self.lines.last_mut().expect("builder always has a current line")
    }

    /// Serialize to the standard `mappings` string.
    pub fn render(&self) -> String {
        render_lines(&self.lines)
    }

    /// The accumulated resolved-form lines, as handed off to the host.
    pub fn lines(&self) -> &[Vec<Segment>] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<Vec<Segment>> {
        self.lines
    }

    /// Assemble the standard envelope.
    pub fn to_json(&self, src_name: &str, out_name: &str) -> MapDocument {
        MapDocument {
            version: 3,
            file: out_name.to_string(),
            sources: vec![src_name.to_string()],
            sources_content: vec![self.source.clone()],
            names: Vec::new(),
            mappings: self.render(),
        }
    }

    /// The trailing `//# sourceMappingURL=...` comment embedding this map.
    ///
    /// The `//` and `#` are concatenated from two fragments so this source
    /// file itself is never mistaken for one carrying a map.
    pub fn inline_comment(&self, src_name: &str, out_name: &str) -> String {
        let doc = self.to_json(src_name, out_name);
        let json = serde_json::to_string(&doc).expect("MapDocument always serializes");
        use base64::Engine;
        let encoded = base64::engine::general_purpose::STANDARD.encode(json);
        format!("{}{} sourceMappingURL=data:application/json;base64,{encoded}", "//", "#")
    }
}

/// Split on `\r\n`, `\r`, or `\n`, dropping the terminators, matching the
/// location table's line-boundary rule.
fn split_lines(input: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let bytes = input.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\r' => {
                out.push(&input[start..i]);
                if i + 1 < bytes.len() && bytes[i + 1] == b'\n' {
                    i += 2;
                } else {
                    i += 1;
                }
                start = i;
            }
            b'\n' => {
                out.push(&input[start..i]);
                i += 1;
                start = i;
            }
            _ => i += 1,
        }
    }
    out.push(&input[start..]);
    out
}
