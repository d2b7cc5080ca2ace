//! Resolved-form mapping segments shared by the builder and the composer.
//!
//! "Resolved form" per the data model: `gen_col_delta` is a delta within its
//! generated line, while `src_line`/`src_col`/`name_ix` are absolute. Only
//! the wire (serialized) form delta-encodes the latter three, and only
//! across the whole mapping stream.

/// One generated-column anchor, resolved-form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    /// An unmapped span on the generated line.
    Unmapped { gen_col_delta: i64 },
    /// Maps a generated column to an absolute source position.
    Mapped {
        gen_col_delta: i64,
        src_file_ix: i64,
        src_line: i64,
        src_col: i64,
    },
    /// As `Mapped`, plus an interned name index.
    Named {
        gen_col_delta: i64,
        src_file_ix: i64,
        src_line: i64,
        src_col: i64,
        name_ix: i64,
    },
}

impl Segment {
    pub fn gen_col_delta(&self) -> i64 {
        match *self {
            Segment::Unmapped { gen_col_delta }
            | Segment::Mapped { gen_col_delta, .. }
            | Segment::Named { gen_col_delta, .. } => gen_col_delta,
        }
    }

    pub fn is_mapped(&self) -> bool {
        matches!(self, Segment::Mapped { .. } | Segment::Named { .. })
    }

    /// Absolute `(src_line, src_col)` for mapped/named segments.
    pub fn source_position(&self) -> Option<(i64, i64)> {
        match *self {
            Segment::Unmapped { .. } => None,
            Segment::Mapped {
                src_line, src_col, ..
            }
            | Segment::Named {
                src_line, src_col, ..
            } => Some((src_line, src_col)),
        }
    }

    /// Index into the owning map's `sources` array for mapped/named segments.
    pub fn source_file_ix(&self) -> Option<i64> {
        match *self {
            Segment::Unmapped { .. } => None,
            Segment::Mapped { src_file_ix, .. } | Segment::Named { src_file_ix, .. } => {
                Some(src_file_ix)
            }
        }
    }

    /// Downgrade a mapped/named segment to unmapped, preserving its column
    /// delta so later segments on the line keep their correct positions.
    pub fn downgrade_to_unmapped(&self) -> Segment {
        Segment::Unmapped {
            gen_col_delta: self.gen_col_delta(),
        }
    }

    /// Build the raw integer list (arity 1, 4 or 5) as it appears once
    /// delta-encoded onto the wire; `src_file_ix`/`src_line`/`src_col`/
    /// `name_ix` here are already the deltas to emit, not absolutes.
    fn wire_fields(
        gen_col_delta: i64,
        rest: Option<(i64, i64, i64, Option<i64>)>,
    ) -> Vec<i64> {
        match rest {
            None => vec![gen_col_delta],
            Some((src_file_ix, src_line, src_col, None)) => {
                vec![gen_col_delta, src_file_ix, src_line, src_col]
            }
            Some((src_file_ix, src_line, src_col, Some(name_ix))) => {
                vec![gen_col_delta, src_file_ix, src_line, src_col, name_ix]
            }
        }
    }

    pub(crate) fn to_wire_fields(&self, last: &mut RunningAbsolutes) -> Vec<i64> {
        match *self {
            Segment::Unmapped { gen_col_delta } => Self::wire_fields(gen_col_delta, None),
            Segment::Mapped {
                gen_col_delta,
                src_file_ix,
                src_line,
                src_col,
            } => {
                let file_delta = src_file_ix - last.src_file_ix;
                let line_delta = src_line - last.src_line;
                let col_delta = src_col - last.src_col;
                last.src_file_ix = src_file_ix;
                last.src_line = src_line;
                last.src_col = src_col;
                Self::wire_fields(gen_col_delta, Some((file_delta, line_delta, col_delta, None)))
            }
            Segment::Named {
                gen_col_delta,
                src_file_ix,
                src_line,
                src_col,
                name_ix,
            } => {
                let file_delta = src_file_ix - last.src_file_ix;
                let line_delta = src_line - last.src_line;
                let col_delta = src_col - last.src_col;
                let name_delta = name_ix - last.name_ix;
                last.src_file_ix = src_file_ix;
                last.src_line = src_line;
                last.src_col = src_col;
                last.name_ix = name_ix;
                Self::wire_fields(
                    gen_col_delta,
                    Some((file_delta, line_delta, col_delta, Some(name_delta))),
                )
            }
        }
    }
}

/// Running absolute positions maintained across the *entire* mapping while
/// rendering or parsing, per the data model's cross-line persistence rule.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct RunningAbsolutes {
    pub src_file_ix: i64,
    pub src_line: i64,
    pub src_col: i64,
    pub name_ix: i64,
}
