//! Source-map engine: VLQ codec, location table, incremental builder, and
//! the composer/remapper that projects positions across transpile stages.
//!
//! Implements the [Source Map v3 specification](https://sourcemaps.info/spec.html)
//! plus composition across multiple transpilation stages, which the
//! standard doesn't itself define.

pub mod builder;
pub mod composer;
pub mod location;
pub mod segment;
pub mod vlq;

pub use builder::{render_lines, MapDocument, SourceMapBuilder};
pub use composer::{
    compose_lines, forward_position, parse_with_lines, remap, remap_position,
    render_inline_comment, strip_inline_comment, ParsedMap, SourceMapError,
};
pub use location::LocationTable;
pub use segment::Segment;
