use pixel_frame::GridSize;
use thiserror::Error;

pub type LayoutResult<T, E = LayoutError> = Result<T, E>;

/// Reasons a layout or segment table cannot drive the remapper.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("strip layout has a zero dimension: {pixels_per_strip} px/strip, {strips_per_port} strips/port, {ports} ports")]
    EmptyLayout {
        pixels_per_strip: usize,
        strips_per_port: usize,
        ports: usize,
    },

    #[error("grid is {height} rows tall but strips need {pixels_per_strip}")]
    GridTooShort {
        height: usize,
        pixels_per_strip: usize,
    },

    #[error("segment for controller {controller_id} maps {actual} strips, layout has {expected}")]
    TableLength {
        controller_id: u8,
        expected: usize,
        actual: usize,
    },

    #[error("segment for controller {controller_id} reads column {column} of a {width}-column grid")]
    ColumnOutOfRange {
        controller_id: u8,
        column: usize,
        width: usize,
    },

    #[error("at least one segment is required")]
    NoSegments,

    #[error("frame is {actual:?}, mapper expects {expected:?}")]
    GridMismatch { expected: GridSize, actual: GridSize },

    #[error("output buffer holds {actual} bytes, segment needs {expected}")]
    OutputLength { expected: usize, actual: usize },
}
