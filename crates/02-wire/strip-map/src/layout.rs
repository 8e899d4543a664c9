use std::iter::{Chain, Rev, StepBy};
use std::ops::Range;

use pixel_frame::{GridSize, BYTES_PER_PIXEL};
use smallvec::SmallVec;

use crate::error::{LayoutError, LayoutResult};

/// Physical shape of the strips hanging off one controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StripLayout {
    /// LEDs on one strip; also the number of grid rows a strip covers.
    pub pixels_per_strip: usize,
    /// Strips chained on a single controller port.
    pub strips_per_port: usize,
    /// Controller ports carrying data.
    pub ports_in_use: usize,
}

impl StripLayout {
    /// 8 ports, each chaining 4 strips of 57 pixels.
    pub const REFERENCE: StripLayout = StripLayout {
        pixels_per_strip: 57,
        strips_per_port: 4,
        ports_in_use: 8,
    };

    /// Bytes of LED data sent to one port.
    pub const fn port_bytes(&self) -> usize {
        self.pixels_per_strip * self.strips_per_port * BYTES_PER_PIXEL
    }

    /// Bytes in one mapped segment buffer.
    pub const fn segment_len(&self) -> usize {
        self.port_bytes() * self.ports_in_use
    }

    /// Strips fed by one segment table.
    pub const fn strip_count(&self) -> usize {
        self.strips_per_port * self.ports_in_use
    }

    pub fn validate(&self) -> LayoutResult<()> {
        if self.pixels_per_strip == 0 || self.strips_per_port == 0 || self.ports_in_use == 0 {
            return Err(LayoutError::EmptyLayout {
                pixels_per_strip: self.pixels_per_strip,
                strips_per_port: self.strips_per_port,
                ports: self.ports_in_use,
            });
        }
        Ok(())
    }
}

impl Default for StripLayout {
    fn default() -> Self {
        Self::REFERENCE
    }
}

/// Column table for one controller.
///
/// Entry `i` names the grid column feeding strip `i`, counting strips port by
/// port. Columns may repeat or skip; a table only has to match the layout's
/// strip count.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SegmentMap {
    pub controller_id: u8,
    columns: SmallVec<[usize; 32]>,
}

impl SegmentMap {
    pub fn new(controller_id: u8, columns: impl IntoIterator<Item = usize>) -> Self {
        Self {
            controller_id,
            columns: columns.into_iter().collect(),
        }
    }

    /// Strip `i` reads column `i`.
    pub fn identity(controller_id: u8, strips: usize) -> Self {
        Self::new(controller_id, 0..strips)
    }

    pub fn columns(&self) -> &[usize] {
        &self.columns
    }

    pub(crate) fn validate(&self, layout: &StripLayout, grid: GridSize) -> LayoutResult<()> {
        if self.columns.len() != layout.strip_count() {
            return Err(LayoutError::TableLength {
                controller_id: self.controller_id,
                expected: layout.strip_count(),
                actual: self.columns.len(),
            });
        }
        if let Some(&column) = self.columns.iter().find(|&&c| c >= grid.width) {
            return Err(LayoutError::ColumnOutOfRange {
                controller_id: self.controller_id,
                column,
                width: grid.width,
            });
        }
        Ok(())
    }
}

/// Row visiting order for a strip of `pixels` LEDs.
pub type SerpentineRows = Chain<StepBy<Range<usize>>, Rev<StepBy<Range<usize>>>>;

/// Even rows ascending, then odd rows descending.
///
/// Visits every row in `0..pixels` exactly once.
pub fn serpentine_rows(pixels: usize) -> SerpentineRows {
    (0..pixels)
        .step_by(2)
        .chain((1..pixels).step_by(2).rev())
}
