use pixel_frame::{GridSize, RawFrame, BYTES_PER_PIXEL};
use smallvec::SmallVec;

use crate::error::{LayoutError, LayoutResult};
use crate::layout::{serpentine_rows, SegmentMap, StripLayout};

/// One controller's bytes in wiring order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MappedSegment {
    pub controller_id: u8,
    pub bytes: Vec<u8>,
}

/// Every segment of one remapped frame; the unit stored in a ring slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MappedFrame {
    segments: SmallVec<[MappedSegment; 4]>,
}

impl MappedFrame {
    pub fn segments(&self) -> &[MappedSegment] {
        &self.segments
    }

    /// True when every byte of every segment is zero.
    pub fn is_blank(&self) -> bool {
        self.segments
            .iter()
            .all(|segment| segment.bytes.iter().all(|&b| b == 0))
    }
}

/// Validated layout and segment tables for a fixed grid size.
#[derive(Clone, Debug)]
pub struct FrameMapper {
    layout: StripLayout,
    grid: GridSize,
    segments: SmallVec<[SegmentMap; 4]>,
}

impl FrameMapper {
    pub fn new(
        layout: StripLayout,
        grid: GridSize,
        segments: impl IntoIterator<Item = SegmentMap>,
    ) -> LayoutResult<Self> {
        layout.validate()?;
        if grid.height < layout.pixels_per_strip {
            return Err(LayoutError::GridTooShort {
                height: grid.height,
                pixels_per_strip: layout.pixels_per_strip,
            });
        }
        let segments: SmallVec<[SegmentMap; 4]> = segments.into_iter().collect();
        if segments.is_empty() {
            return Err(LayoutError::NoSegments);
        }
        for segment in &segments {
            segment.validate(&layout, grid)?;
        }
        Ok(Self {
            layout,
            grid,
            segments,
        })
    }

    pub fn layout(&self) -> StripLayout {
        self.layout
    }

    pub fn grid(&self) -> GridSize {
        self.grid
    }

    pub fn segments(&self) -> &[SegmentMap] {
        &self.segments
    }

    /// Zeroed frame with one correctly sized buffer per segment.
    pub fn blank_frame(&self) -> MappedFrame {
        MappedFrame {
            segments: self
                .segments
                .iter()
                .map(|map| MappedSegment {
                    controller_id: map.controller_id,
                    bytes: vec![0; self.layout.segment_len()],
                })
                .collect(),
        }
    }

    /// Remaps `frame` into `out`, reusing its buffers.
    ///
    /// `out` is reshaped when it was not produced by [`FrameMapper::blank_frame`].
    pub fn remap_into(&self, frame: &RawFrame, out: &mut MappedFrame) -> LayoutResult<()> {
        if frame.size() != self.grid {
            return Err(LayoutError::GridMismatch {
                expected: self.grid,
                actual: frame.size(),
            });
        }
        if out.segments.len() != self.segments.len() {
            *out = self.blank_frame();
        }
        for (map, segment) in self.segments.iter().zip(out.segments.iter_mut()) {
            segment.controller_id = map.controller_id;
            segment.bytes.resize(self.layout.segment_len(), 0);
            fill_segment(frame, &self.layout, map, &mut segment.bytes);
        }
        Ok(())
    }

    pub fn remap(&self, frame: &RawFrame) -> LayoutResult<MappedFrame> {
        let mut out = self.blank_frame();
        self.remap_into(frame, &mut out)?;
        Ok(out)
    }
}

/// Writes one segment of `frame` into `out` in wiring order.
///
/// Checks the table against the frame and the output length first; on error
/// `out` is left untouched.
pub fn remap_segment(
    frame: &RawFrame,
    layout: &StripLayout,
    map: &SegmentMap,
    out: &mut [u8],
) -> LayoutResult<()> {
    layout.validate()?;
    if frame.height() < layout.pixels_per_strip {
        return Err(LayoutError::GridTooShort {
            height: frame.height(),
            pixels_per_strip: layout.pixels_per_strip,
        });
    }
    map.validate(layout, frame.size())?;
    if out.len() != layout.segment_len() {
        return Err(LayoutError::OutputLength {
            expected: layout.segment_len(),
            actual: out.len(),
        });
    }
    fill_segment(frame, layout, map, out);
    Ok(())
}

fn fill_segment(frame: &RawFrame, layout: &StripLayout, map: &SegmentMap, out: &mut [u8]) {
    let strip_bytes = layout.pixels_per_strip * BYTES_PER_PIXEL;
    for (&column, strip) in map.columns().iter().zip(out.chunks_exact_mut(strip_bytes)) {
        let pixels = strip.chunks_exact_mut(BYTES_PER_PIXEL);
        for (row, px) in serpentine_rows(layout.pixels_per_strip).zip(pixels) {
            px.copy_from_slice(frame.rgb(column, row));
        }
    }
}
