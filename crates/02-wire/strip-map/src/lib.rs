//! Reorders raw RGB grids into the byte order the LED strips are wired in.
//!
//! Each physical strip hangs from the top of one grid column and runs down and
//! back up again, so a strip's pixels are the column's even rows top to bottom
//! followed by its odd rows bottom to top. Strips are chained per controller
//! port and ports are packed one after another into a segment buffer.
//!
//! * [`StripLayout`] – pixels per strip, strips per port, ports in use.
//! * [`SegmentMap`] – which grid column feeds each strip of one controller.
//! * [`FrameMapper`] – validated layout + segment tables; fills [`MappedFrame`]s.

mod error;
mod layout;
mod mapper;

pub use error::{LayoutError, LayoutResult};
pub use layout::{serpentine_rows, SegmentMap, StripLayout};
pub use mapper::{remap_segment, FrameMapper, MappedFrame, MappedSegment};
