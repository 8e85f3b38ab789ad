//! Format orchestration.
//!
//! Picks a conversion pipeline from the requested target format and the
//! declared kind of each input frame.

use crate::config::{ReshapeOptions, TimeSeriesFormat};
use crate::frame::{validate_all, Frame, FrameKind};
use crate::join::to_wide;
use crate::long::to_long;
use crate::matcher::FirstTimeField;
use crate::multi::expand_by_role;
use crate::naming::FrameNaming;
use crate::Result;

/// Convert `frames` to `format`.
///
/// - `Long`: frames already long pass through, others are flattened.
/// - `Multi`: frames already multi pass through; long frames are split on
///   their string fields; anything else is flattened to long first.
/// - `Wide`: every frame is outer-joined on its first time field. The result
///   holds one frame, or none when nothing could be joined.
///
/// # Errors
///
/// - `Error::LengthMismatch`: an input frame is malformed
pub fn reshape(frames: &[Frame], format: TimeSeriesFormat) -> Result<Vec<Frame>> {
    validate_all(frames)?;
    log::trace!("reshaping {} frames to {format:?}", frames.len());
    match format {
        TimeSeriesFormat::Long => to_long(frames),
        TimeSeriesFormat::Multi => to_multi_frames(frames),
        TimeSeriesFormat::Wide => Ok(to_wide(frames, &FirstTimeField)?.into_iter().collect()),
    }
}

/// [`reshape`] driven by options.
pub fn prepare_time_series(frames: &[Frame], options: &ReshapeOptions) -> Result<Vec<Frame>> {
    reshape(frames, options.format)
}

fn to_multi_frames(frames: &[Frame]) -> Result<Vec<Frame>> {
    let naming = FrameNaming::default();
    let mut out = Vec::new();
    for frame in frames {
        match frame.kind {
            FrameKind::Multi => out.push(frame.clone()),
            FrameKind::Long => out.extend(expand_by_role(frame, &naming)?),
            FrameKind::Wide | FrameKind::Unknown => {
                for long in to_long(std::slice::from_ref(frame))? {
                    out.extend(expand_by_role(&long, &naming)?);
                }
            }
        }
    }
    Ok(out)
}
