// Viewport policy for `scrollToBufferRange` requests coming from a preview.

use mdpreview_common::types::{BufferRange, Point};

use crate::host::{Document, ScrollOptions};

/// How the editor viewport should move to reveal a preview's visible range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollPlan {
    /// Scroll so the given buffer position is visible.
    ToBufferPosition(Point),
    /// Scroll the minimum amount to bring the whole range into view, uncentered.
    RangeIntoView(BufferRange),
}

/// Pick a scroll plan for the preview's `[min_row, max_row]`.
///
/// A range touching the first row pins the editor to the top; a range
/// reaching the last two rows pins it to the bottom. Anything else is
/// revealed without centering.
pub fn plan_scroll(min_row: u32, max_row: u32, last_buffer_row: u32) -> ScrollPlan {
    if min_row == 0 {
        ScrollPlan::ToBufferPosition(Point::line_start(0))
    } else if max_row >= last_buffer_row.saturating_sub(1) {
        ScrollPlan::ToBufferPosition(Point::line_start(max_row))
    } else {
        ScrollPlan::RangeIntoView(BufferRange {
            start: Point::line_start(min_row),
            end: Point::line_start(max_row),
        })
    }
}

pub(crate) fn apply_scroll_plan(document: &dyn Document, plan: ScrollPlan) {
    match plan {
        ScrollPlan::ToBufferPosition(position) => document.scroll_to_buffer_position(position),
        ScrollPlan::RangeIntoView(range) => {
            let screen_range = document.screen_range_for_buffer_range(range);
            document.scroll_to_screen_range(screen_range, ScrollOptions { center: false });
        }
    }
}
