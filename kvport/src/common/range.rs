use std::ops::Range;

/// Start and stop of a full-range read, `0..=-1`.
pub const FULL_RANGE: (i64, i64) = (0, -1);

/// Resolves Redis-style inclusive `start`/`stop` indices against a sequence of
/// `len` elements.
///
/// Negative indices count from the end (`-1` is the last element). Indices past
/// either end are clamped. Returns `None` when the window selects nothing.
pub fn resolve_range(len: usize, start: i64, stop: i64) -> Option<Range<usize>> {
    if len == 0 {
        return None;
    }

    let len = len as i64;
    let mut start = if start < 0 { len + start } else { start };
    let mut stop = if stop < 0 { len + stop } else { stop };

    if start < 0 {
        start = 0;
    }
    if stop >= len {
        stop = len - 1;
    }
    if start > stop || start >= len {
        return None;
    }

    Some(start as usize..(stop + 1) as usize)
}
