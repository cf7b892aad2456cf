//! Helper functions for layout calculations.

use super::types::ScreenRect;

/// Splits a frame into `count` rows of equal height, top to bottom.
///
/// Each row gets `frame.height / count` (integer division). The last row
/// absorbs the remainder so the stack always ends exactly at the bottom edge.
///
/// # Arguments
///
/// * `frame` - The frame to split
/// * `count` - Number of rows; zero yields an empty list
#[must_use]
pub fn stack_vertical(frame: &ScreenRect, count: usize) -> Vec<ScreenRect> {
    let Ok(rows) = i32::try_from(count) else {
        return Vec::new();
    };
    if rows == 0 {
        return Vec::new();
    }

    let row_height = frame.height / rows;
    (0..rows)
        .map(|idx| {
            let y = frame.y + idx * row_height;
            let height = if idx == rows - 1 { frame.bottom() - y } else { row_height };
            ScreenRect::new(frame.x, y, frame.width, height)
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_vertical_empty() {
        let frame = ScreenRect::new(0, 0, 100, 100);
        assert!(stack_vertical(&frame, 0).is_empty());
    }

    #[test]
    fn test_stack_vertical_single_takes_frame() {
        let frame = ScreenRect::new(10, 20, 300, 200);
        assert_eq!(stack_vertical(&frame, 1), vec![frame]);
    }

    #[test]
    fn test_stack_vertical_last_absorbs_remainder() {
        let frame = ScreenRect::new(0, 0, 50, 100);
        let rows = stack_vertical(&frame, 3);

        let heights: Vec<_> = rows.iter().map(|r| r.height).collect();
        assert_eq!(heights, [33, 33, 34]);
        let ys: Vec<_> = rows.iter().map(|r| r.y).collect();
        assert_eq!(ys, [0, 33, 66]);
    }

    #[test]
    fn test_stack_vertical_preserves_x_and_width() {
        let frame = ScreenRect::new(700, 40, 300, 760);
        for row in stack_vertical(&frame, 4) {
            assert_eq!(row.x, 700);
            assert_eq!(row.width, 300);
        }
    }

    #[test]
    fn test_stack_vertical_covers_frame_exactly() {
        let frame = ScreenRect::new(0, 15, 640, 1081);
        let rows = stack_vertical(&frame, 7);

        assert_eq!(rows[0].y, frame.y);
        assert_eq!(rows.last().map(ScreenRect::bottom), Some(frame.bottom()));
        for pair in rows.windows(2) {
            assert_eq!(pair[0].bottom(), pair[1].y);
        }
    }

    #[test]
    fn test_stack_vertical_more_rows_than_pixels() {
        let frame = ScreenRect::new(0, 0, 10, 2);
        let rows = stack_vertical(&frame, 4);

        let heights: Vec<_> = rows.iter().map(|r| r.height).collect();
        assert_eq!(heights, [0, 0, 0, 2]);
    }
}
