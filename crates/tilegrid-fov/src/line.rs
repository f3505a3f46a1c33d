//! Discrete lines between tiles.

use tilegrid_core::Point;

/// Bresenham line from `from` to `to`, both endpoints included.
///
/// The walk always starts at `from`, so `line(a, b)` and `line(b, a)` may
/// pick different tiles when the line passes exactly between two of them.
pub fn bresenham_line(from: Point, to: Point) -> Vec<Point> {
    let mut buf = Vec::new();
    bresenham_into(from, to, &mut buf);
    buf
}

/// Like [`bresenham_line`], appending into `buf` after clearing it.
pub fn bresenham_into(from: Point, to: Point, buf: &mut Vec<Point>) {
    buf.clear();
    let dx = (to.x - from.x).abs();
    let dy = -(to.y - from.y).abs();
    let sx = if from.x < to.x { 1 } else { -1 };
    let sy = if from.y < to.y { 1 } else { -1 };
    let mut err = dx + dy;
    let mut p = from;
    loop {
        buf.push(p);
        if p == to {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            p.x += sx;
        }
        if e2 <= dx {
            err += dx;
            p.y += sy;
        }
    }
}
