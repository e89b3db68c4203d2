use ndarray::Array2;

use crate::geometry::{Contour, Point};

use super::components::{label_components, LabelMap};

/// Neighbour offsets `(dx, dy)` in counter-clockwise screen order, starting west.
const DIRECTIONS: [(i32, i32); 8] = [
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
];

/// Outer boundaries of all 8-connected foreground regions, in discovery order.
pub fn find_external_contours(mask: &Array2<bool>) -> Vec<Contour> {
    let map = label_components(mask);
    map.components
        .iter()
        .map(|c| trace_outer_border(&map, c.label, c.origin))
        .collect()
}

/// Boundary of the region with the largest enclosed area, or `None` when the
/// mask is entirely background. Ties go to the region discovered first.
pub fn extract_largest(mask: &Array2<bool>) -> Option<Contour> {
    let mut best: Option<(f64, Contour)> = None;
    for contour in find_external_contours(mask) {
        let area = contour.area();
        match &best {
            Some((best_area, _)) if area <= *best_area => {}
            _ => best = Some((area, contour)),
        }
    }
    best.map(|(_, c)| c)
}

/// Follow the outer border of one labelled region starting at its first
/// raster-order pixel.
fn trace_outer_border(map: &LabelMap, label: u32, origin: (usize, usize)) -> Contour {
    let (h, w) = map.labels.dim();
    let inside = |p: Point| -> bool {
        p.x >= 0
            && p.y >= 0
            && (p.x as usize) < w
            && (p.y as usize) < h
            && map.labels[[p.y as usize, p.x as usize]] == label
    };

    let start = Point::new(origin.1 as i32, origin.0 as i32);

    // The last border pixel before returning to `start`: first region pixel
    // met clockwise from the west neighbour.
    let closing = (0..8)
        .map(|k| (8 - k) % 8)
        .map(|k| start.offset(DIRECTIONS[k].0, DIRECTIONS[k].1))
        .find(|&p| inside(p));

    let Some(closing) = closing else {
        return Contour::new(vec![start]);
    };

    let mut points = Vec::new();
    let mut previous = closing;
    let mut current = start;

    loop {
        let back = direction_index(current, previous);
        let next = (1..=8)
            .map(|step| (back + step) % 8)
            .map(|k| current.offset(DIRECTIONS[k].0, DIRECTIONS[k].1))
            .find(|&p| inside(p))
            .unwrap_or(previous);

        points.push(current);

        if next == start && current == closing {
            break;
        }
        previous = current;
        current = next;
    }

    Contour::new(points)
}

fn direction_index(from: Point, to: Point) -> usize {
    let delta = (to.x - from.x, to.y - from.y);
    DIRECTIONS
        .iter()
        .position(|&d| d == delta)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_mask(h: usize, w: usize, rows: std::ops::Range<usize>, cols: std::ops::Range<usize>) -> Array2<bool> {
        Array2::from_shape_fn((h, w), |(r, c)| rows.contains(&r) && cols.contains(&c))
    }

    #[test]
    fn rectangle_starts_top_left_and_runs_down_first() {
        let mask = rect_mask(10, 10, 2..6, 3..8);
        let contour = extract_largest(&mask).unwrap();
        assert_eq!(contour.points[0], Point::new(3, 2));
        assert_eq!(contour.points[1], Point::new(3, 3));
        // Perimeter pixels of a 5x4 block.
        assert_eq!(contour.len(), 2 * (5 + 4) - 4);
    }

    #[test]
    fn single_pixel_region() {
        let mut mask = Array2::from_elem((5, 5), false);
        mask[[2, 2]] = true;
        let contour = extract_largest(&mask).unwrap();
        assert_eq!(contour.points, vec![Point::new(2, 2)]);
    }

    #[test]
    fn one_pixel_wide_line_is_traced_both_ways() {
        let mask = rect_mask(5, 8, 2..3, 1..6);
        let contour = extract_largest(&mask).unwrap();
        // Out along the line and back again.
        assert_eq!(contour.len(), 8);
        assert_eq!(contour.area(), 0.0);
    }

    #[test]
    fn empty_mask_has_no_contour() {
        let mask = Array2::from_elem((5, 5), false);
        assert!(extract_largest(&mask).is_none());
    }

    #[test]
    fn hole_does_not_affect_outer_border() {
        let mut mask = rect_mask(12, 12, 1..11, 1..11);
        for r in 4..8 {
            for c in 4..8 {
                mask[[r, c]] = false;
            }
        }
        let contour = extract_largest(&mask).unwrap();
        let bbox = contour.bounding_rect().unwrap();
        assert_eq!((bbox.x, bbox.y, bbox.width, bbox.height), (1, 1, 10, 10));
        assert_eq!(contour.area(), 81.0);
    }
}
