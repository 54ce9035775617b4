use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};
use imageproc::point::Point;

/// A traced region boundary with its enclosed area.
#[derive(Debug, Clone)]
pub struct LevelContour {
    /// Compressed boundary: only the corners of straight runs are kept.
    pub points: Vec<Point<i32>>,
    pub is_hole: bool,
    pub parent: Option<usize>,
    pub area: f64,
}

impl LevelContour {
    pub fn new(points: Vec<Point<i32>>, is_hole: bool, parent: Option<usize>) -> Self {
        let area = contour_area(&points);
        Self {
            points,
            is_hole,
            parent,
            area,
        }
    }
}

/// Trace outer borders and holes of every foreground region in `mask`.
///
/// Contours come back in discovery (raster) order with parent links intact,
/// in `mask` coordinates.
pub fn extract_contours(mask: &GrayImage) -> Vec<LevelContour> {
    find_contours::<i32>(&pad_with_background(mask))
        .into_iter()
        .map(|c| {
            let points: Vec<Point<i32>> = c
                .points
                .iter()
                .map(|p| Point::new(p.x - 1, p.y - 1))
                .collect();
            LevelContour::new(
                compress_chain(&points),
                c.border_type == BorderType::Hole,
                c.parent,
            )
        })
        .collect()
}

/// Copy of `mask` inside a 1 px background frame. `find_contours` never
/// starts a border in column 0, so regions spanning the full width would
/// otherwise go untraced.
fn pad_with_background(mask: &GrayImage) -> GrayImage {
    let (width, height) = mask.dimensions();
    let mut padded = GrayImage::new(width + 2, height + 2);
    for (x, y, p) in mask.enumerate_pixels() {
        padded.put_pixel(x + 1, y + 1, *p);
    }
    padded
}

/// Collapse straight horizontal, vertical and diagonal runs of a closed
/// boundary to their endpoints.
pub fn compress_chain(points: &[Point<i32>]) -> Vec<Point<i32>> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let step = |a: Point<i32>, b: Point<i32>| ((b.x - a.x).signum(), (b.y - a.y).signum());

    let compressed: Vec<Point<i32>> = (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let cur = points[i];
            let next = points[(i + 1) % n];
            step(prev, cur) != step(cur, next)
        })
        .map(|i| points[i])
        .collect();

    if compressed.is_empty() {
        points.to_vec()
    } else {
        compressed
    }
}

/// Shoelace area of the closed polygon through `points`.
pub fn contour_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let twice: i64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64)
        .sum();
    twice.abs() as f64 / 2.0
}

/// Largest first; equal areas keep their discovery order.
pub fn sort_by_area_desc(contours: &mut [LevelContour]) {
    contours.sort_by(|a, b| b.area.total_cmp(&a.area));
}

/// Area of the largest contour, 0 when there are none.
pub fn largest_area(contours: &[LevelContour]) -> f64 {
    contours.first().map(|c| c.area).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn square(x0: i32, y0: i32, side: i32) -> Vec<Point<i32>> {
        vec![
            Point::new(x0, y0),
            Point::new(x0, y0 + side),
            Point::new(x0 + side, y0 + side),
            Point::new(x0 + side, y0),
        ]
    }

    fn fill(mask: &mut GrayImage, x0: u32, y0: u32, w: u32, h: u32) {
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
    }

    #[test]
    fn shoelace_area() {
        assert_eq!(contour_area(&square(0, 0, 4)), 16.0);
        let triangle = [Point::new(0, 0), Point::new(4, 0), Point::new(0, 3)];
        assert_eq!(contour_area(&triangle), 6.0);
        assert_eq!(contour_area(&[Point::new(1, 1), Point::new(2, 2)]), 0.0);
    }

    #[test]
    fn compress_keeps_only_corners() {
        let chain: Vec<Point<i32>> = vec![
            Point::new(0, 0),
            Point::new(1, 0),
            Point::new(2, 0),
            Point::new(2, 1),
            Point::new(2, 2),
            Point::new(1, 2),
            Point::new(0, 2),
            Point::new(0, 1),
        ];
        let compressed = compress_chain(&chain);
        assert_eq!(
            compressed,
            vec![
                Point::new(0, 0),
                Point::new(2, 0),
                Point::new(2, 2),
                Point::new(0, 2)
            ]
        );
        assert_eq!(contour_area(&compressed), contour_area(&chain));
    }

    #[test]
    fn filled_block_traces_pixel_centres() {
        let mut mask = GrayImage::new(20, 20);
        fill(&mut mask, 5, 5, 6, 4);
        let contours = extract_contours(&mask);
        assert_eq!(contours.len(), 1);
        assert!(!contours[0].is_hole);
        assert_eq!(contours[0].points.len(), 4);
        assert_eq!(contours[0].area, 15.0);
    }

    #[test]
    fn ring_yields_outer_and_hole() {
        let mut mask = GrayImage::new(20, 20);
        fill(&mut mask, 2, 2, 10, 10);
        for y in 5..9 {
            for x in 5..9 {
                mask.put_pixel(x, y, Luma([0]));
            }
        }
        let mut contours = extract_contours(&mask);
        assert_eq!(contours.len(), 2);
        assert!(contours.iter().any(|c| c.is_hole && c.parent == Some(0)));

        sort_by_area_desc(&mut contours);
        assert!(!contours[0].is_hole);
        assert_eq!(largest_area(&contours), 81.0);
    }

    #[test]
    fn full_width_band_is_traced() {
        let mut mask = GrayImage::new(100, 80);
        fill(&mut mask, 0, 60, 100, 20);
        let contours = extract_contours(&mask);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].area, 99.0 * 19.0);
        assert!(contours[0].points.contains(&Point::new(0, 60)));
        assert!(contours[0].points.contains(&Point::new(99, 79)));

        let mut middle = GrayImage::new(100, 80);
        fill(&mut middle, 0, 30, 100, 10);
        assert_eq!(largest_area(&extract_contours(&middle)), 99.0 * 9.0);
    }

    #[test]
    fn full_frame_mask_is_traced() {
        let mask = GrayImage::from_pixel(100, 80, Luma([255]));
        let contours = extract_contours(&mask);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].area, 99.0 * 79.0);
    }

    #[test]
    fn edge_blocks_keep_mask_coordinates() {
        let mut mask = GrayImage::new(100, 80);
        fill(&mut mask, 0, 10, 40, 20);
        let contours = extract_contours(&mask);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].area, 741.0);
        assert!(contours[0].points.contains(&Point::new(0, 10)));
    }

    #[test]
    fn empty_mask_has_no_contours() {
        let mask = GrayImage::new(10, 10);
        let contours = extract_contours(&mask);
        assert!(contours.is_empty());
        assert_eq!(largest_area(&contours), 0.0);
    }

    #[test]
    fn equal_areas_keep_discovery_order() {
        let mut contours = vec![
            LevelContour::new(square(0, 0, 2), false, None),
            LevelContour::new(square(10, 0, 3), false, None),
            LevelContour::new(square(20, 0, 3), false, None),
        ];
        sort_by_area_desc(&mut contours);
        assert_eq!(contours[0].points[0], Point::new(10, 0));
        assert_eq!(contours[1].points[0], Point::new(20, 0));
        assert_eq!(contours[2].area, 4.0);
    }
}
