use crate::models::ContourRegion;
use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};
use imageproc::point::Point;

/// Find the outermost contours of a binary edge map.
/// Nested borders (holes and anything inside them) are skipped.
pub fn find_external_contours(edges: &GrayImage) -> Vec<ContourRegion> {
    find_contours::<i32>(edges)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .filter_map(|c| region_from_points(&c.points))
        .enumerate()
        .map(|(index, region)| ContourRegion { index, ..region })
        .collect()
}

/// Bounding rectangle and enclosed area of a traced border
pub fn region_from_points(points: &[Point<i32>]) -> Option<ContourRegion> {
    let first = points.first()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }

    Some(ContourRegion {
        index: 0,
        min_x: min_x.max(0) as u32,
        min_y: min_y.max(0) as u32,
        max_x: max_x.max(0) as u32,
        max_y: max_y.max(0) as u32,
        area: polygon_area(points),
    })
}

/// Shoelace area of a closed polygon
pub fn polygon_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let twice_area: f64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.x as f64 * b.y as f64 - b.x as f64 * a.y as f64)
        .sum();
    twice_area.abs() / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn rect_points(x0: i32, y0: i32, x1: i32, y1: i32) -> Vec<Point<i32>> {
        vec![
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x1, y1),
            Point::new(x0, y1),
        ]
    }

    #[test]
    fn test_polygon_area_of_rectangle() {
        assert_eq!(polygon_area(&rect_points(0, 0, 40, 25)), 1000.0);
        assert_eq!(polygon_area(&rect_points(0, 0, 1, 1)[..2]), 0.0);
    }

    #[test]
    fn test_region_from_points() {
        let region = region_from_points(&rect_points(5, 7, 14, 26)).unwrap();
        assert_eq!((region.min_x, region.min_y), (5, 7));
        assert_eq!((region.width(), region.height()), (10, 20));
        assert!(region_from_points(&[]).is_none());
    }

    #[test]
    fn test_nested_outline_yields_one_external_contour() {
        let mut edges = GrayImage::new(60, 60);
        // Outer square ring with a smaller ring inside it
        for i in 5..55 {
            for (x, y) in [(i, 5), (i, 54), (5, i), (54, i)] {
                edges.put_pixel(x, y, Luma([255]));
            }
        }
        for i in 20..40 {
            for (x, y) in [(i, 20), (i, 39), (20, i), (39, i)] {
                edges.put_pixel(x, y, Luma([255]));
            }
        }

        let regions = find_external_contours(&edges);
        assert_eq!(regions.len(), 1);
        assert_eq!((regions[0].min_x, regions[0].max_x), (5, 54));
        assert_eq!(regions[0].area, 49.0 * 49.0);
    }
}
