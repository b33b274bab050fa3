use approx::assert_relative_eq;
use delve::geometry::{in_circle, orient2d};
use delve::triangulate::{DEFAULT_SUPER_TRIANGLE_SCALE as SCALE, MAX_SUPER_TRIANGLE_SCALE};
use delve::{
    complete_graph_edges, generate, minimum_spanning_edges, total_length, triangulate, CellKind,
    Coord2, DelveError, Edge, GenerationConfig, GenerationResult, Point, SplitPolicy,
};

/// Lower or upper hull chain of points already sorted along x.
fn half_hull<'a>(ordered: impl Iterator<Item = &'a Point>) -> Vec<Point> {
    let mut chain: Vec<Point> = Vec::new();
    for q in ordered {
        while chain.len() >= 2 && orient2d(&chain[chain.len() - 2], &chain[chain.len() - 1], q) <= 0.0 {
            chain.pop();
        }
        chain.push(*q);
    }
    chain.pop();
    chain
}

/// Convex hull corners, counter-clockwise, collinear points dropped.
fn hull(points: &[Point]) -> Vec<Point> {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    let mut corners = half_hull(sorted.iter());
    corners.extend(half_hull(sorted.iter().rev()));
    corners
}

fn on_segment(a: &Point, b: &Point, q: &Point) -> bool {
    orient2d(a, b, q) == 0.0
        && q.x >= a.x.min(b.x)
        && q.x <= a.x.max(b.x)
        && q.y >= a.y.min(b.y)
        && q.y <= a.y.max(b.y)
}

/// Checks that the triangles tile the convex hull of the room centers:
/// equal area, and `2n - 2 - h` triangles for `h` centers on the hull
/// boundary.
fn assert_tiles_hull(result: &GenerationResult) {
    let centers = result.room_centers();
    let corners = hull(&centers);
    if corners.len() < 3 {
        assert!(result.triangles.is_empty());
        return;
    }
    let edges: Vec<(Point, Point)> = (0..corners.len())
        .map(|i| (corners[i], corners[(i + 1) % corners.len()]))
        .collect();
    let hull_area = edges.iter().map(|(a, b)| a.x * b.y - b.x * a.y).sum::<f64>() / 2.0;
    let on_boundary = centers
        .iter()
        .filter(|q| edges.iter().any(|(a, b)| on_segment(a, b, q)))
        .count();

    let area: f64 = result
        .triangles
        .iter()
        .map(|t| t.signed_double_area().abs() / 2.0)
        .sum();
    assert_eq!(area, hull_area, "triangles do not tile the hull");
    assert_eq!(result.triangles.len(), 2 * centers.len() - 2 - on_boundary);
}

#[test]
fn twenty_by_twenty_single_cut() {
    let result = generate(&GenerationConfig::new(20, 20, 1, 42)).unwrap();
    assert_eq!(result.rooms.len(), 2);

    let cut_rows: Vec<i32> = result.cut_cells.iter().map(|c| c.y).collect();
    let cut_cols: Vec<i32> = result.cut_cells.iter().map(|c| c.x).collect();
    let straight = cut_rows.iter().all(|y| *y == cut_rows[0]) || cut_cols.iter().all(|x| *x == cut_cols[0]);
    assert!(straight, "cut is not a single line");

    let area: u64 = result.rooms.iter().map(|r| r.area()).sum();
    assert_eq!(area + result.cut_cells.len() as u64, 400);
    assert!(result.rasterize().cells().iter().all(|c| *c != CellKind::Unassigned));
}

#[test]
fn square_scenario() {
    let points = [
        Point::new(0.0, 0.0),
        Point::new(10.0, 0.0),
        Point::new(0.0, 10.0),
        Point::new(10.0, 10.0),
    ];
    let triangulation = triangulate(&points, SCALE).unwrap();
    assert_eq!(triangulation.len(), 2);

    let edges = triangulation.edges();
    assert_eq!(edges.len(), 5);

    let tree = minimum_spanning_edges(&edges);
    assert_eq!(tree.len(), 3);
    assert!(tree.iter().all(|e| e.length() < 10.5));
    assert_relative_eq!(total_length(&tree), 30.0);
}

#[test]
fn three_point_scenario() {
    let a = Point::new(0.0, 0.0);
    let b = Point::new(4.0, 0.0);
    let c = Point::new(0.0, 3.0);
    let triangulation = triangulate(&[a, b, c], SCALE).unwrap();
    assert_eq!(triangulation.len(), 1);
    assert_eq!(triangulation.edges().len(), 3);

    let tree = minimum_spanning_edges(&triangulation.edges());
    assert_eq!(tree.len(), 2);
    assert!(!tree.contains(&Edge::new(b, c)));
    assert_relative_eq!(total_length(&tree), 7.0);
}

#[test]
fn corridors_are_minimal_over_all_room_pairs() {
    for seed in [3u64, 17, 256, 9001] {
        let result = generate(&GenerationConfig::new(72, 40, 14, seed)).unwrap();
        let optimum = minimum_spanning_edges(&complete_graph_edges(&result.room_centers()));
        assert_eq!(result.spanning_edges.len(), optimum.len());
        assert_relative_eq!(
            result.total_corridor_length(),
            total_length(&optimum),
            epsilon = 1e-9
        );
    }
}

#[test]
fn rooms_are_disjoint_and_nondegenerate() {
    for seed in 0..25u64 {
        let config = GenerationConfig::new(50, 35, 18, seed).with_origin(Coord2::new(-25, -17));
        let result = generate(&config).unwrap();
        for (i, a) in result.rooms.iter().enumerate() {
            assert!(a.width >= 1 && a.height >= 1);
            for b in &result.rooms[i + 1..] {
                assert!(!a.intersects(b));
            }
        }
        for cell in &result.cut_cells {
            assert!(result.rooms.iter().all(|r| !r.contains(*cell)));
        }
    }
}

#[test]
fn triangles_avoid_other_centers() {
    let result = generate(&GenerationConfig::new(64, 64, 24, 5)).unwrap();
    let centers = result.room_centers();
    for t in &result.triangles {
        assert!(t.signed_double_area() > 0.0);
        let [a, b, c] = t.vertices;
        for q in &centers {
            if !t.has_vertex(q) {
                assert!(in_circle(&a, &b, &c, q) <= 0.0, "{q:?} inside circumcircle of {t:?}");
            }
        }
    }
}

#[test]
fn triangles_tile_hull_of_room_centers() {
    for scale in [SCALE, MAX_SUPER_TRIANGLE_SCALE] {
        for seed in 0..60u64 {
            let width = 8 + (seed * 37 % 83) as u32;
            let height = 4 + (seed * 53 % 61) as u32;
            let mut config = GenerationConfig::new(width, height, (seed % 35) as u32, seed);
            config.triangulation.super_triangle_scale = scale;
            assert_tiles_hull(&generate(&config).unwrap());
        }
    }
}

#[test]
fn shallow_wide_layout_keeps_hull_triangles() {
    assert_tiles_hull(&generate(&GenerationConfig::new(32, 13, 22, 22)).unwrap());
}

#[test]
fn large_super_triangle_does_not_overlap_triangles() {
    let mut config = GenerationConfig::new(70, 31, 30, 150);
    config.triangulation.super_triangle_scale = MAX_SUPER_TRIANGLE_SCALE;
    let wide = generate(&config).unwrap();
    assert_tiles_hull(&wide);

    config.triangulation.super_triangle_scale = SCALE;
    let tight = generate(&config).unwrap();
    assert_eq!(wide.triangles.len(), tight.triangles.len());
    assert_relative_eq!(wide.total_corridor_length(), tight.total_corridor_length(), epsilon = 1e-9);

    config.triangulation.super_triangle_scale = 1.0e4;
    assert!(matches!(generate(&config), Err(DelveError::InvalidConfig(_))));
}

#[test]
fn identical_configs_reproduce() {
    let config = GenerationConfig::new(90, 60, 30, 77).with_split_policy(SplitPolicy::Largest);
    let first = generate(&config).unwrap();
    for _ in 0..3 {
        assert_eq!(generate(&config).unwrap(), first);
    }
}
