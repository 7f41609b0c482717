//! End-to-end properties of heightmap → mesh construction.

use glam::Vec3;
use relief_terrain::{
    ElevationBand, HeightGrid, TerrainError, TerrainMesh, build_indices, index_count,
};

fn grid(width: u32, height: u32, f: impl Fn(u32, u32) -> f32) -> HeightGrid {
    let mut heights = Vec::with_capacity((width * height) as usize);
    for y in 0..height {
        for x in 0..width {
            heights.push(f(x, y));
        }
    }
    HeightGrid::from_heights(width, height, heights).unwrap()
}

#[test]
fn vertex_and_index_counts_for_many_sizes() {
    for (w, h) in [(2, 2), (2, 3), (3, 2), (5, 5), (17, 4), (64, 33)] {
        let mesh = TerrainMesh::build(&grid(w, h, |x, y| (x * 3 + y) as f32)).unwrap();
        assert_eq!(mesh.vertices.len(), (w * h) as usize);
        assert_eq!(mesh.indices.len(), (6 * (w - 1) * (h - 1)) as usize);
        assert_eq!(mesh.indices.len(), index_count(w, h));
    }
}

#[test]
fn triangle_indices_are_distinct_and_in_range() {
    let (w, h) = (9, 7);
    let mesh = TerrainMesh::build(&grid(w, h, |x, y| ((x * y) % 5) as f32)).unwrap();
    for tri in mesh.indices.chunks_exact(3) {
        for &i in tri {
            assert!(i < w * h);
        }
        assert!(tri[0] != tri[1] && tri[1] != tri[2] && tri[0] != tri[2]);
    }
}

#[test]
fn flat_grid_normals_point_straight_up() {
    let mesh = TerrainMesh::build(&grid(6, 4, |_, _| 12.5)).unwrap();
    for v in &mesh.vertices {
        let n = v.normal();
        assert!((n - Vec3::Y).length() < 1e-6, "normal {n:?}");
    }
    assert_eq!(mesh.normal_report().degenerate, 0);
}

#[test]
fn band_boundaries_over_zero_to_hundred() {
    // min 0 and max 100 pinned by the corners.
    let heights = [0.0, 24.0, 25.0, 75.0, 100.0, 60.0];
    let g = HeightGrid::from_heights(3, 2, heights.to_vec()).unwrap();
    let mesh = TerrainMesh::build(&g).unwrap();
    let color = |i: usize| mesh.vertices[i].color;
    assert_eq!(color(1), ElevationBand::Water.color());
    assert_eq!(color(2), ElevationBand::Vegetation.color());
    assert_eq!(color(3), ElevationBand::Snow.color());
    assert_eq!(color(5), ElevationBand::Earth.color());
}

#[test]
fn uniform_height_is_snow_everywhere() {
    let mesh = TerrainMesh::build(&grid(4, 4, |_, _| 50.0)).unwrap();
    assert!(
        mesh.vertices
            .iter()
            .all(|v| v.color == ElevationBand::Snow.color())
    );
}

#[test]
fn rebuilding_is_bit_identical() {
    let g = grid(13, 11, |x, y| ((x * 7 + y * 13) % 51) as f32 * 0.2);
    let a = TerrainMesh::build(&g).unwrap();
    let b = TerrainMesh::build(&g).unwrap();
    assert_eq!(a.vertex_bytes(), b.vertex_bytes());
    assert_eq!(a.indices, b.indices);
}

#[test]
fn peak_vertex_normal_is_area_weighted_sum() {
    // Rows y = 0..3: [0, 0], [0, 100], [0, 0]
    let g = HeightGrid::from_heights(2, 3, vec![0.0, 0.0, 0.0, 100.0, 0.0, 0.0]).unwrap();
    let mesh = TerrainMesh::build(&g).unwrap();
    assert_eq!(mesh.vertices.len(), 6);
    assert_eq!(mesh.indices.len(), 12);

    let peak = 1 + 2; // (x=1, y=1)
    let mut expected = Vec3::ZERO;
    for tri in mesh.indices.chunks_exact(3) {
        if !tri.contains(&peak) {
            continue;
        }
        let p = |i: u32| mesh.vertices[i as usize].position();
        let (p1, p2, p3) = (p(tri[0]), p(tri[1]), p(tri[2]));
        expected += (p1 - p3).cross(p1 - p2);
    }
    let expected = expected.normalize();
    let actual = mesh.vertices[peak as usize].normal();
    assert!((actual - expected).length() < 1e-5, "{actual:?} vs {expected:?}");
    assert!((actual.length() - 1.0).abs() < 1e-5);
    // The peak leans away from its lower neighbours but still faces up.
    assert!(actual.y > 0.0);
}

#[test]
fn heightmap_png_round_trips_through_loader() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hm.png");
    let mut img = image::RgbImage::new(3, 2);
    for (x, y, px) in img.enumerate_pixels_mut() {
        *px = image::Rgb([(x * 50 + y * 100) as u8, 7, 7]);
    }
    img.save(&path).unwrap();

    let g = HeightGrid::open(&path).unwrap();
    assert_eq!((g.width(), g.height()), (3, 2));
    assert_eq!(g.get(2, 1), Some(200.0 / 5.0));
    let mesh = TerrainMesh::build(&g).unwrap();
    assert_eq!(mesh.triangle_count(), 4);
}

#[test]
fn undersized_inputs_fail_before_building() {
    assert!(matches!(
        HeightGrid::from_red_samples(1, 4, &[0; 4]),
        Err(TerrainError::InvalidTerrainDimensions { width: 1, height: 4 })
    ));
    assert!(matches!(
        build_indices(3, 1),
        Err(TerrainError::InvalidTerrainDimensions { .. })
    ));
}
