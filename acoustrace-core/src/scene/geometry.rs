//! Procedural scene geometry.

use super::Triangle;
use crate::math::Vec3;

/// Corner indices of the two triangles on each face of a box.
const BOX_FACES: [[usize; 3]; 12] = [
    [0, 1, 2],
    [0, 2, 3],
    [4, 6, 5],
    [4, 7, 6],
    [0, 3, 7],
    [0, 7, 4],
    [1, 5, 6],
    [1, 6, 2],
    [3, 2, 6],
    [3, 6, 7],
    [0, 4, 5],
    [0, 5, 1],
];

/// Axis-aligned box spanning `min..max`, two triangles per face.
pub fn shoebox(min: Vec3, max: Vec3, material: &str) -> Vec<Triangle> {
    let corners = [
        Vec3::new(min.x, min.y, min.z),
        Vec3::new(max.x, min.y, min.z),
        Vec3::new(max.x, max.y, min.z),
        Vec3::new(min.x, max.y, min.z),
        Vec3::new(min.x, min.y, max.z),
        Vec3::new(max.x, min.y, max.z),
        Vec3::new(max.x, max.y, max.z),
        Vec3::new(min.x, max.y, max.z),
    ];

    BOX_FACES
        .iter()
        .map(|&[a, b, c]| Triangle::new(corners[a], corners[b], corners[c], material))
        .collect()
}

/// Box of the given dimensions centered on the origin.
pub fn centered_box(size: Vec3, material: &str) -> Vec<Triangle> {
    shoebox(-size * 0.5, size * 0.5, material)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shoebox_surface_area() {
        let room = shoebox(Vec3::ZERO, Vec3::new(10.0, 8.0, 6.0), "concrete");
        assert_eq!(room.len(), 12);

        let area: f32 = room.iter().map(Triangle::area).sum();
        let expected = 2.0 * (10.0 * 8.0 + 10.0 * 6.0 + 8.0 * 6.0);
        assert!((area - expected).abs() < 1e-3);
        assert!(room.iter().all(|t| !t.is_degenerate()));
        assert!(room.iter().all(|t| t.material == "concrete"));
    }

    #[test]
    fn test_centered_box_bounds() {
        let room = centered_box(Vec3::new(4.0, 2.0, 2.0), "brick");
        let max_x = room
            .iter()
            .flat_map(|t| [t.v0.x, t.v1.x, t.v2.x])
            .fold(f32::MIN, f32::max);
        assert!((max_x - 2.0).abs() < 1e-6);
    }
}
