//! Shape generation for 2D primitives
//!
//! All shapes are emitted as triangle lists in viewport pixel space.

use glam::Vec2;
use std::f32::consts::TAU;

use super::vertex::Vertex;

/// Axis-aligned filled rectangle
pub fn rect(min: Vec2, max: Vec2, color: [f32; 4]) -> Vec<Vertex> {
    vec![
        Vertex::new(min.x, min.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(max.x, max.y, color),
    ]
}

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    ellipse(center, Vec2::splat(radius), 0.0, color, segments)
}

/// Filled ellipse with semi-axes `radii`, rotated by `angle` radians
pub fn ellipse(
    center: Vec2,
    radii: Vec2,
    angle: f32,
    color: [f32; 4],
    segments: u32,
) -> Vec<Vertex> {
    let rotation = Vec2::from_angle(angle);
    let point = |theta: f32| {
        let local = Vec2::new(radii.x * theta.cos(), radii.y * theta.sin());
        center + rotation.rotate(local)
    };

    let mut vertices = Vec::with_capacity((segments * 3) as usize);
    for i in 0..segments {
        let p1 = point((i as f32 / segments as f32) * TAU);
        let p2 = point(((i + 1) as f32 / segments as f32) * TAU);

        // Triangle from center to edge
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(p1.x, p1.y, color));
        vertices.push(Vertex::new(p2.x, p2.y, color));
    }

    vertices
}

/// Filled circular sector (pie slice) from `theta_start` to `theta_end`
pub fn wedge(
    center: Vec2,
    radius: f32,
    theta_start: f32,
    theta_end: f32,
    color: [f32; 4],
    segments: u32,
) -> Vec<Vertex> {
    let span = theta_end - theta_start;
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = theta_start + (i as f32 / segments as f32) * span;
        let theta2 = theta_start + ((i + 1) as f32 / segments as f32) * span;
        let p1 = center + Vec2::from_angle(theta1) * radius;
        let p2 = center + Vec2::from_angle(theta2) * radius;

        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(p1.x, p1.y, color));
        vertices.push(Vertex::new(p2.x, p2.y, color));
    }

    vertices
}

/// Thick arc band centered on `radius`, `width` pixels across
pub fn arc_stroke(
    center: Vec2,
    radius: f32,
    width: f32,
    theta_start: f32,
    theta_end: f32,
    color: [f32; 4],
    segments: u32,
) -> Vec<Vertex> {
    let span = theta_end - theta_start;
    let inner_r = (radius - width / 2.0).max(0.0);
    let outer_r = radius + width / 2.0;
    let mut vertices = Vec::with_capacity((segments * 6) as usize);

    for i in 0..segments {
        let dir1 = Vec2::from_angle(theta_start + (i as f32 / segments as f32) * span);
        let dir2 = Vec2::from_angle(theta_start + ((i + 1) as f32 / segments as f32) * span);

        let inner1 = center + dir1 * inner_r;
        let outer1 = center + dir1 * outer_r;
        let inner2 = center + dir2 * inner_r;
        let outer2 = center + dir2 * outer_r;

        // Two triangles per segment
        vertices.push(Vertex::new(inner1.x, inner1.y, color));
        vertices.push(Vertex::new(outer1.x, outer1.y, color));
        vertices.push(Vertex::new(inner2.x, inner2.y, color));

        vertices.push(Vertex::new(inner2.x, inner2.y, color));
        vertices.push(Vertex::new(outer1.x, outer1.y, color));
        vertices.push(Vertex::new(outer2.x, outer2.y, color));
    }

    vertices
}

/// Straight line segment drawn as a quad `width` pixels wide
pub fn segment(p1: Vec2, p2: Vec2, width: f32, color: [f32; 4]) -> Vec<Vertex> {
    let dir = (p2 - p1).normalize_or_zero();
    if dir == Vec2::ZERO {
        return Vec::new();
    }
    // Perpendicular for width
    let perp = dir.perp() * (width / 2.0);

    let v1a = p1 + perp;
    let v1b = p1 - perp;
    let v2a = p2 + perp;
    let v2b = p2 - perp;

    vec![
        Vertex::new(v1a.x, v1a.y, color),
        Vertex::new(v1b.x, v1b.y, color),
        Vertex::new(v2a.x, v2a.y, color),
        Vertex::new(v2a.x, v2a.y, color),
        Vertex::new(v1b.x, v1b.y, color),
        Vertex::new(v2b.x, v2b.y, color),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];

    #[test]
    fn test_circle_vertex_count_and_radius() {
        let center = Vec2::new(10.0, 20.0);
        let vertices = circle(center, 5.0, RED, 16);
        assert_eq!(vertices.len(), 48);
        for v in &vertices {
            let d = Vec2::from(v.position).distance(center);
            assert!(d < 5.0 + 1e-3);
        }
    }

    #[test]
    fn test_ellipse_rotation_aligns_major_axis() {
        // Rotated 90°, the major axis points along +y
        let vertices = ellipse(Vec2::ZERO, Vec2::new(4.0, 2.0), FRAC_PI_2, RED, 32);
        let max_y = vertices.iter().map(|v| v.position[1]).fold(f32::MIN, f32::max);
        let max_x = vertices.iter().map(|v| v.position[0]).fold(f32::MIN, f32::max);
        assert!((max_y - 4.0).abs() < 1e-3);
        assert!((max_x - 2.0).abs() < 1e-2);
    }

    #[test]
    fn test_quarter_wedge_stays_in_quadrant() {
        // Goal wedge anchored at a top-right corner, opening down-left
        let corner = Vec2::new(100.0, 0.0);
        let vertices = wedge(corner, 30.0, FRAC_PI_2, PI, RED, 12);
        for v in &vertices {
            assert!(v.position[0] <= 100.0 + 1e-3);
            assert!(v.position[1] >= -1e-3);
        }
    }

    #[test]
    fn test_arc_stroke_band_width() {
        let vertices = arc_stroke(Vec2::ZERO, 50.0, 2.0, 0.0, PI, RED, 8);
        assert_eq!(vertices.len(), 48);
        for v in &vertices {
            let r = Vec2::from(v.position).length();
            assert!((49.0 - 1e-3..=51.0 + 1e-3).contains(&r));
        }
    }

    #[test]
    fn test_degenerate_segment_is_empty() {
        let p = Vec2::new(3.0, 3.0);
        assert!(segment(p, p, 1.0, RED).is_empty());
        assert_eq!(segment(p, Vec2::new(6.0, 3.0), 1.0, RED).len(), 6);
    }
}
