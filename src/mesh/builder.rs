//! Road strip triangulation.
//!
//! Every centerline point contributes an 8-vertex block:
//!
//! ```text
//! 0 top-left     1 top-right
//! 2 bottom-left  3 bottom-right
//! 4..7           copies of 0..3 for the flat-shaded side walls
//! ```
//!
//! Each adjacent pair of blocks `(i, i + 1)` is stitched with fixed index
//! patterns offset by `8 * i`. Indices wrap modulo the total block vertex
//! count, which is what lets a closed path join its last block to its first.

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result, Vec2, Vec3};
use crate::math::Aabb;
use crate::path::SlidingWindowPath;

use super::road_mesh::{RoadMesh, Submesh, SubmeshKind, CAP_VERTEX_COUNT, VERTICES_PER_POINT};

/// Top quad between block `i` (0, 1) and block `i + 1` (8, 9).
const TOP_TRIANGLES: [usize; 6] = [0, 8, 1, 1, 8, 9];

/// Left wall (4, 6, 12, 14) then right wall (5, 7, 13, 15).
const SIDE_TRIANGLES: [usize; 12] = [4, 6, 14, 12, 4, 14, 5, 15, 7, 13, 15, 5];

/// Mesh shape parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshSettings {
    /// Distance from centerline to each edge
    pub half_width: f32,
    pub thickness: f32,
    /// Use world up instead of the path frame. Only meaningful for paths
    /// that stay in a horizontal plane.
    pub flatten_surface: bool,
    /// Close off the two ends of an open path
    pub add_end_caps: bool,
}

impl Default for MeshSettings {
    fn default() -> Self {
        Self {
            half_width: 0.4,
            thickness: 0.15,
            flatten_surface: false,
            add_end_caps: true,
        }
    }
}

impl MeshSettings {
    pub fn validate(&self) -> Result<()> {
        if !self.half_width.is_finite() || !self.thickness.is_finite() {
            return Err(Error::Configuration("road half width and thickness must be finite".into()));
        }
        Ok(())
    }
}

/// Builds a [`RoadMesh`] from a rebuilt [`SlidingWindowPath`].
#[derive(Clone, Debug, Default)]
pub struct RoadMeshBuilder {
    settings: MeshSettings,
    texture_tiling: Option<f32>,
}

impl RoadMeshBuilder {
    pub fn new(settings: MeshSettings) -> Self {
        Self { settings, texture_tiling: None }
    }

    /// V-axis texture scale recorded on every built mesh (default 1).
    pub fn with_texture_tiling(mut self, tiling: f32) -> Self {
        self.texture_tiling = Some(tiling);
        self
    }

    pub fn settings(&self) -> &MeshSettings {
        &self.settings
    }

    /// Triangulate the whole path.
    pub fn build(&self, path: &SlidingWindowPath) -> Result<RoadMesh> {
        let n = path.len();
        if n < 2 {
            return Err(Error::InsufficientData { required: 2, actual: n });
        }

        let closed = path.is_closed();
        let capped = !closed && self.settings.add_end_caps;
        let base_count = n * VERTICES_PER_POINT;
        let vertex_count = base_count + if capped { CAP_VERTEX_COUNT } else { 0 };
        let pair_count = if closed { n } else { n - 1 };

        let mut vertices = Vec::with_capacity(vertex_count);
        let mut uvs = Vec::with_capacity(vertex_count);
        let mut normals = Vec::with_capacity(vertex_count);
        let mut top = Submesh::new(SubmeshKind::Top);
        let mut underside = Submesh::new(SubmeshKind::Underside);
        let mut sides = Submesh::new(SubmeshKind::Sides);
        top.indices.reserve(pair_count * 6);
        underside.indices.reserve(pair_count * 6);
        sides.indices.reserve(pair_count * 12);

        let half_width = self.settings.half_width.abs();
        let thickness = self.settings.thickness;

        for i in 0..n {
            let point = path.point(i)?;
            let (up, right) = self.frame(path.tangent(i)?, path.normal(i)?);
            let time = path.time(i)?;

            let left_top = point - right * half_width;
            let right_top = point + right * half_width;
            let left_bottom = left_top - up * thickness;
            let right_bottom = right_top - up * thickness;

            let block = [left_top, right_top, left_bottom, right_bottom];
            vertices.extend_from_slice(&block);
            vertices.extend_from_slice(&block);

            for _ in 0..4 {
                uvs.push(Vec2::new(0.0, time));
                uvs.push(Vec2::new(1.0, time));
            }

            normals.extend_from_slice(&[up, up, -up, -up, -right, right, -right, right]);

            if i < n - 1 || closed {
                let offset = i * VERTICES_PER_POINT;
                let wrap = |local: usize| ((offset + local) % base_count) as u32;
                top.indices.extend(TOP_TRIANGLES.iter().map(|&m| wrap(m)));
                // Reversed winding, shifted onto the bottom pair
                underside.indices.extend(TOP_TRIANGLES.iter().rev().map(|&m| wrap(m + 2)));
                sides.indices.extend(SIDE_TRIANGLES.iter().map(|&m| wrap(m)));
            }
        }

        let mut submeshes = vec![top, underside, sides];

        if capped {
            let (start_cap, end_cap) = self.build_caps(path, &mut vertices, &mut uvs, &mut normals)?;
            submeshes.push(start_cap);
            submeshes.push(end_cap);
        }

        let bounds = Aabb::from_points(&vertices).unwrap_or_default();
        log::trace!(
            "road mesh: {} points, {} vertices, closed={}, caps={}",
            n, vertices.len(), closed, capped
        );

        Ok(RoadMesh {
            vertices,
            uvs,
            normals,
            submeshes,
            bounds,
            texture_tiling: self.texture_tiling.unwrap_or(1.0),
        })
    }

    /// Local `(up, right)` at a point.
    fn frame(&self, tangent: Vec3, normal: Vec3) -> (Vec3, Vec3) {
        if self.settings.flatten_surface {
            let up = Vec3::Y;
            let right = up.cross(tangent).normalize_or_zero();
            (up, if right == Vec3::ZERO { normal } else { right })
        } else {
            (tangent.cross(normal), normal)
        }
    }

    /// Append cap vertices copied from the first and last blocks and return
    /// the start/end cap triangle lists.
    fn build_caps(
        &self,
        path: &SlidingWindowPath,
        vertices: &mut Vec<Vec3>,
        uvs: &mut Vec<Vec2>,
        normals: &mut Vec<Vec3>,
    ) -> Result<(Submesh, Submesh)> {
        let n = path.len();
        let start_index = vertices.len();
        let end_index = start_index + 4;
        let last_block = (n - 1) * VERTICES_PER_POINT;
        let cap_uvs = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(1.0, 1.0),
        ];

        // Start cap faces back along the path
        let start_forward = path.tangent(0)?;
        for k in 0..4 {
            vertices.push(vertices[k]);
            normals.push(-start_forward);
        }
        uvs.extend_from_slice(&cap_uvs);

        let end_forward = path.tangent(n - 1)?;
        for k in 0..4 {
            vertices.push(vertices[last_block + k]);
            normals.push(end_forward);
        }
        uvs.extend_from_slice(&cap_uvs);

        let s = start_index as u32;
        let e = end_index as u32;
        let start_cap = Submesh {
            kind: SubmeshKind::StartCap,
            indices: vec![s + 1, s + 2, s, s + 3, s + 2, s + 1],
        };
        let end_cap = Submesh {
            kind: SubmeshKind::EndCap,
            indices: vec![e, e + 2, e + 1, e + 1, e + 2, e + 3],
        };
        Ok((start_cap, end_cap))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(half_width: f32, thickness: f32, caps: bool) -> MeshSettings {
        MeshSettings {
            half_width,
            thickness,
            flatten_surface: false,
            add_end_caps: caps,
        }
    }

    /// Geometric normal of a triangle from its winding.
    fn face_normal(mesh: &RoadMesh, triangle: [u32; 3]) -> Vec3 {
        let [a, b, c] = triangle.map(|i| mesh.vertices[i as usize]);
        (b - a).cross(c - a).normalize_or_zero()
    }

    fn line(n: usize) -> SlidingWindowPath {
        SlidingWindowPath::from_points(n, (0..n).map(|i| Vec3::new(0.0, 0.0, i as f32))).unwrap()
    }

    fn curvy(n: usize) -> SlidingWindowPath {
        let points = (0..n).map(|i| {
            let a = i as f32 * 0.3;
            Vec3::new(a.sin() * 4.0, i as f32 * 0.1, a.cos() * 4.0 + i as f32)
        });
        SlidingWindowPath::from_points(n, points).unwrap()
    }

    fn approx_vec(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_two_point_strip_counts() {
        let path = SlidingWindowPath::from_points(2, [Vec3::ZERO, Vec3::Z]).unwrap();
        let mesh = RoadMeshBuilder::new(settings(1.0, 0.2, false)).build(&path).unwrap();
        assert_eq!(mesh.vertex_count(), 16);
        assert_eq!(mesh.triangle_count(SubmeshKind::Top), 2);
        assert_eq!(mesh.triangle_count(SubmeshKind::Underside), 2);
        assert_eq!(mesh.triangle_count(SubmeshKind::Sides), 4);
        assert_eq!(mesh.submeshes.len(), 3);
        assert!(!mesh.has_caps());
    }

    #[test]
    fn test_two_point_vertex_layout() {
        let path = SlidingWindowPath::from_points(2, [Vec3::ZERO, Vec3::Z]).unwrap();
        let mesh = RoadMeshBuilder::new(settings(1.0, 0.2, false)).build(&path).unwrap();
        assert!(approx_vec(mesh.vertices[0], Vec3::new(-1.0, 0.0, 0.0)));
        assert!(approx_vec(mesh.vertices[1], Vec3::new(1.0, 0.0, 0.0)));
        assert!(approx_vec(mesh.vertices[2], Vec3::new(-1.0, -0.2, 0.0)));
        assert!(approx_vec(mesh.vertices[3], Vec3::new(1.0, -0.2, 0.0)));
        for k in 0..4 {
            assert_eq!(mesh.vertices[k + 4], mesh.vertices[k]);
        }
        assert!(approx_vec(mesh.normals[0], Vec3::Y));
        assert!(approx_vec(mesh.normals[2], -Vec3::Y));
        assert!(approx_vec(mesh.normals[4], -Vec3::X));
        assert!(approx_vec(mesh.normals[5], Vec3::X));
    }

    #[test]
    fn test_counts_scale_with_points() {
        for n in [2usize, 3, 7, 16] {
            let mesh = RoadMeshBuilder::new(settings(0.5, 0.1, false)).build(&curvy(n)).unwrap();
            assert_eq!(mesh.vertex_count(), 8 * n);
            assert_eq!(mesh.uvs.len(), 8 * n);
            assert_eq!(mesh.normals.len(), 8 * n);
            assert_eq!(mesh.triangle_count(SubmeshKind::Top), 2 * (n - 1));
            assert_eq!(mesh.triangle_count(SubmeshKind::Underside), 2 * (n - 1));
            assert_eq!(mesh.triangle_count(SubmeshKind::Sides), 4 * (n - 1));
        }
    }

    #[test]
    fn test_single_point_is_insufficient_data() {
        let path = SlidingWindowPath::from_points(4, [Vec3::ZERO]).unwrap();
        let result = RoadMeshBuilder::default().build(&path);
        assert!(matches!(result, Err(Error::InsufficientData { required: 2, actual: 1 })));
    }

    #[test]
    fn test_stale_path_rejected() {
        let mut path = line(3);
        path.push(Vec3::new(0.0, 0.0, 3.0));
        assert!(matches!(RoadMeshBuilder::default().build(&path), Err(Error::InvalidState(_))));
    }

    #[test]
    fn test_uvs_follow_arc_length() {
        let path = line(5);
        let mesh = RoadMeshBuilder::new(settings(1.0, 0.2, false)).build(&path).unwrap();
        for i in 0..5 {
            let time = path.time(i).unwrap();
            for k in 0..8 {
                let uv = mesh.uvs[i * 8 + k];
                assert_eq!(uv.x, if k % 2 == 0 { 0.0 } else { 1.0 });
                assert!((uv.y - time).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_faces_wind_toward_vertex_normals() {
        let mesh = RoadMeshBuilder::new(settings(1.0, 0.3, true)).build(&line(4)).unwrap();
        for submesh in &mesh.submeshes {
            for tri in submesh.triangles() {
                let face = face_normal(&mesh, tri);
                let vertex = mesh.normals[tri[0] as usize];
                assert!(face.dot(vertex) > 0.99, "{:?} {:?}: face {face:?} vs {vertex:?}", submesh.kind, tri);
            }
        }
    }

    #[test]
    fn test_end_caps() {
        let path = line(4);
        let mesh = RoadMeshBuilder::new(settings(1.0, 0.2, true)).build(&path).unwrap();
        assert_eq!(mesh.vertex_count(), 8 * 4 + 8);
        assert_eq!(mesh.submeshes.len(), 5);
        assert_eq!(mesh.triangle_count(SubmeshKind::StartCap), 2);
        assert_eq!(mesh.triangle_count(SubmeshKind::EndCap), 2);

        let start = 32;
        for k in 0..4 {
            assert_eq!(mesh.vertices[start + k], mesh.vertices[k]);
            assert!(approx_vec(mesh.normals[start + k], -Vec3::Z));
            assert_eq!(mesh.vertices[start + 4 + k], mesh.vertices[24 + k]);
            assert!(approx_vec(mesh.normals[start + 4 + k], Vec3::Z));
        }
        assert_eq!(mesh.uvs[start + 3], Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_closed_path_has_no_caps_and_wraps() {
        let square = [
            Vec3::ZERO,
            Vec3::new(0.0, 0.0, 4.0),
            Vec3::new(4.0, 0.0, 4.0),
            Vec3::new(4.0, 0.0, 0.0),
        ];
        let mut path = SlidingWindowPath::new(4).unwrap();
        path.set_closed(true);
        path.extend(square);
        path.rebuild();

        let n = 4;
        let mesh = RoadMeshBuilder::new(settings(0.5, 0.1, true)).build(&path).unwrap();
        assert_eq!(mesh.vertex_count(), 8 * n);
        assert!(!mesh.has_caps());
        assert_eq!(mesh.triangle_count(SubmeshKind::Top), 2 * n);
        assert_eq!(mesh.triangle_count(SubmeshKind::Underside), 2 * n);
        assert_eq!(mesh.triangle_count(SubmeshKind::Sides), 4 * n);

        for submesh in &mesh.submeshes {
            assert!(submesh.indices.iter().all(|&i| (i as usize) < 8 * n));
        }
        // Last top quad joins the last block to the first
        let last_quad = &mesh.submesh(SubmeshKind::Top).unwrap().indices[18..24];
        assert_eq!(last_quad, &[24, 0, 25, 25, 0, 1]);
    }

    #[test]
    fn test_zero_width_and_thickness_are_degenerate_not_errors() {
        let mesh = RoadMeshBuilder::new(settings(0.0, 0.0, true)).build(&curvy(5)).unwrap();
        assert_eq!(mesh.vertex_count(), 48);
        let tri = mesh.submesh(SubmeshKind::Top).unwrap().triangles().next().unwrap();
        assert_eq!(face_normal(&mesh, tri), Vec3::ZERO);
    }

    #[test]
    fn test_negative_width_uses_magnitude() {
        let path = line(2);
        let a = RoadMeshBuilder::new(settings(-1.0, 0.2, false)).build(&path).unwrap();
        let b = RoadMeshBuilder::new(settings(1.0, 0.2, false)).build(&path).unwrap();
        assert_eq!(a.vertices, b.vertices);
    }

    #[test]
    fn test_flatten_uses_world_up_on_slopes() {
        let path = SlidingWindowPath::from_points(
            3,
            [Vec3::ZERO, Vec3::new(0.0, 1.0, 1.0), Vec3::new(0.0, 2.0, 2.0)],
        )
        .unwrap();

        let flat = MeshSettings { flatten_surface: true, ..settings(1.0, 0.5, false) };
        let mesh = RoadMeshBuilder::new(flat).build(&path).unwrap();
        assert!(approx_vec(mesh.normals[0], Vec3::Y));
        assert!(approx_vec(mesh.vertices[2], Vec3::new(-1.0, -0.5, 0.0)));

        let follow = RoadMeshBuilder::new(settings(1.0, 0.5, false)).build(&path).unwrap();
        let expected_up = Vec3::new(0.0, 1.0, -1.0).normalize();
        assert!(approx_vec(follow.normals[0], expected_up));
    }

    #[test]
    fn test_bounds_and_tiling() {
        let mesh = RoadMeshBuilder::new(settings(1.0, 0.2, false))
            .with_texture_tiling(160.0)
            .build(&line(3))
            .unwrap();
        assert!(approx_vec(mesh.bounds.min, Vec3::new(-1.0, -0.2, 0.0)));
        assert!(approx_vec(mesh.bounds.max, Vec3::new(1.0, 0.0, 2.0)));
        assert_eq!(mesh.texture_tiling, 160.0);
        assert_eq!(mesh.interleaved().len(), mesh.vertex_count());
        assert_eq!(mesh.vertex_bytes().len(), mesh.vertex_count() * 32);
    }

    #[test]
    fn test_material_slots_follow_submeshes() {
        use crate::mesh::MaterialSlot;
        let capped = RoadMeshBuilder::new(settings(1.0, 0.2, true)).build(&line(3)).unwrap();
        assert_eq!(
            capped.material_slots(true),
            vec![
                MaterialSlot::Road,
                MaterialSlot::Underside,
                MaterialSlot::Underside,
                MaterialSlot::EndCap,
                MaterialSlot::EndCap,
            ]
        );
    }

    #[test]
    fn test_caps_fall_back_to_road_material() {
        use crate::mesh::MaterialSlot;
        let capped = RoadMeshBuilder::new(settings(1.0, 0.2, true)).build(&line(3)).unwrap();
        assert_eq!(
            capped.material_slots(false),
            vec![
                MaterialSlot::Road,
                MaterialSlot::Underside,
                MaterialSlot::Underside,
                MaterialSlot::Road,
                MaterialSlot::Road,
            ]
        );

        let uncapped = RoadMeshBuilder::new(settings(1.0, 0.2, false)).build(&line(3)).unwrap();
        assert_eq!(uncapped.material_slots(false), uncapped.material_slots(true));
    }
}
