//! Road mesh output: shared vertex streams plus per-surface index lists.

use bytemuck::{Pod, Zeroable};

use crate::core::{Vec2, Vec3};
use crate::math::Aabb;

/// Vertices emitted per centerline point.
pub const VERTICES_PER_POINT: usize = 8;

/// Extra vertices for start + end caps on an open path.
pub const CAP_VERTEX_COUNT: usize = 8;

/// Independently materialed triangle group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SubmeshKind {
    Top,
    Underside,
    Sides,
    StartCap,
    EndCap,
}

impl SubmeshKind {
    /// Material a renderer should bind for this submesh.
    pub fn material_slot(self) -> MaterialSlot {
        match self {
            SubmeshKind::Top => MaterialSlot::Road,
            SubmeshKind::Underside | SubmeshKind::Sides => MaterialSlot::Underside,
            SubmeshKind::StartCap | SubmeshKind::EndCap => MaterialSlot::EndCap,
        }
    }
}

/// Surface materials. A renderer without an end-cap material binds the
/// road material to the caps instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MaterialSlot {
    Road,
    Underside,
    EndCap,
}

impl MaterialSlot {
    pub fn fallback(self) -> Option<MaterialSlot> {
        match self {
            MaterialSlot::EndCap => Some(MaterialSlot::Road),
            _ => None,
        }
    }
}

/// Triangle list for one submesh. Indices address the mesh's shared
/// vertex streams, three per triangle.
#[derive(Clone, Debug, PartialEq)]
pub struct Submesh {
    pub kind: SubmeshKind,
    pub indices: Vec<u32>,
}

impl Submesh {
    pub fn new(kind: SubmeshKind) -> Self {
        Self { kind, indices: Vec::new() }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }
}

/// Interleaved vertex for GPU upload (32 bytes).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct RoadVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Triangulated road strip, rebuilt wholesale on every path change.
#[derive(Clone, Debug, PartialEq)]
pub struct RoadMesh {
    pub vertices: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub normals: Vec<Vec3>,
    /// Top, underside, sides, then start/end caps when present
    pub submeshes: Vec<Submesh>,
    pub bounds: Aabb,
    /// V-axis texture scale for the road material
    pub texture_tiling: f32,
}

impl RoadMesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn submesh(&self, kind: SubmeshKind) -> Option<&Submesh> {
        self.submeshes.iter().find(|s| s.kind == kind)
    }

    /// Triangles in a submesh, 0 when absent.
    pub fn triangle_count(&self, kind: SubmeshKind) -> usize {
        self.submesh(kind).map_or(0, Submesh::triangle_count)
    }

    pub fn total_triangle_count(&self) -> usize {
        self.submeshes.iter().map(Submesh::triangle_count).sum()
    }

    pub fn has_caps(&self) -> bool {
        self.submesh(SubmeshKind::StartCap).is_some()
    }

    /// Material per submesh slot, in submesh order. Without an end-cap
    /// material the caps resolve through [`MaterialSlot::fallback`].
    pub fn material_slots(&self, has_end_cap_material: bool) -> Vec<MaterialSlot> {
        self.submeshes
            .iter()
            .map(|s| {
                let slot = s.kind.material_slot();
                match slot.fallback() {
                    Some(fallback) if !has_end_cap_material => fallback,
                    _ => slot,
                }
            })
            .collect()
    }

    /// Interleave position/normal/uv for upload.
    pub fn interleaved(&self) -> Vec<RoadVertex> {
        self.vertices
            .iter()
            .zip(&self.normals)
            .zip(&self.uvs)
            .map(|((p, n), uv)| RoadVertex {
                position: p.to_array(),
                normal: n.to_array(),
                uv: uv.to_array(),
            })
            .collect()
    }

    /// Raw bytes of [`interleaved`](Self::interleaved) data.
    pub fn vertex_bytes(&self) -> Vec<u8> {
        bytemuck::cast_slice(&self.interleaved()).to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_road_vertex_size() {
        assert_eq!(std::mem::size_of::<RoadVertex>(), 32);
    }

    #[test]
    fn test_material_slots() {
        assert_eq!(SubmeshKind::Top.material_slot(), MaterialSlot::Road);
        assert_eq!(SubmeshKind::Sides.material_slot(), MaterialSlot::Underside);
        assert_eq!(SubmeshKind::EndCap.material_slot(), MaterialSlot::EndCap);
        assert_eq!(MaterialSlot::EndCap.fallback(), Some(MaterialSlot::Road));
        assert_eq!(MaterialSlot::Underside.fallback(), None);
    }

    #[test]
    fn test_submesh_triangles() {
        let submesh = Submesh {
            kind: SubmeshKind::Top,
            indices: vec![0, 1, 2, 2, 1, 3],
        };
        assert_eq!(submesh.triangle_count(), 2);
        let tris: Vec<_> = submesh.triangles().collect();
        assert_eq!(tris, vec![[0, 1, 2], [2, 1, 3]]);
    }
}
