//! Road mesh construction

pub mod builder;
pub mod road_mesh;

pub use builder::{MeshSettings, RoadMeshBuilder};
pub use road_mesh::{
    MaterialSlot, RoadMesh, RoadVertex, Submesh, SubmeshKind, CAP_VERTEX_COUNT, VERTICES_PER_POINT,
};
