//! Table slab geometry: an axis-aligned box with per-face normals.

use asset::{MeshData, MeshVertex};
use corelib::table::{TABLE_HALF_HEIGHT, TABLE_HALF_X, TABLE_HALF_Z};

/// 24 vertices (4 per face) and 36 indices, CCW seen from outside.
pub fn table_vertices() -> MeshData {
    let (x, y, z) = (TABLE_HALF_X, TABLE_HALF_HEIGHT, TABLE_HALF_Z);
    let faces: [([[f32; 3]; 4], [f32; 3]); 6] = [
        // front +Z
        ([[-x, -y, z], [x, -y, z], [x, y, z], [-x, y, z]], [0.0, 0.0, 1.0]),
        // back -Z
        ([[x, -y, -z], [-x, -y, -z], [-x, y, -z], [x, y, -z]], [0.0, 0.0, -1.0]),
        // right +X
        ([[x, -y, z], [x, -y, -z], [x, y, -z], [x, y, z]], [1.0, 0.0, 0.0]),
        // left -X
        ([[-x, -y, -z], [-x, -y, z], [-x, y, z], [-x, y, -z]], [-1.0, 0.0, 0.0]),
        // top +Y
        ([[-x, y, z], [x, y, z], [x, y, -z], [-x, y, -z]], [0.0, 1.0, 0.0]),
        // bottom -Y
        ([[-x, -y, -z], [x, -y, -z], [x, -y, z], [-x, -y, z]], [0.0, -1.0, 0.0]),
    ];
    const UVS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (corners, normal) in faces {
        let base = vertices.len() as u32;
        for (pos, uv) in corners.into_iter().zip(UVS) {
            vertices.push(MeshVertex::new(pos, normal, uv));
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    MeshData::new(vertices, indices)
}
