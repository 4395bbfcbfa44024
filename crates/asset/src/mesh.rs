//! CPU-side mesh representation handed to the renderer.

/// Vertex with position/normal/uv. Values are in object space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl MeshVertex {
    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// Indexed triangle mesh with tightly-packed vertices.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new(vertices: Vec<MeshVertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Unindexed triangle list: every three vertices form one triangle.
    pub fn from_triangle_list(vertices: Vec<MeshVertex>) -> Self {
        let indices = (0..vertices.len() as u32).collect();
        Self { vertices, indices }
    }

    /// Returns `true` if both buffers are non-empty and every index is in range.
    pub fn is_valid(&self) -> bool {
        !self.vertices.is_empty()
            && !self.indices.is_empty()
            && self.indices.len() % 3 == 0
            && self
                .indices
                .iter()
                .all(|&i| (i as usize) < self.vertices.len())
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangle_list_gets_sequential_indices() {
        let data = MeshData::from_triangle_list(vec![MeshVertex::default(); 6]);
        assert_eq!(data.indices, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(data.triangle_count(), 2);
        assert!(data.is_valid());
    }

    #[test]
    fn out_of_range_index_is_invalid() {
        let data = MeshData::new(vec![MeshVertex::default(); 3], vec![0, 1, 3]);
        assert!(!data.is_valid());
    }
}
