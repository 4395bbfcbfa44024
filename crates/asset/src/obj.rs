//! OBJ parser for triangulated models with MTL materials.
//!
//! Faces are resolved immediately into parallel per-corner arrays
//! (position/uv/normal), so `positions.len() == 3 * face_count` always holds.

use std::{
    collections::HashMap,
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use crate::error::{AssetError, Result};
use crate::lines::{self, LossyLines};
use crate::mesh::{MeshData, MeshVertex};
use crate::mtl::{Material, load_mtl_from_path};

/// Contiguous run of corners drawn with one material (`usemtl`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaterialGroup {
    pub material: Option<String>,
    pub first_vertex: u32,
    pub vertex_count: u32,
}

/// Parsed OBJ model, expanded per triangle corner (no vertex sharing).
#[derive(Clone, Debug, Default)]
pub struct ObjModel {
    pub positions: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub normals: Vec<[f32; 3]>,
    pub groups: Vec<MaterialGroup>,
    pub materials: HashMap<String, Material>,
}

impl ObjModel {
    pub fn face_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Interleave the per-corner arrays into an upload-ready mesh.
    pub fn to_mesh_data(&self) -> MeshData {
        let vertices = self
            .positions
            .iter()
            .zip(&self.normals)
            .zip(&self.uvs)
            .map(|((p, n), uv)| MeshVertex::new(*p, *n, *uv))
            .collect();
        MeshData::from_triangle_list(vertices)
    }

    /// Largest distance of any vertex from the model origin.
    pub fn bounding_radius(&self) -> f32 {
        self.positions
            .iter()
            .map(|[x, y, z]| (x * x + y * y + z * z).sqrt())
            .fold(0.0, f32::max)
    }

    /// Material used by the first group that names a known material.
    pub fn primary_material(&self) -> Option<&Material> {
        self.groups
            .iter()
            .filter_map(|g| g.material.as_deref())
            .find_map(|name| self.materials.get(name))
    }

    /// Decode every material's diffuse map. Decode failures are not fatal.
    pub fn load_textures(&mut self) {
        for material in self.materials.values_mut() {
            material.load_texture();
        }
    }
}

/// Load an OBJ model from disk, including its `mtllib` materials and their textures.
pub fn load_obj_from_path(path: impl AsRef<Path>) -> Result<ObjModel> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| AssetError::io(path, e))?;
    let base_dir = path.parent().unwrap_or(Path::new(""));
    let source_name = path.display().to_string();

    let mut model = load_obj_from_reader(BufReader::new(file), &source_name, Some(base_dir))?;
    model.load_textures();

    log::info!(
        "Loaded {}: {} triangles, radius {:.3}, {} materials",
        source_name,
        model.face_count(),
        model.bounding_radius(),
        model.materials.len()
    );
    Ok(model)
}

/// Parse OBJ text from a reader. Without `base_dir`, `mtllib` lines are skipped.
pub fn load_obj_from_reader<R: BufRead>(
    reader: R,
    source_name: &str,
    base_dir: Option<&Path>,
) -> Result<ObjModel> {
    parse_obj(reader, source_name, base_dir)
}

/// Convenience helper to parse an OBJ string literal.
pub fn load_obj_from_str(contents: &str) -> Result<ObjModel> {
    parse_obj(io::Cursor::new(contents), "<string>", None)
}

fn parse_obj<R: BufRead>(
    reader: R,
    source_name: &str,
    base_dir: Option<&Path>,
) -> Result<ObjModel> {
    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut normals: Vec<[f32; 3]> = Vec::new();
    let mut texcoords: Vec<[f32; 2]> = Vec::new();

    let mut model = ObjModel::default();
    let mut group = MaterialGroup {
        material: None,
        first_vertex: 0,
        vertex_count: 0,
    };

    for entry in LossyLines::new(reader) {
        let (line_no, line) = entry.map_err(|e| AssetError::io(source_name, e))?;
        let trimmed = lines::content(&line);
        if trimmed.is_empty() {
            continue;
        }

        let mut parts = trimmed.split_whitespace();
        let Some(tag) = parts.next() else {
            continue;
        };

        match tag {
            "v" => {
                let x = parse_f32(parts.next(), source_name, line_no, "x coordinate")?;
                let y = parse_f32(parts.next(), source_name, line_no, "y coordinate")?;
                let z = parse_f32(parts.next(), source_name, line_no, "z coordinate")?;
                positions.push([x, y, z]);
            }
            "vt" => {
                let u = parse_f32(parts.next(), source_name, line_no, "u coordinate")?;
                let v = parse_f32(parts.next(), source_name, line_no, "v coordinate")?;
                texcoords.push([u, v]);
            }
            "vn" => {
                let nx = parse_f32(parts.next(), source_name, line_no, "nx coordinate")?;
                let ny = parse_f32(parts.next(), source_name, line_no, "ny coordinate")?;
                let nz = parse_f32(parts.next(), source_name, line_no, "nz coordinate")?;
                normals.push([nx, ny, nz]);
            }
            "f" => {
                let corners: Vec<&str> = parts.collect();
                if corners.len() != 3 {
                    return Err(AssetError::parse(
                        source_name,
                        line_no,
                        format!("face has {} vertices, only triangles are supported", corners.len()),
                    ));
                }

                let mut resolved = [(0usize, None, None); 3];
                for (slot, token) in resolved.iter_mut().zip(&corners) {
                    *slot = parse_face_vertex(
                        token,
                        positions.len(),
                        texcoords.len(),
                        normals.len(),
                        source_name,
                        line_no,
                    )?;
                }

                let flat_normal = face_normal(
                    positions[resolved[0].0],
                    positions[resolved[1].0],
                    positions[resolved[2].0],
                );
                for (vi, vti, vni) in resolved {
                    model.positions.push(positions[vi]);
                    model
                        .uvs
                        .push(vti.map(|i| texcoords[i]).unwrap_or([0.0, 0.0]));
                    model
                        .normals
                        .push(vni.map(|i| normals[i]).unwrap_or(flat_normal));
                }
                group.vertex_count += 3;
            }
            "mtllib" => {
                let name = parts.next().ok_or_else(|| {
                    AssetError::parse(source_name, line_no, "mtllib without a filename")
                })?;
                match base_dir {
                    Some(dir) => model.materials.extend(load_mtl_from_path(dir.join(name))?),
                    None => log::debug!("{source_name}: skipping mtllib '{name}' (no base dir)"),
                }
            }
            "usemtl" => {
                let name = parts.next().ok_or_else(|| {
                    AssetError::parse(source_name, line_no, "usemtl without a name")
                })?;
                let first_vertex = group.first_vertex + group.vertex_count;
                let finished = std::mem::replace(
                    &mut group,
                    MaterialGroup {
                        material: Some(name.to_owned()),
                        first_vertex,
                        vertex_count: 0,
                    },
                );
                if finished.vertex_count > 0 {
                    model.groups.push(finished);
                }
            }
            _ => {
                // Ignore other directives (o/g/s/etc.)
            }
        }
    }

    if group.vertex_count > 0 {
        model.groups.push(group);
    }

    if model.positions.is_empty() {
        return Err(AssetError::Parse {
            source_name: source_name.to_owned(),
            line: 0,
            message: "OBJ contained no triangles".into(),
        });
    }

    for name in model.groups.iter().filter_map(|g| g.material.as_ref()) {
        if base_dir.is_some() && !model.materials.contains_key(name) {
            log::warn!("{source_name}: usemtl '{name}' not found in any material library");
        }
    }

    Ok(model)
}

fn parse_f32(value: Option<&str>, source_name: &str, line_no: usize, what: &str) -> Result<f32> {
    let token =
        value.ok_or_else(|| AssetError::parse(source_name, line_no, format!("missing {what}")))?;
    token
        .parse::<f32>()
        .map_err(|_| AssetError::parse(source_name, line_no, format!("invalid {what} '{token}'")))
}

fn parse_face_vertex(
    token: &str,
    pos_count: usize,
    tex_count: usize,
    norm_count: usize,
    source_name: &str,
    line_no: usize,
) -> Result<(usize, Option<usize>, Option<usize>)> {
    let mut split = token.split('/');
    let pos = split.next().unwrap_or_default();
    let pos_idx = resolve_index(pos, pos_count, source_name, line_no)?;

    let tex_idx = match split.next() {
        Some(value) if !value.is_empty() => {
            Some(resolve_index(value, tex_count, source_name, line_no)?)
        }
        _ => None,
    };

    let norm_idx = match split.next() {
        Some(value) if !value.is_empty() => {
            Some(resolve_index(value, norm_count, source_name, line_no)?)
        }
        _ => None,
    };

    if split.next().is_some() {
        return Err(AssetError::parse(
            source_name,
            line_no,
            format!("malformed face element '{token}'"),
        ));
    }

    Ok((pos_idx, tex_idx, norm_idx))
}

fn resolve_index(token: &str, len: usize, source_name: &str, line_no: usize) -> Result<usize> {
    let raw = token.parse::<i64>().map_err(|_| {
        AssetError::parse(source_name, line_no, format!("invalid index '{token}'"))
    })?;
    if raw == 0 {
        return Err(AssetError::parse(
            source_name,
            line_no,
            "OBJ indices are 1-based; found 0",
        ));
    }

    let idx = if raw > 0 { raw - 1 } else { len as i64 + raw };

    if idx < 0 || idx as usize >= len {
        return Err(AssetError::parse(
            source_name,
            line_no,
            format!("index {raw} resolved out of bounds (len={len})"),
        ));
    }

    Ok(idx as usize)
}

fn face_normal(a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> [f32; 3] {
    let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
    let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
    let n = [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ];
    let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
    if len > f32::EPSILON {
        [n[0] / len, n[1] / len, n[2] / len]
    } else {
        [0.0, 1.0, 0.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = r#"
        # two triangles sharing an edge
        v 0.0 0.0 0.0
        v 1.0 0.0 0.0
        v 1.0 1.0 0.0
        v 0.0 1.0 0.0
        vt 0.0 0.0
        vt 1.0 0.0
        vt 1.0 1.0
        vt 0.0 1.0
        vn 0.0 0.0 1.0
        usemtl Ball1
        f 1/1/1 2/2/1 3/3/1
        f 1/1/1 3/3/1 4/4/1
    "#;

    #[test]
    fn corners_are_expanded_per_face() {
        let model = load_obj_from_str(QUAD).expect("parse quad");
        assert_eq!(model.face_count(), 2);
        assert_eq!(model.positions.len(), 6);
        assert_eq!(model.uvs.len(), 6);
        assert_eq!(model.normals.len(), 6);
        // Shared corners are duplicated, not deduplicated.
        assert_eq!(model.positions[0], model.positions[3]);
        assert_eq!(model.positions[2], [1.0, 1.0, 0.0]);
        assert_eq!(model.uvs[5], [0.0, 1.0]);
        assert!(model.normals.iter().all(|n| *n == [0.0, 0.0, 1.0]));
    }

    #[test]
    fn usemtl_splits_groups() {
        let src = r#"
            v 0 0 0
            v 1 0 0
            v 0 1 0
            f 1 2 3
            usemtl Red
            f 1 2 3
            f 3 2 1
            usemtl Empty
            usemtl Blue
            f 1 2 3
        "#;
        let model = load_obj_from_str(src).unwrap();
        let groups: Vec<_> = model
            .groups
            .iter()
            .map(|g| (g.material.as_deref(), g.first_vertex, g.vertex_count))
            .collect();
        assert_eq!(
            groups,
            vec![(None, 0, 3), (Some("Red"), 3, 6), (Some("Blue"), 9, 3)]
        );
    }

    #[test]
    fn quad_face_is_rejected() {
        let src = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
        let err = load_obj_from_str(src).unwrap_err();
        assert!(matches!(err, AssetError::Parse { line: 5, .. }), "{err}");
    }

    #[test]
    fn zero_index_is_rejected() {
        let err = load_obj_from_str("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 1 2\n").unwrap_err();
        assert!(matches!(err, AssetError::Parse { line: 4, .. }));
    }

    #[test]
    fn out_of_range_uv_index_is_rejected() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nf 1/1 2/2 3/1\n";
        let err = load_obj_from_str(src).unwrap_err();
        assert!(err.to_string().contains("out of bounds"), "{err}");
    }

    #[test]
    fn negative_indices_are_relative() {
        let model = load_obj_from_str("v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n").unwrap();
        assert_eq!(model.positions, vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
    }

    #[test]
    fn missing_normals_fall_back_to_face_normal() {
        let model = load_obj_from_str("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        assert_eq!(model.normals[0], [0.0, 0.0, 1.0]);
        assert_eq!(model.uvs[1], [0.0, 0.0]);
    }

    #[test]
    fn inline_comment_after_face_is_ignored() {
        let model = load_obj_from_str("v 0 0 0\nv 1 0 0 # x axis\nv 0 1 0\nf 1 2 3 # tri\n").unwrap();
        assert_eq!(model.face_count(), 1);
        assert_eq!(model.positions[1], [1.0, 0.0, 0.0]);
    }

    #[test]
    fn latin1_comment_does_not_break_loading() {
        let src: &[u8] = b"# bola de bilhar caf\xe9\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let model = load_obj_from_reader(src, "latin1.obj", None).unwrap();
        assert_eq!(model.face_count(), 1);
    }

    #[test]
    fn position_normal_corners_default_uv() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 -1\nvn 1 0 0\nf 1//2 2//2 3//1\n";
        let model = load_obj_from_str(src).unwrap();
        assert!(model.uvs.iter().all(|uv| *uv == [0.0, 0.0]));
        assert_eq!(model.normals[0], [1.0, 0.0, 0.0]);
        assert_eq!(model.normals[1], [1.0, 0.0, 0.0]);
        assert_eq!(model.normals[2], [0.0, 0.0, -1.0]);
    }

    #[test]
    fn empty_model_is_an_error() {
        let err = load_obj_from_str("v 0 0 0\n# nothing else\n").unwrap_err();
        assert!(matches!(err, AssetError::Parse { .. }));
    }

    #[test]
    fn bad_coordinate_is_rejected() {
        let err = load_obj_from_str("v 0 zero 0\n").unwrap_err();
        assert!(matches!(err, AssetError::Parse { line: 1, .. }));
    }

    #[test]
    fn mesh_data_matches_corner_count() {
        let model = load_obj_from_str(QUAD).unwrap();
        let mesh = model.to_mesh_data();
        assert_eq!(mesh.vertices.len(), 6);
        assert_eq!(mesh.triangle_count(), 2);
        assert!(mesh.is_valid());
        assert!((model.bounding_radius() - 2f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_obj_from_path("/no/such/dir/Ball1.obj").unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
    }

    #[test]
    fn mtllib_resolves_next_to_obj() {
        let dir = std::env::temp_dir().join(format!("asset-obj-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("ball.mtl"),
            "newmtl Ball1\nKd 1 0 0\nNs 32\nmap_Kd missing.png\n",
        )
        .unwrap();
        std::fs::write(
            dir.join("ball.obj"),
            format!("mtllib ball.mtl\n{QUAD}"),
        )
        .unwrap();

        let model = load_obj_from_path(dir.join("ball.obj"));
        std::fs::remove_dir_all(&dir).ok();

        let model = model.expect("missing texture must not be fatal");
        let material = model.primary_material().expect("Ball1 material");
        assert_eq!(material.diffuse, [1.0, 0.0, 0.0]);
        assert_eq!(material.shininess, 32.0);
        assert!(material.diffuse_texture.is_none());
    }

    #[test]
    fn missing_mtllib_is_fatal() {
        let dir = std::env::temp_dir().join(format!("asset-obj-nomtl-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("ball.obj"), format!("mtllib nope.mtl\n{QUAD}")).unwrap();

        let err = load_obj_from_path(dir.join("ball.obj")).unwrap_err();
        std::fs::remove_dir_all(&dir).ok();
        assert!(matches!(err, AssetError::Io { .. }));
    }
}
