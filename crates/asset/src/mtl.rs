//! MTL material library parser.

use std::{
    collections::HashMap,
    fs::File,
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
};

use crate::error::{AssetError, Result};
use crate::lines::{self, LossyLines};
use crate::texture::TextureData;

/// Phong material as described by one `newmtl` block.
#[derive(Clone, Debug, Default)]
pub struct Material {
    pub name: String,
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub shininess: f32,
    /// `map_Kd`, already resolved against the MTL's directory.
    pub diffuse_texture_path: Option<PathBuf>,
    /// Decoded diffuse map; `None` when absent or when decoding failed.
    pub diffuse_texture: Option<TextureData>,
}

impl Material {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Decode the diffuse map, if any. Failures are logged and leave the material untextured.
    pub fn load_texture(&mut self) {
        let Some(path) = self.diffuse_texture_path.as_ref() else {
            return;
        };
        match TextureData::load(path) {
            Ok(texture) => self.diffuse_texture = Some(texture),
            Err(err) if err.is_recoverable() => {
                log::warn!(
                    "Material '{}': undecodable diffuse texture, continuing without it ({})",
                    self.name,
                    err
                );
                self.diffuse_texture = None;
            }
            Err(err) => {
                log::warn!(
                    "Material '{}': diffuse texture unreadable, continuing without it ({})",
                    self.name,
                    err
                );
                self.diffuse_texture = None;
            }
        }
    }
}

/// Load a material library from disk. `map_Kd` paths resolve next to the file.
pub fn load_mtl_from_path(path: impl AsRef<Path>) -> Result<HashMap<String, Material>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| AssetError::io(path, e))?;
    let base_dir = path.parent().unwrap_or(Path::new(""));
    let source_name = path.display().to_string();
    parse_mtl(BufReader::new(file), &source_name, base_dir)
}

/// Convenience helper to parse an MTL string literal.
pub fn load_mtl_from_str(contents: &str) -> Result<HashMap<String, Material>> {
    parse_mtl(io::Cursor::new(contents), "<string>", Path::new(""))
}

pub fn parse_mtl<R: BufRead>(
    reader: R,
    source_name: &str,
    base_dir: &Path,
) -> Result<HashMap<String, Material>> {
    let mut materials = HashMap::new();
    let mut current: Option<Material> = None;

    for entry in LossyLines::new(reader) {
        let (line_no, line) = entry.map_err(|e| AssetError::io(source_name, e))?;
        let trimmed = lines::content(&line);
        if trimmed.is_empty() {
            continue;
        }

        let (tag, rest) = trimmed
            .split_once(char::is_whitespace)
            .map(|(t, r)| (t, r.trim()))
            .unwrap_or((trimmed, ""));

        if tag == "newmtl" {
            if rest.is_empty() {
                return Err(AssetError::parse(source_name, line_no, "newmtl without a name"));
            }
            if let Some(done) = current.replace(Material::named(rest)) {
                materials.insert(done.name.clone(), done);
            }
            continue;
        }

        let material = match tag {
            "Ka" | "Kd" | "Ks" | "Ns" | "map_Kd" => current.as_mut().ok_or_else(|| {
                AssetError::parse(source_name, line_no, format!("'{tag}' before any newmtl"))
            })?,
            // Ke, Ni, d, illum and friends are not used by the renderer.
            _ => continue,
        };

        match tag {
            "Ka" => material.ambient = parse_rgb(rest, source_name, line_no)?,
            "Kd" => material.diffuse = parse_rgb(rest, source_name, line_no)?,
            "Ks" => material.specular = parse_rgb(rest, source_name, line_no)?,
            "Ns" => {
                material.shininess = rest
                    .split_whitespace()
                    .next()
                    .and_then(|t| t.parse::<f32>().ok())
                    .ok_or_else(|| AssetError::parse(source_name, line_no, "invalid Ns value"))?;
            }
            _ => {
                // map_Kd: options such as `-s 1 1 1` precede the filename.
                let file = rest.split_whitespace().last().ok_or_else(|| {
                    AssetError::parse(source_name, line_no, "map_Kd without a filename")
                })?;
                material.diffuse_texture_path = Some(base_dir.join(file));
            }
        }
    }

    if let Some(done) = current {
        materials.insert(done.name.clone(), done);
    }

    Ok(materials)
}

fn parse_rgb(rest: &str, source_name: &str, line_no: usize) -> Result<[f32; 3]> {
    let mut out = [0.0; 3];
    let mut tokens = rest.split_whitespace();
    for (i, slot) in out.iter_mut().enumerate() {
        let token = tokens.next().ok_or_else(|| {
            AssetError::parse(source_name, line_no, format!("expected 3 colour components, got {i}"))
        })?;
        *slot = token.parse::<f32>().map_err(|_| {
            AssetError::parse(source_name, line_no, format!("invalid colour component '{token}'"))
        })?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BALL_MTL: &str = r#"
        # Blender MTL File
        newmtl Ball1
        Ns 96.078431
        Ka 1.000000 1.000000 1.000000
        Kd 0.640000 0.640000 0.640000
        Ks 0.500000 0.500000 0.500000
        Ke 0.000000 0.000000 0.000000
        Ni 1.000000
        d 1.000000
        illum 2
        map_Kd PoolBalluv1.jpg

        newmtl Felt
        Kd 0.0 0.5 0.1
    "#;

    #[test]
    fn parses_all_materials() {
        let mats = load_mtl_from_str(BALL_MTL).unwrap();
        assert_eq!(mats.len(), 2);

        let ball = &mats["Ball1"];
        assert_eq!(ball.ambient, [1.0, 1.0, 1.0]);
        assert_eq!(ball.diffuse, [0.64, 0.64, 0.64]);
        assert_eq!(ball.specular, [0.5, 0.5, 0.5]);
        assert!((ball.shininess - 96.078431).abs() < 1e-4);
        assert_eq!(
            ball.diffuse_texture_path.as_deref(),
            Some(Path::new("PoolBalluv1.jpg"))
        );
        assert!(ball.diffuse_texture.is_none());

        let felt = &mats["Felt"];
        assert_eq!(felt.diffuse, [0.0, 0.5, 0.1]);
        assert_eq!(felt.shininess, 0.0);
        assert!(felt.diffuse_texture_path.is_none());
    }

    #[test]
    fn first_newmtl_does_not_emit_placeholder() {
        let mats = load_mtl_from_str("newmtl Only\nKd 1 0 0\n").unwrap();
        assert_eq!(mats.len(), 1);
        assert!(!mats.contains_key(""));
    }

    #[test]
    fn texture_path_resolves_against_base_dir() {
        let mats = parse_mtl(
            io::Cursor::new("newmtl M\nmap_Kd -s 1 1 1 tex/ball.png\n"),
            "m.mtl",
            Path::new("assets/balls"),
        )
        .unwrap();
        assert_eq!(
            mats["M"].diffuse_texture_path.as_deref(),
            Some(Path::new("assets/balls/tex/ball.png"))
        );
    }

    #[test]
    fn trailing_comments_and_latin1_bytes_are_tolerated() {
        let src: &[u8] = b"# Material do taco \xe9\nnewmtl Ball1 # first\nKd 1 0 0 # red\nmap_Kd ball.png # uv\n";
        let mats = parse_mtl(src, "latin1.mtl", Path::new("")).unwrap();
        let ball = &mats["Ball1"];
        assert_eq!(ball.diffuse, [1.0, 0.0, 0.0]);
        assert_eq!(ball.diffuse_texture_path.as_deref(), Some(Path::new("ball.png")));
    }

    #[test]
    fn attribute_before_newmtl_is_rejected() {
        let err = load_mtl_from_str("Kd 1 1 1\n").unwrap_err();
        assert!(matches!(err, AssetError::Parse { line: 1, .. }));
    }

    #[test]
    fn short_colour_is_rejected() {
        let err = load_mtl_from_str("newmtl M\nKa 1 1\n").unwrap_err();
        assert!(matches!(err, AssetError::Parse { line: 2, .. }));
    }

    #[test]
    fn missing_texture_leaves_material_untextured() {
        let mut mat = Material::named("M");
        mat.diffuse_texture_path = Some(PathBuf::from("/no/such/texture.png"));
        mat.load_texture();
        assert!(mat.diffuse_texture.is_none());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_mtl_from_path("/no/such/dir/ball.mtl").unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
    }
}
