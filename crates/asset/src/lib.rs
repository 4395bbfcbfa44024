//! Asset loading/parsers (models, materials, textures).
//! OBJ models are triangulated and expanded per corner; MTL materials and
//! their diffuse maps are loaded alongside them.

pub mod error;
mod lines;
pub mod mesh;
pub mod mtl;
pub mod obj;
pub mod texture;

pub use error::{AssetError, Result};
pub use mesh::{MeshData, MeshVertex};
pub use mtl::Material;
pub use obj::{ObjModel, load_obj_from_path};
pub use texture::{TextureData, TextureFilter};
