//! Plain-old-data layouts shared with `shaders/phong.wgsl`.

use bytemuck::{Pod, Zeroable};
use corelib::lights::{self, LightKind, Lights};
use corelib::{Mat4, Vec3};
use glam::Mat3;
use wgpu::VertexBufferLayout;

/// Vertex: position + normal + uv.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct GpuVertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl GpuVertex {
    pub const LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
        array_stride: std::mem::size_of::<GpuVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2],
    };
}

impl From<&asset::MeshVertex> for GpuVertex {
    fn from(v: &asset::MeshVertex) -> Self {
        Self {
            pos: v.position,
            normal: v.normal,
            uv: v.uv,
        }
    }
}

#[inline]
fn v4(v: Vec3, w: f32) -> [f32; 4] {
    [v.x, v.y, v.z, w]
}

/// Surface response of one draw (Phong coefficients).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceMaterial {
    pub emissive: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub shininess: f32,
}

impl SurfaceMaterial {
    /// Green felt for the table slab.
    pub const FELT: SurfaceMaterial = SurfaceMaterial {
        emissive: Vec3::new(0.0, 0.06, 0.02),
        ambient: Vec3::new(0.0, 0.35, 0.12),
        diffuse: Vec3::new(0.05, 0.45, 0.15),
        specular: Vec3::new(0.1, 0.1, 0.1),
        shininess: 8.0,
    };

    /// Used when a ball model has no usable MTL material.
    pub const BALL_DEFAULT: SurfaceMaterial = SurfaceMaterial {
        emissive: Vec3::new(0.15, 0.15, 0.15),
        ambient: Vec3::new(1.0, 1.0, 1.0),
        diffuse: Vec3::new(1.0, 1.0, 1.0),
        specular: Vec3::new(0.5, 0.5, 0.5),
        shininess: 32.0,
    };

    pub fn from_material(m: &asset::Material) -> Self {
        Self {
            emissive: Self::BALL_DEFAULT.emissive,
            ambient: Vec3::from_array(m.ambient),
            diffuse: Vec3::from_array(m.diffuse),
            specular: Vec3::from_array(m.specular),
            shininess: m.shininess,
        }
    }
}

/// Per-draw uniforms (group 1, binding 0).
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct ObjectUniform {
    pub mvp: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    /// mat3x3 columns padded to vec4.
    pub normal_matrix: [[f32; 4]; 3],
    pub emissive: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    /// rgb = specular colour, w = shininess.
    pub specular: [f32; 4],
}

impl ObjectUniform {
    pub fn new(mvp: Mat4, model: Mat4, material: &SurfaceMaterial) -> Self {
        let n = Mat3::from_mat4(model).inverse().transpose();
        Self {
            mvp: mvp.to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            normal_matrix: [
                v4(n.x_axis, 0.0),
                v4(n.y_axis, 0.0),
                v4(n.z_axis, 0.0),
            ],
            emissive: v4(material.emissive, 1.0),
            ambient: v4(material.ambient, 1.0),
            diffuse: v4(material.diffuse, 1.0),
            specular: v4(material.specular, material.shininess),
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct PointLightUniform {
    pub position: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    /// constant, linear, quadratic, unused.
    pub attenuation: [f32; 4],
}

/// Light state (group 0, binding 0). Flags are `0`/`1` per light category.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct LightsUniform {
    pub enabled: [u32; 4],
    pub eye: [f32; 4],
    pub ambient: [f32; 4],
    pub dir_direction: [f32; 4],
    pub dir_ambient: [f32; 4],
    pub dir_diffuse: [f32; 4],
    pub dir_specular: [f32; 4],
    pub points: [PointLightUniform; 2],
    pub spot_position: [f32; 4],
    pub spot_direction: [f32; 4],
    pub spot_ambient: [f32; 4],
    pub spot_diffuse: [f32; 4],
    pub spot_specular: [f32; 4],
    pub spot_attenuation: [f32; 4],
    /// cos(cutoff), exponent, unused, unused.
    pub spot_cone: [f32; 4],
}

impl LightsUniform {
    pub fn new(flags: &Lights, eye: Vec3) -> Self {
        let enabled = LightKind::ALL.map(|k| flags.is_enabled(k) as u32);

        let dir = lights::DIRECTIONAL;
        let spot = lights::SPOT;
        let points = lights::POINT_LIGHTS.map(|p| PointLightUniform {
            position: v4(p.position, 1.0),
            ambient: v4(p.ambient, 0.0),
            diffuse: v4(p.diffuse, 0.0),
            specular: v4(p.specular, 0.0),
            attenuation: [
                p.attenuation.constant,
                p.attenuation.linear,
                p.attenuation.quadratic,
                0.0,
            ],
        });

        Self {
            enabled,
            eye: v4(eye, 1.0),
            ambient: v4(lights::AMBIENT.color, 0.0),
            dir_direction: v4(dir.direction.normalize(), 0.0),
            dir_ambient: v4(dir.ambient, 0.0),
            dir_diffuse: v4(dir.diffuse, 0.0),
            dir_specular: v4(dir.specular, 0.0),
            points,
            spot_position: v4(spot.position, 1.0),
            spot_direction: v4(spot.direction.normalize(), 0.0),
            spot_ambient: v4(spot.ambient, 0.0),
            spot_diffuse: v4(spot.diffuse, 0.0),
            spot_specular: v4(spot.specular, 0.0),
            spot_attenuation: [
                spot.attenuation.constant,
                spot.attenuation.linear,
                spot.attenuation.quadratic,
                0.0,
            ],
            spot_cone: [spot.cutoff_cos(), spot.exponent, 0.0, 0.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_sizes_are_16_byte_multiples() {
        assert_eq!(std::mem::size_of::<ObjectUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<PointLightUniform>(), 80);
        assert_eq!(std::mem::size_of::<LightsUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<GpuVertex>(), 32);
    }

    #[test]
    fn light_flags_follow_toggles() {
        let mut flags = Lights::new();
        flags.toggle(LightKind::Directional);
        flags.toggle(LightKind::Spot);
        let u = LightsUniform::new(&flags, Vec3::ZERO);
        assert_eq!(u.enabled, [0, 1, 0, 1]);
    }

    #[test]
    fn normal_matrix_undoes_non_uniform_scale() {
        let model = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        let u = ObjectUniform::new(Mat4::IDENTITY, model, &SurfaceMaterial::FELT);
        assert!((u.normal_matrix[0][0] - 0.5).abs() < 1e-6);
        assert!((u.normal_matrix[1][1] - 1.0).abs() < 1e-6);
        assert_eq!(u.specular[3], SurfaceMaterial::FELT.shininess);
    }
}
