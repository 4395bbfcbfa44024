//! GPU-resident meshes: vertex/index buffers, diffuse texture and per-draw uniforms.
//! All resources are owned by the mesh and released when it drops.

use asset::{MeshData, TextureData, TextureFilter};
use wgpu::{
    AddressMode, BindGroup, BindGroupLayout, Buffer, BufferUsages, Device, Extent3d, FilterMode,
    Queue, RenderPass, Sampler, SamplerDescriptor, Texture, TextureDescriptor, TextureDimension,
    TextureFormat, TextureUsages, util::DeviceExt,
};

use crate::uniforms::{GpuVertex, ObjectUniform, SurfaceMaterial};

/// Sampler shared by every draw: repeat wrapping, configurable min/mag filter.
pub fn create_sampler(device: &Device, filter: TextureFilter) -> Sampler {
    let mode = match filter {
        TextureFilter::Nearest => FilterMode::Nearest,
        TextureFilter::Linear => FilterMode::Linear,
    };
    device.create_sampler(&SamplerDescriptor {
        label: Some("Diffuse Sampler"),
        address_mode_u: AddressMode::Repeat,
        address_mode_v: AddressMode::Repeat,
        address_mode_w: AddressMode::Repeat,
        mag_filter: mode,
        min_filter: mode,
        ..Default::default()
    })
}

/// Upload RGBA8 pixels (expanding RGB first) into a sampled 2D texture.
/// Malformed pixel data is replaced by the white fallback.
pub fn upload_texture(device: &Device, queue: &Queue, label: &str, tex: &TextureData) -> Texture {
    let fallback;
    let tex = if tex.is_valid() {
        tex
    } else {
        log::warn!(
            "{label}: {}x{} pixel buffer does not match its size, using white",
            tex.width,
            tex.height
        );
        fallback = TextureData::white();
        &fallback
    };
    let size = Extent3d {
        width: tex.width.max(1),
        height: tex.height.max(1),
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: TextureFormat::Rgba8UnormSrgb,
        usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
        view_formats: &[],
    });
    let rgba = tex.to_rgba8();
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * size.width),
            rows_per_image: Some(size.height),
        },
        size,
    );
    texture
}

pub struct GpuMesh {
    vertex_buf: Buffer,
    index_buf: Buffer,
    index_count: u32,
    uniform_buf: Buffer,
    bind_group: BindGroup,
    #[allow(dead_code)]
    texture: Texture,
    pub material: SurfaceMaterial,
}

impl GpuMesh {
    #[allow(clippy::too_many_arguments)]
    pub fn upload(
        device: &Device,
        queue: &Queue,
        layout: &BindGroupLayout,
        sampler: &Sampler,
        label: &str,
        mesh: &MeshData,
        texture: &TextureData,
        material: SurfaceMaterial,
    ) -> Self {
        if !mesh.is_valid() {
            log::warn!("{label}: mesh has out-of-range or missing indices");
        }
        let vertices: Vec<GpuVertex> = mesh.vertices.iter().map(GpuVertex::from).collect();
        let vertex_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} VB")),
            contents: bytemuck::cast_slice(&vertices),
            usage: BufferUsages::VERTEX,
        });
        let index_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} IB")),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: BufferUsages::INDEX,
        });

        let uniform_buf = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{label} UBO")),
            size: std::mem::size_of::<ObjectUniform>() as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let gpu_texture = upload_texture(device, queue, &format!("{label} Texture"), texture);
        let view = gpu_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label} BG")),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        log::debug!(
            "Uploaded {}: {} vertices, {} triangles, texture {}x{}",
            label,
            vertices.len(),
            mesh.triangle_count(),
            texture.width,
            texture.height
        );

        Self {
            vertex_buf,
            index_buf,
            index_count: mesh.indices.len() as u32,
            uniform_buf,
            bind_group,
            texture: gpu_texture,
            material,
        }
    }

    pub fn write_uniform(&self, queue: &Queue, uniform: &ObjectUniform) {
        queue.write_buffer(&self.uniform_buf, 0, bytemuck::bytes_of(uniform));
    }

    /// Draw with group 1 bound to this mesh. Group 0 must already be set.
    pub fn draw(&self, rpass: &mut RenderPass<'_>) {
        rpass.set_bind_group(1, &self.bind_group, &[]);
        rpass.set_vertex_buffer(0, self.vertex_buf.slice(..));
        rpass.set_index_buffer(self.index_buf.slice(..), wgpu::IndexFormat::Uint32);
        rpass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}
