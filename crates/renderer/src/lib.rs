//! Renderer: wgpu init + depth + Phong-lit table and balls.
//! wgpu = 26.x, winit = 0.30.x

pub mod mesh;
pub mod table;
pub mod uniforms;

use std::sync::Arc;

use anyhow::{Context, Result};
use asset::{ObjModel, TextureData, TextureFilter};
use corelib::{Camera, Lights, Scene};
use wgpu::{
    BindGroup, BindGroupLayout, BindGroupLayoutDescriptor, BindGroupLayoutEntry, BindingType,
    BlendState, Buffer, BufferBindingType, BufferUsages, ColorTargetState, ColorWrites,
    CommandEncoderDescriptor, DepthBiasState, DepthStencilState, Device, DeviceDescriptor,
    Extent3d, Features, FragmentState, Instance, InstanceDescriptor, Limits, LoadOp, Operations,
    PipelineLayoutDescriptor, PowerPreference, PresentMode, Queue, RenderPassColorAttachment,
    RenderPassDescriptor, RenderPipeline, RenderPipelineDescriptor, SamplerBindingType,
    ShaderModuleDescriptor, ShaderSource, ShaderStages, StoreOp, Surface, SurfaceConfiguration,
    SurfaceError, TextureDescriptor, TextureDimension, TextureFormat, TextureSampleType,
    TextureUsages, TextureView, TextureViewDescriptor, TextureViewDimension, VertexState,
    util::DeviceExt,
};
use winit::{dpi::PhysicalSize, window::Window};

use crate::mesh::{GpuMesh, create_sampler};
use crate::uniforms::{GpuVertex, LightsUniform, ObjectUniform, SurfaceMaterial};

const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

pub struct Renderer {
    // Surface
    surface: Surface<'static>,
    surface_config: SurfaceConfiguration,

    // Device/queue
    device: Device,
    queue: Queue,

    // Pipeline
    pipeline: RenderPipeline,
    lights_buf: Buffer,
    lights_bg: BindGroup,

    // Geometry
    table: GpuMesh,
    balls: Vec<GpuMesh>,

    // Depth
    depth_view: TextureView,

    // Size cache
    width: u32,
    height: u32,
}

impl Renderer {
    /// Create GPU state bound to an `Arc<Window>` and upload the table plus one mesh per ball model.
    pub async fn new(
        window: Arc<Window>,
        backends: wgpu::Backends,
        filter: TextureFilter,
        ball_models: &[ObjModel],
    ) -> Result<Self> {
        let PhysicalSize { width, height } = window.inner_size();
        let width = width.max(1);
        let height = height.max(1);

        // Instance & surface
        let instance = Instance::new(&InstanceDescriptor {
            backends,
            ..Default::default()
        });
        let surface: Surface<'static> = instance
            .create_surface(window.clone())
            .context("create_surface failed")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("No suitable GPU adapter")?;
        log::info!("Using adapter: {:?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(&DeviceDescriptor {
                label: Some("billiard3d Device"),
                required_features: Features::empty(),
                required_limits: Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: Default::default(),
                trace: Default::default(),
            })
            .await
            .context("request_device failed")?;

        // Surface format (prefer sRGB)
        let caps = surface.get_capabilities(&adapter);
        let surface_format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .context("Surface reports no supported formats")?;

        let surface_config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: PresentMode::AutoVsync,
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let depth_view = create_depth_view(&device, &surface_config);

        // ==== Shaders ====
        let shader = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("Phong WGSL"),
            source: ShaderSource::Wgsl(include_str!("shaders/phong.wgsl").into()),
        });

        // ==== Lights BGL/BG (group 0) ====
        let lights_bgl = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("Lights BGL"),
            entries: &[uniform_entry(0)],
        });
        let lights_init = LightsUniform::new(&Lights::new(), Camera::default().eye_world());
        let lights_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Lights UBO"),
            contents: bytemuck::bytes_of(&lights_init),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        });
        let lights_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Lights BG"),
            layout: &lights_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: lights_buf.as_entire_binding(),
            }],
        });

        // ==== Object BGL (group 1): uniforms + diffuse texture + sampler ====
        let object_bgl = create_object_bgl(&device);
        let sampler = create_sampler(&device, filter);

        // ==== Pipeline ====
        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("Phong PipelineLayout"),
            bind_group_layouts: &[&lights_bgl, &object_bgl],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some("Phong Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[GpuVertex::LAYOUT],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(ColorTargetState {
                    format: surface_format,
                    blend: Some(BlendState::REPLACE),
                    write_mask: ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            // OBJ exports do not agree on winding; draw both faces.
            primitive: wgpu::PrimitiveState {
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        // ==== Geometry ====
        let white = TextureData::white();
        let table = GpuMesh::upload(
            &device,
            &queue,
            &object_bgl,
            &sampler,
            "Table",
            &table::table_vertices(),
            &white,
            SurfaceMaterial::FELT,
        );

        let balls = ball_models
            .iter()
            .enumerate()
            .map(|(i, model)| {
                let material = model.primary_material();
                let texture = material
                    .and_then(|m| m.diffuse_texture.as_ref())
                    .unwrap_or(&white);
                let surface = material
                    .map(SurfaceMaterial::from_material)
                    .unwrap_or(SurfaceMaterial::BALL_DEFAULT);
                GpuMesh::upload(
                    &device,
                    &queue,
                    &object_bgl,
                    &sampler,
                    &format!("Ball{}", i + 1),
                    &model.to_mesh_data(),
                    texture,
                    surface,
                )
            })
            .collect::<Vec<_>>();
        log::info!("Uploaded table and {} ball meshes", balls.len());

        Ok(Self {
            surface,
            surface_config,
            device,
            queue,
            pipeline,
            lights_buf,
            lights_bg,
            table,
            balls,
            depth_view,
            width,
            height,
        })
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Resize: reconfigure surface & recreate depth view.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
        self.surface_config.width = self.width;
        self.surface_config.height = self.height;
        self.surface.configure(&self.device, &self.surface_config);
        self.depth_view = create_depth_view(&self.device, &self.surface_config);
    }

    /// Render one frame: upload light/object uniforms, clear, draw table then balls.
    pub fn render(
        &mut self,
        scene: &Scene,
        camera: &Camera,
        lights: &Lights,
    ) -> Result<(), SurfaceError> {
        let camera = camera.with_aspect(self.aspect());

        // --- uniforms
        let lights_uniform = LightsUniform::new(lights, camera.eye_world());
        self.queue
            .write_buffer(&self.lights_buf, 0, bytemuck::bytes_of(&lights_uniform));

        let table_model = corelib::table::table_transform().matrix();
        self.table.write_uniform(
            &self.queue,
            &ObjectUniform::new(camera.table_mvp(), table_model, &self.table.material),
        );
        for (mesh, ball) in self.balls.iter().zip(scene.balls()) {
            let uniform = ObjectUniform::new(camera.ball_mvp(ball), ball.model_matrix(), &mesh.material);
            mesh.write_uniform(&self.queue, &uniform);
        }

        // --- frame & pass
        let frame = self.surface.get_current_texture()?;
        let view = frame.texture.create_view(&Default::default());

        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("MainEncoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("MainPass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(wgpu::Color {
                            r: 0.0,
                            g: 0.0,
                            b: 0.0,
                            a: 1.0,
                        }),
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(Operations {
                        load: LoadOp::Clear(1.0),
                        store: StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            rpass.set_pipeline(&self.pipeline);
            rpass.set_bind_group(0, &self.lights_bg, &[]);
            self.table.draw(&mut rpass);
            for mesh in self.balls.iter().take(scene.balls().len()) {
                mesh.draw(&mut rpass);
            }
        }

        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }

    pub fn is_surface_lost(err: &SurfaceError) -> bool {
        matches!(err, SurfaceError::Lost | SurfaceError::Outdated)
    }

    pub fn recreate_surface(&mut self) {
        self.resize(self.width, self.height);
    }
}

fn uniform_entry(binding: u32) -> BindGroupLayoutEntry {
    BindGroupLayoutEntry {
        binding,
        visibility: ShaderStages::VERTEX | ShaderStages::FRAGMENT,
        ty: BindingType::Buffer {
            ty: BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn create_object_bgl(device: &Device) -> BindGroupLayout {
    device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some("Object BGL"),
        entries: &[
            uniform_entry(0),
            BindGroupLayoutEntry {
                binding: 1,
                visibility: ShaderStages::FRAGMENT,
                ty: BindingType::Texture {
                    sample_type: TextureSampleType::Float { filterable: true },
                    view_dimension: TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            BindGroupLayoutEntry {
                binding: 2,
                visibility: ShaderStages::FRAGMENT,
                ty: BindingType::Sampler(SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

/// Create a depth texture view matching the surface config.
fn create_depth_view(device: &Device, sc: &SurfaceConfiguration) -> TextureView {
    let tex = device.create_texture(&TextureDescriptor {
        label: Some("DepthTex"),
        size: Extent3d {
            width: sc.width.max(1),
            height: sc.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    tex.create_view(&TextureViewDescriptor::default())
}
