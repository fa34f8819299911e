//! Point-sprite rendering of a particle field

use crate::camera::{Camera, CameraUniform};
use field_physics::ParticleField;

/// Per-instance stride on the GPU; xyz padded to vec4
const INSTANCE_STRIDE: u64 = std::mem::size_of::<[f32; 4]>() as u64;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

pub struct PointCloudRenderer {
    render_pipeline: wgpu::RenderPipeline,
    camera_buffer: wgpu::Buffer,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
    position_buffer: wgpu::Buffer,
    color_buffer: wgpu::Buffer,
    capacity: usize,
    instance_count: u32,
    // Staging for the vec4 padding, reused between uploads
    position_staging: Vec<[f32; 4]>,
    color_staging: Vec<[f32; 4]>,
    pub point_size: f32,
    pub clear_color: wgpu::Color,
    /// Shared by everything drawn in the scene pass
    pub depth_texture: wgpu::TextureView,
}

impl PointCloudRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_config: &wgpu::SurfaceConfiguration,
        capacity: usize,
    ) -> Self {
        let capacity = capacity.max(1);
        let format = surface_config.format;
        let depth_texture =
            create_depth_texture(device, surface_config.width, surface_config.height);

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Camera Buffer"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Point Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/points.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Point Bind Group Layout"),
            entries: &[
                // Camera (Uniform) - Binding 0
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Positions + capture (Storage) - Binding 1
                storage_entry(1),
                // Colors (Storage) - Binding 2
                storage_entry(2),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Point Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        // Additive: overlapping sprites brighten instead of occluding
        let additive = wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::SrcAlpha,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
        };

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Point Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vertex"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fragment"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(additive),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            // Sprites are hidden behind the knot but never occlude each other
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let (position_buffer, color_buffer) = create_instance_buffers(device, capacity);
        let bind_group = create_bind_group(
            device,
            &bind_group_layout,
            &camera_buffer,
            &position_buffer,
            &color_buffer,
        );

        log::debug!("Point renderer created with capacity {}", capacity);

        Self {
            render_pipeline,
            camera_buffer,
            bind_group_layout,
            bind_group,
            position_buffer,
            color_buffer,
            capacity,
            instance_count: 0,
            position_staging: Vec::with_capacity(capacity),
            color_staging: Vec::with_capacity(capacity),
            point_size: 0.06,
            clear_color: wgpu::Color::BLACK,
            depth_texture,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = create_depth_texture(device, width, height);
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn instance_count(&self) -> u32 {
        self.instance_count
    }

    pub fn set_point_size(&mut self, size: f32) {
        if size.is_finite() && size > 0.0 {
            self.point_size = size;
        }
    }

    pub fn set_clear_color(&mut self, color: wgpu::Color) {
        self.clear_color = color;
    }

    /// Grow the instance buffers so `count` particles fit. Returns true if they were recreated.
    pub fn ensure_capacity(&mut self, device: &wgpu::Device, count: usize) -> bool {
        if count <= self.capacity {
            return false;
        }

        let capacity = count.next_power_of_two();
        let (position_buffer, color_buffer) = create_instance_buffers(device, capacity);
        self.bind_group = create_bind_group(
            device,
            &self.bind_group_layout,
            &self.camera_buffer,
            &position_buffer,
            &color_buffer,
        );
        self.position_buffer = position_buffer;
        self.color_buffer = color_buffer;
        self.capacity = capacity;

        log::debug!("Point buffers grown to {} instances", capacity);
        true
    }

    /// Copy the field's positions, capture and colors to the GPU
    pub fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, field: &ParticleField) {
        self.ensure_capacity(device, field.len());

        pack_instances(field, &mut self.position_staging, &mut self.color_staging);
        queue.write_buffer(
            &self.position_buffer,
            0,
            bytemuck::cast_slice(&self.position_staging),
        );
        queue.write_buffer(
            &self.color_buffer,
            0,
            bytemuck::cast_slice(&self.color_staging),
        );
        self.instance_count = field.len() as u32;
    }

    pub fn prepare(&self, queue: &wgpu::Queue, camera: &Camera, time: f32) {
        queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[camera.to_uniform(self.point_size, time)]),
        );
    }

    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        if self.instance_count == 0 {
            return;
        }
        render_pass.set_pipeline(&self.render_pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.draw(0..6, 0..self.instance_count);
    }
}

/// Begin the pass that clears to `clear_color` and draws the 3D scene
pub fn begin_scene_pass<'a>(
    encoder: &'a mut wgpu::CommandEncoder,
    surface_view: &'a wgpu::TextureView,
    depth_view: &'a wgpu::TextureView,
    clear_color: wgpu::Color,
) -> wgpu::RenderPass<'a> {
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("Scene Pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: surface_view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(clear_color),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view: depth_view,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(1.0),
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }),
        timestamp_writes: None,
        occlusion_query_set: None,
    })
}

fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    depth_texture.create_view(&wgpu::TextureViewDescriptor::default())
}

/// Flatten the field into vec4 rows: `[x, y, z, capture]` and `[r, g, b, 1]`
pub fn pack_instances(
    field: &ParticleField,
    positions: &mut Vec<[f32; 4]>,
    colors: &mut Vec<[f32; 4]>,
) {
    positions.clear();
    colors.clear();

    positions.extend(
        field
            .positions()
            .chunks_exact(3)
            .zip(field.capture())
            .map(|(p, &c)| [p[0], p[1], p[2], c]),
    );
    colors.extend(
        field
            .colors()
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2], 1.0]),
    );
}

fn storage_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only: true },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn create_instance_buffers(device: &wgpu::Device, capacity: usize) -> (wgpu::Buffer, wgpu::Buffer) {
    let size = INSTANCE_STRIDE * capacity as u64;
    let usage = wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST;

    let positions = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Position Buffer"),
        size,
        usage,
        mapped_at_creation: false,
    });
    let colors = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Color Buffer"),
        size,
        usage,
        mapped_at_creation: false,
    });
    (positions, colors)
}

fn create_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    camera_buffer: &wgpu::Buffer,
    position_buffer: &wgpu::Buffer,
    color_buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Point Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: position_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: color_buffer.as_entire_binding(),
            },
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use field_physics::Particle;
    use glam::Vec3;

    #[test]
    fn test_camera_uniform_layout() {
        // Must match the WGSL struct: mat4 + (vec3, f32) + (vec3, f32)
        assert_eq!(std::mem::size_of::<CameraUniform>(), 96);
    }

    #[test]
    fn test_pack_instances_pads_to_vec4() {
        let mut field = ParticleField::new(2);
        let mut particle = Particle::at_rest(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.1, 0.2, 0.3));
        particle.capture = 0.5;
        field.set(1, &particle);

        let mut positions = Vec::new();
        let mut colors = Vec::new();
        pack_instances(&field, &mut positions, &mut colors);

        assert_eq!(positions.len(), 2);
        assert_eq!(colors.len(), 2);
        assert_eq!(positions[1], [1.0, 2.0, 3.0, 0.5]);
        assert_eq!(colors[1], [0.1, 0.2, 0.3, 1.0]);
    }

    #[test]
    fn test_pack_instances_reuses_staging() {
        let field = ParticleField::new(3);
        let mut positions = vec![[9.0; 4]; 10];
        let mut colors = vec![[9.0; 4]; 10];
        pack_instances(&field, &mut positions, &mut colors);
        assert_eq!(positions.len(), 3);
        assert_eq!(colors.len(), 3);
    }
}
