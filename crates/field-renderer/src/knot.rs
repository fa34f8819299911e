//! Rotating torus knot drawn at the origin of the starfield scene

use crate::camera::Camera;
use crate::renderer::DEPTH_FORMAT;
use bytemuck::{Pod, Zeroable};
use glam::{EulerRot, Mat4, Quat, Vec3};
use wgpu::util::DeviceExt;

pub const KNOT_RADIUS: f32 = 1.2;
pub const KNOT_TUBE: f32 = 0.35;
pub const KNOT_RADIAL_SEGMENTS: u32 = 180;
pub const KNOT_TUBULAR_SEGMENTS: u32 = 64;

/// Winding numbers of the (p, q) knot
const KNOT_P: f32 = 2.0;
const KNOT_Q: f32 = 3.0;

/// Step along the curve used to estimate its tangent
const TANGENT_STEP: f32 = 0.01;

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct KnotVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl KnotVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<KnotVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

pub struct KnotMesh {
    pub vertices: Vec<KnotVertex>,
    pub indices: Vec<u32>,
}

/// Material for the knot surface
#[derive(Clone, Copy, Debug)]
pub struct KnotMaterial {
    pub color: Vec3,
    pub metallic: f32,
    pub roughness: f32,
}

impl Default for KnotMaterial {
    fn default() -> Self {
        Self {
            color: Vec3::new(0.25, 0.82, 0.78),
            metallic: 0.45,
            roughness: 0.2,
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct KnotUniform {
    pub view_proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub camera_position: [f32; 3],
    pub metallic: f32,
    pub color: [f32; 3],
    pub roughness: f32,
}

fn curve_point(angle: f32, radius: f32) -> Vec3 {
    let twist = KNOT_Q / KNOT_P * angle;
    let ring = radius * (2.0 + twist.cos()) * 0.5;
    Vec3::new(
        ring * angle.cos(),
        ring * angle.sin(),
        radius * twist.sin() * 0.5,
    )
}

/// Tube swept along a (2, 3) torus knot
///
/// Rings are laid out `radial_segments + 1` times so the seam has its own
/// vertices; each ring has `tubular_segments` vertices and wraps on itself.
pub fn torus_knot(
    radius: f32,
    tube: f32,
    radial_segments: u32,
    tubular_segments: u32,
) -> KnotMesh {
    let radial_segments = radial_segments.max(3);
    let tubular_segments = tubular_segments.max(3);

    let mut vertices =
        Vec::with_capacity(((radial_segments + 1) * tubular_segments) as usize);
    for i in 0..=radial_segments {
        let u = (i % radial_segments) as f32 / radial_segments as f32
            * 2.0
            * KNOT_P
            * std::f32::consts::PI;
        let p1 = curve_point(u, radius);
        let p2 = curve_point(u + TANGENT_STEP, radius);

        let tangent = p2 - p1;
        let bitangent = tangent.cross(p1 + p2).normalize_or_zero();
        let normal = bitangent.cross(tangent).normalize_or_zero();

        for j in 0..tubular_segments {
            let v = j as f32 / tubular_segments as f32 * std::f32::consts::TAU;
            let offset = normal * (-tube * v.cos()) + bitangent * (tube * v.sin());
            vertices.push(KnotVertex {
                position: (p1 + offset).to_array(),
                normal: offset.normalize_or_zero().to_array(),
            });
        }
    }

    let mut indices = Vec::with_capacity((radial_segments * tubular_segments * 6) as usize);
    for i in 0..radial_segments {
        for j in 0..tubular_segments {
            let next = (j + 1) % tubular_segments;
            let a = i * tubular_segments + j;
            let b = (i + 1) * tubular_segments + j;
            let c = (i + 1) * tubular_segments + next;
            let d = i * tubular_segments + next;
            indices.extend_from_slice(&[d, b, a, d, c, b]);
        }
    }

    KnotMesh { vertices, indices }
}

/// Model matrix at `time` seconds: a slow yaw with a gentle pitch sway
pub fn knot_model(time: f32) -> Mat4 {
    let yaw = time * 0.25;
    let pitch = (time * 0.35).sin() * 0.12;
    Mat4::from_quat(Quat::from_euler(EulerRot::YXZ, yaw, pitch, 0.0))
}

pub struct KnotRenderer {
    render_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    pub material: KnotMaterial,
}

impl KnotRenderer {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let mesh = torus_knot(
            KNOT_RADIUS,
            KNOT_TUBE,
            KNOT_RADIAL_SEGMENTS,
            KNOT_TUBULAR_SEGMENTS,
        );

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Knot Vertex Buffer"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Knot Index Buffer"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Knot Uniform Buffer"),
            size: std::mem::size_of::<KnotUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Knot Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/knot.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Knot Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Knot Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Knot Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Knot Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vertex"),
                buffers: &[KnotVertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fragment"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
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
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        log::debug!(
            "Knot mesh: {} vertices, {} triangles",
            mesh.vertices.len(),
            mesh.indices.len() / 3
        );

        Self {
            render_pipeline,
            uniform_buffer,
            bind_group,
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
            material: KnotMaterial::default(),
        }
    }

    pub fn prepare(&self, queue: &wgpu::Queue, camera: &Camera, time: f32) {
        let uniform = KnotUniform {
            view_proj: camera.build_view_projection_matrix().to_cols_array_2d(),
            model: knot_model(time).to_cols_array_2d(),
            camera_position: camera.position().to_array(),
            metallic: self.material.metallic,
            color: self.material.color.to_array(),
            roughness: self.material.roughness,
        };
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniform]));
    }

    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_pipeline(&self.render_pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}
