use crate::mesh::{self, MeshData};
use crate::pipeline::{ScenePipelines, Uniforms};
use crate::scene::{DrawItem, MeshId};
use glam::Vec3;
use stereo_camera::{EyeMatrices, FrameMatrices};
use wgpu::util::DeviceExt;

const GRID_HALF_EXTENT: i32 = 100;
const GRID_COLOR: [f32; 4] = [0.8, 0.8, 0.8, 1.0];
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.8,
    g: 0.8,
    b: 0.8,
    a: 1.0,
};

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    fn upload(device: &wgpu::Device, label: &str, data: &MeshData) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: data.indices.len() as u32,
        }
    }
}

/// Side-by-side stereoscopic renderer.
///
/// Draws the scene twice per frame — left eye into the left half of the
/// window, right eye into the right half — or once, full-window, in mono
/// mode. All matrices come from a [`FrameMatrices`] snapshot taken before
/// the pass begins.
pub struct StereoRenderer {
    pipelines: ScenePipelines,
    centerpiece: GpuMesh,
    note: GpuMesh,
    floor: GpuMesh,
    grid_buffer: wgpu::Buffer,
    grid_vertex_count: u32,
    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
}

impl StereoRenderer {
    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let pipelines = ScenePipelines::new(device, color_format);

        let centerpiece = GpuMesh::upload(
            device,
            "centerpiece_mesh",
            &mesh::generate_torus(1.0, 0.35, 48, 24),
        );
        let note = GpuMesh::upload(device, "note_mesh", &mesh::generate_uv_sphere(0.12, 12, 18));
        let floor = GpuMesh::upload(
            device,
            "floor_mesh",
            &mesh::generate_cuboid(Vec3::new(200.0, 1.0, 200.0)),
        );

        let grid_vertices = mesh::generate_grid_lines(GRID_HALF_EXTENT);
        let grid_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("grid_vertex_buffer"),
            contents: bytemuck::cast_slice(&grid_vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let (depth_texture, depth_view) =
            create_depth_texture(device, pipelines.depth_format, width, height);

        Self {
            pipelines,
            centerpiece,
            note,
            floor,
            grid_buffer,
            grid_vertex_count: grid_vertices.len() as u32,
            depth_texture,
            depth_view,
        }
    }

    /// Recreate the depth buffer on window resize.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        let (texture, view) =
            create_depth_texture(device, self.pipelines.depth_format, width, height);
        self.depth_texture = texture;
        self.depth_view = view;
    }

    /// The depth texture sampled by the auto-focus controller.
    pub fn depth_texture(&self) -> &wgpu::Texture {
        &self.depth_texture
    }

    /// Encode the frame. In stereo mode the surface is split into two
    /// half-width viewports and the scene drawn once per eye.
    pub fn render_frame(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: &wgpu::TextureView,
        items: &[DrawItem],
        matrices: &FrameMatrices,
        stereo: bool,
        width: u32,
        height: u32,
    ) {
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("scene_render"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if stereo {
                let half = (width / 2) as f32;
                pass.set_viewport(0.0, 0.0, half, height as f32, 0.0, 1.0);
                self.draw_eye(device, &mut pass, items, &matrices.left);

                pass.set_viewport(half, 0.0, half, height as f32, 0.0, 1.0);
                self.draw_eye(device, &mut pass, items, &matrices.right);
            } else {
                self.draw_eye(device, &mut pass, items, &matrices.mono);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    fn draw_eye(
        &self,
        device: &wgpu::Device,
        pass: &mut wgpu::RenderPass<'_>,
        items: &[DrawItem],
        eye: &EyeMatrices,
    ) {
        pass.set_pipeline(&self.pipelines.mesh_pipeline);

        for item in items {
            let uniforms = Uniforms::new(item.model, eye.view, eye.projection, item.color);
            let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("draw_uniforms"),
                contents: bytemuck::cast_slice(&[uniforms]),
                usage: wgpu::BufferUsages::UNIFORM,
            });
            let bind_group = self
                .pipelines
                .create_uniform_bind_group(device, &uniform_buffer);

            let mesh = match item.mesh {
                MeshId::Centerpiece => &self.centerpiece,
                MeshId::Note => &self.note,
                MeshId::Floor => &self.floor,
            };

            pass.set_bind_group(0, &bind_group, &[]);
            pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }

        // Grid lines, identity model.
        let uniforms = Uniforms::new(glam::Mat4::IDENTITY, eye.view, eye.projection, GRID_COLOR);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("grid_uniforms"),
            contents: bytemuck::cast_slice(&[uniforms]),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let bind_group = self
            .pipelines
            .create_uniform_bind_group(device, &uniform_buffer);

        pass.set_pipeline(&self.pipelines.line_pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        pass.set_vertex_buffer(0, self.grid_buffer.slice(..));
        pass.draw(0..self.grid_vertex_count, 0..1);
    }
}

fn create_depth_texture(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("scene_depth_texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        // COPY_SRC so the auto-focus sampler can read the buffer back.
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}
