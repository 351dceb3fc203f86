use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Vertex format shared by all scene geometry.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                // position
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // normal
                wgpu::VertexAttribute {
                    offset: 12,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// CPU-side mesh (vertices + triangle-list indices).
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

/// Axis-aligned box centered at the origin with the given full extents.
pub fn generate_cuboid(extents: Vec3) -> MeshData {
    let h = extents * 0.5;

    // (normal, four corners CCW seen from outside)
    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        (
            [0.0, 0.0, 1.0],
            [
                [-h.x, -h.y, h.z],
                [h.x, -h.y, h.z],
                [h.x, h.y, h.z],
                [-h.x, h.y, h.z],
            ],
        ),
        (
            [0.0, 0.0, -1.0],
            [
                [h.x, -h.y, -h.z],
                [-h.x, -h.y, -h.z],
                [-h.x, h.y, -h.z],
                [h.x, h.y, -h.z],
            ],
        ),
        (
            [1.0, 0.0, 0.0],
            [
                [h.x, -h.y, h.z],
                [h.x, -h.y, -h.z],
                [h.x, h.y, -h.z],
                [h.x, h.y, h.z],
            ],
        ),
        (
            [-1.0, 0.0, 0.0],
            [
                [-h.x, -h.y, -h.z],
                [-h.x, -h.y, h.z],
                [-h.x, h.y, h.z],
                [-h.x, h.y, -h.z],
            ],
        ),
        (
            [0.0, 1.0, 0.0],
            [
                [-h.x, h.y, h.z],
                [h.x, h.y, h.z],
                [h.x, h.y, -h.z],
                [-h.x, h.y, -h.z],
            ],
        ),
        (
            [0.0, -1.0, 0.0],
            [
                [-h.x, -h.y, -h.z],
                [h.x, -h.y, -h.z],
                [h.x, -h.y, h.z],
                [-h.x, -h.y, h.z],
            ],
        ),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for (normal, corners) in faces {
        let base = vertices.len() as u32;
        for position in corners {
            vertices.push(Vertex { position, normal });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    MeshData { vertices, indices }
}

/// Latitude/longitude sphere.
pub fn generate_uv_sphere(radius: f32, rings: u32, sectors: u32) -> MeshData {
    let rings = rings.max(2);
    let sectors = sectors.max(3);

    let mut vertices = Vec::with_capacity(((rings + 1) * (sectors + 1)) as usize);
    for r in 0..=rings {
        let phi = std::f32::consts::PI * r as f32 / rings as f32;
        for s in 0..=sectors {
            let theta = std::f32::consts::TAU * s as f32 / sectors as f32;
            let n = Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
            vertices.push(Vertex {
                position: (n * radius).to_array(),
                normal: n.to_array(),
            });
        }
    }

    let mut indices = Vec::with_capacity((rings * sectors * 6) as usize);
    for r in 0..rings {
        for s in 0..sectors {
            let i0 = r * (sectors + 1) + s;
            let i1 = i0 + sectors + 1;
            indices.extend_from_slice(&[i0, i1, i0 + 1, i0 + 1, i1, i1 + 1]);
        }
    }

    MeshData { vertices, indices }
}

/// Torus in the XZ plane, centered at the origin.
pub fn generate_torus(major_radius: f32, minor_radius: f32, major_segments: u32, minor_segments: u32) -> MeshData {
    let major_segments = major_segments.max(3);
    let minor_segments = minor_segments.max(3);

    let mut vertices =
        Vec::with_capacity(((major_segments + 1) * (minor_segments + 1)) as usize);
    for i in 0..=major_segments {
        let theta = std::f32::consts::TAU * i as f32 / major_segments as f32;
        let ring_center = Vec3::new(theta.cos(), 0.0, theta.sin()) * major_radius;
        for j in 0..=minor_segments {
            let phi = std::f32::consts::TAU * j as f32 / minor_segments as f32;
            let n = Vec3::new(
                theta.cos() * phi.cos(),
                phi.sin(),
                theta.sin() * phi.cos(),
            );
            vertices.push(Vertex {
                position: (ring_center + n * minor_radius).to_array(),
                normal: n.to_array(),
            });
        }
    }

    let mut indices = Vec::with_capacity((major_segments * minor_segments * 6) as usize);
    for i in 0..major_segments {
        for j in 0..minor_segments {
            let i0 = i * (minor_segments + 1) + j;
            let i1 = i0 + minor_segments + 1;
            indices.extend_from_slice(&[i0, i1, i0 + 1, i0 + 1, i1, i1 + 1]);
        }
    }

    MeshData { vertices, indices }
}

/// Line-list vertices for a square grid on the y=0 plane, one line per
/// integer coordinate in `[-half_extent, half_extent]` along both axes.
pub fn generate_grid_lines(half_extent: i32) -> Vec<Vertex> {
    let up = [0.0, 1.0, 0.0];
    let e = half_extent as f32;
    let mut vertices = Vec::with_capacity(((half_extent * 2 + 1) * 4) as usize);

    for i in -half_extent..=half_extent {
        let i = i as f32;
        vertices.push(Vertex { position: [i, 0.0, -e], normal: up });
        vertices.push(Vertex { position: [i, 0.0, e], normal: up });
        vertices.push(Vertex { position: [-e, 0.0, i], normal: up });
        vertices.push(Vertex { position: [e, 0.0, i], normal: up });
    }

    vertices
}
