use tracing::warn;

/// Side length of the square depth region surveyed each frame. 64 texels
/// at 4 bytes each keeps every row at wgpu's 256-byte copy alignment.
const SAMPLE_SIZE: u32 = 64;

/// Reads a small region of the depth buffer back to the CPU so the
/// auto-focus controller can converge on the nearest visible surface.
///
/// The readback is synchronous (map + wait); the region is tiny, so the
/// stall is negligible next to the frame itself. The sampled contents are
/// whatever the depth buffer held from the previous frame — one frame of
/// focus latency, hidden entirely by the controller's rate limiter.
pub struct DepthSampler {
    staging: wgpu::Buffer,
}

impl DepthSampler {
    pub fn new(device: &wgpu::Device) -> Self {
        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("depth_staging_buffer"),
            size: (SAMPLE_SIZE * SAMPLE_SIZE * 4) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });
        Self { staging }
    }

    /// Survey a `SAMPLE_SIZE`² region centered at (`center_x`, `center_y`)
    /// and return the nearest world-space distance found there.
    ///
    /// Returns `None` when the window is too small for the region or
    /// nothing was rendered inside it (all depths at the clear value) —
    /// the caller keeps its previous focal length.
    #[allow(clippy::too_many_arguments)]
    pub fn sample_nearest(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        depth_texture: &wgpu::Texture,
        center_x: u32,
        center_y: u32,
        near: f32,
        far: f32,
    ) -> Option<f32> {
        let width = depth_texture.width();
        let height = depth_texture.height();
        if width < SAMPLE_SIZE || height < SAMPLE_SIZE {
            return None;
        }

        let half = SAMPLE_SIZE / 2;
        let x = center_x.saturating_sub(half).min(width - SAMPLE_SIZE);
        let y = center_y.saturating_sub(half).min(height - SAMPLE_SIZE);

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("depth_readback"),
        });
        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture: depth_texture,
                mip_level: 0,
                origin: wgpu::Origin3d { x, y, z: 0 },
                aspect: wgpu::TextureAspect::DepthOnly,
            },
            wgpu::ImageCopyBuffer {
                buffer: &self.staging,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(SAMPLE_SIZE * 4),
                    rows_per_image: Some(SAMPLE_SIZE),
                },
            },
            wgpu::Extent3d {
                width: SAMPLE_SIZE,
                height: SAMPLE_SIZE,
                depth_or_array_layers: 1,
            },
        );
        queue.submit(std::iter::once(encoder.finish()));

        let slice = self.staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        let _ = device.poll(wgpu::Maintain::Wait);

        match rx.recv() {
            Ok(Ok(())) => {}
            other => {
                warn!(?other, "depth readback failed");
                return None;
            }
        }

        let min_depth = {
            let data = slice.get_mapped_range();
            let depths: &[f32] = bytemuck::cast_slice(&data);
            depths.iter().copied().fold(f32::INFINITY, f32::min)
        };
        self.staging.unmap();

        // Clear value everywhere: nothing rendered in the surveyed region.
        if !(0.0..1.0).contains(&min_depth) {
            return None;
        }

        Some(linearize_depth(min_depth, near, far))
    }
}

/// Convert a 0..1 depth-buffer value back to a world-space distance using
/// the camera's clip planes (right-handed, 0..1 clip depth). The off-axis
/// shear only affects x, so the mapping is the same for both eyes and the
/// mono camera.
pub fn linearize_depth(depth: f32, near: f32, far: f32) -> f32 {
    near * far / (far - depth * (far - near))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1.0e-4;

    #[test]
    fn depth_zero_maps_to_near_plane() {
        assert!((linearize_depth(0.0, 0.1, 500.0) - 0.1).abs() < EPS);
    }

    #[test]
    fn depth_one_maps_to_far_plane() {
        assert!((linearize_depth(1.0, 0.1, 500.0) - 500.0).abs() < 0.1);
    }

    #[test]
    fn linearization_inverts_the_projection() {
        // Project a point at distance d, then map its depth back.
        let near = 0.1;
        let far = 500.0;
        for d in [0.5, 1.0, 5.0, 42.0, 250.0] {
            let depth = far * (d - near) / (d * (far - near));
            assert!((linearize_depth(depth, near, far) - d).abs() < d * 1.0e-3);
        }
    }

    #[test]
    fn linearization_is_monotonic() {
        let near = 0.1;
        let far = 100.0;
        let mut prev = linearize_depth(0.0, near, far);
        for i in 1..=10 {
            let next = linearize_depth(i as f32 / 10.0, near, far);
            assert!(next > prev);
            prev = next;
        }
    }
}
