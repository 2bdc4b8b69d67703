use crate::geometry::SurfaceMesh;

// Step 0.04 walks ~158 rows of ~158 cells at 6 vertices each; the caps
// leave headroom above the finest step the UI exposes.
const MAX_SURFACE_VERTICES: usize = 200_000;
const MAX_MARKER_VERTICES: usize = 10_000;

/// Fixed-capacity vertex buffers for the tessellated surface (positions +
/// UVs in parallel buffers) and the marker sphere strip. Uploaded once at
/// startup and again only when the tessellation inputs change.
pub struct SceneBuffers {
    pub surface_position_buffer: wgpu::Buffer,
    pub surface_uv_buffer: wgpu::Buffer,
    pub surface_vertex_count: u32,

    pub marker_vertex_buffer: wgpu::Buffer,
    pub marker_vertex_count: u32,
}

impl SceneBuffers {
    pub fn new(device: &wgpu::Device) -> Self {
        let surface_position_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Surface Position Buffer"),
            size: (MAX_SURFACE_VERTICES * 3 * 4) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let surface_uv_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Surface UV Buffer"),
            size: (MAX_SURFACE_VERTICES * 2 * 4) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let marker_vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Marker Vertex Buffer"),
            size: (MAX_MARKER_VERTICES * 3 * 4) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            surface_position_buffer,
            surface_uv_buffer,
            surface_vertex_count: 0,
            marker_vertex_buffer,
            marker_vertex_count: 0,
        }
    }

    pub fn upload_surface(&mut self, queue: &wgpu::Queue, mesh: &SurfaceMesh) {
        let vertex_count = (mesh.positions.len() / 3).min(MAX_SURFACE_VERTICES);
        if vertex_count * 3 < mesh.positions.len() {
            log::warn!(
                "surface mesh truncated to {} of {} vertices",
                vertex_count,
                mesh.positions.len() / 3
            );
        }

        queue.write_buffer(
            &self.surface_position_buffer,
            0,
            bytemuck::cast_slice(&mesh.positions[..vertex_count * 3]),
        );
        queue.write_buffer(
            &self.surface_uv_buffer,
            0,
            bytemuck::cast_slice(&mesh.uvs[..vertex_count * 2]),
        );

        self.surface_vertex_count = vertex_count as u32;
    }

    pub fn upload_marker(&mut self, queue: &wgpu::Queue, vertices: &[f32]) {
        let vertex_count = (vertices.len() / 3).min(MAX_MARKER_VERTICES);

        queue.write_buffer(
            &self.marker_vertex_buffer,
            0,
            bytemuck::cast_slice(&vertices[..vertex_count * 3]),
        );

        self.marker_vertex_count = vertex_count as u32;
    }
}

pub fn position_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: 12,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[wgpu::VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x3,
        }],
    }
}

pub fn uv_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: 8,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[wgpu::VertexAttribute {
            offset: 0,
            shader_location: 1,
            format: wgpu::VertexFormat::Float32x2,
        }],
    }
}
