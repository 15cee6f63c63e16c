//! Geometry uploaded to the GPU.

use cgmath::{Vector3, Zero};
use wgpu::util::DeviceExt;

use crate::data_structures::geometry::{Geometry, Topology};

/// Vertex and index buffers of one [`Geometry`].
///
/// Triangle meshes also carry an edge index buffer so a material can switch
/// to wireframe without a second mesh.
#[derive(Debug)]
pub struct Mesh {
    pub name: String,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_elements: u32,
    pub topology: Topology,
    pub wireframe_buffer: Option<wgpu::Buffer>,
    pub wireframe_elements: u32,
    /// Average vertex position, used to sort transparent objects.
    pub center: Vector3<f32>,
}

impl Mesh {
    pub fn new(device: &wgpu::Device, geometry: &Geometry, name: &str) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Vertex Buffer", name)),
            contents: bytemuck::cast_slice(&geometry.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Index Buffer", name)),
            contents: bytemuck::cast_slice(&geometry.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let (wireframe_buffer, wireframe_elements) = match geometry.topology {
            Topology::Triangles => {
                let edges = geometry.wireframe();
                let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{:?} Wireframe Buffer", name)),
                    contents: bytemuck::cast_slice(&edges.indices),
                    usage: wgpu::BufferUsages::INDEX,
                });
                (Some(buffer), edges.indices.len() as u32)
            }
            Topology::Lines => (None, 0),
        };

        Self {
            name: name.to_string(),
            vertex_buffer,
            index_buffer,
            num_elements: geometry.indices.len() as u32,
            topology: geometry.topology,
            wireframe_buffer,
            wireframe_elements,
            center: center_of(geometry),
        }
    }

    /// The index buffer, element count and topology to draw with.
    pub fn draw_range(&self, wireframe: bool) -> (&wgpu::Buffer, u32, Topology) {
        match (&self.wireframe_buffer, wireframe) {
            (Some(buffer), true) => (buffer, self.wireframe_elements, Topology::Lines),
            _ => (&self.index_buffer, self.num_elements, self.topology),
        }
    }
}

fn center_of(geometry: &Geometry) -> Vector3<f32> {
    if geometry.vertices.is_empty() {
        return Vector3::zero();
    }
    let sum = geometry
        .vertices
        .iter()
        .fold(Vector3::zero(), |acc, v| acc + Vector3::from(v.position));
    sum / geometry.vertices.len() as f32
}
