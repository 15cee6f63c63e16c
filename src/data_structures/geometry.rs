//! CPU-side geometry and the procedural builders the lessons use.
//!
//! A [`Geometry`] is a vertex list plus an index list, interpreted either as
//! triangles or as line segments. Builders follow the usual conventions:
//! counter-clockwise front faces, y up, texture `v` growing downwards the way
//! wgpu samples images.

use std::collections::HashSet;
use std::f32::consts::{FRAC_PI_2, TAU};

use cgmath::{InnerSpace, Matrix3, Rad, Vector2, Vector3, VectorSpace, Zero};

use crate::math::curve::Curve3;

pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
    pub normal: [f32; 3],
    pub tangent: [f32; 3],
    pub bitangent: [f32; 3],
    /// Per-vertex tint, multiplied with the material colour.
    pub color: [f32; 3],
}

impl MeshVertex {
    pub fn new(position: Vector3<f32>, tex_coords: [f32; 2], normal: Vector3<f32>) -> Self {
        Self {
            position: position.into(),
            tex_coords,
            normal: normal.into(),
            tangent: [0.0; 3],
            bitangent: [0.0; 3],
            color: [1.0; 3],
        }
    }

    pub fn at(position: Vector3<f32>) -> Self {
        Self::new(position, [0.0, 0.0], Vector3::unit_z())
    }

    pub fn with_color(mut self, color: [f32; 3]) -> Self {
        self.color = color;
        self
    }
}

impl Vertex for MeshVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 5]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // Tangent and bitangent
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 11]>() as wgpu::BufferAddress,
                    shader_location: 4,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 14]>() as wgpu::BufferAddress,
                    shader_location: 5,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Topology {
    #[default]
    Triangles,
    Lines,
}

impl Topology {
    pub fn to_wgpu(self) -> wgpu::PrimitiveTopology {
        match self {
            Topology::Triangles => wgpu::PrimitiveTopology::TriangleList,
            Topology::Lines => wgpu::PrimitiveTopology::LineList,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Geometry {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
    pub topology: Topology,
}

impl Geometry {
    pub fn new(vertices: Vec<MeshVertex>, indices: Vec<u32>, topology: Topology) -> Self {
        Self {
            vertices,
            indices,
            topology,
        }
    }

    /// Number of triangles or line segments.
    pub fn primitive_count(&self) -> usize {
        match self.topology {
            Topology::Triangles => self.indices.len() / 3,
            Topology::Lines => self.indices.len() / 2,
        }
    }

    /// Axis aligned box centered on the origin, one quad per face.
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        let mut geometry = Self::default();
        // (u axis, v axis, w axis, u dir, v dir, face width, face height, offset along w)
        let faces: [(usize, usize, usize, f32, f32, f32, f32, f32); 6] = [
            (2, 1, 0, -1.0, -1.0, depth, height, width),
            (2, 1, 0, 1.0, -1.0, depth, height, -width),
            (0, 2, 1, 1.0, 1.0, width, depth, height),
            (0, 2, 1, 1.0, -1.0, width, depth, -height),
            (0, 1, 2, 1.0, -1.0, width, height, depth),
            (0, 1, 2, -1.0, -1.0, width, height, -depth),
        ];
        for (u, v, w, udir, vdir, face_width, face_height, face_depth) in faces {
            let start = geometry.vertices.len() as u32;
            for iy in 0..2 {
                for ix in 0..2 {
                    let mut position = [0.0f32; 3];
                    position[u] = (ix as f32 * face_width - face_width / 2.0) * udir;
                    position[v] = (iy as f32 * face_height - face_height / 2.0) * vdir;
                    position[w] = face_depth / 2.0;
                    let mut normal = [0.0f32; 3];
                    normal[w] = face_depth.signum();
                    geometry.vertices.push(MeshVertex::new(
                        position.into(),
                        [ix as f32, iy as f32],
                        normal.into(),
                    ));
                }
            }
            let (a, b, c, d) = (start, start + 2, start + 3, start + 1);
            geometry.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
        geometry.compute_tangents();
        geometry
    }

    /// The 12 edges of a box as line segments.
    pub fn cuboid_edges(width: f32, height: f32, depth: f32) -> Self {
        let (x, y, z) = (width / 2.0, height / 2.0, depth / 2.0);
        let vertices = [
            (-x, -y, -z),
            (x, -y, -z),
            (x, y, -z),
            (-x, y, -z),
            (-x, -y, z),
            (x, -y, z),
            (x, y, z),
            (-x, y, z),
        ]
        .into_iter()
        .map(|(x, y, z)| MeshVertex::at(Vector3::new(x, y, z)))
        .collect();
        let indices = vec![
            0, 1, 1, 2, 2, 3, 3, 0, // back
            4, 5, 5, 6, 6, 7, 7, 4, // front
            0, 4, 1, 5, 2, 6, 3, 7, // sides
        ];
        Self::new(vertices, indices, Topology::Lines)
    }

    /// Rectangle in the XY plane facing +Z.
    pub fn plane(width: f32, height: f32, width_segments: u32, height_segments: u32) -> Self {
        let grid_x = width_segments.max(1);
        let grid_y = height_segments.max(1);
        let segment_width = width / grid_x as f32;
        let segment_height = height / grid_y as f32;

        let mut vertices = Vec::with_capacity(((grid_x + 1) * (grid_y + 1)) as usize);
        for iy in 0..=grid_y {
            let y = iy as f32 * segment_height - height / 2.0;
            for ix in 0..=grid_x {
                let x = ix as f32 * segment_width - width / 2.0;
                vertices.push(MeshVertex::new(
                    Vector3::new(x, -y, 0.0),
                    [ix as f32 / grid_x as f32, iy as f32 / grid_y as f32],
                    Vector3::unit_z(),
                ));
            }
        }

        let mut indices = Vec::with_capacity((grid_x * grid_y * 6) as usize);
        let row = grid_x + 1;
        for iy in 0..grid_y {
            for ix in 0..grid_x {
                let a = ix + row * iy;
                let b = ix + row * (iy + 1);
                let c = ix + 1 + row * (iy + 1);
                let d = ix + 1 + row * iy;
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }
        let mut geometry = Self::new(vertices, indices, Topology::Triangles);
        geometry.compute_tangents();
        geometry
    }

    /// Every distinct edge of a triangle geometry, as line segments.
    pub fn wireframe(&self) -> Self {
        if self.topology == Topology::Lines {
            return self.clone();
        }
        let mut seen = HashSet::new();
        let mut indices = Vec::new();
        for triangle in self.indices.chunks_exact(3) {
            for (a, b) in [
                (triangle[0], triangle[1]),
                (triangle[1], triangle[2]),
                (triangle[2], triangle[0]),
            ] {
                if seen.insert((a.min(b), a.max(b))) {
                    indices.extend_from_slice(&[a, b]);
                }
            }
        }
        Self::new(self.vertices.clone(), indices, Topology::Lines)
    }

    /// Red, green and blue lines along x, y and z.
    pub fn axes(size: f32) -> Self {
        let axis = |direction: Vector3<f32>, from: [f32; 3], to: [f32; 3]| {
            [
                MeshVertex::at(Vector3::zero()).with_color(from),
                MeshVertex::at(direction * size).with_color(to),
            ]
        };
        let vertices = [
            axis(Vector3::unit_x(), [1.0, 0.0, 0.0], [1.0, 0.6, 0.0]),
            axis(Vector3::unit_y(), [0.0, 1.0, 0.0], [0.6, 1.0, 0.0]),
            axis(Vector3::unit_z(), [0.0, 0.0, 1.0], [0.0, 0.6, 1.0]),
        ]
        .concat();
        Self::new(vertices, (0..6).collect(), Topology::Lines)
    }

    /// A tube of `radius` swept along `curve`, oriented by Frenet frames.
    pub fn tube(
        curve: &(impl Curve3 + ?Sized),
        tubular_segments: u32,
        radius: f32,
        radial_segments: u32,
        closed: bool,
    ) -> Self {
        let tubular_segments = tubular_segments.max(1);
        let radial_segments = radial_segments.max(3);
        let frames = FrenetFrames::compute(curve, tubular_segments as usize, closed);

        let mut vertices = Vec::new();
        for i in 0..=tubular_segments {
            // A closed tube repeats its first ring so uvs can wrap.
            let ring = if closed && i == tubular_segments { 0 } else { i } as usize;
            let u = ring as f32 / tubular_segments as f32;
            let point = curve.point_at(u);
            let (n, b) = (frames.normals[ring], frames.binormals[ring]);
            for j in 0..=radial_segments {
                let v = j as f32 / radial_segments as f32 * TAU;
                let (sin, cos) = (v.sin(), -v.cos());
                let normal = (n * cos + b * sin).normalize();
                vertices.push(MeshVertex::new(
                    point + normal * radius,
                    [i as f32 / tubular_segments as f32, j as f32 / radial_segments as f32],
                    normal,
                ));
            }
        }

        let mut indices = Vec::new();
        let row = radial_segments + 1;
        for j in 1..=tubular_segments {
            for i in 1..=radial_segments {
                let a = row * (j - 1) + (i - 1);
                let b = row * j + (i - 1);
                let c = row * j + i;
                let d = row * (j - 1) + i;
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }
        let mut geometry = Self::new(vertices, indices, Topology::Triangles);
        geometry.compute_tangents();
        geometry
    }

    /// A cylinder of `length` along y with half-sphere caps of `radius`.
    pub fn capsule(radius: f32, length: f32, cap_segments: u32, radial_segments: u32) -> Self {
        let cap_segments = cap_segments.max(1);
        let radial_segments = radial_segments.max(3);
        let half = length / 2.0;

        // Profile from the south pole to the north pole, revolved around y.
        let mut profile = Vec::new();
        for k in 0..=cap_segments {
            let a = -FRAC_PI_2 + FRAC_PI_2 * k as f32 / cap_segments as f32;
            profile.push(Vector2::new(radius * a.cos(), -half + radius * a.sin()));
        }
        for k in 0..=cap_segments {
            let a = FRAC_PI_2 * k as f32 / cap_segments as f32;
            profile.push(Vector2::new(radius * a.cos(), half + radius * a.sin()));
        }

        let n = profile.len() as u32;
        let total = length + 2.0 * radius;
        let mut vertices = Vec::new();
        for i in 0..=radial_segments {
            let phi = i as f32 / radial_segments as f32 * TAU;
            let (sin, cos) = (phi.sin(), phi.cos());
            for p in &profile {
                let position = Vector3::new(p.x * sin, p.y, p.x * cos);
                let axis = Vector3::new(0.0, p.y.clamp(-half, half), 0.0);
                let normal = position - axis;
                let normal = if normal.magnitude2() > 0.0 {
                    normal.normalize()
                } else {
                    Vector3::unit_y() * p.y.signum()
                };
                vertices.push(MeshVertex::new(
                    position,
                    [i as f32 / radial_segments as f32, 1.0 - (p.y + total / 2.0) / total],
                    normal,
                ));
            }
        }

        let mut indices = Vec::new();
        for i in 0..radial_segments {
            for j in 0..n - 1 {
                let base = j + i * n;
                let (a, b, c, d) = (base, base + n, base + n + 1, base + 1);
                indices.extend_from_slice(&[a, b, d, c, d, b]);
            }
        }
        let mut geometry = Self::new(vertices, indices, Topology::Triangles);
        geometry.compute_tangents();
        geometry
    }

    /// Sierpinski triangle subdivided `level` times, in the XY plane.
    pub fn sierpinski(level: u32) -> Self {
        let corner = |i: f32| Vector2::new((i * TAU / 3.0).cos(), (i * TAU / 3.0).sin());
        let mut triangles = vec![[corner(0.0), corner(1.0), corner(2.0)]];
        for _ in 0..level {
            triangles = triangles
                .into_iter()
                .flat_map(|[a, b, c]| {
                    let ab = a.lerp(b, 0.5);
                    let bc = b.lerp(c, 0.5);
                    let ca = c.lerp(a, 0.5);
                    [[a, ab, ca], [ab, b, bc], [ca, bc, c]]
                })
                .collect();
        }
        let vertices: Vec<_> = triangles
            .iter()
            .flatten()
            .map(|p| MeshVertex::at(Vector3::new(p.x, p.y, 0.0)))
            .collect();
        let indices = (0..vertices.len() as u32).collect();
        Self::new(vertices, indices, Topology::Triangles)
    }

    /// A flat ribbon of `width` following `points` in the XY plane.
    ///
    /// Interior joints are mitred. When the last point equals the first the
    /// ribbon is treated as closed and the seam is mitred too.
    pub fn line_ribbon(points: &[Vector3<f32>], width: f32) -> Self {
        let count = points.len();
        if count < 2 {
            return Self::default();
        }
        let closed = (points[0] - points[count - 1]).magnitude2() < 1e-12;
        let side = |d: Vector3<f32>| Vector3::new(-d.y, d.x, 0.0).normalize();
        let direction = |from: usize, to: usize| (points[to] - points[from]).normalize();

        let mut vertices = Vec::with_capacity(count * 2);
        for i in 0..count {
            let incoming = if i > 0 {
                Some(direction(i - 1, i))
            } else if closed {
                Some(direction(count - 2, 0))
            } else {
                None
            };
            let outgoing = if i + 1 < count {
                Some(direction(i, i + 1))
            } else if closed {
                Some(direction(0, 1))
            } else {
                None
            };
            let offset = match (incoming, outgoing) {
                (Some(a), Some(b)) => {
                    let (na, nb) = (side(a), side(b));
                    let miter = (na + nb).normalize();
                    // Keep the ribbon width constant across the joint.
                    miter * (width / 2.0) / miter.dot(nb).max(0.1)
                }
                (Some(d), None) | (None, Some(d)) => side(d) * (width / 2.0),
                (None, None) => Vector3::zero(),
            };
            let v = i as f32 / (count - 1) as f32;
            vertices.push(MeshVertex::new(points[i] + offset, [0.0, v], Vector3::unit_z()));
            vertices.push(MeshVertex::new(points[i] - offset, [1.0, v], Vector3::unit_z()));
        }

        let mut indices = Vec::with_capacity((count - 1) * 6);
        for i in 0..(count as u32 - 1) {
            let (a, b, c, d) = (2 * i, 2 * i + 1, 2 * i + 2, 2 * i + 3);
            indices.extend_from_slice(&[a, b, c, b, d, c]);
        }
        Self::new(vertices, indices, Topology::Triangles)
    }

    /// Square outline of side `size` drawn as a ribbon of `width`.
    pub fn ring_square(size: f32, width: f32) -> Self {
        let h = size / 2.0;
        Self::line_ribbon(
            &[
                Vector3::new(-h, -h, 0.0),
                Vector3::new(h, -h, 0.0),
                Vector3::new(h, h, 0.0),
                Vector3::new(-h, h, 0.0),
                Vector3::new(-h, -h, 0.0),
            ],
            width,
        )
    }

    pub fn translated(mut self, offset: Vector3<f32>) -> Self {
        for v in &mut self.vertices {
            v.position = (Vector3::from(v.position) + offset).into();
        }
        self
    }

    pub fn scaled(mut self, factor: f32) -> Self {
        for v in &mut self.vertices {
            v.position = (Vector3::from(v.position) * factor).into();
        }
        self
    }

    /// Rotate positions and every direction attribute.
    pub fn rotated(mut self, rotation: Matrix3<f32>) -> Self {
        for v in &mut self.vertices {
            v.position = (rotation * Vector3::from(v.position)).into();
            v.normal = (rotation * Vector3::from(v.normal)).into();
            v.tangent = (rotation * Vector3::from(v.tangent)).into();
            v.bitangent = (rotation * Vector3::from(v.bitangent)).into();
        }
        self
    }

    /// Move the bounding box center to the origin.
    pub fn centered(self) -> Self {
        let Some(first) = self.vertices.first() else {
            return self;
        };
        let (mut min, mut max) = (Vector3::from(first.position), Vector3::from(first.position));
        for v in &self.vertices {
            let p = Vector3::from(v.position);
            min = Vector3::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z));
            max = Vector3::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z));
        }
        self.translated(-(min + max) / 2.0)
    }

    /// Append geometries of the same topology, rebasing their indices.
    pub fn merge(mut self, others: impl IntoIterator<Item = Geometry>) -> Self {
        for other in others {
            debug_assert_eq!(self.topology, other.topology);
            let base = self.vertices.len() as u32;
            self.vertices.extend(other.vertices);
            self.indices.extend(other.indices.into_iter().map(|i| i + base));
        }
        self
    }

    /// Push each vertex along its normal by the sampled height times `scale`.
    pub fn displaced(mut self, height_map: &image::GrayImage, scale: f32) -> Self {
        let (width, height) = height_map.dimensions();
        if width == 0 || height == 0 {
            return self;
        }
        for v in &mut self.vertices {
            let x = ((v.tex_coords[0].clamp(0.0, 1.0) * (width - 1) as f32).round()) as u32;
            let y = ((v.tex_coords[1].clamp(0.0, 1.0) * (height - 1) as f32).round()) as u32;
            let h = height_map.get_pixel(x, y).0[0] as f32 / 255.0;
            v.position = (Vector3::from(v.position) + Vector3::from(v.normal) * h * scale).into();
        }
        self
    }

    /// Tangents and bitangents from positions and uvs, averaged per vertex.
    ///
    /// Needed for normal mapping. Lines are left untouched.
    pub fn compute_tangents(&mut self) {
        if self.topology != Topology::Triangles {
            return;
        }
        let vertices = &mut self.vertices;
        let mut triangles_included = vec![0u32; vertices.len()];
        for v in vertices.iter_mut() {
            v.tangent = [0.0; 3];
            v.bitangent = [0.0; 3];
        }

        for c in self.indices.chunks_exact(3) {
            let v0 = vertices[c[0] as usize];
            let v1 = vertices[c[1] as usize];
            let v2 = vertices[c[2] as usize];

            let pos0: Vector3<_> = v0.position.into();
            let pos1: Vector3<_> = v1.position.into();
            let pos2: Vector3<_> = v2.position.into();

            let uv0: Vector2<_> = v0.tex_coords.into();
            let uv1: Vector2<_> = v1.tex_coords.into();
            let uv2: Vector2<_> = v2.tex_coords.into();

            let delta_pos1 = pos1 - pos0;
            let delta_pos2 = pos2 - pos0;
            let delta_uv1 = uv1 - uv0;
            let delta_uv2 = uv2 - uv0;

            // Solves
            //     delta_pos1 = delta_uv1.x * T + delta_uv1.y * B
            //     delta_pos2 = delta_uv2.x * T + delta_uv2.y * B
            let det = delta_uv1.x * delta_uv2.y - delta_uv1.y * delta_uv2.x;
            if det.abs() < f32::EPSILON {
                continue;
            }
            let r = 1.0 / det;
            let tangent = (delta_pos1 * delta_uv2.y - delta_pos2 * delta_uv1.y) * r;
            // Flipped for right-handed normal maps with wgpu's uv origin
            let bitangent = (delta_pos2 * delta_uv1.x - delta_pos1 * delta_uv2.x) * -r;

            for &i in c {
                let v = &mut vertices[i as usize];
                v.tangent = (tangent + Vector3::from(v.tangent)).into();
                v.bitangent = (bitangent + Vector3::from(v.bitangent)).into();
                triangles_included[i as usize] += 1;
            }
        }

        for (v, n) in vertices.iter_mut().zip(triangles_included) {
            if n == 0 {
                continue;
            }
            let denom = 1.0 / n as f32;
            v.tangent = (Vector3::from(v.tangent) * denom).into();
            v.bitangent = (Vector3::from(v.bitangent) * denom).into();
        }
    }
}

/// Rotation-minimizing frames along a curve.
pub struct FrenetFrames {
    pub tangents: Vec<Vector3<f32>>,
    pub normals: Vec<Vector3<f32>>,
    pub binormals: Vec<Vector3<f32>>,
}

impl FrenetFrames {
    pub fn compute(curve: &(impl Curve3 + ?Sized), segments: usize, closed: bool) -> Self {
        let tangents: Vec<_> = (0..=segments)
            .map(|i| curve.tangent_at(i as f32 / segments as f32))
            .collect();

        // Start with the axis least aligned with the first tangent.
        let t0 = tangents[0];
        let (tx, ty, tz) = (t0.x.abs(), t0.y.abs(), t0.z.abs());
        let mut min = f32::MAX;
        let mut normal = Vector3::unit_x();
        if tx <= min {
            min = tx;
            normal = Vector3::unit_x();
        }
        if ty <= min {
            min = ty;
            normal = Vector3::unit_y();
        }
        if tz <= min {
            normal = Vector3::unit_z();
        }
        let vec = t0.cross(normal).normalize();

        let mut normals = vec![Vector3::zero(); segments + 1];
        let mut binormals = vec![Vector3::zero(); segments + 1];
        normals[0] = t0.cross(vec);
        binormals[0] = t0.cross(normals[0]);

        for i in 1..=segments {
            normals[i] = normals[i - 1];
            let axis = tangents[i - 1].cross(tangents[i]);
            if axis.magnitude() > f32::EPSILON {
                let theta = tangents[i - 1].dot(tangents[i]).clamp(-1.0, 1.0).acos();
                normals[i] = Matrix3::from_axis_angle(axis.normalize(), Rad(theta)) * normals[i];
            }
            binormals[i] = tangents[i].cross(normals[i]);
        }

        if closed {
            let mut theta = normals[0].dot(normals[segments]).clamp(-1.0, 1.0).acos() / segments as f32;
            if tangents[0].dot(normals[0].cross(normals[segments])) > 0.0 {
                theta = -theta;
            }
            for i in 1..=segments {
                normals[i] = Matrix3::from_axis_angle(tangents[i], Rad(theta * i as f32)) * normals[i];
                binormals[i] = tangents[i].cross(normals[i]);
            }
        }

        Self {
            tangents,
            normals,
            binormals,
        }
    }
}

/// `floor(sin(t/1000)·4 + 4)`, the subdivision level animated over time in ms.
pub fn sierpinski_level(time_ms: f64) -> u32 {
    ((time_ms / 1000.0).sin() * 4.0 + 4.0).floor().clamp(0.0, 8.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::curve::{CatmullRomCurve3, CurvePath, LineCurve3};

    fn face_normal(g: &Geometry, tri: usize) -> Vector3<f32> {
        let p = |i: usize| Vector3::from(g.vertices[g.indices[tri * 3 + i] as usize].position);
        (p(1) - p(0)).cross(p(2) - p(0)).normalize()
    }

    #[test]
    fn cuboid_faces_point_outwards() {
        let g = Geometry::cuboid(1.0, 2.0, 3.0);
        assert_eq!(g.vertices.len(), 24);
        assert_eq!(g.indices.len(), 36);
        for tri in 0..12 {
            let n = face_normal(&g, tri);
            let vertex_normal = Vector3::from(g.vertices[g.indices[tri * 3] as usize].normal);
            assert!((n - vertex_normal).magnitude() < 1e-5, "triangle {}", tri);
        }
        let max_y = g.vertices.iter().map(|v| v.position[1]).fold(f32::MIN, f32::max);
        assert_eq!(max_y, 1.0);
    }

    #[test]
    fn cuboid_edges_and_wireframe() {
        let edges = Geometry::cuboid_edges(0.2, 0.2, 0.2);
        assert_eq!(edges.topology, Topology::Lines);
        assert_eq!(edges.primitive_count(), 12);

        // each quad contributes 4 outline edges plus its diagonal
        let wire = Geometry::cuboid(1.0, 1.0, 1.0).wireframe();
        assert_eq!(wire.primitive_count(), 30);
    }

    #[test]
    fn plane_faces_plus_z() {
        let g = Geometry::plane(1.0, 1.0, 4, 2);
        assert_eq!(g.vertices.len(), 15);
        assert_eq!(g.primitive_count(), 16);
        for tri in 0..g.primitive_count() {
            assert!((face_normal(&g, tri) - Vector3::unit_z()).magnitude() < 1e-5);
        }
        // uv origin at the top left corner
        assert_eq!(g.vertices[0].position, [-0.5, 0.5, 0.0]);
        assert_eq!(g.vertices[0].tex_coords, [0.0, 0.0]);
        let t = Vector3::from(g.vertices[0].tangent);
        assert!((t - Vector3::unit_x()).magnitude() < 1e-5);
    }

    #[test]
    fn sierpinski_triples_per_level() {
        assert_eq!(Geometry::sierpinski(0).primitive_count(), 1);
        assert_eq!(Geometry::sierpinski(1).primitive_count(), 3);
        assert_eq!(Geometry::sierpinski(4).primitive_count(), 81);
        let g = Geometry::sierpinski(1);
        for tri in 0..3 {
            assert!(face_normal(&g, tri).z > 0.99);
        }
        assert_eq!(sierpinski_level(0.0), 4);
        assert!(sierpinski_level(std::f64::consts::FRAC_PI_2 * 1000.0) == 8);
        assert_eq!(sierpinski_level(-std::f64::consts::FRAC_PI_2 * 1000.0), 0);
    }

    #[test]
    fn tube_surrounds_its_curve() {
        let line = LineCurve3::new(Vector3::zero(), Vector3::new(0.0, 0.0, 2.0));
        let tube = Geometry::tube(&line, 4, 0.1, 8, false);
        assert_eq!(tube.vertices.len(), 5 * 9);
        assert_eq!(tube.primitive_count(), 4 * 8 * 2);
        for v in &tube.vertices {
            let p = Vector3::from(v.position);
            let radial = (p.x * p.x + p.y * p.y).sqrt();
            assert!((radial - 0.1).abs() < 1e-4);
        }
    }

    #[test]
    fn tube_along_a_closed_spline_has_finite_frames() {
        let curve = CatmullRomCurve3::new(
            vec![
                Vector3::new(0.0, 0.0, 0.0),
                Vector3::new(1.0, 0.0, 0.0),
                Vector3::new(1.0, 0.0, 1.0),
                Vector3::new(0.0, 1.0, 1.0),
            ],
            true,
        );
        let tube = Geometry::tube(&curve, 32, 0.05, 6, true);
        assert!(tube
            .vertices
            .iter()
            .all(|v| v.position.iter().chain(v.normal.iter()).all(|c| c.is_finite())));

        let path = CurvePath::polyline(&[Vector3::zero(), Vector3::unit_y()], false);
        assert_eq!(Geometry::tube(&path, 8, 0.01, 4, false).primitive_count(), 64);
    }

    #[test]
    fn capsule_spans_length_plus_caps() {
        let g = Geometry::capsule(0.5, 2.0, 4, 8);
        let ys: Vec<f32> = g.vertices.iter().map(|v| v.position[1]).collect();
        let max = ys.iter().cloned().fold(f32::MIN, f32::max);
        let min = ys.iter().cloned().fold(f32::MAX, f32::min);
        assert!((max - 1.5).abs() < 1e-5);
        assert!((min + 1.5).abs() < 1e-5);
        for v in &g.vertices {
            assert!((Vector3::from(v.normal).magnitude() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn merge_rebases_indices() {
        let a = Geometry::cuboid_edges(1.0, 1.0, 1.0);
        let b = a.clone().translated(Vector3::new(2.0, 0.0, 0.0));
        let merged = a.merge([b]);
        assert_eq!(merged.vertices.len(), 16);
        assert_eq!(merged.indices[24], 8);
        assert_eq!(*merged.indices.iter().max().unwrap(), 15);
        let centered = merged.centered();
        let max_x = centered.vertices.iter().map(|v| v.position[0]).fold(f32::MIN, f32::max);
        assert!((max_x - 1.5).abs() < 1e-5);
    }

    #[test]
    fn ribbon_keeps_its_width() {
        let ring = Geometry::ring_square(1.0, 0.05);
        assert_eq!(ring.vertices.len(), 10);
        assert_eq!(ring.primitive_count(), 8);
        // straight segment: both edges half a width from the line
        let open = Geometry::line_ribbon(&[Vector3::zero(), Vector3::unit_x()], 0.2);
        assert!((open.vertices[0].position[1] - 0.1).abs() < 1e-6);
        assert!((open.vertices[1].position[1] + 0.1).abs() < 1e-6);
        // the closed corner is mitred outwards
        let corner = Vector3::from(ring.vertices[1].position);
        assert!((corner - Vector3::new(-0.5, -0.5, 0.0)).magnitude() > 0.025);
    }

    #[test]
    fn displacement_follows_normals() {
        let plane = Geometry::plane(1.0, 1.0, 1, 1);
        let map = image::GrayImage::from_pixel(2, 2, image::Luma([255]));
        let displaced = plane.displaced(&map, 0.03);
        assert!(displaced.vertices.iter().all(|v| (v.position[2] - 0.03).abs() < 1e-6));
    }
}
