//! Perspective camera and the controls that move it.
//!
//! The camera is plain data: a position, a target and a projection. Controls
//! mutate it from input events and are updated once per frame before the
//! scene is drawn.

use cgmath::{EuclideanSpace, Matrix4, Point3, Vector3, perspective};

pub mod fly;
pub mod orbit;

pub use fly::FlyControls;
pub use orbit::OrbitControls;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Vector3<f32>,
    pub target: Vector3<f32>,
    pub up: Vector3<f32>,
    /// Vertical field of view in degrees.
    pub fovy: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 1.0),
            target: Vector3::new(0.0, 0.0, 0.0),
            up: Vector3::unit_y(),
            fovy: 75.0,
            aspect: 1.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl PerspectiveCamera {
    /// Camera with the given vertical field of view, near 0.1 and far 2000.
    pub fn new(fovy: f32, aspect: f32) -> Self {
        Self {
            fovy,
            aspect,
            far: 2000.0,
            ..Default::default()
        }
    }

    pub fn with_clip(mut self, near: f32, far: f32) -> Self {
        self.near = near;
        self.far = far;
        self
    }

    pub fn at(mut self, x: f32, y: f32, z: f32) -> Self {
        self.position = Vector3::new(x, y, z);
        self
    }

    pub fn look_at(&mut self, target: Vector3<f32>) {
        self.target = target;
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(
            Point3::from_vec(self.position),
            Point3::from_vec(self.target),
            self.up,
        )
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(cgmath::Deg(self.fovy), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    /// Homogeneous so the struct keeps 16 byte alignment.
    pub view_position: [f32; 4],
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &PerspectiveCamera) {
        self.view_position = camera.position.extend(1.0).into();
        self.view_proj = camera.view_projection().into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// Camera position on a sphere of `radius` picked by a pointer ratio.
///
/// `rx` turns the camera around the y axis, `ry` moves it from the north to
/// the south pole. Both are snapped to multiples of 2^-10 first so tiny
/// pointer jitter does not move the camera.
pub fn pointer_orbit_position(rx: f32, ry: f32, radius: f32) -> Vector3<f32> {
    let quantize = |v: f32| (v * 1024.0).round() / 1024.0;
    let (rx, ry) = (quantize(rx), quantize(ry));
    let (theta, phi) = (rx * std::f32::consts::TAU, ry * std::f32::consts::PI);
    Vector3::new(
        radius * theta.sin() * phi.sin(),
        radius * phi.cos(),
        radius * theta.cos() * phi.sin(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{InnerSpace, Vector4};

    #[test]
    fn target_projects_to_the_center() {
        let mut camera = PerspectiveCamera::new(55.0, 16.0 / 9.0).at(2.0, 2.0, 6.0);
        camera.look_at(Vector3::new(0.0, 0.0, 0.0));
        let clip = camera.view_projection() * Vector4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        assert!((0.0..=1.0).contains(&ndc.z));
    }

    #[test]
    fn zero_height_keeps_the_aspect() {
        let mut camera = PerspectiveCamera::default();
        camera.set_aspect(800, 400);
        assert_eq!(camera.aspect, 2.0);
        camera.set_aspect(800, 0);
        assert_eq!(camera.aspect, 2.0);
    }

    #[test]
    fn pointer_in_the_middle_looks_from_the_south_pole() {
        let p = pointer_orbit_position(0.5, 0.5, 3.0);
        assert!((p.magnitude() - 3.0).abs() < 1e-5);
        assert!((p - Vector3::new(0.0, 0.0, -3.0)).magnitude() < 1e-5);

        let top = pointer_orbit_position(0.0, 0.0, 3.0);
        assert!((top - Vector3::new(0.0, 3.0, 0.0)).magnitude() < 1e-5);
    }

    #[test]
    fn pointer_jitter_is_quantized() {
        let a = pointer_orbit_position(0.3, 0.6, 3.0);
        let b = pointer_orbit_position(0.3 + 1e-4, 0.6 - 1e-4, 3.0);
        assert_eq!(a, b);
    }

    #[test]
    fn uniform_carries_the_eye() {
        let camera = PerspectiveCamera::default().at(1.0, 2.0, 3.0);
        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(&camera);
        assert_eq!(uniform.view_position, [1.0, 2.0, 3.0, 1.0]);
    }
}
