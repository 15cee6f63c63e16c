use std::f32::consts::{PI, TAU};

use cgmath::{InnerSpace, Vector3, Zero};
use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
};

use crate::camera::PerspectiveCamera;

const EPS: f32 = 0.000001;

/// Spherical coordinates with y up: `phi` from the +y axis, `theta` around it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spherical {
    pub radius: f32,
    pub phi: f32,
    pub theta: f32,
}

impl Spherical {
    pub fn from_vector(v: Vector3<f32>) -> Self {
        let radius = v.magnitude();
        if radius == 0.0 {
            return Self {
                radius,
                phi: 0.0,
                theta: 0.0,
            };
        }
        Self {
            radius,
            phi: (v.y / radius).clamp(-1.0, 1.0).acos(),
            theta: v.x.atan2(v.z),
        }
    }

    pub fn to_vector(&self) -> Vector3<f32> {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vector3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }

    /// Keep `phi` away from the poles, where the view direction degenerates.
    pub fn make_safe(&mut self) {
        self.phi = self.phi.clamp(EPS, PI - EPS);
    }
}

/// Drag to orbit around a target, right-drag to pan, wheel to dolly.
#[derive(Clone, Debug)]
pub struct OrbitControls {
    pub target: Vector3<f32>,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub enabled: bool,
    spherical_delta: Spherical,
    scale: f32,
    pan_offset: Vector3<f32>,
    viewport: (u32, u32),
    cursor: Option<PhysicalPosition<f64>>,
    rotating: bool,
    panning: bool,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            target: Vector3::zero(),
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            enable_damping: false,
            damping_factor: 0.05,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            enabled: true,
            spherical_delta: Spherical {
                radius: 0.0,
                phi: 0.0,
                theta: 0.0,
            },
            scale: 1.0,
            pan_offset: Vector3::zero(),
            viewport: (1, 1),
            cursor: None,
            rotating: false,
            panning: false,
        }
    }
}

impl OrbitControls {
    pub fn new(target: Vector3<f32>, viewport: (u32, u32)) -> Self {
        Self {
            target,
            viewport: (viewport.0.max(1), viewport.1.max(1)),
            ..Default::default()
        }
    }

    pub fn with_damping(mut self) -> Self {
        self.enable_damping = true;
        self
    }

    pub fn with_zoom_speed(mut self, zoom_speed: f32) -> Self {
        self.zoom_speed = zoom_speed;
        self
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width.max(1), height.max(1));
    }

    fn zoom_scale(&self) -> f32 {
        0.95f32.powf(self.zoom_speed)
    }

    /// Turn around the y axis.
    pub fn rotate_left(&mut self, angle: f32) {
        self.spherical_delta.theta -= angle;
    }

    pub fn rotate_up(&mut self, angle: f32) {
        self.spherical_delta.phi -= angle;
    }

    /// A pointer drag of `(dx, dy)` pixels. A drag over the full viewport
    /// height turns the camera once around.
    pub fn rotate_by_pixels(&mut self, dx: f32, dy: f32) {
        let height = self.viewport.1 as f32;
        self.rotate_left(TAU * dx * self.rotate_speed / height);
        self.rotate_up(TAU * dy * self.rotate_speed / height);
    }

    pub fn dolly_in(&mut self) {
        self.scale *= self.zoom_scale();
    }

    pub fn dolly_out(&mut self) {
        self.scale /= self.zoom_scale();
    }

    /// Screen space pan by `(dx, dy)` pixels, scaled so the point under the
    /// target follows the pointer.
    pub fn pan_by_pixels(&mut self, camera: &PerspectiveCamera, dx: f32, dy: f32) {
        let offset = camera.position - camera.target;
        let target_distance = offset.magnitude() * (camera.fovy / 2.0).to_radians().tan();
        let height = self.viewport.1 as f32;
        let forward = (camera.target - camera.position).normalize();
        let right = forward.cross(camera.up).normalize();
        let up = right.cross(forward);
        let left_distance = 2.0 * dx * self.pan_speed * target_distance / height;
        let up_distance = 2.0 * dy * self.pan_speed * target_distance / height;
        self.pan_offset += right * -left_distance + up * up_distance;
    }

    /// Feed a window event. Returns whether the controls used it.
    pub fn handle_window_event(&mut self, camera: &PerspectiveCamera, event: &WindowEvent) -> bool {
        if !self.enabled {
            return false;
        }
        match event {
            WindowEvent::Resized(size) => {
                self.set_viewport(size.width, size.height);
                false
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let pressed = *state == ElementState::Pressed;
                match button {
                    MouseButton::Left => self.rotating = pressed,
                    MouseButton::Right | MouseButton::Middle => self.panning = pressed,
                    _ => return false,
                }
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                let last = self.cursor.replace(*position);
                let Some(last) = last else {
                    return false;
                };
                let (dx, dy) = ((position.x - last.x) as f32, (position.y - last.y) as f32);
                if self.rotating {
                    self.rotate_by_pixels(dx, dy);
                    true
                } else if self.panning {
                    self.pan_by_pixels(camera, dx, dy);
                    true
                } else {
                    false
                }
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                self.rotating = false;
                self.panning = false;
                false
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let dy = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -*y,
                    MouseScrollDelta::PixelDelta(p) => -p.y as f32,
                };
                if dy < 0.0 {
                    self.dolly_in();
                } else if dy > 0.0 {
                    self.dolly_out();
                }
                true
            }
            _ => false,
        }
    }

    /// Apply the accumulated input to `camera`. Call once per frame.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) {
        let offset = camera.position - self.target;
        let mut spherical = Spherical::from_vector(offset);

        if self.enable_damping {
            spherical.theta += self.spherical_delta.theta * self.damping_factor;
            spherical.phi += self.spherical_delta.phi * self.damping_factor;
        } else {
            spherical.theta += self.spherical_delta.theta;
            spherical.phi += self.spherical_delta.phi;
        }
        spherical.make_safe();
        spherical.radius = (spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);

        if self.enable_damping {
            self.target += self.pan_offset * self.damping_factor;
        } else {
            self.target += self.pan_offset;
        }

        camera.position = self.target + spherical.to_vector();
        camera.look_at(self.target);

        if self.enable_damping {
            self.spherical_delta.theta *= 1.0 - self.damping_factor;
            self.spherical_delta.phi *= 1.0 - self.damping_factor;
            self.pan_offset *= 1.0 - self.damping_factor;
        } else {
            self.spherical_delta.theta = 0.0;
            self.spherical_delta.phi = 0.0;
            self.pan_offset = Vector3::zero();
        }
        self.scale = 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> PerspectiveCamera {
        PerspectiveCamera::new(55.0, 1.0).at(0.0, 0.0, 5.0)
    }

    #[test]
    fn spherical_round_trips() {
        let v = Vector3::new(1.0, 2.0, 3.0);
        let back = Spherical::from_vector(v).to_vector();
        assert!((v - back).magnitude() < 1e-5);
    }

    #[test]
    fn update_without_input_keeps_the_camera() {
        let mut controls = OrbitControls::new(Vector3::zero(), (800, 600));
        let mut camera = camera();
        controls.update(&mut camera);
        assert!((camera.position - Vector3::new(0.0, 0.0, 5.0)).magnitude() < 1e-4);
        assert_eq!(camera.target, Vector3::zero());
    }

    #[test]
    fn full_height_drag_turns_once_around() {
        let mut controls = OrbitControls::new(Vector3::zero(), (800, 600));
        let mut camera = camera();
        controls.rotate_by_pixels(150.0, 0.0);
        controls.update(&mut camera);
        // a quarter of the height is a quarter turn, theta decreases
        assert!((camera.position - Vector3::new(-5.0, 0.0, 0.0)).magnitude() < 1e-3);
    }

    #[test]
    fn wheel_dollies_by_the_zoom_scale() {
        let mut controls = OrbitControls::new(Vector3::zero(), (800, 600)).with_zoom_speed(0.5);
        let mut camera = camera();
        controls.dolly_in();
        controls.update(&mut camera);
        let expected = 5.0 * 0.95f32.powf(0.5);
        assert!((camera.position.magnitude() - expected).abs() < 1e-4);
        controls.dolly_out();
        controls.update(&mut camera);
        assert!((camera.position.magnitude() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn phi_stays_off_the_poles() {
        let mut controls = OrbitControls::new(Vector3::zero(), (800, 600));
        let mut camera = camera();
        controls.rotate_up(10.0);
        controls.update(&mut camera);
        assert!(camera.position.y <= 5.0);
        assert!(camera.position.x.abs() + camera.position.z.abs() > 0.0);
    }

    #[test]
    fn damping_spreads_the_motion_over_frames() {
        let mut controls = OrbitControls::new(Vector3::zero(), (800, 600)).with_damping();
        let mut camera = camera();
        controls.rotate_left(1.0);
        controls.update(&mut camera);
        let first = Spherical::from_vector(camera.position).theta;
        assert!((first + 0.05).abs() < 1e-4);
        controls.update(&mut camera);
        let second = Spherical::from_vector(camera.position).theta;
        assert!((second - first + 0.05 * 0.95).abs() < 1e-4);
    }

    #[test]
    fn pan_moves_target_and_camera_together() {
        let mut controls = OrbitControls::new(Vector3::zero(), (800, 600));
        let mut camera = camera();
        controls.pan_by_pixels(&camera, 100.0, 0.0);
        controls.update(&mut camera);
        assert!(controls.target.x < 0.0);
        assert!((camera.position.x - controls.target.x).abs() < 1e-5);
        assert!((camera.position.z - 5.0).abs() < 1e-4);
    }
}
