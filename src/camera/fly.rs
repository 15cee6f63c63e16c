use std::f32::consts::FRAC_PI_2;

use cgmath::{InnerSpace, Quaternion, Rad, Rotation, Rotation3, Vector3};
use instant::Duration;
use winit::{
    event::{ElementState, KeyEvent, MouseButton, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use crate::camera::PerspectiveCamera;

const SAFE_FRAC_PI_2: f32 = FRAC_PI_2 - 0.0001;

/// Free flight: WASD to move, R/F up and down, Q/E to roll, drag to look.
#[derive(Clone, Debug)]
pub struct FlyControls {
    /// Units per second.
    pub movement_speed: f32,
    /// Radians per second.
    pub roll_speed: f32,
    /// Radians per dragged pixel.
    pub look_speed: f32,
    amount_left: f32,
    amount_right: f32,
    amount_forward: f32,
    amount_backward: f32,
    amount_up: f32,
    amount_down: f32,
    roll_left: f32,
    roll_right: f32,
    rotate_horizontal: f32,
    rotate_vertical: f32,
    dragging: bool,
    cursor: Option<(f64, f64)>,
}

impl FlyControls {
    pub fn new(movement_speed: f32, roll_speed: f32) -> Self {
        Self {
            movement_speed,
            roll_speed,
            look_speed: 0.004,
            amount_left: 0.0,
            amount_right: 0.0,
            amount_forward: 0.0,
            amount_backward: 0.0,
            amount_up: 0.0,
            amount_down: 0.0,
            roll_left: 0.0,
            roll_right: 0.0,
            rotate_horizontal: 0.0,
            rotate_vertical: 0.0,
            dragging: false,
            cursor: None,
        }
    }

    /// Returns whether the key is one of the flight keys.
    pub fn handle_key(&mut self, key: KeyCode, state: ElementState) -> bool {
        let amount = if state == ElementState::Pressed { 1.0 } else { 0.0 };
        match key {
            KeyCode::KeyW | KeyCode::ArrowUp => self.amount_forward = amount,
            KeyCode::KeyS | KeyCode::ArrowDown => self.amount_backward = amount,
            KeyCode::KeyA => self.amount_left = amount,
            KeyCode::KeyD => self.amount_right = amount,
            KeyCode::KeyR => self.amount_up = amount,
            KeyCode::KeyF => self.amount_down = amount,
            KeyCode::KeyQ => self.roll_left = amount,
            KeyCode::KeyE => self.roll_right = amount,
            _ => return false,
        }
        true
    }

    pub fn handle_mouse(&mut self, dx: f64, dy: f64) {
        self.rotate_horizontal += dx as f32;
        self.rotate_vertical += dy as f32;
    }

    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state,
                        ..
                    },
                ..
            } => self.handle_key(*key, *state),
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.dragging = *state == ElementState::Pressed;
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                let last = self.cursor.replace((position.x, position.y));
                match last {
                    Some((x, y)) if self.dragging => {
                        self.handle_mouse(position.x - x, position.y - y);
                        true
                    }
                    _ => false,
                }
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                self.dragging = false;
                false
            }
            _ => false,
        }
    }

    pub fn update(&mut self, camera: &mut PerspectiveCamera, dt: Duration) {
        let dt = dt.as_secs_f32();
        let mut forward = camera.target - camera.position;
        let distance = forward.magnitude().max(1e-3);
        forward = forward.normalize();
        let right = forward.cross(camera.up).normalize();
        let up = right.cross(forward);

        // Move
        let step = self.movement_speed * dt;
        let translation = forward * (self.amount_forward - self.amount_backward) * step
            + right * (self.amount_right - self.amount_left) * step
            + up * (self.amount_up - self.amount_down) * step;
        camera.position += translation;

        // Look: yaw around the camera's up, pitch around its right axis
        let yaw = Quaternion::from_axis_angle(up, Rad(-self.rotate_horizontal * self.look_speed));
        let mut direction = yaw.rotate_vector(forward);
        let pitch_angle = -self.rotate_vertical * self.look_speed;
        let current_pitch = direction.dot(up).clamp(-1.0, 1.0).asin();
        let pitch_angle = (current_pitch + pitch_angle).clamp(-SAFE_FRAC_PI_2, SAFE_FRAC_PI_2) - current_pitch;
        let pitch = Quaternion::from_axis_angle(direction.cross(up).normalize(), Rad(pitch_angle));
        direction = pitch.rotate_vector(direction);
        self.rotate_horizontal = 0.0;
        self.rotate_vertical = 0.0;

        // Roll tilts the up vector around the view direction
        let roll = (self.roll_right - self.roll_left) * self.roll_speed * dt;
        if roll != 0.0 {
            camera.up = Quaternion::from_axis_angle(direction, Rad(roll))
                .rotate_vector(camera.up)
                .normalize();
        }

        camera.target = camera.position + direction * distance;
    }
}

impl Default for FlyControls {
    fn default() -> Self {
        Self::new(1.0, 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> PerspectiveCamera {
        PerspectiveCamera::new(55.0, 1.0).at(0.0, 0.0, 5.0)
    }

    #[test]
    fn forward_moves_along_the_view() {
        let mut controls = FlyControls::new(2.0, 0.5);
        let mut camera = camera();
        assert!(controls.handle_key(KeyCode::KeyW, ElementState::Pressed));
        controls.update(&mut camera, Duration::from_millis(500));
        assert!((camera.position - Vector3::new(0.0, 0.0, 4.0)).magnitude() < 1e-4);
        assert!((camera.target - Vector3::new(0.0, 0.0, -1.0)).magnitude() < 1e-4);

        controls.handle_key(KeyCode::KeyW, ElementState::Released);
        controls.update(&mut camera, Duration::from_millis(500));
        assert!((camera.position - Vector3::new(0.0, 0.0, 4.0)).magnitude() < 1e-4);
    }

    #[test]
    fn strafing_keeps_the_direction() {
        let mut controls = FlyControls::new(1.0, 0.5);
        let mut camera = camera();
        controls.handle_key(KeyCode::KeyD, ElementState::Pressed);
        controls.update(&mut camera, Duration::from_secs(1));
        assert!((camera.position - Vector3::new(1.0, 0.0, 5.0)).magnitude() < 1e-4);
        let direction = (camera.target - camera.position).normalize();
        assert!((direction - Vector3::new(0.0, 0.0, -1.0)).magnitude() < 1e-4);
    }

    #[test]
    fn roll_tilts_the_up_vector() {
        let mut controls = FlyControls::new(1.0, 1.0);
        let mut camera = camera();
        controls.handle_key(KeyCode::KeyE, ElementState::Pressed);
        controls.update(&mut camera, Duration::from_millis(100));
        assert!(camera.up.x.abs() > 0.05);
        assert!((camera.up.magnitude() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn dragging_turns_the_view() {
        let mut controls = FlyControls::default();
        let mut camera = camera();
        controls.handle_mouse(100.0, 0.0);
        controls.update(&mut camera, Duration::from_millis(16));
        assert!(camera.target.x > 0.0);
        assert_eq!(camera.position, Vector3::new(0.0, 0.0, 5.0));
        assert!(!controls.handle_key(KeyCode::KeyZ, ElementState::Pressed));
    }
}
