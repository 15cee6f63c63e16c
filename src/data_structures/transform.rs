//! Object transforms: position, rotation and scale.
//!
//! Transforms compose like matrices: `parent * child` gives the child's
//! transform in the parent's space. The scene uses this to place children
//! of groups.

use std::ops::Mul;

use cgmath::{InnerSpace, Matrix3, Matrix4, One, Quaternion, Rad, Rotation3, SquareMatrix, Vector3};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Transform {
    /// The identity transform (no move, rotate, or scale).
    pub fn new() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Quaternion::one(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn from_position(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: Vector3::new(x, y, z),
            ..Self::new()
        }
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = Vector3::new(scale, scale, scale);
        self
    }

    /// Rotation by angles around x, then y, then z of the local frame.
    pub fn set_euler(&mut self, x: f32, y: f32, z: f32) {
        self.rotation =
            Quaternion::from_angle_x(Rad(x)) * Quaternion::from_angle_y(Rad(y)) * Quaternion::from_angle_z(Rad(z));
    }

    /// Turn so the local +z axis points at `target`.
    pub fn look_at(&mut self, target: Vector3<f32>, up: Vector3<f32>) {
        let mut z = target - self.position;
        if z.magnitude2() == 0.0 {
            return;
        }
        z = z.normalize();
        let mut x = up.cross(z);
        if x.magnitude2() == 0.0 {
            // up and view direction are parallel
            if up.z.abs() == 1.0 {
                z.x += 0.0001;
            } else {
                z.z += 0.0001;
            }
            z = z.normalize();
            x = up.cross(z);
        }
        let x = x.normalize();
        let y = z.cross(x);
        self.rotation = Quaternion::from(Matrix3::from_cols(x, y, z));
    }

    pub fn to_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from(self.rotation)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

/// Inverse transpose of the upper 3x3, for transforming normals under
/// non-uniform scale. Falls back to the identity for degenerate matrices.
pub fn normal_matrix(model: &Matrix4<f32>) -> Matrix4<f32> {
    model
        .invert()
        .map(|inverse| {
            let mut m = cgmath::Matrix::transpose(&inverse);
            m.w = cgmath::Vector4::new(0.0, 0.0, 0.0, 1.0);
            m.x.w = 0.0;
            m.y.w = 0.0;
            m.z.w = 0.0;
            m
        })
        .unwrap_or_else(Matrix4::identity)
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vector3<f32>> for Transform {
    fn from(position: Vector3<f32>) -> Self {
        Transform {
            position,
            ..Default::default()
        }
    }
}

impl<'a, 'b> Mul<&'b Transform> for &'a Transform {
    type Output = Transform;

    fn mul(self, rhs: &'b Transform) -> Self::Output {
        let scaled_rhs_pos = Vector3::new(
            self.scale.x * rhs.position.x,
            self.scale.y * rhs.position.y,
            self.scale.z * rhs.position.z,
        );
        Transform {
            position: self.position + (self.rotation * scaled_rhs_pos),
            rotation: self.rotation * rhs.rotation,
            scale: Vector3::new(
                self.scale.x * rhs.scale.x,
                self.scale.y * rhs.scale.y,
                self.scale.z * rhs.scale.z,
            ),
        }
    }
}

impl Mul<Transform> for Transform {
    type Output = Self;

    fn mul(self, rhs: Transform) -> Self::Output {
        &self * &rhs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector4;

    fn close(a: Vector3<f32>, b: Vector3<f32>) -> bool {
        (a - b).magnitude() < 1e-5
    }

    #[test]
    fn composition_matches_matrix_product() {
        let mut parent = Transform::from_position(1.0, 2.0, 3.0).with_scale(2.0);
        parent.set_euler(0.0, std::f32::consts::FRAC_PI_2, 0.0);
        let child = Transform::from_position(1.0, 0.0, 0.0);

        let composed = (parent * child).to_matrix();
        let product = parent.to_matrix() * child.to_matrix();
        let origin = Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert!(close((composed * origin).truncate(), (product * origin).truncate()));
        // +x rotated a quarter turn around y ends up at -z, scaled by 2
        assert!(close((composed * origin).truncate(), Vector3::new(1.0, 2.0, 1.0)));
    }

    #[test]
    fn look_at_points_local_z_at_the_target() {
        let mut t = Transform::from_position(0.0, 0.0, 0.0);
        t.look_at(Vector3::new(3.0, 0.0, 0.0), Vector3::unit_y());
        let z = t.rotation * Vector3::unit_z();
        assert!(close(z, Vector3::unit_x()));

        // straight up still yields a valid rotation
        t.look_at(Vector3::new(0.0, 5.0, 0.0), Vector3::unit_y());
        let z = t.rotation * Vector3::unit_z();
        assert!((z.magnitude() - 1.0).abs() < 1e-4);
        assert!(z.y > 0.99);
    }

    #[test]
    fn normal_matrix_undoes_non_uniform_scale() {
        let mut t = Transform::new();
        t.scale = Vector3::new(2.0, 1.0, 1.0);
        let n = normal_matrix(&t.to_matrix());
        let normal = (n * Vector4::new(1.0, 0.0, 0.0, 0.0)).truncate();
        assert!(close(normal, Vector3::new(0.5, 0.0, 0.0)));

        t.scale = Vector3::new(1.0, 0.0, 1.0);
        assert_eq!(normal_matrix(&t.to_matrix()), Matrix4::identity());
    }
}
