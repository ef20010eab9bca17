//! Affine 4×4 transforms composed by right-multiplication.
//!
//! A [`Transform`] is a plain value wrapping a column-major [`Mat4`]. Every
//! mutating call composes onto the *right* of the current matrix:
//!
//! ```
//! use critter::Transform;
//!
//! let mut t = Transform::new();
//! t.translate(1.0, 0.0, 0.0).rotate(90.0, 0.0, 0.0, 1.0).scale(2.0, 2.0, 2.0);
//! // Geometry is scaled first, then rotated, then translated.
//! ```
//!
//! Read a chain of calls outermost-first: the first call is the effect closest
//! to world space, the last call is applied to the geometry first. A transform
//! seeded from a parent's clone keeps the parent outermost.
//!
//! # Branch points
//!
//! There is no global matrix stack. Where two children derive from the same
//! ancestor, the ancestor is cloned *before* either child mutates it:
//!
//! ```
//! use critter::Transform;
//!
//! let mut joint = Transform::new();
//! joint.translate(0.0, 1.0, 0.0).rotate(30.0, 0.0, 0.0, 1.0);
//!
//! let anchor = joint.clone(); // branch point
//! joint.scale(0.1, 0.5, 0.1); // first child consumes `joint`
//!
//! let mut next = anchor.clone();
//! next.translate(0.0, 0.5, 0.0); // second child never sees the scale
//! ```
//!
//! `Transform` is intentionally `Clone` but not `Copy`, so every branch point
//! shows up as an explicit `.clone()`.

use glam::{Mat4, Vec3};

#[derive(Clone, Debug, PartialEq)]
pub struct Transform {
    matrix: Mat4,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            matrix: Mat4::IDENTITY,
        }
    }
}

impl Transform {
    /// Creates an identity transform.
    pub fn new() -> Self {
        Self::default()
    }

    /// Composes a translation onto the right of this transform.
    pub fn translate(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.matrix *= Mat4::from_translation(Vec3::new(x, y, z));
        self
    }

    /// Composes a non-uniform scale onto the right of this transform.
    pub fn scale(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.matrix *= Mat4::from_scale(Vec3::new(x, y, z));
        self
    }

    /// Composes a rotation of `angle` degrees about the axis `(x, y, z)`.
    ///
    /// The axis does not need to be normalized. A zero-length axis leaves the
    /// transform unchanged.
    pub fn rotate(&mut self, angle: f32, x: f32, y: f32, z: f32) -> &mut Self {
        if let Some(axis) = Vec3::new(x, y, z).try_normalize() {
            self.matrix *= Mat4::from_axis_angle(axis, angle.to_radians());
        }
        self
    }

    /// Composes `other` onto the right of this transform.
    pub fn multiply(&mut self, other: &Transform) -> &mut Self {
        self.matrix *= other.matrix;
        self
    }

    /// The underlying column-major matrix.
    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }

    /// Translation component (the fourth column).
    pub fn translation(&self) -> Vec3 {
        self.matrix.w_axis.truncate()
    }

    /// Maps a point from local space through this transform.
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.matrix.transform_point3(point)
    }

    /// The 16 matrix components in column-major order, ready for upload.
    pub fn to_cols_array(&self) -> [f32; 16] {
        self.matrix.to_cols_array()
    }
}
