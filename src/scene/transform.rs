use glam::{Affine3A, Quat, Vec3};

/// Transform component
///
/// Position, rotation and scale (TRS) of a node relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    #[must_use]
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            scale: Vec3::ONE,
        }
    }

    /// Local matrix (scale, then rotation, then translation).
    #[inline]
    #[must_use]
    pub fn local_matrix(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Sets the transform from a matrix (e.g. a glTF node matrix).
    ///
    /// The matrix is decomposed into TRS. Shear is lost.
    pub fn apply_local_matrix(&mut self, mat: Affine3A) {
        let (scale, rotation, translation) = mat.to_scale_rotation_translation();
        self.scale = scale;
        self.rotation = rotation;
        self.position = translation;
    }

    /// Pre-multiplies a uniform scale and translation:
    /// `M' = S(factor) * T(offset) * M`.
    ///
    /// Used to re-center and re-scale a model root without decomposing.
    pub fn prepend_offset_and_scale(&mut self, offset: Vec3, factor: f32) {
        self.position = (self.position + offset) * factor;
        self.scale *= factor;
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}
