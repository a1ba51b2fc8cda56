use glam::Vec4;
use smallvec::SmallVec;

/// Which material input a texture feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKind {
    BaseColor,
    Normal,
    MetallicRoughness,
    Occlusion,
    Emissive,
}

/// Sampler state attached to a texture slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureSampler {
    /// Anisotropic filtering level (1 = off)
    pub anisotropy_clamp: u16,
}

impl Default for TextureSampler {
    fn default() -> Self {
        Self { anisotropy_clamp: 1 }
    }
}

/// A texture bound to a material input.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureSlot {
    pub kind: TextureKind,
    /// Index of the image in the source document.
    pub source_index: usize,
    pub sampler: TextureSampler,
}

impl TextureSlot {
    #[must_use]
    pub fn new(kind: TextureKind, source_index: usize) -> Self {
        Self {
            kind,
            source_index,
            sampler: TextureSampler::default(),
        }
    }
}

/// Surface description of a primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: Option<String>,
    pub color: Vec4,
    pub opacity: f32,
    pub transparent: bool,
    /// At most one slot per [`TextureKind`]
    pub textures: SmallVec<[TextureSlot; 5]>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: None,
            color: Vec4::ONE,
            opacity: 1.0,
            transparent: false,
            textures: SmallVec::new(),
        }
    }
}

impl Material {
    /// Grey, slightly see-through material used for placeholder models.
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            name: Some("placeholder".to_string()),
            // 0x888888
            color: Vec4::new(0.533, 0.533, 0.533, 1.0),
            opacity: 0.8,
            transparent: true,
            textures: SmallVec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn has_textures(&self) -> bool {
        !self.textures.is_empty()
    }
}
