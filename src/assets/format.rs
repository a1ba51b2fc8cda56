use std::fmt;

/// Model file formats the pipeline recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelFormat {
    /// Binary or JSON glTF, fully decoded.
    Portable,
    /// USDZ package. No decoder is available, so it always resolves to a
    /// placeholder model.
    Container,
}

impl ModelFormat {
    /// Maps a lower-case extension (with leading dot) to a format.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            ".glb" | ".gltf" => Some(Self::Portable),
            ".usdz" => Some(Self::Container),
            _ => None,
        }
    }

    /// Guesses the format from the path component of a URL or file name.
    #[must_use]
    pub fn from_url(url: &str) -> Option<Self> {
        file_extension(url).and_then(|ext| Self::from_extension(&ext))
    }

    #[must_use]
    pub fn is_decodable(self) -> bool {
        matches!(self, Self::Portable)
    }
}

impl fmt::Display for ModelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Portable => f.write_str("glTF"),
            Self::Container => f.write_str("USDZ"),
        }
    }
}

/// Lower-case extension of a URL or file name, including the leading dot.
///
/// Query strings and fragments are ignored.
#[must_use]
pub fn file_extension(name: &str) -> Option<String> {
    let path = name.split(['?', '#']).next().unwrap_or(name);
    let file_name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    let dot = file_name.rfind('.')?;
    let ext = &file_name[dot..];
    (ext.len() > 1).then(|| ext.to_ascii_lowercase())
}
