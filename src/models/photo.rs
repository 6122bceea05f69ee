use std::fmt;

/// Opaque photo identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PhotoId(pub u64);

impl fmt::Display for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for PhotoId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// One photo as handed to the layout pipeline.
///
/// `width` and `height` are the natural pixel dimensions of the thumbnail that
/// will be displayed. Layout never changes them; computed geometry lives in
/// [`Geometry`](crate::models::Geometry) next to the record instead.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoRecord {
    pub id: PhotoId,
    pub width: u32,
    pub height: u32,
    /// Unix timestamp in seconds, newest sorts first.
    pub saved_on: i64,
    pub selected: bool,
    /// Thumbnail name, if the source knows one.
    pub name: Option<String>,
    /// Thumbnail URL or file path for the renderer.
    pub location: Option<String>,
}

impl PhotoRecord {
    /// Create a record with just the fields layout needs
    pub fn new(id: impl Into<PhotoId>, width: u32, height: u32, saved_on: i64) -> Self {
        Self {
            id: id.into(),
            width,
            height,
            saved_on,
            selected: false,
            name: None,
            location: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// True when both dimensions are non-zero and the photo can be packed.
    pub fn has_valid_geometry(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}
