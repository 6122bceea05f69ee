use super::{PhotoId, PhotoRecord};

/// Render geometry for one photo inside its grid cell.
///
/// The viewport is the visible window; the photo is drawn at
/// `render_width x height` and shifted by the offsets so that its middle shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub viewport_width: f32,
    pub viewport_height: f32,
    /// Always <= 0.
    pub horizontal_offset: f32,
    /// Always <= 0.
    pub vertical_offset: f32,
    pub right_margin: f32,
    pub render_width: f32,
}

impl Geometry {
    /// Horizontal space the cell takes in its row, margin included.
    pub fn cell_width(&self) -> f32 {
        self.viewport_width + self.right_margin
    }

    pub fn is_stretched(&self, natural_width: u32) -> bool {
        self.render_width > natural_width as f32
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedPhoto {
    pub photo: PhotoRecord,
    pub geometry: Geometry,
}

impl PlacedPhoto {
    pub fn id(&self) -> PhotoId {
        self.photo.id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub row_index: u32,
    pub height_px: f32,
    pub items: Vec<PlacedPhoto>,
}

impl Row {
    pub fn new(row_index: u32, height_px: f32, items: Vec<PlacedPhoto>) -> Self {
        Self {
            row_index,
            height_px,
            items,
        }
    }

    /// Sum of cell widths, which equals the container width for full rows.
    pub fn total_width(&self) -> f32 {
        self.items.iter().map(|item| item.geometry.cell_width()).sum()
    }
}
