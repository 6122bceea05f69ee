use tracing::{debug, warn};

use crate::error::LayoutError;
use crate::models::{Geometry, PhotoId, PhotoRecord, PlacedPhoto, Row};

/// Gap between neighbouring photos in a row, in pixels.
pub const DEFAULT_GAP: f32 = 6.0;

/// What to do with a photo whose width or height is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvalidGeometryPolicy {
    /// Leave the photo out and report its id in [`PackOutcome::skipped`].
    #[default]
    Exclude,
    /// Fail the whole pass.
    Reject,
}

/// Rows produced by one packing pass plus the photos that were left out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PackOutcome {
    pub rows: Vec<Row>,
    pub skipped: Vec<PhotoId>,
}

/// Configuration for the fixed-column justified grid.
///
/// Every cell shares one viewport size: the height of the shortest photo and
/// a width derived from the narrowest photo, stretched so that each row fills
/// the container exactly. Photos are never scaled vertically; taller photos
/// are cropped by shifting them up, wider photos are centered, and narrower
/// photos are stretched to fill their cell.
#[derive(Debug, Clone)]
pub struct RowPacker {
    /// Gap between items in a row in pixels (default: 6)
    pub gap: f32,
    /// Handling of zero-sized photos (default: exclude)
    pub invalid_geometry: InvalidGeometryPolicy,
}

impl Default for RowPacker {
    fn default() -> Self {
        Self {
            gap: DEFAULT_GAP,
            invalid_geometry: InvalidGeometryPolicy::default(),
        }
    }
}

/// Cell sizes shared by every row of one pass.
#[derive(Debug, Clone, Copy)]
struct ColumnPlan {
    columns: usize,
    column_width: f32,
    viewport_width: f32,
    viewport_height: f32,
}

impl RowPacker {
    pub fn new(gap: f32) -> Self {
        Self {
            gap: gap.max(0.0),
            ..Default::default()
        }
    }

    pub fn with_policy(mut self, policy: InvalidGeometryPolicy) -> Self {
        self.invalid_geometry = policy;
        self
    }

    /// Packs `photos`, in the given order, into rows filling `container_width`.
    ///
    /// Photos with invalid geometry are dropped silently apart from a log line;
    /// use [`pack_with_report`](Self::pack_with_report) to learn which ones.
    pub fn pack(&self, photos: &[PhotoRecord], container_width: f32) -> Result<Vec<Row>, LayoutError> {
        self.pack_with_report(photos, container_width)
            .map(|outcome| outcome.rows)
    }

    /// Packs `photos` and reports the ids that were excluded.
    ///
    /// # Algorithm
    /// 1. Viewport height is the shortest photo height, viewport width starts as
    ///    the narrowest photo width.
    /// 2. Column count is how many `viewport width + gap` cells fit, at least one.
    /// 3. The container is split evenly into that many columns; the last column
    ///    of each row absorbs the trailing gap instead of a right margin.
    /// 4. Photos are consumed `columns` at a time; the last row may be short.
    pub fn pack_with_report(
        &self,
        photos: &[PhotoRecord],
        container_width: f32,
    ) -> Result<PackOutcome, LayoutError> {
        if !container_width.is_finite() || container_width <= 0.0 {
            return Err(LayoutError::InvalidContainerWidth(container_width));
        }

        let (valid, skipped) = self.partition_valid(photos)?;
        if !skipped.is_empty() {
            warn!(
                skipped = skipped.len(),
                "Excluded photos with invalid geometry from layout"
            );
        }

        let Some(plan) = self.plan_columns(&valid, container_width) else {
            return Ok(PackOutcome {
                rows: Vec::new(),
                skipped,
            });
        };

        let rows: Vec<Row> = valid
            .chunks(plan.columns)
            .enumerate()
            .map(|(row_index, chunk)| {
                let items = chunk
                    .iter()
                    .enumerate()
                    .map(|(column, photo)| PlacedPhoto {
                        photo: (*photo).clone(),
                        geometry: self.place(photo, column, &plan),
                    })
                    .collect();
                Row::new(row_index as u32, plan.viewport_height, items)
            })
            .collect();

        debug!(
            photos = valid.len(),
            rows = rows.len(),
            columns = plan.columns,
            container_width,
            "Packed photo rows"
        );

        Ok(PackOutcome { rows, skipped })
    }

    fn partition_valid<'a>(
        &self,
        photos: &'a [PhotoRecord],
    ) -> Result<(Vec<&'a PhotoRecord>, Vec<PhotoId>), LayoutError> {
        let mut valid = Vec::with_capacity(photos.len());
        let mut skipped = Vec::new();

        for photo in photos {
            if photo.has_valid_geometry() {
                valid.push(photo);
                continue;
            }
            match self.invalid_geometry {
                InvalidGeometryPolicy::Exclude => skipped.push(photo.id),
                InvalidGeometryPolicy::Reject => {
                    return Err(LayoutError::InvalidGeometry {
                        id: photo.id,
                        width: photo.width,
                        height: photo.height,
                    });
                }
            }
        }

        Ok((valid, skipped))
    }

    fn plan_columns(&self, photos: &[&PhotoRecord], container_width: f32) -> Option<ColumnPlan> {
        let viewport_height = photos.iter().map(|p| p.height).min()? as f32;
        let narrowest = photos.iter().map(|p| p.width).min()? as f32;

        // A container narrower than one cell still gets a single column.
        let columns = ((container_width / (narrowest + self.gap)).floor() as usize).max(1);
        let column_width = container_width / columns as f32;

        Some(ColumnPlan {
            columns,
            column_width,
            viewport_width: column_width - self.gap,
            viewport_height,
        })
    }

    fn place(&self, photo: &PhotoRecord, column: usize, plan: &ColumnPlan) -> Geometry {
        let natural_width = photo.width as f32;
        let natural_height = photo.height as f32;

        // The rightmost column has no neighbour, so it keeps the gap as width.
        let (viewport_width, right_margin) = if column + 1 < plan.columns {
            (plan.viewport_width, self.gap)
        } else {
            (plan.column_width, 0.0)
        };

        let (render_width, horizontal_offset) = if natural_width < viewport_width {
            (viewport_width, 0.0)
        } else {
            (natural_width, (viewport_width - natural_width) / 2.0)
        };

        Geometry {
            viewport_width,
            viewport_height: plan.viewport_height,
            horizontal_offset,
            vertical_offset: (plan.viewport_height - natural_height) / 2.0,
            right_margin,
            render_width,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_photo(id: u64, width: u32, height: u32) -> PhotoRecord {
        PhotoRecord::new(id, width, height, id as i64)
    }

    fn mixed_photos(count: u64) -> Vec<PhotoRecord> {
        (0..count)
            .map(|i| make_photo(i, 200 + (i as u32 * 37) % 180, 150 + (i as u32 * 53) % 120))
            .collect()
    }

    #[test]
    fn test_empty_items() {
        let packer = RowPacker::default();
        let rows = packer.pack(&[], 800.0).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_invalid_container_width() {
        let packer = RowPacker::default();
        let photos = vec![make_photo(1, 100, 100)];
        assert_eq!(
            packer.pack(&photos, 0.0),
            Err(LayoutError::InvalidContainerWidth(0.0))
        );
        assert!(packer.pack(&photos, -5.0).is_err());
        assert!(packer.pack(&photos, f32::NAN).is_err());
    }

    #[test]
    fn test_single_row_geometry() {
        let packer = RowPacker::default();
        let photos = vec![
            make_photo(1, 300, 200),
            make_photo(2, 400, 250),
            make_photo(3, 350, 220),
        ];

        let rows = packer.pack(&photos, 1000.0).unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.items.len(), 3);
        assert!((row.height_px - 200.0).abs() < 0.01);

        let column_width = 1000.0 / 3.0;
        let viewport_width = column_width - DEFAULT_GAP;

        // Narrower than its cell: stretched.
        let first = &row.items[0].geometry;
        assert!((first.viewport_width - viewport_width).abs() < 0.01);
        assert!((first.render_width - viewport_width).abs() < 0.01);
        assert_eq!(first.horizontal_offset, 0.0);
        assert_eq!(first.right_margin, DEFAULT_GAP);
        assert_eq!(first.vertical_offset, 0.0);

        // Wider than its cell: centered and cropped top and bottom.
        let second = &row.items[1].geometry;
        assert_eq!(second.render_width, 400.0);
        assert!((second.horizontal_offset - (viewport_width - 400.0) / 2.0).abs() < 0.01);
        assert!((second.vertical_offset + 25.0).abs() < 0.01);

        // Rightmost column takes the whole column width and no margin.
        let third = &row.items[2].geometry;
        assert!((third.viewport_width - column_width).abs() < 0.01);
        assert_eq!(third.right_margin, 0.0);
        assert!((third.vertical_offset + 10.0).abs() < 0.01);

        assert!((row.total_width() - 1000.0).abs() <= 1.0);
    }

    #[test]
    fn test_covers_every_photo_in_order() {
        let packer = RowPacker::default();
        let photos = mixed_photos(23);

        let rows = packer.pack(&photos, 1280.0).unwrap();
        let packed: Vec<PhotoId> = rows
            .iter()
            .flat_map(|row| row.items.iter().map(|item| item.id()))
            .collect();
        let expected: Vec<PhotoId> = photos.iter().map(|p| p.id).collect();
        assert_eq!(packed, expected);

        for (index, row) in rows.iter().enumerate() {
            assert_eq!(row.row_index, index as u32);
        }
    }

    #[test]
    fn test_full_rows_fill_container() {
        let packer = RowPacker::default();
        let photos = mixed_photos(40);

        for width in [640.0, 777.0, 1024.0, 1366.5, 1920.0] {
            let rows = packer.pack(&photos, width).unwrap();
            let columns = rows[0].items.len();
            for row in rows.iter().filter(|r| r.items.len() == columns) {
                assert!(
                    (row.total_width() - width).abs() <= 1.0,
                    "row width {} != container {}",
                    row.total_width(),
                    width
                );
            }
        }
    }

    #[test]
    fn test_last_row_may_be_short() {
        let packer = RowPacker::new(0.0);
        let photos: Vec<PhotoRecord> = (0..5).map(|i| make_photo(i, 100, 100)).collect();

        let rows = packer.pack(&photos, 200.0).unwrap();
        let lens: Vec<usize> = rows.iter().map(|r| r.items.len()).collect();
        assert_eq!(lens, vec![2, 2, 1]);
    }

    #[test]
    fn test_crop_and_stretch_invariants() {
        let packer = RowPacker::default();
        let photos = mixed_photos(31);

        let rows = packer.pack(&photos, 1500.0).unwrap();
        for item in rows.iter().flat_map(|r| r.items.iter()) {
            let g = &item.geometry;
            assert!(g.vertical_offset <= 0.0);
            assert!(g.horizontal_offset <= 0.0);
            assert!(g.render_width >= item.photo.width as f32);
            if g.is_stretched(item.photo.width) {
                assert_eq!(g.horizontal_offset, 0.0);
                assert_eq!(g.render_width, g.viewport_width);
            } else {
                assert_eq!(g.render_width, item.photo.width as f32);
            }
        }

        // Intrinsic dimensions pass through untouched.
        let packed: Vec<(u32, u32)> = rows
            .iter()
            .flat_map(|r| r.items.iter().map(|i| (i.photo.width, i.photo.height)))
            .collect();
        let original: Vec<(u32, u32)> = photos.iter().map(|p| (p.width, p.height)).collect();
        assert_eq!(packed, original);
    }

    #[test]
    fn test_uniform_row_height() {
        let packer = RowPacker::default();
        let photos = mixed_photos(12);
        let shortest = photos.iter().map(|p| p.height).min().unwrap() as f32;

        let rows = packer.pack(&photos, 900.0).unwrap();
        for row in &rows {
            assert_eq!(row.height_px, shortest);
            assert!(row.items.iter().all(|i| i.geometry.viewport_height == shortest));
        }
    }

    #[test]
    fn test_narrow_container_single_column() {
        let packer = RowPacker::default();
        let photos = vec![make_photo(1, 300, 200), make_photo(2, 320, 210)];

        let rows = packer.pack(&photos, 100.0).unwrap();
        assert_eq!(rows.len(), 2);
        for row in &rows {
            assert_eq!(row.items.len(), 1);
            let g = &row.items[0].geometry;
            assert_eq!(g.viewport_width, 100.0);
            assert_eq!(g.right_margin, 0.0);
            assert!(g.horizontal_offset < 0.0);
        }
    }

    #[test]
    fn test_container_narrower_than_gap() {
        let packer = RowPacker::default();
        let photos = vec![make_photo(1, 50, 50)];

        let rows = packer.pack(&photos, 4.0).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].items[0].geometry.viewport_width, 4.0);
    }

    #[test]
    fn test_pack_is_idempotent() {
        let packer = RowPacker::default();
        let photos = mixed_photos(17);

        let first = packer.pack(&photos, 1111.0).unwrap();
        let second = packer.pack(&photos, 1111.0).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_exclude_invalid_geometry() {
        let packer = RowPacker::default();
        let photos = vec![
            make_photo(1, 200, 100),
            make_photo(2, 0, 100),
            make_photo(3, 200, 0),
            make_photo(4, 220, 120),
        ];

        let outcome = packer.pack_with_report(&photos, 1000.0).unwrap();
        assert_eq!(outcome.skipped, vec![PhotoId(2), PhotoId(3)]);
        let packed: Vec<PhotoId> = outcome
            .rows
            .iter()
            .flat_map(|r| r.items.iter().map(|i| i.id()))
            .collect();
        assert_eq!(packed, vec![PhotoId(1), PhotoId(4)]);
        assert_eq!(outcome.rows[0].height_px, 100.0);
    }

    #[test]
    fn test_all_invalid_yields_no_rows() {
        let packer = RowPacker::default();
        let photos = vec![make_photo(1, 0, 0)];

        let outcome = packer.pack_with_report(&photos, 800.0).unwrap();
        assert!(outcome.rows.is_empty());
        assert_eq!(outcome.skipped, vec![PhotoId(1)]);
    }

    #[test]
    fn test_reject_invalid_geometry() {
        let packer = RowPacker::default().with_policy(InvalidGeometryPolicy::Reject);
        let photos = vec![make_photo(1, 200, 100), make_photo(9, 0, 100)];

        assert_eq!(
            packer.pack(&photos, 1000.0),
            Err(LayoutError::InvalidGeometry {
                id: PhotoId(9),
                width: 0,
                height: 100
            })
        );
    }

    #[test]
    fn test_negative_gap_clamped() {
        let packer = RowPacker::new(-3.0);
        assert_eq!(packer.gap, 0.0);
    }
}
