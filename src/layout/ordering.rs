use std::cmp::Ordering;
use std::collections::HashSet;

use crate::models::{PhotoId, PhotoRecord};

/// Orders photos for display: selected first, then newest first within each group.
///
/// The selection flag of every returned record is rewritten from `selected`.
/// The sort is stable, so photos with equal keys keep their input order.
pub fn order(photos: &[PhotoRecord], selected: &HashSet<PhotoId>) -> Vec<PhotoRecord> {
    let mut list: Vec<PhotoRecord> = photos
        .iter()
        .cloned()
        .map(|mut photo| {
            photo.selected = selected.contains(&photo.id);
            photo
        })
        .collect();

    list.sort_by(compare);
    list
}

fn compare(a: &PhotoRecord, b: &PhotoRecord) -> Ordering {
    match (a.selected, b.selected) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => b.saved_on.cmp(&a.saved_on),
    }
}
