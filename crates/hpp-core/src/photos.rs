//! # Photo Ordering
//!
//! Gallery order rules and storage path conventions for product photos.
//!
//! ```text
//!  display_order:   0     1     2     3
//!                 ┌───┐ ┌───┐ ┌───┐ ┌───┐
//!                 │ A │ │ B │ │ C │ │ D │      move_photo(3, 0)
//!                 └───┘ └───┘ └───┘ └───┘            │
//!                                                    ▼
//!                 ┌───┐ ┌───┐ ┌───┐ ┌───┐
//!                 │ D │ │ A │ │ B │ │ C │      orders renumbered 0..n
//!                 └───┘ └───┘ └───┘ └───┘
//! ```
//!
//! Stored files live under `products/` in the `product-images` bucket:
//! `products/{product_id}-{timestamp_ms}-{suffix}.{ext}`.

use crate::types::ProductPhoto;

/// Name of the bucket photo URLs point into.
pub const PHOTO_BUCKET: &str = "product-images";

/// Folder inside the bucket.
pub const PHOTO_FOLDER: &str = "products";

/// Sorts by `display_order`, keeping the relative order of ties.
pub fn sort_by_display_order(photos: &mut [ProductPhoto]) {
    photos.sort_by_key(|p| p.display_order);
}

/// Rewrites `display_order` to match slice position, starting at 0.
pub fn renumber(photos: &mut [ProductPhoto]) {
    for (index, photo) in photos.iter_mut().enumerate() {
        photo.display_order = index as i64;
    }
}

/// Moves the photo at `from` to position `to` and renumbers.
///
/// Returns `false` (and leaves the list alone) when either index is out of
/// range.
pub fn move_photo(photos: &mut Vec<ProductPhoto>, from: usize, to: usize) -> bool {
    if from >= photos.len() || to >= photos.len() {
        return false;
    }
    let photo = photos.remove(from);
    photos.insert(to, photo);
    renumber(photos);
    true
}

/// Order for a photo appended to the gallery: one past the highest, or 0.
pub fn next_display_order(photos: &[ProductPhoto]) -> i64 {
    photos
        .iter()
        .map(|p| p.display_order)
        .max()
        .map_or(0, |max| max + 1)
}

/// Extension of an uploaded file name, lowercased.
///
/// Falls back to `img` when there is none or it holds anything other than
/// ASCII letters and digits.
pub fn file_extension(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) => {
            ext.to_ascii_lowercase()
        }
        _ => "img".to_string(),
    }
}

/// Storage path for a new upload.
///
/// Products that are not saved yet use `temp` in place of an id.
///
/// ```rust
/// use hpp_core::photos::photo_storage_path;
///
/// assert_eq!(
///     photo_storage_path(Some("p1"), "Tas.JPG", 1700000000000, "k3j9x"),
///     "products/p1-1700000000000-k3j9x.jpg"
/// );
/// ```
pub fn photo_storage_path(
    product_id: Option<&str>,
    file_name: &str,
    timestamp_ms: i64,
    suffix: &str,
) -> String {
    format!(
        "{}/{}-{}-{}.{}",
        PHOTO_FOLDER,
        product_id.unwrap_or("temp"),
        timestamp_ms,
        suffix,
        file_extension(file_name)
    )
}

/// Recovers the storage path from a public photo URL.
///
/// Everything after `/product-images/` is the path; URLs that do not point
/// into the bucket yield `None`.
///
/// ```rust
/// use hpp_core::photos::storage_path_from_url;
///
/// assert_eq!(
///     storage_path_from_url("http://localhost/files/product-images/products/a.jpg").as_deref(),
///     Some("products/a.jpg")
/// );
/// assert_eq!(storage_path_from_url("http://example.com/other/a.jpg"), None);
/// ```
pub fn storage_path_from_url(url: &str) -> Option<String> {
    let marker = format!("/{}/", PHOTO_BUCKET);
    let start = url.find(&marker)? + marker.len();
    let rest = &url[start..];
    let path = rest.split(['?', '#']).next().unwrap_or_default();

    if path.is_empty() {
        return None;
    }
    Some(path.to_string())
}
