//! Pure dimension math. No I/O.

/// Target size for an image that must be at most `max_width` wide.
///
/// Returns `None` when the image already fits. Otherwise the width becomes
/// `max_width` and the height is scaled by the same factor
/// (`max_width / width`) and rounded, preserving the aspect ratio.
///
/// # Examples
/// ```
/// # use media_toot::imaging::fit_to_width;
/// assert_eq!(fit_to_width((4000, 2000), 2048), Some((2048, 1024)));
/// assert_eq!(fit_to_width((1000, 2000), 2048), None);
/// ```
pub fn fit_to_width(original: (u32, u32), max_width: u32) -> Option<(u32, u32)> {
    let (width, height) = original;
    if width <= max_width {
        return None;
    }
    let scale = max_width as f64 / width as f64;
    let new_height = (height as f64 * scale).round().max(1.0) as u32;
    Some((max_width, new_height))
}
