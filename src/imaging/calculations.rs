//! Pure calculation functions for derivative dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Fit `source` inside a `max_edge` × `max_edge` box.
///
/// Aspect ratio is preserved and the image is never enlarged: a source that
/// already fits is returned unchanged. Neither output dimension drops below 1.
///
/// # Examples
/// ```
/// # use folio::imaging::fit_within;
/// assert_eq!(fit_within((4000, 3000), 500), (500, 375));
/// assert_eq!(fit_within((300, 200), 500), (300, 200));
/// ```
pub fn fit_within(source: (u32, u32), max_edge: u32) -> (u32, u32) {
    let (w, h) = source;
    let longer = w.max(h);
    if longer <= max_edge || longer == 0 {
        return (w, h);
    }

    let ratio = max_edge as f64 / longer as f64;
    let scale = |v: u32| ((v as f64 * ratio).round() as u32).clamp(1, max_edge);
    if w >= h {
        (max_edge, scale(h))
    } else {
        (scale(w), max_edge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landscape_bounded_by_width() {
        assert_eq!(fit_within((4000, 3000), 1920), (1920, 1440));
    }

    #[test]
    fn portrait_bounded_by_height() {
        assert_eq!(fit_within((3000, 4000), 500), (375, 500));
    }

    #[test]
    fn square_scales_to_box() {
        assert_eq!(fit_within((1000, 1000), 500), (500, 500));
    }

    #[test]
    fn small_source_is_never_upscaled() {
        assert_eq!(fit_within((320, 240), 500), (320, 240));
    }

    #[test]
    fn exact_fit_is_unchanged() {
        assert_eq!(fit_within((500, 200), 500), (500, 200));
    }

    #[test]
    fn extreme_aspect_keeps_one_pixel() {
        assert_eq!(fit_within((10000, 2), 500), (500, 1));
    }

    #[test]
    fn rounding_follows_nearest_pixel() {
        // 1001 * (500 / 1999) = 250.375 → 250
        assert_eq!(fit_within((1999, 1001), 500), (500, 250));
    }
}
