use glam::Vec2;

/// Maps a pointer position in pixels to normalized device coordinates, with
/// +Y pointing up. Positions outside the viewport map outside [-1, 1].
pub fn to_normalized_device_coordinates(position: Vec2, viewport: Vec2) -> Vec2 {
    // A minimized window reports a zero-sized viewport
    let viewport = viewport.max(Vec2::ONE);

    Vec2::new(
        position.x / viewport.x * 2.0 - 1.0,
        -(position.y / viewport.y) * 2.0 + 1.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);

    #[test]
    fn corners_and_centre() {
        assert_eq!(
            to_normalized_device_coordinates(Vec2::ZERO, VIEWPORT),
            Vec2::new(-1.0, 1.0)
        );
        assert_eq!(
            to_normalized_device_coordinates(VIEWPORT, VIEWPORT),
            Vec2::new(1.0, -1.0)
        );
        assert_eq!(
            to_normalized_device_coordinates(VIEWPORT * 0.5, VIEWPORT),
            Vec2::ZERO
        );
    }

    #[test]
    fn outside_viewport_extrapolates() {
        let ndc = to_normalized_device_coordinates(Vec2::new(-400.0, 1200.0), VIEWPORT);
        assert_eq!(ndc, Vec2::new(-2.0, -3.0));
    }

    #[test]
    fn zero_viewport_stays_finite() {
        let ndc = to_normalized_device_coordinates(Vec2::new(10.0, 10.0), Vec2::ZERO);
        assert!(ndc.is_finite());
    }
}
