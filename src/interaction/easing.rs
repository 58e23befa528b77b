/// Quadratic ease-out: fast start, decelerating to rest. Progress is clamped
/// to [0, 1], with `f(0) = 0` and `f(1) = 1` exactly.
pub fn quadratic_out(progress: f32) -> f32 {
    let p = progress.clamp(0.0, 1.0);
    1.0 - (1.0 - p) * (1.0 - p)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_exact() {
        assert_eq!(quadratic_out(0.0), 0.0);
        assert_eq!(quadratic_out(1.0), 1.0);
    }

    #[test]
    fn curve_is_monotonic() {
        let mut previous = 0.0;
        for step in 1..=100 {
            let value = quadratic_out(step as f32 / 100.0);
            assert!(value >= previous, "decreased at step {}", step);
            previous = value;
        }
    }

    #[test]
    fn decelerates() {
        assert_eq!(quadratic_out(0.5), 0.75);
        assert!(quadratic_out(0.25) > 0.25);
        assert!(quadratic_out(0.9) - quadratic_out(0.8) < quadratic_out(0.2) - quadratic_out(0.1));
    }

    #[test]
    fn progress_is_clamped() {
        assert_eq!(quadratic_out(-1.0), 0.0);
        assert_eq!(quadratic_out(3.0), 1.0);
    }
}
