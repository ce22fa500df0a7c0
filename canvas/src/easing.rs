/// Overshoots past 1 before settling, used for growth.
pub fn ease_out_back(x: f32) -> f32 {
    const C1: f32 = 1.70158;
    const C3: f32 = C1 + 1.0;

    1.0 + C3 * (x - 1.0).powi(3) + C1 * (x - 1.0).powi(2)
}

/// Decelerating curve, used for shrinking and merging.
pub fn ease_out_quart(x: f32) -> f32 {
    1.0 - (1.0 - x).powi(4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curves_start_at_zero_and_end_at_one() {
        for ease in [ease_out_back, ease_out_quart] {
            assert!(ease(0.0).abs() < 1e-6);
            assert!((ease(1.0) - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn back_overshoots() {
        assert!(ease_out_back(0.8) > 1.0);
        assert!(ease_out_quart(0.8) < 1.0);
    }
}
