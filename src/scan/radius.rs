/// Radius used when the zoom level is outside the lookup table.
pub const DEFAULT_RADIUS_M: u32 = 1000;

/// Resolves the scan radius in meters for a map zoom level.
///
/// Fractional zoom is rounded to the nearest level first; levels outside the
/// table fall back to [`DEFAULT_RADIUS_M`].
pub fn radius_for_zoom(zoom: f64) -> u32 {
    match zoom.round() as i64 {
        8 => 10_000, // country/region level
        9 => 7_000,
        10 => 5_000, // city level
        11 => 3_000,
        12 => 2_000, // district level
        13 => 1_500,
        14 => 1_000, // neighborhood
        15 => 700,
        16 => 500, // local area
        17 => 300,
        18 => 100, // precise location
        _ => DEFAULT_RADIUS_M,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_table_values() {
        let table = [
            (8.0, 10_000),
            (9.0, 7_000),
            (10.0, 5_000),
            (11.0, 3_000),
            (12.0, 2_000),
            (13.0, 1_500),
            (14.0, 1_000),
            (15.0, 700),
            (16.0, 500),
            (17.0, 300),
            (18.0, 100),
        ];

        for (zoom, radius) in table {
            assert_eq!(radius_for_zoom(zoom), radius, "zoom {zoom}");
        }
    }

    #[test]
    fn test_fractional_zoom_rounds_to_nearest_level() {
        // 7.4 rounds down to 7, which is outside the table.
        assert_eq!(radius_for_zoom(7.4), DEFAULT_RADIUS_M);
        assert_eq!(radius_for_zoom(7.6), 10_000);
        assert_eq!(radius_for_zoom(10.4), 5_000);
        assert_eq!(radius_for_zoom(10.5), 3_000);
    }

    #[test]
    fn test_zoom_outside_table_falls_back_to_default() {
        assert_eq!(radius_for_zoom(3.0), DEFAULT_RADIUS_M);
        assert_eq!(radius_for_zoom(7.0), DEFAULT_RADIUS_M);
        assert_eq!(radius_for_zoom(19.0), DEFAULT_RADIUS_M);
        assert_eq!(radius_for_zoom(25.0), DEFAULT_RADIUS_M);
    }
}
