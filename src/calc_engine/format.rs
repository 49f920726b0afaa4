const EXPONENTIAL_THRESHOLD: f64 = 1e-6;
const DECIMAL_PLACES: usize = 10;

/// Canonical display form of a finite result.
///
/// Magnitudes in (0, 1e-6) use exponential notation with six fractional
/// digits (`1.000000e-7`). Everything else is rounded to ten decimal places
/// with trailing zeros and a dangling point removed.
pub fn format_number(x: f64) -> String {
    if x != 0.0 && x.abs() < EXPONENTIAL_THRESHOLD {
        return format!("{:.6e}", x);
    }

    let s = format!("{:.*}", DECIMAL_PLACES, x);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_have_no_fraction() {
        assert_eq!(format_number(4.0), "4");
        assert_eq!(format_number(1024.0), "1024");
        assert_eq!(format_number(-12.0), "-12");
    }

    #[test]
    fn rounds_to_ten_places() {
        assert_eq!(format_number(1.0 / 3.0), "0.3333333333");
        assert_eq!(format_number(0.1 + 0.2), "0.3");
        assert_eq!(format_number(2.5), "2.5");
    }

    #[test]
    fn tiny_values_use_exponential_form() {
        assert_eq!(format_number(0.0000001), "1.000000e-7");
        assert_eq!(format_number(-0.00000025), "-2.500000e-7");
    }

    #[test]
    fn threshold_itself_is_fixed_point() {
        assert_eq!(format_number(0.000001), "0.000001");
    }

    #[test]
    fn zero_forms() {
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(-0.0), "0");
    }
}
