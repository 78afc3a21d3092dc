use std::str::FromStr;

use crate::tle::{OrbitalElementSet, TleError};

pub const UNSPECIFIED_NAME: &str = "UNSPECIFIED";

const LINE1_PREFIX: &str = "1 ";
const LINE2_PREFIX: &str = "2 ";
const LINE1_MIN_FIELDS: usize = 4;
const LINE2_MIN_FIELDS: usize = 3;

// Offsets inside the combined mean motion / revolution number / checksum token.
const MEAN_MOTION_WIDTH: usize = 11;
const REVOLUTION_END: usize = 16;

/// Parse a two-line element record into an [`OrbitalElementSet`].
///
/// Structural problems (wrong line prefix, too few whitespace-separated
/// fields) are errors. A single token that fails to convert only leaves its
/// own field empty.
pub fn parse_elements(
    name: Option<&str>,
    line1: &str,
    line2: &str,
) -> Result<OrbitalElementSet, TleError> {
    let line1 = line1.trim();
    let line2 = line2.trim();

    if !line1.starts_with(LINE1_PREFIX) {
        return Err(TleError::Format(format!(
            "line 1 must start with '{}'",
            LINE1_PREFIX
        )));
    }
    if !line2.starts_with(LINE2_PREFIX) {
        return Err(TleError::Format(format!(
            "line 2 must start with '{}'",
            LINE2_PREFIX
        )));
    }

    let first: Vec<&str> = line1.split_whitespace().collect();
    let second: Vec<&str> = line2.split_whitespace().collect();
    if first.len() < LINE1_MIN_FIELDS || second.len() < LINE2_MIN_FIELDS {
        return Err(TleError::TooFewFields {
            line1: first.len(),
            line2: second.len(),
        });
    }

    let name = name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(UNSPECIFIED_NAME)
        .to_string();
    let mut set = OrbitalElementSet::empty(name, line1.to_string(), line2.to_string());

    if let Some(token) = first.get(1) {
        let (number, classification) = split_last_char(token);
        set.catalog_number = field("catalog_number", number);
        set.classification = classification;
    }
    set.international_designator = first.get(2).map(|t| t.to_string());
    set.epoch = first.get(3).and_then(|t| field("epoch", t));
    set.mean_motion_dot = first.get(4).and_then(|t| field("mean_motion_dot", t));
    set.mean_motion_ddot = first.get(5).map(|t| t.to_string());
    set.drag_term = first.get(6).map(|t| t.to_string());
    set.element_set_type = first.get(7).and_then(|t| field("element_set_type", t));
    if let Some(token) = first.get(8) {
        let (number, checksum) = split_last_char(token);
        set.element_number = field("element_number", number);
        set.checksum_line1 = checksum.and_then(|c| checksum_digit("checksum_line1", c));
    }

    // Line 2 carries the catalog number again and wins without a cross-check.
    set.catalog_number = second.get(1).and_then(|t| field("catalog_number", t));
    set.inclination_deg = second.get(2).and_then(|t| field("inclination", t));
    set.raan_deg = second.get(3).and_then(|t| field("raan", t));
    set.eccentricity = second
        .get(4)
        .and_then(|t| field("eccentricity", &format!("0.{}", t)));
    set.argument_of_perigee_deg = second
        .get(5)
        .and_then(|t| field("argument_of_perigee", t));
    set.mean_anomaly_deg = second.get(6).and_then(|t| field("mean_anomaly", t));
    if let Some(token) = second.get(7) {
        let (mean_motion, revolution, checksum) = split_mean_motion(token);
        set.mean_motion = mean_motion;
        set.revolution_number = revolution;
        set.checksum_line2 = checksum;
    }

    Ok(set)
}

/// Decode the implied-decimal, implied-exponent notation used for the second
/// derivative of mean motion and B*: `12345-3` is `0.12345e-3`.
pub fn decode_implied_exponent(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    let (sign, body) = match raw.as_bytes().first()? {
        b'-' => (-1.0, &raw[1..]),
        b'+' => (1.0, &raw[1..]),
        _ => (1.0, raw),
    };

    let (mantissa, exponent) = match body.rfind(['+', '-']) {
        Some(0) => return None,
        Some(idx) => (&body[..idx], body[idx..].parse::<i32>().ok()?),
        None => (body, 0),
    };
    if mantissa.is_empty() || !mantissa.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let mantissa: f64 = format!("0.{}", mantissa).parse().ok()?;
    Some(sign * mantissa * 10f64.powi(exponent))
}

/// Second stage of the line 2 parse: split `NN.NNNNNNNNRRRRRC` into mean
/// motion, revolution number and checksum by fixed offsets.
fn split_mean_motion(token: &str) -> (Option<f64>, Option<u32>, Option<u8>) {
    if token.len() < MEAN_MOTION_WIDTH {
        return (field("mean_motion", token), None, None);
    }

    let mean_motion = token
        .get(..MEAN_MOTION_WIDTH)
        .and_then(|t| field("mean_motion", t));
    let revolution = if token.len() >= REVOLUTION_END {
        token
            .get(MEAN_MOTION_WIDTH..REVOLUTION_END)
            .and_then(|t| field("revolution_number", t))
    } else {
        None
    };
    let checksum = token
        .chars()
        .next_back()
        .and_then(|c| checksum_digit("checksum_line2", c));

    (mean_motion, revolution, checksum)
}

fn split_last_char(token: &str) -> (&str, Option<char>) {
    let mut chars = token.chars();
    match chars.next_back() {
        Some(last) if !chars.as_str().is_empty() => (chars.as_str(), Some(last)),
        _ => (token, None),
    }
}

fn field<T: FromStr>(name: &str, token: &str) -> Option<T> {
    match token.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            log::debug!("Skipping {}: cannot parse {:?}", name, token);
            None
        }
    }
}

fn checksum_digit(name: &str, c: char) -> Option<u8> {
    match c.to_digit(10) {
        Some(d) => Some(d as u8),
        None => {
            log::debug!("Skipping {}: {:?} is not a digit", name, c);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const ISS_LINE1: &str =
        "1 25544U 98067A   04236.56031392  .00020137  00000-0  16538-3 0  9993";
    const ISS_LINE2: &str =
        "2 25544  51.6335 344.7760 0007976 126.2523 325.9359 15.70406856328906";

    fn line2_with_mean_motion(token: &str) -> String {
        format!("2 25544  51.6335 344.7760 0007976 126.2523 325.9359 {}", token)
    }

    #[test]
    fn parses_iss_record() {
        let set = parse_elements(Some("ISS (ZARYA)"), ISS_LINE1, ISS_LINE2).unwrap();

        assert_eq!(set.name, "ISS (ZARYA)");
        assert_eq!(set.catalog_number, Some(25544));
        assert_eq!(set.classification, Some('U'));
        assert_eq!(set.international_designator.as_deref(), Some("98067A"));
        assert_abs_diff_eq!(set.epoch.unwrap(), 4236.56031392, epsilon = 1e-9);
        assert_abs_diff_eq!(set.mean_motion_dot.unwrap(), 0.00020137, epsilon = 1e-12);
        assert_eq!(set.mean_motion_ddot.as_deref(), Some("00000-0"));
        assert_eq!(set.drag_term.as_deref(), Some("16538-3"));
        assert_eq!(set.element_set_type, Some(0));
        assert_eq!(set.element_number, Some(999));
        assert_eq!(set.checksum_line1, Some(3));
        assert_abs_diff_eq!(set.inclination_deg.unwrap(), 51.6335, epsilon = 1e-9);
        assert_abs_diff_eq!(set.raan_deg.unwrap(), 344.7760, epsilon = 1e-9);
        assert_abs_diff_eq!(set.eccentricity.unwrap(), 0.0007976, epsilon = 1e-12);
        assert_abs_diff_eq!(set.argument_of_perigee_deg.unwrap(), 126.2523, epsilon = 1e-9);
        assert_abs_diff_eq!(set.mean_anomaly_deg.unwrap(), 325.9359, epsilon = 1e-9);
        assert_abs_diff_eq!(set.mean_motion.unwrap(), 15.70406856, epsilon = 1e-9);
        assert_eq!(set.revolution_number, Some(32890));
        assert_eq!(set.checksum_line2, Some(6));
        assert!(set.is_complete());
    }

    #[test]
    fn parsing_is_idempotent() {
        let a = parse_elements(None, ISS_LINE1, ISS_LINE2).unwrap();
        let b = parse_elements(None, ISS_LINE1, ISS_LINE2).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.epoch.unwrap().to_bits(), b.epoch.unwrap().to_bits());
    }

    #[test]
    fn missing_name_defaults_to_unspecified() {
        let set = parse_elements(None, ISS_LINE1, ISS_LINE2).unwrap();
        assert_eq!(set.name, UNSPECIFIED_NAME);
        let set = parse_elements(Some("   "), ISS_LINE1, ISS_LINE2).unwrap();
        assert_eq!(set.name, UNSPECIFIED_NAME);
    }

    #[test]
    fn too_few_fields_reports_counts() {
        let err = parse_elements(None, "1 25544U 98067A", ISS_LINE2).unwrap_err();
        assert_eq!(err, TleError::TooFewFields { line1: 3, line2: 8 });

        let err = parse_elements(None, ISS_LINE1, "2 25544").unwrap_err();
        assert_eq!(err, TleError::TooFewFields { line1: 9, line2: 2 });
    }

    #[test]
    fn wrong_prefix_is_a_format_error() {
        assert!(matches!(
            parse_elements(None, ISS_LINE2, ISS_LINE2),
            Err(TleError::Format(_))
        ));
        assert!(matches!(
            parse_elements(None, ISS_LINE1, ISS_LINE1),
            Err(TleError::Format(_))
        ));
    }

    #[test]
    fn bad_token_only_clears_its_field() {
        let line2 = "2 25544  51.6335 abc 0007976 126.2523 325.9359 15.70406856328906";
        let set = parse_elements(None, ISS_LINE1, line2).unwrap();
        assert_eq!(set.raan_deg, None);
        assert_eq!(set.catalog_number, Some(25544));
        assert_abs_diff_eq!(set.inclination_deg.unwrap(), 51.6335, epsilon = 1e-9);
        assert!(!set.is_complete());
        assert_eq!(set.missing_fields(), vec!["raan_deg"]);
    }

    #[test]
    fn short_record_leaves_trailing_fields_empty() {
        let set = parse_elements(None, "1 25544U 98067A 04236.56031392", "2 25544 51.6335")
            .unwrap();
        assert_eq!(set.catalog_number, Some(25544));
        assert_eq!(set.mean_motion_dot, None);
        assert_eq!(set.drag_term, None);
        assert_eq!(set.raan_deg, None);
        assert_eq!(set.mean_motion, None);
    }

    #[test]
    fn line2_catalog_number_overrides_line1() {
        let line2 = "2 11111  51.6335 344.7760 0007976 126.2523 325.9359 15.70406856328906";
        let set = parse_elements(None, ISS_LINE1, line2).unwrap();
        assert_eq!(set.catalog_number, Some(11111));
        assert_eq!(set.classification, Some('U'));
    }

    #[test]
    fn mean_motion_token_of_length_10() {
        let line2 = line2_with_mean_motion("15.7040685");
        let set = parse_elements(None, ISS_LINE1, &line2).unwrap();
        assert_abs_diff_eq!(set.mean_motion.unwrap(), 15.7040685, epsilon = 1e-9);
        assert_eq!(set.revolution_number, None);
        assert_eq!(set.checksum_line2, None);
    }

    #[test]
    fn mean_motion_token_of_length_11() {
        let line2 = line2_with_mean_motion("15.70406856");
        let set = parse_elements(None, ISS_LINE1, &line2).unwrap();
        assert_abs_diff_eq!(set.mean_motion.unwrap(), 15.70406856, epsilon = 1e-9);
        assert_eq!(set.revolution_number, None);
        assert_eq!(set.checksum_line2, Some(6));
    }

    #[test]
    fn mean_motion_token_of_length_15() {
        let line2 = line2_with_mean_motion("15.704068563289");
        let set = parse_elements(None, ISS_LINE1, &line2).unwrap();
        assert_abs_diff_eq!(set.mean_motion.unwrap(), 15.70406856, epsilon = 1e-9);
        assert_eq!(set.revolution_number, None);
        assert_eq!(set.checksum_line2, Some(9));
    }

    #[test]
    fn mean_motion_token_of_length_16() {
        let line2 = line2_with_mean_motion("15.7040685632890");
        let set = parse_elements(None, ISS_LINE1, &line2).unwrap();
        assert_abs_diff_eq!(set.mean_motion.unwrap(), 15.70406856, epsilon = 1e-9);
        assert_eq!(set.revolution_number, Some(32890));
        assert_eq!(set.checksum_line2, Some(0));
    }

    #[test]
    fn decodes_implied_exponent_fields() {
        assert_abs_diff_eq!(decode_implied_exponent("12345-3").unwrap(), 0.12345e-3, epsilon = 1e-15);
        assert_abs_diff_eq!(decode_implied_exponent("-11606-4").unwrap(), -0.11606e-4, epsilon = 1e-15);
        assert_abs_diff_eq!(decode_implied_exponent("+00000+0").unwrap(), 0.0);
        assert_abs_diff_eq!(decode_implied_exponent("5").unwrap(), 0.5);
        assert_eq!(decode_implied_exponent(""), None);
        assert_eq!(decode_implied_exponent("-"), None);
        assert_eq!(decode_implied_exponent("3-"), None);
        assert_eq!(decode_implied_exponent("12a45-3"), None);

        let set = parse_elements(None, ISS_LINE1, ISS_LINE2).unwrap();
        assert_abs_diff_eq!(set.drag_term_value().unwrap(), 1.6538e-4, epsilon = 1e-15);
        assert_abs_diff_eq!(set.mean_motion_ddot_value().unwrap(), 0.0);
    }
}
