use crate::tle::{parse_elements, OrbitalElementSet, TleError};

/// Split a single 2- or 3-line block into `(name, line1, line2)`.
pub fn split_record(tle: &str) -> Result<(Option<String>, String, String), TleError> {
    let lines: Vec<String> = tle
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect();

    match lines.len() {
        2 => Ok((None, lines[0].clone(), lines[1].clone())),
        3 => Ok((Some(lines[0].clone()), lines[1].clone(), lines[2].clone())),
        n => Err(TleError::LineCount(n)),
    }
}

pub fn parse_record(tle: &str) -> Result<OrbitalElementSet, TleError> {
    let (name, line1, line2) = split_record(tle)?;
    parse_elements(name.as_deref(), &line1, &line2)
}

/// Parse text holding any number of records, named or not. Lines that do not
/// belong to a recognizable record are skipped.
pub fn parse_catalog(content: &str) -> Vec<Result<OrbitalElementSet, TleError>> {
    let lines: Vec<&str> = content
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();

    let mut result = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if lines[i].starts_with("1 ") && i + 1 < lines.len() && lines[i + 1].starts_with("2 ") {
            result.push(parse_elements(None, lines[i], lines[i + 1]));
            i += 2;
        } else if i + 2 < lines.len()
            && lines[i + 1].starts_with("1 ")
            && lines[i + 2].starts_with("2 ")
        {
            result.push(parse_elements(Some(lines[i]), lines[i + 1], lines[i + 2]));
            i += 3;
        } else {
            log::warn!("Skipping unrecognized line {}: {:?}", i + 1, lines[i]);
            i += 1;
        }
    }

    result
}
