use serde::Serialize;

use super::parser::decode_implied_exponent;

/// Mean orbital elements read from a two-line element record.
///
/// Numeric fields are `None` when the corresponding token was absent or did
/// not convert. The epoch is kept exactly as written (`YYDDD.DDDDDDDD`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrbitalElementSet {
    pub name: String,
    pub catalog_number: Option<u32>,
    pub classification: Option<char>,
    pub international_designator: Option<String>,
    pub epoch: Option<f64>,
    pub mean_motion_dot: Option<f64>,
    /// Raw implied-exponent text, e.g. `00000-0`.
    pub mean_motion_ddot: Option<String>,
    /// Raw implied-exponent B* text, e.g. `16538-3`.
    pub drag_term: Option<String>,
    pub element_set_type: Option<u32>,
    pub element_number: Option<u32>,
    pub checksum_line1: Option<u8>,
    pub inclination_deg: Option<f64>,
    pub raan_deg: Option<f64>,
    pub eccentricity: Option<f64>,
    pub argument_of_perigee_deg: Option<f64>,
    pub mean_anomaly_deg: Option<f64>,
    /// Revolutions per day.
    pub mean_motion: Option<f64>,
    pub revolution_number: Option<u32>,
    pub checksum_line2: Option<u8>,
    #[serde(skip)]
    pub line1: String,
    #[serde(skip)]
    pub line2: String,
}

impl OrbitalElementSet {
    pub(crate) fn empty(name: String, line1: String, line2: String) -> Self {
        Self {
            name,
            catalog_number: None,
            classification: None,
            international_designator: None,
            epoch: None,
            mean_motion_dot: None,
            mean_motion_ddot: None,
            drag_term: None,
            element_set_type: None,
            element_number: None,
            checksum_line1: None,
            inclination_deg: None,
            raan_deg: None,
            eccentricity: None,
            argument_of_perigee_deg: None,
            mean_anomaly_deg: None,
            mean_motion: None,
            revolution_number: None,
            checksum_line2: None,
            line1,
            line2,
        }
    }

    pub fn mean_motion_ddot_value(&self) -> Option<f64> {
        self.mean_motion_ddot
            .as_deref()
            .and_then(decode_implied_exponent)
    }

    pub fn drag_term_value(&self) -> Option<f64> {
        self.drag_term.as_deref().and_then(decode_implied_exponent)
    }

    /// Names of the fields that were absent or failed to convert.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let fields: [(&'static str, bool); 18] = [
            ("catalog_number", self.catalog_number.is_some()),
            ("classification", self.classification.is_some()),
            (
                "international_designator",
                self.international_designator.is_some(),
            ),
            ("epoch", self.epoch.is_some()),
            ("mean_motion_dot", self.mean_motion_dot.is_some()),
            ("mean_motion_ddot", self.mean_motion_ddot.is_some()),
            ("drag_term", self.drag_term.is_some()),
            ("element_set_type", self.element_set_type.is_some()),
            ("element_number", self.element_number.is_some()),
            ("checksum_line1", self.checksum_line1.is_some()),
            ("inclination_deg", self.inclination_deg.is_some()),
            ("raan_deg", self.raan_deg.is_some()),
            ("eccentricity", self.eccentricity.is_some()),
            (
                "argument_of_perigee_deg",
                self.argument_of_perigee_deg.is_some(),
            ),
            ("mean_anomaly_deg", self.mean_anomaly_deg.is_some()),
            ("mean_motion", self.mean_motion.is_some()),
            ("revolution_number", self.revolution_number.is_some()),
            ("checksum_line2", self.checksum_line2.is_some()),
        ];
        fields
            .iter()
            .filter(|(_, present)| !present)
            .map(|(name, _)| *name)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}
