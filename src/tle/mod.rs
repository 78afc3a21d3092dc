mod error;
mod parser;
mod parsing;
mod types;

pub use error::TleError;
pub use parser::{decode_implied_exponent, parse_elements, UNSPECIFIED_NAME};
pub use parsing::{parse_catalog, parse_record, split_record};
pub use types::OrbitalElementSet;
