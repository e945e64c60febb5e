use thiserror::Error;

pub type HiveId = String;

pub const DEFAULT_HIVE: &str = "205";

/// Every hive known to the tool, queried by `--hive-id all`.
pub const FLEET: [&str; 21] = [
    "205", "206", "207", //
    "208", "210", "211", //
    "213", "215", "216", //
    "217", "220", "232", //
    "233", "301", "403", //
    "800", "802", "803", //
    "804", "805", "806",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectorError {
    #[error(
        "invalid hive selector `{0}`: supply a hive ID, `all`, or a comma-separated list\nEXAMPLE: hivevlan --hive-id 213"
    )]
    Invalid(String),
}

pub fn default_fleet() -> Vec<HiveId> {
    FLEET.iter().map(|hive| hive.to_string()).collect()
}

/// Expands a `--hive-id` value into the hives to query, in query order.
///
/// Pieces of a comma list are taken verbatim; a bad piece only shows up
/// once its fetch fails.
pub fn resolve(selector: &str, fleet: &[HiveId]) -> Result<Vec<HiveId>, SelectorError> {
    if !selector.is_empty() && selector.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(vec![selector.to_string()]);
    }
    if selector == "all" {
        return Ok(fleet.to_vec());
    }
    if selector.contains(',') {
        return Ok(selector.split(',').map(str::to_string).collect());
    }
    Err(SelectorError::Invalid(selector.to_string()))
}
