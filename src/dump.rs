//! Parser for the bulk VLAN dump served by a hive.
//!
//! The dump is one pseudo-SQL statement per line:
//!
//! ```text
//! INSERT INTO lookup VALUES ('4000','SXB1-S4Y-4000','10.213.1.25','L24.r3-2.sxb1','EX3300-48T-BF','juniper','GF0212014822','12.3R11.2');
//! ```
//!
//! Values are not escaped, so a field containing `,` or `'` cannot be
//! represented and is rejected or mangled.

use thiserror::Error;

const INSERT_PREFIX: &str = "INSERT INTO lookup VALUES ";
const FIELD_COUNT: usize = 8;

/// One row of the `lookup` table. Only the id and name feed the views.
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VlanRecord {
    pub vlan_id: String,
    pub vlan_name: String,
    pub ip_address: String,
    pub device_location: String,
    pub device_model: String,
    pub vendor: String,
    pub serial_number: String,
    pub firmware_version: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("line {line_no} is not a lookup insert statement: {line:?}")]
    UnexpectedLine { line_no: usize, line: String },
    #[error("line {line_no} carries {found} fields, expected 8")]
    FieldCount { line_no: usize, found: usize },
}

impl VlanRecord {
    fn from_fields(fields: Vec<&str>, line_no: usize) -> Result<Self, ParseError> {
        let [
            vlan_id,
            vlan_name,
            ip_address,
            device_location,
            device_model,
            vendor,
            serial_number,
            firmware_version,
        ] = <[&str; FIELD_COUNT]>::try_from(fields).map_err(|fields| ParseError::FieldCount {
            line_no,
            found: fields.len(),
        })?;

        Ok(Self {
            vlan_id: vlan_id.to_string(),
            vlan_name: vlan_name.to_string(),
            ip_address: ip_address.to_string(),
            device_location: device_location.to_string(),
            device_model: device_model.to_string(),
            vendor: vendor.to_string(),
            serial_number: serial_number.to_string(),
            firmware_version: firmware_version.to_string(),
        })
    }
}

/// Splits one insert statement into its unquoted values.
///
/// `line_no` is only used for error reporting.
pub fn parse_fields(line: &str, line_no: usize) -> Result<Vec<&str>, ParseError> {
    let payload = line
        .strip_prefix(INSERT_PREFIX)
        .ok_or_else(|| ParseError::UnexpectedLine {
            line_no,
            line: line.to_string(),
        })?;

    let payload = payload
        .trim_matches(';')
        .trim_matches(['(', ')']);

    Ok(payload.split(',').map(|field| field.trim_matches('\'')).collect())
}

pub fn parse_line(line: &str, line_no: usize) -> Result<VlanRecord, ParseError> {
    let fields = parse_fields(line, line_no)?;
    VlanRecord::from_fields(fields, line_no)
}

/// Parses a whole response body. Blank lines are skipped, anything else
/// that is not an insert statement fails the whole dump.
pub fn parse_dump(body: &str) -> Result<Vec<VlanRecord>, ParseError> {
    body.lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .map(|(line_no, line)| parse_line(line, line_no))
        .collect()
}
