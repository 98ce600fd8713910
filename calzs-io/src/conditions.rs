//! ASCII conditions table reader.
//!
//! Pedestal and gain constants arrive as a whitespace-separated text table,
//! one channel per line:
//!
//! ```text
//! # ieta iphi depth subdet pedestal gain
//!   15   63   1     HB     3.25     0.92
//! ```
//!
//! Lines starting with `#` and blank lines are skipped. The table must be
//! internally consistent: every malformed line, unknown subdetector tag, and
//! duplicated channel is an error carrying its 1-based line number.

use crate::{Error, Result};
use calzs_core::{CalibrationValue, ChannelId, ConditionsSet, Subdetector};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

fn subdet_from_tag(tag: &str) -> Option<Subdetector> {
    match tag {
        "HB" => Some(Subdetector::Barrel),
        "HE" => Some(Subdetector::Endcap),
        "HO" => Some(Subdetector::Outer),
        "HF" => Some(Subdetector::Forward),
        _ => None,
    }
}

/// Returns the table tag for a subdetector.
#[must_use]
pub fn subdet_tag(subdet: Subdetector) -> &'static str {
    match subdet {
        Subdetector::Barrel => "HB",
        Subdetector::Endcap => "HE",
        Subdetector::Outer => "HO",
        Subdetector::Forward => "HF",
    }
}

fn parse_field<T: std::str::FromStr>(field: &str, what: &str, line: usize) -> Result<T> {
    field.parse().map_err(|_| Error::Parse {
        line,
        message: format!("bad {what}: {field:?}"),
    })
}

fn parse_line(text: &str, line: usize) -> Result<(ChannelId, CalibrationValue)> {
    let fields: Vec<&str> = text.split_whitespace().collect();
    if fields.len() != 6 {
        return Err(Error::Parse {
            line,
            message: format!("expected 6 columns, found {}", fields.len()),
        });
    }

    let ieta: i16 = parse_field(fields[0], "ieta", line)?;
    let iphi: u16 = parse_field(fields[1], "iphi", line)?;
    let depth: u8 = parse_field(fields[2], "depth", line)?;
    let subdet = subdet_from_tag(fields[3]).ok_or_else(|| Error::Parse {
        line,
        message: format!("unknown subdetector tag: {:?}", fields[3]),
    })?;
    let pedestal: f32 = parse_field(fields[4], "pedestal", line)?;
    let gain: f32 = parse_field(fields[5], "gain", line)?;

    let channel = ChannelId::new(subdet, ieta, iphi, depth).map_err(|e| Error::Parse {
        line,
        message: e.to_string(),
    })?;
    Ok((channel, CalibrationValue::new(pedestal, gain)))
}

/// Parses a conditions table from any buffered source.
///
/// # Errors
/// Returns [`Error::Parse`] with the offending 1-based line number for any
/// malformed line or duplicated channel, and [`Error::Io`] on read failure.
pub fn parse_conditions<R: BufRead>(reader: R) -> Result<ConditionsSet> {
    let mut conditions = ConditionsSet::new();

    for (index, text) in reader.lines().enumerate() {
        let line = index + 1;
        let text = text?;
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let (channel, value) = parse_line(trimmed, line)?;
        conditions
            .insert(channel, value)
            .map_err(|e| Error::Parse {
                line,
                message: e.to_string(),
            })?;
    }

    Ok(conditions)
}

/// Reads a conditions table from a file.
///
/// # Errors
/// Same conditions as [`parse_conditions`], plus open failure.
pub fn read_conditions<P: AsRef<Path>>(path: P) -> Result<ConditionsSet> {
    let file = File::open(path)?;
    parse_conditions(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Cursor;

    const TABLE: &str = "\
# ieta iphi depth subdet pedestal gain
1 1 0 HB 3.25 0.92
-1 1 0 HB 3.10 0.95

29 3 1 HF 9.50 0.33
4 13 4 HO 2.75 1.10
";

    #[test]
    fn test_parse_table() {
        let conditions = parse_conditions(Cursor::new(TABLE)).unwrap();
        assert_eq!(conditions.len(), 4);

        let channel = ChannelId::new(Subdetector::Forward, 29, 3, 1).unwrap();
        let value = conditions.lookup(channel).unwrap();
        assert_relative_eq!(value.pedestal, 9.5);
        assert_relative_eq!(value.gain, 0.33);
    }

    #[test]
    fn test_bad_column_count() {
        let err = parse_conditions(Cursor::new("1 1 0 HB 3.25")).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 1, .. }));
    }

    #[test]
    fn test_bad_number() {
        let table = "1 1 0 HB 3.25 0.92\n2 x 0 HB 3.25 0.92\n";
        let err = parse_conditions(Cursor::new(table)).unwrap_err();
        match err {
            Error::Parse { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("iphi"), "unexpected message: {message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_subdetector_tag() {
        let err = parse_conditions(Cursor::new("1 1 0 EB 3.25 0.92")).unwrap_err();
        match err {
            Error::Parse { line: 1, message } => {
                assert!(message.contains("EB"), "unexpected message: {message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_channel() {
        let table = "1 1 0 HB 3.25 0.92\n1 1 0 HB 3.30 0.92\n";
        let err = parse_conditions(Cursor::new(table)).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, .. }));
    }

    #[test]
    fn test_invalid_channel_indices() {
        // ieta 0 is not a valid cell address.
        let err = parse_conditions(Cursor::new("0 1 0 HB 3.25 0.92")).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 1, .. }));
    }

    #[test]
    fn test_read_from_file() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(TABLE.as_bytes()).unwrap();

        let conditions = read_conditions(file.path()).unwrap();
        assert_eq!(conditions.len(), 4);
    }
}
