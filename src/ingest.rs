//! CSV parsing for the ship ping and port datasets.
//!
//! Both files carry a header row; columns are matched by name so extra
//! columns and reordering are tolerated. Any malformed row fails the whole
//! file.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use csv::StringRecord;
use serde::Deserialize;

use crate::model::{Ping, Port};

/// Naive layouts tried after RFC 3339, interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Deserialize)]
struct ShipRow {
    site_name: String,
    ec_timestamp: String,
    location_latitude: String,
    location_longitude: String,
}

#[derive(Debug, Deserialize)]
struct PortRow {
    port_name: String,
    geo_location_latitude: String,
    geo_location_longitude: String,
}

/// Parses the ship CSV (`site_name`, `ec_timestamp`, `location_latitude`,
/// `location_longitude`) into one [`Ping`] per data row.
///
/// # Errors
///
/// Returns an error on a missing column, an unparsable timestamp, or a
/// non-finite coordinate. The message names the 1-based file line.
pub fn parse_pings(bytes: &[u8]) -> Result<Vec<Ping>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(bytes);
    let headers = rdr.headers().context("ship data header")?.clone();
    let mut pings = Vec::new();

    for result in rdr.records() {
        let (line, record) = read_record(result, "ship data")?;
        let row: ShipRow = record
            .deserialize(Some(&headers))
            .with_context(|| format!("ship data line {line}"))?;
        let ping = Ping {
            timestamp: parse_timestamp(&row.ec_timestamp)
                .with_context(|| format!("ship data line {line}"))?,
            latitude: parse_coordinate(&row.location_latitude, "location_latitude")
                .with_context(|| format!("ship data line {line}"))?,
            longitude: parse_coordinate(&row.location_longitude, "location_longitude")
                .with_context(|| format!("ship data line {line}"))?,
            ship_id: row.site_name.trim().to_string(),
        };
        pings.push(ping);
    }

    Ok(pings)
}

/// Parses the port CSV (`port_name`, `geo_location_latitude`,
/// `geo_location_longitude`), preserving file order.
pub fn parse_ports(bytes: &[u8]) -> Result<Vec<Port>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(bytes);
    let headers = rdr.headers().context("port data header")?.clone();
    let mut ports = Vec::new();

    for result in rdr.records() {
        let (line, record) = read_record(result, "port data")?;
        let row: PortRow = record
            .deserialize(Some(&headers))
            .with_context(|| format!("port data line {line}"))?;
        ports.push(Port {
            latitude: parse_coordinate(&row.geo_location_latitude, "geo_location_latitude")
                .with_context(|| format!("port data line {line}"))?,
            longitude: parse_coordinate(&row.geo_location_longitude, "geo_location_longitude")
                .with_context(|| format!("port data line {line}"))?,
            name: row.port_name.trim().to_string(),
        });
    }

    Ok(ports)
}

/// Unwraps one CSV record along with the file line it starts on. Quoted
/// fields may span lines, so the line comes from the reader's position.
fn read_record(result: csv::Result<StringRecord>, what: &str) -> Result<(u64, StringRecord)> {
    match result {
        Ok(record) => {
            let line = record.position().map_or(0, |pos| pos.line());
            Ok((line, record))
        }
        Err(e) => {
            let context = match e.position() {
                Some(pos) => format!("{what} line {}", pos.line()),
                None => what.to_string(),
            };
            Err(anyhow::Error::new(e).context(context))
        }
    }
}

/// Parses a ping timestamp. Accepts RFC 3339, naive date-times (taken as
/// UTC) and bare dates (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let s = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%z") {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(naive.and_utc());
        }
    }
    if let Some(naive) = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(naive.and_utc());
    }

    bail!("unrecognised timestamp {raw:?}")
}

fn parse_coordinate(raw: &str, column: &str) -> Result<f64> {
    let value: f64 = raw
        .trim()
        .parse()
        .with_context(|| format!("{column} is not a number: {raw:?}"))?;
    if !value.is_finite() {
        bail!("{column} is not finite: {raw:?}");
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone, Timelike};

    #[test]
    fn test_parse_pings_one_record_per_row() {
        let csv = "site_name,ec_timestamp,location_latitude,location_longitude\n\
                   ship_7,2024-03-01 08:00:00,10.5,20.25\n\
                   ship_7,2024-03-01 09:30:00,10.6,20.30\n\
                   ship_2,2024-03-02T01:00:00Z,-5,100\n";

        let pings = parse_pings(csv.as_bytes()).unwrap();

        assert_eq!(pings.len(), 3);
        assert_eq!(pings[0].ship_id, "ship_7");
        assert_eq!(pings[0].latitude, 10.5);
        assert_eq!(pings[0].longitude, 20.25);
        assert_eq!(pings[2].ship_id, "ship_2");
        assert_eq!(pings[2].latitude, -5.0);
        assert!(pings.iter().all(|p| p.latitude.is_finite() && p.longitude.is_finite()));
    }

    #[test]
    fn test_parse_pings_ignores_extra_columns_and_order() {
        let csv = "location_longitude,speed,site_name,location_latitude,ec_timestamp\n\
                   20.0,12.5,ship_1,10.0,2024-03-01\n";

        let pings = parse_pings(csv.as_bytes()).unwrap();

        assert_eq!(pings.len(), 1);
        assert_eq!(pings[0].ship_id, "ship_1");
        assert_eq!(pings[0].latitude, 10.0);
        assert_eq!(pings[0].longitude, 20.0);
    }

    #[test]
    fn test_parse_pings_header_only_is_empty() {
        let csv = "site_name,ec_timestamp,location_latitude,location_longitude\n";
        assert!(parse_pings(csv.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn test_parse_pings_rejects_bad_latitude() {
        let csv = "site_name,ec_timestamp,location_latitude,location_longitude\n\
                   ship_1,2024-03-01,ten,20.0\n";
        let err = parse_pings(csv.as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));
    }

    #[test]
    fn test_line_numbers_follow_multiline_fields() {
        // the quoted name on line 2 runs onto line 3, so the bad row is line 5
        let csv = "site_name,ec_timestamp,location_latitude,location_longitude\n\
                   \"ship_1\nrelay\",2024-03-01,10.0,20.0\n\
                   ship_2,2024-03-01,11.0,21.0\n\
                   ship_3,2024-03-01,north,22.0\n";
        let err = parse_pings(csv.as_bytes()).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("ship data line 5"), "{message}");
    }

    #[test]
    fn test_short_record_names_its_line() {
        let csv = "port_name,geo_location_latitude,geo_location_longitude\n\
                   \"Port\nBlair\",11.6,92.7\n\
                   Kochi,9.96\n";
        let err = parse_ports(csv.as_bytes()).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("port data line 4"), "{message}");
    }

    #[test]
    fn test_parse_pings_rejects_non_finite() {
        let csv = "site_name,ec_timestamp,location_latitude,location_longitude\n\
                   ship_1,2024-03-01,NaN,20.0\n";
        assert!(parse_pings(csv.as_bytes()).is_err());

        let csv = "site_name,ec_timestamp,location_latitude,location_longitude\n\
                   ship_1,2024-03-01,10.0,inf\n";
        assert!(parse_pings(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_parse_pings_missing_column() {
        let csv = "site_name,location_latitude,location_longitude\nship_1,1,2\n";
        assert!(parse_pings(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_parse_ports_keeps_file_order() {
        let csv = "port_name,geo_location_latitude,geo_location_longitude\n\
                   Singapore,1.264,103.84\n\
                   Rotterdam, 51.95 ,4.14\n";

        let ports = parse_ports(csv.as_bytes()).unwrap();

        assert_eq!(ports.len(), 2);
        assert_eq!(ports[0].name, "Singapore");
        assert_eq!(ports[1].name, "Rotterdam");
        assert_eq!(ports[1].latitude, 51.95);
        assert_eq!(ports[1].longitude, 4.14);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();

        assert_eq!(parse_timestamp("2024-03-01T12:30:00Z").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-03-01T14:30:00+02:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-03-01 12:30:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-03-01T12:30:00").unwrap(), expected);
        assert_eq!(parse_timestamp(" 2024-03-01 12:30 ").unwrap(), expected);

        let fractional = parse_timestamp("2024-03-01T12:30:00.250Z").unwrap();
        assert_eq!(fractional.nanosecond(), 250_000_000);

        let midnight = parse_timestamp("2024-03-01").unwrap();
        assert_eq!(midnight.day(), 1);
        assert_eq!(midnight.hour(), 0);
    }

    #[test]
    fn test_parse_timestamp_offset_changes_day() {
        let ts = parse_timestamp("2024-03-02T01:00:00+05:00").unwrap();
        assert_eq!(ts.date_naive(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn test_parse_timestamp_garbage() {
        assert!(parse_timestamp("yesterday").is_err());
        assert!(parse_timestamp("").is_err());
    }
}
