//! Input ingestion
//!
//! Reads CSV records into per-series accumulators. Column names may vary
//! between upstream processors, so each logical field has an ordered alias
//! list that is resolved once against the header.

use super::intervals::IntervalKey;
use crate::platform::context::ProcessorContext;
use crate::platform::error::{ProcessorError, Result};
use std::collections::{BTreeMap, HashMap};
use std::io::Read;

/// Accepted header names for the series label, first match wins
pub const SERIES_ALIASES: &[&str] = &["text", "item"];
/// Accepted header names for the interval key, first match wins
pub const INTERVAL_ALIASES: &[&str] = &["time", "date"];
/// Accepted header names for the value, first match wins
pub const VALUE_ALIASES: &[&str] = &["value", "frequency"];

/// Column indices resolved from the CSV header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub series: usize,
    pub interval: Option<usize>,
    pub value: Option<usize>,
}

impl ColumnMap {
    pub fn resolve(headers: &csv::StringRecord) -> Result<Self> {
        let find = |aliases: &[&str]| {
            aliases
                .iter()
                .find_map(|alias| headers.iter().position(|h| h.trim() == *alias))
        };

        let series = find(SERIES_ALIASES).ok_or(ProcessorError::MissingColumn {
            field: "item",
            aliases: SERIES_ALIASES,
        })?;

        let interval = find(INTERVAL_ALIASES);
        if interval.is_none() {
            tracing::warn!(
                "No interval column found (looked for: {})",
                INTERVAL_ALIASES.join(", ")
            );
        }

        let value = find(VALUE_ALIASES);
        if value.is_none() {
            tracing::warn!(
                "No value column found (looked for: {}), all values count as 0",
                VALUE_ALIASES.join(", ")
            );
        }

        Ok(ColumnMap {
            series,
            interval,
            value,
        })
    }
}

/// Zero-pad the components of a date string
///
/// A 4-character component (the year) is kept as is, every other component
/// is left-padded to 2 characters, so `2020-3-7` becomes `2020-03-07`.
/// A trailing time of day (`2020-03-07 12:00` or `2020-03-07T12:00`) is
/// dropped.
pub fn normalise_interval(raw: &str) -> String {
    let date = raw
        .trim()
        .split(|c: char| c == ' ' || c == 'T')
        .next()
        .unwrap_or("");

    date.split('-')
        .map(|bit| {
            if bit.len() == 4 {
                bit.to_string()
            } else {
                format!("{:0>2}", bit)
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// Parse a value cell, 0 when absent or unparseable
pub fn parse_value(raw: Option<&str>) -> f64 {
    raw.map(str::trim)
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Per-series accumulators in first-appearance order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSeriesTable {
    pub series: Vec<(String, BTreeMap<IntervalKey, f64>)>,
    index: HashMap<String, usize>,
    /// Rows whose interval could not be parsed
    pub dropped: usize,
}

impl RawSeriesTable {
    /// Add one data point; values of recurring (series, interval) pairs sum
    ///
    /// The series is registered even when the interval is unparseable, so it
    /// still gets a (zero) graph.
    pub fn add(&mut self, label: &str, interval: Option<IntervalKey>, value: f64) {
        let idx = match self.index.get(label) {
            Some(&idx) => idx,
            None => {
                self.series.push((label.to_string(), BTreeMap::new()));
                self.index.insert(label.to_string(), self.series.len() - 1);
                self.series.len() - 1
            }
        };

        match interval {
            Some(key) => *self.series[idx].1.entry(key).or_insert(0.0) += value,
            None => self.dropped += 1,
        }
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Read all records of a CSV stream into a RawSeriesTable
///
/// Columns are resolved once the first record is read: input without data
/// rows is empty regardless of its header. The interruption flag is checked
/// before every record.
pub fn read_series<R: Read, C: ProcessorContext + ?Sized>(
    reader: &mut csv::Reader<R>,
    ctx: &C,
) -> Result<RawSeriesTable> {
    let headers = reader.headers()?.clone();
    let mut table = RawSeriesTable::default();
    let mut record = csv::StringRecord::new();

    ctx.check_interrupted("while reading graph data")?;
    if !reader.read_record(&mut record)? {
        tracing::debug!("Input has no data rows");
        return Ok(table);
    }

    let columns = ColumnMap::resolve(&headers)?;
    tracing::debug!("Resolved input columns: {:?}", columns);

    loop {
        let label = record.get(columns.series).unwrap_or("");
        let interval = columns
            .interval
            .and_then(|i| record.get(i))
            .map(normalise_interval)
            .and_then(|key| IntervalKey::parse(&key));
        let value = parse_value(columns.value.and_then(|i| record.get(i)));

        table.add(label, interval, value);

        ctx.check_interrupted("while reading graph data")?;
        if !reader.read_record(&mut record)? {
            break;
        }
    }

    if table.dropped > 0 {
        tracing::warn!(
            "Skipped {} row(s) with an unrecognised date/time value",
            table.dropped
        );
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::LocalContext;

    fn read(csv_data: &str) -> Result<RawSeriesTable> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(csv_data.as_bytes());
        read_series(&mut reader, &LocalContext::detached())
    }

    fn values(table: &RawSeriesTable, label: &str) -> Vec<(String, f64)> {
        table
            .series
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.iter().map(|(k, v)| (k.to_string(), *v)).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_normalise_interval() {
        assert_eq!(normalise_interval("2020"), "2020");
        assert_eq!(normalise_interval("2020-3"), "2020-03");
        assert_eq!(normalise_interval("2020-03"), "2020-03");
        assert_eq!(normalise_interval("2020-3-7"), "2020-03-07");
        assert_eq!(normalise_interval(" 2020-12-25 "), "2020-12-25");
        assert_eq!(normalise_interval("2020-03-07 13:45:00"), "2020-03-07");
        assert_eq!(normalise_interval("2020-03-07T13:45:00"), "2020-03-07");
        assert_eq!(normalise_interval(""), "00");
    }

    #[test]
    fn test_normalise_interval_padded_and_unpadded_agree() {
        for (unpadded, padded) in [("2020-3", "2020-03"), ("1999-1-1", "1999-01-01")] {
            assert_eq!(normalise_interval(unpadded), normalise_interval(padded));
        }
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value(Some("3.5")), 3.5);
        assert_eq!(parse_value(Some(" -2 ")), -2.0);
        assert_eq!(parse_value(Some("n/a")), 0.0);
        assert_eq!(parse_value(Some("NaN")), 0.0);
        assert_eq!(parse_value(None), 0.0);
    }

    #[test]
    fn test_column_aliases_first_match_wins() {
        let headers = csv::StringRecord::from(vec!["item", "text", "date", "frequency", "value"]);
        let columns = ColumnMap::resolve(&headers).unwrap();
        assert_eq!(columns.series, 1); // "text" is preferred over "item"
        assert_eq!(columns.interval, Some(2));
        assert_eq!(columns.value, Some(4)); // "value" is preferred over "frequency"
    }

    #[test]
    fn test_missing_series_column() {
        let headers = csv::StringRecord::from(vec!["date", "value"]);
        let err = ColumnMap::resolve(&headers).unwrap_err();
        assert!(matches!(err, ProcessorError::MissingColumn { field: "item", .. }));
    }

    #[test]
    fn test_duplicates_sum() {
        let table = read("item,date,value\nA,2020-01,1\nA,2020-1,2.5\nB,2020-01,4\n").unwrap();
        assert_eq!(values(&table, "A"), vec![("2020-01".to_string(), 3.5)]);
        assert_eq!(values(&table, "B"), vec![("2020-01".to_string(), 4.0)]);
    }

    #[test]
    fn test_alias_columns() {
        let table = read("text,time,frequency\nfoo,2021,7\n").unwrap();
        assert_eq!(values(&table, "foo"), vec![("2021".to_string(), 7.0)]);
    }

    #[test]
    fn test_missing_value_column_counts_zero() {
        let table = read("item,date\nA,2020\n").unwrap();
        assert_eq!(values(&table, "A"), vec![("2020".to_string(), 0.0)]);
    }

    #[test]
    fn test_malformed_dates_dropped() {
        let table = read("item,date,value\nA,yesterday,1\nA,2020-02,2\nB,,3\n").unwrap();
        assert_eq!(table.dropped, 2);
        assert_eq!(values(&table, "A"), vec![("2020-02".to_string(), 2.0)]);

        // B is still registered as a series
        assert_eq!(table.len(), 2);
        assert!(values(&table, "B").is_empty());
    }

    #[test]
    fn test_empty_input() {
        let table = read("item,date,value\n").unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_no_rows_ignores_unknown_header() {
        assert!(read("").unwrap().is_empty());
        assert!(read("word,count\n").unwrap().is_empty());

        // With data rows the missing column is still an error
        let err = read("word,count\nfoo,1\n").unwrap_err();
        assert!(matches!(err, ProcessorError::MissingColumn { .. }));
    }

    #[test]
    fn test_interrupted_while_reading() {
        let ctx = LocalContext::detached();
        ctx.interrupt_handle()
            .store(true, std::sync::atomic::Ordering::Relaxed);

        let mut reader = csv::Reader::from_reader("item,date,value\nA,2020,1\n".as_bytes());
        let err = read_series(&mut reader, &ctx).unwrap_err();
        assert!(err.is_interrupted());
    }
}
