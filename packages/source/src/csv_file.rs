//! CSV record reader.
//!
//! Every row is first turned into a [`serde_json::Value`] object keyed by
//! the trimmed column headers, then converted to a [`CallRecord`]. Going
//! through string values keeps postal codes such as `"08012"` intact.
//!
//! Both the cleaned dataset export (`emergency_type`, `township`, ...) and
//! the raw 911 export (`title`, `twp`, `zip`, `timeStamp`, ...) are
//! accepted. A raw `title` of the form `"EMS: BACK PAINS/INJURY"` is split
//! into type and subtype, and rows without an `id` are numbered from 1.
//!
//! Fields are decoded as lossy UTF-8: a stray invalid byte turns into
//! `U+FFFD` inside that one field instead of failing the row or the file.

use std::io::Read;

use crisis_lens_call_models::CallRecord;

use crate::SourceError;

/// Reads all records from CSV data with a header row.
///
/// # Errors
///
/// Returns [`SourceError`] if the header row is missing or the underlying
/// reader fails. Rows that cannot be parsed or do not convert to a record
/// are skipped with a warning.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<CallRecord>, SourceError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers: Vec<String> = reader
        .byte_headers()?
        .iter()
        .map(|h| String::from_utf8_lossy(h).trim().to_owned())
        .collect();

    if headers.iter().all(String::is_empty) {
        return Err(SourceError::Format {
            message: "CSV file contains no header row".to_owned(),
        });
    }

    let mut records = Vec::new();
    let mut skipped: u64 = 0;

    for (line, result) in reader.byte_records().enumerate() {
        let row = match result {
            Ok(row) => row,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                skipped += 1;
                log::warn!("Skipping unreadable CSV row {}: {e}", line + 2);
                continue;
            }
        };

        let mut map = serde_json::Map::new();
        for (i, header) in headers.iter().enumerate() {
            let value = row
                .get(i)
                .map(|field| String::from_utf8_lossy(field).trim().to_owned())
                .unwrap_or_default();
            map.insert(header.clone(), serde_json::Value::String(value));
        }
        split_title(&mut map);
        if map.get("id").and_then(serde_json::Value::as_str).is_none_or(str::is_empty) {
            map.insert("id".to_owned(), serde_json::Value::String((line + 1).to_string()));
        }

        match serde_json::from_value::<CallRecord>(serde_json::Value::Object(map)) {
            Ok(record) => records.push(record),
            Err(e) => {
                skipped += 1;
                log::warn!("Skipping CSV row {}: {e}", line + 2);
            }
        }
    }

    if skipped > 0 {
        log::warn!("Skipped {skipped} malformed CSV rows");
    }
    log::debug!("Parsed {} records from CSV", records.len());

    Ok(records)
}

/// Derives `emergency_type`/`emergency_subtype` from a raw `title` column
/// when the row has no explicit type.
fn split_title(map: &mut serde_json::Map<String, serde_json::Value>) {
    let has_type = ["emergency_type", "emergencyType"]
        .iter()
        .any(|k| map.get(*k).and_then(serde_json::Value::as_str).is_some_and(|v| !v.is_empty()));
    if has_type {
        return;
    }

    let Some(title) = map.remove("title") else {
        return;
    };
    let Some(title) = title.as_str() else {
        return;
    };

    let (kind, subtype) = match title.split_once(':') {
        Some((kind, subtype)) => (kind.trim(), Some(subtype.trim())),
        None => (title.trim(), None),
    };

    map.remove("emergencyType");
    map.insert(
        "emergency_type".to_owned(),
        serde_json::Value::String(kind.to_owned()),
    );
    if let Some(subtype) = subtype
        && !map.contains_key("emergency_subtype")
        && !map.contains_key("emergencySubtype")
    {
        map.insert(
            "emergency_subtype".to_owned(),
            serde_json::Value::String(subtype.to_owned()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_cleaned_export() {
        let data = "\
id,timestamp,emergency_type,emergency_subtype,township,zipcode,latitude,longitude,caller_gender,caller_age,response_time
1,2015-12-10 17:40:00,EMS,BACK PAINS/INJURY,NEW HANOVER,19525.0,40.2978759,-75.5812935,Female,34,12
2,2015-12-10 17:40:00,Fire,GAS-ODOR/LEAK,HATFIELD TOWNSHIP,08012,40.2580614,-75.2646799,Male,61,7
";
        let records = read_records(data.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.id, "1");
        assert_eq!(first.emergency_type, "EMS");
        assert_eq!(first.emergency_subtype.as_deref(), Some("BACK PAINS/INJURY"));
        assert_eq!(first.zipcode, "19525");
        assert_eq!(first.caller_age, Some(34));
        assert_eq!(first.response_time, Some(12));
        assert!(first.coordinates().is_some());

        assert_eq!(records[1].zipcode, "08012");
    }

    #[test]
    fn reads_raw_911_export() {
        let data = "\
lat,lng,desc,zip,title,timeStamp,twp,addr,e
40.2978759,-75.5812935,REINDEER CT & DEAD END,19525,EMS: BACK PAINS/INJURY,2015-12-10 17:40:00,NEW HANOVER,REINDEER CT & DEAD END,1
40.2580614,-75.2646799,BRIAR PATH & WHITEMARSH LN,,Traffic: VEHICLE ACCIDENT -,2015-12-10 17:40:00,HATFIELD TOWNSHIP,BRIAR PATH & WHITEMARSH LN,1
";
        let records = read_records(data.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "1");
        assert_eq!(records[1].id, "2");
        assert_eq!(records[0].emergency_type, "EMS");
        assert_eq!(records[0].township, "NEW HANOVER");
        assert_eq!(records[0].month_key().as_deref(), Some("2015-12"));
        assert_eq!(records[1].emergency_type, "Traffic");
        assert_eq!(records[1].emergency_subtype.as_deref(), Some("VEHICLE ACCIDENT -"));
        assert!(records[1].zipcode.is_empty());
        assert_eq!(records[1].caller_age, None);
    }

    #[test]
    fn keeps_rows_with_bad_values() {
        let data = "\
id,timestamp,emergency_type,caller_age
1,not a date,EMS,unknown
";
        let records = read_records(data.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].occurred_at().is_none());
        assert_eq!(records[0].caller_age, None);
    }

    #[test]
    fn handles_short_rows() {
        let data = "id,timestamp,emergency_type,township\n7,2015-01-01 08:00:00,Fire\n";
        let records = read_records(data.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].township.is_empty());
    }

    #[test]
    fn invalid_utf8_only_affects_its_own_field() {
        let mut data = b"id,timestamp,emergency_type,township\n".to_vec();
        data.extend_from_slice(b"1,2015-01-01 08:00:00,EMS,ABINGTON\n");
        data.extend_from_slice(b"2,2015-01-02 09:00:00,Fire,LOWER \xff MERION\n");
        data.extend_from_slice(b"3,2015-01-03 10:00:00,Traffic,NORRISTOWN\n");

        let records = read_records(data.as_slice()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].township, "ABINGTON");
        assert_eq!(records[1].emergency_type, "Fire");
        assert_eq!(records[1].township, "LOWER \u{fffd} MERION");
        assert_eq!(records[2].township, "NORRISTOWN");
    }

    #[test]
    fn header_only_file_is_empty() {
        let records = read_records("id,timestamp,emergency_type\n".as_bytes()).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn missing_header_is_an_error() {
        let err = read_records("".as_bytes()).unwrap_err();
        assert!(matches!(err, SourceError::Format { .. }));
    }
}
