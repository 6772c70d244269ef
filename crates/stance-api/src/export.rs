//! CSV export of study records

use chrono::{DateTime, Utc};
use csv::Writer;
use stance_persist::StoredStudyRecord;

use crate::error::ApiError;

/// Column order of the export
pub const HEADERS: [&str; 20] = [
    "prolificPid",
    "group",
    "thesisId",
    "thesisTitle",
    "thesisText",
    "run",
    "initialPosition",
    "initialInformation",
    "initialStatement",
    "finalPosition",
    "finalInformation",
    "totalTimeSeconds",
    "chatTimeSeconds",
    "iframeOpen",
    "chatStart",
    "chatEnd",
    "completion",
    "createdAt",
    "chatHistoryLength",
    "chatHistoryJSON",
];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render epoch milliseconds; values chrono cannot represent are written raw
fn format_millis(ts: Option<i64>) -> String {
    match ts {
        Some(ms) => DateTime::<Utc>::from_timestamp_millis(ms)
            .map(|dt| dt.format(TIMESTAMP_FORMAT).to_string())
            .unwrap_or_else(|| ms.to_string()),
        None => String::new(),
    }
}

/// Seconds keep their fractional part (`400.0`, not `400`)
fn seconds(value: Option<f64>) -> String {
    value.map(|v| format!("{v:?}")).unwrap_or_default()
}

/// Render all records as CSV, header first
pub fn render_csv(records: &[StoredStudyRecord]) -> Result<Vec<u8>, ApiError> {
    let mut wtr = Writer::from_writer(Vec::new());
    wtr.write_record(HEADERS)?;

    for stored in records {
        let r = &stored.record;
        let chat_history_json = if r.chat_history.is_empty() {
            String::new()
        } else {
            serde_json::to_string(&r.chat_history)
                .map_err(|e| ApiError::Internal(e.to_string()))?
        };

        wtr.write_record([
            r.prolific_pid.clone(),
            r.group.clone(),
            r.thesis_id.to_string(),
            r.thesis_title.clone(),
            r.thesis_text.clone(),
            r.run.to_string(),
            r.initial_position.to_string(),
            r.initial_information.to_string(),
            r.initial_statement.clone(),
            r.final_position.to_string(),
            r.final_information.to_string(),
            seconds(r.total_time_seconds),
            seconds(r.chat_time_seconds),
            format_millis(r.timestamps.iframe_open),
            format_millis(r.timestamps.chat_start),
            format_millis(r.timestamps.chat_end),
            format_millis(r.timestamps.completion),
            stored.created_at.format(TIMESTAMP_FORMAT).to_string(),
            r.chat_history.len().to_string(),
            chat_history_json,
        ])?;
    }

    wtr.into_inner()
        .map_err(|e| ApiError::Internal(format!("CSV flush failed: {}", e.error())))
}

/// `thesis_study_data_<YYYYmmdd_HHMMSS>.csv`
pub fn export_filename(now: DateTime<Utc>) -> String {
    format!("thesis_study_data_{}.csv", now.format("%Y%m%d_%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use stance_core::Message;
    use stance_persist::StudyRecord;

    fn stored(history: Vec<Message>) -> StoredStudyRecord {
        let mut record: StudyRecord = serde_json::from_value(serde_json::json!({
            "prolificPid": "PID, with comma",
            "group": "A",
            "thesisId": 1,
            "thesisTitle": "Titel",
            "thesisText": "Text mit \"Zitat\"",
            "run": 1,
            "initialPosition": 20,
            "initialInformation": 50,
            "initialStatement": "Zeile 1\nZeile 2",
            "chatHistory": [],
            "finalPosition": 35,
            "finalInformation": 70,
            "timestamps": {"iframeOpen": 0, "chatEnd": 1718000360000i64},
            "totalTimeSeconds": 400.0,
            "chatTimeSeconds": 12.5
        }))
        .unwrap();
        record.chat_history = history;
        StoredStudyRecord {
            record,
            created_at: Utc.with_ymd_and_hms(2025, 2, 3, 4, 5, 6).unwrap(),
            document_id: uuid::Uuid::nil(),
        }
    }

    fn parse(bytes: &[u8]) -> Vec<csv::StringRecord> {
        csv::Reader::from_reader(bytes)
            .records()
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn test_header_row() {
        let bytes = render_csv(&[]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text.trim_end(), HEADERS.join(","));
    }

    #[test]
    fn test_row_rendering() {
        let history = vec![Message::assistant("Hallo"), Message::user("Hi")];
        let bytes = render_csv(&[stored(history.clone())]).unwrap();
        let rows = parse(&bytes);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];

        assert_eq!(&row[0], "PID, with comma");
        assert_eq!(&row[4], "Text mit \"Zitat\"");
        assert_eq!(&row[8], "Zeile 1\nZeile 2");
        assert_eq!(&row[11], "400.0");
        assert_eq!(&row[12], "12.5");
        assert_eq!(&row[13], "1970-01-01 00:00:00");
        assert_eq!(&row[14], "");
        assert_eq!(&row[15], "2024-06-10 06:19:20");
        assert_eq!(&row[17], "2025-02-03 04:05:06");
        assert_eq!(&row[18], "2");
        let parsed: Vec<Message> = serde_json::from_str(&row[19]).unwrap();
        assert_eq!(parsed, history);
    }

    #[test]
    fn test_missing_seconds_are_blank() {
        let mut record = stored(vec![]);
        record.record.total_time_seconds = None;
        record.record.chat_time_seconds = Some(7.0);
        let rows = parse(&render_csv(&[record]).unwrap());
        assert_eq!(&rows[0][11], "");
        assert_eq!(&rows[0][12], "7.0");
    }

    #[test]
    fn test_empty_history_is_blank() {
        let rows = parse(&render_csv(&[stored(vec![])]).unwrap());
        assert_eq!(&rows[0][18], "0");
        assert_eq!(&rows[0][19], "");
    }

    #[test]
    fn test_filename() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 14, 30, 5).unwrap();
        assert_eq!(export_filename(now), "thesis_study_data_20250301_143005.csv");
    }
}
