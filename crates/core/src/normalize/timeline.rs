use serde_json::Value;

use crate::coerce::{self, Object};
use crate::types::{EventKind, TimelineEvent};

const AGGREGATE_KINDS: [(EventKind, &str, &str); 3] = [
    (EventKind::FileCreated, "created", "Files created"),
    (EventKind::FileModified, "modified", "Files modified"),
    (EventKind::FileDeleted, "deleted", "Files deleted"),
];

const EVENT_KIND: &[&str] = &["event", "type", "kind"];
const EVENT_FILE: &[&str] = &["fileName", "name", "file", "path"];
const EVENT_TIME: &[&str] = &["timestamp", "date", "time"];
const EVENT_COUNT: &[&str] = &["count"];
const ROW_DATE: &[&str] = &["date", "day", "timestamp"];

/// Rebuild a flat event list from either a per-date aggregate (object keyed
/// by date, or rows carrying a date) or a list of discrete events.
pub fn reconstruct(source: &Value, default_time: &str) -> Vec<TimelineEvent> {
    let mut events = Vec::new();

    match source {
        Value::Object(by_date) => {
            let mut dates: Vec<_> = by_date.iter().collect();
            dates.sort_by(|a, b| a.0.cmp(b.0));
            for (date, counts) in dates {
                if let Some(counts) = counts.as_object() {
                    let label = date_label(Some(date.as_str()), default_time);
                    expand_aggregate(&label, counts, &mut events);
                }
            }
        }
        Value::Array(rows) => {
            let empty = Object::new();
            for row in rows {
                let obj = row.as_object().unwrap_or(&empty);
                if is_aggregate_row(obj) {
                    let date = coerce::string(obj, ROW_DATE);
                    let label = date_label(date.as_deref(), default_time);
                    expand_aggregate(&label, obj, &mut events);
                } else {
                    events.push(discrete_event(obj, default_time));
                }
            }
        }
        _ => {}
    }

    events
}

/// Valid dates are kept as written; the timeline label is a date string, not
/// necessarily a full timestamp. Anything else takes the default time.
fn date_label(raw: Option<&str>, default_time: &str) -> String {
    raw.filter(|s| coerce::parse_timestamp(s).is_some())
        .unwrap_or(default_time)
        .to_string()
}

/// Rows carrying any count key are aggregates whatever the count types;
/// unusable counts then coerce to 0 and emit nothing.
fn is_aggregate_row(obj: &Object) -> bool {
    !obj.contains_key("event")
        && AGGREGATE_KINDS
            .iter()
            .any(|(_, key, _)| obj.contains_key(*key))
}

fn expand_aggregate(date: &str, counts: &Object, out: &mut Vec<TimelineEvent>) {
    for (kind, key, label) in AGGREGATE_KINDS {
        let n = coerce::count(counts, &[key]).unwrap_or(0);
        if n == 0 {
            continue;
        }
        out.push(TimelineEvent {
            event: kind,
            file_name: label.to_string(),
            timestamp: date.to_string(),
            count: n,
        });
    }
}

fn event_kind(obj: &Object) -> EventKind {
    match coerce::label(obj, EVENT_KIND).as_deref() {
        Some("file_deleted") => EventKind::FileDeleted,
        Some("file_modified") => EventKind::FileModified,
        _ => EventKind::FileCreated,
    }
}

fn discrete_event(obj: &Object, default_time: &str) -> TimelineEvent {
    let raw_time = EVENT_TIME.iter().find_map(|k| {
        obj.get(*k)
            .and_then(Value::as_str)
            .filter(|s| coerce::parse_timestamp(s).is_some())
    });
    let timestamp = date_label(raw_time, default_time);

    TimelineEvent {
        event: event_kind(obj),
        file_name: coerce::string(obj, EVENT_FILE).unwrap_or_else(|| "unknown".to_string()),
        timestamp,
        count: coerce::count(obj, EVENT_COUNT).unwrap_or(1),
    }
}
