//! Grouping of event logs by experimental system and task.
//!
//! Clients tag every event with `system` and `taskNumber` inside its event
//! data. Logs are bucketed under keys of the form `system{S}_task{N}`; logs
//! without a tag land in the `unknown` bucket for that component.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::models::LogEntry;

pub const UNKNOWN: &str = "unknown";

/// Builds the `system{S}_task{N}` key for one event payload.
pub fn task_key(event_data: &Value) -> String {
    let system = label(event_data, "system");
    let task = label(event_data, "taskNumber");
    format!("system{system}_task{task}")
}

fn label(event_data: &Value, field: &str) -> String {
    match event_data.get(field) {
        None | Some(Value::Null) => UNKNOWN.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Buckets logs by task key. Order within a bucket follows the input order.
pub fn group_by_task<T>(logs: Vec<T>, event_data: impl Fn(&T) -> &Value) -> BTreeMap<String, Vec<T>> {
    let mut groups: BTreeMap<String, Vec<T>> = BTreeMap::new();
    for log in logs {
        groups.entry(task_key(event_data(&log))).or_default().push(log);
    }
    groups
}

pub fn count_by_task(logs: &[LogEntry]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for log in logs {
        *counts.entry(task_key(&log.event_data)).or_insert(0) += 1;
    }
    counts
}

/// Counts events by message, most frequent first. Equal counts keep the
/// order in which each message was first seen.
pub fn message_counts<'a>(messages: impl IntoIterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for message in messages {
        match counts.iter_mut().find(|(seen, _)| seen.as_str() == message) {
            Some((_, count)) => *count += 1,
            None => counts.push((message.to_string(), 1)),
        }
    }

    // sort_by is stable
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(id: i64, message: &str, event_data: Value) -> LogEntry {
        LogEntry {
            id,
            user_id: "P1".into(),
            timestamp: format!("2025-03-01T10:00:{id:02}Z"),
            message: message.into(),
            event_data,
            created_at: chrono::DateTime::default(),
        }
    }

    #[test]
    fn key_uses_system_and_task_number() {
        assert_eq!(task_key(&json!({"system": "A", "taskNumber": 1})), "systemA_task1");
        assert_eq!(task_key(&json!({"system": "B", "taskNumber": "3"})), "systemB_task3");
    }

    #[test]
    fn missing_fields_are_unknown() {
        assert_eq!(task_key(&json!({"system": "A"})), "systemA_taskunknown");
        assert_eq!(task_key(&json!({"taskNumber": null})), "systemunknown_taskunknown");
        assert_eq!(task_key(&json!(["not", "an", "object"])), "systemunknown_taskunknown");
    }

    #[test]
    fn grouping_keeps_input_order() {
        let logs = vec![
            entry(1, "open", json!({"system": "A", "taskNumber": 1})),
            entry(2, "pin", json!({"system": "B", "taskNumber": 1})),
            entry(3, "close", json!({"system": "A", "taskNumber": 1})),
        ];

        let groups = group_by_task(logs, |l| &l.event_data);
        assert_eq!(groups.len(), 2);
        let ids: Vec<i64> = groups["systemA_task1"].iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(groups["systemB_task1"].len(), 1);
    }

    #[test]
    fn message_counts_sorted_by_frequency() {
        let logs = vec![
            entry(1, "tap", json!({})),
            entry(2, "scan", json!({})),
            entry(3, "tap", json!({})),
            entry(4, "anchor", json!({})),
        ];

        let counts = message_counts(logs.iter().map(|l| l.message.as_str()));
        assert_eq!(
            counts,
            vec![("tap".to_string(), 2), ("scan".to_string(), 1), ("anchor".to_string(), 1)]
        );
        assert_eq!(count_by_task(&logs)["systemunknown_taskunknown"], 4);
    }

    #[test]
    fn message_count_ties_keep_first_seen_order() {
        let counts = message_counts(["zoom", "anchor", "zoom", "anchor", "mark"]);
        let order: Vec<&str> = counts.iter().map(|(m, _)| m.as_str()).collect();
        assert_eq!(order, vec!["zoom", "anchor", "mark"]);
    }
}
