use serde_json::Value;

use crate::error::PipelineError;

const SCHEDULED_SOURCES: &[&str] = &["aws.events", "aws.scheduler"];
const SCHEDULED_DETAIL_TYPE: &str = "Scheduled Event";

/// Location of the object a storage notification points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    pub bucket: String,
    pub key: String,
}

/// Shape of an incoming trigger payload.
#[derive(Debug, PartialEq)]
pub enum Trigger<'a> {
    Scheduled,
    /// No notification records at all.
    Empty,
    Records(&'a [Value]),
}

pub fn classify(event: &Value) -> Trigger<'_> {
    let Some(obj) = event.as_object() else { return Trigger::Empty };

    let scheduled_source = obj
        .get("source")
        .and_then(Value::as_str)
        .is_some_and(|s| SCHEDULED_SOURCES.contains(&s));
    let scheduled_detail = obj.get("detail-type").and_then(Value::as_str) == Some(SCHEDULED_DETAIL_TYPE);
    if scheduled_source || scheduled_detail {
        return Trigger::Scheduled;
    }

    match obj.get("Records").and_then(Value::as_array) {
        Some(records) if !records.is_empty() => Trigger::Records(records.as_slice()),
        _ => Trigger::Empty,
    }
}

/// `Ok(None)` when the record is not a storage notification.
pub fn object_ref(record: &Value) -> Result<Option<ObjectRef>, PipelineError> {
    let Some(s3) = record.get("s3") else { return Ok(None) };
    let bucket = s3.pointer("/bucket/name").and_then(Value::as_str);
    let key = s3.pointer("/object/key").and_then(Value::as_str);
    match (bucket, key) {
        (Some(bucket), Some(key)) => Ok(Some(ObjectRef { bucket: bucket.to_string(), key: key.to_string() })),
        (None, _) => Err(PipelineError::MalformedTrigger("s3 record without bucket.name".into())),
        (_, None) => Err(PipelineError::MalformedTrigger("s3 record without object.key".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scheduled_markers() {
        assert_eq!(classify(&json!({"source": "aws.events"})), Trigger::Scheduled);
        assert_eq!(classify(&json!({"source": "aws.scheduler", "detail": {}})), Trigger::Scheduled);
        assert_eq!(classify(&json!({"detail-type": "Scheduled Event"})), Trigger::Scheduled);
        assert_eq!(classify(&json!({"source": "aws.events", "Records": [{"s3": {}}]})), Trigger::Scheduled);
        assert_eq!(classify(&json!({"source": "custom.app"})), Trigger::Empty);
    }

    #[test]
    fn missing_or_empty_records() {
        assert_eq!(classify(&json!({})), Trigger::Empty);
        assert_eq!(classify(&json!({"Records": []})), Trigger::Empty);
        assert_eq!(classify(&json!({"Records": "nope"})), Trigger::Empty);
        assert_eq!(classify(&json!([1, 2])), Trigger::Empty);
        assert_eq!(classify(&Value::Null), Trigger::Empty);
    }

    #[test]
    fn records_are_borrowed() {
        let event = json!({"Records": [{"eventSource": "aws:sqs"}, {"s3": {}}]});
        match classify(&event) {
            Trigger::Records(r) => assert_eq!(r.len(), 2),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn extracts_object_ref() {
        let rec = json!({"s3": {"bucket": {"name": "raw"}, "object": {"key": "in/a.json", "size": 12}}});
        assert_eq!(object_ref(&rec).unwrap(), Some(ObjectRef { bucket: "raw".into(), key: "in/a.json".into() }));
        assert_eq!(object_ref(&json!({"eventSource": "aws:sqs"})).unwrap(), None);
    }

    #[test]
    fn incomplete_s3_entry_is_malformed() {
        let no_key = json!({"s3": {"bucket": {"name": "raw"}, "object": {}}});
        let no_bucket = json!({"s3": {"object": {"key": "a.json"}}});
        assert!(matches!(object_ref(&no_key), Err(PipelineError::MalformedTrigger(_))));
        assert!(matches!(object_ref(&no_bucket), Err(PipelineError::MalformedTrigger(_))));
    }
}
