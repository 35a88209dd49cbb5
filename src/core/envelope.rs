//! Uniform JSON response envelope
//!
//! Every endpoint answers with `{success, data?, count?, deletedCount?,
//! message?, error?, timestamp?}`. Absent members are not serialized.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response wrapper shared by all routes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T = Value> {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,

    #[serde(
        rename = "deletedCount",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub deleted_count: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl<T> Envelope<T> {
    fn blank(success: bool) -> Self {
        Self {
            success,
            data: None,
            count: None,
            deleted_count: None,
            message: None,
            error: None,
            timestamp: None,
        }
    }

    /// Successful response carrying a row or a list of rows
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            ..Self::blank(true)
        }
    }

    /// Successful response with no data member
    pub fn empty() -> Self {
        Self::blank(true)
    }

    /// Failure with a human-readable `message` (404/400)
    pub fn failure_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::blank(false)
        }
    }

    /// Failure with raw `error` text (500, or invalid status)
    pub fn failure_error(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::blank(false)
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_deleted_count(mut self, deleted: u64) -> Self {
        self.deleted_count = Some(deleted);
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

impl<T> Envelope<Vec<T>> {
    /// Successful list response, `count` set to the number of rows
    pub fn list(rows: Vec<T>) -> Self {
        let count = rows.len();
        Self::ok(rows).with_count(count)
    }
}
