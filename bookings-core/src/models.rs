use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::pii::Masked;

/// A booking request that has not been persisted yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub first_name: String,
    pub last_name: String,
    pub email: Masked<String>,
    pub phone: Masked<String>,
    pub room_id: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Reservation {
    /// Builds a candidate from raw form fields. Room id and dates are optional
    /// and silently dropped when they do not parse.
    pub fn from_fields(fields: &HashMap<String, String>) -> Self {
        let text = |name: &str| fields.get(name).cloned().unwrap_or_default();
        let date = |name: &str| {
            fields
                .get(name)
                .and_then(|v| NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d").ok())
        };

        Self {
            first_name: text("first_name"),
            last_name: text("last_name"),
            email: Masked(text("email")),
            phone: Masked(text("phone")),
            room_id: fields.get("room_id").and_then(|v| v.trim().parse().ok()),
            start_date: date("start_date"),
            end_date: date("end_date"),
        }
    }

    pub fn for_room(room_id: Option<i32>) -> Self {
        Self {
            room_id,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: i32,
    pub room_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
