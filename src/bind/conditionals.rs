//! Row filters applied before a spec is bound
//!
//! All `and` conditions must hold; when `or` is non-empty at least one of its
//! conditions must hold too. Missing cells satisfy no condition.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::field::FieldId;
use crate::table::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field_id: FieldId,
    pub operation: Operation,
    pub criteria: Value,
}

impl Condition {
    pub fn new(field_id: u64, operation: Operation, criteria: impl Into<Value>) -> Self {
        Condition {
            field_id: FieldId(field_id),
            operation,
            criteria: criteria.into(),
        }
    }

    pub fn matches(&self, cell: &Value) -> bool {
        if cell.is_missing() {
            return false;
        }

        let ordering = match (cell, &self.criteria) {
            (Value::Number(_) | Value::Boolean(_), Value::Number(_) | Value::Boolean(_))
            | (Value::Timestamp(_), Value::Timestamp(_))
            | (Value::Text(_), Value::Text(_)) => cell
                .as_f64()
                .zip(self.criteria.as_f64())
                .map(|(a, b)| a.total_cmp(&b))
                .unwrap_or_else(|| cell.cmp(&self.criteria)),
            // Numeric cells compared against numeric text criteria
            (Value::Number(n), Value::Text(s)) => match s.trim().parse::<f64>() {
                Ok(c) => n.total_cmp(&c),
                Err(_) => return self.operation == Operation::Ne,
            },
            // Temporal cells compared against date or datetime text criteria
            (Value::Timestamp(ts), Value::Text(s)) => match parse_timestamp(s) {
                Some(c) => ts.cmp(&c),
                None => return self.operation == Operation::Ne,
            },
            _ => return self.operation == Operation::Ne,
        };

        match self.operation {
            Operation::Eq => ordering == Ordering::Equal,
            Operation::Ne => ordering != Ordering::Equal,
            Operation::Lt => ordering == Ordering::Less,
            Operation::Le => ordering != Ordering::Greater,
            Operation::Gt => ordering == Ordering::Greater,
            Operation::Ge => ordering != Ordering::Less,
        }
    }
}

/// Parse text criteria as a date, then as a datetime
fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.naive_utc()))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Conditionals {
    pub and: Vec<Condition>,
    pub or: Vec<Condition>,
}

impl Conditionals {
    pub fn none() -> Self {
        Conditionals::default()
    }

    pub fn is_empty(&self) -> bool {
        self.and.is_empty() && self.or.is_empty()
    }

    pub fn and(mut self, condition: Condition) -> Self {
        self.and.push(condition);
        self
    }

    pub fn or(mut self, condition: Condition) -> Self {
        self.or.push(condition);
        self
    }

    /// Fields the conditions read
    pub fn field_ids(&self) -> Vec<FieldId> {
        let mut ids: Vec<FieldId> = self.and.iter().chain(&self.or).map(|c| c.field_id).collect();
        ids.sort();
        ids.dedup();
        ids
    }

    /// Evaluate against a row, given a lookup from field id to cell
    pub fn matches<'a, F>(&self, cell: F) -> bool
    where
        F: Fn(FieldId) -> Option<&'a Value>,
    {
        let holds = |c: &Condition| cell(c.field_id).map(|v| c.matches(v)).unwrap_or(false);
        self.and.iter().all(holds) && (self.or.is_empty() || self.or.iter().any(holds))
    }
}
