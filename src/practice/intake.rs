//! Operator-facing record creation.
//!
//! Form input arrives as text. It is validated here, attributed to the acting
//! user, inserted through the store, and reported through a [`Notifier`].
//! Rejected input never reaches the store.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::db::{
    ClientRecord, CreateClientParams, CreateHearingParams, CreateTimeEntryParams, Database,
    HearingRecord, MAX_BILLABLE_RATE, MAX_ENTRY_HOURS, TimeEntryRecord,
};
use crate::error::{Error, ValidationError};
use crate::practice::notify::{Notice, Notifier};

#[derive(Debug, Clone, Default)]
pub struct TimeEntryInput {
    pub matter_id: Option<String>,
    pub description: String,
    pub hours: String,
    /// `YYYY-MM-DD`.
    pub date: String,
    pub billable_rate: Option<String>,
    pub is_billable: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct HearingInput {
    pub matter_id: String,
    pub title: String,
    /// RFC 3339 timestamp.
    pub hearing_date: String,
    pub court_name: Option<String>,
    pub judge_name: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ClientInput {
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

fn required(field: &str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(field, "is required"));
    }
    Ok(trimmed.to_string())
}

fn optional(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn parse_bounded_decimal(field: &str, raw: &str, max: u32) -> Result<Decimal, ValidationError> {
    let value = Decimal::from_str(raw.trim())
        .map_err(|_| ValidationError::new(field, "must be a number"))?;
    if value < Decimal::ZERO {
        return Err(ValidationError::new(field, "must not be negative"));
    }
    if value > Decimal::from(max) {
        return Err(ValidationError::new(field, format!("must not exceed {max}")));
    }
    Ok(value)
}

fn parse_uuid(field: &str, raw: &str) -> Result<Uuid, ValidationError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ValidationError::new(field, "must be a valid id"))
}

fn parse_entry_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    let value = raw.trim();
    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(parsed) if parsed.format("%Y-%m-%d").to_string() == value => Ok(parsed),
        _ => Err(ValidationError::new("date", "must be in YYYY-MM-DD format")),
    }
}

fn parse_hearing_date(raw: &str) -> Result<DateTime<Utc>, ValidationError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ValidationError::new("hearing_date", "must be an RFC 3339 timestamp"))
}

impl TimeEntryInput {
    pub fn validate(self) -> Result<CreateTimeEntryParams, ValidationError> {
        let matter_id = optional(self.matter_id)
            .map(|raw| parse_uuid("matter_id", &raw))
            .transpose()?;
        let billable_rate = optional(self.billable_rate)
            .map(|raw| parse_bounded_decimal("billable_rate", &raw, MAX_BILLABLE_RATE))
            .transpose()?;
        Ok(CreateTimeEntryParams {
            matter_id,
            description: required("description", &self.description)?,
            date: parse_entry_date(&self.date)?,
            hours: parse_bounded_decimal("hours", &self.hours, MAX_ENTRY_HOURS)?,
            is_billable: self.is_billable.unwrap_or(true),
            billable_rate,
        })
    }
}

impl HearingInput {
    pub fn validate(self) -> Result<CreateHearingParams, ValidationError> {
        let matter_id = parse_uuid("matter_id", &required("matter_id", &self.matter_id)?)?;
        Ok(CreateHearingParams {
            matter_id,
            title: required("title", &self.title)?,
            hearing_date: parse_hearing_date(&self.hearing_date)?,
            court_name: optional(self.court_name),
            judge_name: optional(self.judge_name),
            location: optional(self.location),
            notes: optional(self.notes),
        })
    }
}

impl ClientInput {
    pub fn validate(self) -> Result<CreateClientParams, ValidationError> {
        Ok(CreateClientParams {
            full_name: required("full_name", &self.full_name)?,
            email: optional(self.email),
            phone: optional(self.phone),
            company_name: optional(self.company_name),
            address: optional(self.address),
            notes: optional(self.notes),
        })
    }
}

/// Report the outcome and pass it through.
fn report<T>(
    notifier: &dyn Notifier,
    result: Result<T, Error>,
    success: &str,
    failure: &str,
) -> Result<T, Error> {
    match &result {
        Ok(_) => notifier.notify(Notice::success(success)),
        Err(err) => {
            tracing::warn!(error = %err, "{}", failure);
            notifier.notify(Notice::error(failure));
        }
    }
    result
}

pub async fn record_time_entry(
    db: &dyn Database,
    notifier: &dyn Notifier,
    user_id: &str,
    input: TimeEntryInput,
) -> Result<TimeEntryRecord, Error> {
    let result = match input.validate() {
        Ok(params) => db.create_time_entry(user_id, &params).await.map_err(Error::from),
        Err(err) => Err(Error::from(err)),
    };
    report(
        notifier,
        result,
        "Time entry created successfully",
        "Failed to create time entry",
    )
}

pub async fn schedule_hearing(
    db: &dyn Database,
    notifier: &dyn Notifier,
    user_id: &str,
    input: HearingInput,
) -> Result<HearingRecord, Error> {
    let result = match input.validate() {
        Ok(params) => db.create_hearing(user_id, &params).await.map_err(Error::from),
        Err(err) => Err(Error::from(err)),
    };
    report(
        notifier,
        result,
        "Hearing scheduled successfully",
        "Failed to create hearing",
    )
}

pub async fn create_client(
    db: &dyn Database,
    notifier: &dyn Notifier,
    user_id: &str,
    input: ClientInput,
) -> Result<ClientRecord, Error> {
    let result = match input.validate() {
        Ok(params) => db.create_client(user_id, &params).await.map_err(Error::from),
        Err(err) => Err(Error::from(err)),
    };
    report(
        notifier,
        result,
        "Client created successfully",
        "Failed to create client",
    )
}
