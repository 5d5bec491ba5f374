use std::borrow::Cow;

use chrono::NaiveDateTime;

use crate::constants::{FIELD_DATE, FIELD_DEATHS, FIELD_DESCRIPTION, FIELD_INJURIES};
use crate::pipeline::processing::dates::{DateResolver, ParsedDate};
use crate::pipeline::processing::extract::RawRow;

/// The fields a row must carry before it may be emitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredFields<'a> {
    pub date: Cow<'a, str>,
    pub deaths: Cow<'a, str>,
    pub injuries: Cow<'a, str>,
    pub description: Cow<'a, str>,
}

/// A row that passed every check, with its resolved date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedRow<'a> {
    pub fields: RequiredFields<'a>,
    pub date: ParsedDate,
}

/// Why a row was kept or left out of the output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowDecision<'a> {
    Accept(AcceptedRow<'a>),
    /// A required field was absent
    Incomplete,
    /// The resolved date fell outside the template's window
    OutsideWindow,
}

impl RowDecision<'_> {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowDecision::Accept(_) => "accept",
            RowDecision::Incomplete => "incomplete",
            RowDecision::OutsideWindow => "outside_window",
        }
    }
}

/// Completeness and date-window checks applied to raw rows
pub struct RecordValidator;

impl RecordValidator {
    /// Borrow the required fields, or `None` if any of them is absent.
    pub fn required_fields(row: &RawRow) -> Option<RequiredFields<'_>> {
        Some(RequiredFields {
            description: row.text(FIELD_DESCRIPTION)?,
            date: row.text(FIELD_DATE)?,
            deaths: row.text(FIELD_DEATHS)?,
            injuries: row.text(FIELD_INJURIES)?,
        })
    }

    pub fn is_complete(row: &RawRow) -> bool {
        Self::required_fields(row).is_some()
    }

    /// Strictly earlier than `boundary`; a row dated exactly on it is outside.
    pub fn is_within_window(date: &ParsedDate, boundary: NaiveDateTime) -> bool {
        date.is_before(boundary)
    }

    /// Check completeness, resolve the date, then apply the optional window
    pub fn assess<'a>(
        row: &'a RawRow,
        dates: &DateResolver,
        window: Option<NaiveDateTime>,
    ) -> RowDecision<'a> {
        let Some(fields) = Self::required_fields(row) else {
            return RowDecision::Incomplete;
        };
        let date = dates.resolve(&fields.date);
        match window {
            Some(boundary) if !Self::is_within_window(&date, boundary) => RowDecision::OutsideWindow,
            _ => RowDecision::Accept(AcceptedRow { fields, date }),
        }
    }
}
