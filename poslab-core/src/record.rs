//! The flat per-instrument, per-date output record.

use chrono::NaiveDate;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashSet;

use crate::error::ReportError;
use crate::extract::FieldValues;
use crate::value::Numeric;

const RESERVED: [&str; 2] = ["date", "instrument"];

/// Named numeric-or-null fields for one instrument on one date.
///
/// Field order is the schema's declared order. Serializes as a single flat
/// object: `{"date": "2022-07-01", "instrument": "TX", "<field>": …}`.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedRecord {
    date: NaiveDate,
    instrument: String,
    fields: FieldValues,
}

impl DerivedRecord {
    /// Build a record; a repeated or reserved field name is rejected.
    pub fn new(
        date: NaiveDate,
        instrument: impl Into<String>,
        fields: FieldValues,
    ) -> Result<Self, ReportError> {
        check_unique(&fields)?;
        Ok(Self {
            date,
            instrument: instrument.into(),
            fields,
        })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    pub fn fields(&self) -> &[(String, Numeric)] {
        &self.fields
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn get(&self, name: &str) -> Option<Numeric> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| *v)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn check_unique(fields: &FieldValues) -> Result<(), ReportError> {
    let mut seen: HashSet<&str> = RESERVED.into_iter().collect();
    for (name, _) in fields {
        if !seen.insert(name.as_str()) {
            return Err(ReportError::DuplicateField(name.clone()));
        }
    }
    Ok(())
}

impl Serialize for DerivedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 2))?;
        map.serialize_entry("date", &self.date)?;
        map.serialize_entry("instrument", &self.instrument)?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 7, 1).unwrap()
    }

    #[test]
    fn serializes_flat_in_declared_order() {
        let record = DerivedRecord::new(
            date(),
            "TX",
            vec![
                ("top5_specific_front_month_long_oi".into(), Numeric::Value(40.0)),
                ("top5_specific_front_month_short_oi".into(), Numeric::Missing),
            ],
        )
        .unwrap();
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"date":"2022-07-01","instrument":"TX","top5_specific_front_month_long_oi":40.0,"top5_specific_front_month_short_oi":null}"#
        );
    }

    #[test]
    fn duplicate_and_reserved_names_rejected() {
        let dup = vec![("a".to_string(), Numeric::Value(1.0)), ("a".to_string(), Numeric::Missing)];
        assert_eq!(
            DerivedRecord::new(date(), "TX", dup).unwrap_err(),
            ReportError::DuplicateField("a".into())
        );

        let reserved = vec![("date".to_string(), Numeric::Value(1.0))];
        assert!(DerivedRecord::new(date(), "TX", reserved).is_err());
    }
}
