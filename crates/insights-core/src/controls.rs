//! Dashboard input controls.
//!
//! Controls are described to the frontend as [`ControlDef`]s and report
//! changes back as a [`ControlId`] plus a [`ControlValue`]. Applying a change
//! only touches the [`FilterState`]; everything derived from it is
//! recomputed on the next render.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::filter::{Cascade, FilterState};
use crate::load::DatasetFormat;
use crate::preprocess::DateBounds;
use crate::record::Dimension;

/// Identifies one control on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlId {
    Upload,
    StartDate,
    EndDate,
    Regions,
    States,
    Cities,
}

impl ControlId {
    /// The dimension a multi-select control filters on.
    pub fn dimension(self) -> Option<Dimension> {
        match self {
            ControlId::Regions => Some(Dimension::Region),
            ControlId::States => Some(Dimension::State),
            ControlId::Cities => Some(Dimension::City),
            _ => None,
        }
    }
}

/// Control definition sent to the frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlDef {
    /// Dataset file picker.
    FileUpload {
        id: ControlId,
        label: String,
        /// Accepted file extensions, without the dot.
        accept: Vec<String>,
        /// Name of the currently loaded upload, if any.
        file_name: Option<String>,
    },
    /// Single date input.
    DatePicker {
        id: ControlId,
        label: String,
        value: NaiveDate,
        min: Option<NaiveDate>,
        max: Option<NaiveDate>,
    },
    /// Multi-valued selection; nothing selected means no restriction.
    MultiSelect {
        id: ControlId,
        label: String,
        options: Vec<String>,
        selected: Vec<String>,
    },
}

impl ControlDef {
    pub fn id(&self) -> ControlId {
        match self {
            ControlDef::FileUpload { id, .. } => *id,
            ControlDef::DatePicker { id, .. } => *id,
            ControlDef::MultiSelect { id, .. } => *id,
        }
    }
}

/// New value reported by a control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ControlValue {
    /// Date picker value.
    Date(NaiveDate),
    /// Multi-select value.
    Selection(Vec<String>),
}

impl ControlValue {
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            ControlValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_selection(&self) -> Option<&[String]> {
        match self {
            ControlValue::Selection(values) => Some(values),
            _ => None,
        }
    }
}

/// Apply a control change to the filter state.
pub fn apply_control(filter: &mut FilterState, id: ControlId, value: &ControlValue) -> Result<()> {
    let mismatch = || Error::InvalidControl(format!("{id:?} does not accept {value:?}"));

    match id {
        ControlId::StartDate => filter.start = value.as_date().ok_or_else(mismatch)?,
        ControlId::EndDate => filter.end = value.as_date().ok_or_else(mismatch)?,
        ControlId::Regions | ControlId::States | ControlId::Cities => {
            let selected: BTreeSet<String> =
                value.as_selection().ok_or_else(mismatch)?.iter().cloned().collect();
            match id {
                ControlId::Regions => filter.regions = selected,
                ControlId::States => filter.states = selected,
                _ => filter.cities = selected,
            }
        }
        ControlId::Upload => {
            return Err(Error::InvalidControl(
                "uploads are sent as file contents, not control values".to_string(),
            ));
        }
    }
    Ok(())
}

/// Collects control definitions in display order.
#[derive(Debug, Default)]
pub struct ControlPanel {
    controls: Vec<ControlDef>,
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_upload(&mut self, label: &str, file_name: Option<&str>) {
        self.controls.push(ControlDef::FileUpload {
            id: ControlId::Upload,
            label: label.to_string(),
            accept: DatasetFormat::EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            file_name: file_name.map(str::to_string),
        });
    }

    /// Register a date picker.
    pub fn register_date(&mut self, id: ControlId, label: &str, value: NaiveDate, bounds: Option<DateBounds>) {
        self.controls.push(ControlDef::DatePicker {
            id,
            label: label.to_string(),
            value,
            min: bounds.map(|b| b.min),
            max: bounds.map(|b| b.max),
        });
    }

    /// Register a multi-select.
    pub fn register_multi_select(
        &mut self,
        id: ControlId,
        label: &str,
        options: &[String],
        selected: &BTreeSet<String>,
    ) {
        self.controls.push(ControlDef::MultiSelect {
            id,
            label: label.to_string(),
            options: options.to_vec(),
            selected: selected.iter().cloned().collect(),
        });
    }

    pub fn take_controls(&mut self) -> Vec<ControlDef> {
        std::mem::take(&mut self.controls)
    }
}

/// Build the dashboard's controls from the current state.
pub fn build_controls(
    upload_name: Option<&str>,
    bounds: Option<DateBounds>,
    filter: &FilterState,
    cascade: &Cascade<'_>,
) -> Vec<ControlDef> {
    let mut panel = ControlPanel::new();
    panel.register_upload("Upload a Dataset (CSV, Excel)", upload_name);
    panel.register_date(ControlId::StartDate, "Select Start Date", filter.start, bounds);
    panel.register_date(ControlId::EndDate, "Select End Date", filter.end, bounds);
    panel.register_multi_select(
        ControlId::Regions,
        "Choose Regions",
        &cascade.region_options,
        &filter.regions,
    );
    panel.register_multi_select(
        ControlId::States,
        "Choose States",
        &cascade.state_options,
        &filter.states,
    );
    panel.register_multi_select(
        ControlId::Cities,
        "Choose Cities",
        &cascade.city_options,
        &filter.cities,
    );
    panel.take_controls()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::cascade;
    use crate::record::RecordTable;
    use crate::record::test_support::record;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_apply_dates_and_selection() {
        let mut state = FilterState::with_range(date("2023-01-01"), date("2023-12-31"));
        apply_control(&mut state, ControlId::StartDate, &ControlValue::Date(date("2023-06-01"))).unwrap();
        apply_control(
            &mut state,
            ControlId::Cities,
            &ControlValue::Selection(vec!["Austin".to_string(), "Austin".to_string()]),
        )
        .unwrap();
        assert_eq!(state.start, date("2023-06-01"));
        assert_eq!(state.cities.len(), 1);
    }

    #[test]
    fn test_mismatched_value_is_rejected() {
        let mut state = FilterState::with_range(date("2023-01-01"), date("2023-12-31"));
        let before = state.clone();
        let err = apply_control(&mut state, ControlId::EndDate, &ControlValue::Selection(vec![]));
        assert!(matches!(err, Err(Error::InvalidControl(_))));
        assert_eq!(state, before);
    }

    #[test]
    fn test_value_deserializes_untagged() {
        let v: ControlValue = serde_json::from_str("\"2023-01-05\"").unwrap();
        assert_eq!(v, ControlValue::Date(date("2023-01-05")));
        let v: ControlValue = serde_json::from_str("[\"East\"]").unwrap();
        assert_eq!(v.as_selection(), Some(&["East".to_string()][..]));
    }

    #[test]
    fn test_panel_records_registered_values() {
        let bounds = DateBounds {
            min: date("2023-01-05"),
            max: date("2023-11-30"),
        };
        let mut panel = ControlPanel::new();
        panel.register_date(ControlId::StartDate, "Select Start Date", date("2023-02-01"), Some(bounds));
        let selected: BTreeSet<String> = ["West".to_string(), "East".to_string()].into();
        panel.register_multi_select(ControlId::Regions, "Select Region", &[], &selected);

        let controls = panel.take_controls();
        assert_eq!(controls.len(), 2);
        match &controls[0] {
            ControlDef::DatePicker { value, min, max, .. } => {
                assert_eq!(*value, date("2023-02-01"));
                assert_eq!(*min, Some(bounds.min));
                assert_eq!(*max, Some(bounds.max));
            }
            other => panic!("expected date picker, got {other:?}"),
        }
        match &controls[1] {
            ControlDef::MultiSelect { selected, .. } => {
                assert_eq!(selected, &vec!["East".to_string(), "West".to_string()]);
            }
            other => panic!("expected multi-select, got {other:?}"),
        }
        assert!(panel.take_controls().is_empty());
    }

    #[test]
    fn test_build_controls_order() {
        let table = RecordTable::from_records(vec![record("2023-01-05", "East", "Tech", 1.0)]);
        let state = FilterState::with_range(date("2023-01-01"), date("2023-12-31"));
        let c = cascade(&table, &state);
        let controls = build_controls(None, None, &state, &c);
        let ids: Vec<ControlId> = controls.iter().map(|c| c.id()).collect();
        assert_eq!(
            ids,
            vec![
                ControlId::Upload,
                ControlId::StartDate,
                ControlId::EndDate,
                ControlId::Regions,
                ControlId::States,
                ControlId::Cities
            ]
        );
        match &controls[3] {
            ControlDef::MultiSelect { options, selected, .. } => {
                assert_eq!(options, &vec!["East".to_string()]);
                assert!(selected.is_empty());
            }
            other => panic!("expected multi-select, got {other:?}"),
        }
    }
}
