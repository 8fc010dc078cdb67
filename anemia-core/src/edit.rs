//! Field-by-field mutation of a [`PatientSnapshot`].
//!
//! Callers never write snapshot fields directly while a session is running;
//! they send a [`FieldEdit`] so the snapshot stays normalized: lab values
//! are finite or unset, TSAT follows serum iron and TIBC, and the workup
//! panel obeys its toggle law.

use std::fmt;
use std::str::FromStr;

use crate::{
    error::ParseEditError,
    snapshot::{finite, Cohort, Contraindication, Finding, PatientSnapshot, RoutePreference, Sex},
    tsat::derive_tsat,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabField {
    Hemoglobin,
    Ferritin,
    Tsat,
    SerumIron,
    Tibc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagField {
    ActiveInfection,
    History(Contraindication),
    EsaIntolerance,
    CurrentStrokeOrThrombosis,
    EsaHyporesponsive,
    ElevatedInflammation,
    NoRefrigeration,
}

/// Every editable snapshot field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Cohort,
    Sex,
    RoutePreference,
    Lab(LabField),
    Flag(FlagField),
    AllExcluded,
    Finding(Finding),
}

impl Field {
    pub fn all() -> Vec<Field> {
        let mut fields = vec![
            Field::Cohort,
            Field::Sex,
            Field::RoutePreference,
            Field::Lab(LabField::Hemoglobin),
            Field::Lab(LabField::Ferritin),
            Field::Lab(LabField::Tsat),
            Field::Lab(LabField::SerumIron),
            Field::Lab(LabField::Tibc),
            Field::Flag(FlagField::ActiveInfection),
            Field::AllExcluded,
        ];
        fields.extend(Finding::ALL.into_iter().map(Field::Finding));
        fields.extend(
            Contraindication::ALL
                .into_iter()
                .map(|item| Field::Flag(FlagField::History(item))),
        );
        fields.extend([
            Field::Flag(FlagField::EsaIntolerance),
            Field::Flag(FlagField::CurrentStrokeOrThrombosis),
            Field::Flag(FlagField::EsaHyporesponsive),
            Field::Flag(FlagField::ElevatedInflammation),
            Field::Flag(FlagField::NoRefrigeration),
        ]);
        fields
    }

    pub fn name(&self) -> &'static str {
        match self {
            Field::Cohort => "cohort",
            Field::Sex => "sex",
            Field::RoutePreference => "route_preference",
            Field::Lab(LabField::Hemoglobin) => "hemoglobin",
            Field::Lab(LabField::Ferritin) => "ferritin",
            Field::Lab(LabField::Tsat) => "tsat",
            Field::Lab(LabField::SerumIron) => "serum_iron",
            Field::Lab(LabField::Tibc) => "tibc",
            Field::Flag(FlagField::ActiveInfection) => "active_infection",
            Field::Flag(FlagField::History(item)) => item.id(),
            Field::Flag(FlagField::EsaIntolerance) => "esa_intolerance",
            Field::Flag(FlagField::CurrentStrokeOrThrombosis) => "current_stroke_or_thrombosis",
            Field::Flag(FlagField::EsaHyporesponsive) => "esa_hyporesponsive",
            Field::Flag(FlagField::ElevatedInflammation) => "elevated_inflammation",
            Field::Flag(FlagField::NoRefrigeration) => "no_refrigeration",
            Field::AllExcluded => "all_excluded",
            Field::Finding(finding) => finding.id(),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = ParseEditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Field::all()
            .into_iter()
            .find(|field| field.name() == normalized)
            .ok_or_else(|| ParseEditError::UnknownField(s.to_string()))
    }
}

/// One caller mutation of the snapshot
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEdit {
    Cohort(Option<Cohort>),
    Sex(Option<Sex>),
    RoutePreference(Option<RoutePreference>),
    Lab(LabField, Option<f64>),
    Flag(FlagField, bool),
    AllExcluded(bool),
    Finding(Finding, bool),
}

const UNSET: &str = "unset";

impl FieldEdit {
    /// Build an edit from a field name and its textual value.
    /// `unset` clears any field.
    pub fn parse(field: &str, value: &str) -> Result<Self, ParseEditError> {
        let field: Field = field.parse()?;
        let value = value.trim().to_ascii_lowercase();
        if value == UNSET {
            return Ok(Self::unset(field));
        }

        let invalid = |expected: &'static str| ParseEditError::InvalidValue {
            field: field.name(),
            value: value.clone(),
            expected,
        };

        let edit = match field {
            Field::Cohort => FieldEdit::Cohort(Some(match value.as_str() {
                "hemodialysis" | "hd" => Cohort::Hemodialysis,
                "peritoneal_dialysis" | "pd" => Cohort::PeritonealDialysis,
                "non_dialysis_ckd" | "ckd" | "ndd" => Cohort::NonDialysisCkd,
                _ => return Err(invalid("hemodialysis, peritoneal_dialysis or non_dialysis_ckd")),
            })),
            Field::Sex => FieldEdit::Sex(Some(match value.as_str() {
                "male" | "m" => Sex::Male,
                "female" | "f" => Sex::Female,
                _ => return Err(invalid("male or female")),
            })),
            Field::RoutePreference => FieldEdit::RoutePreference(Some(match value.as_str() {
                "oral" => RoutePreference::Oral,
                "injection" => RoutePreference::Injection,
                _ => return Err(invalid("oral or injection")),
            })),
            Field::Lab(lab) => {
                let number = value
                    .parse::<f64>()
                    .ok()
                    .filter(|n| n.is_finite())
                    .ok_or_else(|| invalid("a finite number"))?;
                FieldEdit::Lab(lab, Some(number))
            }
            Field::Flag(flag) => {
                FieldEdit::Flag(flag, parse_bool(&value).ok_or_else(|| invalid("true or false"))?)
            }
            Field::AllExcluded => {
                FieldEdit::AllExcluded(parse_bool(&value).ok_or_else(|| invalid("true or false"))?)
            }
            Field::Finding(finding) => FieldEdit::Finding(
                finding,
                parse_bool(&value).ok_or_else(|| invalid("true or false"))?,
            ),
        };
        Ok(edit)
    }

    /// Edit that returns `field` to its initial value
    pub fn unset(field: Field) -> Self {
        match field {
            Field::Cohort => FieldEdit::Cohort(None),
            Field::Sex => FieldEdit::Sex(None),
            Field::RoutePreference => FieldEdit::RoutePreference(None),
            Field::Lab(lab) => FieldEdit::Lab(lab, None),
            Field::Flag(flag) => FieldEdit::Flag(flag, false),
            Field::AllExcluded => FieldEdit::AllExcluded(false),
            Field::Finding(finding) => FieldEdit::Finding(finding, false),
        }
    }

    pub fn field(&self) -> Field {
        match self {
            FieldEdit::Cohort(_) => Field::Cohort,
            FieldEdit::Sex(_) => Field::Sex,
            FieldEdit::RoutePreference(_) => Field::RoutePreference,
            FieldEdit::Lab(lab, _) => Field::Lab(*lab),
            FieldEdit::Flag(flag, _) => Field::Flag(*flag),
            FieldEdit::AllExcluded(_) => Field::AllExcluded,
            FieldEdit::Finding(finding, _) => Field::Finding(*finding),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" | "yes" | "y" | "1" | "on" => Some(true),
        "false" | "no" | "n" | "0" | "off" => Some(false),
        _ => None,
    }
}

impl PatientSnapshot {
    /// Apply one edit and restore every snapshot invariant
    pub fn apply(&mut self, edit: FieldEdit) {
        match edit {
            FieldEdit::Cohort(cohort) => self.cohort = cohort,
            FieldEdit::Sex(sex) => self.sex = sex,
            FieldEdit::RoutePreference(route) => self.route_preference = route,
            FieldEdit::Lab(lab, value) => {
                let value = finite(value);
                match lab {
                    LabField::Hemoglobin => self.hemoglobin = value,
                    LabField::Ferritin => self.ferritin = value,
                    LabField::Tsat => self.tsat = value,
                    LabField::SerumIron => self.serum_iron = value,
                    LabField::Tibc => self.tibc = value,
                }
                if matches!(lab, LabField::SerumIron | LabField::Tibc) {
                    if let Some(tsat) = derive_tsat(self.serum_iron, self.tibc) {
                        self.tsat = Some(tsat);
                    }
                }
            }
            FieldEdit::Flag(flag, on) => match flag {
                FlagField::ActiveInfection => self.active_infection = on,
                FlagField::History(item) => *self.history.flag_mut(item) = on,
                FlagField::EsaIntolerance => self.history.esa_intolerance = on,
                FlagField::CurrentStrokeOrThrombosis => {
                    self.history.current_stroke_or_thrombosis = on
                }
                FlagField::EsaHyporesponsive => self.status.esa_hyporesponsive = on,
                FlagField::ElevatedInflammation => self.status.elevated_inflammation = on,
                FlagField::NoRefrigeration => self.no_refrigeration = on,
            },
            FieldEdit::AllExcluded(excluded) => self.workup.set_all_excluded(excluded),
            FieldEdit::Finding(finding, present) => self.workup.set_finding(finding, present),
        }
    }
}
