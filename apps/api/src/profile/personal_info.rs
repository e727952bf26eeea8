//! Personal-info section: the profile editor exchanges identity and career
//! fields as a labelled list (`[{ label: "Full Name", value: "..." }, ...]`).
//! This module maps that list onto the typed `Profile` and back.

use chrono::NaiveDate;

use crate::errors::AppError;
use crate::models::profile::{parse_birth_date, PersonalInfoItem, Profile};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonalField {
    FullName,
    Gender,
    DateOfBirth,
    Phone,
    Email,
    Address,
    PermanentAddress,
    City,
    State,
    Country,
    ZipCode,
    JobTitle,
    Department,
    Company,
}

impl PersonalField {
    /// Canonical display order of the editor.
    pub const ALL: [PersonalField; 14] = [
        PersonalField::FullName,
        PersonalField::Gender,
        PersonalField::DateOfBirth,
        PersonalField::Phone,
        PersonalField::Email,
        PersonalField::Address,
        PersonalField::PermanentAddress,
        PersonalField::City,
        PersonalField::State,
        PersonalField::Country,
        PersonalField::ZipCode,
        PersonalField::JobTitle,
        PersonalField::Department,
        PersonalField::Company,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PersonalField::FullName => "Full Name",
            PersonalField::Gender => "Gender",
            PersonalField::DateOfBirth => "Date of Birth",
            PersonalField::Phone => "Phone",
            PersonalField::Email => "Email",
            PersonalField::Address => "Address",
            PersonalField::PermanentAddress => "Permanent Address",
            PersonalField::City => "City",
            PersonalField::State => "State",
            PersonalField::Country => "Country",
            PersonalField::ZipCode => "ZIP Code",
            PersonalField::JobTitle => "Job Title",
            PersonalField::Department => "Department",
            PersonalField::Company => "Company",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.into_iter().find(|f| f.label() == label)
    }

    pub fn is_required(self) -> bool {
        matches!(self, PersonalField::FullName | PersonalField::Email)
    }

    fn read(self, profile: &Profile) -> String {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        match self {
            PersonalField::FullName => text(&profile.full_name),
            PersonalField::Gender => text(&profile.gender),
            PersonalField::DateOfBirth => profile
                .date_of_birth
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            PersonalField::Phone => text(&profile.phone),
            PersonalField::Email => text(&profile.email),
            PersonalField::Address => text(&profile.address.current),
            PersonalField::PermanentAddress => text(&profile.address.permanent),
            PersonalField::City => text(&profile.city),
            PersonalField::State => text(&profile.state),
            PersonalField::Country => text(&profile.country),
            PersonalField::ZipCode => text(&profile.zip_code),
            PersonalField::JobTitle => text(&profile.job_title),
            PersonalField::Department => text(&profile.department),
            PersonalField::Company => text(&profile.company),
        }
    }

    fn slot(self, profile: &mut Profile) -> Option<&mut Option<String>> {
        let slot = match self {
            PersonalField::FullName => &mut profile.full_name,
            PersonalField::Gender => &mut profile.gender,
            PersonalField::Phone => &mut profile.phone,
            PersonalField::Email => &mut profile.email,
            PersonalField::Address => &mut profile.address.current,
            PersonalField::PermanentAddress => &mut profile.address.permanent,
            PersonalField::City => &mut profile.city,
            PersonalField::State => &mut profile.state,
            PersonalField::Country => &mut profile.country,
            PersonalField::ZipCode => &mut profile.zip_code,
            PersonalField::JobTitle => &mut profile.job_title,
            PersonalField::Department => &mut profile.department,
            PersonalField::Company => &mut profile.company,
            PersonalField::DateOfBirth => return None,
        };
        Some(slot)
    }
}

/// Parsed personal-info values. Only labels that were present in the
/// submitted list are recorded; `None` inside means "clear this field".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonalDetails {
    text: Vec<(PersonalField, Option<String>)>,
    date_of_birth: Option<Option<NaiveDate>>,
}

impl PersonalDetails {
    /// Unknown labels are ignored. Later duplicates of a label win.
    pub fn from_items(items: &[PersonalInfoItem]) -> Result<Self, AppError> {
        let mut details = PersonalDetails::default();
        for item in items {
            let Some(field) = PersonalField::from_label(&item.label) else {
                tracing::debug!("Ignoring unknown personal info label '{}'", item.label);
                continue;
            };
            let value = item.value.trim();
            if field == PersonalField::DateOfBirth {
                details.date_of_birth = Some(if value.is_empty() {
                    None
                } else {
                    Some(parse_birth_date(value)?)
                });
                continue;
            }
            if field == PersonalField::Email && !value.is_empty() && !looks_like_email(value) {
                return Err(AppError::Validation(format!("Invalid email address '{value}'")));
            }
            let value = (!value.is_empty()).then(|| value.to_string());
            details.text.retain(|(f, _)| *f != field);
            details.text.push((field, value));
        }
        Ok(details)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.date_of_birth.is_none()
    }

    /// Fails when a required field is missing or blank. Used by the
    /// personal-info section, which always submits the full form.
    pub fn require_mandatory(&self) -> Result<(), AppError> {
        for field in PersonalField::ALL.into_iter().filter(|f| f.is_required()) {
            let filled = self
                .text
                .iter()
                .any(|(f, v)| *f == field && v.is_some());
            if !filled {
                return Err(AppError::Validation(format!("{} is required", field.label())));
            }
        }
        Ok(())
    }

    pub fn apply_to(&self, profile: &mut Profile) {
        for (field, value) in &self.text {
            if let Some(slot) = field.slot(profile) {
                *slot = value.clone();
            }
        }
        if let Some(dob) = self.date_of_birth {
            profile.date_of_birth = dob;
        }
    }
}

/// Renders the profile as the editor's full labelled list.
pub fn to_items(profile: &Profile) -> Vec<PersonalInfoItem> {
    PersonalField::ALL
        .into_iter()
        .map(|field| PersonalInfoItem::new(field.label(), field.read(profile)))
        .collect()
}

fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && domain.contains('.')
                && !value.contains(char::is_whitespace)
        }
        None => false,
    }
}
