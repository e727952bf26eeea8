//! Partial-update contract for the profile document.
//!
//! Every field of a `ProfilePatch` is optional and an absent field leaves the
//! stored value untouched. Lists are replaced wholesale when present, never
//! defaulted to empty when absent. `resumeUrl: null` clears the resume.

use std::collections::HashSet;

use serde::{Deserialize, Deserializer};

use crate::errors::AppError;
use crate::models::profile::{
    Education, Experience, PersonalInfoItem, Profile, ProfileEntry, SkillCategory,
};
use crate::profile::personal_info::PersonalDetails;
use crate::profile::require_user_id;
use crate::profile::sections::new_entry_id;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfilePatch {
    pub personal: Option<PersonalDetails>,
    /// `Some(None)` clears the summary.
    pub summary: Option<Option<String>>,
    pub education: Option<Vec<Education>>,
    pub experience: Option<Vec<Experience>>,
    pub skills: Option<Vec<SkillCategory>>,
    pub profile_image: Option<String>,
    /// `Some(None)` clears the resume URL.
    pub resume_url: Option<Option<String>>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.touched().is_empty()
    }

    /// Names of the document slices this patch writes, for logging.
    pub fn touched(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.personal.as_ref().is_some_and(|p| !p.is_empty()) {
            out.push("personalInfo");
        }
        if self.summary.is_some() {
            out.push("about");
        }
        if self.education.is_some() {
            out.push("education");
        }
        if self.experience.is_some() {
            out.push("experience");
        }
        if self.skills.is_some() {
            out.push("skills");
        }
        if self.profile_image.is_some() {
            out.push("profileImage");
        }
        if self.resume_url.is_some() {
            out.push("resumeUrl");
        }
        out
    }

    /// Assigns ids to new entries and rejects malformed lists. Must run
    /// before `apply_to`.
    pub fn normalize(&mut self) -> Result<(), AppError> {
        if let Some(education) = self.education.as_mut() {
            normalize_entries(education, "education")?;
        }
        if let Some(experience) = self.experience.as_mut() {
            normalize_entries(experience, "experience")?;
        }
        if let Some(categories) = self.skills.as_mut() {
            normalize_entries(categories, "skill category")?;
            for category in categories.iter_mut() {
                let mut clean =
                    SkillCategory::new(std::mem::take(&mut category.id), &category.name)?;
                for skill in std::mem::take(&mut category.skills) {
                    let id = if skill.id.trim().is_empty() {
                        new_entry_id()
                    } else {
                        skill.id
                    };
                    clean.add_skill(id, &skill.name)?;
                }
                normalize_entries(&mut clean.skills, "skill")?;
                *category = clean;
            }
        }
        if let Some(Some(url)) = &self.resume_url {
            if url.trim().is_empty() {
                self.resume_url = Some(None);
            }
        }
        Ok(())
    }

    pub fn apply_to(self, profile: &mut Profile) {
        if let Some(personal) = &self.personal {
            personal.apply_to(profile);
        }
        if let Some(summary) = self.summary {
            profile.summary = summary;
        }
        if let Some(education) = self.education {
            profile.education = education;
        }
        if let Some(experience) = self.experience {
            profile.experience = experience;
        }
        if let Some(skills) = self.skills {
            profile.skills = skills;
        }
        if let Some(image) = self.profile_image {
            profile.profile_image = Some(image);
        }
        if let Some(resume_url) = self.resume_url {
            profile.resume_url = resume_url;
        }
    }
}

fn normalize_entries<T: ProfileEntry>(entries: &mut [T], kind: &str) -> Result<(), AppError> {
    let mut seen = HashSet::new();
    for entry in entries.iter_mut() {
        if entry.entry_id().trim().is_empty() {
            entry.set_entry_id(new_entry_id());
        }
        if !seen.insert(entry.entry_id().to_string()) {
            return Err(AppError::Validation(format!(
                "Duplicate {kind} id '{}'",
                entry.entry_id()
            )));
        }
    }
    Ok(())
}

/// Body of `POST /api/save-profile`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveProfileRequest {
    pub user_id: Option<String>,
    pub personal_info: Option<Vec<PersonalInfoItem>>,
    pub about: Option<String>,
    pub education: Option<Vec<Education>>,
    pub experience: Option<Vec<Experience>>,
    pub skills: Option<Vec<SkillCategory>>,
    pub profile_image: Option<String>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub resume_url: Option<Option<String>>,
}

impl SaveProfileRequest {
    pub fn into_patch(self) -> Result<(String, ProfilePatch), AppError> {
        let user_id = require_user_id(self.user_id.as_deref())?;
        let personal = self
            .personal_info
            .as_deref()
            .map(PersonalDetails::from_items)
            .transpose()?;
        let mut patch = ProfilePatch {
            personal,
            summary: self.about.map(|a| {
                let a = a.trim().to_string();
                (!a.is_empty()).then_some(a)
            }),
            education: self.education,
            experience: self.experience,
            skills: self.skills,
            profile_image: self.profile_image,
            resume_url: self.resume_url,
        };
        patch.normalize()?;
        Ok((user_id, patch))
    }
}

/// Distinguishes an explicit `null` (`Some(None)`) from an absent key
/// (`None`, via `#[serde(default)]`).
fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::Skill;
    use serde_json::json;

    fn request(body: serde_json::Value) -> SaveProfileRequest {
        serde_json::from_value(body).unwrap()
    }

    fn stocked_profile() -> Profile {
        let mut p = Profile::new("u1");
        p.full_name = Some("Asha Rao".into());
        p.education = vec![Education {
            id: "ed1".into(),
            institute: "IIT Bombay".into(),
            ..Default::default()
        }];
        p.experience = vec![Experience {
            id: "ex1".into(),
            title: "Engineer".into(),
            ..Default::default()
        }];
        p.skills = vec![SkillCategory {
            id: "c1".into(),
            name: "Languages".into(),
            skills: vec![Skill {
                id: "s1".into(),
                name: "Rust".into(),
            }],
        }];
        p
    }

    #[test]
    fn test_resume_only_save_preserves_sibling_sections() {
        let mut profile = stocked_profile();
        let (user_id, patch) = request(json!({
            "userId": "u1",
            "resumeUrl": "https://blob.test/resumes/u1-1-cv.pdf"
        }))
        .into_patch()
        .unwrap();
        assert_eq!(user_id, "u1");
        assert_eq!(patch.touched(), vec!["resumeUrl"]);

        patch.apply_to(&mut profile);
        assert_eq!(
            profile.resume_url.as_deref(),
            Some("https://blob.test/resumes/u1-1-cv.pdf")
        );
        assert_eq!(profile.education.len(), 1);
        assert_eq!(profile.experience.len(), 1);
        assert_eq!(profile.skills.len(), 1);
        assert_eq!(profile.full_name.as_deref(), Some("Asha Rao"));
    }

    #[test]
    fn test_explicit_null_resume_url_clears() {
        let mut profile = stocked_profile();
        profile.resume_url = Some("https://blob.test/old.pdf".into());
        let (_, patch) = request(json!({ "userId": "u1", "resumeUrl": null }))
            .into_patch()
            .unwrap();
        assert_eq!(patch.resume_url, Some(None));
        patch.apply_to(&mut profile);
        assert_eq!(profile.resume_url, None);
    }

    #[test]
    fn test_absent_resume_url_untouched() {
        let (_, patch) = request(json!({ "userId": "u1", "about": "Hi" }))
            .into_patch()
            .unwrap();
        assert_eq!(patch.resume_url, None);
    }

    #[test]
    fn test_personal_info_without_lists_keeps_lists() {
        let mut profile = stocked_profile();
        let (_, patch) = request(json!({
            "userId": "u1",
            "personalInfo": [{ "label": "City", "value": "Chennai" }],
            "about": "Backend engineer"
        }))
        .into_patch()
        .unwrap();
        patch.apply_to(&mut profile);
        assert_eq!(profile.city.as_deref(), Some("Chennai"));
        assert_eq!(profile.summary.as_deref(), Some("Backend engineer"));
        assert_eq!(profile.experience.len(), 1);
    }

    #[test]
    fn test_empty_list_is_an_explicit_replace() {
        let mut profile = stocked_profile();
        let (_, patch) = request(json!({ "userId": "u1", "education": [] }))
            .into_patch()
            .unwrap();
        patch.apply_to(&mut profile);
        assert!(profile.education.is_empty());
        assert_eq!(profile.experience.len(), 1);
    }

    #[test]
    fn test_missing_user_id_rejected() {
        let err = request(json!({ "about": "x" })).into_patch().unwrap_err();
        assert!(err.to_string().contains("User ID required"));
        let err = request(json!({ "userId": "  " })).into_patch().unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_new_entries_receive_ids() {
        let (_, patch) = request(json!({
            "userId": "u1",
            "experience": [{ "title": "Intern" }, { "id": "", "title": "SDE" }]
        }))
        .into_patch()
        .unwrap();
        let experience = patch.experience.unwrap();
        assert!(!experience[0].id.is_empty());
        assert!(!experience[1].id.is_empty());
        assert_ne!(experience[0].id, experience[1].id);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let err = request(json!({
            "userId": "u1",
            "education": [{ "id": "a" }, { "id": "a" }]
        }))
        .into_patch()
        .unwrap_err();
        assert!(err.to_string().contains("Duplicate education id"));
    }

    #[test]
    fn test_blank_category_name_rejected() {
        let err = request(json!({
            "userId": "u1",
            "skills": [{ "id": "c1", "name": "  ", "skills": [] }]
        }))
        .into_patch()
        .unwrap_err();
        assert!(err.to_string().contains("Category name"));
    }

    #[test]
    fn test_blank_resume_url_treated_as_clear() {
        let (_, patch) = request(json!({ "userId": "u1", "resumeUrl": "" }))
            .into_patch()
            .unwrap();
        assert_eq!(patch.resume_url, Some(None));
    }

    #[test]
    fn test_profile_image_patch_is_partial() {
        let mut profile = stocked_profile();
        let (_, patch) = request(json!({
            "userId": "u1",
            "profileImage": "https://blob.test/profile-images/u1.png"
        }))
        .into_patch()
        .unwrap();
        patch.apply_to(&mut profile);
        assert!(profile.profile_image.is_some());
        assert_eq!(profile.skills.len(), 1);
    }

    #[test]
    fn test_duplicate_skill_names_rejected() {
        let err = request(json!({
            "userId": "u1",
            "skills": [{ "name": "Languages", "skills": [{ "name": "Rust" }, { "name": "RUST" }] }]
        }))
        .into_patch()
        .unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_empty_request_is_empty_patch() {
        let (_, patch) = request(json!({ "userId": "u1" })).into_patch().unwrap();
        assert!(patch.is_empty());
    }
}
