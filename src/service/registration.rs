//! Multi-step practitioner registration.
//!
//! Each step is its own record and is validated when it is applied. Steps are
//! taken in order; an earlier step may be submitted again to amend it, a later
//! one may not be skipped to.

use serde::{Deserialize, Serialize};

use crate::config::MAX_BIO_LENGTH;
use crate::error::HubError;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AccountStep {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProfileStep {
    pub title: String,
    #[serde(default)]
    pub bio: String,
    pub location: String,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PracticeStep {
    pub therapy_ids: Vec<i64>,
    pub price: f64,
    #[serde(default)]
    pub certifications: Vec<String>,
    #[serde(default)]
    pub availability: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum WizardStep {
    Account(AccountStep),
    Profile(ProfileStep),
    Practice(PracticeStep),
}

impl WizardStep {
    fn index(&self) -> usize {
        match self {
            WizardStep::Account(_) => 0,
            WizardStep::Profile(_) => 1,
            WizardStep::Practice(_) => 2,
        }
    }

    fn name(&self) -> &'static str {
        STEP_NAMES[self.index()]
    }
}

const STEP_NAMES: [&str; 3] = ["account", "profile", "practice"];

/// Row inserted into `seller` when the wizard completes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewSeller {
    pub useruid: String,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub title: String,
    pub bio: String,
    pub location: String,
    pub languages: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    pub price: f64,
    pub certifications: Vec<String>,
    pub availability: Vec<String>,
    pub verified: bool,
    pub featured: bool,
}

/// Completed wizard: the seller row plus the therapies to link to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub seller: NewSeller,
    pub therapy_ids: Vec<i64>,
}

#[derive(Debug, Default, Clone)]
pub struct RegistrationWizard {
    account: Option<AccountStep>,
    profile: Option<ProfileStep>,
    practice: Option<PracticeStep>,
}

impl RegistrationWizard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of the first step not yet completed, `None` once all are done.
    pub fn next_step(&self) -> Option<&'static str> {
        STEP_NAMES.get(self.next_index()).copied()
    }

    fn next_index(&self) -> usize {
        [
            self.account.is_some(),
            self.profile.is_some(),
            self.practice.is_some(),
        ]
        .iter()
        .position(|done| !done)
        .unwrap_or(STEP_NAMES.len())
    }

    pub fn apply(&mut self, step: WizardStep) -> Result<(), HubError> {
        let expected = self.next_index();
        if step.index() > expected {
            return Err(HubError::Validation(format!(
                "step `{}` submitted before `{}`",
                step.name(),
                STEP_NAMES[expected]
            )));
        }

        match step {
            WizardStep::Account(account) => {
                validate_account(&account)?;
                self.account = Some(account);
            }
            WizardStep::Profile(profile) => {
                validate_profile(&profile)?;
                self.profile = Some(profile);
            }
            WizardStep::Practice(practice) => {
                validate_practice(&practice)?;
                self.practice = Some(practice);
            }
        }
        Ok(())
    }

    /// Apply every step in order.
    pub fn apply_all(
        &mut self,
        steps: impl IntoIterator<Item = WizardStep>,
    ) -> Result<(), HubError> {
        steps.into_iter().try_for_each(|step| self.apply(step))
    }

    /// Produce the rows for `useruid`. Fails if any step is missing.
    pub fn finish(self, useruid: &str) -> Result<Registration, HubError> {
        let (Some(account), Some(profile), Some(practice)) =
            (self.account, self.profile, self.practice)
        else {
            return Err(HubError::Validation("registration is incomplete".to_string()));
        };

        let mut therapy_ids = practice.therapy_ids;
        therapy_ids.sort_unstable();
        therapy_ids.dedup();

        Ok(Registration {
            seller: NewSeller {
                useruid: useruid.to_string(),
                email: account.email.trim().to_string(),
                name: account.name.trim().to_string(),
                phone: account.phone.filter(|p| !p.trim().is_empty()),
                title: profile.title.trim().to_string(),
                bio: profile.bio.trim().to_string(),
                location: profile.location.trim().to_string(),
                languages: clean_list(profile.languages),
                lat: profile.lat,
                lng: profile.lng,
                price: practice.price,
                certifications: clean_list(practice.certifications),
                availability: clean_list(practice.availability),
                verified: false,
                featured: false,
            },
            therapy_ids,
        })
    }
}

fn validate_account(account: &AccountStep) -> Result<(), HubError> {
    if account.name.trim().is_empty() {
        return Err(HubError::Validation("name is required".to_string()));
    }
    if !is_plausible_email(account.email.trim()) {
        return Err(HubError::Validation("email is not valid".to_string()));
    }
    Ok(())
}

fn validate_profile(profile: &ProfileStep) -> Result<(), HubError> {
    if profile.title.trim().is_empty() {
        return Err(HubError::Validation("title is required".to_string()));
    }
    if profile.location.trim().is_empty() {
        return Err(HubError::Validation("location is required".to_string()));
    }
    if profile.bio.chars().count() > MAX_BIO_LENGTH {
        return Err(HubError::Validation(format!(
            "bio exceeds {MAX_BIO_LENGTH} characters"
        )));
    }
    if profile.lat.is_some() != profile.lng.is_some() {
        return Err(HubError::Validation(
            "lat and lng must be given together".to_string(),
        ));
    }
    if profile.lat.is_some_and(|lat| !(-90.0..=90.0).contains(&lat))
        || profile.lng.is_some_and(|lng| !(-180.0..=180.0).contains(&lng))
    {
        return Err(HubError::Validation("coordinates out of range".to_string()));
    }
    Ok(())
}

fn validate_practice(practice: &PracticeStep) -> Result<(), HubError> {
    if practice.therapy_ids.is_empty() {
        return Err(HubError::Validation(
            "at least one therapy is required".to_string(),
        ));
    }
    if !practice.price.is_finite() || practice.price < 0.0 {
        return Err(HubError::Validation("price must be zero or more".to_string()));
    }
    Ok(())
}

fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace)
}

fn clean_list(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        let value = value.trim();
        if !value.is_empty() && !out.iter().any(|v| v == value) {
            out.push(value.to_string());
        }
    }
    out
}
