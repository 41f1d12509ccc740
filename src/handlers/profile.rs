use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, warn};

use crate::config::{MAX_BIO_LENGTH, SELLER_SELECT, SELLER_TABLE, SELLER_THERAPIES_TABLE};
use crate::error::HubError;
use crate::middleware::auth::AuthSession;
use crate::router::HubState;
use crate::service::CollectionKind;
use crate::service::registration::{RegistrationWizard, WizardStep};
use crate::supabase::Select;
use crate::types::{AuthUser, Practitioner, ProfileUpdate, SellerRow, SellerTherapyLink};

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: AuthUser,
    /// `None` until the user has completed registration.
    pub practitioner: Option<Practitioner>,
}

#[derive(Debug, Serialize)]
pub struct AvatarResponse {
    pub url: String,
    pub profile_updated: bool,
}

#[derive(Debug, Deserialize)]
pub struct RegistrationRequest {
    pub steps: Vec<WizardStep>,
}

async fn own_listing(
    state: &HubState,
    session: &AuthSession,
) -> Result<Option<Practitioner>, HubError> {
    let query = Select::columns(SELLER_SELECT)
        .eq("useruid", &session.user.id)
        .limit(1);
    let rows: Vec<SellerRow> = state
        .store
        .select(SELLER_TABLE, &query, Some(&session.access_token))
        .await?;
    Ok(rows.into_iter().next().map(Practitioner::from))
}

/// GET /me
pub async fn get_me(
    State(state): State<HubState>,
    session: AuthSession,
) -> Result<Json<MeResponse>, HubError> {
    let practitioner = own_listing(&state, &session).await?;
    Ok(Json(MeResponse {
        user: session.user,
        practitioner,
    }))
}

/// PATCH /me
pub async fn update_me(
    State(state): State<HubState>,
    session: AuthSession,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<Practitioner>, HubError> {
    if update.is_empty() {
        return Err(HubError::Validation("nothing to update".to_string()));
    }
    if update.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(HubError::Validation("name cannot be blank".to_string()));
    }
    if update
        .bio
        .as_deref()
        .is_some_and(|b| b.chars().count() > MAX_BIO_LENGTH)
    {
        return Err(HubError::Validation(format!(
            "bio exceeds {MAX_BIO_LENGTH} characters"
        )));
    }
    if update.price.is_some_and(|p| !p.is_finite() || p < 0.0) {
        return Err(HubError::Validation("price must be zero or more".to_string()));
    }

    let updated = patch_own_row(&state, &session, &update)
        .await?
        .ok_or_else(|| HubError::NotFound("practitioner profile".to_string()))?;
    info!(user_id = %session.user.id, "profile updated");
    state.catalog.refresh(CollectionKind::Practitioners);
    Ok(Json(updated))
}

async fn patch_own_row(
    state: &HubState,
    session: &AuthSession,
    update: &ProfileUpdate,
) -> Result<Option<Practitioner>, HubError> {
    let filter = Select::columns(SELLER_SELECT).eq("useruid", &session.user.id);
    let rows: Vec<SellerRow> = state
        .store
        .update(SELLER_TABLE, &filter, update, Some(&session.access_token))
        .await?;
    Ok(rows.into_iter().next().map(Practitioner::from))
}

/// PUT /me/avatar with the raw image as body.
pub async fn upload_avatar(
    State(state): State<HubState>,
    session: AuthSession,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<AvatarResponse>, HubError> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or(v).trim().to_ascii_lowercase())
        .unwrap_or_default();
    let Some(ext) = image_extension(&content_type) else {
        return Err(HubError::Validation(format!(
            "unsupported content type `{content_type}`"
        )));
    };
    if body.is_empty() {
        return Err(HubError::Validation("image is empty".to_string()));
    }

    let object_path = format!("{}/avatar.{ext}", session.user.id);
    let url = state
        .store
        .upload(
            &state.storage_bucket,
            &object_path,
            body.to_vec(),
            &content_type,
            &session.access_token,
        )
        .await?;

    let update = ProfileUpdate {
        image: Some(url.to_string()),
        ..ProfileUpdate::default()
    };
    let profile_updated = patch_own_row(&state, &session, &update).await?.is_some();
    if profile_updated {
        state.catalog.refresh(CollectionKind::Practitioners);
    } else {
        warn!(user_id = %session.user.id, "avatar stored but no practitioner row to attach it to");
    }

    Ok(Json(AvatarResponse {
        url: url.to_string(),
        profile_updated,
    }))
}

fn image_extension(content_type: &str) -> Option<&str> {
    match content_type.strip_prefix("image/")? {
        "" => None,
        "jpeg" | "pjpeg" => Some("jpg"),
        "svg+xml" => Some("svg"),
        other if other.chars().all(|c| c.is_ascii_alphanumeric()) => Some(other),
        _ => None,
    }
}

/// POST /registration
///
/// Runs the wizard over the submitted steps, then writes the seller row and its
/// therapy links.
pub async fn register(
    State(state): State<HubState>,
    session: AuthSession,
    Json(request): Json<RegistrationRequest>,
) -> Result<(StatusCode, Json<Practitioner>), HubError> {
    let mut wizard = RegistrationWizard::new();
    wizard.apply_all(request.steps)?;
    if let Some(step) = wizard.next_step() {
        return Err(HubError::Validation(format!(
            "registration is incomplete; next step is `{step}`"
        )));
    }
    let registration = wizard.finish(&session.user.id)?;

    // A row without therapies is left over from a failed attempt and gets completed.
    let existing = own_listing(&state, &session).await?;
    if existing.as_ref().is_some_and(|p| !p.specialties.is_empty()) {
        return Err(HubError::Validation("already registered".to_string()));
    }

    let therapies = state.catalog.therapies().await?;
    let names: HashMap<i64, &str> = therapies
        .items
        .iter()
        .map(|t| (t.id, t.name.as_str()))
        .collect();
    // An empty therapy snapshot means the list could not be loaded; let the store decide.
    let unknown = registration
        .therapy_ids
        .iter()
        .find(|id| !names.is_empty() && !names.contains_key(id));
    if let Some(unknown) = unknown {
        return Err(HubError::Validation(format!("unknown therapy id {unknown}")));
    }

    let token = Some(session.access_token.as_str());
    let inserted_row = existing.is_none();
    let rows: Vec<SellerRow> = match existing {
        Some(previous) => {
            info!(seller_id = previous.id, "resuming incomplete registration");
            let filter = Select::columns(SELLER_SELECT).eq("id", previous.id);
            state
                .store
                .update(SELLER_TABLE, &filter, &registration.seller, token)
                .await?
        }
        None => {
            state
                .store
                .insert(SELLER_TABLE, &registration.seller, token)
                .await?
        }
    };
    let row = rows
        .into_iter()
        .next()
        .ok_or_else(|| HubError::EmptyResult(format!("write to {SELLER_TABLE}")))?;

    let links: Vec<SellerTherapyLink> = registration
        .therapy_ids
        .iter()
        .map(|&therapy_id| SellerTherapyLink::new(row.id, therapy_id))
        .collect();
    let linked: Result<Vec<SellerTherapyLink>, HubError> = state
        .store
        .insert(SELLER_THERAPIES_TABLE, &links, token)
        .await;
    if let Err(e) = linked {
        if inserted_row {
            discard_seller_row(&state, row.id, token).await;
        }
        return Err(e);
    }

    let mut practitioner = Practitioner::from(row);
    practitioner.specialties = registration
        .therapy_ids
        .iter()
        .filter_map(|id| names.get(id).map(|n| n.to_string()))
        .collect();

    info!(
        user_id = %session.user.id,
        seller_id = practitioner.id,
        therapies = links.len(),
        "practitioner registered"
    );
    state.catalog.refresh(CollectionKind::Practitioners);
    Ok((StatusCode::CREATED, Json(practitioner)))
}

/// Undo the seller insert of a registration whose therapy links could not be written.
async fn discard_seller_row(state: &HubState, seller_id: i64, token: Option<&str>) {
    let filter = Select::default().eq("id", seller_id);
    match state.store.delete(SELLER_TABLE, &filter, token).await {
        Ok(()) => warn!(seller_id, "therapy links failed; seller row rolled back"),
        Err(e) => warn!(
            seller_id,
            error = %e,
            "therapy links failed and the seller row could not be removed; \
             a retry will complete it"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::image_extension;

    #[test]
    fn maps_image_content_types() {
        assert_eq!(image_extension("image/png"), Some("png"));
        assert_eq!(image_extension("image/jpeg"), Some("jpg"));
        assert_eq!(image_extension("image/svg+xml"), Some("svg"));
        assert_eq!(image_extension("text/plain"), None);
        assert_eq!(image_extension("image/"), None);
        assert_eq!(image_extension("image/../x"), None);
    }
}
