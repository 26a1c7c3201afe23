//! Contact routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    extractors::{ApiJson, ApiPath, ApiQuery, ValidatedJson, double_option},
};
use dealdesk_core::crm::require_text;
use dealdesk_db::{
    ContactFilter, ContactRepository, CreateContactInput, UpdateContactInput, entities::contacts,
};
use dealdesk_shared::types::{PageRequest, PageResponse};

/// Creates the contact routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/contacts", get(list_contacts).post(create_contact))
        .route(
            "/contacts/{id}",
            get(get_contact).patch(update_contact).delete(delete_contact),
        )
}

/// Query parameters for listing contacts.
#[derive(Debug, Deserialize)]
pub struct ListContactsQuery {
    /// Only contacts of this organization.
    pub organization_id: Option<Uuid>,
}

/// Request body for creating a contact.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateContactRequest {
    /// Employer.
    pub organization_id: Option<Uuid>,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Email address.
    #[validate(email(message = "must be a valid email"))]
    pub email: Option<String>,
    /// Phone number.
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    /// Job title.
    pub job_title: Option<String>,
}

/// Request body for updating a contact.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateContactRequest {
    /// Employer, `null` detaches.
    #[serde(default, deserialize_with = "double_option")]
    pub organization_id: Option<Option<Uuid>>,
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
    /// Email address.
    #[serde(default, deserialize_with = "double_option")]
    pub email: Option<Option<String>>,
    /// Phone number.
    #[serde(default, deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
    /// Job title.
    #[serde(default, deserialize_with = "double_option")]
    pub job_title: Option<Option<String>>,
}

async fn list_contacts(
    State(state): State<AppState>,
    ApiQuery(page): ApiQuery<PageRequest>,
    ApiQuery(query): ApiQuery<ListContactsQuery>,
) -> ApiResult<Json<PageResponse<contacts::Model>>> {
    let filter = ContactFilter {
        organization_id: query.organization_id,
    };

    let repo = ContactRepository::new((*state.db).clone());
    let (items, total) = repo.list(filter, &page).await?;
    Ok(Json(PageResponse::new(items, &page, total)))
}

async fn get_contact(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<contacts::Model>> {
    let repo = ContactRepository::new((*state.db).clone());
    repo.find_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Contact"))
}

async fn create_contact(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateContactRequest>,
) -> ApiResult<(StatusCode, Json<contacts::Model>)> {
    let input = CreateContactInput {
        organization_id: payload.organization_id,
        first_name: require_text("first_name", &payload.first_name)?,
        last_name: require_text("last_name", &payload.last_name)?,
        email: payload.email.map(|e| e.trim().to_lowercase()),
        phone: payload.phone,
        job_title: payload.job_title,
    };

    let repo = ContactRepository::new((*state.db).clone());
    let contact = repo.create(input).await?;

    info!(contact_id = %contact.id, "Contact created");
    Ok((StatusCode::CREATED, Json(contact)))
}

async fn update_contact(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateContactRequest>,
) -> ApiResult<Json<contacts::Model>> {
    let input = UpdateContactInput {
        organization_id: payload.organization_id,
        first_name: payload
            .first_name
            .as_deref()
            .map(|v| require_text("first_name", v))
            .transpose()?,
        last_name: payload
            .last_name
            .as_deref()
            .map(|v| require_text("last_name", v))
            .transpose()?,
        email: payload
            .email
            .map(|email| email.map(|e| e.trim().to_lowercase())),
        phone: payload.phone,
        job_title: payload.job_title,
    };

    let repo = ContactRepository::new((*state.db).clone());
    let contact = repo
        .update(id, input)
        .await?
        .ok_or_else(|| ApiError::not_found("Contact"))?;

    info!(contact_id = %id, "Contact updated");
    Ok(Json(contact))
}

async fn delete_contact(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Value>> {
    let repo = ContactRepository::new((*state.db).clone());
    if !repo.delete(id).await? {
        return Err(ApiError::not_found("Contact"));
    }

    info!(contact_id = %id, "Contact deleted");
    Ok(Json(json!({ "success": true })))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{
        bearer, count_row, empty_request, empty_state, json_body, json_request, send, state_with,
        ts,
    };
    use axum::http::StatusCode;
    use dealdesk_db::entities::contacts;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_list_filters_by_organization() {
        let org_id = Uuid::new_v4();
        let contact = contacts::Model {
            id: Uuid::new_v4(),
            organization_id: Some(org_id),
            first_name: "Rita".to_string(),
            last_name: "Okafor".to_string(),
            email: Some("rita@acme.example".to_string()),
            phone: None,
            job_title: Some("Head of Partnerships".to_string()),
            created_at: ts(),
            updated_at: ts(),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[count_row(1)]])
            .append_query_results([[contact]]);
        let state = state_with(db);
        let auth = bearer(&state, "rep@dealdesk.io");

        let response = send(
            state,
            empty_request(
                "GET",
                &format!("/api/v1/contacts?organization_id={org_id}&per_page=5"),
                &auth,
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["data"][0]["organization_id"], org_id.to_string());
        assert_eq!(body["meta"]["per_page"], 5);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_email() {
        let state = empty_state();
        let auth = bearer(&state, "rep@dealdesk.io");
        let body = json!({ "first_name": "Rita", "last_name": "Okafor", "email": "rita" });

        let response = send(state, json_request("POST", "/api/v1/contacts", &auth, &body)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_blank_last_name_rejected() {
        let state = empty_state();
        let auth = bearer(&state, "rep@dealdesk.io");

        let response = send(
            state,
            json_request(
                "PATCH",
                &format!("/api/v1/contacts/{}", Uuid::new_v4()),
                &auth,
                &json!({ "last_name": "" }),
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "last_name is required");
    }
}
