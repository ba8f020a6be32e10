//! Person record handlers: core data, addresses, emergency contacts,
//! restrictions and the health record.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use common::{AppError, AppResult, Paginated};
use domain::person::{
    Address, AddressData, AddressKind, BloodType, EmergencyContact, Gender, HealthRecord,
    HealthRecordData, NewPerson, Person, PersonRestriction, PersonUpdate, RestrictionKind,
};
use domain::{PERM_HEALTH_MANAGE, PERM_PERSONS_MANAGE};
use person_service_lib::{NewEmergencyContact, NewRestriction};

use super::PageQuery;
use crate::extractors::ValidatedJson;
use crate::middleware::{require_permission, CurrentUser};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePersonRequest {
    /// Login account linked to this person
    pub user_id: Option<Uuid>,
    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    #[schema(example = "Ada")]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    #[schema(example = "Lovelace")]
    pub last_name: String,
    #[validate(length(min = 5, max = 20, message = "National ID must be 5 to 20 characters"))]
    pub national_id: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePersonRequest {
    #[validate(length(min = 1, max = 100, message = "First name cannot be empty"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Last name cannot be empty"))]
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddressRequest {
    pub kind: AddressKind,
    #[validate(length(min = 1, max = 200, message = "Address line is required"))]
    pub line1: String,
    pub line2: Option<String>,
    #[validate(length(min = 1, max = 100, message = "City is required"))]
    pub city: String,
    pub state: Option<String>,
    #[validate(length(min = 1, max = 20, message = "Postal code is required"))]
    pub postal_code: String,
    #[validate(length(min = 2, max = 100, message = "Country is required"))]
    pub country: String,
    #[serde(default)]
    pub is_primary: bool,
}

impl From<AddressRequest> for AddressData {
    fn from(req: AddressRequest) -> Self {
        Self {
            kind: req.kind,
            line1: req.line1,
            line2: req.line2,
            city: req.city,
            state: req.state,
            postal_code: req.postal_code,
            country: req.country,
            is_primary: req.is_primary,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct EmergencyContactRequest {
    #[validate(length(min = 1, max = 200, message = "Contact name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 50, message = "Relationship is required"))]
    #[schema(example = "parent")]
    pub relationship: String,
    #[validate(length(min = 5, max = 30, message = "Phone must be 5 to 30 characters"))]
    pub phone: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RestrictionRequest {
    pub kind: RestrictionKind,
    #[validate(length(min = 1, max = 500, message = "Reason is required"))]
    pub reason: String,
    /// Defaults to now
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LiftRestrictionRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct HealthRecordRequest {
    pub blood_type: Option<BloodType>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub chronic_conditions: Vec<String>,
    #[serde(default)]
    pub medications: Vec<String>,
    #[validate(length(max = 2000, message = "Notes must be at most 2000 characters"))]
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PersonSearchQuery {
    /// Matches first name, last name, national ID or email
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct RestrictionQuery {
    /// Only restrictions in force right now
    #[serde(default)]
    pub active_only: bool,
}

pub fn person_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_persons).post(create_person))
        .route(
            "/:id",
            get(get_person).put(update_person).delete(delete_person),
        )
        .route("/:id/restore", post(restore_person))
        .route("/:id/addresses", get(list_addresses).post(add_address))
        .route(
            "/:id/addresses/:address_id",
            put(update_address).delete(remove_address),
        )
        .route("/:id/contacts", get(list_contacts).post(add_contact))
        .route("/:id/contacts/:contact_id", delete(remove_contact))
        .route(
            "/:id/restrictions",
            get(list_restrictions).post(add_restriction),
        )
        .route(
            "/:id/restrictions/:restriction_id/lift",
            post(lift_restriction),
        )
        .route("/:id/health", get(get_health_record).put(upsert_health_record))
}

#[utoipa::path(
    get,
    path = "/api/person/persons",
    tag = "Persons",
    security(("bearer_auth" = [])),
    params(PageQuery, PersonSearchQuery),
    responses(
        (status = 200, description = "Paginated persons"),
        (status = 403, description = "Requires persons.manage")
    )
)]
pub async fn list_persons(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
    Query(query): Query<PersonSearchQuery>,
) -> AppResult<Json<Paginated<Person>>> {
    require_permission(&current_user, PERM_PERSONS_MANAGE)?;
    let params = page.into();
    let persons = state.persons.persons.list_persons(params, query.search).await?;
    Ok(Json(Paginated::from_page(persons, params)))
}

#[utoipa::path(
    post,
    path = "/api/person/persons",
    tag = "Persons",
    security(("bearer_auth" = [])),
    request_body = CreatePersonRequest,
    responses(
        (status = 201, description = "Person created", body = Person),
        (status = 409, description = "National ID already registered")
    )
)]
pub async fn create_person(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreatePersonRequest>,
) -> AppResult<(StatusCode, Json<Person>)> {
    require_permission(&current_user, PERM_PERSONS_MANAGE)?;
    let person = state
        .persons
        .persons
        .create_person(NewPerson {
            user_id: payload.user_id,
            first_name: payload.first_name,
            last_name: payload.last_name,
            national_id: payload.national_id,
            date_of_birth: payload.date_of_birth,
            gender: payload.gender,
            email: payload.email,
            phone: payload.phone,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(person)))
}

/// Get a person. Users linked to the record may read it without `persons.manage`.
#[utoipa::path(
    get,
    path = "/api/person/persons/{id}",
    tag = "Persons",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Person ID")),
    responses(
        (status = 200, description = "Person", body = Person),
        (status = 404, description = "Person not found")
    )
)]
pub async fn get_person(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Person>> {
    let person = state.persons.persons.get_person(id).await?;
    if person.user_id != Some(current_user.id) && !current_user.has_permission(PERM_PERSONS_MANAGE)
    {
        return Err(AppError::Forbidden);
    }
    Ok(Json(person))
}

#[utoipa::path(
    put,
    path = "/api/person/persons/{id}",
    tag = "Persons",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Person ID")),
    request_body = UpdatePersonRequest,
    responses((status = 200, description = "Person updated", body = Person))
)]
pub async fn update_person(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdatePersonRequest>,
) -> AppResult<Json<Person>> {
    require_permission(&current_user, PERM_PERSONS_MANAGE)?;
    let update = PersonUpdate {
        first_name: payload.first_name,
        last_name: payload.last_name,
        date_of_birth: payload.date_of_birth,
        gender: payload.gender,
        email: payload.email,
        phone: payload.phone,
        user_id: payload.user_id,
    };
    Ok(Json(state.persons.persons.update_person(id, update).await?))
}

#[utoipa::path(
    delete,
    path = "/api/person/persons/{id}",
    tag = "Persons",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Person ID")),
    responses((status = 204, description = "Person soft-deleted"))
)]
pub async fn delete_person(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    require_permission(&current_user, PERM_PERSONS_MANAGE)?;
    state.persons.persons.delete_person(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/person/persons/{id}/restore",
    tag = "Persons",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Person ID")),
    responses((status = 200, description = "Person restored", body = Person))
)]
pub async fn restore_person(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Person>> {
    require_permission(&current_user, PERM_PERSONS_MANAGE)?;
    Ok(Json(state.persons.persons.restore_person(id).await?))
}

#[utoipa::path(
    get,
    path = "/api/person/persons/{id}/addresses",
    tag = "Persons",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Person ID")),
    responses((status = 200, description = "Addresses, primary first", body = [Address]))
)]
pub async fn list_addresses(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<Address>>> {
    require_permission(&current_user, PERM_PERSONS_MANAGE)?;
    Ok(Json(state.persons.persons.list_addresses(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/person/persons/{id}/addresses",
    tag = "Persons",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Person ID")),
    request_body = AddressRequest,
    responses((status = 201, description = "Address added", body = Address))
)]
pub async fn add_address(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<AddressRequest>,
) -> AppResult<(StatusCode, Json<Address>)> {
    require_permission(&current_user, PERM_PERSONS_MANAGE)?;
    let address = state.persons.persons.add_address(id, payload.into()).await?;
    Ok((StatusCode::CREATED, Json(address)))
}

#[utoipa::path(
    put,
    path = "/api/person/persons/{id}/addresses/{address_id}",
    tag = "Persons",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Person ID"),
        ("address_id" = Uuid, Path, description = "Address ID")
    ),
    request_body = AddressRequest,
    responses((status = 200, description = "Address replaced", body = Address))
)]
pub async fn update_address(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path((id, address_id)): Path<(Uuid, Uuid)>,
    ValidatedJson(payload): ValidatedJson<AddressRequest>,
) -> AppResult<Json<Address>> {
    require_permission(&current_user, PERM_PERSONS_MANAGE)?;
    let address = state
        .persons
        .persons
        .update_address(id, address_id, payload.into())
        .await?;
    Ok(Json(address))
}

#[utoipa::path(
    delete,
    path = "/api/person/persons/{id}/addresses/{address_id}",
    tag = "Persons",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Person ID"),
        ("address_id" = Uuid, Path, description = "Address ID")
    ),
    responses((status = 204, description = "Address removed"))
)]
pub async fn remove_address(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path((id, address_id)): Path<(Uuid, Uuid)>,
) -> AppResult<StatusCode> {
    require_permission(&current_user, PERM_PERSONS_MANAGE)?;
    state.persons.persons.remove_address(id, address_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/person/persons/{id}/contacts",
    tag = "Persons",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Person ID")),
    responses((status = 200, description = "Emergency contacts", body = [EmergencyContact]))
)]
pub async fn list_contacts(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<EmergencyContact>>> {
    require_permission(&current_user, PERM_PERSONS_MANAGE)?;
    Ok(Json(state.persons.persons.list_contacts(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/person/persons/{id}/contacts",
    tag = "Persons",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Person ID")),
    request_body = EmergencyContactRequest,
    responses((status = 201, description = "Contact added", body = EmergencyContact))
)]
pub async fn add_contact(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<EmergencyContactRequest>,
) -> AppResult<(StatusCode, Json<EmergencyContact>)> {
    require_permission(&current_user, PERM_PERSONS_MANAGE)?;
    let contact = state
        .persons
        .persons
        .add_contact(
            id,
            NewEmergencyContact {
                name: payload.name,
                relationship: payload.relationship,
                phone: payload.phone,
                email: payload.email,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(contact)))
}

#[utoipa::path(
    delete,
    path = "/api/person/persons/{id}/contacts/{contact_id}",
    tag = "Persons",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Person ID"),
        ("contact_id" = Uuid, Path, description = "Contact ID")
    ),
    responses((status = 204, description = "Contact removed"))
)]
pub async fn remove_contact(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path((id, contact_id)): Path<(Uuid, Uuid)>,
) -> AppResult<StatusCode> {
    require_permission(&current_user, PERM_PERSONS_MANAGE)?;
    state.persons.persons.remove_contact(id, contact_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/person/persons/{id}/restrictions",
    tag = "Persons",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Person ID"), RestrictionQuery),
    responses((status = 200, description = "Restrictions", body = [PersonRestriction]))
)]
pub async fn list_restrictions(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<RestrictionQuery>,
) -> AppResult<Json<Vec<PersonRestriction>>> {
    require_permission(&current_user, PERM_PERSONS_MANAGE)?;
    let restrictions = state
        .persons
        .persons
        .list_restrictions(id, query.active_only)
        .await?;
    Ok(Json(restrictions))
}

#[utoipa::path(
    post,
    path = "/api/person/persons/{id}/restrictions",
    tag = "Persons",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Person ID")),
    request_body = RestrictionRequest,
    responses(
        (status = 201, description = "Restriction placed", body = PersonRestriction),
        (status = 400, description = "End precedes start")
    )
)]
pub async fn add_restriction(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<RestrictionRequest>,
) -> AppResult<(StatusCode, Json<PersonRestriction>)> {
    require_permission(&current_user, PERM_PERSONS_MANAGE)?;
    let restriction = state
        .persons
        .persons
        .add_restriction(
            id,
            NewRestriction {
                kind: payload.kind,
                reason: payload.reason,
                starts_at: payload.starts_at,
                ends_at: payload.ends_at,
            },
            Some(current_user.id),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(restriction)))
}

#[utoipa::path(
    post,
    path = "/api/person/persons/{id}/restrictions/{restriction_id}/lift",
    tag = "Persons",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Person ID"),
        ("restriction_id" = Uuid, Path, description = "Restriction ID")
    ),
    request_body = LiftRestrictionRequest,
    responses(
        (status = 200, description = "Restriction lifted", body = PersonRestriction),
        (status = 400, description = "Already lifted")
    )
)]
pub async fn lift_restriction(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path((id, restriction_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<LiftRestrictionRequest>,
) -> AppResult<Json<PersonRestriction>> {
    require_permission(&current_user, PERM_PERSONS_MANAGE)?;
    let restriction = state
        .persons
        .persons
        .lift_restriction(id, restriction_id, payload.reason)
        .await?;
    Ok(Json(restriction))
}

#[utoipa::path(
    get,
    path = "/api/person/persons/{id}/health",
    tag = "Persons",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Person ID")),
    responses(
        (status = 200, description = "Health record", body = HealthRecord),
        (status = 403, description = "Requires health.manage"),
        (status = 404, description = "No health record")
    )
)]
pub async fn get_health_record(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<HealthRecord>> {
    require_permission(&current_user, PERM_HEALTH_MANAGE)?;
    Ok(Json(state.persons.persons.get_health_record(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/person/persons/{id}/health",
    tag = "Persons",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Person ID")),
    request_body = HealthRecordRequest,
    responses((status = 200, description = "Health record saved", body = HealthRecord))
)]
pub async fn upsert_health_record(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<HealthRecordRequest>,
) -> AppResult<Json<HealthRecord>> {
    require_permission(&current_user, PERM_HEALTH_MANAGE)?;
    let data = HealthRecordData {
        blood_type: payload.blood_type,
        allergies: payload.allergies,
        chronic_conditions: payload.chronic_conditions,
        medications: payload.medications,
        notes: payload.notes,
    };
    Ok(Json(state.persons.persons.upsert_health_record(id, data).await?))
}
