//! Request handlers for the identity, session and recipe endpoints

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use cookbook_lakehouse::{
    IdentityListing, IdentityPatch, IdentityQuery, IdentityView, PageRequest, Recipe,
    RecipeDraft, RecipeFilter, RecipeListing, RecipePatch, RecipeQuery, SessionClaims, SortOrder,
};

use crate::cookie::presented_token;
use crate::error::ApiError;
use crate::AppState;

type ApiResult<T> = Result<T, ApiError>;

// ─── Request bodies and query strings ───

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(alias = "username")]
    pub display_name: String,
    #[serde(alias = "email")]
    pub address: String,
    #[serde(alias = "password")]
    pub secret: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "email")]
    pub address: String,
    #[serde(alias = "password")]
    pub secret: String,
}

/// Assertion from an identity provider the caller already verified
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FederatedRequest {
    #[serde(alias = "username")]
    pub display_name: String,
    #[serde(alias = "email")]
    pub address: String,
    #[serde(default, alias = "googlePhoto")]
    pub profile_image: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct IdentityListParams {
    #[serde(alias = "startIndex")]
    pub start_index: Option<usize>,
    pub limit: Option<usize>,
    #[serde(alias = "sort")]
    pub order: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RecipeListParams {
    #[serde(alias = "startIndex")]
    pub start_index: Option<usize>,
    pub limit: Option<usize>,
    pub order: Option<String>,
    #[serde(alias = "userId")]
    pub owner_id: Option<String>,
    #[serde(alias = "ingrediant")]
    pub ingredient: Option<String>,
    pub slug: Option<String>,
    #[serde(alias = "recipeId")]
    pub recipe_id: Option<String>,
    #[serde(alias = "searchTerm")]
    pub search_term: Option<String>,
}

fn page(start_index: Option<usize>, limit: Option<usize>, order: Option<&str>) -> PageRequest {
    PageRequest::new(
        start_index.unwrap_or(0),
        limit.unwrap_or(PageRequest::DEFAULT_LIMIT),
        order.map(SortOrder::from_str).unwrap_or_default(),
    )
}

fn caller(state: &AppState, headers: &HeaderMap) -> ApiResult<SessionClaims> {
    let token = presented_token(headers);
    Ok(state.cookbook.gate().authenticate(token.as_deref())?)
}

// ─── Health ───

pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

// ─── Identities ───

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<IdentityView>)> {
    let Json(req) = payload?;
    let view = state
        .cookbook
        .auth()
        .register(req.display_name, req.address, req.secret)
        .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(req) = payload?;
    let session = state.cookbook.auth().login(req.address, req.secret).await?;
    let cookie = state.cookies.session_cookie(&session.token)?;
    Ok(([(header::SET_COOKIE, cookie)], Json(session.identity)))
}

pub async fn federated_login(
    State(state): State<AppState>,
    payload: Result<Json<FederatedRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(req) = payload?;
    let session = state
        .cookbook
        .auth()
        .federated_login(req.display_name, req.address, req.profile_image)
        .await?;
    let cookie = state.cookies.session_cookie(&session.token)?;
    Ok(([(header::SET_COOKIE, cookie)], Json(session.identity)))
}

/// Always succeeds; an absent or stale token still gets its cookie cleared
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let claims = caller(&state, &headers).ok();
    state.cookbook.auth().logout(claims.as_ref());
    (
        [(header::SET_COOKIE, state.cookies.clear_cookie())],
        Json(json!({ "success": true, "message": "Logged out" })),
    )
}

pub async fn list_identities(
    State(state): State<AppState>,
    params: Result<Query<IdentityListParams>, QueryRejection>,
) -> ApiResult<Json<IdentityListing>> {
    let Query(params) = params?;
    let query = IdentityQuery {
        page: page(params.start_index, params.limit, params.order.as_deref()),
    };
    Ok(Json(state.cookbook.accounts().list(query).await?))
}

pub async fn get_identity(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<IdentityView>> {
    Ok(Json(state.cookbook.accounts().get(&id).await?))
}

pub async fn update_identity(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<IdentityPatch>, JsonRejection>,
) -> ApiResult<Json<IdentityView>> {
    let Json(patch) = payload?;
    Ok(Json(
        state.cookbook.accounts().update_profile(&id, patch).await?,
    ))
}

pub async fn delete_identity(
    State(state): State<AppState>,
    Path((acting_as, target_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    let claims = caller(&state, &headers)?;
    state
        .cookbook
        .accounts()
        .delete_identity(&claims, &acting_as, &target_id)
        .await?;
    Ok(Json(
        json!({ "success": true, "message": "Identity has been deleted" }),
    ))
}

// ─── Recipes ───

pub async fn list_recipes(
    State(state): State<AppState>,
    params: Result<Query<RecipeListParams>, QueryRejection>,
) -> ApiResult<Json<RecipeListing>> {
    let Query(params) = params?;
    let query = RecipeQuery {
        page: page(params.start_index, params.limit, params.order.as_deref()),
        filter: RecipeFilter {
            owner_id: params.owner_id,
            ingredient: params.ingredient,
            slug: params.slug,
            recipe_id: params.recipe_id,
            search_term: params.search_term,
        },
    };
    Ok(Json(state.cookbook.recipes().list(query).await?))
}

pub async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Recipe>> {
    Ok(Json(state.cookbook.recipes().get(&id).await?))
}

/// `POST /recipes/{actingAs}`; shares its path pattern with `get_recipe`
pub async fn create_recipe(
    State(state): State<AppState>,
    Path(acting_as): Path<String>,
    headers: HeaderMap,
    payload: Result<Json<RecipeDraft>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Recipe>)> {
    let claims = caller(&state, &headers)?;
    let Json(draft) = payload?;
    let recipe = state
        .cookbook
        .recipes()
        .create(&claims, &acting_as, draft)
        .await?;
    Ok((StatusCode::CREATED, Json(recipe)))
}

pub async fn update_recipe(
    State(state): State<AppState>,
    Path((acting_as, recipe_id)): Path<(String, String)>,
    headers: HeaderMap,
    payload: Result<Json<RecipePatch>, JsonRejection>,
) -> ApiResult<Json<Recipe>> {
    let claims = caller(&state, &headers)?;
    let Json(patch) = payload?;
    let recipe = state
        .cookbook
        .recipes()
        .update(&claims, &acting_as, &recipe_id, patch)
        .await?;
    Ok(Json(recipe))
}

pub async fn delete_recipe(
    State(state): State<AppState>,
    Path((acting_as, recipe_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    let claims = caller(&state, &headers)?;
    state
        .cookbook
        .recipes()
        .delete(&claims, &acting_as, &recipe_id)
        .await?;
    Ok(Json(
        json!({ "success": true, "message": "Recipe has been deleted" }),
    ))
}
