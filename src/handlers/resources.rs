//! Championship and promotion routes. Each one is a [`ForwardRequest`] handed
//! to the forwarder; bodies and payloads pass through untouched. Only the
//! collection listings are readable without a session.

use crate::{
    forward::{forward, forward_with_id, ForwardRequest, Forwarded, PathTemplate, RelayBody},
    session::Session,
    state::AppState,
    utils::ApiResult,
};
use axum::extract::{Path, State};
use http::Method;

const CHAMPIONSHIPS: PathTemplate = PathTemplate::new("/api/championships");
const CHAMPIONSHIP: PathTemplate = PathTemplate::new("/api/championships/{id}");
const ASSIGN_PROMOTION: PathTemplate =
    PathTemplate::new("/api/championships/{id}/assign-promotion");
const OWNERSHIP_HISTORY: PathTemplate =
    PathTemplate::new("/api/championships/{id}/ownership-history");
const PROMOTIONS: PathTemplate = PathTemplate::new("/api/promotions");
const PROMOTION: PathTemplate = PathTemplate::new("/api/promotions/{id}");

type Relayed = (Session, ApiResult<Forwarded>);

fn id_of(id: &Option<Path<String>>) -> Option<&str> {
    id.as_ref().map(|Path(id)| id.as_str())
}

async fn relay(state: &AppState, mut session: Session, request: ForwardRequest) -> Relayed {
    let result = forward(state, &mut session, request).await;
    (session, result)
}

async fn relay_with_id(
    state: &AppState,
    mut session: Session,
    id: Option<&str>,
    request: ForwardRequest,
) -> Relayed {
    let result = forward_with_id(state, &mut session, id, request).await;
    (session, result)
}

// Championships

pub async fn list_championships(State(state): State<AppState>, session: Session) -> Relayed {
    let request = ForwardRequest::public(Method::GET, CHAMPIONSHIPS)
        .fallback("Failed to fetch championships");
    relay(&state, session, request).await
}

pub async fn create_championship(
    State(state): State<AppState>,
    session: Session,
    body: RelayBody,
) -> Relayed {
    let request = ForwardRequest::authenticated(Method::POST, CHAMPIONSHIPS)
        .with_body(body)
        .fallback("Failed to create championship");
    relay(&state, session, request).await
}

pub async fn get_championship(
    State(state): State<AppState>,
    session: Session,
    id: Option<Path<String>>,
) -> Relayed {
    let request = ForwardRequest::authenticated(Method::GET, CHAMPIONSHIP)
        .missing_id("Championship id is required");
    relay_with_id(&state, session, id_of(&id), request).await
}

pub async fn update_championship(
    State(state): State<AppState>,
    session: Session,
    id: Option<Path<String>>,
    body: RelayBody,
) -> Relayed {
    let request = ForwardRequest::authenticated(Method::PUT, CHAMPIONSHIP)
        .with_body(body)
        .fallback("Failed to update championship");
    relay_with_id(&state, session, id_of(&id), request).await
}

pub async fn delete_championship(
    State(state): State<AppState>,
    session: Session,
    id: Option<Path<String>>,
) -> Relayed {
    let request = ForwardRequest::authenticated(Method::DELETE, CHAMPIONSHIP)
        .fallback("Failed to delete championship");
    relay_with_id(&state, session, id_of(&id), request).await
}

pub async fn assign_promotion(
    State(state): State<AppState>,
    session: Session,
    id: Option<Path<String>>,
    body: RelayBody,
) -> Relayed {
    let request = ForwardRequest::authenticated(Method::POST, ASSIGN_PROMOTION).with_body(body);
    relay_with_id(&state, session, id_of(&id), request).await
}

pub async fn update_ownership_history(
    State(state): State<AppState>,
    session: Session,
    id: Option<Path<String>>,
    body: RelayBody,
) -> Relayed {
    let request = ForwardRequest::authenticated(Method::PUT, OWNERSHIP_HISTORY).with_body(body);
    relay_with_id(&state, session, id_of(&id), request).await
}

// Promotions

pub async fn list_promotions(State(state): State<AppState>, session: Session) -> Relayed {
    let request =
        ForwardRequest::public(Method::GET, PROMOTIONS).fallback("Failed to fetch promotions");
    relay(&state, session, request).await
}

pub async fn create_promotion(
    State(state): State<AppState>,
    session: Session,
    body: RelayBody,
) -> Relayed {
    let request = ForwardRequest::authenticated(Method::POST, PROMOTIONS)
        .with_body(body)
        .fallback("Failed to create promotion");
    relay(&state, session, request).await
}

pub async fn get_promotion(
    State(state): State<AppState>,
    session: Session,
    id: Option<Path<String>>,
) -> Relayed {
    let request = ForwardRequest::authenticated(Method::GET, PROMOTION)
        .missing_id("Promotion id is required");
    relay_with_id(&state, session, id_of(&id), request).await
}

pub async fn update_promotion(
    State(state): State<AppState>,
    session: Session,
    id: Option<Path<String>>,
    body: RelayBody,
) -> Relayed {
    let request = ForwardRequest::authenticated(Method::PUT, PROMOTION)
        .with_body(body)
        .fallback("Failed to update promotion");
    relay_with_id(&state, session, id_of(&id), request).await
}
