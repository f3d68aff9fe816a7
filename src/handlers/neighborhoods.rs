use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::db::{DbNeighborhood, NewNeighborhood};
use crate::error::HomeMatchError;
use crate::middleware::{ApiJson, ApiQuery, AuthUser, RequireServiceKey};
use crate::router::HomeMatchState;
use crate::service::mece::{self, Candidate, Outcome, SkipReason};

#[derive(Debug, Deserialize)]
pub struct CityQuery {
    pub city: Option<String>,
    pub state: Option<String>,
}

fn required(value: Option<&str>, field: &str) -> Result<String, HomeMatchError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| HomeMatchError::validation(format!("{field} is required")))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NeighborhoodView {
    pub id: String,
    pub name: String,
    pub city: String,
    pub state: String,
    pub bounds: Value,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<DbNeighborhood> for NeighborhoodView {
    type Error = HomeMatchError;

    fn try_from(n: DbNeighborhood) -> Result<Self, Self::Error> {
        Ok(Self {
            bounds: serde_json::from_str(&n.bounds)?,
            id: n.id,
            name: n.name,
            city: n.city,
            state: n.state,
            created_at: n.created_at,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct NeighborhoodList {
    pub neighborhoods: Vec<NeighborhoodView>,
}

pub async fn list_neighborhoods(
    State(state): State<HomeMatchState>,
    _user: AuthUser,
    ApiQuery(query): ApiQuery<CityQuery>,
) -> Result<Json<NeighborhoodList>, HomeMatchError> {
    let city = required(query.city.as_deref(), "city")?;
    let st = required(query.state.as_deref(), "state")?;
    let neighborhoods: Vec<NeighborhoodView> = state
        .storage
        .list_neighborhoods(&city, &st)
        .await?
        .into_iter()
        .map(NeighborhoodView::try_from)
        .collect::<Result<_, _>>()?;
    Ok(Json(NeighborhoodList { neighborhoods }))
}

#[derive(Debug, Deserialize)]
pub struct IncomingNeighborhood {
    #[serde(default)]
    pub name: String,
    pub bounds: Value,
}

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub city: Option<String>,
    pub state: Option<String>,
    #[serde(default)]
    pub neighborhoods: Vec<IncomingNeighborhood>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Inserted {
    pub id: String,
    pub name: String,
    pub area_retained: f64,
}

#[derive(Debug, Serialize)]
pub struct Skipped {
    pub name: String,
    pub reason: SkipReason,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub inserted: Vec<Inserted>,
    pub skipped: Vec<Skipped>,
}

/// POST /api/admin/neighborhoods. Boundaries are clipped so that no two
/// neighborhoods of a city overlap; earlier ones keep their shape.
pub async fn import_neighborhoods(
    State(state): State<HomeMatchState>,
    _key: RequireServiceKey,
    ApiJson(req): ApiJson<ImportRequest>,
) -> Result<Json<ImportResponse>, HomeMatchError> {
    let city = required(req.city.as_deref(), "city")?;
    let st = required(req.state.as_deref(), "state")?;

    // reject the whole batch on the first bad boundary
    let candidates = req
        .neighborhoods
        .into_iter()
        .enumerate()
        .map(|(i, n)| -> Result<Candidate, HomeMatchError> {
            let name = n.name.trim().to_string();
            if name.is_empty() {
                return Err(HomeMatchError::validation(format!(
                    "neighborhoods[{i}].name is required"
                )));
            }
            let shape = mece::parse_bounds(n.bounds).map_err(|e| match e {
                HomeMatchError::Geometry(msg) => {
                    HomeMatchError::Geometry(format!("neighborhoods[{i}]: {msg}"))
                }
                other => other,
            })?;
            Ok(Candidate { name, shape })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let existing = state.storage.list_neighborhoods(&city, &st).await?;
    let claimed = existing
        .iter()
        .map(|n| mece::from_geojson(&n.bounds))
        .collect::<Result<Vec<_>, _>>()?;
    let taken: Vec<String> = existing.into_iter().map(|n| n.name).collect();

    let mut accepted = Vec::new();
    let mut skipped = Vec::new();
    for outcome in mece::dedupe(&claimed, &taken, candidates) {
        match outcome {
            Outcome::Accepted {
                name,
                shape,
                area_retained,
            } => accepted.push((name, mece::to_geojson(&shape)?, area_retained)),
            Outcome::Skipped { name, reason } => skipped.push(Skipped { name, reason }),
        }
    }

    let rows = accepted
        .iter()
        .map(|(name, bounds, _)| NewNeighborhood {
            name: name.clone(),
            bounds: bounds.clone(),
        })
        .collect();
    let ids = state.storage.insert_neighborhoods(&city, &st, rows).await?;
    let inserted: Vec<Inserted> = ids
        .into_iter()
        .zip(accepted)
        .map(|(id, (name, _, area_retained))| Inserted {
            id,
            name,
            area_retained,
        })
        .collect();

    info!(
        city = %city,
        state = %st,
        inserted = inserted.len(),
        skipped = skipped.len(),
        "neighborhoods imported"
    );
    Ok(Json(ImportResponse { inserted, skipped }))
}
