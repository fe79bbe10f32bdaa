// HTTP client for the backend collaborators.
//
// Wraps a single reqwest::Client and exposes one async method per
// collaborator contract: catalog search, enrichment (calc), demo seeding,
// and squad persistence. Methods return anyhow::Result; callers running in
// spawned tasks convert failures into generation-tagged events rather than
// propagating them.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::squad::persist::{SquadDoc, SquadPayload};
use crate::squad::roster::{Player, RequestKey};
use crate::squad::state::SquadStats;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct CalcRequest<'a> {
    player_ids: &'a [Option<String>],
}

/// Response from `POST /api/calc`. Both fields are optional on the wire;
/// a missing stats object decodes to all-zero and a missing player array to
/// `None` (merge then retains every local slot).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalcResponse {
    #[serde(default)]
    pub stats: SquadStats,
    #[serde(default)]
    pub players: Option<Vec<Option<Player>>>,
}

#[derive(Debug, Deserialize)]
struct CreatedSquad {
    id: String,
}

// ---------------------------------------------------------------------------
// BackendClient
// ---------------------------------------------------------------------------

/// Client for the squad-builder backend.
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Create a client for the given base URL (trailing slashes trimmed).
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        BackendClient {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    /// `GET /api/players?q=<text>`. Empty text omits the parameter and
    /// returns the backend's default browse set.
    pub async fn search_players(&self, query: &str) -> Result<Vec<Player>> {
        let mut request = self.http.get(format!("{}/api/players", self.base_url));
        if !query.is_empty() {
            request = request.query(&[("q", query)]);
        }
        let players = request
            .send()
            .await
            .context("player search request failed")?
            .error_for_status()
            .context("player search returned an error status")?
            .json()
            .await
            .context("failed to parse player search response")?;
        Ok(players)
    }

    /// `POST /api/calc` with the full 11-entry request key.
    pub async fn calc_squad(&self, key: &RequestKey) -> Result<CalcResponse> {
        let body = CalcRequest {
            player_ids: key.player_ids(),
        };
        let response = self
            .http
            .post(format!("{}/api/calc", self.base_url))
            .json(&body)
            .send()
            .await
            .context("enrichment request failed")?
            .error_for_status()
            .context("enrichment returned an error status")?
            .json()
            .await
            .context("failed to parse enrichment response")?;
        Ok(response)
    }

    /// `POST /api/seed/players`. Fire-and-forget; the response payload is
    /// not consumed.
    pub async fn seed_players(&self) -> Result<()> {
        self.http
            .post(format!("{}/api/seed/players", self.base_url))
            .send()
            .await
            .context("seed request failed")?
            .error_for_status()
            .context("seed returned an error status")?;
        Ok(())
    }

    /// `GET /api/squads`: the finite sequence of saved squad documents.
    pub async fn list_squads(&self) -> Result<Vec<SquadDoc>> {
        let squads = self
            .http
            .get(format!("{}/api/squads", self.base_url))
            .send()
            .await
            .context("squad list request failed")?
            .error_for_status()
            .context("squad list returned an error status")?
            .json()
            .await
            .context("failed to parse squad list response")?;
        Ok(squads)
    }

    /// `POST /api/squads`: create a squad, returning its new identifier.
    pub async fn create_squad(&self, payload: &SquadPayload) -> Result<String> {
        let created: CreatedSquad = self
            .http
            .post(format!("{}/api/squads", self.base_url))
            .json(payload)
            .send()
            .await
            .context("squad create request failed")?
            .error_for_status()
            .context("squad create returned an error status")?
            .json()
            .await
            .context("failed to parse squad create response")?;
        Ok(created.id)
    }

    /// `PUT /api/squads/{id}`: update in place. Only the status is consumed.
    pub async fn update_squad(&self, id: &str, payload: &SquadPayload) -> Result<()> {
        self.http
            .put(format!("{}/api/squads/{id}", self.base_url))
            .json(payload)
            .send()
            .await
            .context("squad update request failed")?
            .error_for_status()
            .context("squad update returned an error status")?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Unit tests (mock TCP server, one request per test)
// ---------------------------------------------------------------------------
