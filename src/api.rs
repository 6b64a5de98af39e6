//! Client REST du back-office (JSON, sans version ni schéma côté serveur).
//!
//! Pas de relance ni d'annulation : une erreur HTTP remonte telle quelle, avec le
//! message du serveur.

use crate::model::{
    Conducteur, ConducteurId, Ligne, LigneId, NumeroParc, Reseau, ServiceId, Vehicule,
};
use crate::pointage::{NonAssurance, Pointage};
use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },
}

pub struct ApiClientParams {
    pub base_url: String,
    pub idempotency_keys: bool,
}

/// Champ modifié par `PUT /api/services-hierarchie/:id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum MiseAJourService {
    #[serde(rename = "conducteurId")]
    Conducteur(Option<ConducteurId>),
    #[serde(rename = "vehiculeAssigne")]
    Vehicule(Option<NumeroParc>),
}

#[derive(Debug, Clone, Deserialize)]
struct Today {
    #[serde(deserialize_with = "crate::model::de_date")]
    date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerTime {
    server_time: DateTime<Utc>,
}

pub struct ApiClient {
    params: ApiClientParams,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(params: ApiClientParams) -> Self {
        Self {
            params,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.params.base_url.trim_end_matches('/'), path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        debug!(path, "GET");
        let response = self.client.get(self.url(path)).send().await?;
        let response = check(response).await?;
        Ok(response.json().await?)
    }

    fn mutation(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        debug!(method = method.as_str(), path, "mutation");
        let builder = self.client.request(method, self.url(path));
        if self.params.idempotency_keys {
            builder.header("Idempotency-Key", Uuid::new_v4().to_string())
        } else {
            builder
        }
    }

    pub async fn lignes(&self) -> Result<Vec<Ligne>, ApiError> {
        self.get("/api/lignes").await
    }

    pub async fn conducteurs(&self) -> Result<Vec<Conducteur>, ApiError> {
        self.get("/api/conducteurs").await
    }

    pub async fn vehicules(&self) -> Result<Vec<Vehicule>, ApiError> {
        self.get("/api/vehicles").await
    }

    pub async fn vehicules_eligibles(&self, ligne: &LigneId) -> Result<Vec<Vehicule>, ApiError> {
        self.get(&format!("/api/vehicles/eligible/{ligne}")).await
    }

    /// Lignes, conducteurs et véhicules en un seul instantané.
    pub async fn fetch_reseau(&self) -> Result<Reseau, ApiError> {
        let lignes = self.lignes().await?;
        let conducteurs = self.conducteurs().await?;
        let vehicules = self.vehicules().await?;
        Ok(Reseau {
            lignes,
            conducteurs,
            vehicules,
        })
    }

    pub async fn update_service(
        &self,
        id: &ServiceId,
        update: &MiseAJourService,
    ) -> Result<(), ApiError> {
        let response = self
            .mutation(reqwest::Method::PUT, &format!("/api/services-hierarchie/{id}"))
            .json(update)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    pub async fn delete_service(&self, id: &ServiceId) -> Result<(), ApiError> {
        let response = self
            .mutation(
                reqwest::Method::DELETE,
                &format!("/api/services-hierarchie/{id}"),
            )
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    pub async fn post_pointage(&self, pointage: &Pointage) -> Result<(), ApiError> {
        let response = self
            .mutation(reqwest::Method::POST, "/api/pointages")
            .json(pointage)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    pub async fn mark_non_assure(
        &self,
        id: &ServiceId,
        motif: &NonAssurance,
    ) -> Result<(), ApiError> {
        let response = self
            .mutation(
                reqwest::Method::PUT,
                &format!("/api/services/{id}/non-assured"),
            )
            .json(motif)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    pub async fn today(&self) -> Result<NaiveDate, ApiError> {
        let today: Today = self.get("/api/today").await?;
        Ok(today.date)
    }

    pub async fn server_time(&self) -> Result<DateTime<Utc>, ApiError> {
        let time: ServerTime = self.get("/api/server-time").await?;
        Ok(time.server_time)
    }
}

async fn check(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    warn!(status = status.as_u16(), %message, "API error");
    Err(ApiError::Http {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_body_carries_a_single_field() {
        let body =
            serde_json::to_value(MiseAJourService::Conducteur(Some(ConducteurId::new("7"))))
                .unwrap();
        assert_eq!(body, serde_json::json!({ "conducteurId": "7" }));
        let body = serde_json::to_value(MiseAJourService::Vehicule(None)).unwrap();
        assert_eq!(body, serde_json::json!({ "vehiculeAssigne": null }));
    }

    #[test]
    fn clock_endpoints_parse() {
        let t: ServerTime =
            serde_json::from_str(r#"{"serverTime":"2025-03-12T08:00:00Z"}"#).unwrap();
        assert_eq!(t.server_time.to_rfc3339(), "2025-03-12T08:00:00+00:00");
        let d: Today = serde_json::from_str(r#"{"date":"2025-03-12T00:00:00.000Z"}"#).unwrap();
        assert_eq!(d.date, NaiveDate::from_ymd_opt(2025, 3, 12).unwrap());
    }

    #[test]
    fn base_url_trailing_slash() {
        let client = ApiClient::new(ApiClientParams {
            base_url: "http://depot.local/".into(),
            idempotency_keys: false,
        });
        assert_eq!(client.url("/api/lignes"), "http://depot.local/api/lignes");
    }
}
