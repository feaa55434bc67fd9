// ============================================================================
// API Client : HTTP
// ============================================================================
// Récupère les soldes et les prix depuis l'API du wallet
//
//   GET {base_url}/api/wallets/balances -> [{ currency, amount, blockchain }, ...]
//   GET {base_url}/api/prices           -> { "OSMO": 0.37, ... }
//
// CONCEPTS RUST AVANCÉS :
// 1. async/await : programmation asynchrone (non-bloquante)
// 2. Result<T, E> : gestion d'erreurs avec contexte
// 3. Generics + DeserializeOwned : une seule fonction GET pour deux types
// ============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, instrument};

use crate::api::{BalanceSource, PriceSource};
use crate::models::{PriceTable, WalletBalance};

/// Chemin de l'endpoint des soldes
pub const BALANCES_PATH: &str = "/api/wallets/balances";

/// Chemin de l'endpoint des prix
pub const PRICES_PATH: &str = "/api/prices";

/// Timeout d'une requête HTTP
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Source HTTP pour les soldes et les prix
#[derive(Debug, Clone)]
pub struct HttpSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpSource {
    /// Crée une source HTTP pointant vers base_url (ex: "http://localhost:3000")
    ///
    /// Le client reqwest est créé une seule fois et réutilisé (pool de connexions).
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("walletview/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Échec de la création du client HTTP")?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    /// Construit l'URL complète d'un endpoint
    ///
    /// Tolère un slash final dans base_url ("http://host/" + "/api/..." -> "http://host/api/...")
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// GET + parsing JSON vers T
    ///
    /// CONCEPT RUST : DeserializeOwned
    /// - T doit pouvoir être construit depuis le JSON sans emprunter le buffer
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path);
        debug!(url = %url, "Sending HTTP request");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Échec de la requête HTTP vers {}", url))?;

        let status = response.status();
        debug!(status = %status, "Received HTTP response");

        // Vérifie que la réponse est un succès HTTP (200-299)
        if !status.is_success() {
            error!(status = %status, url = %url, "API returned error status");
            anyhow::bail!("L'API a retourné une erreur : HTTP {} ({})", status, url);
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Échec du parsing JSON de la réponse de {}", url))
    }
}

#[async_trait]
impl BalanceSource for HttpSource {
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn fetch_balances(&self) -> Result<Vec<WalletBalance>> {
        let balances: Vec<WalletBalance> = self.get_json(BALANCES_PATH).await?;
        info!(count = balances.len(), "Fetched wallet balances");
        Ok(balances)
    }
}

#[async_trait]
impl PriceSource for HttpSource {
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn fetch_prices(&self) -> Result<PriceTable> {
        let prices: PriceTable = self.get_json(PRICES_PATH).await?;
        info!(count = prices.len(), "Fetched prices");
        Ok(prices)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
