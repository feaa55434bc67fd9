// ============================================================================
// Module : api
// ============================================================================
// Sources de données : soldes du wallet et prix USD
//
// Deux traits, deux implémentations :
// - HttpSource : API HTTP (/api/wallets/balances, /api/prices)
// - FileSource : fichiers JSON locaux
//
// Une erreur de récupération remonte à l'appelant (affichée dans l'UI) et
// n'atteint jamais le pipeline de traitement.
// ============================================================================

pub mod file; // Source fichiers JSON
pub mod http; // Client API HTTP

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::config::SourceConfig;
use crate::models::{PriceTable, WalletBalance};

pub use file::FileSource;
pub use http::HttpSource;

/// Fournisseur de soldes
#[async_trait]
pub trait BalanceSource: Send + Sync {
    /// Récupère tous les soldes du wallet (liste éventuellement vide)
    async fn fetch_balances(&self) -> Result<Vec<WalletBalance>>;
}

/// Fournisseur de prix
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Récupère la table des prix USD
    async fn fetch_prices(&self) -> Result<PriceTable>;
}

/// Source complète (soldes + prix)
///
/// CONCEPT RUST : Blanket implementation
/// - Tout type qui implémente les deux traits implémente WalletSource
/// - Permet de stocker un Box<dyn WalletSource>
pub trait WalletSource: BalanceSource + PriceSource {}

impl<T: BalanceSource + PriceSource> WalletSource for T {}

/// Construit la source décrite par la configuration
pub fn source_from_config(config: &SourceConfig) -> Result<Box<dyn WalletSource>> {
    match config {
        SourceConfig::Http { base_url } => Ok(Box::new(HttpSource::new(base_url.clone())?)),
        SourceConfig::File { balances, prices } => {
            Ok(Box::new(FileSource::new(balances.clone(), prices.clone())))
        }
    }
}

/// Récupère soldes et prix en parallèle
///
/// CONCEPT RUST : tokio::join!
/// - Lance les deux futures en même temps
/// - Attend que les deux soient terminées
pub async fn fetch_snapshot(source: &dyn WalletSource) -> Result<(Vec<WalletBalance>, PriceTable)> {
    let (balances, prices) = tokio::join!(source.fetch_balances(), source.fetch_prices());
    Ok((balances?, prices?))
}

/// Parse une liste de soldes JSON
pub fn parse_balances(json: &str) -> Result<Vec<WalletBalance>> {
    serde_json::from_str(json).context("Échec du parsing JSON des soldes")
}

/// Parse une table de prix JSON
pub fn parse_prices(json: &str) -> Result<PriceTable> {
    serde_json::from_str(json).context("Échec du parsing JSON des prix")
}
