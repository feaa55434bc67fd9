// ============================================================================
// Source : fichiers JSON locaux
// ============================================================================
// Même format que l'API HTTP, lu depuis le disque (mode hors-ligne, démos)
// ============================================================================

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{info, instrument};

use crate::api::{parse_balances, parse_prices, BalanceSource, PriceSource};
use crate::models::{PriceTable, WalletBalance};

/// Source fichier : un fichier pour les soldes, un pour les prix
#[derive(Debug, Clone)]
pub struct FileSource {
    balances_path: PathBuf,
    prices_path: PathBuf,
}

impl FileSource {
    pub fn new(balances_path: impl Into<PathBuf>, prices_path: impl Into<PathBuf>) -> Self {
        Self {
            balances_path: balances_path.into(),
            prices_path: prices_path.into(),
        }
    }
}

#[async_trait]
impl BalanceSource for FileSource {
    #[instrument(skip(self), fields(path = %self.balances_path.display()))]
    async fn fetch_balances(&self) -> Result<Vec<WalletBalance>> {
        let content = tokio::fs::read_to_string(&self.balances_path)
            .await
            .with_context(|| format!("Impossible de lire {}", self.balances_path.display()))?;

        let balances = parse_balances(&content)
            .with_context(|| format!("Soldes invalides dans {}", self.balances_path.display()))?;

        info!(count = balances.len(), "Loaded wallet balances from file");
        Ok(balances)
    }
}

#[async_trait]
impl PriceSource for FileSource {
    #[instrument(skip(self), fields(path = %self.prices_path.display()))]
    async fn fetch_prices(&self) -> Result<PriceTable> {
        let content = tokio::fs::read_to_string(&self.prices_path)
            .await
            .with_context(|| format!("Impossible de lire {}", self.prices_path.display()))?;

        let prices = parse_prices(&content)
            .with_context(|| format!("Prix invalides dans {}", self.prices_path.display()))?;

        info!(count = prices.len(), "Loaded prices from file");
        Ok(prices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_fetch_from_files() {
        let balances = write_temp(
            r#"[
                {"currency": "OSMO", "amount": 5, "blockchain": "Osmosis"},
                {"currency": "ETH", "amount": 0.5, "blockchain": "Ethereum"}
            ]"#,
        );
        let prices = write_temp(r#"{"OSMO": 2.0}"#);

        let source = FileSource::new(balances.path(), prices.path());

        let fetched = source.fetch_balances().await.unwrap();
        assert_eq!(fetched.len(), 2);
        assert_eq!(fetched[1], WalletBalance::new("ETH", 0.5, "Ethereum"));

        let table = source.fetch_prices().await.unwrap();
        assert_eq!(table.get("OSMO"), Some(2.0));
    }

    #[tokio::test]
    async fn test_missing_file_is_error() {
        let source = FileSource::new("/nonexistent/balances.json", "/nonexistent/prices.json");
        assert!(source.fetch_balances().await.is_err());
        assert!(source.fetch_prices().await.is_err());
    }

    #[tokio::test]
    async fn test_malformed_json_is_error() {
        let balances = write_temp(r#"{"not": "a list"}"#);
        let prices = write_temp("[1, 2, 3]");

        let source = FileSource::new(balances.path(), prices.path());
        assert!(source.fetch_balances().await.is_err());
        assert!(source.fetch_prices().await.is_err());
    }
}
