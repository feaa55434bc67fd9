// ============================================================================
// Module : config
// ============================================================================
// Configuration de l'application, lue depuis un fichier JSON
//
// Emplacement (par ordre de priorité) :
// 1. $WALLETVIEW_CONFIG (le fichier doit exister)
// 2. <config_dir>/walletview/config.json (ex: ~/.config/walletview/config.json)
// 3. Valeurs par défaut si le fichier implicite n'existe pas
//
// $WALLETVIEW_API_URL écrase l'URL de l'API HTTP.
//
// CONCEPTS RUST :
// 1. #[serde(default)] : champs optionnels dans le fichier
// 2. #[serde(tag = "kind")] : enum "internally tagged" en JSON
// 3. anyhow::Context : messages d'erreur lisibles pour l'utilisateur
// ============================================================================

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::models::PriorityTable;
use crate::processor::{BalanceProcessor, UnknownChainPolicy};

/// Variable d'environnement : chemin du fichier de config
pub const CONFIG_PATH_ENV: &str = "WALLETVIEW_CONFIG";

/// Variable d'environnement : URL de base de l'API
pub const API_URL_ENV: &str = "WALLETVIEW_API_URL";

/// URL de base par défaut
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Origine des soldes et des prix
///
/// Exemples JSON :
/// { "kind": "http", "base_url": "http://localhost:3000" }
/// { "kind": "file", "balances": "balances.json", "prices": "prices.json" }
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceConfig {
    /// API HTTP (GET /api/wallets/balances et GET /api/prices)
    Http { base_url: String },

    /// Fichiers JSON locaux
    File { balances: PathBuf, prices: PathBuf },
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::Http {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Configuration complète
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Source des données
    pub source: SourceConfig,

    /// Comportement pour les blockchains inconnues
    pub unknown_chain_policy: UnknownChainPolicy,

    /// Priorités supplémentaires (ou remplaçant celles par défaut)
    pub priorities: HashMap<String, i32>,

    /// Période de rafraîchissement automatique en secondes (0 = désactivé)
    pub refresh_secs: u64,

    /// Répertoire des logs
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            unknown_chain_policy: UnknownChainPolicy::default(),
            priorities: HashMap::new(),
            refresh_secs: 30,
            log_dir: None,
        }
    }
}

impl Config {
    /// Parse une configuration depuis du JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Fichier de configuration JSON invalide")
    }

    /// Charge la configuration depuis un fichier précis
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).with_context(|| {
            format!("Impossible de lire le fichier de config {}", path.display())
        })?;

        let config = Self::from_json(&content)
            .with_context(|| format!("Erreur dans {}", path.display()))?;

        info!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Charge la configuration depuis l'emplacement par défaut
    ///
    /// Un chemin explicite ($WALLETVIEW_CONFIG) doit exister : une faute de
    /// frappe est une erreur, pas un retour silencieux aux valeurs par défaut.
    /// Les variables d'environnement sont appliquées ensuite.
    pub fn load_default() -> Result<Self> {
        let explicit = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
        let mut config = Self::load_from(explicit.as_deref(), implicit_config_path())?;

        if let Ok(url) = std::env::var(API_URL_ENV) {
            config.apply_api_url_override(url);
        }

        Ok(config)
    }

    /// Résout le fichier à charger
    ///
    /// - explicit : chargé tel quel, erreur s'il est absent
    /// - implicit : chargé s'il existe, sinon configuration par défaut
    fn load_from(explicit: Option<&Path>, implicit: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path)
                .with_context(|| format!("{} pointe vers un fichier illisible", CONFIG_PATH_ENV));
        }

        match implicit {
            Some(path) if path.exists() => Self::load(&path),
            Some(path) => {
                debug!(path = %path.display(), "No config file, using defaults");
                Ok(Self::default())
            }
            None => {
                debug!("No config directory available, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Remplace l'URL de l'API (force une source HTTP)
    pub fn apply_api_url_override(&mut self, base_url: String) {
        info!(base_url = %base_url, "API URL overridden from environment");
        self.source = SourceConfig::Http { base_url };
    }

    /// Construit le processor correspondant à cette configuration
    pub fn processor(&self) -> BalanceProcessor {
        let table = PriorityTable::with_overrides(
            self.priorities
                .iter()
                .map(|(chain, priority)| (chain.clone(), *priority)),
        );
        BalanceProcessor::with_config(table, self.unknown_chain_policy)
    }

    /// Répertoire des logs (./logs par défaut)
    pub fn log_dir(&self) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("./logs"))
    }
}

/// Chemin implicite du fichier de config
///
/// CONCEPT RUST : Option chaining
/// - dirs::config_dir() retourne None sur les plateformes sans répertoire de config
fn implicit_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("walletview").join("config.json"))
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.source, SourceConfig::default());
        assert_eq!(config.unknown_chain_policy, UnknownChainPolicy::Drop);
        assert_eq!(config.refresh_secs, 30);
        assert_eq!(config.log_dir(), PathBuf::from("./logs"));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = Config::from_json(r#"{ "unknown_chain_policy": "warn" }"#).unwrap();
        assert_eq!(config.unknown_chain_policy, UnknownChainPolicy::Warn);
        assert_eq!(config.refresh_secs, 30);
        assert!(matches!(config.source, SourceConfig::Http { .. }));
    }

    #[test]
    fn test_file_source() {
        let config = Config::from_json(
            r#"{
                "source": { "kind": "file", "balances": "b.json", "prices": "p.json" },
                "refresh_secs": 0
            }"#,
        )
        .unwrap();

        assert_eq!(
            config.source,
            SourceConfig::File {
                balances: PathBuf::from("b.json"),
                prices: PathBuf::from("p.json"),
            }
        );
        assert_eq!(config.refresh_secs, 0);
    }

    #[test]
    fn test_priorities_flow_into_processor() {
        let config = Config::from_json(r#"{ "priorities": { "Cosmos": 40, "Neo": 1 } }"#).unwrap();
        let processor = config.processor();

        assert_eq!(processor.priority("Cosmos"), 40);
        assert_eq!(processor.priority("Neo"), 1);
        assert_eq!(processor.priority("Osmosis"), 100);
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(Config::from_json("{ not json").is_err());
        assert!(Config::from_json(r#"{ "unknown_chain_policy": "explode" }"#).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "refresh_secs": 5 }}"#).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.refresh_secs, 5);
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let result = Config::load(Path::new("/nonexistent/walletview/config.json"));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_explicit_path_is_error() {
        let missing = Path::new("/nonexistent/walletview/typo.json");
        assert!(Config::load_from(Some(missing), None).is_err());

        // Même avec un fichier implicite valide, le chemin explicite l'emporte
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "refresh_secs": 5 }}"#).unwrap();
        assert!(Config::load_from(Some(missing), Some(file.path().to_path_buf())).is_err());
    }

    #[test]
    fn test_missing_implicit_path_uses_defaults() {
        let missing = PathBuf::from("/nonexistent/walletview/config.json");
        assert_eq!(Config::load_from(None, Some(missing)).unwrap(), Config::default());
        assert_eq!(Config::load_from(None, None).unwrap(), Config::default());
    }

    #[test]
    fn test_explicit_and_implicit_paths_are_loaded() {
        let mut explicit = tempfile::NamedTempFile::new().unwrap();
        write!(explicit, r#"{{ "refresh_secs": 5 }}"#).unwrap();
        let mut implicit = tempfile::NamedTempFile::new().unwrap();
        write!(implicit, r#"{{ "refresh_secs": 7 }}"#).unwrap();

        let config = Config::load_from(Some(explicit.path()), Some(implicit.path().to_path_buf()));
        assert_eq!(config.unwrap().refresh_secs, 5);

        let config = Config::load_from(None, Some(implicit.path().to_path_buf()));
        assert_eq!(config.unwrap().refresh_secs, 7);
    }

    #[test]
    fn test_api_url_override() {
        let mut config = Config::from_json(
            r#"{ "source": { "kind": "file", "balances": "b.json", "prices": "p.json" } }"#,
        )
        .unwrap();

        config.apply_api_url_override("http://example.test".to_string());
        assert_eq!(
            config.source,
            SourceConfig::Http {
                base_url: "http://example.test".to_string()
            }
        );
    }
}
