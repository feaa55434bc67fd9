// ============================================================================
// Structures : WalletBalance et FormattedWalletBalance
// ============================================================================
// WalletBalance : un solde brut tel que fourni par la source de soldes
// FormattedWalletBalance : un solde enrichi pour l'affichage (texte + valeur USD)
//
// CONCEPTS RUST :
// 1. Composition : FormattedWalletBalance contient un WalletBalance
// 2. #[serde(flatten)] : les champs du solde sont "aplatis" dans le JSON
// 3. #[serde(default)] : un champ absent prend la valeur par défaut du type
// 4. deserialize_with : conversion sur mesure d'un champ (null -> "")
// ============================================================================

use serde::{Deserialize, Deserializer, Serialize};

/// Nombre de décimales affichées pour un montant
pub const CURRENCY_DECIMALS: usize = 2;

/// Solde d'une devise sur une blockchain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletBalance {
    /// Code de la devise (ex: "OSMO", "ETH")
    pub currency: String,

    /// Montant détenu (attendu positif)
    pub amount: f64,

    /// Nom de la blockchain (ex: "Osmosis")
    ///
    /// CONCEPT : Tag libre
    /// - Un enregistrement sans blockchain (absente ou null) est accepté avec un tag vide
    /// - Un tag vide ou inconnu reçoit la priorité sentinelle
    #[serde(default, deserialize_with = "null_as_empty")]
    pub blockchain: String,
}

/// Lit une chaîne optionnelle : `null` devient une chaîne vide
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl WalletBalance {
    /// Constructeur
    pub fn new(currency: impl Into<String>, amount: f64, blockchain: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
            amount,
            blockchain: blockchain.into(),
        }
    }
}

/// Solde prêt pour l'affichage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedWalletBalance {
    /// Solde d'origine (non modifié)
    #[serde(flatten)]
    pub balance: WalletBalance,

    /// Montant avec exactement deux décimales (ex: "5.00")
    pub formatted: String,

    /// Valeur en USD : montant × prix (0 si le prix est inconnu)
    #[serde(rename = "usdValue")]
    pub usd_value: f64,
}

impl FormattedWalletBalance {
    /// Enrichit un solde avec son prix unitaire
    pub fn from_balance(balance: WalletBalance, unit_price: f64) -> Self {
        let formatted = format_amount(balance.amount);
        let usd_value = balance.amount * unit_price;

        Self {
            balance,
            formatted,
            usd_value,
        }
    }

    /// Code de la devise, utilisé comme clé stable de la ligne
    pub fn currency(&self) -> &str {
        &self.balance.currency
    }

    pub fn amount(&self) -> f64 {
        self.balance.amount
    }

    pub fn blockchain(&self) -> &str {
        &self.balance.blockchain
    }

    /// Formatte la ligne pour l'affichage dans la liste
    ///
    /// Format : "OSMO     Osmosis          5.00        $10.00"
    pub fn display(&self) -> String {
        format!(
            "{:<8} {:<12} {:>14} {:>14}",
            self.balance.currency,
            self.balance.blockchain,
            self.formatted,
            format_usd(self.usd_value)
        )
    }
}

/// Formatte un montant avec CURRENCY_DECIMALS décimales
pub fn format_amount(amount: f64) -> String {
    format!("{:.*}", CURRENCY_DECIMALS, amount)
}

/// Formatte une valeur en dollars (ex: "$1234.50")
pub fn format_usd(value: f64) -> String {
    format!("${:.2}", value)
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(5.0), "5.00");
        assert_eq!(format_amount(0.1), "0.10");
        assert_eq!(format_amount(1234.5678), "1234.57");
        assert_eq!(format_amount(0.004), "0.00");
    }

    #[test]
    fn test_from_balance() {
        let balance = WalletBalance::new("OSMO", 5.0, "Osmosis");
        let formatted = FormattedWalletBalance::from_balance(balance, 2.0);

        assert_eq!(formatted.currency(), "OSMO");
        assert_eq!(formatted.formatted, "5.00");
        assert_eq!(formatted.usd_value, 10.0);
    }

    #[test]
    fn test_missing_blockchain_deserializes_empty() {
        let balance: WalletBalance =
            serde_json::from_str(r#"{"currency": "FOO", "amount": 3}"#).unwrap();
        assert_eq!(balance.blockchain, "");
        assert_eq!(balance.amount, 3.0);
    }

    #[test]
    fn test_null_blockchain_deserializes_empty() {
        let balance: WalletBalance =
            serde_json::from_str(r#"{"currency": "FOO", "amount": 3, "blockchain": null}"#).unwrap();
        assert_eq!(balance.blockchain, "");
    }

    #[test]
    fn test_formatted_serializes_flat() {
        let formatted =
            FormattedWalletBalance::from_balance(WalletBalance::new("OSMO", 5.0, "Osmosis"), 2.0);
        let json = serde_json::to_value(&formatted).unwrap();

        assert_eq!(json["currency"], "OSMO");
        assert_eq!(json["blockchain"], "Osmosis");
        assert_eq!(json["formatted"], "5.00");
        assert_eq!(json["usdValue"], 10.0);
    }

    #[test]
    fn test_display() {
        let formatted =
            FormattedWalletBalance::from_balance(WalletBalance::new("ETH", 1.5, "Ethereum"), 2000.0);
        let line = formatted.display();
        assert!(line.starts_with("ETH"));
        assert!(line.contains("Ethereum"));
        assert!(line.contains("1.50"));
        assert!(line.contains("$3000.00"));
    }
}
