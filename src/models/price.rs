// ============================================================================
// Structure : PriceTable
// ============================================================================
// Prix unitaires en USD, indexés par code de devise (ex: "OSMO" -> 2.0)
//
// CONCEPT RUST : Newtype pattern
// - Une struct tuple qui enveloppe un HashMap
// - #[serde(transparent)] : (dé)sérialisé exactement comme le HashMap
// ============================================================================

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Table des prix USD par devise
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceTable(HashMap<String, f64>);

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retourne le prix d'une devise s'il est connu
    pub fn get(&self, currency: &str) -> Option<f64> {
        self.0.get(currency).copied()
    }

    /// Retourne le prix d'une devise, ou 0 si absent
    ///
    /// Un prix manquant ne bloque pas l'affichage du solde,
    /// il donne simplement une valeur USD nulle.
    pub fn price_or_zero(&self, currency: &str) -> f64 {
        self.get(currency).unwrap_or(0.0)
    }

    /// Ajoute ou remplace le prix d'une devise
    pub fn insert(&mut self, currency: impl Into<String>, price: f64) {
        self.0.insert(currency.into(), price);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for PriceTable {
    fn from_iter<T: IntoIterator<Item = (S, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(c, p)| (c.into(), p)).collect())
    }
}
