// ============================================================================
// Structure : PriorityTable
// ============================================================================
// Associe chaque blockchain à un rang d'affichage (plus haut = affiché en premier)
//
// CONCEPTS RUST :
// 1. const : table constante évaluée à la compilation
// 2. HashMap : lookup total avec valeur de repli (unwrap_or)
// 3. Extend : ajouter / écraser des entrées depuis la configuration
// ============================================================================

use std::collections::HashMap;

/// Priorité sentinelle attribuée à toute blockchain absente de la table
///
/// C'est aussi le seuil (exclusif) d'inclusion : un solde dont la priorité
/// n'est pas strictement supérieure est filtré.
pub const SENTINEL_PRIORITY: i32 = -99;

/// Table de priorités par défaut
///
/// CONCEPT RUST : Array de tuples constant
/// - Pas d'allocation, vit dans le binaire
/// - Converti en HashMap à la construction de PriorityTable
pub const DEFAULT_PRIORITIES: [(&str, i32); 5] = [
    ("Osmosis", 100),
    ("Ethereum", 50),
    ("Arbitrum", 30),
    ("Zilliqa", 20),
    ("Neo", 20),
];

/// Table de priorités des blockchains
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityTable {
    priorities: HashMap<String, i32>,
}

impl PriorityTable {
    /// Crée la table par défaut, étendue (ou écrasée) par des entrées supplémentaires
    ///
    /// # Exemple
    /// let table = PriorityTable::with_overrides([("Cosmos".to_string(), 40)]);
    /// assert_eq!(table.priority("Cosmos"), 40);
    pub fn with_overrides<I>(overrides: I) -> Self
    where
        I: IntoIterator<Item = (String, i32)>,
    {
        let mut table = Self::default();
        table.priorities.extend(overrides);
        table
    }

    /// Retourne la priorité d'une blockchain
    ///
    /// Lookup total : un tag inconnu (ou vide) retourne SENTINEL_PRIORITY.
    pub fn priority(&self, blockchain: &str) -> i32 {
        self.priorities
            .get(blockchain)
            .copied()
            .unwrap_or(SENTINEL_PRIORITY)
    }
}

impl Default for PriorityTable {
    fn default() -> Self {
        Self {
            priorities: DEFAULT_PRIORITIES
                .iter()
                .map(|&(chain, priority)| (chain.to_string(), priority))
                .collect(),
        }
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_priorities() {
        let table = PriorityTable::default();
        assert_eq!(table.priority("Osmosis"), 100);
        assert_eq!(table.priority("Ethereum"), 50);
        assert_eq!(table.priority("Arbitrum"), 30);
        assert_eq!(table.priority("Zilliqa"), 20);
        assert_eq!(table.priority("Neo"), 20);
        assert_eq!(table, PriorityTable::with_overrides([]));
    }

    #[test]
    fn test_unknown_chain_gets_sentinel() {
        let table = PriorityTable::default();
        assert_eq!(table.priority("Unknown"), SENTINEL_PRIORITY);
        assert_eq!(table.priority(""), SENTINEL_PRIORITY);
        // Le lookup est sensible à la casse
        assert_eq!(table.priority("osmosis"), SENTINEL_PRIORITY);
        assert_eq!(table.priority("Solana"), SENTINEL_PRIORITY);
    }

    #[test]
    fn test_overrides() {
        let table = PriorityTable::with_overrides([
            ("Cosmos".to_string(), 40),
            ("Neo".to_string(), 5),
        ]);

        assert_eq!(table.priority("Cosmos"), 40);
        assert_eq!(table.priority("Neo"), 5);
        assert_eq!(table.priority("Osmosis"), 100);
        assert_eq!(table.priority("Ethereum"), 50);
    }
}
