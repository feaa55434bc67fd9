// ============================================================================
// Structure : ProcessedBalances
// ============================================================================
// Mémoïsation explicite du pipeline : le résultat n'est recalculé que si les
// soldes, les prix ou la configuration du processor ont changé depuis le
// dernier appel.
//
// CONCEPTS RUST :
// 1. Option<T> : cache vide ou rempli
// 2. PartialEq : la clé du cache est l'égalité des entrées
// 3. &mut self : le cache se met à jour lui-même
// ============================================================================

use tracing::debug;

use crate::models::{PriceTable, WalletBalance};
use crate::processor::{BalanceProcessor, ProcessReport};

/// Entrées et résultat du dernier calcul
#[derive(Debug, Clone)]
struct CachedEntry {
    processor: BalanceProcessor,
    balances: Vec<WalletBalance>,
    prices: PriceTable,
    report: ProcessReport,
}

/// Cache du dernier résultat du pipeline
#[derive(Debug, Clone, Default)]
pub struct ProcessedBalances {
    entry: Option<CachedEntry>,
    hits: u64,
    misses: u64,
}

impl ProcessedBalances {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retourne le rapport pour ces entrées, en le recalculant si nécessaire
    ///
    /// CONCEPT RUST : Borrow puis retour d'une référence
    /// - Si les entrées et le processor sont égaux au cache : hit, on retourne la référence
    /// - Sinon : miss, on recalcule et on remplace l'entrée
    pub fn get_or_process(
        &mut self,
        processor: &BalanceProcessor,
        balances: &[WalletBalance],
        prices: &PriceTable,
    ) -> &ProcessReport {
        let is_hit = matches!(
            &self.entry,
            Some(entry) if &entry.processor == processor
                && entry.balances.as_slice() == balances
                && &entry.prices == prices
        );

        if is_hit {
            self.hits += 1;
            debug!(hits = self.hits, "Processed balances cache hit");
        } else {
            self.misses += 1;
            debug!(
                misses = self.misses,
                balances = balances.len(),
                prices = prices.len(),
                "Processed balances cache miss, recomputing"
            );
            self.entry = None;
        }

        let entry = self.entry.get_or_insert_with(|| CachedEntry {
            processor: processor.clone(),
            balances: balances.to_vec(),
            prices: prices.clone(),
            report: processor.process_with_report(balances, prices),
        });

        &entry.report
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PriorityTable;
    use crate::processor::UnknownChainPolicy;

    fn sample_balances() -> Vec<WalletBalance> {
        vec![
            WalletBalance::new("OSMO", 5.0, "Osmosis"),
            WalletBalance::new("ETH", 1.0, "Ethereum"),
        ]
    }

    #[test]
    fn test_hit_on_equal_inputs() {
        let processor = BalanceProcessor::new();
        let mut cache = ProcessedBalances::new();
        let balances = sample_balances();
        let prices: PriceTable = [("OSMO", 2.0)].into_iter().collect();

        let first = cache.get_or_process(&processor, &balances, &prices).clone();
        // Copie égale mais distincte : doit quand même être un hit
        let second = cache
            .get_or_process(&processor, &balances.clone(), &prices.clone())
            .clone();

        assert_eq!(first, second);
        assert_eq!(cache.misses(), 1);
        assert_eq!(cache.hits(), 1);
    }

    #[test]
    fn test_miss_when_prices_change() {
        let processor = BalanceProcessor::new();
        let mut cache = ProcessedBalances::new();
        let balances = sample_balances();

        let mut prices: PriceTable = [("OSMO", 2.0)].into_iter().collect();
        let before = cache.get_or_process(&processor, &balances, &prices).balances[0].usd_value;
        assert_eq!(before, 10.0);

        prices.insert("OSMO", 3.0);
        let after = cache.get_or_process(&processor, &balances, &prices).balances[0].usd_value;
        assert_eq!(after, 15.0);
        assert_eq!(cache.misses(), 2);
    }

    #[test]
    fn test_miss_when_balances_change() {
        let processor = BalanceProcessor::new();
        let mut cache = ProcessedBalances::new();
        let prices = PriceTable::new();

        let mut balances = sample_balances();
        assert_eq!(cache.get_or_process(&processor, &balances, &prices).balances.len(), 2);

        balances.push(WalletBalance::new("ARB", 4.0, "Arbitrum"));
        assert_eq!(cache.get_or_process(&processor, &balances, &prices).balances.len(), 3);
        assert_eq!(cache.misses(), 2);
        assert_eq!(cache.hits(), 0);
    }

    #[test]
    fn test_miss_when_processor_changes() {
        let mut cache = ProcessedBalances::new();
        let balances = vec![
            WalletBalance::new("OSMO", 5.0, "Osmosis"),
            WalletBalance::new("ATOM", 2.0, "Cosmos"),
        ];
        let prices = PriceTable::new();

        let default = BalanceProcessor::new();
        assert_eq!(cache.get_or_process(&default, &balances, &prices).balances.len(), 1);

        // Mêmes entrées, table de priorités différente : pas de rapport périmé
        let cosmos = BalanceProcessor::with_config(
            PriorityTable::with_overrides([("Cosmos".to_string(), 200)]),
            UnknownChainPolicy::Drop,
        );
        let report = cache.get_or_process(&cosmos, &balances, &prices);
        assert_eq!(report.balances.len(), 2);
        assert_eq!(report.balances[0].currency(), "ATOM");

        // Même table, politique différente
        let warn = BalanceProcessor::with_config(PriorityTable::default(), UnknownChainPolicy::Warn);
        assert!(cache.get_or_process(&warn, &balances, &prices).has_data_quality_warning());

        assert_eq!(cache.misses(), 3);
        assert_eq!(cache.hits(), 0);

        cache.get_or_process(&warn, &balances, &prices);
        assert_eq!(cache.hits(), 1);
    }
}
