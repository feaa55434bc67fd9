// ============================================================================
// Module : processor
// ============================================================================
// Pipeline de traitement des soldes : filtre -> tri -> formatage
//
// Entrées : soldes bruts + table des prix
// Sortie  : liste prête pour l'affichage, triée par priorité décroissante
//
// CONCEPTS RUST :
// 1. Fonction pure : pas d'I/O, pas d'état partagé, ne peut pas échouer
// 2. Tri stable : sort_by conserve l'ordre relatif des égalités
// 3. Result<_, Rejection> : une seule règle de validité, qui dit aussi pourquoi
// ============================================================================

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::{
    FormattedWalletBalance, PriceTable, PriorityTable, WalletBalance, SENTINEL_PRIORITY,
};

/// Comportement face à une blockchain absente de la table de priorités
///
/// Dans les deux cas le solde est retiré de la sortie ; seule la
/// visibilité côté opérateur change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownChainPolicy {
    /// Retrait silencieux (log debug)
    #[default]
    Drop,

    /// Retrait signalé (log warn + compteur affiché dans l'UI)
    Warn,
}

/// Compteurs des soldes écartés par le filtre
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipCounts {
    /// Blockchain inconnue (priorité <= sentinelle)
    pub unknown_chain: usize,

    /// Montant nul, négatif ou non fini
    pub non_positive: usize,
}

impl SkipCounts {
    pub fn total(&self) -> usize {
        self.unknown_chain + self.non_positive
    }
}

/// Résultat complet d'un passage du pipeline
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessReport {
    /// Soldes retenus, triés et formatés
    pub balances: Vec<FormattedWalletBalance>,

    /// Soldes écartés
    pub skipped: SkipCounts,

    /// Politique appliquée (pour savoir si on doit signaler les tags inconnus)
    pub policy: UnknownChainPolicy,
}

impl ProcessReport {
    /// Vrai si des tags inconnus doivent être signalés à l'utilisateur
    pub fn has_data_quality_warning(&self) -> bool {
        self.policy == UnknownChainPolicy::Warn && self.skipped.unknown_chain > 0
    }
}

/// Pipeline de traitement des soldes
///
/// CONCEPT RUST : Struct sans état mutable
/// - Toutes les méthodes prennent &self
/// - Peut être partagé entre threads sans verrou
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BalanceProcessor {
    priorities: PriorityTable,
    policy: UnknownChainPolicy,
}

impl BalanceProcessor {
    /// Crée un processor avec la table par défaut et la politique Drop
    pub fn new() -> Self {
        Self::default()
    }

    /// Crée un processor avec une table et une politique données
    pub fn with_config(priorities: PriorityTable, policy: UnknownChainPolicy) -> Self {
        Self { priorities, policy }
    }

    /// Priorité d'une blockchain (sentinelle si inconnue)
    pub fn priority(&self, blockchain: &str) -> i32 {
        self.priorities.priority(blockchain)
    }

    /// Un solde est valide si sa blockchain est connue ET son montant strictement positif
    pub fn is_valid_balance(&self, balance: &WalletBalance) -> bool {
        self.check(balance).is_ok()
    }

    /// Règle de validité, avec la raison du rejet
    fn check(&self, balance: &WalletBalance) -> Result<(), Rejection> {
        if self.priority(&balance.blockchain) <= SENTINEL_PRIORITY {
            return Err(Rejection::UnknownChain);
        }
        if !is_positive_amount(balance.amount) {
            return Err(Rejection::NonPositiveAmount);
        }
        Ok(())
    }

    /// Compare deux soldes par priorité décroissante
    ///
    /// Retourne Ordering::Equal pour deux priorités égales : combiné à un
    /// tri stable, l'ordre d'entrée est conservé.
    pub fn compare_priority(&self, a: &WalletBalance, b: &WalletBalance) -> Ordering {
        self.priority(&b.blockchain).cmp(&self.priority(&a.blockchain))
    }

    /// Exécute le pipeline et retourne uniquement la liste formatée
    pub fn process(
        &self,
        balances: &[WalletBalance],
        prices: &PriceTable,
    ) -> Vec<FormattedWalletBalance> {
        self.process_with_report(balances, prices).balances
    }

    /// Exécute le pipeline et retourne la liste + les compteurs de rejets
    ///
    /// Étapes :
    /// 1. Lookup de priorité pour chaque solde
    /// 2. Filtre : priorité > sentinelle ET montant > 0
    /// 3. Tri stable par priorité décroissante
    /// 4. Formatage : texte à 2 décimales + valeur USD
    pub fn process_with_report(
        &self,
        balances: &[WalletBalance],
        prices: &PriceTable,
    ) -> ProcessReport {
        let mut skipped = SkipCounts::default();

        let mut retained: Vec<&WalletBalance> = Vec::with_capacity(balances.len());

        for balance in balances {
            match self.check(balance) {
                Ok(()) => retained.push(balance),
                Err(Rejection::UnknownChain) => {
                    skipped.unknown_chain += 1;
                    match self.policy {
                        UnknownChainPolicy::Drop => debug!(
                            currency = %balance.currency,
                            blockchain = %balance.blockchain,
                            "Dropping balance with unknown blockchain"
                        ),
                        UnknownChainPolicy::Warn => warn!(
                            currency = %balance.currency,
                            blockchain = %balance.blockchain,
                            "Balance has an unknown blockchain tag, dropping it"
                        ),
                    }
                }
                Err(Rejection::NonPositiveAmount) => skipped.non_positive += 1,
            }
        }

        // sort_by est stable : les priorités égales gardent l'ordre d'entrée
        retained.sort_by(|a, b| self.compare_priority(a, b));

        let balances: Vec<FormattedWalletBalance> = retained
            .into_iter()
            .map(|balance| {
                let unit_price = prices.price_or_zero(&balance.currency);
                FormattedWalletBalance::from_balance(balance.clone(), unit_price)
            })
            .collect();

        debug!(
            retained = balances.len(),
            unknown_chain = skipped.unknown_chain,
            non_positive = skipped.non_positive,
            "Processed wallet balances"
        );

        ProcessReport {
            balances,
            skipped,
            policy: self.policy,
        }
    }
}

/// Raison d'un rejet par le filtre
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    UnknownChain,
    NonPositiveAmount,
}

/// Exécute le pipeline avec la table de priorités par défaut
pub fn process(balances: &[WalletBalance], prices: &PriceTable) -> Vec<FormattedWalletBalance> {
    BalanceProcessor::default().process(balances, prices)
}

/// Montant strictement positif et fini (NaN et infini sont rejetés)
fn is_positive_amount(amount: f64) -> bool {
    amount.is_finite() && amount > 0.0
}

// ============================================================================
// Tests unitaires
// ============================================================================
