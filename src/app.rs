// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état global de la page wallet
//
// CONCEPTS RUST :
// 1. State Management : centraliser l'état dans une seule structure
// 2. Mutabilité contrôlée : &mut self pour modifier l'état
// 3. Dérivation : la liste affichée est recalculée à partir des données brutes
//
// PATTERN : Cette structure suit le pattern "Application State"
// - Tous les composants de l'UI lisent depuis App
// - Toutes les modifications passent par les méthodes de App
// ============================================================================

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::cache::ProcessedBalances;
use crate::models::{FormattedWalletBalance, PriceTable, WalletBalance};
use crate::processor::{BalanceProcessor, ProcessReport};

/// Message affiché pendant un rechargement
const REFRESH_MESSAGE: &str = "Rechargement des soldes et des prix...";

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Index de la ligne sélectionnée
    pub selected_index: usize,

    /// Devise sélectionnée (clé stable de la ligne)
    ///
    /// CONCEPT : Sélection par clé, pas par position
    /// - Quand la liste est réordonnée, la sélection suit la devise
    pub selected_currency: Option<String>,

    /// Two-step quit : première pression de 'q' = confirmation demandée
    pub confirm_quit: bool,

    /// Indique si des données sont en cours de chargement
    pub is_loading: bool,

    /// Message de chargement optionnel
    pub loading_message: Option<String>,

    /// Dernière erreur de récupération (affichée dans le footer)
    pub last_error: Option<String>,

    /// Date de la dernière mise à jour réussie
    pub last_updated: Option<DateTime<Utc>>,

    processor: BalanceProcessor,
    balances: Vec<WalletBalance>,
    prices: PriceTable,
    cache: ProcessedBalances,
    report: ProcessReport,

    /// Période de rafraîchissement automatique (None = désactivé)
    refresh_every: Option<Duration>,
    last_refresh: Instant,
}

impl App {
    /// Crée une App vide avec le processor par défaut
    pub fn new() -> Self {
        Self::with_processor(BalanceProcessor::default())
    }

    /// Crée une App avec un processor configuré
    pub fn with_processor(processor: BalanceProcessor) -> Self {
        Self {
            running: true,
            selected_index: 0,
            selected_currency: None,
            confirm_quit: false,
            is_loading: false,
            loading_message: None,
            last_error: None,
            last_updated: None,
            processor,
            balances: Vec::new(),
            prices: PriceTable::new(),
            cache: ProcessedBalances::new(),
            report: ProcessReport::default(),
            refresh_every: None,
            last_refresh: Instant::now(),
        }
    }

    /// Active le rafraîchissement automatique (0 = désactivé)
    pub fn with_refresh_secs(mut self, secs: u64) -> Self {
        self.refresh_every = (secs > 0).then(|| Duration::from_secs(secs));
        self
    }

    /// Quitte l'application
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Vérifie si l'application doit continuer
    pub fn is_running(&self) -> bool {
        self.running
    }

    // ========================================================================
    // Données
    // ========================================================================

    /// Remplace les soldes bruts et recalcule la liste
    pub fn set_balances(&mut self, balances: Vec<WalletBalance>) {
        self.balances = balances;
        self.recompute();
    }

    /// Remplace la table des prix et recalcule la liste
    pub fn set_prices(&mut self, prices: PriceTable) {
        self.prices = prices;
        self.recompute();
    }

    /// Applique un snapshot complet (soldes + prix) reçu du worker
    pub fn apply_snapshot(&mut self, balances: Vec<WalletBalance>, prices: PriceTable) {
        self.balances = balances;
        self.prices = prices;
        self.last_error = None;
        self.last_updated = Some(Utc::now());
        self.recompute();
    }

    /// Enregistre une erreur de récupération
    ///
    /// Les données précédentes restent affichées.
    pub fn record_error(&mut self, error: String) {
        self.last_error = Some(error);
    }

    /// Recalcule la liste affichée (via le cache) et restaure la sélection
    fn recompute(&mut self) {
        self.report = self
            .cache
            .get_or_process(&self.processor, &self.balances, &self.prices)
            .clone();
        self.restore_selection();
    }

    /// Replace la sélection sur la même devise après un recalcul
    fn restore_selection(&mut self) {
        let rows = &self.report.balances;

        let index = self
            .selected_currency
            .as_deref()
            .and_then(|currency| rows.iter().position(|row| row.currency() == currency));

        self.selected_index = match index {
            Some(index) => index,
            None => self.selected_index.min(rows.len().saturating_sub(1)),
        };

        self.selected_currency = rows
            .get(self.selected_index)
            .map(|row| row.currency().to_string());

        debug!(
            selected_index = self.selected_index,
            selected_currency = ?self.selected_currency,
            "Selection restored"
        );
    }

    /// Lignes à afficher (filtrées, triées, formatées)
    pub fn rows(&self) -> &[FormattedWalletBalance] {
        &self.report.balances
    }

    /// Dernier rapport du pipeline
    pub fn report(&self) -> &ProcessReport {
        &self.report
    }

    pub fn cache(&self) -> &ProcessedBalances {
        &self.cache
    }

    /// Valeur totale du wallet en USD
    pub fn total_usd(&self) -> f64 {
        self.rows().iter().map(|row| row.usd_value).sum()
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Navigue vers le haut
    ///
    /// CONCEPT RUST : Saturating arithmetic
    /// - saturating_sub() ne descend pas en dessous de 0
    pub fn navigate_up(&mut self) {
        self.select(self.selected_index.saturating_sub(1));
    }

    /// Navigue vers le bas
    pub fn navigate_down(&mut self) {
        let max_index = self.rows().len().saturating_sub(1);
        self.select((self.selected_index + 1).min(max_index));
    }

    fn select(&mut self, index: usize) {
        self.selected_index = index;
        self.selected_currency = self.rows().get(index).map(|row| row.currency().to_string());
    }

    /// Ligne sélectionnée
    pub fn selected_row(&self) -> Option<&FormattedWalletBalance> {
        self.rows().get(self.selected_index)
    }

    // ========================================================================
    // Rafraîchissement
    // ========================================================================

    /// Tick : appelé à chaque itération de la boucle
    ///
    /// Retourne true si un rafraîchissement automatique est dû.
    pub fn tick(&mut self) -> bool {
        match self.refresh_every {
            Some(period) if !self.is_loading && self.last_refresh.elapsed() >= period => {
                self.last_refresh = Instant::now();
                true
            }
            _ => false,
        }
    }

    /// Réserve un rafraîchissement (manuel ou auto)
    ///
    /// Retourne false si un chargement est déjà en cours. Sinon passe en
    /// chargement avant l'envoi de la commande au worker : un deuxième appui
    /// sur 'r' avant que le worker ne démarre est ignoré.
    pub fn begin_refresh(&mut self) -> bool {
        if self.is_loading {
            return false;
        }

        self.start_loading(Some(REFRESH_MESSAGE.to_string()));
        self.last_refresh = Instant::now();
        true
    }

    /// Demande la confirmation de quitter
    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    /// Annule la demande de quit
    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    /// Démarre le chargement avec un message optionnel
    pub fn start_loading(&mut self, message: Option<String>) {
        self.is_loading = true;
        self.loading_message = message;
    }

    /// Termine le chargement
    pub fn stop_loading(&mut self) {
        self.is_loading = false;
        self.loading_message = None;
    }

    pub fn is_loading_data(&self) -> bool {
        self.is_loading
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
