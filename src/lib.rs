// ============================================================================
// WalletView - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

pub mod api;       // Sources de soldes et de prix (HTTP, fichiers)
pub mod app;       // État de l'application
pub mod cache;     // Mémoïsation du pipeline
pub mod config;    // Configuration (fichier JSON + variables d'environnement)
pub mod models;    // Structures de données
pub mod processor; // Pipeline filtre -> tri -> formatage
pub mod ui;        // Interface utilisateur

pub use processor::{process, BalanceProcessor, ProcessReport, UnknownChainPolicy};
