// ============================================================================
// Module : models
// ============================================================================
// Ce module contient toutes les structures de données de l'application
// ============================================================================

pub mod balance;  // Soldes bruts et soldes formatés
pub mod price;    // Table des prix USD
pub mod priority; // Priorités des blockchains

// Re-export des structures principales pour simplifier les imports
// Au lieu de : use walletview::models::balance::WalletBalance;
// On peut faire : use walletview::models::WalletBalance;
pub use balance::{format_amount, format_usd, FormattedWalletBalance, WalletBalance};
pub use price::PriceTable;
pub use priority::{PriorityTable, DEFAULT_PRIORITIES, SENTINEL_PRIORITY};
