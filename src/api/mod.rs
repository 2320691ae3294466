// ============================================================================
// Module : api
// ============================================================================
// Ce module contient les clients API pour récupérer les données de marché
// crypto depuis les sources externes (CoinGecko pour l'instant)
// ============================================================================

pub mod coingecko; // Client API CoinGecko

// Re-export des fonctions principales
pub use coingecko::{fetch_market_snapshot, DEFAULT_VS_CURRENCY};
