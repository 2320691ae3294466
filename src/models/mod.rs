// ============================================================================
// Module : models
// ============================================================================
// Ce module contient toutes les structures de données de l'application
//
// CONCEPT RUST : Modules et visibilité
// - "pub mod" : déclare un sous-module publique (accessible depuis l'extérieur)
// - Sans "pub", le module serait privé au crate
// ============================================================================

pub mod coin;         // Déclaration du module coin (fichier coin.rs)
pub mod snapshot;     // Déclaration du module snapshot (fichier snapshot.rs)
pub mod distribution; // Déclaration du module distribution (fichier distribution.rs)

// Re-export des structures principales pour simplifier les imports
// Au lieu de : use mccoin::models::coin::CoinRecord;
// On peut faire : use mccoin::models::CoinRecord;
pub use coin::CoinRecord;
pub use snapshot::{MarketOrdering, MarketSnapshot, LEADERBOARD_SIZE};
pub use distribution::{ChangeHistogram, OrderRatio, BUCKET_COUNT, BUCKET_LABELS};
