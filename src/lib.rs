// ============================================================================
// McCoin - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

pub mod api;       // API CoinGecko
pub mod models;    // Structures de données et agrégats de marché
pub mod app;       // État de l'application
pub mod ui;        // Interface utilisateur
