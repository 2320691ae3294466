// ============================================================================
// Module : ui
// ============================================================================
// Gère toute l'interface utilisateur (Terminal User Interface)
// ============================================================================

pub mod events;    // Gestion des événements clavier
pub mod dashboard; // Routing des écrans + vue d'ensemble du marché
pub mod histogram; // Rendu de la répartition des variations (barres Unicode)
pub mod markets;   // Rendu de la liste complète des marchés

// Re-exports pour simplifier les imports
pub use events::{Event, EventHandler};
pub use dashboard::render;
