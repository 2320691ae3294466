// ============================================================================
// Structure : CoinRecord
// ============================================================================
// Représente un actif coté (coin) dans un snapshot de marché CoinGecko
//
// CONCEPTS RUST :
// 1. #[derive(...)] : génère automatiquement l'implémentation de traits
//    - Debug : permet d'afficher la structure avec {:?}
//    - Clone : permet de dupliquer la valeur
//    - PartialEq : permet de comparer deux records avec ==
//
// 2. Immutabilité par convention :
//    - Un CoinRecord n'est jamais modifié après construction
//    - Il vit le temps d'un snapshot, puis est remplacé par le fetch suivant
//    - Les champs numériques sont déjà normalisés par la couche API
//      (valeur absente/invalide -> 0.0), voir api/coingecko.rs
// ============================================================================

use serde::{Deserialize, Serialize};

/// Un actif du marché dans un snapshot
///
/// Les champs reprennent ceux de l'endpoint /coins/markets de CoinGecko,
/// une fois normalisés (plus aucun Option ici : la coercition se fait
/// à la frontière, pas dans les fonctions de classement).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinRecord {
    /// Identifiant stable CoinGecko (ex: "bitcoin"), unique dans un snapshot
    pub id: String,

    /// Ticker court (ex: "btc") - CoinGecko le fournit en minuscules,
    /// la casse n'a d'importance que pour l'affichage
    pub symbol: String,

    /// Nom complet (ex: "Bitcoin")
    pub name: String,

    /// Référence opaque vers l'icône de l'actif (URL)
    /// Jamais interprétée par le cœur : on la transporte, c'est tout
    pub image: String,

    /// Prix actuel dans la devise de référence du snapshot (>= 0)
    pub current_price: f64,

    /// Variation sur 24h en points de pourcentage (signée, 0.0 si inconnue)
    pub price_change_percent_24h: f64,

    /// Volume échangé sur 24h (>= 0)
    pub total_volume_24h: f64,

    /// Capitalisation de marché (>= 0)
    pub market_cap: f64,
}

impl CoinRecord {
    /// Constructeur : crée un nouveau CoinRecord
    ///
    /// CONCEPT RUST : Ownership
    /// - Les paramètres String sont "moved" dans la fonction
    /// - Le CoinRecord devient le nouveau propriétaire de ces Strings
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: String,
        symbol: String,
        name: String,
        image: String,
        current_price: f64,
        price_change_percent_24h: f64,
        total_volume_24h: f64,
        market_cap: f64,
    ) -> Self {
        Self {
            id,
            symbol,
            name,
            image,
            current_price,
            price_change_percent_24h,
            total_volume_24h,
            market_cap,
        }
    }

    /// Ticker en majuscules pour l'affichage (ex: "btc" -> "BTC")
    pub fn display_symbol(&self) -> String {
        self.symbol.to_uppercase()
    }

    /// Retourne true si la variation 24h est positive ou nulle
    /// (utilisé uniquement pour choisir la couleur d'affichage ;
    /// le ratio achat/vente compte lui le zéro côté vente, voir distribution.rs)
    pub fn is_positive(&self) -> bool {
        self.price_change_percent_24h >= 0.0
    }

    /// Formatte le prix avec une précision adaptée à l'ordre de grandeur
    ///
    /// CONCEPT : Prix crypto très hétérogènes
    /// - BTC vaut des dizaines de milliers de dollars
    /// - Les memecoins valent des fractions de centime
    /// - Deux décimales pour tout le monde rendrait les petits prix illisibles
    pub fn formatted_price(&self) -> String {
        let price = self.current_price;
        if price >= 1.0 {
            format!("${:.2}", price)
        } else if price >= 0.01 {
            format!("${:.4}", price)
        } else if price > 0.0 {
            format!("${:.8}", price)
        } else {
            "$0.00".to_string()
        }
    }

    /// Formatte la variation 24h avec flèche
    ///
    /// Format : "▲ +2.11%" ou "▼ -1.40%"
    pub fn formatted_change(&self) -> String {
        let change = self.price_change_percent_24h;
        let arrow = if change >= 0.0 { "▲" } else { "▼" };
        format!("{} {:+.2}%", arrow, change)
    }

    /// Formatte le volume 24h en notation compacte (ex: "$12.34B")
    pub fn formatted_volume(&self) -> String {
        compact_usd(self.total_volume_24h)
    }

    /// Formatte la capitalisation en notation compacte (ex: "$1.32T")
    pub fn formatted_market_cap(&self) -> String {
        compact_usd(self.market_cap)
    }
}

/// Formatte un montant en dollars avec suffixe K/M/B/T
///
/// CONCEPT RUST : Fonction libre privée au module
/// - Pas de &self : ne dépend d'aucun état
/// - Partagée par formatted_volume() et formatted_market_cap()
fn compact_usd(value: f64) -> String {
    if value >= 1e12 {
        format!("${:.2}T", value / 1e12)
    } else if value >= 1e9 {
        format!("${:.2}B", value / 1e9)
    } else if value >= 1e6 {
        format!("${:.2}M", value / 1e6)
    } else if value >= 1e3 {
        format!("${:.2}K", value / 1e3)
    } else {
        format!("${:.0}", value)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
