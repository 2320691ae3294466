// ============================================================================
// Structure : MarketSnapshot
// ============================================================================
// Un snapshot = un batch de CoinRecord tel que fetché depuis CoinGecko,
// traité comme une unité immuable le temps d'une passe d'agrégation
// et des cycles de rendu, puis remplacé par le fetch suivant
//
// CONCEPTS RUST :
// 1. Vec<&T> : vues empruntées - les classements retournent des références
//    vers les records du snapshot, jamais des copies, jamais de mutation
// 2. sort_by : tri STABLE de la stdlib - deux coins à égalité gardent
//    leur ordre d'arrivée dans le snapshot
// 3. f64::total_cmp : ordre total sur les flottants - pas de unwrap()
//    sur partial_cmp, pas de panique possible même sur des valeurs
//    hors limites
// ============================================================================

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::CoinRecord;

/// Taille maximale des classements (top hausses, baisses, volume, cap)
pub const LEADERBOARD_SIZE: usize = 8;

/// Ordre d'affichage de la liste complète des marchés
///
/// CONCEPT : Cycle d'états (comme un sélecteur de colonne de tri)
/// - MarketCap → Volume → Change → MarketCap
/// - Piloté au clavier avec h/l sur l'écran Marchés
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketOrdering {
    /// Par capitalisation décroissante (ordre "naturel" du marché)
    MarketCap,
    /// Par volume 24h décroissant
    Volume,
    /// Par variation 24h décroissante
    Change,
}

impl MarketOrdering {
    /// Retourne le label court pour l'affichage
    pub fn label(&self) -> &'static str {
        match self {
            MarketOrdering::MarketCap => "cap",
            MarketOrdering::Volume => "volume",
            MarketOrdering::Change => "var 24h",
        }
    }

    /// Retourne l'ordre suivant (cycle)
    pub fn next(&self) -> MarketOrdering {
        match self {
            MarketOrdering::MarketCap => MarketOrdering::Volume,
            MarketOrdering::Volume => MarketOrdering::Change,
            MarketOrdering::Change => MarketOrdering::MarketCap, // Boucle
        }
    }

    /// Retourne l'ordre précédent (cycle)
    pub fn previous(&self) -> MarketOrdering {
        match self {
            MarketOrdering::MarketCap => MarketOrdering::Change, // Boucle
            MarketOrdering::Volume => MarketOrdering::MarketCap,
            MarketOrdering::Change => MarketOrdering::Volume,
        }
    }
}

impl Default for MarketOrdering {
    /// Ordre par défaut : capitalisation (celui de l'API CoinGecko)
    fn default() -> Self {
        MarketOrdering::MarketCap
    }
}

/// Un batch de coins fetché en une fois
///
/// Invariant : `coins` est une séquence ordonnée d'ids uniques.
/// L'unicité est garantie par le constructeur from_records() ;
/// l'ordre d'arrivée est significatif (il départage les égalités de tri).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Devise de référence des prix (ex: "usd")
    pub vs_currency: String,

    /// Horodatage du fetch (affichage uniquement)
    pub fetched_at: DateTime<Utc>,

    /// Les records, dans l'ordre renvoyé par l'API
    pub coins: Vec<CoinRecord>,
}

impl MarketSnapshot {
    /// Crée un snapshot vide (état de départ avant le premier fetch réussi)
    pub fn empty(vs_currency: String) -> Self {
        Self {
            vs_currency,
            fetched_at: Utc::now(),
            coins: Vec::new(),
        }
    }

    /// Construit un snapshot en garantissant l'unicité des ids
    ///
    /// CONCEPT RUST : HashSet::insert retourne false si la valeur existait
    /// - On s'en sert comme filtre : seule la PREMIÈRE occurrence d'un id
    ///   est conservée, les doublons sont silencieusement écartés
    /// - La couche API compare les longueurs avant/après pour signaler
    ///   combien de lignes ont été écartées
    pub fn from_records(vs_currency: String, records: Vec<CoinRecord>) -> Self {
        let mut seen: HashSet<String> = HashSet::with_capacity(records.len());
        let coins: Vec<CoinRecord> = records
            .into_iter()
            .filter(|coin| seen.insert(coin.id.clone()))
            .collect();

        Self {
            vs_currency,
            fetched_at: Utc::now(),
            coins,
        }
    }

    /// Retourne le nombre de coins du snapshot
    pub fn len(&self) -> usize {
        self.coins.len()
    }

    /// Vérifie si le snapshot est vide
    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }

    // ========================================================================
    // Classements (leaderboards)
    // ========================================================================
    // Chaque classement est une fonction pure du contenu et de l'ordre du
    // snapshot : filtre éventuel, tri stable, troncature à 8 entrées.
    // Le snapshot lui-même n'est jamais modifié (&self partout).
    // ========================================================================

    /// Top hausses 24h : variation strictement positive, plus forte d'abord
    ///
    /// CONCEPT RUST : tri sur Vec<&T>
    /// - On collecte des références, le tri réordonne les références
    /// - Les records sous-jacents ne bougent pas
    /// - sort_by est stable : deux coins à +5.0% gardent leur ordre d'arrivée
    pub fn top_gainers(&self) -> Vec<&CoinRecord> {
        let mut gainers: Vec<&CoinRecord> = self
            .coins
            .iter()
            .filter(|coin| coin.price_change_percent_24h > 0.0)
            .collect();

        gainers.sort_by(|a, b| {
            b.price_change_percent_24h
                .total_cmp(&a.price_change_percent_24h)
        });
        gainers.truncate(LEADERBOARD_SIZE);
        gainers
    }

    /// Top baisses 24h : variation strictement négative, plus forte baisse d'abord
    ///
    /// Note : tri CROISSANT ici (la variation la plus négative en tête)
    pub fn top_losers(&self) -> Vec<&CoinRecord> {
        let mut losers: Vec<&CoinRecord> = self
            .coins
            .iter()
            .filter(|coin| coin.price_change_percent_24h < 0.0)
            .collect();

        losers.sort_by(|a, b| {
            a.price_change_percent_24h
                .total_cmp(&b.price_change_percent_24h)
        });
        losers.truncate(LEADERBOARD_SIZE);
        losers
    }

    /// Top volume 24h : pas de filtre, volume décroissant
    pub fn top_by_volume(&self) -> Vec<&CoinRecord> {
        let mut coins: Vec<&CoinRecord> = self.coins.iter().collect();
        coins.sort_by(|a, b| b.total_volume_24h.total_cmp(&a.total_volume_24h));
        coins.truncate(LEADERBOARD_SIZE);
        coins
    }

    /// Top capitalisation : pas de filtre, cap décroissante
    pub fn top_by_market_cap(&self) -> Vec<&CoinRecord> {
        let mut coins: Vec<&CoinRecord> = self.coins.iter().collect();
        coins.sort_by(|a, b| b.market_cap.total_cmp(&a.market_cap));
        coins.truncate(LEADERBOARD_SIZE);
        coins
    }

    /// Liste complète re-triée pour l'écran Marchés (aucune troncature)
    ///
    /// Mêmes règles que les classements : tri stable, snapshot intact
    pub fn ordered_by(&self, ordering: MarketOrdering) -> Vec<&CoinRecord> {
        let mut coins: Vec<&CoinRecord> = self.coins.iter().collect();
        match ordering {
            MarketOrdering::MarketCap => {
                coins.sort_by(|a, b| b.market_cap.total_cmp(&a.market_cap));
            }
            MarketOrdering::Volume => {
                coins.sort_by(|a, b| b.total_volume_24h.total_cmp(&a.total_volume_24h));
            }
            MarketOrdering::Change => {
                coins.sort_by(|a, b| {
                    b.price_change_percent_24h
                        .total_cmp(&a.price_change_percent_24h)
                });
            }
        }
        coins
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Construit un record de test (prix fixe, champs de classement paramétrés)
    fn coin(id: &str, change: f64, volume: f64, cap: f64) -> CoinRecord {
        CoinRecord::new(
            id.to_string(),
            id.to_string(),
            id.to_string(),
            String::new(),
            1.0,
            change,
            volume,
            cap,
        )
    }

    fn snapshot(coins: Vec<CoinRecord>) -> MarketSnapshot {
        MarketSnapshot::from_records("usd".to_string(), coins)
    }

    #[test]
    fn test_top_gainers_filters_and_sorts() {
        // Scénario de référence : variations [+12, -2, +12, 0]
        let snap = snapshot(vec![
            coin("a", 12.0, 0.0, 0.0),
            coin("b", -2.0, 0.0, 0.0),
            coin("c", 12.0, 0.0, 0.0),
            coin("d", 0.0, 0.0, 0.0),
        ]);

        let gainers = snap.top_gainers();

        // Seules les deux hausses à +12, dans leur ordre d'arrivée (stabilité)
        assert_eq!(gainers.len(), 2);
        assert_eq!(gainers[0].id, "a");
        assert_eq!(gainers[1].id, "c");
        assert!(gainers.iter().all(|c| c.price_change_percent_24h > 0.0));
    }

    #[test]
    fn test_top_gainers_descending() {
        let snap = snapshot(vec![
            coin("a", 1.5, 0.0, 0.0),
            coin("b", 8.0, 0.0, 0.0),
            coin("c", 3.2, 0.0, 0.0),
        ]);

        let gainers = snap.top_gainers();

        // Plus forte hausse d'abord
        assert_eq!(gainers.len(), 3);
        assert_eq!(gainers[0].id, "b");
        assert_eq!(gainers[1].id, "c");
        assert_eq!(gainers[2].id, "a");
    }

    #[test]
    fn test_top_losers_ascending() {
        let snap = snapshot(vec![
            coin("a", -1.0, 0.0, 0.0),
            coin("b", -8.5, 0.0, 0.0),
            coin("c", 3.0, 0.0, 0.0),
            coin("d", -4.2, 0.0, 0.0),
        ]);

        let losers = snap.top_losers();

        // Plus forte baisse d'abord
        assert_eq!(losers.len(), 3);
        assert_eq!(losers[0].id, "b");
        assert_eq!(losers[1].id, "d");
        assert_eq!(losers[2].id, "a");
        assert!(losers.iter().all(|c| c.price_change_percent_24h < 0.0));
    }

    #[test]
    fn test_leaderboards_capped_at_8() {
        // 12 hausses : seules les 8 premières doivent rester
        let coins: Vec<CoinRecord> = (0..12)
            .map(|i| coin(&format!("c{}", i), 1.0 + i as f64, i as f64, i as f64))
            .collect();
        let snap = snapshot(coins);

        assert_eq!(snap.top_gainers().len(), LEADERBOARD_SIZE);
        assert_eq!(snap.top_by_volume().len(), LEADERBOARD_SIZE);
        assert_eq!(snap.top_by_market_cap().len(), LEADERBOARD_SIZE);
    }

    #[test]
    fn test_all_tied_keeps_input_order() {
        // 10 coins tous à +5% : le top doit être les 8 premiers, dans l'ordre
        let coins: Vec<CoinRecord> = (0..10)
            .map(|i| coin(&format!("c{}", i), 5.0, 0.0, 0.0))
            .collect();
        let snap = snapshot(coins);

        let gainers = snap.top_gainers();
        assert_eq!(gainers.len(), 8);
        for (i, c) in gainers.iter().enumerate() {
            assert_eq!(c.id, format!("c{}", i));
        }
    }

    #[test]
    fn test_top_by_volume_descending() {
        let snap = snapshot(vec![
            coin("a", 0.0, 100.0, 0.0),
            coin("b", 0.0, 900.0, 0.0),
            coin("c", 0.0, 500.0, 0.0),
        ]);

        let top = snap.top_by_volume();
        assert_eq!(top[0].id, "b");
        assert_eq!(top[1].id, "c");
        assert_eq!(top[2].id, "a");
    }

    #[test]
    fn test_top_by_market_cap_descending() {
        let snap = snapshot(vec![
            coin("a", 0.0, 0.0, 50.0),
            coin("b", 0.0, 0.0, 10.0),
            coin("c", 0.0, 0.0, 99.0),
        ]);

        let top = snap.top_by_market_cap();
        assert_eq!(top[0].id, "c");
        assert_eq!(top[1].id, "a");
        assert_eq!(top[2].id, "b");
    }

    #[test]
    fn test_empty_snapshot_gives_empty_leaderboards() {
        let snap = MarketSnapshot::empty("usd".to_string());

        assert!(snap.top_gainers().is_empty());
        assert!(snap.top_losers().is_empty());
        assert!(snap.top_by_volume().is_empty());
        assert!(snap.top_by_market_cap().is_empty());
        assert!(snap.ordered_by(MarketOrdering::Volume).is_empty());
    }

    #[test]
    fn test_snapshot_never_mutated() {
        let snap = snapshot(vec![
            coin("a", -5.0, 10.0, 1.0),
            coin("b", 7.0, 5.0, 9.0),
            coin("c", 1.0, 99.0, 4.0),
        ]);

        // On appelle tous les classements...
        let _ = snap.top_gainers();
        let _ = snap.top_losers();
        let _ = snap.top_by_volume();
        let _ = snap.top_by_market_cap();
        let _ = snap.ordered_by(MarketOrdering::Change);

        // ...et l'ordre d'origine du snapshot n'a pas bougé
        let ids: Vec<&str> = snap.coins.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_leaderboards_idempotent() {
        // Fonctions pures : deux appels sur le même snapshot = même résultat,
        // pour chacun des classements et pour la liste re-triée
        let snap = snapshot(vec![
            coin("a", 3.0, 10.0, 1.0),
            coin("b", 3.0, 5.0, 9.0),
            coin("c", -1.0, 99.0, 4.0),
        ]);

        assert_eq!(snap.top_gainers(), snap.top_gainers());
        assert_eq!(snap.top_losers(), snap.top_losers());
        assert_eq!(snap.top_by_volume(), snap.top_by_volume());
        assert_eq!(snap.top_by_market_cap(), snap.top_by_market_cap());
        assert_eq!(
            snap.ordered_by(MarketOrdering::Change),
            snap.ordered_by(MarketOrdering::Change)
        );
    }

    #[test]
    fn test_duplicate_ids_dropped() {
        // Deux lignes "bitcoin" : seule la première doit survivre
        let snap = snapshot(vec![
            coin("bitcoin", 1.0, 10.0, 100.0),
            coin("ethereum", 2.0, 20.0, 50.0),
            coin("bitcoin", 9.0, 99.0, 999.0),
        ]);

        assert_eq!(snap.len(), 2);
        assert_eq!(snap.coins[0].id, "bitcoin");
        assert_eq!(snap.coins[0].price_change_percent_24h, 1.0); // la première
        assert_eq!(snap.coins[1].id, "ethereum");
    }

    #[test]
    fn test_ordered_by_change_full_list() {
        let snap = snapshot(vec![
            coin("a", -5.0, 0.0, 0.0),
            coin("b", 7.0, 0.0, 0.0),
            coin("c", 1.0, 0.0, 0.0),
        ]);

        let ordered = snap.ordered_by(MarketOrdering::Change);
        // Pas de troncature ni de filtre : les 3 coins, variation décroissante
        assert_eq!(ordered.len(), 3);
        assert_eq!(ordered[0].id, "b");
        assert_eq!(ordered[1].id, "c");
        assert_eq!(ordered[2].id, "a");
    }

    #[test]
    fn test_ordering_cycle() {
        assert_eq!(MarketOrdering::MarketCap.next(), MarketOrdering::Volume);
        assert_eq!(MarketOrdering::Change.next(), MarketOrdering::MarketCap); // Boucle
        assert_eq!(MarketOrdering::MarketCap.previous(), MarketOrdering::Change); // Boucle
        assert_eq!(MarketOrdering::Volume.previous(), MarketOrdering::MarketCap);
    }
}
