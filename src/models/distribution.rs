// ============================================================================
// Structures : ChangeHistogram et OrderRatio
// ============================================================================
// Les deux agrégats "globaux" du tableau de bord :
// - ChangeHistogram : répartition des variations 24h en 10 tranches fixes
// - OrderRatio : pourcentage de coins en hausse vs en baisse-ou-stable
//
// CONCEPTS RUST :
// 1. [usize; N] : tableau de taille fixe sur la pile - la forme de
//    l'histogramme est connue à la compilation, pas besoin de Vec
// 2. Option<OrderRatio> : un snapshot vide ne produit PAS un ratio 0/0
//    déguisé en valeurs - l'absence est explicite, l'appelant décide
//    quoi afficher
// 3. Iterator::position : premier index qui satisfait le prédicat -
//    exactement la règle "première tranche atteinte"
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::models::MarketSnapshot;

/// Nombre de tranches de l'histogramme des variations
pub const BUCKET_COUNT: usize = 10;

/// Seuils planchers des 9 premières tranches, du plus haut au plus bas
///
/// Une variation tombe dans la PREMIÈRE tranche dont elle atteint le
/// plancher ; si aucun plancher n'est atteint elle tombe dans la
/// dernière tranche (< -9%). Chaque valeur a donc exactement une tranche.
const BUCKET_FLOORS: [f64; BUCKET_COUNT - 1] = [9.0, 7.0, 5.0, 3.0, 0.0, -3.0, -5.0, -7.0, -9.0];

/// Labels d'affichage des tranches, alignés sur BUCKET_FLOORS
pub const BUCKET_LABELS: [&str; BUCKET_COUNT] = [
    "≥ +9%", "≥ +7%", "≥ +5%", "≥ +3%", "≥  0%", "≥ -3%", "≥ -5%", "≥ -7%", "≥ -9%", "< -9%",
];

/// Retourne l'index de la tranche d'une variation 24h
///
/// Valeurs non finies : les comparaisons avec NaN sont toutes fausses,
/// donc NaN tomberait dans la dernière tranche - mais la couche API
/// normalise déjà ces valeurs à 0.0 avant d'arriver ici
fn bucket_index(change: f64) -> usize {
    BUCKET_FLOORS
        .iter()
        .position(|&floor| change >= floor)
        .unwrap_or(BUCKET_COUNT - 1)
}

/// Répartition des variations 24h d'un snapshot en 10 tranches
///
/// Invariant : la somme des tranches vaut exactement le nombre de coins
/// du snapshot (chaque coin compte une fois, dans une seule tranche)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeHistogram {
    /// Compteurs par tranche, index 0 = "≥ +9%", index 9 = "< -9%"
    pub buckets: [usize; BUCKET_COUNT],
}

impl ChangeHistogram {
    /// Calcule l'histogramme d'un snapshot (fonction pure, snapshot intact)
    pub fn from_snapshot(snapshot: &MarketSnapshot) -> Self {
        let mut buckets = [0usize; BUCKET_COUNT];
        for coin in &snapshot.coins {
            buckets[bucket_index(coin.price_change_percent_24h)] += 1;
        }
        Self { buckets }
    }

    /// Retourne le nombre total de coins comptés
    pub fn total(&self) -> usize {
        self.buckets.iter().sum()
    }

    /// Coins dans les tranches hautes (variation >= 0%, index 0 à 4)
    pub fn up_count(&self) -> usize {
        self.buckets[..5].iter().sum()
    }

    /// Coins dans les tranches basses (variation < 0%, index 5 à 9)
    pub fn down_count(&self) -> usize {
        self.buckets[5..].iter().sum()
    }

    /// Retourne le compteur le plus élevé (pour l'échelle des barres)
    pub fn max_count(&self) -> usize {
        self.buckets.iter().copied().max().unwrap_or(0)
    }
}

/// Ratio hausse/baisse d'un snapshot, en pourcentages
///
/// Convention : seule une variation STRICTEMENT positive compte comme
/// "achat" ; une variation nulle compte côté "vente". Les deux champs
/// somment à 100 (à l'arrondi flottant près).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderRatio {
    /// Part des coins en hausse (variation > 0), en %
    pub buy_percent: f64,
    /// Part des coins en baisse ou stables, en %
    pub sell_percent: f64,
}

impl OrderRatio {
    /// Calcule le ratio d'un snapshot, ou None si le snapshot est vide
    ///
    /// CONCEPT RUST : Option plutôt qu'une division par zéro ou un faux
    /// 50/50 - le cas dégénéré remonte à l'appelant tel quel
    pub fn from_snapshot(snapshot: &MarketSnapshot) -> Option<Self> {
        if snapshot.is_empty() {
            return None;
        }

        let total = snapshot.len() as f64;
        let rising = snapshot
            .coins
            .iter()
            .filter(|coin| coin.price_change_percent_24h > 0.0)
            .count() as f64;

        Some(Self {
            buy_percent: 100.0 * rising / total,
            sell_percent: 100.0 * (total - rising) / total,
        })
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CoinRecord;

    /// Snapshot de test : seuls les pourcentages de variation importent ici
    fn snapshot_with_changes(changes: &[f64]) -> MarketSnapshot {
        let coins: Vec<CoinRecord> = changes
            .iter()
            .enumerate()
            .map(|(i, &change)| {
                CoinRecord::new(
                    format!("coin{}", i),
                    format!("c{}", i),
                    format!("Coin {}", i),
                    String::new(),
                    1.0,
                    change,
                    0.0,
                    0.0,
                )
            })
            .collect();
        MarketSnapshot::from_records("usd".to_string(), coins)
    }

    #[test]
    fn test_histogram_concrete_scenario() {
        // [+12, -2, +12, 0] → tranche 0 : 2, tranche 4 : 1 (le zéro),
        // tranche 5 : 1 (le -2, qui atteint le plancher -3)
        let snap = snapshot_with_changes(&[12.0, -2.0, 12.0, 0.0]);
        let histogram = ChangeHistogram::from_snapshot(&snap);

        assert_eq!(histogram.buckets[0], 2);
        assert_eq!(histogram.buckets[4], 1);
        assert_eq!(histogram.buckets[5], 1);
        assert_eq!(histogram.total(), 4);
        // Toutes les autres tranches restent vides
        for (i, &count) in histogram.buckets.iter().enumerate() {
            if ![0, 4, 5].contains(&i) {
                assert_eq!(count, 0, "tranche {} devrait être vide", i);
            }
        }
    }

    #[test]
    fn test_histogram_totals_match_snapshot_len() {
        let snap = snapshot_with_changes(&[15.0, 8.0, 6.0, 4.0, 2.0, -1.0, -4.0, -6.0, -8.0, -20.0]);
        let histogram = ChangeHistogram::from_snapshot(&snap);

        // Chaque coin compte une fois : somme des tranches == taille du snapshot
        assert_eq!(histogram.total(), snap.len());
        assert_eq!(histogram.buckets, [1, 1, 1, 1, 1, 1, 1, 1, 1, 1]);
    }

    #[test]
    fn test_bucket_boundaries() {
        // Valeur pile sur un plancher : la tranche de ce plancher
        assert_eq!(bucket_index(9.0), 0);
        assert_eq!(bucket_index(8.99), 1);
        assert_eq!(bucket_index(7.0), 1);
        assert_eq!(bucket_index(3.0), 3);
        assert_eq!(bucket_index(0.0), 4);
        assert_eq!(bucket_index(-0.01), 5);
        assert_eq!(bucket_index(-3.0), 5);
        assert_eq!(bucket_index(-3.5), 6);
        assert_eq!(bucket_index(-9.0), 8);
        assert_eq!(bucket_index(-9.01), 9);
        assert_eq!(bucket_index(-50.0), 9);
    }

    #[test]
    fn test_histogram_up_down_split() {
        let snap = snapshot_with_changes(&[10.0, 4.0, 0.0, -2.0, -12.0]);
        let histogram = ChangeHistogram::from_snapshot(&snap);

        // La variation nulle tombe dans la tranche "≥ 0%", côté haut
        assert_eq!(histogram.up_count(), 3);
        assert_eq!(histogram.down_count(), 2);
        assert_eq!(histogram.max_count(), 1);
    }

    #[test]
    fn test_empty_snapshot_histogram_is_all_zeros() {
        let snap = MarketSnapshot::empty("usd".to_string());
        let histogram = ChangeHistogram::from_snapshot(&snap);

        assert_eq!(histogram.buckets, [0; BUCKET_COUNT]);
        assert_eq!(histogram.total(), 0);
        assert_eq!(histogram.max_count(), 0);
    }

    #[test]
    fn test_order_ratio_counts_zero_as_sell() {
        // [+1, -1, -2, 0] : une seule hausse stricte sur quatre coins
        let snap = snapshot_with_changes(&[1.0, -1.0, -2.0, 0.0]);
        let ratio = OrderRatio::from_snapshot(&snap).unwrap();

        assert_eq!(ratio.buy_percent, 25.0);
        assert_eq!(ratio.sell_percent, 75.0);
    }

    #[test]
    fn test_order_ratio_all_rising() {
        let snap = snapshot_with_changes(&[0.5, 3.0, 12.0]);
        let ratio = OrderRatio::from_snapshot(&snap).unwrap();

        assert_eq!(ratio.buy_percent, 100.0);
        assert_eq!(ratio.sell_percent, 0.0);
    }

    #[test]
    fn test_order_ratio_sums_to_100() {
        let snap = snapshot_with_changes(&[2.0, -1.0, 0.0, 4.0, -9.0, 1.0, -0.1]);
        let ratio = OrderRatio::from_snapshot(&snap).unwrap();

        assert!((ratio.buy_percent + ratio.sell_percent - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_order_ratio_none_on_empty_snapshot() {
        let snap = MarketSnapshot::empty("usd".to_string());
        assert!(OrderRatio::from_snapshot(&snap).is_none());
    }

    #[test]
    fn test_distributions_idempotent() {
        // Constructeurs purs : deux appels sur le même snapshot = même résultat
        let snap = snapshot_with_changes(&[12.0, -2.0, 0.0, 4.5]);

        assert_eq!(
            ChangeHistogram::from_snapshot(&snap),
            ChangeHistogram::from_snapshot(&snap)
        );
        assert_eq!(
            OrderRatio::from_snapshot(&snap),
            OrderRatio::from_snapshot(&snap)
        );
    }

    #[test]
    fn test_bucket_labels_cover_all_buckets() {
        assert_eq!(BUCKET_LABELS.len(), BUCKET_COUNT);
    }
}
