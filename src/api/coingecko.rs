// ============================================================================
// API Client : CoinGecko
// ============================================================================
// Récupère le marché crypto depuis l'endpoint /coins/markets de CoinGecko
//
// CONCEPTS RUST AVANCÉS :
// 1. async/await : programmation asynchrone (non-bloquante)
// 2. Result<T, E> : gestion d'erreurs avec contexte
// 3. Serde : désérialisation JSON automatique
// 4. Option<T> : tous les champs de l'API sont optionnels côté parsing,
//    la normalisation décide quoi faire des absents
// ============================================================================

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};

use crate::models::{CoinRecord, MarketSnapshot};

/// Base de l'API publique CoinGecko (v3)
const COINGECKO_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Devise de cotation par défaut
pub const DEFAULT_VS_CURRENCY: &str = "usd";

/// Nombre de coins par page (250 = maximum accepté par CoinGecko)
const MARKETS_PER_PAGE: u32 = 250;

/// Variable d'environnement pour la clé API demo (optionnelle)
const API_KEY_ENV: &str = "COINGECKO_API_KEY";

// ============================================================================
// Structure pour parser la réponse JSON de CoinGecko
// ============================================================================
// /coins/markets retourne un tableau plat d'objets, déjà en snake_case.
// Tous les champs sont déclarés Option : CoinGecko renvoie null sur les
// coins fraîchement listés (pas encore de volume, pas de variation 24h)
// et on ne veut pas qu'une ligne incomplète fasse échouer tout le batch.
// ============================================================================

/// Une ligne brute de /coins/markets, avant normalisation
#[derive(Debug, Deserialize)]
struct MarketRow {
    id: Option<String>,
    symbol: Option<String>,
    name: Option<String>,
    image: Option<String>,
    current_price: Option<f64>,
    price_change_percentage_24h: Option<f64>,
    total_volume: Option<f64>,
    market_cap: Option<f64>,
}

/// Normalise une métrique optionnelle de l'API vers un f64 exploitable
///
/// Règle unique pour les quatre métriques (prix, variation, volume, cap) :
/// absent, null ou non fini -> 0.0. Le signe d'une variation présente
/// n'est jamais altéré.
fn normalize_metric(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

// ============================================================================
// Fonctions publiques de l'API
// ============================================================================

/// Récupère un snapshot du marché crypto depuis CoinGecko
///
/// Une page de 250 coins triés par capitalisation décroissante, prix
/// exprimés dans `vs_currency`. Les lignes sans id sont écartées, les
/// métriques absentes valent 0.0, les ids en doublon sont dédupliqués
/// (première occurrence gardée).
///
/// # Arguments
/// * `vs_currency` - Devise de cotation (ex: "usd", "eur")
///
/// # Retourne
/// * `Result<MarketSnapshot>` - Snapshot normalisé ou erreur
///
/// CONCEPT RUST : #[instrument]
/// - Macro tracing qui ajoute automatiquement un span
/// - Tous les logs à l'intérieur auront le contexte vs_currency
#[instrument]
pub async fn fetch_market_snapshot(vs_currency: &str) -> Result<MarketSnapshot> {
    let url = build_markets_url(vs_currency);
    debug!(url = %url, "Built CoinGecko markets URL");

    // CoinGecko rejette les requêtes sans User-Agent
    debug!("Creating HTTP client");
    let client = reqwest::Client::builder()
        .user_agent("mccoin/0.1 (terminal dashboard)")
        .build()
        .context("Échec de la création du client HTTP")?;

    // La clé demo est optionnelle : sans elle on reste sur le quota public
    let mut request = client.get(&url);
    if let Ok(api_key) = std::env::var(API_KEY_ENV) {
        debug!("Using CoinGecko demo API key from environment");
        request = request.header("x-cg-demo-api-key", api_key);
    }

    debug!("Sending HTTP request to CoinGecko");
    let response = request
        .send()
        .await
        .context("Échec de la requête HTTP vers CoinGecko")?;

    let status = response.status();
    debug!(status = %status, "Received HTTP response");

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        error!("CoinGecko rate limit hit");
        anyhow::bail!("CoinGecko a limité la requête (HTTP 429), réessayez dans une minute");
    }

    if !status.is_success() {
        error!(status = %status, "CoinGecko returned error status");
        anyhow::bail!("CoinGecko a retourné une erreur : HTTP {}", status);
    }

    debug!("Parsing JSON response");
    let rows: Vec<MarketRow> = response
        .json()
        .await
        .context("Échec du parsing JSON de la réponse CoinGecko")?;

    let snapshot = parse_market_rows(rows, vs_currency)?;

    info!(coins = snapshot.len(), "Successfully fetched market snapshot");
    Ok(snapshot)
}

/// Construit l'URL de /coins/markets
///
/// Une seule page, triée par capitalisation décroissante, avec la
/// variation 24h incluse dans la réponse
fn build_markets_url(vs_currency: &str) -> String {
    format!(
        "{}/coins/markets?vs_currency={}&order=market_cap_desc&per_page={}&page=1&sparkline=false&price_change_percentage=24h",
        COINGECKO_BASE_URL, vs_currency, MARKETS_PER_PAGE
    )
}

/// Normalise les lignes brutes et construit le snapshot
///
/// CONCEPT RUST : Ownership
/// - rows est "moved" (pas de &), on consomme le Vec en le convertissant
/// - vs_currency est borrowed (&str), cloné une seule fois à la fin
fn parse_market_rows(rows: Vec<MarketRow>, vs_currency: &str) -> Result<MarketSnapshot> {
    let row_count = rows.len();
    let mut skipped_count = 0;

    let records: Vec<CoinRecord> = rows
        .into_iter()
        .filter_map(|row| {
            // Sans id on ne peut ni dédupliquer ni identifier le coin : on écarte
            let id = match row.id {
                Some(id) if !id.is_empty() => id,
                _ => {
                    skipped_count += 1;
                    return None;
                }
            };

            Some(CoinRecord::new(
                id,
                row.symbol.unwrap_or_default(),
                row.name.unwrap_or_default(),
                row.image.unwrap_or_default(),
                normalize_metric(row.current_price),
                normalize_metric(row.price_change_percentage_24h),
                normalize_metric(row.total_volume),
                normalize_metric(row.market_cap),
            ))
        })
        .collect();

    if skipped_count > 0 {
        warn!(
            skipped = skipped_count,
            total = row_count,
            "Skipped rows without coin id"
        );
    }

    // Une page vide ou entièrement invalide = erreur de fetch, pas un
    // snapshot vide : l'appelant garde ses données précédentes
    if records.is_empty() {
        error!("No valid market rows in CoinGecko response");
        anyhow::bail!("Aucune donnée de marché exploitable dans la réponse CoinGecko");
    }

    let record_count = records.len();
    let snapshot = MarketSnapshot::from_records(vs_currency.to_string(), records);

    if snapshot.len() < record_count {
        warn!(
            dropped = record_count - snapshot.len(),
            "Dropped duplicate coin ids from CoinGecko response"
        );
    }

    debug!(
        parsed = snapshot.len(),
        total = row_count,
        skipped = skipped_count,
        "Finished parsing market rows"
    );

    Ok(snapshot)
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_markets_url() {
        let url = build_markets_url("eur");
        assert!(url.contains("coingecko.com"));
        assert!(url.contains("vs_currency=eur"));
        assert!(url.contains("per_page=250"));
        assert!(url.contains("price_change_percentage=24h"));
    }

    #[test]
    fn test_normalize_metric() {
        assert_eq!(normalize_metric(Some(2.11)), 2.11);
        assert_eq!(normalize_metric(Some(-1.4)), -1.4); // Le signe est préservé
        assert_eq!(normalize_metric(None), 0.0);
        assert_eq!(normalize_metric(Some(f64::NAN)), 0.0);
        assert_eq!(normalize_metric(Some(f64::INFINITY)), 0.0);
    }

    #[test]
    fn test_parse_market_rows_normalizes_missing_values() {
        // Réponse réaliste : un coin complet, un coin fraîchement listé
        // (métriques null), une ligne sans id
        let json = r#"[
            {
                "id": "bitcoin",
                "symbol": "btc",
                "name": "Bitcoin",
                "image": "https://assets.coingecko.com/coins/images/1/large/bitcoin.png",
                "current_price": 64250.12,
                "price_change_percentage_24h": 2.11,
                "total_volume": 35000000000.0,
                "market_cap": 1260000000000.0
            },
            {
                "id": "newcoin",
                "symbol": "new",
                "name": "New Coin",
                "image": null,
                "current_price": null,
                "price_change_percentage_24h": null,
                "total_volume": null,
                "market_cap": null
            },
            {
                "id": null,
                "symbol": "ghost",
                "name": "Ghost",
                "image": null,
                "current_price": 1.0,
                "price_change_percentage_24h": 1.0,
                "total_volume": 1.0,
                "market_cap": 1.0
            }
        ]"#;

        let rows: Vec<MarketRow> = serde_json::from_str(json).unwrap();
        let snapshot = parse_market_rows(rows, "usd").unwrap();

        // La ligne sans id a été écartée
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.vs_currency, "usd");

        let bitcoin = &snapshot.coins[0];
        assert_eq!(bitcoin.id, "bitcoin");
        assert_eq!(bitcoin.current_price, 64250.12);
        assert_eq!(bitcoin.price_change_percent_24h, 2.11);

        // Les métriques null valent 0.0, le coin reste dans le snapshot
        let newcoin = &snapshot.coins[1];
        assert_eq!(newcoin.id, "newcoin");
        assert_eq!(newcoin.image, "");
        assert_eq!(newcoin.current_price, 0.0);
        assert_eq!(newcoin.price_change_percent_24h, 0.0);
        assert_eq!(newcoin.total_volume_24h, 0.0);
        assert_eq!(newcoin.market_cap, 0.0);
    }

    #[test]
    fn test_parse_market_rows_drops_duplicate_ids() {
        let json = r#"[
            {"id": "bitcoin", "symbol": "btc", "name": "Bitcoin", "image": null,
             "current_price": 64000.0, "price_change_percentage_24h": 1.0,
             "total_volume": 1.0, "market_cap": 1.0},
            {"id": "bitcoin", "symbol": "btc", "name": "Bitcoin bis", "image": null,
             "current_price": 1.0, "price_change_percentage_24h": 9.0,
             "total_volume": 9.0, "market_cap": 9.0}
        ]"#;

        let rows: Vec<MarketRow> = serde_json::from_str(json).unwrap();
        let snapshot = parse_market_rows(rows, "usd").unwrap();

        // Première occurrence gardée
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.coins[0].current_price, 64000.0);
    }

    #[test]
    fn test_parse_market_rows_rejects_empty_batch() {
        // Page vide : erreur (l'appelant garde son snapshot précédent)
        let snapshot = parse_market_rows(Vec::new(), "usd");
        assert!(snapshot.is_err());

        // Page entièrement invalide : pareil
        let json = r#"[{"id": null, "symbol": null, "name": null, "image": null,
            "current_price": null, "price_change_percentage_24h": null,
            "total_volume": null, "market_cap": null}]"#;
        let rows: Vec<MarketRow> = serde_json::from_str(json).unwrap();
        assert!(parse_market_rows(rows, "usd").is_err());
    }

    // Test async nécessite tokio test runtime
    // CONCEPT RUST : #[tokio::test]
    // - Macro qui setup un runtime tokio pour le test
    // - Permet d'utiliser .await dans les tests
    #[tokio::test]
    async fn test_fetch_market_snapshot() {
        // Test avec un vrai appel API (peut échouer si pas de connexion)
        let result = fetch_market_snapshot(DEFAULT_VS_CURRENCY).await;

        // On vérifie juste que l'appel fonctionne
        // (on ne vérifie pas les données car elles changent)
        match result {
            Ok(snapshot) => {
                assert_eq!(snapshot.vs_currency, "usd");
                assert!(!snapshot.is_empty());
                println!("✓ Récupéré {} coins depuis CoinGecko", snapshot.len());
            }
            Err(e) => {
                println!("⚠ Test skippé (pas de connexion?) : {}", e);
            }
        }
    }
}
