// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état global de l'application TUI
//
// CONCEPTS RUST :
// 1. State Management : centraliser l'état dans une seule structure
// 2. Mutabilité contrôlée : &mut self pour modifier l'état
// 3. Encapsulation : toutes les modifications passent par des méthodes
//
// PATTERN : Cette structure suit le pattern "Application State"
// - Tous les composants de l'UI lisent depuis App
// - Toutes les modifications passent par les méthodes de App
// - Garantit la cohérence de l'état
// ============================================================================

use std::time::{Duration, Instant};

use crate::models::{CoinRecord, MarketOrdering, MarketSnapshot};

/// Délai entre deux rafraîchissements automatiques du snapshot
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(60);

// ============================================================================
// Enum : Screen
// ============================================================================
// CONCEPT RUST : Enums pour state machines
// - Représente les différents écrans de l'application
// - Pattern "State Machine" : un seul écran actif à la fois
// - Le compilateur force à gérer tous les cas (exhaustivité)
// ============================================================================

/// Écrans de l'application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// Vue principale : classements + histogramme + ratio
    Overview,

    /// Vue marchés : liste complète triable et filtrable
    Markets,

    /// Mode recherche : capture du texte pour filtrer les marchés
    /// CONCEPT : Modal input mode (Vim-like, touche '/')
    /// - Chaque caractère saisi affine le filtre en direct
    /// - Enter garde le filtre, ESC l'efface
    Search,
}

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Dernier snapshot de marché reçu (vide avant le premier fetch réussi)
    ///
    /// CONCEPT : Swap atomique de données
    /// - Le snapshot est remplacé en bloc par apply_snapshot()
    /// - Entre deux remplacements, tout ce qui est affiché vient du même batch
    pub snapshot: MarketSnapshot,

    /// Index du coin sélectionné dans la liste visible de l'écran Marchés
    pub selected_index: usize,

    /// Écran actuellement affiché
    pub current_screen: Screen,

    /// Ordre de tri de l'écran Marchés (cap, volume ou variation)
    /// Peut être modifié avec les touches h et l
    pub current_ordering: MarketOrdering,

    /// Indique si l'utilisateur a demandé à quitter (attend confirmation)
    /// CONCEPT : Two-step quit pour éviter les sorties accidentelles
    /// - Première pression de 'q' : confirm_quit = true
    /// - Deuxième pression de 'q' : running = false (quit réel)
    /// - N'importe quelle autre touche : confirm_quit = false (annulation)
    pub confirm_quit: bool,

    /// Indique si un rafraîchissement est en cours côté worker
    pub is_loading: bool,

    /// Message de chargement optionnel
    pub loading_message: Option<String>,

    /// Filtre de recherche courant (vide = pas de filtre)
    /// CONCEPT : Input buffer (Vim-like)
    /// - Rempli caractère par caractère en mode Search
    /// - Appliqué en direct sur la liste des marchés
    pub search_query: String,

    /// Dernière erreur de rafraîchissement (affichée dans le footer)
    /// - Some(msg) : le dernier fetch a échoué, le snapshot précédent reste affiché
    /// - None : le dernier fetch a réussi
    pub last_error: Option<String>,

    /// Instant du dernier rafraîchissement lancé
    /// CONCEPT : Instant plutôt que DateTime pour mesurer un délai
    /// - Horloge monotone, insensible aux changements d'heure système
    pub last_refresh: Instant,
}

impl App {
    /// Crée une App sans données de marché (avant le premier fetch)
    pub fn new() -> Self {
        Self::with_snapshot(MarketSnapshot::empty("usd".to_string()))
    }

    /// Crée une App avec un snapshot préchargé
    pub fn with_snapshot(snapshot: MarketSnapshot) -> Self {
        Self {
            running: true,
            snapshot,
            selected_index: 0,
            current_screen: Screen::Overview, // Commence sur la vue d'ensemble
            current_ordering: MarketOrdering::default(), // Capitalisation
            confirm_quit: false,
            is_loading: false,
            loading_message: None,
            search_query: String::new(),
            last_error: None,
            last_refresh: Instant::now(),
        }
    }

    /// Quitte l'application
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Vérifie si l'application doit continuer
    pub fn is_running(&self) -> bool {
        self.running
    }

    // ========================================================================
    // Liste visible et navigation
    // ========================================================================

    /// Retourne les coins affichés sur l'écran Marchés : la liste complète
    /// re-triée selon l'ordre courant, puis filtrée par la recherche
    ///
    /// CONCEPT RUST : Vec<&CoinRecord>
    /// - Des références vers le snapshot, recalculées à la demande
    /// - Le snapshot n'est jamais modifié par le tri ni le filtre
    pub fn visible_coins(&self) -> Vec<&CoinRecord> {
        let mut coins = self.snapshot.ordered_by(self.current_ordering);

        if !self.search_query.is_empty() {
            let query = self.search_query.to_lowercase();
            coins.retain(|coin| {
                coin.symbol.to_lowercase().contains(&query)
                    || coin.name.to_lowercase().contains(&query)
                    || coin.id.contains(&query)
            });
        }

        coins
    }

    /// Navigue vers le haut dans la liste des marchés
    ///
    /// CONCEPT RUST : Saturating arithmetic
    /// - saturating_sub() : soustrait mais ne descend pas en dessous de 0
    /// - Évite les panics avec les unsigned
    pub fn navigate_up(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    /// Navigue vers le bas dans la liste des marchés
    ///
    /// CONCEPT RUST : min() pour éviter le dépassement
    /// - Limite l'index au dernier coin visible
    /// - saturating_sub(1) gère le cas liste vide (0 - 1 = 0)
    pub fn navigate_down(&mut self) {
        let max_index = self.visible_coins().len().saturating_sub(1);
        self.selected_index = (self.selected_index + 1).min(max_index);
    }

    /// Retourne le coin sélectionné dans la liste visible
    pub fn selected_coin(&self) -> Option<&CoinRecord> {
        self.visible_coins().get(self.selected_index).copied()
    }

    // ========================================================================
    // Transitions d'écran
    // ========================================================================

    /// Affiche l'écran Marchés
    pub fn show_markets(&mut self) {
        self.current_screen = Screen::Markets;
    }

    /// Retourne à la vue d'ensemble
    pub fn show_overview(&mut self) {
        self.current_screen = Screen::Overview;
    }

    /// Vérifie si on est sur la vue d'ensemble
    pub fn is_on_overview(&self) -> bool {
        self.current_screen == Screen::Overview
    }

    /// Vérifie si on est sur l'écran Marchés
    pub fn is_on_markets(&self) -> bool {
        self.current_screen == Screen::Markets
    }

    /// Passe à l'ordre de tri suivant
    ///
    /// CONCEPT : Cycle d'états
    /// - cap → volume → var 24h → cap
    /// - Utilisé avec la touche l
    pub fn next_ordering(&mut self) {
        self.current_ordering = self.current_ordering.next();
    }

    /// Passe à l'ordre de tri précédent
    ///
    /// - Utilisé avec la touche h
    pub fn previous_ordering(&mut self) {
        self.current_ordering = self.current_ordering.previous();
    }

    // ========================================================================
    // Confirmation de sortie
    // ========================================================================

    /// Demande la confirmation de quitter
    ///
    /// CONCEPT : Two-step quit pattern
    /// - Appelé lors de la première pression de 'q'
    /// - Active l'état confirm_quit pour attendre une seconde pression
    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    /// Annule la demande de quit
    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    /// Vérifie si on attend la confirmation de quit
    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    // ========================================================================
    // Rafraîchissement des données
    // ========================================================================

    /// Vérifie si un rafraîchissement automatique est dû
    ///
    /// CONCEPT : Event Loop Pattern
    /// - Appelé à chaque itération de la boucle principale
    /// - Retourne true au plus une fois par REFRESH_INTERVAL :
    ///   l'appelant doit alors lancer begin_refresh() puis envoyer la
    ///   commande au worker
    /// - Jamais true pendant qu'un fetch est déjà en vol
    pub fn tick(&mut self) -> bool {
        !self.is_loading && self.last_refresh.elapsed() >= REFRESH_INTERVAL
    }

    /// Secondes restantes avant le prochain rafraîchissement (pour le footer)
    pub fn seconds_until_refresh(&self) -> u64 {
        REFRESH_INTERVAL
            .saturating_sub(self.last_refresh.elapsed())
            .as_secs()
    }

    /// Marque le début d'un rafraîchissement
    ///
    /// Redémarre le timer tout de suite : même si le fetch traîne, on ne
    /// renverra pas une deuxième commande pour le même intervalle
    pub fn begin_refresh(&mut self) {
        self.last_refresh = Instant::now();
        self.start_loading(Some("Actualisation du marché...".to_string()));
    }

    /// Remplace le snapshot courant par un snapshot fraîchement fetché
    pub fn apply_snapshot(&mut self, snapshot: MarketSnapshot) {
        self.snapshot = snapshot;
        self.last_error = None;

        // La liste visible a pu raccourcir : on ramène la sélection dans les bornes
        let max_index = self.visible_coins().len().saturating_sub(1);
        self.selected_index = self.selected_index.min(max_index);

        self.stop_loading();
    }

    /// Enregistre l'échec d'un rafraîchissement
    ///
    /// Le snapshot précédent reste affiché tel quel ; seule l'erreur
    /// apparaît dans le footer jusqu'au prochain fetch réussi
    pub fn refresh_failed(&mut self, message: String) {
        self.last_error = Some(message);
        self.stop_loading();
    }

    /// Démarre le chargement avec un message optionnel
    pub fn start_loading(&mut self, message: Option<String>) {
        self.is_loading = true;
        self.loading_message = message;
    }

    /// Termine le chargement
    pub fn stop_loading(&mut self) {
        self.is_loading = false;
        self.loading_message = None;
    }

    /// Vérifie si des données sont en cours de chargement
    pub fn is_loading_data(&self) -> bool {
        self.is_loading
    }

    // ========================================================================
    // Mode recherche
    // ========================================================================

    /// Entre en mode recherche (repart d'un filtre vide)
    ///
    /// CONCEPT : Modal input (Vim-like)
    /// - Change l'écran vers Search
    /// - La liste des marchés reste affichée derrière, filtrée en direct
    pub fn start_search(&mut self) {
        self.current_screen = Screen::Search;
        self.search_query.clear();
        self.selected_index = 0;
    }

    /// Annule la recherche : efface le filtre et retourne aux marchés
    pub fn cancel_search(&mut self) {
        self.current_screen = Screen::Markets;
        self.search_query.clear();
        self.selected_index = 0;
    }

    /// Valide la recherche : garde le filtre actif et retourne aux marchés
    pub fn submit_search(&mut self) {
        self.current_screen = Screen::Markets;
    }

    /// Efface un filtre validé depuis l'écran Marchés
    pub fn clear_filter(&mut self) {
        self.search_query.clear();
        self.selected_index = 0;
    }

    /// Vérifie si un filtre est actif (en saisie ou validé)
    pub fn has_filter(&self) -> bool {
        !self.search_query.is_empty()
    }

    /// Ajoute un caractère au filtre (la liste se resserre en direct)
    pub fn append_search_char(&mut self, c: char) {
        self.search_query.push(c);
        self.selected_index = 0; // La liste change, la sélection repart en tête
    }

    /// Supprime le dernier caractère du filtre
    pub fn search_backspace(&mut self) {
        self.search_query.pop();
        self.selected_index = 0;
    }

    /// Vérifie si on est en mode recherche
    pub fn is_in_search_mode(&self) -> bool {
        self.current_screen == Screen::Search
    }
}

// ============================================================================
// Trait Default
// ============================================================================
// CONCEPT RUST : Traits
// - Default est un trait standard qui fournit une valeur par défaut
// - Permet d'utiliser App::default() au lieu de App::new()
//
// Convention Rust : si new() ne prend pas de paramètres, implémenter Default
// ============================================================================

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn coin(id: &str, symbol: &str, change: f64, cap: f64) -> CoinRecord {
        CoinRecord::new(
            id.to_string(),
            symbol.to_string(),
            id.to_string(),
            String::new(),
            1.0,
            change,
            0.0,
            cap,
        )
    }

    fn sample_app() -> App {
        let snapshot = MarketSnapshot::from_records(
            "usd".to_string(),
            vec![
                coin("bitcoin", "btc", 2.0, 900.0),
                coin("ethereum", "eth", -1.0, 500.0),
                coin("solana", "sol", 5.0, 100.0),
            ],
        );
        App::with_snapshot(snapshot)
    }

    #[test]
    fn test_app_creation() {
        let app = App::new();
        assert!(app.is_running());
        assert!(app.snapshot.is_empty());
        assert_eq!(app.selected_index, 0);
        assert!(app.is_on_overview());
    }

    #[test]
    fn test_app_quit() {
        let mut app = App::new();
        assert!(app.is_running());

        app.quit();
        assert!(!app.is_running());
    }

    #[test]
    fn test_two_step_quit() {
        let mut app = App::new();

        app.request_quit();
        assert!(app.is_awaiting_quit_confirmation());
        assert!(app.is_running()); // Pas encore quitté

        app.cancel_quit();
        assert!(!app.is_awaiting_quit_confirmation());
        assert!(app.is_running());
    }

    #[test]
    fn test_navigation_stays_in_bounds() {
        let mut app = sample_app();

        // Au début, on est à l'index 0
        assert_eq!(app.selected_index, 0);

        app.navigate_down();
        assert_eq!(app.selected_index, 1);

        app.navigate_down();
        assert_eq!(app.selected_index, 2);

        // Navigate down au max : reste à 2
        app.navigate_down();
        assert_eq!(app.selected_index, 2);

        app.navigate_up();
        app.navigate_up();
        assert_eq!(app.selected_index, 0);

        // Navigate up au min : reste à 0
        app.navigate_up();
        assert_eq!(app.selected_index, 0);
    }

    #[test]
    fn test_visible_coins_follow_ordering() {
        let mut app = sample_app();

        // Par défaut : capitalisation décroissante
        let ids: Vec<&str> = app.visible_coins().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["bitcoin", "ethereum", "solana"]);

        // cap → volume → var 24h
        app.next_ordering();
        app.next_ordering();
        let ids: Vec<&str> = app.visible_coins().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["solana", "bitcoin", "ethereum"]);
    }

    #[test]
    fn test_search_filters_live() {
        let mut app = sample_app();
        app.show_markets();
        app.navigate_down(); // Sélection sur l'index 1

        app.start_search();
        assert!(app.is_in_search_mode());
        assert_eq!(app.selected_index, 0); // La sélection repart en tête

        // "eth" matche le symbole d'ethereum uniquement
        app.append_search_char('e');
        app.append_search_char('t');
        app.append_search_char('h');
        let visible = app.visible_coins();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, "ethereum");

        // Enter : le filtre reste actif sur l'écran Marchés
        app.submit_search();
        assert!(app.is_on_markets());
        assert!(app.has_filter());
        assert_eq!(app.visible_coins().len(), 1);

        // Effacement du filtre : liste complète de retour
        app.clear_filter();
        assert!(!app.has_filter());
        assert_eq!(app.visible_coins().len(), 3);
    }

    #[test]
    fn test_selected_coin_follows_visible_list() {
        let mut app = sample_app();
        app.show_markets();

        // Tri par défaut : capitalisation décroissante
        assert_eq!(app.selected_coin().unwrap().id, "bitcoin");

        app.navigate_down();
        assert_eq!(app.selected_coin().unwrap().id, "ethereum");

        // Avec un filtre, la sélection repart sur le premier résultat
        app.start_search();
        app.append_search_char('s');
        app.append_search_char('o');
        app.append_search_char('l');
        assert_eq!(app.selected_coin().unwrap().id, "solana");

        // Aucune donnée : pas de sélection
        assert!(App::new().selected_coin().is_none());
    }

    #[test]
    fn test_cancel_search_clears_filter() {
        let mut app = sample_app();
        app.show_markets();
        app.start_search();
        app.append_search_char('b');

        app.cancel_search();
        assert!(app.is_on_markets());
        assert!(!app.has_filter());
        assert_eq!(app.visible_coins().len(), 3);
    }

    #[test]
    fn test_tick_due_after_interval() {
        let mut app = sample_app();

        // Fraîchement créée : pas de refresh dû
        assert!(!app.tick());

        // On recule artificiellement le dernier refresh
        app.last_refresh = Instant::now() - (REFRESH_INTERVAL + Duration::from_secs(1));
        assert!(app.tick());

        // Un fetch en vol bloque le déclenchement
        app.begin_refresh();
        assert!(!app.tick());
    }

    #[test]
    fn test_apply_snapshot_clamps_selection() {
        let mut app = sample_app();
        app.navigate_down();
        app.navigate_down();
        assert_eq!(app.selected_index, 2);

        // Nouveau snapshot plus court : la sélection doit rentrer dans les bornes
        let smaller = MarketSnapshot::from_records(
            "usd".to_string(),
            vec![coin("bitcoin", "btc", 1.0, 900.0)],
        );
        app.apply_snapshot(smaller);
        assert_eq!(app.selected_index, 0);
        assert!(app.last_error.is_none());
        assert!(!app.is_loading_data());
    }

    #[test]
    fn test_refresh_failed_keeps_stale_snapshot() {
        let mut app = sample_app();
        app.begin_refresh();

        app.refresh_failed("CoinGecko a retourné une erreur : HTTP 503".to_string());

        // Les données précédentes restent affichables
        assert_eq!(app.snapshot.len(), 3);
        assert!(app.last_error.is_some());
        assert!(!app.is_loading_data());
    }
}
