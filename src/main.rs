// ============================================================================
// McCoin - Moniteur TUI du marché crypto
// ============================================================================
// Programme TUI qui affiche un snapshot du marché crypto (CoinGecko) :
// classements, répartition des variations 24h et liste complète des marchés,
// avec rafraîchissement automatique toutes les 60 secondes
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : boucle infinie qui gère événements et rendering
// 3. Async dans sync : tokio::runtime::Runtime pour appels API
// 4. RAII : restauration du terminal même en cas d'erreur
// ============================================================================

use std::io;
use std::sync::mpsc;

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info};

use mccoin::api::coingecko::{fetch_market_snapshot, DEFAULT_VS_CURRENCY};
use mccoin::app::App;
use mccoin::models::MarketSnapshot;
use mccoin::ui::{events::EventHandler, render};

/// Variable d'environnement pour choisir la devise de cotation
const VS_CURRENCY_ENV: &str = "MCCOIN_VS_CURRENCY";

// ============================================================================
// AppCommand : Commandes pour le worker thread
// ============================================================================
// CONCEPT RUST : Command pattern avec channels
// - L'event loop envoie des commandes au worker thread
// - Le worker thread exécute les tâches async (fetch API)
// - Communication via mpsc channels (multi-producer, single-consumer)
// ============================================================================

/// Commandes envoyées au worker thread pour exécuter des tâches async
#[derive(Debug, Clone)]
enum AppCommand {
    /// Recharger le snapshot complet du marché
    /// CONCEPT : Background data loading
    /// - Envoyée par le timer de rafraîchissement ou la touche 'r'
    /// - L'UI passe en état "loading" AVANT d'envoyer la commande
    RefreshSnapshot,
}

/// Résultats renvoyés par le worker thread
#[derive(Debug)]
enum AppResult {
    /// Nouveau snapshot fetché avec succès
    SnapshotLoaded(MarketSnapshot),

    /// Échec du fetch : le snapshot précédent reste affiché
    RefreshFailed(String),
}

// ============================================================================
// Initialisation du logging
// ============================================================================
// CONCEPT : Logging dans une app TUI
// - Les println! ne fonctionnent pas une fois le TUI lancé
// - On log vers un fichier à la place
// - Tracing : framework moderne de logging structuré
// - Rotation quotidienne automatique des logs
// ============================================================================

/// Initialise le système de logging vers fichier
///
/// CONCEPT RUST : Tracing subscriber
/// - Registry : point central des logs
/// - Layer : transforme et route les logs
/// - EnvFilter : filtre par niveau (RUST_LOG env var)
/// - RollingFileAppender : rotation automatique
///
/// Les logs sont écrits dans :
/// - Linux/WSL : ~/.local/share/mccoin/logs/mccoin.log
/// - macOS : ~/Library/Application Support/mccoin/logs/mccoin.log
/// - Windows : C:\Users\<user>\AppData\Local\mccoin\logs\mccoin.log
///
/// # Utilisation
/// ```bash
/// # Voir les logs en temps réel
/// tail -f ~/.local/share/mccoin/logs/mccoin.log
///
/// # Contrôler le niveau de log
/// RUST_LOG=debug cargo run
/// RUST_LOG=mccoin=trace cargo run
/// ```
fn init_logging() -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    // Répertoire de logs par plateforme, ./logs en dernier recours
    let log_dir = dirs::data_local_dir()
        .map(|dir| dir.join("mccoin").join("logs"))
        .unwrap_or_else(|| std::path::PathBuf::from("./logs"));

    // Crée le répertoire s'il n'existe pas
    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    // Configure la rotation quotidienne des logs
    // CONCEPT : Log rotation
    // - Rotation::DAILY : nouveau fichier chaque jour
    // - Évite que les logs deviennent trop gros
    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "mccoin.log");

    // Configure le subscriber (receveur de logs)
    // CONCEPT : Builder pattern avec layers
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender) // Écrit dans le fichier
                .with_ansi(false) // Pas de codes couleur dans le fichier
                .with_target(true) // Inclut le module (ex: mccoin::api::coingecko)
                .with_thread_ids(true) // Inclut l'ID du thread (utile pour le worker)
                .with_line_number(true), // Inclut le numéro de ligne
        )
        .with(
            // Filtre les logs par niveau
            // CONCEPT : EnvFilter
            // - RUST_LOG=debug : tous les logs debug+
            // - RUST_LOG=mccoin=trace : trace pour mccoin, info pour le reste
            // - Par défaut : debug pour mccoin, info pour les dépendances
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mccoin=debug,info".into()),
        )
        .init();

    // Premier log : confirme que le logging est initialisé
    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================
// CONCEPT RUST : Async dans sync
// - main() est synchrone (pour TUI)
// - Mais on a besoin d'async pour les appels API
// - Solution : tokio::runtime::Runtime pour exécuter du code async
// ============================================================================

fn main() -> Result<()> {
    // Initialize logging FIRST
    // CONCEPT : Logging avant tout le reste
    // - Si init échoue, on affiche l'erreur et continue quand même
    init_logging().unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    println!("McCoin starting up");
    info!("McCoin starting up");

    // Devise de cotation configurable par variable d'environnement
    let vs_currency =
        std::env::var(VS_CURRENCY_ENV).unwrap_or_else(|_| DEFAULT_VS_CURRENCY.to_string());

    // Fetch initial (appel API async exécuté de manière bloquante)
    info!(vs_currency = %vs_currency, "Loading initial market snapshot");
    println!("📊 Chargement du marché ({})...\n", vs_currency);

    let runtime = tokio::runtime::Runtime::new()?;
    let mut app = match runtime.block_on(fetch_market_snapshot(&vs_currency)) {
        Ok(snapshot) => {
            info!(coins = snapshot.len(), "Initial snapshot loaded");
            println!("✅ {} coins chargés !\n", snapshot.len());
            App::with_snapshot(snapshot)
        }
        Err(e) => {
            // On démarre quand même : snapshot vide + erreur dans le footer,
            // le rafraîchissement automatique retentera dans 60s
            error!(error = ?e, "Failed to load initial snapshot");
            println!("⚠ Fetch initial échoué : {}\n", e);
            let mut app = App::with_snapshot(MarketSnapshot::empty(vs_currency.clone()));
            app.refresh_failed(e.to_string());
            app
        }
    };

    // Setup du terminal en mode TUI
    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    // Crée les channels pour communication avec le worker
    // CONCEPT RUST : mpsc channels
    // - command_tx/rx : pour envoyer des commandes au worker
    // - result_tx/rx : pour recevoir les résultats du worker
    //
    // Le worker ne touche jamais App : seule la boucle UI possède l'état,
    // les données circulent exclusivement par les channels
    let (command_tx, command_rx) = mpsc::channel::<AppCommand>();
    let (result_tx, result_rx) = mpsc::channel::<AppResult>();

    // Lance le worker thread en arrière-plan
    info!("Spawning background worker thread");
    spawn_background_worker(command_rx, result_tx, vs_currency);

    // Crée le gestionnaire d'événements
    let events = EventHandler::new();

    // Exécute l'event loop
    info!("Starting event loop");
    let result = run(&mut terminal, &mut app, &events, command_tx, result_rx);

    // Restaure le terminal (même en cas d'erreur)
    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

// ============================================================================
// Background Worker Thread
// ============================================================================
// CONCEPT RUST : Background async worker avec channels
// - Thread séparé qui traite les commandes async
// - Reçoit des AppCommand via un channel (command_rx)
// - Envoie des AppResult via un autre channel (result_tx)
// - Permet de fetcher CoinGecko sans bloquer l'UI
// ============================================================================

/// Worker thread qui exécute les fetchs en arrière-plan
///
/// CONCEPT RUST : Thread + async runtime
/// - std::thread::spawn() : crée un thread OS
/// - tokio::runtime::Runtime : runtime async dans ce thread
/// - mpsc channels : communication inter-thread
///
/// # Arguments
/// * `command_rx` - Receiver pour recevoir les commandes
/// * `result_tx` - Sender pour envoyer les résultats
/// * `vs_currency` - Devise de cotation des fetchs
fn spawn_background_worker(
    command_rx: mpsc::Receiver<AppCommand>,
    result_tx: mpsc::Sender<AppResult>,
    vs_currency: String,
) {
    std::thread::spawn(move || {
        // Crée un runtime tokio pour ce thread
        // CONCEPT : Runtime per-thread
        // - Permet d'exécuter du code async dans un thread standard
        let runtime = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");

        // Boucle de traitement des commandes
        // CONCEPT : Command processing loop
        // - recv() bloque jusqu'à la prochaine commande
        // - L'erreur de recv() signifie que l'UI a fermé le channel
        loop {
            match command_rx.recv() {
                Ok(command) => {
                    info!(?command, "Worker received command");

                    match command {
                        AppCommand::RefreshSnapshot => {
                            // CONCEPT : block_on dans un worker thread
                            // - block_on() bloque le thread worker (pas l'UI)
                            // - L'UI continue à tourner normalement
                            let result = runtime
                                .block_on(async { fetch_market_snapshot(&vs_currency).await });

                            match result {
                                Ok(snapshot) => {
                                    info!(
                                        coins = snapshot.len(),
                                        "Snapshot refreshed successfully"
                                    );
                                    let _ = result_tx.send(AppResult::SnapshotLoaded(snapshot));
                                }
                                Err(e) => {
                                    error!(error = ?e, "Failed to refresh snapshot");
                                    let _ =
                                        result_tx.send(AppResult::RefreshFailed(e.to_string()));
                                }
                            }
                        }
                    }
                }
                Err(_) => {
                    // Channel fermé, on quitte
                    info!("Worker thread exiting (channel closed)");
                    break;
                }
            }
        }
    });
}

// ============================================================================
// Event Loop Principal
// ============================================================================
// CONCEPT : Game Loop / Event Loop Pattern
// - Loop infinie : while app.is_running()
// - À chaque itération :
//   0. Traiter les résultats du worker
//   1. Dessiner l'interface (render)
//   2. Traiter les événements (input)
//   3. Mettre à jour l'état (update : timer de rafraîchissement)
// ============================================================================

/// Exécute la boucle principale de l'application
fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
    command_tx: mpsc::Sender<AppCommand>,
    result_rx: mpsc::Receiver<AppResult>,
) -> Result<()> {
    loop {
        if !app.is_running() {
            break;
        }

        // ========================================
        // 0. RÉSULTATS : Traite les résultats du worker
        // ========================================
        // CONCEPT : Non-blocking receive avec try_recv
        // - try_recv() ne bloque pas (contrairement à recv())
        // - Err(TryRecvError::Empty) : pas de résultat, continue
        // - Err(TryRecvError::Disconnected) : worker mort (erreur)
        match result_rx.try_recv() {
            Ok(AppResult::SnapshotLoaded(snapshot)) => {
                info!(coins = snapshot.len(), "Applying refreshed snapshot");
                app.apply_snapshot(snapshot);
            }
            Ok(AppResult::RefreshFailed(error)) => {
                error!(error = %error, "Snapshot refresh failed, keeping previous data");
                app.refresh_failed(error);
            }
            Err(mpsc::TryRecvError::Empty) => {
                // Pas de résultat, c'est normal
            }
            Err(mpsc::TryRecvError::Disconnected) => {
                error!("Worker thread disconnected!");
                // Continue quand même, mais le worker est mort
            }
        }

        // ========================================
        // 1. RENDER : Dessine l'interface
        // ========================================
        terminal.draw(|frame| render(frame, app))?;

        // ========================================
        // 2. INPUT : Traite les événements
        // ========================================
        match events.next() {
            Ok(event) => {
                handle_event(app, event, &command_tx);
            }
            Err(_) => {
                // Erreur lors de la lecture d'événement
            }
        }

        // ========================================
        // 3. UPDATE : Rafraîchissement automatique
        // ========================================
        // CONCEPT : Timer par horloge monotone
        // - tick() retourne true quand les 60s sont écoulées
        // - begin_refresh() AVANT l'envoi : le timer repart et l'UI
        //   affiche l'indicateur de chargement dès ce cycle
        if app.tick() {
            info!("Refresh interval elapsed, requesting new snapshot");
            app.begin_refresh();
            let _ = command_tx.send(AppCommand::RefreshSnapshot);
        }
    }

    Ok(())
}

// ============================================================================
// Gestion des événements
// ============================================================================
// CONCEPT : Event Handler Pattern
// - Sépare la logique de gestion des événements
// - Modifie l'état de app selon l'événement
// ============================================================================

/// Traite un événement et met à jour l'état de l'application
///
/// CONCEPT RUST : Pattern matching complexe avec guards
/// - Guard clauses (if) pour filtrer les événements
/// - Navigation contextuelle selon l'écran actuel
/// - En mode recherche, les lettres vont au filtre : les raccourcis
///   lettres ('q', 'r', 'h', 'l', ...) sont donc gardés par écran
fn handle_event(
    app: &mut App,
    event: mccoin::ui::events::Event,
    command_tx: &mpsc::Sender<AppCommand>,
) {
    // Importe les helpers pour vérifier les événements
    use mccoin::ui::events::{
        get_char_from_event, is_backspace_event, is_down_event, is_enter_event, is_escape_event,
        is_next_ordering_event, is_previous_ordering_event, is_quit_event, is_refresh_event,
        is_search_char_event, is_search_event, is_tab_event, is_up_event, Event,
    };

    match event {
        // ========================================
        // Mode recherche : la saisie passe avant tout
        // ========================================

        // ESC : annuler la recherche (efface le filtre)
        Event::Key(_) if is_escape_event(&event) && app.is_in_search_mode() => {
            info!("User cancelled search");
            app.cancel_search();
        }

        // Enter : valider la recherche (garde le filtre)
        Event::Key(_) if is_enter_event(&event) && app.is_in_search_mode() => {
            info!(filter = %app.search_query, "User submitted search filter");
            app.submit_search();
        }

        // Backspace : supprimer le dernier caractère du filtre
        Event::Key(_) if is_backspace_event(&event) && app.is_in_search_mode() => {
            app.search_backspace();
        }

        // Caractères : ajouter au filtre (la liste se resserre en direct)
        Event::Key(_) if is_search_char_event(&event) && app.is_in_search_mode() => {
            if let Some(c) = get_char_from_event(&event) {
                app.append_search_char(c);
            }
        }

        // ========================================
        // Raccourcis globaux (hors mode recherche)
        // ========================================

        // Touche 'q' : quit confirmation two-step
        // CONCEPT : Two-step confirmation pour éviter les quits accidentels
        Event::Key(_) if is_quit_event(&event) && !app.is_in_search_mode() => {
            if app.is_awaiting_quit_confirmation() {
                info!("User confirmed quit");
                app.quit();
            } else {
                info!("User requested quit (awaiting confirmation)");
                app.request_quit();
            }
        }

        // Tab : bascule Vue d'ensemble ↔ Marchés
        Event::Key(_) if is_tab_event(&event) && !app.is_in_search_mode() => {
            app.cancel_quit(); // Annule la confirmation si active
            if app.is_on_overview() {
                debug!("User switched to markets screen");
                app.show_markets();
            } else {
                debug!("User switched to overview screen");
                app.show_overview();
            }
        }

        // 'r' : rafraîchissement manuel (ignoré si un fetch est déjà en vol)
        Event::Key(_) if is_refresh_event(&event) && !app.is_in_search_mode() => {
            app.cancel_quit();
            if app.is_loading_data() {
                debug!("Manual refresh ignored, fetch already in flight");
            } else {
                info!("User requested manual refresh");
                app.begin_refresh();
                let _ = command_tx.send(AppCommand::RefreshSnapshot);
            }
        }

        // ========================================
        // Écran Marchés
        // ========================================

        // Navigation dans la liste
        Event::Key(_) if is_up_event(&event) && app.is_on_markets() => {
            app.cancel_quit();
            debug!("User navigated up");
            app.navigate_up();
        }
        Event::Key(_) if is_down_event(&event) && app.is_on_markets() => {
            app.cancel_quit();
            debug!("User navigated down");
            app.navigate_down();
        }

        // 'l' : ordre de tri suivant
        Event::Key(_) if is_next_ordering_event(&event) && app.is_on_markets() => {
            app.cancel_quit();
            app.next_ordering();
            info!(ordering = %app.current_ordering.label(), "User changed to next ordering");
        }

        // 'h' : ordre de tri précédent
        Event::Key(_) if is_previous_ordering_event(&event) && app.is_on_markets() => {
            app.cancel_quit();
            app.previous_ordering();
            info!(ordering = %app.current_ordering.label(), "User changed to previous ordering");
        }

        // '/' : entrer en mode recherche
        Event::Key(_) if is_search_event(&event) && app.is_on_markets() => {
            app.cancel_quit();
            info!("User started search");
            app.start_search();
        }

        // ESC : efface le filtre s'il y en a un, sinon retour à la vue d'ensemble
        Event::Key(_) if is_escape_event(&event) && app.is_on_markets() => {
            app.cancel_quit();
            if app.has_filter() {
                debug!("User cleared search filter");
                app.clear_filter();
            } else {
                debug!("User returned to overview");
                app.show_overview();
            }
        }

        Event::Tick => {
            // Tick régulier : le timer est géré par app.tick() dans la boucle
        }

        Event::Key(_) => {
            // Toute autre touche : annule la confirmation si active
            app.cancel_quit();
        }

        _ => {
            // Autres événements : ignorés
        }
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================
// CONCEPT RUST : Terminal raw mode
// - Raw mode : on reçoit tous les caractères directement
// - Alternate screen : écran secondaire (ne pollue pas l'historique)
// - Crossterm gère tout ça de manière cross-platform
//
// IMPORTANT : Toujours restaurer le terminal avant de quitter !
// ============================================================================

/// Configure le terminal en mode TUI
///
/// CONCEPT RUST : Error propagation avec ?
/// - Chaque opération peut échouer
/// - ? propage automatiquement les erreurs
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    // Active le raw mode
    // CONCEPT : Raw mode
    // - Les caractères ne sont pas affichés automatiquement
    // - Contrôle total sur l'affichage
    enable_raw_mode()?;

    // Configure le terminal
    // CONCEPT : Alternate screen
    // - Écran secondaire qui ne pollue pas l'historique
    // - Quand on quitte, l'écran précédent est restauré
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture // Active la souris (optionnel)
    )?;

    // Crée le backend crossterm
    let backend = CrosstermBackend::new(stdout);

    // CONCEPT RUST : Ownership
    // - Terminal prend ownership de backend
    Terminal::new(backend).map_err(|e| e.into())
}

/// Restaure le terminal à son état normal
///
/// CONCEPT : Cleanup et RAII
/// - Appelé dans main() même en cas d'erreur
/// - Restaure le terminal pour ne pas le laisser cassé
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    // Désactive le raw mode
    disable_raw_mode()?;

    // Restaure le terminal
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;

    // Affiche le curseur
    terminal.show_cursor()?;

    Ok(())
}

// ============================================================================
// Notes pédagogiques
// ============================================================================
//
// CONCEPTS CLÉS DE CE FICHIER :
//
// 1. Worker thread et channels
//    - L'UI possède App, le worker ne voit que les channels
//    - Les snapshots circulent par messages, jamais par état partagé
//    - Pas de Mutex : un seul thread mute l'état
//
// 2. Timer de rafraîchissement
//    - Horloge monotone (Instant), pas de dérive avec l'heure système
//    - Le timer repart à l'ENVOI de la commande, pas à la réception
//    - Un échec de fetch garde les données précédentes à l'écran
//
// 3. Event Loop pattern
//    - Résultats → Render → Input → Update
//    - Pattern classique des applications interactives
//
// 4. RAII et cleanup
//    - Acquisition dans setup_terminal()
//    - Libération dans restore_terminal(), même en cas d'erreur
//
// PROCHAINES ÉTAPES :
// - Pagination CoinGecko (plus de 250 coins)
// - Vue détail par coin (sparkline 7 jours)
// - Devises multiples à chaud
//
// ============================================================================
