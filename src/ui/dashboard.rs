// ============================================================================
// Dashboard - Rendu de l'interface principale
// ============================================================================
// Dessine l'interface TUI en utilisant les widgets de ratatui
//
// CONCEPTS RUST :
// 1. Lifetimes : les Span empruntent les String de App le temps du rendu
// 2. Traits : Frame implémente des traits pour le rendering
// 3. Builder pattern : construction fluide des widgets
//
// CONCEPTS RATATUI :
// 1. Frame : surface de dessin
// 2. Widgets : composants UI (Block, Paragraph, List)
// 3. Layout : découpage de l'espace en zones
// 4. Style : couleurs et attributs de texte
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::{App, Screen};
use crate::models::CoinRecord;
use crate::ui::{histogram, markets};

// ============================================================================
// Fonction principale de rendu
// ============================================================================

/// Dessine l'interface complète
///
/// CONCEPT RUST : Routing avec match sur enum
/// - Pattern matching sur app.current_screen
/// - Le compilateur garantit l'exhaustivité (tous les cas gérés)
///
/// # Arguments
/// * `frame` - Surface de dessin ratatui
/// * `app` - État de l'application
pub fn render(frame: &mut Frame, app: &App) {
    match app.current_screen {
        Screen::Overview => {
            // Vue d'ensemble : classements + répartition des variations
            render_overview(frame, app);
        }
        Screen::Markets => {
            // Liste complète des marchés
            markets::render_markets(frame, app);
        }
        Screen::Search => {
            // Liste des marchés avec la ligne de recherche en bas
            markets::render_search_mode(frame, app);
        }
    }
}

/// Dessine la vue d'ensemble (classements, histogramme, ratio)
fn render_overview(frame: &mut Frame, app: &App) {
    let size = frame.size();
    let chunks = create_layout(size);

    render_header(frame, app, chunks[0]);
    render_market_panels(frame, app, chunks[1]);
    render_status_footer(frame, app, chunks[2], overview_shortcuts());
}

// ============================================================================
// Layout : Découpage de l'écran
// ============================================================================
// CONCEPT RATATUI : Layout
// - split() découpe un Rect en plusieurs zones
// - Constraints définissent les tailles :
//   - Length(n) : exactement n lignes/colonnes
//   - Percentage(n) : n% de l'espace
//   - Min(n) : minimum n
// ============================================================================

/// Crée le layout principal (header, content, footer)
///
/// CONCEPT RUST : Rc<[T]> vs Vec<T>
/// - Layout::split() retourne Rc<[Rect]> (reference counted slice)
/// - On le convertit en Vec avec .to_vec() pour simplifier
pub fn create_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header : 3 lignes
            Constraint::Min(0),    // Content : tout le reste
            Constraint::Length(4), // Footer : ligne de statut + raccourcis
        ])
        .split(area)
        .to_vec() // Convertit Rc<[Rect]> en Vec<Rect>
}

// ============================================================================
// Header : Titre de l'application
// ============================================================================

/// Dessine le header avec le titre et l'état du snapshot
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    // CONCEPT : Builder pattern
    // - Chaque méthode retourne self
    // - Permet de chaîner les appels
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" McCoin ")
        .title_alignment(Alignment::Center);

    let subtitle = format!(
        "🚀 Marché crypto en {} | {} coins suivis",
        app.snapshot.vs_currency.to_uppercase(),
        app.snapshot.len()
    );

    let text = vec![Line::from(Span::styled(
        subtitle,
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
    ))];

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Panneaux de la vue d'ensemble
// ============================================================================

/// Métrique affichée en colonne de droite d'un classement
enum BoardMetric {
    Change,
    Volume,
    MarketCap,
}

/// Dessine les quatre classements et la rangée de répartition
///
/// Disposition :
/// - Haut (58%) : grille 2x2 des classements
/// - Bas (42%) : histogramme des variations + ratio achat/vente
fn render_market_panels(frame: &mut Frame, app: &App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(58), Constraint::Percentage(42)])
        .split(area)
        .to_vec();

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0])
        .to_vec();

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(columns[0])
        .to_vec();

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(columns[1])
        .to_vec();

    render_leaderboard(
        frame,
        left[0],
        " 📈 Top hausses 24h ",
        &app.snapshot.top_gainers(),
        BoardMetric::Change,
    );
    render_leaderboard(
        frame,
        left[1],
        " 📉 Top baisses 24h ",
        &app.snapshot.top_losers(),
        BoardMetric::Change,
    );
    render_leaderboard(
        frame,
        right[0],
        " 💰 Top volume 24h ",
        &app.snapshot.top_by_volume(),
        BoardMetric::Volume,
    );
    render_leaderboard(
        frame,
        right[1],
        " 🏦 Top capitalisation ",
        &app.snapshot.top_by_market_cap(),
        BoardMetric::MarketCap,
    );

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(rows[1])
        .to_vec();

    histogram::render_change_histogram(frame, app, bottom[0]);
    histogram::render_order_ratio(frame, app, bottom[1]);
}

/// Dessine un classement (8 entrées max, déjà triées)
///
/// CONCEPT RATATUI : List widget
/// - Widget pour afficher une liste d'items
/// - ListItem : chaque ligne de la liste
fn render_leaderboard(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    coins: &[&CoinRecord],
    metric: BoardMetric,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(title);

    // Classement vide : message plutôt qu'un cadre blanc
    if coins.is_empty() {
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "Aucune donnée",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center);

        frame.render_widget(paragraph, area);
        return;
    }

    // CONCEPT RUST : Iterator chaining
    // - .iter() puis .map() : transforme chaque coin en ListItem
    // - .collect() : collecte dans un Vec<ListItem>
    let items: Vec<ListItem> = coins
        .iter()
        .map(|coin| {
            // Vert pour les hausses, rouge pour les baisses
            let style = if coin.is_positive() {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::Red)
            };

            let value = match metric {
                BoardMetric::Change => coin.formatted_change(),
                BoardMetric::Volume => coin.formatted_volume(),
                BoardMetric::MarketCap => coin.formatted_market_cap(),
            };

            let line = format!(
                " {:<8} {:>12} {:>14}",
                coin.display_symbol(),
                coin.formatted_price(),
                value
            );

            ListItem::new(line).style(style)
        })
        .collect();

    let list = List::new(items).block(block);

    frame.render_widget(list, area);
}

// ============================================================================
// Footer : Statut et raccourcis
// ============================================================================

/// Dessine le footer : ligne de statut + raccourcis (ou confirmation de quit)
///
/// CONCEPT : Confirmation de quit two-step
/// - Si app.is_awaiting_quit_confirmation(), la ligne de raccourcis est
///   remplacée par le message d'avertissement
pub fn render_status_footer(frame: &mut Frame, app: &App, area: Rect, shortcuts: Line) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let second_line = if app.is_awaiting_quit_confirmation() {
        quit_confirmation_line()
    } else {
        shortcuts
    };

    let paragraph = Paragraph::new(vec![status_line(app), second_line])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

/// Construit la ligne de statut : chargement, erreur ou compte à rebours
fn status_line(app: &App) -> Line<'static> {
    if app.is_loading_data() {
        let message = app.loading_message.as_deref().unwrap_or("Chargement...");
        Line::from(Span::styled(
            format!("⏳ {}", message),
            Style::default().fg(Color::Yellow),
        ))
    } else if let Some(error) = &app.last_error {
        // Le snapshot précédent reste affiché, l'erreur est signalée ici
        Line::from(Span::styled(
            format!("⚠ {} (données précédentes affichées)", error),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ))
    } else {
        Line::from(Span::styled(
            format!(
                "Actualisé à {} UTC | prochain rafraîchissement dans {}s",
                app.snapshot.fetched_at.format("%H:%M:%S"),
                app.seconds_until_refresh()
            ),
            Style::default().fg(Color::Gray),
        ))
    }
}

/// Message de confirmation du quit two-step
///
/// CONCEPT : Style avec BLINK pour attirer l'attention
fn quit_confirmation_line() -> Line<'static> {
    Line::from(vec![
        Span::styled(
            "⚠  Appuyez sur ",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            "[q]",
            Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD)
                .add_modifier(Modifier::SLOW_BLINK),
        ),
        Span::styled(
            " à nouveau pour quitter, ou n'importe quelle autre touche pour annuler ⚠",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
    ])
}

/// Raccourcis de la vue d'ensemble
fn overview_shortcuts() -> Line<'static> {
    // CONCEPT RATATUI : Spans multiples dans une Line
    // - Permet d'avoir plusieurs couleurs sur une même ligne
    Line::from(vec![
        Span::styled(
            "[q]",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" Quit  "),
        Span::styled(
            "[Tab]",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" Marchés  "),
        Span::styled(
            "[r]",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" Refresh"),
    ])
}
