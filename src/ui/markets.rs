// ============================================================================
// Marchés - Rendu de la liste complète
// ============================================================================
// Affiche tous les coins du snapshot, re-triés selon l'ordre courant et
// filtrés par la recherche, avec la ligne sélectionnée mise en évidence
//
// CONCEPTS RATATUI :
// 1. Stateful widget : List + ListState pour le défilement automatique
// 2. highlight_style : style appliqué à la ligne sélectionnée
// ============================================================================

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::app::App;
use crate::ui::dashboard;

/// Dessine l'écran Marchés complet
pub fn render_markets(frame: &mut Frame, app: &App) {
    let size = frame.size();
    let chunks = dashboard::create_layout(size);

    dashboard::render_header(frame, app, chunks[0]);
    render_market_list(frame, app, chunks[1]);
    dashboard::render_status_footer(frame, app, chunks[2], markets_shortcuts(app));
}

/// Dessine l'écran Marchés avec la ligne de recherche active
///
/// CONCEPT : Modal input (Vim-like)
/// - La liste reste affichée et se filtre en direct à chaque caractère
/// - Le footer devient la ligne de saisie
pub fn render_search_mode(frame: &mut Frame, app: &App) {
    let size = frame.size();
    let chunks = dashboard::create_layout(size);

    dashboard::render_header(frame, app, chunks[0]);
    render_market_list(frame, app, chunks[1]);
    render_search_footer(frame, app, chunks[2]);
}

/// Dessine la liste des coins visibles
fn render_market_list(frame: &mut Frame, app: &App, area: Rect) {
    let coins = app.visible_coins();

    // Titre : ordre de tri courant + filtre éventuel
    let mut title = format!(" 💹 Marchés | tri : {} ", app.current_ordering.label());
    if app.has_filter() {
        title = format!(
            " 💹 Marchés | tri : {} | filtre \"{}\" ({} résultats) ",
            app.current_ordering.label(),
            app.search_query,
            coins.len()
        );
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(title);

    if coins.is_empty() {
        let message = if app.snapshot.is_empty() {
            "Aucune donnée de marché"
        } else {
            "Aucun coin ne correspond au filtre"
        };

        let text = vec![
            Line::from(""),
            Line::from(Span::styled(message, Style::default().fg(Color::Gray))),
        ];

        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center);

        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = coins
        .iter()
        .enumerate()
        .map(|(index, coin)| {
            let style = if coin.is_positive() {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::Red)
            };

            // Tronque les noms longs pour garder l'alignement des colonnes
            let name: String = coin.name.chars().take(22).collect();

            let line = format!(
                " {:>3}  {:<8} {:<22} {:>12} {:>10} {:>12} {:>12}",
                index + 1,
                coin.display_symbol(),
                name,
                coin.formatted_price(),
                coin.formatted_change(),
                coin.formatted_volume(),
                coin.formatted_market_cap()
            );

            ListItem::new(line).style(style)
        })
        .collect();

    // CONCEPT RATATUI : Stateful widget
    // - ListState porte la sélection ; ratatui fait défiler la liste
    //   pour garder la ligne sélectionnée visible
    let list = List::new(items).block(block).highlight_style(
        Style::default()
            .add_modifier(Modifier::BOLD)
            .add_modifier(Modifier::REVERSED),
    );

    let mut state = ListState::default();
    state.select(Some(app.selected_index));
    frame.render_stateful_widget(list, area, &mut state);
}

/// Dessine le footer en mode recherche avec la ligne de saisie
fn render_search_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green)); // Vert pour indiquer le mode recherche

    let input_line = Line::from(vec![
        Span::styled(
            "Recherche : ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(&app.search_query, Style::default().fg(Color::White)),
        Span::styled(
            "█", // Curseur
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::SLOW_BLINK),
        ),
    ]);

    let help_line = Line::from(vec![
        Span::styled(
            "[Enter]",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" Garder le filtre  "),
        Span::styled(
            "[ESC]",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" Annuler"),
    ]);

    let paragraph = Paragraph::new(vec![input_line, help_line])
        .block(block)
        .alignment(Alignment::Left); // Alignement à gauche pour la saisie

    frame.render_widget(paragraph, area);
}

/// Raccourcis de l'écran Marchés
fn markets_shortcuts(app: &App) -> Line<'static> {
    let mut spans = vec![
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
        Span::raw(" Vue d'ensemble  "),
        Span::styled(
            "[↑↓ / j k]",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" Navigate  "),
        Span::styled(
            "[h / l]",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" Tri  "),
        Span::styled(
            "[/]",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" Filtre  "),
        Span::styled(
            "[r]",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" Refresh"),
    ];

    if app.has_filter() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            "[ESC]",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(" Efface le filtre"));
    }

    Line::from(spans)
}
