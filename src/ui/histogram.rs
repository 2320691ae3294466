// ============================================================================
// Histogramme des variations - Rendu texte ligne par ligne
// ============================================================================
// Dessine la répartition des variations 24h et la pression achat/vente
// avec des barres Unicode horizontales, sans widget graphique
//
// ALGORITHME :
// - Une ligne par tranche : label, barre proportionnelle, compteur
// - Échelle relative : la tranche la plus remplie occupe toute la largeur
// - Une tranche non vide affiche toujours au moins une cellule
// ============================================================================

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::models::{ChangeHistogram, OrderRatio, BUCKET_LABELS};

// ============================================================================
// Constantes
// ============================================================================

/// Cellule pleine des barres
const UNICODE_BAR: char = '█';

/// Couleurs des tranches hautes et basses
const UP_COLOR: Color = Color::Rgb(52, 208, 88); // Vert
const DOWN_COLOR: Color = Color::Rgb(234, 74, 90); // Rouge

/// Largeur réservée au label de tranche (à gauche de la barre)
const LABEL_WIDTH: u16 = 7;

/// Largeur réservée au compteur (à droite de la barre)
const COUNT_WIDTH: u16 = 6;

// ============================================================================
// Fonctions de rendu
// ============================================================================

/// Dessine l'histogramme des variations 24h (10 tranches fixes)
pub fn render_change_histogram(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" 📊 Répartition des variations 24h ");

    if app.snapshot.is_empty() {
        render_empty(frame, block, area);
        return;
    }

    let histogram = ChangeHistogram::from_snapshot(&app.snapshot);
    let max_count = histogram.max_count();

    // Largeur disponible pour les barres (bordures, label et compteur déduits)
    let bar_width = area.width.saturating_sub(2 + LABEL_WIDTH + COUNT_WIDTH) as usize;

    let mut lines: Vec<Line> = histogram
        .buckets
        .iter()
        .enumerate()
        .map(|(index, &count)| {
            // Tranches 0 à 4 : variations >= 0, en vert ; le reste en rouge
            let color = if index < 5 { UP_COLOR } else { DOWN_COLOR };

            let filled = scaled_bar_cells(count, max_count, bar_width);
            let bar: String = std::iter::repeat(UNICODE_BAR).take(filled).collect();

            Line::from(vec![
                Span::styled(
                    format!(" {:<6}", BUCKET_LABELS[index]),
                    Style::default().fg(Color::Gray),
                ),
                Span::styled(bar, Style::default().fg(color)),
                Span::styled(format!(" {:>4}", count), Style::default().fg(Color::White)),
            ])
        })
        .collect();

    // Totaux sous les tranches : même partage hausses/baisses que les couleurs
    lines.push(totals_line(&histogram));

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}

/// Dessine la pression achat/vente estimée à partir des variations
///
/// CONCEPT RUST : Option et cas dégénéré
/// - Snapshot vide : pas de ratio calculable, on affiche le message
///   d'attente au lieu d'un faux 50/50
pub fn render_order_ratio(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" ⚖ Pression achat/vente ");

    let ratio = match OrderRatio::from_snapshot(&app.snapshot) {
        Some(ratio) => ratio,
        None => {
            render_empty(frame, block, area);
            return;
        }
    };

    // Barre bicolore : la part verte est proportionnelle aux achats
    let bar_width = area.width.saturating_sub(4) as usize;
    let buy_cells = ratio_cells(ratio.buy_percent, bar_width);
    let sell_cells = bar_width - buy_cells;

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!(" ▲ Achats estimés  {:>5.1}%", ratio.buy_percent),
            Style::default()
                .fg(UP_COLOR)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!(" ▼ Ventes estimées {:>5.1}%", ratio.sell_percent),
            Style::default()
                .fg(DOWN_COLOR)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::raw(" "),
            Span::styled(
                UNICODE_BAR.to_string().repeat(buy_cells),
                Style::default().fg(UP_COLOR),
            ),
            Span::styled(
                UNICODE_BAR.to_string().repeat(sell_cells),
                Style::default().fg(DOWN_COLOR),
            ),
        ]),
    ];

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}

/// Ligne de synthèse de l'histogramme : totaux des tranches hautes et basses
fn totals_line(histogram: &ChangeHistogram) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!(" ▲ {} en hausse", histogram.up_count()),
            Style::default().fg(UP_COLOR).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("   ▼ {} en baisse", histogram.down_count()),
            Style::default().fg(DOWN_COLOR).add_modifier(Modifier::BOLD),
        ),
    ])
}

/// Message affiché tant qu'aucun snapshot n'est disponible
fn render_empty(frame: &mut Frame, block: Block, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Aucune donnée de marché",
            Style::default().fg(Color::Gray),
        )),
        Line::from(Span::styled(
            "En attente du premier fetch CoinGecko",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Helpers d'échelle
// ============================================================================

/// Nombre de cellules d'une barre de tranche
///
/// Échelle relative au max : la tranche la plus remplie occupe bar_width.
/// Une tranche non vide affiche toujours au moins une cellule, sinon un
/// coin isolé deviendrait invisible.
fn scaled_bar_cells(count: usize, max_count: usize, bar_width: usize) -> usize {
    if count == 0 || bar_width == 0 {
        return 0;
    }
    ((count * bar_width) / max_count.max(1)).max(1)
}

/// Nombre de cellules de la part verte de la barre achat/vente
fn ratio_cells(percent: f64, bar_width: usize) -> usize {
    let cells = ((percent / 100.0) * bar_width as f64).round() as usize;
    cells.min(bar_width)
}

// ============================================================================
// Tests
// ============================================================================
