// ============================================================================
// Dashboard - Rendu de la page wallet
// ============================================================================
// Dessine l'interface TUI en utilisant les widgets de ratatui
//
// Layout :
// ┌ header : titre + date de dernière mise à jour ┐
// │ liste  : une ligne par solde (clé = devise)    │
// └ footer : total, état, raccourcis               ┘
//
// CONCEPTS RATATUI :
// 1. Frame : surface de dessin
// 2. Widgets : composants UI (Block, Paragraph, List)
// 3. Layout : découpage de l'espace en zones
// 4. ListState : la sélection fait défiler la liste quand elle dépasse l'écran
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::app::App;
use crate::models::{format_usd, FormattedWalletBalance};

/// Message affiché quand aucun solde n'est retenu
pub const EMPTY_MESSAGE: &str = "No balances available";

/// Dessine l'interface complète
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = create_layout(frame.size());

    render_header(frame, app, chunks[0]);
    render_balances(frame, app, chunks[1]);
    render_footer(frame, app, chunks[2]);
}

/// Crée le layout principal (header, content, footer)
fn create_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Liste
            Constraint::Length(4), // Footer : statut + raccourcis
        ])
        .split(area)
        .to_vec()
}

/// Dessine le header avec le titre et l'heure de mise à jour
fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" WalletView ")
        .title_alignment(Alignment::Center);

    let updated = match app.last_updated {
        Some(at) => format!("Mis à jour : {}", at.format("%Y-%m-%d %H:%M:%S UTC")),
        None => "Pas encore de données".to_string(),
    };

    let paragraph = Paragraph::new(Line::from(Span::styled(
        updated,
        Style::default().fg(Color::Gray),
    )))
    .block(block)
    .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

/// Dessine la liste des soldes
fn render_balances(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Balances ");

    // Liste vide : état vide explicite
    if app.rows().is_empty() {
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(EMPTY_MESSAGE, Style::default().fg(Color::Gray))),
        ];

        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center);

        frame.render_widget(paragraph, area);
        return;
    }

    // L'identité d'une ligne reste sa devise (voir App::selected_currency) :
    // l'index ne sert qu'au surlignage et au défilement
    let items: Vec<ListItem> = app
        .rows()
        .iter()
        .map(|row| ListItem::new(format!(" {}", row.display())).style(row_style(row)))
        .collect();

    let header = ListItem::new(format!(
        " {:<8} {:<12} {:>14} {:>14}",
        "CURRENCY", "CHAIN", "AMOUNT", "USD"
    ))
    .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    let list = List::new(std::iter::once(header).chain(items))
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED));

    // CONCEPT RATATUI : Stateful widget
    // - +1 : la première ligne de la liste est l'en-tête des colonnes
    // - ratatui ajuste l'offset pour garder la ligne sélectionnée visible
    let mut state = ListState::default().with_selected(Some(app.selected_index + 1));

    frame.render_stateful_widget(list, area, &mut state);
}

/// Couleur d'une ligne : vert si valorisée, gris si le prix est inconnu
fn row_style(row: &FormattedWalletBalance) -> Style {
    if row.usd_value > 0.0 {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Gray)
    }
}

/// Dessine le footer : ligne de statut + raccourcis clavier
fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(vec![status_line(app), shortcuts_line(app)])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

/// Ligne de statut
///
/// Priorité d'affichage : chargement > erreur > avertissement qualité > total
fn status_line(app: &App) -> Line<'static> {
    if app.is_loading_data() {
        let message = app
            .loading_message
            .clone()
            .unwrap_or_else(|| "Chargement...".to_string());
        return Line::from(Span::styled(message, Style::default().fg(Color::Yellow)));
    }

    if let Some(error) = &app.last_error {
        return Line::from(Span::styled(
            format!("Erreur : {}", error),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }

    let mut spans = vec![
        Span::raw("Total : "),
        Span::styled(
            format_usd(app.total_usd()),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
    ];

    let report = app.report();
    if report.has_data_quality_warning() {
        spans.push(Span::styled(
            format!(
                "  ⚠ {} solde(s) ignoré(s) : blockchain inconnue",
                report.skipped.unknown_chain
            ),
            Style::default().fg(Color::Yellow),
        ));
    }

    Line::from(spans)
}

/// Ligne des raccourcis (ou confirmation de quit)
fn shortcuts_line(app: &App) -> Line<'static> {
    if app.is_awaiting_quit_confirmation() {
        return Line::from(vec![
            Span::styled(
                "⚠  Appuyez sur ",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "[q]",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD | Modifier::SLOW_BLINK),
            ),
            Span::styled(
                " à nouveau pour quitter, ou n'importe quelle autre touche pour annuler ⚠",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ]);
    }

    let key = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    Line::from(vec![
        Span::styled("[q]", key),
        Span::raw(" Quit  "),
        Span::styled("[↑↓ / j k]", key),
        Span::raw(" Navigate  "),
        Span::styled("[r]", key),
        Span::raw(" Refresh"),
    ])
}

// ============================================================================
// Tests
// ============================================================================
