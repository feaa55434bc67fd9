// ============================================================================
// WalletView - Page wallet en terminal
// ============================================================================
// Récupère les soldes et les prix, les passe dans le pipeline
// (filtre -> tri -> formatage) et affiche la liste dans un TUI.
//
// Usage :
//   walletview          # interface TUI
//   walletview --json   # affiche la liste traitée en JSON et quitte
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : boucle qui gère événements et rendering
// 3. Worker thread + channels : appels réseau sans bloquer l'UI
// ============================================================================

use std::io;
use std::sync::{mpsc, Arc, Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info, warn};

use walletview::api::{fetch_snapshot, source_from_config, WalletSource};
use walletview::app::App;
use walletview::config::Config;
use walletview::models::{PriceTable, WalletBalance};
use walletview::ui::{events::EventHandler, render, Event};

// ============================================================================
// Commandes et résultats du worker thread
// ============================================================================

/// Commandes envoyées au worker thread
#[derive(Debug, Clone, Copy)]
enum AppCommand {
    /// Recharger soldes et prix
    Refresh,
}

/// Résultats renvoyés par le worker thread
#[derive(Debug)]
enum AppResult {
    /// Soldes et prix récupérés avec succès
    SnapshotLoaded {
        balances: Vec<WalletBalance>,
        prices: PriceTable,
    },

    /// Erreur lors de la récupération
    LoadError { error: String },
}

/// Verrouille l'état partagé
///
/// Un thread qui panique en tenant le verrou ne doit pas bloquer l'UI :
/// on récupère l'état tel quel.
fn lock_app(app: &Mutex<App>) -> MutexGuard<'_, App> {
    app.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Initialisation du logging
// ============================================================================
// Les println! ne fonctionnent pas une fois le TUI lancé : on log vers un
// fichier avec rotation quotidienne.
// ============================================================================

/// Initialise le système de logging vers fichier
///
/// # Utilisation
/// ```bash
/// tail -f ./logs/walletview.log.*
/// RUST_LOG=walletview=trace cargo run
/// ```
fn init_logging(config: &Config) -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = config.log_dir();

    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "walletview.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false) // Pas de codes couleur dans le fichier
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .with(
            // Par défaut : debug pour walletview, info pour les dépendances
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "walletview=debug,info".into()),
        )
        .init();

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    // La config est chargée avant le logging (elle fournit log_dir)
    let config = Config::load_default()?;

    init_logging(&config).unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    info!(source = ?config.source, policy = ?config.unknown_chain_policy, "WalletView starting up");

    let source = source_from_config(&config.source)?;

    // CONCEPT RUST : Exécuter du code async dans du code sync
    // - block_on() exécute la future jusqu'au bout
    eprintln!("📊 Chargement des soldes et des prix...");
    let runtime = tokio::runtime::Runtime::new().context("Échec de la création du runtime tokio")?;
    let initial = runtime.block_on(fetch_snapshot(source.as_ref()));
    drop(runtime);

    let mut app = App::with_processor(config.processor()).with_refresh_secs(config.refresh_secs);
    match initial {
        Ok((balances, prices)) => {
            info!(balances = balances.len(), prices = prices.len(), "Initial data loaded");
            app.apply_snapshot(balances, prices);
            eprintln!("✅ Données chargées !");
        }
        Err(e) => {
            // Pas fatal : l'UI démarre avec l'erreur affichée, 'r' pour réessayer
            error!(error = ?e, "Initial load failed");
            eprintln!("⚠ Échec du chargement : {:#}", e);
            app.record_error(format!("{:#}", e));
        }
    }

    if std::env::args().any(|arg| arg == "--json") {
        return print_json(&app);
    }

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    // Arc<Mutex<App>> : état partagé entre l'UI et le worker
    let app = Arc::new(Mutex::new(app));

    let (command_tx, command_rx) = mpsc::channel::<AppCommand>();
    let (result_tx, result_rx) = mpsc::channel::<AppResult>();

    info!("Spawning background worker thread");
    spawn_background_worker(source, command_rx, result_tx, app.clone());

    let events = EventHandler::new();

    info!("Starting event loop");
    let result = run(&mut terminal, app, &events, command_tx, result_rx);

    // Restaure le terminal (même en cas d'erreur)
    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

/// Affiche la liste traitée en JSON sur stdout
fn print_json(app: &App) -> Result<()> {
    if let Some(error) = &app.last_error {
        anyhow::bail!("Impossible de récupérer les données : {}", error);
    }

    let json = serde_json::to_string_pretty(app.rows()).context("Échec de la sérialisation JSON")?;
    println!("{}", json);
    Ok(())
}

// ============================================================================
// Background Worker Thread
// ============================================================================
// Thread séparé avec son propre runtime tokio :
// - reçoit des AppCommand (command_rx)
// - renvoie des AppResult (result_tx)
// ============================================================================

fn spawn_background_worker(
    source: Box<dyn WalletSource>,
    command_rx: mpsc::Receiver<AppCommand>,
    result_tx: mpsc::Sender<AppResult>,
    app: Arc<Mutex<App>>,
) {
    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Runtime::new() {
            Ok(runtime) => runtime,
            Err(e) => {
                error!(error = ?e, "Failed to create worker runtime");
                let _ = result_tx.send(AppResult::LoadError {
                    error: format!("Runtime indisponible : {}", e),
                });
                return;
            }
        };

        // recv() retourne Err quand l'UI a fermé le channel
        while let Ok(command) = command_rx.recv() {
            info!(?command, "Worker received command");

            match command {
                AppCommand::Refresh => {
                    // L'UI a déjà passé l'app en chargement (App::begin_refresh)
                    let result = runtime.block_on(fetch_snapshot(source.as_ref()));

                    let message = match result {
                        Ok((balances, prices)) => {
                            info!(balances = balances.len(), prices = prices.len(), "Snapshot refreshed");
                            AppResult::SnapshotLoaded { balances, prices }
                        }
                        Err(e) => {
                            error!(error = ?e, "Failed to refresh snapshot");
                            AppResult::LoadError {
                                error: format!("{:#}", e),
                            }
                        }
                    };

                    let _ = result_tx.send(message);
                    lock_app(&app).stop_loading();
                }
            }
        }

        info!("Worker thread exiting (channel closed)");
    });
}

// ============================================================================
// Event Loop Principal
// ============================================================================
// À chaque itération :
//   0. Résultats du worker
//   1. Render
//   2. Input
//   3. Update (auto-refresh)
// ============================================================================

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: Arc<Mutex<App>>,
    events: &EventHandler,
    command_tx: mpsc::Sender<AppCommand>,
    result_rx: mpsc::Receiver<AppResult>,
) -> Result<()> {
    loop {
        if !lock_app(&app).is_running() {
            break;
        }

        // 0. RÉSULTATS : try_recv ne bloque pas
        match result_rx.try_recv() {
            Ok(AppResult::SnapshotLoaded { balances, prices }) => {
                lock_app(&app).apply_snapshot(balances, prices);
            }
            Ok(AppResult::LoadError { error }) => {
                warn!(error = %error, "Keeping previous data after failed refresh");
                lock_app(&app).record_error(error);
            }
            Err(mpsc::TryRecvError::Empty) => {}
            Err(mpsc::TryRecvError::Disconnected) => {
                error!("Worker thread disconnected!");
            }
        }

        // 1. RENDER
        terminal.draw(|frame| {
            let app_lock = lock_app(&app);
            render(frame, &app_lock);
        })?;

        // 2. INPUT
        match events.next() {
            Ok(event) => handle_event(&mut lock_app(&app), event, &command_tx),
            Err(e) => debug!(error = ?e, "Failed to read terminal event"),
        }

        // 3. UPDATE : rafraîchissement automatique
        let refresh_due = {
            let mut app_lock = lock_app(&app);
            app_lock.tick() && app_lock.begin_refresh()
        };
        if refresh_due {
            debug!("Auto-refresh due");
            send_refresh(&mut lock_app(&app), &command_tx);
        }
    }

    Ok(())
}

// ============================================================================
// Gestion des événements
// ============================================================================

/// Traite un événement et met à jour l'état de l'application
fn handle_event(app: &mut App, event: Event, command_tx: &mpsc::Sender<AppCommand>) {
    use walletview::ui::events::{
        is_down_event, is_escape_event, is_quit_event, is_refresh_event, is_up_event,
    };

    match event {
        // Two-step quit : première pression = confirmation, deuxième = quit
        Event::Key(_) if is_quit_event(&event) => {
            if app.is_awaiting_quit_confirmation() {
                info!("User confirmed quit");
                app.quit();
            } else {
                info!("User requested quit (awaiting confirmation)");
                app.request_quit();
            }
        }

        Event::Key(_) if is_up_event(&event) => {
            app.cancel_quit();
            app.navigate_up();
        }

        Event::Key(_) if is_down_event(&event) => {
            app.cancel_quit();
            app.navigate_down();
        }

        Event::Key(_) if is_refresh_event(&event) => {
            app.cancel_quit();
            if app.begin_refresh() {
                info!("User requested refresh");
                send_refresh(app, command_tx);
            } else {
                debug!("Refresh already in progress, ignoring");
            }
        }

        Event::Key(_) if is_escape_event(&event) => {
            app.cancel_quit();
        }

        // Toute autre touche : annule la confirmation
        Event::Key(_) => app.cancel_quit(),

        Event::Tick => {}
    }
}

/// Envoie la commande au worker
///
/// Si le worker est parti, on sort du chargement pour ne pas bloquer les
/// rafraîchissements suivants.
fn send_refresh(app: &mut App, command_tx: &mpsc::Sender<AppCommand>) {
    if command_tx.send(AppCommand::Refresh).is_err() {
        error!("Worker thread unavailable, refresh dropped");
        app.stop_loading();
        app.record_error("Worker indisponible".to_string());
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================

/// Configure le terminal en mode TUI (raw mode + alternate screen)
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

/// Restaure le terminal à son état normal
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
