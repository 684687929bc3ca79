use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use tokio::runtime::Runtime;

use crate::api::PriceDataProvider;
use crate::models::{FilterSelection, Instrument, Region, ScreenReport, Window};
use crate::screener::ScreenerEngine;
use crate::universe::distinct_sectors;

use super::view;

/// Which filter panel owns the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPanel {
    Regions,
    Sectors,
    Window,
}

pub struct ScreenerApp<P> {
    engine: ScreenerEngine<P>,
    universe: Vec<Instrument>,
    pub regions: Vec<(Region, bool)>,
    pub sectors: Vec<(String, bool)>,
    pub window: Window,
    pub focus: FocusPanel,
    pub cursor: usize,
    pub report: Option<ScreenReport>,
    pub show_failures: bool,
    pub should_quit: bool,
}

impl<P: PriceDataProvider + Send + Sync> ScreenerApp<P> {
    pub fn new(
        engine: ScreenerEngine<P>,
        universe: Vec<Instrument>,
        initial: FilterSelection,
    ) -> Self {
        let regions = Region::ALL
            .iter()
            .map(|region| (*region, initial.regions.contains(region)))
            .collect();
        let sectors = distinct_sectors(&universe)
            .into_iter()
            .map(|sector| {
                let selected = initial.sectors.contains(&sector);
                (sector, selected)
            })
            .collect();

        Self {
            engine,
            universe,
            regions,
            sectors,
            window: initial.window,
            focus: FocusPanel::Regions,
            cursor: 0,
            report: None,
            show_failures: false,
            should_quit: false,
        }
    }

    /// Current filter state as a screening request
    pub fn selection(&self) -> FilterSelection {
        FilterSelection {
            regions: self
                .regions
                .iter()
                .filter(|(_, selected)| *selected)
                .map(|(region, _)| *region)
                .collect(),
            sectors: self
                .sectors
                .iter()
                .filter(|(_, selected)| *selected)
                .map(|(sector, _)| sector.clone())
                .collect(),
            window: self.window,
        }
    }

    /// Run one screening pass with the current filters. Blocks the UI for
    /// the duration of the fetches.
    pub fn run_screen(&mut self, runtime: &Runtime) {
        let selection = self.selection();
        let today = chrono::Utc::now().date_naive();
        let report = runtime.block_on(self.engine.screen(&self.universe, &selection, today));
        self.report = Some(report);
    }

    pub fn handle_key(&mut self, key: KeyCode, runtime: &Runtime) {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            KeyCode::Tab => {
                self.next_panel();
            }
            KeyCode::BackTab => {
                self.previous_panel();
            }
            KeyCode::Up => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.cursor + 1 < self.focused_len() {
                    self.cursor += 1;
                }
            }
            KeyCode::Char(' ') => {
                self.toggle_current();
            }
            KeyCode::Enter | KeyCode::Char('r') | KeyCode::Char('R') => {
                self.run_screen(runtime);
            }
            KeyCode::Char('f') | KeyCode::Char('F') => {
                self.show_failures = !self.show_failures;
            }
            KeyCode::Char('1') => {
                self.window = Window::OneWeek;
            }
            KeyCode::Char('2') => {
                self.window = Window::OneMonth;
            }
            _ => {}
        }
    }

    fn focused_len(&self) -> usize {
        match self.focus {
            FocusPanel::Regions => self.regions.len(),
            FocusPanel::Sectors => self.sectors.len(),
            FocusPanel::Window => Window::ALL.len(),
        }
    }

    fn next_panel(&mut self) {
        self.focus = match self.focus {
            FocusPanel::Regions => FocusPanel::Sectors,
            FocusPanel::Sectors => FocusPanel::Window,
            FocusPanel::Window => FocusPanel::Regions,
        };
        self.cursor = 0;
    }

    fn previous_panel(&mut self) {
        self.focus = match self.focus {
            FocusPanel::Regions => FocusPanel::Window,
            FocusPanel::Sectors => FocusPanel::Regions,
            FocusPanel::Window => FocusPanel::Sectors,
        };
        self.cursor = 0;
    }

    fn toggle_current(&mut self) {
        match self.focus {
            FocusPanel::Regions => {
                if let Some((_, selected)) = self.regions.get_mut(self.cursor) {
                    *selected = !*selected;
                }
            }
            FocusPanel::Sectors => {
                if let Some((_, selected)) = self.sectors.get_mut(self.cursor) {
                    *selected = !*selected;
                }
            }
            FocusPanel::Window => {
                if let Some(window) = Window::ALL.get(self.cursor) {
                    self.window = *window;
                }
            }
        }
    }
}

/// Run the dashboard until the user quits
pub fn run_app<P: PriceDataProvider + Send + Sync>(
    runtime: &Runtime,
    engine: ScreenerEngine<P>,
    universe: Vec<Instrument>,
    initial: FilterSelection,
) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    io::stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    let mut app = ScreenerApp::new(engine, universe, initial);
    app.run_screen(runtime);

    // Main application loop
    let result = loop {
        if let Err(e) = terminal.draw(|f| view::draw(f, &app)) {
            break Err(e.into());
        }

        if let Ok(Event::Key(key)) = event::read() {
            if key.kind == KeyEventKind::Press {
                app.handle_key(key.code, runtime);

                if app.should_quit {
                    break Ok(());
                }
            }
        }
    };

    // Cleanup terminal
    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DailyClose;
    use crate::universe::default_universe;
    use chrono::NaiveDate;

    struct NullProvider;

    #[async_trait::async_trait]
    impl PriceDataProvider for NullProvider {
        async fn fetch_daily_closes(
            &self,
            _symbol: &str,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> anyhow::Result<Vec<DailyClose>> {
            Ok(Vec::new())
        }
    }

    fn app() -> ScreenerApp<NullProvider> {
        ScreenerApp::new(
            ScreenerEngine::new(NullProvider),
            default_universe(),
            FilterSelection::all_regions(Window::OneWeek),
        )
    }

    #[test]
    fn test_initial_selection_round_trips() {
        let app = app();
        let selection = app.selection();
        assert_eq!(selection.regions.len(), Region::ALL.len());
        assert!(selection.sectors.is_empty());
        assert_eq!(selection.window, Window::OneWeek);
    }

    #[test]
    fn test_toggle_region_updates_selection() {
        let mut app = app();
        // Cursor starts on the first region (US)
        app.toggle_current();
        let selection = app.selection();
        assert!(!selection.regions.contains(&Region::Us));
        assert_eq!(selection.regions.len(), Region::ALL.len() - 1);
    }

    #[test]
    fn test_sector_toggle_restricts_selection() {
        let mut app = app();
        app.focus = FocusPanel::Sectors;
        app.cursor = 0; // "Automotive" (sorted)
        app.toggle_current();

        let selection = app.selection();
        assert_eq!(selection.sectors.len(), 1);
        assert!(selection.sectors.contains("Automotive"));
    }

    #[test]
    fn test_panel_cycle_resets_cursor() {
        let mut app = app();
        app.cursor = 2;
        app.next_panel();
        assert_eq!(app.focus, FocusPanel::Sectors);
        assert_eq!(app.cursor, 0);

        app.next_panel();
        assert_eq!(app.focus, FocusPanel::Window);
        app.next_panel();
        assert_eq!(app.focus, FocusPanel::Regions);
    }

    #[test]
    fn test_window_panel_selects_instead_of_toggles() {
        let mut app = app();
        app.focus = FocusPanel::Window;
        app.cursor = 1;
        app.toggle_current();
        assert_eq!(app.window, Window::OneMonth);

        app.cursor = 0;
        app.toggle_current();
        assert_eq!(app.window, Window::OneWeek);
    }

    #[test]
    fn test_cursor_stays_in_bounds() {
        let runtime = Runtime::new().unwrap();
        let mut app = app();
        app.focus = FocusPanel::Window;
        for _ in 0..10 {
            app.handle_key(KeyCode::Down, &runtime);
        }
        assert_eq!(app.cursor, Window::ALL.len() - 1);

        for _ in 0..10 {
            app.handle_key(KeyCode::Up, &runtime);
        }
        assert_eq!(app.cursor, 0);
    }

    #[test]
    fn test_quit_key_sets_flag() {
        let runtime = Runtime::new().unwrap();
        let mut app = app();
        app.handle_key(KeyCode::Char('q'), &runtime);
        assert!(app.should_quit);
    }
}
