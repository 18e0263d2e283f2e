pub mod forms;

use std::time::{Duration, Instant};

use chrono::{Datelike, Local, NaiveDate};
use crossterm::event::{self, Event, KeyEvent};

use api_types::{
    GatewayWrite,
    keyword::{KeywordAdd, KeywordDelete, KeywordEntry},
    search::SearchResponse,
    stats::{ChartData, FinancialSummary, MonthlySummary},
    transaction::{Transaction, TransactionDelete},
};

use crate::{
    cache::ViewCache,
    client::{Client, SearchFilter},
    config::AppConfig,
    debounce::Debouncer,
    error::{AppError, Result},
    pagination::{PAGE_SIZE, Pager},
    summary::{self, Totals},
    ui::{self, keymap::AppAction},
    validate,
};

use forms::TransactionForm;

const TICK_RATE: Duration = Duration::from_millis(200);
const SEARCH_DEBOUNCE: Duration = Duration::from_millis(400);
const TOAST_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Daily,
    Stats,
    Chart,
    Monthly,
    Search,
    Keywords,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Self::Daily,
        Self::Stats,
        Self::Chart,
        Self::Monthly,
        Self::Search,
        Self::Keywords,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Daily => "Giorno",
            Self::Stats => "Statistiche",
            Self::Chart => "Andamento",
            Self::Monthly => "Mese",
            Self::Search => "Cerca",
            Self::Keywords => "Parole chiave",
        }
    }

    pub fn shortcut(self) -> char {
        match self {
            Self::Daily => 'g',
            Self::Stats => 's',
            Self::Chart => 'a',
            Self::Monthly => 'm',
            Self::Search => 'c',
            Self::Keywords => 'p',
        }
    }

    fn holds_transactions(self) -> bool {
        matches!(self, Self::Daily | Self::Monthly | Self::Search)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug)]
pub struct ToastState {
    pub message: String,
    pub level: ToastLevel,
    expires_at: Instant,
}

#[derive(Debug, Clone)]
pub struct PendingDelete {
    pub id: String,
    pub date: NaiveDate,
}

/// Modal state; at most one overlay is open at a time.
#[derive(Debug)]
pub enum Overlay {
    None,
    Form(TransactionForm),
    ConfirmDelete(PendingDelete),
}

#[derive(Debug)]
pub struct DailyState {
    pub date_input: String,
    pub editing: bool,
    pub items: Vec<Transaction>,
    pub totals: Totals,
    pub pager: Pager,
    pub selected: usize,
    pub loaded: bool,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeField {
    Start,
    End,
}

#[derive(Debug)]
pub struct StatsState {
    pub start_input: String,
    pub end_input: String,
    pub editing: bool,
    pub focus: RangeField,
    pub summary: Option<FinancialSummary>,
    pub chart: Option<ChartData>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug)]
pub struct ChartState {
    pub start_input: String,
    pub end_input: String,
    pub editing: bool,
    pub focus: RangeField,
    pub data: Vec<MonthlySummary>,
    pub loaded: bool,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug)]
pub struct MonthlyState {
    pub month_input: String,
    pub editing: bool,
    pub items: Vec<Transaction>,
    pub totals: Totals,
    pub pager: Pager,
    pub selected: usize,
    pub loaded: bool,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Month,
    Content,
    Amount,
    Category,
}

impl SearchField {
    pub fn next(self) -> Self {
        match self {
            Self::Month => Self::Content,
            Self::Content => Self::Amount,
            Self::Amount => Self::Category,
            Self::Category => Self::Month,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Month => "Mese",
            Self::Content => "Contenuto",
            Self::Amount => "Importo",
            Self::Category => "Categoria",
        }
    }
}

#[derive(Debug)]
pub struct SearchState {
    pub month_input: String,
    pub content_input: String,
    pub amount_input: String,
    pub category_input: String,
    pub editing: bool,
    pub focus: SearchField,
    pub page: u32,
    pub response: Option<SearchResponse>,
    pub selected: usize,
    pub last_key: Option<String>,
    pub debounce: Debouncer,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordField {
    Category,
    Term,
}

#[derive(Debug)]
pub struct KeywordsState {
    pub items: Vec<KeywordEntry>,
    pub loaded: bool,
    pub loading: bool,
    pub error: Option<String>,
    pub editing: bool,
    pub focus: KeywordField,
    pub categories: Vec<String>,
    pub category_index: usize,
    pub term_input: String,
    pub form_error: Option<String>,
    pub submitting: bool,
}

#[derive(Debug)]
pub struct AppState {
    pub section: Section,
    pub daily: DailyState,
    pub stats: StatsState,
    pub chart: ChartState,
    pub monthly: MonthlyState,
    pub search: SearchState,
    pub keywords: KeywordsState,
    pub overlay: Overlay,
    pub toast: Option<ToastState>,
    pub sheet_id: String,
    pub cache: ViewCache,
}

impl AppState {
    fn new(config: &AppConfig) -> Self {
        let today = Local::now().date_naive();
        let first_of_month = today.with_day(1).unwrap_or(today);
        let current_month = format!("{:02}", today.month());

        Self {
            section: Section::Daily,
            daily: DailyState {
                date_input: today.format("%Y-%m-%d").to_string(),
                editing: false,
                items: Vec::new(),
                totals: Totals::default(),
                pager: Pager::default(),
                selected: 0,
                loaded: false,
                loading: false,
                error: None,
            },
            stats: StatsState {
                start_input: first_of_month.format("%Y-%m-%d").to_string(),
                end_input: today.format("%Y-%m-%d").to_string(),
                editing: false,
                focus: RangeField::Start,
                summary: None,
                chart: None,
                loading: false,
                error: None,
            },
            chart: ChartState {
                start_input: "01".to_string(),
                end_input: current_month.clone(),
                editing: false,
                focus: RangeField::Start,
                data: Vec::new(),
                loaded: false,
                loading: false,
                error: None,
            },
            monthly: MonthlyState {
                month_input: current_month,
                editing: false,
                items: Vec::new(),
                totals: Totals::default(),
                pager: Pager::default(),
                selected: 0,
                loaded: false,
                loading: false,
                error: None,
            },
            search: SearchState {
                month_input: String::new(),
                content_input: String::new(),
                amount_input: String::new(),
                category_input: String::new(),
                editing: false,
                focus: SearchField::Content,
                page: 1,
                response: None,
                selected: 0,
                last_key: None,
                debounce: Debouncer::new(SEARCH_DEBOUNCE),
                loading: false,
                error: None,
            },
            keywords: KeywordsState {
                items: Vec::new(),
                loaded: false,
                loading: false,
                error: None,
                editing: false,
                focus: KeywordField::Category,
                categories: Vec::new(),
                category_index: 0,
                term_input: String::new(),
                form_error: None,
                submitting: false,
            },
            overlay: Overlay::None,
            toast: None,
            sheet_id: config.sheet_id.clone(),
            cache: ViewCache::default(),
        }
    }
}

pub struct App {
    client: Client,
    pub state: AppState,
    should_quit: bool,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let client = Client::new(&config)?;
        let state = AppState::new(&config);
        Ok(Self {
            client,
            state,
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = ui::setup_terminal()?;
        let result = self.event_loop(&mut terminal).await;
        ui::restore_terminal(&mut terminal)?;
        result
    }

    async fn event_loop(&mut self, terminal: &mut ui::Terminal) -> Result<()> {
        while !self.should_quit {
            terminal
                .draw(|frame| ui::render(frame, &self.state))
                .map_err(|err| AppError::Terminal(err.to_string()))?;

            self.tick().await?;

            if event::poll(TICK_RATE)? {
                match event::read()? {
                    Event::Key(key) => self.handle_key(key).await?,
                    Event::Resize(_, _) => {}
                    _ => {}
                }
            }
        }

        Ok(())
    }

    /// Timer-driven work: toast expiry and the search debounce.
    async fn tick(&mut self) -> Result<()> {
        if let Some(toast) = &self.state.toast
            && Instant::now() >= toast.expires_at
        {
            self.state.toast = None;
        }
        if self.state.search.debounce.fire() && self.state.section == Section::Search {
            self.run_search().await?;
        }
        Ok(())
    }

    fn toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.state.toast = Some(ToastState {
            message: message.into(),
            level,
            expires_at: Instant::now() + TOAST_TTL,
        });
    }

    async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        let action = ui::keymap::map_key(key);
        if action == AppAction::None {
            return Ok(());
        }
        if action == AppAction::ForceQuit {
            self.should_quit = true;
            return Ok(());
        }

        match self.state.overlay {
            Overlay::Form(_) => return self.handle_form_key(action).await,
            Overlay::ConfirmDelete(_) => return self.handle_confirm_key(action).await,
            Overlay::None => {}
        }

        if self.section_is_editing() {
            return self.handle_edit_key(action).await;
        }
        self.handle_normal_key(action).await
    }

    fn section_is_editing(&self) -> bool {
        match self.state.section {
            Section::Daily => self.state.daily.editing,
            Section::Stats => self.state.stats.editing,
            Section::Chart => self.state.chart.editing,
            Section::Monthly => self.state.monthly.editing,
            Section::Search => self.state.search.editing,
            Section::Keywords => self.state.keywords.editing,
        }
    }

    async fn handle_normal_key(&mut self, action: AppAction) -> Result<()> {
        match action {
            AppAction::Input('q') => self.should_quit = true,
            AppAction::Input('g') => self.switch_section(Section::Daily).await?,
            AppAction::Input('s') => self.switch_section(Section::Stats).await?,
            AppAction::Input('a') => self.switch_section(Section::Chart).await?,
            AppAction::Input('m') => self.switch_section(Section::Monthly).await?,
            AppAction::Input('c') => self.switch_section(Section::Search).await?,
            AppAction::Input('p') => self.switch_section(Section::Keywords).await?,
            AppAction::Input('/') => self.start_editing().await?,
            AppAction::Input('n') => {
                if self.state.section.holds_transactions() {
                    self.open_add_form().await?;
                }
            }
            AppAction::Input('e') => {
                if self.state.section.holds_transactions() {
                    self.open_edit_form().await?;
                }
            }
            AppAction::Input('x') => match self.state.section {
                Section::Daily | Section::Monthly | Section::Search => {
                    self.request_delete();
                }
                Section::Keywords => self.delete_keyword().await?,
                _ => {}
            },
            AppAction::Input('r') => self.force_refresh().await?,
            AppAction::Submit => self.load_current().await?,
            AppAction::Left => self.page_turn(-1).await?,
            AppAction::Right => self.page_turn(1).await?,
            AppAction::Up => self.select_move(-1),
            AppAction::Down => self.select_move(1),
            _ => {}
        }
        Ok(())
    }

    async fn switch_section(&mut self, section: Section) -> Result<()> {
        self.state.section = section;
        match section {
            Section::Daily if !self.state.daily.loaded => self.load_daily().await,
            Section::Monthly if !self.state.monthly.loaded => self.load_monthly().await,
            Section::Keywords if !self.state.keywords.loaded => self.load_keywords().await,
            _ => Ok(()),
        }
    }

    async fn load_current(&mut self) -> Result<()> {
        match self.state.section {
            Section::Daily => self.load_daily().await,
            Section::Stats => self.load_stats().await,
            Section::Chart => self.load_chart().await,
            Section::Monthly => self.load_monthly().await,
            Section::Search => self.run_search().await,
            Section::Keywords => self.load_keywords().await,
        }
    }

    /// User-triggered reload: drops the current view's slot first so the
    /// next fetch really goes to the network.
    async fn force_refresh(&mut self) -> Result<()> {
        match self.state.section {
            Section::Daily => self.state.cache.daily.invalidate(),
            Section::Monthly => self.state.cache.monthly.invalidate(),
            Section::Search => self.state.cache.search.invalidate(),
            Section::Keywords => self.state.cache.keywords.invalidate(),
            Section::Stats | Section::Chart => {}
        }
        self.load_current().await
    }

    async fn page_turn(&mut self, delta: i64) -> Result<()> {
        match self.state.section {
            Section::Daily => {
                let len = self.state.daily.items.len();
                self.state.daily.pager.advance(delta, len);
                self.state.daily.selected = 0;
            }
            Section::Monthly => {
                let len = self.state.monthly.items.len();
                self.state.monthly.pager.advance(delta, len);
                self.state.monthly.selected = 0;
            }
            Section::Search => self.search_turn_page(delta).await?,
            _ => {}
        }
        Ok(())
    }

    fn select_move(&mut self, delta: i64) {
        match self.state.section {
            Section::Daily => {
                let len = self.state.daily.pager.slice(&self.state.daily.items).len();
                move_selection(&mut self.state.daily.selected, delta, len);
            }
            Section::Monthly => {
                let len = self
                    .state
                    .monthly
                    .pager
                    .slice(&self.state.monthly.items)
                    .len();
                move_selection(&mut self.state.monthly.selected, delta, len);
            }
            Section::Search => {
                let len = self
                    .state
                    .search
                    .response
                    .as_ref()
                    .map_or(0, |response| response.transactions.len());
                move_selection(&mut self.state.search.selected, delta, len);
            }
            _ => {}
        }
    }

    async fn start_editing(&mut self) -> Result<()> {
        match self.state.section {
            Section::Daily => self.state.daily.editing = true,
            Section::Stats => {
                self.state.stats.editing = true;
                self.state.stats.focus = RangeField::Start;
            }
            Section::Chart => {
                self.state.chart.editing = true;
                self.state.chart.focus = RangeField::Start;
            }
            Section::Monthly => self.state.monthly.editing = true,
            Section::Search => {
                self.state.search.editing = true;
                self.state.search.focus = SearchField::Content;
            }
            Section::Keywords => {
                // The category selector always reflects a fresh list.
                match self.client.categories().await {
                    Ok(categories) => {
                        let keywords = &mut self.state.keywords;
                        keywords.category_index = 0;
                        keywords.categories = categories;
                        keywords.form_error = None;
                        keywords.focus = KeywordField::Category;
                        keywords.editing = true;
                    }
                    Err(err) => self.toast(
                        ToastLevel::Error,
                        format!("Errore nel caricamento delle categorie: {err}"),
                    ),
                }
            }
        }
        Ok(())
    }

    async fn handle_edit_key(&mut self, action: AppAction) -> Result<()> {
        match self.state.section {
            Section::Daily => match action {
                AppAction::Cancel => self.state.daily.editing = false,
                AppAction::Submit => {
                    self.state.daily.editing = false;
                    self.load_daily().await?;
                }
                AppAction::Backspace => {
                    self.state.daily.date_input.pop();
                }
                AppAction::Input(ch) => self.state.daily.date_input.push(ch),
                _ => {}
            },
            Section::Stats => match action {
                AppAction::Cancel => self.state.stats.editing = false,
                AppAction::NextField => {
                    self.state.stats.focus = match self.state.stats.focus {
                        RangeField::Start => RangeField::End,
                        RangeField::End => RangeField::Start,
                    };
                }
                AppAction::Submit => {
                    self.state.stats.editing = false;
                    self.load_stats().await?;
                }
                AppAction::Backspace => {
                    stats_focused_input(&mut self.state.stats).pop();
                }
                AppAction::Input(ch) => stats_focused_input(&mut self.state.stats).push(ch),
                _ => {}
            },
            Section::Chart => match action {
                AppAction::Cancel => self.state.chart.editing = false,
                AppAction::NextField => {
                    self.state.chart.focus = match self.state.chart.focus {
                        RangeField::Start => RangeField::End,
                        RangeField::End => RangeField::Start,
                    };
                }
                AppAction::Submit => {
                    self.state.chart.editing = false;
                    self.load_chart().await?;
                }
                AppAction::Backspace => {
                    chart_focused_input(&mut self.state.chart).pop();
                }
                AppAction::Input(ch) => chart_focused_input(&mut self.state.chart).push(ch),
                _ => {}
            },
            Section::Monthly => match action {
                AppAction::Cancel => self.state.monthly.editing = false,
                AppAction::Submit => {
                    self.state.monthly.editing = false;
                    self.load_monthly().await?;
                }
                AppAction::Backspace => {
                    self.state.monthly.month_input.pop();
                }
                AppAction::Input(ch) => self.state.monthly.month_input.push(ch),
                _ => {}
            },
            Section::Search => match action {
                AppAction::Cancel => self.state.search.editing = false,
                AppAction::NextField => {
                    self.state.search.focus = self.state.search.focus.next();
                }
                AppAction::Submit => {
                    self.state.search.editing = false;
                    self.state.search.debounce.cancel();
                    self.run_search().await?;
                }
                AppAction::Backspace => {
                    let focus = self.state.search.focus;
                    search_focused_input(&mut self.state.search).pop();
                    if focus == SearchField::Content {
                        self.state.search.debounce.arm();
                    }
                }
                AppAction::Input(ch) => {
                    let focus = self.state.search.focus;
                    search_focused_input(&mut self.state.search).push(ch);
                    if focus == SearchField::Content {
                        self.state.search.debounce.arm();
                    }
                }
                _ => {}
            },
            Section::Keywords => match action {
                AppAction::Cancel => self.state.keywords.editing = false,
                AppAction::NextField => {
                    self.state.keywords.focus = match self.state.keywords.focus {
                        KeywordField::Category => KeywordField::Term,
                        KeywordField::Term => KeywordField::Category,
                    };
                }
                AppAction::Up | AppAction::Down => {
                    if self.state.keywords.focus == KeywordField::Category {
                        let keywords = &mut self.state.keywords;
                        if !keywords.categories.is_empty() {
                            let len = keywords.categories.len() as i64;
                            let delta: i64 = if action == AppAction::Up { -1 } else { 1 };
                            keywords.category_index =
                                (keywords.category_index as i64 + delta).rem_euclid(len) as usize;
                        }
                    }
                }
                AppAction::Submit => self.add_keyword().await?,
                AppAction::Backspace => {
                    if self.state.keywords.focus == KeywordField::Term {
                        self.state.keywords.term_input.pop();
                    }
                }
                AppAction::Input(ch) => {
                    if self.state.keywords.focus == KeywordField::Term {
                        self.state.keywords.term_input.push(ch);
                    }
                }
                _ => {}
            },
        }
        Ok(())
    }

    async fn handle_form_key(&mut self, action: AppAction) -> Result<()> {
        if action == AppAction::Submit {
            return self.submit_form().await;
        }
        let Overlay::Form(form) = &mut self.state.overlay else {
            return Ok(());
        };
        match action {
            AppAction::Cancel => {
                if !form.submitting {
                    self.state.overlay = Overlay::None;
                }
            }
            AppAction::NextField => form.cycle_focus(),
            AppAction::Backspace => {
                if let Some(input) = form.focused_input_mut() {
                    input.pop();
                }
            }
            AppAction::Up | AppAction::Down => match form.focus {
                forms::FormField::Kind => form.toggle_kind(),
                forms::FormField::Category => {
                    form.select_category(if action == AppAction::Up { -1 } else { 1 });
                }
                _ => {}
            },
            AppAction::Input(ch) => {
                if let Some(input) = form.focused_input_mut() {
                    input.push(ch);
                }
            }
            _ => {}
        }
        Ok(())
    }

    async fn handle_confirm_key(&mut self, action: AppAction) -> Result<()> {
        match action {
            AppAction::Submit | AppAction::Input('s') => self.confirm_delete().await,
            AppAction::Cancel | AppAction::Input('n') => {
                self.state.overlay = Overlay::None;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    // --- loaders ---------------------------------------------------------

    async fn load_daily(&mut self) -> Result<()> {
        let date = match validate::parse_date(&self.state.daily.date_input) {
            Ok(date) => date,
            Err(err) => {
                self.state.daily.error = Some(err.to_string());
                return Ok(());
            }
        };
        let key = date.format("%d/%m/%Y").to_string();

        self.state.daily.loading = true;
        let client = self.client.clone();
        let result = self
            .state
            .cache
            .daily
            .get_or_fetch(&key, || async move {
                client.transactions_by_date(date).await
            })
            .await;
        self.state.daily.loading = false;

        match result {
            Ok(items) => {
                self.state.daily.totals = summary::totals(&items);
                self.state.daily.items = items;
                self.state.daily.loaded = true;
                self.state.daily.error = None;
                let len = self.state.daily.items.len();
                self.state.daily.pager.clamp_to(len);
                self.state.daily.selected = 0;
            }
            Err(err) => {
                // Explicit error state, never a stale-looking list.
                self.state.daily.items.clear();
                self.state.daily.totals = Totals::default();
                self.state.daily.loaded = true;
                self.state.daily.error = Some(err.message.clone());
                self.toast(
                    ToastLevel::Error,
                    format!("Errore nel caricamento dei movimenti: {err}"),
                );
            }
        }
        Ok(())
    }

    async fn load_monthly(&mut self) -> Result<()> {
        let Some(month) = validate::parse_month(&self.state.monthly.month_input) else {
            self.state.monthly.error = Some("Mese non valido (1-12).".to_string());
            return Ok(());
        };
        let year = Local::now().year();
        let key = format!("{year}-{month:02}");

        self.state.monthly.loading = true;
        let client = self.client.clone();
        let result = self
            .state
            .cache
            .monthly
            .get_or_fetch(&key, || async move {
                client.transactions_by_month(month, year).await
            })
            .await;
        self.state.monthly.loading = false;

        match result {
            Ok(items) => {
                self.state.monthly.totals = summary::totals(&items);
                self.state.monthly.items = items;
                self.state.monthly.loaded = true;
                self.state.monthly.error = None;
                let len = self.state.monthly.items.len();
                self.state.monthly.pager.clamp_to(len);
                self.state.monthly.selected = 0;
            }
            Err(err) => {
                self.state.monthly.items.clear();
                self.state.monthly.totals = Totals::default();
                self.state.monthly.loaded = true;
                self.state.monthly.error = Some(err.message.clone());
                self.toast(
                    ToastLevel::Error,
                    format!("Errore nel caricamento dei movimenti: {err}"),
                );
            }
        }
        Ok(())
    }

    async fn load_stats(&mut self) -> Result<()> {
        let start = match validate::parse_date(&self.state.stats.start_input) {
            Ok(date) => date,
            Err(err) => {
                self.state.stats.error = Some(err.to_string());
                return Ok(());
            }
        };
        let end = match validate::parse_date(&self.state.stats.end_input) {
            Ok(date) => date,
            Err(err) => {
                self.state.stats.error = Some(err.to_string());
                return Ok(());
            }
        };
        if start > end {
            self.toast(
                ToastLevel::Warning,
                "La data di inizio non può superare quella di fine.",
            );
            return Ok(());
        }

        self.state.stats.loading = true;
        let summary = self.client.financial_summary(start, end).await;
        let outcome = match summary {
            Ok(summary) => match self.client.chart_data(start, end).await {
                Ok(chart) => Ok((summary, chart)),
                Err(err) => Err(err),
            },
            Err(err) => Err(err),
        };
        self.state.stats.loading = false;

        match outcome {
            Ok((summary, chart)) => {
                self.state.stats.summary = Some(summary);
                self.state.stats.chart = Some(chart);
                self.state.stats.error = None;
            }
            Err(err) => {
                self.state.stats.summary = None;
                self.state.stats.chart = None;
                self.state.stats.error = Some(err.message.clone());
                self.toast(
                    ToastLevel::Error,
                    format!("Errore nel caricamento delle statistiche: {err}"),
                );
            }
        }
        Ok(())
    }

    async fn load_chart(&mut self) -> Result<()> {
        let Some(start) = validate::parse_month(&self.state.chart.start_input) else {
            self.state.chart.error = Some("Mese di inizio non valido (1-12).".to_string());
            return Ok(());
        };
        let Some(end) = validate::parse_month(&self.state.chart.end_input) else {
            self.state.chart.error = Some("Mese di fine non valido (1-12).".to_string());
            return Ok(());
        };
        if start > end {
            self.toast(
                ToastLevel::Warning,
                "Il mese di inizio non può superare quello di fine.",
            );
            return Ok(());
        }
        let year = Local::now().year();

        self.state.chart.loading = true;
        let result = self.client.monthly_data(year).await;
        self.state.chart.loading = false;

        match result {
            Ok(data) => {
                // The Gateway only reports months with activity; fill the
                // window with zeros for the missing ones.
                self.state.chart.data = (start..=end)
                    .map(|month| {
                        data.iter()
                            .find(|summary| summary.month == month)
                            .copied()
                            .unwrap_or(MonthlySummary {
                                month,
                                income: 0,
                                expense: 0,
                            })
                    })
                    .collect();
                self.state.chart.loaded = true;
                self.state.chart.error = None;
            }
            Err(err) => {
                self.state.chart.data.clear();
                self.state.chart.loaded = true;
                self.state.chart.error = Some(err.message.clone());
                self.toast(
                    ToastLevel::Error,
                    format!("Errore nel caricamento dell'andamento: {err}"),
                );
            }
        }
        Ok(())
    }

    async fn load_keywords(&mut self) -> Result<()> {
        self.state.keywords.loading = true;
        let client = self.client.clone();
        let result = self
            .state
            .cache
            .keywords
            .get_or_fetch("all", || async move { client.keywords().await })
            .await;
        self.state.keywords.loading = false;

        match result {
            Ok(items) => {
                self.state.keywords.items = items;
                self.state.keywords.loaded = true;
                self.state.keywords.error = None;
            }
            Err(err) => {
                self.state.keywords.items.clear();
                self.state.keywords.loaded = true;
                self.state.keywords.error = Some(err.message.clone());
                self.toast(
                    ToastLevel::Error,
                    format!("Errore nel caricamento delle parole chiave: {err}"),
                );
            }
        }
        Ok(())
    }

    fn build_search_filter(&self) -> std::result::Result<SearchFilter, String> {
        let month = {
            let raw = self.state.search.month_input.trim();
            if raw.is_empty() {
                None
            } else {
                Some(validate::parse_month(raw).ok_or("Mese non valido (1-12).")?)
            }
        };
        let amount = {
            let raw = self.state.search.amount_input.trim();
            if raw.is_empty() {
                None
            } else {
                Some(validate::parse_amount(raw).map_err(|err| err.to_string())?)
            }
        };
        let content = non_empty(&self.state.search.content_input);
        let category = non_empty(&self.state.search.category_input);

        Ok(SearchFilter {
            year: Local::now().year(),
            month,
            content,
            amount,
            category,
        })
    }

    async fn run_search(&mut self) -> Result<()> {
        let filter = match self.build_search_filter() {
            Ok(filter) => filter,
            Err(message) => {
                self.toast(ToastLevel::Warning, message);
                return Ok(());
            }
        };
        if !filter.has_criteria() {
            self.toast(
                ToastLevel::Warning,
                "Inserisci almeno un criterio: contenuto, importo o categoria.",
            );
            return Ok(());
        }

        let key = filter.cache_key();
        if self.state.search.last_key.as_deref() != Some(key.as_str()) {
            self.state.search.page = 1;
        }
        let page = self.state.search.page;

        self.state.search.loading = true;
        let client = self.client.clone();
        let fetch_filter = filter.clone();
        let result = self
            .state
            .cache
            .search
            .get_or_fetch(&key, page, || async move {
                client.search(&fetch_filter, page, PAGE_SIZE as u32).await
            })
            .await;
        self.state.search.loading = false;

        match result {
            Ok(response) => {
                // The server's page accounting is authoritative.
                self.state.search.page = response.current_page.max(1);
                self.state.search.selected = 0;
                self.state.search.response = Some(response);
                self.state.search.error = None;
                self.state.search.last_key = Some(key);
            }
            Err(err) => {
                self.state.search.response = None;
                self.state.search.error = Some(err.message.clone());
                self.toast(ToastLevel::Error, format!("Errore nella ricerca: {err}"));
            }
        }
        Ok(())
    }

    async fn search_turn_page(&mut self, delta: i64) -> Result<()> {
        let Some(total_pages) = self
            .state
            .search
            .response
            .as_ref()
            .map(|response| response.total_pages)
        else {
            return Ok(());
        };
        let current = self.state.search.page;
        let next = (i64::from(current) + delta).clamp(1, i64::from(total_pages.max(1))) as u32;
        if next == current {
            return Ok(());
        }
        self.state.search.page = next;
        self.run_search().await
    }

    // --- mutations -------------------------------------------------------

    async fn open_add_form(&mut self) -> Result<()> {
        // Categories come fresh on every form open; the list is owned by
        // the Gateway and is not cached across the session.
        match self.client.categories().await {
            Ok(categories) => {
                let today = Local::now().date_naive();
                self.state.overlay = Overlay::Form(TransactionForm::add(today, categories));
            }
            Err(err) => self.toast(
                ToastLevel::Error,
                format!("Errore nel caricamento delle categorie: {err}"),
            ),
        }
        Ok(())
    }

    async fn open_edit_form(&mut self) -> Result<()> {
        let Some(tx) = self.selected_transaction() else {
            self.toast(ToastLevel::Warning, "Nessun movimento selezionato.");
            return Ok(());
        };
        match self.client.categories().await {
            Ok(categories) => {
                self.state.overlay = Overlay::Form(TransactionForm::edit(&tx, categories));
            }
            Err(err) => self.toast(
                ToastLevel::Error,
                format!("Errore nel caricamento delle categorie: {err}"),
            ),
        }
        Ok(())
    }

    async fn submit_form(&mut self) -> Result<()> {
        let today = Local::now().date_naive();
        let parsed = {
            let Overlay::Form(form) = &mut self.state.overlay else {
                return Ok(());
            };
            // One write in flight per form: the flag stays up until the
            // response resolves, so a second Enter is a no-op.
            if form.submitting {
                return Ok(());
            }
            match form.parse(today, &self.state.sheet_id) {
                Ok(parsed) => {
                    form.submitting = true;
                    form.error = None;
                    parsed
                }
                Err(err) => {
                    form.error = Some(err.to_string());
                    return Ok(());
                }
            }
        };

        let is_edit = matches!(parsed.write, GatewayWrite::UpdateTransaction(_));
        let result = self.client.write(&parsed.write).await;

        match result {
            Ok(()) => {
                self.state.overlay = Overlay::None;
                self.toast(
                    ToastLevel::Success,
                    if is_edit {
                        "Movimento aggiornato."
                    } else {
                        "Movimento aggiunto."
                    },
                );
                if !is_edit {
                    // Jump the daily view to the new row's date, as the
                    // refetch below should show what was just added.
                    self.state.daily.date_input = parsed.date.format("%Y-%m-%d").to_string();
                }
                self.mark_transaction_views_stale();
                self.refresh_active_view().await?;
            }
            Err(err) => {
                if let Overlay::Form(form) = &mut self.state.overlay {
                    form.submitting = false;
                    form.error = Some(err.message.clone());
                }
            }
        }
        Ok(())
    }

    fn request_delete(&mut self) {
        let Some(tx) = self.selected_transaction() else {
            self.toast(ToastLevel::Warning, "Nessun movimento selezionato.");
            return;
        };
        self.state.overlay = Overlay::ConfirmDelete(PendingDelete {
            id: tx.id,
            date: tx.date,
        });
    }

    async fn confirm_delete(&mut self) -> Result<()> {
        let Overlay::ConfirmDelete(pending) =
            std::mem::replace(&mut self.state.overlay, Overlay::None)
        else {
            return Ok(());
        };
        let payload = GatewayWrite::DeleteTransaction(TransactionDelete::new(
            pending.id,
            pending.date,
            self.state.sheet_id.clone(),
        ));

        match self.client.write(&payload).await {
            Ok(()) => {
                self.toast(ToastLevel::Success, "Movimento eliminato.");
                self.mark_transaction_views_stale();
                self.refresh_active_view().await?;
            }
            Err(err) => self.toast(
                ToastLevel::Error,
                format!("Errore durante l'eliminazione: {err}"),
            ),
        }
        Ok(())
    }

    async fn add_keyword(&mut self) -> Result<()> {
        if self.state.keywords.submitting {
            return Ok(());
        }
        let category = match validate::category(
            self.state
                .keywords
                .categories
                .get(self.state.keywords.category_index)
                .map(String::as_str),
        ) {
            Ok(category) => category,
            Err(err) => {
                self.state.keywords.form_error = Some(err.to_string());
                return Ok(());
            }
        };
        let text = match validate::keyword_text(&self.state.keywords.term_input) {
            Ok(text) => text,
            Err(err) => {
                self.state.keywords.form_error = Some(err.to_string());
                return Ok(());
            }
        };
        let keywords = text
            .split(',')
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .collect::<Vec<_>>()
            .join(", ");

        self.state.keywords.submitting = true;
        self.state.keywords.form_error = None;
        let payload = GatewayWrite::AddKeyword(KeywordAdd {
            category,
            keywords,
            sheet_id: self.state.sheet_id.clone(),
        });
        let result = self.client.write(&payload).await;
        self.state.keywords.submitting = false;

        match result {
            Ok(()) => {
                self.toast(ToastLevel::Success, "Parole chiave aggiunte.");
                self.state.keywords.term_input.clear();
                self.state.cache.keywords.invalidate();
                self.load_keywords().await?;
            }
            Err(err) => self.state.keywords.form_error = Some(err.message.clone()),
        }
        Ok(())
    }

    async fn delete_keyword(&mut self) -> Result<()> {
        if self.state.keywords.submitting {
            return Ok(());
        }
        let category = match validate::category(
            self.state
                .keywords
                .categories
                .get(self.state.keywords.category_index)
                .map(String::as_str),
        ) {
            Ok(category) => category,
            Err(err) => {
                self.state.keywords.form_error = Some(err.to_string());
                return Ok(());
            }
        };
        let term = match validate::keyword_text(&self.state.keywords.term_input) {
            Ok(term) => term,
            Err(err) => {
                self.state.keywords.form_error = Some(err.to_string());
                return Ok(());
            }
        };

        self.state.keywords.submitting = true;
        // The existence check runs against a fresh list: a stale slot must
        // not turn a soft warning into a failed write (or the reverse).
        let entries = match self.client.keywords().await {
            Ok(entries) => entries,
            Err(err) => {
                self.state.keywords.submitting = false;
                self.toast(
                    ToastLevel::Error,
                    format!("Errore nel caricamento delle parole chiave: {err}"),
                );
                return Ok(());
            }
        };
        let Some(entry) = entries.iter().find(|entry| entry.category == category) else {
            self.state.keywords.submitting = false;
            self.toast(
                ToastLevel::Warning,
                format!("La categoria '{category}' non esiste."),
            );
            return Ok(());
        };
        if !entry.contains_term(&term) {
            self.state.keywords.submitting = false;
            self.toast(
                ToastLevel::Warning,
                format!("La parola chiave '{term}' non esiste nella categoria '{category}'."),
            );
            return Ok(());
        }

        let payload = GatewayWrite::DeleteKeyword(KeywordDelete {
            category,
            keyword: term,
            sheet_id: self.state.sheet_id.clone(),
        });
        let result = self.client.write(&payload).await;
        self.state.keywords.submitting = false;

        match result {
            Ok(()) => {
                self.toast(ToastLevel::Success, "Parola chiave eliminata.");
                self.state.keywords.term_input.clear();
                self.state.cache.keywords.invalidate();
                self.load_keywords().await?;
            }
            Err(err) => self.toast(
                ToastLevel::Error,
                format!("Errore durante l'eliminazione: {err}"),
            ),
        }
        Ok(())
    }

    /// Invalidation and the stale marks happen together, before any new
    /// fetch is decided; the refetch of the active view follows directly.
    fn mark_transaction_views_stale(&mut self) {
        self.state.cache.invalidate_transactions();
        self.state.daily.loaded = false;
        self.state.monthly.loaded = false;
    }

    async fn refresh_active_view(&mut self) -> Result<()> {
        match self.state.section {
            Section::Daily => self.load_daily().await,
            Section::Monthly => self.load_monthly().await,
            Section::Search => {
                if self.state.search.response.is_some() {
                    self.run_search().await
                } else {
                    Ok(())
                }
            }
            _ => Ok(()),
        }
    }

    /// The transaction under the cursor in whichever view is active.
    fn selected_transaction(&self) -> Option<Transaction> {
        match self.state.section {
            Section::Daily => self
                .state
                .daily
                .pager
                .slice(&self.state.daily.items)
                .get(self.state.daily.selected)
                .cloned(),
            Section::Monthly => self
                .state
                .monthly
                .pager
                .slice(&self.state.monthly.items)
                .get(self.state.monthly.selected)
                .cloned(),
            Section::Search => self
                .state
                .search
                .response
                .as_ref()
                .and_then(|response| response.transactions.get(self.state.search.selected))
                .cloned(),
            _ => None,
        }
    }
}

fn stats_focused_input(stats: &mut StatsState) -> &mut String {
    match stats.focus {
        RangeField::Start => &mut stats.start_input,
        RangeField::End => &mut stats.end_input,
    }
}

fn chart_focused_input(chart: &mut ChartState) -> &mut String {
    match chart.focus {
        RangeField::Start => &mut chart.start_input,
        RangeField::End => &mut chart.end_input,
    }
}

fn search_focused_input(search: &mut SearchState) -> &mut String {
    match search.focus {
        SearchField::Month => &mut search.month_input,
        SearchField::Content => &mut search.content_input,
        SearchField::Amount => &mut search.amount_input,
        SearchField::Category => &mut search.category_input,
    }
}

fn move_selection(selected: &mut usize, delta: i64, len: usize) {
    if len == 0 {
        *selected = 0;
        return;
    }
    *selected = (*selected as i64 + delta).clamp(0, len as i64 - 1) as usize;
}

fn non_empty(input: &str) -> Option<String> {
    let trimmed = input.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
