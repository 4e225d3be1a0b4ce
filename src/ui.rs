use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use essay_ranking::{
    format_count, format_number, ranking_badge, state_options, Action, CategoryAnalysis,
    Comparison, DashboardState, DashboardView, School, SchoolProfile, SortDirection, SortKey,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Ranking,
    Analysis,
    Comparison,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Ranking => Page::Analysis,
            Page::Analysis => Page::Comparison,
            Page::Comparison => Page::Ranking,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Ranking => Page::Comparison,
            Page::Analysis => Page::Ranking,
            Page::Comparison => Page::Analysis,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Ranking => "Ranking",
            Page::Analysis => "Análise Geral",
            Page::Comparison => "Comparação",
        }
    }
}

/// Which text field keystrokes are going to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
    MinSample,
}

pub struct App {
    pub schools: Vec<School>,
    pub dashboard: DashboardState,
    pub state: TableState,
    pub current_page: Page,
    pub comparison: Comparison,
    pub comparison_state: TableState,
    pub show_detail: bool,
    pub input_mode: InputMode,
    pub input: String,
    pub message: Option<String>,
    states: Vec<String>,
    analysis: CategoryAnalysis,
}

impl App {
    pub fn new(schools: Vec<School>, page_size: usize) -> Self {
        let mut state = TableState::default();
        if !schools.is_empty() {
            state.select(Some(0));
        }

        let states = state_options(&schools);
        let analysis = CategoryAnalysis::build(&schools);

        Self {
            schools,
            dashboard: DashboardState::with_page_size(page_size),
            state,
            current_page: Page::Ranking,
            comparison: Comparison::new(),
            comparison_state: TableState::default(),
            show_detail: false,
            input_mode: InputMode::Normal,
            input: String::new(),
            message: None,
            states,
            analysis,
        }
    }

    pub fn view(&self) -> DashboardView<'_> {
        self.dashboard.view(&self.schools)
    }

    pub fn apply(&mut self, action: Action) {
        let current = std::mem::take(&mut self.dashboard);
        self.dashboard = current.apply(action, &self.schools);

        // Reset selection to first row of the page
        if self.view().page.rows.is_empty() {
            self.state.select(None);
        } else {
            self.state.select(Some(0));
        }
    }

    pub fn toggle_detail(&mut self) {
        self.show_detail = !self.show_detail;
    }

    pub fn selected_school(&self) -> Option<School> {
        let view = self.view();
        self.state
            .selected()
            .and_then(|i| view.page.rows.get(i).map(|s| (*s).clone()))
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    /// Step the state filter through: all -> each UF -> all
    pub fn cycle_state(&mut self) {
        let next = match &self.dashboard.filters.state {
            None => self.states.first().cloned(),
            Some(current) => self
                .states
                .iter()
                .position(|s| s == current)
                .and_then(|i| self.states.get(i + 1).cloned()),
        };
        self.apply(Action::SelectState(next));
    }

    /// Same for cities of the selected state; no-op without a state
    pub fn cycle_city(&mut self) {
        if self.dashboard.filters.state.is_none() {
            self.message = Some("Selecione um estado antes da cidade".to_string());
            return;
        }
        let cities = self.view().cities;
        let next = match &self.dashboard.filters.city {
            None => cities.first().cloned(),
            Some(current) => cities
                .iter()
                .position(|c| c == current)
                .and_then(|i| cities.get(i + 1).cloned()),
        };
        self.apply(Action::SelectCity(next));
    }

    pub fn add_selected_to_comparison(&mut self) {
        let Some(school) = self.selected_school() else {
            return;
        };
        self.message = Some(match self.comparison.add(&school) {
            Ok(()) => format!("{} adicionada à comparação", school.name),
            Err(err) => err.to_string(),
        });
    }

    pub fn remove_from_comparison(&mut self) {
        let id = self
            .comparison_state
            .selected()
            .and_then(|i| self.comparison.selected().get(i))
            .map(|s| s.id.clone());
        if let Some(id) = id {
            self.comparison.remove(&id);
            let len = self.comparison.len();
            let selected = self.comparison_state.selected().unwrap_or(0);
            self.comparison_state
                .select(if len == 0 { None } else { Some(selected.min(len - 1)) });
        }
    }

    pub fn next(&mut self) {
        let (len, state) = self.active_list();
        if len == 0 {
            return;
        }
        let i = match state.selected() {
            Some(i) => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let (len, state) = self.active_list();
        if len == 0 {
            return;
        }
        let i = match state.selected() {
            Some(i) => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        state.select(Some(i));
    }

    fn active_list(&mut self) -> (usize, &mut TableState) {
        match self.current_page {
            Page::Comparison => (self.comparison.len(), &mut self.comparison_state),
            _ => {
                let len = self.view().page.rows.len();
                (len, &mut self.state)
            }
        }
    }

    /// Keystroke while a text field is focused
    fn handle_input_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => self.input_mode = InputMode::Normal,
            KeyCode::Backspace => {
                self.input.pop();
                self.push_input();
            }
            KeyCode::Char(c) => {
                self.input.push(c);
                self.push_input();
            }
            _ => {}
        }
    }

    fn push_input(&mut self) {
        let text = self.input.clone();
        match self.input_mode {
            InputMode::Search => self.apply(Action::Search(text)),
            InputMode::MinSample => self.apply(Action::SetMinSampleSize(text)),
            InputMode::Normal => {}
        }
    }

    fn begin_input(&mut self, mode: InputMode) {
        self.input = match mode {
            InputMode::Search => self.dashboard.filters.search.clone(),
            InputMode::MinSample => self.dashboard.min_sample_input.clone(),
            InputMode::Normal => String::new(),
        };
        self.input_mode = mode;
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    exit_status(res)
}

/// Surfaces a dashboard loop failure once the terminal is back to normal.
fn exit_status(res: io::Result<()>) -> Result<()> {
    res.context("Dashboard exited with an error")
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        if app.input_mode != InputMode::Normal {
            app.handle_input_key(key);
            continue;
        }

        app.message = None;
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
            KeyCode::Enter => app.toggle_detail(),
            KeyCode::Tab => app.next_page(),
            KeyCode::BackTab => app.previous_page(),
            KeyCode::Char('/') => app.begin_input(InputMode::Search),
            KeyCode::Char('m') => app.begin_input(InputMode::MinSample),
            KeyCode::Char('u') => app.cycle_state(),
            KeyCode::Char('i') => app.cycle_city(),
            KeyCode::Char('t') => {
                let segment = app.dashboard.filters.segment.cycle();
                app.apply(Action::SelectSegment(segment));
            }
            KeyCode::Char('c') => app.apply(Action::ClearFilters),
            KeyCode::Char(d @ '1'..='7') if app.current_page == Page::Ranking => {
                let idx = d as usize - '1' as usize;
                app.apply(Action::Sort(SortKey::ALL[idx]));
            }
            KeyCode::Char('a') if app.current_page == Page::Ranking => {
                app.add_selected_to_comparison()
            }
            KeyCode::Char('x') if app.current_page == Page::Comparison => {
                app.remove_from_comparison()
            }
            KeyCode::Right | KeyCode::Char('n') | KeyCode::PageDown => app.apply(Action::NextPage),
            KeyCode::Left | KeyCode::Char('p') | KeyCode::PageUp => app.apply(Action::PreviousPage),
            KeyCode::Down | KeyCode::Char('j') => app.next(),
            KeyCode::Up | KeyCode::Char('k') => app.previous(),
            KeyCode::Home => app.apply(Action::GoToPage(1)),
            KeyCode::End => app.apply(Action::GoToPage(usize::MAX)),
            _ => {}
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.current_page {
        Page::Ranking => render_ranking(f, chunks[1], app),
        Page::Analysis => render_analysis(f, chunks[1], app),
        Page::Comparison => render_comparison(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let pages = [Page::Ranking, Page::Analysis, Page::Comparison];

    let mut tab_spans = vec![];
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Dataset: {} escolas", format_count(app.schools.len() as u64)),
        Style::default().fg(Color::White),
    ));
    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Comparando: {}", app.comparison.len()),
        Style::default().fg(Color::Magenta),
    ));

    let header = Paragraph::new(vec![Line::from(tab_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Ranking Nacional de Escolas - Redação ENEM "),
    );

    f.render_widget(header, area);
}

// ============================================================================
// RANKING PAGE
// ============================================================================

fn render_ranking(f: &mut Frame, area: Rect, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Overview cards
            Constraint::Length(3), // Filters
            Constraint::Min(0),    // Table
        ])
        .split(area);

    render_overview(f, chunks[0], app);
    render_filters(f, chunks[1], app);

    if app.show_detail {
        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[2]);

        render_table(f, content_chunks[0], app);
        render_detail_panel(f, content_chunks[1], app);
    } else {
        render_table(f, chunks[2], app);
    }
}

fn render_overview(f: &mut Frame, area: Rect, app: &App) {
    let stats = app.view().stats;
    let label = Style::default().fg(Color::DarkGray);
    let value = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);

    let best_name = stats
        .best
        .as_ref()
        .map(|b| b.name.clone())
        .unwrap_or_else(|| "N/A".to_string());

    let line = Line::from(vec![
        Span::styled(" Média Nacional ", label),
        Span::styled(stats.mean_label(), value),
        Span::raw("  │ "),
        Span::styled("Escolas Avaliadas ", label),
        Span::styled(format_count(stats.total_schools as u64), value),
        Span::raw("  │ "),
        Span::styled("Melhor Desempenho ", label),
        Span::styled(stats.best_label(), value),
        Span::styled(format!(" ({})", best_name), label),
        Span::raw("  │ "),
        Span::styled("Total de Alunos ", label),
        Span::styled(format_count(stats.total_students), value),
    ]);

    let overview = Paragraph::new(vec![line]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );
    f.render_widget(overview, area);
}

fn render_filters(f: &mut Frame, area: Rect, app: &App) {
    let filters = &app.dashboard.filters;
    let key = Style::default().fg(Color::Yellow);
    let editing = Style::default().fg(Color::Black).bg(Color::Yellow);

    let search_style = if app.input_mode == InputMode::Search { editing } else { Style::default() };
    let min_style = if app.input_mode == InputMode::MinSample { editing } else { Style::default() };

    let line = Line::from(vec![
        Span::styled(" / ", key),
        Span::raw("Busca: "),
        Span::styled(format!("[{}]", filters.search), search_style),
        Span::styled("  u ", key),
        Span::raw(format!("UF: {}", filters.state.as_deref().unwrap_or("Todos"))),
        Span::styled("  i ", key),
        Span::raw(format!("Cidade: {}", filters.city.as_deref().unwrap_or("Todas"))),
        Span::styled("  t ", key),
        Span::raw(format!("Tipo: {}", filters.segment.label())),
        Span::styled("  m ", key),
        Span::raw("Mín. alunos: "),
        Span::styled(format!("[{}]", app.dashboard.min_sample_input), min_style),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(" Filtros de Busca ");
    f.render_widget(Paragraph::new(vec![line]).block(block), area);
}

fn render_table(f: &mut Frame, area: Rect, app: &mut App) {
    let sort = app.dashboard.sort;
    let header_cells = SortKey::ALL.iter().enumerate().map(|(i, k)| {
        let arrow = if sort.key == *k {
            match sort.direction {
                SortDirection::Asc => " ▲",
                SortDirection::Desc => " ▼",
            }
        } else {
            ""
        };
        Cell::from(format!("{} {}{}", i + 1, k.title(), arrow)).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let view = app.view();
    let rows: Vec<Row> = view
        .page
        .rows
        .iter()
        .map(|s| {
            let rank_style = match s.rank {
                1 => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                2 => Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD),
                3 => Style::default().fg(Color::LightRed).add_modifier(Modifier::BOLD),
                _ => Style::default(),
            };
            let badge = ranking_badge(s.rank).map(|m| m.emoji()).unwrap_or("");
            let category_color = if s.is_public() { Color::Cyan } else { Color::Magenta };

            Row::new(vec![
                Cell::from(format!("{} {}", s.rank, badge)).style(rank_style),
                Cell::from(truncate(&s.name, 40)),
                Cell::from(s.state.clone()),
                Cell::from(truncate(&s.city, 20)),
                Cell::from(s.category.as_str()).style(Style::default().fg(category_color)),
                Cell::from(s.sample_size.to_string()),
                Cell::from(format_number(s.overall, 1))
                    .style(Style::default().add_modifier(Modifier::BOLD)),
            ])
            .height(1)
        })
        .collect();

    let title = format!(
        " Mostrando {} escolas - Página {} de {} ",
        format_count(view.filtered.len() as u64),
        view.page.page,
        view.page.total_pages.max(1)
    );

    let table = Table::new(
        rows,
        [
            Constraint::Length(12),
            Constraint::Min(30),
            Constraint::Length(6),
            Constraint::Length(22),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(10),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(title),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_detail_panel(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Perfil da Escola ");

    let Some(school) = app.selected_school() else {
        f.render_widget(Paragraph::new("Nenhuma escola selecionada").block(block), area);
        return;
    };
    let profile = SchoolProfile::build(&school);
    let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);

    let mut content = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("  {}", school.name),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(format!("  {}", school.location())),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Ranking: ", label),
            Span::raw(format!(
                "#{} {}",
                school.rank,
                profile.badge.map(|m| m.emoji()).unwrap_or("")
            )),
        ]),
        Line::from(vec![
            Span::styled("  Tipo: ", label),
            Span::raw(school.category.as_str()),
        ]),
        Line::from(vec![
            Span::styled("  Alunos: ", label),
            Span::raw(school.sample_size.to_string()),
        ]),
        Line::from(vec![
            Span::styled("  Média Geral: ", label),
            Span::raw(format_number(school.overall, 1)),
        ]),
        Line::from(vec![
            Span::styled("  Eficiência: ", label),
            Span::raw(format_number(profile.efficiency, 1)),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "  COMPETÊNCIAS",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )),
    ];

    for c in &profile.competencies {
        content.push(Line::from(vec![
            Span::styled(format!("  {} ", c.code), label),
            Span::raw(format!("{:<26}", c.label)),
            Span::raw(format_number(c.value, 1)),
        ]));
    }

    if !profile.history.is_empty() {
        content.push(Line::from(""));
        content.push(Line::from(Span::styled(
            "  HISTÓRICO",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )));
        for h in &profile.history {
            content.push(Line::from(format!("  {}  {}", h.year, format_number(h.overall, 1))));
        }
    }

    f.render_widget(Paragraph::new(content).block(block), area);
}

// ============================================================================
// ANALYSIS PAGE
// ============================================================================

fn render_analysis(f: &mut Frame, area: Rect, app: &App) {
    let analysis = &app.analysis;
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let mut summary = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  Média Nacional:  ", label),
            Span::raw(format_number(analysis.overall.overall, 1)),
        ]),
        Line::from(vec![
            Span::styled("  Rede Pública:    ", label),
            Span::raw(format!(
                "{}  ({} escolas)",
                format_number(analysis.public.overall, 1),
                format_count(analysis.public_count as u64)
            )),
        ]),
        Line::from(vec![
            Span::styled("  Rede Privada:    ", label),
            Span::raw(format!(
                "{}  ({} escolas)",
                format_number(analysis.private.overall, 1),
                format_count(analysis.private_count as u64)
            )),
        ]),
        Line::from(""),
    ];
    for d in &analysis.distribution {
        summary.push(Line::from(format!(
            "  {:<8} {:>5.1}%",
            d.category.as_str(),
            d.percentage
        )));
    }
    summary.push(Line::from(""));
    summary.push(Line::from(Span::styled(
        "  TOP 10 ESCOLAS DO BRASIL",
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
    )));
    for (i, s) in analysis.top_performers.iter().enumerate() {
        summary.push(Line::from(format!(
            "  {:>2}. {}  {}",
            i + 1,
            truncate(&s.name, 32),
            format_number(s.overall, 1)
        )));
    }

    f.render_widget(
        Paragraph::new(summary).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(" Pública vs Privada "),
        ),
        chunks[0],
    );

    let groups: Vec<BarGroup> = analysis
        .competencies
        .iter()
        .map(|row| {
            BarGroup::default().label(Line::from(row.code)).bars(&[
                Bar::default()
                    .value(row.public.round() as u64)
                    .text_value(format_number(row.public, 1))
                    .style(Style::default().fg(Color::Cyan)),
                Bar::default()
                    .value(row.private.round() as u64)
                    .text_value(format_number(row.private, 1))
                    .style(Style::default().fg(Color::Magenta)),
            ])
        })
        .collect();

    let mut chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(" Desempenho por Competência (pública / privada) "),
        )
        .bar_width(6)
        .bar_gap(1)
        .group_gap(3)
        .max(200);
    for group in groups {
        chart = chart.data(group);
    }

    f.render_widget(chart, chunks[1]);
}

// ============================================================================
// COMPARISON PAGE
// ============================================================================

fn render_comparison(f: &mut Frame, area: Rect, app: &mut App) {
    if app.comparison.is_empty() {
        let hint = Paragraph::new(vec![
            Line::from(""),
            Line::from("  Nenhuma escola selecionada."),
            Line::from(
                "  Na página Ranking, selecione uma escola e pressione 'a' para adicioná-la (até 5).",
            ),
        ])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(" Comparação de Escolas "),
        );
        f.render_widget(hint, area);
        return;
    }

    let names: Vec<String> = app
        .comparison
        .selected()
        .iter()
        .map(|s| truncate(&s.name, 24))
        .collect();

    let header = Row::new(
        std::iter::once(Cell::from("Métrica"))
            .chain(names.iter().map(|n| Cell::from(n.clone())))
            .map(|c| c.style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))),
    )
    .style(Style::default().bg(Color::DarkGray));

    let rows: Vec<Row> = app
        .comparison
        .metric_table()
        .into_iter()
        .map(|m| Row::new(std::iter::once(m.metric).chain(m.values).map(Cell::from)))
        .collect();

    let mut widths = vec![Constraint::Length(32)];
    widths.extend(names.iter().map(|_| Constraint::Length(26)));

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(" Comparação de Escolas - x remove a escola selecionada "),
        );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(12), Constraint::Length(app.comparison.len() as u16 + 2)])
        .split(area);

    f.render_widget(table, chunks[0]);

    let selection: Vec<Row> = app
        .comparison
        .selected()
        .iter()
        .map(|s| Row::new(vec![Cell::from(s.name.clone()), Cell::from(s.location())]))
        .collect();
    let selection_table = Table::new(selection, [Constraint::Min(30), Constraint::Length(30)])
        .block(Block::default().borders(Borders::ALL).title(" Selecionadas "))
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("→ ");
    f.render_stateful_widget(selection_table, chunks[1], &mut app.comparison_state);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let key = Style::default().fg(Color::Yellow);
    let mut status_spans = vec![];

    if let Some(message) = &app.message {
        status_spans.push(Span::styled(
            format!(" {} ", message),
            Style::default().fg(Color::Green),
        ));
        status_spans.push(Span::raw(" | "));
    }

    if app.input_mode != InputMode::Normal {
        status_spans.push(Span::styled(" Digitando ", Style::default().fg(Color::Cyan)));
        status_spans.push(Span::styled("Enter", key));
        status_spans.push(Span::raw(" confirma"));
    } else {
        if app.dashboard.has_active_filters() {
            status_spans.push(Span::styled("c", key));
            status_spans.push(Span::raw(" Limpar Filtros | "));
        }
        status_spans.push(Span::styled("1-7", key));
        status_spans.push(Span::raw(" Ordenar | "));
        status_spans.push(Span::styled("←/→", key));
        status_spans.push(Span::raw(" Página | "));
        status_spans.push(Span::styled("Enter", key));
        status_spans.push(Span::raw(" Perfil | "));
        status_spans.push(Span::styled("a", key));
        status_spans.push(Span::raw(" Comparar | "));
        status_spans.push(Span::styled("Tab", key));
        status_spans.push(Span::raw(" Tela | "));
        status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
        status_spans.push(Span::raw(" Sair"));
    }

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use essay_ranking::{Category, Segment};

    fn school(id: &str, uf: &str, city: &str, rank: u32) -> School {
        School {
            id: id.to_string(),
            name: format!("Escola {}", id),
            state: uf.to_string(),
            city: city.to_string(),
            category: Category::Public,
            sample_size: 50,
            overall: 700.0,
            comp1: 140.0,
            comp2: 140.0,
            comp3: 140.0,
            comp4: 140.0,
            comp5: 140.0,
            rank,
            socioeconomic: None,
            history: None,
        }
    }

    fn app() -> App {
        App::new(
            vec![
                school("1", "RJ", "Niterói", 1),
                school("2", "SP", "Campinas", 2),
                school("3", "SP", "Santos", 3),
            ],
            20,
        )
    }

    #[test]
    fn test_cycle_state_wraps_to_all() {
        let mut app = app();
        app.cycle_state();
        assert_eq!(app.dashboard.filters.state.as_deref(), Some("RJ"));
        app.cycle_state();
        assert_eq!(app.dashboard.filters.state.as_deref(), Some("SP"));
        app.cycle_state();
        assert!(app.dashboard.filters.state.is_none());
    }

    #[test]
    fn test_cycle_city_needs_state() {
        let mut app = app();
        app.cycle_city();
        assert!(app.dashboard.filters.city.is_none());
        assert!(app.message.is_some());

        app.cycle_state();
        app.cycle_state();
        app.cycle_city();
        assert_eq!(app.dashboard.filters.city.as_deref(), Some("Campinas"));
        assert_eq!(app.view().filtered.len(), 1);
    }

    #[test]
    fn test_add_to_comparison() {
        let mut app = app();
        app.add_selected_to_comparison();
        assert_eq!(app.comparison.len(), 1);

        app.add_selected_to_comparison();
        assert_eq!(app.comparison.len(), 1);
        assert!(app.message.as_deref().unwrap_or("").contains("já está selecionada"));

        app.current_page = Page::Comparison;
        app.comparison_state.select(Some(0));
        app.remove_from_comparison();
        assert!(app.comparison.is_empty());
        assert!(app.comparison_state.selected().is_none());
    }

    #[test]
    fn test_search_input() {
        let mut app = app();
        app.begin_input(InputMode::Search);
        for c in "escola 3".chars() {
            app.handle_input_key(KeyEvent::from(KeyCode::Char(c)));
        }
        assert_eq!(app.view().filtered.len(), 1);

        app.handle_input_key(KeyEvent::from(KeyCode::Enter));
        assert_eq!(app.input_mode, InputMode::Normal);

        app.apply(Action::SelectSegment(Segment::Private));
        assert!(app.view().page.rows.is_empty());
        assert!(app.state.selected().is_none());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Niterói", 10), "Niterói");
        assert_eq!(truncate("Escola Estadual de Ensino Médio", 10), "Escola ...");
    }

    #[test]
    fn test_loop_error_is_returned() {
        assert!(exit_status(Ok(())).is_ok());

        let err = exit_status(Err(io::Error::new(io::ErrorKind::BrokenPipe, "terminal gone")))
            .unwrap_err();
        assert_eq!(err.to_string(), "Dashboard exited with an error");
        assert_eq!(err.root_cause().to_string(), "terminal gone");
    }
}
