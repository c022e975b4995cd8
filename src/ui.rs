use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Bar, BarChart, BarGroup, Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row,
        Table, TableState, Wrap,
    },
    Frame, Terminal,
};
use std::io;
use tally_book::{
    pie_slices, summary_line, Category, CategoryTotals, ContactStore, ExpenseLedger,
    ExpenseRecord, LedgerError, EMPTY_CHART_MESSAGE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Contacts,
    Expenses,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Contacts => Page::Expenses,
            Page::Expenses => Page::Contacts,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Contacts => "Contacts",
            Page::Expenses => "Expenses",
        }
    }
}

pub struct App {
    pub contacts: ContactStore,
    /// A ledger that failed to open only disables the Expenses page
    pub ledger: Result<ExpenseLedger, LedgerError>,
    pub currency: String,
    pub current_page: Page,
    pub show_detail: bool,

    // Contacts page
    pub query: String,
    pub matches: Vec<String>,
    pub contact_state: ListState,

    // Expenses page
    pub records: Vec<ExpenseRecord>,
    pub totals: CategoryTotals,
    pub expense_state: TableState,
}

impl App {
    pub fn new(
        contacts: ContactStore,
        ledger: Result<ExpenseLedger, LedgerError>,
        currency: String,
    ) -> Result<Self> {
        let mut app = Self {
            contacts,
            ledger,
            currency,
            current_page: Page::Contacts,
            show_detail: false,
            query: String::new(),
            matches: Vec::new(),
            contact_state: ListState::default(),
            records: Vec::new(),
            totals: CategoryTotals::new(),
            expense_state: TableState::default(),
        };

        app.apply_query();
        app.reload_expenses()?;
        Ok(app)
    }

    pub fn ledger_error(&self) -> Option<&LedgerError> {
        self.ledger.as_ref().err()
    }

    pub fn reload_expenses(&mut self) -> Result<()> {
        let Ok(ledger) = &self.ledger else {
            self.records.clear();
            self.totals = CategoryTotals::new();
            self.expense_state.select(None);
            return Ok(());
        };

        self.records = ledger.list_all()?;
        self.totals = ledger.aggregate_by_category()?;

        let selected = match self.expense_state.selected() {
            _ if self.records.is_empty() => None,
            Some(i) => Some(i.min(self.records.len() - 1)),
            None => Some(0),
        };
        self.expense_state.select(selected);
        Ok(())
    }

    /// Recompute the visible names for the current query
    pub fn apply_query(&mut self) {
        self.matches = self
            .contacts
            .search_by_name(&self.query)
            .into_iter()
            .map(str::to_string)
            .collect();

        if self.matches.is_empty() {
            self.contact_state.select(None);
        } else {
            self.contact_state.select(Some(0));
        }
    }

    pub fn push_query(&mut self, c: char) {
        self.query.push(c);
        self.apply_query();
    }

    pub fn pop_query(&mut self) {
        if self.query.pop().is_some() {
            self.apply_query();
        }
    }

    pub fn toggle_detail(&mut self) {
        self.show_detail = !self.show_detail;
    }

    /// Apply one key press. Returns true when the dashboard should close.
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(true);
        }

        match (self.current_page, key.code) {
            (_, KeyCode::Esc) => return Ok(true),
            (_, KeyCode::Tab) => self.next_page(),
            (_, KeyCode::Down) => self.next(),
            (_, KeyCode::Up) => self.previous(),

            (Page::Contacts, KeyCode::Enter) => self.toggle_detail(),

            // Typing filters contacts by name
            (Page::Contacts, KeyCode::Backspace) => self.pop_query(),
            (Page::Contacts, KeyCode::Char(c)) => self.push_query(c),

            (Page::Expenses, KeyCode::Char('q')) => return Ok(true),
            (Page::Expenses, KeyCode::Char('j')) => self.next(),
            (Page::Expenses, KeyCode::Char('k')) => self.previous(),
            (Page::Expenses, KeyCode::Char('r')) => self.reload_expenses()?,
            _ => {}
        }

        Ok(false)
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
        self.show_detail = false;
    }

    pub fn selected_contact(&self) -> Option<&str> {
        self.contact_state
            .selected()
            .and_then(|i| self.matches.get(i))
            .map(String::as_str)
    }

    fn current_len(&self) -> usize {
        match self.current_page {
            Page::Contacts => self.matches.len(),
            Page::Expenses => self.records.len(),
        }
    }

    fn selected(&self) -> Option<usize> {
        match self.current_page {
            Page::Contacts => self.contact_state.selected(),
            Page::Expenses => self.expense_state.selected(),
        }
    }

    fn select(&mut self, index: Option<usize>) {
        match self.current_page {
            Page::Contacts => self.contact_state.select(index),
            Page::Expenses => self.expense_state.select(index),
        }
    }

    pub fn next(&mut self) {
        let len = self.current_len();
        if len == 0 {
            return;
        }
        let i = match self.selected() {
            Some(i) if i >= len - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.current_len();
        if len == 0 {
            return;
        }
        let i = match self.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.select(Some(i));
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

    res
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        if app.handle_key(key)? {
            return Ok(());
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
        Page::Contacts => render_contacts(f, chunks[1], app),
        Page::Expenses => render_expenses(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut tab_spans = vec![];
    for (i, page) in [Page::Contacts, Page::Expenses].iter().enumerate() {
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

        tab_spans.push(Span::styled(page.title().to_string(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    match app.current_page {
        Page::Contacts => tab_spans.push(Span::styled(
            format!("{} contacts", app.contacts.len()),
            Style::default().fg(Color::White),
        )),
        Page::Expenses if app.ledger_error().is_some() => tab_spans.push(Span::styled(
            "ledger unavailable",
            Style::default().fg(Color::Red),
        )),
        Page::Expenses => tab_spans.push(Span::styled(
            summary_line(&app.totals, &app.currency),
            Style::default().fg(Color::White),
        )),
    }

    let header = Paragraph::new(Line::from(tab_spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(header, area);
}

fn render_contacts(f: &mut Frame, area: Rect, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let search = Paragraph::new(Line::from(vec![
        Span::styled(app.query.clone(), Style::default().fg(Color::White)),
        Span::styled("▏", Style::default().fg(Color::Yellow)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Search by Name "),
    );
    f.render_widget(search, chunks[0]);

    let list_area = if app.show_detail {
        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[1]);
        render_contact_detail(f, content_chunks[1], app);
        content_chunks[0]
    } else {
        chunks[1]
    };

    let items: Vec<ListItem> = app
        .matches
        .iter()
        .map(|name| ListItem::new(name.clone()))
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(format!(" Contacts ({}) ", app.matches.len())),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("→ ");

    f.render_stateful_widget(list, list_area, &mut app.contact_state);
}

fn render_contact_detail(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Contact Details ");

    let Some(name) = app.selected_contact() else {
        f.render_widget(Paragraph::new("No contact selected").block(block), area);
        return;
    };

    let mut content = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  Name: ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::raw(name.to_string()),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "  Numbers:",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
    ];

    for number in app.contacts.numbers(name).unwrap_or_default() {
        content.push(Line::from(format!("    {}", number)));
    }

    f.render_widget(Paragraph::new(content).block(block), area);
}

fn render_expenses(f: &mut Frame, area: Rect, app: &mut App) {
    if let Some(err) = app.ledger_error() {
        let message = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "  Expense ledger could not be opened:",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(format!("  {}", err)),
        ])
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title(" Expenses "),
        );
        f.render_widget(message, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    render_expense_table(f, chunks[0], app);
    render_breakdown(f, chunks[1], app);
}

fn render_expense_table(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = ["Name", "Amount", "Category", "Date"].iter().map(|h| {
        Cell::from(*h).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = app.records.iter().map(|record| {
        let cells = vec![
            Cell::from(truncate(&record.name, 28)),
            Cell::from(format!("{}{:.2}", app.currency, record.amount)),
            Cell::from(record.category.as_str())
                .style(Style::default().fg(category_color(record.category))),
            Cell::from(record.date.format("%Y-%m-%d").to_string()),
        ];

        Row::new(cells).height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(30),
            Constraint::Length(12),
            Constraint::Length(16),
            Constraint::Length(12),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Expenses "),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.expense_state);
}

fn render_breakdown(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(" By Category ");

    let slices = pie_slices(&app.totals);
    if slices.is_empty() {
        let empty = Paragraph::new(EMPTY_CHART_MESSAGE)
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    // bar heights in tenths of a percent
    let bars: Vec<Bar> = slices
        .iter()
        .map(|slice| {
            Bar::default()
                .value((slice.percent * 10.0).round() as u64)
                .text_value(format!("{:.1}%", slice.percent))
                .label(Line::from(short_label(slice.category)))
                .style(Style::default().fg(category_color(slice.category)))
        })
        .collect();

    let chart = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&bars))
        .bar_width(7)
        .bar_gap(2)
        .value_style(Style::default().fg(Color::Black).bg(Color::White));

    f.render_widget(chart, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let selected = app.selected().map(|i| i + 1).unwrap_or(0);

    let mut status_spans = vec![Span::styled(
        format!(" Row: {}/{} ", selected, app.current_len()),
        Style::default().fg(Color::Cyan),
    )];

    status_spans.push(Span::raw(" | "));
    status_spans.push(Span::styled("Tab", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Page | "));
    status_spans.push(Span::styled("↑/↓", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Nav | "));

    match app.current_page {
        Page::Contacts => {
            status_spans.push(Span::styled("type", Style::default().fg(Color::Yellow)));
            status_spans.push(Span::raw(" Filter | "));
            status_spans.push(Span::styled("Enter", Style::default().fg(Color::Yellow)));
            status_spans.push(Span::raw(" Details | "));
        }
        Page::Expenses => {
            status_spans.push(Span::styled("r", Style::default().fg(Color::Yellow)));
            status_spans.push(Span::raw(" Reload | "));
            status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
            status_spans.push(Span::raw("/"));
        }
    }

    status_spans.push(Span::styled("Esc", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(Line::from(status_spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn category_color(category: Category) -> Color {
    match category {
        Category::Food => Color::Green,
        Category::Transportation => Color::Cyan,
        Category::Utilities => Color::Yellow,
        Category::Entertainment => Color::Magenta,
        Category::Others => Color::Gray,
    }
}

fn short_label(category: Category) -> &'static str {
    match category {
        Category::Food => "Food",
        Category::Transportation => "Transp",
        Category::Utilities => "Util",
        Category::Entertainment => "Ent",
        Category::Others => "Other",
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
