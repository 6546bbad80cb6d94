use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use formlayout_config::Config;
use formlayout_engine::{Form, FormOptions, Paginator, io};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use std::{
    env,
    io::stdout,
    path::{Path, PathBuf},
    process,
};

mod dump;

struct App {
    forms_path: PathBuf,
    options: FormOptions,
    forms: Vec<PathBuf>,
    form_list_state: ListState,
    form: Option<Form>,
    pages: Paginator,
    current_content: Vec<String>,
}

impl App {
    fn new(forms_path: PathBuf, options: FormOptions) -> Result<Self> {
        let forms = io::list_forms(&forms_path)?;

        let mut app = Self {
            forms_path,
            options,
            forms,
            form_list_state: ListState::default(),
            form: None,
            pages: Paginator::new(0),
            current_content: Vec::new(),
        };

        if !app.forms.is_empty() {
            app.form_list_state.select(Some(0));
            app.update_content_for_selection();
        }

        Ok(app)
    }

    fn next_form(&mut self) {
        if self.forms.is_empty() {
            return;
        }
        let i = match self.form_list_state.selected() {
            Some(i) => (i + 1) % self.forms.len(),
            None => 0,
        };
        self.form_list_state.select(Some(i));
        self.update_content_for_selection();
    }

    fn previous_form(&mut self) {
        if self.forms.is_empty() {
            return;
        }
        let i = match self.form_list_state.selected() {
            Some(0) | None => self.forms.len() - 1,
            Some(i) => i - 1,
        };
        self.form_list_state.select(Some(i));
        self.update_content_for_selection();
    }

    fn update_content_for_selection(&mut self) {
        let Some(path) = self
            .form_list_state
            .selected()
            .and_then(|index| self.forms.get(index))
            .cloned()
        else {
            return;
        };

        let built = io::read_form(&path)
            .map_err(anyhow::Error::from)
            .and_then(|descriptor| Ok(Form::build(&descriptor, &self.options)?));
        match built {
            Ok(form) => {
                self.pages = form.paginator();
                self.form = Some(form);
                self.render_page();
            }
            Err(e) => {
                log::info!("{}: {e}", path.display());
                self.form = None;
                self.pages = Paginator::new(0);
                self.current_content = vec![format!("Error loading form: {e}")];
            }
        }
    }

    /// Apply a paginator move and redraw the preview if the page changed.
    fn turn_page(&mut self, step: fn(&mut Paginator) -> bool) {
        if step(&mut self.pages) {
            self.render_page();
        }
    }

    fn render_page(&mut self) {
        let Some(page) = self.form.as_ref().and_then(|f| f.page(self.pages.current())) else {
            self.current_content.clear();
            return;
        };

        let mut lines = Vec::new();
        for (key, value) in page.properties.iter() {
            if matches!(key, "caption" | "tooltip" | "help") {
                lines.push(format!("{key}: {value}"));
            }
        }
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.extend(page.root.sketch());
        self.current_content = lines;
    }

    fn selected_name(&self) -> Option<String> {
        let path = self.forms.get(self.form_list_state.selected()?)?;
        Some(display_name(path, &self.forms_path))
    }
}

fn display_name(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

fn load_options(config: Option<&Config>) -> FormOptions {
    match config {
        Some(config) => FormOptions {
            width: config.page_width,
            height: config.page_height,
            catalogue: config.field_catalogue(),
        },
        None => FormOptions::default(),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = env::args().collect();
    let config_path = Config::config_path();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };
    let options = load_options(config.as_ref());

    let forms_path;
    let from_config;

    match args.as_slice() {
        [_, flag, file] if flag == "--dump" => {
            let path = PathBuf::from(file);
            let descriptor = io::read_form(&path)?;
            match dump::dump(&descriptor, &options) {
                Ok(out) => {
                    print!("{out}");
                    return Ok(());
                }
                Err(e) => {
                    eprintln!("{}: {e}", path.display());
                    process::exit(1);
                }
            }
        }
        [_, dir] => {
            forms_path = PathBuf::from(dir);
            from_config = false;
        }
        [_] => match config {
            Some(config) => {
                forms_path = config.forms_path;
                from_config = true;
            }
            None => {
                eprintln!("Error: No forms path provided and no config file found");
                eprintln!("Usage: {} <forms-folder-path>", args[0]);
                eprintln!("Or create a config file at {}", config_path.display());
                process::exit(1);
            }
        },
        _ => {
            eprintln!("Usage: {} [forms-folder-path]", args[0]);
            eprintln!("       {} --dump <form-file>", args[0]);
            process::exit(1);
        }
    }

    if !forms_path.is_dir() {
        let source = if from_config {
            format!(" from config file '{}'", config_path.display())
        } else {
            String::new()
        };
        eprintln!(
            "Error: Forms path '{}'{} is not a directory",
            forms_path.display(),
            source
        );
        process::exit(1);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = App::new(forms_path, options).and_then(|mut app| run_app(&mut terminal, &mut app));

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
            match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Down | KeyCode::Char('j') => app.next_form(),
                KeyCode::Up | KeyCode::Char('k') => app.previous_form(),
                KeyCode::PageDown if ctrl => app.turn_page(Paginator::last),
                KeyCode::PageUp if ctrl => app.turn_page(Paginator::first),
                KeyCode::PageDown | KeyCode::Right => app.turn_page(Paginator::next),
                KeyCode::PageUp | KeyCode::Left => app.turn_page(Paginator::prev),
                KeyCode::End => app.turn_page(Paginator::last),
                KeyCode::Home => app.turn_page(Paginator::first),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .margin(1)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)].as_ref())
        .split(f.area());

    // Form list panel
    let form_items: Vec<ListItem> = app
        .forms
        .iter()
        .map(|path| {
            let name = display_name(path, &app.forms_path);
            ListItem::new(vec![Line::from(vec![Span::raw(name)])])
        })
        .collect();

    let forms_list = List::new(form_items)
        .block(Block::default().borders(Borders::ALL).title("Forms"))
        .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));

    f.render_stateful_widget(forms_list, chunks[0], &mut app.form_list_state);

    // Preview panel
    let preview_text = if app.current_content.is_empty() {
        vec![Line::from("Select a form to preview it")]
    } else {
        app.current_content
            .iter()
            .map(|line| Line::from(vec![Span::raw(line.clone())]))
            .collect()
    };

    let title = match (app.selected_name(), app.form.is_some()) {
        (Some(name), true) => format!("{name} [{}]", app.pages.label()),
        (Some(name), false) => name,
        (None, _) => "Preview".to_string(),
    };
    let preview =
        Paragraph::new(preview_text).block(Block::default().borders(Borders::ALL).title(title));

    f.render_widget(preview, chunks[1]);

    let help_text = Line::from(vec![
        Span::raw("q: Quit | "),
        Span::raw("↑/k: Previous | "),
        Span::raw("↓/j: Next | "),
        Span::raw("PgUp/PgDn: Page | Ctrl+PgUp/PgDn: First/Last"),
    ]);

    let help = Paragraph::new(vec![help_text]).block(Block::default());

    // Place help at bottom
    let bottom_chunk = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)].as_ref())
        .split(f.area());

    f.render_widget(help, bottom_chunk[1]);
}
