use super::app::{AiPanel, App, InputTarget};
use super::helpers::{highlight_functions, plot_bounds, wrap_text};
use crate::render_help::render_help;
use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use sci_calc::ai::AnalysisKind;
use std::time::Duration;
use unicode_width::UnicodeWidthStr;

const MIN_TERMINAL_WIDTH: u16 = 60;
const MIN_TERMINAL_HEIGHT: u16 = 20;

pub fn run_ui_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        app.poll_ai();

        terminal.draw(|f| {
            if app.show_help {
                render_help(f, app);
            } else {
                ui(f, app);
            }
        })?;

        if app.should_quit {
            break;
        }

        if crossterm::event::poll(Duration::from_millis(50))? {
            if let Event::Key(KeyEvent { code, modifiers, kind, .. }) = crossterm::event::read()? {
                if kind == KeyEventKind::Press {
                    handle_key_event(app, code, modifiers);
                }
            }
        }
    }
    Ok(())
}

fn handle_key_event(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    if app.show_help {
        match code {
            KeyCode::Down => app.help_scroll = app.help_scroll.saturating_add(1),
            KeyCode::Up => app.help_scroll = app.help_scroll.saturating_sub(1),
            KeyCode::PageDown => app.help_scroll = app.help_scroll.saturating_add(10),
            KeyCode::PageUp => app.help_scroll = app.help_scroll.saturating_sub(10),
            KeyCode::Esc | KeyCode::F(1) => {
                app.show_help = false;
                app.help_scroll = 0;
            }
            _ => {}
        }
        return;
    }

    if modifiers.contains(KeyModifiers::CONTROL) {
        match code {
            KeyCode::Char('c') | KeyCode::Char('q') => app.should_quit = true,
            KeyCode::Char('u') | KeyCode::Char('U') => app.clear(),
            KeyCode::Char('p') | KeyCode::Char('P') => app.insert_pi(),
            _ => {}
        }
        return;
    }

    match code {
        KeyCode::Char(c) => app.type_char(c),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Enter => app.submit(),
        KeyCode::Esc => {
            if app.target == InputTarget::WordProblem {
                app.toggle_problem_input();
            } else {
                app.clear();
            }
        }
        KeyCode::Up => app.navigate_history(-1),
        KeyCode::Down => app.navigate_history(1),
        KeyCode::F(1) => {
            app.show_help = true;
            app.help_scroll = 0;
        }
        KeyCode::F(2) => app.analyze_expression(),
        KeyCode::F(3) => app.toggle_problem_input(),
        _ => {}
    }
}

fn ui(frame: &mut Frame, app: &mut App) {
    let terminal_size = frame.size();

    app.terminal_too_small = terminal_size.width < MIN_TERMINAL_WIDTH
        || terminal_size.height < MIN_TERMINAL_HEIGHT;

    if app.terminal_too_small {
        render_resize_message(frame, terminal_size);
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(4),
            Constraint::Min(10),
            Constraint::Length(1),
        ])
        .split(terminal_size);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[1]);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Min(6), Constraint::Length(12)])
        .split(columns[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Min(5), Constraint::Length(3)])
        .split(columns[1]);

    render_display(frame, app, rows[0]);
    render_graph(frame, app, left[0]);
    render_history(frame, app, left[1]);
    render_ai_panel(frame, app, right[0]);
    render_problem_input(frame, app, right[1]);
    render_status(frame, rows[2]);
}

fn render_resize_message(frame: &mut Frame, area: Rect) {
    let message = format!(
        "Terminal too small! Min size: {}x{}. Current: {}x{}",
        MIN_TERMINAL_WIDTH, MIN_TERMINAL_HEIGHT, area.width, area.height
    );

    let text = vec![
        Line::from(Span::styled(
            message,
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Please resize your terminal window",
            Style::default().fg(Color::Yellow),
        )),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" Resize Required ")
        .title_alignment(Alignment::Center);

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

fn render_display(frame: &mut Frame, app: &mut App, area: Rect) {
    let focused = app.target == InputTarget::Expression;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused { Color::Cyan } else { Color::DarkGray }))
        .title(" Display ")
        .title_alignment(Alignment::Center);

    let inner_area = block.inner(area);
    frame.render_widget(block, area);

    let expression = app.session.expression();
    let width = inner_area.width as usize;

    // keep the tail visible, like a calculator display
    let mut visible = expression;
    while visible.width() > width.saturating_sub(1) {
        let mut chars = visible.chars();
        chars.next();
        visible = chars.as_str();
    }

    let expression_line = if expression.is_empty() {
        Line::from(Span::styled("Ready_", Style::default().fg(Color::DarkGray)))
    } else {
        Line::from(highlight_functions(visible, Style::default().fg(Color::Cyan)))
    };

    let result = app.session.result();
    let result_style = if result == sci_calc::calc_engine::ERROR_TEXT {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    };
    let result_line = Line::from(Span::styled(
        if result.is_empty() { "0" } else { result },
        result_style,
    ));

    let paragraph = Paragraph::new(vec![expression_line, result_line]).alignment(Alignment::Right);
    frame.render_widget(paragraph, inner_area);

    if focused {
        let cursor_x = inner_area.x + inner_area.width.saturating_sub(1);
        frame.set_cursor(cursor_x, inner_area.y);
    }
}

fn render_graph(frame: &mut Frame, app: &mut App, area: Rect) {
    let title = if app.session.is_graphing() {
        format!(" Graph // {} ", app.session.expression())
    } else {
        " Graph ".to_string()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(title)
        .title_alignment(Alignment::Center);

    let points = app.session.graph_points();
    if !app.session.is_graphing() || points.is_empty() {
        let message = if app.session.is_graphing() {
            "Nothing to plot on this domain."
        } else {
            "Enter an expression in x and press Enter to plot it."
        };
        let paragraph = Paragraph::new(message)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let data: Vec<(f64, f64)> = points.iter().map(|p| (p.x, p.y)).collect();
    let ((x_min, x_max), (y_min, y_max)) = plot_bounds(points);
    let axis_style = Style::default().fg(Color::DarkGray);

    let dataset = Dataset::default()
        .name(app.session.expression().to_string())
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(&data);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .style(axis_style)
                .bounds([x_min, x_max])
                .labels(axis_labels(x_min, x_max)),
        )
        .y_axis(
            Axis::default()
                .style(axis_style)
                .bounds([y_min, y_max])
                .labels(axis_labels(y_min, y_max)),
        );

    frame.render_widget(chart, area);
}

fn axis_labels(min: f64, max: f64) -> Vec<Span<'static>> {
    let mid = (min + max) / 2.0;
    [min, mid, max]
        .iter()
        .map(|v| Span::raw(sci_calc::calc_engine::format_number((v * 100.0).round() / 100.0)))
        .collect()
}

fn render_history(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" History ")
        .title_alignment(Alignment::Center);

    let inner_area = block.inner(area);
    frame.render_widget(block, area);

    let history = app.session.history();
    if history.is_empty() {
        let empty_msg = Paragraph::new("No calculations yet.")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(empty_msg, inner_area);
        return;
    }

    let items: Vec<ListItem> = history
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let is_selected = app.cursor_history == Some(i);
            let base_style = Style::default().fg(if is_selected { Color::Yellow } else { Color::Cyan });

            let mut spans = vec![Span::styled(
                entry.timestamp.format("%H:%M:%S ").to_string(),
                Style::default().fg(Color::DarkGray),
            )];
            spans.extend(highlight_functions(&entry.expression, base_style));
            spans.push(Span::styled(" = ", Style::default().fg(Color::Gray)));
            spans.push(Span::styled(
                entry.result.clone(),
                Style::default().fg(Color::LightMagenta).add_modifier(Modifier::BOLD),
            ));
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD));

    let mut state = ListState::default().with_selected(app.cursor_history);
    frame.render_stateful_widget(list, inner_area, &mut state);
}

fn render_ai_panel(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta))
        .title(" Analysis ")
        .title_alignment(Alignment::Center);

    let inner_area = block.inner(area);
    frame.render_widget(block, area);

    let heading = Style::default().fg(Color::Cyan).add_modifier(Modifier::UNDERLINED);
    let wrap_width = inner_area.width.saturating_sub(4) as usize;

    let mut lines: Vec<Line> = match &app.ai_panel {
        AiPanel::Loading(kind) => vec![Line::from(Span::styled(
            match kind {
                AnalysisKind::Expression => "Analyzing expression...",
                AnalysisKind::WordProblem => "Solving problem...",
            },
            Style::default().fg(Color::Yellow).add_modifier(Modifier::SLOW_BLINK),
        ))],
        AiPanel::Failed(message) => vec![Line::from(Span::styled(
            *message,
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ))],
        AiPanel::Idle | AiPanel::Ready => Vec::new(),
    };

    match &app.analysis {
        None => {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "F2 analyzes the expression, F3 opens the word problem box.",
                Style::default().fg(Color::DarkGray),
            )));
        }
        Some(analysis) => {
            if !lines.is_empty() {
                lines.push(Line::from(""));
            }
            lines.push(Line::from(Span::styled("Explanation", heading)));
            lines.extend(
                wrap_text(&analysis.explanation, wrap_width)
                    .into_iter()
                    .map(Line::from),
            );
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled("Steps", heading)));
            for (i, step) in analysis.steps.iter().enumerate() {
                for (j, line) in wrap_text(step, wrap_width).into_iter().enumerate() {
                    let prefix = if j == 0 { format!("{:>2}. ", i + 1) } else { "    ".to_string() };
                    lines.push(Line::from(vec![
                        Span::styled(prefix, Style::default().fg(Color::DarkGray)),
                        Span::raw(line),
                    ]));
                }
            }
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled("Related formulas", heading)));
            for formula in &analysis.suggested_formulas {
                lines.push(Line::from(Span::styled(
                    format!("  {}", formula),
                    Style::default().fg(Color::LightMagenta),
                )));
            }
        }
    }

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, inner_area);
}

fn render_problem_input(frame: &mut Frame, app: &mut App, area: Rect) {
    let focused = app.target == InputTarget::WordProblem;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused { Color::Cyan } else { Color::DarkGray }))
        .title(" Word problem (F3) ");

    let inner_area = block.inner(area);
    frame.render_widget(block, area);

    let width = inner_area.width.saturating_sub(2) as usize;
    let text = &app.problem_text;
    let skip = text.chars().count().saturating_sub(width);
    let visible: String = text.chars().skip(skip).collect();

    let line = if text.is_empty() && !focused {
        Line::from(Span::styled("ENTER WORD PROBLEM TO SOLVE...", Style::default().fg(Color::DarkGray)))
    } else {
        Line::from(format!("> {}", visible))
    };
    frame.render_widget(Paragraph::new(line), inner_area);

    if focused {
        let cursor_x = inner_area.x + 2 + visible.width() as u16;
        frame.set_cursor(cursor_x.min(inner_area.x + inner_area.width.saturating_sub(1)), inner_area.y);
    }
}

fn render_status(frame: &mut Frame, area: Rect) {
    let keys = [
        ("Enter", "Evaluate"),
        ("Esc", "Clear"),
        ("Up/Down", "History"),
        ("F1", "Help"),
        ("F2", "Analyze"),
        ("F3", "Problem"),
        ("Ctrl+Q", "Quit"),
    ];

    let spans: Vec<Span> = keys
        .iter()
        .flat_map(|(key, desc)| {
            vec![
                Span::styled(
                    *key,
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!(" {} ", desc),
                    Style::default().fg(Color::DarkGray),
                ),
            ]
        })
        .collect();

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
