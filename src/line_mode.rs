use anyhow::Result;
use sci_calc::config::AppConfig;
use sci_calc::sampler::y_extent;
use sci_calc::session::Session;
use std::io::{stdin, stdout, Write};
use termion::{
    clear::CurrentLine as ClearLine,
    cursor::{DetectCursorPos, Goto},
    event::Key,
    input::TermRead,
    raw::IntoRawMode,
};

const PROMPT: &str = "Expression: ";

// Функция для преобразования позиции символа в байтовую позицию
fn char_index_to_byte_index(s: &str, char_index: usize) -> usize {
    s.char_indices()
        .nth(char_index)
        .map(|(i, _)| i)
        .unwrap_or_else(|| s.len())
}

pub fn run_line(config: &AppConfig) -> Result<()> {
    println!("Scientific Console Calculator");
    println!("Supports: +, -, ×/*, ÷//, ^, π/pi, e, sin, cos, tan, log, ln, sqrt");
    println!("Expressions containing x are graphed over [{}, {}]", config.domain.0, config.domain.1);
    println!("Navigation: ←/→, Backspace/Delete, Home/End, ↑/↓ for history");
    println!("Special commands: 'quit' to exit, 'clear' to reset, 'history' to list\n");

    let mut session = Session::new()
        .with_history_limit(config.history_limit)
        .with_plot_range(config.domain, config.steps);

    let mut stdout = stdout().into_raw_mode()?;
    let mut history_index: Option<usize> = None;

    loop {
        write!(stdout, "{}{}", ClearLine, PROMPT)?;
        stdout.flush()?;

        let mut expression = String::new();
        let mut cursor_pos = 0; // позиция курсора в символах
        let (_, initial_y) = stdout.cursor_pos()?;

        let stdin = stdin();
        let mut keys = stdin.keys();

        loop {
            write!(stdout, "{}{}{}{}", Goto(1, initial_y), ClearLine, PROMPT, expression)?;
            let column = PROMPT.len() + 1 + expression.chars().take(cursor_pos).count();
            write!(stdout, "{}", Goto(column as u16, initial_y))?;
            stdout.flush()?;

            let Some(key) = keys.next() else {
                return Ok(());
            };

            match key? {
                Key::Char('\n') => break,
                Key::Ctrl('c') | Key::Ctrl('d') => {
                    write!(stdout, "\r\nGoodbye!\r\n")?;
                    return Ok(());
                }
                Key::Char(c) => {
                    let byte_idx = char_index_to_byte_index(&expression, cursor_pos);
                    expression.insert(byte_idx, c);
                    cursor_pos += 1;
                }
                Key::Backspace if cursor_pos > 0 => {
                    cursor_pos -= 1;
                    let byte_idx = char_index_to_byte_index(&expression, cursor_pos);
                    expression.remove(byte_idx);
                }
                Key::Delete if cursor_pos < expression.chars().count() => {
                    let byte_idx = char_index_to_byte_index(&expression, cursor_pos);
                    expression.remove(byte_idx);
                }
                Key::Left if cursor_pos > 0 => cursor_pos -= 1,
                Key::Right if cursor_pos < expression.chars().count() => cursor_pos += 1,
                Key::Home => cursor_pos = 0,
                Key::End => cursor_pos = expression.chars().count(),
                Key::Up => {
                    let history = session.history();
                    let next = history_index.map_or(0, |i| (i + 1).min(history.len().saturating_sub(1)));
                    if let Some(entry) = history.get(next) {
                        history_index = Some(next);
                        expression = entry.expression.clone();
                        cursor_pos = expression.chars().count();
                    }
                }
                Key::Down => match history_index {
                    Some(i) if i > 0 => {
                        history_index = Some(i - 1);
                        expression = session.history()[i - 1].expression.clone();
                        cursor_pos = expression.chars().count();
                    }
                    _ => {
                        history_index = None;
                        expression.clear();
                        cursor_pos = 0;
                    }
                },
                _ => {}
            }
        }

        history_index = None;
        let input = expression.trim();
        if input.is_empty() {
            write!(stdout, "\r\n")?;
            continue;
        }

        match input.to_lowercase().as_str() {
            "quit" | "exit" | "q" => {
                write!(stdout, "\r\nGoodbye!\r\n")?;
                return Ok(());
            }
            "clear" | "reset" => {
                session.clear();
                write!(stdout, "\r\nCleared\r\n\r\n")?;
                continue;
            }
            "history" => {
                write!(stdout, "\r\n")?;
                for entry in session.history() {
                    write!(
                        stdout,
                        "  {}  {} = {}\r\n",
                        entry.timestamp.format("%H:%M:%S"),
                        entry.expression,
                        entry.result
                    )?;
                }
                write!(stdout, "\r\n")?;
                continue;
            }
            _ => {}
        }

        session.clear();
        session.append(&input.replace('*', "×").replace('/', "÷"));
        session.evaluate();

        if session.is_graphing() {
            let points = session.graph_points();
            match y_extent(points) {
                Some((lo, hi)) => write!(
                    stdout,
                    "\r\n  {} = {} ({} points, y in [{}, {}])\r\n\r\n",
                    session.expression(),
                    session.result(),
                    points.len(),
                    sci_calc::calc_engine::format_number(lo),
                    sci_calc::calc_engine::format_number(hi)
                )?,
                None => write!(
                    stdout,
                    "\r\n  {} = nothing to plot on this domain\r\n\r\n",
                    session.expression()
                )?,
            }
        } else {
            write!(stdout, "\r\n  {} = {}\r\n\r\n", session.expression(), session.result())?;
        }
    }
}
