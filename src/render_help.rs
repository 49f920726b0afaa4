use crate::tui_mode::app::App;
use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

pub fn render_help(frame: &mut Frame, app: &mut App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" SciCalc Help ")
        .title_alignment(Alignment::Center)
        .style(Style::default().bg(Color::Black));

    let section = Style::default().fg(Color::Cyan).add_modifier(Modifier::UNDERLINED);

    let help_text = vec![
        Line::from(Span::styled("SciCalc - Scientific Calculator and Grapher", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(Span::styled("Basic Operations:", section)),
        Line::from("  + : Addition        (e.g., 5 + 3 = 8)"),
        Line::from("  - : Subtraction     (e.g., 10 - 4 = 6)"),
        Line::from("  × : Multiplication  (type *, e.g., 6 × 7 = 42)"),
        Line::from("  ÷ : Division        (type /, e.g., 15 ÷ 3 = 5)"),
        Line::from("  ^ : Exponentiation  (e.g., 2 ^ 10 = 1024)"),
        Line::from("  Implicit products   (e.g., 2π, 3(4), 2x)"),
        Line::from(""),
        Line::from(Span::styled("Functions (radians):", section)),
        Line::from("  sin(x) cos(x) tan(x) asin(x) acos(x) atan(x)"),
        Line::from("  sinh(x) cosh(x) tanh(x)"),
        Line::from("  log(x)   : Base-10 logarithm"),
        Line::from("  ln(x)    : Natural logarithm"),
        Line::from("  exp(x)   : Exponential function"),
        Line::from("  sqrt(x)  : Square root"),
        Line::from("  abs(x) floor(x) ceil(x) round(x)"),
        Line::from(""),
        Line::from(Span::styled("Constants:", section)),
        Line::from("  π or pi : 3.14159... (Ctrl+P inserts π)"),
        Line::from("  e       : Euler's number (2.71828...)"),
        Line::from(""),
        Line::from(Span::styled("Graphing:", section)),
        Line::from("  Any expression containing x is plotted (default domain [-10, 10])"),
        Line::from("  Points where the function is undefined are skipped"),
        Line::from("  e.g., x^2, sin(x), sqrt(x), 1/x"),
        Line::from(""),
        Line::from(Span::styled("Analysis:", section)),
        Line::from("  F2     : Explain the current expression"),
        Line::from("  F3     : Toggle the word problem box, Enter sends it"),
        Line::from("  Needs GEMINI_API_KEY; shows an offline message otherwise"),
        Line::from(""),
        Line::from(Span::styled("Keys:", section)),
        Line::from("  Enter / = : Evaluate"),
        Line::from("  Backspace : Delete last symbol"),
        Line::from("  Esc       : Clear expression and graph"),
        Line::from("  Ctrl+U    : Clear current input"),
        Line::from("  ↑ ↓       : Recall history entries (newest first)"),
        Line::from("  F1        : Show this help screen"),
        Line::from("  Ctrl+Q    : Quit"),
    ];

    let paragraph = Paragraph::new(help_text)
        .block(block)
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true })
        .scroll((app.help_scroll as u16, 0));

    frame.render_widget(Clear, frame.size());
    frame.render_widget(paragraph, frame.size());
}
