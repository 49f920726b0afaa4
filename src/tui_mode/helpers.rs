use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use sci_calc::calc_engine::lexer::is_known_name;
use sci_calc::sampler::{y_extent, PlotPoint, DEFAULT_DOMAIN};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec!["".to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_width = 0;

    for word in text.split_whitespace() {
        let word_width = word.width();

        if word_width > width {
            let mut remaining = word;
            while !remaining.is_empty() {
                let mut chunk = String::new();
                let mut chunk_width = 0;
                let mut chunk_byte_len = 0;

                for c in remaining.chars() {
                    let char_width = UnicodeWidthChar::width_cjk(c).unwrap_or(1);
                    if chunk_width + char_width > width {
                        break;
                    }
                    chunk.push(c);
                    chunk_width += char_width;
                    chunk_byte_len += c.len_utf8();
                }

                // a single glyph wider than the line still has to go somewhere
                if chunk_byte_len == 0 {
                    if let Some(c) = remaining.chars().next() {
                        chunk.push(c);
                        chunk_byte_len = c.len_utf8();
                    }
                }

                if !current_line.is_empty() {
                    lines.push(current_line.trim().to_string());
                    current_line.clear();
                    current_width = 0;
                }

                lines.push(chunk);
                remaining = &remaining[chunk_byte_len..];
            }
            continue;
        }

        if current_width + word_width + 1 > width && !current_line.is_empty() {
            lines.push(current_line.trim().to_string());
            current_line.clear();
            current_width = 0;
        }

        if !current_line.is_empty() {
            current_line.push(' ');
            current_width += 1;
        }

        current_line.push_str(word);
        current_width += word_width;
    }

    if !current_line.is_empty() {
        lines.push(current_line.trim().to_string());
    }

    lines
}

fn flush_word(spans: &mut Vec<Span<'static>>, word: &mut String, base_style: Style, function_style: Style) {
    if word.is_empty() {
        return;
    }
    let style = if is_known_name(&word.to_ascii_lowercase()) {
        function_style
    } else {
        base_style
    };
    spans.push(Span::styled(std::mem::take(word), style));
}

fn flush_number(spans: &mut Vec<Span<'static>>, number: &mut String, number_style: Style) {
    if !number.is_empty() {
        spans.push(Span::styled(std::mem::take(number), number_style));
    }
}

/// Colors names, numbers and operators of a display-notation expression.
pub fn highlight_functions(expr: &str, base_style: Style) -> Vec<Span<'static>> {
    let function_style = Style::default()
        .fg(Color::LightBlue)
        .add_modifier(Modifier::BOLD);

    let operator_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);

    let number_style = Style::default()
        .fg(Color::LightGreen);

    let mut spans = Vec::new();
    let mut word = String::new();
    let mut number = String::new();

    for c in expr.chars() {
        if c.is_ascii_alphabetic() {
            flush_number(&mut spans, &mut number, number_style);
            word.push(c);
            continue;
        }
        flush_word(&mut spans, &mut word, base_style, function_style);

        if c.is_ascii_digit() || c == '.' {
            number.push(c);
            continue;
        }
        flush_number(&mut spans, &mut number, number_style);

        match c {
            '+' | '-' | '*' | '/' | '^' | '×' | '÷' | '−' => {
                spans.push(Span::styled(c.to_string(), operator_style));
            }
            'π' => {
                spans.push(Span::styled(c.to_string(), function_style));
            }
            ' ' => {
                spans.push(Span::raw(" "));
            }
            _ => {
                spans.push(Span::styled(c.to_string(), base_style));
            }
        }
    }

    flush_word(&mut spans, &mut word, base_style, function_style);
    flush_number(&mut spans, &mut number, number_style);

    spans
}

/// Axis bounds for a point set: the data extent, widened when flat.
pub fn plot_bounds(points: &[PlotPoint]) -> ((f64, f64), (f64, f64)) {
    let x = match (points.first(), points.last()) {
        (Some(first), Some(last)) if first.x < last.x => (first.x, last.x),
        _ => DEFAULT_DOMAIN,
    };
    let y = match y_extent(points) {
        Some((lo, hi)) if lo < hi => (lo, hi),
        Some((v, _)) => (v - 1.0, v + 1.0),
        None => DEFAULT_DOMAIN,
    };
    (x, y)
}
