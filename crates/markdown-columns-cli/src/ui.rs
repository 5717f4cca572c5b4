use markdown_columns_engine::TextRenderer;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::App;

pub fn draw(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(2),
        ])
        .split(f.area());

    let title = match app.blocks.len() {
        0 => format!("{}  (no column blocks)", app.file),
        n => format!("{}  block {}/{}", app.file, app.selected_block + 1, n),
    };
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        ))),
        chunks[0],
    );

    draw_block(f, app, chunks[1]);
    draw_footer(f, app, chunks[2]);
}

fn draw_block(f: &mut Frame, app: &mut App, area: Rect) {
    app.set_track_cells(area.width);
    app.block_area = Some(area);

    let Some(block) = app.current() else {
        f.render_widget(
            Paragraph::new("No column blocks in this note. Press b to insert one.")
                .block(Block::default().borders(Borders::ALL)),
            area,
        );
        return;
    };

    let widths = block.display_widths();
    let constraints: Vec<Constraint> = widths
        .iter()
        .map(|w| Constraint::Percentage(w.round().clamp(0.0, 100.0) as u16))
        .collect();
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    let dragged = block.engine().dragged_column();
    let drop_target = block.engine().drop_target();
    let edit = block.edit();

    for (index, cell) in cells.iter().enumerate() {
        let focused = index == app.focused_column;
        let border_style = if drop_target == Some(index) {
            Style::default().fg(Color::Cyan)
        } else if focused {
            Style::default().fg(Color::Yellow)
        } else if app.settings.show_column_borders {
            Style::default()
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let mut title = format!(" {} ", index + 1);
        if dragged == Some(index) {
            title.push_str("(moving) ");
        }

        let lines: Vec<Line> = match edit.filter(|e| e.column() == index) {
            Some(edit) => {
                let (before, after) = edit.text().split_at(edit.cursor());
                format!("{before}▏{after}")
                    .split('\n')
                    .map(|l| Line::from(l.to_string()))
                    .collect()
            }
            None => TextRenderer
                .to_lines(block.instance().column(index).unwrap_or_default())
                .into_iter()
                .map(Line::from)
                .collect(),
        };

        let column = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border_style)
                    .title(title),
            )
            .wrap(Wrap { trim: false });
        f.render_widget(column, *cell);
    }
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let help = if app.is_editing() {
        "Ctrl-S: save | Esc: cancel | Tab: complete link"
    } else {
        "q: quit | Tab: next block | h/l: focus | a/i: add after/before | x: remove | H/L: move | </>: resize | e: edit | o: open link | b: new block"
    };

    let mut status = vec![Span::raw(app.status.clone())];
    if !app.completions.is_empty() {
        status.push(Span::styled(
            format!("  [[ {} ]]", app.completions.join(" | ")),
            Style::default().fg(Color::Green),
        ));
    }

    f.render_widget(
        Paragraph::new(vec![
            Line::from(status),
            Line::from(Span::styled(help, Style::default().fg(Color::DarkGray))),
        ]),
        area,
    );
}
