//! Carousel rendering: a strip of game cards eased toward the selection.

use crate::catalog::Catalog;
use crate::controller::LauncherSnapshot;
use crate::supervisor::AppMode;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Fraction of the remaining distance covered per tick.
const FOCUS_EASE: f32 = 0.2;
const CARD_WIDTH: u16 = 20;
const CARD_GAP: u16 = 2;
const MIN_BRIGHTNESS: f32 = 0.5;
const MIN_CARD_SCALE: f32 = 0.8;
const HELP_TEXT: &str = "<-/-> browse   Enter play   Esc quit";

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Linearly map `value` from `[in_lo, in_hi]` to `[out_lo, out_hi]`.
pub fn remap(value: f32, in_lo: f32, in_hi: f32, out_lo: f32, out_hi: f32) -> f32 {
    if in_hi == in_lo {
        return out_lo;
    }
    out_lo + (value - in_lo) * (out_hi - out_lo) / (in_hi - in_lo)
}

/// Per-entry focus weights plus the strip offset, eased once per tick.
#[derive(Debug, Clone)]
pub struct FocusAnimator {
    weights: Vec<f32>,
    slide: f32,
}

impl FocusAnimator {
    pub fn new(len: usize, selected: usize) -> Self {
        let weights = (0..len)
            .map(|i| if i == selected { 1.0 } else { 0.0 })
            .collect();
        Self {
            weights,
            slide: selected as f32,
        }
    }

    pub fn step(&mut self, selected: usize) {
        for (index, weight) in self.weights.iter_mut().enumerate() {
            let target = if index == selected { 1.0 } else { 0.0 };
            *weight = lerp(*weight, target, FOCUS_EASE);
        }
        self.slide = lerp(self.slide, selected as f32, FOCUS_EASE);
    }

    pub fn weight(&self, index: usize) -> f32 {
        self.weights.get(index).copied().unwrap_or(0.0)
    }

    pub fn slide(&self) -> f32 {
        self.slide
    }
}

pub fn draw(
    frame: &mut Frame,
    snapshot: &LauncherSnapshot,
    catalog: &Catalog,
    animator: &FocusAnimator,
) {
    let area = frame.size();
    match snapshot.mode {
        AppMode::Running => {
            let label = snapshot.running.as_deref().unwrap_or("game");
            draw_running(frame, area, label);
        }
        AppMode::Browsing => draw_carousel(frame, area, snapshot, catalog, animator),
    }
}

fn draw_running(frame: &mut Frame, area: Rect, label: &str) {
    let width = area.width.min(48);
    let height = area.height.min(5);
    let panel = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };
    let inner_width = width.saturating_sub(2) as usize;
    let text = vec![
        Line::from(Span::styled(
            truncate_to_width(&format!("Running {label}"), inner_width),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            truncate_to_width("hold both kill keys to stop", inner_width),
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let paragraph = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded));
    frame.render_widget(paragraph, panel);
}

fn draw_carousel(
    frame: &mut Frame,
    area: Rect,
    snapshot: &LauncherSnapshot,
    catalog: &Catalog,
    animator: &FocusAnimator,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(2),
            Constraint::Length(1),
        ])
        .split(area);

    let title = Paragraph::new(Line::from(Span::styled(
        "ARCADE",
        Style::default().add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(title, chunks[0]);

    let strip = chunks[1];
    let pitch = f32::from(CARD_WIDTH + CARD_GAP);
    let centre = f32::from(strip.x) + f32::from(strip.width) / 2.0;
    for (index, entry) in catalog.entries().iter().enumerate() {
        if strip.height < 3 {
            break;
        }
        let offset = (index as f32 - animator.slide()) * pitch;
        let left = (centre + offset - f32::from(CARD_WIDTH) / 2.0).round();
        // Only draw cards that fit entirely inside the strip.
        if left < f32::from(strip.x) || left + f32::from(CARD_WIDTH) > f32::from(strip.right()) {
            continue;
        }
        let weight = animator.weight(index);
        let scale = remap(weight, 0.0, 1.0, MIN_CARD_SCALE, 1.0);
        let height = ((f32::from(strip.height) * scale).round() as u16).clamp(3, strip.height);
        let card = Rect {
            x: left as u16,
            y: strip.y + (strip.height - height) / 2,
            width: CARD_WIDTH,
            height,
        };
        let shade = (remap(weight, 0.0, 1.0, MIN_BRIGHTNESS, 1.0) * 255.0).round() as u8;
        let mut style = Style::default().fg(Color::Rgb(shade, shade, shade));
        let mut border = BorderType::Plain;
        if index == snapshot.selected {
            style = style.add_modifier(Modifier::BOLD);
            border = BorderType::Double;
        }
        let name = truncate_to_width(&entry.name, usize::from(CARD_WIDTH - 2));
        let body = Paragraph::new(name)
            .style(style)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(border)
                    .border_style(style),
            );
        frame.render_widget(body, card);
    }

    if let Some(entry) = catalog.get(snapshot.selected) {
        let mut lines = vec![Line::from(truncate_to_width(
            &entry.caption(),
            usize::from(area.width),
        ))];
        if let Some(date) = entry.release_date.as_deref() {
            lines.push(Line::from(Span::styled(
                truncate_to_width(date, usize::from(area.width)),
                Style::default().fg(Color::DarkGray),
            )));
        }
        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), chunks[2]);
    }

    let help = Paragraph::new(Line::from(Span::styled(
        truncate_to_width(HELP_TEXT, usize::from(area.width)),
        Style::default().fg(Color::DarkGray),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(help, chunks[3]);
}

/// Cut `text` to at most `max` display columns, marking the cut with an ellipsis.
fn truncate_to_width(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > max - 1 {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogEntry;
    use ratatui::{backend::TestBackend, Terminal};

    fn catalog() -> Catalog {
        let mut pong = CatalogEntry::new("Pong", "/games/pong/run");
        pong.author = "Atari".to_string();
        let tetris = CatalogEntry::new("Tetris", "/games/tetris/run");
        let snake = CatalogEntry::new("Snake", "/games/snake/run");
        Catalog::new(vec![pong, tetris, snake]).unwrap()
    }

    fn render(snapshot: &LauncherSnapshot, animator: &FocusAnimator) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 16)).unwrap();
        terminal
            .draw(|frame| draw(frame, snapshot, &catalog(), animator))
            .unwrap();
        let buffer = terminal.backend().buffer();
        let mut lines = Vec::new();
        for y in 0..buffer.area.height {
            let line: String = (0..buffer.area.width)
                .map(|x| buffer.get(x, y).symbol().to_string())
                .collect();
            lines.push(line.trim_end().to_string());
        }
        lines.join("\n")
    }

    #[test]
    fn remap_and_lerp() {
        assert!((lerp(0.0, 10.0, 0.2) - 2.0).abs() < 1e-6);
        assert_eq!(remap(0.0, 0.0, 1.0, 0.5, 1.0), 0.5);
        assert!((remap(1.0, 0.0, 1.0, 0.8, 1.0) - 1.0).abs() < 1e-6);
        assert!((remap(0.5, 0.0, 1.0, 0.0, 10.0) - 5.0).abs() < 1e-6);
        assert_eq!(remap(3.0, 1.0, 1.0, 7.0, 9.0), 7.0);
    }

    #[test]
    fn animator_converges_on_selection() {
        let mut animator = FocusAnimator::new(3, 0);
        assert_eq!(animator.weight(0), 1.0);
        animator.step(2);
        assert!((animator.weight(2) - 0.2).abs() < 1e-6);
        assert!((animator.weight(0) - 0.8).abs() < 1e-6);
        for _ in 0..100 {
            animator.step(2);
        }
        assert!(animator.weight(2) > 0.999);
        assert!(animator.weight(0) < 0.001);
        assert!((animator.slide() - 2.0).abs() < 0.01);
        assert_eq!(animator.weight(9), 0.0);
    }

    #[test]
    fn browsing_shows_selected_caption() {
        let snapshot = LauncherSnapshot {
            mode: AppMode::Browsing,
            selected: 0,
            running: None,
        };
        let screen = render(&snapshot, &FocusAnimator::new(3, 0));
        assert!(screen.contains("ARCADE"));
        assert!(screen.contains("Pong by Atari"));
        assert!(screen.contains("Tetris"));
        assert!(!screen.contains("Running"));
    }

    #[test]
    fn running_replaces_carousel_with_panel() {
        let snapshot = LauncherSnapshot {
            mode: AppMode::Running,
            selected: 1,
            running: Some("Tetris".to_string()),
        };
        let screen = render(&snapshot, &FocusAnimator::new(3, 1));
        assert!(screen.contains("Running Tetris"));
        assert!(!screen.contains("ARCADE"));
    }

    #[test]
    fn truncation_respects_display_width() {
        assert_eq!(truncate_to_width("Pong", 10), "Pong");
        assert_eq!(truncate_to_width("Space Invaders", 6), "Space…");
        // Wide glyphs take two columns each.
        assert_eq!(truncate_to_width("日本語ゲーム", 5), "日本…");
        assert_eq!(truncate_to_width("abc", 0), "");
    }
}
