use pseudodojo_core::elements::{symbol, table_position, ALL_ELEMENTS};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::Widget;

use crate::app::{App, Focus};

pub const CELL_WIDTH: u16 = 4;
pub const GRID_WIDTH: u16 = 18 * CELL_WIDTH;
/// Seven periods, a spacer row and the two f-block rows.
pub const GRID_HEIGHT: u16 = 10;

/// `#rrggbb` to a terminal color.
pub fn hex_color(hex: &str) -> Color {
    hex.parse().unwrap_or(Color::Reset)
}

/// The periodic table grid, each cell painted from its state machine.
pub struct PeriodicTable<'a> {
    app: &'a App,
}

impl<'a> PeriodicTable<'a> {
    pub const fn new(app: &'a App) -> Self {
        Self { app }
    }
}

impl Widget for PeriodicTable<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for z in (1..).take(ALL_ELEMENTS.len()) {
            let (Some((row, column)), Some(label), Some(paint)) =
                (table_position(z), symbol(z), self.app.cell_paint(z))
            else {
                continue;
            };
            let row = if row >= 7 { row + 1 } else { row };
            let x = area.x + column * CELL_WIDTH;
            let y = area.y + row;
            if x + CELL_WIDTH > area.right() || y >= area.bottom() {
                continue;
            }

            let mut style = Style::default()
                .bg(hex_color(paint.background))
                .fg(hex_color(paint.foreground));
            if self.app.focus == Some(Focus::Element(z)) {
                style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
            }
            buf.set_string(x, y, format!("{label:^4}"), style);
        }
    }
}
