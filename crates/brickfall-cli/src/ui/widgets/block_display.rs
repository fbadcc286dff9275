use brickfall_engine::{Cell, CellColor};
use ratatui::{
    prelude::{Buffer, Rect},
    style::Style,
    widgets::{Paragraph, Widget},
};

use crate::ui::widgets::style;

/// One board cell, two terminal columns wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockDisplay {
    style: Style,
    symbol: &'static str,
}

impl BlockDisplay {
    pub const fn new(style: Style, symbol: &'static str) -> Self {
        Self { style, symbol }
    }

    pub fn width() -> u16 {
        2
    }

    pub fn height() -> u16 {
        1
    }

    pub fn from_cell(cell: Cell, show_dots: bool) -> Self {
        if cell.is_empty() {
            return if show_dots {
                Self::new(style::EMPTY_DOT, ".")
            } else {
                Self::new(style::EMPTY, "")
            };
        }
        let style = match cell.color() {
            CellColor::Default => style::PLAIN,
            CellColor::Cyan => style::CYAN_BLOCK,
            CellColor::Blue => style::BLUE_BLOCK,
            CellColor::Orange => style::ORANGE_BLOCK,
            CellColor::Yellow => style::YELLOW_BLOCK,
            CellColor::Green => style::GREEN_BLOCK,
            CellColor::Magenta => style::MAGENTA_BLOCK,
            CellColor::Red => style::RED_BLOCK,
        };
        Self::new(style, "")
    }

    /// Marker under a column covered by the falling brick.
    pub fn from_shadow(set: bool) -> Self {
        if set {
            Self::new(style::SHADOW, "^^")
        } else {
            Self::new(style::EMPTY, "")
        }
    }
}

impl Widget for BlockDisplay {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        // Use a Paragraph to fill the whole area, not just the cells with the symbol
        Paragraph::new(self.symbol)
            .style(self.style)
            .centered()
            .render(area, buf);
    }
}

impl Widget for &BlockDisplay {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        (*self).render(area, buf);
    }
}
