use std::iter;

use brickfall_engine::BoardSnapshot;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    widgets::{Block as BlockWidget, BlockExt, Widget},
};

use crate::ui::widgets::BlockDisplay;

/// A board snapshot with its shadow row underneath.
#[derive(Debug)]
pub struct BoardDisplay<'a> {
    snapshot: &'a BoardSnapshot,
    block: Option<BlockWidget<'a>>,
}

impl<'a> BoardDisplay<'a> {
    pub fn new(snapshot: &'a BoardSnapshot) -> Self {
        Self {
            snapshot,
            block: None,
        }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    fn columns(&self) -> u16 {
        u16::try_from(self.snapshot.matrix().width()).unwrap_or(u16::MAX)
    }

    /// Matrix rows plus the shadow row.
    fn rows(&self) -> u16 {
        u16::try_from(self.snapshot.matrix().height() + 1).unwrap_or(u16::MAX)
    }

    pub fn width(&self) -> u16 {
        self.columns().saturating_mul(BlockDisplay::width())
            + super::block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        self.rows().saturating_mul(BlockDisplay::height())
            + super::block_vertical_margin(self.block.as_ref())
    }
}

impl Widget for BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let col_constraints =
            (0..self.columns()).map(|_| Constraint::Length(BlockDisplay::width()));
        let row_constraints = (0..self.rows()).map(|_| Constraint::Length(BlockDisplay::height()));
        let horizontal = Layout::horizontal(col_constraints).flex(Flex::Center);
        let vertical = Layout::vertical(row_constraints);

        let grid_rows = vertical.split(area);
        let shadow_row = self
            .snapshot
            .shadow()
            .iter()
            .map(BlockDisplay::from_shadow)
            .collect::<Vec<_>>();
        let matrix_rows = self.snapshot.matrix().rows().map(|row| {
            row.map(|cell| BlockDisplay::from_cell(*cell, true))
                .collect::<Vec<_>>()
        });

        for (grid_row, row) in iter::zip(grid_rows.iter(), matrix_rows.chain([shadow_row])) {
            let grid_cells = horizontal.split(*grid_row);
            for (grid_cell, block_display) in iter::zip(grid_cells.iter(), row) {
                block_display.render(*grid_cell, buf);
            }
        }
    }
}
