//! Layout engines.
//!
//! Each engine is a pure function of the container size, the
//! [`LayoutParams`] and the children's [`LayoutItem`]s, returning one rect
//! per item in parent-local coordinates. Hidden items keep their current
//! bounds and take no space.

use crate::geometry::{Insets, Rect, Size};

/// Which layout engine a container uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LayoutKind {
    /// Child bounds are used as-is.
    #[default]
    Absolute,
    /// Pack along the main axis, wrapping onto a new line on overflow.
    Flow,
    /// Pack along the main axis without wrapping.
    Stack,
    /// Fixed column count, row-major, cells share the content area evenly.
    Grid,
    /// Children consume container edges in order; the last fills the rest.
    Dock,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    #[default]
    Horizontal,
    Vertical,
}

/// Main-axis distribution of leftover space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Align {
    #[default]
    Start,
    Center,
    End,
    SpaceBetween,
}

/// Cross-axis placement within a line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CrossAlign {
    #[default]
    Start,
    Center,
    End,
    Stretch,
}

/// Edge a child docks to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DockSide {
    Left,
    Top,
    Right,
    Bottom,
    #[default]
    Fill,
}

/// Layout configuration for a container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LayoutParams {
    pub kind: LayoutKind,
    pub direction: Direction,
    pub align: Align,
    pub cross_align: CrossAlign,
    pub spacing: u32,
    pub padding: Insets,
    /// Grid column count; treated as at least 1.
    pub columns: u32,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            kind: LayoutKind::Absolute,
            direction: Direction::Horizontal,
            align: Align::Start,
            cross_align: CrossAlign::Start,
            spacing: 0,
            padding: Insets::default(),
            columns: 1,
        }
    }
}

impl LayoutParams {
    #[must_use]
    pub fn new(kind: LayoutKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn flow(direction: Direction) -> Self {
        Self::new(LayoutKind::Flow).with_direction(direction)
    }

    #[must_use]
    pub fn stack(direction: Direction) -> Self {
        Self::new(LayoutKind::Stack).with_direction(direction)
    }

    #[must_use]
    pub fn grid(columns: u32) -> Self {
        Self::new(LayoutKind::Grid).with_columns(columns)
    }

    #[must_use]
    pub fn dock() -> Self {
        Self::new(LayoutKind::Dock)
    }

    #[must_use]
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    #[must_use]
    pub fn with_align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    #[must_use]
    pub fn with_cross_align(mut self, cross_align: CrossAlign) -> Self {
        self.cross_align = cross_align;
        self
    }

    #[must_use]
    pub fn with_spacing(mut self, spacing: u32) -> Self {
        self.spacing = spacing;
        self
    }

    #[must_use]
    pub fn with_padding(mut self, padding: Insets) -> Self {
        self.padding = padding;
        self
    }

    #[must_use]
    pub fn with_columns(mut self, columns: u32) -> Self {
        self.columns = columns.max(1);
        self
    }
}

/// What a layout engine needs to know about one child.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LayoutItem {
    pub bounds: Rect,
    pub preferred: Size,
    pub dock: DockSide,
    pub visible: bool,
}

impl LayoutItem {
    #[must_use]
    pub fn new(preferred: Size) -> Self {
        Self {
            bounds: Rect::from_size(preferred),
            preferred,
            dock: DockSide::Fill,
            visible: true,
        }
    }

    #[must_use]
    pub fn with_dock(mut self, dock: DockSide) -> Self {
        self.dock = dock;
        self
    }
}

/// Compute child rects.
#[must_use]
pub fn layout(container: Size, params: &LayoutParams, items: &[LayoutItem]) -> Vec<Rect> {
    let content = Rect::from_size(container).inset(params.padding);
    match params.kind {
        LayoutKind::Absolute => items.iter().map(|i| i.bounds).collect(),
        LayoutKind::Flow => linear(content, params, items, true),
        LayoutKind::Stack => linear(content, params, items, false),
        LayoutKind::Grid => grid(content, params, items),
        LayoutKind::Dock => dock(content, params, items),
    }
}

/// (main, cross) extents of a size for the given direction.
fn axes(size: Size, direction: Direction) -> (u32, u32) {
    match direction {
        Direction::Horizontal => (size.width, size.height),
        Direction::Vertical => (size.height, size.width),
    }
}

fn from_axes(content: Rect, direction: Direction, main: u32, cross: u32, main_len: u32, cross_len: u32) -> Rect {
    match direction {
        Direction::Horizontal => Rect::new(
            content.x.saturating_add_unsigned(main),
            content.y.saturating_add_unsigned(cross),
            main_len,
            cross_len,
        ),
        Direction::Vertical => Rect::new(
            content.x.saturating_add_unsigned(cross),
            content.y.saturating_add_unsigned(main),
            cross_len,
            main_len,
        ),
    }
}

struct Line {
    items: Vec<usize>,
    main: u32,
    cross: u32,
}

fn linear(content: Rect, params: &LayoutParams, items: &[LayoutItem], wrap: bool) -> Vec<Rect> {
    let dir = params.direction;
    let (avail_main, avail_cross) = axes(content.size(), dir);
    let spacing = params.spacing;

    let mut lines: Vec<Line> = Vec::new();
    let mut current = Line {
        items: Vec::new(),
        main: 0,
        cross: 0,
    };
    for (idx, item) in items.iter().enumerate().filter(|(_, i)| i.visible) {
        let (m, c) = axes(item.preferred, dir);
        let needed = if current.items.is_empty() {
            m
        } else {
            current.main.saturating_add(spacing).saturating_add(m)
        };
        if wrap && !current.items.is_empty() && needed > avail_main {
            lines.push(std::mem::replace(
                &mut current,
                Line {
                    items: Vec::new(),
                    main: 0,
                    cross: 0,
                },
            ));
            current.main = m;
        } else {
            current.main = needed;
        }
        current.cross = current.cross.max(c);
        current.items.push(idx);
    }
    if !current.items.is_empty() {
        lines.push(current);
    }

    let mut out: Vec<Rect> = items.iter().map(|i| i.bounds).collect();
    let mut cross_pos = 0u32;
    for line in &lines {
        // A single unwrapped line aligns across the whole content extent.
        let line_cross = if wrap { line.cross } else { avail_cross };
        let leftover = avail_main.saturating_sub(line.main);
        let n = line.items.len() as u32;
        let (mut main_pos, gap) = match params.align {
            Align::Start => (0, spacing),
            Align::Center => (leftover / 2, spacing),
            Align::End => (leftover, spacing),
            Align::SpaceBetween if n > 1 => (0, spacing.saturating_add(leftover / (n - 1))),
            Align::SpaceBetween => (0, spacing),
        };
        for &idx in &line.items {
            let (m, c) = axes(items[idx].preferred, dir);
            let (offset, len) = match params.cross_align {
                CrossAlign::Start => (0, c),
                CrossAlign::Center => (line_cross.saturating_sub(c) / 2, c),
                CrossAlign::End => (line_cross.saturating_sub(c), c),
                CrossAlign::Stretch => (0, line_cross),
            };
            out[idx] = from_axes(content, dir, main_pos, cross_pos.saturating_add(offset), m, len);
            main_pos = main_pos.saturating_add(m).saturating_add(gap);
        }
        cross_pos = cross_pos.saturating_add(line.cross).saturating_add(spacing);
    }
    out
}

fn grid(content: Rect, params: &LayoutParams, items: &[LayoutItem]) -> Vec<Rect> {
    let columns = params.columns.max(1);
    let visible: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, i)| i.visible)
        .map(|(idx, _)| idx)
        .collect();
    let mut out: Vec<Rect> = items.iter().map(|i| i.bounds).collect();
    if visible.is_empty() {
        return out;
    }
    let rows = (visible.len() as u32).div_ceil(columns);
    let spacing = params.spacing;
    let cell_w = content
        .width
        .saturating_sub(spacing.saturating_mul(columns - 1))
        / columns;
    let cell_h = content.height.saturating_sub(spacing.saturating_mul(rows - 1)) / rows;

    for (n, &idx) in visible.iter().enumerate() {
        let n = n as u32;
        let col = n % columns;
        let row = n / columns;
        out[idx] = Rect::new(
            content.x.saturating_add_unsigned(col.saturating_mul(cell_w.saturating_add(spacing))),
            content.y.saturating_add_unsigned(row.saturating_mul(cell_h.saturating_add(spacing))),
            cell_w,
            cell_h,
        );
    }
    out
}

fn dock(content: Rect, params: &LayoutParams, items: &[LayoutItem]) -> Vec<Rect> {
    let mut out: Vec<Rect> = items.iter().map(|i| i.bounds).collect();
    let visible: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, i)| i.visible)
        .map(|(idx, _)| idx)
        .collect();
    let spacing = params.spacing;
    let mut remaining = content;

    for (n, &idx) in visible.iter().enumerate() {
        let item = &items[idx];
        let last = n + 1 == visible.len();
        if last || item.dock == DockSide::Fill {
            out[idx] = remaining;
            continue;
        }
        let r = remaining;
        match item.dock {
            DockSide::Left => {
                let w = item.preferred.width.min(r.width);
                out[idx] = Rect::new(r.x, r.y, w, r.height);
                let used = w.saturating_add(spacing).min(r.width);
                remaining = Rect::new(r.x.saturating_add_unsigned(used), r.y, r.width - used, r.height);
            }
            DockSide::Right => {
                let w = item.preferred.width.min(r.width);
                out[idx] = Rect::new(r.right().saturating_sub_unsigned(w), r.y, w, r.height);
                let used = w.saturating_add(spacing).min(r.width);
                remaining = Rect::new(r.x, r.y, r.width - used, r.height);
            }
            DockSide::Top => {
                let h = item.preferred.height.min(r.height);
                out[idx] = Rect::new(r.x, r.y, r.width, h);
                let used = h.saturating_add(spacing).min(r.height);
                remaining = Rect::new(r.x, r.y.saturating_add_unsigned(used), r.width, r.height - used);
            }
            DockSide::Bottom => {
                let h = item.preferred.height.min(r.height);
                out[idx] = Rect::new(r.x, r.bottom().saturating_sub_unsigned(h), r.width, h);
                let used = h.saturating_add(spacing).min(r.height);
                remaining = Rect::new(r.x, r.y, r.width, r.height - used);
            }
            DockSide::Fill => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(sizes: &[(u32, u32)]) -> Vec<LayoutItem> {
        sizes
            .iter()
            .map(|&(w, h)| LayoutItem::new(Size::new(w, h)))
            .collect()
    }

    #[test]
    fn test_flow_wraps() {
        let params = LayoutParams::flow(Direction::Horizontal).with_spacing(10);
        let rects = layout(Size::new(100, 100), &params, &items(&[(40, 20), (40, 30), (40, 20)]));
        assert_eq!(rects[0], Rect::new(0, 0, 40, 20));
        assert_eq!(rects[1], Rect::new(50, 0, 40, 30));
        // Line height is the tallest item plus spacing.
        assert_eq!(rects[2], Rect::new(0, 40, 40, 20));
    }

    #[test]
    fn test_stack_does_not_wrap() {
        let params = LayoutParams::stack(Direction::Horizontal);
        let rects = layout(Size::new(100, 50), &params, &items(&[(60, 10), (60, 10)]));
        assert_eq!(rects[1], Rect::new(60, 0, 60, 10));
    }

    #[test]
    fn test_stack_vertical_stretch_and_padding() {
        let params = LayoutParams::stack(Direction::Vertical)
            .with_cross_align(CrossAlign::Stretch)
            .with_padding(Insets::uniform(5))
            .with_spacing(2);
        let rects = layout(Size::new(100, 100), &params, &items(&[(10, 20), (30, 20)]));
        assert_eq!(rects[0], Rect::new(5, 5, 90, 20));
        assert_eq!(rects[1], Rect::new(5, 27, 90, 20));
    }

    #[test]
    fn test_alignment() {
        let center = LayoutParams::stack(Direction::Horizontal)
            .with_align(Align::Center)
            .with_cross_align(CrossAlign::Center);
        let rects = layout(Size::new(100, 50), &center, &items(&[(20, 10)]));
        assert_eq!(rects[0], Rect::new(40, 20, 20, 10));

        let between = LayoutParams::stack(Direction::Horizontal).with_align(Align::SpaceBetween);
        let rects = layout(Size::new(100, 10), &between, &items(&[(20, 10), (20, 10), (20, 10)]));
        assert_eq!(rects[2].x, 80);
        assert_eq!(rects[1].x, 40);
    }

    #[test]
    fn test_grid_row_major() {
        let params = LayoutParams::grid(2).with_spacing(10);
        let rects = layout(Size::new(110, 50), &params, &items(&[(1, 1), (1, 1), (1, 1)]));
        assert_eq!(rects[0], Rect::new(0, 0, 50, 20));
        assert_eq!(rects[1], Rect::new(60, 0, 50, 20));
        assert_eq!(rects[2], Rect::new(0, 30, 50, 20));
    }

    #[test]
    fn test_huge_spacing_saturates() {
        let grid = LayoutParams::grid(3).with_spacing(u32::MAX);
        let rects = layout(Size::new(100, 50), &grid, &items(&[(1, 1); 4]));
        assert_eq!(rects[0], Rect::new(0, 0, 0, 0));
        assert_eq!(rects[1].x, i32::MAX);
        assert_eq!(rects[3], Rect::new(0, i32::MAX, 0, 0));

        let flow = LayoutParams::flow(Direction::Horizontal).with_spacing(u32::MAX);
        let rects = layout(Size::new(100, 100), &flow, &items(&[(10, 10), (10, 10)]));
        assert_eq!(rects[0], Rect::new(0, 0, 10, 10));
        assert_eq!(rects[1], Rect::new(0, i32::MAX, 10, 10));

        let dock = LayoutParams::dock().with_spacing(u32::MAX);
        let children = vec![
            LayoutItem::new(Size::new(10, 0)).with_dock(DockSide::Right),
            LayoutItem::new(Size::new(0, 0)),
        ];
        let rects = layout(Size::new(100, 40), &dock, &children);
        assert_eq!(rects[0], Rect::new(90, 0, 10, 40));
        assert_eq!(rects[1], Rect::new(0, 0, 0, 40));
    }

    #[test]
    fn test_dock_edges_then_fill() {
        let params = LayoutParams::dock();
        let children = vec![
            LayoutItem::new(Size::new(0, 20)).with_dock(DockSide::Top),
            LayoutItem::new(Size::new(30, 0)).with_dock(DockSide::Left),
            LayoutItem::new(Size::new(0, 10)).with_dock(DockSide::Bottom),
            LayoutItem::new(Size::new(5, 5)).with_dock(DockSide::Left),
        ];
        let rects = layout(Size::new(200, 100), &params, &children);
        assert_eq!(rects[0], Rect::new(0, 0, 200, 20));
        assert_eq!(rects[1], Rect::new(0, 20, 30, 80));
        assert_eq!(rects[2], Rect::new(30, 90, 170, 10));
        // Last child fills whatever is left, regardless of its side.
        assert_eq!(rects[3], Rect::new(30, 20, 170, 70));
    }

    #[test]
    fn test_hidden_items_keep_bounds() {
        let mut children = items(&[(10, 10), (10, 10)]);
        children[0].visible = false;
        children[0].bounds = Rect::new(3, 3, 1, 1);
        let rects = layout(Size::new(100, 100), &LayoutParams::stack(Direction::Horizontal), &children);
        assert_eq!(rects[0], Rect::new(3, 3, 1, 1));
        assert_eq!(rects[1], Rect::new(0, 0, 10, 10));
    }

    #[test]
    fn test_absolute_passthrough() {
        let mut children = items(&[(10, 10)]);
        children[0].bounds = Rect::new(7, 8, 9, 10);
        let rects = layout(Size::new(50, 50), &LayoutParams::default(), &children);
        assert_eq!(rects[0], Rect::new(7, 8, 9, 10));
    }
}
