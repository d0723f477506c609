//! Composite element and tree traversal.

use std::rc::Rc;

use crate::color::Color;
use crate::element::layout::{self, LayoutItem, LayoutParams};
use crate::element::{Element, ElementBase, ElementRef, RedrawSignal};
use crate::geometry::{Point, Rect, RectF};
use crate::log;
use crate::render::RenderContext;

/// An element owning an ordered list of children.
pub struct Container {
    base: ElementBase,
    children: Vec<ElementRef>,
    params: LayoutParams,
    background: Option<Color>,
    border: Option<(Color, f64)>,
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("base", &self.base)
            .field("children", &self.children.len())
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl Container {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            base: ElementBase::new(id),
            children: Vec::new(),
            params: LayoutParams::default(),
            background: None,
            border: None,
        }
    }

    #[must_use]
    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.base.set_bounds(bounds);
        self
    }

    #[must_use]
    pub fn with_layout(mut self, params: LayoutParams) -> Self {
        self.params = params;
        self
    }

    #[must_use]
    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    #[must_use]
    pub fn with_border(mut self, color: Color, width: f64) -> Self {
        self.border = Some((color, width));
        self
    }

    #[must_use]
    pub fn layout_params(&self) -> &LayoutParams {
        &self.params
    }

    pub fn set_layout_params(&mut self, params: LayoutParams) {
        self.params = params;
        self.base.mark_layout_dirty();
    }

    pub fn set_background(&mut self, color: Option<Color>) {
        self.background = color;
        self.base.request_redraw();
    }

    #[must_use]
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Children sorted back-to-front: by z-index, then insertion order.
    #[must_use]
    pub fn paint_order(&self) -> Vec<ElementRef> {
        paint_order(&self.children)
    }
}

impl Element for Container {
    fn base(&self) -> &ElementBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }

    fn render(&self, ctx: &mut dyn RenderContext) {
        let size = self.base.bounds().size();
        let local = RectF::new(0.0, 0.0, f64::from(size.width), f64::from(size.height));
        if let Some(bg) = self.background {
            ctx.set_fill_color(bg);
            ctx.fill_rectangle(local);
        }
        if let Some((color, width)) = self.border {
            ctx.set_stroke_color(color);
            ctx.set_stroke_width(width);
            let half = width / 2.0;
            ctx.draw_rectangle(RectF::new(half, half, local.width - width, local.height - width));
        }
    }

    fn children(&self) -> &[ElementRef] {
        &self.children
    }

    fn layout(&mut self) {
        let items: Vec<LayoutItem> = self
            .children
            .iter()
            .map(|child| {
                let c = child.borrow();
                let b = c.base();
                LayoutItem {
                    bounds: b.bounds(),
                    preferred: b.preferred_size(),
                    dock: b.dock(),
                    visible: b.is_visible(),
                }
            })
            .collect();
        let rects = layout::layout(self.base.bounds().size(), &self.params, &items);
        for (child, rect) in self.children.iter().zip(rects) {
            child.borrow_mut().base_mut().set_bounds(rect);
        }
    }
}

/// Stable sort by z-index; equal z keeps insertion order.
pub(crate) fn paint_order(children: &[ElementRef]) -> Vec<ElementRef> {
    let mut ordered: Vec<ElementRef> = children.to_vec();
    ordered.sort_by_key(|c| c.borrow().base().z_index());
    ordered
}

fn propagate_signal(element: &ElementRef, signal: Option<&RedrawSignal>) {
    element
        .borrow_mut()
        .base_mut()
        .set_redraw_signal(signal.cloned());
    let children: Vec<ElementRef> = element.borrow().children().to_vec();
    for child in &children {
        propagate_signal(child, signal);
    }
}

/// Attach `child` to the container `parent`.
///
/// Returns `false` (and logs) when `parent` is not a [`Container`], when
/// `child` already has a parent, or when the edge would create a cycle.
pub fn add_child(parent: &ElementRef, child: ElementRef) -> bool {
    if crate::element::is_within(&child, parent) {
        log::warn("add_child: refusing to create a cycle");
        return false;
    }
    if child.borrow().base().parent().is_some() {
        log::warn("add_child: child already has a parent");
        return false;
    }
    let (weak, signal) = {
        let p = parent.borrow();
        (p.base().self_ref(), p.base().redraw_signal().cloned())
    };
    {
        let mut p = parent.borrow_mut();
        let Some(container) = (*p).as_any_mut().downcast_mut::<Container>() else {
            log::warn("add_child: parent is not a container");
            return false;
        };
        container.children.push(Rc::clone(&child));
        container.base.mark_layout_dirty();
    }
    child.borrow_mut().base_mut().set_parent(weak);
    propagate_signal(&child, signal.as_ref());
    if let Some(signal) = signal {
        signal.request();
    }
    true
}

/// Detach `child` from `parent`. The child keeps living while other handles exist.
pub fn remove_child(parent: &ElementRef, child: &ElementRef) -> bool {
    let removed = {
        let mut p = parent.borrow_mut();
        let Some(container) = (*p).as_any_mut().downcast_mut::<Container>() else {
            return false;
        };
        let before = container.children.len();
        container.children.retain(|c| !Rc::ptr_eq(c, child));
        let removed = container.children.len() != before;
        if removed {
            container.base.mark_layout_dirty();
        }
        removed
    };
    if removed {
        child.borrow_mut().base_mut().set_parent(None);
        propagate_signal(child, None);
    }
    removed
}

/// Attach the window's redraw signal to a detached root.
pub(crate) fn attach_root(root: &ElementRef, signal: &RedrawSignal) {
    propagate_signal(root, Some(signal));
}

/// Paint `element` and its subtree.
///
/// Wraps the element in `push_state`, translate to its origin, clip to its
/// bounds, `render`, children back-to-front, `pop_state`. Hidden elements
/// and their subtrees are skipped.
pub fn render_element(element: &ElementRef, ctx: &mut dyn RenderContext) {
    let el = element.borrow();
    let base = el.base();
    if !base.is_visible() {
        return;
    }
    let b = base.bounds();
    ctx.push_state();
    ctx.translate(f64::from(b.x), f64::from(b.y));
    ctx.clip_rect(RectF::new(0.0, 0.0, f64::from(b.width), f64::from(b.height)));
    el.render(ctx);
    for child in paint_order(el.children()) {
        render_element(&child, ctx);
    }
    ctx.pop_state();
}

/// One step of a hit path: the element and its window-space origin.
#[derive(Clone)]
pub struct HitEntry {
    pub element: ElementRef,
    pub origin: Point,
}

impl std::fmt::Debug for HitEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HitEntry")
            .field("id", &self.element.borrow().base().id())
            .field("origin", &self.origin)
            .finish()
    }
}

/// Path from `root` to the deepest front-most interactive element under `point`.
///
/// `point` is in the coordinate space of `root`'s parent (window
/// coordinates for a window root). Empty when nothing is hit.
#[must_use]
pub fn hit_path(root: &ElementRef, point: Point) -> Vec<HitEntry> {
    let mut path = Vec::new();
    hit_into(root, point, Point::ZERO, &mut path);
    path
}

fn hit_into(element: &ElementRef, point: Point, parent_origin: Point, path: &mut Vec<HitEntry>) -> bool {
    let (bounds, children) = {
        let el = element.borrow();
        let base = el.base();
        if !base.is_interactive() {
            return false;
        }
        (base.bounds(), el.children().to_vec())
    };
    let local_bounds = bounds.translate(parent_origin.x, parent_origin.y);
    if !local_bounds.contains(point) {
        return false;
    }
    let origin = local_bounds.origin();
    path.push(HitEntry {
        element: Rc::clone(element),
        origin,
    });
    for child in paint_order(&children).iter().rev() {
        if hit_into(child, point, origin, path) {
            return true;
        }
    }
    true
}

/// Deepest front-most interactive element under `point`.
#[must_use]
pub fn hit_test(root: &ElementRef, point: Point) -> Option<ElementRef> {
    hit_path(root, point).pop().map(|e| e.element)
}
