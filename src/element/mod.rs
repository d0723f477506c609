//! The element tree.
//!
//! Every UI node implements [`Element`] and embeds an [`ElementBase`] holding
//! identity, parent-local bounds, state flags, z-order, a weak parent link,
//! per-kind event hooks and the common callbacks. Nodes are shared through
//! [`ElementRef`]; a parent owns its children, a child only holds a `Weak`
//! back to its parent.
//!
//! # Examples
//!
//! ```
//! use paneforge::element::{Container, Element};
//! use paneforge::geometry::Rect;
//!
//! let root = Container::new("root").with_bounds(Rect::new(0, 0, 200, 100)).into_ref();
//! let child = Container::new("child").with_bounds(Rect::new(10, 10, 50, 50)).into_ref();
//! paneforge::element::add_child(&root, child.clone());
//! assert!(child.borrow().base().parent().is_some());
//! ```

mod container;
pub mod layout;

pub use container::{Container, HitEntry, add_child, hit_path, hit_test, remove_child, render_element};
pub(crate) use container::{attach_root, paint_order};

use std::any::Any;
use std::cell::{Cell, Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use bitflags::bitflags;

use crate::geometry::{Point, Rect, Size};
use crate::input::{Event, EventKind};
use crate::render::RenderContext;
use layout::DockSide;

/// Shared handle to an element.
pub type ElementRef = Rc<RefCell<dyn Element>>;
/// Non-owning element handle.
pub type WeakElementRef = Weak<RefCell<dyn Element>>;

bitflags! {
    /// Element state flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ElementFlags: u8 {
        const VISIBLE   = 0x01;
        /// Receives input. Inactive elements and their subtrees are skipped by hit-testing.
        const ACTIVE    = 0x02;
        const FOCUSED   = 0x04;
        const HOVERED   = 0x08;
        const FOCUSABLE = 0x10;
    }
}

impl Default for ElementFlags {
    fn default() -> Self {
        Self::VISIBLE | Self::ACTIVE
    }
}

/// Redraw request flag shared by a window and every element attached to it.
#[derive(Clone, Debug, Default)]
pub struct RedrawSignal(Rc<Cell<bool>>);

impl RedrawSignal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.set(true);
    }

    #[must_use]
    pub fn is_requested(&self) -> bool {
        self.0.get()
    }

    /// Read and clear.
    pub fn take(&self) -> bool {
        self.0.replace(false)
    }

    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

static NEXT_ELEMENT_ID: AtomicU64 = AtomicU64::new(1);

/// Event hook: return `true` to consume.
pub type EventHook = Box<dyn FnMut(&Event) -> bool>;
type Callback = Box<dyn FnMut(&Event)>;
type FocusCallback = Box<dyn FnMut(bool)>;

/// State shared by every element.
pub struct ElementBase {
    string_id: String,
    numeric_id: u64,
    bounds: Rect,
    flags: ElementFlags,
    z_index: i32,
    preferred_size: Option<Size>,
    dock: DockSide,
    parent: Option<WeakElementRef>,
    self_ref: Option<WeakElementRef>,
    redraw: Option<RedrawSignal>,
    layout_dirty: bool,
    hooks: HashMap<EventKind, Vec<EventHook>>,
    on_click: Option<Callback>,
    on_hover_enter: Option<Callback>,
    on_hover_leave: Option<Callback>,
    on_focus_changed: Option<FocusCallback>,
}

impl fmt::Debug for ElementBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementBase")
            .field("id", &self.string_id)
            .field("numeric_id", &self.numeric_id)
            .field("bounds", &self.bounds)
            .field("flags", &self.flags)
            .field("z_index", &self.z_index)
            .finish_non_exhaustive()
    }
}

impl ElementBase {
    /// Create a visible, active element with empty bounds.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            string_id: id.into(),
            numeric_id: NEXT_ELEMENT_ID.fetch_add(1, Ordering::Relaxed),
            bounds: Rect::default(),
            flags: ElementFlags::default(),
            z_index: 0,
            preferred_size: None,
            dock: DockSide::default(),
            parent: None,
            self_ref: None,
            redraw: None,
            layout_dirty: true,
            hooks: HashMap::new(),
            on_click: None,
            on_hover_enter: None,
            on_hover_leave: None,
            on_focus_changed: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.string_id
    }

    #[must_use]
    pub fn numeric_id(&self) -> u64 {
        self.numeric_id
    }

    /// Bounds in parent-local coordinates.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Set bounds; a size change marks the layout dirty.
    pub fn set_bounds(&mut self, bounds: Rect) {
        if bounds == self.bounds {
            return;
        }
        if bounds.size() != self.bounds.size() {
            self.layout_dirty = true;
        }
        self.bounds = bounds;
        self.request_redraw();
    }

    pub fn set_position(&mut self, x: i32, y: i32) {
        let b = self.bounds;
        self.set_bounds(Rect::new(x, y, b.width, b.height));
    }

    pub fn set_size(&mut self, size: Size) {
        let b = self.bounds;
        self.set_bounds(Rect::new(b.x, b.y, size.width, size.height));
    }

    /// Size requested from layout engines; defaults to the current size.
    #[must_use]
    pub fn preferred_size(&self) -> Size {
        self.preferred_size.unwrap_or_else(|| self.bounds.size())
    }

    pub fn set_preferred_size(&mut self, size: Option<Size>) {
        self.preferred_size = size;
        self.mark_parent_dirty();
    }

    #[must_use]
    pub fn dock(&self) -> DockSide {
        self.dock
    }

    pub fn set_dock(&mut self, dock: DockSide) {
        self.dock = dock;
        self.mark_parent_dirty();
    }

    #[must_use]
    pub fn flags(&self) -> ElementFlags {
        self.flags
    }

    fn set_flag(&mut self, flag: ElementFlags, on: bool) {
        if self.flags.contains(flag) != on {
            self.flags.set(flag, on);
            self.request_redraw();
        }
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.flags.contains(ElementFlags::VISIBLE)
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.set_flag(ElementFlags::VISIBLE, visible);
        self.mark_parent_dirty();
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.flags.contains(ElementFlags::ACTIVE)
    }

    pub fn set_active(&mut self, active: bool) {
        self.set_flag(ElementFlags::ACTIVE, active);
    }

    #[must_use]
    pub fn is_focused(&self) -> bool {
        self.flags.contains(ElementFlags::FOCUSED)
    }

    /// Only the router sets focus; see `Window::set_focus`.
    pub(crate) fn set_focused(&mut self, focused: bool) {
        self.set_flag(ElementFlags::FOCUSED, focused);
    }

    #[must_use]
    pub fn is_hovered(&self) -> bool {
        self.flags.contains(ElementFlags::HOVERED)
    }

    pub(crate) fn set_hovered(&mut self, hovered: bool) {
        self.set_flag(ElementFlags::HOVERED, hovered);
    }

    #[must_use]
    pub fn is_focusable(&self) -> bool {
        self.flags.contains(ElementFlags::FOCUSABLE)
    }

    pub fn set_focusable(&mut self, focusable: bool) {
        self.flags.set(ElementFlags::FOCUSABLE, focusable);
    }

    /// Visible, active, and hence eligible for hit-testing.
    #[must_use]
    pub fn is_interactive(&self) -> bool {
        self.flags.contains(ElementFlags::VISIBLE | ElementFlags::ACTIVE)
    }

    #[must_use]
    pub fn z_index(&self) -> i32 {
        self.z_index
    }

    pub fn set_z_index(&mut self, z: i32) {
        if self.z_index != z {
            self.z_index = z;
            self.request_redraw();
        }
    }

    /// Live parent, if attached.
    #[must_use]
    pub fn parent(&self) -> Option<ElementRef> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    pub(crate) fn set_parent(&mut self, parent: Option<WeakElementRef>) {
        self.parent = parent;
    }

    /// Weak handle to the element embedding this base, set by `into_ref`.
    #[must_use]
    pub fn self_ref(&self) -> Option<WeakElementRef> {
        self.self_ref.clone()
    }

    pub(crate) fn set_self_ref(&mut self, weak: WeakElementRef) {
        self.self_ref = Some(weak);
    }

    #[must_use]
    pub fn redraw_signal(&self) -> Option<&RedrawSignal> {
        self.redraw.as_ref()
    }

    pub(crate) fn set_redraw_signal(&mut self, signal: Option<RedrawSignal>) {
        self.redraw = signal;
    }

    /// Ask the owning window to repaint. No-op when detached.
    pub fn request_redraw(&self) {
        if let Some(signal) = &self.redraw {
            signal.request();
        }
    }

    #[must_use]
    pub fn is_layout_dirty(&self) -> bool {
        self.layout_dirty
    }

    pub fn mark_layout_dirty(&mut self) {
        self.layout_dirty = true;
        self.request_redraw();
    }

    pub(crate) fn clear_layout_dirty(&mut self) {
        self.layout_dirty = false;
    }

    /// The parent re-runs layout when a child's layout inputs change.
    fn mark_parent_dirty(&self) {
        if let Some(parent) = self.parent() {
            if let Ok(mut p) = parent.try_borrow_mut() {
                p.base_mut().mark_layout_dirty();
            }
        }
        self.request_redraw();
    }

    /// Add a hook for one event kind. Hooks run before `Element::on_event`.
    pub fn add_hook<F>(&mut self, kind: EventKind, hook: F)
    where
        F: FnMut(&Event) -> bool + 'static,
    {
        self.hooks.entry(kind).or_default().push(Box::new(hook));
    }

    pub fn clear_hooks(&mut self, kind: EventKind) {
        self.hooks.remove(&kind);
    }

    pub fn set_on_click<F: FnMut(&Event) + 'static>(&mut self, f: F) {
        self.on_click = Some(Box::new(f));
    }

    pub fn set_on_hover_enter<F: FnMut(&Event) + 'static>(&mut self, f: F) {
        self.on_hover_enter = Some(Box::new(f));
    }

    pub fn set_on_hover_leave<F: FnMut(&Event) + 'static>(&mut self, f: F) {
        self.on_hover_leave = Some(Box::new(f));
    }

    pub fn set_on_focus_changed<F: FnMut(bool) + 'static>(&mut self, f: F) {
        self.on_focus_changed = Some(Box::new(f));
    }

    /// Run hooks and kind-specific callbacks. Returns `true` if a hook consumed.
    pub fn dispatch_hooks(&mut self, event: &Event) -> bool {
        match event.kind {
            EventKind::MouseEnter => {
                if let Some(cb) = &mut self.on_hover_enter {
                    cb(event);
                }
            }
            EventKind::MouseLeave => {
                if let Some(cb) = &mut self.on_hover_leave {
                    cb(event);
                }
            }
            EventKind::FocusGained | EventKind::FocusLost => {
                if let Some(cb) = &mut self.on_focus_changed {
                    cb(event.kind == EventKind::FocusGained);
                }
            }
            _ => {}
        }
        if let Some(hooks) = self.hooks.get_mut(&event.kind) {
            for hook in hooks {
                if hook(event) {
                    return true;
                }
            }
        }
        false
    }

    /// Fire `on_click`. Returns whether a callback was set.
    pub fn fire_click(&mut self, event: &Event) -> bool {
        match &mut self.on_click {
            Some(cb) => {
                cb(event);
                true
            }
            None => false,
        }
    }
}

/// Blanket `Any` access for downcasting element handles.
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A node in the UI tree.
///
/// `render` draws in the element's own coordinate space: the caller has
/// already translated to the element's origin and clipped to its bounds.
/// Children are rendered by [`render_element`] after the parent.
pub trait Element: AsAny {
    fn base(&self) -> &ElementBase;
    fn base_mut(&mut self) -> &mut ElementBase;

    fn render(&self, ctx: &mut dyn RenderContext) {
        let _ = ctx;
    }

    /// Handle an event; return `true` iff consumed.
    fn on_event(&mut self, event: &Event) -> bool {
        let _ = event;
        false
    }

    /// Owned children in insertion order.
    fn children(&self) -> &[ElementRef] {
        &[]
    }

    /// Position children. Called before paint when the layout is dirty.
    fn layout(&mut self) {}

    /// Advance time-driven state such as a caret blink.
    fn tick(&mut self, now: Duration) {
        let _ = now;
    }

    fn accepts_focus(&self) -> bool {
        self.base().is_focusable()
    }

    /// Wrap into a shared handle and record the self reference.
    fn into_ref(self) -> ElementRef
    where
        Self: Sized + 'static,
    {
        let rc: ElementRef = Rc::new(RefCell::new(self));
        let weak = Rc::downgrade(&rc);
        rc.borrow_mut().base_mut().set_self_ref(weak);
        rc
    }
}

/// Run hooks, then the element's own handler.
pub fn dispatch(element: &ElementRef, event: &Event) -> bool {
    let mut el = element.borrow_mut();
    if el.base_mut().dispatch_hooks(event) {
        return true;
    }
    el.on_event(event)
}

/// Borrow an element as its concrete type.
pub fn downcast<T: Element + 'static>(element: &ElementRef) -> Option<Ref<'_, T>> {
    Ref::filter_map(element.borrow(), |el| el.as_any().downcast_ref::<T>()).ok()
}

/// Mutably borrow an element as its concrete type.
pub fn downcast_mut<T: Element + 'static>(element: &ElementRef) -> Option<RefMut<'_, T>> {
    RefMut::filter_map(element.borrow_mut(), |el| el.as_any_mut().downcast_mut::<T>()).ok()
}

/// Window-coordinate origin of `element`, summing ancestor offsets.
#[must_use]
pub fn global_origin(element: &ElementRef) -> Point {
    let mut origin = Point::ZERO;
    let mut current = Some(Rc::clone(element));
    while let Some(el) = current {
        let el = el.borrow();
        let b = el.base().bounds();
        origin = Point::new(origin.x + b.x, origin.y + b.y);
        current = el.base().parent();
    }
    origin
}

/// Bounds of `element` in window coordinates.
#[must_use]
pub fn global_bounds(element: &ElementRef) -> Rect {
    let origin = global_origin(element);
    let size = element.borrow().base().bounds().size();
    Rect::new(origin.x, origin.y, size.width, size.height)
}

/// Ancestors from the parent up to the root.
#[must_use]
pub fn ancestors(element: &ElementRef) -> Vec<ElementRef> {
    let mut out = Vec::new();
    let mut current = element.borrow().base().parent();
    while let Some(el) = current {
        current = el.borrow().base().parent();
        out.push(el);
    }
    out
}

/// Whether `element` is `root` or lies beneath it.
#[must_use]
pub fn is_within(root: &ElementRef, element: &ElementRef) -> bool {
    Rc::ptr_eq(root, element) || ancestors(element).iter().any(|a| Rc::ptr_eq(a, root))
}

/// Pre-order walk of the subtree rooted at `root`.
pub fn walk(root: &ElementRef, visit: &mut dyn FnMut(&ElementRef)) {
    visit(root);
    let children: Vec<ElementRef> = root.borrow().children().to_vec();
    for child in &children {
        walk(child, visit);
    }
}

/// Tick every element in tree order.
pub fn tick_tree(root: &ElementRef, now: Duration) {
    walk(root, &mut |el| el.borrow_mut().tick(now));
}

/// Lay out every dirty element, parents before children.
pub fn layout_tree(root: &ElementRef) {
    {
        let mut el = root.borrow_mut();
        if el.base().is_layout_dirty() {
            el.layout();
            el.base_mut().clear_layout_dirty();
        }
    }
    let children: Vec<ElementRef> = root.borrow().children().to_vec();
    for child in &children {
        layout_tree(child);
    }
}

/// Find an element by string id.
#[must_use]
pub fn find_by_id(root: &ElementRef, id: &str) -> Option<ElementRef> {
    let mut found = None;
    walk(root, &mut |el| {
        if found.is_none() && el.borrow().base().id() == id {
            found = Some(Rc::clone(el));
        }
    });
    found
}
