//! Focus and hit-test routing.
//!
//! The [`Router`] turns window-level events into element dispatch:
//!
//! - pointer events go to the deepest front-most hit and bubble up the hit
//!   path; hover transitions produce `MouseEnter`/`MouseLeave`
//! - `MouseDown` moves focus to the nearest focus-accepting element on the
//!   hit path, or clears it
//! - keyboard events go to the focused element, bubble through its
//!   ancestors, then fall back to the window hotkey table, the engine's
//!   global hotkeys and finally Tab focus navigation
//! - `TextInput` goes to the focused element only
//!
//! A consumed event stops propagation.

use std::rc::Rc;
use std::time::Duration;

use crate::element::{self, ElementRef, HitEntry, WeakElementRef};
use crate::geometry::Point;
use crate::input::{Event, EventKind, KeyCode, Modifiers};
use crate::keyboard::{HotkeyTable, KeyboardState};

/// Per-window routing state.
#[derive(Default)]
pub struct Router {
    focused: Option<WeakElementRef>,
    hovered: Vec<WeakElementRef>,
    captured: Option<WeakElementRef>,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let focused = self.focused().map(|e| e.borrow().base().id().to_string());
        f.debug_struct("Router")
            .field("focused", &focused)
            .field("hovered", &self.hovered.len())
            .finish_non_exhaustive()
    }
}

fn same(a: &ElementRef, b: &ElementRef) -> bool {
    Rc::ptr_eq(a, b)
}

/// Dispatch with `local` set relative to `origin`.
fn deliver(element: &ElementRef, origin: Point, event: &Event) -> bool {
    let mut ev = event.clone();
    ev.local = Point::new(event.position.x - origin.x, event.position.y - origin.y);
    element::dispatch(element, &ev)
}

/// Deliver deepest first, stopping at the first consumer.
fn bubble(path: &[HitEntry], event: &Event) -> bool {
    path.iter()
        .rev()
        .any(|entry| deliver(&entry.element, entry.origin, event))
}

/// Visible and active, together with every ancestor.
fn is_reachable(element: &ElementRef) -> bool {
    element.borrow().base().is_interactive()
        && element::ancestors(element)
            .iter()
            .all(|a| a.borrow().base().is_interactive())
}

impl Router {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently focused element, if still alive.
    #[must_use]
    pub fn focused(&self) -> Option<ElementRef> {
        self.focused.as_ref().and_then(|w| w.upgrade())
    }

    /// Hovered path from the root down to the deepest hovered element.
    #[must_use]
    pub fn hovered(&self) -> Vec<ElementRef> {
        self.hovered.iter().filter_map(|w| w.upgrade()).collect()
    }

    fn focused_in(&mut self, root: &ElementRef) -> Option<ElementRef> {
        let focused = self.focused()?;
        if element::is_within(root, &focused) && is_reachable(&focused) {
            Some(focused)
        } else {
            self.set_focus(root, None);
            None
        }
    }

    /// Move focus. The old element gets `FocusLost` before the new one gets
    /// `FocusGained`. Returns whether focus changed.
    pub fn set_focus(&mut self, root: &ElementRef, target: Option<&ElementRef>) -> bool {
        let old = self.focused();
        if let (Some(a), Some(b)) = (&old, target) {
            if same(a, b) {
                return false;
            }
        }
        if old.is_none() && target.is_none() {
            self.focused = None;
            return false;
        }
        self.focused = target.map(Rc::downgrade);
        if let Some(old) = old {
            old.borrow_mut().base_mut().set_focused(false);
            let origin = element::global_origin(&old);
            deliver(&old, origin, &Event::focus_lost());
        }
        if let Some(new) = target {
            if !element::is_within(root, new) {
                crate::log::warn("set_focus: element is not in this window");
            }
            new.borrow_mut().base_mut().set_focused(true);
            let origin = element::global_origin(new);
            deliver(new, origin, &Event::focus_gained());
        }
        true
    }

    /// Recompute hover against a new hit path.
    fn update_hover(&mut self, path: &[HitEntry], event: &Event) {
        let old = self.hovered();
        for el in old.iter().rev() {
            if !path.iter().any(|e| same(&e.element, el)) {
                el.borrow_mut().base_mut().set_hovered(false);
                let mut leave = event.clone();
                leave.kind = EventKind::MouseLeave;
                let origin = element::global_origin(el);
                deliver(el, origin, &leave);
            }
        }
        for entry in path {
            if !old.iter().any(|el| same(el, &entry.element)) {
                entry.element.borrow_mut().base_mut().set_hovered(true);
                let mut enter = event.clone();
                enter.kind = EventKind::MouseEnter;
                deliver(&entry.element, entry.origin, &enter);
            }
        }
        self.hovered = path.iter().map(|e| Rc::downgrade(&e.element)).collect();
    }

    /// Clear hover, e.g. when the pointer leaves the window.
    pub fn clear_hover(&mut self, event: &Event) {
        self.update_hover(&[], event);
    }

    /// Release pointer capture and hover without dispatching anything.
    pub fn reset_pointer(&mut self) {
        self.captured = None;
        for el in self.hovered() {
            el.borrow_mut().base_mut().set_hovered(false);
        }
        self.hovered.clear();
    }

    /// Route one event. Returns whether something consumed it.
    pub fn route(
        &mut self,
        root: &ElementRef,
        event: &Event,
        keyboard: &mut KeyboardState,
        hotkeys: &mut HotkeyTable,
        now: Duration,
    ) -> bool {
        match event.kind {
            k if k.is_pointer() => self.route_pointer(root, event),
            EventKind::MouseLeave => {
                self.clear_hover(event);
                false
            }
            k if k.is_keyboard() => self.route_key(root, event, keyboard, hotkeys, now),
            EventKind::TextInput => match self.focused_in(root) {
                Some(focused) => {
                    let origin = element::global_origin(&focused);
                    deliver(&focused, origin, event)
                }
                None => false,
            },
            _ => false,
        }
    }

    fn route_pointer(&mut self, root: &ElementRef, event: &Event) -> bool {
        let path = element::hit_path(root, event.position);
        if event.kind != EventKind::MouseWheel {
            self.update_hover(&path, event);
        }
        match event.kind {
            EventKind::MouseDown | EventKind::TouchStart => {
                self.focus_from_path(root, &path);
                self.captured = path.last().map(|e| Rc::downgrade(&e.element));
                bubble(&path, event)
            }
            EventKind::MouseMove | EventKind::TouchMove => match self.captured() {
                Some(cap) => {
                    let origin = element::global_origin(&cap);
                    deliver(&cap, origin, event)
                }
                None => bubble(&path, event),
            },
            EventKind::MouseUp | EventKind::TouchEnd => match self.captured.take().and_then(|w| w.upgrade()) {
                Some(cap) => {
                    let origin = element::global_origin(&cap);
                    let consumed = deliver(&cap, origin, event);
                    let over = path.last().is_some_and(|e| same(&e.element, &cap));
                    let clicked = over && cap.borrow_mut().base_mut().fire_click(event);
                    consumed || clicked
                }
                None => bubble(&path, event),
            },
            // Nothing under the pointer (outside the window's clip): not delivered.
            _ => !path.is_empty() && bubble(&path, event),
        }
    }

    fn captured(&self) -> Option<ElementRef> {
        self.captured.as_ref().and_then(|w| w.upgrade())
    }

    fn focus_from_path(&mut self, root: &ElementRef, path: &[HitEntry]) {
        let target = path
            .iter()
            .rev()
            .find(|e| e.element.borrow().accepts_focus())
            .map(|e| Rc::clone(&e.element));
        self.set_focus(root, target.as_ref());
    }

    fn route_key(
        &mut self,
        root: &ElementRef,
        event: &Event,
        keyboard: &mut KeyboardState,
        hotkeys: &mut HotkeyTable,
        now: Duration,
    ) -> bool {
        if keyboard.process_event(event, now).consumed {
            return true;
        }
        if let Some(focused) = self.focused_in(root) {
            let mut chain = vec![Rc::clone(&focused)];
            chain.extend(element::ancestors(&focused));
            let origins: Vec<Point> = chain.iter().map(element::global_origin).collect();
            for (el, origin) in chain.iter().zip(origins) {
                if deliver(el, origin, event) {
                    return true;
                }
            }
        }
        if event.kind != EventKind::KeyDown {
            return false;
        }
        if keyboard.dispatch_hotkeys(hotkeys, event, now) || keyboard.dispatch_global_hotkeys(event, now) {
            return true;
        }
        let chord = event.modifiers.chord();
        if event.key == KeyCode::Tab && (chord.is_empty() || chord == Modifiers::SHIFT) {
            return self.focus_next(root, chord == Modifiers::SHIFT);
        }
        false
    }

    /// Move focus to the next (or previous) focus-accepting element in tree
    /// order, wrapping around. Returns whether focus moved.
    pub fn focus_next(&mut self, root: &ElementRef, reverse: bool) -> bool {
        let mut candidates = Vec::new();
        element::walk(root, &mut |el| {
            if el.borrow().accepts_focus() && is_reachable(el) {
                candidates.push(Rc::clone(el));
            }
        });
        if candidates.is_empty() {
            return false;
        }
        let current = self
            .focused_in(root)
            .and_then(|f| candidates.iter().position(|c| same(c, &f)));
        let n = candidates.len();
        let next = match (current, reverse) {
            (None, false) => 0,
            (None, true) => n - 1,
            (Some(i), false) => (i + 1) % n,
            (Some(i), true) => (i + n - 1) % n,
        };
        let target = Rc::clone(&candidates[next]);
        self.set_focus(root, Some(&target))
    }
}
