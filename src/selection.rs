//! Selection and direct manipulation
//!
//! The controller keeps the selected ids in insertion order and runs the
//! pointer state machine (click, drag-move, rubber band). It never owns
//! the scene: every operation borrows it, and every change is reported
//! through [`SceneEvents`].

use glam::DVec2;
use indexmap::IndexSet;

use crate::log;
use crate::model::{Element, ElementId, ElementKind, MIN_SIZE, Scene};
use crate::types::{Degrees, Rect};

/// Callbacks consumed by the host's state and persistence layer.
pub trait SceneEvents {
    /// The selection changed; ids in selection order.
    fn on_select(&mut self, _ids: &[ElementId]) {}

    /// An element was mutated by a gesture.
    fn on_change(&mut self, _element: &Element) {}

    /// A palette item was dropped at scene coordinates.
    fn on_drop_element(&mut self, _kind: &ElementKind, _x: f64, _y: f64) {}
}

impl SceneEvents for () {}

/// Keyboard modifiers held during a pointer event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        meta: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ctrl: false,
        meta: false,
    };

    /// Whether the event toggles membership instead of replacing.
    pub fn multi(&self) -> bool {
        self.shift || self.ctrl || self.meta
    }
}

/// Transform-handle output for one element, as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformFeedback {
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl TransformFeedback {
    pub fn of(element: &Element) -> Self {
        TransformFeedback {
            x: element.x,
            y: element.y,
            rotation: element.rotation,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }
}

/// Bake transform feedback into the element's properties.
///
/// Scale is folded into width and height (minimum [`MIN_SIZE`], rounded)
/// and the feedback's scale is reset to 1 so no residual scale survives.
/// Position and rotation are rounded.
pub fn apply_transform(element: &mut Element, feedback: &mut TransformFeedback) {
    element.width = (element.width * feedback.scale_x).round().max(MIN_SIZE);
    element.height = (element.height * feedback.scale_y).round().max(MIN_SIZE);
    element.x = feedback.x.round();
    element.y = feedback.y.round();
    element.rotation = feedback.rotation.round();
    feedback.scale_x = 1.0;
    feedback.scale_y = 1.0;
}

/// Ids of the elements fully inside `rect`, boundary inclusive, in z-order.
pub fn rubber_band(scene: &Scene, rect: Rect) -> Vec<ElementId> {
    scene
        .iter()
        .filter(|e| rect.contains_rect(&e.bounds()))
        .map(|e| e.id.clone())
        .collect()
}

/// Screen position to scene coordinates at `zoom`.
pub fn drop_to_scene(screen: DVec2, zoom: f64) -> DVec2 {
    if zoom.is_finite() && zoom > 0.0 {
        screen / zoom
    } else {
        screen
    }
}

/// Whether the scene point `p` falls inside `element`, honouring its
/// rotation about the origin.
pub fn hit(element: &Element, p: DVec2) -> bool {
    let local = Degrees(-element.rotation).unit().rotate(p - DVec2::new(element.x, element.y));
    Rect::new(0.0, 0.0, element.width, element.height).contains_point(local)
}

/// Topmost element under the scene point `p`.
pub fn hit_test(scene: &Scene, p: DVec2) -> Option<&Element> {
    scene.iter().rev().find(|e| hit(e, p))
}

#[derive(Debug, Clone, PartialEq)]
enum Gesture {
    Idle,
    Dragging { last: DVec2, moved: bool },
    RubberBand { origin: DVec2, current: DVec2, additive: bool },
}

/// Multi-select state and the pointer state machine.
#[derive(Debug, Clone)]
pub struct SelectionController {
    selected: IndexSet<ElementId>,
    zoom: f64,
    gesture: Gesture,
    clipboard: Vec<Element>,
    paste_offset: f64,
}

impl Default for SelectionController {
    fn default() -> Self {
        Self::new(20.0)
    }
}

impl SelectionController {
    pub fn new(paste_offset: f64) -> Self {
        SelectionController {
            selected: IndexSet::new(),
            zoom: 1.0,
            gesture: Gesture::Idle,
            clipboard: Vec::new(),
            paste_offset,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom.is_finite() && zoom > 0.0 {
            self.zoom = zoom;
        }
    }

    pub fn selected(&self) -> impl Iterator<Item = &ElementId> {
        self.selected.iter()
    }

    pub fn selected_ids(&self) -> Vec<ElementId> {
        self.selected.iter().cloned().collect()
    }

    pub fn is_selected(&self, id: &ElementId) -> bool {
        self.selected.contains(id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    fn notify(&self, events: &mut impl SceneEvents) {
        events.on_select(&self.selected_ids());
    }

    /// Click on `id`: replace the selection, or toggle membership when a
    /// multi-select modifier is held.
    pub fn click(&mut self, id: &ElementId, modifiers: Modifiers, events: &mut impl SceneEvents) {
        if modifiers.multi() {
            if !self.selected.shift_remove(id) {
                self.selected.insert(id.clone());
            }
        } else {
            self.selected.clear();
            self.selected.insert(id.clone());
        }
        self.notify(events);
    }

    pub fn select_all(&mut self, scene: &Scene, events: &mut impl SceneEvents) {
        self.selected = scene.iter().map(|e| e.id.clone()).collect();
        self.notify(events);
    }

    pub fn clear(&mut self, events: &mut impl SceneEvents) {
        if !self.selected.is_empty() {
            self.selected.clear();
            self.notify(events);
        }
    }

    /// Forget ids that no longer exist in the scene.
    pub fn prune(&mut self, scene: &Scene) {
        self.selected.retain(|id| scene.contains(id));
    }

    /// Remove every selected element from the scene.
    pub fn delete_selected(&mut self, scene: &mut Scene, events: &mut impl SceneEvents) -> Vec<Element> {
        let removed: Vec<Element> = self.selected.drain(..).filter_map(|id| scene.remove(&id)).collect();
        if !removed.is_empty() {
            log::debug!(count = removed.len(), "deleted selection");
            self.notify(events);
        }
        removed
    }

    /// Move the selection by a keyboard step, in scene units.
    pub fn nudge(&mut self, scene: &mut Scene, delta: DVec2, events: &mut impl SceneEvents) {
        self.translate(scene, delta, events);
    }

    fn translate(&self, scene: &mut Scene, delta: DVec2, events: &mut impl SceneEvents) {
        for id in &self.selected {
            if let Ok(element) = scene.modify(id, |e| {
                e.x += delta.x;
                e.y += delta.y;
            }) {
                events.on_change(element);
            }
        }
    }

    /// Bake transform-handle feedback into a selected element.
    pub fn transform(
        &mut self,
        scene: &mut Scene,
        id: &ElementId,
        feedback: &mut TransformFeedback,
        events: &mut impl SceneEvents,
    ) {
        if let Ok(element) = scene.modify(id, |e| apply_transform(e, feedback)) {
            events.on_change(element);
        }
    }

    pub fn pointer_down(
        &mut self,
        scene: &Scene,
        screen: DVec2,
        modifiers: Modifiers,
        events: &mut impl SceneEvents,
    ) {
        let p = drop_to_scene(screen, self.zoom);
        match hit_test(scene, p).map(|e| e.id.clone()) {
            Some(id) if modifiers.multi() => {
                self.click(&id, modifiers, events);
                self.gesture = Gesture::Idle;
            }
            Some(id) => {
                if !self.selected.contains(&id) {
                    self.click(&id, modifiers, events);
                }
                self.gesture = Gesture::Dragging { last: p, moved: false };
            }
            None => {
                self.gesture = Gesture::RubberBand {
                    origin: p,
                    current: p,
                    additive: modifiers.multi(),
                };
            }
        }
    }

    pub fn pointer_move(&mut self, scene: &mut Scene, screen: DVec2, events: &mut impl SceneEvents) {
        let p = drop_to_scene(screen, self.zoom);
        let delta = match &mut self.gesture {
            Gesture::Idle => return,
            Gesture::Dragging { last, moved } => {
                let delta = p - *last;
                *last = p;
                *moved = true;
                delta
            }
            Gesture::RubberBand { current, .. } => {
                *current = p;
                return;
            }
        };
        self.translate(scene, delta, events);
    }

    pub fn pointer_up(&mut self, scene: &mut Scene, screen: DVec2, events: &mut impl SceneEvents) {
        self.pointer_move(scene, screen, events);
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Idle => {}
            Gesture::Dragging { moved, .. } => {
                if moved {
                    for id in &self.selected {
                        if let Ok(element) = scene.modify(id, |e| {
                            e.x = e.x.round();
                            e.y = e.y.round();
                        }) {
                            events.on_change(element);
                        }
                    }
                }
            }
            Gesture::RubberBand {
                origin,
                current,
                additive,
            } => {
                let hits = rubber_band(scene, Rect::from_corners(origin, current));
                if !additive {
                    self.selected.clear();
                }
                self.selected.extend(hits);
                self.notify(events);
            }
        }
    }

    /// The rubber band being dragged, in scene coordinates.
    pub fn rubber_band_rect(&self) -> Option<Rect> {
        match self.gesture {
            Gesture::RubberBand { origin, current, .. } => Some(Rect::from_corners(origin, current)),
            _ => None,
        }
    }

    /// Create an element of `kind` where a palette item was dropped and
    /// select it.
    pub fn drop_element(
        &mut self,
        scene: &mut Scene,
        kind: ElementKind,
        screen: DVec2,
        events: &mut impl SceneEvents,
    ) -> ElementId {
        let p = drop_to_scene(screen, self.zoom);
        events.on_drop_element(&kind, p.x, p.y);
        let id = scene.create(kind, p.x, p.y).id.clone();
        self.selected.clear();
        self.selected.insert(id.clone());
        self.notify(events);
        id
    }

    pub fn copy_selected(&mut self, scene: &Scene) -> usize {
        self.clipboard = self.selected.iter().filter_map(|id| scene.get(id).cloned()).collect();
        self.clipboard.len()
    }

    /// Paste the clipboard with fresh ids and select the pasted elements.
    pub fn paste(&mut self, scene: &mut Scene, events: &mut impl SceneEvents) -> Vec<ElementId> {
        if self.clipboard.is_empty() {
            return Vec::new();
        }
        let ids = scene.paste(self.clipboard.clone(), self.paste_offset);
        self.selected = ids.iter().cloned().collect();
        self.notify(events);
        ids
    }

    pub fn duplicate_selected(&mut self, scene: &mut Scene, events: &mut impl SceneEvents) -> Vec<ElementId> {
        let ids: Vec<ElementId> = self
            .selected
            .iter()
            .filter_map(|id| scene.duplicate(id, self.paste_offset).ok())
            .collect();
        if !ids.is_empty() {
            self.selected = ids.iter().cloned().collect();
            self.notify(events);
        }
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::dvec2;

    #[derive(Default)]
    struct Recorder {
        selections: Vec<Vec<ElementId>>,
        changes: Vec<ElementId>,
        drops: Vec<(String, f64, f64)>,
    }

    impl SceneEvents for Recorder {
        fn on_select(&mut self, ids: &[ElementId]) {
            self.selections.push(ids.to_vec());
        }

        fn on_change(&mut self, element: &Element) {
            self.changes.push(element.id.clone());
        }

        fn on_drop_element(&mut self, kind: &ElementKind, x: f64, y: f64) {
            self.drops.push((kind.name().to_string(), x, y));
        }
    }

    fn rect_at(id: &str, x: f64, y: f64, w: f64, h: f64) -> Element {
        let mut e = Element::new(ElementId::from(id), ElementKind::Rectangle, x, y);
        e.width = w;
        e.height = h;
        e
    }

    fn scene() -> Scene {
        let mut scene = Scene::new();
        scene.insert(rect_at("a", 10.0, 10.0, 50.0, 50.0)).unwrap();
        scene.insert(rect_at("b", 100.0, 10.0, 50.0, 50.0)).unwrap();
        scene.insert(rect_at("c", 40.0, 40.0, 50.0, 50.0)).unwrap();
        scene
    }

    fn ids(list: &[&str]) -> Vec<ElementId> {
        list.iter().map(|s| ElementId::from(*s)).collect()
    }

    #[test]
    fn rubber_band_is_boundary_inclusive() {
        let scene = scene();
        let hits = rubber_band(&scene, Rect::new(10.0, 10.0, 50.0, 50.0));
        assert_eq!(hits, ids(&["a"]));
    }

    #[test]
    fn rubber_band_excludes_straddling_elements() {
        let scene = scene();
        let hits = rubber_band(&scene, Rect::new(10.0, 10.0, 49.0, 100.0));
        assert!(hits.is_empty());
        let hits = rubber_band(&scene, Rect::new(0.0, 0.0, 95.0, 95.0));
        assert_eq!(hits, ids(&["a", "c"]));
    }

    #[test]
    fn click_replaces_and_modifier_toggles() {
        let mut sel = SelectionController::default();
        let mut events = Recorder::default();
        sel.click(&"a".into(), Modifiers::NONE, &mut events);
        sel.click(&"b".into(), Modifiers::NONE, &mut events);
        assert_eq!(sel.selected_ids(), ids(&["b"]));

        sel.click(&"c".into(), Modifiers::SHIFT, &mut events);
        assert_eq!(sel.selected_ids(), ids(&["b", "c"]));
        sel.click(&"b".into(), Modifiers::SHIFT, &mut events);
        assert_eq!(sel.selected_ids(), ids(&["c"]));
        assert_eq!(events.selections.len(), 4);
    }

    #[test]
    fn transform_bakes_scale_into_size() {
        let mut e = rect_at("a", 0.0, 0.0, 100.0, 80.0);
        let mut fb = TransformFeedback {
            x: 10.4,
            y: 19.6,
            rotation: 44.7,
            scale_x: 1.26,
            scale_y: 0.01,
        };
        apply_transform(&mut e, &mut fb);
        assert_eq!((e.x, e.y, e.rotation), (10.0, 20.0, 45.0));
        assert_eq!((e.width, e.height), (126.0, 5.0));
        assert_eq!((fb.scale_x, fb.scale_y), (1.0, 1.0));
    }

    #[test]
    fn drop_divides_by_zoom() {
        let mut scene = Scene::new();
        let mut sel = SelectionController::default();
        sel.set_zoom(0.8);
        let mut events = Recorder::default();
        let id = sel.drop_element(&mut scene, ElementKind::Rectangle, dvec2(120.0, 80.0), &mut events);

        let element = scene.get(&id).unwrap();
        assert_relative_eq!(element.x, 150.0, epsilon = 1e-9);
        assert_relative_eq!(element.y, 100.0, epsilon = 1e-9);
        assert_eq!(events.drops.len(), 1);
        assert_eq!(events.drops[0].0, "rectangle");
        assert_eq!(sel.selected_ids(), vec![id]);
    }

    #[test]
    fn hit_test_is_topmost_first() {
        let scene = scene();
        assert_eq!(hit_test(&scene, dvec2(50.0, 50.0)).map(|e| e.id.as_str()), Some("c"));
        assert_eq!(hit_test(&scene, dvec2(20.0, 20.0)).map(|e| e.id.as_str()), Some("a"));
        assert!(hit_test(&scene, dvec2(500.0, 500.0)).is_none());
    }

    #[test]
    fn hit_test_honours_rotation() {
        let mut e = rect_at("r", 100.0, 100.0, 100.0, 10.0);
        e.rotation = 90.0;
        // Rotated a quarter turn clockwise about its origin, the bar hangs
        // down and to the left of (100, 100).
        assert!(hit(&e, dvec2(95.0, 150.0)));
        assert!(!hit(&e, dvec2(150.0, 105.0)));
    }

    #[test]
    fn drag_moves_selection_and_rounds() {
        let mut scene = scene();
        let mut sel = SelectionController::default();
        let mut events = Recorder::default();
        sel.pointer_down(&scene, dvec2(20.0, 20.0), Modifiers::NONE, &mut events);
        assert_eq!(sel.selected_ids(), ids(&["a"]));

        sel.pointer_move(&mut scene, dvec2(25.3, 20.0), &mut events);
        sel.pointer_up(&mut scene, dvec2(30.4, 30.0), &mut events);

        let a = scene.get(&"a".into()).unwrap();
        assert_eq!((a.x, a.y), (20.0, 20.0));
        assert!(events.changes.iter().all(|id| id.as_str() == "a"));
        assert!(sel.rubber_band_rect().is_none());
    }

    #[test]
    fn rubber_band_gesture_selects_contained() {
        let mut scene = scene();
        let mut sel = SelectionController::default();
        let mut events = Recorder::default();
        sel.click(&"b".into(), Modifiers::NONE, &mut events);

        sel.pointer_down(&scene, dvec2(0.0, 0.0), Modifiers::NONE, &mut events);
        sel.pointer_move(&mut scene, dvec2(70.0, 70.0), &mut events);
        assert_eq!(sel.rubber_band_rect(), Some(Rect::new(0.0, 0.0, 70.0, 70.0)));
        sel.pointer_up(&mut scene, dvec2(70.0, 70.0), &mut events);
        assert_eq!(sel.selected_ids(), ids(&["a"]));

        sel.pointer_down(&scene, dvec2(95.0, 0.0), Modifiers::SHIFT, &mut events);
        sel.pointer_up(&mut scene, dvec2(160.0, 70.0), &mut events);
        assert_eq!(sel.selected_ids(), ids(&["a", "b"]));
    }

    #[test]
    fn delete_and_paste() {
        let mut scene = scene();
        let mut sel = SelectionController::new(10.0);
        let mut events = Recorder::default();
        sel.click(&"a".into(), Modifiers::NONE, &mut events);
        assert_eq!(sel.copy_selected(&scene), 1);

        let pasted = sel.paste(&mut scene, &mut events);
        assert_eq!(pasted.len(), 1);
        let copy = scene.get(&pasted[0]).unwrap();
        assert_eq!((copy.x, copy.y), (20.0, 20.0));
        assert_eq!(sel.selected_ids(), pasted);

        let removed = sel.delete_selected(&mut scene, &mut events);
        assert_eq!(removed.len(), 1);
        assert_eq!(scene.len(), 3);
        assert!(sel.is_empty());
    }

    #[test]
    fn nudge_moves_every_selected_element() {
        let mut scene = scene();
        let mut sel = SelectionController::default();
        let mut events = Recorder::default();
        sel.select_all(&scene, &mut events);
        sel.nudge(&mut scene, dvec2(1.0, -1.0), &mut events);
        assert_eq!(events.changes.len(), 3);
        let b = scene.get(&"b".into()).unwrap();
        assert_eq!((b.x, b.y), (101.0, 9.0));
    }
}
