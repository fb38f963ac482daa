//! The ordered element collection.

use std::collections::HashSet;

use super::element::{Element, ElementId};
use super::kind::ElementKind;
use crate::errors::{SceneError, SourceContext};
use crate::log;

/// The scene: elements in z-order (index 0 is drawn first, the last
/// element is topmost). Ids are unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    elements: Vec<Element>,
    next_seq: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a scene document (a JSON array of element records).
    ///
    /// Later records whose id is already taken are dropped with a warning.
    pub fn from_json(source: &str) -> Result<Self, SceneError> {
        let elements: Vec<Element> = serde_json::from_str(source).map_err(|e| {
            SceneError::invalid_document(&SourceContext::new("<scene>", source), &e)
        })?;
        let mut scene = Scene::new();
        for element in elements {
            if let Err(err) = scene.insert(element) {
                log::warn!(%err, "dropping element from scene document");
            }
        }
        Ok(scene)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self.elements).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Elements in draw order.
    pub fn iter(&self) -> std::slice::Iter<'_, Element> {
        self.elements.iter()
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn get(&self, id: &ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| &e.id == id)
    }

    pub fn index_of(&self, id: &ElementId) -> Option<usize> {
        self.elements.iter().position(|e| &e.id == id)
    }

    pub fn contains(&self, id: &ElementId) -> bool {
        self.index_of(id).is_some()
    }

    /// Append an element on top of the scene.
    pub fn insert(&mut self, element: Element) -> Result<(), SceneError> {
        if self.contains(&element.id) {
            return Err(SceneError::DuplicateId { id: element.id });
        }
        if let ElementKind::Unknown(name) = &element.kind {
            log::warn!(id = %element.id, kind = %name, "unknown element type, it will draw as a placeholder");
        }
        self.elements.push(element);
        Ok(())
    }

    /// Create an element of `kind` at scene coordinates with a fresh id
    /// and the type's default property bag.
    pub fn create(&mut self, kind: ElementKind, x: f64, y: f64) -> &Element {
        let id = self.fresh_id(&kind);
        let index = self.elements.len();
        self.elements.push(Element::new(id, kind, x, y));
        &self.elements[index]
    }

    /// Copy an element under a fresh id, offset by `offset`, on top.
    pub fn duplicate(&mut self, id: &ElementId, offset: f64) -> Result<ElementId, SceneError> {
        let source = self
            .get(id)
            .cloned()
            .ok_or_else(|| SceneError::UnknownElement { id: id.clone() })?;
        let mut ids = self.paste(vec![source], offset);
        Ok(ids.remove(0))
    }

    /// Paste clipboard elements: every element gets a fresh id and is
    /// offset by `offset`. Returns the new ids in paste order.
    pub fn paste(&mut self, elements: Vec<Element>, offset: f64) -> Vec<ElementId> {
        let mut ids = Vec::with_capacity(elements.len());
        for mut element in elements {
            element.id = self.fresh_id(&element.kind);
            element.x += offset;
            element.y += offset;
            ids.push(element.id.clone());
            self.elements.push(element);
        }
        ids
    }

    /// Remove an element; its rules and ranges go with it.
    pub fn remove(&mut self, id: &ElementId) -> Option<Element> {
        let index = self.index_of(id)?;
        Some(self.elements.remove(index))
    }

    /// Replace the element with the same id, clamping its size.
    pub fn update(&mut self, mut element: Element) -> Result<(), SceneError> {
        let index = self
            .index_of(&element.id)
            .ok_or_else(|| SceneError::UnknownElement { id: element.id.clone() })?;
        element.clamp_size();
        if self.elements[index].kind != element.kind {
            log::warn!(id = %element.id, "element type is immutable, keeping the original");
            element.kind = self.elements[index].kind.clone();
        }
        self.elements[index] = element;
        Ok(())
    }

    /// Mutate an element in place through a closure; the size is clamped
    /// afterwards.
    pub fn modify<F>(&mut self, id: &ElementId, f: F) -> Result<&Element, SceneError>
    where
        F: FnOnce(&mut Element),
    {
        let index = self
            .index_of(id)
            .ok_or_else(|| SceneError::UnknownElement { id: id.clone() })?;
        let element = &mut self.elements[index];
        let kind = element.kind.clone();
        f(element);
        element.kind = kind;
        element.id = id.clone();
        element.clamp_size();
        Ok(&self.elements[index])
    }

    pub fn bring_forward(&mut self, id: &ElementId) -> bool {
        match self.index_of(id) {
            Some(i) if i + 1 < self.elements.len() => {
                self.elements.swap(i, i + 1);
                true
            }
            _ => false,
        }
    }

    pub fn send_backward(&mut self, id: &ElementId) -> bool {
        match self.index_of(id) {
            Some(i) if i > 0 => {
                self.elements.swap(i, i - 1);
                true
            }
            _ => false,
        }
    }

    pub fn bring_to_front(&mut self, id: &ElementId) -> bool {
        let Some(i) = self.index_of(id) else {
            return false;
        };
        let element = self.elements.remove(i);
        self.elements.push(element);
        true
    }

    pub fn send_to_back(&mut self, id: &ElementId) -> bool {
        let Some(i) = self.index_of(id) else {
            return false;
        };
        let element = self.elements.remove(i);
        self.elements.insert(0, element);
        true
    }

    pub fn ids(&self) -> HashSet<ElementId> {
        self.elements.iter().map(|e| e.id.clone()).collect()
    }

    fn fresh_id(&mut self, kind: &ElementKind) -> ElementId {
        loop {
            self.next_seq += 1;
            let id = ElementId::new(format!("{}-{}", kind.name(), self.next_seq));
            if !self.contains(&id) {
                return id;
            }
        }
    }
}
