#![forbid(unsafe_code)]

//! Named elements that entrance reveals animate.
//!
//! A [`Stage`] keeps elements in document order. Each element carries one
//! class used for selection and a [`VisualState`] the reveal writes into.

use glam::Vec2;

/// Opacity and translation of one element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualState {
    /// Translation away from the resting position, in pixels.
    pub offset: Vec2,
    /// Opacity in `[0, 1]`.
    pub opacity: f32,
}

impl VisualState {
    /// Resting state: in place, fully opaque.
    pub const REST: Self = Self {
        offset: Vec2::ZERO,
        opacity: 1.0,
    };

    /// Transparent, translated by `offset`.
    pub fn hidden(offset: Vec2) -> Self {
        Self {
            offset,
            opacity: 0.0,
        }
    }

    /// Interpolate towards `to` by `t`.
    pub fn lerp(self, to: Self, t: f32) -> Self {
        Self {
            offset: self.offset.lerp(to.offset, t),
            opacity: self.opacity + (to.opacity - self.opacity) * t,
        }
    }
}

impl Default for VisualState {
    fn default() -> Self {
        Self::REST
    }
}

/// Index of an element within its stage.
pub type ElementId = usize;

/// One element of the stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    name: String,
    class: String,
    state: VisualState,
}

impl Element {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn state(&self) -> VisualState {
        self.state
    }
}

/// Ordered list of elements.
#[derive(Debug, Clone, Default)]
pub struct Stage {
    elements: Vec<Element>,
}

impl Stage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element at rest.
    pub fn push(&mut self, name: impl Into<String>, class: impl Into<String>) -> ElementId {
        self.elements.push(Element {
            name: name.into(),
            class: class.into(),
            state: VisualState::REST,
        });
        self.elements.len() - 1
    }

    /// Builder form of [`push`](Self::push).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, class: impl Into<String>) -> Self {
        self.push(name, class);
        self
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Elements whose class equals `class`, in document order.
    pub fn select(&self, class: &str) -> Vec<ElementId> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, e)| e.class == class)
            .map(|(i, _)| i)
            .collect()
    }

    /// First element called `name`.
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.name == name)
    }

    pub fn state(&self, id: ElementId) -> Option<VisualState> {
        self.elements.get(id).map(|e| e.state)
    }

    /// Overwrite the state of `id`. Unknown ids are ignored.
    pub fn set_state(&mut self, id: ElementId, state: VisualState) {
        if let Some(element) = self.elements.get_mut(id) {
            element.state = state;
        }
    }
}
