//! Element store
//!
//! Just enough of the DOM for status updates: elements addressed by id with
//! inline `display`, text content and class name.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub id: String,
    /// Inline `style.display`; `None` means unset
    pub display: Option<String>,
    pub text_content: String,
    pub class_name: String,
}

impl Element {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Default::default()
        }
    }

    pub fn set_display(&mut self, display: &str) {
        self.display = Some(display.to_string());
    }

    /// Visible unless `display: none`
    pub fn is_visible(&self) -> bool {
        self.display.as_deref() != Some("none")
    }
}

/// Elements of a document, keyed by id
#[derive(Debug, Default)]
pub struct Elements {
    by_id: HashMap<String, Element>,
}

impl Elements {
    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Element> {
        self.by_id.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.by_id.get_mut(id)
    }
}

/// Document
#[derive(Debug, Default)]
pub struct Document {
    elements: Mutex<Elements>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Document containing the given elements
    pub fn with_elements(elements: impl IntoIterator<Item = Element>) -> Self {
        let document = Self::new();
        for element in elements {
            document.insert(element);
        }
        document
    }

    pub fn insert(&self, element: Element) {
        self.lock().by_id.insert(element.id.clone(), element);
    }

    pub fn remove(&self, id: &str) -> Option<Element> {
        self.lock().by_id.remove(id)
    }

    /// Snapshot of the element with `id`
    pub fn get_element_by_id(&self, id: &str) -> Option<Element> {
        self.lock().get(id).cloned()
    }

    /// Run `f` with exclusive access to every element
    pub fn update<R>(&self, f: impl FnOnce(&mut Elements) -> R) -> R {
        let mut elements = self.lock();
        f(&mut elements)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Elements> {
        self.elements.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
