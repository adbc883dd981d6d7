use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Input for `WordSense::add_example`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleData {
    pub text: String,
    pub translation: Option<String>,
    /// Defaults to the number of examples already on the sense
    pub display_order: Option<i32>,
    pub external_id: Option<String>,
}

impl ExampleData {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_translation(mut self, translation: impl Into<String>) -> Self {
        self.translation = Some(translation.into());
        self
    }

    pub fn with_external_id(mut self, id: impl Into<String>) -> Self {
        self.external_id = Some(id.into());
        self
    }
}

/// Partial update for an example. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct ExamplePatch {
    pub text: Option<String>,
    pub translation: Option<Option<String>>,
    pub display_order: Option<i32>,
}

/// Usage example belonging to exactly one `WordSense`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    id: Uuid,
    text: String,
    translation: Option<String>,
    display_order: i32,
    external_id: Option<String>,
}

impl Example {
    pub(crate) fn new(data: ExampleData, default_order: i32) -> Self {
        let order = data.display_order.unwrap_or(default_order);
        Self::restore(crate::new_id(), data, order)
    }

    /// Reconstitute from storage. Not for business mutation.
    pub fn restore(id: Uuid, data: ExampleData, display_order: i32) -> Self {
        Self {
            id,
            text: data.text,
            translation: data.translation,
            display_order,
            external_id: data.external_id,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn translation(&self) -> Option<&str> {
        self.translation.as_deref()
    }

    pub fn display_order(&self) -> i32 {
        self.display_order
    }

    pub fn external_id(&self) -> Option<&str> {
        self.external_id.as_deref()
    }

    /// Copy of the example's content without identity or order.
    pub fn to_data(&self) -> ExampleData {
        ExampleData {
            text: self.text.clone(),
            translation: self.translation.clone(),
            display_order: None,
            external_id: self.external_id.clone(),
        }
    }

    pub(crate) fn apply(&mut self, patch: ExamplePatch) {
        if let Some(text) = patch.text {
            self.text = text;
        }
        if let Some(translation) = patch.translation {
            self.translation = translation;
        }
        if let Some(order) = patch.display_order {
            self.display_order = order;
        }
    }

    pub(crate) fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }
}
