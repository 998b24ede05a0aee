use crate::channel::GuiTextChangedEvent;
use crate::channel::channels::OnGuiTextChanged;
use crate::gui::{ElementKind, ElementSpec, GuiError};
use crate::id::ElementId;
use crate::registration::Callback;

use super::{UiContext, bind};

/// A single-line text input.
#[derive(Debug, Clone)]
pub struct TextField {
    ctx: UiContext,
    element: ElementId,
}

impl TextField {
    pub fn new(ctx: &UiContext, parent: ElementId, spec: ElementSpec) -> Result<Self, GuiError> {
        let element = ctx.gui.borrow_mut().add(
            parent,
            ElementSpec {
                kind: ElementKind::TextField,
                ..spec
            },
        )?;
        Ok(Self {
            ctx: ctx.clone(),
            element,
        })
    }

    pub fn element(&self) -> ElementId {
        self.element
    }

    /// Current text. Empty once the field is destroyed.
    pub fn text(&self) -> String {
        self.ctx
            .gui
            .borrow()
            .get(self.element)
            .map(|e| e.text.clone())
            .unwrap_or_default()
    }

    pub fn set_text(&self, text: impl Into<String>) -> Result<(), GuiError> {
        self.ctx
            .gui
            .borrow_mut()
            .expect_kind_mut(self.element, ElementKind::TextField)?
            .text = text.into();
        Ok(())
    }

    /// Call `handler` whenever the owning player edits this field.
    pub fn on_text_changed<F>(&self, handler: F) -> Callback<GuiTextChangedEvent>
    where
        F: Fn(&GuiTextChangedEvent) + 'static,
    {
        let callback = Callback::persistent(handler);
        bind::<OnGuiTextChanged>(&self.ctx, self.element, &callback);
        callback
    }
}
