use crate::channel::GuiElemChangedEvent;
use crate::channel::channels::OnGuiElemChanged;
use crate::gui::{ElementKind, ElementSpec, GuiError};
use crate::id::ElementId;
use crate::registration::Callback;

use super::{UiContext, bind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElemChanged {
    pub event: GuiElemChangedEvent,
    pub value: Option<String>,
}

/// A picker for a game prototype (fluid, item, ...) by name.
#[derive(Debug, Clone)]
pub struct ChooseElemButton {
    ctx: UiContext,
    element: ElementId,
}

impl ChooseElemButton {
    /// Add the picker under `parent`, optionally preselecting `initial`.
    pub fn new(
        ctx: &UiContext,
        parent: ElementId,
        spec: ElementSpec,
        initial: Option<&str>,
    ) -> Result<Self, GuiError> {
        let mut spec = ElementSpec {
            kind: ElementKind::ChooseElemButton,
            ..spec
        };
        if let Some(initial) = initial {
            spec.elem_value = Some(initial.to_string());
        }
        let element = ctx.gui.borrow_mut().add(parent, spec)?;
        Ok(Self {
            ctx: ctx.clone(),
            element,
        })
    }

    pub fn element(&self) -> ElementId {
        self.element
    }

    pub fn elem_value(&self) -> Option<String> {
        self.ctx
            .gui
            .borrow()
            .get(self.element)
            .and_then(|e| e.elem_value.clone())
    }

    pub fn set_elem_value(&self, value: Option<&str>) -> Result<(), GuiError> {
        self.ctx
            .gui
            .borrow_mut()
            .expect_kind_mut(self.element, ElementKind::ChooseElemButton)?
            .elem_value = value.map(str::to_string);
        Ok(())
    }

    pub fn on_elem_changed<F>(&self, handler: F) -> Callback<GuiElemChangedEvent>
    where
        F: Fn(&ElemChanged) + 'static,
    {
        let this = self.clone();
        let callback = Callback::persistent(move |event: &GuiElemChangedEvent| {
            handler(&ElemChanged {
                event: event.clone(),
                value: this.elem_value(),
            })
        });
        bind::<OnGuiElemChanged>(&self.ctx, self.element, &callback);
        callback
    }
}
