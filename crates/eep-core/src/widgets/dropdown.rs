use crate::channel::GuiSelectionChangedEvent;
use crate::channel::channels::OnGuiSelectionChanged;
use crate::gui::{ElementKind, ElementSpec, GuiError};
use crate::id::ElementId;
use crate::registration::Callback;

use super::{UiContext, bind};

/// Selection change as seen by a [`Dropdown`] owner: the raw event plus the
/// selection read back from the widget when the handler runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionChanged {
    pub event: GuiSelectionChangedEvent,
    pub selected_index: Option<usize>,
    pub selected_value: Option<String>,
}

/// A drop-down list of string items.
#[derive(Debug, Clone)]
pub struct Dropdown {
    ctx: UiContext,
    element: ElementId,
}

impl Dropdown {
    pub fn new(ctx: &UiContext, parent: ElementId, spec: ElementSpec) -> Result<Self, GuiError> {
        let element = ctx.gui.borrow_mut().add(
            parent,
            ElementSpec {
                kind: ElementKind::DropDown,
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

    pub fn items(&self) -> Vec<String> {
        self.ctx
            .gui
            .borrow()
            .get(self.element)
            .map(|e| e.items.clone())
            .unwrap_or_default()
    }

    /// 0-based index of the selected item, `None` when nothing is selected.
    pub fn selected_index(&self) -> Option<usize> {
        let gui = self.ctx.gui.borrow();
        let element = gui.get(self.element)?;
        match element.selected_index {
            0 => None,
            n => Some(n as usize - 1),
        }
    }

    pub fn set_selected_index(&self, index: Option<usize>) -> Result<(), GuiError> {
        let mut gui = self.ctx.gui.borrow_mut();
        let element = gui.expect_kind_mut(self.element, ElementKind::DropDown)?;
        element.selected_index = match index {
            None => 0,
            Some(i) if i < element.items.len() => i as u32 + 1,
            Some(i) => {
                return Err(GuiError::IndexOutOfRange {
                    element: self.element,
                    index: i as u32,
                    len: element.items.len(),
                });
            }
        };
        Ok(())
    }

    /// The selected item's text.
    pub fn selected_value(&self) -> Option<String> {
        let index = self.selected_index()?;
        self.ctx
            .gui
            .borrow()
            .get(self.element)?
            .items
            .get(index)
            .cloned()
    }

    /// Select the item equal to `value`. Unknown values leave the selection
    /// unchanged; `None` clears it.
    pub fn set_selected_value(&self, value: Option<&str>) -> Result<(), GuiError> {
        let Some(value) = value else {
            return self.set_selected_index(None);
        };
        match self.items().iter().position(|item| item == value) {
            Some(index) => self.set_selected_index(Some(index)),
            None => Ok(()),
        }
    }

    /// Call `handler` whenever the owning player picks an item.
    pub fn on_selection_changed<F>(&self, handler: F) -> Callback<GuiSelectionChangedEvent>
    where
        F: Fn(&SelectionChanged) + 'static,
    {
        let this = self.clone();
        let callback = Callback::persistent(move |event: &GuiSelectionChangedEvent| {
            handler(&SelectionChanged {
                event: event.clone(),
                selected_index: this.selected_index(),
                selected_value: this.selected_value(),
            })
        });
        bind::<OnGuiSelectionChanged>(&self.ctx, self.element, &callback);
        callback
    }
}
