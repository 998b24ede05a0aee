use crate::channel::GuiTabChangedEvent;
use crate::channel::channels::OnGuiTabChanged;
use crate::gui::{ElementKind, ElementSpec, GuiError};
use crate::id::ElementId;
use crate::registration::Callback;

use super::{UiContext, bind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabChanged {
    pub event: GuiTabChangedEvent,
    pub selected_tab_index: Option<usize>,
    pub selected_tab: Option<String>,
}

/// A tabbed pane. Tabs are addressed by index or by the tab element's name.
#[derive(Debug, Clone)]
pub struct TabPane {
    ctx: UiContext,
    element: ElementId,
}

impl TabPane {
    pub fn new(ctx: &UiContext, parent: ElementId, spec: ElementSpec) -> Result<Self, GuiError> {
        let element = ctx.gui.borrow_mut().add(
            parent,
            ElementSpec {
                kind: ElementKind::TabbedPane,
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

    /// Add a tab header and its content element. Returns `(tab, content)`.
    pub fn add_tab(
        &self,
        tab: ElementSpec,
        content: ElementSpec,
    ) -> Result<(ElementId, ElementId), GuiError> {
        let mut gui = self.ctx.gui.borrow_mut();
        let tab = gui.add(
            self.element,
            ElementSpec {
                kind: ElementKind::Tab,
                ..tab
            },
        )?;
        let content = gui.add(self.element, content)?;
        gui.add_tab(self.element, tab, content)?;
        Ok((tab, content))
    }

    pub fn selected_tab_index(&self) -> Option<usize> {
        let gui = self.ctx.gui.borrow();
        match gui.get(self.element)?.selected_tab_index {
            0 => None,
            n => Some(n as usize - 1),
        }
    }

    pub fn set_selected_tab_index(&self, index: Option<usize>) -> Result<(), GuiError> {
        let mut gui = self.ctx.gui.borrow_mut();
        let pane = gui.expect_kind_mut(self.element, ElementKind::TabbedPane)?;
        pane.selected_tab_index = match index {
            None => 0,
            Some(i) if i < pane.tabs.len() => i as u32 + 1,
            Some(i) => {
                return Err(GuiError::IndexOutOfRange {
                    element: self.element,
                    index: i as u32,
                    len: pane.tabs.len(),
                });
            }
        };
        Ok(())
    }

    /// Name of the selected tab element.
    pub fn selected_tab(&self) -> Option<String> {
        let index = self.selected_tab_index()?;
        let gui = self.ctx.gui.borrow();
        let (tab, _) = *gui.get(self.element)?.tabs.get(index)?;
        gui.get(tab)?.name.clone()
    }

    /// Select the tab whose element is named `name`. Unknown names leave the
    /// selection unchanged; `None` clears it.
    pub fn set_selected_tab(&self, name: Option<&str>) -> Result<(), GuiError> {
        let Some(name) = name else {
            return self.set_selected_tab_index(None);
        };
        let position = {
            let gui = self.ctx.gui.borrow();
            let pane = gui.expect_kind(self.element, ElementKind::TabbedPane)?;
            pane.tabs
                .iter()
                .position(|&(tab, _)| gui.get(tab).and_then(|t| t.name.as_deref()) == Some(name))
        };
        match position {
            Some(index) => self.set_selected_tab_index(Some(index)),
            None => Ok(()),
        }
    }

    pub fn on_tab_changed<F>(&self, handler: F) -> Callback<GuiTabChangedEvent>
    where
        F: Fn(&TabChanged) + 'static,
    {
        let this = self.clone();
        let callback = Callback::persistent(move |event: &GuiTabChangedEvent| {
            handler(&TabChanged {
                event: event.clone(),
                selected_tab_index: this.selected_tab_index(),
                selected_tab: this.selected_tab(),
            })
        });
        bind::<OnGuiTabChanged>(&self.ctx, self.element, &callback);
        callback
    }
}
