use crate::channel::GuiClickEvent;
use crate::channel::channels::OnGuiClick;
use crate::gui::{ElementKind, ElementSpec, GuiError};
use crate::id::ElementId;
use crate::registration::Callback;

use super::{UiContext, bind};

/// A clickable button.
#[derive(Debug, Clone)]
pub struct Button {
    ctx: UiContext,
    element: ElementId,
}

impl Button {
    /// Add a button under `parent`. The spec's kind is forced to `Button`.
    pub fn new(ctx: &UiContext, parent: ElementId, spec: ElementSpec) -> Result<Self, GuiError> {
        let element = ctx.gui.borrow_mut().add(
            parent,
            ElementSpec {
                kind: ElementKind::Button,
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

    /// Call `handler` whenever the owning player clicks this button. Returns
    /// the registered callback for explicit unsubscription.
    pub fn on_click<F>(&self, handler: F) -> Callback<GuiClickEvent>
    where
        F: Fn(&GuiClickEvent) + 'static,
    {
        let callback = Callback::persistent(handler);
        bind::<OnGuiClick>(&self.ctx, self.element, &callback);
        callback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::Event;
    use crate::engine::EventEngine;
    use crate::gui::{Gui, GuiRoot};
    use crate::id::PlayerId;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn click_reaches_only_its_own_button() {
        let ctx = UiContext::new(Gui::shared(), EventEngine::new());
        let root = ctx.gui.borrow_mut().root(PlayerId(1), GuiRoot::Top);
        let a = Button::new(&ctx, root, ElementSpec::new(ElementKind::Button)).unwrap();
        let b = Button::new(&ctx, root, ElementSpec::new(ElementKind::Button)).unwrap();

        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        a.on_click(move |_| counter.set(counter.get() + 1));

        let click = |element| -> Event {
            GuiClickEvent {
                player: PlayerId(1),
                element: Some(element),
                tick: 0,
            }
            .into()
        };
        ctx.events.dispatch(&click(b.element()));
        assert_eq!(hits.get(), 0);
        ctx.events.dispatch(&click(a.element()));
        assert_eq!(hits.get(), 1);
    }
}
