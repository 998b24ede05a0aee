use crate::channel::GuiCheckedChangedEvent;
use crate::channel::channels::OnGuiCheckedChanged;
use crate::gui::{ElementKind, ElementSpec, GuiError};
use crate::id::ElementId;
use crate::registration::Callback;

use super::{UiContext, bind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedChanged {
    pub event: GuiCheckedChangedEvent,
    pub state: bool,
}

/// A labelled on/off toggle.
#[derive(Debug, Clone)]
pub struct Checkbox {
    ctx: UiContext,
    element: ElementId,
}

impl Checkbox {
    pub fn new(ctx: &UiContext, parent: ElementId, spec: ElementSpec) -> Result<Self, GuiError> {
        let element = ctx.gui.borrow_mut().add(
            parent,
            ElementSpec {
                kind: ElementKind::Checkbox,
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

    pub fn state(&self) -> bool {
        self.ctx
            .gui
            .borrow()
            .get(self.element)
            .is_some_and(|e| e.state)
    }

    pub fn set_state(&self, state: bool) -> Result<(), GuiError> {
        self.ctx
            .gui
            .borrow_mut()
            .expect_kind_mut(self.element, ElementKind::Checkbox)?
            .state = state;
        Ok(())
    }

    pub fn on_changed<F>(&self, handler: F) -> Callback<GuiCheckedChangedEvent>
    where
        F: Fn(&CheckedChanged) + 'static,
    {
        let this = self.clone();
        let callback = Callback::persistent(move |event: &GuiCheckedChangedEvent| {
            handler(&CheckedChanged {
                event: event.clone(),
                state: this.state(),
            })
        });
        bind::<OnGuiCheckedChanged>(&self.ctx, self.element, &callback);
        callback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EventEngine;
    use crate::gui::{Gui, GuiRoot};
    use crate::id::PlayerId;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn handler_receives_state_read_back_from_widget() {
        let ctx = UiContext::new(Gui::shared(), EventEngine::new());
        let root = ctx.gui.borrow_mut().root(PlayerId(1), GuiRoot::Center);
        let checkbox =
            Checkbox::new(&ctx, root, ElementSpec::new(ElementKind::Checkbox).state(true)).unwrap();

        let last = Rc::new(Cell::new(None));
        let sink = Rc::clone(&last);
        checkbox.on_changed(move |e| sink.set(Some(e.state)));

        checkbox.set_state(false).unwrap();
        ctx.events.dispatch(
            &GuiCheckedChangedEvent {
                player: PlayerId(1),
                element: checkbox.element(),
                tick: 0,
            }
            .into(),
        );
        assert_eq!(last.get(), Some(false));
    }
}
