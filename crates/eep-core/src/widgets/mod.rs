//! Widget wrappers and the widget-bound listener adapter.
//!
//! Every interactive wrapper exposes its "changed" notification the same way:
//! it subscribes to the matching low-level channel with three predicates in a
//! fixed order, then re-reads the widget's current properties and forwards a
//! normalized event to the owner's handler.
//!
//! 1. [`validity`]: the element still exists, otherwise `Stale`.
//! 2. [`ownership`]: the event's player owns the element, otherwise `Fail`.
//! 3. [`identity`]: the event originated from this element, otherwise `Fail`.
//!
//! Validity runs first so the later checks never look at a destroyed element.

mod button;
mod checkbox;
mod choose_elem_button;
mod dropdown;
mod tab_pane;
mod text_field;

pub use button::Button;
pub use checkbox::{Checkbox, CheckedChanged};
pub use choose_elem_button::{ChooseElemButton, ElemChanged};
pub use dropdown::{Dropdown, SelectionChanged};
pub use tab_pane::{TabChanged, TabPane};
pub use text_field::TextField;

use std::rc::Rc;

use crate::channel::{Channel, GuiEvent, PlayerEvent};
use crate::engine::EventEngine;
use crate::gui::SharedGui;
use crate::id::ElementId;
use crate::registration::{Callback, Predicate, PredicateResult};

/// Handles widget wrappers need: the GUI arena and the event engine.
#[derive(Debug, Clone)]
pub struct UiContext {
    pub gui: SharedGui,
    pub events: Rc<EventEngine>,
}

impl UiContext {
    pub fn new(gui: SharedGui, events: Rc<EventEngine>) -> Self {
        Self { gui, events }
    }
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// `Stale` once `element` has been destroyed.
pub fn validity<P: 'static>(gui: &SharedGui, element: ElementId) -> Predicate<P> {
    let gui = Rc::clone(gui);
    Predicate::new(move |_: &P| {
        if gui.borrow().is_valid(element) {
            PredicateResult::Pass
        } else {
            PredicateResult::Stale
        }
    })
}

/// Passes when the event's player owns `element`.
pub fn ownership<P: PlayerEvent + 'static>(gui: &SharedGui, element: ElementId) -> Predicate<P> {
    let gui = Rc::clone(gui);
    Predicate::check(move |event: &P| {
        gui.borrow()
            .get(element)
            .is_some_and(|e| e.player == event.player())
    })
}

/// Passes when the event originated from `element`.
pub fn identity<P: GuiEvent + 'static>(element: ElementId) -> Predicate<P> {
    Predicate::check(move |event: &P| event.element() == Some(element))
}

/// The three widget predicates in their fixed order.
pub fn widget_predicates<P: GuiEvent + 'static>(
    gui: &SharedGui,
    element: ElementId,
) -> Vec<Predicate<P>> {
    vec![
        validity(gui, element),
        ownership(gui, element),
        identity(element),
    ]
}

/// Subscribe `callback` on channel `C` guarded by the widget predicates.
pub(crate) fn bind<C>(ctx: &UiContext, element: ElementId, callback: &Callback<C::Payload>)
where
    C: Channel,
    C::Payload: GuiEvent,
{
    ctx.events
        .subscribe::<C>(callback, widget_predicates(&ctx.gui, element));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::GuiClickEvent;
    use crate::gui::{ElementKind, ElementSpec, Gui, GuiRoot};
    use crate::id::PlayerId;

    fn click(player: u32, element: Option<ElementId>) -> GuiClickEvent {
        GuiClickEvent {
            player: PlayerId(player),
            element,
            tick: 0,
        }
    }

    #[test]
    fn predicates_follow_element_lifecycle() {
        let gui = Gui::shared();
        let button = {
            let mut g = gui.borrow_mut();
            let root = g.root(PlayerId(1), GuiRoot::Top);
            g.add(root, ElementSpec::new(ElementKind::Button)).unwrap()
        };

        let [valid, owner, this] = <[Predicate<GuiClickEvent>; 3]>::try_from(
            widget_predicates::<GuiClickEvent>(&gui, button),
        )
        .unwrap();

        let own_click = click(1, Some(button));
        assert_eq!(valid.evaluate(&own_click), PredicateResult::Pass);
        assert_eq!(owner.evaluate(&own_click), PredicateResult::Pass);
        assert_eq!(this.evaluate(&own_click), PredicateResult::Pass);

        assert_eq!(owner.evaluate(&click(2, Some(button))), PredicateResult::Fail);
        assert_eq!(this.evaluate(&click(1, None)), PredicateResult::Fail);

        gui.borrow_mut().destroy(button).unwrap();
        assert_eq!(valid.evaluate(&own_click), PredicateResult::Stale);
        assert_eq!(owner.evaluate(&own_click), PredicateResult::Fail);
    }
}
