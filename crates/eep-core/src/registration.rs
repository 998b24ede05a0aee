//! Predicates, callbacks and the type-erased registration record.
//!
//! Collaborators hand the engine typed [`Callback`]s and [`Predicate`]s for a
//! specific payload type. The engine stores them erased over [`Event`] inside
//! a [`Registration`], one per (channel, subscribe call).

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::channel::{Channel, Event};

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Result of evaluating a predicate against a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PredicateResult {
    /// The listener is eligible for this event.
    Pass,
    /// The listener is not eligible for this event but stays registered.
    Fail,
    /// The guarded resource no longer exists. The listener is pruned at the
    /// end of the pass and its callback is not invoked.
    Stale,
}

impl From<bool> for PredicateResult {
    fn from(value: bool) -> Self {
        if value {
            PredicateResult::Pass
        } else {
            PredicateResult::Fail
        }
    }
}

/// What a callback wants done with its registration after running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HandlerResult {
    #[default]
    Continue,
    /// Prune this registration at the end of the current pass.
    Remove,
}

// ---------------------------------------------------------------------------
// Predicate
// ---------------------------------------------------------------------------

/// Eligibility check run before a registration's callback. Cheap to clone;
/// clones share the same function.
pub struct Predicate<P: ?Sized>(Rc<dyn Fn(&P) -> PredicateResult>);

impl<P: ?Sized + 'static> Predicate<P> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&P) -> PredicateResult + 'static,
    {
        Self(Rc::new(f))
    }

    /// Predicate from a plain boolean check. Never yields `Stale`.
    pub fn check<F>(f: F) -> Self
    where
        F: Fn(&P) -> bool + 'static,
    {
        Self::new(move |payload| f(payload).into())
    }

    pub fn evaluate(&self, payload: &P) -> PredicateResult {
        (self.0)(payload)
    }
}

impl<P: ?Sized> Clone for Predicate<P> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<P: ?Sized> fmt::Debug for Predicate<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Predicate(<fn>)")
    }
}

// ---------------------------------------------------------------------------
// Callback
// ---------------------------------------------------------------------------

/// Opaque identity of a [`Callback`], used to find its registrations again on
/// unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackKey(usize);

/// A subscriber function. Clones share identity: unsubscribing any clone
/// removes a registration made with any other clone.
pub struct Callback<P: ?Sized>(Rc<dyn Fn(&P) -> HandlerResult>);

impl<P: ?Sized + 'static> Callback<P> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&P) -> HandlerResult + 'static,
    {
        Self(Rc::new(f))
    }

    /// A callback that never asks to be removed.
    pub fn persistent<F>(f: F) -> Self
    where
        F: Fn(&P) + 'static,
    {
        Self::new(move |payload| {
            f(payload);
            HandlerResult::Continue
        })
    }

    pub fn call(&self, payload: &P) -> HandlerResult {
        (self.0)(payload)
    }
}

impl<P: ?Sized> Callback<P> {
    pub fn key(&self) -> CallbackKey {
        CallbackKey(Rc::as_ptr(&self.0) as *const () as usize)
    }

    /// Whether both handles refer to the same callback.
    pub fn same(&self, other: &Callback<P>) -> bool {
        self.key() == other.key()
    }
}

impl<P: ?Sized> Clone for Callback<P> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<P: ?Sized> fmt::Debug for Callback<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callback({:?})", self.key())
    }
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

type ErasedPredicate = Box<dyn Fn(&Event) -> PredicateResult>;
type ErasedCallback = Box<dyn Fn(&Event) -> HandlerResult>;

/// How a registration responds to one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Eligibility {
    Invoke,
    Skip,
    Stale,
}

/// One subscriber's binding to one channel.
pub(crate) struct Registration {
    key: CallbackKey,
    predicates: Vec<ErasedPredicate>,
    callback: ErasedCallback,
    /// Set once the registration has left the live sequence. A detached
    /// registration still present in a dispatch snapshot is skipped.
    detached: Cell<bool>,
}

impl Registration {
    /// Erase a typed subscription for channel `C`.
    pub(crate) fn typed<C: Channel>(
        callback: &Callback<C::Payload>,
        predicates: &[Predicate<C::Payload>],
    ) -> Self {
        let predicates = predicates
            .iter()
            .cloned()
            .map(|predicate| -> ErasedPredicate {
                Box::new(move |event: &Event| match C::payload(event) {
                    Some(payload) => predicate.evaluate(payload),
                    None => mismatched(C::ID, event),
                })
            })
            .collect();

        let handler = callback.clone();
        Self {
            key: callback.key(),
            predicates,
            callback: Box::new(move |event: &Event| match C::payload(event) {
                Some(payload) => handler.call(payload),
                None => {
                    mismatched(C::ID, event);
                    HandlerResult::Continue
                }
            }),
            detached: Cell::new(false),
        }
    }

    /// Registration over the raw event union, valid on any channel.
    pub(crate) fn untyped(callback: &Callback<Event>, predicates: &[Predicate<Event>]) -> Self {
        let predicates = predicates
            .iter()
            .cloned()
            .map(|predicate| -> ErasedPredicate {
                Box::new(move |event: &Event| predicate.evaluate(event))
            })
            .collect();

        let handler = callback.clone();
        Self {
            key: callback.key(),
            predicates,
            callback: Box::new(move |event: &Event| handler.call(event)),
            detached: Cell::new(false),
        }
    }

    pub(crate) fn key(&self) -> CallbackKey {
        self.key
    }

    /// Evaluate predicates in order, stopping at the first one that does not
    /// pass. An empty predicate list is always eligible.
    pub(crate) fn eligibility(&self, event: &Event) -> Eligibility {
        for predicate in &self.predicates {
            match predicate(event) {
                PredicateResult::Pass => {}
                PredicateResult::Fail => return Eligibility::Skip,
                PredicateResult::Stale => return Eligibility::Stale,
            }
        }
        Eligibility::Invoke
    }

    pub(crate) fn invoke(&self, event: &Event) -> HandlerResult {
        (self.callback)(event)
    }

    pub(crate) fn is_detached(&self) -> bool {
        self.detached.get()
    }

    pub(crate) fn detach(&self) {
        self.detached.set(true);
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("key", &self.key)
            .field("predicates", &self.predicates.len())
            .field("detached", &self.detached.get())
            .finish_non_exhaustive()
    }
}

/// An event reached a registration of another channel. The table is keyed by
/// channel so this cannot happen through `dispatch`; it is treated as a
/// failed predicate.
fn mismatched(expected: crate::channel::ChannelId, event: &Event) -> PredicateResult {
    debug_assert!(
        false,
        "event for {:?} delivered to a {:?} registration",
        event.channel(),
        expected
    );
    PredicateResult::Fail
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::TickEvent;
    use crate::channel::channels::OnTick;

    fn tick(n: u64) -> Event {
        TickEvent { tick: n }.into()
    }

    #[test]
    fn bool_converts_to_pass_or_fail() {
        assert_eq!(PredicateResult::from(true), PredicateResult::Pass);
        assert_eq!(PredicateResult::from(false), PredicateResult::Fail);
    }

    #[test]
    fn callback_clones_share_identity() {
        let a = Callback::<TickEvent>::persistent(|_| {});
        let b = a.clone();
        let c = Callback::<TickEvent>::persistent(|_| {});
        assert!(a.same(&b));
        assert!(!a.same(&c));
    }

    #[test]
    fn empty_predicates_are_always_eligible() {
        let cb = Callback::<TickEvent>::persistent(|_| {});
        let reg = Registration::typed::<OnTick>(&cb, &[]);
        assert_eq!(reg.eligibility(&tick(0)), Eligibility::Invoke);
    }

    #[test]
    fn first_non_passing_predicate_decides() {
        let cb = Callback::<TickEvent>::persistent(|_| {});
        let even = Predicate::check(|e: &TickEvent| e.tick % 2 == 0);
        let stale_after_ten = Predicate::new(|e: &TickEvent| {
            if e.tick > 10 {
                PredicateResult::Stale
            } else {
                PredicateResult::Pass
            }
        });
        let reg = Registration::typed::<OnTick>(&cb, &[even, stale_after_ten]);

        assert_eq!(reg.eligibility(&tick(2)), Eligibility::Invoke);
        assert_eq!(reg.eligibility(&tick(3)), Eligibility::Skip);
        assert_eq!(reg.eligibility(&tick(12)), Eligibility::Stale);
        // An earlier failure shadows a later stale result.
        assert_eq!(reg.eligibility(&tick(13)), Eligibility::Skip);
    }

    #[test]
    fn invoke_forwards_callback_result() {
        let cb = Callback::<TickEvent>::new(|e| {
            if e.tick == 5 {
                HandlerResult::Remove
            } else {
                HandlerResult::Continue
            }
        });
        let reg = Registration::typed::<OnTick>(&cb, &[]);
        assert_eq!(reg.invoke(&tick(1)), HandlerResult::Continue);
        assert_eq!(reg.invoke(&tick(5)), HandlerResult::Remove);
        assert_eq!(reg.key(), cb.key());
    }
}
