//! Host event channels and their strongly-typed payloads.
//!
//! The host fires a finite set of channels. Each channel carries exactly one
//! payload shape; [`Event`] is the tagged union the host hands to installed
//! handlers, and the [`Channel`] marker types in [`channels`] bind a
//! [`ChannelId`] to its payload type at compile time so subscribers never see
//! a payload of the wrong shape.

use crate::id::{ElementId, PlayerId, Tick};

// ---------------------------------------------------------------------------
// Channel identifiers
// ---------------------------------------------------------------------------

/// Discriminant tag for host event channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChannelId {
    Tick,
    PlayerJoined,
    GuiClick,
    GuiTextChanged,
    GuiSelectionChanged,
    GuiElemChanged,
    GuiCheckedChanged,
    GuiTabChanged,
    GuiClosed,
    ConfigurationChanged,
}

/// Total number of channels.
pub const CHANNEL_COUNT: usize = 10;

impl ChannelId {
    /// Every channel, in declaration order.
    pub const ALL: [ChannelId; CHANNEL_COUNT] = [
        ChannelId::Tick,
        ChannelId::PlayerJoined,
        ChannelId::GuiClick,
        ChannelId::GuiTextChanged,
        ChannelId::GuiSelectionChanged,
        ChannelId::GuiElemChanged,
        ChannelId::GuiCheckedChanged,
        ChannelId::GuiTabChanged,
        ChannelId::GuiClosed,
        ChannelId::ConfigurationChanged,
    ];

    /// Convert to usize index for array lookups.
    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// Fired once per game tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickEvent {
    pub tick: Tick,
}

/// A player session joined the game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerJoinedEvent {
    pub player: PlayerId,
    pub tick: Tick,
}

/// A GUI element was clicked. `element` is `None` when the click did not
/// land on a mod-owned element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuiClickEvent {
    pub player: PlayerId,
    pub element: Option<ElementId>,
    pub tick: Tick,
}

/// The text of a text field changed. `text` is the new content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuiTextChangedEvent {
    pub player: PlayerId,
    pub element: ElementId,
    pub text: String,
    pub tick: Tick,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuiSelectionChangedEvent {
    pub player: PlayerId,
    pub element: ElementId,
    pub tick: Tick,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuiElemChangedEvent {
    pub player: PlayerId,
    pub element: ElementId,
    pub tick: Tick,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuiCheckedChangedEvent {
    pub player: PlayerId,
    pub element: ElementId,
    pub tick: Tick,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuiTabChangedEvent {
    pub player: PlayerId,
    pub element: ElementId,
    pub tick: Tick,
}

/// A GUI the player had opened was closed (escape key or the close button).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuiClosedEvent {
    pub player: PlayerId,
    pub element: Option<ElementId>,
    pub tick: Tick,
}

/// The mod configuration changed (mod added, removed or updated).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationChangedEvent {
    pub old_version: Option<String>,
    pub new_version: Option<String>,
    pub tick: Tick,
}

// ---------------------------------------------------------------------------
// Event union
// ---------------------------------------------------------------------------

/// A host-delivered event. Each variant is the payload of one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Tick(TickEvent),
    PlayerJoined(PlayerJoinedEvent),
    GuiClick(GuiClickEvent),
    GuiTextChanged(GuiTextChangedEvent),
    GuiSelectionChanged(GuiSelectionChangedEvent),
    GuiElemChanged(GuiElemChangedEvent),
    GuiCheckedChanged(GuiCheckedChangedEvent),
    GuiTabChanged(GuiTabChangedEvent),
    GuiClosed(GuiClosedEvent),
    ConfigurationChanged(ConfigurationChangedEvent),
}

impl Event {
    /// Get the channel this event is fired on.
    pub fn channel(&self) -> ChannelId {
        match self {
            Event::Tick(_) => ChannelId::Tick,
            Event::PlayerJoined(_) => ChannelId::PlayerJoined,
            Event::GuiClick(_) => ChannelId::GuiClick,
            Event::GuiTextChanged(_) => ChannelId::GuiTextChanged,
            Event::GuiSelectionChanged(_) => ChannelId::GuiSelectionChanged,
            Event::GuiElemChanged(_) => ChannelId::GuiElemChanged,
            Event::GuiCheckedChanged(_) => ChannelId::GuiCheckedChanged,
            Event::GuiTabChanged(_) => ChannelId::GuiTabChanged,
            Event::GuiClosed(_) => ChannelId::GuiClosed,
            Event::ConfigurationChanged(_) => ChannelId::ConfigurationChanged,
        }
    }

    /// The tick the event was fired on.
    pub fn tick(&self) -> Tick {
        match self {
            Event::Tick(e) => e.tick,
            Event::PlayerJoined(e) => e.tick,
            Event::GuiClick(e) => e.tick,
            Event::GuiTextChanged(e) => e.tick,
            Event::GuiSelectionChanged(e) => e.tick,
            Event::GuiElemChanged(e) => e.tick,
            Event::GuiCheckedChanged(e) => e.tick,
            Event::GuiTabChanged(e) => e.tick,
            Event::GuiClosed(e) => e.tick,
            Event::ConfigurationChanged(e) => e.tick,
        }
    }
}

// ---------------------------------------------------------------------------
// Typed channel markers
// ---------------------------------------------------------------------------

/// Binds a channel tag to its payload type.
pub trait Channel: 'static {
    /// The channel's tag.
    const ID: ChannelId;

    /// The payload delivered on this channel.
    type Payload: 'static;

    /// Project the payload out of an event fired on this channel. Returns
    /// `None` for events of any other channel.
    fn payload(event: &Event) -> Option<&Self::Payload>;
}

macro_rules! channel_markers {
    ($($(#[$meta:meta])* $marker:ident => $variant:ident($payload:ty);)*) => {
        /// Marker types naming each channel at the type level.
        pub mod channels {
            use super::*;

            $(
                $(#[$meta])*
                #[derive(Debug, Clone, Copy)]
                pub struct $marker;

                impl Channel for $marker {
                    const ID: ChannelId = ChannelId::$variant;
                    type Payload = $payload;

                    fn payload(event: &Event) -> Option<&$payload> {
                        match event {
                            Event::$variant(payload) => Some(payload),
                            _ => None,
                        }
                    }
                }
            )*
        }

        $(
            impl From<$payload> for Event {
                fn from(payload: $payload) -> Self {
                    Event::$variant(payload)
                }
            }
        )*
    };
}

channel_markers! {
    /// `on_tick`
    OnTick => Tick(TickEvent);
    /// `on_player_joined_game`
    OnPlayerJoined => PlayerJoined(PlayerJoinedEvent);
    /// `on_gui_click`
    OnGuiClick => GuiClick(GuiClickEvent);
    /// `on_gui_text_changed`
    OnGuiTextChanged => GuiTextChanged(GuiTextChangedEvent);
    /// `on_gui_selection_state_changed`
    OnGuiSelectionChanged => GuiSelectionChanged(GuiSelectionChangedEvent);
    /// `on_gui_elem_changed`
    OnGuiElemChanged => GuiElemChanged(GuiElemChangedEvent);
    /// `on_gui_checked_state_changed`
    OnGuiCheckedChanged => GuiCheckedChanged(GuiCheckedChangedEvent);
    /// `on_gui_selected_tab_changed`
    OnGuiTabChanged => GuiTabChanged(GuiTabChangedEvent);
    /// `on_gui_closed`
    OnGuiClosed => GuiClosed(GuiClosedEvent);
    /// `on_configuration_changed`
    OnConfigurationChanged => ConfigurationChanged(ConfigurationChangedEvent);
}

// ---------------------------------------------------------------------------
// Payload capabilities
// ---------------------------------------------------------------------------

/// A payload originating from a player session.
pub trait PlayerEvent {
    fn player(&self) -> PlayerId;
}

/// A payload originating from a GUI element.
pub trait GuiEvent: PlayerEvent {
    fn element(&self) -> Option<ElementId>;
}

impl PlayerEvent for PlayerJoinedEvent {
    fn player(&self) -> PlayerId {
        self.player
    }
}

macro_rules! gui_event {
    ($payload:ty, |$event:ident| $element:expr) => {
        impl PlayerEvent for $payload {
            fn player(&self) -> PlayerId {
                self.player
            }
        }

        impl GuiEvent for $payload {
            fn element(&self) -> Option<ElementId> {
                let $event = self;
                $element
            }
        }
    };
}

gui_event!(GuiClickEvent, |e| e.element);
gui_event!(GuiTextChangedEvent, |e| Some(e.element));
gui_event!(GuiSelectionChangedEvent, |e| Some(e.element));
gui_event!(GuiElemChangedEvent, |e| Some(e.element));
gui_event!(GuiCheckedChangedEvent, |e| Some(e.element));
gui_event!(GuiTabChangedEvent, |e| Some(e.element));
gui_event!(GuiClosedEvent, |e| e.element);
