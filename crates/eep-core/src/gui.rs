//! GUI element arena.
//!
//! Models the host's GUI tree: every element lives in a generational
//! [`SlotMap`] and is owned by one player. Destroying an element destroys its
//! subtree, and the destroyed keys never resolve again, which is how widget
//! listeners detect that their target is gone.
//!
//! Index-valued properties (`selected_index`, `selected_tab_index`) use the
//! host's convention: 1-based, with 0 meaning "nothing selected". Widget
//! wrappers translate to 0-based `Option<usize>`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use slotmap::SlotMap;

use crate::id::{ElementId, PlayerId};

/// The arena shared between widgets, predicates and collaborators.
pub type SharedGui = Rc<RefCell<Gui>>;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuiError {
    #[error("element {0:?} is not valid")]
    InvalidElement(ElementId),
    #[error("element {element:?} is a {found:?}, expected {expected:?}")]
    WrongKind {
        element: ElementId,
        expected: ElementKind,
        found: ElementKind,
    },
    #[error("index {index} out of range for element {element:?} with {len} entries")]
    IndexOutOfRange {
        element: ElementId,
        index: u32,
        len: usize,
    },
}

// ---------------------------------------------------------------------------
// Elements
// ---------------------------------------------------------------------------

/// The kind of a GUI element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Root,
    Frame,
    Flow,
    Table,
    Label,
    Button,
    DropDown,
    TextField,
    Checkbox,
    ChooseElemButton,
    TabbedPane,
    Tab,
}

/// Top-level GUI areas every player has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuiRoot {
    /// The mod button bar along the top of the screen.
    Top,
    /// The centered area windows are opened in.
    Center,
}

/// A node in the GUI tree.
#[derive(Debug, Clone)]
pub struct Element {
    pub kind: ElementKind,
    pub name: Option<String>,
    pub player: PlayerId,
    pub parent: Option<ElementId>,
    pub children: Vec<ElementId>,
    pub caption: String,
    pub text: String,
    pub numeric: bool,
    pub items: Vec<String>,
    /// 1-based, 0 = none.
    pub selected_index: u32,
    pub state: bool,
    pub elem_value: Option<String>,
    /// (tab, content) pairs of a tabbed pane.
    pub tabs: Vec<(ElementId, ElementId)>,
    /// 1-based, 0 = none.
    pub selected_tab_index: u32,
    pub column_count: u32,
}

/// Construction parameters for [`Gui::add`].
#[derive(Debug, Clone)]
pub struct ElementSpec {
    pub kind: ElementKind,
    pub name: Option<String>,
    pub caption: String,
    pub text: String,
    pub numeric: bool,
    pub items: Vec<String>,
    pub selected_index: u32,
    pub state: bool,
    pub elem_value: Option<String>,
    pub column_count: u32,
}

impl ElementSpec {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            name: None,
            caption: String::new(),
            text: String::new(),
            numeric: false,
            items: Vec::new(),
            selected_index: 0,
            state: false,
            elem_value: None,
            column_count: 0,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = caption.into();
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn numeric(mut self) -> Self {
        self.numeric = true;
        self
    }

    pub fn items<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.items = items.into_iter().map(Into::into).collect();
        self
    }

    pub fn selected_index(mut self, index: u32) -> Self {
        self.selected_index = index;
        self
    }

    pub fn state(mut self, state: bool) -> Self {
        self.state = state;
        self
    }

    pub fn elem_value(mut self, value: impl Into<String>) -> Self {
        self.elem_value = Some(value.into());
        self
    }

    pub fn column_count(mut self, count: u32) -> Self {
        self.column_count = count;
        self
    }
}

// ---------------------------------------------------------------------------
// Gui
// ---------------------------------------------------------------------------

/// All GUI elements of all players.
#[derive(Debug, Default)]
pub struct Gui {
    elements: SlotMap<ElementId, Element>,
    roots: HashMap<(PlayerId, GuiRoot), ElementId>,
    opened: HashMap<PlayerId, ElementId>,
}

impl Gui {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedGui {
        Rc::new(RefCell::new(Self::new()))
    }

    /// The root element of a GUI area, created on first access.
    pub fn root(&mut self, player: PlayerId, root: GuiRoot) -> ElementId {
        if let Some(&id) = self.roots.get(&(player, root)) {
            return id;
        }
        let id = self.elements.insert(Element::from_spec(
            ElementSpec::new(ElementKind::Root),
            player,
            None,
        ));
        self.roots.insert((player, root), id);
        id
    }

    /// Add a child element under `parent`. The child belongs to the parent's
    /// player.
    pub fn add(&mut self, parent: ElementId, spec: ElementSpec) -> Result<ElementId, GuiError> {
        let player = self.get(parent).ok_or(GuiError::InvalidElement(parent))?.player;
        let id = self
            .elements
            .insert(Element::from_spec(spec, player, Some(parent)));
        if let Some(parent) = self.elements.get_mut(parent) {
            parent.children.push(id);
        }
        Ok(id)
    }

    /// Destroy an element and its whole subtree.
    pub fn destroy(&mut self, id: ElementId) -> Result<(), GuiError> {
        let element = self.elements.get(id).ok_or(GuiError::InvalidElement(id))?;
        if let Some(parent) = element.parent
            && let Some(parent) = self.elements.get_mut(parent)
        {
            parent.children.retain(|&child| child != id);
        }

        let mut stack = vec![id];
        let mut destroyed = 0usize;
        while let Some(next) = stack.pop() {
            if let Some(element) = self.elements.remove(next) {
                stack.extend(element.children);
                destroyed += 1;
            }
        }
        self.opened.retain(|_, opened| self.elements.contains_key(*opened));
        self.roots.retain(|_, root| *root != id);

        tracing::trace!(?id, destroyed, "gui subtree destroyed");
        Ok(())
    }

    /// Destroy every child of an element, keeping the element itself.
    pub fn clear(&mut self, id: ElementId) -> Result<(), GuiError> {
        let children = self
            .elements
            .get(id)
            .ok_or(GuiError::InvalidElement(id))?
            .children
            .clone();
        for child in children {
            self.destroy(child)?;
        }
        Ok(())
    }

    pub fn is_valid(&self, id: ElementId) -> bool {
        self.elements.contains_key(id)
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(id)
    }

    /// Like [`get`](Self::get) but checks the element kind.
    pub fn expect_kind(&self, id: ElementId, kind: ElementKind) -> Result<&Element, GuiError> {
        let element = self.get(id).ok_or(GuiError::InvalidElement(id))?;
        if element.kind != kind {
            return Err(GuiError::WrongKind {
                element: id,
                expected: kind,
                found: element.kind,
            });
        }
        Ok(element)
    }

    /// Like [`get_mut`](Self::get_mut) but checks the element kind.
    pub fn expect_kind_mut(
        &mut self,
        id: ElementId,
        kind: ElementKind,
    ) -> Result<&mut Element, GuiError> {
        let element = self.get_mut(id).ok_or(GuiError::InvalidElement(id))?;
        if element.kind != kind {
            return Err(GuiError::WrongKind {
                element: id,
                expected: kind,
                found: element.kind,
            });
        }
        Ok(element)
    }

    /// Find a direct child by name.
    pub fn child_by_name(&self, parent: ElementId, name: &str) -> Option<ElementId> {
        self.get(parent)?
            .children
            .iter()
            .copied()
            .find(|&child| self.get(child).and_then(|c| c.name.as_deref()) == Some(name))
    }

    /// Attach a tab and its content to a tabbed pane.
    pub fn add_tab(
        &mut self,
        pane: ElementId,
        tab: ElementId,
        content: ElementId,
    ) -> Result<(), GuiError> {
        self.expect_kind(tab, ElementKind::Tab)?;
        if !self.is_valid(content) {
            return Err(GuiError::InvalidElement(content));
        }
        self.expect_kind_mut(pane, ElementKind::TabbedPane)?
            .tabs
            .push((tab, content));
        Ok(())
    }

    /// Mark an element as the player's opened GUI. Closing it makes the host
    /// fire `GuiClosed`.
    pub fn set_opened(&mut self, player: PlayerId, id: ElementId) -> Result<(), GuiError> {
        if !self.is_valid(id) {
            return Err(GuiError::InvalidElement(id));
        }
        self.opened.insert(player, id);
        Ok(())
    }

    pub fn opened(&self, player: PlayerId) -> Option<ElementId> {
        self.opened.get(&player).copied()
    }

    /// Forget the player's opened GUI, returning it.
    pub fn take_opened(&mut self, player: PlayerId) -> Option<ElementId> {
        self.opened.remove(&player)
    }

    /// Number of live elements, roots included.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl Element {
    fn from_spec(spec: ElementSpec, player: PlayerId, parent: Option<ElementId>) -> Self {
        Self {
            kind: spec.kind,
            name: spec.name,
            player,
            parent,
            children: Vec::new(),
            caption: spec.caption,
            text: spec.text,
            numeric: spec.numeric,
            items: spec.items,
            selected_index: spec.selected_index,
            state: spec.state,
            elem_value: spec.elem_value,
            tabs: Vec::new(),
            selected_tab_index: 0,
            column_count: spec.column_count,
        }
    }
}
