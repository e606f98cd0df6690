//! Static navigation tree descriptions and the live tree built from them.

use super::{NavError, RouteParams};
use strum::{AsRefStr, Display};

pub mod screens {
    pub const LOGIN: &str = "Login";
    pub const SIGNUP: &str = "Signup";

    pub const HOME: &str = "HomeScreen";
    pub const HISTORY: &str = "HistoryScreen";
    pub const FAVORITE: &str = "FavoriteScreen";
    pub const CART: &str = "CartScreen";
    pub const PAYMENT: &str = "Payment";

    pub const PROFILE: &str = "ProfileScreen";
    pub const JOURNAL: &str = "Journal";
    pub const ADD_JOURNAL: &str = "AddJournal";
    pub const EDIT_PROFILE: &str = "EditProfile";
    pub const JOURNAL_DETAIL: &str = "JournalDetail";
    pub const MAP: &str = "Map";
}

/// Region identity. Tab regions are addressed by their display name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, AsRefStr)]
pub enum RegionId {
    Auth,
    Home,
    History,
    Favorite,
    Cart,
    Profile,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TreeKind {
    Authenticated,
    Unauthenticated,
}

#[derive(Debug)]
pub struct ScreenSpec {
    pub name: &'static str,
    pub title: &'static str,
    pub header_shown: bool,
    /// Hides the enclosing tab bar while this screen is focused.
    pub hides_tab_bar: bool,
}

const fn screen(name: &'static str, title: &'static str) -> ScreenSpec {
    ScreenSpec {
        name,
        title,
        header_shown: true,
        hides_tab_bar: false,
    }
}

#[derive(Debug)]
pub struct StackSpec {
    pub region: RegionId,
    pub screens: &'static [ScreenSpec],
}

impl StackSpec {
    pub fn screen(&self, name: &str) -> Option<&'static ScreenSpec> {
        self.screens.iter().find(|s| s.name == name)
    }
}

#[derive(Debug)]
pub struct TabSpec {
    pub stack: StackSpec,
    pub icon: &'static str,
}

#[derive(Debug)]
pub enum TreeDescription {
    Stack(StackSpec),
    Tabs(&'static [TabSpec]),
}

impl TreeDescription {
    pub fn kind(&self) -> TreeKind {
        match self {
            Self::Stack(_) => TreeKind::Unauthenticated,
            Self::Tabs(_) => TreeKind::Authenticated,
        }
    }
}

pub static UNAUTHENTICATED_TREE: TreeDescription = TreeDescription::Stack(StackSpec {
    region: RegionId::Auth,
    screens: &[
        ScreenSpec {
            header_shown: false,
            ..screen(screens::LOGIN, "Login")
        },
        ScreenSpec {
            header_shown: false,
            ..screen(screens::SIGNUP, "Signup")
        },
    ],
});

pub static AUTHENTICATED_TREE: TreeDescription = TreeDescription::Tabs(&[
    TabSpec {
        stack: StackSpec {
            region: RegionId::Home,
            screens: &[screen(screens::HOME, "Home")],
        },
        icon: "home",
    },
    TabSpec {
        stack: StackSpec {
            region: RegionId::History,
            screens: &[screen(screens::HISTORY, "History")],
        },
        icon: "clockcircleo",
    },
    TabSpec {
        stack: StackSpec {
            region: RegionId::Favorite,
            screens: &[screen(screens::FAVORITE, "Favorites")],
        },
        icon: "hearto",
    },
    TabSpec {
        stack: StackSpec {
            region: RegionId::Cart,
            screens: &[
                screen(screens::CART, "Cart"),
                screen(screens::PAYMENT, "Payment"),
            ],
        },
        icon: "shoppingcart",
    },
    TabSpec {
        stack: StackSpec {
            region: RegionId::Profile,
            screens: &[
                screen(screens::PROFILE, "Profile"),
                screen(screens::JOURNAL, "Journal"),
                screen(screens::ADD_JOURNAL, "Add Journal"),
                screen(screens::EDIT_PROFILE, "Edit Profile"),
                ScreenSpec {
                    hides_tab_bar: true,
                    ..screen(screens::JOURNAL_DETAIL, "Journal Detail")
                },
                screen(screens::MAP, "Choose Location"),
            ],
        },
        icon: "user",
    },
]);

pub fn select_tree(session_active: bool) -> &'static TreeDescription {
    if session_active {
        &AUTHENTICATED_TREE
    } else {
        &UNAUTHENTICATED_TREE
    }
}

/// One entry of a stack. Params are fixed for the lifetime of the entry.
#[derive(Clone, Debug, PartialEq)]
pub struct Screen {
    /// Unique within a live tree; a replaced entry gets a new key.
    pub key: u64,
    /// Key of the first entry at this stack position; survives replacement.
    pub origin: u64,
    pub name: &'static str,
    pub params: Option<RouteParams>,
}

/// Immutable view of the focused screen, handed to the header resolver.
#[derive(Clone, Debug, PartialEq)]
pub struct ScreenContext {
    pub key: u64,
    pub origin: u64,
    pub region: RegionId,
    pub screen: &'static str,
    pub params: Option<RouteParams>,
}

#[derive(Clone, Debug)]
struct LiveStack {
    spec: &'static StackSpec,
    icon: Option<&'static str>,
    entries: Vec<Screen>,
}

impl LiveStack {
    fn new(spec: &'static StackSpec, icon: Option<&'static str>, key: u64) -> Self {
        let entries = spec
            .screens
            .first()
            .map(|root| Screen {
                key,
                origin: key,
                name: root.name,
                params: None,
            })
            .into_iter()
            .collect();
        Self {
            spec,
            icon,
            entries,
        }
    }

    fn top(&self) -> Option<&Screen> {
        self.entries.last()
    }
}

#[derive(Clone, Debug)]
pub struct TabEntry {
    pub region: RegionId,
    pub icon: &'static str,
    pub focused: bool,
}

/// Navigable tree expanded from a static description.
#[derive(Clone, Debug)]
pub struct LiveTree {
    kind: TreeKind,
    tabbed: bool,
    stacks: Vec<LiveStack>,
    focused: usize,
    next_key: u64,
}

pub fn compose(description: &'static TreeDescription) -> LiveTree {
    let (tabbed, stacks): (bool, Vec<LiveStack>) = match description {
        TreeDescription::Stack(stack) => (false, vec![LiveStack::new(stack, None, 0)]),
        TreeDescription::Tabs(tabs) => (
            true,
            tabs.iter()
                .zip(0u64..)
                .map(|(tab, key)| LiveStack::new(&tab.stack, Some(tab.icon), key))
                .collect(),
        ),
    };
    LiveTree {
        kind: description.kind(),
        tabbed,
        next_key: stacks.len() as u64,
        stacks,
        focused: 0,
    }
}

impl LiveTree {
    pub fn kind(&self) -> TreeKind {
        self.kind
    }

    fn focused_stack(&self) -> &LiveStack {
        &self.stacks[self.focused]
    }

    fn focused_stack_mut(&mut self) -> &mut LiveStack {
        &mut self.stacks[self.focused]
    }

    pub fn focused_region(&self) -> RegionId {
        self.focused_stack().spec.region
    }

    pub fn focused(&self) -> ScreenContext {
        let stack = self.focused_stack();
        let (key, origin, screen, params) = stack
            .top()
            .map(|s| (s.key, s.origin, s.name, s.params.clone()))
            .unwrap_or((0, 0, "", None));
        ScreenContext {
            key,
            origin,
            region: stack.spec.region,
            screen,
            params,
        }
    }

    pub fn focused_spec(&self) -> Option<&'static ScreenSpec> {
        let stack = self.focused_stack();
        stack.top().and_then(|s| stack.spec.screen(s.name))
    }

    pub fn depth(&self) -> usize {
        self.focused_stack().entries.len()
    }

    pub fn tab_bar_visible(&self) -> bool {
        self.tabbed && !self.focused_spec().is_some_and(|s| s.hides_tab_bar)
    }

    pub fn header_shown(&self) -> bool {
        self.focused_spec().is_some_and(|s| s.header_shown)
    }

    pub fn title(&self) -> &'static str {
        self.focused_spec().map(|s| s.title).unwrap_or_default()
    }

    pub fn tabs(&self) -> Vec<TabEntry> {
        if !self.tabbed {
            return Vec::new();
        }
        self.stacks
            .iter()
            .enumerate()
            .filter_map(|(i, stack)| {
                stack.icon.map(|icon| TabEntry {
                    region: stack.spec.region,
                    icon,
                    focused: i == self.focused,
                })
            })
            .collect()
    }

    /// Whether `name` is declared anywhere in this tree.
    pub fn declares(&self, name: &str) -> bool {
        self.stacks.iter().any(|s| s.spec.screen(name).is_some())
    }

    pub fn focus_tab(&mut self, region: RegionId) -> Result<(), NavError> {
        if !self.tabbed {
            return Err(NavError::UnknownRegion(region.to_string()));
        }
        let index = self
            .stacks
            .iter()
            .position(|s| s.spec.region == region)
            .ok_or_else(|| NavError::UnknownRegion(region.to_string()))?;
        self.focused = index;
        Ok(())
    }

    /// Pushes a new entry onto the focused stack.
    fn take_key(&mut self) -> u64 {
        let key = self.next_key;
        self.next_key += 1;
        key
    }

    pub fn push(&mut self, name: &str, params: Option<RouteParams>) -> Result<(), NavError> {
        let spec = self
            .focused_stack()
            .spec
            .screen(name)
            .ok_or_else(|| NavError::UnknownRoute(name.to_string()))?;
        let key = self.take_key();
        self.focused_stack_mut().entries.push(Screen {
            key,
            origin: key,
            name: spec.name,
            params,
        });
        Ok(())
    }

    /// Pops the focused stack. The root entry is never popped.
    pub fn go_back(&mut self) -> bool {
        let stack = self.focused_stack_mut();
        if stack.entries.len() <= 1 {
            return false;
        }
        stack.entries.pop();
        true
    }

    /// Pops the entry with `key` if it is the top of its stack, focused or not.
    pub fn pop_entry(&mut self, key: u64) -> bool {
        let stack = self
            .stacks
            .iter_mut()
            .find(|s| s.entries.len() > 1 && s.top().is_some_and(|top| top.key == key));
        match stack {
            Some(stack) => {
                stack.entries.pop();
                true
            }
            None => false,
        }
    }

    pub fn navigate(&mut self, name: &str, params: Option<RouteParams>) -> Result<(), NavError> {
        if self.tabbed {
            if let Some(index) = self.stacks.iter().position(|s| s.spec.region.as_ref() == name) {
                self.focused = index;
                return Ok(());
            }
        }

        if self.focused_stack().spec.screen(name).is_none() {
            let index = self
                .stacks
                .iter()
                .position(|s| s.spec.screen(name).is_some())
                .ok_or_else(|| NavError::UnknownRoute(name.to_string()))?;
            self.focused = index;
        }

        let existing = self
            .focused_stack()
            .entries
            .iter()
            .position(|s| s.name == name);
        match existing {
            Some(index) => {
                let key = params.as_ref().map(|_| self.take_key());
                let stack = self.focused_stack_mut();
                stack.entries.truncate(index + 1);
                if let Some(key) = key {
                    // New params mean a new entry replacing the old one.
                    let Screen { name, origin, .. } = stack.entries[index];
                    stack.entries[index] = Screen {
                        key,
                        origin,
                        name,
                        params,
                    };
                }
                Ok(())
            }
            None => self.push(name, params),
        }
    }
}
