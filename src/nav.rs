//! Remote-control focus navigation.
//!
//! The [`NavigationEngine`] keeps the ordered list of focusable items of the
//! screen currently shown, a single focus position, and the selection
//! callback that turns an activated item into something the coordinator can
//! act on. It knows nothing about what the items are: the coordinator hands
//! it a fresh `Vec<FocusableItem>` on every render pass.
//!
//! Every operation is total. Navigating an empty list, activating nothing or
//! setting columns on a list screen simply does nothing, so bursts of remote
//! input during a re-render can never put the engine in a bad state.

/// Directional keys of the remote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Everything a remote control can send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteCommand {
    Navigate(Direction),
    Ok,
    Back,
}

/// Arrangement of the items on screen.
///
/// `Grid` carries the number of items per row as measured by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    List,
    Grid { columns: usize },
}

/// One entry the remote can land on
#[derive(Debug, Clone, PartialEq)]
pub struct FocusableItem<K> {
    pub key: K,
    pub label: String,
}

impl<K> FocusableItem<K> {
    pub fn new(key: K, label: impl Into<String>) -> Self {
        Self {
            key,
            label: label.into(),
        }
    }
}

/// Result of pressing OK on a focused item
#[derive(Debug, Clone, PartialEq)]
pub enum Activation<K, R> {
    /// The selection callback resolved the item
    Selected(R),
    /// The callback ran but the item no longer resolves against its list
    Unresolved,
    /// No callback registered: the item's own default action applies
    Default(K),
}

#[derive(Debug, Clone, PartialEq)]
pub enum NavEvent<K, R> {
    Moved,
    Activated(Activation<K, R>),
    Back,
}

pub type SelectHandler<K, R> = Box<dyn FnMut(&FocusableItem<K>) -> Option<R>>;

struct ScreenState<S, K> {
    screen: S,
    layout: Layout,
    items: Vec<FocusableItem<K>>,
    /// Only meaningful while `items` is non-empty
    selected: usize,
    search_field: bool,
    /// The screen has a search field above its items
    has_search_field: bool,
}

impl<S, K> ScreenState<S, K> {
    fn focused(&self) -> Option<usize> {
        (!self.search_field && self.selected < self.items.len()).then_some(self.selected)
    }
}

pub struct NavigationEngine<S, K, R> {
    state: Option<ScreenState<S, K>>,
    on_select: Option<SelectHandler<K, R>>,
}

impl<S, K, R> Default for NavigationEngine<S, K, R> {
    fn default() -> Self {
        Self {
            state: None,
            on_select: None,
        }
    }
}

impl<S, K, R> NavigationEngine<S, K, R>
where
    S: Copy + PartialEq,
    K: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch to `screen`. Focus goes back to the first position and the
    /// item list is empty until the next [`update_items`](Self::update_items).
    pub fn set_screen(&mut self, screen: S, layout: Layout) {
        self.state = Some(ScreenState {
            screen,
            layout,
            items: Vec::new(),
            selected: 0,
            search_field: false,
            has_search_field: false,
        });
    }

    /// Replace the item list of the active screen, keeping the focus
    /// position when it is still in range and clamping it otherwise.
    pub fn update_items(&mut self, items: Vec<FocusableItem<K>>) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        state.items = items;
        state.selected = if state.items.is_empty() {
            0
        } else {
            state.selected.min(state.items.len() - 1)
        };
    }

    /// Update the row width of a grid screen. Ignored on list screens.
    pub fn set_columns(&mut self, columns: usize) {
        if let Some(state) = self.state.as_mut() {
            if let Layout::Grid { columns: current } = &mut state.layout {
                *current = columns;
            }
        }
    }

    /// Returns whether the focus moved
    pub fn navigate(&mut self, direction: Direction) -> bool {
        let Some(state) = self.state.as_mut() else {
            return false;
        };
        let len = state.items.len();
        if len == 0 {
            return false;
        }

        if state.search_field {
            let target = match direction {
                Direction::Down => 0,
                Direction::Up => len - 1,
                Direction::Left | Direction::Right => return false,
            };
            state.search_field = false;
            state.selected = target;
            return true;
        }

        let before = state.selected;
        if direction == Direction::Up && before == 0 && state.has_search_field {
            state.search_field = true;
            return true;
        }
        state.selected = match direction {
            Direction::Down => (before + 1) % len,
            Direction::Up => (before + len - 1) % len,
            Direction::Left | Direction::Right => match state.layout {
                Layout::Grid { columns } if columns > 1 => {
                    let row_start = before / columns * columns;
                    let row_end = (row_start + columns).min(len) - 1;
                    match direction {
                        Direction::Right => (before + 1).min(row_end),
                        _ => before.saturating_sub(1).max(row_start),
                    }
                }
                _ => before,
            },
        };
        state.selected != before
    }

    /// Run the selection callback on the focused item.
    /// `None` when nothing is focused.
    pub fn activate(&mut self) -> Option<Activation<K, R>> {
        let state = self.state.as_ref()?;
        let item = state.items.get(state.focused()?)?;
        Some(match self.on_select.as_mut() {
            Some(handler) => match handler(item) {
                Some(resolved) => Activation::Selected(resolved),
                None => Activation::Unresolved,
            },
            None => Activation::Default(item.key.clone()),
        })
    }

    /// Back is never interpreted here; the coordinator decides where it leads
    pub fn cancel(&self) -> NavEvent<K, R> {
        NavEvent::Back
    }

    /// Register the selection callback, replacing the previous one
    pub fn set_on_select<F>(&mut self, handler: F)
    where
        F: FnMut(&FocusableItem<K>) -> Option<R> + 'static,
    {
        self.on_select = Some(Box::new(handler));
    }

    pub fn clear_on_select(&mut self) {
        self.on_select = None;
    }

    /// Put the focus on the text field that sits above the item list.
    /// From then on Up from the first item returns to the field instead of
    /// wrapping, until the next `set_screen`.
    pub fn focus_search_field(&mut self) {
        if let Some(state) = self.state.as_mut() {
            state.search_field = true;
            state.has_search_field = true;
        }
    }

    pub fn handle(&mut self, command: RemoteCommand) -> Option<NavEvent<K, R>> {
        match command {
            RemoteCommand::Navigate(direction) => self.navigate(direction).then_some(NavEvent::Moved),
            RemoteCommand::Ok => self.activate().map(NavEvent::Activated),
            RemoteCommand::Back => Some(self.cancel()),
        }
    }

    pub fn screen(&self) -> Option<S> {
        self.state.as_ref().map(|s| s.screen)
    }

    pub fn layout(&self) -> Option<Layout> {
        self.state.as_ref().map(|s| s.layout)
    }

    pub fn items(&self) -> &[FocusableItem<K>] {
        self.state.as_ref().map(|s| s.items.as_slice()).unwrap_or(&[])
    }

    pub fn focused_index(&self) -> Option<usize> {
        self.state.as_ref()?.focused()
    }

    pub fn focused_item(&self) -> Option<&FocusableItem<K>> {
        let state = self.state.as_ref()?;
        state.items.get(state.focused()?)
    }

    pub fn is_search_field_focused(&self) -> bool {
        self.state.as_ref().is_some_and(|s| s.search_field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Screen {
        Menu,
        Tiles,
    }

    type Engine = NavigationEngine<Screen, usize, String>;

    fn items(n: usize) -> Vec<FocusableItem<usize>> {
        (0..n).map(|i| FocusableItem::new(i, format!("item {}", i))).collect()
    }

    fn list_engine(n: usize) -> Engine {
        let mut nav = Engine::new();
        nav.set_screen(Screen::Menu, Layout::List);
        nav.update_items(items(n));
        nav
    }

    fn grid_engine(n: usize, columns: usize) -> Engine {
        let mut nav = Engine::new();
        nav.set_screen(Screen::Tiles, Layout::Grid { columns });
        nav.update_items(items(n));
        nav
    }

    fn focus_at(nav: &mut Engine, index: usize) {
        while nav.focused_index() != Some(index) {
            nav.navigate(Direction::Down);
        }
    }

    #[test]
    fn test_down_n_times_returns_to_start() {
        for n in 1..8 {
            for start in 0..n {
                let mut nav = list_engine(n);
                focus_at(&mut nav, start);
                for _ in 0..n {
                    nav.navigate(Direction::Down);
                }
                assert_eq!(nav.focused_index(), Some(start), "n={} start={}", n, start);
            }
        }
    }

    #[test]
    fn test_up_from_first_wraps_to_last() {
        for n in 1..8 {
            let mut nav = list_engine(n);
            nav.navigate(Direction::Up);
            assert_eq!(nav.focused_index(), Some(n - 1));
        }
    }

    #[test]
    fn test_three_downs_on_three_items_returns_to_first() {
        let mut nav = list_engine(3);
        assert_eq!(nav.focused_item().map(|i| i.key), Some(0));
        nav.navigate(Direction::Down);
        nav.navigate(Direction::Down);
        nav.navigate(Direction::Down);
        assert_eq!(nav.focused_index(), Some(0));
    }

    #[test]
    fn test_update_items_clamps_focus() {
        let mut nav = list_engine(10);
        focus_at(&mut nav, 8);
        nav.update_items(items(4));
        assert_eq!(nav.focused_index(), Some(3));

        nav.update_items(items(6));
        assert_eq!(nav.focused_index(), Some(3));
    }

    #[test]
    fn test_empty_list_has_no_focus() {
        let mut nav = list_engine(5);
        focus_at(&mut nav, 2);
        nav.update_items(Vec::new());
        assert_eq!(nav.focused_index(), None);
        assert!(!nav.navigate(Direction::Down));
        assert!(!nav.navigate(Direction::Up));
        assert_eq!(nav.focused_index(), None);

        nav.update_items(items(3));
        assert_eq!(nav.focused_index(), Some(0));
    }

    #[test]
    fn test_set_screen_resets_focus_and_items() {
        let mut nav = list_engine(5);
        focus_at(&mut nav, 3);
        nav.set_screen(Screen::Tiles, Layout::Grid { columns: 2 });
        assert_eq!(nav.screen(), Some(Screen::Tiles));
        assert!(nav.items().is_empty());
        assert_eq!(nav.focused_index(), None);

        nav.update_items(items(5));
        assert_eq!(nav.focused_index(), Some(0));
    }

    #[test]
    fn test_no_screen_is_inert() {
        let mut nav = Engine::new();
        nav.update_items(items(3));
        assert!(nav.items().is_empty());
        assert!(!nav.navigate(Direction::Down));
        assert!(nav.activate().is_none());
        nav.focus_search_field();
        assert!(!nav.is_search_field_focused());
        assert_eq!(nav.handle(RemoteCommand::Back), Some(NavEvent::Back));
    }

    #[test]
    fn test_grid_left_right_move_within_row() {
        let mut nav = grid_engine(9, 3);
        focus_at(&mut nav, 4);
        nav.navigate(Direction::Right);
        assert_eq!(nav.focused_index(), Some(5));

        let mut nav = grid_engine(9, 3);
        focus_at(&mut nav, 4);
        nav.navigate(Direction::Left);
        assert_eq!(nav.focused_index(), Some(3));
    }

    #[test]
    fn test_grid_horizontal_moves_clamp_at_row_edges() {
        let mut nav = grid_engine(8, 3);
        focus_at(&mut nav, 5);
        assert!(!nav.navigate(Direction::Right));
        assert_eq!(nav.focused_index(), Some(5));

        focus_at(&mut nav, 3);
        assert!(!nav.navigate(Direction::Left));
        assert_eq!(nav.focused_index(), Some(3));

        // short last row
        focus_at(&mut nav, 7);
        assert!(!nav.navigate(Direction::Right));
        assert_eq!(nav.focused_index(), Some(7));
    }

    #[test]
    fn test_horizontal_ignored_on_lists_and_single_column_grids() {
        let mut nav = list_engine(5);
        focus_at(&mut nav, 2);
        assert!(!nav.navigate(Direction::Right));
        assert!(!nav.navigate(Direction::Left));
        assert_eq!(nav.focused_index(), Some(2));

        let mut nav = grid_engine(5, 1);
        focus_at(&mut nav, 2);
        assert!(!nav.navigate(Direction::Right));
        assert_eq!(nav.focused_index(), Some(2));
    }

    #[test]
    fn test_set_columns_only_touches_grids() {
        let mut nav = grid_engine(9, 1);
        nav.set_columns(3);
        assert_eq!(nav.layout(), Some(Layout::Grid { columns: 3 }));

        let mut nav = list_engine(3);
        nav.set_columns(4);
        assert_eq!(nav.layout(), Some(Layout::List));
    }

    #[test]
    fn test_activate_on_empty_list_invokes_nothing() {
        let calls = Rc::new(RefCell::new(0));
        let mut nav = list_engine(0);
        let counter = calls.clone();
        nav.set_on_select(move |_| {
            *counter.borrow_mut() += 1;
            Some("hit".to_string())
        });
        assert!(nav.activate().is_none());
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn test_second_callback_replaces_first() {
        let first = Rc::new(RefCell::new(0));
        let mut nav = list_engine(3);

        let counter = first.clone();
        nav.set_on_select(move |_| {
            *counter.borrow_mut() += 1;
            Some("first".to_string())
        });
        nav.set_on_select(|item| Some(format!("second:{}", item.key)));

        nav.navigate(Direction::Down);
        assert_eq!(
            nav.activate(),
            Some(Activation::Selected("second:1".to_string()))
        );
        assert_eq!(*first.borrow(), 0);
    }

    #[test]
    fn test_unresolved_when_callback_declines() {
        let mut nav = list_engine(2);
        nav.set_on_select(|_| None);
        assert_eq!(nav.activate(), Some(Activation::Unresolved));
    }

    // The default activation only matters when a screen registers no
    // callback; every list screen does, so this path is a fallback.
    #[test]
    fn test_default_activation_without_callback() {
        let mut nav = list_engine(3);
        nav.navigate(Direction::Up);
        assert_eq!(nav.activate(), Some(Activation::Default(2)));

        nav.set_on_select(|_| Some("cb".to_string()));
        nav.clear_on_select();
        assert_eq!(nav.activate(), Some(Activation::Default(2)));
    }

    #[test]
    fn test_search_field_focus() {
        let mut nav = list_engine(0);
        nav.focus_search_field();
        assert!(nav.is_search_field_focused());
        assert!(nav.activate().is_none());
        assert!(!nav.navigate(Direction::Down));

        // results arrive while typing: the field keeps focus
        nav.update_items(items(4));
        assert!(nav.is_search_field_focused());
        assert_eq!(nav.focused_index(), None);

        assert!(nav.navigate(Direction::Down));
        assert!(!nav.is_search_field_focused());
        assert_eq!(nav.focused_index(), Some(0));

        nav.focus_search_field();
        nav.navigate(Direction::Up);
        assert_eq!(nav.focused_index(), Some(3));
    }

    #[test]
    fn test_up_from_first_result_returns_to_search_field() {
        let mut nav = list_engine(3);
        nav.focus_search_field();
        nav.navigate(Direction::Down);
        assert_eq!(nav.focused_index(), Some(0));

        assert!(nav.navigate(Direction::Up));
        assert!(nav.is_search_field_focused());
        assert_eq!(nav.focused_index(), None);

        // further down the list Up still moves one row
        nav.navigate(Direction::Down);
        nav.navigate(Direction::Down);
        nav.navigate(Direction::Up);
        assert_eq!(nav.focused_index(), Some(0));

        // a new screen has no field, so Up wraps again
        nav.set_screen(Screen::Menu, Layout::List);
        nav.update_items(items(3));
        nav.navigate(Direction::Up);
        assert_eq!(nav.focused_index(), Some(2));
        assert!(!nav.is_search_field_focused());
    }

    #[test]
    fn test_handle_dispatch() {
        let mut nav = list_engine(2);
        nav.set_on_select(|item| Some(item.label.clone()));
        assert_eq!(
            nav.handle(RemoteCommand::Navigate(Direction::Down)),
            Some(NavEvent::Moved)
        );
        assert_eq!(
            nav.handle(RemoteCommand::Ok),
            Some(NavEvent::Activated(Activation::Selected("item 1".to_string())))
        );
        assert_eq!(nav.handle(RemoteCommand::Navigate(Direction::Left)), None);
        assert_eq!(nav.handle(RemoteCommand::Back), Some(NavEvent::Back));
    }
}
