/// The in-memory habit collection and transient UI state
///
/// `HabitStore` is the single source of truth for a session. It performs no
/// validation; the controller is responsible for keeping names trimmed and
/// dates canonical.

use std::collections::HashSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{Habit, HabitId, ViewMode};

/// What a pending delete or recolor applies to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "habitId", rename_all = "camelCase")]
pub enum Target {
    /// A single habit chosen from its context menu
    Habit(HabitId),
    /// Every habit in the current selection
    Bulk,
}

/// Screen position a context menu is anchored to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MenuAnchor {
    pub top: f64,
    pub left: f64,
}

/// An open per-habit context menu
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextMenu {
    pub habit_id: HabitId,
    pub anchor: Option<MenuAnchor>,
}

/// A drag gesture in progress
///
/// `order` is the visual order of the board while the pointer moves; the
/// store's own order is only rewritten on drop.
#[derive(Debug, Clone, PartialEq)]
pub struct DragState {
    pub habit_id: HabitId,
    pub order: Vec<HabitId>,
}

/// Transient interaction state; never persisted
#[derive(Debug, Clone, Default)]
struct UiState {
    view_mode: ViewMode,
    select_mode: bool,
    selected: HashSet<HabitId>,
    drag: Option<DragState>,
    pending_delete: Option<Target>,
    pending_color: Option<Target>,
    context_menu: Option<ContextMenu>,
    editing: Option<HabitId>,
    pending_import: Option<Vec<Habit>>,
}

/// Habit collection plus the UI state that goes with it
#[derive(Debug, Clone, Default)]
pub struct HabitStore {
    habits: Vec<Habit>,
    ui: UiState,
}

impl HabitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `habits` in the given order
    pub fn with_habits(habits: Vec<Habit>) -> Self {
        Self {
            habits,
            ui: UiState::default(),
        }
    }

    // Collection access

    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    pub fn len(&self) -> usize {
        self.habits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.habits.is_empty()
    }

    pub fn find(&self, id: &HabitId) -> Option<&Habit> {
        self.habits.iter().find(|h| &h.id == id)
    }

    pub fn find_mut(&mut self, id: &HabitId) -> Option<&mut Habit> {
        self.habits.iter_mut().find(|h| &h.id == id)
    }

    pub fn contains(&self, id: &HabitId) -> bool {
        self.find(id).is_some()
    }

    pub fn last(&self) -> Option<&Habit> {
        self.habits.last()
    }

    pub fn ids(&self) -> Vec<HabitId> {
        self.habits.iter().map(|h| h.id.clone()).collect()
    }

    // Collection mutation

    pub fn replace_all(&mut self, habits: Vec<Habit>) {
        self.habits = habits;
    }

    pub fn push(&mut self, habit: Habit) {
        self.habits.push(habit);
    }

    /// Remove one habit, returning it if it existed
    pub fn remove(&mut self, id: &HabitId) -> Option<Habit> {
        let index = self.habits.iter().position(|h| &h.id == id)?;
        Some(self.habits.remove(index))
    }

    /// Remove every habit whose id is in `ids`, returning how many went
    pub fn remove_many(&mut self, ids: &HashSet<HabitId>) -> usize {
        let before = self.habits.len();
        self.habits.retain(|h| !ids.contains(&h.id));
        before - self.habits.len()
    }

    /// Reorder the collection to follow `order`
    ///
    /// Habits missing from `order` keep their relative order at the end.
    pub fn reorder(&mut self, order: &[HabitId]) {
        let rank = |id: &HabitId| order.iter().position(|o| o == id).unwrap_or(usize::MAX);
        self.habits.sort_by_key(|h| rank(&h.id));
    }

    // UI state

    pub fn view_mode(&self) -> ViewMode {
        self.ui.view_mode
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.ui.view_mode = mode;
    }

    pub fn select_mode(&self) -> bool {
        self.ui.select_mode
    }

    pub fn set_select_mode(&mut self, on: bool) {
        self.ui.select_mode = on;
    }

    pub fn selected(&self) -> &HashSet<HabitId> {
        &self.ui.selected
    }

    pub fn is_selected(&self, id: &HabitId) -> bool {
        self.ui.selected.contains(id)
    }

    pub fn select(&mut self, id: HabitId) {
        self.ui.selected.insert(id);
    }

    pub fn deselect(&mut self, id: &HabitId) {
        self.ui.selected.remove(id);
    }

    pub fn clear_selection(&mut self) {
        self.ui.selected.clear();
    }

    pub fn drag(&self) -> Option<&DragState> {
        self.ui.drag.as_ref()
    }

    pub fn drag_mut(&mut self) -> Option<&mut DragState> {
        self.ui.drag.as_mut()
    }

    pub fn set_drag(&mut self, drag: Option<DragState>) {
        self.ui.drag = drag;
    }

    pub fn pending_delete(&self) -> Option<&Target> {
        self.ui.pending_delete.as_ref()
    }

    pub fn set_pending_delete(&mut self, target: Option<Target>) {
        self.ui.pending_delete = target;
    }

    pub fn take_pending_delete(&mut self) -> Option<Target> {
        self.ui.pending_delete.take()
    }

    pub fn pending_color(&self) -> Option<&Target> {
        self.ui.pending_color.as_ref()
    }

    pub fn set_pending_color(&mut self, target: Option<Target>) {
        self.ui.pending_color = target;
    }

    pub fn take_pending_color(&mut self) -> Option<Target> {
        self.ui.pending_color.take()
    }

    pub fn context_menu(&self) -> Option<&ContextMenu> {
        self.ui.context_menu.as_ref()
    }

    pub fn set_context_menu(&mut self, menu: Option<ContextMenu>) {
        self.ui.context_menu = menu;
    }

    pub fn take_context_menu(&mut self) -> Option<ContextMenu> {
        self.ui.context_menu.take()
    }

    pub fn editing(&self) -> Option<&HabitId> {
        self.ui.editing.as_ref()
    }

    pub fn set_editing(&mut self, id: Option<HabitId>) {
        self.ui.editing = id;
    }

    pub fn pending_import(&self) -> Option<&[Habit]> {
        self.ui.pending_import.as_deref()
    }

    pub fn set_pending_import(&mut self, habits: Option<Vec<Habit>>) {
        self.ui.pending_import = habits;
    }

    pub fn take_pending_import(&mut self) -> Option<Vec<Habit>> {
        self.ui.pending_import.take()
    }
}
