/// Interaction controller: a reducer from user actions to store mutations
///
/// `reduce` applies one `Action` to the `HabitStore` and reports what the
/// caller has to do next as a list of `Effect`s. The reducer never touches
/// storage itself; the session applies the persist-after-every-change
/// policy when it sees `Effect::Persist`.

use std::cmp::Ordering;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::domain::{dates, ColorTheme, DomainError, Habit, HabitId, ViewMode, NEW_HABIT_NAME};
use crate::render::plural;
use crate::state::{Action, CardBounds, ContextMenu, DragState, HabitStore, MenuItem, Target};

/// Follow-up work requested by the reducer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "message", rename_all = "camelCase")]
pub enum Effect {
    /// The view is stale and must be rebuilt
    Render,
    /// The habit collection changed and must be written out
    Persist,
    /// A message to show the user
    Notify(String),
}

fn changed() -> Vec<Effect> {
    vec![Effect::Render, Effect::Persist]
}

fn redraw() -> Vec<Effect> {
    vec![Effect::Render]
}

fn require_select_mode(store: &HabitStore, action: &'static str) -> Result<(), DomainError> {
    if store.select_mode() {
        Ok(())
    } else {
        Err(DomainError::SelectModeRequired { action })
    }
}

fn require_habit(store: &HabitStore, id: &HabitId) -> Result<(), DomainError> {
    if store.contains(id) {
        Ok(())
    } else {
        Err(DomainError::HabitNotFound(id.to_string()))
    }
}

/// Pick a color for a new habit from `palette`, avoiding `last`
///
/// Only the most recently added habit's color is excluded. When that
/// leaves nothing to choose from, the whole palette is used.
pub fn pick_color<R: Rng + ?Sized>(
    palette: &[ColorTheme],
    last: Option<ColorTheme>,
    rng: &mut R,
) -> ColorTheme {
    let candidates: Vec<ColorTheme> = palette
        .iter()
        .copied()
        .filter(|color| Some(*color) != last)
        .collect();
    let pool = if candidates.is_empty() { palette } else { &candidates[..] };

    pool.choose(rng).copied().unwrap_or_default()
}

/// Find where a dragged card lands for a pointer at `pointer_y`
///
/// Returns the sibling the card goes in front of: the one whose midpoint
/// is closest below the pointer. `None` means the card goes last.
pub fn drop_target(pointer_y: f64, dragged: &HabitId, siblings: &[CardBounds]) -> Option<HabitId> {
    siblings
        .iter()
        .filter(|s| &s.habit_id != dragged)
        .map(|s| (pointer_y - s.midpoint(), s))
        .filter(|(offset, _)| *offset < 0.0)
        .max_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal))
        .map(|(_, s)| s.habit_id.clone())
}

fn clear_transient_selection(store: &mut HabitStore) {
    store.clear_selection();
    store.set_select_mode(false);
    store.set_drag(None);
    store.set_pending_delete(None);
    store.set_pending_color(None);
    store.set_context_menu(None);
    store.set_editing(None);
}

fn apply_import(store: &mut HabitStore, habits: Vec<Habit>) -> Vec<Effect> {
    let count = habits.len();
    store.replace_all(habits);
    clear_transient_selection(store);

    let mut effects = changed();
    effects.push(Effect::Notify(format!(
        "Successfully imported {} {}",
        count,
        plural(count, "habit", "habits")
    )));
    effects
}

/// Offer a parsed import to the store
///
/// An empty collection is replaced straight away. Otherwise the habits are
/// parked until the user confirms, since import replaces everything.
pub fn stage_import(store: &mut HabitStore, habits: Vec<Habit>) -> Vec<Effect> {
    if store.is_empty() {
        return apply_import(store, habits);
    }

    debug!(current = store.len(), incoming = habits.len(), "import awaiting confirmation");
    store.set_context_menu(None);
    store.set_pending_import(Some(habits));
    redraw()
}

/// Apply one user action to the store
pub fn reduce<R: Rng + ?Sized>(
    store: &mut HabitStore,
    action: Action,
    rng: &mut R,
) -> Result<Vec<Effect>, DomainError> {
    debug!(action = action.name(), "reducing action");

    match action {
        Action::ToggleCompletion { habit_id, date } => {
            dates::parse_date(&date)?;
            require_habit(store, &habit_id)?;

            if store.select_mode() || store.view_mode() != ViewMode::Weekly {
                debug!(habit = %habit_id, "completion toggle ignored outside the weekly strip");
                return Ok(Vec::new());
            }

            if let Some(habit) = store.find_mut(&habit_id) {
                habit.toggle_completion(&date)?;
            }
            Ok(changed())
        }

        Action::BeginRename { habit_id } => {
            require_habit(store, &habit_id)?;
            store.set_editing(Some(habit_id));
            Ok(redraw())
        }

        Action::CommitRename { habit_id, input } => {
            let habit = store
                .find_mut(&habit_id)
                .ok_or_else(|| DomainError::HabitNotFound(habit_id.to_string()))?;
            habit.rename(&input);
            store.set_editing(None);
            Ok(changed())
        }

        Action::AddHabit => {
            let last = store.last().map(|h| h.color);
            let color = pick_color(&ColorTheme::ALL, last, rng);

            let mut habit = Habit::new(NEW_HABIT_NAME, color);
            while store.contains(&habit.id) {
                habit.id = HabitId::new();
            }
            store.push(habit);
            Ok(changed())
        }

        Action::RequestDelete { habit_id } => {
            require_habit(store, &habit_id)?;
            store.set_context_menu(None);
            store.set_pending_color(None);
            store.set_pending_delete(Some(Target::Habit(habit_id)));
            Ok(redraw())
        }

        Action::RequestBulkDelete => {
            require_select_mode(store, "Bulk delete")?;
            if store.selected().is_empty() {
                return Ok(Vec::new());
            }
            store.set_pending_color(None);
            store.set_pending_delete(Some(Target::Bulk));
            Ok(redraw())
        }

        Action::ConfirmDelete => match store.take_pending_delete() {
            Some(Target::Habit(habit_id)) => {
                store.remove(&habit_id);
                store.deselect(&habit_id);
                if store.pending_color() == Some(&Target::Habit(habit_id)) {
                    store.set_pending_color(None);
                }
                Ok(changed())
            }
            Some(Target::Bulk) => {
                let selected = store.selected().clone();
                let removed = store.remove_many(&selected);
                debug!(removed, "bulk delete applied");
                store.clear_selection();
                store.set_select_mode(false);
                store.set_pending_color(None);
                Ok(changed())
            }
            None => Ok(Vec::new()),
        },

        Action::CancelDelete => {
            store.set_pending_delete(None);
            Ok(redraw())
        }

        Action::RequestRecolor { habit_id } => {
            require_habit(store, &habit_id)?;
            store.set_context_menu(None);
            store.set_pending_delete(None);
            store.set_pending_color(Some(Target::Habit(habit_id)));
            Ok(redraw())
        }

        Action::RequestBulkRecolor => {
            require_select_mode(store, "Bulk recolor")?;
            if store.selected().is_empty() {
                return Ok(Vec::new());
            }
            store.set_pending_delete(None);
            store.set_pending_color(Some(Target::Bulk));
            Ok(redraw())
        }

        Action::ApplyColor { color } => match store.take_pending_color() {
            Some(Target::Habit(habit_id)) => {
                if let Some(habit) = store.find_mut(&habit_id) {
                    habit.set_color(color);
                }
                Ok(changed())
            }
            Some(Target::Bulk) => {
                let selected = store.selected().clone();
                for id in &selected {
                    if let Some(habit) = store.find_mut(id) {
                        habit.set_color(color);
                    }
                }
                Ok(changed())
            }
            None => Ok(Vec::new()),
        },

        Action::CancelColor => {
            store.set_pending_color(None);
            Ok(redraw())
        }

        Action::DragStart { habit_id } => {
            if store.select_mode() {
                debug!(habit = %habit_id, "drag refused in select mode");
                return Ok(Vec::new());
            }
            require_habit(store, &habit_id)?;
            let order = store.ids();
            store.set_drag(Some(DragState { habit_id, order }));
            Ok(redraw())
        }

        Action::DragOver { pointer_y, siblings } => {
            let Some(drag) = store.drag_mut() else {
                return Ok(Vec::new());
            };

            let dragged = drag.habit_id.clone();
            let target = drop_target(pointer_y, &dragged, &siblings);

            drag.order.retain(|id| id != &dragged);
            match target.and_then(|t| drag.order.iter().position(|id| *id == t)) {
                Some(index) => drag.order.insert(index, dragged),
                None => drag.order.push(dragged),
            }
            Ok(redraw())
        }

        Action::Drop => match store.drag().cloned() {
            Some(drag) => {
                store.reorder(&drag.order);
                store.set_drag(None);
                Ok(changed())
            }
            None => Ok(Vec::new()),
        },

        Action::DragEnd => {
            if store.drag().is_none() {
                return Ok(Vec::new());
            }
            store.set_drag(None);
            Ok(redraw())
        }

        Action::ToggleSelectMode => {
            let entering = !store.select_mode();
            store.set_select_mode(entering);
            store.clear_selection();
            store.set_drag(None);
            if !entering {
                if store.pending_delete() == Some(&Target::Bulk) {
                    store.set_pending_delete(None);
                }
                if store.pending_color() == Some(&Target::Bulk) {
                    store.set_pending_color(None);
                }
            }
            Ok(redraw())
        }

        Action::ToggleSelected { habit_id } => {
            require_select_mode(store, "Selecting habits")?;
            require_habit(store, &habit_id)?;
            if store.is_selected(&habit_id) {
                store.deselect(&habit_id);
            } else {
                store.select(habit_id);
            }
            Ok(redraw())
        }

        Action::SelectAll => {
            require_select_mode(store, "Select all")?;
            store.clear_selection();
            for id in store.ids() {
                store.select(id);
            }
            Ok(redraw())
        }

        Action::UnselectAll => {
            require_select_mode(store, "Unselect all")?;
            store.clear_selection();
            Ok(redraw())
        }

        Action::SetViewMode { mode } => {
            store.set_view_mode(mode);
            Ok(redraw())
        }

        Action::ToggleViewMode => {
            store.set_view_mode(store.view_mode().toggled());
            Ok(redraw())
        }

        Action::OpenContextMenu { habit_id, anchor } => {
            require_habit(store, &habit_id)?;
            store.set_context_menu(Some(ContextMenu { habit_id, anchor }));
            Ok(redraw())
        }

        Action::ChooseMenuItem { item } => {
            let Some(menu) = store.take_context_menu() else {
                return Ok(Vec::new());
            };
            let habit_id = menu.habit_id;

            match item {
                MenuItem::Edit => reduce(store, Action::BeginRename { habit_id }, rng),
                MenuItem::Delete => reduce(store, Action::RequestDelete { habit_id }, rng),
                MenuItem::Recolor => reduce(store, Action::RequestRecolor { habit_id }, rng),
                MenuItem::Select => {
                    require_habit(store, &habit_id)?;
                    if !store.select_mode() {
                        store.set_select_mode(true);
                        store.clear_selection();
                        store.set_drag(None);
                    }
                    store.select(habit_id);
                    Ok(redraw())
                }
            }
        }

        Action::DismissContextMenu => {
            if store.take_context_menu().is_some() {
                Ok(redraw())
            } else {
                Ok(Vec::new())
            }
        }

        Action::ConfirmImport => match store.take_pending_import() {
            Some(habits) => Ok(apply_import(store, habits)),
            None => Ok(Vec::new()),
        },

        Action::CancelImport => {
            store.set_pending_import(None);
            Ok(redraw())
        }
    }
}
