/// Pure projection from the habit store to a displayable board
///
/// `render` rebuilds the whole board on every call. It reads the store and
/// the date it is given and nothing else; persistence is the session's
/// business.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::domain::{dates, ColorTheme, Habit, HabitId, ViewMode};
use crate::render::plural;
use crate::state::{HabitStore, MenuAnchor, MenuItem, Target};

/// One day square or circle on a card
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCell {
    pub date: String,
    /// Short weekday name, e.g. "Mon"
    pub weekday: String,
    pub day_of_month: u32,
    pub completed: bool,
    /// Accent color when completed, `None` for the empty style
    pub fill: Option<&'static str>,
    /// Whether clicking the cell toggles completion
    pub interactive: bool,
}

/// One habit card
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardView {
    pub id: HabitId,
    pub name: String,
    pub color: ColorTheme,
    pub accent: &'static str,
    pub draggable: bool,
    pub dragging: bool,
    pub selected: bool,
    pub editing: bool,
    pub days: Vec<DayCell>,
}

/// A palette entry offered by the color picker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Swatch {
    pub color: ColorTheme,
    pub hex: &'static str,
}

/// The modal currently on screen
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DialogView {
    ConfirmDelete { title: String, message: String },
    ColorPicker { bulk: bool, swatches: Vec<Swatch> },
    ConfirmImport { title: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextMenuView {
    pub habit_id: HabitId,
    pub anchor: Option<MenuAnchor>,
    pub items: Vec<MenuItem>,
}

/// Everything needed to draw the board
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardView {
    pub view_mode: ViewMode,
    pub select_mode: bool,
    /// Bulk delete / recolor bar, shown only in select mode
    pub bulk_actions_visible: bool,
    pub selected_count: usize,
    pub cards: Vec<CardView>,
    pub dialog: Option<DialogView>,
    pub context_menu: Option<ContextMenuView>,
}

fn day_cells(habit: &Habit, days: &[NaiveDate], interactive: bool) -> Vec<DayCell> {
    days.iter()
        .map(|day| {
            let date = dates::format_date(*day);
            let completed = habit.is_completed_on(&date);
            DayCell {
                weekday: day.format("%a").to_string(),
                day_of_month: day.day(),
                completed,
                fill: completed.then(|| habit.color.hex()),
                interactive,
                date,
            }
        })
        .collect()
}

/// Habits in display order: the live drag order while a drag is running
fn display_order(store: &HabitStore) -> Vec<&Habit> {
    match store.drag() {
        Some(drag) => {
            let mut ordered: Vec<&Habit> = drag.order.iter().filter_map(|id| store.find(id)).collect();
            for habit in store.habits() {
                if !drag.order.contains(&habit.id) {
                    ordered.push(habit);
                }
            }
            ordered
        }
        None => store.habits().iter().collect(),
    }
}

fn dialog(store: &HabitStore) -> Option<DialogView> {
    if let Some(incoming) = store.pending_import() {
        let current = store.len();
        return Some(DialogView::ConfirmImport {
            title: "Replace All Habits?".to_string(),
            message: format!(
                "This will replace all your current habits ({} {}) with {} imported {}. Do you want to continue?",
                current,
                plural(current, "habit", "habits"),
                incoming.len(),
                plural(incoming.len(), "habit", "habits"),
            ),
        });
    }

    match store.pending_delete() {
        Some(Target::Habit(id)) => {
            let name = store.find(id).map(|h| h.name.as_str()).unwrap_or_default();
            return Some(DialogView::ConfirmDelete {
                title: "Delete Activity?".to_string(),
                message: format!(
                    "Are you sure you want to delete \"{}\"? This action cannot be undone.",
                    name
                ),
            });
        }
        Some(Target::Bulk) => {
            let count = store.selected().len();
            return Some(DialogView::ConfirmDelete {
                title: "Delete Selected Activities?".to_string(),
                message: format!(
                    "Are you sure you want to delete {} selected {}? This action cannot be undone.",
                    count,
                    plural(count, "activity", "activities")
                ),
            });
        }
        None => {}
    }

    store.pending_color().map(|target| DialogView::ColorPicker {
        bulk: *target == Target::Bulk,
        swatches: ColorTheme::ALL
            .iter()
            .map(|color| Swatch {
                color: *color,
                hex: color.hex(),
            })
            .collect(),
    })
}

/// Build the board for `store` as of `today`
pub fn render(store: &HabitStore, today: NaiveDate) -> BoardView {
    let view_mode = store.view_mode();
    let select_mode = store.select_mode();
    let days = match view_mode {
        ViewMode::Weekly => dates::week_days_from(today),
        ViewMode::Overview => dates::overview_days_from(today),
    };
    let interactive = view_mode == ViewMode::Weekly && !select_mode;
    let dragged = store.drag().map(|d| &d.habit_id);

    let cards = display_order(store)
        .into_iter()
        .map(|habit| CardView {
            id: habit.id.clone(),
            name: habit.name.clone(),
            color: habit.color,
            accent: habit.color.hex(),
            draggable: !select_mode,
            dragging: dragged == Some(&habit.id),
            selected: select_mode && store.is_selected(&habit.id),
            editing: store.editing() == Some(&habit.id),
            days: day_cells(habit, &days, interactive),
        })
        .collect();

    BoardView {
        view_mode,
        select_mode,
        bulk_actions_visible: select_mode,
        selected_count: if select_mode { store.selected().len() } else { 0 },
        cards,
        dialog: dialog(store),
        context_menu: store.context_menu().map(|menu| ContextMenuView {
            habit_id: menu.habit_id.clone(),
            anchor: menu.anchor,
            items: vec![MenuItem::Edit, MenuItem::Select, MenuItem::Delete, MenuItem::Recolor],
        }),
    }
}
