/// User actions the interaction controller understands
///
/// Each variant is one discrete UI event. Actions arrive over JSON-RPC as
/// internally tagged objects, e.g. `{"type": "toggleCompletion",
/// "habitId": "habit-1", "date": "2024-01-01"}`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{ColorTheme, HabitId, ViewMode};
use crate::state::MenuAnchor;

/// Vertical extent of a card other than the one being dragged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CardBounds {
    pub habit_id: HabitId,
    pub top: f64,
    pub height: f64,
}

impl CardBounds {
    pub fn midpoint(&self) -> f64 {
        self.top + self.height / 2.0
    }
}

/// Entries of the per-habit context menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum MenuItem {
    Edit,
    Select,
    Delete,
    Recolor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Action {
    /// Flip one day of a habit in the weekly strip
    #[serde(rename_all = "camelCase")]
    ToggleCompletion { habit_id: HabitId, date: String },
    /// Start editing a habit name inline
    #[serde(rename_all = "camelCase")]
    BeginRename { habit_id: HabitId },
    /// Commit an inline edit (blur or Enter)
    #[serde(rename_all = "camelCase")]
    CommitRename { habit_id: HabitId, input: String },
    AddHabit,
    #[serde(rename_all = "camelCase")]
    RequestDelete { habit_id: HabitId },
    RequestBulkDelete,
    ConfirmDelete,
    CancelDelete,
    #[serde(rename_all = "camelCase")]
    RequestRecolor { habit_id: HabitId },
    RequestBulkRecolor,
    ApplyColor { color: ColorTheme },
    CancelColor,
    #[serde(rename_all = "camelCase")]
    DragStart { habit_id: HabitId },
    /// Pointer moved during a drag; `siblings` are the other cards' bounds
    #[serde(rename_all = "camelCase")]
    DragOver { pointer_y: f64, siblings: Vec<CardBounds> },
    Drop,
    DragEnd,
    ToggleSelectMode,
    #[serde(rename_all = "camelCase")]
    ToggleSelected { habit_id: HabitId },
    SelectAll,
    UnselectAll,
    SetViewMode { mode: ViewMode },
    ToggleViewMode,
    #[serde(rename_all = "camelCase")]
    OpenContextMenu {
        habit_id: HabitId,
        #[serde(default)]
        anchor: Option<MenuAnchor>,
    },
    ChooseMenuItem { item: MenuItem },
    /// Any click that lands outside the open context menu
    DismissContextMenu,
    ConfirmImport,
    CancelImport,
}

impl Action {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Action::ToggleCompletion { .. } => "toggle_completion",
            Action::BeginRename { .. } => "begin_rename",
            Action::CommitRename { .. } => "commit_rename",
            Action::AddHabit => "add_habit",
            Action::RequestDelete { .. } => "request_delete",
            Action::RequestBulkDelete => "request_bulk_delete",
            Action::ConfirmDelete => "confirm_delete",
            Action::CancelDelete => "cancel_delete",
            Action::RequestRecolor { .. } => "request_recolor",
            Action::RequestBulkRecolor => "request_bulk_recolor",
            Action::ApplyColor { .. } => "apply_color",
            Action::CancelColor => "cancel_color",
            Action::DragStart { .. } => "drag_start",
            Action::DragOver { .. } => "drag_over",
            Action::Drop => "drop",
            Action::DragEnd => "drag_end",
            Action::ToggleSelectMode => "toggle_select_mode",
            Action::ToggleSelected { .. } => "toggle_selected",
            Action::SelectAll => "select_all",
            Action::UnselectAll => "unselect_all",
            Action::SetViewMode { .. } => "set_view_mode",
            Action::ToggleViewMode => "toggle_view_mode",
            Action::OpenContextMenu { .. } => "open_context_menu",
            Action::ChooseMenuItem { .. } => "choose_menu_item",
            Action::DismissContextMenu => "dismiss_context_menu",
            Action::ConfirmImport => "confirm_import",
            Action::CancelImport => "cancel_import",
        }
    }
}
