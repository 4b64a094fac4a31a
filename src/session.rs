/// A running board: the store, where it is saved, and the dice for colors
///
/// `Session` is the single owner of application state. Every event goes
/// through `dispatch`, which runs the reducer and then carries out its
/// effects: the collection is written after every change, and the board
/// is rebuilt for the caller.

use std::path::{Path, PathBuf};

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::{dates, DomainError, Habit};
use crate::render::{render, BoardView};
use crate::state::{self, Action, Effect, HabitStore};
use crate::storage::{load_or_seed, HabitStorage, StorageError};
use crate::transfer::{self, ExportDocument, TransferError};

/// What the caller gets back after an event
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchOutcome {
    pub effects: Vec<Effect>,
    /// Messages for the user, e.g. after an import
    pub notices: Vec<String>,
    /// Set when the change could not be written out; memory still has it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_warning: Option<String>,
    pub board: BoardView,
}

pub struct Session {
    store: HabitStore,
    storage: Box<dyn HabitStorage + Send>,
    rng: StdRng,
}

impl Session {
    /// Load the saved board, seeding the example habit on first run
    pub fn new(storage: Box<dyn HabitStorage + Send>) -> Result<Self, StorageError> {
        Self::with_rng(storage, StdRng::from_entropy())
    }

    pub fn with_rng(storage: Box<dyn HabitStorage + Send>, rng: StdRng) -> Result<Self, StorageError> {
        let habits = load_or_seed(storage.as_ref())?;
        Ok(Self {
            store: HabitStore::with_habits(habits),
            storage,
            rng,
        })
    }

    pub fn store(&self) -> &HabitStore {
        &self.store
    }

    pub fn habits(&self) -> &[Habit] {
        self.store.habits()
    }

    pub fn location(&self) -> String {
        self.storage.location()
    }

    /// The board as of `today`
    pub fn view(&self, today: chrono::NaiveDate) -> BoardView {
        render(&self.store, today)
    }

    pub fn board(&self) -> BoardView {
        self.view(dates::today())
    }

    /// Handle one user event
    pub fn dispatch(&mut self, action: Action) -> Result<DispatchOutcome, DomainError> {
        let effects = state::reduce(&mut self.store, action, &mut self.rng)?;
        Ok(self.apply(effects))
    }

    /// Offer imported habits; asks for confirmation if the board is not empty
    pub fn stage_import(&mut self, habits: Vec<Habit>) -> DispatchOutcome {
        let effects = state::stage_import(&mut self.store, habits);
        self.apply(effects)
    }

    pub fn export_document(&self) -> ExportDocument {
        transfer::export_document(self.store.habits(), Utc::now())
    }

    /// Write a dated backup file into `dir`
    pub fn write_backup(&self, dir: &Path) -> Result<PathBuf, TransferError> {
        transfer::write_backup(dir, self.store.habits())
    }

    fn apply(&mut self, effects: Vec<Effect>) -> DispatchOutcome {
        let mut notices = Vec::new();
        let mut save_warning = None;

        for effect in &effects {
            match effect {
                Effect::Persist => {
                    if let Err(e) = self.storage.save(self.store.habits()) {
                        warn!("Failed to save habits to {}: {}", self.storage.location(), e);
                        save_warning = Some(format!("Changes could not be saved: {}", e));
                    }
                }
                Effect::Notify(message) => notices.push(message.clone()),
                Effect::Render => {}
            }
        }

        debug!(effects = effects.len(), "applied effects");
        DispatchOutcome {
            board: self.board(),
            effects,
            notices,
            save_warning,
        }
    }
}
