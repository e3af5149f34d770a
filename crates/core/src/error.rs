use thiserror::Error;

use crate::ledger::LedgerError;
use crate::matcher::InputError;
use crate::model::{ItemError, SettingsError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Item(#[from] ItemError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Input(#[from] InputError),
}
