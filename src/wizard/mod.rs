//! Conversation state kept between two messages of the same chat.
//!
//! A wizard is a command that needs more than one message to complete: the bot
//! asks a question, waits for the answer and moves on to the next question.

use std::collections::{HashMap, HashSet};

use log::info;

mod create;

pub use create::{CreateDebtSession, Step};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Wizard {
    CreateDebt,
    DeleteDebt,
}

/// Bot-wide flag telling whether some wizard is in progress.
///
/// The guard is shared by all chats. It remembers which wizard acquired it, so
/// that the answers to a wizard's own questions are let through while a
/// different wizard is refused.
#[derive(Debug, Default)]
pub struct ProcessGuard {
    active: Option<Wizard>,
}

impl ProcessGuard {
    #[cfg(test)]
    pub fn active(&self) -> Option<Wizard> {
        self.active
    }

    /// Check whether *wizard* must wait because another wizard is in progress.
    pub fn blocks(&self, wizard: Wizard) -> bool {
        matches!(self.active, Some(active) if active != wizard)
    }

    pub fn acquire(&mut self, wizard: Wizard) {
        self.active = Some(wizard);
    }

    pub fn release(&mut self) {
        self.active = None;
    }
}

/// State of the debt wizards of all chats.
#[derive(Debug, Default)]
pub struct DebtWorkflow {
    create_sessions: HashMap<i64, CreateDebtSession>,
    /// Chats waiting for the user to pick the debt to delete.
    delete_sessions: HashSet<i64>,
}

impl DebtWorkflow {
    #[cfg(test)]
    pub fn create_session(&self, chat_id: i64) -> Option<&CreateDebtSession> {
        self.create_sessions.get(&chat_id)
    }

    pub fn create_session_mut(&mut self, chat_id: i64) -> Option<&mut CreateDebtSession> {
        self.create_sessions.get_mut(&chat_id)
    }

    /// Start a new debt creation wizard, replacing any previous one.
    pub fn start_create_session(&mut self, chat_id: i64) {
        info!("Starting debt creation. Chat ID: {chat_id}");
        self.create_sessions.insert(chat_id, CreateDebtSession::default());
    }

    pub fn is_deleting(&self, chat_id: i64) -> bool {
        self.delete_sessions.contains(&chat_id)
    }

    pub fn start_delete_session(&mut self, chat_id: i64) {
        info!("Starting debt deletion. Chat ID: {chat_id}");
        self.delete_sessions.insert(chat_id);
    }

    /// The wizard the given chat is in, if any.
    ///
    /// A chat should never be in both wizards; if it happens, debt creation wins.
    pub fn active_wizard(&self, chat_id: i64) -> Option<Wizard> {
        if self.create_sessions.contains_key(&chat_id) {
            Some(Wizard::CreateDebt)
        } else if self.delete_sessions.contains(&chat_id) {
            Some(Wizard::DeleteDebt)
        } else {
            None
        }
    }

    /// Forget every wizard of the given chat and release the bot-wide guard.
    pub fn delete_states(&mut self, chat_id: i64, guard: &mut ProcessGuard) {
        info!("Resetting debt wizards. Chat ID: {chat_id}");
        self.delete_sessions.remove(&chat_id);
        self.create_sessions.remove(&chat_id);
        guard.release();
    }
}
