use teloxide::RequestError;
use thiserror::Error;

/// Error returned to the user.
///
/// `Display` shows the message meant for the chat, while `Debug` carries the
/// full internal message, which ends up in the logs.
#[derive(Error)]
#[error("{user_message}")]
pub struct BotError {
    message: String,
    user_message: String,
}

#[derive(Error, Debug)]
#[error("{message}: {cause}")]
pub struct DatabaseError {
    message: String,
    cause: anyhow::Error,
}

#[derive(Error, Debug, PartialEq)]
pub enum InputError {
    #[error("Введите корректную сумму")]
    InvalidAmount(String),

    #[error("Долг не может быть больше расхода, повторите ввод, пожалуйста")]
    AmountExceedsExpense(f64),
}

/// Error raised while a debt creation wizard processes the user input.
#[derive(Error, Debug, PartialEq)]
pub enum WizardError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("Произошла ошибка составления долга, попробуйте ещё раз")]
    CorruptedSession,
}

impl DatabaseError {
    pub fn new<T: AsRef<str>>(message: T, cause: anyhow::Error) -> Self {
        DatabaseError {
            message: message.as_ref().to_string(),
            cause,
        }
    }
}

impl InputError {
    pub fn invalid_amount(input: &str) -> Self {
        InputError::InvalidAmount(input.to_string())
    }

    pub fn amount_exceeds_expense(amount: f64) -> Self {
        InputError::AmountExceedsExpense(amount)
    }
}

impl BotError {
    /// Wrap a database error, showing the user the given generic message.
    pub fn database(user_message: &str, e: DatabaseError) -> Self {
        BotError {
            message: format!("{user_message}: {e}"),
            user_message: user_message.to_string(),
        }
    }

    pub fn telegram(message: &str, e: RequestError) -> Self {
        let message = format!("{message}: {e}");
        let user_message = "Нет связи с сервером Telegram, попробуйте позже".to_string();
        BotError {
            message,
            user_message,
        }
    }

    pub fn user_message(&self) -> &str {
        &self.user_message
    }
}

impl std::fmt::Debug for BotError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}
