//! Definition of Telegram bot commands and handlers.

use std::sync::Arc;

use chrono::Utc;
use log::debug;
use teloxide::{
    dispatching::UpdateHandler,
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup},
    utils::command::BotCommands,
};
use tokio::sync::Mutex;

use crate::{
    database::sqlite::SqliteDatabase,
    endpoints::{
        handle_button, handle_calc_debts, handle_cancel, handle_create_debt,
        handle_delete_all_debts, handle_delete_one_debt, handle_input, handle_show_debts,
        handle_solve_all_debts,
    },
    error::BotError,
    types::{Choice, Reply},
    wizard::{DebtWorkflow, ProcessGuard},
};

#[derive(BotCommands, Clone)]
#[command(
    rename_rule = "lowercase",
    description = "Этот бот ведёт учёт долгов общего фонда. Доступные команды:"
)]
enum Command {
    #[command(description = "показать это сообщение.")]
    Help,
    #[command(description = "показать все долги.")]
    Debts,
    #[command(description = "посчитать, кто кому сколько должен.")]
    CalcDebts,
    #[command(description = "отметить все долги погашенными.")]
    SolveDebts,
    #[command(description = "разбить расход на долги участников.")]
    CreateDebt,
    #[command(description = "удалить один долг, выбрав его из списка.")]
    DeleteDebt,
    #[command(description = "удалить все долги.")]
    DeleteAllDebts,
    #[command(description = "отменить текущее действие.")]
    Cancel,
}

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

// The type of database cannot be a parameter of the handler tree, so the one in use
// is fixed here. The dependencies injected in main must match these types.
type DatabaseInUse = Arc<Mutex<SqliteDatabase>>;
type WorkflowInUse = Arc<Mutex<DebtWorkflow>>;
type GuardInUse = Arc<Mutex<ProcessGuard>>;

pub fn dispatch_handler() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    let command_handler = teloxide::filter_command::<Command, _>().endpoint(handle_command);

    let message_handler = Update::filter_message()
        .branch(command_handler)
        .branch(dptree::endpoint(handle_text));

    let callback_handler = Update::filter_callback_query().endpoint(handle_callback);

    dptree::entry()
        .branch(message_handler)
        .branch(callback_handler)
}

async fn handle_command(
    msg: Message,
    bot: Bot,
    cmd: Command,
    database: DatabaseInUse,
    workflow: WorkflowInUse,
    guard: GuardInUse,
) -> HandlerResult {
    let chat_id = msg.chat.id.0;

    let result = match cmd {
        Command::Help => Ok(vec![Reply::text(Command::descriptions().to_string())]),
        Command::Debts => handle_show_debts(&database).await.map(to_replies),
        Command::CalcDebts => handle_calc_debts(&database).await.map(to_replies),
        Command::SolveDebts => handle_solve_all_debts(&database).await.map(to_replies),
        Command::CreateDebt => {
            let mut workflow = workflow.lock().await;
            let mut guard = guard.lock().await;
            handle_create_debt(chat_id, "", &database, &mut workflow, &mut guard, msg.date).await
        }
        Command::DeleteDebt => {
            let mut workflow = workflow.lock().await;
            let mut guard = guard.lock().await;
            handle_delete_one_debt(chat_id, "", &database, &mut workflow, &mut guard).await
        }
        Command::DeleteAllDebts => handle_delete_all_debts(&database).await.map(to_replies),
        Command::Cancel => {
            let mut workflow = workflow.lock().await;
            let mut guard = guard.lock().await;
            Ok(to_replies(handle_cancel(chat_id, &mut workflow, &mut guard)))
        }
    };

    send_result(&bot, msg.chat.id, result).await
}

async fn handle_text(
    msg: Message,
    bot: Bot,
    database: DatabaseInUse,
    workflow: WorkflowInUse,
    guard: GuardInUse,
) -> HandlerResult {
    let text = match msg.text() {
        Some(text) => text,
        None => return Ok(()),
    };

    let result = {
        let mut workflow = workflow.lock().await;
        let mut guard = guard.lock().await;
        handle_input(
            msg.chat.id.0,
            text,
            &database,
            &mut workflow,
            &mut guard,
            msg.date,
        )
        .await
    };
    send_result(&bot, msg.chat.id, result).await
}

async fn handle_callback(
    q: CallbackQuery,
    bot: Bot,
    database: DatabaseInUse,
    workflow: WorkflowInUse,
    guard: GuardInUse,
) -> HandlerResult {
    bot.answer_callback_query(q.id)
        .await
        .map_err(|e| BotError::telegram("cannot answer callback query", e))?;

    let (data, chat_id) = match (q.data, q.message) {
        (Some(data), Some(message)) => (data, message.chat.id),
        _ => return Ok(()),
    };
    debug!("Received callback data '{data}'. Chat ID: {chat_id}");

    let result = {
        let mut workflow = workflow.lock().await;
        let mut guard = guard.lock().await;
        handle_button(
            chat_id.0,
            &data,
            &database,
            &mut workflow,
            &mut guard,
            Utc::now(),
        )
        .await
    };
    send_result(&bot, chat_id, result).await
}

fn to_replies(text: String) -> Vec<Reply> {
    vec![Reply::text(text)]
}

/// Send the replies, or the error message if something went wrong.
async fn send_result(
    bot: &Bot,
    chat_id: ChatId,
    result: Result<Vec<Reply>, BotError>,
) -> HandlerResult {
    match result {
        Ok(replies) => {
            for reply in replies {
                send_reply(bot, chat_id, reply).await?;
            }
            Ok(())
        }
        Err(e) => {
            bot.send_message(chat_id, e.user_message())
                .await
                .map_err(|e| BotError::telegram("cannot send error message", e))?;

            // teloxide default error handler will take care of logging the error.
            Err(e.into())
        }
    }
}

async fn send_reply(bot: &Bot, chat_id: ChatId, reply: Reply) -> Result<(), BotError> {
    let mut request = bot.send_message(chat_id, reply.text);
    if !reply.choices.is_empty() {
        request = request.reply_markup(make_keyboard(&reply.choices));
    }

    request
        .await
        .map_err(|e| BotError::telegram("cannot send reply", e))?;
    Ok(())
}

/// One button per row.
fn make_keyboard(choices: &[Choice]) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(
        choices
            .iter()
            .map(|c| vec![InlineKeyboardButton::callback(c.label.clone(), c.data.clone())]),
    )
}
