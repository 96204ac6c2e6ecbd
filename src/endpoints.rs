//! Core implementation of bot handlers.
//!
//! This is split from `bot_commands` because these methods are the largest subset
//! of logic that can be tested without mocking Telegram APIs. Every handler
//! returns the replies to send to the chat.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, error, info};
use tokio::sync::Mutex;

use crate::{
    bot_logic::compute_net_debts,
    database::Database,
    error::{BotError, DatabaseError, WizardError},
    formatter::{
        format_debt_choices, format_debt_list, format_debtor_prompt, format_expense_choices,
        format_net_debts, CANCEL_DATA,
    },
    parser::parse_debt_id,
    types::{member_name, Expense, Member, NewDebt, Reply},
    wizard::{CreateDebtSession, DebtWorkflow, ProcessGuard, Step, Wizard},
};

const BUSY_MESSAGE: &str = "Сначала завершите текущий процесс";
const CREATE_DEBT_ERROR: &str = "Произошла ошибка составления долга, попробуйте ещё раз";
const DELETE_DEBT_ERROR: &str = "Ошибка удаления долга, попробуйте ещё раз";

pub async fn handle_show_debts<D: Database>(database: &Arc<Mutex<D>>) -> Result<String, BotError> {
    let members = database.lock().await.get_members().unwrap_or_else(|e| {
        error!("Cannot get members, names will be missing: {e}");
        vec![]
    });

    let debts = database
        .lock()
        .await
        .get_debts()
        .map_err(|e| BotError::database("Ошибка вывода долгов", e))?;

    Ok(format_debt_list(&debts, &members))
}

pub async fn handle_calc_debts<D: Database>(database: &Arc<Mutex<D>>) -> Result<String, BotError> {
    const ERROR: &str = "Ошибка расчета долгов";

    let debts = database
        .lock()
        .await
        .get_debts()
        .map_err(|e| BotError::database(ERROR, e))?;
    let members = database
        .lock()
        .await
        .get_members()
        .map_err(|e| BotError::database(ERROR, e))?;

    if debts.is_empty() {
        return Ok("Нет долгов для расчета.".to_string());
    }

    let net_debts = compute_net_debts(&debts);
    Ok(format_net_debts(&net_debts, &members))
}

pub async fn handle_solve_all_debts<D: Database>(
    database: &Arc<Mutex<D>>,
) -> Result<String, BotError> {
    database
        .lock()
        .await
        .resolve_all_debts()
        .map_err(|e| BotError::database("Ошибка анулирования долгов", e))?;
    Ok("Все долги анулированы".to_string())
}

pub async fn handle_delete_all_debts<D: Database>(
    database: &Arc<Mutex<D>>,
) -> Result<String, BotError> {
    database
        .lock()
        .await
        .delete_all_debts()
        .map_err(|e| BotError::database("Ошибка удаления долгов", e))?;
    Ok("Все долги успешно удалены".to_string())
}

/// Drive the debt creation wizard of the given chat one step forward.
///
/// Without a wizard in progress, a new one is started. Otherwise *input* is the
/// answer to the last question: an expense ID at first, then the amount spent
/// by each debtor.
pub async fn handle_create_debt<D: Database>(
    chat_id: i64,
    input: &str,
    database: &Arc<Mutex<D>>,
    workflow: &mut DebtWorkflow,
    guard: &mut ProcessGuard,
    message_ts: DateTime<Utc>,
) -> Result<Vec<Reply>, BotError> {
    if guard.blocks(Wizard::CreateDebt) {
        return Ok(vec![Reply::text(BUSY_MESSAGE)]);
    }

    let expenses = database
        .lock()
        .await
        .get_unresolved_expenses()
        .map_err(|e| BotError::database(CREATE_DEBT_ERROR, e))?;
    let members = database
        .lock()
        .await
        .get_members()
        .map_err(|e| BotError::database(CREATE_DEBT_ERROR, e))?;

    if expenses.is_empty() {
        return Ok(vec![Reply::text(
            "Пока что нечего расчитывать, сначала создайте расход",
        )]);
    }

    if members.is_empty() {
        return Ok(vec![Reply::text("Нет участников для расчета долгов.")]);
    }

    let session = match workflow.create_session_mut(chat_id) {
        Some(session) => session,
        None => {
            workflow.start_create_session(chat_id);
            guard.acquire(Wizard::CreateDebt);
            return Ok(vec![Reply::with_choices(
                "Выберите, какой расход сейчас посчитаем:",
                format_expense_choices(&expenses),
            )]);
        }
    };

    match session.step() {
        Step::ChoosingExpense => Ok(choose_expense(session, input, &expenses, &members)),
        Step::CollectingAmounts => match session.accept_amount(input) {
            Ok(true) => Ok(prompt_next_debtor(session, &members).into_iter().collect()),
            Ok(false) => {
                let expense_id = session.expense_id();
                let debts = session.debts();

                save_debts(database, &debts, message_ts)
                    .await
                    .map_err(|e| BotError::database(CREATE_DEBT_ERROR, e))?;
                info!(
                    "Saved {} debts for expense {expense_id}. Chat ID: {chat_id}",
                    debts.len()
                );

                let resolved = database.lock().await.resolve_expense(expense_id);
                workflow.delete_states(chat_id, guard);
                resolved.map_err(|e| BotError::database(CREATE_DEBT_ERROR, e))?;

                Ok(vec![Reply::text("Долги успешно сохранены!")])
            }
            Err(WizardError::Input(e)) => {
                debug!("Rejected amount '{input}': {e:?}");
                Ok(vec![Reply::text(e.to_string())])
            }
            Err(e @ WizardError::CorruptedSession) => {
                error!("Debt creation is in an inconsistent state. Chat ID: {chat_id}");
                workflow.delete_states(chat_id, guard);
                Ok(vec![Reply::text(e.to_string())])
            }
        },
    }
}

fn choose_expense(
    session: &mut CreateDebtSession,
    input: &str,
    expenses: &[Expense],
    members: &[Member],
) -> Vec<Reply> {
    let expense = input
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(|id| expenses.iter().find(|e| e.id == id));

    match expense {
        Some(expense) => {
            session.select_expense(expense);
            let mut replies = vec![Reply::text(
                "Можете вводить числа, разделяя их плюсом для автоматического сложения",
            )];
            replies.extend(prompt_next_debtor(session, members));
            replies
        }
        None => vec![Reply::text("Выбранный расход не найден.")],
    }
}

/// Ask how much the next debtor spent.
///
/// Nothing is asked if the debtor is not a known member, but the debtor is
/// still consumed and the next answer is recorded for them.
fn prompt_next_debtor(session: &mut CreateDebtSession, members: &[Member]) -> Option<Reply> {
    let debtor_id = session.next_debtor()?;
    let name = member_name(members, debtor_id);

    if name.is_empty() {
        debug!("Debtor {debtor_id} is not a registered member");
        None
    } else {
        Some(Reply::text(format_debtor_prompt(name)))
    }
}

/// Save the debts one by one.
///
/// There is no transaction: if a debt cannot be saved, the ones before it are kept.
async fn save_debts<D: Database>(
    database: &Arc<Mutex<D>>,
    debts: &[NewDebt],
    created_at: DateTime<Utc>,
) -> Result<(), DatabaseError> {
    for debt in debts {
        database.lock().await.save_debt(debt, created_at)?;
    }
    Ok(())
}

/// Drive the debt deletion wizard of the given chat.
///
/// Without a wizard in progress, the user is asked which debt to delete.
/// Otherwise *input* is the chosen debt ID; the wizard ends in any case, even if
/// the ID is invalid.
pub async fn handle_delete_one_debt<D: Database>(
    chat_id: i64,
    input: &str,
    database: &Arc<Mutex<D>>,
    workflow: &mut DebtWorkflow,
    guard: &mut ProcessGuard,
) -> Result<Vec<Reply>, BotError> {
    if guard.blocks(Wizard::DeleteDebt) {
        return Ok(vec![Reply::text(BUSY_MESSAGE)]);
    }

    let debts = database
        .lock()
        .await
        .get_debts()
        .map_err(|e| BotError::database(DELETE_DEBT_ERROR, e))?;

    if debts.is_empty() {
        return Ok(vec![Reply::text("Нечего удалять")]);
    }

    let members = database
        .lock()
        .await
        .get_members()
        .map_err(|e| BotError::database(DELETE_DEBT_ERROR, e))?;

    if workflow.is_deleting(chat_id) {
        let mut replies = vec![];
        let deleted = match parse_debt_id(input) {
            Some(debt_id) => {
                info!("Deleting debt {debt_id}. Chat ID: {chat_id}");
                database.lock().await.delete_debt(debt_id).map(|_| true)
            }
            None => {
                debug!("Ignoring invalid debt ID '{input}'");
                Ok(false)
            }
        };

        workflow.delete_states(chat_id, guard);

        if deleted.map_err(|e| BotError::database(DELETE_DEBT_ERROR, e))? {
            replies.push(Reply::text("Долг успешно удалён"));
        }
        return Ok(replies);
    }

    workflow.start_delete_session(chat_id);
    guard.acquire(Wizard::DeleteDebt);

    Ok(vec![Reply::with_choices(
        "Выберите какой долг удалить:",
        format_debt_choices(&debts, &members),
    )])
}

pub fn handle_cancel(
    chat_id: i64,
    workflow: &mut DebtWorkflow,
    guard: &mut ProcessGuard,
) -> String {
    if workflow.active_wizard(chat_id).is_none() {
        "Нечего отменять".to_string()
    } else {
        workflow.delete_states(chat_id, guard);
        "Действие отменено".to_string()
    }
}

/// Handle a press on a button of an inline keyboard.
///
/// The cancel button ends the wizard of the chat, any other button is the answer
/// to the wizard's question.
pub async fn handle_button<D: Database>(
    chat_id: i64,
    data: &str,
    database: &Arc<Mutex<D>>,
    workflow: &mut DebtWorkflow,
    guard: &mut ProcessGuard,
    pressed_at: DateTime<Utc>,
) -> Result<Vec<Reply>, BotError> {
    if data == CANCEL_DATA && workflow.active_wizard(chat_id).is_some() {
        return Ok(vec![Reply::text(handle_cancel(chat_id, workflow, guard))]);
    }

    handle_input(chat_id, data, database, workflow, guard, pressed_at).await
}

/// Route a message that is not a command to the wizard the chat is in. Chats
/// without a wizard in progress are ignored.
pub async fn handle_input<D: Database>(
    chat_id: i64,
    input: &str,
    database: &Arc<Mutex<D>>,
    workflow: &mut DebtWorkflow,
    guard: &mut ProcessGuard,
    message_ts: DateTime<Utc>,
) -> Result<Vec<Reply>, BotError> {
    let wizard = match workflow.active_wizard(chat_id) {
        Some(wizard) => wizard,
        None => return Ok(vec![]),
    };

    match wizard {
        Wizard::CreateDebt => {
            handle_create_debt(chat_id, input, database, workflow, guard, message_ts).await
        }
        Wizard::DeleteDebt => {
            handle_delete_one_debt(chat_id, input, database, workflow, guard).await
        }
    }
}

#[cfg(test)]
mod tests {
    use tempdir::TempDir;

    use crate::{
        database::sqlite::SqliteDatabase,
        types::{Choice, NewExpense},
    };

    use super::*;

    const CHAT_ID: i64 = 42;

    struct Fixture {
        // Keeps the database file alive.
        _dir: TempDir,
        database: Arc<Mutex<SqliteDatabase>>,
        workflow: DebtWorkflow,
        guard: ProcessGuard,
    }

    impl Fixture {
        fn new() -> anyhow::Result<Fixture> {
            let dir = TempDir::new("debts")?;
            let database = SqliteDatabase::new(dir.path().join("debts.db"))?;
            Ok(Fixture {
                _dir: dir,
                database: Arc::new(Mutex::new(database)),
                workflow: DebtWorkflow::default(),
                guard: ProcessGuard::default(),
            })
        }

        async fn create_debt(
            &mut self,
            chat_id: i64,
            input: &str,
        ) -> Result<Vec<Reply>, BotError> {
            handle_create_debt(
                chat_id,
                input,
                &self.database,
                &mut self.workflow,
                &mut self.guard,
                Utc::now(),
            )
            .await
        }

        async fn delete_one_debt(
            &mut self,
            chat_id: i64,
            input: &str,
        ) -> Result<Vec<Reply>, BotError> {
            handle_delete_one_debt(
                chat_id,
                input,
                &self.database,
                &mut self.workflow,
                &mut self.guard,
            )
            .await
        }
    }

    /// Members 1 (payer), 2 and 3, and one expense shared by 2 and 3.
    async fn seed(fixture: &Fixture, expense: NewExpense) -> anyhow::Result<i64> {
        let mut database = fixture.database.lock().await;
        database.add_member("Аня")?;
        database.add_member("Боря")?;
        database.add_member("Вова")?;
        Ok(database.add_expense(&expense)?)
    }

    fn texts(replies: &[Reply]) -> Vec<&str> {
        replies.iter().map(|r| r.text.as_str()).collect()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_create_debt_wizard() -> anyhow::Result<()> {
        let mut fixture = Fixture::new()?;
        let expense = NewExpense::new(1000, 1, vec![2, 3], "ужин").with_tip(9);
        let expense_id = seed(&fixture, expense).await?;

        let replies = fixture.create_debt(CHAT_ID, "").await?;
        assert_eq!(replies.len(), 1);
        assert_eq!(
            replies[0].choices,
            vec![
                Choice::new("1000 в ужин", expense_id.to_string()),
                Choice::new("Отмена", CANCEL_DATA)
            ]
        );
        assert_eq!(fixture.guard.active(), Some(Wizard::CreateDebt));
        let session = fixture.workflow.create_session(CHAT_ID).expect("test");
        assert_eq!(session.step(), Step::ChoosingExpense);

        let replies = fixture.create_debt(CHAT_ID, &expense_id.to_string()).await?;
        assert_eq!(
            texts(&replies),
            vec![
                "Можете вводить числа, разделяя их плюсом для автоматического сложения",
                "Сколько наел(а) Вова?"
            ]
        );
        let session = fixture.workflow.create_session(CHAT_ID).expect("test");
        assert_eq!(session.step(), Step::CollectingAmounts);
        assert_eq!(session.current_debtor(), Some(3));
        assert_eq!(session.pending_debtors(), &[2]);

        let replies = fixture.create_debt(CHAT_ID, "abc").await?;
        assert_eq!(texts(&replies), vec!["Введите корректную сумму"]);

        let replies = fixture.create_debt(CHAT_ID, "10+5.5+4.5").await?;
        assert_eq!(texts(&replies), vec!["Сколько наел(а) Боря?"]);

        let replies = fixture.create_debt(CHAT_ID, "2000").await?;
        assert_eq!(
            texts(&replies),
            vec!["Долг не может быть больше расхода, повторите ввод, пожалуйста"]
        );

        let replies = fixture.create_debt(CHAT_ID, "100").await?;
        assert_eq!(texts(&replies), vec!["Долги успешно сохранены!"]);
        assert!(fixture.workflow.create_session(CHAT_ID).is_none());
        assert_eq!(fixture.guard.active(), None);

        let database = fixture.database.lock().await;
        let debts = database.get_debts()?;
        let debts: Vec<_> = debts
            .iter()
            .map(|d| (d.debtor_id, d.creditor_id, d.amount, d.expense_id, d.resolved))
            .collect();
        assert_eq!(
            debts,
            vec![(2, 1, 103, expense_id, false), (3, 1, 23, expense_id, false)]
        );
        assert!(database.get_unresolved_expenses()?.is_empty());
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_create_debt_with_tip_percentage() -> anyhow::Result<()> {
        let mut fixture = Fixture::new()?;
        let expense = NewExpense::new(500, 1, vec![2], "бар").with_required_tip_percentage(10.0);
        let expense_id = seed(&fixture, expense).await?;

        fixture.create_debt(CHAT_ID, "").await?;
        fixture.create_debt(CHAT_ID, &expense_id.to_string()).await?;
        fixture.create_debt(CHAT_ID, "100").await?;

        let debts = fixture.database.lock().await.get_debts()?;
        assert_eq!(debts.len(), 1);
        assert_eq!(debts[0].amount, 110);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_create_debt_unknown_expense_keeps_session() -> anyhow::Result<()> {
        let mut fixture = Fixture::new()?;
        seed(&fixture, NewExpense::new(1000, 1, vec![2, 3], "ужин")).await?;

        fixture.create_debt(CHAT_ID, "").await?;
        let replies = fixture.create_debt(CHAT_ID, "999").await?;

        assert_eq!(texts(&replies), vec!["Выбранный расход не найден."]);
        let session = fixture.workflow.create_session(CHAT_ID).expect("test");
        assert_eq!(session.step(), Step::ChoosingExpense);
        assert_eq!(fixture.guard.active(), Some(Wizard::CreateDebt));
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_create_debt_without_expenses() -> anyhow::Result<()> {
        let mut fixture = Fixture::new()?;
        fixture.database.lock().await.add_member("Аня")?;

        let replies = fixture.create_debt(CHAT_ID, "").await?;

        assert_eq!(
            texts(&replies),
            vec!["Пока что нечего расчитывать, сначала создайте расход"]
        );
        assert!(fixture.workflow.create_session(CHAT_ID).is_none());
        assert_eq!(fixture.guard.active(), None);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_create_debt_blocked_by_other_wizard() -> anyhow::Result<()> {
        let mut fixture = Fixture::new()?;
        seed(&fixture, NewExpense::new(1000, 1, vec![2, 3], "ужин")).await?;
        fixture.guard.acquire(Wizard::DeleteDebt);

        let replies = fixture.create_debt(CHAT_ID, "").await?;

        assert_eq!(texts(&replies), vec![BUSY_MESSAGE]);
        assert!(fixture.workflow.create_session(CHAT_ID).is_none());
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_create_debt_expense_without_participants() -> anyhow::Result<()> {
        let mut fixture = Fixture::new()?;
        let expense_id = seed(&fixture, NewExpense::new(100, 1, vec![], "чаевые")).await?;

        fixture.create_debt(CHAT_ID, "").await?;
        let replies = fixture.create_debt(CHAT_ID, &expense_id.to_string()).await?;
        assert_eq!(
            texts(&replies),
            vec!["Можете вводить числа, разделяя их плюсом для автоматического сложения"]
        );

        let replies = fixture.create_debt(CHAT_ID, "50").await?;

        assert_eq!(texts(&replies), vec!["Долги успешно сохранены!"]);
        assert!(fixture.workflow.create_session(CHAT_ID).is_none());
        assert_eq!(fixture.guard.active(), None);
        let database = fixture.database.lock().await;
        assert!(database.get_debts()?.is_empty());
        assert!(database.get_unresolved_expenses()?.is_empty());
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_delete_debt_blocked_by_other_wizard() -> anyhow::Result<()> {
        let mut fixture = Fixture::new()?;
        seed(&fixture, NewExpense::new(1000, 1, vec![2, 3], "ужин")).await?;
        fixture
            .database
            .lock()
            .await
            .save_debt(&NewDebt::new(100, 2, 1, 1), Utc::now())?;
        fixture.create_debt(CHAT_ID, "").await?;
        let other_chat_id = CHAT_ID + 1;

        for chat_id in [CHAT_ID, other_chat_id] {
            let replies = fixture.delete_one_debt(chat_id, "").await?;

            assert_eq!(texts(&replies), vec![BUSY_MESSAGE]);
            assert!(!fixture.workflow.is_deleting(chat_id));
        }
        assert_eq!(fixture.guard.active(), Some(Wizard::CreateDebt));
        assert_eq!(fixture.database.lock().await.get_debts()?.len(), 1);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_cancel_create_debt() -> anyhow::Result<()> {
        let mut fixture = Fixture::new()?;
        seed(&fixture, NewExpense::new(1000, 1, vec![2, 3], "ужин")).await?;
        fixture.create_debt(CHAT_ID, "").await?;

        let replies = handle_button(
            CHAT_ID,
            CANCEL_DATA,
            &fixture.database,
            &mut fixture.workflow,
            &mut fixture.guard,
            Utc::now(),
        )
        .await?;

        assert_eq!(texts(&replies), vec!["Действие отменено"]);
        assert!(fixture.workflow.create_session(CHAT_ID).is_none());
        assert_eq!(fixture.guard.active(), None);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_typed_cancel_is_an_answer() -> anyhow::Result<()> {
        let mut fixture = Fixture::new()?;
        let expense_id = seed(&fixture, NewExpense::new(1000, 1, vec![2, 3], "ужин")).await?;
        fixture.create_debt(CHAT_ID, "").await?;
        fixture.create_debt(CHAT_ID, &expense_id.to_string()).await?;

        let replies = handle_input(
            CHAT_ID,
            CANCEL_DATA,
            &fixture.database,
            &mut fixture.workflow,
            &mut fixture.guard,
            Utc::now(),
        )
        .await?;

        assert_eq!(texts(&replies), vec!["Введите корректную сумму"]);
        let session = fixture.workflow.create_session(CHAT_ID).expect("test");
        assert_eq!(session.step(), Step::CollectingAmounts);
        assert_eq!(fixture.guard.active(), Some(Wizard::CreateDebt));
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_cancel_button_without_wizard_is_ignored() -> anyhow::Result<()> {
        let mut fixture = Fixture::new()?;

        let replies = handle_button(
            CHAT_ID,
            CANCEL_DATA,
            &fixture.database,
            &mut fixture.workflow,
            &mut fixture.guard,
            Utc::now(),
        )
        .await?;

        assert!(replies.is_empty());
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_input_without_wizard_is_ignored() -> anyhow::Result<()> {
        let mut fixture = Fixture::new()?;

        let replies = handle_input(
            CHAT_ID,
            "hello",
            &fixture.database,
            &mut fixture.workflow,
            &mut fixture.guard,
            Utc::now(),
        )
        .await?;

        assert!(replies.is_empty());
        Ok(())
    }

    async fn seed_debts(fixture: &Fixture) -> anyhow::Result<()> {
        let now = Utc::now();
        let mut database = fixture.database.lock().await;
        database.add_member("Аня")?;
        database.add_member("Боря")?;
        database.save_debt(&NewDebt::new(100, 2, 1, 1), now)?;
        database.save_debt(&NewDebt::new(50, 2, 1, 1), now)?;
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_delete_one_debt() -> anyhow::Result<()> {
        let mut fixture = Fixture::new()?;
        seed_debts(&fixture).await?;

        let replies = fixture.delete_one_debt(CHAT_ID, "").await?;
        assert_eq!(
            replies[0].choices,
            vec![
                Choice::new("Долг 100 Боря для Аня", "1"),
                Choice::new("Долг 50 Боря для Аня", "2")
            ]
        );
        assert!(fixture.workflow.is_deleting(CHAT_ID));
        assert_eq!(fixture.guard.active(), Some(Wizard::DeleteDebt));

        let replies = fixture.delete_one_debt(CHAT_ID, "2").await?;
        assert_eq!(texts(&replies), vec!["Долг успешно удалён"]);
        assert!(!fixture.workflow.is_deleting(CHAT_ID));
        assert_eq!(fixture.guard.active(), None);

        let debts = fixture.database.lock().await.get_debts()?;
        assert_eq!(debts.len(), 1);
        assert_eq!(debts[0].id, 1);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_delete_one_debt_invalid_id() -> anyhow::Result<()> {
        let mut fixture = Fixture::new()?;
        seed_debts(&fixture).await?;

        for input in ["abc", "0"] {
            fixture.delete_one_debt(CHAT_ID, "").await?;
            let replies = fixture.delete_one_debt(CHAT_ID, input).await?;

            assert!(replies.is_empty());
            assert!(!fixture.workflow.is_deleting(CHAT_ID));
            assert_eq!(fixture.guard.active(), None);
        }

        assert_eq!(fixture.database.lock().await.get_debts()?.len(), 2);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_delete_one_debt_nothing_to_delete() -> anyhow::Result<()> {
        let mut fixture = Fixture::new()?;

        let replies = fixture.delete_one_debt(CHAT_ID, "").await?;

        assert_eq!(texts(&replies), vec!["Нечего удалять"]);
        assert!(!fixture.workflow.is_deleting(CHAT_ID));
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_two_chats_share_the_process_guard() -> anyhow::Result<()> {
        let mut fixture = Fixture::new()?;
        seed_debts(&fixture).await?;
        let other_chat_id = CHAT_ID + 1;

        // Both chats pass the guard, since it is held by the same kind of wizard.
        fixture.delete_one_debt(CHAT_ID, "").await?;
        let replies = fixture.delete_one_debt(other_chat_id, "").await?;
        assert_eq!(replies[0].choices.len(), 2);
        assert!(fixture.workflow.is_deleting(CHAT_ID));
        assert!(fixture.workflow.is_deleting(other_chat_id));

        // The first chat to finish releases the guard for everybody.
        fixture.delete_one_debt(CHAT_ID, "1").await?;
        assert_eq!(fixture.guard.active(), None);
        assert!(fixture.workflow.is_deleting(other_chat_id));

        let replies = fixture.delete_one_debt(other_chat_id, "2").await?;
        assert_eq!(texts(&replies), vec!["Долг успешно удалён"]);
        assert!(fixture.database.lock().await.get_debts()?.is_empty());
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_show_and_calc_debts() -> anyhow::Result<()> {
        let fixture = Fixture::new()?;

        assert_eq!(handle_show_debts(&fixture.database).await?, "Долгов пока нет");
        assert_eq!(
            handle_calc_debts(&fixture.database).await?,
            "Нет долгов для расчета."
        );

        seed_debts(&fixture).await?;

        assert_eq!(
            handle_show_debts(&fixture.database).await?,
            "Текущие долги:\n- Боря должен Аня 100, статус: Не погашен ⛔️\n\
             - Боря должен Аня 50, статус: Не погашен ⛔️"
        );
        assert_eq!(
            handle_calc_debts(&fixture.database).await?,
            "Текущие долги между участниками:\n- Боря должен Аня 150\n"
        );

        assert_eq!(
            handle_solve_all_debts(&fixture.database).await?,
            "Все долги анулированы"
        );
        assert_eq!(handle_calc_debts(&fixture.database).await?, "Долгов нет!");
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_delete_all_debts_restarts_ids() -> anyhow::Result<()> {
        let fixture = Fixture::new()?;
        seed_debts(&fixture).await?;

        assert_eq!(
            handle_delete_all_debts(&fixture.database).await?,
            "Все долги успешно удалены"
        );

        let database = fixture.database.lock().await;
        assert!(database.get_debts()?.is_empty());
        let debt_id = database.save_debt(&NewDebt::new(10, 2, 1, 1), Utc::now())?;
        assert_eq!(debt_id, 1);
        Ok(())
    }
}
