const CREATE_MEMBER_TABLE: &str = "CREATE TABLE IF NOT EXISTS member (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  name TEXT NOT NULL
)";

const CREATE_EXPENSE_TABLE: &str = "CREATE TABLE IF NOT EXISTS expense (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  amount INTEGER NOT NULL,
  payer_id INTEGER NOT NULL,
  description TEXT NOT NULL,
  tip INTEGER,
  required_tip_percentage REAL,
  resolved BOOL NOT NULL DEFAULT FALSE,
  created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
)";

const CREATE_EXPENSE_PARTICIPANT_TABLE: &str = "CREATE TABLE IF NOT EXISTS expense_participant (
  expense_id INTEGER NOT NULL,
  member_id INTEGER NOT NULL,
  position INTEGER NOT NULL,
  UNIQUE(expense_id, member_id)
)";

const CREATE_DEBT_TABLE: &str = "CREATE TABLE IF NOT EXISTS debt (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  amount INTEGER NOT NULL,
  debtor_id INTEGER NOT NULL,
  creditor_id INTEGER NOT NULL,
  expense_id INTEGER NOT NULL,
  resolved BOOL NOT NULL DEFAULT FALSE,
  created_at DATETIME NOT NULL
)";

pub fn create_all_tables(connection: &rusqlite::Connection) -> anyhow::Result<()> {
    connection.execute(CREATE_MEMBER_TABLE, ())?;
    connection.execute(CREATE_EXPENSE_TABLE, ())?;
    connection.execute(CREATE_EXPENSE_PARTICIPANT_TABLE, ())?;
    connection.execute(CREATE_DEBT_TABLE, ())?;
    Ok(())
}
