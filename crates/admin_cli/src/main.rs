use std::{error::Error, io::Write, path::Path};

use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{Engine, LegacyMonth};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection, EntityTrait, Set};
use serde::Deserialize;

type AdminResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

mod users {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub username: String,
        pub password: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

#[derive(Parser, Debug)]
#[command(name = "sobra_admin")]
#[command(about = "Admin utilities for Sobra (accounts, legacy month import)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:./sobra.db?mode=rwc")]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Months(Months),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
}

#[derive(Args, Debug)]
struct Months {
    #[command(subcommand)]
    command: MonthsCommand,
}

#[derive(Subcommand, Debug)]
enum MonthsCommand {
    /// Import rows exported from the parallel-array table.
    Import(MonthsImportArgs),
    /// Print the closed months of a user, newest first.
    List(MonthsListArgs),
}

#[derive(Args, Debug)]
struct MonthsImportArgs {
    #[arg(long)]
    owner: String,
    /// JSON file holding one legacy row or an array of them.
    #[arg(long)]
    file: std::path::PathBuf,
}

#[derive(Args, Debug)]
struct MonthsListArgs {
    #[arg(long)]
    owner: String,
    #[arg(long, default_value_t = 12)]
    limit: u64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LegacyFile {
    Many(Vec<LegacyMonth>),
    One(LegacyMonth),
}

fn parse_legacy(raw: &str) -> AdminResult<Vec<LegacyMonth>> {
    Ok(match serde_json::from_str(raw)? {
        LegacyFile::Many(rows) => rows,
        LegacyFile::One(row) => vec![row],
    })
}

fn read_legacy(path: &Path) -> AdminResult<Vec<LegacyMonth>> {
    let raw = std::fs::read_to_string(path)?;
    parse_legacy(&raw)
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> AdminResult<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn print_line(out: &mut impl Write, message: &str) -> AdminResult<()> {
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(message)
    )?;
    out.flush()?;
    Ok(())
}

/// Reads a password without echoing it; each key shows as `*`.
fn prompt_password(prompt: &str) -> AdminResult<String> {
    let _raw = RawModeGuard::enter()?;
    let mut out = std::io::stderr();
    print_line(&mut out, prompt)?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                break;
            }
            KeyCode::Backspace if buf.pop().is_some() => {
                execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
            }
            _ => {}
        }
        out.flush()?;
    }

    Ok(buf)
}

fn prompt_new_password() -> AdminResult<String> {
    let mut out = std::io::stderr();
    for _ in 0..3 {
        let first = prompt_password("Password: ")?;
        if first.is_empty() {
            print_line(&mut out, "Password must not be empty.\r\n")?;
            continue;
        }
        if first == prompt_password("Confirm password: ")? {
            return Ok(first);
        }
        print_line(&mut out, "Passwords do not match. Try again.\r\n")?;
    }

    Err("too many attempts".into())
}

async fn connect_db(database_url: &str) -> AdminResult<DatabaseConnection> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

async fn require_user(db: &DatabaseConnection, username: &str) -> AdminResult<()> {
    if users::Entity::find_by_id(username.to_string())
        .one(db)
        .await?
        .is_none()
    {
        return Err(format!("user not found: {username}").into());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> AdminResult<()> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            if users::Entity::find_by_id(args.username.clone())
                .one(&db)
                .await?
                .is_some()
            {
                return Err(format!("user already exists: {}", args.username).into());
            }

            let password = prompt_new_password()?;
            let user = users::ActiveModel {
                username: Set(args.username.clone()),
                password: Set(password),
            };
            users::Entity::insert(user).exec(&db).await?;

            println!("created user: {}", args.username);
        }
        Command::Months(Months {
            command: MonthsCommand::Import(args),
        }) => {
            require_user(&db, &args.owner).await?;
            let rows = read_legacy(&args.file)?;

            let engine = Engine::builder().database(db.clone()).build().await?;
            let mut imported = 0;
            for row in &rows {
                match engine.import_legacy(&args.owner, row).await {
                    Ok(record) => {
                        imported += 1;
                        println!(
                            "imported {} as #{}: received {}, discounts {}, remainder {}",
                            record.month, record.id, record.received, record.discounts, record.remainder
                        );
                    }
                    Err(err) => eprintln!("skipped {}: {err}", row.month),
                }
            }
            println!("imported {imported} of {} rows", rows.len());
        }
        Command::Months(Months {
            command: MonthsCommand::List(args),
        }) => {
            require_user(&db, &args.owner).await?;
            let engine = Engine::builder().database(db.clone()).build().await?;
            for record in engine.list_months(&args.owner, args.limit).await? {
                println!(
                    "#{:<4} {:<22} {:>14} {:>14} {:>14}",
                    record.id,
                    record.month.label_pt_br(),
                    record.received,
                    record.discounts,
                    record.remainder
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_row_file() {
        let rows = parse_legacy(
            r#"{"mes": "2025-09", "valor_recebido": 10, "desconto_descricao": [],
                "desconto_valor": [], "desconto_pago": []}"#,
        )
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].month, "2025-09");
    }

    #[test]
    fn array_file() {
        let rows = parse_legacy(r#"[{"mes": "2025-08"}, {"month": "2025-09"}]"#).unwrap();
        let months: Vec<_> = rows.iter().map(|row| row.month.as_str()).collect();
        assert_eq!(months, vec!["2025-08", "2025-09"]);
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(parse_legacy("not json").is_err());
    }
}
