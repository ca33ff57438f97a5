use std::{error::Error, io::Write};

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{DepositCmd, Engine, Money, Role, Weight, users};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection, EntityTrait, Set};

#[derive(Parser, Debug)]
#[command(name = "banksampah_admin")]
#[command(about = "Admin utilities for the waste bank (bootstrap logins/members)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./banksampah.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Member(Member),
    WasteType(WasteType),
    Deposit(Deposit),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    /// Create an administrator login.
    CreateAdmin(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
}

#[derive(Args, Debug)]
struct Member {
    #[command(subcommand)]
    command: MemberCommand,
}

#[derive(Subcommand, Debug)]
enum MemberCommand {
    /// Register a member and create their linked login.
    Register(MemberRegisterArgs),
}

#[derive(Args, Debug)]
struct MemberRegisterArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    phone: Option<String>,
    /// Login username; defaults to the issued member number.
    #[arg(long)]
    username: Option<String>,
}

#[derive(Args, Debug)]
struct WasteType {
    #[command(subcommand)]
    command: WasteTypeCommand,
}

#[derive(Subcommand, Debug)]
enum WasteTypeCommand {
    /// Add a catalog entry.
    Add(WasteTypeAddArgs),
}

#[derive(Args, Debug)]
struct WasteTypeAddArgs {
    #[arg(long)]
    name: String,
    /// Purchase price per kilogram, e.g. `25.50`.
    #[arg(long)]
    price: String,
    /// Loyalty points per kilogram.
    #[arg(long, default_value_t = 0)]
    points: i64,
}

#[derive(Args, Debug)]
struct Deposit {
    #[command(subcommand)]
    command: DepositCommand,
}

#[derive(Subcommand, Debug)]
enum DepositCommand {
    /// Record a weighed drop-off for a member.
    Record(DepositRecordArgs),
}

#[derive(Args, Debug)]
struct DepositRecordArgs {
    /// Member number, e.g. `A-0001`.
    #[arg(long)]
    member: String,
    /// Waste type name.
    #[arg(long)]
    waste_type: String,
    /// Weight in kilograms, e.g. `2.5`.
    #[arg(long)]
    weight: String,
    /// Admin username recorded on the deposit.
    #[arg(long)]
    admin: String,
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

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
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

fn prompt_password_twice() -> Result<String, Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    for _ in 0..3 {
        let p1 = prompt_password("Password: ")?;
        if p1.is_empty() {
            execute!(
                out,
                cursor::MoveToColumn(0),
                terminal::Clear(ClearType::CurrentLine),
                Print("Password must not be empty.\r\n")
            )?;
            continue;
        }

        let p2 = prompt_password("Confirm password: ")?;
        if p1 == p2 {
            return Ok(p1);
        }

        execute!(
            out,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine),
            Print("Passwords do not match. Try again.\r\n")
        )?;
    }

    Err("too many attempts".into())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

async fn create_login(
    db: &DatabaseConnection,
    username: &str,
    role: Role,
    member_id: Option<String>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    if users::Entity::find_by_id(username)
        .one(db)
        .await?
        .is_some()
    {
        eprintln!("user already exists: {username}");
        std::process::exit(1);
    }

    let password = prompt_password_twice()?;
    let user = users::ActiveModel {
        username: Set(username.to_string()),
        password: Set(password),
        role: Set(role.as_str().to_string()),
        member_id: Set(member_id),
    };
    users::Entity::insert(user).exec(db).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::CreateAdmin(args),
        }) => {
            create_login(&db, &args.username, Role::Admin, None).await?;
            println!("created admin: {}", args.username);
        }
        Command::Member(Member {
            command: MemberCommand::Register(args),
        }) => {
            let engine = Engine::builder().database(db.clone()).build().await?;
            let member = engine
                .register_member(&args.name, args.phone.as_deref(), Utc::now())
                .await?;

            let username = args.username.unwrap_or_else(|| member.number.clone());
            create_login(&db, &username, Role::Member, Some(member.id.to_string())).await?;

            println!(
                "registered member: {} ({}) with login {username}",
                member.name, member.number
            );
        }
        Command::WasteType(WasteType {
            command: WasteTypeCommand::Add(args),
        }) => {
            let engine = Engine::builder().database(db.clone()).build().await?;
            let price: Money = args.price.parse()?;
            let waste_type = engine
                .create_waste_type(&args.name, price.minor(), args.points)
                .await?;

            println!(
                "added waste type: {} at {}/kg, {} points/kg",
                waste_type.name,
                Money::new(waste_type.price_per_kg_minor),
                waste_type.points_per_kg
            );
        }
        Command::Deposit(Deposit {
            command: DepositCommand::Record(args),
        }) => {
            let engine = Engine::builder().database(db.clone()).build().await?;
            let member = engine.member_by_number(&args.member).await?;
            let waste_type = engine.waste_type_by_name(&args.waste_type).await?;
            let weight: Weight = args.weight.parse()?;

            let deposit = engine
                .record_deposit(DepositCmd::new(
                    member.id,
                    waste_type.id,
                    weight.grams(),
                    args.admin,
                    Utc::now(),
                ))
                .await?;

            println!(
                "recorded {} of {} for {}: {} and {} points",
                Weight::from_grams(deposit.weight_grams),
                waste_type.name,
                member.number,
                Money::new(deposit.total_minor),
                deposit.points_earned
            );
        }
    }

    Ok(())
}
