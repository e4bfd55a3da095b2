use std::{
    error::Error,
    io::{BufRead, Write},
};

use api_types::party::PartyPayload;
use clap::{Args, Parser, Subcommand, ValueEnum};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    terminal,
};
use engine::{Engine, PartyInput, PartyKind};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection, EntityTrait, Set};
use validator::Validate;

type CliResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

mod users {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub username: String,
        pub password: String,
        pub role: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

#[derive(Parser, Debug)]
#[command(name = "coldstore_admin")]
#[command(about = "Admin utilities for coldstore (bootstrap users and agents)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./coldstore.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Agent(Agent),
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

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "UPPER")]
enum Role {
    Admin,
    User,
}

impl Role {
    fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
        }
    }
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
    #[arg(long, value_enum, default_value_t = Role::User)]
    role: Role,
    /// Read the password from the first line of stdin instead of prompting.
    #[arg(long)]
    password_stdin: bool,
}

#[derive(Args, Debug)]
struct Agent {
    #[command(subcommand)]
    command: AgentCommand,
}

#[derive(Subcommand, Debug)]
enum AgentCommand {
    /// Pre-register an agent so transactions can reference it by phone.
    Create(AgentCreateArgs),
}

#[derive(Args, Debug)]
struct AgentCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    father: String,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    address: Option<String>,
}

/// Applies the same rules the HTTP agent registry does.
fn agent_input(args: AgentCreateArgs) -> Result<PartyInput, String> {
    let payload = PartyPayload {
        name: args.name,
        father: args.father,
        phone: Some(args.phone),
        address: args.address,
    };
    if !payload.has_phone() {
        return Err("phone: is required".to_string());
    }
    payload.validate().map_err(|errors| errors.to_string())?;

    let mut input = PartyInput::new(payload.name, payload.father);
    if let Some(phone) = payload.phone {
        input = input.phone(phone.trim());
    }
    if let Some(address) = payload.address {
        input = input.address(address);
    }
    Ok(input)
}

/// Reads one line without echo. Raw mode is left on every exit path.
fn read_hidden(prompt: &str) -> CliResult<String> {
    eprint!("{prompt}");
    std::io::stderr().flush()?;

    terminal::enable_raw_mode()?;
    let line = read_hidden_keys();
    terminal::disable_raw_mode()?;
    eprintln!();
    line
}

fn read_hidden_keys() -> CliResult<String> {
    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };
        match code {
            KeyCode::Enter => return Ok(buf),
            KeyCode::Backspace => {
                buf.pop();
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) => buf.push(ch),
            _ => {}
        }
    }
}

fn read_password(from_stdin: bool) -> CliResult<String> {
    let password = if from_stdin {
        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line)?;
        line.trim_end_matches(['\r', '\n']).to_string()
    } else {
        let password = read_hidden("Password: ")?;
        if read_hidden("Confirm password: ")? != password {
            return Err("passwords do not match".into());
        }
        password
    };

    if password.is_empty() {
        return Err("password must not be empty".into());
    }
    Ok(password)
}

async fn connect_db(database_url: &str) -> CliResult<DatabaseConnection> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> CliResult<()> {
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
                eprintln!("user already exists: {}", args.username);
                std::process::exit(1);
            }

            let password = read_password(args.password_stdin)?;
            let user = users::ActiveModel {
                username: Set(args.username.clone()),
                password: Set(password),
                role: Set(args.role.as_str().to_string()),
            };
            users::Entity::insert(user).exec(&db).await?;

            println!("created user: {} ({})", args.username, args.role.as_str());
        }
        Command::Agent(Agent {
            command: AgentCommand::Create(args),
        }) => {
            let input = match agent_input(args) {
                Ok(input) => input,
                Err(err) => {
                    eprintln!("{err}");
                    std::process::exit(1);
                }
            };

            let engine = Engine::builder().database(db.clone()).build().await?;
            match engine.new_party(PartyKind::Agent, &input).await {
                Ok(agent) => println!("created agent: {} ({})", agent.name, agent.id),
                Err(err) => {
                    eprintln!("{err}");
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(phone: &str) -> AgentCreateArgs {
        AgentCreateArgs {
            name: "agent1".to_string(),
            father: "agentFather".to_string(),
            phone: phone.to_string(),
            address: None,
        }
    }

    #[test]
    fn agent_phone_is_checked_before_registering() {
        assert_eq!(agent_input(args("  ")).unwrap_err(), "phone: is required");
        assert!(agent_input(args("12345")).unwrap_err().contains("phone"));

        let input = agent_input(args("01712345678")).unwrap();
        assert_eq!(input.normalized_phone(), Some("01712345678"));
    }

    #[test]
    fn agent_name_length_is_checked() {
        let mut short = args("01712345678");
        short.name = "ab".to_string();
        assert!(agent_input(short).unwrap_err().contains("name"));
    }

    #[test]
    fn role_names_match_the_users_table() {
        assert_eq!(Role::Admin.as_str(), "ADMIN");
        assert_eq!(Role::User.as_str(), "USER");
    }
}
