use std::error::Error;

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use engine::{Engine, EngineError, MoneyCents, NewTransactionCmd, User};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use server::ServiceTokens;

mod seed;

type BoxError = Box<dyn Error + Send + Sync>;

#[derive(Parser, Debug)]
#[command(name = "splitease_admin")]
#[command(about = "Admin utilities for SplitEase (users, friends, transactions, tokens)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./splitease.db?mode=rwc"
    )]
    database_url: String,

    /// Secret shared with the server's `sync.secret`.
    #[arg(long, env = "SPLITEASE_SYNC_SECRET", hide_env_values = true)]
    sync_secret: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(UserArgs),
    Friend(FriendArgs),
    Transaction(TransactionArgs),
    /// Load the demo data set.
    Seed,
    Token(TokenArgs),
}

#[derive(Args, Debug)]
struct UserArgs {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    /// Identity provider subject id.
    #[arg(long)]
    id: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    name: String,
    #[arg(long)]
    avatar_url: Option<String>,
}

#[derive(Args, Debug)]
struct FriendArgs {
    #[command(subcommand)]
    command: FriendCommand,
}

#[derive(Subcommand, Debug)]
enum FriendCommand {
    Add(FriendAddArgs),
    List(FriendListArgs),
}

#[derive(Args, Debug)]
struct FriendAddArgs {
    /// Email of the user gaining the friend.
    #[arg(long)]
    user: String,
    /// Email of the friend.
    #[arg(long)]
    friend: String,
    /// Also add the reverse edge.
    #[arg(long)]
    mutual: bool,
}

#[derive(Args, Debug)]
struct FriendListArgs {
    #[arg(long)]
    user: String,
}

#[derive(Args, Debug)]
struct TransactionArgs {
    #[command(subcommand)]
    command: TransactionCommand,
}

#[derive(Subcommand, Debug)]
enum TransactionCommand {
    Create(TransactionCreateArgs),
}

#[derive(Args, Debug)]
struct TransactionCreateArgs {
    /// Email of the owner.
    #[arg(long)]
    owner: String,
    /// Decimal amount, e.g. `12.50`.
    #[arg(long)]
    amount: String,
    #[arg(long)]
    description: String,
    /// `YYYY-MM-DD` or RFC 3339; defaults to now.
    #[arg(long)]
    date: Option<String>,
}

#[derive(Args, Debug)]
struct TokenArgs {
    #[command(subcommand)]
    command: TokenCommand,
}

#[derive(Subcommand, Debug)]
enum TokenCommand {
    /// Mint a service token for `POST /api/auth/sync-user`.
    Sync(TokenSyncArgs),
}

#[derive(Args, Debug)]
struct TokenSyncArgs {
    #[arg(long, default_value = "auth-hook")]
    subject: String,
    #[arg(long, default_value_t = 3600)]
    ttl_secs: i64,
}

async fn connect_db(database_url: &str) -> Result<DatabaseConnection, BoxError> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

async fn connect_engine(database_url: &str) -> Result<Engine, BoxError> {
    let db = connect_db(database_url).await?;
    Ok(Engine::builder().database(db).build().await?)
}

async fn add_edge(engine: &Engine, user: &User, friend: &User) -> Result<(), BoxError> {
    match engine.add_friend(&user.id, &friend.id).await {
        Ok(()) => println!("{} -> {}", user.email, friend.email),
        Err(EngineError::ExistingKey(_)) => {
            println!("{} -> {} (already present)", user.email, friend.email);
        }
        Err(err) => return Err(err.into()),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();

    match cli.command {
        Command::User(UserArgs {
            command: UserCommand::Create(args),
        }) => {
            let engine = connect_engine(&cli.database_url).await?;
            let user = engine
                .create_user(&User {
                    id: args.id,
                    email: args.email,
                    name: args.name,
                    avatar_url: args.avatar_url,
                    google_id: None,
                })
                .await?;
            println!("created user: {} ({})", user.email, user.id);
        }
        Command::Friend(FriendArgs {
            command: FriendCommand::Add(args),
        }) => {
            let engine = connect_engine(&cli.database_url).await?;
            let user = engine.user_by_email(&args.user).await?;
            let friend = engine.user_by_email(&args.friend).await?;
            add_edge(&engine, &user, &friend).await?;
            if args.mutual {
                add_edge(&engine, &friend, &user).await?;
            }
        }
        Command::Friend(FriendArgs {
            command: FriendCommand::List(args),
        }) => {
            let engine = connect_engine(&cli.database_url).await?;
            let user = engine.user_by_email(&args.user).await?;
            for friend in engine.friends(&user.id).await? {
                println!("{}\t{}\t{}", friend.id, friend.name, friend.email);
            }
        }
        Command::Transaction(TransactionArgs {
            command: TransactionCommand::Create(args),
        }) => {
            let amount: MoneyCents = args.amount.parse()?;
            let date = match args.date.as_deref().map(engine::parse_datetime).transpose() {
                Ok(date) => date.unwrap_or_else(Utc::now),
                Err(err) => {
                    eprintln!("{err}");
                    std::process::exit(2);
                }
            };

            let engine = connect_engine(&cli.database_url).await?;
            let owner = engine.user_by_email(&args.owner).await?;
            let id = engine
                .new_transaction(NewTransactionCmd {
                    user_id: owner.id,
                    amount_minor: amount.cents(),
                    description: args.description,
                    date,
                })
                .await?;
            println!("created transaction: {id} ({amount})");
        }
        Command::Seed => {
            let engine = connect_engine(&cli.database_url).await?;
            seed::run(&engine).await?;
        }
        Command::Token(TokenArgs {
            command: TokenCommand::Sync(args),
        }) => {
            let Some(secret) = cli.sync_secret else {
                eprintln!("--sync-secret (or SPLITEASE_SYNC_SECRET) is required");
                std::process::exit(2);
            };
            let token = ServiceTokens::new(&secret)
                .issue(&args.subject, chrono::Duration::seconds(args.ttl_secs))?;
            println!("{token}");
        }
    }

    Ok(())
}
