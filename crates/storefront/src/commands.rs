//! Command-line surface.
//!
//! Every user action is an [`Action`]. The binary runs a single action per
//! invocation, or an interactive shell that reads actions line by line and
//! keeps one session (cart store and catalog cache) for its whole lifetime.

use std::io::Write;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

use menu_cart_core::{CartStorage, Category, ItemId, Section};

use crate::catalog::CatalogClient;
use crate::config::StorefrontConfig;
use crate::error::Result;
use crate::render::StdoutWriter;
use crate::session::Session;
use crate::storage::FileStorage;

#[derive(Parser)]
#[command(name = "menu-cart")]
#[command(author, version, about = "Browse the menu and manage your cart")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    #[command(flatten)]
    Action(Action),
    /// Start an interactive session
    Shell,
}

/// A user action on the menu or the cart.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Show the menu (all categories if none given)
    Menu {
        /// soups, drinks, desserts or mainCourses
        category: Option<Category>,
    },
    /// Show the cart
    Cart,
    /// Add an item from the menu to the cart
    Add {
        /// Category the item belongs to
        category: Category,
        /// Item id as shown in the menu
        id: String,
    },
    /// Change the quantity of a cart item (below 1 removes it)
    Set {
        /// Item id as shown in the cart
        id: String,
        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove an item from the cart
    Remove {
        /// Item id as shown in the cart
        id: String,
    },
    /// Empty the cart
    Clear,
    /// Place the order and empty the cart
    Checkout {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Parser)]
#[command(name = "menu-cart", no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand)]
enum ShellCommand {
    #[command(flatten)]
    Action(Action),
    /// Leave the shell
    #[command(alias = "quit")]
    Exit,
}

/// Run the parsed command line against the configured backend and storage.
///
/// # Errors
///
/// Returns `AppError` if the catalog client cannot be built or the action
/// fails.
pub async fn run(cli: Cli, config: &StorefrontConfig) -> Result<()> {
    let catalog = CatalogClient::new(&config.catalog)?;
    let storage = FileStorage::new(config.cart_dir.clone());
    let mut session = Session::open(storage, catalog, StdoutWriter, &config.currency_symbol);
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    match cli.command {
        Command::Action(action) => execute(&mut session, action, &mut input).await,
        Command::Shell => shell(&mut session, &mut input).await,
    }
}

/// Perform one action. `input` is only read for the checkout confirmation.
///
/// # Errors
///
/// Returns `AppError::NotFound` when adding an item missing from the menu and
/// `AppError::Io` if the confirmation cannot be read. Editing an item that is
/// not in the cart only prints a notice.
pub async fn execute<S, W, R>(
    session: &mut Session<S, W>,
    action: Action,
    input: &mut Lines<R>,
) -> Result<()>
where
    S: CartStorage,
    W: Write + Clone + 'static,
    R: AsyncBufRead + Unpin,
{
    match action {
        Action::Menu { category } => session.show_menu(category).await,
        Action::Cart => session.show_cart(),
        Action::Add { category, id } => session.add(category, &ItemId::new(id)).await?,
        Action::Set { id, quantity } => {
            session.set_quantity(&ItemId::new(id), quantity);
        }
        Action::Remove { id } => {
            session.remove(&ItemId::new(id));
        }
        Action::Clear => session.clear(),
        Action::Checkout { yes } => {
            if session.preview_checkout().is_none() {
                session.say("Nothing to check out.\n");
                return Ok(());
            }
            if !yes {
                session.say("Place this order? [y/N] ");
                let answer = input.next_line().await?;
                if !is_yes(answer.as_deref()) {
                    session.say("Checkout cancelled.\n");
                    return Ok(());
                }
            }
            session.place_order();
        }
    }
    Ok(())
}

/// Read and perform actions until `exit` or end of input.
///
/// Lines starting with `#` jump to a section (`#cart`, `#soups`). Failed
/// actions are reported and the shell keeps going.
///
/// # Errors
///
/// Returns `AppError::Io` if reading input fails.
pub async fn shell<S, W, R>(session: &mut Session<S, W>, input: &mut Lines<R>) -> Result<()>
where
    S: CartStorage,
    W: Write + Clone + 'static,
    R: AsyncBufRead + Unpin,
{
    session.say("Type `help` for commands, `#cart` or `#soups` to jump, `exit` to leave.\n");

    loop {
        session.say("> ");
        let Some(line) = input.next_line().await? else {
            break;
        };

        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            continue;
        }

        if line.trim_start().starts_with('#') {
            match Section::from_anchor(&line) {
                Some(section) => session.go_to(section).await,
                None => session.say(&format!("Unknown section {}\n", line.trim())),
            }
            continue;
        }

        match ShellLine::try_parse_from(words) {
            Ok(ShellLine {
                command: ShellCommand::Exit,
            }) => break,
            Ok(ShellLine {
                command: ShellCommand::Action(action),
            }) => {
                if let Err(e) = execute(session, action, input).await {
                    e.report();
                    session.say(&format!("{e}\n"));
                }
            }
            Err(e) => session.say(&e.to_string()),
        }
    }

    session.say("Bye!\n");
    Ok(())
}

fn is_yes(answer: Option<&str>) -> bool {
    matches!(
        answer.map(|a| a.trim().to_ascii_lowercase()).as_deref(),
        Some("y" | "yes")
    )
}
