//! cardbinder - a terminal client for a card-collection service.
//!
//! Provides a small command shell over the collection backend: log in,
//! search cards, browse your collection and decks. Session state is
//! persisted so an authenticated session survives restarts.

mod api;
mod app;
mod auth;
mod config;
mod models;
mod router;

use std::io::{self, Write};

use anyhow::Result;
use serde_json::{json, Value};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use api::ApiError;
use app::App;
use auth::CredentialStore;
use router::Route;

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Set up logging with environment-based filter
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();
    info!("cardbinder starting");

    let mut app = App::new()?;

    println!("cardbinder - card collection client");
    println!("Backend: {}", app.config.base_url());
    if let Some(user) = app.session.user() {
        println!("Welcome back, {}.", user.username);
    }
    print_location(&app);
    println!("Type 'help' for commands.");

    run_shell(&mut app).await?;

    info!("cardbinder shutting down");
    Ok(())
}

async fn run_shell(app: &mut App) -> Result<()> {
    loop {
        print!("{}> ", app.current_route.path());
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            // EOF
            return Ok(());
        }

        let line = line.trim();
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd, rest.trim()),
            None => (line, ""),
        };

        match command {
            "" => {}
            "quit" | "exit" => return Ok(()),
            "help" => print_help(),
            "login" => {
                if let Err(e) = login_flow(app).await {
                    println!("{}", login_failure_message(&e));
                }
            }
            "register" => {
                if let Err(e) = register_flow(app).await {
                    println!("Registration failed: {}", e);
                }
            }
            "logout" => {
                app.logout();
                println!("Logged out.");
            }
            "whoami" => match app.session.user() {
                Some(user) => println!("{} (id {})", user.username, user.id),
                None => {
                    if app.session.is_authenticated() {
                        println!("Authenticated (identity not loaded).");
                    } else {
                        println!("Not logged in.");
                    }
                }
            },
            "go" => match Route::from_path(rest) {
                Some(route) => {
                    let landed = app.navigate(route);
                    if landed != route {
                        println!("Login required for {}.", route.path());
                    }
                    print_location(app);
                }
                None => println!("Unknown destination: {}", rest),
            },
            "search" => {
                if rest.is_empty() {
                    println!("Usage: search <card name>");
                } else if let Err(e) = search(app, rest).await {
                    println!("Search failed: {}", e);
                }
            }
            "collection" => {
                if app.navigate(Route::Collection) == Route::Collection {
                    if let Err(e) = show_collection(app).await {
                        println!("Could not load collection: {}", e);
                    }
                } else {
                    println!("Login required.");
                }
            }
            "add" => {
                if rest.is_empty() {
                    println!("Usage: add <scryfall-id> [quantity]");
                } else if app.navigate(Route::Collection) == Route::Collection {
                    if let Err(e) = add_card(app, rest).await {
                        println!("Could not add card: {}", e);
                    }
                } else {
                    println!("Login required.");
                }
            }
            "decks" => {
                if app.navigate(Route::Decks) == Route::Decks {
                    if let Err(e) = show_decks(app).await {
                        println!("Could not load decks: {}", e);
                    }
                } else {
                    println!("Login required.");
                }
            }
            "newdeck" => {
                if rest.is_empty() {
                    println!("Usage: newdeck <name>");
                } else if app.navigate(Route::Decks) == Route::Decks {
                    match app.api.create_deck(&json!({ "name": rest })).await {
                        Ok(deck) => println!("Created deck '{}'.", text(&deck, "/name")),
                        Err(e) => println!("Could not create deck: {}", e),
                    }
                } else {
                    println!("Login required.");
                }
            }
            other => println!("Unknown command: {} (try 'help')", other),
        }

        // An API call above may have hit an authorization failure; the
        // redirect is applied here, outside any guard evaluation.
        if app.apply_forced_redirect() {
            println!("Session expired. Please log in again.");
            print_location(app);
        }
    }
}

fn print_help() {
    println!("Commands:");
    println!("  login                log in to the collection service");
    println!("  register             create an account");
    println!("  logout               end the current session");
    println!("  whoami               show the logged-in user");
    println!("  go <path>            navigate (/, /login, /register, /collection, /decks)");
    println!("  search <name>        search card definitions by name");
    println!("  collection           list your collection");
    println!("  add <id> [qty]       add a card to your collection by scryfall id");
    println!("  decks                list your decks");
    println!("  newdeck <name>       create a deck");
    println!("  quit                 exit");
}

fn print_location(app: &App) {
    println!("[{}] {}", app.current_route.path(), app.current_route.title());
}

// =============================================================================
// Authentication prompts
// =============================================================================

async fn login_flow(app: &mut App) -> Result<()> {
    let username = prompt_username(app.config.last_username.as_deref())?;

    let password = if CredentialStore::has_credentials(&username) {
        print!("Use stored password? [Y/n]: ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        if input.trim().to_lowercase() != "n" {
            CredentialStore::get_password(&username)?
        } else {
            rpassword::prompt_password("Password: ")?
        }
    } else {
        rpassword::prompt_password("Password: ")?
    };

    println!("Authenticating...");
    app.login(&username, &password).await?;

    if let Some(user) = app.session.user() {
        println!("Logged in as {}.", user.username);
    } else {
        println!("Logged in.");
    }
    print_location(app);
    Ok(())
}

async fn register_flow(app: &mut App) -> Result<()> {
    let username = prompt_username(None)?;

    print!("Email (optional): ");
    io::stdout().flush()?;
    let mut email = String::new();
    io::stdin().read_line(&mut email)?;
    let email = email.trim();

    let password = rpassword::prompt_password("Password: ")?;

    let new_user = models::NewUser {
        username,
        email: if email.is_empty() {
            None
        } else {
            Some(email.to_string())
        },
        password,
    };

    let user = app.api.register(&new_user).await?;
    println!("Account '{}' created. You can log in now.", user.username);
    Ok(())
}

fn prompt_username(default: Option<&str>) -> Result<String> {
    match default {
        Some(last_user) => {
            print!("Username [{}]: ", last_user);
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;
            let input = input.trim();

            if input.is_empty() {
                Ok(last_user.to_string())
            } else {
                Ok(input.to_string())
            }
        }
        None => {
            print!("Username: ");
            io::stdout().flush()?;

            let mut username = String::new();
            io::stdin().read_line(&mut username)?;
            Ok(username.trim().to_string())
        }
    }
}

/// User-facing message for a failed login attempt
fn login_failure_message(e: &anyhow::Error) -> String {
    if let Some(api_err) = e.downcast_ref::<ApiError>() {
        if api_err.is_unauthorized() {
            return "Invalid username or password".to_string();
        }
    }
    if e.downcast_ref::<reqwest::Error>().is_some() {
        return "Unable to connect to server. Check your internet connection.".to_string();
    }
    format!("Login failed: {}", e)
}

// =============================================================================
// View output
// =============================================================================

async fn search(app: &App, name: &str) -> Result<()> {
    let cards = app.api.search_cards(name).await?;
    if cards.is_empty() {
        println!("No cards found.");
        return Ok(());
    }
    for card in &cards {
        println!(
            "  {} [{} {}]  {}",
            text(card, "/name"),
            text(card, "/set_code"),
            text(card, "/collector_number"),
            text(card, "/type_line"),
        );
    }
    println!("{} card(s).", cards.len());
    Ok(())
}

async fn show_collection(app: &App) -> Result<()> {
    let entries = app.api.collection().await?;
    if entries.is_empty() {
        println!("Your collection is empty.");
        return Ok(());
    }
    for entry in &entries {
        let normal = entry.pointer("/quantity_normal").and_then(Value::as_i64).unwrap_or(0);
        let foil = entry.pointer("/quantity_foil").and_then(Value::as_i64).unwrap_or(0);
        println!(
            "  {}x {}{}",
            normal + foil,
            text(entry, "/card_definition/name"),
            if foil > 0 { " (foil)" } else { "" },
        );
    }
    println!("{} entries.", entries.len());
    Ok(())
}

async fn add_card(app: &App, args: &str) -> Result<()> {
    let mut parts = args.split_whitespace();
    let scryfall_id = parts.next().unwrap_or_default();
    let quantity: i64 = parts.next().and_then(|q| q.parse().ok()).unwrap_or(1);

    let entry = app
        .api
        .add_to_collection(&json!({
            "card_definition_scryfall_id": scryfall_id,
            "quantity_normal": quantity,
        }))
        .await?;

    println!(
        "Added {}x {}.",
        quantity,
        text(&entry, "/card_definition/name"),
    );
    Ok(())
}

async fn show_decks(app: &App) -> Result<()> {
    let decks = app.decks_overview().await?;
    if decks.is_empty() {
        println!("No decks yet. Try 'newdeck <name>'.");
        return Ok(());
    }
    for deck in &decks {
        let cards = deck
            .pointer("/entries")
            .and_then(Value::as_array)
            .map(Vec::len)
            .unwrap_or(0);
        println!("  {}  ({} cards)", text(deck, "/name"), cards);
    }
    println!("{} deck(s).", decks.len());
    Ok(())
}

/// Pull a display string out of an opaque payload, "?" when missing
fn text<'a>(value: &'a Value, pointer: &str) -> &'a str {
    value.pointer(pointer).and_then(Value::as_str).unwrap_or("?")
}
