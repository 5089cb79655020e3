//! Console subcommands and terminal rendering.
//!
//! Commands that reach the content API run a validation pass first and
//! refuse to proceed unauthenticated; the guard has already absorbed any
//! refresh failure into its state by the time we check it.

use clap::Subcommand;
use tracing::error;

use crate::Console;
use crate::api::ApiError;
use crate::fields::{PLACEHOLDER, display_field, display_title, format_date};
use crate::session::decode_claims;
use crate::store::{ACCESS_TOKEN_KEY, TokenStore};

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in and persist the session tokens
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "CONTENTDESK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Clear the local session and revoke the refresh token remotely
    Logout,
    /// Show the current session state
    Status,
    /// About Us content versions
    #[command(subcommand)]
    About(AboutCommand),
    /// Contact information
    #[command(subcommand)]
    Contact(ContactCommand),
    /// Terms & conditions versions
    #[command(subcommand)]
    Terms(TermsCommand),
}

#[derive(Subcommand, Debug)]
pub enum AboutCommand {
    /// List all versions
    List,
    /// Activate a version by id
    Activate { id: String },
}

#[derive(Subcommand, Debug)]
pub enum ContactCommand {
    /// Show the contact record
    Show,
}

#[derive(Subcommand, Debug)]
pub enum TermsCommand {
    /// List all versions
    List,
}

/// Run a console command. Returns the process exit code.
pub async fn run(console: &Console, command: Command) -> i32 {
    match command {
        Command::Login { email, password } => login(console, &email, &password).await,
        Command::Logout => logout(console).await,
        Command::Status => status(console).await,
        Command::About(cmd) => {
            if !require_auth(console).await {
                return 1;
            }
            match cmd {
                AboutCommand::List => report(list_about(console).await),
                AboutCommand::Activate { id } => report(activate_about(console, &id).await),
            }
        }
        Command::Contact(ContactCommand::Show) => {
            if !require_auth(console).await {
                return 1;
            }
            report(show_contact(console).await)
        }
        Command::Terms(TermsCommand::List) => {
            if !require_auth(console).await {
                return 1;
            }
            report(list_terms(console).await)
        }
    }
}

/// Validate the session before an API command.
async fn require_auth(console: &Console) -> bool {
    console.guard.validate_and_refresh().await;
    if console.guard.state().is_authenticated {
        return true;
    }
    error!("Not authenticated. Run `contentdesk login` first");
    false
}

fn report(result: Result<(), ApiError>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            error!(error = %e, "Command failed");
            1
        }
    }
}

async fn login(console: &Console, email: &str, password: &str) -> i32 {
    match console.api.login(email, password).await {
        Ok(()) => {
            console.guard.set_authenticated(true);
            println!("Logged in as {}", email);
            0
        }
        Err(e) => {
            error!(error = %e, "Login failed");
            1
        }
    }
}

async fn logout(console: &Console) -> i32 {
    console.api.revoke_session().await;
    console.guard.logout().await;
    println!("Logged out");
    0
}

async fn status(console: &Console) -> i32 {
    console.guard.validate_and_refresh().await;
    let state = console.guard.state();

    if !state.is_authenticated {
        println!("Session: not authenticated");
        return 0;
    }

    println!("Session: authenticated");
    if let Ok(Some(token)) = console.store.get(ACCESS_TOKEN_KEY).await {
        if let Ok(claims) = decode_claims(&token) {
            println!("Subject:  {}", claims.sub.as_deref().unwrap_or(PLACEHOLDER));
            println!("Expires:  {} (unix)", claims.exp);
        }
    }
    0
}

async fn list_about(console: &Console) -> Result<(), ApiError> {
    let versions = console.api.list_about_versions().await?;

    if versions.is_empty() {
        println!("No about us versions found.");
        return Ok(());
    }

    println!(
        "{:<26} {:<32} {:<8} {}",
        "ID", "TITLE", "ACTIVE", "UPDATED"
    );
    for version in versions {
        println!(
            "{:<26} {:<32} {:<8} {}",
            version.id,
            display_title(version.title.as_ref()),
            if version.is_active { "yes" } else { "no" },
            format_date(version.updated_at.as_deref().or(version.created_at.as_deref())),
        );
    }
    Ok(())
}

async fn activate_about(console: &Console, id: &str) -> Result<(), ApiError> {
    console.api.activate_about_version(id).await?;
    println!("Activated version {}", id);
    Ok(())
}

async fn show_contact(console: &Console) -> Result<(), ApiError> {
    let contact = console.api.get_contact().await?;

    println!("Email:     {}", contact.email.as_deref().unwrap_or(PLACEHOLDER));
    println!("Phone 1:   {}", contact.phone.as_deref().unwrap_or(PLACEHOLDER));
    if let Some(phone) = contact.phone_secondary.as_deref() {
        println!("Phone 2:   {}", phone);
    }
    if let Some(landline) = contact.landline.as_deref() {
        println!("Landline:  {}", landline);
    }
    println!("Address:   {}", display_field(contact.address.as_ref()));
    println!(
        "City:      {}, {}",
        display_field(contact.city.as_ref()),
        display_field(contact.wilaya.as_ref()),
    );
    println!("Website:   {}", contact.website.as_deref().unwrap_or(PLACEHOLDER));
    println!("Hours:     {}", contact.opening_hours.as_deref().unwrap_or(PLACEHOLDER));
    println!(
        "Created:   {}",
        format_date(contact.created_at.as_deref().or(contact.updated_at.as_deref())),
    );
    Ok(())
}

async fn list_terms(console: &Console) -> Result<(), ApiError> {
    let versions = console.api.list_terms_versions().await?;

    if versions.is_empty() {
        println!("No terms & conditions versions found.");
        return Ok(());
    }

    println!(
        "{:<26} {:<32} {:<10} {:<8} {}",
        "ID", "TITLE", "VERSION", "ACTIVE", "CREATED"
    );
    for version in versions {
        println!(
            "{:<26} {:<32} {:<10} {:<8} {}",
            version.id,
            display_title(version.title.as_ref()),
            format!("v{}", version.version.as_deref().unwrap_or("1")),
            if version.is_active { "yes" } else { "no" },
            format_date(version.created_at.as_deref()),
        );
    }
    Ok(())
}
