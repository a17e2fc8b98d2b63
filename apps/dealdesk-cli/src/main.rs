//! dealdesk - category tree console
//!
//! Browse the shop's category tree, look up discounted products for a
//! category, and manage a user's saved categories from the terminal.

mod commands;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use dealdesk_client::ClientConfig;

#[derive(Parser, Debug)]
#[command(name = "dealdesk", version, about = "Category tree console for the deals dashboard")]
struct Cli {
    /// Config file (default: $CONFIG_DIR/dealdesk/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// API root, e.g. https://shop.example.com/api
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Bearer token
    #[arg(long, global = true)]
    token: Option<String>,

    /// User whose saved categories are used
    #[arg(long, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the category tree
    Tree {
        /// Load every category flat, as the admin dashboard does
        #[arg(long)]
        admin: bool,
        /// Expand these categories, in order
        #[arg(long = "expand", value_name = "ID")]
        expand: Vec<String>,
        /// Print JSON instead of a text tree
        #[arg(long)]
        json: bool,
    },
    /// List discounted products in a category
    Deals {
        category_id: String,
        #[arg(long = "expand", value_name = "ID")]
        expand: Vec<String>,
    },
    /// Toggle saved categories for the user and save them
    Subscribe {
        /// Flip the selection of these categories
        #[arg(long = "toggle", value_name = "ID")]
        toggle: Vec<String>,
        /// Expand these categories first so nested ones can be toggled
        #[arg(long = "expand", value_name = "ID")]
        expand: Vec<String>,
    },
}

impl Cli {
    fn config(&self) -> Result<ClientConfig, Box<dyn std::error::Error>> {
        let mut config = ClientConfig::load(self.config.as_deref())?;
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(token) = &self.token {
            config.token = Some(token.clone());
        }
        if let Some(user) = &self.user {
            config.user_id = Some(user.clone());
        }
        Ok(config)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.config() {
        Ok(config) => commands::run(cli.command, config).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
