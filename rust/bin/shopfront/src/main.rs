//! `shopfront`: command-line client for the storefront backend.
//!
//! Manages contexts, authentication, resource operations and the
//! order notification feed.

mod commands;
mod config;

use clap::{Parser, Subcommand};
use shopfront_core::PageQuery;

/// Storefront CLI tool.
#[derive(Parser, Debug)]
#[command(name = "shopfront", about = "Storefront CLI client")]
struct Cli {
    /// Path to client config file (default: ~/.shopfront/config.toml).
    #[arg(long = "config", global = true)]
    config: Option<String>,

    /// Output format: table or json.
    #[arg(long = "output", short = 'o', global = true, default_value = "table")]
    output: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage contexts.
    #[command(name = "context")]
    Context {
        #[command(subcommand)]
        action: ContextAction,
    },

    /// Switch the current context.
    #[command(name = "use")]
    Use {
        #[command(subcommand)]
        what: UseWhat,
    },

    /// Login to the current context's server.
    Login {
        /// Account email.
        #[arg(long)]
        email: Option<String>,
        /// Password (prefer the interactive prompt).
        #[arg(long)]
        password: Option<String>,
        /// Store a token from an OAuth redirect instead of logging in.
        #[arg(long, conflicts_with_all = ["email", "password"])]
        token: Option<String>,
    },

    /// Invalidate the session and clear the stored token.
    Logout,

    /// Get resource(s).
    Get {
        /// Resource type (e.g. products, orders, vouchers).
        resource: String,
        /// Optional resource ID for single get.
        id: Option<String>,
        /// Page number (1-based).
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Page size.
        #[arg(long, default_value_t = 10)]
        size: u32,
    },

    /// Create a resource.
    Create {
        resource: String,
        /// JSON body.
        #[arg(long = "json")]
        json_body: Option<String>,
        /// Read JSON from file.
        #[arg(short = 'f', long = "file")]
        file: Option<String>,
    },

    /// Update a resource (PUT).
    Update {
        resource: String,
        id: String,
        /// JSON body.
        #[arg(long = "json")]
        json_body: String,
    },

    /// Delete a resource.
    Delete {
        resource: String,
        id: String,
        /// Skip confirmation.
        #[arg(long = "yes", short = 'y')]
        yes: bool,
    },

    /// Order notifications.
    #[command(name = "notifications", alias = "notif")]
    Notifications {
        #[command(subcommand)]
        action: NotificationAction,
    },

    /// Show version.
    Version,
}

#[derive(Subcommand, Debug)]
enum ContextAction {
    /// Create a new context.
    Create {
        name: String,
        /// Backend URL, e.g. http://localhost:8080.
        #[arg(long)]
        server: String,
        /// Service config TOML with endpoint and timing overrides.
        #[arg(long)]
        service_config: Option<String>,
    },
    /// List all contexts.
    List,
    /// Set properties on a context.
    Set {
        name: String,
        #[arg(long)]
        server: Option<String>,
        #[arg(long)]
        service_config: Option<String>,
    },
    /// Delete a context.
    Delete { name: String },
}

#[derive(Subcommand, Debug)]
enum UseWhat {
    /// Switch to a context.
    Context { name: String },
}

#[derive(Subcommand, Debug)]
enum NotificationAction {
    /// List notifications, newest first.
    List {
        /// Number of pages to load.
        #[arg(long, default_value_t = 1)]
        pages: u32,
        /// Page size (default from service config).
        #[arg(long)]
        size: Option<u32>,
    },
    /// Mark notifications read.
    Read {
        #[arg(required = true)]
        ids: Vec<i64>,
    },
    /// Mark every notification read.
    ReadAll,
    /// Delete notifications.
    Remove {
        #[arg(required = true)]
        ids: Vec<i64>,
    },
    /// Stream new notifications until Ctrl-C.
    Watch {
        /// Subscribe to the administrative topic instead of the user queue.
        #[arg(long)]
        admin: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json_output = cli.output == "json";

    let config_path = cli
        .config
        .map(std::path::PathBuf::from)
        .unwrap_or_else(config::ClientConfig::default_path);

    match cli.command {
        Commands::Context { action } => match action {
            ContextAction::Create {
                name,
                server,
                service_config,
            } => {
                commands::context::create(&name, &server, service_config.as_deref(), &config_path)?;
            }
            ContextAction::List => {
                commands::context::list(&config_path)?;
            }
            ContextAction::Set {
                name,
                server,
                service_config,
            } => {
                commands::context::set(
                    &name,
                    server.as_deref(),
                    service_config.as_deref(),
                    &config_path,
                )?;
            }
            ContextAction::Delete { name } => {
                commands::context::delete(&name, &config_path)?;
            }
        },

        Commands::Use { what } => match what {
            UseWhat::Context { name } => {
                commands::context::use_context(&name, &config_path)?;
            }
        },

        Commands::Login {
            email,
            password,
            token,
        } => {
            if let Some(token) = token {
                commands::login::login_with_token(&token, &config_path)?;
                return Ok(());
            }
            let email = match email {
                Some(email) => email,
                None => {
                    eprint!("Email: ");
                    let mut s = String::new();
                    std::io::stdin().read_line(&mut s)?;
                    s.trim().to_string()
                }
            };
            let password = match password {
                Some(password) => password,
                None => rpassword::prompt_password("Password: ")?,
            };
            if email.is_empty() || password.is_empty() {
                anyhow::bail!("Email and password are required.");
            }
            commands::login::login(&email, &password, &config_path).await?;
        }

        Commands::Logout => {
            commands::login::logout(&config_path).await?;
        }

        Commands::Get {
            resource,
            id,
            page,
            size,
        } => {
            commands::resource::get(
                &resource,
                id.as_deref(),
                PageQuery::new(page, size),
                json_output,
                &config_path,
            )
            .await?;
        }

        Commands::Create {
            resource,
            json_body,
            file,
        } => {
            let body = if let Some(path) = file {
                std::fs::read_to_string(&path)?
            } else if let Some(json) = json_body {
                json
            } else {
                anyhow::bail!("Provide --json or -f <file>.");
            };
            commands::resource::create(&resource, &body, &config_path).await?;
        }

        Commands::Update {
            resource,
            id,
            json_body,
        } => {
            commands::resource::update(&resource, &id, &json_body, &config_path).await?;
        }

        Commands::Delete { resource, id, yes } => {
            if !yes {
                eprint!("Are you sure? [y/N]: ");
                let mut s = String::new();
                std::io::stdin().read_line(&mut s)?;
                if !s.trim().eq_ignore_ascii_case("y") {
                    println!("Cancelled.");
                    return Ok(());
                }
            }
            commands::resource::delete(&resource, &id, &config_path).await?;
        }

        Commands::Notifications { action } => match action {
            NotificationAction::List { pages, size } => {
                commands::notifications::list(pages.max(1), size, json_output, &config_path)
                    .await?;
            }
            NotificationAction::Read { ids } => {
                commands::notifications::mark_read(&ids, &config_path).await?;
            }
            NotificationAction::ReadAll => {
                commands::notifications::mark_all_read(&config_path).await?;
            }
            NotificationAction::Remove { ids } => {
                commands::notifications::remove(&ids, &config_path).await?;
            }
            NotificationAction::Watch { admin } => {
                commands::notifications::watch(admin, &config_path).await?;
            }
        },

        Commands::Version => {
            println!("shopfront cli v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
