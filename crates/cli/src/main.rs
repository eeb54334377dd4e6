use std::io::{self, BufReader};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wikinav_core::{build_client, App, CoreConfig, HttpSearchBackend, PageRef, WikipediaApi};

mod session;
mod view;

use session::Session;

#[derive(Parser)]
#[command(name = "wikinav")]
#[command(about = "Search and browse Wikipedia from the terminal")]
struct Cli {
    /// Wrap article text at this many columns
    #[arg(long, default_value_t = 100)]
    width: usize,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search and print the result list
    Search {
        /// Query words
        #[arg(required = true)]
        query: Vec<String>,
    },
    /// Print one article
    Open {
        /// Page id or title
        page: String,
    },
    /// Interactive session (default)
    Browse,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // stdout is the UI; diagnostics go to stderr.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("wikinav_core=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let cfg = CoreConfig::from_lookup(|name| std::env::var(name).ok())?;
    let client = build_client(&cfg)?;
    let search = HttpSearchBackend::from_config(&cfg, client.clone())?;
    let encyclopedia = WikipediaApi::from_config(&cfg, client);
    tracing::debug!(search = %search.endpoint(), api = %cfg.wiki_api_url(), "configured");

    let mut app = App::new(&cfg, Arc::new(search), Arc::new(encyclopedia));

    match cli.command.unwrap_or(Commands::Browse) {
        Commands::Search { query } => {
            let query = query.join(" ");
            match app.submit_search(&query).await {
                Ok(_) => println!(
                    "{}",
                    view::search_status(app.search_state().status(), cli.width)
                ),
                Err(_) => eprintln!("{}", app.message().unwrap_or("Search failed.")),
            }
        }
        Commands::Open { page } => {
            let page: PageRef = page.parse()?;
            match app.open(page).await {
                Ok(_) => {
                    if let Some(article) = app.article_view() {
                        let rendered = view::article(&article, cli.width);
                        println!("{}", rendered.text);
                        if !rendered.links.is_empty() {
                            println!("\n{}", view::link_list(&rendered.links));
                        }
                    }
                }
                Err(_) => eprintln!("{}", app.message().unwrap_or("Could not load article.")),
            }
        }
        Commands::Browse => {
            let stdin = BufReader::new(io::stdin());
            Session::new(&mut app, io::stdout(), cli.width)
                .run(stdin)
                .await?;
        }
    }

    Ok(())
}
