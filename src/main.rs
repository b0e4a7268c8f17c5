use clap::Parser;
use hub_search::cli::{Cli, Commands};
use hub_search::clock::SystemClock;
use hub_search::handlers::{handle_search, handle_sections, handle_stats};
use hub_search::server::{self, AppState};
use hub_search::source::MarkdownSource;
use hub_search::types::QueryRequest;
use serde::Serialize;
use std::sync::Arc;

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    hub_search::tracing::init();

    let cli = Cli::parse();
    let source = MarkdownSource::new(cli.docs_root());
    tracing::debug!("Using docs root {}", source.root().display());

    let state = AppState::new(Arc::new(source), Arc::new(SystemClock));

    match cli.command {
        Commands::Serve { bind } => {
            tracing::info!("Starting hub-search server");
            server::serve(state, bind).await.inspect_err(|e| {
                tracing::error!("Error serving search API: {:?}", e);
            })?;
        }
        Commands::Search(args) => {
            let mut request = QueryRequest::new(args.query)
                .with_limit(args.limit)
                .with_min_score(args.min_score);
            if let Some(section) = args.section {
                request = request.with_section(section);
            }
            request.suggestions_only = args.suggestions;
            print_json(&handle_search(&state, &request).await?)?;
        }
        Commands::Sections => print_json(&handle_sections(&state).await?)?,
        Commands::Stats => print_json(&handle_stats(&state).await?)?,
    }

    Ok(())
}
