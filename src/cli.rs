use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hub-search")]
#[command(about = "Fuzzy full-text search over a markdown knowledge hub", long_about = None)]
pub struct Cli {
    /// Root directory of the markdown corpus
    #[arg(short, long, global = true, env = "HUB_SEARCH_DOCS", default_value = "docs")]
    pub docs: String,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Docs root with a leading `~` expanded.
    pub fn docs_root(&self) -> PathBuf {
        PathBuf::from(crate::server::expand_tilde(&self.docs).into_owned())
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP search API
    Serve {
        #[arg(short, long, env = "HUB_SEARCH_BIND", default_value = "127.0.0.1:3000")]
        bind: SocketAddr,
    },
    /// Run one query and print the JSON response
    Search(SearchArgs),
    /// Print the distinct sections of the corpus
    Sections,
    /// Print corpus statistics
    Stats,
}

#[derive(Args)]
pub struct SearchArgs {
    pub query: String,
    #[arg(short = 'n', long, default_value = "10")]
    pub limit: usize,
    #[arg(short, long)]
    pub section: Option<String>,
    #[arg(short = 'm', long = "min-score", default_value = "0")]
    pub min_score: f64,
    /// Print matching titles only
    #[arg(long)]
    pub suggestions: bool,
}
