use std::{sync::Arc, time::Duration};

use anyhow::Result;
use clap::Parser;
use explorer_core::{
    view::{Tab, ViewMode},
    ExplorationController, HttpGateway, Projection,
};
use tokio::io::{AsyncBufReadExt, BufReader};

mod config;

#[derive(Parser, Debug)]
#[command(about = "Interactive terminal client for the exploration graph service")]
struct Args {
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Search(String),
    /// Non-merge explore of a result by its list index.
    Open(usize),
    Explore(String),
    /// Merging explore: grow the current graph by one hop.
    Expand(String),
    Crumb(usize),
    Save(Option<String>),
    List,
    Load(usize),
    Delete(usize),
    Mode(ViewMode),
    Collapse,
    Select(String),
    Show,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let index = |rest: &str| -> Result<usize, String> {
        rest.parse::<usize>()
            .map_err(|_| format!("expected an index, got '{rest}'"))
    };
    let text = |rest: &str, what: &str| -> Result<String, String> {
        if rest.is_empty() {
            Err(format!("usage: {what}"))
        } else {
            Ok(rest.to_string())
        }
    };

    match verb {
        "search" => Ok(Command::Search(rest.to_string())),
        "open" => Ok(Command::Open(index(rest)?)),
        "explore" => Ok(Command::Explore(text(rest, "explore <title>")?)),
        "expand" => Ok(Command::Expand(text(rest, "expand <title>")?)),
        "crumb" => Ok(Command::Crumb(index(rest)?)),
        "save" => Ok(Command::Save(if rest.is_empty() {
            None
        } else {
            Some(rest.to_string())
        })),
        "list" => Ok(Command::List),
        "load" => Ok(Command::Load(index(rest)?)),
        "delete" => Ok(Command::Delete(index(rest)?)),
        "mode" => match rest {
            "graph" => Ok(Command::Mode(ViewMode::Graph)),
            "results" => Ok(Command::Mode(ViewMode::SearchResults)),
            other => Err(format!("unknown mode '{other}' (graph|results)")),
        },
        "collapse" => Ok(Command::Collapse),
        "select" => Ok(Command::Select(text(rest, "select <node-id>")?)),
        "show" => Ok(Command::Show),
        "help" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(format!("unknown command '{other}' (try 'help')")),
    }
}

/// Search snippets arrive HTML-bearing; drop the markup for the terminal.
fn strip_tags(snippet: &str) -> String {
    let mut out = String::with_capacity(snippet.len());
    let mut in_tag = false;
    for ch in snippet.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

fn render(projection: &Projection) {
    if !projection.breadcrumbs.is_empty() {
        let trail: Vec<String> = projection
            .breadcrumbs
            .iter()
            .enumerate()
            .map(|(index, crumb)| format!("[{index}] {}", crumb.label()))
            .collect();
        println!("{}", trail.join(" > "));
    }
    if let Some(error) = &projection.error {
        println!("error: {error}");
    }

    if projection.view.tab == Tab::Explorations {
        render_saved(projection);
        return;
    }

    match projection.view.mode {
        ViewMode::SearchResults => {
            if projection.view.results_collapsed {
                println!(
                    "results collapsed ({} hits; 'collapse' to expand)",
                    projection.view.search_results.len()
                );
            } else if projection.view.search_results.is_empty() {
                println!("no results");
            } else {
                for (index, result) in projection.view.search_results.iter().enumerate() {
                    println!("{index:>3}  {}: {}", result.title, strip_tags(&result.snippet));
                }
            }
        }
        ViewMode::Graph => {
            let Some(snapshot) = &projection.graph else {
                println!("no graph yet");
                return;
            };
            println!(
                "graph '{}': {} nodes, {} edges",
                projection.title.as_deref().unwrap_or("?"),
                snapshot.nodes.len(),
                snapshot.edges.len()
            );
            let mut nodes: Vec<_> = snapshot.nodes.iter().collect();
            nodes.sort_by(|a, b| {
                b.centrality
                    .unwrap_or(0.0)
                    .total_cmp(&a.centrality.unwrap_or(0.0))
            });
            for node in nodes.iter().take(10) {
                let marker = if projection.view.selected_node.as_deref() == Some(node.id.as_str())
                {
                    "*"
                } else {
                    " "
                };
                match node.centrality {
                    Some(weight) => println!(" {marker} {}  ({weight:.3})", node.label),
                    None => println!(" {marker} {}", node.label),
                }
            }
            if snapshot.nodes.len() > 10 {
                println!("   … {} more", snapshot.nodes.len() - 10);
            }
        }
    }
}

fn render_saved(projection: &Projection) {
    if projection.saved.is_empty() {
        println!("no saved explorations");
        return;
    }
    for (index, record) in projection.saved.iter().enumerate() {
        println!(
            "{index:>3}  {}  ({} nodes, {} edges)",
            record.name,
            record.graph.nodes.len(),
            record.graph.edges.len()
        );
    }
}

fn print_help() {
    println!("commands:");
    println!("  search <term>       search the encyclopedia");
    println!("  open <i>            explore result <i> as a fresh graph");
    println!("  explore <title>     explore <title> as a fresh graph");
    println!("  expand <title>      merge <title>'s neighbors into the graph");
    println!("  crumb <i>           rewind to breadcrumb <i> and replay it");
    println!("  save [name]         persist the graph (default: suggested name)");
    println!("  list / load <i> / delete <i>   saved explorations");
    println!("  mode graph|results  switch view");
    println!("  collapse            toggle the results list");
    println!("  select <node-id>    highlight a node");
    println!("  show                reprint the current view");
    println!("  quit");
}

async fn run_command(
    controller: &ExplorationController,
    command: Command,
) -> Result<Option<Projection>> {
    let projection = match command {
        Command::Search(term) => Some(controller.search(&term).await?),
        Command::Open(index) => {
            let results = controller.projection().await.view.search_results;
            match results.get(index) {
                Some(result) => Some(controller.explore(&result.title, false).await?),
                None => {
                    println!("no search result at index {index}");
                    None
                }
            }
        }
        Command::Explore(title) => Some(controller.explore(&title, false).await?),
        Command::Expand(title) => Some(controller.explore(&title, true).await?),
        Command::Crumb(index) => Some(controller.navigate_breadcrumb(index).await?),
        Command::Save(name) => {
            let name = match name {
                Some(name) => Some(name),
                None => controller.projection().await.suggested_name,
            };
            let name = name.unwrap_or_default();
            let projection = controller.save(&name).await?;
            println!("saved '{name}'");
            Some(projection)
        }
        Command::List => Some(controller.refresh_saved().await?),
        Command::Load(index) => {
            let saved = controller.projection().await.saved;
            match saved.get(index) {
                Some(record) => Some(controller.load_saved(record).await),
                None => {
                    println!("no saved exploration at index {index} (try 'list')");
                    None
                }
            }
        }
        Command::Delete(index) => {
            let saved = controller.projection().await.saved;
            match saved.get(index) {
                Some(record) => Some(controller.delete_saved(&record.id).await?),
                None => {
                    println!("no saved exploration at index {index} (try 'list')");
                    None
                }
            }
        }
        Command::Mode(mode) => Some(controller.set_view_mode(mode).await),
        Command::Collapse => Some(controller.toggle_results_collapsed().await),
        Command::Select(id) => Some(controller.select_node(&id).await),
        Command::Show => Some(controller.projection().await),
        Command::Help => {
            print_help();
            None
        }
        Command::Quit => unreachable!("handled by the loop"),
    };
    Ok(projection)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let mut settings = config::load_settings();
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }
    if let Some(timeout_secs) = args.timeout_secs {
        settings.timeout_secs = timeout_secs;
    }

    let gateway = HttpGateway::new(
        &settings.server_url,
        Duration::from_secs(settings.timeout_secs),
    )?;
    let controller = ExplorationController::new(Arc::new(gateway));

    println!("wikigraph client for {} (type 'help')", settings.server_url);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match parse_command(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => match run_command(&controller, command).await {
                Ok(Some(projection)) => render(&projection),
                Ok(None) => {}
                Err(err) => println!("{err}"),
            },
            Err(message) => println!("{message}"),
        }
    }

    Ok(())
}
