//! Kilimanjaro CLI
//!
//! Terminal client for a Kilimanjaro dashboard backend:
//! - List plugins and navigation
//! - Render plugin pages and the overview dashboard as text
//! - Trigger manual scans
//! - Show system info

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use futures_util::future::join_all;
use serde_json::Value;
use std::path::PathBuf;
use std::rc::Rc;

use kilimanjaro::api::{fetch_info, trigger_scan, ApiClient, ApiPaths, HttpClient};
use kilimanjaro::config::{generate_default_config, Config, Discovered};
use kilimanjaro::logging::init_logging;
use kilimanjaro::manifest::{navigation, ManifestRegistry, ManifestSet, Route, WidgetConfig};
use kilimanjaro::widgets::{
    builtin, builtin_text_kinds, contain, KindRegistry, SortState, TextOptions, TextWidget,
    FAULT_HEADING, NO_PLUGINS, NO_PLUGINS_HINT,
};
use kilimanjaro::FetchError;

#[derive(Parser)]
#[command(name = "kilimanjaro")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Terminal client for the Kilimanjaro plugin dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Backend URL (overrides config)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Config file (default: standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List loaded plugins in navigation order
    Plugins,

    /// Show backend system info
    Info,

    /// Render the widgets of one plugin page
    Show {
        /// Route path (`/lan-scanner`) or plugin name
        target: String,
        /// Sort tables by this column
        #[arg(short, long)]
        sort: Option<String>,
        /// Sort descending
        #[arg(long, requires = "sort")]
        desc: bool,
        /// Render tables as stacked cards
        #[arg(long)]
        cards: bool,
    },

    /// Render the overview dashboard
    Dashboard,

    /// Trigger a manual scan of a plugin
    Scan {
        /// Plugin name
        name: String,
    },

    /// Print the default config file
    InitConfig {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut discovered = match &cli.config {
        Some(path) => Discovered::explicit(Config::load_with_env(path)?, path),
        None => Config::load_default(),
    };
    if let Some(url) = &cli.api_url {
        discovered.config.api.url = url.clone();
    }
    init_logging(&discovered.config.logging);
    discovered.log();
    let config = discovered.config;

    let client: Rc<dyn ApiClient> = Rc::new(HttpClient::new(
        &config.api.url,
        config.api.request_timeout(),
    )?);
    let paths = ApiPaths::new(&config.api.root);

    match cli.command {
        Commands::InitConfig { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)
                        .with_context(|| format!("Failed to write {:?}", path))?;
                    println!("Wrote default config to {:?}", path);
                }
                None => print!("{}", content),
            }
        }

        Commands::Plugins => {
            let set = load_manifests(&client, &paths).await?;
            if cli.format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(set.as_slice())?);
                return Ok(());
            }

            println!("{:<6} {:<24} {:<20} {}", "Order", "Label", "Route", "Widgets");
            println!("{}", "-".repeat(60));
            for entry in navigation(&set) {
                match set.route(&entry.path) {
                    Route::Plugin(m) => println!(
                        "{:<6} {:<24} {:<20} {}",
                        m.frontend.sidebar_order,
                        entry.label,
                        entry.path,
                        m.frontend.widgets.len()
                    ),
                    _ => println!("{:<6} {:<24} {:<20} -", "-", entry.label, entry.path),
                }
            }
        }

        Commands::Info => {
            let info = fetch_info(client.as_ref(), &paths).await?;
            if cli.format == OutputFormat::Json {
                let object: serde_json::Map<String, Value> = info
                    .into_iter()
                    .map(|(k, v)| (k, Value::String(v)))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&object)?);
                return Ok(());
            }

            let width = info.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
            for (key, value) in info {
                println!("{:<width$}  {}", key, value, width = width);
            }
        }

        Commands::Show {
            target,
            sort,
            desc,
            cards,
        } => {
            let set = load_manifests(&client, &paths).await?;
            let manifest = match set.route(&target) {
                Route::Plugin(m) => m,
                _ => match set.get(&target) {
                    Some(m) => m,
                    None => bail!("No plugin page for {}", target),
                },
            };

            let options = TextOptions {
                sort: sort
                    .map(|key| SortState::by(key, !desc))
                    .unwrap_or_default(),
                cards,
            };

            println!("{}", manifest.display_name);
            if !manifest.description.is_empty() {
                println!("{}", manifest.description);
            }
            let widgets: Vec<&WidgetConfig> = manifest.frontend.widgets.iter().collect();
            render_widgets(&client, &paths, &widgets, &options, cli.format).await?;
        }

        Commands::Dashboard => {
            let set = load_manifests(&client, &paths).await?;
            let kinds = builtin_text_kinds();
            let widgets: Vec<&WidgetConfig> = kinds
                .overview_widgets(&set)
                .into_iter()
                .map(|(_, w)| w)
                .collect();

            if widgets.is_empty() {
                println!("{}", NO_PLUGINS);
                println!("{}", NO_PLUGINS_HINT);
                return Ok(());
            }
            render_widgets(&client, &paths, &widgets, &TextOptions::default(), cli.format).await?;
        }

        Commands::Scan { name } => {
            let set = load_manifests(&client, &paths).await?;
            let Some(manifest) = set.get(&name) else {
                bail!("Unknown plugin: {}", name);
            };
            trigger_scan(client.as_ref(), manifest).await;
            println!("Scan requested for {}", manifest.display_name);
        }
    }

    Ok(())
}

async fn load_manifests(client: &Rc<dyn ApiClient>, paths: &ApiPaths) -> anyhow::Result<Rc<ManifestSet>> {
    let registry = ManifestRegistry::new(Rc::clone(client), paths.clone());
    let set = registry.load().await;

    if let Some(error) = registry.state().error {
        bail!("Failed to load plugins: {}", error);
    }
    Ok(set)
}

async fn render_widgets(
    client: &Rc<dyn ApiClient>,
    paths: &ApiPaths,
    widgets: &[&WidgetConfig],
    options: &TextOptions,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let payloads = join_all(
        widgets
            .iter()
            .map(|w| async move { client.get_json(&paths.data(&w.data_endpoint)).await }),
    )
    .await;

    if format == OutputFormat::Json {
        let object: serde_json::Map<String, Value> = widgets
            .iter()
            .zip(payloads)
            .map(|(w, payload)| {
                let value = payload.unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }));
                (w.widget_id.clone(), value)
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&object)?);
        return Ok(());
    }

    let kinds = builtin_text_kinds();
    for (widget, payload) in widgets.iter().zip(payloads) {
        println!();
        println!("== {} ==", widget.title);
        println!("{}", render_widget(&kinds, widget, payload, options));
    }
    Ok(())
}

fn render_widget(
    kinds: &KindRegistry<dyn TextWidget>,
    widget: &WidgetConfig,
    payload: Result<Value, FetchError>,
    options: &TextOptions,
) -> String {
    let strategy = match kinds.resolve(&widget.widget_type) {
        Ok(strategy) => strategy,
        Err(e) => return e.to_string(),
    };
    let payload = match payload {
        Ok(payload) => payload,
        Err(e) => return format!("Error: {}", e),
    };

    // Only sort tables that declare the column sortable
    let mut options = options.clone();
    let sortable = options.sort.key().map_or(true, |key| {
        widget.widget_type == builtin::TABLE
            && widget.columns().iter().any(|c| c.key == key && c.sortable)
    });
    if !sortable {
        options.sort = SortState::default();
    }

    match contain(|| strategy.render(widget, &payload, &options)) {
        Ok(text) => text,
        Err(fault) => format!("{}\n{}", FAULT_HEADING, fault),
    }
}
