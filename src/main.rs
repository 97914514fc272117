//! Markwise: an AI-assisted bookmark library.
//!
//! Command-line entry point. Every command opens the local store, performs one
//! operation, and prints the result on stdout. Logs go to stderr.

use std::error::Error;
use std::sync::Arc;

use chrono::Utc;

use markwise::app::{init_tracing, load_settings, App};
use markwise::managers::add_bookmark_flow::AddBookmarkFlow;
use markwise::managers::bookmark_manager::BookmarkRepositoryTrait;
use markwise::managers::library_view::{
    category_counts, embed_code, is_embed_request, render_detail, render_embed_html, tag_counts,
    TimeWindow,
};
use markwise::platform;
use markwise::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use markwise::types::bookmark::ViewMode;

const USAGE: &str = "\
Usage: markwise <command> [options]

Commands:
  list [--query Q] [--category C] [--tag T] [--recent [DAYS]] [--view grid|list]
  show ID
  analyze URL
  add URL [--title T] [--category C] [--private] [--no-analyze]
  remove ID
  categories
  tags
  embed [--query PAGE_QUERY]
  embed-code PAGE_URL
  config get [KEY] | config set KEY VALUE | config reset";

/// Minimal flag cursor over the arguments after the command name.
struct Args {
    items: Vec<String>,
}

impl Args {
    fn new(items: Vec<String>) -> Self {
        Self { items }
    }

    /// Removes `--name VALUE` and returns VALUE.
    fn option(&mut self, name: &str) -> Result<Option<String>, String> {
        match self.items.iter().position(|a| a == name) {
            None => Ok(None),
            Some(i) if i + 1 < self.items.len() => {
                let value = self.items.remove(i + 1);
                self.items.remove(i);
                Ok(Some(value))
            }
            Some(_) => Err(format!("{} requires a value", name)),
        }
    }

    /// Removes a boolean `--name` flag.
    fn flag(&mut self, name: &str) -> bool {
        match self.items.iter().position(|a| a == name) {
            Some(i) => {
                self.items.remove(i);
                true
            }
            None => false,
        }
    }

    /// Removes `--name [N]`; the number is optional.
    fn optional_number(&mut self, name: &str) -> Result<Option<Option<u32>>, String> {
        let Some(i) = self.items.iter().position(|a| a == name) else {
            return Ok(None);
        };
        self.items.remove(i);
        match self.items.get(i).map(|v| v.parse::<u32>()) {
            Some(Ok(n)) => {
                self.items.remove(i);
                Ok(Some(Some(n)))
            }
            _ => Ok(Some(None)),
        }
    }

    fn positional(&mut self, what: &str) -> Result<String, String> {
        if self.items.is_empty() || self.items[0].starts_with("--") {
            return Err(format!("missing {}", what));
        }
        Ok(self.items.remove(0))
    }

    fn finish(self) -> Result<(), String> {
        match self.items.first() {
            Some(extra) => Err(format!("unexpected argument: {}", extra)),
            None => Ok(()),
        }
    }
}

fn runtime() -> Result<tokio::runtime::Runtime, Box<dyn Error>> {
    Ok(tokio::runtime::Builder::new_current_thread().enable_all().build()?)
}

fn open_app(settings: SettingsEngine) -> Result<App, Box<dyn Error>> {
    let db_path = platform::get_database_path();
    tracing::debug!(path = %db_path.display(), "opening bookmark store");
    App::new(&db_path, settings)
}

fn cmd_list(app: &App, mut args: Args) -> Result<(), Box<dyn Error>> {
    let mut library = app.library()?;
    library.filter.query = args.option("--query")?;
    library.filter.category = args.option("--category")?;
    library.filter.tag = args.option("--tag")?;
    if let Some(days) = args.optional_number("--recent")? {
        let default_days = app.settings_engine.get_settings().library.recent_days;
        library.filter.window = TimeWindow::LastDays(days.unwrap_or(default_days));
    }
    if let Some(view) = args.option("--view")? {
        library.view_mode = view.parse::<ViewMode>()?;
    }
    args.finish()?;
    print!("{}", library.render(Utc::now()));
    Ok(())
}

fn cmd_show(app: &App, mut args: Args) -> Result<(), Box<dyn Error>> {
    let id = args.positional("bookmark id")?;
    args.finish()?;
    let mut library = app.library()?;
    if !library.select(&id) {
        return Err(format!("bookmark not found: {}", id).into());
    }
    if let Some(bookmark) = library.selected() {
        print!("{}", render_detail(bookmark));
    }
    Ok(())
}

fn cmd_analyze(app: &App, mut args: Args) -> Result<(), Box<dyn Error>> {
    let url = args.positional("URL")?;
    args.finish()?;
    let analyzer = Arc::clone(&app.analyzer);
    let mut flow = AddBookmarkFlow::new();
    let form = runtime()?.block_on(flow.analyze(analyzer.as_ref(), &url))?.clone();
    if let Some(notice) = flow.notice() {
        eprintln!("{}", notice);
    }
    println!("{}", serde_json::to_string_pretty(&form)?);
    Ok(())
}

fn cmd_add(app: &App, mut args: Args) -> Result<(), Box<dyn Error>> {
    let title = args.option("--title")?;
    let category = args.option("--category")?;
    let private = args.flag("--private");
    let no_analyze = args.flag("--no-analyze");
    let url = args.positional("URL")?;
    args.finish()?;

    let mut flow = AddBookmarkFlow::new();
    if no_analyze {
        flow.enter_manually(&url)?;
    } else {
        let analyzer = Arc::clone(&app.analyzer);
        runtime()?.block_on(flow.analyze(analyzer.as_ref(), &url))?;
        if let Some(notice) = flow.notice() {
            eprintln!("{}", notice);
        }
    }

    let form = flow.form_mut()?;
    if let Some(title) = title {
        form.title = title;
    }
    if let Some(category) = category {
        form.ai_category = category;
    }
    if private {
        form.is_public = false;
    }

    let bookmark = flow.finish(Utc::now())?;
    app.repository().create(bookmark.clone())?;
    print!("{}", render_detail(&bookmark));
    Ok(())
}

fn cmd_remove(app: &App, mut args: Args) -> Result<(), Box<dyn Error>> {
    let id = args.positional("bookmark id")?;
    args.finish()?;
    let repo = app.repository();
    if repo.get(&id)?.is_none() {
        return Err(format!("bookmark not found: {}", id).into());
    }
    repo.remove(&id)?;
    println!("Removed {}", id);
    Ok(())
}

fn print_counts(counts: Vec<(String, usize)>, prefix: &str) {
    for (name, count) in counts {
        println!("{:>4}  {}{}", count, prefix, name);
    }
}

fn cmd_config(mut settings: SettingsEngine, mut args: Args) -> Result<(), Box<dyn Error>> {
    let action = args.positional("config action")?;
    match action.as_str() {
        "get" => {
            let value = if args.items.is_empty() {
                serde_json::to_value(settings.get_settings())?
            } else {
                settings.get_value(&args.positional("key")?)?
            };
            args.finish()?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        "set" => {
            let key = args.positional("key")?;
            let raw = args.positional("value")?;
            args.finish()?;
            let value = serde_json::from_str(&raw).unwrap_or(serde_json::Value::String(raw));
            settings.set_value(&key, value)?;
            println!("{} updated in {}", key, settings.get_config_path());
        }
        "reset" => {
            args.finish()?;
            settings.reset()?;
            println!("Settings reset in {}", settings.get_config_path());
        }
        other => return Err(format!("unknown config action: {}", other).into()),
    }
    Ok(())
}

fn run(command: &str, args: Args) -> Result<(), Box<dyn Error>> {
    let settings = load_settings(None)?;
    init_tracing(&settings.get_settings().logging.level);

    if command == "config" {
        return cmd_config(settings, args);
    }
    if command == "embed-code" {
        let mut args = args;
        let page_url = args.positional("page URL")?;
        args.finish()?;
        println!("{}", embed_code(&page_url));
        return Ok(());
    }

    let app = open_app(settings)?;
    match command {
        "list" => cmd_list(&app, args),
        "show" => cmd_show(&app, args),
        "analyze" => cmd_analyze(&app, args),
        "add" => cmd_add(&app, args),
        "remove" => cmd_remove(&app, args),
        "categories" => {
            args.finish()?;
            print_counts(category_counts(&app.repository().list()?), "");
            Ok(())
        }
        "tags" => {
            args.finish()?;
            print_counts(tag_counts(&app.repository().list()?), "#");
            Ok(())
        }
        "embed" => {
            let mut args = args;
            let query = args.option("--query")?;
            args.finish()?;
            if let Some(query) = query.filter(|q| !is_embed_request(q)) {
                return Err(format!("embed mode not requested by query: {}", query).into());
            }
            print!("{}", render_embed_html(&app.repository().list()?));
            Ok(())
        }
        other => Err(format!("unknown command: {}\n\n{}", other, USAGE).into()),
    }
}

fn main() {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();
    if argv.is_empty() || matches!(argv[0].as_str(), "-h" | "--help" | "help") {
        println!("{}", USAGE);
        return;
    }
    let command = argv.remove(0);
    if let Err(e) = run(&command, Args::new(argv)) {
        eprintln!("markwise: {}", e);
        std::process::exit(1);
    }
}
