use clap::{Args, Parser, Subcommand, ValueEnum};
use screen_scout::{
    CatalogClient, Config, LocalStore, NotificationBus, OmdbClient, ResultAggregator,
    ScreenScoutError, SearchStatus, Title, TitleDetail, Topic, WatchFilter, catalog_client,
};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

/// Search movies and TV shows and keep local favorites and a watchlist
#[derive(Debug, Parser)]
#[command(name = "screen-scout", version, about)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// OMDb API key
    #[arg(long, env = "OMDB_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Directory holding favorites and watchlist
    #[arg(long, env = "SCREEN_SCOUT_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Search the catalog
    Search {
        /// Search term
        term: String,

        /// Number of pages to load
        #[arg(long, default_value_t = 1)]
        pages: u32,

        /// Complete the last row of a grid with this many columns
        #[arg(long)]
        fill_row: Option<usize>,
    },

    /// Show the full details of a title
    Show {
        /// Title id, e.g. tt0372784
        id: String,
    },

    /// Manage favorites
    Favorites(FavoritesArgs),

    /// Manage the watchlist
    Watchlist(WatchlistArgs),
}

#[derive(Debug, Args)]
struct FavoritesArgs {
    #[command(subcommand)]
    action: FavoritesAction,
}

#[derive(Debug, Subcommand)]
enum FavoritesAction {
    /// List favorites
    List,
    /// Add a title to favorites
    Add { id: String },
    /// Remove a title from favorites
    Remove { id: String },
    /// Add the title if absent, remove it otherwise
    Toggle { id: String },
}

#[derive(Debug, Args)]
struct WatchlistArgs {
    #[command(subcommand)]
    action: WatchlistAction,
}

#[derive(Debug, Subcommand)]
enum WatchlistAction {
    /// List watchlist entries
    List {
        #[arg(long, value_enum, default_value_t = FilterArg::All)]
        filter: FilterArg,
    },
    /// Add a title to the watchlist
    Add {
        id: String,
        /// Mark the title as already watched
        #[arg(long)]
        watched: bool,
    },
    /// Remove a title from the watchlist
    Remove { id: String },
    /// Add the title if absent, remove it otherwise
    Toggle { id: String },
    /// Flip the watched flag of a title
    ToggleWatched { id: String },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FilterArg {
    All,
    ToWatch,
    Watched,
}

impl From<FilterArg> for WatchFilter {
    fn from(filter: FilterArg) -> Self {
        match filter {
            FilterArg::All => WatchFilter::All,
            FilterArg::ToWatch => WatchFilter::ToWatch,
            FilterArg::Watched => WatchFilter::Watched,
        }
    }
}

/// Sets up stderr logging; `RUST_LOG` takes precedence over `-v`
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_title(index: usize, title: &Title, store: &LocalStore) {
    let mut marks = String::new();
    if store.favorites().contains(&title.id) {
        marks.push_str(" [favorite]");
    }
    if store.watchlist().contains(&title.id) {
        if store.watchlist().get_watched(&title.id) {
            marks.push_str(" [watched]");
        } else {
            marks.push_str(" [to watch]");
        }
    }

    println!(
        "{:>3}. {} ({}) {} - {}{}",
        index + 1,
        title.name,
        title.year,
        title.kind.as_str(),
        title.id,
        marks
    );
}

fn print_detail(detail: &TitleDetail) {
    let title = &detail.title;
    println!("{} ({})", title.name, title.year);
    println!("  Id:       {}", title.id);
    println!("  Type:     {}", title.kind.as_str());
    if let Some(rating) = detail.rating {
        println!("  Rating:   {:.1}/10", rating);
    }
    if !detail.released.is_empty() {
        println!("  Released: {}", detail.released);
    }
    if !detail.runtime.is_empty() {
        println!("  Runtime:  {}", detail.runtime);
    }
    if !detail.genres.is_empty() {
        println!("  Genres:   {}", detail.genres.join(", "));
    }
    if !detail.director.is_empty() {
        println!("  Director: {}", detail.director);
    }
    if !detail.cast.is_empty() {
        println!("  Cast:     {}", detail.cast.join(", "));
    }
    match &title.poster {
        Some(poster) => println!("  Poster:   {}", poster),
        None => println!("  Poster:   (none)"),
    }
    if !detail.plot.is_empty() {
        println!("\n{}", detail.plot);
    }
}

/// Fetches the title to store; collections keep only the basic record
fn resolve_title(client: &OmdbClient, id: &str) -> Option<Title> {
    let title = client.fetch_detail(id).map(|detail| detail.title);
    if title.is_none() {
        eprintln!("Could not load title {}.", id);
    }
    title
}

fn run_search(
    client: &OmdbClient,
    store: &LocalStore,
    term: &str,
    pages: u32,
    fill_row: Option<usize>,
) {
    let mut aggregator = ResultAggregator::new();
    aggregator.search(client, term);

    for _ in 1..pages {
        if !aggregator.has_more() {
            break;
        }
        aggregator.load_more(client, None);
    }
    if let Some(columns) = fill_row {
        aggregator.fill_last_row(client, columns);
    }

    match aggregator.status() {
        SearchStatus::Failed(message) => {
            eprintln!("{}", message);
        }
        _ if aggregator.items().is_empty() => {
            println!("No movies found. Try a different search term.");
        }
        _ => {
            println!(
                "{} results for \"{}\" (showing {})\n",
                aggregator.total_count(),
                term,
                aggregator.items().len()
            );
            for (index, title) in aggregator.items().iter().enumerate() {
                print_title(index, title, store);
            }
            if aggregator.has_more() {
                println!(
                    "\nMore results available; use --pages {} to load another page.",
                    aggregator.page() + 1
                );
            }
        }
    }
}

fn run_favorites(action: FavoritesAction, cli: &CliContext) -> Result<(), ScreenScoutError> {
    let favorites = cli.store.favorites();

    match action {
        FavoritesAction::List => {
            let list = favorites.list();
            if list.is_empty() {
                println!("You haven't added any favorites yet.");
            }
            for (index, title) in list.iter().enumerate() {
                print_title(index, title, &cli.store);
            }
        }
        FavoritesAction::Add { id } => {
            if let Some(title) = resolve_title(&cli.client()?, &id) {
                favorites.add(&title)?;
                println!("Added {} to favorites.", title.name);
            }
        }
        FavoritesAction::Remove { id } => {
            favorites.remove(&id)?;
            println!("Removed {} from favorites.", id);
        }
        FavoritesAction::Toggle { id } => {
            if let Some(title) = resolve_title(&cli.client()?, &id) {
                if favorites.toggle(&title)? {
                    println!("Added {} to favorites.", title.name);
                } else {
                    println!("Removed {} from favorites.", title.name);
                }
            }
        }
    }

    Ok(())
}

fn run_watchlist(action: WatchlistAction, cli: &CliContext) -> Result<(), ScreenScoutError> {
    let watchlist = cli.store.watchlist();

    match action {
        WatchlistAction::List { filter } => {
            let counts = watchlist.counts();
            if counts.all == 0 {
                println!("Your watchlist is empty.");
                return Ok(());
            }
            println!(
                "All: {}  To watch: {}  Watched: {}\n",
                counts.all, counts.to_watch, counts.watched
            );

            let entries = watchlist.filtered(filter.into());
            if entries.is_empty() {
                println!("No movies in this category.");
            }
            for (index, entry) in entries.iter().enumerate() {
                print_title(index, &entry.title, &cli.store);
                println!("     added {}", entry.added_at.format("%Y-%m-%d %H:%M"));
            }
        }
        WatchlistAction::Add { id, watched } => {
            if let Some(title) = resolve_title(&cli.client()?, &id) {
                watchlist.add_with_status(&title, watched)?;
                println!("Added {} to the watchlist.", title.name);
            }
        }
        WatchlistAction::Remove { id } => {
            watchlist.remove(&id)?;
            println!("Removed {} from the watchlist.", id);
        }
        WatchlistAction::Toggle { id } => {
            if let Some(title) = resolve_title(&cli.client()?, &id) {
                if watchlist.toggle(&title)? {
                    println!("Added {} to the watchlist.", title.name);
                } else {
                    println!("Removed {} from the watchlist.", title.name);
                }
            }
        }
        WatchlistAction::ToggleWatched { id } => {
            if !watchlist.contains(&id) {
                eprintln!("{} is not on the watchlist.", id);
                return Ok(());
            }
            watchlist.toggle_watched(&id)?;
            if watchlist.get_watched(&id) {
                println!("Marked {} as watched.", id);
            } else {
                println!("Marked {} as unwatched.", id);
            }
        }
    }

    Ok(())
}

/// Resolved configuration plus the opened store
struct CliContext {
    config: Config,
    store: LocalStore,
}

impl CliContext {
    fn client(&self) -> Result<OmdbClient, ScreenScoutError> {
        Ok(catalog_client(&self.config)?)
    }
}

fn run(cli: Cli) -> Result<(), ScreenScoutError> {
    let mut config = Config::load(cli.config.as_deref())?;
    if cli.api_key.is_some() {
        config.omdb.api_key = cli.api_key;
    }
    if cli.data_dir.is_some() {
        config.data_dir = cli.data_dir;
    }

    let bus = NotificationBus::new();
    let _changes = bus.subscribe(Topic::FavoritesChanged, |topic| {
        tracing::info!(%topic, "collection changed");
    });
    let _watchlist_changes = bus.subscribe(Topic::WatchlistChanged, |topic| {
        tracing::info!(%topic, "collection changed");
    });

    let store = LocalStore::open(&config, bus)?;
    let context = CliContext { config, store };

    match cli.command {
        Command::Search {
            term,
            pages,
            fill_row,
        } => {
            let client = context.client()?;
            run_search(&client, &context.store, &term, pages.max(1), fill_row);
        }
        Command::Show { id } => match context.client()?.fetch_detail(&id) {
            Some(detail) => print_detail(&detail),
            None => eprintln!("Could not load details for {}.", id),
        },
        Command::Favorites(args) => run_favorites(args.action, &context)?,
        Command::Watchlist(args) => run_watchlist(args.action, &context)?,
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
