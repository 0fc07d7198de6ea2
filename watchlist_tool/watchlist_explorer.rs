use popcorn::app::storage::{KeyValueStore, SqliteStore};
use popcorn::app::watchlist::{parse_mirror, summarize, WatchlistStore};
use popcorn::config::{load_config, local_storage_db_path};
use std::env;
use std::error::Error;
use std::path::{Path, PathBuf};

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let cfg = load_config();
    let db_path = local_storage_db_path();
    if !db_path.exists() {
        eprintln!(
            "Watchlist DB not found at {}. Launch popcorn and add a movie first.",
            db_path.display()
        );
        std::process::exit(1);
    }
    println!("Opening watchlist DB: {}", db_path.display());
    let store = SqliteStore::open(&db_path)?;

    if args.iter().any(|a| a == "--keys") {
        for key in store.keys()? {
            println!("{key}");
        }
        return Ok(());
    }

    if args.iter().any(|a| a == "--json") {
        match store.get(&cfg.storage_key)? {
            Some(raw) => println!("{raw}"),
            None => println!("(no value under `{}`)", cfg.storage_key),
        }
        return Ok(());
    }

    if let Some(idx) = args.iter().position(|a| a == "--backup") {
        let dest = args
            .get(idx + 1)
            .filter(|a| !a.starts_with("--"))
            .map(PathBuf::from)
            .unwrap_or_else(|| default_backup_path(&db_path));
        store.backup_to(&dest)?;
        println!("Backed up to {}", dest.display());
        return Ok(());
    }

    if let Some(idx) = args.iter().position(|a| a == "--remove") {
        let Some(id) = args.get(idx + 1) else {
            eprintln!("Missing imdb id after --remove");
            std::process::exit(1);
        };
        eprintln!("Note: {REMOVE_WARNING}");
        let mut list = WatchlistStore::load(Box::new(store), &cfg.storage_key);
        if list.remove(id) {
            println!("Removed {id} ({} left)", list.len());
        } else {
            eprintln!("{id} is not in the watchlist");
            std::process::exit(1);
        }
        return Ok(());
    }

    let entries = parse_mirror(store.get(&cfg.storage_key)?.as_deref());
    if args.iter().any(|a| a == "--summary") {
        let s = summarize(&entries);
        println!("--- Summary ({}) ---", cfg.storage_key);
        println!("Movies:       {}", s.count);
        println!("Avg IMDb:     {}", s.avg_imdb_rating);
        println!("Avg rating:   {}", s.avg_user_rating);
        println!("Avg runtime:  {} min", s.avg_runtime);
        return Ok(());
    }

    println!("--- Watchlist ({} entries) ---", entries.len());
    for e in &entries {
        let imdb = e
            .imdb_rating
            .map(|r| format!("{r:.1}"))
            .unwrap_or_else(|| "-".into());
        let runtime = e
            .runtime_minutes
            .map(|m| format!("{m} min"))
            .unwrap_or_else(|| "-".into());
        println!(
            "{:<11} {:<40} {:>4}  imdb {:>4}  you {:>2}/10  {:>8}  revisions {}",
            e.id, e.title, e.year, imdb, e.user_rating, runtime, e.rating_revision_count
        );
    }
    Ok(())
}

fn default_backup_path(db_path: &Path) -> PathBuf {
    use chrono::Local;
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    db_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(format!("popcorn_backup_{stamp}.db"))
}

const REMOVE_WARNING: &str =
    "Close the popcorn GUI first: a running GUI keeps its own copy of the list \
and writes it back on its next change, undoing the removal.";

fn usage() -> String {
    format!(
        r#"Popcorn watchlist explorer.

Usage:
  cargo run --bin watchlist_explorer
      List watched movies.
  cargo run --bin watchlist_explorer -- --summary
      Print count and averages.
  cargo run --bin watchlist_explorer -- --json
      Dump the raw persisted JSON.
  cargo run --bin watchlist_explorer -- --keys
      List storage keys in the database.
  cargo run --bin watchlist_explorer -- --remove <imdbID>
      Remove one entry.
      {REMOVE_WARNING}
  cargo run --bin watchlist_explorer -- --backup [dest.db]
      Copy the database (default: popcorn_backup_<timestamp>.db next to it).
"#
    )
}

fn print_usage() {
    println!("{}", usage());
}
