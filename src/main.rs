use fex::cli::Args;
use fex::entry::Entry;
use fex::navigation::ControllerEvent;
use fex::session::Session;
use fex::settings::Settings;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse_args();
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let directory = match args.directory.canonicalize() {
        Ok(path) => path,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let mut settings = Settings::load().unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load settings: {}", e);
        Settings::in_memory()
    });
    if args.show_hidden {
        settings.show_hidden_files = true;
    }

    let mut session = Session::new_at(directory.clone(), settings);
    session.explorer.set_sort_field(args.sort_spec().field);
    session.explorer.set_sort_direction(args.sort_spec().direction);
    session.explorer.initial_load();
    session.explorer.wait_until_idle().await;

    if let Some(err) = session.explorer.error() {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }

    if let Some(query) = &args.search {
        run_search(&mut session, query, &directory, args.depth).await;
        return;
    }

    print_listing(
        session.explorer.entries(),
        session.explorer.folder_sizes(),
    );

    if args.watch {
        watch_loop(&mut session).await;
    }
}

/// Runs one search to completion and prints the matches.
async fn run_search(session: &mut Session, query: &str, root: &std::path::Path, depth: usize) {
    let sort = session.explorer.sort();
    session.search.set_sort(sort);
    session.search.search(query, root, depth);
    session.search.wait_until_done().await;

    let results = session.search.results();
    if results.is_empty() {
        println!("No matches for '{}'", query);
        return;
    }
    for entry in results {
        println!("{}", entry.path.display());
    }
}

/// Re-prints the listing every time the watcher-triggered reload lands.
async fn watch_loop(session: &mut Session) {
    loop {
        let event = session.explorer.run_once().await;
        if event == ControllerEvent::Reloaded {
            println!("--- {}", session.explorer.current_path().display());
            print_listing(
                session.explorer.entries(),
                session.explorer.folder_sizes(),
            );
        }
        if event == ControllerEvent::ReloadFailed {
            if let Some(err) = session.explorer.error() {
                eprintln!("Error: {}", err);
            }
            break;
        }
    }
}

fn print_listing(entries: &[Entry], folder_sizes: &HashMap<PathBuf, u64>) {
    if entries.is_empty() {
        println!("(empty)");
        return;
    }
    for entry in entries {
        let size = if entry.is_directory() {
            folder_sizes.get(&entry.path).copied()
        } else {
            Some(entry.size)
        };
        let size = match size {
            Some(bytes) => format_size(bytes),
            None => "-".to_string(),
        };
        let marker = if entry.is_directory() { "/" } else { "" };
        println!("{:>10}  {}{}", size, entry.name, marker);
    }
}

fn format_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = KIB * 1024;
    const GIB: u64 = MIB * 1024;
    match bytes {
        b if b >= GIB => format!("{:.1} GiB", b as f64 / GIB as f64),
        b if b >= MIB => format!("{:.1} MiB", b as f64 / MIB as f64),
        b if b >= KIB => format!("{:.1} KiB", b as f64 / KIB as f64),
        b => format!("{} B", b),
    }
}
