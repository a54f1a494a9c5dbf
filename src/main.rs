use clap::Parser;
use sharenote::cli::{
    handle_add, handle_delete, handle_get, handle_list, handle_serve, Cli, Commands,
};

fn main() {
    let cli = Cli::parse();

    let default_filter = match cli.command {
        Commands::Serve(_) => "info",
        _ => "warn",
    };
    sharenote::logging::init(default_filter);

    let result = match cli.command {
        Commands::Serve(args) => handle_serve(args),
        Commands::Add {
            title,
            content,
            store,
            json,
        } => handle_add(title, content, store, json),
        Commands::List { store, json } => handle_list(store, json),
        Commands::Get { id, store, json } => handle_get(id, store, json),
        Commands::Delete { id, store } => handle_delete(id, store),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
