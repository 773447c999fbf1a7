//! Showfetch - fetch TV show metadata from TMDB
//!
//! A command-line front end for the fetch pipeline: every subcommand maps
//! to one orchestrator operation and prints plain text lines, one show or
//! genre per line. Failed fetches are reported on stderr by the pipeline
//! and show up here only as missing lines.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use showfetch::cli::{resolve_config, Cli, Command};
use showfetch::tmdb::{Genre, Show, ShowFetcher};

/// Prints one line per resolved show, skipping failed slots
fn print_shows(shows: &[Option<Show>]) {
    for show in shows.iter().flatten() {
        print_show(show);
    }
}

/// Prints a single show as `id<TAB>name (year)<TAB>rating`
fn print_show(show: &Show) {
    let year = show.first_air_date.split('-').next().unwrap_or("");
    if year.is_empty() {
        println!("{}\t{}\t{:.1}", show.id, show.name, show.vote_average);
    } else {
        println!("{}\t{} ({})\t{:.1}", show.id, show.name, year, show.vote_average);
    }
}

fn print_genres(genres: &[Genre]) {
    for genre in genres {
        println!("{}\t{}", genre.id, genre.name);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    let language = config.language.clone();
    let fetcher = ShowFetcher::from_config(&config);

    match cli.command {
        Command::Show { id } => match fetcher.get_show(id, &language).await {
            Some(show) => print_show(&show),
            None => eprintln!("No metadata for show {}", id),
        },
        Command::Search { query, page } => {
            let shows = fetcher.search_shows(&query, &language, page).await;
            print_shows(&shows);
        }
        Command::Popular(args) => {
            let shows = fetcher
                .popular_shows(args.genre.as_deref(), &language, args.page_spec())
                .await;
            print_shows(&shows);
        }
        Command::Recent(args) => {
            let shows = fetcher
                .recent_shows(args.genre.as_deref(), &language, args.page_spec())
                .await;
            print_shows(&shows);
        }
        Command::RecentEpisodes(args) => {
            let shows = fetcher
                .recent_episodes(args.genre.as_deref(), &language, args.page_spec())
                .await;
            print_shows(&shows);
        }
        Command::TopRated(args) => {
            let shows = fetcher.top_rated_shows(&language, args.page_spec()).await;
            print_shows(&shows);
        }
        Command::MostVoted(args) => {
            let shows = fetcher
                .most_voted_shows(args.genre.as_deref(), &language, args.page_spec())
                .await;
            print_shows(&shows);
        }
        Command::Genres => {
            let genres = fetcher.tv_genres(&language).await;
            print_genres(&genres);
        }
    }

    Ok(())
}
