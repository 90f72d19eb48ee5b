use super::render;
use super::AppContext;
use crate::output::{Output, OutputFormat};
use color_eyre::Result;
use owo_colors::OwoColorize;
use popcorn_core::{DetailState, FetchState, MovieSession, SessionError};
use tokio::io::{AsyncBufReadExt, BufReader};

enum Flow {
    Continue,
    Quit,
}

/// Line-driven session. Stdin, search updates and detail updates are
/// multiplexed on one task; a new line replaces the search in flight.
pub async fn run_interactive(output: Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let mut session = ctx.session()?;
    let mut search_rx = session.search().subscribe();
    let mut detail_rx = session.details().subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print_help(&output);
    render::summary(&session.summary(), &output);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if let Flow::Quit = handle_line(&mut session, line.trim_end(), &output) {
                    break;
                }
            }
            changed = search_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = search_rx.borrow_and_update().clone();
                on_search_state(&state, &output);
            }
            changed = detail_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = detail_rx.borrow_and_update().clone();
                on_detail_state(&state, session.selected_user_rating(), &output);
            }
        }
    }

    tracing::debug!("Interactive session ended");
    Ok(())
}

fn on_search_state(state: &FetchState, output: &Output) {
    match state {
        FetchState::Loading { query } if output.format() == OutputFormat::Human => {
            output.println(format!("Searching for '{}'...", query).bright_black().to_string());
        }
        _ => render::search_state(state, output),
    }
}

fn on_detail_state(state: &DetailState, user_rating: Option<u8>, output: &Output) {
    match state {
        DetailState::Loading { imdb_id } => {
            output.println(format!("Loading {}...", imdb_id).bright_black().to_string());
        }
        DetailState::Loaded(_) => {
            render::detail_state(state, user_rating, output);
            if user_rating.is_none() {
                output.info("Rate it with :rate N (1-10), or :close");
            }
        }
        _ => render::detail_state(state, user_rating, output),
    }
}

fn handle_line(session: &mut MovieSession, line: &str, output: &Output) -> Flow {
    let Some(command) = line.strip_prefix(':') else {
        session.set_query(line);
        let length = line.trim().chars().count();
        let min = session.search().min_query_length();
        if length > 0 && length < min {
            output.warn(format!("Type at least {} characters to search", min));
        }
        return Flow::Continue;
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let arg = parts.next();

    match (name, arg) {
        ("q" | "quit" | "exit", _) => return Flow::Quit,
        ("h" | "help", _) => print_help(output),
        ("s" | "select", Some(arg)) => select(session, arg, output),
        ("c" | "close", _) => {
            if session.selected().is_some() {
                session.close_movie();
                output.info("Closed");
            }
        }
        ("r" | "rate", Some(arg)) => rate(session, arg, output),
        ("w" | "watched", _) => render::watched_list(session.watched(), output),
        ("rm" | "remove", Some(imdb_id)) => match session.remove_watched(imdb_id) {
            Ok(0) => output.warn(format!("{} is not in your watched list", imdb_id)),
            Ok(_) => {
                output.success(format!("Removed {}", imdb_id));
                render::summary(&session.summary(), output);
            }
            Err(e) => output.error(format!("Failed to remove {}: {}", imdb_id, e)),
        },
        _ => output.warn(format!("Unknown command ':{}'. Type :help for commands.", command)),
    }
    Flow::Continue
}

/// Accepts a 1-based result number or a raw IMDb id
fn select(session: &mut MovieSession, arg: &str, output: &Output) {
    let imdb_id = match arg.parse::<usize>() {
        Ok(number) => {
            let state = session.search_state();
            match number.checked_sub(1).and_then(|i| state.movies().get(i)) {
                Some(movie) => movie.imdb_id.clone(),
                None => {
                    output.warn(format!("No result #{} ({} results shown)", number, state.movies().len()));
                    return;
                }
            }
        }
        Err(_) => arg.to_string(),
    };
    session.select_movie(&imdb_id);
    if session.selected().is_none() {
        output.info("Closed");
    }
}

fn rate(session: &mut MovieSession, arg: &str, output: &Output) {
    let Ok(rating) = arg.parse::<u8>() else {
        output.warn(format!("'{}' is not a rating. Use a number from 1 to 10.", arg));
        return;
    };

    match session.add_selected_to_watched(rating) {
        Ok(movie) => {
            output.success(format!("Added '{}' with your rating {} 🌟", movie.title, rating));
            render::summary(&session.summary(), output);
        }
        Err(SessionError::NothingSelected) => output.warn("Select a movie first with :select N"),
        Err(SessionError::DetailsNotReady(_)) => output.warn("Details are still loading"),
        Err(e) => output.error(e.to_string()),
    }
}

fn print_help(output: &Output) {
    if output.format() != OutputFormat::Human {
        return;
    }
    output.println(format!("{}", "popcorn interactive".bright_cyan().bold()));
    output.println("  <text>        search (replaces the search in flight)");
    output.println("  :select N     open result N (or an IMDb id); again to close");
    output.println("  :close        close the open movie");
    output.println("  :rate N       rate the open movie 1-10 and add it to your watched list");
    output.println("  :watched      show your watched list");
    output.println("  :rm ID        remove a movie from your watched list");
    output.println("  :quit         leave");
}
