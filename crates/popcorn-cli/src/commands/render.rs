use crate::output::{Output, OutputFormat};
use comfy_table::{Attribute, Cell, Color, Table};
use owo_colors::OwoColorize;
use popcorn_core::{DetailState, FetchState, WatchedList, WatchedSummary};
use popcorn_models::MovieDetails;
use serde_json::json;

fn styled_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.set_header(
        header
            .into_iter()
            .map(|h| Cell::new(h).fg(Color::Cyan).add_attribute(Attribute::Bold))
            .collect::<Vec<_>>(),
    );
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table
}

fn or_dash(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}

/// Prints a settled search. Loading and idle states print nothing.
pub fn search_state(state: &FetchState, output: &Output) {
    if output.format() != OutputFormat::Human {
        if let Ok(value) = serde_json::to_value(state.snapshot()) {
            output.json(&value);
        }
        return;
    }

    match state {
        FetchState::Idle | FetchState::Loading { .. } => {}
        FetchState::Error { error, .. } => output.error(error.message()),
        FetchState::Success { query, movies } => {
            if output.is_quiet() {
                return;
            }
            let mut table = styled_table(vec!["#", "Title", "Year", "IMDb ID"]);
            for (index, movie) in movies.iter().enumerate() {
                table.add_row(vec![
                    Cell::new(index + 1),
                    Cell::new(&movie.title),
                    Cell::new(&movie.year),
                    Cell::new(&movie.imdb_id).fg(Color::DarkGrey),
                ]);
            }
            println!("{}", table);
            output.info(format!("Found {} results for '{}'", movies.len().bold(), query));
        }
    }
}

/// Detail view. `user_rating` is the rating already given, if watched.
pub fn movie_details(details: &MovieDetails, user_rating: Option<u8>, output: &Output) {
    if output.format() != OutputFormat::Human {
        output.json(&json!({
            "movie": details,
            "userRating": user_rating,
        }));
        return;
    }
    if output.is_quiet() {
        return;
    }

    println!("\n{}", details.heading().bright_cyan().bold());
    let mut table = styled_table(vec![details.title.as_str(), ""]);
    table.add_row(vec![Cell::new("Released"), Cell::new(or_dash(details.released.as_deref()))]);
    table.add_row(vec![Cell::new("Runtime"), Cell::new(or_dash(details.runtime.as_deref()))]);
    table.add_row(vec![Cell::new("Genre"), Cell::new(or_dash(details.genre.as_deref()))]);
    table.add_row(vec![
        Cell::new("IMDb rating"),
        Cell::new(format!("⭐ {}", or_dash(details.imdb_rating.as_deref()))),
    ]);
    table.add_row(vec![Cell::new("Starring"), Cell::new(or_dash(details.actors.as_deref()))]);
    table.add_row(vec![Cell::new("Director"), Cell::new(or_dash(details.director.as_deref()))]);
    println!("{}", table);

    if let Some(plot) = &details.plot {
        println!("{}", plot.italic());
    }
    match user_rating {
        Some(rating) => output.info(format!("You rated this movie {} ⭐", rating)),
        None => output.info("Not in your watched list yet".bright_black().to_string()),
    }
}

/// Settled detail state; `Loading` and `Idle` print nothing
pub fn detail_state(state: &DetailState, user_rating: Option<u8>, output: &Output) {
    match state {
        DetailState::Loaded(details) => movie_details(details, user_rating, output),
        DetailState::Failed { imdb_id, error } => {
            output.error(format!("{} ({})", error.message(), imdb_id));
        }
        DetailState::Idle | DetailState::Loading { .. } => {}
    }
}

pub fn summary(summary: &WatchedSummary, output: &Output) {
    if output.format() != OutputFormat::Human {
        if let Ok(value) = serde_json::to_value(summary) {
            output.json(&json!({ "summary": value }));
        }
        return;
    }

    output.println(format!(
        "{}  #️⃣ {} movies  ⭐️ {:.1}  🌟 {:.1}  ⏳ {:.0} min",
        "Movies you watched".bold(),
        summary.count,
        summary.avg_imdb_rating,
        summary.avg_user_rating,
        summary.avg_runtime,
    ));
}

pub fn watched_list(list: &WatchedList, output: &Output) {
    if output.format() != OutputFormat::Human {
        let summary = serde_json::to_value(list.summary()).unwrap_or_default();
        let movies = serde_json::to_value(list.as_slice()).unwrap_or_default();
        output.json(&json!({ "summary": summary, "movies": movies }));
        return;
    }

    summary(&list.summary(), output);
    if list.is_empty() || output.is_quiet() {
        return;
    }

    let mut table = styled_table(vec!["Title", "Year", "IMDb", "Yours", "Runtime", "IMDb ID"]);
    for movie in list.iter() {
        table.add_row(vec![
            Cell::new(&movie.title),
            Cell::new(&movie.year),
            Cell::new(movie.imdb_rating.map(|r| format!("⭐️ {:.1}", r)).unwrap_or_else(|| "-".to_string())),
            Cell::new(format!("🌟 {}", movie.user_rating)),
            Cell::new(movie.runtime.map(|r| format!("⏳ {} min", r)).unwrap_or_else(|| "-".to_string())),
            Cell::new(&movie.imdb_id).fg(Color::DarkGrey),
        ]);
    }
    println!("{}", table);
}
