use super::render;
use super::spinner::Spinner;
use super::AppContext;
use crate::output::Output;
use color_eyre::Result;
use popcorn_core::{FetchState, SearchFetcher};

pub async fn run_search(query: String, output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let fetcher = SearchFetcher::new(ctx.source()?, ctx.config.search.min_query_length);

    fetcher.set_query(&query);
    let state = match fetcher.state() {
        FetchState::Idle => {
            output.warn(format!(
                "Query '{}' is too short. Type at least {} characters to search.",
                query.trim(),
                fetcher.min_query_length()
            ));
            FetchState::Idle
        }
        FetchState::Loading { query } => {
            let spinner = Spinner::start(format!("Searching for '{}'...", query), output);
            let state = fetcher.settled().await;
            spinner.finish();
            state
        }
        settled => settled,
    };

    render::search_state(&state, output);
    Ok(())
}
