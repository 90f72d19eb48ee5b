use super::render;
use super::spinner::Spinner;
use super::AppContext;
use crate::output::Output;
use color_eyre::Result;
use popcorn_core::{DetailFetcher, DetailState};

pub async fn run_show(imdb_id: &str, output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let watched = ctx.watched_store()?;
    let fetcher = DetailFetcher::new(ctx.source()?);

    fetcher.load(imdb_id);
    let spinner = Spinner::start(format!("Loading {}...", imdb_id), output);
    let state = fetcher.settled().await;
    spinner.finish();

    match state {
        DetailState::Loaded(details) => {
            render::movie_details(&details, watched.list().user_rating_for(imdb_id), output);
            Ok(())
        }
        DetailState::Failed { error, .. } => Err(color_eyre::eyre::eyre!("{} ({})", error.message(), imdb_id)),
        DetailState::Idle | DetailState::Loading { .. } => {
            Err(color_eyre::eyre::eyre!("Loading {} was cancelled", imdb_id))
        }
    }
}
