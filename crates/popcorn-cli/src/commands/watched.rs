use super::render;
use super::spinner::Spinner;
use super::{prompts, AppContext};
use crate::output::Output;
use crate::WatchedCommands;
use color_eyre::Result;
use popcorn_core::{DetailState, WatchedStore};
use popcorn_models::{MAX_USER_RATING, MIN_USER_RATING};

pub async fn run_watched(cmd: WatchedCommands, output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    match cmd {
        WatchedCommands::List => {
            render::watched_list(ctx.watched_store()?.list(), output);
            Ok(())
        }
        WatchedCommands::Summary => {
            render::summary(&ctx.watched_store()?.list().summary(), output);
            Ok(())
        }
        WatchedCommands::Add { imdb_id, rating } => add_watched(&ctx, &imdb_id, rating, output).await,
        WatchedCommands::Remove { imdb_id } => remove_watched(&mut ctx.watched_store()?, &imdb_id, output),
        WatchedCommands::Clear { yes } => clear_watched(&mut ctx.watched_store()?, yes, output),
    }
}

async fn add_watched(ctx: &AppContext, imdb_id: &str, rating: u8, output: &Output) -> Result<()> {
    if !(MIN_USER_RATING..=MAX_USER_RATING).contains(&rating) {
        return Err(color_eyre::eyre::eyre!(
            "Rating must be between {} and {}",
            MIN_USER_RATING,
            MAX_USER_RATING
        ));
    }

    let mut session = ctx.session()?;
    if let Some(existing) = session.watched().get(imdb_id) {
        output.warn(format!(
            "'{}' is already in your watched list (rated {})",
            existing.title, existing.user_rating
        ));
        return Ok(());
    }

    session.select_movie(imdb_id);
    let spinner = Spinner::start(format!("Loading {}...", imdb_id), output);
    let state = session.details().settled().await;
    spinner.finish();

    if let DetailState::Failed { error, .. } = state {
        return Err(color_eyre::eyre::eyre!("{} ({})", error.message(), imdb_id));
    }

    let movie = session
        .add_selected_to_watched(rating)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to add {}: {}", imdb_id, e))?;
    output.success(format!("Added '{}' ({}) with your rating {} 🌟", movie.title, movie.year, rating));
    render::summary(&session.summary(), output);
    Ok(())
}

fn remove_watched(watched: &mut WatchedStore, imdb_id: &str, output: &Output) -> Result<()> {
    let removed = watched
        .remove(imdb_id)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save watched list: {}", e))?;
    if removed == 0 {
        output.warn(format!("{} is not in your watched list", imdb_id));
        return Ok(());
    }
    output.success(format!("Removed {} from your watched list", imdb_id));
    Ok(())
}

fn clear_watched(watched: &mut WatchedStore, yes: bool, output: &Output) -> Result<()> {
    if watched.list().is_empty() {
        output.info("Watched list is already empty");
        return Ok(());
    }

    if !yes {
        let prompt = format!("Remove all {} movies from your watched list?", watched.list().len());
        if !prompts::prompt_yes_no_with_output(&prompt, Some(false), Some(output))? {
            output.info("Nothing removed");
            return Ok(());
        }
    }

    let cleared = watched
        .clear()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to clear watched list: {}", e))?;
    output.success(format!("Cleared {} movies from your watched list", cleared));
    Ok(())
}
