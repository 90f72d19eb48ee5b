use popcorn_models::{MovieDetails, MovieSummary};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::SourceError;

/// Envelope of `?s=<query>`
#[derive(Debug, Deserialize)]
struct OmdbSearchResponse {
    #[serde(rename = "Search")]
    search: Option<Vec<MovieSummary>>,
    #[serde(rename = "totalResults")]
    total_results: Option<String>,
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Error")]
    error: Option<String>,
}

/// Flat record returned by `?i=<imdb id>`
#[derive(Debug, Deserialize)]
struct OmdbDetailResponse {
    #[serde(rename = "imdbID")]
    imdb_id: Option<String>,
    #[serde(rename = "Title")]
    title: Option<String>,
    #[serde(rename = "Year")]
    year: Option<String>,
    #[serde(rename = "Poster")]
    poster: Option<String>,
    #[serde(rename = "Runtime")]
    runtime: Option<String>,
    #[serde(rename = "imdbRating")]
    imdb_rating: Option<String>,
    #[serde(rename = "Plot")]
    plot: Option<String>,
    #[serde(rename = "Released")]
    released: Option<String>,
    #[serde(rename = "Actors")]
    actors: Option<String>,
    #[serde(rename = "Director")]
    director: Option<String>,
    #[serde(rename = "Genre")]
    genre: Option<String>,
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Error")]
    error: Option<String>,
}

/// OMDb uses the literal "N/A" for missing values
fn available(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty() && v != "N/A")
}

fn endpoint(base_url: &str, api_key: &str, param: &str, value: &str) -> String {
    format!(
        "{}/?apikey={}&{}={}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(api_key),
        param,
        urlencoding::encode(value)
    )
}

pub fn search_url(base_url: &str, api_key: &str, query: &str) -> String {
    endpoint(base_url, api_key, "s", query)
}

pub fn details_url(base_url: &str, api_key: &str, imdb_id: &str) -> String {
    endpoint(base_url, api_key, "i", imdb_id)
}

pub fn parse_search_response(query: &str, body: &str) -> Result<Vec<MovieSummary>, SourceError> {
    let payload: OmdbSearchResponse = serde_json::from_str(body).map_err(|e| SourceError::Decode {
        reason: format!("search payload: {}", e),
    })?;

    if payload.response == "False" {
        return Err(SourceError::NotFound {
            lookup: query.to_string(),
            reason: payload.error.unwrap_or_else(|| "Movie not found!".to_string()),
        });
    }

    let movies = payload.search.ok_or_else(|| SourceError::Decode {
        reason: "search payload has no 'Search' list".to_string(),
    })?;

    debug!(
        query = query,
        returned = movies.len(),
        total = payload.total_results.as_deref().unwrap_or("?"),
        "Parsed OMDb search response"
    );
    Ok(movies)
}

pub fn parse_details_response(imdb_id: &str, body: &str) -> Result<MovieDetails, SourceError> {
    let payload: OmdbDetailResponse = serde_json::from_str(body).map_err(|e| SourceError::Decode {
        reason: format!("detail payload: {}", e),
    })?;

    if payload.response == "False" {
        return Err(SourceError::NotFound {
            lookup: imdb_id.to_string(),
            reason: payload.error.unwrap_or_else(|| "Unknown error".to_string()),
        });
    }

    Ok(MovieDetails {
        imdb_id: available(payload.imdb_id).unwrap_or_else(|| imdb_id.to_string()),
        title: available(payload.title).unwrap_or_else(|| "Unknown".to_string()),
        year: available(payload.year),
        poster: available(payload.poster),
        runtime: available(payload.runtime),
        imdb_rating: available(payload.imdb_rating),
        plot: available(payload.plot),
        released: available(payload.released),
        actors: available(payload.actors),
        director: available(payload.director),
        genre: available(payload.genre),
    })
}

async fn get_body(client: &Client, url: &str) -> Result<String, SourceError> {
    let response = client
        .get(url)
        .header("Accept", "application/json")
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(SourceError::Status {
            status: status.as_u16(),
            body,
        });
    }

    Ok(response.text().await?)
}

/// Free-text title search
pub async fn search(
    client: &Client,
    base_url: &str,
    api_key: &str,
    query: &str,
) -> Result<Vec<MovieSummary>, SourceError> {
    debug!(query = query, "Searching OMDb");
    let body = get_body(client, &search_url(base_url, api_key, query)).await?;
    parse_search_response(query, &body)
}

/// Full record for one IMDb id
pub async fn get_details(
    client: &Client,
    base_url: &str,
    api_key: &str,
    imdb_id: &str,
) -> Result<MovieDetails, SourceError> {
    debug!(imdb_id = imdb_id, "Fetching OMDb details");
    let body = get_body(client, &details_url(base_url, api_key, imdb_id)).await?;
    parse_details_response(imdb_id, &body)
}

#[cfg(test)]
mod tests;
