use super::*;

#[test]
fn test_search_url_encodes_query() {
    let url = search_url("http://www.omdbapi.com/", "8441cdee", "batman begins");
    assert_eq!(url, "http://www.omdbapi.com/?apikey=8441cdee&s=batman%20begins");
}

#[test]
fn test_details_url_without_trailing_slash() {
    let url = details_url("http://localhost:9000", "k", "tt0372784");
    assert_eq!(url, "http://localhost:9000/?apikey=k&i=tt0372784");
}

#[test]
fn test_parse_search_success() {
    let body = r#"{"Search":[{"Title":"Batman Begins","Year":"2005","imdbID":"tt0372784","Type":"movie","Poster":"x"}],"totalResults":"1","Response":"True"}"#;
    let movies = parse_search_response("batma", body).unwrap();
    assert_eq!(movies.len(), 1);
    assert_eq!(movies[0].imdb_id, "tt0372784");
    assert_eq!(movies[0].title, "Batman Begins");
    assert_eq!(movies[0].year, "2005");
    assert_eq!(movies[0].poster, "x");
}

#[test]
fn test_parse_search_keeps_api_order() {
    let body = r#"{"Search":[
        {"Title":"B","Year":"2001","imdbID":"tt2","Poster":"N/A"},
        {"Title":"A","Year":"1999","imdbID":"tt1","Poster":"N/A"}
    ],"Response":"True"}"#;
    let ids: Vec<String> = parse_search_response("query", body)
        .unwrap()
        .into_iter()
        .map(|m| m.imdb_id)
        .collect();
    assert_eq!(ids, vec!["tt2", "tt1"]);
}

#[test]
fn test_parse_search_not_found() {
    let body = r#"{"Response":"False","Error":"Movie not found!"}"#;
    let err = parse_search_response("zzzzzzzz", body).unwrap_err();
    assert!(err.is_not_found());
    match err {
        SourceError::NotFound { lookup, reason } => {
            assert_eq!(lookup, "zzzzzzzz");
            assert_eq!(reason, "Movie not found!");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_parse_search_garbage() {
    let err = parse_search_response("query", "<html>rate limited</html>").unwrap_err();
    assert!(matches!(err, SourceError::Decode { .. }));

    let err = parse_search_response("query", r#"{"Response":"True"}"#).unwrap_err();
    assert!(matches!(err, SourceError::Decode { .. }));
}

#[test]
fn test_parse_details() {
    let body = r#"{
        "Title":"Inception","Year":"2010","Rated":"PG-13","Released":"16 Jul 2010",
        "Runtime":"148 min","Genre":"Action, Adventure, Sci-Fi","Director":"Christopher Nolan",
        "Actors":"Leonardo DiCaprio, Joseph Gordon-Levitt","Plot":"A thief who steals corporate secrets.",
        "Poster":"N/A","imdbRating":"8.8","imdbID":"tt1375666","Response":"True"
    }"#;
    let details = parse_details_response("tt1375666", body).unwrap();
    assert_eq!(details.title, "Inception");
    assert_eq!(details.runtime_minutes(), Some(148));
    assert_eq!(details.imdb_rating_value(), Some(8.8));
    assert_eq!(details.director.as_deref(), Some("Christopher Nolan"));
    assert_eq!(details.poster, None);
}

#[test]
fn test_parse_details_error_payload() {
    let body = r#"{"Response":"False","Error":"Incorrect IMDb ID."}"#;
    let err = parse_details_response("tt0", body).unwrap_err();
    assert!(err.is_not_found());
    assert!(err.to_string().contains("Incorrect IMDb ID."));
}
