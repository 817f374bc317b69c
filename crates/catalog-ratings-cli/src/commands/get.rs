use crate::output::{Output, OutputFormat};
use crate::ItemSelection;
use catalog_ratings_client::{BuildError, HttpTransport, RatingRequest, TransportError};
use catalog_ratings_config::{Config, CredentialStore, PathManager};
use catalog_ratings_models::{ItemType, RatingsResponse};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use futures::future::try_join_all;
use owo_colors::OwoColorize;
use serde_json::json;
use tracing::info;

/// One request per item type named on the command line. Positional
/// identifiers go to `--type` (or the configured default).
fn collect_requests(selection: ItemSelection, default_type: ItemType) -> Result<Vec<RatingRequest>, BuildError> {
    let positional_type = selection.item_type.unwrap_or(default_type);

    let mut groups: Vec<(ItemType, Vec<String>)> = vec![
        (ItemType::Song, selection.songs),
        (ItemType::Album, selection.albums),
        (ItemType::Playlist, selection.playlists),
        (ItemType::MusicVideo, selection.music_videos),
        (ItemType::Station, selection.stations),
    ];
    if let Some((_, ids)) = groups.iter_mut().find(|(t, _)| *t == positional_type) {
        ids.extend(selection.ids);
    }

    let requests = groups
        .into_iter()
        .filter(|(_, ids)| !ids.is_empty())
        .map(|(item_type, ids)| RatingRequest::new(ids, item_type))
        .collect::<Result<Vec<_>, _>>()?;

    if requests.is_empty() {
        return Err(BuildError::EmptyIdentifiers);
    }
    Ok(requests)
}

fn load_config() -> Result<(Config, PathManager)> {
    let path_manager = PathManager::default();
    let config_file = path_manager.config_file();
    let config = Config::load_or_default(&config_file)
        .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
    config
        .validate()
        .map_err(|e| eyre!("Invalid configuration in {}: {}", config_file.display(), e))?;
    Ok((config, path_manager))
}

pub fn run_endpoint(selection: ItemSelection, output: &Output) -> Result<()> {
    let (config, _) = load_config()?;
    let requests = collect_requests(selection, config.defaults.item_type)?;

    for request in &requests {
        let endpoint = request.endpoint(&config.catalog.base_url)?;
        match output.format() {
            OutputFormat::Human => output.println(endpoint.as_str()),
            OutputFormat::Json | OutputFormat::JsonPretty => output.json(&json!({
                "type": "endpoint",
                "item_type": request.item_type(),
                "url": endpoint.as_str(),
                "ids": endpoint.ids(),
            })),
        }
    }
    Ok(())
}

pub async fn run_get(selection: ItemSelection, output: &Output) -> Result<()> {
    let (config, path_manager) = load_config()?;
    let requests = collect_requests(selection, config.defaults.item_type)?;

    let mut cred_store = CredentialStore::new(path_manager.credentials_file());
    cred_store
        .load()
        .map_err(|e| eyre!("Failed to load credentials: {}", e))?;

    let transport = HttpTransport::from_config(&config.catalog, &cred_store).map_err(|e| {
        if matches!(e, TransportError::MissingDeveloperToken) {
            output.info("Run 'ratings config token' to store a developer token.");
        }
        eyre!(e)
    })?;
    if !transport.has_user_token() {
        output.info("Run 'ratings config token --user-token <TOKEN>' to store a music user token.");
        return Err(eyre!(TransportError::MissingUserToken));
    }

    let base_url = config.catalog.base_url.as_str();
    let results = try_join_all(
        requests
            .iter()
            .map(|request| request.execute(&transport, base_url)),
    )
    .await?;

    let rated: usize = results.iter().map(RatingsResponse::len).sum();
    let liked: usize = results.iter().map(|r| r.likes().count()).sum();
    let disliked: usize = results.iter().map(|r| r.dislikes().count()).sum();
    info!(
        "Fetched {} rating(s) across {} request(s): {} liked, {} disliked",
        rated,
        requests.len(),
        liked,
        disliked
    );

    match output.format() {
        OutputFormat::Human => print_human(&requests, &results, output),
        OutputFormat::Json | OutputFormat::JsonPretty => {
            let batches: Vec<serde_json::Value> = requests
                .iter()
                .zip(&results)
                .map(|(request, ratings)| ratings_json(request, ratings))
                .collect();
            output.json(&json!({ "type": "ratings", "results": batches }));
        }
    }
    Ok(())
}

fn ratings_json(request: &RatingRequest, ratings: &RatingsResponse) -> serde_json::Value {
    let items: Vec<serde_json::Value> = request
        .ids()
        .iter()
        .map(|id| match ratings.get(id.as_str()) {
            Some(record) => json!({ "id": id, "rating": record.value }),
            None => json!({ "id": id, "rating": null }),
        })
        .collect();

    // Records the service returned for identifiers we never asked about
    let extra: Vec<_> = ratings
        .iter()
        .filter(|record| !request.ids().contains(&record.id))
        .collect();

    json!({
        "item_type": request.item_type(),
        "items": items,
        "unrequested": extra,
    })
}

fn print_human(requests: &[RatingRequest], results: &[RatingsResponse], output: &Output) {
    if output.is_quiet() {
        return;
    }

    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("Type").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("ID").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Rating").add_attribute(comfy_table::Attribute::Bold),
    ]);

    for (request, ratings) in requests.iter().zip(results) {
        for id in request.ids() {
            let rating = match ratings.rating(id.as_str()) {
                Some(value) => match value.as_i8() {
                    1 => value.label().green().to_string(),
                    -1 => value.label().red().to_string(),
                    _ => value.label().to_string(),
                },
                None => "no rating".bright_black().to_string(),
            };
            table.add_row(vec![
                Cell::new(request.item_type().to_string()),
                Cell::new(id.as_str()),
                Cell::new(rating),
            ]);
        }
    }

    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    println!("{}", table);

    let missing: usize = requests
        .iter()
        .zip(results)
        .map(|(request, ratings)| ratings.missing(request.ids()).len())
        .sum();
    if missing > 0 {
        output.info(format!("{} item(s) have no rating", missing));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection(item_type: Option<ItemType>, ids: &[&str]) -> ItemSelection {
        ItemSelection {
            item_type,
            songs: Vec::new(),
            albums: Vec::new(),
            playlists: Vec::new(),
            music_videos: Vec::new(),
            stations: Vec::new(),
            ids: ids.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_positional_ids_use_default_type() {
        let requests = collect_requests(selection(None, &["1", "2"]), ItemType::Album).unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].item_type(), ItemType::Album);
        assert_eq!(requests[0].ids().len(), 2);
    }

    #[test]
    fn test_explicit_type_overrides_default() {
        let requests = collect_requests(selection(Some(ItemType::Station), &["ra.1"]), ItemType::Song).unwrap();
        assert_eq!(requests[0].item_type(), ItemType::Station);
    }

    #[test]
    fn test_per_type_flags_make_one_request_each() {
        let mut sel = selection(Some(ItemType::Song), &["3"]);
        sel.songs = vec!["1".to_string(), "2".to_string()];
        sel.music_videos = vec!["9".to_string()];

        let requests = collect_requests(sel, ItemType::Song).unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].item_type(), ItemType::Song);
        let song_ids: Vec<&str> = requests[0].ids().iter().map(|id| id.as_str()).collect();
        assert_eq!(song_ids, vec!["1", "2", "3"]);
        assert_eq!(requests[1].item_type(), ItemType::MusicVideo);
    }

    #[test]
    fn test_nothing_selected_is_rejected() {
        let result = collect_requests(selection(None, &[]), ItemType::Song);
        assert!(matches!(result, Err(BuildError::EmptyIdentifiers)));
    }

    #[test]
    fn test_ratings_json_marks_unrated_items() {
        let request = RatingRequest::new(["1", "2"], ItemType::Song).unwrap();
        let ratings = catalog_ratings_client::decode_ratings(
            br#"{"data":[{"id":"1","type":"songs","attributes":{"value":1}},{"id":"7","type":"songs","attributes":{"value":-1}}]}"#,
        )
        .unwrap();

        let value = ratings_json(&request, &ratings);
        assert_eq!(value["item_type"], "songs");
        assert_eq!(value["items"][0]["rating"], "like");
        assert!(value["items"][1]["rating"].is_null());
        assert_eq!(value["unrequested"][0]["id"], "7");
    }
}
