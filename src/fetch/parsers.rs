//! Decoding of GraphQL channel responses

use serde::Deserialize;

use crate::fetch::types::{FetchResult, MetadataFetchError};
use crate::types::{ChannelMetadata, LiveStreamInfo};

/// Top-level GraphQL response envelope
#[derive(Debug, Deserialize)]
struct GqlResponse {
    data: Option<GqlData>,
    #[serde(default)]
    errors: Vec<GqlError>,
}

#[derive(Debug, Deserialize)]
struct GqlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct GqlData {
    user: Option<UserNode>,
}

#[derive(Debug, Deserialize)]
struct UserNode {
    id: String,
    login: String,
    #[serde(rename = "displayName")]
    display_name: String,
    #[serde(rename = "profileImageURL")]
    profile_image_url: String,
    followers: FollowerConnection,
    stream: Option<StreamNode>,
}

#[derive(Debug, Deserialize)]
struct FollowerConnection {
    #[serde(rename = "totalCount")]
    total_count: u64,
}

#[derive(Debug, Deserialize)]
struct StreamNode {
    id: String,
    title: String,
    #[serde(rename = "type")]
    stream_type: String,
    #[serde(rename = "viewersCount")]
    viewers_count: u64,
    #[serde(rename = "createdAt")]
    created_at: String,
    game: Option<GameNode>,
}

#[derive(Debug, Deserialize)]
struct GameNode {
    name: String,
}

/// Decode a GraphQL response body into a [`ChannelMetadata`] snapshot.
///
/// A populated `errors` array or a `null` user both count as fetch failures;
/// the `login` is only used to build error messages.
pub fn parse_channel_response(body: &str, login: &str) -> FetchResult<ChannelMetadata> {
    let response: GqlResponse = serde_json::from_str(body)?;

    if let Some(error) = response.errors.first() {
        return Err(MetadataFetchError::Graphql(error.message.clone()));
    }

    let user = response
        .data
        .and_then(|data| data.user)
        .ok_or_else(|| MetadataFetchError::ChannelNotFound(login.to_string()))?;

    Ok(ChannelMetadata {
        id: user.id,
        login: user.login,
        display_name: user.display_name,
        avatar_url: user.profile_image_url,
        follower_count: user.followers.total_count,
        stream: user.stream.map(|stream| LiveStreamInfo {
            id: stream.id,
            title: stream.title,
            stream_type: stream.stream_type,
            viewers: stream.viewers_count,
            started_at: stream.created_at,
            game: stream.game.map(|game| game.name),
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIVE_BODY: &str = r#"{
        "data": {
            "user": {
                "id": "42",
                "login": "somecaster",
                "displayName": "SomeCaster",
                "profileImageURL": "https://cdn.example/avatar-300.png",
                "followers": {"totalCount": 1234},
                "stream": {
                    "id": "9001",
                    "title": "speedrun sunday",
                    "type": "live",
                    "viewersCount": 777,
                    "createdAt": "2024-05-01T12:00:00Z",
                    "game": {"name": "Tetris"}
                }
            }
        }
    }"#;

    #[test]
    fn parses_live_channel() {
        let metadata = parse_channel_response(LIVE_BODY, "somecaster").unwrap();
        assert_eq!(metadata.id, "42");
        assert_eq!(metadata.login, "somecaster");
        assert_eq!(metadata.display_name, "SomeCaster");
        assert_eq!(metadata.follower_count, 1234);

        let stream = metadata.stream.expect("channel is live");
        assert_eq!(stream.viewers, 777);
        assert_eq!(stream.stream_type, "live");
        assert_eq!(stream.game.as_deref(), Some("Tetris"));
    }

    #[test]
    fn parses_offline_channel_with_zero_followers() {
        let body = r#"{
            "data": {
                "user": {
                    "id": "7",
                    "login": "quiet",
                    "displayName": "Quiet",
                    "profileImageURL": "https://cdn.example/q.png",
                    "followers": {"totalCount": 0},
                    "stream": null
                }
            }
        }"#;

        let metadata = parse_channel_response(body, "quiet").unwrap();
        assert_eq!(metadata.follower_count, 0);
        assert!(metadata.stream.is_none());
    }

    #[test]
    fn null_game_is_allowed() {
        let body = LIVE_BODY.replace(r#"{"name": "Tetris"}"#, "null");
        let metadata = parse_channel_response(&body, "somecaster").unwrap();
        assert!(metadata.stream.unwrap().game.is_none());
    }

    #[test]
    fn unknown_login_maps_to_channel_not_found() {
        let body = r#"{"data": {"user": null}}"#;
        let err = parse_channel_response(body, "nobody").unwrap_err();
        assert!(matches!(err, MetadataFetchError::ChannelNotFound(login) if login == "nobody"));
    }

    #[test]
    fn graphql_errors_are_surfaced() {
        let body = r#"{"data": null, "errors": [{"message": "service unavailable"}]}"#;
        let err = parse_channel_response(body, "somecaster").unwrap_err();
        assert!(matches!(err, MetadataFetchError::Graphql(msg) if msg == "service unavailable"));
    }

    #[test]
    fn truncated_body_is_a_decode_error() {
        let err = parse_channel_response(r#"{"data": {"use"#, "somecaster").unwrap_err();
        assert!(matches!(err, MetadataFetchError::Decode(_)));
    }
}
