use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

// @module: Video id resolution and watch page URLs

// @const: Site domain; any subdomain serves watch pages
const SITE_DOMAIN: &str = "youtube.com";

// @const: Short-link host, the id is the first path segment
const SHORT_LINK_HOST: &str = "youtu.be";

// @const: Path kinds whose next segment is the id
const ID_PATH_KINDS: [&str; 3] = ["shorts", "embed", "live"];

// @const: Ids are 11 URL-safe base64 characters
static BARE_ID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9A-Za-z_-]{11}$").unwrap()
});

/// Whether `host` serves watch pages or short links
pub fn is_video_host(host: &str) -> bool {
    let host = host.to_ascii_lowercase();
    host == SHORT_LINK_HOST
        || host
            .strip_suffix(SITE_DOMAIN)
            .is_some_and(|rest| rest.is_empty() || rest.ends_with('.'))
}

/// Resolve a video id from a bare id or a watch, short-link, shorts, embed or live URL
pub fn parse_video_id(input: &str) -> Option<String> {
    let input = input.trim();
    if BARE_ID_REGEX.is_match(input) {
        return Some(input.to_string());
    }

    let url = Url::parse(input)
        .or_else(|_| Url::parse(&format!("https://{}", input)))
        .ok()?;
    id_in_url(&url).filter(|id| !id.is_empty())
}

fn id_in_url(url: &Url) -> Option<String> {
    let host = url.host_str().filter(|host| is_video_host(host))?;
    let path: Vec<&str> = url.path_segments()?.filter(|part| !part.is_empty()).collect();

    let id = if host.eq_ignore_ascii_case(SHORT_LINK_HOST) {
        path.first()?.to_string()
    } else {
        match path.as_slice() {
            ["watch", ..] => url
                .query_pairs()
                .find_map(|(key, value)| (key == "v").then(|| value.into_owned()))?,
            [kind, id, ..] if ID_PATH_KINDS.contains(kind) => id.to_string(),
            _ => return None,
        }
    };

    Some(id.trim().to_string())
}

/// Build the watch page URL for a video id under the given site base URL
///
/// A path in the base URL is kept, so `http://host/mirror` gives
/// `http://host/mirror/watch?v=<id>`.
pub fn watch_url(page_base_url: &str, video_id: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(page_base_url)?;
    url.path_segments_mut()
        .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .push("watch");
    url.set_query(None);
    url.query_pairs_mut().append_pair("v", video_id);
    Ok(url)
}
