//! Request URL composition

use crate::error::{Error, Result};
use crate::identifier::Identifier;
use crate::object::Endpoint;
use crate::options::Paging;
use url::Url;

/// Join the base URL with the endpoint path, append the identifier for
/// single-object operations and merge query parameters.
///
/// Query pairs from the base URL come first, then the endpoint's, then the
/// page parameters. Repeated keys are all kept.
pub(crate) fn compose_url(
    base: &Url,
    endpoint: &Endpoint,
    identifier: Option<&Identifier>,
    paging: Option<Paging>,
) -> Result<Url> {
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);

    let path = format!(
        "{}/{}",
        base.path().trim_end_matches('/'),
        endpoint.path().trim_start_matches('/')
    );
    url.set_path(&path);

    if let Some(identifier) = identifier {
        url.path_segments_mut()
            .map_err(|()| Error::config(format!("base URL '{base}' cannot carry a path")))?
            .pop_if_empty()
            .push(&identifier.to_string());
    }

    let mut pairs: Vec<(String, String)> = base.query_pairs().into_owned().collect();
    pairs.extend(endpoint.query_pairs().iter().cloned());
    if let Some(paging) = paging {
        pairs.extend(
            paging
                .query_pairs()
                .into_iter()
                .map(|(k, v)| (k.to_string(), v)),
        );
    }
    if !pairs.is_empty() {
        url.query_pairs_mut().extend_pairs(pairs);
    }

    Ok(url)
}
