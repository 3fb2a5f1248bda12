use std::time::Duration;

use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;

use crate::error::{RaceError, RaceResult};

const REQUEST_TIMEOUT_SECS: u64 = 10;

static CLIENT: OnceCell<Client> = OnceCell::new();

pub fn http_client() -> RaceResult<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|source| RaceError::Fetch {
                url: "<client>".to_string(),
                source,
            })
    })
}

/// GETs `url` and returns the body; any non-2xx status is an error.
pub fn fetch_bytes(url: &str, extra_headers: &[(&str, &str)]) -> RaceResult<Vec<u8>> {
    let client = http_client()?;
    let mut req = client.get(url).header(USER_AGENT, "Mozilla/5.0");
    for (name, value) in extra_headers {
        req = req.header(*name, *value);
    }
    let fetch_err = |source| RaceError::Fetch {
        url: url.to_string(),
        source,
    };
    let resp = req.send().map_err(fetch_err)?;
    let status = resp.status();
    if !status.is_success() {
        return Err(RaceError::FetchStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    let body = resp.bytes().map_err(fetch_err)?;
    Ok(body.to_vec())
}

pub fn fetch_text(url: &str, extra_headers: &[(&str, &str)]) -> RaceResult<String> {
    let bytes = fetch_bytes(url, extra_headers)?;
    String::from_utf8(bytes).map_err(|err| RaceError::malformed("response body", err))
}
