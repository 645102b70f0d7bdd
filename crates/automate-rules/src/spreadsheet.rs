//! Loading rule sheets from a URL or a local file

use crate::error::{RuleError, RuleResult};
use crate::rule_set::RuleSheet;
use reqwest::Client;
use std::path::Path;
use tracing::{debug, instrument};

/// Download a TSV rule sheet, e.g. a published spreadsheet export
#[instrument(skip(http))]
pub async fn read_rules_from_spreadsheet(http: &Client, url: &str) -> RuleResult<RuleSheet> {
    let fetch_error = |message: String, status_code: Option<u16>| RuleError::Fetch {
        url: url.to_string(),
        message,
        status_code,
    };

    let response = http
        .get(url)
        .send()
        .await
        .map_err(|e| fetch_error(e.to_string(), None))?;
    let status = response.status();
    if !status.is_success() {
        return Err(fetch_error(
            format!("server returned {}", status),
            Some(status.as_u16()),
        ));
    }

    let body = response
        .text()
        .await
        .map_err(|e| fetch_error(e.to_string(), None))?;
    debug!("downloaded rule sheet of {} bytes", body.len());
    RuleSheet::from_tsv_str(&body)
}

/// Read a TSV rule sheet from disk
pub fn read_rules_from_path(path: impl AsRef<Path>) -> RuleResult<RuleSheet> {
    let file = std::fs::File::open(path.as_ref()).map_err(|e| RuleError::Fetch {
        url: path.as_ref().display().to_string(),
        message: e.to_string(),
        status_code: None,
    })?;
    RuleSheet::from_tsv(file)
}
