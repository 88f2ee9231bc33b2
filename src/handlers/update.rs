use axum::{Json, extract::State};
use std::sync::Arc;
use std::time::Duration;
use crate::error::ApiError;
use crate::models::UpdateResponse;
use crate::state::{AppState, UpdateSource};

// Compare the published version against ours
fn compare(source: &UpdateSource, latest: &str) -> UpdateResponse {
    let latest = latest.trim();
    if latest != source.current_version {
        UpdateResponse {
            update: true,
            latest_version: latest.to_string(),
            download_url: Some(source.download_url.clone()),
        }
    } else {
        UpdateResponse {
            update: false,
            latest_version: source.current_version.clone(),
            download_url: None,
        }
    }
}

pub async fn check_update_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<UpdateResponse>, ApiError> {
    let res = state
        .client
        .get(&state.update.version_url)
        .timeout(Duration::from_secs(10))
        .send()
        .await
        .and_then(|res| res.error_for_status())
        .map_err(|e| ApiError::BadGateway(format!("connection error: {e}")))?;

    let latest = res
        .text()
        .await
        .map_err(|e| ApiError::BadGateway(format!("connection error: {e}")))?;

    Ok(Json(compare(&state.update, &latest)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> UpdateSource {
        UpdateSource {
            current_version: "1.1.1".to_string(),
            version_url: "http://unused".to_string(),
            download_url: "https://example.com/releases/latest".to_string(),
        }
    }

    #[test]
    fn same_version_means_no_update() {
        let res = compare(&source(), "1.1.1\n");
        assert!(!res.update);
        assert_eq!(res.latest_version, "1.1.1");
        assert_eq!(res.download_url, None);
    }

    #[test]
    fn different_version_offers_download() {
        let res = compare(&source(), " 1.2.0 ");
        assert!(res.update);
        assert_eq!(res.latest_version, "1.2.0");
        assert_eq!(
            res.download_url.as_deref(),
            Some("https://example.com/releases/latest")
        );
    }
}
