use crate::errors::AppError;
use crate::models::AppData;
use std::{env, path::Path, path::PathBuf};
use tokio::fs;
use tracing::error;

pub fn resolve_data_path() -> Result<PathBuf, std::io::Error> {
    if let Ok(path) = env::var("APP_DATA_PATH") {
        return Ok(PathBuf::from(path));
    }

    Ok(PathBuf::from("data/state.json"))
}

pub async fn load_data(path: &Path) -> AppData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(data) => data,
            Err(err) => {
                error!("failed to parse data file: {err}");
                AppData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => AppData::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            AppData::default()
        }
    }
}

pub async fn persist_data(path: &Path, data: &AppData) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(data).map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(AppError::internal)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Business, Profile};
    use chrono::NaiveDate;

    fn temp_path(tag: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        path.push(format!("lifecycles_{tag}_{}_{nanos}.json", std::process::id()));
        path
    }

    #[tokio::test]
    async fn load_missing_file_yields_default() {
        let data = load_data(&temp_path("missing")).await;
        assert!(data.businesses.is_empty());
        assert_eq!(data.next_business_id, 1);
        assert_eq!(data.profile.timezone, "UTC");
    }

    #[tokio::test]
    async fn persist_then_load_round_trips() {
        let path = temp_path("roundtrip");
        let data = AppData {
            profile: Profile {
                date_of_birth: NaiveDate::from_ymd_opt(1990, 4, 12),
                ..Profile::default()
            },
            businesses: vec![Business {
                id: 7,
                name: "Acme".into(),
                establishment_date: NaiveDate::from_ymd_opt(2020, 1, 15).unwrap(),
            }],
            next_business_id: 8,
        };

        persist_data(&path, &data).await.unwrap();
        let loaded = load_data(&path).await;
        let _ = tokio::fs::remove_file(&path).await;

        assert_eq!(loaded.businesses, data.businesses);
        assert_eq!(loaded.profile.date_of_birth, data.profile.date_of_birth);
        assert_eq!(loaded.next_business_id, 8);
    }
}
