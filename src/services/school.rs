use sqlx::Row;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::error::ApiError;
use crate::types::SchoolInfo;

const DEFAULT_PRIMARY_COLOR: &str = "#6D28D9";
const DEFAULT_SECONDARY_COLOR: &str = "#4F46E5";

/// Get the school's public configuration (name, contact, branding)
pub async fn get_school_info(school_id: Uuid) -> Result<SchoolInfo, ApiError> {
    let pool = DatabaseManager::pool()?;

    let row = sqlx::query(
        "SELECT id, name, address, phone, email, primary_color, secondary_color, logo_url
         FROM school_settings
         WHERE id = $1",
    )
    .bind(school_id)
    .fetch_one(&pool)
    .await?;

    Ok(SchoolInfo {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        address: row.try_get("address")?,
        phone: row.try_get("phone")?,
        email: row.try_get("email")?,
        primary_color: row
            .try_get::<Option<String>, _>("primary_color")?
            .unwrap_or_else(|| DEFAULT_PRIMARY_COLOR.to_string()),
        secondary_color: row
            .try_get::<Option<String>, _>("secondary_color")?
            .unwrap_or_else(|| DEFAULT_SECONDARY_COLOR.to_string()),
        logo_url: row.try_get("logo_url")?,
    })
}
