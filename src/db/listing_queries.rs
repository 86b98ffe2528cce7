use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::listing::{
    CreateListingRequest, Listing, ListingCategory, ListingStatus, UpdateListingRequest,
};

fn listing_from_row(row: &PgRow) -> Result<Listing, sqlx::Error> {
    let status: String = row.try_get("status")?;
    let category: String = row.try_get("category")?;

    Ok(Listing {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        category: category.parse().unwrap_or(ListingCategory::Other),
        price: row.try_get("price")?,
        description: row.try_get("description")?,
        photos: row.try_get("photos")?,
        status: status.parse().unwrap_or(ListingStatus::Draft),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Every listing, newest first (admin dashboard view).
pub async fn list_all(pool: &PgPool) -> Result<Vec<Listing>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT id, title, category, price, description, photos, status, created_at, updated_at
        FROM listings
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(listing_from_row).collect()
}

/// Listings a storefront visitor may see.
pub async fn list_public(pool: &PgPool) -> Result<Vec<Listing>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT id, title, category, price, description, photos, status, created_at, updated_at
        FROM listings
        WHERE status IN ('active', 'reserved')
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(listing_from_row).collect()
}

pub async fn get(pool: &PgPool, id: Uuid) -> Result<Option<Listing>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT id, title, category, price, description, photos, status, created_at, updated_at
        FROM listings
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(listing_from_row).transpose()
}

pub async fn create(
    pool: &PgPool,
    listing: &CreateListingRequest,
) -> Result<Listing, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO listings (id, title, category, price, description, photos, status, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), NOW())
        RETURNING id, title, category, price, description, photos, status, created_at, updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&listing.title)
    .bind(listing.category.to_string())
    .bind(listing.price)
    .bind(&listing.description)
    .bind(&listing.photos)
    .bind(listing.status.to_string())
    .fetch_one(pool)
    .await?;

    listing_from_row(&row)
}

/// Partial update; absent fields keep their stored value.
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    changes: &UpdateListingRequest,
) -> Result<Option<Listing>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        UPDATE listings
        SET title = COALESCE($2, title),
            category = COALESCE($3, category),
            price = COALESCE($4, price),
            description = COALESCE($5, description),
            photos = COALESCE($6, photos),
            status = COALESCE($7, status),
            updated_at = NOW()
        WHERE id = $1
        RETURNING id, title, category, price, description, photos, status, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(changes.title.as_deref())
    .bind(changes.category.map(|category| category.to_string()))
    .bind(changes.price)
    .bind(changes.description.as_deref())
    .bind(changes.photos.as_ref())
    .bind(changes.status.map(|status| status.to_string()))
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(listing_from_row).transpose()
}

/// Returns whether a row was actually removed.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM listings WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
