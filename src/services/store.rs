use crate::error::Result;
use crate::models::{MenuItem, Restaurant, SeedRestaurant};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use std::str::FromStr;
use tracing::{debug, info, warn};

const CREATE_RESTAURANTS: &str = r#"
CREATE TABLE IF NOT EXISTS restaurants (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    lat REAL,
    lng REAL,
    name TEXT,
    address TEXT,
    rating REAL,
    user_ratings_count INTEGER,
    opening_hours TEXT,
    photo_url TEXT,
    price_level INTEGER,
    phone TEXT,
    website TEXT,
    business_status TEXT,
    google_maps_url TEXT
)"#;

const CREATE_MENU_ITEMS: &str = r#"
CREATE TABLE IF NOT EXISTS menu_items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    restaurant_id INTEGER,
    name TEXT,
    description TEXT,
    price REAL,
    calories INTEGER,
    tags TEXT,
    FOREIGN KEY (restaurant_id) REFERENCES restaurants(id)
)"#;

// SQLite keeps whatever a loader wrote, e.g. a price of "market price" in a REAL
// column. Values of the wrong storage class read as NULL instead of failing the row.
const SELECT_RESTAURANTS: &str = r#"
SELECT id,
    CASE WHEN typeof(lat) IN ('integer', 'real') THEN CAST(lat AS REAL) END AS lat,
    CASE WHEN typeof(lng) IN ('integer', 'real') THEN CAST(lng AS REAL) END AS lng,
    CAST(name AS TEXT) AS name,
    CAST(address AS TEXT) AS address,
    CASE WHEN typeof(rating) IN ('integer', 'real') THEN CAST(rating AS REAL) END AS rating,
    CASE WHEN typeof(user_ratings_count) IN ('integer', 'real')
        THEN CAST(ROUND(user_ratings_count) AS INTEGER) END AS user_ratings_count,
    CAST(opening_hours AS TEXT) AS opening_hours,
    CAST(photo_url AS TEXT) AS photo_url,
    CASE WHEN typeof(price_level) IN ('integer', 'real')
        THEN CAST(ROUND(price_level) AS INTEGER) END AS price_level,
    CAST(phone AS TEXT) AS phone,
    CAST(website AS TEXT) AS website,
    CAST(business_status AS TEXT) AS business_status,
    CAST(google_maps_url AS TEXT) AS google_maps_url
FROM restaurants
ORDER BY id"#;

const SELECT_MENU_ITEMS: &str = r#"
SELECT id, restaurant_id,
    CAST(name AS TEXT) AS name,
    CAST(description AS TEXT) AS description,
    CASE WHEN typeof(price) IN ('integer', 'real') THEN CAST(price AS REAL) END AS price,
    CASE WHEN typeof(calories) IN ('integer', 'real')
        THEN CAST(ROUND(calories) AS INTEGER) END AS calories,
    CAST(tags AS TEXT) AS tags
FROM menu_items WHERE restaurant_id = ?
ORDER BY id"#;

#[derive(Debug, FromRow)]
struct RestaurantRow {
    id: i64,
    lat: Option<f64>,
    lng: Option<f64>,
    name: Option<String>,
    address: Option<String>,
    rating: Option<f64>,
    user_ratings_count: Option<i64>,
    opening_hours: Option<String>,
    photo_url: Option<String>,
    price_level: Option<i64>,
    phone: Option<String>,
    website: Option<String>,
    business_status: Option<String>,
    google_maps_url: Option<String>,
}

impl RestaurantRow {
    fn into_restaurant(self) -> Option<Restaurant> {
        let (Some(lat), Some(lng)) = (self.lat, self.lng) else {
            warn!("Skipping restaurant {} without coordinates", self.id);
            return None;
        };

        Some(Restaurant {
            id: self.id,
            name: self.name.unwrap_or_default(),
            address: self.address,
            lat,
            lng,
            phone: self.phone,
            website: self.website,
            rating: self.rating,
            user_ratings_count: self.user_ratings_count,
            opening_hours: parse_list(self.opening_hours.as_deref()),
            photos: parse_list(self.photo_url.as_deref()),
            price_level: self.price_level,
            business_status: self.business_status,
            google_maps_url: self.google_maps_url,
        })
    }
}

#[derive(Debug, FromRow)]
struct MenuItemRow {
    id: i64,
    restaurant_id: i64,
    name: Option<String>,
    description: Option<String>,
    price: Option<f64>,
    calories: Option<i64>,
    tags: Option<String>,
}

impl From<MenuItemRow> for MenuItem {
    fn from(row: MenuItemRow) -> Self {
        MenuItem {
            id: row.id,
            restaurant_id: row.restaurant_id,
            name: row.name.unwrap_or_default(),
            description: row.description.unwrap_or_default(),
            price: row.price,
            calories: row.calories,
            tags: parse_list(row.tags.as_deref()),
        }
    }
}

/// JSON-encoded list column; anything unparseable reads as empty.
fn parse_list(raw: Option<&str>) -> Vec<String> {
    raw.and_then(|s| serde_json::from_str::<Vec<Option<String>>>(s).ok())
        .map(|values| values.into_iter().flatten().collect())
        .unwrap_or_default()
}

fn encode_list(values: &[String]) -> String {
    serde_json::Value::from(values.to_vec()).to_string()
}

/// Two-table SQLite store of restaurants and their menus.
#[derive(Debug, Clone)]
pub struct RestaurantStore {
    pool: SqlitePool,
}

impl RestaurantStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        info!("Connected to restaurant store at {}", database_url);
        Ok(Self { pool })
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(CREATE_RESTAURANTS).execute(&self.pool).await?;
        sqlx::query(CREATE_MENU_ITEMS).execute(&self.pool).await?;
        Ok(())
    }

    /// Every restaurant with stored coordinates.
    pub async fn all_restaurants(&self) -> Result<Vec<Restaurant>> {
        let rows: Vec<RestaurantRow> = sqlx::query_as(SELECT_RESTAURANTS)
            .fetch_all(&self.pool)
            .await?;

        debug!("Scanned {} restaurant rows", rows.len());
        Ok(rows
            .into_iter()
            .filter_map(RestaurantRow::into_restaurant)
            .collect())
    }

    pub async fn menu_items_for(&self, restaurant_id: i64) -> Result<Vec<MenuItem>> {
        let rows: Vec<MenuItemRow> = sqlx::query_as(SELECT_MENU_ITEMS)
            .bind(restaurant_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(MenuItem::from).collect())
    }

    /// Insert a restaurant and its menu in one transaction. Returns the new restaurant id.
    pub async fn insert_restaurant(&self, seed: &SeedRestaurant) -> Result<i64> {
        let mut tx = self.pool.begin().await?;

        let restaurant_id = sqlx::query(
            "INSERT INTO restaurants (lat, lng, name, address, rating, user_ratings_count, \
             opening_hours, phone, website, photo_url, price_level, business_status, google_maps_url) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(seed.lat)
        .bind(seed.lng)
        .bind(&seed.name)
        .bind(&seed.address)
        .bind(seed.rating)
        .bind(seed.user_ratings_count)
        .bind(encode_list(&seed.opening_hours))
        .bind(&seed.phone_number)
        .bind(&seed.website)
        .bind(encode_list(&seed.photos))
        .bind(seed.price_level)
        .bind(&seed.business_status)
        .bind(&seed.google_maps_url)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        for item in &seed.menu_items {
            sqlx::query(
                "INSERT INTO menu_items (restaurant_id, name, description, price, calories, tags) \
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(restaurant_id)
            .bind(&item.name)
            .bind(&item.description)
            .bind(item.price)
            .bind(item.calories)
            .bind(encode_list(&item.tags))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(restaurant_id)
    }

    /// (restaurants, menu items) row counts.
    pub async fn counts(&self) -> Result<(i64, i64)> {
        let restaurants: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM restaurants")
            .fetch_one(&self.pool)
            .await?;
        let items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM menu_items")
            .fetch_one(&self.pool)
            .await?;
        Ok((restaurants, items))
    }
}
