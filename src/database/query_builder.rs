use sqlx::{self, postgres::PgArguments, FromRow};

use crate::database::manager::DatabaseError;
use crate::geo::Bounds;
use crate::types::{CreateSpotParams, SearchQuery, SpotsQuery, UpdateSpotParams};

pub const SPOTS_TABLE: &str = "spots";

/// Columns selected for every spot read, with the id rendered as text.
pub const SPOT_COLUMNS: &str =
    "id::text AS id, name, latitude, longitude, locality, country_code, created_at";

/// Parameters bound per inserted spot row.
pub const INSERT_PARAMS_PER_ROW: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Float(f64),
    Int(i64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<SqlParam>,
}

impl SqlResult {
    pub fn query_as<'q, T>(&'q self) -> sqlx::query::QueryAs<'q, sqlx::Postgres, T, PgArguments>
    where
        T: for<'r> FromRow<'r, sqlx::postgres::PgRow>,
    {
        self.params
            .iter()
            .fold(sqlx::query_as::<_, T>(&self.query), bind_param_query_as)
    }

    pub fn query(&self) -> sqlx::query::Query<'_, sqlx::Postgres, PgArguments> {
        self.params.iter().fold(sqlx::query(&self.query), bind_param_query)
    }
}

/// Collects `AND`-joined conditions and their positional parameters.
#[derive(Debug, Default)]
struct WhereBuilder {
    conditions: Vec<String>,
    params: Vec<SqlParam>,
}

impl WhereBuilder {
    /// Registers a parameter and returns its `$n` placeholder.
    fn param(&mut self, value: SqlParam) -> String {
        self.params.push(value);
        format!("${}", self.params.len())
    }

    fn push(&mut self, condition: String) {
        self.conditions.push(condition);
    }

    fn country_code(&mut self, code: &str) {
        let p = self.param(SqlParam::Text(code.to_string()));
        self.push(format!("country_code = {}", p));
    }

    fn search(&mut self, search: &SearchQuery) {
        let p = self.param(SqlParam::Text(like_pattern(&search.text)));
        let mut columns = vec![format!("name ILIKE {}", p), format!("locality ILIKE {}", p)];
        if search.match_id {
            columns.push(format!("id::text ILIKE {}", p));
        }
        self.push(format!("({})", columns.join(" OR ")));
    }

    fn bounds(&mut self, bounds: &Bounds) {
        let sw_lat = self.param(SqlParam::Float(bounds.south_west.latitude));
        let ne_lat = self.param(SqlParam::Float(bounds.north_east.latitude));
        self.push(format!("latitude BETWEEN {} AND {}", sw_lat, ne_lat));

        let sw_lon = self.param(SqlParam::Float(bounds.south_west.longitude));
        let ne_lon = self.param(SqlParam::Float(bounds.north_east.longitude));
        if bounds.crosses_antimeridian() {
            self.push(format!("(longitude >= {} OR longitude <= {})", sw_lon, ne_lon));
        } else {
            self.push(format!("longitude BETWEEN {} AND {}", sw_lon, ne_lon));
        }
    }

    fn clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }
}

/// `%text%` with LIKE metacharacters escaped.
fn like_pattern(text: &str) -> String {
    let escaped = text
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// SQL for spot reads and writes
pub struct QueryBuilder;

impl QueryBuilder {
    pub fn select_spots(query: &SpotsQuery) -> SqlResult {
        let mut w = WhereBuilder::default();
        if let Some(code) = &query.country_code {
            w.country_code(code);
        }
        if let Some(search) = &query.search {
            w.search(search);
        }
        if let Some(bounds) = &query.bounds {
            w.bounds(bounds);
        }

        let limit = w.param(SqlParam::Int(query.limit));
        let offset = w.param(SqlParam::Int(query.offset));

        let sql = [
            format!("SELECT {}", SPOT_COLUMNS),
            format!("FROM \"{}\"", SPOTS_TABLE),
            w.clause(),
            "ORDER BY created_at DESC, id".to_string(),
            format!("LIMIT {} OFFSET {}", limit, offset),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        SqlResult { query: sql, params: w.params }
    }

    pub fn select_spot(id: &str) -> SqlResult {
        SqlResult {
            query: format!("SELECT {} FROM \"{}\" WHERE id::text = $1", SPOT_COLUMNS, SPOTS_TABLE),
            params: vec![SqlParam::Text(id.to_string())],
        }
    }

    pub fn insert_spot(params: &CreateSpotParams) -> SqlResult {
        let mut sql = Self::insert_spots(std::slice::from_ref(params));
        sql.query.push_str(&format!(" RETURNING {}", SPOT_COLUMNS));
        sql
    }

    /// One multi-row `INSERT` for the given entries.
    pub fn insert_spots(entries: &[CreateSpotParams]) -> SqlResult {
        let mut params = Vec::with_capacity(entries.len() * INSERT_PARAMS_PER_ROW);
        let mut rows = Vec::with_capacity(entries.len());

        for entry in entries {
            let base = params.len();
            params.push(SqlParam::Text(entry.name.clone()));
            params.push(SqlParam::Float(entry.location.coordinates.latitude));
            params.push(SqlParam::Float(entry.location.coordinates.longitude));
            params.push(SqlParam::Text(entry.location.locality.clone()));
            params.push(SqlParam::Text(entry.location.country_code.clone()));
            let placeholders = (1..=INSERT_PARAMS_PER_ROW)
                .map(|n| format!("${}", base + n))
                .collect::<Vec<_>>()
                .join(", ");
            rows.push(format!("({})", placeholders));
        }

        SqlResult {
            query: format!(
                "INSERT INTO \"{}\" (name, latitude, longitude, locality, country_code) VALUES {}",
                SPOTS_TABLE,
                rows.join(", ")
            ),
            params,
        }
    }

    /// `SET` only the present fields. No present field is an error.
    pub fn update_spot(update: &UpdateSpotParams) -> Result<SqlResult, DatabaseError> {
        let mut w = WhereBuilder::default();
        let mut sets = Vec::new();

        if let Some(name) = &update.name {
            sets.push(format!("name = {}", w.param(SqlParam::Text(name.clone()))));
        }
        if let Some(latitude) = update.latitude {
            sets.push(format!("latitude = {}", w.param(SqlParam::Float(latitude))));
        }
        if let Some(longitude) = update.longitude {
            sets.push(format!("longitude = {}", w.param(SqlParam::Float(longitude))));
        }
        if let Some(locality) = &update.locality {
            sets.push(format!("locality = {}", w.param(SqlParam::Text(locality.clone()))));
        }
        if let Some(code) = &update.country_code {
            sets.push(format!("country_code = {}", w.param(SqlParam::Text(code.clone()))));
        }

        if sets.is_empty() {
            return Err(DatabaseError::EmptyUpdate);
        }

        let id = w.param(SqlParam::Text(update.id.clone()));
        Ok(SqlResult {
            query: format!(
                "UPDATE \"{}\" SET {} WHERE id::text = {} RETURNING {}",
                SPOTS_TABLE,
                sets.join(", "),
                id,
                SPOT_COLUMNS
            ),
            params: w.params,
        })
    }

    pub fn delete_spot(id: &str) -> SqlResult {
        SqlResult {
            query: format!("DELETE FROM \"{}\" WHERE id::text = $1", SPOTS_TABLE),
            params: vec![SqlParam::Text(id.to_string())],
        }
    }
}

fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    v: &'q SqlParam,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match v {
        SqlParam::Text(s) => q.bind(s.as_str()),
        SqlParam::Float(f) => q.bind(*f),
        SqlParam::Int(i) => q.bind(*i),
    }
}

fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    v: &'q SqlParam,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, sqlx::postgres::PgRow>,
{
    match v {
        SqlParam::Text(s) => q.bind(s.as_str()),
        SqlParam::Float(f) => q.bind(*f),
        SqlParam::Int(i) => q.bind(*i),
    }
}
