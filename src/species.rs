//! Species reference catalog.
//!
//! Catalog rows are created and updated only by seed scripts during
//! migration; the application reads them. The botanical attributes are closed
//! enumerations stored as integer codes (the discriminants below), so seed
//! data and code must agree on the numbering.

use rusqlite::{Connection, OptionalExtension, Row};
use strum::{Display, EnumString, FromRepr};

use crate::error::VerdantError;
use crate::pager::{PagedQuery, SqlQuery};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString, FromRepr)]
pub enum ClimateZone {
    #[default]
    Unknown,
    Temperate,
    Tropical,
    Montane,
    Desert,
    Subarctic,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString, FromRepr)]
pub enum Moisture {
    #[default]
    Moderate,
    Wet,
    Dry,
    SeasonallyWet,
    SeasonallyDry,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString, FromRepr)]
pub enum LifeTime {
    #[default]
    Unknown,
    Annual,
    Biennial,
    Perennial,
    Monocarpic,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString, FromRepr)]
pub enum Shape {
    #[default]
    Unknown,
    Bamboo,
    Bulbous,
    Caudiciform,
    Climber,
    Herb,
    Rhizomatous,
    SemiSucculent,
    Succulent,
    Shrub,
    Tree,
    Tuberous,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString, FromRepr)]
pub enum Region {
    #[default]
    Unknown,
    Africa,
    Antarctica,
    Australasia,
    CentralAmerica,
    CentralAsia,
    EastAsia,
    Europe,
    Mediterranean,
    MiddleEast,
    NorthAmerica,
    PacificIslands,
    SouthAmerica,
    SouthAsia,
    SoutheastAsia,
    Subantarctic,
}

// strum's FromRepr generates an inherent from_repr(usize), so the i64-code
// conversion is stamped out per enum. Out-of-range codes fall back to the
// enum's default variant rather than failing the row.
macro_rules! impl_from_code {
    ($($ty:ty),+ $(,)?) => {$(
        impl $ty {
            pub fn from_code(code: i64) -> Self {
                usize::try_from(code)
                    .ok()
                    .and_then(Self::from_repr)
                    .unwrap_or_default()
            }
        }
    )+};
}

impl_from_code!(ClimateZone, Moisture, LifeTime, Shape, Region);

/// Full catalog record.
#[derive(Clone, Debug)]
pub struct Species {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub genus: String,
    pub family: String,
    pub photo_uri: Option<String>,
    pub climate_zone: ClimateZone,
    pub moisture: Moisture,
    pub life_time: LifeTime,
    pub shape: Shape,
    pub origin: Region,
}

impl Species {
    pub fn get_by_id(conn: &Connection, id: i64) -> Result<Option<Self>, VerdantError> {
        conn.query_row(
            "SELECT id, slug, name, genus, family, photo_uri,
                    climate_zone, moisture, life_time, shape, origin
             FROM species
             WHERE id = ?",
            [id],
            |row| {
                Ok(Species {
                    id: row.get(0)?,
                    slug: row.get(1)?,
                    name: row.get(2)?,
                    genus: row.get(3)?,
                    family: row.get(4)?,
                    photo_uri: row.get(5)?,
                    climate_zone: ClimateZone::from_code(row.get(6)?),
                    moisture: Moisture::from_code(row.get(7)?),
                    life_time: LifeTime::from_code(row.get(8)?),
                    shape: Shape::from_code(row.get(9)?),
                    origin: Region::from_code(row.get(10)?),
                })
            },
        )
        .optional()
        .map_err(VerdantError::DatabaseError)
    }
}

/// Slim row for the catalog browse grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpeciesRow {
    pub id: i64,
    pub family: String,
    pub genus: String,
    pub name: String,
}

impl SpeciesRow {
    pub fn scientific_name(&self) -> String {
        format!("{} {} {}", self.family, self.genus, self.name)
    }
}

/// Catalog pagination: search matches the slug, ordering is the slug.
pub struct SpeciesQuery;

impl PagedQuery for SpeciesQuery {
    type Item = SpeciesRow;

    fn build_query(&self, search: &str) -> SqlQuery {
        let mut sql = "SELECT id, family, genus, name FROM species".to_owned();
        let mut args = Vec::new();
        if !search.is_empty() {
            sql.push_str(" WHERE slug LIKE ?");
            args.push(format!("%{search}%"));
        }
        sql.push_str(" ORDER BY slug");
        SqlQuery { sql, args }
    }

    fn parse_row(&self, row: &Row<'_>) -> rusqlite::Result<SpeciesRow> {
        Ok(SpeciesRow {
            id: row.get(0)?,
            family: row.get(1)?,
            genus: row.get(2)?,
            name: row.get(3)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use crate::pager::Pager;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn open_db() -> (TempDir, Database) {
        let dir = TempDir::new().unwrap();
        let db = Database::open(&dir.path().join("verdant.db"), None).unwrap();
        (dir, db)
    }

    #[test]
    fn enum_codes_round_trip() {
        assert_eq!(ClimateZone::from_code(4), ClimateZone::Desert);
        assert_eq!(Shape::from_code(8), Shape::Succulent);
        assert_eq!(Region::from_code(14), Region::SoutheastAsia);
    }

    #[test]
    fn unknown_codes_fall_back_to_default() {
        assert_eq!(ClimateZone::from_code(99), ClimateZone::Unknown);
        assert_eq!(Moisture::from_code(-3), Moisture::Moderate);
    }

    #[test]
    fn scientific_name_is_family_genus_name() {
        let row = SpeciesRow {
            id: 1,
            family: "Crassulaceae".into(),
            genus: "Crassula".into(),
            name: "ovata".into(),
        };
        assert_eq!(row.scientific_name(), "Crassulaceae Crassula ovata");
    }

    #[tokio::test]
    async fn get_by_id_materializes_enums() {
        let (_dir, db) = open_db();

        let species = db
            .executor()
            .read(|conn| {
                let id: i64 = conn.query_row(
                    "SELECT id FROM species WHERE slug = 'crassulaceae-crassula-ovata'",
                    [],
                    |row| row.get(0),
                )?;
                Species::get_by_id(conn, id)
            })
            .await
            .unwrap()
            .unwrap();

        assert_eq!(species.genus, "Crassula");
        assert_eq!(species.climate_zone, ClimateZone::Desert);
        assert_eq!(species.moisture, Moisture::Dry);
        assert_eq!(species.life_time, LifeTime::Perennial);
        assert_eq!(species.shape, Shape::Succulent);
        assert_eq!(species.origin, Region::Africa);
    }

    #[tokio::test]
    async fn get_by_id_missing_is_none() {
        let (_dir, db) = open_db();
        let missing = db
            .executor()
            .read(|conn| Species::get_by_id(conn, 9999))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn catalog_search_filters_on_slug_in_slug_order() {
        let (_dir, db) = open_db();
        let pager = Pager::new(db.executor().clone(), SpeciesQuery);

        pager.update_search("araceae").await.unwrap();
        let names: Vec<String> = pager
            .snapshot()
            .items
            .iter()
            .map(SpeciesRow::scientific_name)
            .collect();
        assert_eq!(
            names,
            vec![
                "Araceae Epipremnum aureum".to_owned(),
                "Araceae Monstera deliciosa".to_owned(),
            ]
        );
    }

    #[tokio::test]
    async fn slug_search_is_case_sensitive() {
        let (_dir, db) = open_db();
        let pager = Pager::new(db.executor().clone(), SpeciesQuery);

        // Slugs are lowercase; a capitalized term matches nothing.
        pager.update_search("Araceae").await.unwrap();
        assert!(pager.snapshot().items.is_empty());
        assert!(pager.snapshot().end_reached);
    }

    #[tokio::test]
    async fn empty_search_returns_whole_catalog() {
        let (_dir, db) = open_db();
        let pager = Pager::new(db.executor().clone(), SpeciesQuery);

        pager.update_search("").await.unwrap();
        let state = pager.snapshot();
        assert_eq!(state.items.len(), 12);

        let slugs_sorted = {
            let mut v: Vec<String> = state
                .items
                .iter()
                .map(|r| {
                    format!(
                        "{}-{}-{}",
                        r.family.to_lowercase(),
                        r.genus.to_lowercase(),
                        r.name.to_lowercase()
                    )
                })
                .collect();
            let unsorted = v.clone();
            v.sort();
            assert_eq!(v, unsorted, "catalog must arrive in slug order");
            v
        };
        assert_eq!(slugs_sorted.len(), 12);
    }
}
