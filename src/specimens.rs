//! User-owned specimens: the collection grid query, the save/delete writes,
//! and the edit-session wrapper that keeps photo cleanup honest.

use std::path::{Path, PathBuf};

use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::VerdantError;
use crate::executor::Executor;
use crate::pager::{PagedQuery, SqlQuery};
use crate::photos;

/// Sentinel id for a specimen that has not been saved yet.
pub const NEW_SPECIMEN_ID: i64 = -1;

/// A plant in the user's collection.
///
/// `family`/`genus`/`species` are the denormalized scientific-name triple of
/// the linked catalog entry; all three are empty strings when the specimen is
/// not linked. The link itself (`species_id`) is resolved from the triple at
/// save time, never stored here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Specimen {
    pub id: i64,
    pub name: String,
    pub photo_uri: Option<String>,
    pub family: String,
    pub genus: String,
    pub species: String,
    pub last_watering_at: Option<i64>,
    pub last_turning_at: Option<i64>,
}

impl Specimen {
    pub fn new(name: &str) -> Self {
        Specimen {
            id: NEW_SPECIMEN_ID,
            name: name.to_owned(),
            photo_uri: None,
            family: String::new(),
            genus: String::new(),
            species: String::new(),
            last_watering_at: None,
            last_turning_at: None,
        }
    }

    pub fn is_saved(&self) -> bool {
        self.id > NEW_SPECIMEN_ID
    }

    /// Upsert keyed by id: a sentinel id inserts with a generated key, an
    /// existing id updates in place. The species link is resolved by exact
    /// match on the (family, genus, name) triple; no match stores NULL.
    /// Returns the row's id (generated on insert).
    pub fn save(conn: &Connection, specimen: &Specimen) -> Result<i64, VerdantError> {
        let id = if specimen.is_saved() {
            Some(specimen.id)
        } else {
            None
        };

        conn.execute(
            "INSERT INTO specimen
                (id, name, photo_uri, species_id, last_watering_at, last_turning_at, last_update)
             VALUES (
                ?1, ?2, ?3,
                CASE
                    WHEN ?6 IS NULL OR LENGTH(?6) = 0 THEN NULL
                    ELSE (
                        SELECT s.id
                        FROM species s
                        WHERE s.family = ?4
                        AND   s.genus  = ?5
                        AND   s.name   = ?6
                    )
                END,
                ?7, ?8, strftime('%s', 'now')
             )
             ON CONFLICT(id) DO UPDATE SET
                name             = excluded.name,
                photo_uri        = excluded.photo_uri,
                species_id       = excluded.species_id,
                last_watering_at = excluded.last_watering_at,
                last_turning_at  = excluded.last_turning_at,
                last_update      = excluded.last_update",
            params![
                id,
                specimen.name,
                specimen.photo_uri,
                specimen.family,
                specimen.genus,
                specimen.species,
                specimen.last_watering_at,
                specimen.last_turning_at,
            ],
        )?;

        Ok(id.unwrap_or_else(|| conn.last_insert_rowid()))
    }

    pub fn delete(conn: &Connection, id: i64) -> Result<(), VerdantError> {
        conn.execute("DELETE FROM specimen WHERE id = ?", [id])?;
        Ok(())
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> Result<Option<Self>, VerdantError> {
        conn.query_row(
            &format!("{SELECT_SPECIMEN} WHERE specimen.id = ?"),
            [id],
            Self::from_joined_row,
        )
        .optional()
        .map_err(VerdantError::DatabaseError)
    }

    /// Stamp a watering. Returns false if no such specimen exists.
    pub fn record_watering(conn: &Connection, id: i64, at: i64) -> Result<bool, VerdantError> {
        let changed = conn.execute(
            "UPDATE specimen
             SET last_watering_at = ?, last_update = strftime('%s', 'now')
             WHERE id = ?",
            params![at, id],
        )?;
        Ok(changed > 0)
    }

    /// Stamp a pot turning. Returns false if no such specimen exists.
    pub fn record_turning(conn: &Connection, id: i64, at: i64) -> Result<bool, VerdantError> {
        let changed = conn.execute(
            "UPDATE specimen
             SET last_turning_at = ?, last_update = strftime('%s', 'now')
             WHERE id = ?",
            params![at, id],
        )?;
        Ok(changed > 0)
    }

    fn from_joined_row(row: &Row<'_>) -> rusqlite::Result<Specimen> {
        Ok(Specimen {
            id: row.get("specimen_id")?,
            name: row.get("specimen_name")?,
            photo_uri: row.get("specimen_photo")?,
            // An unlinked specimen shows empty strings, not NULLs.
            family: row.get::<_, Option<String>>("species_family")?.unwrap_or_default(),
            genus: row.get::<_, Option<String>>("species_genus")?.unwrap_or_default(),
            species: row.get::<_, Option<String>>("species_name")?.unwrap_or_default(),
            last_watering_at: row.get("specimen_watering_at")?,
            last_turning_at: row.get("specimen_turning_at")?,
        })
    }
}

const SELECT_SPECIMEN: &str = "\
SELECT
    specimen.id               AS specimen_id,
    specimen.name             AS specimen_name,
    specimen.photo_uri        AS specimen_photo,
    specimen.last_watering_at AS specimen_watering_at,
    specimen.last_turning_at  AS specimen_turning_at,
    species.family            AS species_family,
    species.genus             AS species_genus,
    species.name              AS species_name
FROM specimen LEFT JOIN species ON specimen.species_id = species.id";

/// Collection pagination: search matches the specimen name, ordering is the
/// last-update timestamp so recently touched plants surface first in a stable
/// position across pages.
pub struct SpecimenQuery;

impl PagedQuery for SpecimenQuery {
    type Item = Specimen;

    fn build_query(&self, search: &str) -> SqlQuery {
        let mut sql = SELECT_SPECIMEN.to_owned();
        let mut args = Vec::new();
        if !search.is_empty() {
            sql.push_str(" WHERE specimen.name LIKE ?");
            args.push(format!("%{search}%"));
        }
        sql.push_str(" ORDER BY specimen.last_update, specimen.id");
        SqlQuery { sql, args }
    }

    fn parse_row(&self, row: &Row<'_>) -> rusqlite::Result<Specimen> {
        Specimen::from_joined_row(row)
    }
}

/// One edit session over one specimen: the single source of truth for what
/// changed. Photo-file cleanup derives from comparing the initial and current
/// values at commit/cancel time, not from tracking mutations as they happen.
pub struct EditSession {
    initial: Specimen,
    pub current: Specimen,
    pictures_dir: PathBuf,
}

impl EditSession {
    pub fn open(specimen: Specimen, pictures_dir: &Path) -> Self {
        EditSession {
            initial: specimen.clone(),
            current: specimen,
            pictures_dir: pictures_dir.to_owned(),
        }
    }

    pub fn create(name: &str, pictures_dir: &Path) -> Self {
        Self::open(Specimen::new(name), pictures_dir)
    }

    /// Swap in a newly captured (or cleared) photo. A photo captured earlier
    /// in this same session is an orphan the moment it is replaced, so its
    /// file goes away now; the initial photo stays until commit decides.
    pub fn set_photo(&mut self, uri: Option<String>) -> Result<(), VerdantError> {
        if self.current.photo_uri != self.initial.photo_uri {
            photos::delete_photo(&self.pictures_dir, self.current.photo_uri.as_deref())?;
        }
        self.current.photo_uri = uri;
        Ok(())
    }

    /// Persist the current value; if the photo changed, the initial photo
    /// file is no longer referenced and is removed.
    pub async fn commit(self, executor: &Executor) -> Result<i64, VerdantError> {
        let specimen = self.current.clone();
        let id = executor.write(move |tx| Specimen::save(tx, &specimen)).await?;
        info!("specimen {id} saved");

        if self.current.photo_uri != self.initial.photo_uri {
            photos::delete_photo(&self.pictures_dir, self.initial.photo_uri.as_deref())?;
        }

        Ok(id)
    }

    /// Abandon the session: a photo captured during it is unreferenced and is
    /// deleted; the initial photo is untouched.
    pub fn cancel(self) -> Result<(), VerdantError> {
        if self.current.photo_uri != self.initial.photo_uri {
            photos::delete_photo(&self.pictures_dir, self.current.photo_uri.as_deref())?;
        }
        Ok(())
    }

    /// Delete the specimen row and every photo file the session references.
    pub async fn delete(self, executor: &Executor) -> Result<(), VerdantError> {
        let id = self.current.id;
        executor.write(move |tx| Specimen::delete(tx, id)).await?;

        photos::delete_photo(&self.pictures_dir, self.current.photo_uri.as_deref())?;
        if self.initial.photo_uri != self.current.photo_uri {
            photos::delete_photo(&self.pictures_dir, self.initial.photo_uri.as_deref())?;
        }
        Ok(())
    }
}
