use std::fs;
use std::path::Path;

use clap::{Parser, Subcommand};
use directories::ProjectDirs;
use log::info;

use verdant::config::Config;
use verdant::database::Database;
use verdant::error::VerdantError;
use verdant::pager::{PagedQuery, Pager};
use verdant::photos;
use verdant::species::SpeciesQuery;
use verdant::specimens::{EditSession, Specimen, SpecimenQuery};

#[derive(Parser)]
#[command(
    name = "verdant",
    version,
    about = "Verdant: local plant-collection tracker"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List specimens in the collection, most recently updated last
    Specimens {
        /// Filter by a case-sensitive name fragment
        #[arg(long = "search", short = 's', default_value = "")]
        search: String,
    },

    /// Browse the species catalog
    Species {
        /// Filter by a case-sensitive slug fragment
        #[arg(long = "search", short = 's', default_value = "")]
        search: String,
    },

    /// Add a specimen to the collection
    Add {
        /// Display name of the plant
        name: String,

        /// Family of the catalog species to link (requires genus and species)
        #[arg(long = "family", requires = "genus", requires = "species")]
        family: Option<String>,

        /// Genus of the catalog species to link
        #[arg(long = "genus")]
        genus: Option<String>,

        /// Species epithet of the catalog species to link
        #[arg(long = "species")]
        species: Option<String>,

        /// Photo file to import into the photo store
        #[arg(long = "photo", short = 'p')]
        photo: Option<String>,
    },

    /// Record that a specimen was watered now
    Water {
        /// Specimen id
        id: i64,
    },

    /// Record that a specimen's pot was turned now
    Turn {
        /// Specimen id
        id: i64,
    },

    /// Delete a specimen and its photos
    Delete {
        /// Specimen id
        id: i64,
    },
}

impl Cli {
    pub fn handle_command_line(
        config: &Config,
        project_dirs: &ProjectDirs,
    ) -> Result<(), VerdantError> {
        let args = Cli::parse();

        let data_dir = project_dirs.data_local_dir();
        let db_path = data_dir.join("verdant.db");
        let pictures_dir = data_dir.join("pictures");
        let asset = config.database.asset.as_ref().map(Path::new);

        let rt = tokio::runtime::Runtime::new()
            .map_err(|e| VerdantError::Error(format!("Failed to create runtime: {}", e)))?;

        rt.block_on(async {
            let database = Database::open(&db_path, asset)?;

            match &args.command {
                Command::Specimens { search } => {
                    let pager = Pager::with_page_size(
                        database.executor().clone(),
                        SpecimenQuery,
                        config.paging.page_size(),
                    );
                    for specimen in drain_pages(&pager, search).await? {
                        print_specimen(&specimen);
                    }
                }
                Command::Species { search } => {
                    let pager = Pager::with_page_size(
                        database.executor().clone(),
                        SpeciesQuery,
                        config.paging.page_size(),
                    );
                    for row in drain_pages(&pager, search).await? {
                        println!("{:>4}  {}", row.id, row.scientific_name());
                    }
                }
                Command::Add {
                    name,
                    family,
                    genus,
                    species,
                    photo,
                } => {
                    let mut session = EditSession::create(name, &pictures_dir);
                    if let (Some(family), Some(genus), Some(species)) = (family, genus, species) {
                        session.current.family = family.clone();
                        session.current.genus = genus.clone();
                        session.current.species = species.clone();
                    }
                    if let Some(photo) = photo {
                        let uri = import_photo(&pictures_dir, name, Path::new(photo))?;
                        session.set_photo(Some(uri))?;
                    }
                    let id = session.commit(database.executor()).await?;
                    println!("Added specimen {id}");
                }
                Command::Water { id } => {
                    let id = *id;
                    let now = chrono::Utc::now().timestamp();
                    let found = database
                        .executor()
                        .write(move |tx| Specimen::record_watering(tx, id, now))
                        .await?;
                    if !found {
                        return Err(VerdantError::Error(format!("No specimen with id {id}")));
                    }
                    println!("Watered specimen {id}");
                }
                Command::Turn { id } => {
                    let id = *id;
                    let now = chrono::Utc::now().timestamp();
                    let found = database
                        .executor()
                        .write(move |tx| Specimen::record_turning(tx, id, now))
                        .await?;
                    if !found {
                        return Err(VerdantError::Error(format!("No specimen with id {id}")));
                    }
                    println!("Turned specimen {id}");
                }
                Command::Delete { id } => {
                    let id = *id;
                    let specimen = database
                        .executor()
                        .read(move |conn| Specimen::get_by_id(conn, id))
                        .await?
                        .ok_or_else(|| VerdantError::Error(format!("No specimen with id {id}")))?;
                    EditSession::open(specimen, &pictures_dir)
                        .delete(database.executor())
                        .await?;
                    println!("Deleted specimen {id}");
                }
            }

            Ok(())
        })
    }
}

/// Page through the full result set for one search term.
async fn drain_pages<Q>(pager: &Pager<Q>, search: &str) -> Result<Vec<Q::Item>, VerdantError>
where
    Q: PagedQuery,
    Q::Item: Clone,
{
    pager.update_search(search).await?;
    while !pager.snapshot().end_reached {
        pager.load_next_page().await?;
    }
    Ok(pager.snapshot().items)
}

fn print_specimen(specimen: &Specimen) {
    let species = if specimen.species.is_empty() {
        "(unlinked)".to_owned()
    } else {
        format!("{} {} {}", specimen.family, specimen.genus, specimen.species)
    };
    let watered = match specimen.last_watering_at {
        Some(ts) => format!("watered {}", format_day(ts)),
        None => "never watered".to_owned(),
    };
    println!(
        "{:>4}  {:<24} {:<40} {}",
        specimen.id, specimen.name, species, watered
    );
}

fn format_day(ts: i64) -> String {
    match chrono::DateTime::from_timestamp(ts, 0) {
        Some(dt) => dt.format("%Y-%m-%d").to_string(),
        None => "?".to_owned(),
    }
}

/// Copy a photo from outside the store into the specimens folder under a
/// fresh store name, and return that name as the specimen's photo URI.
fn import_photo(
    pictures_dir: &Path,
    specimen_name: &str,
    source: &Path,
) -> Result<String, VerdantError> {
    let destination = photos::new_photo_path(pictures_dir, specimen_name)?;
    fs::copy(source, &destination)?;
    info!(
        "Imported photo {} as {}",
        source.display(),
        destination.display()
    );

    let uri = destination
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| VerdantError::Error("Photo store produced an unusable name".into()))?;
    Ok(uri.to_owned())
}
