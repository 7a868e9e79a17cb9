pub const UPGRADE_0_TO_1_SQL: &str = r#"
--
-- Schema Upgrade: Version 0 → 1
--
-- Base schema: the species reference catalog and the user's specimen
-- collection. The migration engine owns the transaction; scripts contain no
-- BEGIN/COMMIT of their own.
--

-- Species catalog. Read-only from the application's perspective; rows are
-- created and updated only by seed scripts. The (family, genus, name) triple
-- is the natural key used for specimen linkage; `slug` is the searchable,
-- sortable form of the scientific name.
CREATE TABLE IF NOT EXISTS species (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    slug         TEXT NOT NULL UNIQUE,
    name         TEXT NOT NULL,
    genus        TEXT NOT NULL,
    family       TEXT NOT NULL,
    photo_uri    TEXT,
    climate_zone INTEGER NOT NULL DEFAULT 0,
    moisture     INTEGER NOT NULL DEFAULT 0,
    life_time    INTEGER NOT NULL DEFAULT 0,
    shape        INTEGER NOT NULL DEFAULT 0,
    origin       INTEGER NOT NULL DEFAULT 0,
    UNIQUE (family, genus, name)
);

-- User-owned specimens. `species_id` is resolved at save time from the
-- denormalized scientific-name triple, never chosen directly by the UI.
CREATE TABLE IF NOT EXISTS specimen (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    name             TEXT NOT NULL,
    photo_uri        TEXT,
    species_id       INTEGER,
    last_watering_at INTEGER,
    last_update      INTEGER NOT NULL DEFAULT (strftime('%s', 'now')),
    FOREIGN KEY (species_id) REFERENCES species(id)
);

CREATE INDEX IF NOT EXISTS idx_specimen_name ON specimen (name);
"#;

pub const SEED_0_TO_1_SQL: &str = r#"
--
-- Seed: Version 1
--
-- Starter species catalog. Enum columns store the integer codes defined in
-- src/species.rs.
--

INSERT INTO species (slug, name, genus, family, climate_zone, moisture, life_time, shape, origin) VALUES
    ('crassulaceae-crassula-ovata',        'ovata',      'Crassula',     'Crassulaceae',  4, 2, 3, 8, 1),
    ('araceae-monstera-deliciosa',         'deliciosa',  'Monstera',     'Araceae',       2, 0, 3, 4, 4),
    ('asparagaceae-chlorophytum-comosum',  'comosum',    'Chlorophytum', 'Asparagaceae',  2, 0, 3, 5, 1),
    ('araceae-epipremnum-aureum',          'aureum',     'Epipremnum',   'Araceae',       2, 0, 3, 4, 11),
    ('cactaceae-echinocactus-grusonii',    'grusonii',   'Echinocactus', 'Cactaceae',     4, 2, 3, 8, 10),
    ('asphodelaceae-aloe-vera',            'vera',       'Aloe',         'Asphodelaceae', 4, 2, 3, 8, 9),
    ('moraceae-ficus-lyrata',              'lyrata',     'Ficus',        'Moraceae',      2, 0, 3, 10, 1),
    ('marantaceae-calathea-orbifolia',     'orbifolia',  'Calathea',     'Marantaceae',   2, 0, 3, 5, 12);
"#;
