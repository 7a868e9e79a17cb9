pub const SEED_2_TO_3_SQL: &str = r#"
--
-- Seed: Version 3
--
-- Catalog additions and one correction. Seed-only step: there is no
-- upgrade_3 script.
--

INSERT INTO species (slug, name, genus, family, climate_zone, moisture, life_time, shape, origin) VALUES
    ('orchidaceae-phalaenopsis-amabilis',  'amabilis', 'Phalaenopsis',  'Orchidaceae',     2, 3, 3, 5, 14),
    ('poaceae-phyllostachys-aurea',        'aurea',    'Phyllostachys', 'Poaceae',         1, 0, 3, 1, 6),
    ('amaryllidaceae-hippeastrum-reginae', 'reginae',  'Hippeastrum',   'Amaryllidaceae',  2, 4, 3, 2, 12),
    ('apocynaceae-adenium-obesum',         'obesum',   'Adenium',       'Apocynaceae',     4, 2, 3, 3, 1);

-- Calathea orbifolia prefers consistently damp substrate; 'moderate' was wrong.
UPDATE species SET moisture = 1 WHERE slug = 'marantaceae-calathea-orbifolia';
"#;
