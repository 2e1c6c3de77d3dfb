//! Relational schema of the corpus store

/// Tables counted by `corpus_stats`, in creation order
pub const TABLES: [&str; 9] = [
    "text",
    "sentence",
    "pos",
    "gloss",
    "allomorph",
    "stem",
    "token",
    "grammar",
    "translation",
];

/// Idempotent DDL. Every lookup table carries a UNIQUE natural key so that
/// upserts can resolve conflicts in a single statement.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS text (
    id      INTEGER PRIMARY KEY,
    title   TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS sentence (
    id            INTEGER PRIMARY KEY,
    text_id       INTEGER NOT NULL REFERENCES text(id),
    sent_address  TEXT NOT NULL,
    sent          TEXT NOT NULL,
    translation   TEXT,
    CONSTRAINT unique_sentence UNIQUE (text_id, sent_address)
);

CREATE TABLE IF NOT EXISTS pos (
    id      INTEGER PRIMARY KEY,
    name    TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS gloss (
    id      INTEGER PRIMARY KEY,
    name    TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS allomorph (
    id        INTEGER PRIMARY KEY,
    translit  TEXT NOT NULL,
    gloss_id  INTEGER NOT NULL REFERENCES gloss(id),
    CONSTRAINT unique_allomorph UNIQUE (gloss_id, translit)
);

CREATE TABLE IF NOT EXISTS stem (
    id            INTEGER PRIMARY KEY,
    translit      TEXT NOT NULL,
    translit_syl  TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS token (
    id           INTEGER PRIMARY KEY,
    sent_id      INTEGER NOT NULL REFERENCES sentence(id),
    pos_in_sent  INTEGER NOT NULL,
    surface      TEXT NOT NULL,
    pos_id       INTEGER REFERENCES pos(id),
    stem_id      INTEGER REFERENCES stem(id),
    CONSTRAINT unique_token UNIQUE (sent_id, pos_in_sent)
);

CREATE TABLE IF NOT EXISTS grammar (
    token_id       INTEGER NOT NULL REFERENCES token(id),
    pos_in_suffix  INTEGER NOT NULL,
    allomorph_id   INTEGER NOT NULL REFERENCES allomorph(id),
    PRIMARY KEY (token_id, pos_in_suffix)
);

CREATE TABLE IF NOT EXISTS translation (
    id        INTEGER PRIMARY KEY,
    token_id  INTEGER NOT NULL REFERENCES token(id),
    lang      TEXT NOT NULL,
    transl    TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_token_stem ON token(stem_id);
CREATE INDEX IF NOT EXISTS idx_token_pos ON token(pos_id);
CREATE INDEX IF NOT EXISTS idx_grammar_allomorph ON grammar(allomorph_id);
CREATE INDEX IF NOT EXISTS idx_allomorph_gloss ON allomorph(gloss_id);
CREATE INDEX IF NOT EXISTS idx_stem_translit ON stem(translit);
CREATE INDEX IF NOT EXISTS idx_translation_token ON translation(token_id);
"#;
