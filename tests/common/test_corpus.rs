//! TestCorpus builder: a temp directory holding a corpus database with a
//! populated token store, plus helpers to drive the CLI against it

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use rusqlite::{params, Connection};
use tempfile::TempDir;

pub struct TestCorpus {
    dir: TempDir,
    db: PathBuf,
}

impl TestCorpus {
    /// Create a corpus database with an empty token store
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let db = dir.path().join("corpus.db");

        let conn = Connection::open(&db).expect("Failed to create database");
        conn.execute_batch(
            "CREATE TABLE Token (
                TokenId INTEGER PRIMARY KEY,
                SurfaceForm TEXT
            );",
        )
        .expect("Failed to create Token table");

        Self { dir, db }
    }

    /// Create a corpus populated with tokens
    pub fn with_tokens(tokens: &[(i64, &str)]) -> Self {
        let corpus = Self::new();
        for (id, surface) in tokens {
            corpus.add_token(*id, surface);
        }
        corpus
    }

    /// Append a token to the token store
    pub fn add_token(&self, token_id: i64, surface: &str) -> &Self {
        self.connect()
            .execute(
                "INSERT INTO Token (TokenId, SurfaceForm) VALUES (?1, ?2)",
                params![token_id, surface],
            )
            .expect("Failed to insert token");
        self
    }

    /// Write a `surface<TAB>lemma` lexicon into the temp dir
    pub fn write_lexicon(&self, name: &str, entries: &[(&str, &str)]) -> PathBuf {
        let path = self.dir.path().join(name);
        let content: String = entries
            .iter()
            .map(|(surface, lemma)| format!("{}\t{}\n", surface, lemma))
            .collect();
        fs::write(&path, content).expect("Failed to write lexicon");
        path
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn db_path(&self) -> &Path {
        &self.db
    }

    pub fn db_str(&self) -> String {
        self.db.to_string_lossy().to_string()
    }

    /// Open a connection with foreign keys enforced
    pub fn connect(&self) -> Connection {
        lemmaforge::store::open_database(&self.db).expect("Failed to open database")
    }

    /// Run the lemmaforge binary with an isolated (absent) config file
    pub fn run_cli(&self, args: &[&str]) -> Output {
        let config = self.dir.path().join("no-config.toml");
        Command::new(env!("CARGO_BIN_EXE_lemmaforge"))
            .current_dir(self.path())
            .env_remove("LEMMAFORGE_DB")
            .env_remove("RUST_LOG")
            .arg("--config")
            .arg(&config)
            .args(args)
            .output()
            .expect("Failed to run CLI")
    }

    /// Run `rebuild --db <corpus>` with extra arguments
    pub fn run_rebuild(&self, extra: &[&str]) -> Output {
        let db = self.db_str();
        let mut args = vec!["rebuild", "--db", db.as_str()];
        args.extend_from_slice(extra);
        self.run_cli(&args)
    }

    /// Lemma texts ordered by identifier
    pub fn lemma_texts(&self) -> Vec<String> {
        let conn = self.connect();
        let mut stmt = conn
            .prepare("SELECT LemmaText FROM Lemma ORDER BY LemmaId")
            .expect("Lemma table missing");
        stmt.query_map([], |row| row.get::<_, String>(0))
            .expect("Query failed")
            .collect::<Result<Vec<_>, _>>()
            .expect("Row read failed")
    }

    /// (TokenId, LemmaText) pairs ordered by token
    pub fn token_lemmas(&self) -> Vec<(i64, String)> {
        let conn = self.connect();
        let mut stmt = conn
            .prepare(
                "SELECT tl.TokenId, l.LemmaText
                 FROM TokenLemma tl JOIN Lemma l ON l.LemmaId = tl.LemmaId
                 ORDER BY tl.TokenId",
            )
            .expect("TokenLemma table missing");
        stmt.query_map([], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })
        .expect("Query failed")
        .collect::<Result<Vec<_>, _>>()
        .expect("Row read failed")
    }

    pub fn has_table(&self, table: &str) -> bool {
        lemmaforge::store::table_exists(&self.connect(), table).expect("Query failed")
    }

    pub fn metadata_count(&self) -> usize {
        lemmaforge::store::metadata_history(&self.connect(), None)
            .expect("Query failed")
            .len()
    }

    pub fn latest_signature(&self) -> Option<String> {
        lemmaforge::store::latest_metadata(&self.connect())
            .expect("Query failed")
            .map(|m| m.signature)
    }
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}
