//! SecretMarks console demo.
//!
//! Unlocks a vault and walks through add, duplicate detection, merge, tag editing and
//! listing. The vault is the configured `database_path` unless a path is given as the
//! first argument; `:memory:` keeps it in memory. The password is read from
//! `SECRETMARKS_PASSWORD`.

use std::error::Error;
use std::path::PathBuf;

use secretmarks::database::Database;
use secretmarks::managers::bookmark_manager::BookmarkManagerTrait;
use secretmarks::managers::reconciliation::{FixedDecision, Reconciler};
use secretmarks::managers::session_manager::{SessionManager, SessionManagerTrait};
use secretmarks::services::bookmark_query::group_records;
use secretmarks::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use secretmarks::types::bookmark::{BookmarkFields, BookmarkRecord};
use secretmarks::types::query::{BookmarkQuery, SortOrder};
use secretmarks::types::reconcile::{ReconcileDecision, TagEditMode};

const PASSWORD_VAR: &str = "SECRETMARKS_PASSWORD";

/// The vault password from the environment. There is no built-in fallback.
fn vault_password(value: Option<String>) -> Result<String, String> {
    match value {
        Some(password) if !password.is_empty() => Ok(password),
        Some(_) => Err(format!("{} must not be empty", PASSWORD_VAR)),
        None => Err(format!("{} must be set to unlock the vault", PASSWORD_VAR)),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let mut settings_engine = SettingsEngine::new(None);
    let settings = settings_engine.load()?;
    secretmarks::logging::init_logging(&settings.log_filter)?;

    println!();
    println!("SecretMarks v{} demo", env!("CARGO_PKG_VERSION"));
    println!("config: {}", settings_engine.get_config_path().display());
    println!();

    let password = vault_password(std::env::var(PASSWORD_VAR).ok())?;

    let db = match std::env::args().nth(1) {
        Some(arg) if arg == ":memory:" => {
            println!("vault: in memory");
            Database::open_in_memory()?
        }
        arg => {
            let path = arg
                .map(PathBuf::from)
                .unwrap_or_else(|| settings.database_path.clone());
            println!("vault: {}", path.display());
            Database::open_creating_dirs(&path)?
        }
    };

    section("Unlock");
    let session = SessionManager::new(db.connection());
    let fresh = !session.is_initialized()?;
    let key = session.authenticate(&password, settings.kdf_iterations)?;
    println!("  vault {}", if fresh { "created" } else { "unlocked" });

    let mut reconciler = Reconciler::new(db.connection());
    let report = reconciler.store_mut().backfill_fingerprints(&key)?;
    println!(
        "  fingerprint backfill: {} updated, {} left empty",
        report.updated,
        report.failed.len()
    );

    section("Add");
    let first = BookmarkFields::from_url(
        "https://www.rust-lang.org/learn?utm_source=newsletter",
        "Learn Rust",
        "rust, Docs",
    );
    let outcome = reconciler.add(&first, &key, &mut FixedDecision(ReconcileDecision::Skip))?;
    println!("  {:?}", outcome);

    section("Duplicate");
    let variant = BookmarkFields::from_url(
        "HTTPS://WWW.RUST-LANG.ORG/learn/#getting-started",
        "Learn Rust: books, courses and more",
        "docs, tutorial",
    );
    if let Some(existing) = reconciler.check_duplicate(&variant.url, &key)? {
        println!("  already stored as #{}: {}", existing.id, existing.title);
    }
    let outcome = reconciler.add(&variant, &key, &mut |existing: &BookmarkRecord, _: &BookmarkFields| {
        println!("  collision with #{}, merging", existing.id);
        ReconcileDecision::Merge
    })?;
    println!("  {:?}", outcome);

    section("Tags");
    let other = BookmarkFields::from_url("https://docs.rs/", "Docs.rs", "");
    let other_id = reconciler
        .add(&other, &key, &mut FixedDecision(ReconcileDecision::Skip))?
        .id();
    let touched = reconciler.store_mut().bulk_edit_tags(
        &[other_id],
        TagEditMode::Add,
        &["rust".to_string(), "crates".to_string()],
        &key,
    )?;
    println!("  edited tags on {} bookmark(s)", touched);
    let tags: Vec<String> = reconciler.store().collect_tags(&key)?.into_iter().collect();
    println!("  all tags: {}", tags.join(", "));

    section("List");
    let query = BookmarkQuery {
        keyword: "rust".to_string(),
        tag: None,
        sort: SortOrder::TitleAsc,
    };
    let found = reconciler.store().search(&query, &key)?;
    for (group, records) in group_records(found) {
        println!("  [{}]", group);
        for bm in records {
            println!("    #{} {} <{}> ({})", bm.id, bm.title, bm.url, bm.tags);
        }
    }
    let listing = reconciler.store().get_all(&key)?;
    if listing.skipped > 0 {
        println!("  {} bookmark(s) could not be decrypted", listing.skipped);
    }

    println!();
    Ok(())
}

fn section(name: &str) {
    println!("-- {} --", name);
}
