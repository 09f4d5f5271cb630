//! Bookmark Manager for SecretMarks.
//!
//! Implements `BookmarkManagerTrait`, the encrypted record store backed by SQLite via
//! `rusqlite`. Every text field is sealed on its own with the session key; only the
//! id and the URL fingerprint are stored in the clear.

use std::collections::BTreeSet;

use rusqlite::{params, Connection, OptionalExtension};

use crate::database::migrations;
use crate::services::bookmark_query::apply_query;
use crate::services::crypto_service::{CryptoService, CryptoServiceTrait, SessionKey};
use crate::services::fingerprint::fingerprint;
use crate::services::tags::{apply_tag_edit, parse_tags};
use crate::types::bookmark::{
    BackfillFailure, BackfillReport, BookmarkFields, BookmarkListing, BookmarkRecord,
};
use crate::types::errors::BookmarkError;
use crate::types::query::BookmarkQuery;
use crate::types::reconcile::TagEditMode;

const SELECT_COLUMNS: &str =
    r#"SELECT id, domain, title, url, tags, "group", url_fingerprint FROM bookmarks"#;

/// Trait defining record store operations. The session key is passed to every call
/// that reads or writes an encrypted field.
pub trait BookmarkManagerTrait {
    /// Creates the schema if needed. Idempotent.
    fn init(&self) -> Result<(), BookmarkError>;
    fn insert(&mut self, fields: &BookmarkFields, key: &SessionKey) -> Result<i64, BookmarkError>;
    /// Lists every record that decrypts; the rest are counted in `skipped`.
    fn get_all(&self, key: &SessionKey) -> Result<BookmarkListing, BookmarkError>;
    fn get_by_id(&self, id: i64, key: &SessionKey) -> Result<BookmarkRecord, BookmarkError>;
    fn update_full(
        &mut self,
        id: i64,
        fields: &BookmarkFields,
        key: &SessionKey,
    ) -> Result<(), BookmarkError>;
    fn update_tags(&mut self, id: i64, tags: &str, key: &SessionKey) -> Result<(), BookmarkError>;
    fn delete_by_id(&mut self, id: i64) -> Result<(), BookmarkError>;
    fn find_by_fingerprint(
        &self,
        fingerprint: &str,
        key: &SessionKey,
    ) -> Result<Option<BookmarkRecord>, BookmarkError>;
    /// Fingerprints legacy rows, then installs the unique fingerprint index.
    fn backfill_fingerprints(&mut self, key: &SessionKey) -> Result<BackfillReport, BookmarkError>;
    /// Rewrites `target_id` and deletes `remove_id` as one transaction.
    fn replace_and_delete(
        &mut self,
        target_id: i64,
        fields: &BookmarkFields,
        remove_id: i64,
        key: &SessionKey,
    ) -> Result<(), BookmarkError>;
    fn collect_tags(&self, key: &SessionKey) -> Result<BTreeSet<String>, BookmarkError>;
    /// Applies one tag edit to several records. Returns how many were updated.
    fn bulk_edit_tags(
        &mut self,
        ids: &[i64],
        mode: TagEditMode,
        inputs: &[String],
        key: &SessionKey,
    ) -> Result<usize, BookmarkError>;
    fn search(
        &self,
        query: &BookmarkQuery,
        key: &SessionKey,
    ) -> Result<Vec<BookmarkRecord>, BookmarkError>;
}

/// A row as stored: ciphertext tokens plus the plaintext id and fingerprint.
struct StoredRow {
    id: i64,
    domain: String,
    title: String,
    url: String,
    tags: Option<String>,
    group: Option<String>,
    url_fingerprint: Option<String>,
}

/// Field tokens ready to be written.
struct SealedFields {
    domain: String,
    title: String,
    url: String,
    tags: String,
    group: String,
    url_fingerprint: String,
}

/// Bookmark manager backed by a SQLite connection.
pub struct BookmarkManager<'a> {
    conn: &'a Connection,
    crypto: CryptoService,
}

impl<'a> BookmarkManager<'a> {
    /// Creates a new `BookmarkManager` using the provided database connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self {
            conn,
            crypto: CryptoService::new(),
        }
    }

    /// Reads a single row without decrypting it.
    fn row_to_stored(row: &rusqlite::Row) -> rusqlite::Result<StoredRow> {
        Ok(StoredRow {
            id: row.get(0)?,
            domain: row.get(1)?,
            title: row.get(2)?,
            url: row.get(3)?,
            tags: row.get(4)?,
            group: row.get(5)?,
            url_fingerprint: row.get(6)?,
        })
    }

    fn open_row(&self, row: StoredRow, key: &SessionKey) -> Result<BookmarkRecord, BookmarkError> {
        let id = row.id;
        let open = |token: &str| {
            self.crypto
                .decrypt_field(token, key)
                .map_err(|source| BookmarkError::Decryption { id, source })
        };
        let optional = |token: Option<&str>| match token {
            Some(t) if !t.is_empty() => open(t),
            _ => Ok(String::new()),
        };

        let domain = open(&row.domain)?;
        let title = open(&row.title)?;
        let url = open(&row.url)?;
        let tags = optional(row.tags.as_deref())?;
        let mut group = optional(row.group.as_deref())?;
        if group.is_empty() {
            group = domain.clone();
        }

        Ok(BookmarkRecord {
            id,
            domain,
            title,
            url,
            tags,
            group,
            url_fingerprint: row.url_fingerprint.filter(|fp| !fp.is_empty()),
        })
    }

    fn seal(&self, fields: &BookmarkFields, key: &SessionKey) -> Result<SealedFields, BookmarkError> {
        Ok(SealedFields {
            domain: self.crypto.encrypt_field(&fields.domain, key)?,
            title: self.crypto.encrypt_field(&fields.title, key)?,
            url: self.crypto.encrypt_field(&fields.url, key)?,
            tags: self.crypto.encrypt_field(&fields.tags, key)?,
            group: self.crypto.encrypt_field(fields.effective_group(), key)?,
            url_fingerprint: fingerprint(&fields.url),
        })
    }

    fn write_sealed(conn: &Connection, id: i64, sealed: &SealedFields) -> Result<usize, BookmarkError> {
        Ok(conn.execute(
            r#"UPDATE bookmarks
               SET domain = ?1, title = ?2, url = ?3, tags = ?4, "group" = ?5, url_fingerprint = ?6
               WHERE id = ?7"#,
            params![
                sealed.domain,
                sealed.title,
                sealed.url,
                sealed.tags,
                sealed.group,
                sealed.url_fingerprint,
                id
            ],
        )?)
    }

    fn load_stored(&self, sql_filter: &str, param: &dyn rusqlite::ToSql) -> Result<Option<StoredRow>, BookmarkError> {
        let sql = format!("{} {} ORDER BY id LIMIT 1", SELECT_COLUMNS, sql_filter);
        Ok(self
            .conn
            .query_row(&sql, [param], Self::row_to_stored)
            .optional()?)
    }

    /// Nulls out later rows that share a fingerprint with an earlier one, so the unique
    /// index can be built. Returns `(row, owner)` pairs.
    fn release_colliding_fingerprints(conn: &Connection) -> Result<Vec<(i64, i64)>, BookmarkError> {
        let mut stmt = conn.prepare(
            "SELECT b.id, MIN(o.id) FROM bookmarks b
             JOIN bookmarks o ON o.url_fingerprint = b.url_fingerprint AND o.id < b.id
             GROUP BY b.id",
        )?;
        let collisions = stmt
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        for (id, _) in &collisions {
            conn.execute(
                "UPDATE bookmarks SET url_fingerprint = NULL WHERE id = ?1",
                params![id],
            )?;
        }
        Ok(collisions)
    }
}

impl<'a> BookmarkManagerTrait for BookmarkManager<'a> {
    fn init(&self) -> Result<(), BookmarkError> {
        Ok(migrations::run_all(self.conn)?)
    }

    /// Inserts a record and returns its new id.
    fn insert(&mut self, fields: &BookmarkFields, key: &SessionKey) -> Result<i64, BookmarkError> {
        let sealed = self.seal(fields, key)?;
        self.conn.execute(
            r#"INSERT INTO bookmarks (domain, title, url, tags, "group", url_fingerprint)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
            params![
                sealed.domain,
                sealed.title,
                sealed.url,
                sealed.tags,
                sealed.group,
                sealed.url_fingerprint
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!(id, "inserted bookmark");
        Ok(id)
    }

    fn get_all(&self, key: &SessionKey) -> Result<BookmarkListing, BookmarkError> {
        let mut stmt = self.conn.prepare(&format!("{} ORDER BY id", SELECT_COLUMNS))?;
        let rows = stmt
            .query_map([], Self::row_to_stored)?
            .collect::<Result<Vec<_>, _>>()?;

        let mut listing = BookmarkListing::default();
        for row in rows {
            match self.open_row(row, key) {
                Ok(record) => listing.records.push(record),
                Err(BookmarkError::Decryption { id, .. }) => {
                    tracing::warn!(id, "skipping bookmark that failed to decrypt");
                    listing.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(listing)
    }

    fn get_by_id(&self, id: i64, key: &SessionKey) -> Result<BookmarkRecord, BookmarkError> {
        let row = self
            .load_stored("WHERE id = ?1", &id)?
            .ok_or(BookmarkError::NotFound(id))?;
        self.open_row(row, key)
    }

    /// Replaces every field of an existing record; the fingerprint follows the new URL.
    fn update_full(
        &mut self,
        id: i64,
        fields: &BookmarkFields,
        key: &SessionKey,
    ) -> Result<(), BookmarkError> {
        let sealed = self.seal(fields, key)?;
        if Self::write_sealed(self.conn, id, &sealed)? == 0 {
            return Err(BookmarkError::NotFound(id));
        }
        tracing::debug!(id, "updated bookmark");
        Ok(())
    }

    fn update_tags(&mut self, id: i64, tags: &str, key: &SessionKey) -> Result<(), BookmarkError> {
        let token = self.crypto.encrypt_field(tags, key)?;
        let affected = self.conn.execute(
            "UPDATE bookmarks SET tags = ?1 WHERE id = ?2",
            params![token, id],
        )?;
        if affected == 0 {
            return Err(BookmarkError::NotFound(id));
        }
        Ok(())
    }

    fn delete_by_id(&mut self, id: i64) -> Result<(), BookmarkError> {
        let affected = self
            .conn
            .execute("DELETE FROM bookmarks WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(BookmarkError::NotFound(id));
        }
        tracing::debug!(id, "deleted bookmark");
        Ok(())
    }

    /// Looks up the record owning `fingerprint`. A match that cannot be decrypted is an
    /// error, not `None`.
    fn find_by_fingerprint(
        &self,
        fingerprint: &str,
        key: &SessionKey,
    ) -> Result<Option<BookmarkRecord>, BookmarkError> {
        match self.load_stored("WHERE url_fingerprint = ?1", &fingerprint)? {
            Some(row) => self.open_row(row, key).map(Some),
            None => Ok(None),
        }
    }

    fn backfill_fingerprints(&mut self, key: &SessionKey) -> Result<BackfillReport, BookmarkError> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "UPDATE bookmarks SET url_fingerprint = NULL WHERE url_fingerprint = ''",
            [],
        )?;

        let pending: Vec<(i64, String)> = {
            let mut stmt = tx.prepare(
                "SELECT id, url FROM bookmarks WHERE url_fingerprint IS NULL ORDER BY id",
            )?;
            let rows = stmt
                .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        };

        let mut report = BackfillReport::default();
        for (id, token) in pending {
            let url = match self.crypto.decrypt_field(&token, key) {
                Ok(url) => url,
                Err(_) => {
                    tracing::warn!(id, "backfill: url did not decrypt, fingerprint left empty");
                    report.failed.push((id, BackfillFailure::Undecryptable));
                    continue;
                }
            };
            let fp = fingerprint(&url);
            let owner: Option<i64> = tx
                .query_row(
                    "SELECT id FROM bookmarks WHERE url_fingerprint = ?1 AND id != ?2 LIMIT 1",
                    params![fp, id],
                    |row| row.get(0),
                )
                .optional()?;
            if let Some(owner) = owner {
                tracing::warn!(id, owner, "backfill: duplicate url, fingerprint left empty");
                report.failed.push((id, BackfillFailure::DuplicateOf(owner)));
                continue;
            }
            tx.execute(
                "UPDATE bookmarks SET url_fingerprint = ?1 WHERE id = ?2",
                params![fp, id],
            )?;
            report.updated += 1;
        }

        for (id, owner) in Self::release_colliding_fingerprints(&tx)? {
            tracing::warn!(id, owner, "backfill: released colliding fingerprint");
            report.failed.push((id, BackfillFailure::DuplicateOf(owner)));
        }

        migrations::install_fingerprint_index(&tx)?;
        tx.commit()?;

        tracing::info!(
            updated = report.updated,
            failed = report.failed.len(),
            "fingerprint backfill complete"
        );
        Ok(report)
    }

    fn replace_and_delete(
        &mut self,
        target_id: i64,
        fields: &BookmarkFields,
        remove_id: i64,
        key: &SessionKey,
    ) -> Result<(), BookmarkError> {
        let sealed = self.seal(fields, key)?;
        let tx = self.conn.unchecked_transaction()?;
        // Delete first so the removed row can never hold the fingerprint being written.
        if tx.execute("DELETE FROM bookmarks WHERE id = ?1", params![remove_id])? == 0 {
            return Err(BookmarkError::NotFound(remove_id));
        }
        if Self::write_sealed(&tx, target_id, &sealed)? == 0 {
            return Err(BookmarkError::NotFound(target_id));
        }
        tx.commit()?;
        tracing::debug!(target_id, remove_id, "replaced bookmark and removed edited copy");
        Ok(())
    }

    fn collect_tags(&self, key: &SessionKey) -> Result<BTreeSet<String>, BookmarkError> {
        Ok(self
            .get_all(key)?
            .records
            .iter()
            .flat_map(|bm| parse_tags(&bm.tags))
            .collect())
    }

    fn bulk_edit_tags(
        &mut self,
        ids: &[i64],
        mode: TagEditMode,
        inputs: &[String],
        key: &SessionKey,
    ) -> Result<usize, BookmarkError> {
        let tx = self.conn.unchecked_transaction()?;
        let mut count = 0;
        for &id in ids {
            let stored: Option<Option<String>> = tx
                .query_row(
                    "SELECT tags FROM bookmarks WHERE id = ?1",
                    params![id],
                    |row| row.get(0),
                )
                .optional()?;
            let current = match stored.ok_or(BookmarkError::NotFound(id))? {
                Some(token) if !token.is_empty() => self
                    .crypto
                    .decrypt_field(&token, key)
                    .map_err(|source| BookmarkError::Decryption { id, source })?,
                _ => String::new(),
            };
            let edited = apply_tag_edit(&current, mode, inputs);
            let token = self.crypto.encrypt_field(&edited, key)?;
            tx.execute(
                "UPDATE bookmarks SET tags = ?1 WHERE id = ?2",
                params![token, id],
            )?;
            count += 1;
        }
        tx.commit()?;
        tracing::debug!(count, ?mode, "bulk tag edit applied");
        Ok(count)
    }

    fn search(
        &self,
        query: &BookmarkQuery,
        key: &SessionKey,
    ) -> Result<Vec<BookmarkRecord>, BookmarkError> {
        Ok(apply_query(self.get_all(key)?.records, query))
    }
}
