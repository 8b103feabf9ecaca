use sea_orm::DatabaseConnection;

use crate::{Ledger, ResultEngine, SeaStore};

mod accounts;
mod groups;
mod users;

/// Run a block inside a unit of work, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$unit:ident| $body:expr) => {{
        let $unit = $crate::Storage::begin($self.ledger.storage()).await?;
        let result = $body;
        match result {
            Ok(value) => {
                $crate::UnitOfWork::commit($unit).await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// One page of a listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Zero-based page index.
    pub page: u64,
    pub size: u64,
    /// Records across all pages.
    pub total: u64,
    /// Pages after this one.
    pub remaining_pages: u64,
}

impl<T> Page<T> {
    pub(crate) fn new(items: Vec<T>, page: u64, size: u64, total: u64) -> Self {
        let pages = total.div_ceil(size.max(1));
        Self {
            items,
            page,
            size,
            total,
            remaining_pages: pages.saturating_sub(page + 1),
        }
    }
}

#[derive(Debug)]
pub struct Engine {
    ledger: Ledger<SeaStore>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// The transfer orchestrator over this engine's database.
    pub fn ledger(&self) -> &Ledger<SeaStore> {
        &self.ledger
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            ledger: Ledger::new(SeaStore::new(self.database)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Page;

    #[test]
    fn page_counts_remaining_pages() {
        let page = Page::new(vec![1, 2], 0, 2, 5);
        assert_eq!(page.remaining_pages, 2);

        let last = Page::new(vec![5], 2, 2, 5);
        assert_eq!(last.remaining_pages, 0);

        let empty = Page::<i32>::new(Vec::new(), 3, 10, 0);
        assert_eq!(empty.remaining_pages, 0);
    }
}
