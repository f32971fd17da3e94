//! Proposal repository: upsert by number, owners as a set.

use std::collections::BTreeSet;

use xcs_core::entities::Proposal;

use crate::error::DatabaseError;
use crate::service::SyncService;

impl SyncService {
    /// Create the proposal if missing and add `owners` to its owner set.
    ///
    /// Existing owners are kept; re-running with the same owners is a no-op.
    pub async fn upsert_proposal(
        &self,
        number: &str,
        owners: &BTreeSet<String>,
    ) -> Result<Proposal, DatabaseError> {
        self.db()
            .conn()
            .execute(
                "INSERT INTO proposals (number) VALUES (?1) ON CONFLICT(number) DO NOTHING",
                [number],
            )
            .await?;
        let id = self.proposal_id(number).await?.ok_or(DatabaseError::NoResult)?;

        for owner in owners {
            self.db()
                .conn()
                .execute(
                    "INSERT INTO proposal_owners (proposal_id, owner) VALUES (?1, ?2)
                     ON CONFLICT(proposal_id, owner) DO NOTHING",
                    libsql::params![id, owner.as_str()],
                )
                .await?;
        }

        self.get_proposal(number).await?.ok_or(DatabaseError::NoResult)
    }

    pub async fn get_proposal(&self, number: &str) -> Result<Option<Proposal>, DatabaseError> {
        let Some(id) = self.proposal_id(number).await? else {
            return Ok(None);
        };
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT owner FROM proposal_owners WHERE proposal_id = ?1 ORDER BY owner",
                [id],
            )
            .await?;
        let mut owners = BTreeSet::new();
        while let Some(row) = rows.next().await? {
            owners.insert(row.get::<String>(0)?);
        }
        Ok(Some(Proposal {
            id,
            number: number.to_string(),
            owners,
        }))
    }

    /// All proposal numbers, sorted.
    pub async fn list_proposal_numbers(&self) -> Result<Vec<String>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query("SELECT number FROM proposals ORDER BY number", ())
            .await?;
        let mut numbers = Vec::new();
        while let Some(row) = rows.next().await? {
            numbers.push(row.get::<String>(0)?);
        }
        Ok(numbers)
    }

    async fn proposal_id(&self, number: &str) -> Result<Option<i64>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query("SELECT id FROM proposals WHERE number = ?1", [number])
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row.get::<i64>(0)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use crate::test_support::helpers::test_service;
    use pretty_assertions::assert_eq;

    fn owners(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|s| (*s).to_string()).collect()
    }

    #[tokio::test]
    async fn upsert_never_duplicates_by_number() {
        let svc = test_service().await;
        let first = svc.upsert_proposal("lb18145", &owners(&["abc"])).await.unwrap();
        let second = svc.upsert_proposal("lb18145", &owners(&["abc"])).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(svc.list_proposal_numbers().await.unwrap(), vec!["lb18145"]);
        assert_eq!(second.owners, owners(&["abc"]));
    }

    #[tokio::test]
    async fn owners_accumulate_as_a_set() {
        let svc = test_service().await;
        svc.upsert_proposal("lb1", &owners(&["abc", "def"])).await.unwrap();
        let proposal = svc.upsert_proposal("lb1", &owners(&["def", "ghi"])).await.unwrap();
        assert_eq!(proposal.owners, owners(&["abc", "def", "ghi"]));
    }

    #[tokio::test]
    async fn missing_proposal_is_none() {
        let svc = test_service().await;
        assert!(svc.get_proposal("nope").await.unwrap().is_none());
    }
}
