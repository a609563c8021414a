use super::*;
use booking_core::ID;
use booking_core::Unique;
use std::sync::PoisonError;
use std::sync::RwLock;

/// In-memory credential store. Ids are assigned from 1 in insertion order,
/// mirroring a fresh `BIGSERIAL` column.
#[derive(Debug, Default)]
pub struct Roster {
    members: RwLock<Vec<(Member, String)>>,
}

impl Roster {
    /// Drops a member, as an administrator deleting an account would.
    pub fn remove(&self, id: ID<Member>) -> bool {
        let mut members = self.members.write().unwrap_or_else(PoisonError::into_inner);
        let before = members.len();
        members.retain(|(m, _)| m.id() != id);
        members.len() != before
    }
}

#[async_trait::async_trait]
impl AuthRepository for Roster {
    async fn create(
        &self,
        name: &str,
        email: &str,
        hashword: &str,
    ) -> anyhow::Result<Option<Member>> {
        let mut members = self.members.write().unwrap_or_else(PoisonError::into_inner);
        if members.iter().any(|(m, _)| m.email() == email) {
            return Ok(None);
        }
        let next = members
            .iter()
            .map(|(m, _)| m.id().inner())
            .max()
            .unwrap_or_default()
            + 1;
        let member = Member::new(ID::from(next), name.to_string(), email.to_string());
        members.push((member.clone(), hashword.to_string()));
        Ok(Some(member))
    }
    async fn lookup(&self, email: &str) -> anyhow::Result<Option<(Member, String)>> {
        Ok(self
            .members
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|(m, _)| m.email() == email)
            .cloned())
    }
    async fn member(&self, id: ID<Member>) -> anyhow::Result<Option<Member>> {
        Ok(self
            .members
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|(m, _)| m.id() == id)
            .map(|(m, _)| m.clone()))
    }
}
