//! Party resolution.
//!
//! Resolution matches a submitted party payload against a registry:
//!
//! - agents are looked up by exact phone and must already exist;
//! - customers are matched by phone first, then by (name, father), and
//!   created when neither matches.
//!
//! A match is used verbatim: submitted fields never overwrite the registry
//! record. Callers always embed a snapshot of the registry record, never the
//! submitted payload.

use tracing::debug;

use crate::{
    EngineError, Party, PartyInput, PartyKind, PartySnapshot, ResultEngine, registry::PartyStore,
};

pub(crate) struct PartyResolver<S> {
    customers: S,
    agents: S,
}

impl<S: PartyStore> PartyResolver<S> {
    pub(crate) fn new(customers: S, agents: S) -> Self {
        Self { customers, agents }
    }

    /// Resolves `input` in the registry of `kind`.
    pub(crate) async fn resolve(&self, kind: PartyKind, input: &PartyInput) -> ResultEngine<Party> {
        match kind {
            PartyKind::Agent => self.resolve_agent(input).await,
            PartyKind::Customer => self.resolve_customer(input).await,
        }
    }

    /// Resolves the customer, and the agent only if it carries a phone.
    pub(crate) async fn resolve_pair(
        &self,
        customer: &PartyInput,
        agent: Option<&PartyInput>,
    ) -> ResultEngine<(PartySnapshot, Option<PartySnapshot>)> {
        let customer = self.resolve_customer(customer).await?;
        let agent = match agent.filter(|a| a.normalized_phone().is_some()) {
            Some(agent) => Some(PartySnapshot::capture(&self.resolve_agent(agent).await?)),
            None => None,
        };
        Ok((PartySnapshot::capture(&customer), agent))
    }

    async fn resolve_agent(&self, input: &PartyInput) -> ResultEngine<Party> {
        let phone = input
            .normalized_phone()
            .ok_or_else(|| EngineError::KeyNotFound("agent without phone".to_string()))?;
        let agent = self
            .agents
            .find_by_phone(phone)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("agent {phone}")))?;
        debug!(agent = %agent.id, phone, "agent resolved by phone");
        Ok(agent)
    }

    async fn resolve_customer(&self, input: &PartyInput) -> ResultEngine<Party> {
        if let Some(phone) = input.normalized_phone()
            && let Some(customer) = self.customers.find_by_phone(phone).await?
        {
            debug!(customer = %customer.id, phone, "customer matched by phone");
            return Ok(customer);
        }

        let name = input.name.trim();
        let father = input.father.trim();
        if let Some(customer) = self.customers.find_by_name_father(name, father).await? {
            debug!(customer = %customer.id, name, father, "customer matched by name and father");
            return Ok(customer);
        }

        let customer = Party::new(PartyKind::Customer, input);
        self.customers.insert(&customer).await?;
        debug!(customer = %customer.id, name, "customer created");
        Ok(customer)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    #[derive(Default)]
    struct MemoryStore {
        parties: RefCell<Vec<Party>>,
    }

    impl MemoryStore {
        fn with(parties: Vec<Party>) -> Self {
            Self {
                parties: RefCell::new(parties),
            }
        }

        fn len(&self) -> usize {
            self.parties.borrow().len()
        }
    }

    impl PartyStore for &MemoryStore {
        async fn find_by_phone(&self, phone: &str) -> ResultEngine<Option<Party>> {
            Ok(self
                .parties
                .borrow()
                .iter()
                .find(|p| p.phone.as_deref() == Some(phone))
                .cloned())
        }

        async fn find_by_name_father(
            &self,
            name: &str,
            father: &str,
        ) -> ResultEngine<Option<Party>> {
            Ok(self
                .parties
                .borrow()
                .iter()
                .find(|p| p.name == name && p.father == father)
                .cloned())
        }

        async fn insert(&self, party: &Party) -> ResultEngine<()> {
            self.parties.borrow_mut().push(party.clone());
            Ok(())
        }
    }

    fn customer_input() -> PartyInput {
        PartyInput::new("customer1", "customerFather").phone("01912239655")
    }

    #[tokio::test]
    async fn same_phone_resolves_to_same_customer() {
        let customers = MemoryStore::default();
        let agents = MemoryStore::default();
        let resolver = PartyResolver::new(&customers, &agents);

        let first = resolver
            .resolve(PartyKind::Customer, &customer_input())
            .await
            .unwrap();
        let renamed = PartyInput::new("someone else", "other father").phone("01912239655");
        let second = resolver
            .resolve(PartyKind::Customer, &renamed)
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.name, "customer1");
        assert_eq!(customers.len(), 1);
    }

    #[tokio::test]
    async fn name_and_father_match_without_phone() {
        let customers = MemoryStore::default();
        let agents = MemoryStore::default();
        let resolver = PartyResolver::new(&customers, &agents);

        let input = PartyInput::new("customer1", "customerFather");
        let first = resolver.resolve(PartyKind::Customer, &input).await.unwrap();
        let second = resolver
            .resolve(PartyKind::Customer, &PartyInput::new(" customer1 ", "customerFather"))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(customers.len(), 1);
    }

    #[tokio::test]
    async fn phone_match_wins_over_name_match() {
        let by_phone = Party::new(
            PartyKind::Customer,
            &PartyInput::new("phoneOwner", "fatherA").phone("01812345678"),
        );
        let by_name = Party::new(PartyKind::Customer, &PartyInput::new("customer1", "fatherB"));
        let customers = MemoryStore::with(vec![by_name, by_phone.clone()]);
        let agents = MemoryStore::default();
        let resolver = PartyResolver::new(&customers, &agents);

        let resolved = resolver
            .resolve(
                PartyKind::Customer,
                &PartyInput::new("customer1", "fatherB").phone("01812345678"),
            )
            .await
            .unwrap();

        assert_eq!(resolved.id, by_phone.id);
    }

    #[tokio::test]
    async fn unknown_agent_is_not_created() {
        let customers = MemoryStore::default();
        let agents = MemoryStore::default();
        let resolver = PartyResolver::new(&customers, &agents);

        let agent = PartyInput::new("agent1", "agentFather").phone("01712345678");
        let err = resolver
            .resolve_pair(&customer_input(), Some(&agent))
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::KeyNotFound(_)));
        assert_eq!(agents.len(), 0);
    }

    #[tokio::test]
    async fn agent_snapshot_is_the_registry_record() {
        let registered = Party::new(
            PartyKind::Agent,
            &PartyInput::new("agent1", "agentFather")
                .phone("01712345678")
                .address("agentAddress"),
        );
        let customers = MemoryStore::default();
        let agents = MemoryStore::with(vec![registered.clone()]);
        let resolver = PartyResolver::new(&customers, &agents);

        let submitted = PartyInput::new("typo name", "typo father").phone("01712345678");
        let (_, agent) = resolver
            .resolve_pair(&customer_input(), Some(&submitted))
            .await
            .unwrap();

        assert_eq!(agent, Some(PartySnapshot::capture(&registered)));
    }

    #[tokio::test]
    async fn agent_without_phone_is_skipped() {
        let customers = MemoryStore::default();
        let agents = MemoryStore::default();
        let resolver = PartyResolver::new(&customers, &agents);

        let blank = PartyInput::new("agent1", "agentFather").phone("");
        let (customer, agent) = resolver
            .resolve_pair(&customer_input(), Some(&blank))
            .await
            .unwrap();

        assert_eq!(customer.name(), "customer1");
        assert!(agent.is_none());
    }
}
