//! Local mirror of the server collections
//!
//! Holds the last snapshot fetched for each collection. A refresh replaces a
//! collection wholesale; a failed refresh leaves the previous snapshot alone.
//! `set_flag` is a provisional edit that the next refresh overwrites.

use std::collections::HashMap;
use tracing::{debug, warn};

use crate::api::ResourceApi;
use crate::error::ApiError;
use crate::model::{
    AutoResponse, Command, Converter, ForbiddenWord, Group, JoinedGroup, Record, ResourceKind,
    UsageSnapshot,
};

/// Boolean fields the console can flip locally
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    Active,
}

/// A joined chat group and whether it is already registered
#[derive(Debug, Clone, PartialEq)]
pub struct Discovered<'a> {
    pub group: &'a JoinedGroup,
    pub registered: bool,
}

#[derive(Debug, Default)]
pub struct Mirror {
    collections: HashMap<ResourceKind, Vec<Record>>,
    stats: Option<UsageSnapshot>,
    joined_groups: Option<Vec<JoinedGroup>>,
    forbidden_words: HashMap<String, Vec<ForbiddenWord>>,
}

impl Mirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch `kind` and replace the local snapshot. Returns the record count.
    pub async fn refresh<A: ResourceApi + ?Sized>(
        &mut self,
        api: &A,
        kind: ResourceKind,
    ) -> Result<usize, ApiError> {
        match api.list(kind).await {
            Ok(records) => {
                let count = records.len();
                debug!("Mirrored {} {} records", count, kind.as_str());
                self.replace(kind, records);
                Ok(count)
            }
            Err(e) => {
                warn!("Keeping previous {} snapshot: {}", kind.as_str(), e);
                Err(e)
            }
        }
    }

    pub fn replace(&mut self, kind: ResourceKind, records: Vec<Record>) {
        self.collections.insert(kind, records);
    }

    pub fn is_loaded(&self, kind: ResourceKind) -> bool {
        self.collections.contains_key(&kind)
    }

    pub fn records(&self, kind: ResourceKind) -> &[Record] {
        self.collections
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn groups(&self) -> impl Iterator<Item = &Group> + '_ {
        self.records(ResourceKind::Group).iter().filter_map(|r| match r {
            Record::Group(g) => Some(g),
            _ => None,
        })
    }

    pub fn commands(&self) -> impl Iterator<Item = &Command> + '_ {
        self.records(ResourceKind::Command)
            .iter()
            .filter_map(|r| match r {
                Record::Command(c) => Some(c),
                _ => None,
            })
    }

    pub fn auto_responses(&self) -> impl Iterator<Item = &AutoResponse> + '_ {
        self.records(ResourceKind::AutoResponse)
            .iter()
            .filter_map(|r| match r {
                Record::AutoResponse(a) => Some(a),
                _ => None,
            })
    }

    pub fn converters(&self) -> impl Iterator<Item = &Converter> + '_ {
        self.records(ResourceKind::Converter)
            .iter()
            .filter_map(|r| match r {
                Record::Converter(c) => Some(c),
                _ => None,
            })
    }

    pub fn lookup(&self, kind: ResourceKind, key: &str) -> Option<&Record> {
        self.records(kind).iter().find(|r| r.key() == key)
    }

    pub fn group(&self, jid: &str) -> Option<&Group> {
        self.groups().find(|g| g.group_jid == jid)
    }

    pub fn command(&self, key: &str) -> Option<&Command> {
        self.commands().find(|c| c.command == key)
    }

    pub fn auto_response(&self, keyword: &str) -> Option<&AutoResponse> {
        self.auto_responses().find(|a| a.keyword == keyword)
    }

    pub fn converter(&self, command_name: &str) -> Option<&Converter> {
        self.converters().find(|c| c.command_name == command_name)
    }

    /// Provisionally set a flag. Returns the previous value, or `None` if the
    /// record is not mirrored.
    pub fn set_flag(
        &mut self,
        kind: ResourceKind,
        key: &str,
        flag: Flag,
        value: bool,
    ) -> Option<bool> {
        let record = self
            .collections
            .get_mut(&kind)?
            .iter_mut()
            .find(|r| r.key() == key)?;

        match flag {
            Flag::Active => {
                let previous = record.is_active();
                record.set_active(value);
                Some(previous)
            }
        }
    }

    // ============================================
    // STATS AND DISCOVERY
    // ============================================

    pub async fn refresh_stats<A: ResourceApi + ?Sized>(
        &mut self,
        api: &A,
        days: u32,
    ) -> Result<&UsageSnapshot, ApiError> {
        let snapshot = api.stats(days).await?;
        Ok(&*self.stats.insert(snapshot))
    }

    pub fn stats(&self) -> Option<&UsageSnapshot> {
        self.stats.as_ref()
    }

    pub async fn refresh_joined_groups<A: ResourceApi + ?Sized>(
        &mut self,
        api: &A,
    ) -> Result<usize, ApiError> {
        let groups = api.joined_groups().await?;
        let count = groups.len();
        self.joined_groups = Some(groups);
        Ok(count)
    }

    pub fn is_registered(&self, jid: &str) -> bool {
        self.group(jid).is_some()
    }

    /// Joined groups, each marked with whether it is already registered
    pub fn discovered(&self) -> Vec<Discovered<'_>> {
        self.joined_groups
            .iter()
            .flatten()
            .map(|group| Discovered {
                group,
                registered: self.is_registered(&group.jid),
            })
            .collect()
    }

    pub async fn refresh_forbidden_words<A: ResourceApi + ?Sized>(
        &mut self,
        api: &A,
        group_jid: &str,
    ) -> Result<&[ForbiddenWord], ApiError> {
        let words = api.forbidden_words(group_jid).await?;
        let entry = self
            .forbidden_words
            .entry(group_jid.to_string())
            .or_default();
        *entry = words;
        Ok(entry.as_slice())
    }

    pub fn forbidden_words(&self, group_jid: &str) -> &[ForbiddenWord] {
        self.forbidden_words
            .get(group_jid)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockResourceApi;

    fn group(jid: &str, active: bool) -> Record {
        Record::Group(Group {
            id: 0,
            group_jid: jid.into(),
            group_name: format!("Group {}", jid),
            is_active: active,
            description: String::new(),
            created_by: "admin".into(),
            created_at: None,
            updated_at: None,
        })
    }

    #[tokio::test]
    async fn test_refresh_replaces_snapshot() {
        let mut api = MockResourceApi::new();
        api.expect_list()
            .returning(|_| Ok(vec![group("1@g.us", true), group("2@g.us", false)]));

        let mut mirror = Mirror::new();
        assert!(!mirror.is_loaded(ResourceKind::Group));
        mirror.replace(ResourceKind::Group, vec![group("old@g.us", true)]);

        assert_eq!(mirror.refresh(&api, ResourceKind::Group).await.unwrap(), 2);
        let first = mirror.records(ResourceKind::Group).to_vec();
        mirror.refresh(&api, ResourceKind::Group).await.unwrap();

        assert_eq!(mirror.records(ResourceKind::Group), first.as_slice());
        assert!(mirror.lookup(ResourceKind::Group, "old@g.us").is_none());
        assert!(mirror.group("2@g.us").is_some());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_snapshot() {
        let mut api = MockResourceApi::new();
        api.expect_list()
            .returning(|_| Err(ApiError::Transport("connection refused".into())));

        let mut mirror = Mirror::new();
        mirror.replace(ResourceKind::Group, vec![group("1@g.us", true)]);

        assert!(mirror.refresh(&api, ResourceKind::Group).await.is_err());
        assert_eq!(mirror.records(ResourceKind::Group).len(), 1);
    }

    #[test]
    fn test_set_flag_returns_previous_value() {
        let mut mirror = Mirror::new();
        mirror.replace(ResourceKind::Group, vec![group("1@g.us", false)]);

        let previous = mirror.set_flag(ResourceKind::Group, "1@g.us", Flag::Active, true);
        assert_eq!(previous, Some(false));
        assert!(mirror.group("1@g.us").unwrap().is_active);

        // idempotent
        let previous = mirror.set_flag(ResourceKind::Group, "1@g.us", Flag::Active, true);
        assert_eq!(previous, Some(true));

        assert_eq!(
            mirror.set_flag(ResourceKind::Group, "missing@g.us", Flag::Active, true),
            None
        );
    }

    #[tokio::test]
    async fn test_discovered_marks_registered_groups() {
        let mut api = MockResourceApi::new();
        api.expect_joined_groups().returning(|| {
            Ok(vec![
                JoinedGroup {
                    jid: "1@g.us".into(),
                    name: "Study".into(),
                    participant_count: 12,
                },
                JoinedGroup {
                    jid: "9@g.us".into(),
                    name: "Family".into(),
                    participant_count: 4,
                },
            ])
        });

        let mut mirror = Mirror::new();
        mirror.replace(ResourceKind::Group, vec![group("1@g.us", true)]);
        assert_eq!(mirror.refresh_joined_groups(&api).await.unwrap(), 2);

        let discovered = mirror.discovered();
        assert!(discovered[0].registered);
        assert!(!discovered[1].registered);
    }
}
