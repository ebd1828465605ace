use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable remote identifier of a listing entity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Job,
    Company,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tag {
    Premium,
    New,
    Urgent,
    Remote,
}

impl Tag {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "premium" => Some(Tag::Premium),
            "new" => Some(Tag::New),
            "urgent" => Some(Tag::Urgent),
            "remote" => Some(Tag::Remote),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tag::Premium => "premium",
            Tag::New => "new",
            Tag::Urgent => "urgent",
            Tag::Remote => "remote",
        }
    }
}

/// Priority class derived from a record's tags. Premium sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    Premium,
    Regular,
}

/// A normalized job or company listing.
///
/// Records are built once by a row transform and never mutated afterwards;
/// containers replace whole records instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    id: RecordId,
    kind: RecordKind,
    title: String,
    #[serde(default)]
    slug: Option<String>,
    #[serde(default)]
    tags: Vec<Tag>,
    created_at: DateTime<Utc>,
    /// Secondary sort attribute: job count for companies, view count for jobs.
    #[serde(default)]
    score: u64,
    /// Opaque display columns (location, company name, logo, ...).
    #[serde(default)]
    fields: BTreeMap<String, String>,
}

impl Record {
    pub fn builder(
        id: impl Into<RecordId>,
        kind: RecordKind,
        title: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> RecordBuilder {
        RecordBuilder {
            record: Record {
                id: id.into(),
                kind,
                title: title.into(),
                slug: None,
                tags: Vec::new(),
                created_at,
                score: 0,
                fields: BTreeMap::new(),
            },
        }
    }

    pub fn id(&self) -> &RecordId {
        &self.id
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn slug(&self) -> Option<&str> {
        self.slug.as_deref()
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    pub fn has_tag(&self, tag: Tag) -> bool {
        self.tags.contains(&tag)
    }

    pub fn tier(&self) -> Tier {
        if self.has_tag(Tag::Premium) {
            Tier::Premium
        } else {
            Tier::Regular
        }
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&RecordId> for RecordId {
    fn from(value: &RecordId) -> Self {
        value.clone()
    }
}

/// Assembles a [`Record`]; the only way to set optional attributes.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    record: Record,
}

impl RecordBuilder {
    pub fn slug(mut self, slug: impl Into<String>) -> Self {
        self.record.slug = Some(slug.into());
        self
    }

    pub fn tag(mut self, tag: Tag) -> Self {
        if !self.record.tags.contains(&tag) {
            self.record.tags.push(tag);
        }
        self
    }

    pub fn tags(self, tags: impl IntoIterator<Item = Tag>) -> Self {
        tags.into_iter().fold(self, RecordBuilder::tag)
    }

    pub fn score(mut self, score: u64) -> Self {
        self.record.score = score;
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.record.fields.insert(name.into(), value.into());
        self
    }

    pub fn build(self) -> Record {
        self.record
    }
}
