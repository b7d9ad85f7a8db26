//! Commit object
//!
//! Commits link a tree snapshot to its parent commits and authorship.
//!
//! ## Format
//!
//! ```text
//! commit <size>\0
//! tree <tree-sha>
//! parent <parent-sha>        (zero or more)
//! author <name> <email> <timestamp> <timezone>
//! committer <name> <email> <timestamp> <timezone>
//!
//! <commit message>
//! ```

use crate::artifacts::objects::object::{Object, Packable, Unpackable, frame};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::{Result, VcsError};
use bytes::Bytes;
use chrono::{DateTime, FixedOffset};
use std::io::BufRead;

/// Author or committer information
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Author {
    name: String,
    email: String,
    timestamp: DateTime<FixedOffset>,
}

impl Author {
    /// Create a new author stamped with the current local time
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Author {
            name: name.into(),
            email: email.into(),
            timestamp: chrono::Local::now().fixed_offset(),
        }
    }

    pub fn new_with_timestamp(
        name: impl Into<String>,
        email: impl Into<String>,
        timestamp: DateTime<FixedOffset>,
    ) -> Self {
        Author {
            name: name.into(),
            email: email.into(),
            timestamp,
        }
    }

    /// Same identity, stamped with the current local time
    pub fn restamped(&self) -> Self {
        Author::new(self.name.clone(), self.email.clone())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Seconds since the Unix epoch
    pub fn timestamp(&self) -> i64 {
        self.timestamp.timestamp()
    }

    /// Minutes east of UTC
    pub fn timezone_offset(&self) -> i32 {
        self.timestamp.offset().local_minus_utc() / 60
    }

    pub fn display_name(&self) -> String {
        format!("{} <{}>", self.name, self.email)
    }

    /// Encoded form used inside commit objects: `Name <email> 1234567890 +0000`
    pub fn display(&self) -> String {
        format!(
            "{} <{}> {} {}",
            self.name,
            self.email,
            self.timestamp.timestamp(),
            self.timestamp.format("%z")
        )
    }

    pub fn readable_timestamp(&self) -> String {
        self.timestamp
            .format("%a %b %-d %H:%M:%S %Y %z")
            .to_string()
    }

    /// Load author information from environment variables
    ///
    /// Reads GIT_AUTHOR_NAME, GIT_AUTHOR_EMAIL, and optionally GIT_AUTHOR_DATE
    /// (RFC 2822 or `%Y-%m-%d %H:%M:%S %z`). Without a date, the current time
    /// is used.
    pub fn load_from_env() -> Option<Self> {
        let name = std::env::var("GIT_AUTHOR_NAME").ok()?;
        let email = std::env::var("GIT_AUTHOR_EMAIL").ok()?;
        let timestamp = std::env::var("GIT_AUTHOR_DATE").ok().and_then(|date_str| {
            DateTime::parse_from_rfc2822(&date_str)
                .or_else(|_| DateTime::parse_from_str(&date_str, "%Y-%m-%d %H:%M:%S %z"))
                .ok()
        });

        match timestamp {
            Some(ts) => Some(Author::new_with_timestamp(name, email, ts)),
            None => Some(Author::new(name, email)),
        }
    }
}

impl TryFrom<&str> for Author {
    type Error = VcsError;

    fn try_from(value: &str) -> Result<Self> {
        // "name <email> timestamp timezone", split from the right
        let parts: Vec<&str> = value.rsplitn(3, ' ').collect();
        if parts.len() < 3 {
            return Err(VcsError::corrupt(format!("invalid author line {value:?}")));
        }

        let offset = parse_timezone(parts[0])?;
        let timestamp = parts[1]
            .parse::<i64>()
            .map_err(|_| VcsError::corrupt(format!("invalid timestamp {:?}", parts[1])))?;
        let name_email_part = parts[2];

        let email_start = name_email_part
            .find('<')
            .ok_or_else(|| VcsError::corrupt("invalid author: missing '<'"))?;
        let email_end = name_email_part
            .rfind('>')
            .ok_or_else(|| VcsError::corrupt("invalid author: missing '>'"))?;
        if email_end < email_start {
            return Err(VcsError::corrupt("invalid author: misplaced '>'"));
        }

        let name = name_email_part[..email_start].trim().to_string();
        let email = name_email_part[email_start + 1..email_end].to_string();

        let datetime = DateTime::from_timestamp(timestamp, 0)
            .ok_or_else(|| VcsError::corrupt(format!("timestamp out of range {timestamp}")))?
            .with_timezone(&offset);

        Ok(Author {
            name,
            email,
            timestamp: datetime,
        })
    }
}

/// Parse `+hhmm` / `-hhmm`
fn parse_timezone(raw: &str) -> Result<FixedOffset> {
    let invalid = || VcsError::corrupt(format!("invalid timezone {raw:?}"));

    let (sign, digits) = match raw.split_at_checked(1) {
        Some(("+", digits)) => (1, digits),
        Some(("-", digits)) => (-1, digits),
        _ => return Err(invalid()),
    };
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let hours = digits[..2].parse::<i32>().map_err(|_| invalid())?;
    let minutes = digits[2..].parse::<i32>().map_err(|_| invalid())?;

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    /// Empty for a root commit, two or more for merges
    parents: Vec<ObjectId>,
    tree_oid: ObjectId,
    author: Author,
    committer: Author,
    message: String,
}

impl Commit {
    /// The author doubles as committer
    pub fn new(parents: Vec<ObjectId>, tree_oid: ObjectId, author: Author, message: String) -> Self {
        Commit {
            parents,
            tree_oid,
            committer: author.clone(),
            author,
            message,
        }
    }

    pub fn short_message(&self) -> String {
        self.message.lines().next().unwrap_or("").to_string()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn tree_oid(&self) -> &ObjectId {
        &self.tree_oid
    }

    pub fn parents(&self) -> &[ObjectId] {
        &self.parents
    }

    pub fn parent(&self) -> Option<&ObjectId> {
        self.parents.first()
    }

    pub fn author(&self) -> &Author {
        &self.author
    }

    pub fn committer(&self) -> &Author {
        &self.committer
    }

    pub fn timestamp(&self) -> i64 {
        self.committer.timestamp()
    }
}

impl Packable for Commit {
    fn serialize(&self) -> Result<Bytes> {
        let mut lines = vec![format!("tree {}", self.tree_oid)];
        for parent in &self.parents {
            lines.push(format!("parent {parent}"));
        }
        lines.push(format!("author {}", self.author.display()));
        lines.push(format!("committer {}", self.committer.display()));

        let content = format!("{}\n\n{}", lines.join("\n"), self.message);

        Ok(frame(self.object_type(), content.as_bytes()))
    }
}

impl Unpackable for Commit {
    fn deserialize(mut reader: impl BufRead) -> Result<Self> {
        let mut content = String::new();
        reader
            .read_to_string(&mut content)
            .map_err(|_| VcsError::corrupt("commit object is not UTF-8"))?;

        let (headers, message) = content
            .split_once("\n\n")
            .ok_or_else(|| VcsError::corrupt("commit object has no message separator"))?;

        let mut tree_oid = None;
        let mut parents = Vec::new();
        let mut author = None;
        let mut committer = None;

        for line in headers.lines() {
            let (key, value) = line
                .split_once(' ')
                .ok_or_else(|| VcsError::corrupt(format!("invalid commit header {line:?}")))?;

            match key {
                "tree" => tree_oid = Some(ObjectId::try_parse(value)?),
                "parent" => parents.push(ObjectId::try_parse(value)?),
                "author" => author = Some(Author::try_from(value)?),
                "committer" => committer = Some(Author::try_from(value)?),
                // unknown headers (gpgsig, encoding, ...) are tolerated
                _ => {}
            }
        }

        let tree_oid = tree_oid.ok_or_else(|| VcsError::corrupt("commit without tree"))?;
        let author = author.ok_or_else(|| VcsError::corrupt("commit without author"))?;
        let committer = committer.unwrap_or_else(|| author.clone());

        Ok(Commit {
            parents,
            tree_oid,
            author,
            committer,
            message: message.to_string(),
        })
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }
}
