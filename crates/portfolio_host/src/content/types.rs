//! Portfolio records served by a [`super::ContentSource`].

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Named external link on the owner's profile.
pub struct ProfileLink {
    /// Short lowercase label, also usable as an `open` target.
    pub label: String,
    /// Absolute URL.
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
/// Owner profile shown by `about` and `contact`.
pub struct Profile {
    /// Display name.
    pub name: String,
    /// Headline role.
    pub title: String,
    /// Free-text summary paragraph.
    pub summary: String,
    /// City or region.
    #[serde(default)]
    pub location: Option<String>,
    /// Contact email.
    #[serde(default)]
    pub email: Option<String>,
    /// Social and project links.
    #[serde(default)]
    pub links: Vec<ProfileLink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// One position held.
pub struct Experience {
    /// Employer.
    pub company: String,
    /// Role title.
    pub role: String,
    /// Start month as `YYYY-MM`.
    pub start: String,
    /// End month as `YYYY-MM`; `None` while current.
    #[serde(default)]
    pub end: Option<String>,
    /// Bullet-point highlights.
    #[serde(default)]
    pub highlights: Vec<String>,
}

impl Experience {
    /// Period as `start - end`, with `present` for an open end.
    pub fn period(&self) -> String {
        format!("{} - {}", self.start, self.end.as_deref().unwrap_or("present"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// One degree or course of study.
pub struct Education {
    /// School or university.
    pub institution: String,
    /// Degree name.
    pub degree: String,
    /// Start year.
    pub start: String,
    /// Graduation year; `None` while enrolled.
    #[serde(default)]
    pub end: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Portfolio project.
pub struct Project {
    /// Stable lowercase identifier used by `projects <slug>`.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// One-paragraph description.
    pub summary: String,
    /// Technologies used.
    #[serde(default)]
    pub tech: Vec<String>,
    /// Live site.
    #[serde(default)]
    pub url: Option<String>,
    /// Source repository.
    #[serde(default)]
    pub repo: Option<String>,
    /// Whether the project is highlighted.
    #[serde(default)]
    pub featured: bool,
}
