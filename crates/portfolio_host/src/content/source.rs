//! Content source contract and the in-memory adapter.

use std::{cell::Cell, future::Future, pin::Pin, rc::Rc};

use serde::{Deserialize, Serialize};

use super::types::{Education, Experience, Profile, ProfileLink, Project};

/// Object-safe boxed future used by [`ContentSource`] async methods.
pub type ContentFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Read-only access to the portfolio content database.
pub trait ContentSource {
    /// Loads the owner profile.
    fn profile(&self) -> ContentFuture<'_, Result<Profile, String>>;

    /// Loads all positions in storage order.
    fn experience(&self) -> ContentFuture<'_, Result<Vec<Experience>, String>>;

    /// Loads all education records in storage order.
    fn education(&self) -> ContentFuture<'_, Result<Vec<Education>, String>>;

    /// Loads all projects in storage order.
    fn projects(&self) -> ContentFuture<'_, Result<Vec<Project>, String>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
/// Full content set, as served by [`MemoryContentSource`] or decoded from a JSON export.
pub struct ContentSnapshot {
    /// Owner profile.
    pub profile: Profile,
    /// Positions.
    #[serde(default)]
    pub experience: Vec<Experience>,
    /// Education records.
    #[serde(default)]
    pub education: Vec<Education>,
    /// Projects.
    #[serde(default)]
    pub projects: Vec<Project>,
}

impl ContentSnapshot {
    /// Decodes a snapshot from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error when `raw` is not a valid snapshot document.
    pub fn from_json(raw: &str) -> Result<Self, String> {
        serde_json::from_str(raw).map_err(|e| e.to_string())
    }

    /// Built-in demo content.
    pub fn sample() -> Self {
        Self {
            profile: Profile {
                name: "Alex Rivera".to_string(),
                title: "Systems Engineer".to_string(),
                summary: "Builds fast, dependable software for the web and the terminal."
                    .to_string(),
                location: Some("Lisbon, PT".to_string()),
                email: Some("alex@example.dev".to_string()),
                links: vec![
                    ProfileLink {
                        label: "github".to_string(),
                        url: "https://github.com/alex-rivera".to_string(),
                    },
                    ProfileLink {
                        label: "linkedin".to_string(),
                        url: "https://www.linkedin.com/in/alex-rivera".to_string(),
                    },
                ],
            },
            experience: vec![
                Experience {
                    company: "Northwind Labs".to_string(),
                    role: "Software Engineer".to_string(),
                    start: "2019-03".to_string(),
                    end: Some("2022-06".to_string()),
                    highlights: vec!["Shipped the realtime sync service.".to_string()],
                },
                Experience {
                    company: "Helio Systems".to_string(),
                    role: "Senior Engineer".to_string(),
                    start: "2022-07".to_string(),
                    end: None,
                    highlights: vec![
                        "Leads the storage engine team.".to_string(),
                        "Cut p99 query latency by 40%.".to_string(),
                    ],
                },
            ],
            education: vec![Education {
                institution: "University of Porto".to_string(),
                degree: "MSc Computer Science".to_string(),
                start: "2014".to_string(),
                end: Some("2019".to_string()),
            }],
            projects: vec![
                Project {
                    slug: "termfolio".to_string(),
                    name: "Termfolio".to_string(),
                    summary: "This site: a portfolio you drive from a command line.".to_string(),
                    tech: vec!["rust".to_string(), "wasm".to_string()],
                    url: Some("https://alex.example.dev".to_string()),
                    repo: Some("https://github.com/alex-rivera/termfolio".to_string()),
                    featured: true,
                },
                Project {
                    slug: "tinykv".to_string(),
                    name: "TinyKV".to_string(),
                    summary: "An embeddable log-structured key/value store.".to_string(),
                    tech: vec!["rust".to_string()],
                    url: None,
                    repo: Some("https://github.com/alex-rivera/tinykv".to_string()),
                    featured: false,
                },
            ],
        }
    }
}

#[derive(Debug, Clone)]
/// Content source backed by an in-memory snapshot. Clones share the load counter.
pub struct MemoryContentSource {
    data: Rc<Result<ContentSnapshot, String>>,
    loads: Rc<Cell<usize>>,
}

impl MemoryContentSource {
    /// Serves `snapshot`.
    pub fn new(snapshot: ContentSnapshot) -> Self {
        Self {
            data: Rc::new(Ok(snapshot)),
            loads: Rc::new(Cell::new(0)),
        }
    }

    /// Source whose every load fails with `message`.
    pub fn offline(message: impl Into<String>) -> Self {
        Self {
            data: Rc::new(Err(message.into())),
            loads: Rc::new(Cell::new(0)),
        }
    }

    /// Number of loads served so far, successful or not.
    pub fn load_count(&self) -> usize {
        self.loads.get()
    }

    fn read<T>(&self, pick: impl FnOnce(&ContentSnapshot) -> T) -> Result<T, String> {
        self.loads.set(self.loads.get() + 1);
        match self.data.as_ref() {
            Ok(snapshot) => Ok(pick(snapshot)),
            Err(message) => Err(message.clone()),
        }
    }
}

impl Default for MemoryContentSource {
    fn default() -> Self {
        Self::new(ContentSnapshot::sample())
    }
}

impl ContentSource for MemoryContentSource {
    fn profile(&self) -> ContentFuture<'_, Result<Profile, String>> {
        Box::pin(async move { self.read(|snapshot| snapshot.profile.clone()) })
    }

    fn experience(&self) -> ContentFuture<'_, Result<Vec<Experience>, String>> {
        Box::pin(async move { self.read(|snapshot| snapshot.experience.clone()) })
    }

    fn education(&self) -> ContentFuture<'_, Result<Vec<Education>, String>> {
        Box::pin(async move { self.read(|snapshot| snapshot.education.clone()) })
    }

    fn projects(&self) -> ContentFuture<'_, Result<Vec<Project>, String>> {
        Box::pin(async move { self.read(|snapshot| snapshot.projects.clone()) })
    }
}
