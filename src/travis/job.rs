use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Status color of a job, as the console knows it.
///
/// Unrecognized values are kept verbatim in `Other` so they can still be
/// displayed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JobStatus {
    Blue,
    Red,
    Yellow,
    Disabled,
    Other(String),
}

impl JobStatus {
    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Blue => "blue",
            JobStatus::Red => "red",
            JobStatus::Yellow => "yellow",
            JobStatus::Disabled => "disabled",
            JobStatus::Other(s) => s,
        }
    }

    /// Map the `last_build_state` of a Travis repository. Anything but a
    /// passed or running build is a failure.
    pub fn from_travis_state(state: Option<&str>) -> Self {
        match state {
            Some("passed") => JobStatus::Blue,
            Some("started") => JobStatus::Yellow,
            _ => JobStatus::Red,
        }
    }
}

impl From<&str> for JobStatus {
    fn from(s: &str) -> Self {
        match s {
            "blue" => JobStatus::Blue,
            "red" => JobStatus::Red,
            "yellow" => JobStatus::Yellow,
            "disabled" => JobStatus::Disabled,
            other => JobStatus::Other(other.to_string()),
        }
    }
}

impl Serialize for JobStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for JobStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(JobStatus::from(s.as_str()))
    }
}

/// A Travis job, i.e. a repository and the state of its last build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: JobStatus,
    #[serde(default)]
    pub building: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_build_id: Option<String>,
}

/// Repository as returned by the Travis v2 API.
#[derive(Debug, Deserialize)]
pub struct TravisRepo {
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub last_build_state: Option<String>,
    #[serde(default)]
    pub last_build_id: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct RepoEnvelope {
    pub repo: TravisRepo,
}

#[derive(Debug, Deserialize)]
pub struct ReposEnvelope {
    pub repos: Vec<TravisRepo>,
}

impl From<TravisRepo> for Job {
    fn from(repo: TravisRepo) -> Self {
        let state = repo.last_build_state.as_deref();
        Job {
            id: repo.slug.clone(),
            name: repo.slug,
            description: repo.description,
            status: JobStatus::from_travis_state(state),
            building: state == Some("started"),
            last_build_id: repo.last_build_id.map(|id| id.to_string()),
        }
    }
}
