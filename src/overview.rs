use std::collections::HashSet;

use serde::Serialize;

use crate::api::ProjectsApi;
use crate::client::ClientError;
use crate::models::{Project, ProjectMember, Role, Tag, Task};

pub trait HasId {
    fn id(&self) -> &str;
}

macro_rules! impl_has_id {
    ($($ty:ty),*) => {
        $(impl HasId for $ty {
            fn id(&self) -> &str {
                &self.id
            }
        })*
    };
}

impl_has_id!(Project, ProjectMember, Tag, Task);

/// Keeps the first occurrence of every id, preserving order.
pub fn dedupe_by_id<T: HasId>(items: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.id().to_string()))
        .collect()
}

pub fn remove_by_id<T: HasId>(items: &mut Vec<T>, id: &str) -> bool {
    let before = items.len();
    items.retain(|item| item.id() != id);
    items.len() != before
}

pub fn replace_by_id<T: HasId>(items: &mut [T], updated: T) -> bool {
    match items.iter_mut().find(|item| item.id() == updated.id()) {
        Some(slot) => {
            *slot = updated;
            true
        }
        None => false,
    }
}

/// Tags from the global list that are not yet attached to the project.
pub fn available_tags<'t>(all: &'t [Tag], attached: &[Tag]) -> Vec<&'t Tag> {
    let attached: HashSet<&str> = attached.iter().map(|tag| tag.id.as_str()).collect();
    all.iter()
        .filter(|tag| !attached.contains(tag.id.as_str()))
        .collect()
}

/// Controls shown for a role. The backend enforces the same rules independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub manage_project: bool,
    pub invite: bool,
    pub manage_tags: bool,
    pub manage_tasks: bool,
}

impl Capabilities {
    pub fn for_role(role: Role) -> Self {
        let owner = role == Role::Owner;
        let contributor = role.at_least(Role::Contributor);
        Self {
            manage_project: owner,
            invite: owner,
            manage_tags: contributor,
            manage_tasks: contributor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubResource {
    Members,
    Tags,
    Tasks,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectOverview {
    pub project: Project,
    pub members: Vec<ProjectMember>,
    pub tags: Vec<Tag>,
    pub tasks: Vec<Task>,
    /// Sub-resources that failed and were defaulted to empty.
    pub degraded: Vec<SubResource>,
}

impl ProjectOverview {
    pub fn capabilities(&self) -> Capabilities {
        Capabilities::for_role(self.project.user_role)
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn add_member(&mut self, member: ProjectMember) {
        self.members.push(member);
        let members = std::mem::take(&mut self.members);
        self.members = dedupe_by_id(members);
    }
}

/// Only the project fetch is fatal. Members, tags and tasks each fall back to
/// an empty list on failure and are listed in `degraded`.
pub async fn load_project_overview(
    api: &ProjectsApi<'_>,
    project_id: &str,
) -> Result<ProjectOverview, ClientError> {
    let project = api.get_project(project_id).await?;
    let mut degraded = Vec::new();

    let members = match api.get_project_members(project_id).await {
        Ok(members) => dedupe_by_id(members),
        Err(err) => {
            tracing::warn!(project_id, error = %err, "failed to load members");
            degraded.push(SubResource::Members);
            Vec::new()
        }
    };

    let tags = match api.get_project_tags(project_id).await {
        Ok(tags) => tags,
        Err(err) => {
            tracing::warn!(project_id, error = %err, "failed to load tags");
            degraded.push(SubResource::Tags);
            Vec::new()
        }
    };

    let tasks = match api.get_project_tasks(project_id).await {
        Ok(tasks) => tasks,
        Err(err) => {
            tracing::warn!(project_id, error = %err, "failed to load tasks");
            degraded.push(SubResource::Tasks);
            Vec::new()
        }
    };

    Ok(ProjectOverview {
        project,
        members,
        tags,
        tasks,
        degraded,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_projects: usize,
    pub owned_projects: usize,
    pub total_members: u64,
    pub distinct_tags: usize,
}

impl DashboardStats {
    pub fn from_projects(projects: &[Project]) -> Self {
        let distinct_tags: HashSet<&str> = projects
            .iter()
            .flat_map(|project| project.tags.iter().map(|tag| tag.id.as_str()))
            .collect();
        Self {
            total_projects: projects.len(),
            owned_projects: projects
                .iter()
                .filter(|project| project.user_role == Role::Owner)
                .count(),
            total_members: projects
                .iter()
                .map(|project| u64::from(project.member_count))
                .sum(),
            distinct_tags: distinct_tags.len(),
        }
    }
}
