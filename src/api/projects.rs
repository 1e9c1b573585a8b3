use super::segment;
use crate::client::{ApiClient, ClientError};
use crate::models::{
    AddTagsToProjectDto, CreateProjectDto, CreateTagDto, CreateTaskDto, InviteResponse,
    InviteUserDto, MessageResponse, Paginated, PaginationQuery, Project, ProjectAnalysisResponse,
    ProjectMember, ProjectSummaryResponse, SuggestTagsDto, Tag, TagSuggestionResponse, Task,
    UpdateProjectDto, UpdateTagDto, UpdateTaskDto,
};

/// Projects, tags, tasks and the AI helpers. Role checks happen on the backend.
pub struct ProjectsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> ProjectsApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn create_project(&self, project: &CreateProjectDto) -> Result<Project, ClientError> {
        self.client.post("/api/projects", project).await
    }

    pub async fn get_projects(&self) -> Result<Vec<Project>, ClientError> {
        self.client.get("/api/projects").await
    }

    pub async fn get_paginated_projects(
        &self,
        query: &PaginationQuery,
    ) -> Result<Paginated<Project>, ClientError> {
        self.client
            .get_with_query("/api/projects/paginated", query)
            .await
    }

    pub async fn get_project(&self, project_id: &str) -> Result<Project, ClientError> {
        self.client
            .get(&format!("/api/projects/{}", segment(project_id)))
            .await
    }

    pub async fn update_project(
        &self,
        project_id: &str,
        update: &UpdateProjectDto,
    ) -> Result<Project, ClientError> {
        self.client
            .patch(&format!("/api/projects/{}", segment(project_id)), update)
            .await
    }

    /// `None` when the backend confirms with 204 instead of a message.
    pub async fn delete_project(
        &self,
        project_id: &str,
    ) -> Result<Option<MessageResponse>, ClientError> {
        self.client
            .delete_optional(&format!("/api/projects/{}", segment(project_id)))
            .await
    }

    pub async fn invite_user(
        &self,
        project_id: &str,
        invite: &InviteUserDto,
    ) -> Result<InviteResponse, ClientError> {
        self.client
            .post(&format!("/api/projects/{}/invite", segment(project_id)), invite)
            .await
    }

    pub async fn get_project_members(
        &self,
        project_id: &str,
    ) -> Result<Vec<ProjectMember>, ClientError> {
        self.client
            .get(&format!("/api/projects/{}/members", segment(project_id)))
            .await
    }

    pub async fn get_project_tags(&self, project_id: &str) -> Result<Vec<Tag>, ClientError> {
        self.client
            .get(&format!("/api/projects/{}/tags", segment(project_id)))
            .await
    }

    pub async fn add_tags_to_project(
        &self,
        project_id: &str,
        tag_ids: Vec<String>,
    ) -> Result<Project, ClientError> {
        self.client
            .post(
                &format!("/api/projects/{}/tags", segment(project_id)),
                &AddTagsToProjectDto { tag_ids },
            )
            .await
    }

    pub async fn remove_tag_from_project(
        &self,
        project_id: &str,
        tag_id: &str,
    ) -> Result<(), ClientError> {
        self.client
            .delete_empty(&format!(
                "/api/projects/{}/tags/{}",
                segment(project_id),
                segment(tag_id)
            ))
            .await
    }

    pub async fn create_tag(&self, tag: &CreateTagDto) -> Result<Tag, ClientError> {
        self.client.post("/api/tags", tag).await
    }

    pub async fn get_all_tags(&self) -> Result<Vec<Tag>, ClientError> {
        self.client.get("/api/tags").await
    }

    pub async fn get_tag(&self, tag_id: &str) -> Result<Tag, ClientError> {
        self.client
            .get(&format!("/api/tags/{}", segment(tag_id)))
            .await
    }

    pub async fn update_tag(&self, tag_id: &str, update: &UpdateTagDto) -> Result<Tag, ClientError> {
        self.client
            .patch(&format!("/api/tags/{}", segment(tag_id)), update)
            .await
    }

    pub async fn delete_tag(&self, tag_id: &str) -> Result<(), ClientError> {
        self.client
            .delete_empty(&format!("/api/tags/{}", segment(tag_id)))
            .await
    }

    pub async fn create_task(
        &self,
        project_id: &str,
        task: &CreateTaskDto,
    ) -> Result<Task, ClientError> {
        self.client
            .post(&format!("/api/projects/{}/tasks", segment(project_id)), task)
            .await
    }

    pub async fn get_project_tasks(&self, project_id: &str) -> Result<Vec<Task>, ClientError> {
        self.client
            .get(&format!("/api/projects/{}/tasks", segment(project_id)))
            .await
    }

    pub async fn update_task(&self, task_id: &str, update: &UpdateTaskDto) -> Result<Task, ClientError> {
        self.client
            .patch(&format!("/api/tasks/{}", segment(task_id)), update)
            .await
    }

    pub async fn delete_task(&self, task_id: &str) -> Result<Option<MessageResponse>, ClientError> {
        self.client
            .delete_optional(&format!("/api/tasks/{}", segment(task_id)))
            .await
    }

    pub async fn suggest_tags(
        &self,
        content: &str,
        project_id: Option<&str>,
    ) -> Result<TagSuggestionResponse, ClientError> {
        let body = SuggestTagsDto {
            content: content.to_string(),
            project_id: project_id.map(str::to_string),
        };
        self.client.post("/api/ai/suggest-tags", &body).await
    }

    pub async fn analyze_project(
        &self,
        project_id: &str,
    ) -> Result<ProjectAnalysisResponse, ClientError> {
        self.client
            .get(&format!("/api/ai/analyze-project/{}", segment(project_id)))
            .await
    }

    pub async fn get_project_summary(
        &self,
        project_id: &str,
    ) -> Result<ProjectSummaryResponse, ClientError> {
        self.client
            .get(&format!("/api/ai/project-summary/{}", segment(project_id)))
            .await
    }

    /// Creates the tag, then attaches it. A failed attach leaves the tag in place.
    pub async fn create_and_add_tag_to_project(
        &self,
        project_id: &str,
        tag: &CreateTagDto,
    ) -> Result<(Tag, Project), ClientError> {
        let tag = self.create_tag(tag).await?;
        let project = self
            .add_tags_to_project(project_id, vec![tag.id.clone()])
            .await?;
        Ok((tag, project))
    }
}
