//! In-memory store for workflow tests.
//!
//! A single `RwLock` over the whole state makes every transition commit
//! naturally atomic: the expected status/progress check and the writes for
//! the task, its comment, and its notifications happen under one write
//! guard.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::directory::domain::{TeamId, UserId};
use crate::workflow::domain::{
    Comment, CommentId, DocumentId, Notification, NotificationId, Project, ProjectDocument,
    ProjectId, ProjectTask, TaskId,
};
use crate::workflow::ports::{
    CascadeReport, TransitionRecord, WorkflowStore, WorkflowStoreError, WorkflowStoreResult,
};

/// Thread-safe in-memory workflow store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWorkflowStore {
    state: Arc<RwLock<InMemoryWorkflowState>>,
}

#[derive(Debug, Default)]
struct InMemoryWorkflowState {
    projects: HashMap<ProjectId, Project>,
    tasks: HashMap<TaskId, ProjectTask>,
    comments: HashMap<CommentId, Comment>,
    notifications: HashMap<NotificationId, Notification>,
    documents: HashMap<DocumentId, ProjectDocument>,
}

impl InMemoryWorkflowStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_poisoned(err: impl std::fmt::Display) -> WorkflowStoreError {
    WorkflowStoreError::persistence(std::io::Error::other(err.to_string()))
}

fn count_to_u64(count: usize) -> u64 {
    u64::try_from(count).unwrap_or(u64::MAX)
}

/// Rebuilds a notification with deleted project/task correlations nulled.
fn detach_correlations(
    notification: &Notification,
    dropped_project: ProjectId,
    dropped_tasks: &HashSet<TaskId>,
) -> Notification {
    let project_id = notification
        .project_id()
        .filter(|found| *found != dropped_project);
    let task_id = notification
        .task_id()
        .filter(|found| !dropped_tasks.contains(found));
    Notification::from_persisted(
        notification.id(),
        notification.recipient(),
        notification.kind(),
        notification.body().to_owned(),
        project_id,
        task_id,
        notification.actor(),
        notification.read_at(),
        notification.created_at(),
    )
}

#[async_trait]
impl WorkflowStore for InMemoryWorkflowStore {
    async fn insert_project(&self, project: &Project) -> WorkflowStoreResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        if state.projects.contains_key(&project.id()) {
            return Err(WorkflowStoreError::DuplicateProject(project.id()));
        }
        state.projects.insert(project.id(), project.clone());
        Ok(())
    }

    async fn update_project(&self, project: &Project) -> WorkflowStoreResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        if !state.projects.contains_key(&project.id()) {
            return Err(WorkflowStoreError::ProjectNotFound(project.id()));
        }
        state.projects.insert(project.id(), project.clone());
        Ok(())
    }

    async fn find_project(&self, id: ProjectId) -> WorkflowStoreResult<Option<Project>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        Ok(state.projects.get(&id).cloned())
    }

    async fn projects_for_team(&self, team_id: TeamId) -> WorkflowStoreResult<Vec<Project>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        let mut projects: Vec<Project> = state
            .projects
            .values()
            .filter(|project| project.team_id() == team_id)
            .cloned()
            .collect();
        projects.sort_by_key(|project| (project.created_at(), project.id()));
        Ok(projects)
    }

    async fn count_projects_for_team(&self, team_id: TeamId) -> WorkflowStoreResult<u64> {
        let state = self.state.read().map_err(lock_poisoned)?;
        let count = state
            .projects
            .values()
            .filter(|project| project.team_id() == team_id)
            .count();
        Ok(count_to_u64(count))
    }

    async fn count_projects_referencing_user(
        &self,
        user_id: UserId,
    ) -> WorkflowStoreResult<u64> {
        let state = self.state.read().map_err(lock_poisoned)?;
        let count = state
            .projects
            .values()
            .filter(|project| {
                project.created_by() == user_id || project.manager() == Some(user_id)
            })
            .count();
        Ok(count_to_u64(count))
    }

    async fn delete_project(&self, id: ProjectId) -> WorkflowStoreResult<CascadeReport> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        if state.projects.remove(&id).is_none() {
            return Err(WorkflowStoreError::ProjectNotFound(id));
        }

        let dropped_tasks: HashSet<TaskId> = state
            .tasks
            .values()
            .filter(|task| task.project_id() == id)
            .map(ProjectTask::id)
            .collect();
        state.tasks.retain(|task_id, _| !dropped_tasks.contains(task_id));

        let comments_before = state.comments.len();
        state
            .comments
            .retain(|_, comment| !dropped_tasks.contains(&comment.task_id()));
        let dropped_comments = comments_before.saturating_sub(state.comments.len());

        let documents_before = state.documents.len();
        state
            .documents
            .retain(|_, document| document.project_id() != id);
        let dropped_documents = documents_before.saturating_sub(state.documents.len());

        // Correlated notifications survive with their references nulled.
        let detached: Vec<Notification> = state
            .notifications
            .values()
            .filter(|notification| {
                notification.project_id() == Some(id)
                    || notification
                        .task_id()
                        .is_some_and(|task_id| dropped_tasks.contains(&task_id))
            })
            .map(|notification| detach_correlations(notification, id, &dropped_tasks))
            .collect();
        for notification in detached {
            state.notifications.insert(notification.id(), notification);
        }

        Ok(CascadeReport {
            tasks: count_to_u64(dropped_tasks.len()),
            comments: count_to_u64(dropped_comments),
            documents: count_to_u64(dropped_documents),
        })
    }

    async fn insert_task(&self, task: &ProjectTask) -> WorkflowStoreResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        if !state.projects.contains_key(&task.project_id()) {
            return Err(WorkflowStoreError::ProjectNotFound(task.project_id()));
        }
        if state.tasks.contains_key(&task.id()) {
            return Err(WorkflowStoreError::DuplicateTask(task.id()));
        }
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn find_task(&self, id: TaskId) -> WorkflowStoreResult<Option<ProjectTask>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn tasks_for_project(
        &self,
        project_id: ProjectId,
    ) -> WorkflowStoreResult<Vec<ProjectTask>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        let mut tasks: Vec<ProjectTask> = state
            .tasks
            .values()
            .filter(|task| task.project_id() == project_id)
            .cloned()
            .collect();
        tasks.sort_by_key(|task| (task.created_at(), task.id()));
        Ok(tasks)
    }

    async fn count_tasks_referencing_user(&self, user_id: UserId) -> WorkflowStoreResult<u64> {
        let state = self.state.read().map_err(lock_poisoned)?;
        let count = state
            .tasks
            .values()
            .filter(|task| task.assigned_to() == Some(user_id) || task.created_by() == user_id)
            .count();
        Ok(count_to_u64(count))
    }

    async fn commit_transition(&self, record: TransitionRecord) -> WorkflowStoreResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        let task_id = record.task.id();
        let stored = state
            .tasks
            .get(&task_id)
            .ok_or(WorkflowStoreError::TaskNotFound(task_id))?;
        if stored.status() != record.expected_status
            || stored.progress() != record.expected_progress
        {
            return Err(WorkflowStoreError::StaleTransition { task_id });
        }

        state.tasks.insert(task_id, record.task);
        if let Some(comment) = record.comment {
            state.comments.insert(comment.id(), comment);
        }
        for notification in record.notifications {
            state.notifications.insert(notification.id(), notification);
        }
        Ok(())
    }

    async fn insert_comment(&self, comment: &Comment) -> WorkflowStoreResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        if !state.tasks.contains_key(&comment.task_id()) {
            return Err(WorkflowStoreError::TaskNotFound(comment.task_id()));
        }
        state.comments.insert(comment.id(), comment.clone());
        Ok(())
    }

    async fn comments_for_task(&self, task_id: TaskId) -> WorkflowStoreResult<Vec<Comment>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        let mut comments: Vec<Comment> = state
            .comments
            .values()
            .filter(|comment| comment.task_id() == task_id)
            .cloned()
            .collect();
        comments.sort_by_key(|comment| (comment.created_at(), comment.id()));
        Ok(comments)
    }

    async fn insert_notification(&self, notification: &Notification) -> WorkflowStoreResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        state
            .notifications
            .insert(notification.id(), notification.clone());
        Ok(())
    }

    async fn find_notification(
        &self,
        id: NotificationId,
    ) -> WorkflowStoreResult<Option<Notification>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        Ok(state.notifications.get(&id).cloned())
    }

    async fn update_notification(
        &self,
        notification: &Notification,
    ) -> WorkflowStoreResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        if !state.notifications.contains_key(&notification.id()) {
            return Err(WorkflowStoreError::NotificationNotFound(notification.id()));
        }
        state
            .notifications
            .insert(notification.id(), notification.clone());
        Ok(())
    }

    async fn notifications_for(
        &self,
        user_id: UserId,
    ) -> WorkflowStoreResult<Vec<Notification>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        let mut notifications: Vec<Notification> = state
            .notifications
            .values()
            .filter(|notification| notification.recipient() == user_id)
            .cloned()
            .collect();
        notifications.sort_by_key(|notification| (notification.created_at(), notification.id()));
        notifications.reverse();
        Ok(notifications)
    }

    async fn unread_count(&self, user_id: UserId) -> WorkflowStoreResult<u64> {
        let state = self.state.read().map_err(lock_poisoned)?;
        let count = state
            .notifications
            .values()
            .filter(|notification| {
                notification.recipient() == user_id && notification.is_unread()
            })
            .count();
        Ok(count_to_u64(count))
    }

    async fn delete_notification(
        &self,
        id: NotificationId,
        recipient: UserId,
    ) -> WorkflowStoreResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        let owned = state
            .notifications
            .get(&id)
            .is_some_and(|notification| notification.recipient() == recipient);
        if !owned {
            return Err(WorkflowStoreError::NotificationNotFound(id));
        }
        state.notifications.remove(&id);
        Ok(())
    }

    async fn delete_notifications_for_user(&self, user_id: UserId) -> WorkflowStoreResult<u64> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        let before = state.notifications.len();
        state
            .notifications
            .retain(|_, notification| notification.recipient() != user_id);
        Ok(count_to_u64(before.saturating_sub(state.notifications.len())))
    }

    async fn insert_document(&self, document: &ProjectDocument) -> WorkflowStoreResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        if !state.projects.contains_key(&document.project_id()) {
            return Err(WorkflowStoreError::ProjectNotFound(document.project_id()));
        }
        state.documents.insert(document.id(), document.clone());
        Ok(())
    }

    async fn find_document(
        &self,
        id: DocumentId,
    ) -> WorkflowStoreResult<Option<ProjectDocument>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        Ok(state.documents.get(&id).cloned())
    }

    async fn documents_for_project(
        &self,
        project_id: ProjectId,
    ) -> WorkflowStoreResult<Vec<ProjectDocument>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        let mut documents: Vec<ProjectDocument> = state
            .documents
            .values()
            .filter(|document| document.project_id() == project_id)
            .cloned()
            .collect();
        documents.sort_by_key(|document| (document.created_at(), document.id()));
        Ok(documents)
    }
}
