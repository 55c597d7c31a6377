//! The task workflow engine.
//!
//! Every operation resolves the caller's authority from a pre-resolved
//! capability set, applies the domain transition, and commits the mutated
//! task together with its comment and notification side effects as one
//! atomic store operation. Transition violations surface as typed errors;
//! nothing is retried and nothing is partially applied.

use crate::directory::domain::{Capability, CapabilitySet, UserId};
use crate::directory::ports::{DirectoryRepository, DirectoryRepositoryError};
use crate::workflow::domain::{
    Comment, CommentBody, Notification, NotificationId, NotificationKind, Priority, Progress,
    Project, ProjectId, ProjectTask, RejectionReason, TaskId, TaskName, TaskStatus,
    WorkflowDomainError,
};
use crate::workflow::ports::{TransitionRecord, WorkflowStore, WorkflowStoreError};
use crate::workflow::services::{
    ComposeError, NotificationComposer, NotificationContext, RejectionProgressPolicy,
    WorkflowConfig,
};
use chrono::NaiveDate;
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    project_id: ProjectId,
    name: String,
    due_date: NaiveDate,
    priority: Priority,
    assignee: Option<UserId>,
}

impl CreateTaskRequest {
    /// Creates a request with required fields.
    #[must_use]
    pub fn new(
        project_id: ProjectId,
        name: impl Into<String>,
        due_date: NaiveDate,
        priority: Priority,
    ) -> Self {
        Self {
            project_id,
            name: name.into(),
            due_date,
            priority,
            assignee: None,
        }
    }

    /// Assigns the task on creation.
    #[must_use]
    pub const fn with_assignee(mut self, assignee: UserId) -> Self {
        self.assignee = Some(assignee);
        self
    }
}

/// Request payload for an assignee progress update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateProgressRequest {
    task_id: TaskId,
    progress: u8,
    requested_status: Option<TaskStatus>,
}

impl UpdateProgressRequest {
    /// Creates a request recording the given percentage.
    #[must_use]
    pub const fn new(task_id: TaskId, progress: u8) -> Self {
        Self {
            task_id,
            progress,
            requested_status: None,
        }
    }

    /// Requests an explicit status alongside the percentage.
    ///
    /// Only `Todo` and `InProgress` are accepted; progress 100 overrides any
    /// request with awaiting-validation.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.requested_status = Some(status);
        self
    }
}

/// Request payload for sending submitted work back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectTaskRequest {
    task_id: TaskId,
    reason: String,
}

impl RejectTaskRequest {
    /// Creates a request with the mandatory reason.
    #[must_use]
    pub fn new(task_id: TaskId, reason: impl Into<String>) -> Self {
        Self {
            task_id,
            reason: reason.into(),
        }
    }
}

/// Request payload for reassigning a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignTaskRequest {
    task_id: TaskId,
    assignee: UserId,
}

impl AssignTaskRequest {
    /// Creates a reassignment request.
    #[must_use]
    pub const fn new(task_id: TaskId, assignee: UserId) -> Self {
        Self { task_id, assignee }
    }
}

/// Request payload for commenting on a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentOnTaskRequest {
    task_id: TaskId,
    body: String,
}

impl CommentOnTaskRequest {
    /// Creates a comment request.
    #[must_use]
    pub fn new(task_id: TaskId, body: impl Into<String>) -> Self {
        Self {
            task_id,
            body: body.into(),
        }
    }
}

/// Read-time reporting aggregate for one project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectStatistics {
    /// Project the statistics describe.
    pub project_id: ProjectId,
    /// Total number of tasks.
    pub task_count: u64,
    /// Tasks in `Todo`.
    pub todo: u64,
    /// Tasks in `InProgress`.
    pub in_progress: u64,
    /// Tasks awaiting validation.
    pub awaiting_validation: u64,
    /// Validated tasks.
    pub validated: u64,
    /// Unfinished tasks whose due date has passed.
    pub overdue: u64,
    /// Rounded mean progress across all tasks.
    pub progress: Progress,
}

/// Service-level errors for workflow operations.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Domain validation or transition guard failed.
    #[error(transparent)]
    Domain(#[from] WorkflowDomainError),

    /// The caller lacks the authority the operation requires.
    #[error("user {user_id} may not {action}")]
    Forbidden {
        /// Caller whose request was refused.
        user_id: UserId,
        /// Operation that was refused.
        action: &'static str,
    },

    /// The task was not found.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The project was not found.
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),

    /// The notification was not found for the caller.
    #[error("notification not found: {0}")]
    NotificationNotFound(NotificationId),

    /// The referenced user does not exist in the directory.
    #[error("unknown user: {0}")]
    UnknownUser(UserId),

    /// A concurrent transition changed the task first.
    #[error("conflicting concurrent update on task {0}")]
    Conflict(TaskId),

    /// Notification rendering failed.
    #[error(transparent)]
    Compose(#[from] ComposeError),

    /// Directory lookup failed.
    #[error(transparent)]
    Directory(#[from] DirectoryRepositoryError),

    /// Store operation failed.
    #[error(transparent)]
    Store(WorkflowStoreError),
}

impl From<WorkflowStoreError> for WorkflowError {
    fn from(err: WorkflowStoreError) -> Self {
        match err {
            WorkflowStoreError::StaleTransition { task_id } => Self::Conflict(task_id),
            WorkflowStoreError::TaskNotFound(task_id) => Self::TaskNotFound(task_id),
            WorkflowStoreError::ProjectNotFound(project_id) => Self::ProjectNotFound(project_id),
            WorkflowStoreError::NotificationNotFound(id) => Self::NotificationNotFound(id),
            other => Self::Store(other),
        }
    }
}

/// Result type for workflow service operations.
pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Task workflow orchestration service.
#[derive(Clone)]
pub struct TaskWorkflowService<S, D, C>
where
    S: WorkflowStore,
    D: DirectoryRepository,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    directory: Arc<D>,
    clock: Arc<C>,
    composer: Arc<NotificationComposer>,
    config: WorkflowConfig,
}

impl<S, D, C> TaskWorkflowService<S, D, C>
where
    S: WorkflowStore,
    D: DirectoryRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new workflow service.
    #[must_use]
    pub fn new(store: Arc<S>, directory: Arc<D>, clock: Arc<C>, config: WorkflowConfig) -> Self {
        Self {
            store,
            directory,
            clock,
            composer: Arc::new(NotificationComposer::new()),
            config,
        }
    }

    /// Creates a task in the given project.
    ///
    /// Requires project-manager authority over the project's team. An
    /// initial assignee receives an [`NotificationKind::Assigned`]
    /// notification.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError`] when the project is unknown, the caller
    /// lacks authority, the name is invalid, or persistence fails.
    pub async fn create_task(
        &self,
        request: CreateTaskRequest,
        caller: &CapabilitySet,
    ) -> WorkflowResult<ProjectTask> {
        let project = self.load_project(request.project_id).await?;
        Self::require_manager(&project, caller, "create tasks for this project")?;
        if let Some(assignee) = request.assignee {
            self.require_known_user(assignee).await?;
        }

        let name = TaskName::new(request.name)?;
        let task = ProjectTask::new(
            project.id(),
            name,
            request.due_date,
            request.priority,
            request.assignee,
            caller.user_id(),
            &*self.clock,
        );
        self.store.insert_task(&task).await?;

        if let Some(assignee) = request.assignee {
            let notification =
                self.assignment_notification(&task, &project, caller, assignee)?;
            self.store.insert_notification(&notification).await?;
        }
        tracing::debug!(task = %task.id(), project = %project.id(), "created task");
        Ok(task)
    }

    /// Records an assignee progress update.
    ///
    /// Progress 100 submits the work: the status is forced to
    /// awaiting-validation and every project manager in scope is notified.
    /// Below 100 the status follows the caller's `Todo`/`InProgress` choice.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Forbidden`] when the caller is not the
    /// assignee, a domain error when the task is locked or the input is out
    /// of range, and [`WorkflowError::Conflict`] when a concurrent
    /// transition wins the race.
    pub async fn update_progress(
        &self,
        request: UpdateProgressRequest,
        caller: &CapabilitySet,
    ) -> WorkflowResult<ProjectTask> {
        let mut task = self.load_task(request.task_id).await?;
        if task.assigned_to() != Some(caller.user_id())
            || !caller.allows(&Capability::EditAssignedTask)
        {
            return Err(WorkflowError::Forbidden {
                user_id: caller.user_id(),
                action: "record progress on this task",
            });
        }

        let expected_status = task.status();
        let expected_progress = task.progress();
        let progress = Progress::new(request.progress)?;
        task.record_progress(progress, request.requested_status, &*self.clock)?;

        let notifications = if task.status() == TaskStatus::AwaitingValidation {
            let project = self.load_project(task.project_id()).await?;
            self.submission_notifications(&task, &project, caller).await?
        } else {
            Vec::new()
        };

        self.store
            .commit_transition(TransitionRecord {
                expected_status,
                expected_progress,
                task: task.clone(),
                comment: None,
                notifications,
            })
            .await?;
        tracing::debug!(
            task = %task.id(),
            from = expected_status.as_str(),
            to = task.status().as_str(),
            progress = task.progress().value(),
            "recorded progress",
        );
        Ok(task)
    }

    /// Approves submitted work.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Forbidden`] without project-manager
    /// authority, a domain error unless the task awaits validation, and
    /// [`WorkflowError::Conflict`] when a concurrent transition wins.
    pub async fn validate_task(
        &self,
        task_id: TaskId,
        caller: &CapabilitySet,
    ) -> WorkflowResult<ProjectTask> {
        let mut task = self.load_task(task_id).await?;
        let project = self.load_project(task.project_id()).await?;
        Self::require_manager(&project, caller, "validate tasks for this project")?;

        let expected_status = task.status();
        let expected_progress = task.progress();
        task.approve(caller.user_id(), &*self.clock)?;

        let mut notifications = Vec::new();
        if let Some(assignee) = task.assigned_to() {
            let body = self.composer.render(
                NotificationKind::Validated,
                &self.context_for(&task, &project, caller, None),
            )?;
            notifications.push(
                Notification::new(assignee, NotificationKind::Validated, body, &*self.clock)
                    .with_project(project.id())
                    .with_task(task.id())
                    .with_actor(caller.user_id()),
            );
        }

        self.store
            .commit_transition(TransitionRecord {
                expected_status,
                expected_progress,
                task: task.clone(),
                comment: None,
                notifications,
            })
            .await?;
        tracing::debug!(task = %task.id(), validator = %caller.user_id(), "validated task");
        Ok(task)
    }

    /// Sends submitted work back with a mandatory reason.
    ///
    /// The reason is persisted as a comment authored by the rejecting
    /// manager, the rejection timestamp is stamped, the validation fields
    /// are cleared, and the task resumes in-progress at the configured
    /// resumption percentage.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Forbidden`] without project-manager
    /// authority, a domain error when the reason is empty or over-long or
    /// the task does not await validation, and [`WorkflowError::Conflict`]
    /// when a concurrent transition wins.
    pub async fn reject_task(
        &self,
        request: RejectTaskRequest,
        caller: &CapabilitySet,
    ) -> WorkflowResult<ProjectTask> {
        let mut task = self.load_task(request.task_id).await?;
        let project = self.load_project(task.project_id()).await?;
        Self::require_manager(&project, caller, "reject tasks for this project")?;
        let reason = RejectionReason::new(request.reason, self.config.max_reason_chars)?;

        let expected_status = task.status();
        let expected_progress = task.progress();
        let resumed = match self.config.rejection_progress {
            RejectionProgressPolicy::RevertToRecorded => task.resumption_progress(),
            RejectionProgressPolicy::ResetToZero => Progress::ZERO,
        };
        task.send_back(resumed, &*self.clock)?;

        let comment = Comment::new(
            task.id(),
            caller.user_id(),
            reason.clone().into_comment_body(),
            &*self.clock,
        );
        let mut notifications = Vec::new();
        if let Some(assignee) = task.assigned_to() {
            let body = self.composer.render(
                NotificationKind::Rejected,
                &self.context_for(&task, &project, caller, Some(reason.as_str())),
            )?;
            notifications.push(
                Notification::new(assignee, NotificationKind::Rejected, body, &*self.clock)
                    .with_project(project.id())
                    .with_task(task.id())
                    .with_actor(caller.user_id()),
            );
        }

        self.store
            .commit_transition(TransitionRecord {
                expected_status,
                expected_progress,
                task: task.clone(),
                comment: Some(comment),
                notifications,
            })
            .await?;
        tracing::debug!(
            task = %task.id(),
            validator = %caller.user_id(),
            resumed = resumed.value(),
            "rejected task",
        );
        Ok(task)
    }

    /// Reassigns the task to another user.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Forbidden`] without project-manager
    /// authority, [`WorkflowError::UnknownUser`] when the assignee is not in
    /// the directory, a domain error while the task is locked, and
    /// [`WorkflowError::Conflict`] when a concurrent transition wins.
    pub async fn assign_task(
        &self,
        request: AssignTaskRequest,
        caller: &CapabilitySet,
    ) -> WorkflowResult<ProjectTask> {
        let mut task = self.load_task(request.task_id).await?;
        let project = self.load_project(task.project_id()).await?;
        Self::require_manager(&project, caller, "assign tasks for this project")?;
        self.require_known_user(request.assignee).await?;

        let expected_status = task.status();
        let expected_progress = task.progress();
        task.reassign(request.assignee, &*self.clock)?;

        let notification =
            self.assignment_notification(&task, &project, caller, request.assignee)?;
        self.store
            .commit_transition(TransitionRecord {
                expected_status,
                expected_progress,
                task: task.clone(),
                comment: None,
                notifications: vec![notification],
            })
            .await?;
        tracing::debug!(task = %task.id(), assignee = %request.assignee, "assigned task");
        Ok(task)
    }

    /// Attaches a comment to a task.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Forbidden`] without the comment capability,
    /// or a domain error when the body is empty or over-long.
    pub async fn comment_on_task(
        &self,
        request: CommentOnTaskRequest,
        caller: &CapabilitySet,
    ) -> WorkflowResult<Comment> {
        if !caller.allows(&Capability::CommentOnTask) {
            return Err(WorkflowError::Forbidden {
                user_id: caller.user_id(),
                action: "comment on tasks",
            });
        }
        let task = self.load_task(request.task_id).await?;
        let body = CommentBody::new(request.body, self.config.max_comment_chars)?;
        let comment = Comment::new(task.id(), caller.user_id(), body, &*self.clock);
        self.store.insert_comment(&comment).await?;
        Ok(comment)
    }

    /// Returns the comments of one task, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::TaskNotFound`] when the task is absent.
    pub async fn comments_for_task(&self, task_id: TaskId) -> WorkflowResult<Vec<Comment>> {
        let task = self.load_task(task_id).await?;
        Ok(self.store.comments_for_task(task.id()).await?)
    }

    /// Derives the project's progress as the rounded mean of its task
    /// progress values. A project without tasks reports zero.
    ///
    /// Pure read: idempotent and side-effect-free.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::ProjectNotFound`] when the project is
    /// absent.
    pub async fn project_progress(&self, project_id: ProjectId) -> WorkflowResult<Progress> {
        let project = self.load_project(project_id).await?;
        let tasks = self.store.tasks_for_project(project.id()).await?;
        let values: Vec<Progress> = tasks.iter().map(ProjectTask::progress).collect();
        Ok(Progress::mean(&values))
    }

    /// Derives per-status counts, the overdue count, and the mean progress
    /// for one project.
    ///
    /// Pure read: idempotent and side-effect-free.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::ProjectNotFound`] when the project is
    /// absent.
    pub async fn project_statistics(
        &self,
        project_id: ProjectId,
    ) -> WorkflowResult<ProjectStatistics> {
        let project = self.load_project(project_id).await?;
        let tasks = self.store.tasks_for_project(project.id()).await?;
        let today = self.clock.utc().date_naive();

        let mut statistics = ProjectStatistics {
            project_id: project.id(),
            task_count: 0,
            todo: 0,
            in_progress: 0,
            awaiting_validation: 0,
            validated: 0,
            overdue: 0,
            progress: Progress::ZERO,
        };
        let mut values = Vec::with_capacity(tasks.len());
        for task in &tasks {
            statistics.task_count += 1;
            match task.status() {
                TaskStatus::Todo => statistics.todo += 1,
                TaskStatus::InProgress => statistics.in_progress += 1,
                TaskStatus::AwaitingValidation => statistics.awaiting_validation += 1,
                TaskStatus::Validated => statistics.validated += 1,
            }
            if task.status().is_open() && task.due_date() < today {
                statistics.overdue += 1;
            }
            values.push(task.progress());
        }
        statistics.progress = Progress::mean(&values);
        Ok(statistics)
    }

    /// Returns the notifications addressed to one user, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Store`] when the lookup fails.
    pub async fn notifications_for(
        &self,
        user_id: UserId,
    ) -> WorkflowResult<Vec<Notification>> {
        Ok(self.store.notifications_for(user_id).await?)
    }

    /// Returns the number of unread notifications addressed to one user.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Store`] when the lookup fails.
    pub async fn unread_count(&self, user_id: UserId) -> WorkflowResult<u64> {
        Ok(self.store.unread_count(user_id).await?)
    }

    /// Stamps a notification read on behalf of its recipient.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::NotificationNotFound`] when the caller has
    /// no such notification.
    pub async fn mark_notification_read(
        &self,
        id: NotificationId,
        caller: &CapabilitySet,
    ) -> WorkflowResult<Notification> {
        let mut notification = self
            .store
            .find_notification(id)
            .await?
            .filter(|found| found.recipient() == caller.user_id())
            .ok_or(WorkflowError::NotificationNotFound(id))?;
        notification.mark_read(&*self.clock);
        self.store.update_notification(&notification).await?;
        Ok(notification)
    }

    /// Deletes a notification on behalf of its recipient.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::NotificationNotFound`] when the caller has
    /// no such notification.
    pub async fn delete_notification(
        &self,
        id: NotificationId,
        caller: &CapabilitySet,
    ) -> WorkflowResult<()> {
        Ok(self
            .store
            .delete_notification(id, caller.user_id())
            .await?)
    }

    async fn load_task(&self, task_id: TaskId) -> WorkflowResult<ProjectTask> {
        self.store
            .find_task(task_id)
            .await?
            .ok_or(WorkflowError::TaskNotFound(task_id))
    }

    async fn load_project(&self, project_id: ProjectId) -> WorkflowResult<Project> {
        self.store
            .find_project(project_id)
            .await?
            .ok_or(WorkflowError::ProjectNotFound(project_id))
    }

    async fn require_known_user(&self, user_id: UserId) -> WorkflowResult<()> {
        self.directory
            .find_user(user_id)
            .await?
            .map(|_| ())
            .ok_or(WorkflowError::UnknownUser(user_id))
    }

    fn require_manager(
        project: &Project,
        caller: &CapabilitySet,
        action: &'static str,
    ) -> WorkflowResult<()> {
        let authorized = caller.can_manage_tasks(project.team_id())
            || project.manager() == Some(caller.user_id());
        if authorized {
            Ok(())
        } else {
            Err(WorkflowError::Forbidden {
                user_id: caller.user_id(),
                action,
            })
        }
    }

    fn context_for(
        &self,
        task: &ProjectTask,
        project: &Project,
        caller: &CapabilitySet,
        reason: Option<&str>,
    ) -> NotificationContext {
        NotificationContext {
            task: task.name().as_str().to_owned(),
            project: project.name().as_str().to_owned(),
            actor: caller.user_name().as_str().to_owned(),
            reason: reason.map(str::to_owned),
        }
    }

    fn assignment_notification(
        &self,
        task: &ProjectTask,
        project: &Project,
        caller: &CapabilitySet,
        assignee: UserId,
    ) -> WorkflowResult<Notification> {
        let body = self.composer.render(
            NotificationKind::Assigned,
            &self.context_for(task, project, caller, None),
        )?;
        Ok(
            Notification::new(assignee, NotificationKind::Assigned, body, &*self.clock)
                .with_project(project.id())
                .with_task(task.id())
                .with_actor(caller.user_id()),
        )
    }

    async fn submission_notifications(
        &self,
        task: &ProjectTask,
        project: &Project,
        caller: &CapabilitySet,
    ) -> WorkflowResult<Vec<Notification>> {
        let mut recipients = self
            .directory
            .project_managers_of(project.team_id())
            .await?;
        if let Some(manager) = project.manager() {
            recipients.push(manager);
        }
        recipients.sort_unstable();
        recipients.dedup();
        recipients.retain(|recipient| *recipient != caller.user_id());

        let body = self.composer.render(
            NotificationKind::AwaitingValidation,
            &self.context_for(task, project, caller, None),
        )?;
        Ok(recipients
            .into_iter()
            .map(|recipient| {
                Notification::new(
                    recipient,
                    NotificationKind::AwaitingValidation,
                    body.clone(),
                    &*self.clock,
                )
                .with_project(project.id())
                .with_task(task.id())
                .with_actor(caller.user_id())
            })
            .collect())
    }
}
