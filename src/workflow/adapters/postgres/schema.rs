//! Diesel schema for workflow persistence.

diesel::table! {
    /// Projects owned by teams.
    projects (id) {
        /// Internal project identifier.
        id -> Uuid,
        /// Project display name.
        #[max_length = 200]
        project_name -> Varchar,
        /// First day of the schedule.
        starts_on -> Date,
        /// Last day of the schedule.
        ends_on -> Date,
        /// Lifecycle status.
        #[max_length = 50]
        status -> Varchar,
        /// Priority.
        #[max_length = 50]
        priority -> Varchar,
        /// Owning team.
        team_id -> Uuid,
        /// Creator.
        created_by -> Uuid,
        /// Assigned project manager, if any.
        manager_id -> Nullable<Uuid>,
        /// Cancellation timestamp, if cancelled.
        cancelled_at -> Nullable<Timestamptz>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Tasks owned by projects.
    project_tasks (id) {
        /// Internal task identifier.
        id -> Uuid,
        /// Parent project.
        project_id -> Uuid,
        /// Task display name.
        #[max_length = 200]
        task_name -> Varchar,
        /// Due date.
        due_date -> Date,
        /// Progress percentage.
        progress -> Int2,
        /// Lifecycle status.
        #[max_length = 50]
        status -> Varchar,
        /// Priority.
        #[max_length = 50]
        priority -> Varchar,
        /// Assignee, if any.
        assigned_to -> Nullable<Uuid>,
        /// Creator.
        created_by -> Uuid,
        /// Validator, if validated.
        validated_by -> Nullable<Uuid>,
        /// Validation timestamp, if validated.
        validated_at -> Nullable<Timestamptz>,
        /// Latest rejection timestamp, if ever rejected.
        rejected_at -> Nullable<Timestamptz>,
        /// Progress snapshot taken at submission, if submitted.
        progress_before_submission -> Nullable<Int2>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Free-text comments attached to tasks.
    task_comments (id) {
        /// Internal comment identifier.
        id -> Uuid,
        /// Task the comment is attached to.
        task_id -> Uuid,
        /// Author.
        author_id -> Uuid,
        /// Comment body.
        body -> Text,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last edit timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Notifications addressed to users.
    notifications (id) {
        /// Internal notification identifier.
        id -> Uuid,
        /// Recipient.
        recipient_id -> Uuid,
        /// Notification kind.
        #[max_length = 50]
        kind -> Varchar,
        /// Rendered body.
        body -> Text,
        /// Correlated project, nulled when the project is deleted.
        project_id -> Nullable<Uuid>,
        /// Correlated task, nulled when the task is deleted.
        task_id -> Nullable<Uuid>,
        /// Acting user, if recorded.
        actor_id -> Nullable<Uuid>,
        /// Read timestamp, if read.
        read_at -> Nullable<Timestamptz>,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Uploaded document records scoped to projects.
    project_documents (id) {
        /// Internal document identifier.
        id -> Uuid,
        /// Owning project.
        project_id -> Uuid,
        /// Uploaded-file name.
        #[max_length = 255]
        file_name -> Varchar,
        /// Uploaded size in bytes.
        size_bytes -> Int8,
        /// Lowercase hex SHA-256 digest of the content.
        #[max_length = 64]
        content_digest -> Varchar,
        /// Uploader.
        uploaded_by -> Uuid,
        /// Upload timestamp.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(project_tasks -> projects (project_id));
diesel::joinable!(task_comments -> project_tasks (task_id));
diesel::joinable!(project_documents -> projects (project_id));

diesel::allow_tables_to_appear_in_same_query!(
    projects,
    project_tasks,
    task_comments,
    notifications,
    project_documents,
);
