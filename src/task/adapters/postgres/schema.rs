//! Diesel schema for task lifecycle persistence.

diesel::table! {
    /// Task records.
    tasks (id) {
        /// Internal task identifier.
        id -> Uuid,
        /// Owner identifier.
        #[max_length = 255]
        owner_id -> Varchar,
        /// Original instruction.
        prompt -> Text,
        /// Display title.
        title -> Text,
        /// Repository clone URL.
        repo_url -> Text,
        /// Working branch, once resolved.
        #[max_length = 255]
        branch_name -> Nullable<Varchar>,
        /// Selected agent.
        #[max_length = 50]
        agent -> Varchar,
        /// Selected model.
        #[max_length = 255]
        model -> Nullable<Varchar>,
        /// Wall-clock budget in minutes.
        max_duration_minutes -> Int4,
        /// Keep-alive flag.
        keep_alive -> Bool,
        /// Install-dependencies flag.
        install_dependencies -> Bool,
        /// Lifecycle status.
        #[max_length = 50]
        status -> Varchar,
        /// Completion percentage.
        progress -> Int2,
        /// Free-text status message.
        status_message -> Nullable<Text>,
        /// Live sandbox identifier.
        #[max_length = 255]
        sandbox_id -> Nullable<Varchar>,
        /// Live sandbox URL.
        sandbox_url -> Nullable<Text>,
        /// Dev-server preview URL.
        preview_url -> Nullable<Text>,
        /// Resumable agent session.
        #[max_length = 255]
        agent_session_id -> Nullable<Varchar>,
        /// Last run error.
        error -> Nullable<Text>,
        /// Soft-delete marker.
        deleted_at -> Nullable<Timestamptz>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
        /// Completion timestamp of the latest run.
        completed_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Append-only conversation transcript.
    task_messages (id) {
        /// Entry identifier.
        id -> Uuid,
        /// Owning task.
        task_id -> Uuid,
        /// Author role.
        #[max_length = 20]
        role -> Varchar,
        /// Message body.
        content -> Text,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only per-task log.
    task_logs (id) {
        /// Insertion sequence.
        id -> Int8,
        /// Owning task.
        task_id -> Uuid,
        /// Log level.
        #[max_length = 20]
        level -> Varchar,
        /// Log message.
        message -> Text,
        /// Entry timestamp.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(task_messages -> tasks (task_id));
diesel::joinable!(task_logs -> tasks (task_id));
diesel::allow_tables_to_appear_in_same_query!(tasks, task_messages, task_logs);
