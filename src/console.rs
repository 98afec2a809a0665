//! Console session
//!
//! A `Console` owns the API client, the mirror and the notification stack
//! for one session and implements every user action. Each action reports
//! its outcome through exactly one notification: a failure is never
//! followed by a refresh, and a success is followed by a re-fetch of the
//! affected collection.

use tracing::{debug, info};

use crate::api::ResourceApi;
use crate::config::Config;
use crate::error::{ApiError, ConsoleError, SubmitError, ValidationError};
use crate::form::{
    AutoResponseForm, CommandForm, ConverterForm, ForbiddenWordForm, GroupForm, Submission,
    SubmitMode,
};
use crate::mirror::{Flag, Mirror};
use crate::model::{GroupPayload, Payload, ResourceKind};
use crate::notify::{Level, NotificationCenter, NotificationSink};
use crate::upload::UploadCoordinator;

/// Per-session values taken from the configuration
#[derive(Debug, Clone)]
pub struct Settings {
    pub stats_days: u32,
    pub category: String,
    pub created_by: String,
}

impl From<&Config> for Settings {
    fn from(config: &Config) -> Self {
        Self {
            stats_days: config.stats.days,
            category: config.defaults.category.clone(),
            created_by: config.defaults.created_by.clone(),
        }
    }
}

pub struct Console<A: ResourceApi> {
    api: A,
    mirror: Mirror,
    notifications: NotificationCenter,
    uploads: UploadCoordinator,
    settings: Settings,
}

impl<A: ResourceApi> Console<A> {
    pub fn new(api: A, config: &Config) -> Self {
        Self {
            api,
            mirror: Mirror::new(),
            notifications: NotificationCenter::new(config.notification_lifetime()),
            uploads: UploadCoordinator::new(config.upload.max_bytes),
            settings: Settings::from(config),
        }
    }

    pub fn with_sink(mut self, sink: Box<dyn NotificationSink>) -> Self {
        self.notifications = self.notifications.with_sink(sink);
        self
    }

    pub fn mirror(&self) -> &Mirror {
        &self.mirror
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    // ============================================
    // LOADING
    // ============================================

    pub async fn refresh(&mut self, kind: ResourceKind) -> Result<usize, ConsoleError> {
        match self.mirror.refresh(&self.api, kind).await {
            Ok(count) => Ok(count),
            Err(e) => Err(self.api_failure(&format!("Failed to load {}s", kind.label()), e)),
        }
    }

    /// Fetch usage statistics; `None` uses the configured window
    pub async fn refresh_stats(&mut self, days: Option<u32>) -> Result<(), ConsoleError> {
        let days = days.unwrap_or(self.settings.stats_days);
        let result = self
            .mirror
            .refresh_stats(&self.api, days)
            .await
            .map(|_| ());
        result.map_err(|e| self.api_failure("Failed to load statistics", e))
    }

    async fn ensure_loaded(&mut self, kind: ResourceKind) -> Result<(), ConsoleError> {
        if !self.mirror.is_loaded(kind) {
            self.refresh(kind).await?;
        }
        Ok(())
    }

    /// Re-fetch after a successful mutation. A failure here is reported on
    /// its own and does not undo the mutation.
    async fn settle(&mut self, kind: ResourceKind) {
        if self.refresh(kind).await.is_err() {
            debug!("{} list is stale until the next refresh", kind.label());
        }
    }

    // ============================================
    // GROUPS
    // ============================================

    /// Flip a group's active flag, restoring it if the server refuses
    pub async fn toggle_group(&mut self, jid: &str, active: bool) -> Result<(), ConsoleError> {
        self.ensure_loaded(ResourceKind::Group).await?;

        let previous = match self
            .mirror
            .set_flag(ResourceKind::Group, jid, Flag::Active, active)
        {
            Some(previous) => previous,
            None => return Err(self.not_found(ResourceKind::Group, jid)),
        };
        let payload = match self.mirror.group(jid) {
            Some(group) => Payload::Group(GroupPayload::from(group)),
            None => return Err(self.not_found(ResourceKind::Group, jid)),
        };

        if let Err(e) = self.api.update(&payload).await {
            self.mirror
                .set_flag(ResourceKind::Group, jid, Flag::Active, previous);
            return Err(self.api_failure("Failed to change group status", e));
        }

        info!("Group {} is_active={}", jid, active);
        self.notifications.success(if active {
            "Group activated"
        } else {
            "Group deactivated"
        });
        self.settle(ResourceKind::Group).await;
        Ok(())
    }

    pub async fn add_group(&mut self, mut form: GroupForm) -> Result<(), ConsoleError> {
        if form.created_by.trim().is_empty() {
            form.created_by = self.settings.created_by.clone();
        }
        let submission = form.build().map_err(|e| self.invalid(e))?;
        self.submit(submission).await
    }

    /// Fetch the groups the bot has joined and mark which are registered.
    /// Returns how many were found.
    pub async fn discover_groups(&mut self) -> Result<usize, ConsoleError> {
        self.refresh(ResourceKind::Group).await?;
        let result = self.mirror.refresh_joined_groups(&self.api).await;
        result.map_err(|e| self.api_failure("Failed to load joined groups", e))
    }

    // ============================================
    // COMMANDS, AUTO RESPONSES AND CONVERTERS
    // ============================================

    pub async fn submit_command(&mut self, mut form: CommandForm) -> Result<(), ConsoleError> {
        if form.category.trim().is_empty() {
            form.category = self.settings.category.clone();
        }
        let submission = form.build().map_err(|e| self.invalid(e))?;
        self.submit(submission).await
    }

    pub async fn submit_auto_response(
        &mut self,
        form: AutoResponseForm,
    ) -> Result<(), ConsoleError> {
        let submission = form.build().map_err(|e| self.invalid(e))?;
        self.submit(submission).await
    }

    pub async fn command_form_for_edit(&mut self, key: &str) -> Result<CommandForm, ConsoleError> {
        self.ensure_loaded(ResourceKind::Command).await?;
        match self.mirror.command(key) {
            Some(command) => Ok(CommandForm::edit(command)),
            None => Err(self.not_found(ResourceKind::Command, key)),
        }
    }

    pub async fn auto_response_form_for_edit(
        &mut self,
        keyword: &str,
    ) -> Result<AutoResponseForm, ConsoleError> {
        self.ensure_loaded(ResourceKind::AutoResponse).await?;
        match self.mirror.auto_response(keyword) {
            Some(response) => Ok(AutoResponseForm::edit(response)),
            None => Err(self.not_found(ResourceKind::AutoResponse, keyword)),
        }
    }

    pub async fn submit_converter(&mut self, form: ConverterForm) -> Result<(), ConsoleError> {
        let submission = form.build().map_err(|e| self.invalid(e))?;
        self.submit(submission).await
    }

    pub async fn converter_form_for_edit(
        &mut self,
        command_name: &str,
    ) -> Result<ConverterForm, ConsoleError> {
        self.ensure_loaded(ResourceKind::Converter).await?;
        match self.mirror.converter(command_name) {
            Some(converter) => Ok(ConverterForm::edit(converter)),
            None => Err(self.not_found(ResourceKind::Converter, command_name)),
        }
    }

    pub async fn delete(&mut self, kind: ResourceKind, key: &str) -> Result<(), ConsoleError> {
        if let Err(e) = self.api.delete(kind, key).await {
            return Err(self.api_failure(&format!("Failed to delete {}", kind.label()), e));
        }

        info!("Deleted {} {}", kind.label(), key);
        self.notifications
            .success(format!("{} '{}' deleted", capitalized(kind), key));
        self.settle(kind).await;
        Ok(())
    }

    /// Upload (when the submission needs it), then create or update the record
    async fn submit(&mut self, mut submission: Submission) -> Result<(), ConsoleError> {
        let kind = submission.payload.kind();
        let mode = submission.mode;

        if let Some(pending) = submission.upload.take() {
            let uploaded = self
                .uploads
                .upload(&self.api, Some(&pending.file), pending.category)
                .await;
            match uploaded {
                Ok(stored) => submission.attach_media(pending.slot, stored.filepath),
                Err(e) => return Err(self.submit_failure(kind, mode, e)),
            }
        }

        let payload = &submission.payload;
        let result = match mode {
            SubmitMode::Create => self.api.create(payload).await,
            SubmitMode::Update => self.api.update(payload).await,
        };
        if let Err(e) = result {
            return Err(self.submit_failure(kind, mode, SubmitError::Record(e)));
        }

        info!("{} {} {}", mode.past_tense(), kind.label(), payload.key());
        let message = format!(
            "{} '{}' {}",
            capitalized(kind),
            payload.key(),
            mode.past_tense()
        );
        self.notifications.success(message);
        self.settle(kind).await;
        Ok(())
    }

    // ============================================
    // FORBIDDEN WORDS
    // ============================================

    /// Load the banned words of one group. Returns how many there are.
    pub async fn forbidden_words(&mut self, group_jid: &str) -> Result<usize, ConsoleError> {
        let result = self
            .mirror
            .refresh_forbidden_words(&self.api, group_jid)
            .await
            .map(|words| words.len());
        result.map_err(|e| self.api_failure("Failed to load forbidden words", e))
    }

    pub async fn add_forbidden_word(
        &mut self,
        mut form: ForbiddenWordForm,
    ) -> Result<(), ConsoleError> {
        if form.created_by.trim().is_empty() {
            form.created_by = self.settings.created_by.clone();
        }
        let payload = form.build().map_err(|e| self.invalid(e))?;

        if let Err(e) = self.api.add_forbidden_word(&payload).await {
            return Err(self.api_failure("Failed to add forbidden word", e));
        }

        info!("Forbidden word '{}' added to {}", payload.word, payload.group_jid);
        self.notifications
            .success(format!("Forbidden word '{}' added", payload.word));
        self.forbidden_words(&payload.group_jid).await.ok();
        Ok(())
    }

    pub async fn delete_forbidden_word(
        &mut self,
        group_jid: &str,
        id: i64,
    ) -> Result<(), ConsoleError> {
        if let Err(e) = self.api.delete_forbidden_word(id).await {
            return Err(self.api_failure("Failed to delete forbidden word", e));
        }

        info!("Forbidden word {} removed from {}", id, group_jid);
        self.notifications.success("Forbidden word deleted");
        self.forbidden_words(group_jid).await.ok();
        Ok(())
    }

    // ============================================
    // FAILURE REPORTING
    // ============================================

    fn api_failure(&mut self, context: &str, err: ApiError) -> ConsoleError {
        self.notifications
            .notify(Level::Danger, format!("{}: {}", context, err.reason()));
        ConsoleError::Api(err)
    }

    fn invalid(&mut self, err: ValidationError) -> ConsoleError {
        self.notifications.notify(Level::Warning, err.to_string());
        ConsoleError::Validation(err)
    }

    fn not_found(&mut self, kind: ResourceKind, key: &str) -> ConsoleError {
        let err = ConsoleError::NotFound {
            kind,
            key: key.to_string(),
        };
        self.notifications.notify(Level::Warning, err.to_string());
        err
    }

    fn submit_failure(
        &mut self,
        kind: ResourceKind,
        mode: SubmitMode,
        err: SubmitError,
    ) -> ConsoleError {
        let (level, message) = match &err {
            SubmitError::Validation(e) => (Level::Warning, e.to_string()),
            SubmitError::Upload(e) => {
                (Level::Danger, format!("Failed to upload file: {}", e.reason()))
            }
            SubmitError::Record(e) => (
                Level::Danger,
                format!("Failed to {} {}: {}", mode.verb(), kind.label(), e.reason()),
            ),
        };
        self.notifications.notify(level, message);
        ConsoleError::Submit(err)
    }
}

fn capitalized(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Group => "Group",
        ResourceKind::Command => "Command",
        ResourceKind::AutoResponse => "Auto response",
        ResourceKind::Converter => "Converter",
    }
}
