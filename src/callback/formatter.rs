//! Task result formatter
//!
//! Hooks invoked by the host at fixed lifecycle points. The formatter keeps
//! a task counter, the play's task total and a per-task timer; everything
//! else it needs arrives with each event.

use std::time::Instant;

use anyhow::Result;

use super::host::{DefaultHost, Host};
use super::render::{self, OutputMode, Sanitized};
use crate::cli::display::{stringc, OutputSink};
use crate::config::{DisplayConfig, Palette};
use crate::event::model::{ItemStatus, PlayDescriptor, TaskDescriptor, TaskResult, TaskStatus};
use crate::event::stream::HostEvent;

/// Display settings the formatter reads on every result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FormatterOptions {
    /// Status and message colors
    pub palette: Palette,
    /// Append task arguments to banners
    pub show_args: bool,
    /// Framing for command output
    pub mode: OutputMode,
}

impl FormatterOptions {
    /// Build options from config, detecting CI mode from the environment
    pub fn from_config(config: &DisplayConfig) -> Result<Self> {
        Ok(Self {
            palette: config.palette()?,
            show_args: config.display.show_args,
            mode: OutputMode::from_env(&config.display.ci_env_var),
        })
    }
}

/// Renders task results as banners, command transcripts and JSON dumps
pub struct ResultFormatter<S: OutputSink, H: Host = DefaultHost> {
    sink: S,
    host: H,
    options: FormatterOptions,
    task_counter: usize,
    task_total: usize,
    task_started: Instant,
}

impl<S: OutputSink> ResultFormatter<S, DefaultHost> {
    /// Create a formatter with the stock host rendering
    pub fn from_config(config: &DisplayConfig, sink: S) -> Result<Self> {
        let options = FormatterOptions::from_config(config)?;
        let host = DefaultHost::new(options.palette, config.display.verbosity);
        Ok(Self::new(sink, host, options))
    }
}

impl<S: OutputSink, H: Host> ResultFormatter<S, H> {
    /// Create a formatter with an explicit host implementation
    #[must_use]
    pub fn new(sink: S, host: H, options: FormatterOptions) -> Self {
        Self {
            sink,
            host,
            options,
            task_counter: 0,
            task_total: 0,
            task_started: Instant::now(),
        }
    }

    /// Number of tasks started so far
    #[must_use]
    pub const fn task_counter(&self) -> usize {
        self.task_counter
    }

    /// Task total announced at play start
    #[must_use]
    pub const fn task_total(&self) -> usize {
        self.task_total
    }

    /// The output sink
    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Consume the formatter, returning its sink
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Dispatch a parsed event to the matching hook
    pub fn handle(&mut self, event: &HostEvent) {
        match event {
            HostEvent::PlayStart { play } => self.on_play_start(play),
            HostEvent::TaskStart {
                task,
                is_conditional,
            } => self.on_task_start(task, *is_conditional),
            HostEvent::RunnerStart { host, task } => self.on_runner_start(host, task),
            HostEvent::RunnerResult { status, result } => match status {
                TaskStatus::Ok => self.on_runner_ok(result),
                TaskStatus::Failed => self.on_runner_failed(result),
                TaskStatus::Skipped => self.on_runner_skipped(result),
                TaskStatus::Unreachable => self.on_runner_unreachable(result),
            },
            HostEvent::ItemResult { status, result } => match status {
                ItemStatus::Ok => self.on_item_ok(result),
                ItemStatus::Failed => self.on_item_failed(result),
                ItemStatus::Skipped => self.on_item_skipped(result),
            },
            HostEvent::Unknown => {}
        }
    }

    /// A play started: remember how many tasks its first block holds
    pub fn on_play_start(&mut self, play: &PlayDescriptor) {
        self.host.play_start(play, &mut self.sink);
        self.task_total = play.first_block_len();
    }

    /// A task started. Counts every task, including ones a conditional
    /// will skip.
    pub fn on_task_start(&mut self, _task: &TaskDescriptor, _is_conditional: bool) {
        self.task_started = Instant::now();
        self.task_counter += 1;
    }

    /// A task started on one host. Nothing is shown.
    pub fn on_runner_start(&mut self, _host: &str, _task: &TaskDescriptor) {}

    /// A task finished successfully on one host
    pub fn on_runner_ok(&mut self, result: &TaskResult) {
        self.display_task_result(result, TaskStatus::Ok);
    }

    /// A task failed on one host
    pub fn on_runner_failed(&mut self, result: &TaskResult) {
        self.display_task_result(result, TaskStatus::Failed);
    }

    /// A task was skipped on one host
    pub fn on_runner_skipped(&mut self, result: &TaskResult) {
        self.display_task_result(result, TaskStatus::Skipped);
    }

    /// A host could not be reached for the task
    pub fn on_runner_unreachable(&mut self, result: &TaskResult) {
        self.display_task_result(result, TaskStatus::Unreachable);
    }

    /// Loop item results use the host's rendering unchanged
    pub fn on_item_ok(&mut self, result: &TaskResult) {
        self.host.item_result(ItemStatus::Ok, result, &mut self.sink);
    }

    /// One loop item failed
    pub fn on_item_failed(&mut self, result: &TaskResult) {
        self.host
            .item_result(ItemStatus::Failed, result, &mut self.sink);
    }

    /// One loop item was skipped
    pub fn on_item_skipped(&mut self, result: &TaskResult) {
        self.host
            .item_result(ItemStatus::Skipped, result, &mut self.sink);
    }

    const fn status_color(&self, status: TaskStatus) -> Option<colored::Color> {
        let palette = &self.options.palette;
        match status {
            TaskStatus::Ok => palette.ok,
            TaskStatus::Failed => palette.error,
            TaskStatus::Skipped => palette.skip,
            TaskStatus::Unreachable => palette.unreachable,
        }
    }

    fn display_task_result(&mut self, result: &TaskResult, status: TaskStatus) {
        let task = &result.task;
        let banner = render::task_banner(
            &stringc(status.label(), self.status_color(status)),
            self.task_counter,
            self.task_total,
            task,
            self.options.show_args,
            self.task_started.elapsed(),
        );
        self.sink.display(&banner, None);

        let mut payload = result.payload.clone();
        // Exceptions and warnings are payload too; a no-log result shows none of it.
        if !render::is_no_log(&payload) {
            self.host.handle_exception(&mut payload, &mut self.sink);
            self.host.handle_warnings(&mut payload, &mut self.sink);
        }
        self.host.clean_results(&mut payload, &task.action);

        let cleaned = match render::sanitize(&payload) {
            Sanitized::Censored(msg) => {
                self.display_censored(&msg);
                return;
            }
            Sanitized::Payload(cleaned) => cleaned,
        };

        if let Some(censored) = cleaned.get("censored") {
            self.display_censored(&render::value_text(censored));
        } else if render::is_command_action(&task.action) {
            render::display_cmd_output(
                &mut self.sink,
                &cleaned,
                self.options.mode,
                self.options.palette.error,
            );
        } else {
            let msg = format!("[{}]\n{}", task.action, render::dump_sorted(&cleaned));
            self.sink.display(&msg, None);
        }
    }

    fn display_censored(&mut self, msg: &str) {
        self.sink
            .display(&format!("censored: {msg}"), self.options.palette.verbose);
    }
}
