use indicatif::{ProgressBar, ProgressDrawTarget, ProgressState, ProgressStyle};
use ksdssp::engine::progress::{Progress, ProgressCallback};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;

struct BarState {
    bar: ProgressBar,
    /// Model currently being classified; `None` for single-model input.
    model: Option<i32>,
    phase: &'static str,
}

impl BarState {
    fn label(&self, text: &str) -> String {
        match self.model {
            Some(model) => format!("Model {}: {}", model, text),
            None => text.to_string(),
        }
    }
}

/// Renders classification progress events as a spinner per phase and a bar per task.
#[derive(Clone)]
pub struct CliProgressHandler {
    state: Arc<Mutex<BarState>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        Self::with_draw_target(ProgressDrawTarget::stderr())
    }

    /// A handler that tracks progress without drawing anything.
    pub fn hidden() -> Self {
        Self::with_draw_target(ProgressDrawTarget::hidden())
    }

    fn with_draw_target(target: ProgressDrawTarget) -> Self {
        let bar = ProgressBar::with_draw_target(Some(0), target).with_style(spinner_style());
        bar.finish_and_clear();

        Self {
            state: Arc::new(Mutex::new(BarState {
                bar,
                model: None,
                phase: "",
            })),
        }
    }

    /// Prefixes subsequent phase messages with the model number.
    pub fn set_model(&self, model: Option<i32>) {
        if let Ok(mut state) = self.state.lock() {
            state.model = model;
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let state = Arc::clone(&self.state);

        Box::new(move |progress: Progress| {
            let Ok(mut state) = state.lock() else {
                warn!("Progress state mutex was poisoned. Cannot update progress.");
                return;
            };

            match progress {
                Progress::PhaseStart { name } => {
                    state.phase = name;
                    let message = state.label(name);
                    let bar = &state.bar;
                    bar.reset();
                    bar.set_length(0);
                    bar.set_style(spinner_style());
                    bar.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                    bar.set_message(message);
                }
                Progress::PhaseFinish => {
                    let message = state.label(&format!("{} done", state.phase));
                    state.bar.disable_steady_tick();
                    state.bar.finish_with_message(message);
                }
                Progress::TaskStart { total_steps } => {
                    let bar = &state.bar;
                    bar.disable_steady_tick();
                    bar.reset();
                    bar.set_length(total_steps);
                    bar.set_style(bar_style());
                }
                Progress::TaskIncrement => state.bar.inc(1),
                Progress::TaskFinish => {
                    let bar = &state.bar;
                    if let Some(length) = bar.length() {
                        bar.set_position(length);
                    }
                    bar.finish();
                }
                Progress::Message(msg) => {
                    if state.bar.is_finished() {
                        state.bar.set_message(msg);
                    } else {
                        state.bar.println(format!("  {}", msg));
                    }
                }
            }
        })
    }

    /// Clears the bar from the terminal once all models are done.
    pub fn finish(&self) {
        if let Ok(state) = self.state.lock() {
            state.bar.finish_and_clear();
        }
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{msg:<28} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .with_key("eta", |state: &ProgressState, w: &mut dyn std::fmt::Write| {
            let _ = write!(w, "{:.1}s", state.eta().as_secs_f64());
        })
        .progress_chars("##-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn bar(handler: &CliProgressHandler) -> ProgressBar {
        handler.state.lock().unwrap().bar.clone()
    }

    #[test]
    fn handler_starts_finished_and_empty() {
        let handler = CliProgressHandler::hidden();
        let pb = bar(&handler);
        assert_eq!(pb.length(), Some(0));
        assert!(pb.is_finished());
    }

    #[test]
    fn phases_and_tasks_drive_the_bar() {
        let handler = CliProgressHandler::hidden();
        let callback = handler.get_callback();

        callback(Progress::PhaseStart {
            name: "Hydrogen Bonds",
        });
        assert_eq!(bar(&handler).message(), "Hydrogen Bonds");
        assert!(!bar(&handler).is_finished());

        callback(Progress::TaskStart { total_steps: 40 });
        callback(Progress::TaskIncrement);
        assert_eq!(bar(&handler).length(), Some(40));
        assert_eq!(bar(&handler).position(), 1);

        callback(Progress::TaskFinish);
        assert!(bar(&handler).is_finished());
        assert_eq!(bar(&handler).position(), 40);

        callback(Progress::PhaseFinish);
        assert_eq!(bar(&handler).message(), "Hydrogen Bonds done");
    }

    #[test]
    fn phase_messages_name_the_current_model() {
        let handler = CliProgressHandler::hidden();
        let callback = handler.get_callback();

        handler.set_model(Some(2));
        callback(Progress::PhaseStart { name: "Sheets" });
        assert_eq!(bar(&handler).message(), "Model 2: Sheets");
        callback(Progress::PhaseFinish);
        assert_eq!(bar(&handler).message(), "Model 2: Sheets done");

        handler.set_model(None);
        callback(Progress::PhaseStart { name: "Helices" });
        assert_eq!(bar(&handler).message(), "Helices");
    }

    #[test]
    fn callback_can_be_driven_from_another_thread() {
        let handler = CliProgressHandler::hidden();
        let callback = handler.get_callback();

        thread::spawn(move || {
            callback(Progress::PhaseStart { name: "Labelling" });
            callback(Progress::TaskIncrement);
            callback(Progress::PhaseFinish);
        })
        .join()
        .unwrap();

        let pb = bar(&handler);
        assert!(pb.is_finished());
        assert_eq!(pb.message(), "Labelling done");
    }
}
