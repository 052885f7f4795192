use crate::errors::KvPortError;

type TaskAction<'a, T> = Box<dyn FnOnce() -> Result<T, KvPortError> + 'a>;

struct Task<'a, T> {
    label: String,
    action: TaskAction<'a, T>,
}

/// Ordered list of labelled tasks run one at a time.
///
/// Task `n + 1` starts only after task `n` succeeded. The first failure stops
/// the run; the remaining tasks are dropped without being invoked.
///
/// # Usage
/// ```text
/// let mut runner = TaskRunner::new();
/// for key in &keys {
///     runner.push(key.clone(), || dispatcher.copy_key(key));
/// }
/// let run = runner.run();
/// ```
pub struct TaskRunner<'a, T> {
    tasks: Vec<Task<'a, T>>,
}

impl<'a, T> Default for TaskRunner<'a, T> {
    fn default() -> Self {
        TaskRunner::new()
    }
}

impl<'a, T> TaskRunner<'a, T> {
    pub fn new() -> Self {
        TaskRunner { tasks: Vec::new() }
    }

    pub fn push<F>(&mut self, label: impl Into<String>, action: F) -> &mut Self
    where
        F: FnOnce() -> Result<T, KvPortError> + 'a,
    {
        self.tasks.push(Task {
            label: label.into(),
            action: Box::new(action),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Runs the tasks in order until one fails or all have completed.
    pub fn run(self) -> TaskRun<T> {
        let total = self.tasks.len();
        let mut completed = Vec::with_capacity(total);

        for (index, task) in self.tasks.into_iter().enumerate() {
            match (task.action)() {
                Ok(output) => completed.push((task.label, output)),
                Err(error) => {
                    let skipped = total - index - 1;
                    log::debug!(
                        "Task '{}' failed, {} remaining task(s) skipped",
                        task.label,
                        skipped
                    );
                    return TaskRun {
                        completed,
                        failure: Some(TaskFailure {
                            index,
                            label: task.label,
                            error,
                        }),
                        skipped,
                    };
                }
            }
        }

        TaskRun {
            completed,
            failure: None,
            skipped: 0,
        }
    }
}

/// The task that stopped a run.
#[derive(Debug, Clone)]
pub struct TaskFailure {
    pub index: usize,
    pub label: String,
    pub error: KvPortError,
}

/// Result of [`TaskRunner::run`].
#[derive(Debug)]
pub struct TaskRun<T> {
    completed: Vec<(String, T)>,
    failure: Option<TaskFailure>,
    skipped: usize,
}

impl<T> TaskRun<T> {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Outputs of the tasks that succeeded, in run order.
    pub fn completed(&self) -> &[(String, T)] {
        &self.completed
    }

    pub fn failure(&self) -> Option<&TaskFailure> {
        self.failure.as_ref()
    }

    /// Number of tasks never invoked because an earlier one failed.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn into_parts(self) -> (Vec<(String, T)>, Option<TaskFailure>) {
        (self.completed, self.failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use std::cell::RefCell;

    #[test]
    fn test_empty_runner_succeeds() {
        let runner: TaskRunner<()> = TaskRunner::new();
        assert!(runner.is_empty());
        let run = runner.run();
        assert!(run.is_success());
        assert!(run.completed().is_empty());
        assert_eq!(run.skipped(), 0);
    }

    #[test]
    fn test_runs_in_order() {
        let calls = RefCell::new(Vec::new());
        let mut runner = TaskRunner::new();
        for n in 0..4 {
            let calls = &calls;
            runner.push(format!("task-{}", n), move || {
                calls.borrow_mut().push(n);
                Ok(n * 10)
            });
        }
        assert_eq!(runner.len(), 4);

        let run = runner.run();
        assert!(run.is_success());
        assert_eq!(*calls.borrow(), vec![0, 1, 2, 3]);
        let outputs: Vec<i32> = run.completed().iter().map(|(_, out)| *out).collect();
        assert_eq!(outputs, vec![0, 10, 20, 30]);
        assert_eq!(run.completed()[2].0, "task-2");
    }

    #[test]
    fn test_first_failure_stops_run() {
        let calls = RefCell::new(Vec::new());
        let mut runner = TaskRunner::new();
        for n in 0..5 {
            let calls = &calls;
            runner.push(format!("k{}", n), move || {
                calls.borrow_mut().push(n);
                if n == 2 {
                    Err(KvPortError::new("boom", ErrorKind::WriteError))
                } else {
                    Ok(())
                }
            });
        }

        let run = runner.run();
        assert!(!run.is_success());
        assert_eq!(*calls.borrow(), vec![0, 1, 2]);
        assert_eq!(run.completed().len(), 2);
        assert_eq!(run.skipped(), 2);

        let failure = run.failure().unwrap();
        assert_eq!(failure.index, 2);
        assert_eq!(failure.label, "k2");
        assert_eq!(failure.error.kind(), &ErrorKind::WriteError);
    }

    #[test]
    fn test_failure_on_last_task_skips_nothing() {
        let mut runner = TaskRunner::new();
        runner
            .push("ok", || Ok(1))
            .push("bad", || Err(KvPortError::new("no", ErrorKind::ReadError)));

        let (completed, failure) = runner.run().into_parts();
        assert_eq!(completed, vec![("ok".to_string(), 1)]);
        assert_eq!(failure.unwrap().label, "bad");
    }
}
