use crate::error::GraphError;

/// Receiver of one prompt's output.
///
/// `on_next` may be called any number of times; then exactly one of
/// `on_complete` or `on_error` is called, last.
pub trait TokenConsumer: Send + Sync {
    fn on_next(&self, token: &str);
    fn on_complete(&self);
    fn on_error(&self, error: GraphError);
}

/// Enforces the consumer contract for a single run.
///
/// Terminal methods consume the guard. Dropping it without a terminal call
/// (the run's future was cancelled) reports an error so the consumer is
/// never left waiting.
pub struct ConsumerGuard<'a> {
    consumer: &'a dyn TokenConsumer,
    forwarded: usize,
    finished: bool,
}

impl<'a> ConsumerGuard<'a> {
    pub fn new(consumer: &'a dyn TokenConsumer) -> Self {
        Self {
            consumer,
            forwarded: 0,
            finished: false,
        }
    }

    /// Forward a chunk; empty chunks are skipped.
    pub fn next(&mut self, token: &str) {
        if token.is_empty() {
            return;
        }
        self.forwarded += 1;
        self.consumer.on_next(token);
    }

    /// Chunks forwarded so far.
    pub fn forwarded(&self) -> usize {
        self.forwarded
    }

    pub fn complete(mut self) {
        self.finished = true;
        self.consumer.on_complete();
    }

    pub fn error(mut self, error: GraphError) {
        self.finished = true;
        self.consumer.on_error(error);
    }
}

impl Drop for ConsumerGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.finished = true;
            self.consumer.on_error(GraphError::InvariantViolation(
                "prompt run dropped before it finished".into(),
            ));
        }
    }
}
