use crate::logging_connection::ExecOp;
use rivet::{Response, Result, Value};

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

/// A wrapper around the statement log and response script that provides a
/// clean API for tests
pub struct ExecLog {
    ops: Arc<Mutex<Vec<ExecOp>>>,
    script: Arc<Mutex<VecDeque<Result<Response>>>>,
}

impl ExecLog {
    pub(crate) fn new(
        ops: Arc<Mutex<Vec<ExecOp>>>,
        script: Arc<Mutex<VecDeque<Result<Response>>>>,
    ) -> Self {
        Self { ops, script }
    }

    /// Queues the response to the next statement that has none queued yet
    pub fn respond(&self, response: Response) {
        self.script.lock().unwrap().push_back(Ok(response));
    }

    /// Queues an error for the next statement
    pub fn fail(&self, err: rivet::Error) {
        self.script.lock().unwrap().push_back(Err(err));
    }

    pub fn len(&self) -> usize {
        self.ops.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.lock().unwrap().is_empty()
    }

    /// SQL text of every logged statement, in order
    pub fn sql(&self) -> Vec<String> {
        self.ops.lock().unwrap().iter().map(|op| op.sql.clone()).collect()
    }

    /// Count statements whose SQL starts with `prefix`
    pub fn count_prefix(&self, prefix: &str) -> usize {
        self.ops
            .lock()
            .unwrap()
            .iter()
            .filter(|op| op.sql.starts_with(prefix))
            .count()
    }

    pub fn clear(&mut self) {
        self.ops.lock().unwrap().clear();
    }

    /// Remove and return the first statement from the log
    pub fn pop(&mut self) -> Option<(String, Vec<Value>)> {
        let mut ops = self.ops.lock().unwrap();
        if ops.is_empty() {
            None
        } else {
            let op = ops.remove(0);
            Some((op.sql, op.params))
        }
    }
}
